//! Random directory-service accounts for new cloud space customers.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const USER_DOMAIN: &str = "ntnx.local";
pub const USER_OU_PATH: &str = "CN=CloudSpace1,DC=ntnx,DC=local";
pub const PASSWORD_LENGTH: usize = 8;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

// Both lists repeat some words; repeats weight the draw.
const FIRST_NAMES: &[&str] = &[
    "Swift", "Silent", "Clever", "Lunar", "Solar", "Electric", "Mystic", "Crimson", "Azure", "Noble",
    "Wandering", "Epic", "Phantom", "Iron", "Golden", "Ancient", "Hidden", "Jolly", "Quiet", "Velvet",
    "Rusty", "Cosmic", "Lucky", "Savage", "Happy", "Midnight", "Fuzzy", "Dark", "Bright", "Silent",
    "Steel", "Virtual", "Alpha", "Omega", "Echo", "Neon", "Hyper", "Ghost", "Wild", "Lonely",
    "Bold", "Brave", "Curious", "Dapper", "Eager", "Fierce", "Gentle", "Honest", "Icy", "Jaded",
    "Keen", "Lazy", "Mighty", "Nervous", "Odd", "Proud", "Quick", "Relentless", "Shiny", "Tiny",
    "Untamed", "Vivid", "Witty", "Expert", "Young", "Zesty", "Royal", "Quirky", "Prime", "Ornate",
    "Natural", "Majestic", "Kinetic", "Jubilant", "Infinite", "Hollow", "Grand", "Frosty", "Enchanted",
    "Dynamic", "Crystalline", "Blazing", "Atomic", "Amber", "Tropical", "Spectral", "Rocky", "Polar",
    "Mystical", "Mechanical", "Legendary", "Industrial", "Hollow", "Galactic", "Fiery", "Eternal",
    "Digital", "Chaotic", "Blitz", "Atomic",
];

const LAST_NAMES: &[&str] = &[
    "Phoenix", "Wolf", "Ninja", "Dragon", "Hawk", "Captain", "Guardian", "Knight", "Samurai", "Wizard",
    "terminal", "Drifter", "Runner", "Panda", "Fox", "Raven", "Titan", "Giant", "Dwarf", "Elf",
    "Goblin", "Spectre", "Lion", "Tiger", "Bear", "Falcon", "Eagle", "Owl", "Shark", "Whale",
    "Rider", "Stranger", "Pilgrim", "Nomad", "Warrior", "Sage", "Bard", "Merchant", "Emperor", "Duke",
    "Prince", "King", "Queen", "Robot", "Android", "Cyborg", "Algorithm", "Code", "Byte", "Pixel",
    "Catalyst", "Vortex", "Nebula", "Galaxy", "Comet", "Meteor", "Planet", "Star", "Sun", "Moon",
    "Thunder", "Lightning", "Storm", "Rain", "River", "Mountain", "Valley", "Canyon", "Forest", "Desert",
    "Ocean", "Island", "Glacier", "Volcano", "Echo", "Shadow", "Spirit", "Ghost", "Legend", "Myth",
    "Hammer", "Anvil", "Forge", "Sword", "Shield", "Arrow", "Archer", "Gunner", "Pilot", "Driver",
    "Explorer", "Detective", "Artist", "Scholar", "Genius", "Champion", "Hero", "Villain", "Jester",
    "Oracle",
];

/// A user record ready for import into the directory service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub name: String,
    pub given_name: String,
    pub surname: String,
    pub password: String,
    pub upn: String,
    pub ou_path: String,
}

pub fn generate_user<R: Rng>(rng: &mut R) -> DirectoryUser {
    let given_name = FIRST_NAMES.choose(rng).copied().unwrap_or("Swift");
    let surname = LAST_NAMES.choose(rng).copied().unwrap_or("Phoenix");
    let name = format!(
        "{}_{}",
        given_name.to_lowercase(),
        surname.to_lowercase()
    );

    DirectoryUser {
        upn: format!("{}@{}", name, USER_DOMAIN),
        name,
        given_name: given_name.to_string(),
        surname: surname.to_string(),
        password: generate_password(rng),
        ou_path: USER_OU_PATH.to_string(),
    }
}

/// Alphanumeric password with at least one uppercase letter, one lowercase
/// letter and one digit.
pub fn generate_password<R: Rng>(rng: &mut R) -> String {
    let mut chars: Vec<u8> = Vec::with_capacity(PASSWORD_LENGTH);
    for class in [UPPERCASE, LOWERCASE, DIGITS] {
        chars.push(class[rng.gen_range(0..class.len())]);
    }

    while chars.len() < PASSWORD_LENGTH {
        chars.push(ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())]);
    }

    chars.shuffle(rng);
    chars.into_iter().map(char::from).collect()
}
