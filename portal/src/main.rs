use clap::{Parser, Subcommand};
use declarations::prelude::*;
use portal::PortalSettings;
use provisioner::{generate_user, AnsiblePlaybook, Catalog, Provisioner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "cloudspace")]
#[command(about = "Declare Nutanix environments and projects, and run the cloud space portal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the cloud space provider portal
    Serve {
        /// Address to bind to
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (defaults to $PORT, then 3000)
        #[arg(short, long)]
        port: Option<u16>,
        /// TOML file replacing the built-in plan catalog
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Directory holding index.html and payment.html
        #[arg(long, default_value = "views")]
        views: PathBuf,
        /// Directory served for all other GET requests
        #[arg(long, default_value = "public")]
        public: PathBuf,
        /// Playbook creating the project
        #[arg(long, default_value = "project_create.yaml")]
        playbook: PathBuf,
        /// Directory the playbook runs in
        #[arg(long, default_value = ".")]
        working_dir: PathBuf,
    },
    /// Print the environment declaration built from NTNX_* variables
    Environment {
        #[arg(short, long, default_value = DEFAULT_ENVIRONMENT_NAME)]
        name: String,
    },
    /// Print the project declaration built from VCPUS, STORAGE and MEMORY
    Project {
        #[arg(short, long, default_value = DEFAULT_PROJECT_NAME)]
        name: String,
    },
    /// List plans and storage options with their prices
    Options {
        /// TOML file replacing the built-in plan catalog
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Generate a random directory user and write it as JSON
    GenerateUser {
        #[arg(short, long, default_value = "user_data.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }

    let cli = Cli::parse();
    let env = ProcessEnv::new();

    match cli.command {
        Commands::Serve {
            bind,
            port,
            catalog,
            views,
            public,
            playbook,
            working_dir,
        } => {
            let mut settings = PortalSettings::from_env_with_port(&env, port)?
                .with_views_dir(views)
                .with_public_dir(public);
            if let Some(bind) = bind {
                settings = settings.with_bind(bind);
            }

            let runner = AnsiblePlaybook::new()
                .with_playbook(playbook)
                .with_working_dir(working_dir);
            let provisioner = Provisioner::new(
                load_catalog(catalog.as_deref())?,
                settings.provisioner.clone(),
                Arc::new(runner),
            );

            portal::serve(settings, provisioner).await?;
        }
        Commands::Environment { name } => {
            let environment = load_environment(&env, name)?;
            println!("{}", serde_json::to_string_pretty(&environment)?);
        }
        Commands::Project { name } => {
            let project = load_project(&env, name)?;
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        Commands::Options { catalog } => {
            list_options(&load_catalog(catalog.as_deref())?);
        }
        Commands::GenerateUser { output } => {
            let user = generate_user(&mut rand::thread_rng());
            std::fs::write(&output, serde_json::to_string_pretty(&user)?)?;
            println!("Generated user data: {} ({})", user.upn, output.display());
        }
    }

    Ok(())
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Catalog::load(path)?),
        None => Ok(Catalog::default()),
    }
}

fn list_options(catalog: &Catalog) {
    println!("Available plans:");
    for (name, plan) in catalog.plans_by_price() {
        println!(
            "  - {}: {} vCPUs, {}GB RAM, {} MAD",
            name, plan.vcpus, plan.memory_gb, plan.price
        );
    }

    println!("Available storage options:");
    for (bytes, option) in catalog.storage_by_size() {
        println!(
            "  - {} bytes: {}, {} MAD",
            bytes, option.display, option.price
        );
    }
}
