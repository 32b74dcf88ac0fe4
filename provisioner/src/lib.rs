//! Provisioning for cloudspace projects
//!
//! Prices orders against the plan catalog, turns them into quota limits and
//! runs the project creation playbook. Also generates directory-service users
//! for new customers.

pub mod catalog;
pub mod error;
pub mod order;
pub mod playbook;
pub mod settings;
pub mod user;

pub use catalog::{Catalog, CatalogError, CatalogResult, Plan, StorageOption};
pub use error::{ProvisionError, ProvisionResult};
pub use order::{ProjectOrder, ProvisionReceipt, Provisioner, Quote};
pub use playbook::{AnsiblePlaybook, PlaybookOutput, PlaybookRunner, ProjectVars};
pub use settings::ProvisionerSettings;
pub use user::{generate_password, generate_user, DirectoryUser};
