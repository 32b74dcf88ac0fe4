pub mod server;
pub mod settings;

pub use server::{configure, serve, ApiError, AppState, CreateProjectRequest, StorageBytes};
pub use settings::PortalSettings;
