//! HTTP portal for ordering cloud space projects.
//!
//! Routes:
//! - `POST /api/project/create` validates an order, prices it and runs the playbook
//! - `GET /api/options` lists plans and storage options
//! - `GET /` and `GET /payment` serve the HTML views
//! - any other `GET` is answered from the public directory

use crate::settings::PortalSettings;
use actix_web::error::{JsonPayloadError, UrlencodedError};
use actix_web::http::StatusCode;
use actix_web::{
    middleware, web, App, Either, HttpRequest, HttpResponse, HttpServer, ResponseError,
};
use provisioner::{Catalog, ProjectOrder, ProvisionError, Provisioner};
use serde::Deserialize;
use serde_json::json;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing required parameters: projectName, size, and storageBytes are required")]
    MissingParameters,

    #[error("Invalid size. Must be {choices}.")]
    InvalidSize { choices: String },

    #[error("Invalid storage size.")]
    InvalidStorage,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Failed to create project")]
    ProvisionFailed { details: String },

    #[error("{0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingParameters
            | ApiError::InvalidSize { .. }
            | ApiError::InvalidStorage
            | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::ProvisionFailed { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "success": false,
            "error": self.to_string(),
        });
        if let ApiError::ProvisionFailed { details } = self {
            body["details"] = json!(details);
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<ProvisionError> for ApiError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::PlaybookFailed { stdout, stderr, .. } => ApiError::ProvisionFailed {
                details: if stderr.trim().is_empty() {
                    stdout
                } else {
                    stderr
                },
            },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Storage size as sent by the browser: a JSON number or a form string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StorageBytes {
    Number(serde_json::Number),
    Text(String),
}

impl StorageBytes {
    /// Zero and blank values count as absent. Integral floats such as `1e12`
    /// name the same option as the integer; anything else is kept as written
    /// and fails the catalog lookup.
    fn into_key(self) -> Option<String> {
        match self {
            StorageBytes::Number(number) => number_key(&number),
            StorageBytes::Text(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
        }
    }
}

impl From<u64> for StorageBytes {
    fn from(bytes: u64) -> Self {
        StorageBytes::Number(bytes.into())
    }
}

fn number_key(number: &serde_json::Number) -> Option<String> {
    if let Some(bytes) = number.as_u64() {
        return (bytes != 0).then(|| bytes.to_string());
    }
    if let Some(bytes) = number.as_i64() {
        return Some(bytes.to_string());
    }

    let value = number.as_f64()?;
    if value == 0.0 {
        None
    } else if value.fract() == 0.0 && value.abs() < u64::MAX as f64 {
        Some(format!("{:.0}", value))
    } else {
        Some(value.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub project_name: Option<String>,
    pub description: Option<String>,
    pub size: Option<String>,
    pub storage_bytes: Option<StorageBytes>,
}

impl CreateProjectRequest {
    /// Checks required fields first, then the plan, then the storage option.
    pub fn into_order(self, catalog: &Catalog) -> Result<ProjectOrder, ApiError> {
        let project_name = non_empty(self.project_name);
        let size = non_empty(self.size);
        let storage = self.storage_bytes.and_then(StorageBytes::into_key);

        let (Some(project_name), Some(size), Some(storage)) = (project_name, size, storage) else {
            return Err(ApiError::MissingParameters);
        };

        if catalog.plan(&size).is_err() {
            return Err(ApiError::InvalidSize {
                choices: plan_choices(catalog),
            });
        }
        if catalog.storage(&storage).is_err() {
            return Err(ApiError::InvalidStorage);
        }

        let mut order = ProjectOrder::new(project_name, size, storage);
        order.description = non_empty(self.description);
        Ok(order)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// "small, medium, or large"
fn plan_choices(catalog: &Catalog) -> String {
    let names: Vec<&str> = catalog
        .plans_by_price()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    match names.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [first, second] => format!("{} or {}", first, second),
        [rest @ .., last] => format!("{}, or {}", rest.join(", "), last),
    }
}

/// Shared state of every worker
pub struct AppState {
    pub provisioner: Provisioner,
    pub views_dir: PathBuf,
    pub public_dir: PathBuf,
}

impl AppState {
    pub fn new(provisioner: Provisioner, settings: &PortalSettings) -> Self {
        Self {
            provisioner,
            views_dir: settings.views_dir.clone(),
            public_dir: settings.public_dir.clone(),
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_body_error))
        .app_data(web::FormConfig::default().error_handler(form_body_error))
        .route("/api/project/create", web::post().to(create_project))
        .route("/api/options", web::get().to(options))
        .route("/", web::get().to(index))
        .route("/payment", web::get().to(payment))
        .route("/{path:.*}", web::get().to(public_file));
}

// A body neither extractor accepts reports the JSON error.
fn json_body_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!("Rejected JSON body: {}", err);
    ApiError::InvalidBody(err.to_string()).into()
}

fn form_body_error(err: UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    warn!("Rejected form body: {}", err);
    ApiError::InvalidBody(err.to_string()).into()
}

async fn create_project(
    state: web::Data<AppState>,
    body: Either<web::Json<CreateProjectRequest>, web::Form<CreateProjectRequest>>,
) -> Result<HttpResponse, ApiError> {
    let request = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };

    let order = request.into_order(state.provisioner.catalog())?;

    let receipt = state.provisioner.provision(&order).await.map_err(|e| {
        error!("Error creating project {}: {}", order.project_name, e);
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Project created successfully",
        "price": receipt.quote.price,
        "createdAt": receipt.created_at,
    })))
}

async fn options(state: web::Data<AppState>) -> HttpResponse {
    let catalog = state.provisioner.catalog();
    HttpResponse::Ok().json(json!({
        "plans": catalog.plans,
        "storage": catalog.storage,
    }))
}

async fn index(state: web::Data<AppState>) -> HttpResponse {
    send_file(&state.views_dir.join("index.html")).await
}

async fn payment(state: web::Data<AppState>) -> HttpResponse {
    send_file(&state.views_dir.join("payment.html")).await
}

async fn public_file(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match resolve_public_path(&state.public_dir, &path) {
        Some(file) => send_file(&file).await,
        None => HttpResponse::NotFound().finish(),
    }
}

/// Joins a request path onto `base`, refusing anything that could leave it.
pub fn resolve_public_path(base: &Path, requested: &str) -> Option<PathBuf> {
    let mut resolved = base.to_path_buf();
    let mut depth = 0;
    for component in Path::new(requested).components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            _ => return None,
        }
    }
    (depth > 0).then_some(resolved)
}

async fn send_file(path: &Path) -> HttpResponse {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return HttpResponse::NotFound().finish(),
    }

    match tokio::fs::read(path).await {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(content_type_for(path))
            .body(bytes),
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

fn log_startup(settings: &PortalSettings, catalog: &Catalog) {
    info!(
        "Cloud Space Provider app listening on {}",
        settings.address()
    );
    info!("Available plans:");
    for (name, plan) in catalog.plans_by_price() {
        info!(
            "- {}: {} vCPUs, {}GB RAM, {} MAD",
            name, plan.vcpus, plan.memory_gb, plan.price
        );
    }
    info!("Available storage options:");
    for (bytes, option) in catalog.storage_by_size() {
        info!("- {} bytes: {}, {} MAD", bytes, option.display, option.price);
    }
}

/// Runs the portal until the server is stopped.
pub async fn serve(settings: PortalSettings, provisioner: Provisioner) -> std::io::Result<()> {
    log_startup(&settings, provisioner.catalog());

    let state = web::Data::new(AppState::new(provisioner, &settings));
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind((settings.bind.as_str(), settings.port))?
    .run()
    .await
}
