use std::sync::Arc;

use common::storage::PdfStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub pdf_store: Arc<dyn PdfStore>,
}
