use std::net::SocketAddr;
use std::path::PathBuf;

use rust_decimal::Decimal;

use crate::category::CategoryRoots;

#[derive(Clone)]
pub struct AppConfig {
    pub odoo_url: String,
    pub odoo_db: String,
    pub odoo_username: String,
    pub odoo_password: String,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub price_concurrency: usize,
    pub category_roots: CategoryRoots,
    pub export_price_factor: Decimal,
    pub allowed_origins: Vec<String>,
    pub sheet_template_id: Option<String>,
    pub google_access_token: Option<String>,
    pub sheet_name: String,
    pub sheet_anchor: String,
    pub xlsx_template_path: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("odoo_url", &self.odoo_url)
            .field("odoo_db", &self.odoo_db)
            .field("odoo_username", &self.odoo_username)
            .field("odoo_password", &"[redacted]")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("price_concurrency", &self.price_concurrency)
            .field("category_roots", &self.category_roots)
            .field("export_price_factor", &self.export_price_factor)
            .field("allowed_origins", &self.allowed_origins)
            .field("sheet_template_id", &self.sheet_template_id)
            .field(
                "google_access_token",
                &self.google_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("sheet_name", &self.sheet_name)
            .field("sheet_anchor", &self.sheet_anchor)
            .field("xlsx_template_path", &self.xlsx_template_path)
            .finish()
    }
}
