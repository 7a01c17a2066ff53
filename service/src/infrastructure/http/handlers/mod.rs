use axum::http::StatusCode;
use serde::Deserialize;

pub mod audit;
pub mod events;
pub mod notifications;
pub mod workflow;

// health check handler
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Pagination as the list endpoints accept it.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

const MAX_PAGE_SIZE: u32 = 100;

impl PageParams {
    pub fn to_page(self) -> crate::domain::ports::Page {
        crate::domain::ports::Page {
            number: self.page.unwrap_or(1).max(1),
            size: self.per_page.unwrap_or(20).clamp(1, MAX_PAGE_SIZE),
        }
    }
}
