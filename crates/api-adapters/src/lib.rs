//! Inbound HTTP adapter: the axum surface of the discussion API.
//!
//! Handlers stay thin. They parse and validate the wire shape of a request,
//! hand a typed call to [`services::DiscussionService`], and translate the
//! outcome back into a status code and JSON body. All authorization and
//! orchestration lives below this crate.

use std::sync::Arc;

use services::DiscussionService;

pub mod error;
pub mod extract;
pub mod handlers;
pub mod params;
pub mod routes;

pub use error::ApiError;
pub use routes::router;

/// Shared handler state. Page-size bounds come from configuration so the
/// adapter, not the service layer, owns wire-level limits.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DiscussionService>,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl AppState {
    pub fn new(service: Arc<DiscussionService>, default_page_size: u32, max_page_size: u32) -> Self {
        Self {
            service,
            default_page_size,
            max_page_size,
        }
    }
}
