//! AssetSync API library
//!
//! HTTP handlers, middleware and application setup for the asset catalog.

mod api_doc;
mod handlers;
mod services;
pub mod telemetry;

pub mod auth;
pub mod constants;
pub mod error;
pub mod middleware;
pub mod setup;
pub mod state;

pub use api_doc::ApiDoc;
pub use error::ErrorResponse;
pub use services::AssetService;
