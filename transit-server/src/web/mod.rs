//! Web layer for the transit route finder.
//!
//! Provides JSON endpoints for finding routes, nearby stops and alerts.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, ServerFinder, ServerProvider};
