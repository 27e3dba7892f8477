//! Web form presentation layer.
//!
//! Server-rendered HTML over axum. Each handler resolves the caller's
//! session from its cookie, runs at most one outbound call on a blocking
//! thread, and re-renders the page with the outcome.

pub mod endpoints;
pub mod error;
pub mod markdown;
pub mod page;
pub mod router;
pub mod server;
pub mod types;

pub use router::app_router;
pub use server::{start_server, RunningServer};
pub use types::AppState;
