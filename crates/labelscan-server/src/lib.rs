//! HTTP API for the label scanner.
//!
//! Two JSON endpoints, `POST /scanSerialNumber` and `POST /saveSerialNumber`,
//! backed by the services in `labelscan-core`.

pub mod error;
pub mod handlers;
pub mod origin;
pub mod server;

pub use error::ApiError;
pub use origin::OriginPolicy;
pub use server::{build_router, start_server, AppState};
