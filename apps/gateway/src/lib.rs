// [apps/gateway/src/lib.rs]
//! Sync orchestration and admin gateway: job control plane, multi-domain
//! sync engine, request admission pipeline, and auth substrate for an
//! Islamic content platform's backing services.

pub mod config;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod scheduler;
pub mod services;
pub mod state;

pub use config::AppConfig;
pub use state::AppState;
