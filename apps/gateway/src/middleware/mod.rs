// [apps/gateway/src/middleware/mod.rs]
//! Axum middleware: the admission pipeline (IP block -> rate limit ->
//! handler -> request log) and the bearer-token auth guard.

pub mod admission;
pub mod auth_guard;
