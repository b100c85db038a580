// [apps/gateway/src/services/mod.rs]
//! Application service layer: auth, job control, prayer fan-out, the
//! per-domain sync implementations, and admin user management.

pub mod auth_service;
pub mod job_control;
pub mod prayer_fanout;
pub mod sync;
pub mod user_service;
