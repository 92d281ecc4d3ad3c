pub mod auth;
pub mod handlers;
pub mod middleware;
pub mod tasks;
pub mod tracing;
