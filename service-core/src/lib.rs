//! service-core: Shared infrastructure for the Wander Quest services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;

