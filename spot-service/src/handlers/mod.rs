pub mod health;
pub mod spots;

pub use health::{health_check, index, metrics_endpoint, readiness_check};
pub use spots::{create_spot, delete_spot, get_spot, list_spots};
