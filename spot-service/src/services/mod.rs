pub mod database;
pub mod metrics;
pub mod store;

pub use database::MongoSpotStore;
pub use self::metrics::record_store_operation;
pub use store::{InMemorySpotStore, SpotStore, StoreError};
