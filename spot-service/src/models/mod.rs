pub mod spot;

pub use spot::{
    bson_to_json, parse_spot_id, DeleteResponse, DeleteResult, InsertResult, Spot,
};
