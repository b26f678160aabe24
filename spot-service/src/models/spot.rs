use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// A tourist spot: whatever fields the caller submitted plus the
/// store-assigned `_id`. No schema is enforced.
#[derive(Debug, Clone, PartialEq)]
pub struct Spot(Document);

impl Spot {
    /// Converts a JSON object into a spot. Extended JSON wrappers such as
    /// `{"$oid": ...}` or `{"$date": ...}` become their BSON types.
    pub fn from_json(fields: Map<String, Value>) -> Result<Self, anyhow::Error> {
        match Bson::try_from(Value::Object(fields)) {
            Ok(Bson::Document(document)) => Ok(Spot(document)),
            Ok(other) => Err(anyhow::anyhow!(
                "expected a JSON object, got {:?}",
                other.element_type()
            )),
            Err(e) => Err(anyhow::anyhow!("{}", e)),
        }
    }

    pub fn id(&self) -> Option<&Bson> {
        self.0.get("_id")
    }

    pub fn has_id(&self, id: &ObjectId) -> bool {
        matches!(self.id(), Some(Bson::ObjectId(oid)) if oid == id)
    }

    /// Stamps a fresh ObjectId when the caller supplied no `_id`, keeping
    /// `_id` as the first field the way the server stores it.
    pub fn with_generated_id(self) -> Self {
        if self.0.contains_key("_id") {
            return self;
        }
        let mut document = doc! { "_id": ObjectId::new() };
        document.extend(self.0);
        Spot(document)
    }

    pub fn document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}

impl From<Document> for Spot {
    fn from(document: Document) -> Self {
        Spot(document)
    }
}

impl Serialize for Spot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        document_to_json(&self.0).serialize(serializer)
    }
}

/// Result of a create, shaped like the driver's insert acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    #[serde(serialize_with = "serialize_bson")]
    pub inserted_id: Bson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
    pub result: DeleteResult,
}

pub fn parse_spot_id(raw: &str) -> Result<ObjectId, mongodb::bson::oid::Error> {
    ObjectId::parse_str(raw)
}

/// Renders BSON for API clients: ObjectIds as hex strings, datetimes as
/// RFC 3339, everything else as relaxed extended JSON.
pub fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or_else(|_| Value::from(dt.timestamp_millis())),
        Bson::Document(document) => document_to_json(document),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        other => other.clone().into_relaxed_extjson(),
    }
}

fn document_to_json(document: &Document) -> Value {
    Value::Object(
        document
            .iter()
            .map(|(key, value)| (key.clone(), bson_to_json(value)))
            .collect(),
    )
}

fn serialize_bson<S: Serializer>(value: &Bson, serializer: S) -> Result<S::Ok, S::Error> {
    bson_to_json(value).serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test input must be an object"),
        }
    }

    #[test]
    fn keeps_submitted_fields_and_types() {
        let spot = Spot::from_json(object(json!({
            "name": "Eiffel Tower",
            "visitors": 7000000,
            "rating": 4.7,
            "open": true,
            "closedOn": null,
            "tags": ["landmark", "iron"],
            "location": { "city": "Paris", "lat": 48.8584 }
        })))
        .expect("valid object");

        let rendered = serde_json::to_value(&spot).unwrap();
        assert_eq!(rendered["name"], "Eiffel Tower");
        assert_eq!(rendered["visitors"], 7000000);
        assert_eq!(rendered["rating"], 4.7);
        assert_eq!(rendered["open"], true);
        assert_eq!(rendered["closedOn"], Value::Null);
        assert_eq!(rendered["tags"], json!(["landmark", "iron"]));
        assert_eq!(rendered["location"]["city"], "Paris");
    }

    #[test]
    fn generated_id_comes_first_and_renders_as_hex() {
        let spot = Spot::from_json(object(json!({ "name": "Petra" })))
            .unwrap()
            .with_generated_id();

        let (first_key, first_value) = spot.document().iter().next().unwrap();
        assert_eq!(first_key, "_id");
        let oid = first_value.as_object_id().expect("generated ObjectId");
        assert!(spot.has_id(&oid));

        let rendered = serde_json::to_value(&spot).unwrap();
        assert_eq!(rendered["_id"], oid.to_hex());
    }

    #[test]
    fn existing_id_is_not_replaced() {
        let spot = Spot::from_json(object(json!({ "_id": "custom", "name": "Petra" })))
            .unwrap()
            .with_generated_id();
        assert_eq!(spot.id(), Some(&Bson::String("custom".to_string())));
    }

    #[test]
    fn top_level_extended_json_value_is_rejected() {
        let result = Spot::from_json(object(json!({ "$oid": "507f1f77bcf86cd799439011" })));
        assert!(result.is_err());
    }

    #[test]
    fn parses_only_24_char_hex_ids() {
        assert!(parse_spot_id("507f1f77bcf86cd799439011").is_ok());
        assert!(parse_spot_id("not-an-id").is_err());
        assert!(parse_spot_id("507f1f77bcf86cd79943901").is_err());
    }

    #[test]
    fn insert_and_delete_results_use_driver_field_names() {
        let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        let inserted = InsertResult {
            acknowledged: true,
            inserted_id: Bson::ObjectId(oid),
        };
        assert_eq!(
            serde_json::to_value(&inserted).unwrap(),
            json!({ "acknowledged": true, "insertedId": "507f1f77bcf86cd799439011" })
        );

        let response = DeleteResponse {
            message: "Entry has been deleted",
            result: DeleteResult {
                acknowledged: true,
                deleted_count: 1,
            },
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "message": "Entry has been deleted",
                "result": { "acknowledged": true, "deletedCount": 1 }
            })
        );
    }
}
