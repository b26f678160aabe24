use crate::models::{parse_spot_id, DeleteResponse, InsertResult, Spot};
use crate::services::record_store_operation;
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, Path, Request, State},
    http::header,
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde_json::{Map, Value};
use service_core::error::AppError;

pub async fn create_spot(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<InsertResult>, AppError> {
    let fields = read_spot_fields(request).await?;
    let spot = Spot::from_json(fields).map_err(invalid_document)?;

    let result = state.store.insert(spot).await;
    record_store_operation("insert", &result);
    let result = result.map_err(|e| AppError::database("Error adding spot", e))?;

    tracing::info!(spot_id = %result.inserted_id, "Spot created");
    Ok(Json(result))
}

pub async fn list_spots(State(state): State<AppState>) -> Result<Json<Vec<Spot>>, AppError> {
    let result = state.store.list().await;
    record_store_operation("list", &result);
    let spots = result.map_err(|e| AppError::database("Error retrieving spots", e))?;

    Ok(Json(spots))
}

pub async fn get_spot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Spot>, AppError> {
    let id = spot_id(&id)?;

    let result = state.store.find_by_id(&id).await;
    record_store_operation("find_one", &result);

    result
        .map_err(|e| AppError::database("Error retrieving spot", e))?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Spot not found".to_string()))
}

pub async fn delete_spot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = spot_id(&id)?;

    let result = state.store.delete_by_id(&id).await;
    record_store_operation("delete_one", &result);
    let result = result.map_err(|e| AppError::database("Error deleting spot", e))?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound("No spot found to delete".to_string()));
    }

    tracing::info!(spot_id = %id, "Spot deleted");
    Ok(Json(DeleteResponse {
        message: "Entry has been deleted",
        result,
    }))
}

/// Reads the create body. A typed body must be JSON; an untyped one is
/// parsed as JSON when present and treated as `{}` when empty.
async fn read_spot_fields(request: Request) -> Result<Map<String, Value>, AppError> {
    if request.headers().contains_key(header::CONTENT_TYPE) {
        let Json(fields) = Json::<Map<String, Value>>::from_request(request, &())
            .await
            .map_err(|e: JsonRejection| invalid_document(anyhow::anyhow!(e.body_text())))?;
        return Ok(fields);
    }

    let body = Bytes::from_request(request, &())
        .await
        .map_err(|e| invalid_document(anyhow::anyhow!(e.body_text())))?;
    if body.is_empty() {
        return Ok(Map::new());
    }
    serde_json::from_slice(&body).map_err(invalid_document)
}

fn invalid_document(source: impl Into<anyhow::Error>) -> AppError {
    AppError::bad_request("Invalid spot document", source)
}

fn spot_id(raw: &str) -> Result<ObjectId, AppError> {
    parse_spot_id(raw).map_err(|e| AppError::bad_request("Invalid spot id", e))
}
