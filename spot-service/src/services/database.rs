use crate::config::MongoConfig;
use crate::models::{DeleteResult, InsertResult, Spot};
use crate::services::store::{SpotStore, StoreError};
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client as MongoClient, Collection, Database,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoSpotStore {
    client: MongoClient,
    db: Database,
    collection: String,
}

impl MongoSpotStore {
    /// Builds the client. The driver connects lazily, so callers should
    /// `ping` before serving traffic.
    pub async fn connect(config: &MongoConfig) -> Result<Self, AppError> {
        tracing::info!(database = %config.database, "Connecting to MongoDB");

        let mut options = ClientOptions::parse(&config.uri).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            AppError::from(e)
        })?;
        options.app_name = Some(config.app_name.clone());
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(&config.database);
        tracing::info!(database = %config.database, "MongoDB client ready");

        Ok(Self {
            client,
            db,
            collection: config.collection.clone(),
        })
    }

    pub fn spots(&self) -> Collection<Document> {
        self.db.collection(&self.collection)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl SpotStore for MongoSpotStore {
    async fn insert(&self, spot: Spot) -> Result<InsertResult, StoreError> {
        let result = self.spots().insert_one(spot.into_document(), None).await?;
        Ok(InsertResult {
            acknowledged: true,
            inserted_id: result.inserted_id,
        })
    }

    async fn list(&self) -> Result<Vec<Spot>, StoreError> {
        let cursor = self.spots().find(None, None).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Spot::from).collect())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Spot>, StoreError> {
        let found = self.spots().find_one(doc! { "_id": *id }, None).await?;
        Ok(found.map(Spot::from))
    }

    async fn delete_by_id(&self, id: &ObjectId) -> Result<DeleteResult, StoreError> {
        let result = self.spots().delete_one(doc! { "_id": *id }, None).await?;
        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB ping failed: {}", e);
                StoreError::from(e)
            })?;
        Ok(())
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}
