//! Hosted GraphQL data API adapter for collection records.
//!
//! Implements the `CollectionStore` port against the managed GraphQL
//! endpoint generated for the `Collection` model:
//!
//! - `listCollections(filter, limit)` with an owner filter `user: { eq }`
//! - `createCollection(input)`
//! - `deleteCollection(input)`
//!
//! The `property` field is an `AWSJSON` scalar. It is sent as a
//! JSON-encoded string and may come back in either form, which
//! `CollectionProperty::name` already tolerates.
//!
//! # Example
//!
//! ```ignore
//! let config = AppSyncConfig::new(
//!     "https://example.appsync-api.eu-west-1.amazonaws.com/graphql",
//!     DataAuthorization::ApiKey(SecretString::new("da2-...".to_string())),
//! );
//! let store = AppSyncCollectionStore::new(config)?;
//! let collections = store.list(ListCollections::owned_by(user_id, 200)).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::collection::{Collection, NewCollection};
use crate::domain::foundation::CollectionId;
use crate::ports::{CollectionStore, ListCollections, StoreError};

const LIST_COLLECTIONS: &str = "query ListCollections($filter: ModelCollectionFilterInput, $limit: Int) {
  listCollections(filter: $filter, limit: $limit) {
    items { id user property createdAt }
    nextToken
  }
}";

const CREATE_COLLECTION: &str = "mutation CreateCollection($input: CreateCollectionInput!) {
  createCollection(input: $input) { id user property createdAt }
}";

const DELETE_COLLECTION: &str = "mutation DeleteCollection($input: DeleteCollectionInput!) {
  deleteCollection(input: $input) { id }
}";

/// How requests to the data API are authorized.
#[derive(Debug, Clone)]
pub enum DataAuthorization {
    /// Public API key, sent as `x-api-key`.
    ApiKey(SecretString),
    /// Identity token of the signed-in user, sent as `Authorization`.
    UserPoolToken(SecretString),
}

/// Configuration for the GraphQL data adapter.
#[derive(Debug, Clone)]
pub struct AppSyncConfig {
    /// GraphQL endpoint URL.
    pub endpoint: String,

    pub authorization: DataAuthorization,

    /// Request timeout. Defaults to 10 seconds.
    pub timeout: Option<Duration>,
}

impl AppSyncConfig {
    pub fn new(endpoint: impl Into<String>, authorization: DataAuthorization) -> Self {
        Self {
            endpoint: endpoint.into(),
            authorization,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// GraphQL request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct GraphQlRequest {
    query: &'static str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(default, rename = "errorType")]
    error_type: Option<String>,
}

impl GraphQlError {
    fn describe(&self) -> String {
        match &self.error_type {
            Some(kind) => format!("{}: {}", kind, self.message),
            None => self.message.clone(),
        }
    }

    fn is_conditional_check_failure(&self) -> bool {
        self.error_type
            .as_deref()
            .is_some_and(|kind| kind.ends_with("ConditionalCheckFailedException"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListCollectionsData {
    list_collections: Option<CollectionPage>,
}

#[derive(Debug, Deserialize)]
struct CollectionPage {
    #[serde(default)]
    items: Vec<Option<Collection>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCollectionData {
    create_collection: Option<Collection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteCollectionData {
    delete_collection: Option<DeletedCollection>,
}

#[derive(Debug, Deserialize)]
struct DeletedCollection {
    #[allow(dead_code)]
    id: CollectionId,
}

/// Collection store backed by the hosted GraphQL data API.
pub struct AppSyncCollectionStore {
    config: AppSyncConfig,
    http_client: reqwest::Client,
}

impl AppSyncCollectionStore {
    /// Creates the adapter. No request is made until the first call.
    pub fn new(config: AppSyncConfig) -> Result<Self, StoreError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout.unwrap_or(Duration::from_secs(10)))
            .build()
            .map_err(|e| StoreError::unavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: GraphQlRequest,
    ) -> Result<GraphQlResponse<T>, StoreError> {
        tracing::debug!(operation, endpoint = %self.config.endpoint, "Sending GraphQL request");

        let builder = self.http_client.post(&self.config.endpoint).json(&request);
        let builder = match &self.config.authorization {
            DataAuthorization::ApiKey(key) => builder.header("x-api-key", key.expose_secret()),
            DataAuthorization::UserPoolToken(token) => {
                builder.header(reqwest::header::AUTHORIZATION, token.expose_secret())
            }
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(operation, "GraphQL request failed: {}", e);
            StoreError::unavailable(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            tracing::warn!(operation, %status, "GraphQL request not authorized");
            return Err(StoreError::rejected(format!("{} returned {}", operation, status)));
        }
        if !status.is_success() {
            tracing::warn!(operation, %status, "GraphQL endpoint returned error status");
            return Err(StoreError::unavailable(format!("{} returned {}", operation, status)));
        }

        decode_response(&body)
    }
}

fn list_request(query: &ListCollections) -> GraphQlRequest {
    let filter = query
        .owner
        .as_ref()
        .map(|owner| json!({ "user": { "eq": owner.as_str() } }))
        .unwrap_or(Value::Null);

    GraphQlRequest {
        query: LIST_COLLECTIONS,
        variables: json!({ "filter": filter, "limit": query.limit }),
    }
}

fn create_request(collection: &NewCollection) -> GraphQlRequest {
    GraphQlRequest {
        query: CREATE_COLLECTION,
        variables: json!({
            "input": {
                "user": collection.user.as_str(),
                "property": collection.property.to_json_string(),
            }
        }),
    }
}

fn delete_request(id: &CollectionId) -> GraphQlRequest {
    GraphQlRequest {
        query: DELETE_COLLECTION,
        variables: json!({ "input": { "id": id.as_str() } }),
    }
}

fn decode_response<T: DeserializeOwned>(body: &str) -> Result<GraphQlResponse<T>, StoreError> {
    serde_json::from_str(body).map_err(|e| StoreError::Malformed(e.to_string()))
}

/// Fails on any GraphQL error, otherwise returns `data`.
fn into_data<T>(response: GraphQlResponse<T>) -> Result<T, StoreError> {
    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.iter().map(GraphQlError::describe).collect();
        return Err(StoreError::rejected(messages.join("; ")));
    }
    response
        .data
        .ok_or_else(|| StoreError::Malformed("response has neither data nor errors".to_string()))
}

#[async_trait]
impl CollectionStore for AppSyncCollectionStore {
    async fn list(&self, query: ListCollections) -> Result<Vec<Collection>, StoreError> {
        let response: GraphQlResponse<ListCollectionsData> =
            self.execute("listCollections", list_request(&query)).await?;
        let page = into_data(response)?
            .list_collections
            .ok_or_else(|| StoreError::Malformed("listCollections returned null".to_string()))?;

        // Items the resolver could not read come back as null entries.
        Ok(page.items.into_iter().flatten().collect())
    }

    async fn create(&self, collection: NewCollection) -> Result<Collection, StoreError> {
        let response: GraphQlResponse<CreateCollectionData> =
            self.execute("createCollection", create_request(&collection)).await?;
        into_data(response)?
            .create_collection
            .ok_or_else(|| StoreError::Malformed("createCollection returned null".to_string()))
    }

    async fn delete(&self, id: &CollectionId) -> Result<(), StoreError> {
        let response: GraphQlResponse<DeleteCollectionData> =
            self.execute("deleteCollection", delete_request(id)).await?;

        if response.errors.iter().any(GraphQlError::is_conditional_check_failure) {
            return Err(StoreError::NotFound(id.clone()));
        }
        match into_data(response)?.delete_collection {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id.clone())),
        }
    }
}
