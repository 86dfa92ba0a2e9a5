//! Firestore REST v1 client implementing [`DocumentStore`].

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use stockroom_core::{Precondition, Revision};

use super::codec::{decode_document, encode_fields, encode_value, field_path};
use crate::config::FirestoreConfig;
use crate::store::{Document, DocumentStore, FieldFilter, Fields, StoreError, WriteMode};

/// Document store backed by one Firestore collection.
///
/// Revisions are the documents' `updateTime`; revision preconditions become
/// `currentDocument.updateTime`, existence preconditions
/// `currentDocument.exists`.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    http: Client,
    /// `.../v1/projects/{project}/databases/{database}/documents`
    documents_url: Url,
    collection: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl FirestoreStore {
    pub fn new(config: &FirestoreConfig, collection: impl Into<String>) -> Result<Self, StoreError> {
        let project = config
            .project
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("firestore project is not configured".to_string()))?;

        let mut documents_url = Url::parse(&config.base_url)
            .map_err(|e| StoreError::Unavailable(format!("invalid firestore base url: {e}")))?;
        documents_url
            .path_segments_mut()
            .map_err(|_| StoreError::Unavailable("firestore base url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v1", "projects", project, "databases", config.database.as_str(), "documents"]);

        Ok(Self {
            http: Client::new(),
            documents_url,
            collection: collection.into(),
            api_key: config.api_key.clone(),
        })
    }

    fn document_url(&self, key: &str) -> Url {
        let mut url = self.documents_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&self.collection).push(key);
        }
        url
    }

    fn run_query_url(&self) -> Url {
        let mut url = self.documents_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop().push("documents:runQuery");
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.api_key {
            Some(key) => builder.query(&[("key", key.as_str())]),
            None => builder,
        }
    }

    fn precondition_params(precondition: &Precondition) -> Vec<(&'static str, String)> {
        match precondition {
            Precondition::Any => vec![],
            Precondition::MustExist => vec![("currentDocument.exists", "true".to_string())],
            Precondition::MustNotExist => vec![("currentDocument.exists", "false".to_string())],
            Precondition::Revision(rev) => {
                vec![("currentDocument.updateTime", rev.as_str().to_string())]
            }
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, StoreError> {
        builder
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("request failed: {e}")))
    }

    /// Map a non-success response to a store error.
    async fn failure(response: Response, conditional: bool) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body).ok().map(|b| b.error);
        let grpc_status = detail.as_ref().map(|d| d.status.as_str()).unwrap_or("");
        let message = detail
            .as_ref()
            .map(|d| d.message.clone())
            .unwrap_or(body);

        let precondition_failed = grpc_status == "FAILED_PRECONDITION"
            || grpc_status == "ALREADY_EXISTS"
            || status == StatusCode::CONFLICT
            || status == StatusCode::PRECONDITION_FAILED
            || (conditional && status == StatusCode::NOT_FOUND);

        if precondition_failed {
            StoreError::PreconditionFailed(message)
        } else {
            StoreError::Unavailable(format!("{status}: {message}"))
        }
    }

    async fn json(response: Response) -> Result<JsonValue, StoreError> {
        response
            .json::<JsonValue>()
            .await
            .map_err(|e| StoreError::Codec(format!("invalid response body: {e}")))
    }
}

#[async_trait::async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, key: &str) -> Result<Option<Document>, StoreError> {
        tracing::debug!(key, "firestore get");
        let response = self
            .send(self.request(Method::GET, self.document_url(key)))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::failure(response, false).await);
        }
        decode_document(&Self::json(response).await?).map(Some)
    }

    async fn list(&self, filter: Option<&FieldFilter>) -> Result<Vec<Document>, StoreError> {
        tracing::debug!(filter = ?filter, "firestore runQuery");
        let mut query = json!({ "from": [{ "collectionId": self.collection }] });
        if let Some(f) = filter {
            query["where"] = json!({
                "fieldFilter": {
                    "field": { "fieldPath": field_path(&f.field) },
                    "op": "EQUAL",
                    "value": encode_value(&f.equals),
                }
            });
        }

        let response = self
            .send(
                self.request(Method::POST, self.run_query_url())
                    .json(&json!({ "structuredQuery": query })),
            )
            .await?;
        if !response.status().is_success() {
            return Err(Self::failure(response, false).await);
        }

        // One entry per result; entries without `document` only carry a readTime.
        let body = Self::json(response).await?;
        let entries = body
            .as_array()
            .ok_or_else(|| StoreError::Codec("runQuery response is not an array".to_string()))?;
        entries
            .iter()
            .filter_map(|entry| entry.get("document"))
            .map(decode_document)
            .collect()
    }

    async fn set(
        &self,
        key: &str,
        fields: Fields,
        mode: WriteMode,
        precondition: Precondition,
    ) -> Result<Revision, StoreError> {
        tracing::debug!(key, ?mode, ?precondition, "firestore patch");
        let mut params = Self::precondition_params(&precondition);
        if mode == WriteMode::Merge {
            params.extend(
                fields
                    .keys()
                    .map(|k| ("updateMask.fieldPaths", field_path(k))),
            );
        }

        let conditional = precondition != Precondition::Any;
        let response = self
            .send(
                self.request(Method::PATCH, self.document_url(key))
                    .query(&params)
                    .json(&json!({ "fields": encode_fields(&fields) })),
            )
            .await?;
        if !response.status().is_success() {
            return Err(Self::failure(response, conditional).await);
        }
        decode_document(&Self::json(response).await?).map(|doc| doc.revision)
    }

    async fn delete(&self, key: &str, precondition: Precondition) -> Result<(), StoreError> {
        tracing::debug!(key, ?precondition, "firestore delete");
        let conditional = precondition != Precondition::Any;
        let response = self
            .send(
                self.request(Method::DELETE, self.document_url(key))
                    .query(&Self::precondition_params(&precondition)),
            )
            .await?;
        if !response.status().is_success() {
            return Err(Self::failure(response, conditional).await);
        }
        Ok(())
    }
}
