//! Firestore REST backend.
//!
//! Talks to the Firestore v1 REST API (`runQuery`, `commit`,
//! `listCollectionIds` and the documents list endpoint). The CLI is
//! synchronous, so the store owns a private tokio runtime and blocks on
//! each round trip. Auth is a bearer token the environment already has;
//! against the emulator (`FIRESTORE_EMULATOR_HOST`) no token is sent.

use serde_json::{json, Value as Json};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::path::StorePath;
use crate::query::Operator;
use crate::store::{
    wire, DocumentPage, DocumentStore, StoreError, StoreQuery, StoredDocument, WriteBatch,
    WriteOp, LIST_PAGE_SIZE,
};

/// Connection settings for [`FirestoreStore::connect`].
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database_id: String,
    /// OAuth2 bearer token; `None` only against the emulator.
    pub access_token: Option<String>,
    /// Emulator `host:port`; switches the base URL to plain HTTP.
    pub emulator_host: Option<String>,
}

/// A `DocumentStore` backed by the Firestore REST API.
pub struct FirestoreStore {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    base_url: String,
    /// `projects/{project}/databases/{db}/documents`
    root: String,
    token: Option<String>,
}

impl FirestoreStore {
    /// Build a client for the configured project and database.
    pub fn connect(config: &FirestoreConfig) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Runtime::new().map_err(|e| StoreError::Transport {
            message: format!("failed to start async runtime: {e}"),
        })?;

        let base_url = match &config.emulator_host {
            Some(host) => format!("http://{host}/v1"),
            None => "https://firestore.googleapis.com/v1".to_string(),
        };
        let root = format!(
            "projects/{}/databases/{}/documents",
            config.project_id, config.database_id
        );

        Ok(Self {
            client: reqwest::Client::new(),
            runtime,
            base_url,
            root,
            token: config.access_token.clone(),
        })
    }

    /// Full resource name of a document or collection path.
    fn name(&self, path: &StorePath) -> String {
        format!("{}/{path}", self.root)
    }

    /// Resource name of the parent of a collection path: the enclosing
    /// document, or the database root for a top-level collection.
    fn parent_name(&self, collection: &StorePath) -> String {
        match collection.parent() {
            Some(parent) => self.name(&parent),
            None => self.root.clone(),
        }
    }

    fn post(&self, url: &str, body: &Json) -> Result<Json, StoreError> {
        self.runtime.block_on(async {
            let mut request = self.client.post(url).json(body);
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
            let response = request.send().await?;
            Self::into_json(response).await
        })
    }

    fn get_url(&self, url: &str, params: &[(&str, &str)]) -> Result<Json, StoreError> {
        self.runtime.block_on(async {
            let mut request = self.client.get(url).query(params);
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
            let response = request.send().await?;
            Self::into_json(response).await
        })
    }

    async fn into_json(response: reqwest::Response) -> Result<Json, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body: Json = response.json().await.unwrap_or(Json::Null);
        let message = body
            .pointer("/error/message")
            .and_then(Json::as_str)
            .unwrap_or("no error details")
            .to_string();
        let grpc_status = body
            .pointer("/error/status")
            .and_then(Json::as_str)
            .unwrap_or_default()
            .to_string();
        debug!(%status, grpc_status, "store request failed");

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(StoreError::Auth { message });
        }
        if status == reqwest::StatusCode::NOT_FOUND || grpc_status == "NOT_FOUND" {
            return Err(StoreError::NotFound { path: message });
        }
        Err(StoreError::InvalidResponse {
            message: format!("{status}: {message}"),
        })
    }

    fn write_to_wire(&self, op: &WriteOp) -> Json {
        match op {
            WriteOp::Set {
                doc,
                fields,
                merge,
                stamp_field,
            } => {
                let mut write = json!({
                    "update": {
                        "name": self.name(doc),
                        "fields": wire::fields_to_wire(fields, &self.root),
                    }
                });
                if *merge {
                    write["updateMask"] = field_mask(fields.keys());
                }
                if let Some(stamp) = stamp_field {
                    write["updateTransforms"] = server_time_transform(stamp);
                }
                write
            }
            WriteOp::Update {
                doc,
                fields,
                stamp_field,
            } => {
                let mut write = json!({
                    "update": {
                        "name": self.name(doc),
                        "fields": wire::fields_to_wire(fields, &self.root),
                    },
                    "updateMask": field_mask(fields.keys()),
                    "currentDocument": { "exists": true },
                });
                if let Some(stamp) = stamp_field {
                    write["updateTransforms"] = server_time_transform(stamp);
                }
                write
            }
            WriteOp::Delete { doc } => json!({ "delete": self.name(doc) }),
        }
    }
}

fn field_mask<'a>(keys: impl Iterator<Item = &'a String>) -> Json {
    let paths: Vec<&str> = keys.map(String::as_str).collect();
    json!({ "fieldPaths": paths })
}

fn server_time_transform(field: &str) -> Json {
    json!([{ "fieldPath": field, "setToServerValue": "REQUEST_TIME" }])
}

const fn wire_operator(op: Operator) -> &'static str {
    match op {
        Operator::Eq => "EQUAL",
        Operator::Neq => "NOT_EQUAL",
        Operator::Lt => "LESS_THAN",
        Operator::Lte => "LESS_THAN_OR_EQUAL",
        Operator::Gt => "GREATER_THAN",
        Operator::Gte => "GREATER_THAN_OR_EQUAL",
        Operator::ArrayContains => "ARRAY_CONTAINS",
        Operator::ArrayContainsAny => "ARRAY_CONTAINS_ANY",
        Operator::In => "IN",
    }
}

impl DocumentStore for FirestoreStore {
    fn run_query(
        &self,
        collection: &StorePath,
        query: &StoreQuery,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let mut structured = json!({
            "from": [{ "collectionId": collection.last() }],
        });

        let filters: Vec<Json> = query
            .conditions
            .iter()
            .map(|cond| {
                json!({
                    "fieldFilter": {
                        "field": { "fieldPath": cond.field },
                        "op": wire_operator(cond.op),
                        "value": wire::to_wire(&cond.value, &self.root),
                    }
                })
            })
            .collect();
        match filters.len() {
            0 => {}
            1 => structured["where"] = filters.into_iter().next().unwrap_or_default(),
            _ => {
                structured["where"] = json!({
                    "compositeFilter": { "op": "AND", "filters": filters }
                });
            }
        }
        if let Some(order_by) = &query.order_by {
            structured["orderBy"] =
                json!([{ "field": { "fieldPath": order_by }, "direction": "ASCENDING" }]);
        }
        if let Some(limit) = query.limit {
            structured["limit"] = json!(limit);
        }

        let url = format!("{}/{}:runQuery", self.base_url, self.parent_name(collection));
        let response = self.post(&url, &json!({ "structuredQuery": structured }))?;

        let entries = response.as_array().cloned().unwrap_or_default();
        let mut documents = Vec::new();
        for entry in &entries {
            // trailing entries carry only readTime
            let Some(doc) = entry.get("document") else {
                continue;
            };
            let name = doc
                .get("name")
                .and_then(Json::as_str)
                .ok_or_else(|| StoreError::InvalidResponse {
                    message: "query result document has no name".to_string(),
                })?;
            let id = name.rsplit('/').next().unwrap_or_default().to_string();
            let fields = wire::fields_from_wire(doc.get("fields"), &self.root)?;
            documents.push(StoredDocument { id, fields });
        }
        Ok(documents)
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let writes: Vec<Json> = batch
            .writes()
            .iter()
            .map(|op| self.write_to_wire(op))
            .collect();
        let url = format!("{}/{}:commit", self.base_url, self.root);
        self.post(&url, &json!({ "writes": writes }))?;
        Ok(())
    }

    fn list_collection_ids(
        &self,
        parent: Option<&StorePath>,
    ) -> Result<Vec<String>, StoreError> {
        let parent_name = parent.map_or(self.root.clone(), |p| self.name(p));
        let url = format!("{}/{parent_name}:listCollectionIds", self.base_url);

        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut body = json!({ "pageSize": LIST_PAGE_SIZE });
            if let Some(token) = &page_token {
                body["pageToken"] = json!(token);
            }
            let response = self.post(&url, &body)?;

            for entry in response
                .get("collectionIds")
                .and_then(Json::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default()
            {
                match entry.as_str() {
                    Some(id) if !id.is_empty() => ids.push(id.to_string()),
                    _ => warn!(?entry, "skipping undecodable collection id"),
                }
            }

            page_token = response
                .get("nextPageToken")
                .and_then(Json::as_str)
                .filter(|t| !t.is_empty())
                .map(String::from);
            if page_token.is_none() {
                break;
            }
        }
        Ok(ids)
    }

    fn list_document_ids(
        &self,
        collection: &StorePath,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<DocumentPage, StoreError> {
        let url = format!("{}/{}", self.base_url, self.name(collection));
        let size = page_size.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("pageSize", size.as_str()),
            // names only; skip payloads we are about to delete anyway
            ("mask.fieldPaths", "__name__"),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }
        let response = self.get_url(&url, &params)?;

        let ids = response
            .get("documents")
            .and_then(Json::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter_map(|doc| doc.get("name").and_then(Json::as_str))
            .map(|name| name.rsplit('/').next().unwrap_or_default().to_string())
            .collect();
        let next_page_token = response
            .get("nextPageToken")
            .and_then(Json::as_str)
            .filter(|t| !t.is_empty())
            .map(String::from);

        Ok(DocumentPage {
            ids,
            next_page_token,
        })
    }

    fn generate_id(&self) -> String {
        // client-generated auto-id, so batched creates need no extra
        // round trip
        let hex = Uuid::new_v4().simple().to_string();
        hex[..20].to_string()
    }
}
