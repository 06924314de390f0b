//! Reqwest-backed Firestore employee store.
//!
//! This adapter owns transport details only: document encoding, bearer
//! authorisation, paging through list results, and HTTP error mapping.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};

use super::dto::{DocumentDto, ListDocumentsDto, WriteDocumentDto};
use crate::domain::ports::{EmployeeStore, EmployeeStoreError};
use crate::domain::{DocumentId, EmployeeRecord, StoredEmployee};
use crate::outbound::{AdapterBuildError, IdToken, status_message};

/// Public Firestore REST endpoint.
pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";

const USER_AGENT: &str = concat!("employee-directory/", env!("CARGO_PKG_VERSION"));

/// Employee store backed by one Firestore collection.
#[derive(Debug)]
pub struct FirestoreEmployeeStore {
    client: Client,
    collection_url: Url,
    id_token: Option<IdToken>,
}

impl FirestoreEmployeeStore {
    /// Build an adapter for `collection` in the default database of
    /// `project_id`.
    ///
    /// # Errors
    ///
    /// Returns an error when `base_url` cannot carry a path or the reqwest
    /// client cannot be constructed.
    pub fn new(base_url: &Url, project_id: &str, collection: &str) -> Result<Self, AdapterBuildError> {
        let collection_url = collection_url(base_url, project_id, collection)?;
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            collection_url,
            id_token: None,
        })
    }

    /// Authorise requests with the signed-in user's ID token when one is set.
    #[must_use]
    pub fn with_id_token(mut self, id_token: IdToken) -> Self {
        self.id_token = Some(id_token);
        self
    }

    /// Collection endpoint requests are sent to.
    #[must_use]
    pub fn collection_url(&self) -> &Url {
        &self.collection_url
    }

    fn authorise(&self, request: RequestBuilder) -> RequestBuilder {
        match self.id_token.as_ref().and_then(IdToken::get) {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, EmployeeStoreError> {
        let response = self
            .authorise(request)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl EmployeeStore for FirestoreEmployeeStore {
    async fn list(&self) -> Result<Vec<StoredEmployee>, EmployeeStoreError> {
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.client.get(self.collection_url.clone());
            if let Some(token) = page_token.as_deref() {
                request = request.query(&[("pageToken", token)]);
            }
            let body = self.send(request).await?;
            let (page, next) = parse_list_page(&body)?;
            records.extend(page);
            match next {
                Some(token) => page_token = Some(token),
                None => return Ok(records),
            }
        }
    }

    async fn insert(&self, record: &EmployeeRecord) -> Result<DocumentId, EmployeeStoreError> {
        let request = self
            .client
            .post(self.collection_url.clone())
            .json(&WriteDocumentDto::from_record(record));
        let body = self.send(request).await?;
        parse_created_id(&body)
    }
}

fn collection_url(
    base_url: &Url,
    project_id: &str,
    collection: &str,
) -> Result<Url, AdapterBuildError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|()| AdapterBuildError::InvalidBaseUrl {
            url: base_url.to_string(),
        })?
        .pop_if_empty()
        .extend([
            "v1",
            "projects",
            project_id,
            "databases",
            "(default)",
            "documents",
            collection,
        ]);
    Ok(url)
}

fn parse_list_page(
    body: &[u8],
) -> Result<(Vec<StoredEmployee>, Option<String>), EmployeeStoreError> {
    let decoded: ListDocumentsDto = serde_json::from_slice(body).map_err(|error| {
        EmployeeStoreError::decode(format!("invalid Firestore list payload: {error}"))
    })?;
    Ok(decoded.into_page())
}

fn parse_created_id(body: &[u8]) -> Result<DocumentId, EmployeeStoreError> {
    let decoded: DocumentDto = serde_json::from_slice(body).map_err(|error| {
        EmployeeStoreError::decode(format!("invalid Firestore document payload: {error}"))
    })?;
    decoded.document_id().map_err(EmployeeStoreError::decode)
}

fn map_transport_error(error: reqwest::Error) -> EmployeeStoreError {
    EmployeeStoreError::unavailable(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> EmployeeStoreError {
    let message = status_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            EmployeeStoreError::unauthorized(message)
        }
        _ => EmployeeStoreError::unavailable(message),
    }
}
