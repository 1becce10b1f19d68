//! Row-store adapter for the hosted backend's table service.
//!
//! Speaks the `/rest/v1` table API: filters are `column=eq.value` query
//! parameters and inserts ask for the stored row back. Every request first
//! asks the backend for a current session, so an expired access token is
//! refreshed before it is sent.

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::backend::{BackendError, HostedBackend};
use crate::identity::domain::UserId;
use crate::task::{
    domain::{NewTask, Task, TaskId, TaskPatch},
    ports::{RowStoreError, RowStoreResult, TaskRowStore},
};

const TASKS_PATH: &str = "rest/v1/tasks";
const PREFER_REPRESENTATION: &str = "return=representation";
const PREFER_MINIMAL: &str = "return=minimal";

/// Row store backed by the hosted table service.
#[derive(Debug, Clone)]
pub struct RestTaskRowStore {
    backend: HostedBackend,
}

impl RestTaskRowStore {
    /// Creates an adapter sharing `backend` with the identity adapter.
    #[must_use]
    pub const fn new(backend: HostedBackend) -> Self {
        Self { backend }
    }

    fn tasks_url(&self) -> RowStoreResult<url::Url> {
        self.backend
            .endpoint(TASKS_PATH)
            .map_err(RowStoreError::persistence)
    }

    async fn send(&self, request: RequestBuilder) -> RowStoreResult<Vec<u8>> {
        self.backend
            .current_session()
            .await
            .map_err(map_backend_error)?;
        let response = self
            .backend
            .authorize(request)
            .send()
            .await
            .map_err(RowStoreError::persistence)?;

        let status = response.status();
        let body = response.bytes().await.map_err(RowStoreError::persistence)?;
        if !status.is_success() {
            return Err(map_backend_error(BackendError::from_status(
                status,
                body.as_ref(),
            )));
        }
        Ok(body.to_vec())
    }
}

fn id_filter(id: &TaskId) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}

fn decode_rows<T>(body: &[u8]) -> RowStoreResult<Vec<T>>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(body).map_err(|err| RowStoreError::Decode(err.to_string()))
}

fn map_backend_error(err: BackendError) -> RowStoreError {
    match err {
        BackendError::Rejected { status, message } => RowStoreError::Rejected { status, message },
        BackendError::Decode(message) => RowStoreError::Decode(message),
        other => RowStoreError::persistence(other),
    }
}

#[async_trait]
impl TaskRowStore for RestTaskRowStore {
    async fn select_by_owner(&self, owner: &UserId) -> RowStoreResult<Vec<Task>> {
        let request = self.backend.client().get(self.tasks_url()?).query(&[
            ("select", "*".to_owned()),
            ("created_by", format!("eq.{owner}")),
            ("order", "created_at.desc".to_owned()),
        ]);
        let body = self.send(request).await?;
        decode_rows(&body)
    }

    async fn insert(&self, task: &NewTask) -> RowStoreResult<Task> {
        let request = self
            .backend
            .client()
            .post(self.tasks_url()?)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&[task]);
        let body = self.send(request).await?;
        decode_rows::<Task>(&body)?
            .into_iter()
            .next()
            .ok_or(RowStoreError::MissingRow)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> RowStoreResult<()> {
        let request = self
            .backend
            .client()
            .patch(self.tasks_url()?)
            .query(&id_filter(id))
            .header("Prefer", PREFER_MINIMAL)
            .json(patch);
        self.send(request).await.map(|_| ())
    }

    async fn delete(&self, id: &TaskId) -> RowStoreResult<()> {
        let request = self
            .backend
            .client()
            .delete(self.tasks_url()?)
            .query(&id_filter(id))
            .header("Prefer", PREFER_MINIMAL);
        self.send(request).await.map(|_| ())
    }
}
