use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use taskboard_shared::{Task, TaskId};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::FetchError;

const COLLECTION_SEGMENT: &str = "todos";

/// CRUD surface of the remote todo service.
///
/// Every call is one round trip. Implementations never touch local state;
/// [`crate::store::TaskStore`] decides what to do with the answers.
#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>, FetchError>;

    /// Sends a full task body. The service may overwrite `id`.
    async fn create(&self, task: &Task) -> Result<Task, FetchError>;

    async fn update(&self, id: &TaskId, task: &Task) -> Result<Task, FetchError>;

    async fn delete(&self, id: &TaskId) -> Result<(), FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpTodoApi {
    client: reqwest::Client,
    collection: Url,
}

impl HttpTodoApi {
    /// `timeout` bounds each request; `None` leaves it to the service.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut collection = Url::parse(base_url.trim())
            .with_context(|| format!("invalid todo service URL: {base_url}"))?;
        collection
            .path_segments_mut()
            .map_err(|()| anyhow!("todo service URL cannot be a base: {base_url}"))?
            .pop_if_empty()
            .push(COLLECTION_SEGMENT);

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .context("failed building HTTP client for todo service")?;

        debug!(collection = %collection, ?timeout, "todo service client ready");
        Ok(Self { client, collection })
    }

    pub fn collection_url(&self) -> &Url {
        &self.collection
    }

    fn item_url(&self, id: &TaskId) -> Result<Url, FetchError> {
        let mut url = self.collection.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::Url(id.to_string()))?
            .push(&id.to_string());
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Task>,
    ) -> Result<Response, FetchError> {
        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(task) = body {
            request = request.json(task);
        }

        let response = request.send().await.map_err(|source| {
            warn!(%method, url = %url, error = %source, "todo service request failed");
            FetchError::Transport {
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%method, url = %url, status = status.as_u16(), "todo service rejected request");
            return Err(FetchError::Status {
                method: method_name(&method),
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        debug!(%method, url = %url, status = status.as_u16(), "todo service answered");
        Ok(response)
    }
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    #[instrument(skip(self), fields(url = %self.collection))]
    async fn list(&self) -> Result<Vec<Task>, FetchError> {
        let response = self.send(Method::GET, self.collection.clone(), None).await?;
        read_json(&self.collection, response).await
    }

    #[instrument(skip(self, task), fields(url = %self.collection))]
    async fn create(&self, task: &Task) -> Result<Task, FetchError> {
        let response = self
            .send(Method::POST, self.collection.clone(), Some(task))
            .await?;
        read_json(&self.collection, response).await
    }

    #[instrument(skip(self, id, task), fields(id = %id))]
    async fn update(&self, id: &TaskId, task: &Task) -> Result<Task, FetchError> {
        let url = self.item_url(id)?;
        let response = self.send(Method::PUT, url.clone(), Some(task)).await?;
        read_json(&url, response).await
    }

    #[instrument(skip(self, id), fields(id = %id))]
    async fn delete(&self, id: &TaskId) -> Result<(), FetchError> {
        let url = self.item_url(id)?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T, FetchError> {
    let body = response
        .bytes()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    serde_json::from_slice(&body).map_err(|source| {
        warn!(url = %url, error = %source, "todo service body did not decode");
        FetchError::Decode {
            url: url.to_string(),
            source,
        }
    })
}

fn method_name(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        _ => "REQUEST",
    }
}
