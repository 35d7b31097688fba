//! REST transport for the tag resource.

use crate::config::{AuthConfig, TuiConfig};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use std::sync::Arc;
use std::time::Duration;
use tagdeck_core::{Tag, TagId};
use tracing::{debug, warn};

/// Failure of a transport call.
///
/// Cloneable so a single failure can both settle a pending mutation and be
/// returned to the caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(Arc<reqwest::Error>),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Serialization error: {0}")]
    Serde(Arc<serde_json::Error>),
    #[error("Tag id is required to {0}")]
    MissingId(&'static str),
    #[error("Tag already has id '{0}'; only new tags can be created")]
    UnexpectedId(TagId),
    #[error("Config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(Arc::new(err))
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(Arc::new(err))
    }
}

impl TransportError {
    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// The five operations of the remote tag resource.
#[async_trait]
pub trait TagTransport: Send + Sync {
    async fn list_tags(&self) -> Result<Vec<Tag>, TransportError>;

    async fn get_tag(&self, id: &TagId) -> Result<Tag, TransportError>;

    /// `tag` must not carry an id; the server assigns one.
    async fn create_tag(&self, tag: &Tag) -> Result<Tag, TransportError>;

    async fn update_tag(&self, tag: &Tag) -> Result<Tag, TransportError>;

    /// Returns the deleted record as the server reports it.
    async fn delete_tag(&self, tag: &Tag) -> Result<Tag, TransportError>;
}

#[derive(Clone)]
pub struct TagClient {
    client: reqwest::Client,
    base_url: Url,
    auth_header: HeaderMap,
    latency: Duration,
}

impl TagClient {
    pub fn new(config: &TuiConfig) -> Result<Self, TransportError> {
        Self::with_options(
            &config.api_base_url,
            config.request_timeout(),
            config.latency(),
            &config.auth,
        )
    }

    pub fn with_options(
        base_url: &str,
        timeout: Duration,
        latency: Duration,
        auth: &AuthConfig,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| TransportError::Config(format!("invalid api_base_url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::Config(format!(
                "api_base_url '{base_url}' cannot hold item paths"
            )));
        }
        let auth_header = build_auth_headers(auth)?;
        Ok(Self {
            client,
            base_url,
            auth_header,
            latency,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn item_url(&self, id: &TagId) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::Config("api_base_url cannot hold item paths".into()))?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }

    async fn send_json<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Option<T>, TransportError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        debug!(%method, %url, "tag request");
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .headers(self.auth_header.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let result = match request.send().await {
            Ok(response) => self.parse_response(response).await,
            Err(err) => Err(err.into()),
        };
        match result {
            Ok(value) => {
                if !self.latency.is_zero() {
                    tokio::time::sleep(self.latency).await;
                }
                Ok(value)
            }
            Err(err) => {
                warn!(%method, %url, error = %err, "tag request failed");
                Err(err)
            }
        }
    }

    /// Decode a success body; an empty body decodes to `None`.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<T>, TransportError> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }

    async fn expect_body<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, TransportError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        self.send_json(method, url, body).await?.ok_or_else(|| {
            TransportError::Serde(Arc::new(<serde_json::Error as serde::de::Error>::custom(
                "expected a JSON body, got an empty response",
            )))
        })
    }
}

#[async_trait]
impl TagTransport for TagClient {
    async fn list_tags(&self) -> Result<Vec<Tag>, TransportError> {
        self.expect_body::<_, ()>(Method::GET, self.base_url.clone(), None)
            .await
    }

    async fn get_tag(&self, id: &TagId) -> Result<Tag, TransportError> {
        let url = self.item_url(id)?;
        self.expect_body::<_, ()>(Method::GET, url, None).await
    }

    async fn create_tag(&self, tag: &Tag) -> Result<Tag, TransportError> {
        if let Some(id) = &tag.id {
            return Err(TransportError::UnexpectedId(id.clone()));
        }
        self.expect_body(Method::POST, self.base_url.clone(), Some(tag))
            .await
    }

    async fn update_tag(&self, tag: &Tag) -> Result<Tag, TransportError> {
        let id = tag.id.as_ref().ok_or(TransportError::MissingId("update"))?;
        let url = self.item_url(id)?;
        self.expect_body(Method::PUT, url, Some(tag)).await
    }

    async fn delete_tag(&self, tag: &Tag) -> Result<Tag, TransportError> {
        let id = tag.id.as_ref().ok_or(TransportError::MissingId("delete"))?;
        let url = self.item_url(id)?;
        // Some servers answer a delete with 204 and no body.
        let deleted = self.send_json::<Tag, ()>(Method::DELETE, url, None).await?;
        Ok(deleted.unwrap_or_else(|| tag.clone()))
    }
}

fn build_auth_headers(auth: &AuthConfig) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::new();
    if let Some(api_key) = &auth.api_key {
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key).map_err(|e| TransportError::Config(e.to_string()))?,
        );
    }
    if let Some(jwt) = &auth.jwt {
        let value = format!("Bearer {}", jwt);
        headers.insert(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&value).map_err(|e| TransportError::Config(e.to_string()))?,
        );
    }
    Ok(headers)
}
