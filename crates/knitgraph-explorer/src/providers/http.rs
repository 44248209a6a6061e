//! HTTP class metadata provider

use crate::error::ProviderError;
use crate::provider::ClassInfoProvider;
use crate::record::{BaseClasses, ClassRecord};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Talks to a metadata service exposing
/// `/api/base-classes`, `/api/class-info` and `/api/child-classes`.
pub struct HttpProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProvider {
    pub fn new(base_url: &str) -> Result<Self, ProviderError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ProviderError::Config("provider base_url is empty".into()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// GET a JSON body; `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        name: Option<&str>,
    ) -> Result<Option<T>, ProviderError> {
        let url = self.endpoint(path);
        let mut request = self.client.get(&url);
        if let Some(name) = name {
            request = request.query(&[("name", name)]);
        }

        debug!("GET {} name={:?}", url, name);
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let bytes = response.bytes().await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[async_trait::async_trait]
impl ClassInfoProvider for HttpProvider {
    async fn get_base_classes(&self) -> Result<BaseClasses, ProviderError> {
        let url = self.endpoint("base-classes");
        self.get_json::<BaseClasses>("base-classes", None)
            .await?
            .ok_or(ProviderError::Status { status: 404, url })
    }

    async fn get_class_info(&self, name: &str) -> Result<Option<ClassRecord>, ProviderError> {
        self.get_json("class-info", Some(name)).await
    }

    async fn get_child_classes(&self, name: &str) -> Result<Vec<ClassRecord>, ProviderError> {
        Ok(self
            .get_json::<Vec<ClassRecord>>("child-classes", Some(name))
            .await?
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "HTTP"
    }
}
