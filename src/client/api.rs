use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::form::OrphanageDraft;
use super::geocoding::with_trailing_slash;
use super::{ApiErrorBody, ClientError, Orphanage};

/// HTTP client for the orphanages API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: Client::new(),
            base_url: with_trailing_slash(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /orphanages` with the draft as `multipart/form-data`.
    pub async fn create_orphanage(&self, draft: &OrphanageDraft) -> Result<Orphanage, ClientError> {
        let url = self.base_url.join("orphanages")?;
        let response = self
            .http
            .post(url)
            .multipart(draft.to_multipart()?)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn list_orphanages(&self) -> Result<Vec<Orphanage>, ClientError> {
        let url = self.base_url.join("orphanages")?;
        decode(self.http.get(url).send().await?).await
    }

    pub async fn get_orphanage(&self, id: i32) -> Result<Orphanage, ClientError> {
        let url = self.base_url.join(&format!("orphanages/{}", id))?;
        decode(self.http.get(url).send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response
        .json::<ApiErrorBody>()
        .await
        .unwrap_or_else(|_| ApiErrorBody {
            error: status
                .canonical_reason()
                .unwrap_or("Unexpected response")
                .to_string(),
            errors: Default::default(),
        });
    Err(ClientError::Api {
        status: status.as_u16(),
        body,
    })
}
