use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{
    domain::{ApplicationKey, JobId, ProfileId},
    error::ApiError,
    protocol::{ApplicationRecord, JobRecord, StatusUpdateRequest},
};
use tracing::{debug, warn};
use url::Url;

use crate::{credential::Credential, error::ClientError, media::Blob};

/// Backend calls the recruiter review workflow depends on.
#[async_trait]
pub trait RecruiterApi: Send + Sync {
    async fn list_owned_jobs(&self, credential: &Credential) -> Result<Vec<JobRecord>, ClientError>;
    async fn list_job_applications(
        &self,
        job_id: JobId,
        credential: &Credential,
    ) -> Result<Vec<ApplicationRecord>, ClientError>;
    async fn fetch_profile_picture(
        &self,
        profile_id: ProfileId,
        credential: &Credential,
    ) -> Result<Blob, ClientError>;
    async fn fetch_resume(
        &self,
        profile_id: ProfileId,
        credential: &Credential,
    ) -> Result<Blob, ClientError>;
    async fn update_application_status(
        &self,
        key: ApplicationKey,
        request: &StatusUpdateRequest,
        credential: &Credential,
    ) -> Result<(), ClientError>;
}

#[derive(Clone, Debug)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|e| ClientError::Validation(format!("invalid api base url '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Validation(format!(
                "api base url must be http(s), got '{}'",
                parsed.scheme()
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::transport("client setup", e))?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, credential: Option<&Credential>) -> RequestBuilder {
        let request = self.http.request(method, format!("{}{path}", self.base_url));
        match credential {
            Some(credential) => credential.authorize(request),
            None => request,
        }
    }

    pub(crate) async fn call(
        &self,
        method: Method,
        path: &str,
        credential: Option<&Credential>,
        prepare: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response, ClientError> {
        let endpoint = format!("{method} {path}");
        debug!(endpoint = %endpoint, "http: sending request");
        let response = prepare(self.request(method, path, credential))
            .send()
            .await
            .map_err(|e| ClientError::transport(&endpoint, e))?;
        expect_success(&endpoint, response).await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: Option<&Credential>,
    ) -> Result<T, ClientError> {
        let response = self.call(Method::GET, path, credential, |r| r).await?;
        decode_json(&format!("GET {path}"), response).await
    }

    /// Lists tolerate individual records that fail to decode; a body that is not an array is an error.
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: Option<&Credential>,
    ) -> Result<Vec<T>, ClientError> {
        let endpoint = format!("GET {path}");
        let response = self.call(Method::GET, path, credential, |r| r).await?;
        let body: Value = decode_json(&endpoint, response).await?;
        decode_list(&endpoint, body)
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        credential: Option<&Credential>,
        body: &B,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let endpoint = format!("{method} {path}");
        let response = self.call(method, path, credential, |r| r.json(body)).await?;
        decode_json(&endpoint, response).await
    }

    pub(crate) async fn get_blob(&self, path: &str, credential: &Credential) -> Result<Blob, ClientError> {
        let endpoint = format!("GET {path}");
        let response = self.call(Method::GET, path, Some(credential), |r| r).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::transport(&endpoint, e))?;

        let is_json_null = content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/json"))
            && bytes.trim_ascii() == b"null";
        if bytes.is_empty() || is_json_null {
            return Err(ClientError::NotFound { endpoint });
        }

        Ok(Blob::new(bytes.to_vec(), content_type))
    }
}

#[async_trait]
impl RecruiterApi for HttpBackend {
    async fn list_owned_jobs(&self, credential: &Credential) -> Result<Vec<JobRecord>, ClientError> {
        self.get_list("/jobs/me", Some(credential)).await
    }

    async fn list_job_applications(
        &self,
        job_id: JobId,
        credential: &Credential,
    ) -> Result<Vec<ApplicationRecord>, ClientError> {
        self.get_list(&format!("/applications/{job_id}"), Some(credential))
            .await
    }

    async fn fetch_profile_picture(
        &self,
        profile_id: ProfileId,
        credential: &Credential,
    ) -> Result<Blob, ClientError> {
        self.get_blob(
            &format!("/users/profile/{profile_id}/profile_picture"),
            credential,
        )
        .await
    }

    async fn fetch_resume(
        &self,
        profile_id: ProfileId,
        credential: &Credential,
    ) -> Result<Blob, ClientError> {
        self.get_blob(&format!("/users/profile/{profile_id}/resume"), credential)
            .await
    }

    async fn update_application_status(
        &self,
        key: ApplicationKey,
        request: &StatusUpdateRequest,
        credential: &Credential,
    ) -> Result<(), ClientError> {
        self.call(
            Method::PATCH,
            &format!("/applications/{}_{}/", key.job_id, key.profile_id),
            Some(credential),
            |r| r.json(request),
        )
        .await?;
        Ok(())
    }
}

async fn expect_success(endpoint: &str, response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let detail = ApiError::parse(&body);
    Err(match status {
        StatusCode::UNAUTHORIZED => ClientError::Auth {
            endpoint: endpoint.to_string(),
            detail,
        },
        StatusCode::NOT_FOUND => ClientError::NotFound {
            endpoint: endpoint.to_string(),
        },
        other => ClientError::Service {
            endpoint: endpoint.to_string(),
            status: Some(other.as_u16()),
            detail: detail.unwrap_or_else(|| {
                other
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            }),
        },
    })
}

pub(crate) async fn decode_json<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, ClientError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ClientError::transport(endpoint, e))?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::malformed(endpoint, e.to_string()))
}

pub(crate) fn decode_list<T: DeserializeOwned>(endpoint: &str, body: Value) -> Result<Vec<T>, ClientError> {
    let items = match body {
        Value::Array(items) => items,
        other => {
            return Err(ClientError::malformed(
                endpoint,
                format!("expected a JSON array, got {}", json_kind(&other)),
            ));
        }
    };

    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(endpoint, index, error = %err, "http: skipping undecodable record");
                None
            }
        })
        .collect();

    if decoded.len() != total {
        debug!(endpoint, kept = decoded.len(), total, "http: partial list decoded");
    }
    Ok(decoded)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
