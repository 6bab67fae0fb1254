use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use matchtrack_core::{JobStatus, LiveJobStatus};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use track_logging::{track_debug, track_trace};
use url::Url;

use crate::{FailureKind, HealthReport, ServiceError, SubmitRequest};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-request limit for the small status and health calls.
    pub request_timeout: Duration,
    /// Whole-request limit for uploads and result downloads, body included.
    pub transfer_timeout: Duration,
    pub max_download_bytes: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            transfer_timeout: Duration::from_secs(30 * 60),
            max_download_bytes: 512 * 1024 * 1024,
        }
    }
}

/// Remote matching service as seen by the tracker.
#[async_trait::async_trait]
pub trait MatchService: Send + Sync {
    async fn submit(&self, request: &SubmitRequest) -> Result<LiveJobStatus, ServiceError>;

    async fn status(&self, job_id: &str) -> Result<LiveJobStatus, ServiceError>;

    async fn download(&self, job_id: &str) -> Result<Bytes, ServiceError>;

    async fn health(&self) -> Result<HealthReport, ServiceError>;
}

/// Wire shape of a job status returned by the service.
#[derive(Debug, Deserialize)]
struct JobStatusBody {
    job_id: String,
    status: JobStatus,
    #[serde(default)]
    progress: f64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result_file: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    created_at: String,
}

impl From<JobStatusBody> for LiveJobStatus {
    fn from(body: JobStatusBody) -> Self {
        LiveJobStatus::new(
            body.job_id,
            body.status,
            body.progress,
            body.message,
            body.created_at,
            body.result_file,
            body.error,
        )
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
    #[serde(default)]
    jobs_active: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ReqwestMatchService {
    settings: ServiceSettings,
    client: reqwest::Client,
}

impl ReqwestMatchService {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        Url::parse(&settings.base_url)
            .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        let base = self.settings.base_url.trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
            .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn file_part(&self, file: &matchtrack_core::FileRef) -> Result<Part, ServiceError> {
        let bytes = tokio::fs::read(&file.path).await.map_err(|err| {
            ServiceError::new(
                FailureKind::LocalFile,
                format!("cannot read {}: {err}", file.path.display()),
            )
        })?;
        Ok(Part::bytes(bytes).file_name(file.name.clone()))
    }
}

#[async_trait::async_trait]
impl MatchService for ReqwestMatchService {
    async fn submit(&self, request: &SubmitRequest) -> Result<LiveJobStatus, ServiceError> {
        let url = self.endpoint("/api/match")?;
        let mut form = Form::new()
            .part("cbx_file", self.file_part(&request.cbx).await?)
            .part("hc_file", self.file_part(&request.hc).await?);
        if let Some(thresholds) = request.thresholds {
            form = form
                .text("min_company_ratio", thresholds.min_company_ratio.to_string())
                .text("min_address_ratio", thresholds.min_address_ratio.to_string());
        }

        track_debug!(
            "POST {} cbx={} hc={} thresholds={:?}",
            url,
            request.cbx.name,
            request.hc.name,
            request.thresholds
        );
        let response = self
            .client
            .post(url)
            .multipart(form)
            .timeout(self.settings.transfer_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: JobStatusBody = read_json(response, "Upload failed").await?;
        Ok(body.into())
    }

    async fn status(&self, job_id: &str) -> Result<LiveJobStatus, ServiceError> {
        let url = self.endpoint(&format!("/api/jobs/{job_id}"))?;
        track_trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: JobStatusBody = read_json(response, "Failed to fetch status").await?;
        Ok(body.into())
    }

    async fn download(&self, job_id: &str) -> Result<Bytes, ServiceError> {
        let url = self.endpoint(&format!("/api/jobs/{job_id}/download"))?;
        let response = self
            .client
            .get(url)
            .timeout(self.settings.transfer_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response, "Download failed").await?;

        let max_bytes = self.settings.max_download_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ServiceError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "result file too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ServiceError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "result file too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        track_debug!("Downloaded {} bytes for job {}", bytes.len(), job_id);
        Ok(Bytes::from(bytes))
    }

    async fn health(&self) -> Result<HealthReport, ServiceError> {
        let url = self.endpoint("/api/health")?;
        let response = self
            .client
            .get(url)
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: HealthBody = read_json(response, "Health check failed").await?;
        Ok(HealthReport {
            status: body.status,
            jobs_active: body.jobs_active,
        })
    }
}

/// Passes successful responses through; turns any other status into an error
/// carrying the server `detail` when there is one.
async fn ensure_success(
    response: reqwest::Response,
    fallback: &str,
) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.unwrap_or_default();
    let message = error_detail(&body).unwrap_or_else(|| fallback.to_string());
    Err(ServiceError::new(
        FailureKind::HttpStatus(status.as_u16()),
        message,
    ))
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> Result<T, ServiceError> {
    let response = ensure_success(response, fallback).await?;
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body).map_err(|err| {
        ServiceError::new(
            FailureKind::MalformedResponse,
            format!("malformed response: {err}"),
        )
    })
}

fn error_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(text) if !text.is_empty() => Some(text),
        serde_json::Value::Null | serde_json::Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, err.to_string());
    }
    ServiceError::new(FailureKind::Network, err.to_string())
}
