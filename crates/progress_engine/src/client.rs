use std::time::Duration;

use progress_core::{AnalysisRequest, JobId, ProgressReport};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use tracker_logging::tracker_trace;

use crate::wire::{check_submit_response, decode_progress, encode_analysis_request};
use crate::{FailureKind, PollError};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    /// Path of the start-analysis endpoint, relative to `base_url`.
    pub analyze_path: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// The start-analysis call may block until the job is done remotely.
    pub submit_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            analyze_path: "analyze".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            submit_timeout: Duration::from_secs(300),
        }
    }
}

/// The two remote contracts the tracker consumes.
#[async_trait::async_trait]
pub trait ProgressClient: Send + Sync {
    async fn submit_analysis(&self, request: &AnalysisRequest) -> Result<(), PollError>;

    async fn fetch_progress(&self, job_id: &JobId) -> Result<ProgressReport, PollError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestProgressClient {
    settings: ClientSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestProgressClient {
    pub fn new(settings: ClientSettings) -> Result<Self, PollError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| PollError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(PollError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, PollError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| PollError::new(FailureKind::InvalidUrl, "base url cannot be a base"))?
            .pop_if_empty()
            .extend(segments.into_iter().filter(|segment| !segment.is_empty()));
        Ok(url)
    }
}

#[async_trait::async_trait]
impl ProgressClient for ReqwestProgressClient {
    async fn submit_analysis(&self, request: &AnalysisRequest) -> Result<(), PollError> {
        let url = self.endpoint(self.settings.analyze_path.split('/'))?;
        let body = encode_analysis_request(request)?;
        tracker_trace!("POST {} job_id={}", url, request.job_id);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .timeout(self.settings.submit_timeout)
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        check_submit_response(&bytes)
    }

    async fn fetch_progress(&self, job_id: &JobId) -> Result<ProgressReport, PollError> {
        let url = self.endpoint(["progress", job_id.as_str()])?;
        tracker_trace!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        decode_progress(&bytes)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> PollError {
    if err.is_timeout() {
        return PollError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return PollError::new(FailureKind::InvalidUrl, err.to_string());
    }
    PollError::new(FailureKind::Network, err.to_string())
}
