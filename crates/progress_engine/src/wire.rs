use progress_core::{AnalysisRequest, JobStatus, ProgressReport, RawPercent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FailureKind, PollError};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Option<ProgressData>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProgressData {
    #[serde(default)]
    percent: Value,
    #[serde(default)]
    message: Value,
    #[serde(default)]
    status: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisBody<'a> {
    job_id: &'a str,
    entity_id: &'a str,
    company_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    website: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    industry: Option<&'a str>,
}

/// Decode a `GET /progress/{jobId}` body into a report.
pub fn decode_progress(bytes: &[u8]) -> Result<ProgressReport, PollError> {
    let envelope: Envelope = serde_json::from_slice(bytes)
        .map_err(|err| PollError::new(FailureKind::Decode, err.to_string()))?;

    if envelope.success == Some(false) {
        return Err(rejection(&envelope));
    }
    let data = envelope
        .data
        .ok_or_else(|| PollError::new(FailureKind::Decode, "missing data"))?;

    Ok(ProgressReport {
        percent: raw_percent(data.percent),
        message: match data.message {
            Value::String(message) => message,
            _ => String::new(),
        },
        // Only the strings "completed" and "failed" are terminal.
        status: data
            .status
            .as_str()
            .map(JobStatus::from_wire)
            .unwrap_or(JobStatus::Running),
    })
}

/// JSON body for the start-analysis endpoint.
pub fn encode_analysis_request(request: &AnalysisRequest) -> Result<Vec<u8>, PollError> {
    let body = AnalysisBody {
        job_id: request.job_id.as_str(),
        entity_id: request.entity_id.as_str(),
        company_name: &request.company_name,
        website: request.website.as_deref(),
        industry: request.industry.as_deref(),
    };
    serde_json::to_vec(&body).map_err(|err| PollError::new(FailureKind::Decode, err.to_string()))
}

/// Any body is accepted except an envelope carrying `success: false`.
pub fn check_submit_response(bytes: &[u8]) -> Result<(), PollError> {
    match serde_json::from_slice::<Envelope>(bytes) {
        Ok(envelope) if envelope.success == Some(false) => Err(rejection(&envelope)),
        _ => Ok(()),
    }
}

fn rejection(envelope: &Envelope) -> PollError {
    let message = envelope
        .error
        .as_deref()
        .or(envelope.message.as_deref())
        .unwrap_or("request was not successful");
    PollError::new(FailureKind::Rejected, message)
}

fn raw_percent(value: Value) -> RawPercent {
    match value {
        Value::Number(n) => n.as_f64().map(RawPercent::Number).unwrap_or(RawPercent::Missing),
        Value::String(s) => RawPercent::Text(s),
        _ => RawPercent::Missing,
    }
}
