//! 解析API クライアント
//!
//! - `POST {endpoint}/analyze`: multipart (`file` フィールド) で画像を1回送信
//! - `GET {endpoint}/health`: 疎通確認（結果は参考情報のみ）
//!
//! 締切時間を超えた場合は `Timeout`。自動リトライはしない。

use crate::error::{RxLensError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use rx_lens_common::{AnalysisResponse, HealthStatus, MedicationRecord, SelectedFile, SubmissionError};
use std::time::Duration;

pub struct AnalysisClient {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl AnalysisClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| RxLensError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 疎通確認
    ///
    /// 2xxかつ `status == "healthy"` のときのみ true
    pub async fn probe(&self) -> bool {
        let url = format!("{}/health", self.endpoint);
        tracing::debug!(%url, "probing analysis service");

        let response = match tokio::time::timeout(self.timeout, self.http.get(&url).send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "health check failed");
                return false;
            }
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "health check timed out");
                return false;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = response.status().as_u16(), "health check returned error status");
            return false;
        }

        match response.json::<HealthStatus>().await {
            Ok(health) if health.is_healthy() => {
                tracing::info!("analysis service is healthy");
                true
            }
            Ok(health) => {
                tracing::warn!(status = %health.status, "analysis service is not healthy");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "health check returned unreadable body");
                false
            }
        }
    }

    /// 画像を送信して解析結果を取得
    pub async fn submit(
        &self,
        file: &SelectedFile<Vec<u8>>,
    ) -> std::result::Result<Vec<MedicationRecord>, SubmissionError> {
        tracing::info!(file = %file.name, size = file.size, media_type = %file.media_type, "sending analysis request");

        match tokio::time::timeout(self.timeout, self.send(file)).await {
            Ok(outcome) => {
                if let Err(err) = &outcome {
                    tracing::warn!(error = %err, "analysis request failed");
                }
                outcome
            }
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "analysis request timed out");
                Err(SubmissionError::Timeout {
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }

    async fn send(
        &self,
        file: &SelectedFile<Vec<u8>>,
    ) -> std::result::Result<Vec<MedicationRecord>, SubmissionError> {
        let media_type = if file.media_type.trim().is_empty() {
            "application/octet-stream"
        } else {
            file.media_type.as_str()
        };
        let part = Part::bytes(file.content.clone())
            .file_name(file.name.clone())
            .mime_str(media_type)
            .map_err(|e| self.classify_transport(e))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/analyze", self.endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "analysis response received");

        let body = response
            .text()
            .await
            .map_err(|e| self.classify_transport(e))?;

        classify_response(status, &body)
    }

    fn classify_transport(&self, err: reqwest::Error) -> SubmissionError {
        if err.is_timeout() {
            SubmissionError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            SubmissionError::NetworkError {
                message: err.to_string(),
            }
        }
    }
}

/// ステータスとボディから送信結果を分類
pub fn classify_response(
    status: StatusCode,
    body: &str,
) -> std::result::Result<Vec<MedicationRecord>, SubmissionError> {
    let response = AnalysisResponse::from_http(status.as_u16(), body)?;

    if !response.debug_info.is_null() {
        tracing::warn!(debug_info = %response.debug_info, "debug info from analysis service");
    }

    response.into_outcome()
}
