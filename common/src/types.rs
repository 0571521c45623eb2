//! 解析APIのレスポンス型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - MedicationRecord: 検出された薬剤1件（全フィールド任意・型も不定）
//! - AnalysisResponse: `POST /analyze` のレスポンス
//! - HealthStatus: `GET /health` のレスポンス
//!
//! 解析サービスは同じフィールドに文字列・配列・数値・オブジェクトのいずれも
//! 返し得るため、揺れのあるフィールドは `serde_json::Value` のまま保持し、
//! 表示時に `render` で正規化する。

use crate::error::SubmissionError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 検出された薬剤1件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicationRecord {
    #[serde(skip_serializing_if = "Value::is_null")]
    pub name: Value,

    /// 0〜1の割合、または0〜100のパーセント
    #[serde(skip_serializing_if = "Value::is_null")]
    pub confidence: Value,

    #[serde(skip_serializing_if = "Value::is_null")]
    pub matched_text: Value,

    #[serde(skip_serializing_if = "Value::is_null")]
    pub extracted_text: Value,

    #[serde(skip_serializing_if = "Value::is_null")]
    pub description: Value,

    /// 文字列または配列
    #[serde(skip_serializing_if = "Value::is_null")]
    pub drug_class: Value,

    /// 旧バックエンドの drug_class 相当
    #[serde(skip_serializing_if = "Value::is_null")]
    pub category: Value,

    #[serde(skip_serializing_if = "Value::is_null")]
    pub strength: Value,

    #[serde(skip_serializing_if = "Value::is_null")]
    pub form: Value,

    #[serde(skip_serializing_if = "Value::is_null")]
    pub detected_dosage: Value,

    /// OCRで検出された用量（文字列またはオブジェクト）
    #[serde(skip_serializing_if = "Value::is_null")]
    pub dosage_info: Value,

    #[serde(skip_serializing_if = "Value::is_null")]
    pub indications: Value,

    #[serde(skip_serializing_if = "Value::is_null")]
    pub side_effects: Value,

    #[serde(skip_serializing_if = "Value::is_null")]
    pub interactions: Value,

    #[serde(skip_serializing_if = "Value::is_null")]
    pub warnings: Value,
}

/// `POST /analyze` のレスポンス
///
/// `{ medications: [...] }` または `{ error: "..." }`。
/// OCR結果や画像などの付加フィールドは無視する。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medications: Option<Vec<MedicationRecord>>,

    #[serde(skip_serializing_if = "Value::is_null")]
    pub error: Value,

    /// サーバー側のデバッグ情報（ログ出力のみ）
    #[serde(skip_serializing_if = "Value::is_null")]
    pub debug_info: Value,
}

impl AnalysisResponse {
    /// HTTPステータスとボディから解析レスポンスを取り出す
    ///
    /// - 2xx以外: `ServerError`（ボディの `detail` があれば添える）
    /// - JSONとして読めない: `MalformedResponse`
    pub fn from_http(status: u16, body: &str) -> Result<Self, SubmissionError> {
        if !(200..300).contains(&status) {
            let detail = serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string));
            return Err(SubmissionError::ServerError { status, detail });
        }

        Self::from_json(body).map_err(|e| SubmissionError::MalformedResponse {
            message: e.to_string(),
        })
    }

    /// JSON文字列からパース
    pub fn from_json(body: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// `error` フィールドのメッセージ（空・false・nullは無し扱い）
    pub fn error_message(&self) -> Option<String> {
        match &self.error {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// 送信結果へ変換
    ///
    /// `error` を含む場合は `ApplicationError`（通信は成功・意味的に失敗）
    pub fn into_outcome(self) -> Result<Vec<MedicationRecord>, SubmissionError> {
        if let Some(message) = self.error_message() {
            return Err(SubmissionError::ApplicationError { message });
        }
        Ok(self.medications.unwrap_or_default())
    }
}

/// `GET /health` のレスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
