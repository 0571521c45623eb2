//! エラー型定義
//!
//! - `Error`: 共通ライブラリのエラー（検証・パース）
//! - `ValidationError`: ファイル選択時の検証エラー（ネットワーク層には到達しない）
//! - `SubmissionError`: 解析API送信時のエラー分類（CLI/Webで共有）

use serde::Serialize;
use thiserror::Error;

/// ファイル選択時の検証エラー
///
/// Displayはそのままユーザー向けメッセージとして表示される
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please upload a valid image file (JPG, PNG, or HEIC from iPhone).")]
    UnsupportedType { media_type: String },

    #[error("File is too large. Maximum size is 10MB.")]
    TooLarge { size: u64 },
}

/// 解析API送信時のエラー分類
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionError {
    /// 締切時間（デフォルト30秒）超過
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// 接続・通信エラー
    #[error("network error: {message}")]
    NetworkError { message: String },

    /// 2xx以外のステータス
    #[error("server responded with status {status}")]
    ServerError { status: u16, detail: Option<String> },

    /// 通信は成功したがレスポンスに `error` が含まれる
    #[error("{message}")]
    ApplicationError { message: String },

    /// 2xxだがJSONとして読めないレスポンス
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
