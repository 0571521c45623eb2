use rx_lens_common::{SubmissionError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RxLensError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("解析API呼び出しエラー: {0}")]
    Submission(#[from] SubmissionError),

    #[error("HTTPクライアント初期化エラー: {0}")]
    HttpClient(String),

    #[error("プレビュー生成エラー: {0}")]
    Preview(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] rx_lens_common::Error),

    #[error("対話入力エラー: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, RxLensError>;
