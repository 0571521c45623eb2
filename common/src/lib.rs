//! rx-lens Common Library
//!
//! CLIとWeb(WASM)で共有される型とロジック
//! - 検証 → プレビュー → 送信 → 表示 のうち、IOを伴わない部分

pub mod types;
pub mod error;
pub mod upload;
pub mod session;
pub mod render;
pub mod html;

pub use types::{AnalysisResponse, HealthStatus, MedicationRecord};
pub use error::{Error, Result, SubmissionError, ValidationError};
pub use upload::{validate, Acceptance, SelectedFile, MAX_UPLOAD_BYTES};
pub use session::{Banner, Completion, SessionState, SubmitTicket, UploadSession};
pub use render::{render, render_response, DisplayModel, FailureBlock, MedicationCard};
pub use html::{escape_html, to_html};

/// 解析サービスの既定エンドポイント
pub const DEFAULT_ENDPOINT: &str = "https://aiapi.nikhilmishra.live/api";

/// 送信の締切時間（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
