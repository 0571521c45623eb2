//! アップロードセッション（状態機械）
//!
//! 状態遷移: `Empty → Staged → Submitting → {Succeeded, Failed}`
//!
//! - 選択中ファイルは常に1件まで（キューなし）
//! - 送信中フラグは1本。送信中は `begin_submit` が何もしない
//! - `reset` / `select` で世代を進め、古い送信結果は `finish` で破棄する

use crate::error::{SubmissionError, ValidationError};
use crate::render::{render, DisplayModel};
use crate::types::MedicationRecord;
use crate::upload::{self, SelectedFile, HEIC_NOTICE};
use serde::Serialize;

/// セッション状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Empty,
    Staged,
    Submitting,
    Succeeded,
    Failed,
}

/// アップロードエリアに表示するメッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "level", content = "message", rename_all = "snake_case")]
pub enum Banner {
    Error(String),
    Warning(String),
    Info(String),
}

impl Banner {
    pub fn message(&self) -> &str {
        match self {
            Banner::Error(m) | Banner::Warning(m) | Banner::Info(m) => m,
        }
    }
}

/// 疎通確認失敗時の警告
pub const BACKEND_WARNING: &str = "Backend connection issues detected. Retry might be needed.";

/// 送信中の1件を表す引換券
///
/// `begin_submit` でのみ発行され、`finish` で消費される
#[derive(Debug)]
pub struct SubmitTicket {
    generation: u64,
    source_is_heic: bool,
}

impl SubmitTicket {
    pub fn source_is_heic(&self) -> bool {
        self.source_is_heic
    }
}

/// 送信結果の適用結果
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Applied(DisplayModel),
    /// 送信後に `reset` / `select` があったため破棄
    Discarded,
}

/// アップロードセッション
#[derive(Debug, Clone)]
pub struct UploadSession<C> {
    file: Option<SelectedFile<C>>,
    state: SessionState,
    banner: Option<Banner>,
    result: Option<DisplayModel>,
    in_flight: bool,
    generation: u64,
    backend_ready: bool,
}

impl<C> Default for UploadSession<C> {
    fn default() -> Self {
        Self {
            file: None,
            state: SessionState::Empty,
            banner: None,
            result: None,
            in_flight: false,
            generation: 0,
            backend_ready: false,
        }
    }
}

impl<C> UploadSession<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// ファイルを選択
    ///
    /// 検証に失敗した場合はエラーバナーのみ更新し、選択中ファイルは変更しない
    pub fn select(&mut self, file: SelectedFile<C>) -> Result<&SelectedFile<C>, ValidationError> {
        let acceptance = match upload::validate(&file.name, &file.media_type, file.size) {
            Ok(acceptance) => acceptance,
            Err(err) => {
                self.banner = Some(Banner::Error(err.to_string()));
                return Err(err);
            }
        };

        self.generation += 1;
        self.banner = acceptance.notice().map(|n| Banner::Info(n.to_string()));
        self.result = None;
        self.state = SessionState::Staged;
        Ok(&*self.file.insert(file))
    }

    /// 初期状態へ戻す（冪等）
    ///
    /// 送信中フラグは残す: 送信中のリクエストは `finish` で破棄される
    pub fn reset(&mut self) {
        self.generation += 1;
        self.file = None;
        self.banner = None;
        self.result = None;
        self.state = SessionState::Empty;
    }

    /// 送信開始
    ///
    /// ファイル未選択、または送信中の場合は `None`（何もしない）
    pub fn begin_submit(&mut self) -> Option<SubmitTicket> {
        if !self.can_submit() {
            return None;
        }
        let source_is_heic = self.file.as_ref().is_some_and(|f| f.is_heic());

        self.in_flight = true;
        self.state = SessionState::Submitting;
        self.result = None;
        Some(SubmitTicket {
            generation: self.generation,
            source_is_heic,
        })
    }

    /// 送信完了
    ///
    /// 引換券の世代が現在と異なる場合は結果を破棄する
    pub fn finish(
        &mut self,
        ticket: SubmitTicket,
        outcome: Result<Vec<MedicationRecord>, SubmissionError>,
    ) -> Completion {
        self.in_flight = false;

        if ticket.generation != self.generation {
            return Completion::Discarded;
        }

        let model = render(&outcome, ticket.source_is_heic);
        self.state = if outcome.is_ok() {
            SessionState::Succeeded
        } else {
            SessionState::Failed
        };
        self.result = Some(model.clone());
        Completion::Applied(model)
    }

    /// 疎通確認が必要か
    pub fn needs_probe(&self) -> bool {
        !self.backend_ready
    }

    /// 疎通確認の結果を記録（失敗は警告のみ、送信は妨げない）
    pub fn record_probe(&mut self, ready: bool) {
        self.backend_ready = ready;
        if !ready {
            self.banner = Some(Banner::Warning(BACKEND_WARNING.to_string()));
        }
    }

    /// 送信ボタンの有効/無効
    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.in_flight
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn file(&self) -> Option<&SelectedFile<C>> {
        self.file.as_ref()
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn result(&self) -> Option<&DisplayModel> {
        self.result.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    /// 選択中ファイルがHEIC/HEIFか
    pub fn is_heic(&self) -> bool {
        self.file.as_ref().is_some_and(|f| f.is_heic())
    }

    /// 選択中ファイルのHEIC案内
    pub fn heic_notice(&self) -> Option<&'static str> {
        self.is_heic().then_some(HEIC_NOTICE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MIB: u64 = 1024 * 1024;

    fn jpeg(name: &str, size: u64) -> SelectedFile<Vec<u8>> {
        SelectedFile::new(name, "image/jpeg", size, vec![0xFF, 0xD8])
    }

    fn ibuprofen() -> Vec<MedicationRecord> {
        vec![serde_json::from_value(json!({"name": "Ibuprofen", "confidence": 0.87})).unwrap()]
    }

    #[test]
    fn test_initial_state() {
        let session = UploadSession::<Vec<u8>>::new();
        assert_eq!(session.state(), SessionState::Empty);
        assert!(!session.can_submit());
        assert!(session.file().is_none());
    }

    #[test]
    fn test_rejected_selection_keeps_current_file() {
        let mut session = UploadSession::new();
        session.select(jpeg("first.jpg", MIB)).expect("受付");

        let gif = SelectedFile::new("anim.gif", "image/gif", 100, vec![]);
        let err = session.select(gif).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType { .. }));

        assert_eq!(session.file().map(|f| f.name.as_str()), Some("first.jpg"));
        assert_eq!(session.state(), SessionState::Staged);
        assert!(matches!(session.banner(), Some(Banner::Error(_))));
    }

    #[test]
    fn test_oversized_jpeg_rejected() {
        let mut session = UploadSession::new();
        assert!(session.select(jpeg("big.jpg", 11 * MIB)).is_err());
        assert_eq!(session.state(), SessionState::Empty);
        assert!(!session.can_submit());

        assert!(session.select(jpeg("ok.jpg", 9 * MIB)).is_ok());
        assert!(session.can_submit());
    }

    #[test]
    fn test_heic_selection_sets_info_banner() {
        let mut session = UploadSession::new();
        let heic = SelectedFile::new("photo.HEIC", "", 3 * MIB, vec![]);
        session.select(heic).expect("HEICは受付");
        assert_eq!(session.banner(), Some(&Banner::Info(HEIC_NOTICE.to_string())));
        assert!(session.is_heic());

        // JPEG選択でバナーが消える
        session.select(jpeg("rx.jpg", MIB)).unwrap();
        assert_eq!(session.banner(), None);
        assert_eq!(session.heic_notice(), None);
    }

    #[test]
    fn test_submit_requires_file() {
        let mut session = UploadSession::<Vec<u8>>::new();
        assert!(session.begin_submit().is_none());
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn test_second_submit_is_noop_while_submitting() {
        let mut session = UploadSession::new();
        session.select(jpeg("rx.jpg", MIB)).unwrap();

        let ticket = session.begin_submit().expect("送信開始");
        assert_eq!(session.state(), SessionState::Submitting);
        assert!(!session.can_submit());
        assert!(session.begin_submit().is_none());

        let completion = session.finish(ticket, Ok(ibuprofen()));
        assert!(matches!(completion, Completion::Applied(DisplayModel::Medications { .. })));
        assert_eq!(session.state(), SessionState::Succeeded);
        assert!(session.can_submit());
    }

    #[test]
    fn test_timeout_reenables_submit() {
        let mut session = UploadSession::new();
        session.select(jpeg("rx.jpg", MIB)).unwrap();
        let ticket = session.begin_submit().unwrap();

        let completion = session.finish(ticket, Err(SubmissionError::Timeout { seconds: 30 }));
        assert!(matches!(completion, Completion::Applied(DisplayModel::Failure(_))));
        assert_eq!(session.state(), SessionState::Failed);
        assert!(session.can_submit());
        assert!(session.result().is_some_and(|m| m.is_failure()));
    }

    #[test]
    fn test_late_response_after_reset_is_discarded() {
        let mut session = UploadSession::new();
        session.select(jpeg("rx.jpg", MIB)).unwrap();
        let ticket = session.begin_submit().unwrap();

        session.reset();
        // 送信中は新たな送信を受け付けない
        session.select(jpeg("next.jpg", MIB)).unwrap();
        assert!(session.begin_submit().is_none());

        assert_eq!(session.finish(ticket, Ok(ibuprofen())), Completion::Discarded);
        assert_eq!(session.state(), SessionState::Staged);
        assert!(session.result().is_none());
        assert!(session.can_submit());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = UploadSession::new();
        session.select(jpeg("rx.jpg", MIB)).unwrap();
        session.reset();
        session.reset();
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.file().is_none());
        assert!(session.banner().is_none());
        assert!(!session.can_submit());
    }

    #[test]
    fn test_heic_ticket_selects_remediation() {
        let mut session = UploadSession::new();
        session
            .select(SelectedFile::new("IMG_0042.heic", "image/heic", MIB, Vec::<u8>::new()))
            .unwrap();
        let ticket = session.begin_submit().unwrap();
        assert!(ticket.source_is_heic());

        let completion = session.finish(
            ticket,
            Err(SubmissionError::ApplicationError {
                message: "Could not decode HEIC image".into(),
            }),
        );
        assert!(matches!(
            completion,
            Completion::Applied(DisplayModel::HeicRemediation { .. })
        ));
    }

    #[test]
    fn test_probe_failure_is_advisory() {
        let mut session = UploadSession::new();
        session.select(jpeg("rx.jpg", MIB)).unwrap();
        assert!(session.needs_probe());

        session.record_probe(false);
        assert_eq!(
            session.banner(),
            Some(&Banner::Warning(BACKEND_WARNING.to_string()))
        );
        assert!(session.can_submit());
        assert!(session.needs_probe());

        session.record_probe(true);
        assert!(!session.needs_probe());
    }
}
