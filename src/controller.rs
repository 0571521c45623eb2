//! アップロードコントローラ（CLI版）
//!
//! `UploadSession` に選択ファイル・状態を一元管理させ、
//! プレビュー生成と解析クライアント呼び出しをつなぐ。

use crate::client::AnalysisClient;
use crate::error::{RxLensError, Result};
use crate::preview::{spawn_preview, Preview};
use rx_lens_common::{Completion, DisplayModel, SelectedFile, UploadSession};
use tokio::task::JoinHandle;

pub struct Controller {
    session: UploadSession<Vec<u8>>,
    client: AnalysisClient,
    probe_before_submit: bool,
    preview: Option<JoinHandle<Result<Preview>>>,
}

impl Controller {
    pub fn new(client: AnalysisClient, probe_before_submit: bool) -> Self {
        Self {
            session: UploadSession::new(),
            client,
            probe_before_submit,
            preview: None,
        }
    }

    pub fn session(&self) -> &UploadSession<Vec<u8>> {
        &self.session
    }

    /// ファイルを選択し、受付時はプレビュー生成を開始
    pub fn select(&mut self, file: SelectedFile<Vec<u8>>) -> Result<()> {
        tracing::info!(file = %file.name, size = file.size, media_type = %file.media_type, "file selected");

        match self.session.select(file) {
            Ok(staged) => {
                if staged.is_heic() {
                    tracing::info!("HEIC/HEIF file staged for analysis");
                }
                self.preview = Some(spawn_preview(staged.content.clone()));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "file rejected");
                Err(err.into())
            }
        }
    }

    /// プレビュー生成の完了を待つ（1回のみ、2回目以降は `None`）
    pub async fn take_preview(&mut self) -> Option<Result<Preview>> {
        let handle = self.preview.take()?;
        Some(match handle.await {
            Ok(preview) => preview,
            Err(e) => Err(RxLensError::Preview(e.to_string())),
        })
    }

    pub fn reset(&mut self) {
        tracing::debug!("resetting upload session");
        self.preview = None;
        self.session.reset();
    }

    /// 選択中ファイルを送信
    ///
    /// 送信できない状態（未選択・送信中）では `None`
    pub async fn submit(&mut self) -> Option<Completion> {
        if !self.session.can_submit() {
            tracing::debug!(state = ?self.session.state(), "submit ignored");
            return None;
        }

        if self.probe_before_submit && self.session.needs_probe() {
            let ready = self.client.probe().await;
            self.session.record_probe(ready);
        }

        let file = self.session.file().cloned()?;
        let ticket = self.session.begin_submit()?;
        let outcome = self.client.submit(&file).await;
        let completion = self.session.finish(ticket, outcome);

        match &completion {
            Completion::Applied(model) => {
                tracing::info!(kind = model_kind(model), "analysis result rendered");
            }
            Completion::Discarded => tracing::info!("stale analysis result discarded"),
        }
        Some(completion)
    }
}

fn model_kind(model: &DisplayModel) -> &'static str {
    match model {
        DisplayModel::NoMedications => "no_medications",
        DisplayModel::Medications { .. } => "medications",
        DisplayModel::HeicRemediation { .. } => "heic_remediation",
        DisplayModel::Failure(_) => "failure",
    }
}
