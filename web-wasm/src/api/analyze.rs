//! 解析API連携（ブラウザ版）
//!
//! - `POST {endpoint}/analyze`: FormData (`file` フィールド) で画像を1回送信
//! - `GET {endpoint}/health`: 疎通確認（結果は参考情報のみ）
//!
//! 締切時間を過ぎたら AbortController で中断し `Timeout` とする。

use gloo::storage::{LocalStorage, Storage};
use gloo::timers::callback::Timeout;
use rx_lens_common::{
    AnalysisResponse, HealthStatus, MedicationRecord, SubmissionError, DEFAULT_ENDPOINT,
    DEFAULT_TIMEOUT_SECS,
};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, File, FormData, Request, RequestInit, RequestMode, Response};

/// エンドポイント上書き用のlocalStorageキー
const ENDPOINT_KEY: &str = "rx-lens.endpoint";

/// 有効なエンドポイント（localStorageの上書きを優先、末尾の `/` は除去）
pub fn endpoint() -> String {
    let endpoint = LocalStorage::get::<String>(ENDPOINT_KEY)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    endpoint.trim().trim_end_matches('/').to_string()
}

/// 疎通確認
///
/// 2xxかつ `status == "healthy"` のときのみ true
pub async fn probe(endpoint: &str) -> bool {
    let url = format!("{}/health", endpoint);
    match fetch_text(&url, None, None).await {
        Ok((status, body)) if (200..300).contains(&status) => {
            serde_json::from_str::<HealthStatus>(&body).is_ok_and(|health| health.is_healthy())
        }
        Ok((status, _)) => {
            gloo::console::warn!(format!("health check returned status {}", status));
            false
        }
        Err(e) => {
            gloo::console::warn!(format!("health check failed: {}", js_error_message(&e)));
            false
        }
    }
}

/// 画像を送信して解析結果を取得
pub async fn submit(endpoint: &str, file: &File) -> Result<Vec<MedicationRecord>, SubmissionError> {
    let form = FormData::new().map_err(network_error)?;
    form.append_with_blob_and_filename("file", file, &file.name())
        .map_err(network_error)?;

    let controller = AbortController::new().map_err(network_error)?;
    let timed_out = Rc::new(Cell::new(false));
    // ドロップ時にタイマーは解除される
    let _deadline = {
        let controller = controller.clone();
        let timed_out = Rc::clone(&timed_out);
        Timeout::new((DEFAULT_TIMEOUT_SECS * 1000) as u32, move || {
            timed_out.set(true);
            controller.abort();
        })
    };

    let url = format!("{}/analyze", endpoint);
    let signal = controller.signal();
    let (status, body) = match fetch_text(&url, Some(&form), Some(&signal)).await {
        Ok(response) => response,
        Err(_) if timed_out.get() => {
            return Err(SubmissionError::Timeout {
                seconds: DEFAULT_TIMEOUT_SECS,
            })
        }
        Err(e) => return Err(network_error(e)),
    };

    let response = AnalysisResponse::from_http(status, &body)?;
    if !response.debug_info.is_null() {
        gloo::console::warn!(format!("debug info from analysis service: {}", response.debug_info));
    }
    response.into_outcome()
}

/// fetchしてステータスとボディ文字列を返す
///
/// `body` があればPOST、なければGET
async fn fetch_text(
    url: &str,
    body: Option<&FormData>,
    signal: Option<&web_sys::AbortSignal>,
) -> Result<(u16, String), JsValue> {
    let opts = RequestInit::new();
    opts.set_mode(RequestMode::Cors);
    match body {
        Some(form) => {
            opts.set_method("POST");
            opts.set_body(form);
        }
        None => opts.set_method("GET"),
    }
    opts.set_signal(signal);

    let request = Request::new_with_str_and_init(url, &opts)?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window is not available"))?;

    let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
    let resp: Response = resp_value.dyn_into()?;
    let status = resp.status();

    let text = JsFuture::from(resp.text()?).await?;
    Ok((status, text.as_string().unwrap_or_default()))
}

fn network_error(err: JsValue) -> SubmissionError {
    SubmissionError::NetworkError {
        message: js_error_message(&err),
    }
}

/// JSの例外値を表示用の文字列にする
fn js_error_message(err: &JsValue) -> String {
    if let Some(message) = err.as_string() {
        return message;
    }
    match err.dyn_ref::<js_sys::Error>() {
        Some(error) => String::from(error.message()),
        None => format!("{:?}", err),
    }
}
