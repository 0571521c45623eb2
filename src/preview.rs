//! プレビュー生成
//!
//! 選択された画像をデコードし、サイズ・撮影日時・サムネイル(Data URL)を返す。
//! デコードはブロッキング処理なので `spawn_blocking` で実行し、
//! 完了通知は1回限りの `JoinHandle` で受け取る。
//! HEICは `image` クレートでデコードできないため `Preview` エラーになる
//! （選択自体は有効なまま）。

use crate::error::{RxLensError, Result};
use crate::scanner::exif;
use base64::Engine;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tokio::task::JoinHandle;

/// サムネイルの最大辺(px)
pub const THUMBNAIL_MAX: u32 = 320;

#[derive(Debug, Clone)]
pub struct Preview {
    pub width: u32,
    pub height: u32,
    /// EXIF DateTimeOriginal / DateTime
    pub captured_at: Option<String>,
    /// "data:image/jpeg;base64,..." 形式
    pub thumbnail_data_url: String,
}

pub fn build_preview(bytes: &[u8]) -> Result<Preview> {
    let img = image::load_from_memory(bytes).map_err(|e| RxLensError::Preview(e.to_string()))?;
    let (width, height) = (img.width(), img.height());

    // JPEGはアルファ非対応のためRGBに変換
    let thumb = DynamicImage::ImageRgb8(img.thumbnail(THUMBNAIL_MAX, THUMBNAIL_MAX).to_rgb8());
    let mut buf = Cursor::new(Vec::new());
    thumb
        .write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(|e| RxLensError::Preview(e.to_string()))?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(buf.into_inner());

    Ok(Preview {
        width,
        height,
        captured_at: exif::extract_date(bytes).ok(),
        thumbnail_data_url: format!("data:image/jpeg;base64,{}", encoded),
    })
}

/// プレビュー生成をバックグラウンドで開始
pub fn spawn_preview(bytes: Vec<u8>) -> JoinHandle<Result<Preview>> {
    tokio::task::spawn_blocking(move || build_preview(&bytes))
}
