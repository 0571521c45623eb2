//! アップロード対象ファイルの検証
//!
//! 受付条件:
//! - ファイル名が `.heic` / `.heif` で終わる → 種別・サイズを問わず受付（iPhone画像）
//! - それ以外は JPEG / PNG のみ、かつ 10MiB 以下

use crate::error::ValidationError;

/// 最大ファイルサイズ（10MiB）
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// 受け付けるMIMEタイプ
pub const ACCEPTED_MEDIA_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

const HEIC_EXTENSIONS: &[&str] = &[".heic", ".heif"];

/// HEIC選択時の案内
pub const HEIC_NOTICE: &str = "iPhone image detected. Processing HEIC format...";

/// HEICプレビューに添えるヒント
pub const HEIC_TIP: &str =
    "Tip: For best results with iPhone images, use the \"Most Compatible\" option when taking photos.";

/// 解析対象として選択されたファイル
///
/// `content` はフロントエンドごとに異なる（CLI: バイト列、Web: `web_sys::File`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile<C> {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub content: C,
}

impl<C> SelectedFile<C> {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, size: u64, content: C) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size,
            content,
        }
    }

    pub fn is_heic(&self) -> bool {
        is_heic_name(&self.name)
    }
}

/// 検証を通過したファイルの区分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acceptance {
    pub is_heic: bool,
}

impl Acceptance {
    /// 受付時に表示する案内（HEICのみ）
    pub fn notice(&self) -> Option<&'static str> {
        self.is_heic.then_some(HEIC_NOTICE)
    }
}

/// ファイル名がHEIC/HEIFか（大文字小文字を区別しない）
pub fn is_heic_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    HEIC_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// MIMEタイプが受付対象か（`; charset=...` 等のパラメータは無視）
pub fn is_accepted_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    ACCEPTED_MEDIA_TYPES.contains(&essence.as_str())
}

/// ファイルを検証
///
/// # Arguments
/// * `name` - ファイル名
/// * `media_type` - 宣言されたMIMEタイプ
/// * `size` - バイト数
pub fn validate(name: &str, media_type: &str, size: u64) -> Result<Acceptance, ValidationError> {
    if is_heic_name(name) {
        return Ok(Acceptance { is_heic: true });
    }

    if !is_accepted_media_type(media_type) {
        return Err(ValidationError::UnsupportedType {
            media_type: media_type.to_string(),
        });
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge { size });
    }

    Ok(Acceptance { is_heic: false })
}

/// 拡張子からMIMEタイプを推定（CLI用: ローカルファイルはMIMEタイプを持たない）
pub fn guess_media_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}
