pub(crate) mod exif;

use crate::error::{RxLensError, Result};
use rx_lens_common::upload::guess_media_type;
use rx_lens_common::SelectedFile;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// フォルダ解析時に対象とする拡張子（小文字で比較）
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "heif"];

/// フォルダ直下の処方箋画像を列挙（ファイル名順）
///
/// 拡張子のみで判定する。種別・サイズの検証は選択時に行う
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(RxLensError::FileNotFound(folder.display().to_string()));
    }

    let mut images: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1) // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_image_path(p))
        .collect();

    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(images)
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// ローカルファイルを読み込み、選択ファイルを作る
///
/// MIMEタイプは拡張子から推定する
pub fn load_file(path: &Path) -> Result<SelectedFile<Vec<u8>>> {
    if !path.is_file() {
        return Err(RxLensError::FileNotFound(path.display().to_string()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let content = std::fs::read(path)?;
    let media_type = guess_media_type(&name);

    Ok(SelectedFile::new(name, media_type, content.len() as u64, content))
}
