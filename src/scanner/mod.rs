//! バッチ処理用の画像フォルダ走査

mod exif;

use crate::error::{Result, SnapGeoError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub captured_at: Option<String>,
    /// カメラが埋め込んだ GPS（オーバーレイとの照合用）
    pub exif_gps: Option<(f64, f64)>,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// フォルダ内の画像を列挙する（`recursive` でサブフォルダも）
pub fn scan_folder(folder: &Path, recursive: bool) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(SnapGeoError::FolderNotFound(folder.display().to_string()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| is_image_extension(&ext.to_string_lossy()))
        })
        .map(|e| {
            let path = e.into_path();
            ImageInfo {
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                captured_at: exif::extract_date(&path),
                exif_gps: exif::extract_gps(&path),
                path,
            }
        })
        .collect();

    images.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(images)
}
