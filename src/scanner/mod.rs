use crate::error::{ReportError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

impl ImageInfo {
    fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            file_name,
        }
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp"];

/// 対応画像拡張子か（大文字小文字を区別しない）
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// フォルダ内の画像を取得（パス順）
pub fn scan_folder(folder: &Path, recursive: bool) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(ReportError::FolderNotFound(folder.display().to_string()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_image_path(e.path()))
        .map(|e| ImageInfo::from_path(e.path()))
        .collect();

    images.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(images)
}

/// 入力（ファイル/フォルダ）から画像を収集
///
/// 入力の順序を保ち、同じパスは最初の1件のみ残す。
/// フォルダを指定すると配下の画像をすべて選択したことになる。
/// 返すパスは絶対パス（キャプションの親フォルダ名を取るため）。
pub fn collect_images(inputs: &[PathBuf], recursive: bool) -> Result<Vec<ImageInfo>> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();

    for input in inputs {
        let found = if input.is_dir() {
            scan_folder(input, recursive)?
        } else if input.is_file() {
            if !is_image_path(input) {
                eprintln!("画像ではないためスキップ: {}", input.display());
                continue;
            }
            vec![ImageInfo::from_path(input)]
        } else {
            return Err(ReportError::FileNotFound(input.display().to_string()));
        };

        for image in found {
            let path = absolute(&image.path);
            if seen.insert(path.clone()) {
                images.push(ImageInfo { path, ..image });
            }
        }
    }

    Ok(images)
}

/// 存在し、サイズが0でない画像のみ残す
pub fn filter_valid(images: Vec<ImageInfo>) -> Vec<ImageInfo> {
    images
        .into_iter()
        .filter(|img| {
            std::fs::metadata(&img.path)
                .map(|m| m.is_file() && m.len() > 0)
                .unwrap_or(false)
        })
        .collect()
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
