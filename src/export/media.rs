//! 埋め込み用の画像読み込み
//!
//! Wordがそのまま扱える形式（PNG/JPEG/GIF/BMP/TIFF）は元のバイト列を使い、
//! それ以外（WebPなど）はPNGに変換する。

use crate::error::{ReportError, Result};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// 埋め込み可能な画像
#[derive(Debug, Clone)]
pub struct Picture {
    bytes: Vec<u8>,
    format: ImageFormat,
    width_px: u32,
    height_px: u32,
}

impl Picture {
    /// 画像を読み込み、全体をデコードして破損を検出する
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| load_error(path, e))?;
        Self::from_bytes(bytes).map_err(|e| load_error(path, e))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> std::result::Result<Self, String> {
        let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| e.to_string())?;
        let format = reader
            .format()
            .ok_or_else(|| "画像形式を判別できません".to_string())?;
        let decoded = reader.decode().map_err(|e| e.to_string())?;
        let (width_px, height_px) = (decoded.width(), decoded.height());

        if width_px == 0 || height_px == 0 {
            return Err("画像サイズが0です".to_string());
        }

        if is_native_format(format) {
            return Ok(Self {
                bytes,
                format,
                width_px,
                height_px,
            });
        }

        let mut png = Cursor::new(Vec::new());
        decoded
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| format!("PNG変換エラー: {}", e))?;

        Ok(Self {
            bytes: png.into_inner(),
            format: ImageFormat::Png,
            width_px,
            height_px,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }

    #[cfg(test)]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// メディアパートの拡張子
    pub fn extension(&self) -> &'static str {
        match self.format {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
            _ => "png",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self.format {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
            _ => "image/png",
        }
    }
}

fn is_native_format(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif | ImageFormat::Bmp | ImageFormat::Tiff
    )
}

fn load_error(path: &Path, reason: impl std::fmt::Display) -> ReportError {
    ReportError::ImageLoad(format!("{}: {}", path.display(), reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    fn write_image(path: &Path, width: u32, height: u32) {
        RgbImage::from_pixel(width, height, Rgb([120, 80, 40]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_load_png_keeps_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.png");
        write_image(&path, 40, 30);

        let picture = Picture::load(&path).unwrap();
        assert_eq!(picture.dimensions(), (40, 30));
        assert_eq!(picture.extension(), "png");
        assert_eq!(picture.content_type(), "image/png");
        assert_eq!(picture.bytes(), std::fs::read(&path).unwrap().as_slice());
    }

    #[test]
    fn test_load_jpeg() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("b.jpg");
        write_image(&path, 16, 32);

        let picture = Picture::load(&path).unwrap();
        assert_eq!(picture.format(), ImageFormat::Jpeg);
        assert_eq!(picture.extension(), "jpeg");
        assert_eq!(picture.dimensions(), (16, 32));
    }

    #[test]
    fn test_format_guessed_from_content() {
        // 拡張子がjpgでも中身がPNGならPNGとして扱う
        let dir = tempdir().unwrap();
        let png = dir.path().join("real.png");
        write_image(&png, 8, 8);
        let renamed = dir.path().join("fake.jpg");
        std::fs::copy(&png, &renamed).unwrap();

        assert_eq!(Picture::load(&renamed).unwrap().format(), ImageFormat::Png);
    }

    #[test]
    fn test_garbage_is_image_load_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"this is not an image").unwrap();

        let err = Picture::load(&path).unwrap_err();
        assert!(matches!(err, ReportError::ImageLoad(_)));
        assert!(err.to_string().contains("broken.jpg"));
    }

    #[test]
    fn test_truncated_png_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("full.png");
        RgbImage::from_fn(64, 64, |x, y| Rgb([(x * 4) as u8, (y * 4) as u8, ((x * y) % 251) as u8]))
            .save(&path)
            .unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let truncated = dir.path().join("truncated.png");
        std::fs::write(&truncated, &bytes[..bytes.len() / 2]).unwrap();

        assert!(Picture::load(&truncated).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = Picture::load(Path::new("/nonexistent/x.png")).unwrap_err();
        assert!(matches!(err, ReportError::ImageLoad(_)));
    }
}
