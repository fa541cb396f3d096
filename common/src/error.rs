//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("親フォルダがありません: {0}")]
    NoParent(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_no_parent() {
        let error = Error::NoParent("photo.jpg".to_string());
        assert_eq!(format!("{}", error), "親フォルダがありません: photo.jpg");
    }

    #[test]
    fn test_error_debug() {
        let error = Error::NoParent("テスト".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("NoParent"));
        assert!(debug.contains("テスト"));
    }
}
