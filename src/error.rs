use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("テンプレートが指定されていません。`--template` または `photo-report config --set-template FILE` で指定してください")]
    MissingTemplate,

    #[error("テンプレートが不正: {0}")]
    InvalidTemplate(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("docx生成エラー: {0}")]
    DocxGeneration(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIPエラー: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Common(#[from] photo_report_common::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
