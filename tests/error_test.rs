//! エラーケーステスト
//!
//! 致命的エラー（テンプレート・保存先）はそのまま返ることを検証

use photo_report::error::ReportError;
use photo_report::export::docx::{generate_report, ReportOptions};
use photo_report::export::DocxPackage;
use photo_report::scanner;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"), true);
    assert!(matches!(result.unwrap_err(), ReportError::FolderNotFound(_)));
}

/// 空のフォルダをスキャンした場合
#[test]
fn test_scan_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = scanner::scan_folder(dir.path(), true);

    // 空フォルダはエラーではなく空のVecを返す
    assert!(result.unwrap().is_empty());
}

/// テンプレートが存在しない
#[test]
fn test_missing_template() {
    let dir = tempdir().unwrap();
    let result = generate_report(
        &[],
        "%f",
        &dir.path().join("missing.docx"),
        &dir.path().join("out.docx"),
        &ReportOptions::default(),
    );

    assert!(matches!(result, Err(ReportError::FileNotFound(_))));
    assert!(!dir.path().join("out.docx").exists());
}

/// テンプレートがdocxではない
#[test]
fn test_invalid_template() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("template.docx");
    std::fs::write(&template, "plain text").unwrap();

    let result = generate_report(
        &[],
        "%f",
        &template,
        &dir.path().join("out.docx"),
        &ReportOptions::default(),
    );
    assert!(matches!(result, Err(ReportError::InvalidTemplate(_))));
}

/// 本文XMLが壊れている
#[test]
fn test_malformed_document_xml() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("template.docx");
    let mut package = DocxPackage::blank().unwrap();
    package.set_part("word/document.xml", b"<w:document><w:body>".to_vec());
    package.save(&template).unwrap();

    let output = dir.path().join("out.docx");
    let result = generate_report(&[], "%f", &template, &output, &ReportOptions::default());
    assert!(matches!(result, Err(ReportError::InvalidTemplate(_))));
    assert!(!output.exists());
}

/// 保存先に書き込めない
#[test]
fn test_unwritable_destination() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("template.docx");
    DocxPackage::blank().unwrap().save(&template).unwrap();

    let output = PathBuf::from("/nonexistent/dir/out.docx");
    let result = generate_report(&[], "%f", &template, &output, &ReportOptions::default());
    assert!(matches!(result, Err(ReportError::Io(_))));
}

/// ReportErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        ReportError::Config("テスト設定エラー".to_string()),
        ReportError::FileNotFound("test.jpg".to_string()),
        ReportError::FolderNotFound("/path/to/folder".to_string()),
        ReportError::MissingTemplate,
        ReportError::InvalidTemplate("不正".to_string()),
        ReportError::ImageLoad("broken.jpg".to_string()),
        ReportError::DocxGeneration("docx生成エラー".to_string()),
        ReportError::Prompt("中断".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// MissingTemplateエラーのメッセージ確認
#[test]
fn test_missing_template_message() {
    let display = format!("{}", ReportError::MissingTemplate);
    assert!(display.contains("--template"));
    assert!(display.contains("photo-report config"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: ReportError = io_err.into();

    assert!(matches!(err, ReportError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: ReportError = json_err.into();

    assert!(matches!(err, ReportError::JsonParse(_)));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_conversion() {
    let common_err = photo_report_common::Error::NoParent("photo.jpg".to_string());
    let err: ReportError = common_err.into();

    assert!(matches!(err, ReportError::Common(_)));
    assert!(format!("{}", err).contains("photo.jpg"));
}
