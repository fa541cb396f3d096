pub mod docx;
pub mod grid;
pub mod media;
pub mod package;
pub mod section;

use crate::error::{ReportError, Result};
use crate::scanner::ImageInfo;
use docx::{ReportOptions, ReportSummary};
use photo_report_common::pattern::convert;
use roxmltree::{Document, Node};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub use package::DocxPackage;

/// 出力先がフォルダのときのファイル名
pub const DEFAULT_FILE_NAME: &str = "report.docx";

pub(crate) fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// XMLパートを解析（失敗はテンプレート不正として扱う）
pub(crate) fn parse_xml<'a>(xml: &'a str, part: &str) -> Result<Document<'a>> {
    Document::parse(xml)
        .map_err(|e| ReportError::InvalidTemplate(format!("{} を解析できません: {}", part, e)))
}

/// 名前空間を無視してローカル名で比較
pub(crate) fn has_tag(node: Node<'_, '_>, expected: &str) -> bool {
    node.is_element() && node.tag_name().name() == expected
}

/// 属性値（`w:w` も `w` で引ける）
pub(crate) fn attribute_value<'a>(node: Node<'a, 'a>, key: &str) -> Option<&'a str> {
    node.attributes()
        .find(|attr| attr.name() == key)
        .map(|attr| attr.value())
}

/// 出力先パスを決定
///
/// 既存フォルダなら `report.docx` を付け、拡張子がなければ `.docx` を付ける。
pub fn resolve_output_path(output: &Path) -> PathBuf {
    if output.is_dir() {
        output.join(DEFAULT_FILE_NAME)
    } else if output.extension().is_none() {
        output.with_extension("docx")
    } else {
        output.to_path_buf()
    }
}

/// プレビュー1行分
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionPreview {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// パターン適用結果の一覧
pub fn preview_captions(images: &[ImageInfo], pattern: &str) -> Vec<CaptionPreview> {
    images
        .iter()
        .map(|image| match convert(&image.path, pattern) {
            Ok(caption) => CaptionPreview {
                path: image.path.clone(),
                caption: Some(caption),
                error: None,
            },
            Err(e) => CaptionPreview {
                path: image.path.clone(),
                caption: None,
                error: Some(e.to_string()),
            },
        })
        .collect()
}

/// 報告書を生成（進捗表示つき）
pub fn export_report(
    images: &[ImageInfo],
    pattern: &str,
    template: &Path,
    output: &Path,
    options: &ReportOptions,
) -> Result<ReportSummary> {
    let output_path = resolve_output_path(output);
    let paths: Vec<PathBuf> = images.iter().map(|img| img.path.clone()).collect();

    println!("- docxを生成中... (テンプレート: {})", template.display());
    let summary = docx::generate_report(&paths, pattern, template, &output_path, options)?;
    println!("✔ docx出力: {}", summary.output.display());

    if !summary.placeholders.is_empty() {
        eprintln!("⚠ 読み込めなかった画像: {}枚", summary.placeholders.len());
        for path in &summary.placeholders {
            eprintln!("  - {}", path.display());
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b>&'\""), "a&lt;b&gt;&amp;&apos;&quot;");
        assert_eq!(escape_xml("写真 (2)"), "写真 (2)");
    }

    #[test]
    fn test_attribute_value_ignores_prefix() {
        let xml = r#"<w:sectPr xmlns:w="urn:w"><w:pgSz w:w="12240" w:h='15840' w:orient = "landscape"/></w:sectPr>"#;
        let doc = parse_xml(xml, "document.xml").unwrap();
        let pg_sz = doc.descendants().find(|n| has_tag(*n, "pgSz")).unwrap();
        assert_eq!(attribute_value(pg_sz, "w"), Some("12240"));
        assert_eq!(attribute_value(pg_sz, "h"), Some("15840"));
        assert_eq!(attribute_value(pg_sz, "orient"), Some("landscape"));
        assert_eq!(attribute_value(pg_sz, "code"), None);
    }

    #[test]
    fn test_parse_xml_error_is_invalid_template() {
        assert!(matches!(
            parse_xml("<w:body>", "word/document.xml"),
            Err(ReportError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn test_resolve_output_path() {
        let dir = tempdir().unwrap();
        assert_eq!(resolve_output_path(dir.path()), dir.path().join("report.docx"));
        assert_eq!(
            resolve_output_path(&dir.path().join("kitchen")),
            dir.path().join("kitchen.docx")
        );
        assert_eq!(
            resolve_output_path(&dir.path().join("out.docx")),
            dir.path().join("out.docx")
        );
    }

    #[test]
    fn test_preview_captions() {
        let images = vec![
            ImageInfo {
                path: PathBuf::from("/archive/007-Kitchen/photo (2).jpg"),
                file_name: "photo (2).jpg".into(),
            },
            ImageInfo {
                path: PathBuf::from("orphan.jpg"),
                file_name: "orphan.jpg".into(),
            },
        ];

        let preview = preview_captions(&images, "%f %p");
        assert_eq!(preview[0].caption.as_deref(), Some("Kitchen photo"));
        assert!(preview[0].error.is_none());
        assert!(preview[1].caption.is_none());
        assert!(preview[1].error.is_some());

        let json = serde_json::to_value(&preview).unwrap();
        assert_eq!(json[0]["caption"], "Kitchen photo");
        assert!(json[0].get("error").is_none());
    }
}
