//! docx（OOXMLパッケージ）の読み書き
//!
//! ZIP内のパートをメモリ上に保持し、document.xml・リレーション・
//! コンテンツタイプを書き換えてから保存する。

use super::docx::TABLE_STYLE_ID;
use super::media::Picture;
use super::{attribute_value, escape_xml, has_tag, parse_xml};
use crate::error::{ReportError, Result};
use docx_rs::{Docx, PageMargin, Style, StyleType};
use photo_report_common::layout::{DEFAULT_MARGIN_TWIPS, LETTER_HEIGHT_TWIPS, LETTER_WIDTH_TWIPS};
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};
use zip::{CompressionMethod, ZipArchive};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const PACKAGE_RELS_PART: &str = "_rels/.rels";
const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";

pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
pub const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// メモリ上のdocxパッケージ
#[derive(Debug, Clone, Default)]
pub struct DocxPackage {
    parts: Vec<(String, Vec<u8>)>,
}

impl DocxPackage {
    /// テンプレートを読み込み
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ReportError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        Self::from_reader(file).map_err(|e| {
            let reason = match e {
                ReportError::InvalidTemplate(reason) => reason,
                other => other.to_string(),
            };
            ReportError::InvalidTemplate(format!("{}: {}", path.display(), reason))
        })
    }

    /// ZIPとして読み込み、本文パートがあることを確認する
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().trim_start_matches('/').to_string();
            let mut content = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut content)?;
            parts.push((name, content));
        }

        let package = Self { parts };
        let document = package.main_document_part()?;
        if !package.contains(&document) {
            return Err(ReportError::InvalidTemplate(format!("{} がありません", document)));
        }

        Ok(package)
    }

    /// 空の文書（US Letter縦、"Table Grid"スタイル付き）
    pub fn blank() -> Result<Self> {
        let margin = DEFAULT_MARGIN_TWIPS as i32;
        let mut buffer = Cursor::new(Vec::new());

        Docx::new()
            .page_size(LETTER_WIDTH_TWIPS as u32, LETTER_HEIGHT_TWIPS as u32)
            .page_margin(
                PageMargin::new()
                    .top(margin)
                    .bottom(margin)
                    .left(margin)
                    .right(margin),
            )
            .add_style(Style::new(TABLE_STYLE_ID, StyleType::Table).name("Table Grid"))
            .build()
            .pack(&mut buffer)
            .map_err(|e| ReportError::DocxGeneration(format!("空のテンプレートを作成できません: {}", e)))?;

        buffer.set_position(0);
        Self::from_reader(buffer)
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|(n, _)| n == name)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, content)| content.as_slice())
    }

    /// XMLパートを文字列で取得
    pub fn part_str(&self, name: &str) -> Result<String> {
        let bytes = self
            .part(name)
            .ok_or_else(|| ReportError::InvalidTemplate(format!("{} がありません", name)))?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| ReportError::InvalidTemplate(format!("{} がUTF-8ではありません", name)))
    }

    pub fn set_part(&mut self, name: &str, content: Vec<u8>) {
        match self.parts.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = content,
            None => self.parts.push((name.to_string(), content)),
        }
    }

    #[cfg(test)]
    pub fn remove_part(&mut self, name: &str) -> bool {
        let before = self.parts.len();
        self.parts.retain(|(n, _)| n != name);
        self.parts.len() != before
    }

    /// 本文パート名（_rels/.rels の officeDocument）
    pub fn main_document_part(&self) -> Result<String> {
        if !self.contains(PACKAGE_RELS_PART) {
            return Ok(DEFAULT_DOCUMENT_PART.to_string());
        }
        let rels = self.part_str(PACKAGE_RELS_PART)?;

        Ok(find_relationship_target(&rels, PACKAGE_RELS_PART, REL_OFFICE_DOCUMENT)?
            .map(|target| resolve_target("", &target))
            .unwrap_or_else(|| DEFAULT_DOCUMENT_PART.to_string()))
    }

    /// 本文から参照されるスタイルパート名
    pub fn styles_part(&self, document_part: &str) -> Option<String> {
        let rels_name = rels_part_for(document_part);
        let rels = self.part_str(&rels_name).ok()?;
        find_relationship_target(&rels, &rels_name, REL_STYLES)
            .ok()
            .flatten()
            .map(|target| resolve_target(part_dir(document_part), &target))
    }

    /// スタイルIDがテンプレートに定義されているか
    pub fn has_style(&self, document_part: &str, style_id: &str) -> bool {
        let Some(name) = self.styles_part(document_part) else {
            return false;
        };
        let Ok(styles) = self.part_str(&name) else {
            return false;
        };
        let Ok(document) = parse_xml(&styles, &name) else {
            return false;
        };

        document
            .descendants()
            .filter(|node| has_tag(*node, "style"))
            .any(|node| attribute_value(node, "styleId") == Some(style_id))
    }

    /// [Content_Types].xml に拡張子の既定タイプを追加
    pub fn ensure_default_content_type(&mut self, extension: &str, content_type: &str) -> Result<()> {
        let mut xml = self.part_str(CONTENT_TYPES_PART)?;

        let close = {
            let document = parse_xml(&xml, CONTENT_TYPES_PART)?;
            let exists = document
                .descendants()
                .filter(|node| has_tag(*node, "Default"))
                .filter_map(|node| attribute_value(node, "Extension"))
                .any(|ext| ext.eq_ignore_ascii_case(extension));
            if exists {
                return Ok(());
            }
            root_close(&xml, &document, CONTENT_TYPES_PART)?
        };

        xml.insert_str(
            close,
            &format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(extension),
                escape_xml(content_type)
            ),
        );
        self.set_part(CONTENT_TYPES_PART, xml.into_bytes());
        Ok(())
    }

    /// リレーションを追加してIDを返す
    pub fn add_relationship(&mut self, source_part: &str, rel_type: &str, target: &str) -> Result<String> {
        let rels_name = rels_part_for(source_part);
        let mut xml = if self.contains(&rels_name) {
            self.part_str(&rels_name)?
        } else {
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}"></Relationships>"#,
                RELATIONSHIPS_NS
            )
        };

        let (id, close) = {
            let document = parse_xml(&xml, &rels_name)?;
            let next = relationships(&document)
                .iter()
                .filter_map(|rel| rel.id.strip_prefix("rId").and_then(|n| n.parse::<u32>().ok()))
                .max()
                .unwrap_or(0)
                + 1;
            (format!("rId{}", next), root_close(&xml, &document, &rels_name)?)
        };

        xml.insert_str(
            close,
            &format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                id,
                escape_xml(rel_type),
                escape_xml(target)
            ),
        );
        self.set_part(&rels_name, xml.into_bytes());

        Ok(id)
    }

    /// 画像をメディアとして追加し、本文からのリレーションIDを返す
    pub fn add_image(&mut self, document_part: &str, picture: &Picture) -> Result<String> {
        let dir = part_dir(document_part);
        let extension = picture.extension();

        let mut index = 1;
        let media_name = loop {
            let candidate = format!("{}media/image{}.{}", dir, index, extension);
            if !self.contains(&candidate) {
                break candidate;
            }
            index += 1;
        };

        self.set_part(&media_name, picture.bytes().to_vec());
        self.ensure_default_content_type(extension, picture.content_type())?;

        let target = &media_name[dir.len()..];
        self.add_relationship(document_part, REL_IMAGE, target)
    }

    /// 保存（上書き）。[Content_Types].xml を先頭に置く
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut zip = ZipWriter::new(file);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let ordered = self
            .parts
            .iter()
            .filter(|(name, _)| name == CONTENT_TYPES_PART)
            .chain(self.parts.iter().filter(|(name, _)| name != CONTENT_TYPES_PART));

        for (name, content) in ordered {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(content)?;
        }

        zip.finish()?;
        Ok(())
    }
}

/// "word/document.xml" → "word/"
fn part_dir(part: &str) -> &str {
    match part.rfind('/') {
        Some(pos) => &part[..=pos],
        None => "",
    }
}

/// "word/document.xml" → "word/_rels/document.xml.rels"
pub fn rels_part_for(part: &str) -> String {
    let dir = part_dir(part);
    format!("{}_rels/{}.rels", dir, &part[dir.len()..])
}

/// リレーションのTargetをパート名に解決
fn resolve_target(base_dir: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("{}{}", base_dir, target),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// `_rels/*.rels` の1エントリ
#[derive(Debug, Clone, PartialEq, Eq)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

fn relationships(document: &roxmltree::Document<'_>) -> Vec<Relationship> {
    document
        .descendants()
        .filter(|node| has_tag(*node, "Relationship"))
        .filter_map(|node| {
            Some(Relationship {
                id: attribute_value(node, "Id")?.to_string(),
                rel_type: attribute_value(node, "Type")?.to_string(),
                target: attribute_value(node, "Target")?.to_string(),
            })
        })
        .collect()
}

fn find_relationship_target(rels: &str, part: &str, rel_type: &str) -> Result<Option<String>> {
    let document = parse_xml(rels, part)?;
    Ok(relationships(&document)
        .into_iter()
        .find(|rel| rel.rel_type == rel_type)
        .map(|rel| rel.target))
}

/// ルート要素の終了タグの位置（子要素の追加先）
fn root_close(xml: &str, document: &roxmltree::Document<'_>, part: &str) -> Result<usize> {
    let range = document.root_element().range();
    xml[range.clone()]
        .rfind("</")
        .filter(|_| !xml[range.clone()].ends_with("/>"))
        .map(|pos| range.start + pos)
        .ok_or_else(|| ReportError::InvalidTemplate(format!("{} が不正です", part)))
}
