//! 横向きセクションの追加
//!
//! 本文末尾の `w:sectPr`（最終セクションの設定）を段落内に複製して
//! テンプレート側のセクションを閉じ、末尾の `w:sectPr` を横向きに書き換える。
//! 以降に追加する表・改ページはすべて横向きセクションに入る。
//!
//! 要素の位置は roxmltree で特定し、書き換えは元の文字列を切り貼りする。

use super::{attribute_value, has_tag, parse_xml};
use crate::error::{ReportError, Result};
use photo_report_common::layout::{DEFAULT_MARGIN_TWIPS, LETTER_HEIGHT_TWIPS, LETTER_WIDTH_TWIPS};
use roxmltree::{Document, Node};
use std::ops::Range;

const DOCUMENT_PART: &str = "document.xml";

/// セクションのページ寸法（twips）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionGeometry {
    pub page_width_twips: i64,
    pub page_height_twips: i64,
    pub margin_left_twips: i64,
    pub margin_right_twips: i64,
}

impl SectionGeometry {
    /// 幅と高さを入れ替えた後の寸法
    fn landscape_of(sect_pr: Node<'_, '_>) -> Self {
        let pg_sz = child_element(sect_pr, "pgSz");
        let pg_mar = child_element(sect_pr, "pgMar");

        Self {
            page_width_twips: pg_sz.and_then(|n| twips(n, "h")).unwrap_or(LETTER_HEIGHT_TWIPS),
            page_height_twips: pg_sz.and_then(|n| twips(n, "w")).unwrap_or(LETTER_WIDTH_TWIPS),
            margin_left_twips: pg_mar.and_then(|n| twips(n, "left")).unwrap_or(DEFAULT_MARGIN_TWIPS),
            margin_right_twips: pg_mar.and_then(|n| twips(n, "right")).unwrap_or(DEFAULT_MARGIN_TWIPS),
        }
    }

    /// 本文幅（ページ幅 - 左右余白）
    pub fn usable_width_twips(&self) -> i64 {
        self.page_width_twips - self.margin_left_twips - self.margin_right_twips
    }

    #[cfg(test)]
    pub fn is_landscape(&self) -> bool {
        self.page_width_twips > self.page_height_twips
    }
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| has_tag(*child, name))
}

fn twips(node: Node<'_, '_>, key: &str) -> Option<i64> {
    attribute_value(node, key).and_then(|v| v.trim().parse::<i64>().ok())
}

fn default_sect_pr() -> String {
    format!(
        r#"<w:sectPr><w:pgSz w:w="{}" w:h="{}"/><w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#,
        LETTER_WIDTH_TWIPS,
        LETTER_HEIGHT_TWIPS,
        m = DEFAULT_MARGIN_TWIPS
    )
}

fn find_body<'a, 'input>(doc: &'a Document<'input>) -> Result<Node<'a, 'input>> {
    doc.descendants()
        .find(|node| has_tag(*node, "body"))
        .ok_or_else(|| ReportError::InvalidTemplate("w:body がありません".into()))
}

/// 本文の最後の子要素である `w:sectPr`
fn find_sentinel<'a, 'input>(body: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    body.children()
        .filter(|node| node.is_element())
        .last()
        .filter(|node| has_tag(*node, "sectPr"))
}

/// 終了タグの開始位置（`<w:body/>` のときは None）
fn close_tag_start(xml: &str, node: Node<'_, '_>) -> Option<usize> {
    let range = node.range();
    let text = &xml[range.clone()];
    if text.ends_with("/>") {
        return None;
    }
    text.rfind("</").map(|pos| range.start + pos)
}

/// 開始タグ（自己終了タグは `<...>` に直す）
fn open_tag(xml: &str, node: Node<'_, '_>) -> String {
    let range = node.range();
    if let Some(first) = node.first_child() {
        return xml[range.start..first.range().start].to_string();
    }

    let text = &xml[range.clone()];
    match close_tag_start(xml, node) {
        Some(close) => xml[range.start..close].to_string(),
        None => format!("{}>", text.trim_end_matches("/>").trim_end()),
    }
}

/// 子ノードをそのまま連結した文字列
fn inner_xml(xml: &str, node: Node<'_, '_>) -> Option<String> {
    let first = node.first_child()?;
    let last = node.last_child()?;
    Some(xml[first.range().start..last.range().end].to_string())
}

/// 末尾セクションがなければ US Letter 縦の既定値を置く
fn ensure_sentinel(xml: &mut String) -> Result<()> {
    let splice: Option<(Range<usize>, String)> = {
        let doc = parse_xml(xml, DOCUMENT_PART)?;
        let body = find_body(&doc)?;
        if find_sentinel(body).is_some() {
            None
        } else {
            match close_tag_start(xml, body) {
                Some(at) => Some((at..at, default_sect_pr())),
                None => {
                    let open = open_tag(xml, body);
                    let name = open[1..]
                        .split(|c: char| c.is_whitespace() || c == '>')
                        .next()
                        .unwrap_or("w:body")
                        .to_string();
                    Some((body.range(), format!("{}{}</{}>", open, default_sect_pr(), name)))
                }
            }
        }
    };

    if let Some((range, text)) = splice {
        xml.replace_range(range, &text);
    }
    Ok(())
}

/// 横向きセクションを追加し、新しいセクションの寸法を返す
pub fn append_landscape_section(xml: &mut String) -> Result<SectionGeometry> {
    ensure_sentinel(xml)?;

    let (range, replacement, geometry) = {
        let doc = parse_xml(xml, DOCUMENT_PART)?;
        let sect_pr = find_body(&doc)
            .ok()
            .and_then(find_sentinel)
            .ok_or_else(|| ReportError::InvalidTemplate("末尾の w:sectPr がありません".into()))?;

        // 区切り段落側は rsid 属性を持たない複製
        let section_break = match inner_xml(xml, sect_pr) {
            Some(inner) => format!("<w:p><w:pPr><w:sectPr>{}</w:sectPr></w:pPr></w:p>", inner),
            None => "<w:p><w:pPr><w:sectPr/></w:pPr></w:p>".to_string(),
        };

        (
            sect_pr.range(),
            format!("{}{}", section_break, landscape_sect_pr(xml, sect_pr)),
            SectionGeometry::landscape_of(sect_pr),
        )
    };

    xml.replace_range(range, &replacement);
    Ok(geometry)
}

/// 末尾セクションの直前（本文の最後）に挿入
pub fn insert_before_sentinel(xml: &mut String, fragment: &str) -> Result<()> {
    let at = {
        let doc = parse_xml(xml, DOCUMENT_PART)?;
        let body = find_body(&doc)?;
        match find_sentinel(body) {
            Some(sect_pr) => sect_pr.range().start,
            None => close_tag_start(xml, body)
                .ok_or_else(|| ReportError::InvalidTemplate("w:body が空要素です".into()))?,
        }
    };

    xml.insert_str(at, fragment);
    Ok(())
}

/// ページの幅・高さを入れ替え、orient="landscape" にした sectPr
///
/// ヘッダー/フッター参照と区切り種別は引き継がない。
fn landscape_sect_pr(xml: &str, sect_pr: Node<'_, '_>) -> String {
    let has_pg_sz = child_element(sect_pr, "pgSz").is_some();
    let mut inner = String::new();

    if !has_pg_sz && child_element(sect_pr, "pgMar").is_none() {
        inner.push_str(&landscape_pg_sz(LETTER_WIDTH_TWIPS, LETTER_HEIGHT_TWIPS, None));
    }

    for child in sect_pr.children() {
        if ["headerReference", "footerReference", "type"]
            .iter()
            .any(|name| has_tag(child, name))
        {
            continue;
        }

        if has_tag(child, "pgSz") {
            inner.push_str(&landscape_pg_sz(
                twips(child, "w").unwrap_or(LETTER_WIDTH_TWIPS),
                twips(child, "h").unwrap_or(LETTER_HEIGHT_TWIPS),
                attribute_value(child, "code"),
            ));
            continue;
        }

        if has_tag(child, "pgMar") && !has_pg_sz {
            inner.push_str(&landscape_pg_sz(LETTER_WIDTH_TWIPS, LETTER_HEIGHT_TWIPS, None));
        }
        inner.push_str(&xml[child.range()]);
    }

    format!("{}{}</w:sectPr>", open_tag(xml, sect_pr), inner)
}

/// テンプレートの幅と高さをそのまま入れ替える
fn landscape_pg_sz(width: i64, height: i64, code: Option<&str>) -> String {
    match code {
        Some(code) => format!(
            r#"<w:pgSz w:w="{}" w:h="{}" w:orient="landscape" w:code="{}"/>"#,
            height, width, code
        ),
        None => format!(r#"<w:pgSz w:w="{}" w:h="{}" w:orient="landscape"/>"#, height, width),
    }
}
