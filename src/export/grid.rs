//! 2×2グリッド（表）と改ページのXML生成

use super::{attribute_value, escape_xml, has_tag};
use photo_report_common::layout::{GridLayout, ImageSize};
use roxmltree::Document;

/// 改ページ段落
pub const PAGE_BREAK_XML: &str = r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#;

/// 画像を読み込めなかったセルの表示
pub const PLACEHOLDER_PREFIX: &str = "Error loading: ";

/// 埋め込み画像の参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePicture {
    /// 本文 → メディアのリレーションID
    pub relationship_id: String,
    /// wp:docPr のID（文書内で一意）
    pub doc_pr_id: u32,
    pub name: String,
    pub size: ImageSize,
}

/// セルの中身
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CellContent {
    /// 未使用（空段落のみ）
    #[default]
    Empty,
    /// 太字・中央揃えのキャプション
    Caption(String),
    /// 中央揃えの画像
    Picture(InlinePicture),
    /// 読み込み失敗の表示
    Placeholder(String),
}

impl CellContent {
    pub fn placeholder_for(path: &std::path::Path) -> Self {
        Self::Placeholder(format!("{}{}", PLACEHOLDER_PREFIX, path.display()))
    }

    fn to_xml(&self) -> String {
        match self {
            Self::Empty => "<w:p/>".to_string(),
            Self::Caption(text) => format!(
                r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                escape_xml(text)
            ),
            Self::Picture(picture) => format!(
                r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr>{}</w:p>"#,
                inline_picture_run(picture)
            ),
            Self::Placeholder(text) => format!(
                r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                escape_xml(text)
            ),
        }
    }
}

/// 1ページ分の表
#[derive(Debug, Clone)]
pub struct Grid {
    layout: GridLayout,
    column_width_twips: i64,
    style_id: Option<String>,
    cells: Vec<Vec<CellContent>>,
}

impl Grid {
    pub fn new(layout: GridLayout, column_width_twips: i64, style_id: Option<String>) -> Self {
        Self {
            layout,
            column_width_twips,
            style_id,
            cells: vec![vec![CellContent::Empty; layout.cols]; layout.rows],
        }
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    /// 範囲外は無視する
    pub fn set(&mut self, row: usize, col: usize, content: CellContent) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = content;
        }
    }

    #[cfg(test)]
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellContent> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<w:tbl><w:tblPr>");
        if let Some(style) = &self.style_id {
            xml.push_str(&format!(r#"<w:tblStyle w:val="{}"/>"#, escape_xml(style)));
        }
        xml.push_str(r#"<w:tblW w:type="auto" w:w="0"/><w:tblLook w:firstColumn="1" w:firstRow="1" w:lastColumn="0" w:lastRow="0" w:noHBand="0" w:noVBand="1" w:val="04A0"/></w:tblPr><w:tblGrid>"#);
        for _ in 0..self.layout.cols {
            xml.push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, self.column_width_twips));
        }
        xml.push_str("</w:tblGrid>");

        for row in &self.cells {
            xml.push_str("<w:tr>");
            for cell in row {
                xml.push_str(&format!(
                    r#"<w:tc><w:tcPr><w:tcW w:type="dxa" w:w="{}"/></w:tcPr>{}</w:tc>"#,
                    self.column_width_twips,
                    cell.to_xml()
                ));
            }
            xml.push_str("</w:tr>");
        }

        xml.push_str("</w:tbl>");
        xml
    }
}

fn inline_picture_run(picture: &InlinePicture) -> String {
    let InlinePicture {
        relationship_id,
        doc_pr_id,
        name,
        size,
    } = picture;
    let (cx, cy) = (size.width_emu, size.height_emu);
    let name = escape_xml(name);

    format!(
        concat!(
            r#"<w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/>"#,
            r#"<wp:docPr id="{id}" name="Picture {id}"/>"#,
            r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
            r#"<a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:nvPicPr><pic:cNvPr id="0" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" r:embed="{rid}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            r#"</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#,
        ),
        cx = cx,
        cy = cy,
        id = doc_pr_id,
        name = name,
        rid = escape_xml(relationship_id),
    )
}

/// 文書内で使用済みの wp:docPr ID の最大値
pub fn max_doc_pr_id(document_xml: &str) -> u32 {
    let Ok(document) = Document::parse(document_xml) else {
        return 0;
    };

    document
        .descendants()
        .filter(|node| has_tag(*node, "docPr"))
        .filter_map(|node| attribute_value(node, "id"))
        .filter_map(|id| id.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn picture() -> InlinePicture {
        InlinePicture {
            relationship_id: "rId5".into(),
            doc_pr_id: 3,
            name: "a&b.png".into(),
            size: ImageSize::scaled_to_width(200, 100, 4.0),
        }
    }

    #[test]
    fn test_empty_grid_structure() {
        let grid = Grid::new(GridLayout::two_by_two(), 6480, None);
        let xml = grid.to_xml();
        assert_eq!(xml.matches("<w:tr>").count(), 2);
        assert_eq!(xml.matches("<w:tc>").count(), 4);
        assert_eq!(xml.matches(r#"<w:gridCol w:w="6480"/>"#).count(), 2);
        assert_eq!(xml.matches("<w:p/>").count(), 4);
        assert!(!xml.contains("w:tblStyle"));
    }

    #[test]
    fn test_table_style() {
        let grid = Grid::new(GridLayout::two_by_two(), 100, Some("TableGrid".into()));
        assert!(grid.to_xml().contains(r#"<w:tblStyle w:val="TableGrid"/>"#));
    }

    #[test]
    fn test_caption_is_bold_centered_and_escaped() {
        let xml = CellContent::Caption("A<B & \"C\"".into()).to_xml();
        assert!(xml.contains(r#"<w:jc w:val="center"/>"#));
        assert!(xml.contains("<w:b/>"));
        assert!(xml.contains("A&lt;B &amp; &quot;C&quot;"));
    }

    #[test]
    fn test_placeholder_contains_path() {
        let content = CellContent::placeholder_for(Path::new("/photos/01-Yard/bad.jpg"));
        assert_eq!(
            content,
            CellContent::Placeholder("Error loading: /photos/01-Yard/bad.jpg".into())
        );
        assert!(content.to_xml().contains("Error loading: /photos/01-Yard/bad.jpg"));
    }

    #[test]
    fn test_picture_xml() {
        let xml = CellContent::Picture(picture()).to_xml();
        assert!(xml.contains(r#"r:embed="rId5""#));
        assert!(xml.contains(r#"<wp:extent cx="3657600" cy="1828800"/>"#));
        assert!(xml.contains(r#"<wp:docPr id="3" name="Picture 3"/>"#));
        assert!(xml.contains(r#"name="a&amp;b.png""#));
    }

    #[test]
    fn test_set_out_of_range_is_ignored() {
        let mut grid = Grid::new(GridLayout::two_by_two(), 100, None);
        grid.set(5, 5, CellContent::Caption("x".into()));
        grid.set(0, 1, CellContent::Caption("right".into()));
        assert_eq!(grid.cell(0, 0), Some(&CellContent::Empty));
        assert_eq!(grid.cell(0, 1), Some(&CellContent::Caption("right".into())));
        assert_eq!(grid.cell(5, 5), None);
    }

    #[test]
    fn test_max_doc_pr_id() {
        assert_eq!(max_doc_pr_id(r#"<w:body xmlns:w="w"/>"#), 0);
        let xml = r#"<w:body xmlns:w="w" xmlns:wp="wp"><wp:docPr id="4" name="a"/><wp:docPr name="b" id="12"/></w:body>"#;
        assert_eq!(max_doc_pr_id(xml), 12);
        assert_eq!(max_doc_pr_id("<broken"), 0);
    }
}
