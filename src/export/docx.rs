//! 写真報告書（docx）の組み立て
//!
//! テンプレートに横向きセクションを追加し、写真を2枚ずつ
//! 2×2の表（上段: キャプション、下段: 画像）に配置する。
//! 表ごとに改ページを入れる。
//!
//! 画像1枚の読み込み失敗はそのセルにエラー表示を入れて続行する。
//! テンプレートや保存先の問題はエラーとして返す。

use super::grid::{self, CellContent, Grid, InlinePicture, PAGE_BREAK_XML};
use super::media::Picture;
use super::package::DocxPackage;
use super::section;
use crate::error::{ReportError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use photo_report_common::layout::{
    is_valid_image_width, GridLayout, ImageSize, DEFAULT_IMAGE_WIDTH_IN, PHOTOS_PER_PAGE,
};
use photo_report_common::pattern::convert;
use std::path::{Path, PathBuf};

/// テンプレートにこのスタイルがあれば表に適用する
pub const TABLE_STYLE_ID: &str = "TableGrid";

#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// 画像幅（インチ）
    pub image_width_in: f64,
    /// 進捗バーを表示
    pub show_progress: bool,
    /// 失敗した画像の詳細を表示
    pub verbose: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            image_width_in: DEFAULT_IMAGE_WIDTH_IN,
            show_progress: false,
            verbose: false,
        }
    }
}

/// 1回の生成結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSummary {
    pub output: PathBuf,
    pub entries: usize,
    pub grids: usize,
    pub page_breaks: usize,
    pub pictures: usize,
    /// エラー表示に置き換えた画像
    pub placeholders: Vec<PathBuf>,
}

/// 1セル分の結果
enum EntryOutcome {
    Embedded,
    Failed(String),
}

/// 報告書を生成して保存
pub fn generate_report(
    paths: &[PathBuf],
    pattern: &str,
    template: &Path,
    output: &Path,
    options: &ReportOptions,
) -> Result<ReportSummary> {
    if !is_valid_image_width(options.image_width_in) {
        return Err(ReportError::DocxGeneration(format!(
            "画像幅が不正です: {}",
            options.image_width_in
        )));
    }

    let mut package = DocxPackage::open(template)?;
    let document_part = package.main_document_part()?;
    let mut document = package.part_str(&document_part)?;

    let geometry = section::append_landscape_section(&mut document)?;
    let layout = GridLayout::two_by_two();
    let column_width = layout.column_width_twips(geometry.usable_width_twips());
    let style = package
        .has_style(&document_part, TABLE_STYLE_ID)
        .then(|| TABLE_STYLE_ID.to_string());

    let mut assembler = Assembler {
        package: &mut package,
        document_part: &document_part,
        pattern,
        options,
        next_doc_pr_id: grid::max_doc_pr_id(&document) + 1,
    };

    let progress = progress_bar(paths.len() as u64, options.show_progress);
    let mut summary = ReportSummary {
        output: output.to_path_buf(),
        entries: paths.len(),
        ..Default::default()
    };
    let mut body = String::new();

    for pair in paths.chunks(PHOTOS_PER_PAGE) {
        let mut table = Grid::new(layout, column_width, style.clone());

        for (col, path) in pair.iter().enumerate() {
            progress.set_message(display_name(path));
            match assembler.add_entry(&mut table, col, path)? {
                EntryOutcome::Embedded => summary.pictures += 1,
                EntryOutcome::Failed(reason) => {
                    if options.verbose {
                        if progress.is_hidden() {
                            eprintln!("⚠ {}", reason);
                        } else {
                            progress.println(format!("⚠ {}", reason));
                        }
                    }
                    summary.placeholders.push(path.clone());
                }
            }
            progress.inc(1);
        }

        body.push_str(&table.to_xml());
        body.push_str(PAGE_BREAK_XML);
        summary.grids += 1;
        summary.page_breaks += 1;
    }
    progress.finish_and_clear();

    section::insert_before_sentinel(&mut document, &body)?;
    package.set_part(&document_part, document.into_bytes());
    package.save(output)?;

    Ok(summary)
}

struct Assembler<'a> {
    package: &'a mut DocxPackage,
    document_part: &'a str,
    pattern: &'a str,
    options: &'a ReportOptions,
    next_doc_pr_id: u32,
}

impl Assembler<'_> {
    /// 1列分（キャプション + 画像）を書き込む
    ///
    /// 画像側の失敗は `Failed` として返し、パッケージ操作の失敗のみエラーにする。
    fn add_entry(&mut self, table: &mut Grid, col: usize, path: &Path) -> Result<EntryOutcome> {
        let layout = table.layout();

        let caption = match convert(path, self.pattern) {
            Ok(caption) => caption,
            Err(e) => {
                table.set(layout.image_row, col, CellContent::placeholder_for(path));
                return Ok(EntryOutcome::Failed(e.to_string()));
            }
        };
        table.set(layout.caption_row, col, CellContent::Caption(caption));

        let picture = match Picture::load(path) {
            Ok(picture) => picture,
            Err(e) => {
                table.set(layout.image_row, col, CellContent::placeholder_for(path));
                return Ok(EntryOutcome::Failed(e.to_string()));
            }
        };

        let relationship_id = self.package.add_image(self.document_part, &picture)?;
        let (width_px, height_px) = picture.dimensions();
        let doc_pr_id = self.next_doc_pr_id;
        self.next_doc_pr_id += 1;

        table.set(
            layout.image_row,
            col,
            CellContent::Picture(InlinePicture {
                relationship_id,
                doc_pr_id,
                name: display_name(path),
                size: ImageSize::scaled_to_width(width_px, height_px, self.options.image_width_in),
            }),
        );

        Ok(EntryOutcome::Embedded)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len);
    let style = ProgressStyle::with_template("[{bar:40.green/238}] {pos:>3}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
    bar.set_style(style);
    bar
}
