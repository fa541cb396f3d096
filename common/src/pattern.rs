//! 命名パターン変換モジュール
//!
//! ファイルパスからキャプション文字列を生成する。
//!
//! | トークン | 置換値                                   | 例 (`/archive/007-Kitchen/photo (2).jpg`) |
//! |----------|------------------------------------------|-------------------------------------------|
//! | `%f`     | フォルダ名（先頭の `NNN-` を除去）       | `Kitchen`                                 |
//! | `%F`     | フォルダ名（そのまま）                   | `007-Kitchen`                             |
//! | `%p`     | ファイル名（末尾の ` (N)` を除去）       | `photo`                                   |
//! | `%P`     | ファイル名（拡張子なし、そのまま）       | `photo (2)`                               |
//!
//! 置換は1パスで行い、置換後の値に含まれるトークンは再展開しない。

use crate::error::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::path::Path;

/// パターンで使えるトークン
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternToken {
    /// `%f`
    CleanFolder,
    /// `%F`
    Folder,
    /// `%p`
    CleanStem,
    /// `%P`
    Stem,
}

impl PatternToken {
    /// `%` の次の1文字からトークンを判定
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'f' => Some(Self::CleanFolder),
            'F' => Some(Self::Folder),
            'p' => Some(Self::CleanStem),
            'P' => Some(Self::Stem),
            _ => None,
        }
    }

    pub fn literal(&self) -> &'static str {
        match self {
            Self::CleanFolder => "%f",
            Self::Folder => "%F",
            Self::CleanStem => "%p",
            Self::Stem => "%P",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::CleanFolder => "フォルダ名（先頭の番号-を除去）",
            Self::Folder => "フォルダ名",
            Self::CleanStem => "ファイル名（末尾の (N) を除去）",
            Self::Stem => "ファイル名（拡張子なし）",
        }
    }
}

/// 置換順（%f, %F, %p, %P）
pub const TOKENS: [PatternToken; 4] = [
    PatternToken::CleanFolder,
    PatternToken::Folder,
    PatternToken::CleanStem,
    PatternToken::Stem,
];

fn folder_prefix_re() -> &'static Regex {
    lazy_static::lazy_static! {
        // 並び順用の番号プレフィックス（例: "007-"）
        static ref FOLDER_PREFIX_RE: Regex = Regex::new(r"^\d+-").unwrap();
    }

    &FOLDER_PREFIX_RE
}

fn duplicate_suffix_re() -> &'static Regex {
    lazy_static::lazy_static! {
        // OSが付ける重複番号（例: " (2)"）
        static ref DUPLICATE_SUFFIX_RE: Regex = Regex::new(r"\s\(\d+\)$").unwrap();
    }

    &DUPLICATE_SUFFIX_RE
}

/// フォルダ名から先頭の `数字-` を1つ除去
pub fn clean_folder_name(name: &str) -> String {
    folder_prefix_re().replace(name, "").into_owned()
}

/// ファイル名から末尾の ` (N)` を1つ除去
pub fn strip_duplicate_suffix(stem: &str) -> String {
    duplicate_suffix_re().replace(stem, "").into_owned()
}

/// パスから導出したキャプション部品
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionParts {
    pub clean_folder: String,
    pub folder: String,
    pub clean_stem: String,
    pub stem: String,
}

impl CaptionParts {
    pub fn from_path(path: &Path) -> Result<Self> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| Error::NoParent(path.display().to_string()))?;
        // ルート直下はフォルダ名が空
        let folder = parent
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            clean_folder: clean_folder_name(&folder),
            clean_stem: strip_duplicate_suffix(&stem),
            folder,
            stem,
        })
    }

    pub fn value(&self, token: PatternToken) -> &str {
        match token {
            PatternToken::CleanFolder => &self.clean_folder,
            PatternToken::Folder => &self.folder,
            PatternToken::CleanStem => &self.clean_stem,
            PatternToken::Stem => &self.stem,
        }
    }

    /// パターンを展開（1パス）
    pub fn render(&self, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() + 16);
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '%' {
                if let Some(token) = chars.peek().copied().and_then(PatternToken::from_char) {
                    chars.next();
                    out.push_str(self.value(token));
                    continue;
                }
            }
            out.push(c);
        }

        out
    }
}

/// ファイルパスとパターンからキャプションを生成
pub fn convert(path: &Path, pattern: &str) -> Result<String> {
    Ok(CaptionParts::from_path(path)?.render(pattern))
}

/// 未対応の `%x` を抽出（警告表示用）
pub fn unknown_tokens(pattern: &str) -> Vec<String> {
    let mut unknown = Vec::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            continue;
        }
        match chars.peek().copied() {
            Some(next) if PatternToken::from_char(next).is_some() => {
                chars.next();
            }
            Some('%') | None => {}
            Some(next) => {
                let token = format!("%{}", next);
                if !unknown.contains(&token) {
                    unknown.push(token);
                }
                chars.next();
            }
        }
    }

    unknown
}
