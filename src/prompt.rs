//! 命名パターン・テンプレートの決定
//!
//! 引数 → 設定ファイル → 対話入力の順に決める。

use crate::config::Config;
use crate::error::{ReportError, Result};
use dialoguer::Input;
use photo_report_common::pattern::{unknown_tokens, TOKENS};
use std::path::PathBuf;

/// 対話入力の初期値
pub const DEFAULT_PATTERN: &str = "%f %p";

/// 引数・設定から決まればそれを返す
pub fn pattern_from(flag: Option<&str>, config: &Config) -> Option<String> {
    flag.map(str::to_string)
        .or_else(|| config.default_pattern.clone())
}

/// 命名パターンを決定（未指定なら対話入力）
pub fn resolve_pattern(flag: Option<&str>, config: &Config) -> Result<String> {
    let pattern = match pattern_from(flag, config) {
        Some(pattern) => pattern,
        None => ask_pattern()?,
    };

    let unknown = unknown_tokens(&pattern);
    if !unknown.is_empty() {
        eprintln!(
            "⚠ 未対応のトークンはそのまま出力されます: {}",
            unknown.join(", ")
        );
    }

    Ok(pattern)
}

fn ask_pattern() -> Result<String> {
    println!("使えるトークン:");
    for token in TOKENS {
        println!("  {}  {}", token.literal(), token.description());
    }

    Input::new()
        .with_prompt("命名パターン")
        .default(DEFAULT_PATTERN.to_string())
        .allow_empty(true)
        .interact_text()
        .map_err(|e| ReportError::Prompt(e.to_string()))
}

/// テンプレートを決定（引数 → 設定）
pub fn resolve_template(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    flag.or_else(|| config.default_template.clone())
        .ok_or(ReportError::MissingTemplate)
}
