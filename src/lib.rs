//! Photo Report
//!
//! 写真フォルダからWord（.docx）写真報告書を生成する

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod prompt;
pub mod scanner;
