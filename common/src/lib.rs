//! Photo Report Common Library
//!
//! CLIとライブラリで共有される型とユーティリティ（IOなし）

pub mod error;
pub mod layout;
pub mod pattern;

pub use error::{Error, Result};
pub use layout::{GridLayout, ImageSize};
pub use pattern::{convert, CaptionParts, PatternToken, TOKENS};
