//! レイアウト設定モジュール
//!
//! 写真報告書のグリッド定義と単位変換

// ============================================
// 単位
// ============================================

/// 1インチ = 914400 EMU（DrawingML）
pub const EMU_PER_INCH: i64 = 914_400;

/// 1インチ = 1440 twips（WordprocessingML）
pub const TWIPS_PER_INCH: i64 = 1_440;

/// 1 twip = 635 EMU
pub const EMU_PER_TWIP: i64 = EMU_PER_INCH / TWIPS_PER_INCH;

// ============================================
// ページ・画像
// ============================================

/// sectPr が無いテンプレート用の既定値（US Letter 縦、twips）
pub const LETTER_WIDTH_TWIPS: i64 = 12_240;
pub const LETTER_HEIGHT_TWIPS: i64 = 15_840;
pub const DEFAULT_MARGIN_TWIPS: i64 = 1_440;

/// 画像幅（インチ）
pub const DEFAULT_IMAGE_WIDTH_IN: f64 = 4.0;
pub const MAX_IMAGE_WIDTH_IN: f64 = 9.0;

/// 1ページあたりの写真数
pub const PHOTOS_PER_PAGE: usize = 2;

// ============================================
// グリッド
// ============================================

/// 1ページ分の表（行0: キャプション、行1: 画像）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub caption_row: usize,
    pub image_row: usize,
}

impl GridLayout {
    /// 2行×2列
    pub const fn two_by_two() -> Self {
        Self {
            rows: 2,
            cols: PHOTOS_PER_PAGE,
            caption_row: 0,
            image_row: 1,
        }
    }

    /// n枚に必要なグリッド数（= 改ページ数）
    pub fn grid_count(&self, photos: usize) -> usize {
        photos.div_ceil(self.cols)
    }

    /// 列幅（利用可能幅を均等割り、twips）
    pub fn column_width_twips(&self, usable_width_twips: i64) -> i64 {
        (usable_width_twips / self.cols as i64).max(0)
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::two_by_two()
    }
}

/// 埋め込み画像の表示サイズ（EMU）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width_emu: i64,
    pub height_emu: i64,
}

impl ImageSize {
    /// 幅を固定し、縦横比を保って高さを決める
    pub fn scaled_to_width(px_width: u32, px_height: u32, width_in: f64) -> Self {
        let width_emu = inches_to_emu(width_in);
        let height_emu = if px_width == 0 {
            0
        } else {
            (width_emu as f64 * px_height as f64 / px_width as f64).round() as i64
        };

        Self { width_emu, height_emu }
    }
}

// ============================================
// ヘルパー関数
// ============================================

/// インチ → EMU 変換
#[inline]
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH as f64).round() as i64
}

/// twips → EMU 変換
#[inline]
pub fn twips_to_emu(twips: i64) -> i64 {
    twips * EMU_PER_TWIP
}

/// 画像幅として妥当か
pub fn is_valid_image_width(inches: f64) -> bool {
    inches.is_finite() && inches > 0.0 && inches <= MAX_IMAGE_WIDTH_IN
}
