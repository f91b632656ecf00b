//! Types Module
//!
//! セルソースとグリッド構築の間で受け渡す共通データ型を定義するモジュール。

use crate::column::{index_to_letter, letter_to_index};

/// セルソースから読み取った1セル分の生データ
///
/// `text`はソース側で文字列化済みの値です（数値書式の解釈はソースの責務）。
/// 色は先頭のアルファ成分を含まない6桁の16進RGB（例: `"FF0000"`）です。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellRecord {
    /// 表示文字列
    pub text: String,

    /// 数式文字列（数式セルの場合）
    pub formula: Option<String>,

    /// フォント色（RGB 16進）
    pub font_color_hex: Option<String>,

    /// 背景色（RGB 16進）
    pub background_color_hex: Option<String>,
}

impl CellRecord {
    /// 値のみを持つレコードを生成
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// 数式を設定
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    /// フォント色を設定
    pub fn with_font_color(mut self, rgb_hex: impl Into<String>) -> Self {
        self.font_color_hex = Some(rgb_hex.into());
        self
    }

    /// 背景色を設定
    pub fn with_background_color(mut self, rgb_hex: impl Into<String>) -> Self {
        self.background_color_hex = Some(rgb_hex.into());
        self
    }
}

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の参照を座標に変換（例: "B3" -> (2, 1)）
    ///
    /// 列文字、行番号の順で構成されていない参照や、行番号0は`None`になります。
    pub fn parse_a1(reference: &str) -> Option<Self> {
        let split = reference.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = reference.split_at(split);

        let col = letter_to_index(letters).ok()?;
        let row = digits.parse::<u32>().ok()?;
        if row == 0 {
            return None;
        }

        Some(Self::new(row - 1, u32::try_from(col - 1).ok()?))
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    #[allow(clippy::wrong_self_convention)]
    pub fn to_a1_notation(&self) -> String {
        // col + 1 は常に1以上なので変換は失敗しない
        let col = index_to_letter(self.col as usize + 1).unwrap_or_default();
        format!("{}{}", col, self.row + 1)
    }
}
