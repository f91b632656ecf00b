//! Cell Module
//!
//! グリッドの1セルを表す型。生の文字列値と、任意の数式・フォント色・背景色を保持します。
//!
//! 数値・真偽値へのアクセサは寛容で、解析に失敗した場合はデフォルト値を返します。
//! 変換は常に`value`に対して行い、`formula`は参照しません。

use serde::Serialize;

use crate::coerce;
use crate::types::CellRecord;

/// 既定のフォント色（黒）。フォント色なしとして扱う
const DEFAULT_FONT_COLOR: &str = "000000";

/// グリッドの1セル
///
/// 構築後は不変です。
///
/// # 使用例
///
/// ```rust
/// use xlsxgrid::Cell;
///
/// let cell = Cell::new(" 12 ");
/// assert_eq!(cell.int_value(), 12);
/// assert_eq!(Cell::new("n/a").int_value_or(-1), -1);
/// assert!(Cell::new("yes").is_true());
/// assert!(!Cell::new("false").is_true());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cell {
    value: String,
    absent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    formula: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    font_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    background_color: Option<String>,
}

impl Cell {
    /// 値を持つセルを生成
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// ソースに存在しない位置のセルを生成（値は空文字列）
    pub fn absent() -> Self {
        Self {
            absent: true,
            ..Self::default()
        }
    }

    /// セルソースのレコードからセルを生成
    ///
    /// `None`の場合は存在しないセルになります。
    pub fn from_record(record: Option<CellRecord>) -> Self {
        match record {
            Some(record) => Self {
                value: record.text,
                absent: false,
                formula: record.formula,
                font_color: record.font_color_hex,
                background_color: record.background_color_hex,
            },
            None => Self::absent(),
        }
    }

    /// 数式を設定
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    /// フォント色を設定
    pub fn with_font_color(mut self, rgb_hex: impl Into<String>) -> Self {
        self.font_color = Some(rgb_hex.into());
        self
    }

    /// 背景色を設定
    pub fn with_background_color(mut self, rgb_hex: impl Into<String>) -> Self {
        self.background_color = Some(rgb_hex.into());
        self
    }

    /// 生の文字列値
    pub fn value(&self) -> &str {
        &self.value
    }

    /// 値が空文字列かどうか
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// ソースにセルが存在しなかったかどうか
    pub fn is_absent(&self) -> bool {
        self.absent
    }

    /// 32ビット整数値（解析できない場合は0）
    pub fn int_value(&self) -> i32 {
        self.int_value_or(0)
    }

    /// 32ビット整数値（解析できない場合は`default`）
    pub fn int_value_or(&self, default: i32) -> i32 {
        coerce::to_int(&self.value).unwrap_or(default)
    }

    /// 64ビット整数値（解析できない場合は0）
    pub fn long_value(&self) -> i64 {
        self.long_value_or(0)
    }

    /// 64ビット整数値（解析できない場合は`default`）
    pub fn long_value_or(&self, default: i64) -> i64 {
        coerce::to_long(&self.value).unwrap_or(default)
    }

    /// 倍精度浮動小数点数値（解析できない場合は0.0）
    pub fn double_value(&self) -> f64 {
        self.double_value_or(0.0)
    }

    /// 倍精度浮動小数点数値（解析できない場合は`default`）
    pub fn double_value_or(&self, default: f64) -> f64 {
        coerce::to_double(&self.value).unwrap_or(default)
    }

    /// 単精度浮動小数点数値（解析できない場合は0.0）
    pub fn float_value(&self) -> f32 {
        self.float_value_or(0.0)
    }

    /// 単精度浮動小数点数値（解析できない場合は`default`）
    pub fn float_value_or(&self, default: f32) -> f32 {
        coerce::to_float(&self.value).unwrap_or(default)
    }

    /// 真偽値として評価
    ///
    /// 大文字化・トリム後の値が`""`、`"0"`、`"FALSE"`のいずれかなら`false`、
    /// それ以外はすべて`true`です。
    pub fn is_true(&self) -> bool {
        let normalized = self.value.trim().to_uppercase();
        !matches!(normalized.as_str(), "" | "0" | "FALSE")
    }

    /// 値が`expected`と完全一致するかどうか
    ///
    /// `None`は存在しないセルにのみ一致します。
    pub fn is_true_value(&self, expected: Option<&str>) -> bool {
        match expected {
            Some(expected) => !self.absent && self.value == expected,
            None => self.absent,
        }
    }

    /// いずれかの候補に一致するかどうか
    pub fn is_true_any(&self, candidates: &[Option<&str>]) -> bool {
        candidates
            .iter()
            .any(|candidate| self.is_true_value(*candidate))
    }

    /// 数式を持つかどうか
    pub fn has_formula(&self) -> bool {
        self.formula.is_some()
    }

    /// 数式文字列
    pub fn formula(&self) -> Option<&str> {
        self.formula.as_deref()
    }

    /// 既定（黒）以外のフォント色を持つかどうか
    pub fn has_font_color(&self) -> bool {
        self.font_color
            .as_deref()
            .is_some_and(|color| !color.eq_ignore_ascii_case(DEFAULT_FONT_COLOR))
    }

    /// フォント色（6桁の16進RGB）
    pub fn font_color_rgb_hex(&self) -> Option<&str> {
        self.font_color.as_deref()
    }

    /// 背景色を持つかどうか
    pub fn has_background_color(&self) -> bool {
        self.background_color.is_some()
    }

    /// 背景色（6桁の16進RGB）
    pub fn background_color_rgb_hex(&self) -> Option<&str> {
        self.background_color.as_deref()
    }
}
