//! Row Module
//!
//! グリッドの1行。1始まりの列番号または列文字列でセルを参照します。

use serde::Serialize;

use crate::cell::Cell;
use crate::column::{index_to_letter, ColumnRef};
use crate::error::{Result, XlsxGridError};

/// グリッドの1行
///
/// 内部は0始まり、外部からの参照は1始まりです。
///
/// ```rust
/// use xlsxgrid::{Cell, Row};
///
/// # fn main() -> Result<(), xlsxgrid::XlsxGridError> {
/// let row = Row::new(vec![Cell::new("1"), Cell::new("2"), Cell::new("x")]);
/// assert_eq!(row.value(2)?, "2");
/// assert_eq!(row.int_value("B")?, 2);
/// assert_eq!(row.last_column(), "C");
/// assert!(row.cell(4).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    /// セル列から行を生成
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// セルを取得（1始まり、または列文字列）
    ///
    /// 範囲外の場合は要求された列とこの行の最後の列を含む`ColumnOutOfRange`を返します。
    pub fn cell<C: ColumnRef>(&self, col: C) -> Result<&Cell> {
        let index = col.column_index()?;
        index
            .checked_sub(1)
            .and_then(|i| self.cells.get(i))
            .ok_or_else(|| XlsxGridError::ColumnOutOfRange {
                col: index,
                last_col: self.last_column(),
            })
    }

    /// セルの生の値
    pub fn value<C: ColumnRef>(&self, col: C) -> Result<&str> {
        Ok(self.cell(col)?.value())
    }

    /// セルの32ビット整数値
    pub fn int_value<C: ColumnRef>(&self, col: C) -> Result<i32> {
        Ok(self.cell(col)?.int_value())
    }

    /// セルの32ビット整数値（デフォルト値指定）
    pub fn int_value_or<C: ColumnRef>(&self, col: C, default: i32) -> Result<i32> {
        Ok(self.cell(col)?.int_value_or(default))
    }

    /// セルの64ビット整数値
    pub fn long_value<C: ColumnRef>(&self, col: C) -> Result<i64> {
        Ok(self.cell(col)?.long_value())
    }

    /// セルの64ビット整数値（デフォルト値指定）
    pub fn long_value_or<C: ColumnRef>(&self, col: C, default: i64) -> Result<i64> {
        Ok(self.cell(col)?.long_value_or(default))
    }

    /// セルの倍精度浮動小数点数値
    pub fn double_value<C: ColumnRef>(&self, col: C) -> Result<f64> {
        Ok(self.cell(col)?.double_value())
    }

    /// セルの倍精度浮動小数点数値（デフォルト値指定）
    pub fn double_value_or<C: ColumnRef>(&self, col: C, default: f64) -> Result<f64> {
        Ok(self.cell(col)?.double_value_or(default))
    }

    /// セルの単精度浮動小数点数値
    pub fn float_value<C: ColumnRef>(&self, col: C) -> Result<f32> {
        Ok(self.cell(col)?.float_value())
    }

    /// セルの単精度浮動小数点数値（デフォルト値指定）
    pub fn float_value_or<C: ColumnRef>(&self, col: C, default: f32) -> Result<f32> {
        Ok(self.cell(col)?.float_value_or(default))
    }

    /// セルの真偽値
    pub fn is_true<C: ColumnRef>(&self, col: C) -> Result<bool> {
        Ok(self.cell(col)?.is_true())
    }

    /// セルの値が空かどうか
    pub fn is_cell_empty<C: ColumnRef>(&self, col: C) -> Result<bool> {
        Ok(self.cell(col)?.is_empty())
    }

    /// 列数
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// 列を1つも持たないかどうか
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 値を持つセルが1つもないかどうか（トリム判定に使用）
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    /// すべてのセル
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// セルのイテレータ
    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    /// 最後の有効な列の列文字列（列がない場合は空文字列）
    pub fn last_column(&self) -> String {
        index_to_letter(self.cells.len()).unwrap_or_default()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_columns() -> Row {
        Row::new(["10", "x", "", "1.5", "TRUE"].into_iter().map(Cell::new).collect())
    }

    #[test]
    fn test_cell_by_index_and_letter() {
        let row = five_columns();
        assert_eq!(row.value(1).unwrap(), "10");
        assert_eq!(row.value("A").unwrap(), "10");
        assert_eq!(row.value("e").unwrap(), "TRUE");
        assert_eq!(row.value('B').unwrap(), "x");
        assert_eq!(row.value(String::from("D")).unwrap(), "1.5");
    }

    #[test]
    fn test_out_of_range_message() {
        let row = five_columns();
        let err = row.cell(99).unwrap_err();
        match &err {
            XlsxGridError::ColumnOutOfRange { col, last_col } => {
                assert_eq!(*col, 99);
                assert_eq!(last_col, "E");
            }
            other => panic!("Expected ColumnOutOfRange, got {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("99"));
        assert!(msg.contains('E'));
    }

    #[test]
    fn test_column_zero_is_out_of_range() {
        let row = five_columns();
        assert!(matches!(
            row.cell(0),
            Err(XlsxGridError::ColumnOutOfRange { col: 0, .. })
        ));
        assert!(matches!(
            row.cell("F"),
            Err(XlsxGridError::ColumnOutOfRange { col: 6, .. })
        ));
    }

    #[test]
    fn test_invalid_letter_propagates() {
        let row = five_columns();
        assert!(matches!(
            row.cell("A1"),
            Err(XlsxGridError::InvalidColumnLetter(_))
        ));
    }

    #[test]
    fn test_empty_row_last_column() {
        let row = Row::default();
        assert!(row.is_empty());
        assert!(row.is_blank());
        assert_eq!(row.last_column(), "");
        assert!(matches!(
            row.cell(1),
            Err(XlsxGridError::ColumnOutOfRange { col: 1, ref last_col }) if last_col.is_empty()
        ));
    }

    #[test]
    fn test_typed_delegates() {
        let row = five_columns();
        assert_eq!(row.int_value(1).unwrap(), 10);
        assert_eq!(row.int_value_or(2, -1).unwrap(), -1);
        assert_eq!(row.long_value("A").unwrap(), 10);
        assert_eq!(row.long_value_or("B", 5).unwrap(), 5);
        assert_eq!(row.double_value(4).unwrap(), 1.5);
        assert_eq!(row.double_value_or(2, 0.5).unwrap(), 0.5);
        assert_eq!(row.float_value("D").unwrap(), 1.5);
        assert_eq!(row.float_value_or("C", 3.0).unwrap(), 3.0);
        assert!(row.is_true(5).unwrap());
        assert!(!row.is_true(3).unwrap());
        assert!(row.is_cell_empty("C").unwrap());
        assert!(!row.is_cell_empty(1).unwrap());
    }

    #[test]
    fn test_blank_and_iteration() {
        let row = Row::new(vec![Cell::absent(), Cell::new("")]);
        assert!(row.is_blank());
        assert!(!row.is_empty());
        assert_eq!(row.len(), 2);
        assert_eq!((&row).into_iter().count(), 2);
        assert_eq!(row.iter().filter(|c| c.is_absent()).count(), 1);
        assert_eq!(row.cells().len(), 2);
    }
}
