//! Grid Module
//!
//! 1シート分の構築済みグリッド。1始まりの行番号と列アドレスでセルを参照します。
//!
//! グリッドは構築後は読み取り専用で、末尾の空行を含みません（すべて空の場合を除く）。

use serde::Serialize;

use crate::cell::Cell;
use crate::column::ColumnRef;
use crate::error::{Result, XlsxGridError};
use crate::row::Row;

/// 構築済みグリッド
///
/// ```rust
/// use xlsxgrid::{Cell, Grid, Row};
///
/// # fn main() -> Result<(), xlsxgrid::XlsxGridError> {
/// let grid = Grid::new(vec![
///     Row::new(vec![Cell::new("id"), Cell::new("qty")]),
///     Row::new(vec![Cell::new("A-1"), Cell::new("3")]),
/// ]);
/// assert_eq!(grid.int_value("B", 2)?, 3);
/// assert_eq!(grid.value(1, 2)?, "A-1");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Grid {
    rows: Vec<Row>,
}

impl Grid {
    /// 行列からグリッドを生成
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// 行を取得（1始まり）
    pub fn row(&self, index: usize) -> Result<&Row> {
        index
            .checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .ok_or(XlsxGridError::RowOutOfRange {
                row: index,
                last_row: self.rows.len(),
            })
    }

    /// セルを取得（列アドレス、1始まりの行番号）
    pub fn cell<C: ColumnRef>(&self, col: C, row: usize) -> Result<&Cell> {
        self.row(row)?.cell(col)
    }

    /// セルの生の値
    pub fn value<C: ColumnRef>(&self, col: C, row: usize) -> Result<&str> {
        self.row(row)?.value(col)
    }

    pub fn int_value<C: ColumnRef>(&self, col: C, row: usize) -> Result<i32> {
        self.row(row)?.int_value(col)
    }

    pub fn int_value_or<C: ColumnRef>(&self, col: C, row: usize, default: i32) -> Result<i32> {
        self.row(row)?.int_value_or(col, default)
    }

    pub fn long_value<C: ColumnRef>(&self, col: C, row: usize) -> Result<i64> {
        self.row(row)?.long_value(col)
    }

    pub fn long_value_or<C: ColumnRef>(&self, col: C, row: usize, default: i64) -> Result<i64> {
        self.row(row)?.long_value_or(col, default)
    }

    pub fn double_value<C: ColumnRef>(&self, col: C, row: usize) -> Result<f64> {
        self.row(row)?.double_value(col)
    }

    pub fn double_value_or<C: ColumnRef>(&self, col: C, row: usize, default: f64) -> Result<f64> {
        self.row(row)?.double_value_or(col, default)
    }

    pub fn float_value<C: ColumnRef>(&self, col: C, row: usize) -> Result<f32> {
        self.row(row)?.float_value(col)
    }

    pub fn float_value_or<C: ColumnRef>(&self, col: C, row: usize, default: f32) -> Result<f32> {
        self.row(row)?.float_value_or(col, default)
    }

    pub fn is_true<C: ColumnRef>(&self, col: C, row: usize) -> Result<bool> {
        self.row(row)?.is_true(col)
    }

    pub fn is_cell_empty<C: ColumnRef>(&self, col: C, row: usize) -> Result<bool> {
        self.row(row)?.is_cell_empty(col)
    }

    /// 行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// すべての行
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// グリッドをJSON文字列にシリアライズ
    ///
    /// 各行はセルの配列になり、セルは`value`と`absent`に加えて
    /// 存在する場合のみ`formula`、`font_color`、`background_color`を持ちます。
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<'a> IntoIterator for &'a Grid {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> Grid {
        Grid::new(vec![
            Row::new(vec![Cell::new("code"), Cell::new("price"), Cell::new("active")]),
            Row::new(vec![Cell::new("P01"), Cell::new("120.5"), Cell::new("1")]),
            Row::new(vec![Cell::new("P02"), Cell::new(""), Cell::new("0")]),
        ])
    }

    #[test]
    fn test_row_access() {
        let grid = sample_grid();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.row(1).unwrap().value(1).unwrap(), "code");
        assert_eq!(grid.row(3).unwrap().value("A").unwrap(), "P02");
    }

    #[test]
    fn test_row_out_of_range() {
        let grid = sample_grid();
        assert!(matches!(
            grid.row(0),
            Err(XlsxGridError::RowOutOfRange { row: 0, last_row: 3 })
        ));
        assert!(matches!(
            grid.row(4),
            Err(XlsxGridError::RowOutOfRange { row: 4, last_row: 3 })
        ));
    }

    #[test]
    fn test_cell_access_by_column_and_row() {
        let grid = sample_grid();
        assert_eq!(grid.value("B", 2).unwrap(), "120.5");
        assert_eq!(grid.double_value("B", 2).unwrap(), 120.5);
        assert_eq!(grid.double_value_or("B", 3, -1.0).unwrap(), -1.0);
        assert_eq!(grid.float_value(2, 2).unwrap(), 120.5);
        assert_eq!(grid.float_value_or(1, 2, 9.0).unwrap(), 9.0);
        assert_eq!(grid.int_value("C", 2).unwrap(), 1);
        assert_eq!(grid.int_value_or("A", 2, 7).unwrap(), 7);
        assert_eq!(grid.long_value(3, 2).unwrap(), 1);
        assert_eq!(grid.long_value_or(1, 1, 8).unwrap(), 8);
        assert!(grid.is_true("C", 2).unwrap());
        assert!(!grid.is_true("C", 3).unwrap());
        assert!(grid.is_cell_empty("B", 3).unwrap());
        assert_eq!(grid.cell('A', 1).unwrap().value(), "code");
    }

    #[test]
    fn test_column_out_of_range_through_grid() {
        let grid = sample_grid();
        match grid.cell(99, 1) {
            Err(XlsxGridError::ColumnOutOfRange { col, last_col }) => {
                assert_eq!(col, 99);
                assert_eq!(last_col, "C");
            }
            other => panic!("Expected ColumnOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_iteration() {
        let grid = sample_grid();
        let firsts: Vec<&str> = grid
            .iter()
            .map(|row| row.value(1).unwrap())
            .collect();
        assert_eq!(firsts, vec!["code", "P01", "P02"]);
        assert_eq!((&grid).into_iter().count(), 3);
        assert_eq!(grid.rows().len(), 3);
    }

    #[test]
    fn test_empty_grid() {
        let grid = Grid::default();
        assert!(grid.is_empty());
        assert_eq!(grid.to_json().unwrap(), r#"{"rows":[]}"#);
    }

    #[test]
    fn test_to_json() {
        let grid = Grid::new(vec![Row::new(vec![
            Cell::new("1").with_formula("A2+1"),
            Cell::absent(),
        ])]);
        let json = grid.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["rows"][0][0]["value"], "1");
        assert_eq!(parsed["rows"][0][0]["formula"], "A2+1");
        assert_eq!(parsed["rows"][0][1]["absent"], true);
    }
}
