//! Cell Source Module
//!
//! グリッド構築が依存する抽象的な「セルソース」と、そのメモリ上の実装。
//!
//! セルソースはファイル形式のデコードを隠蔽し、座標ごとに
//! 「存在しない」か「生の値（と数式・色）」のどちらかを返します。

use crate::error::Result;
use crate::types::CellRecord;

/// セルソース
///
/// 行・列の座標はすべて0始まりです。
pub trait CellSource {
    /// 解決済みシートのハンドル
    type Sheet;

    /// シート名を解決する
    ///
    /// シートが存在しない場合は`Ok(None)`を返します。
    fn resolve_sheet(&mut self, name: &str) -> Result<Option<Self::Sheet>>;

    /// シートの最後の行インデックス（0始まり）
    ///
    /// 空のシートでは`None`を返します。
    fn natural_last_row(&mut self, sheet: &Self::Sheet) -> Result<Option<usize>>;

    /// 指定行の最後の列番号（1始まり、すなわちその行の列数）
    ///
    /// 行そのものが存在しない場合は`None`を返します。
    fn natural_last_column(&mut self, sheet: &Self::Sheet, row: usize) -> Result<Option<usize>>;

    /// 指定座標のセルを読み取る
    ///
    /// セルが存在しない場合は`None`を返します。
    fn read_cell(
        &mut self,
        sheet: &Self::Sheet,
        row: usize,
        col: usize,
    ) -> Result<Option<CellRecord>>;
}

/// メモリ上の行データ（`None`は行そのものが存在しないことを表す）
pub type MemoryRow = Option<Vec<Option<CellRecord>>>;

/// メモリ上のセルソース
///
/// すでにデコード済みのデータからグリッドを構築する場合や、テストで使用します。
///
/// ```rust
/// use xlsxgrid::{build_grid, CellRecord, MemorySource};
///
/// # fn main() -> Result<(), xlsxgrid::XlsxGridError> {
/// let mut source = MemorySource::new().with_sheet(
///     "Sheet1",
///     vec![
///         Some(vec![Some(CellRecord::new("No")), Some(CellRecord::new("Name"))]),
///         None,
///     ],
/// );
/// let grid = build_grid(&mut source, "Sheet1", 0, 0)?;
/// assert_eq!(grid.len(), 1);
/// assert_eq!(grid.value("B", 1)?, "Name");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sheets: Vec<(String, Vec<MemoryRow>)>,
}

impl MemorySource {
    /// 空のソースを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// シートを追加
    ///
    /// 同名のシートがすでに存在する場合は置き換えます。
    pub fn with_sheet(mut self, name: impl Into<String>, rows: Vec<MemoryRow>) -> Self {
        let name = name.into();
        match self.sheets.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = rows,
            None => self.sheets.push((name, rows)),
        }
        self
    }

    /// 文字列のみのシートを追加
    ///
    /// すべてのセルは存在するセルとして扱われます（空文字列も含む）。
    pub fn with_text_sheet<R, S>(self, name: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                Some(
                    row.into_iter()
                        .map(|text| Some(CellRecord::new(text)))
                        .collect(),
                )
            })
            .collect();
        self.with_sheet(name, rows)
    }

    /// シート名の一覧（追加順）
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    fn row(&self, sheet: usize, row: usize) -> Option<&Vec<Option<CellRecord>>> {
        self.sheets
            .get(sheet)
            .and_then(|(_, rows)| rows.get(row))
            .and_then(Option::as_ref)
    }
}

impl CellSource for MemorySource {
    type Sheet = usize;

    fn resolve_sheet(&mut self, name: &str) -> Result<Option<usize>> {
        Ok(self.sheets.iter().position(|(n, _)| n == name))
    }

    fn natural_last_row(&mut self, sheet: &usize) -> Result<Option<usize>> {
        Ok(self
            .sheets
            .get(*sheet)
            .and_then(|(_, rows)| rows.len().checked_sub(1)))
    }

    fn natural_last_column(&mut self, sheet: &usize, row: usize) -> Result<Option<usize>> {
        Ok(self.row(*sheet, row).map(|cells| {
            cells
                .iter()
                .rposition(Option::is_some)
                .map_or(0, |last| last + 1)
        }))
    }

    fn read_cell(&mut self, sheet: &usize, row: usize, col: usize) -> Result<Option<CellRecord>> {
        Ok(self
            .row(*sheet, row)
            .and_then(|cells| cells.get(col))
            .cloned()
            .flatten())
    }
}
