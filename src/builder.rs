//! Builder Module
//!
//! Fluent Builder APIを提供し、グリッド構築の設定を段階的に組み立てる。
//! 検証済みの設定から`GridLoader`を生成し、セルソースからグリッドを構築します。

use std::io::{Read, Seek};

use log::{debug, trace};
use rayon::prelude::*;

use crate::cell::Cell;
use crate::column::{letter_to_index, MAX_COLUMNS, MAX_ROWS};
use crate::error::{Result, XlsxGridError};
use crate::grid::Grid;
use crate::parser::{read_limited, XlsxSource};
use crate::row::Row;
use crate::security::SecurityConfig;
use crate::source::CellSource;

/// 列数の指定方法
///
/// - `Auto`: 各行の実際の列数を使用（行ごとに幅が異なる）
/// - `Index(n)`: すべての行をn列に揃える
/// - `Letter("F")`: すべての行を列文字列の位置（F = 6列）に揃える
///
/// `0`や空文字列からの変換は`Auto`になります。
///
/// ```rust
/// use xlsxgrid::ColumnLimit;
///
/// assert_eq!(ColumnLimit::from(0usize), ColumnLimit::Auto);
/// assert_eq!(ColumnLimit::from(5usize), ColumnLimit::Index(5));
/// assert_eq!(ColumnLimit::from("F"), ColumnLimit::Letter("F".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnLimit {
    /// 行ごとの自然な列数
    #[default]
    Auto,
    /// 1始まりの列数
    Index(usize),
    /// 最後の列の列文字列
    Letter(String),
}

impl ColumnLimit {
    /// 列数に解決する（`Auto`は`None`）
    pub fn resolve(&self) -> Result<Option<usize>> {
        match self {
            ColumnLimit::Auto | ColumnLimit::Index(0) => Ok(None),
            ColumnLimit::Index(n) => Ok(Some(*n)),
            ColumnLimit::Letter(letter) if letter.is_empty() => Ok(None),
            ColumnLimit::Letter(letter) => letter_to_index(letter).map(Some),
        }
    }
}

impl From<usize> for ColumnLimit {
    fn from(n: usize) -> Self {
        match n {
            0 => ColumnLimit::Auto,
            n => ColumnLimit::Index(n),
        }
    }
}

impl From<u32> for ColumnLimit {
    fn from(n: u32) -> Self {
        ColumnLimit::from(n as usize)
    }
}

// 整数リテラル（i32）をそのまま渡せるようにする。0以下は`Auto`
impl From<i32> for ColumnLimit {
    fn from(n: i32) -> Self {
        ColumnLimit::from(usize::try_from(n).unwrap_or(0))
    }
}

impl From<&str> for ColumnLimit {
    fn from(letter: &str) -> Self {
        ColumnLimit::from(letter.to_string())
    }
}

impl From<String> for ColumnLimit {
    fn from(letter: String) -> Self {
        if letter.is_empty() {
            ColumnLimit::Auto
        } else {
            ColumnLimit::Letter(letter)
        }
    }
}

/// グリッド構築の設定を保持する内部構造体
#[derive(Debug, Clone, Default)]
pub(crate) struct GridConfig {
    /// 読み取る最後の行インデックス（0始まり、両端を含む。0は自動）
    pub max_row: usize,

    /// 列数
    pub max_col: ColumnLimit,

    /// XLSX読み込み時のセキュリティ制限
    pub security: SecurityConfig,
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値（行・列とも自動）が設定されており、
/// 必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust
/// use xlsxgrid::{GridBuilder, MemorySource};
///
/// # fn main() -> Result<(), xlsxgrid::XlsxGridError> {
/// let mut source = MemorySource::new().with_text_sheet(
///     "Items",
///     vec![vec!["id", "name", "memo"], vec!["1", "apple", ""]],
/// );
///
/// let loader = GridBuilder::new().with_max_col("B").build()?;
/// let grid = loader.load(&mut source, "Items")?;
/// assert_eq!(grid.row(2)?.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct GridBuilder {
    /// 内部設定（構築中）
    config: GridConfig,
}

impl GridBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 最大行: 自動（シートの最後の行まで）
    /// - 最大列: 自動（行ごとの列数）
    /// - セキュリティ制限: `SecurityConfig::default()`
    pub fn new() -> Self {
        Self::default()
    }

    /// 読み取る最後の行インデックス（0始まり、両端を含む）を指定する
    ///
    /// `0`はシートの最後の行まで読み取ります。`2`は1〜3行目を読み取ります。
    pub fn with_max_row(mut self, max_row: usize) -> Self {
        self.config.max_row = max_row;
        self
    }

    /// 各行の列数を指定する
    ///
    /// 列番号（`6`）または列文字列（`"F"`）を指定できます。
    /// 指定した場合、すべての行が同じ列数になり、存在しない行も空セルで埋められます。
    pub fn with_max_col(mut self, max_col: impl Into<ColumnLimit>) -> Self {
        self.config.max_col = max_col.into();
        self
    }

    /// XLSX読み込み時のセキュリティ制限を指定する
    pub fn with_security_config(mut self, security: SecurityConfig) -> Self {
        self.config.security = security;
        self
    }

    /// 設定を検証し、`GridLoader`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxGridError::InvalidColumnLetter`: 列文字列が不正
    /// * `XlsxGridError::Config`: 設定の検証に失敗した場合
    ///   * 最大列がXFD（16384）を超える
    ///   * 最大行が1048576を超える
    ///   * セキュリティ制限に0が含まれる
    pub fn build(self) -> Result<GridLoader> {
        // 1. 列数の解決と検証
        let max_col = self.config.max_col.resolve()?;
        if let Some(col) = max_col {
            if col > MAX_COLUMNS {
                return Err(XlsxGridError::Config(format!(
                    "Max column {} exceeds the sheet limit ({})",
                    col, MAX_COLUMNS
                )));
            }
        }

        // 2. 行数の検証
        if self.config.max_row >= MAX_ROWS {
            return Err(XlsxGridError::Config(format!(
                "Max row index {} exceeds the sheet limit ({} rows)",
                self.config.max_row, MAX_ROWS
            )));
        }

        // 3. セキュリティ制限の検証
        self.config.security.validate()?;

        Ok(GridLoader {
            max_row: self.config.max_row,
            max_col,
            security: self.config.security,
        })
    }
}

/// グリッド構築のファサード
///
/// `GridBuilder::build()`で検証済みの設定を保持し、セルソースからグリッドを構築します。
/// 状態を持たないため、同じローダーで何度でも構築できます。
#[derive(Debug, Clone)]
pub struct GridLoader {
    max_row: usize,
    max_col: Option<usize>,
    security: SecurityConfig,
}

impl GridLoader {
    /// 最後の行番号（0は自動）
    pub fn max_row(&self) -> usize {
        self.max_row
    }

    /// 列数（`None`は自動）
    pub fn max_col(&self) -> Option<usize> {
        self.max_col
    }

    /// セルソースからグリッドを構築する
    ///
    /// # 処理フロー
    ///
    /// 1. シート名の解決（見つからない場合は`SheetNotFound`）
    /// 2. 最後の行インデックスの決定（最大行、またはシートの最後の行）。0から両端を含めて走査する
    /// 3. 各行について
    ///    - 行が存在しない: 最大列の数だけ空セルを生成（自動の場合は0列）
    ///    - 行が存在する: 最大列（自動の場合は行の列数）までセルを読み取る
    ///    - 値を持つセルがない行を数え、値を持つ行が現れたらリセット
    /// 4. 末尾に連続する空行を取り除く
    ///
    /// ソースのエラーはそのまま返し、途中までのグリッドは返しません。
    pub fn load<S: CellSource>(&self, source: &mut S, sheet: &str) -> Result<Grid> {
        let handle = source
            .resolve_sheet(sheet)?
            .ok_or_else(|| XlsxGridError::SheetNotFound(sheet.to_string()))?;

        let row_count = match self.max_row {
            0 => source
                .natural_last_row(&handle)?
                .map_or(0, |last| last + 1),
            last_row => last_row + 1,
        };
        debug!(
            "Building grid for sheet '{}': rows={}, max_col={:?}",
            sheet, row_count, self.max_col
        );

        let mut rows = Vec::with_capacity(row_count.min(MAX_ROWS));
        let mut trailing_empty = 0usize;

        for row_index in 0..row_count {
            let row = match source.natural_last_column(&handle, row_index)? {
                None => {
                    trace!("Row {} is absent in sheet '{}'", row_index + 1, sheet);
                    Row::new(vec![Cell::absent(); self.max_col.unwrap_or(0)])
                }
                Some(natural_width) => {
                    let width = self.max_col.unwrap_or(natural_width);
                    let cells = (0..width)
                        .map(|col| {
                            source
                                .read_cell(&handle, row_index, col)
                                .map(Cell::from_record)
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Row::new(cells)
                }
            };

            if row.is_blank() {
                trailing_empty += 1;
            } else {
                trailing_empty = 0;
            }
            rows.push(row);
        }

        rows.truncate(rows.len() - trailing_empty);
        debug!(
            "Built grid for sheet '{}': {} rows ({} trailing empty rows trimmed)",
            sheet,
            rows.len(),
            trailing_empty
        );

        Ok(Grid::new(rows))
    }

    /// XLSXファイルを開いてグリッドを構築する
    pub fn load_xlsx<R: Read + Seek>(&self, reader: R, sheet: &str) -> Result<Grid> {
        let mut source = XlsxSource::from_reader_with_config(reader, &self.security)?;
        self.load(&mut source, sheet)
    }

    /// 同じXLSXファイルの複数シートを並列に構築する
    ///
    /// 入力を一度だけメモリに読み込み、シートごとにそのコピーからソースを開きます。
    /// 結果は`sheets`と同じ順序で返します。いずれかのシートが失敗した場合はエラーを返します。
    pub fn load_xlsx_sheets<R, S>(&self, reader: R, sheets: &[S]) -> Result<Vec<Grid>>
    where
        R: Read + Seek,
        S: AsRef<str> + Sync,
    {
        let buffer = read_limited(reader, &self.security)?;

        sheets
            .par_iter()
            .map(|sheet| {
                let mut source = XlsxSource::from_bytes_with_config(buffer.clone(), &self.security)?;
                self.load(&mut source, sheet.as_ref())
            })
            .collect()
    }
}

/// セルソースからグリッドを構築する
///
/// `GridBuilder::new().with_max_row(max_row).with_max_col(max_col).build()?.load(source, sheet)`
/// の短縮形です。
///
/// * `max_row` - 最後の行インデックス（0始まり、両端を含む）。`0`はシートの最後の行まで
/// * `max_col` - 列数（`0`/`""`は行ごとに自動）、または列文字列
///
/// ```rust
/// use xlsxgrid::{build_grid, MemorySource};
///
/// # fn main() -> Result<(), xlsxgrid::XlsxGridError> {
/// let mut source = MemorySource::new().with_text_sheet(
///     "Sheet1",
///     vec![vec!["A"], vec!["B"], vec![""], vec![""]],
/// );
/// let grid = build_grid(&mut source, "Sheet1", 0, 0)?;
/// assert_eq!(grid.len(), 2);
/// # Ok(())
/// # }
/// ```
pub fn build_grid<S: CellSource>(
    source: &mut S,
    sheet: &str,
    max_row: usize,
    max_col: impl Into<ColumnLimit>,
) -> Result<Grid> {
    GridBuilder::new()
        .with_max_row(max_row)
        .with_max_col(max_col)
        .build()?
        .load(source, sheet)
}
