//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// xlsxgridクレート全体で使用するエラー型
///
/// セルソースの読み込み、グリッドの構築、列・行アドレスの解決で発生する
/// すべてのエラーを統一的に扱うために使用されます。
///
/// # エラーの種類
///
/// - `SheetNotFound`: 指定したシート名が解決できない
/// - `InvalidColumnLetter` / `InvalidColumnIndex`: 列アドレスの形式が不正
/// - `ColumnOutOfRange` / `RowOutOfRange`: 構築済みグリッドの範囲外アクセス
/// - `Config`: ビルダー設定の検証に失敗
/// - `Io` / `Parse` / `Zip` / `Xml`: 下位のファイル読み込み層のエラー
///
/// 数値・真偽値への変換失敗はエラーになりません（デフォルト値にフォールバックします）。
///
/// # 使用例
///
/// ```rust
/// use xlsxgrid::{letter_to_index, XlsxGridError};
///
/// match letter_to_index("A1") {
///     Err(XlsxGridError::InvalidColumnLetter(letter)) => assert_eq!(letter, "A1"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum XlsxGridError {
    /// 指定されたシートがソース内に存在しない
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// 列文字列が不正（空文字列、A-Z以外の文字、桁あふれ）
    #[error("Invalid column letter: '{0}'")]
    InvalidColumnLetter(String),

    /// 列インデックスが不正（1始まりのため0は無効）
    #[error("Invalid column index: {0}")]
    InvalidColumnIndex(usize),

    /// 行の範囲外の列へのアクセス
    ///
    /// 要求された列番号と、その行で有効な最後の列（列文字列）の両方を保持します。
    /// 列を1つも持たない行では `last_col` は空文字列になります。
    #[error("Get cell error: col={col} last col={last_col}")]
    ColumnOutOfRange {
        /// 要求された列番号（1始まり）
        col: usize,
        /// 行の最後の有効な列（例: "E"）
        last_col: String,
    },

    /// グリッドの範囲外の行へのアクセス
    #[error("Get row error: row={row} last row={last_row}")]
    RowOutOfRange {
        /// 要求された行番号（1始まり）
        row: usize,
        /// グリッドの最後の有効な行番号（空のグリッドでは0）
        last_row: usize,
    },

    /// 設定の検証に失敗したエラー
    ///
    /// `GridBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。例えば、最大列数がExcelの上限（XFD）を超える場合などです。
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O操作中に発生したエラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー（calamine由来）
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// ZIPアーカイブの解析エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// XMLの解析エラー
    #[error("XML parse error: {0}")]
    Xml(String),

    /// 数値の解析エラー（XML属性値など）
    #[error("Number parse error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// JSONへのシリアライズエラー
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb、パストラバーサル、入力サイズ上限などの制限に違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

/// クレート内で使用する`Result`型
pub type Result<T> = std::result::Result<T, XlsxGridError>;
