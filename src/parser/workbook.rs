//! Workbook Source Module
//!
//! calamineとXMLメタデータを組み合わせた、XLSXファイルのセルソース実装。
//!
//! - セルの存在と行の範囲: ワークシートXMLの`<row>`/`<c>`要素
//! - セルの値と数式: calamine
//! - フォント色・背景色: styles.xml

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets, Xlsx};
use chrono::{Duration, NaiveDate};
use log::{debug, trace, warn};
use zip::ZipArchive;

use crate::error::{Result, XlsxGridError};
use crate::parser::metadata::{read_entry, SheetLayout, XlsxMetadataParser};
use crate::security::SecurityConfig;
use crate::source::CellSource;
use crate::types::{CellCoord, CellRecord};

/// 1日の秒数
const SECONDS_PER_DAY: f64 = 86_400.0;

/// XLSXファイルを読み込むセルソース
///
/// ファイル全体をメモリに読み込み、calamineのワークブックとZIPアーカイブの
/// 両方をそのバッファ上に構築します。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxgrid::{build_grid, XlsxSource};
///
/// # fn main() -> Result<(), xlsxgrid::XlsxGridError> {
/// let mut source = XlsxSource::open_path("orders.xlsx")?;
/// let grid = build_grid(&mut source, "Orders", 0, "F")?;
/// for row in &grid {
///     println!("{} x {}", row.value("A")?, row.int_value("C")?);
/// }
/// # Ok(())
/// # }
/// ```
pub struct XlsxSource {
    /// calamineのワークブック（XLSX形式のみサポート）
    workbook: Xlsx<Cursor<Vec<u8>>>,
    /// ワークシートXMLを直接読むためのアーカイブ
    archive: ZipArchive<Cursor<Vec<u8>>>,
    /// スタイル・シートパス・エポック
    metadata: XlsxMetadataParser,
}

/// 解決済みのシート
///
/// `XlsxSource::resolve_sheet`で生成され、グリッド構築の間だけ保持されます。
pub struct XlsxSheet {
    name: String,
    layout: SheetLayout,
    values: Range<Data>,
    formulas: Range<String>,
}

impl XlsxSheet {
    /// シート名
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl XlsxSource {
    /// リーダーからワークブックを開く（デフォルトのセキュリティ設定）
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_reader_with_config(reader, &SecurityConfig::default())
    }

    /// リーダーからワークブックを開く
    ///
    /// 入力サイズが`security.max_input_file_size`を超える場合は
    /// `SecurityViolation`を返します。
    pub fn from_reader_with_config<R: Read + Seek>(
        reader: R,
        security: &SecurityConfig,
    ) -> Result<Self> {
        let buffer = read_limited(reader, security)?;
        Self::from_bytes_with_config(buffer, security)
    }

    /// メモリ上のバイト列からワークブックを開く（デフォルトのセキュリティ設定）
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with_config(bytes, &SecurityConfig::default())
    }

    /// メモリ上のバイト列からワークブックを開く
    pub fn from_bytes_with_config(bytes: Vec<u8>, security: &SecurityConfig) -> Result<Self> {
        security.check_input_size(bytes.len() as u64)?;

        // ZIP bomb・パストラバーサルの検証はcalamineに渡す前に行う
        let mut archive = ZipArchive::new(Cursor::new(bytes.clone()))
            .map_err(|e| XlsxGridError::Zip(e.to_string()))?;
        security.check_archive(&mut archive)?;

        let sheets = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(XlsxGridError::Parse)?;
        let workbook = match sheets {
            Sheets::Xlsx(workbook) => workbook,
            _ => {
                return Err(XlsxGridError::Config(
                    "Only XLSX format is supported".to_string(),
                ))
            }
        };

        let metadata = XlsxMetadataParser::new(&mut archive)?;

        Ok(Self {
            workbook,
            archive,
            metadata,
        })
    }

    /// ファイルパスからワークブックを開く
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_path_with_config(path, &SecurityConfig::default())
    }

    /// ファイルパスからワークブックを開く（セキュリティ設定指定）
    pub fn open_path_with_config<P: AsRef<Path>>(
        path: P,
        security: &SecurityConfig,
    ) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader_with_config(file, security)
    }

    /// すべてのシート名（ワークブック順）
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// 1904年エポックを使用するかどうか
    pub fn is_1904(&self) -> bool {
        self.metadata.is_1904()
    }

    /// シートのセル配置を取得
    ///
    /// ワークシートXMLが見つからない場合は、calamineの値の範囲から配置を組み立てます。
    fn load_layout(&mut self, sheet_name: &str, values: &Range<Data>) -> Result<SheetLayout> {
        if let Some(path) = self.metadata.sheet_path(sheet_name).map(str::to_string) {
            if let Some(xml) = read_entry(&mut self.archive, &path)? {
                return XlsxMetadataParser::parse_sheet_layout(&xml);
            }
            warn!("Worksheet part '{}' for sheet '{}' is missing", path, sheet_name);
        } else {
            warn!("No worksheet part is registered for sheet '{}'", sheet_name);
        }

        Ok(layout_from_values(values))
    }

    fn render_value(&self, data: &Data) -> String {
        match data {
            Data::Int(i) => i.to_string(),
            Data::Float(f) => f.to_string(),
            Data::String(s) => s.clone(),
            Data::Bool(true) => "TRUE".to_string(),
            Data::Bool(false) => "FALSE".to_string(),
            Data::Error(e) => e.to_string(),
            Data::DateTime(dt) if dt.is_duration() => dt.as_f64().to_string(),
            Data::DateTime(dt) => format_serial_date(dt.as_f64(), self.metadata.is_1904())
                .unwrap_or_else(|| dt.as_f64().to_string()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
            _ => String::new(),
        }
    }
}

impl CellSource for XlsxSource {
    type Sheet = XlsxSheet;

    fn resolve_sheet(&mut self, name: &str) -> Result<Option<XlsxSheet>> {
        if !self.workbook.sheet_names().iter().any(|n| n == name) {
            return Ok(None);
        }

        let values = self
            .workbook
            .worksheet_range(name)
            .map_err(|e| XlsxGridError::Parse(e.into()))?;

        // 数式は全セルで再利用するため1回だけ取得する
        let formulas = self
            .workbook
            .worksheet_formula(name)
            .map_err(|e| XlsxGridError::Parse(e.into()))?;

        let layout = self.load_layout(name, &values)?;
        debug!(
            "Resolved sheet '{}': last row {:?}, value range end {:?}",
            name,
            layout.last_row(),
            values.end()
        );

        Ok(Some(XlsxSheet {
            name: name.to_string(),
            layout,
            values,
            formulas,
        }))
    }

    fn natural_last_row(&mut self, sheet: &XlsxSheet) -> Result<Option<usize>> {
        Ok(sheet.layout.last_row().map(|row| row as usize))
    }

    fn natural_last_column(&mut self, sheet: &XlsxSheet, row: usize) -> Result<Option<usize>> {
        let Ok(row) = u32::try_from(row) else {
            return Ok(None);
        };
        Ok(sheet.layout.row_width(row).map(|width| width as usize))
    }

    fn read_cell(&mut self, sheet: &XlsxSheet, row: usize, col: usize) -> Result<Option<CellRecord>> {
        let (Ok(row), Ok(col)) = (u32::try_from(row), u32::try_from(col)) else {
            return Ok(None);
        };
        let coord = CellCoord::new(row, col);
        let Some(style) = sheet.layout.style_of(coord) else {
            return Ok(None);
        };

        let text = sheet
            .values
            .get_value((row, col))
            .map(|data| self.render_value(data))
            .unwrap_or_default();

        let formula = sheet
            .formulas
            .get_value((row, col))
            .filter(|f| !f.is_empty())
            .cloned();

        trace!("Read cell {}: {:?}", coord.to_a1_notation(), text);

        Ok(Some(CellRecord {
            text,
            formula,
            font_color_hex: self.metadata.font_color(style).map(str::to_string),
            background_color_hex: self.metadata.background_color(style).map(str::to_string),
        }))
    }
}

/// 入力サイズ上限を超えない範囲でリーダーを読み込む
pub(crate) fn read_limited<R: Read>(reader: R, security: &SecurityConfig) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    // 上限 + 1 バイトまで読めば超過を判定できる
    reader
        .take(security.max_input_file_size.saturating_add(1))
        .read_to_end(&mut buffer)?;
    security.check_input_size(buffer.len() as u64)?;
    Ok(buffer)
}

/// calamineの値の範囲からセル配置を組み立てる
fn layout_from_values(values: &Range<Data>) -> SheetLayout {
    let mut layout = SheetLayout::default();
    let Some((start_row, start_col)) = values.start() else {
        return layout;
    };

    for (row, col, _) in values.used_cells() {
        layout.insert_cell(
            CellCoord::new(start_row + row as u32, start_col + col as u32),
            0,
        );
    }
    layout
}

/// Excelのシリアル値をISO 8601形式の日付（時刻）に変換
///
/// - 1900年システム: 1899年12月30日起算。1900年3月1日より前はうるう年バグ分を補正する
/// - 1904年システム: 1904年1月1日起算
///
/// 時刻部分がない場合は日付のみ、1日未満の値（1900年システム）は時刻のみを返します。
pub(crate) fn format_serial_date(serial: f64, is_1904: bool) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let total_seconds = (serial * SECONDS_PER_DAY).round() as i64;
    let days = total_seconds.div_euclid(86_400);
    let seconds = total_seconds.rem_euclid(86_400);

    let (epoch, offset) = if is_1904 {
        (NaiveDate::from_ymd_opt(1904, 1, 1)?, 0)
    } else if days < 60 {
        (NaiveDate::from_ymd_opt(1899, 12, 30)?, 1)
    } else {
        (NaiveDate::from_ymd_opt(1899, 12, 30)?, 0)
    };

    let datetime = epoch
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::days(days + offset))?
        .checked_add_signed(Duration::seconds(seconds))?;

    let formatted = if !is_1904 && days == 0 {
        datetime.format("%H:%M:%S").to_string()
    } else if seconds == 0 {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%dT%H:%M:%S").to_string()
    };
    Some(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_serial_date_1900() {
        assert_eq!(format_serial_date(1.0, false).as_deref(), Some("1900-01-01"));
        assert_eq!(format_serial_date(59.0, false).as_deref(), Some("1900-02-28"));
        assert_eq!(format_serial_date(61.0, false).as_deref(), Some("1900-03-01"));
        assert_eq!(format_serial_date(45658.0, false).as_deref(), Some("2025-01-01"));
    }

    #[test]
    fn test_format_serial_date_with_time() {
        assert_eq!(
            format_serial_date(45658.5, false).as_deref(),
            Some("2025-01-01T12:00:00")
        );
        assert_eq!(format_serial_date(0.25, false).as_deref(), Some("06:00:00"));
    }

    #[test]
    fn test_format_serial_date_1904() {
        assert_eq!(format_serial_date(0.0, true).as_deref(), Some("1904-01-01"));
        assert_eq!(format_serial_date(1.0, true).as_deref(), Some("1904-01-02"));
        assert_eq!(format_serial_date(365.0, true).as_deref(), Some("1904-12-31"));
    }

    #[test]
    fn test_format_serial_date_invalid() {
        assert_eq!(format_serial_date(-1.0, false), None);
        assert_eq!(format_serial_date(f64::NAN, false), None);
    }

    #[test]
    fn test_read_limited_rejects_oversized_input() {
        let security = SecurityConfig {
            max_input_file_size: 4,
            ..SecurityConfig::default()
        };
        assert_eq!(read_limited(&b"1234"[..], &security).unwrap(), b"1234");
        assert!(matches!(
            read_limited(&b"12345"[..], &security),
            Err(XlsxGridError::SecurityViolation(_))
        ));
    }

    #[test]
    fn test_non_zip_input_is_rejected() {
        let result = XlsxSource::from_bytes(b"not a workbook".to_vec());
        assert!(matches!(result, Err(XlsxGridError::Zip(_))));
    }

    #[test]
    fn test_layout_from_values() {
        let mut values: Range<Data> = Range::new((1, 1), (2, 3));
        values.set_value((1, 1), Data::String("a".to_string()));
        values.set_value((2, 3), Data::Float(1.0));

        let layout = layout_from_values(&values);
        assert_eq!(layout.last_row(), Some(2));
        assert_eq!(layout.row_width(1), Some(2));
        assert_eq!(layout.row_width(2), Some(4));
        assert_eq!(layout.row_width(0), None);
    }
}
