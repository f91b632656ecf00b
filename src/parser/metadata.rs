//! XML Metadata Parser Module
//!
//! XLSX内部のXMLファイルから、calamineで取得できない情報を抽出するモジュール。
//! セルの存在と行の範囲（ワークシートXML）、フォント色・背景色（styles.xml）、
//! シート名とワークシートパスの対応（workbook.xmlとそのリレーションシップ）、
//! 1904年エポック判定を提供します。

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{Result, XlsxGridError};
use crate::security::validate_zip_path;
use crate::types::CellCoord;

/// セルスタイル情報（cellXfs要素）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CellXf {
    pub font_id: Option<u32>,
    pub fill_id: Option<u32>,
}

/// ワークシートXMLから得たセルの配置
///
/// 行番号 -> 列番号 -> スタイルインデックス（いずれも0始まり）。
/// `<row>`要素を持たない行は含まれません。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SheetLayout {
    rows: BTreeMap<u32, BTreeMap<u32, u32>>,
}

impl SheetLayout {
    /// 行を登録（セルがなくても行は存在する）
    pub fn insert_row(&mut self, row: u32) {
        self.rows.entry(row).or_default();
    }

    /// セルを登録
    pub fn insert_cell(&mut self, coord: CellCoord, style: u32) {
        self.rows.entry(coord.row).or_default().insert(coord.col, style);
    }

    /// 最後の行インデックス
    pub fn last_row(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// 行の列数（最後のセルの列 + 1）
    pub fn row_width(&self, row: u32) -> Option<u32> {
        self.rows
            .get(&row)
            .map(|cells| cells.keys().next_back().map_or(0, |col| col + 1))
    }

    /// セルのスタイルインデックス（セルが存在しない場合は`None`）
    pub fn style_of(&self, coord: CellCoord) -> Option<u32> {
        self.rows
            .get(&coord.row)
            .and_then(|cells| cells.get(&coord.col))
            .copied()
    }
}

/// XLSXメタデータパーサー
///
/// ワークブック全体で共有する情報（スタイル、シートパス、エポック）を
/// 生成時に一度だけ解析します。シートごとの配置は`parse_sheet_layout`で個別に解析します。
#[derive(Debug, Clone, Default)]
pub(crate) struct XlsxMetadataParser {
    /// fontId -> フォント色（RGB 16進）
    font_colors: Vec<Option<String>>,
    /// fillId -> 塗りつぶしの前景色（RGB 16進）
    fill_colors: Vec<Option<String>>,
    /// styleId -> CellXf
    cell_xfs: Vec<CellXf>,
    /// シート名 -> ZIP内のワークシートパス
    sheet_paths: HashMap<String, String>,
    /// 1904年エポックを使用するかどうか
    is_1904: bool,
}

impl XlsxMetadataParser {
    /// XLSXアーカイブからメタデータを解析
    ///
    /// アーカイブはセキュリティ検証済みであることを前提とします。
    pub fn new<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Self> {
        let (font_colors, fill_colors, cell_xfs) = match read_entry(archive, "xl/styles.xml")? {
            Some(xml) => Self::parse_styles(&xml)?,
            None => (Vec::new(), Vec::new(), Vec::new()),
        };

        let (sheet_ids, is_1904) = match read_entry(archive, "xl/workbook.xml")? {
            Some(xml) => Self::parse_workbook(&xml)?,
            None => (Vec::new(), false),
        };

        let relationships = match read_entry(archive, "xl/_rels/workbook.xml.rels")? {
            Some(xml) => Self::parse_relationships(&xml)?,
            None => HashMap::new(),
        };

        let mut sheet_paths = HashMap::new();
        for (name, rel_id) in sheet_ids {
            if let Some(target) = relationships.get(&rel_id) {
                let path = resolve_target(target);
                validate_zip_path(&path).map_err(|e| {
                    XlsxGridError::SecurityViolation(format!("Invalid worksheet path: {}", e))
                })?;
                sheet_paths.insert(name, path);
            }
        }

        Ok(Self {
            font_colors,
            fill_colors,
            cell_xfs,
            sheet_paths,
            is_1904,
        })
    }

    /// 1904年エポックを使用するかどうか
    pub fn is_1904(&self) -> bool {
        self.is_1904
    }

    /// シート名からワークシートXMLのパスを取得
    pub fn sheet_path(&self, sheet_name: &str) -> Option<&str> {
        self.sheet_paths.get(sheet_name).map(String::as_str)
    }

    /// スタイルインデックスからフォント色を取得
    pub fn font_color(&self, style_id: u32) -> Option<&str> {
        self.cell_xfs
            .get(style_id as usize)
            .and_then(|xf| xf.font_id)
            .and_then(|id| self.font_colors.get(id as usize))
            .and_then(Option::as_deref)
    }

    /// スタイルインデックスから背景色を取得
    pub fn background_color(&self, style_id: u32) -> Option<&str> {
        self.cell_xfs
            .get(style_id as usize)
            .and_then(|xf| xf.fill_id)
            .and_then(|id| self.fill_colors.get(id as usize))
            .and_then(Option::as_deref)
    }

    /// ワークシートXMLからセルの配置を解析
    ///
    /// `<row>`と`<c>`要素（値を持たない書式付きセルも含む）を収集します。
    /// `r`属性が省略された行・セルは直前の位置の次として扱います。
    pub fn parse_sheet_layout(xml: &[u8]) -> Result<SheetLayout> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut layout = SheetLayout::default();
        let mut in_sheet_data = false;
        let mut next_row: u32 = 0;
        let mut current_row: Option<u32> = None;
        let mut next_col: u32 = 0;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"sheetData" => in_sheet_data = true,
                    b"row" if in_sheet_data => {
                        let row = row_attr(&e)?.unwrap_or(next_row);
                        layout.insert_row(row);
                        current_row = Some(row);
                        next_row = row + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        if let Some(row) = current_row {
                            next_col = Self::record_cell(&e, row, next_col, &mut layout)?;
                        }
                    }
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"row" if in_sheet_data => {
                        let row = row_attr(&e)?.unwrap_or(next_row);
                        layout.insert_row(row);
                        next_row = row + 1;
                    }
                    b"c" => {
                        if let Some(row) = current_row {
                            next_col = Self::record_cell(&e, row, next_col, &mut layout)?;
                        }
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"sheetData" => in_sheet_data = false,
                    b"row" => current_row = None,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxGridError::Xml(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(layout)
    }

    /// `<c>`要素を配置に登録し、次の列インデックスを返す
    fn record_cell(
        element: &BytesStart<'_>,
        row: u32,
        next_col: u32,
        layout: &mut SheetLayout,
    ) -> Result<u32> {
        let mut col = next_col;
        let mut style = 0u32;

        for attr in element.attributes() {
            let attr = attr.map_err(|e| XlsxGridError::Xml(format!("XML attribute error: {}", e)))?;
            match attr.key.as_ref() {
                b"r" => {
                    let reference = std::str::from_utf8(&attr.value)?;
                    if let Some(coord) = CellCoord::parse_a1(reference) {
                        col = coord.col;
                    }
                }
                b"s" => {
                    style = std::str::from_utf8(&attr.value)?.parse()?;
                }
                _ => {}
            }
        }

        layout.insert_cell(CellCoord::new(row, col), style);
        Ok(col + 1)
    }

    /// xl/styles.xml の解析（プライベート）
    ///
    /// `<fonts>`、`<fills>`、`<cellXfs>`を解析します。
    /// `<dxfs>`など他のセクション内のフォント・塗りつぶしは対象外です。
    #[allow(clippy::type_complexity)]
    fn parse_styles(
        xml: &[u8],
    ) -> Result<(Vec<Option<String>>, Vec<Option<String>>, Vec<CellXf>)> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut font_colors = Vec::new();
        let mut fill_colors = Vec::new();
        let mut cell_xfs = Vec::new();

        let mut in_fonts = false;
        let mut in_fills = false;
        let mut in_cell_xfs = false;
        let mut in_font = false;
        let mut in_pattern_fill = false;
        let mut current_color: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"fonts" => in_fonts = true,
                    b"fills" => in_fills = true,
                    b"cellXfs" => in_cell_xfs = true,
                    b"font" if in_fonts => {
                        in_font = true;
                        current_color = None;
                    }
                    b"fill" if in_fills => current_color = None,
                    b"patternFill" if in_fills => in_pattern_fill = true,
                    b"xf" if in_cell_xfs => cell_xfs.push(parse_xf(&e)?),
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"font" if in_fonts => font_colors.push(None),
                    b"fill" if in_fills => fill_colors.push(None),
                    b"color" if in_font => current_color = parse_color(&e)?,
                    b"fgColor" if in_pattern_fill => current_color = parse_color(&e)?,
                    b"xf" if in_cell_xfs => cell_xfs.push(parse_xf(&e)?),
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"fonts" => in_fonts = false,
                    b"fills" => in_fills = false,
                    b"cellXfs" => in_cell_xfs = false,
                    b"font" if in_fonts => {
                        in_font = false;
                        font_colors.push(current_color.take());
                    }
                    b"patternFill" => in_pattern_fill = false,
                    b"fill" if in_fills => fill_colors.push(current_color.take()),
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxGridError::Xml(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok((font_colors, fill_colors, cell_xfs))
    }

    /// xl/workbook.xml の解析（プライベート）
    ///
    /// `<sheet name r:id>`の一覧（ワークブック順）と`<workbookPr date1904>`を取得します。
    fn parse_workbook(xml: &[u8]) -> Result<(Vec<(String, String)>, bool)> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();
        let mut is_1904 = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"workbookPr" => {
                        for attr in e.attributes() {
                            let attr = attr
                                .map_err(|e| XlsxGridError::Xml(format!("XML attribute error: {}", e)))?;
                            if attr.key.as_ref() == b"date1904" {
                                let value = std::str::from_utf8(&attr.value)?;
                                is_1904 = value == "1" || value == "true";
                            }
                        }
                    }
                    b"sheet" => {
                        let mut name = None;
                        let mut rel_id = None;
                        for attr in e.attributes() {
                            let attr = attr
                                .map_err(|e| XlsxGridError::Xml(format!("XML attribute error: {}", e)))?;
                            match attr.key.as_ref() {
                                b"name" => {
                                    let value = attr
                                        .decode_and_unescape_value(&reader)
                                        .map_err(|e| XlsxGridError::Xml(e.to_string()))?;
                                    name = Some(value.into_owned());
                                }
                                b"r:id" => {
                                    rel_id = Some(std::str::from_utf8(&attr.value)?.to_string());
                                }
                                _ => {}
                            }
                        }
                        if let (Some(name), Some(rel_id)) = (name, rel_id) {
                            sheets.push((name, rel_id));
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxGridError::Xml(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok((sheets, is_1904))
    }

    /// リレーションシップファイルを解析（Id -> Target）
    fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, String>> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut relationships = HashMap::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    if e.name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;

                        for attr in e.attributes() {
                            let attr = attr
                                .map_err(|e| XlsxGridError::Xml(format!("XML attribute error: {}", e)))?;
                            match attr.key.as_ref() {
                                b"Id" => id = Some(std::str::from_utf8(&attr.value)?.to_string()),
                                b"Target" => {
                                    target = Some(std::str::from_utf8(&attr.value)?.to_string())
                                }
                                _ => {}
                            }
                        }

                        if let (Some(id), Some(target)) = (id, target) {
                            relationships.insert(id, target);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxGridError::Xml(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(relationships)
    }
}

/// ZIPエントリを読み込む（存在しない場合は`None`）
pub(crate) fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(XlsxGridError::Zip(e.to_string())),
    };

    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    Ok(Some(content))
}

/// リレーションシップのTargetをZIP内パスに変換
///
/// `/xl/worksheets/sheet1.xml`のような絶対指定はそのまま、
/// `worksheets/sheet1.xml`のような相対指定は`xl/`基準で解決します。
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// `<row r="..">`の行番号（0始まり）
fn row_attr(element: &BytesStart<'_>) -> Result<Option<u32>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| XlsxGridError::Xml(format!("XML attribute error: {}", e)))?;
        if attr.key.as_ref() == b"r" {
            let row: u32 = std::str::from_utf8(&attr.value)?.parse()?;
            return Ok(row.checked_sub(1));
        }
    }
    Ok(None)
}

/// `<xf fontId=".." fillId="..">`
fn parse_xf(element: &BytesStart<'_>) -> Result<CellXf> {
    let mut xf = CellXf::default();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| XlsxGridError::Xml(format!("XML attribute error: {}", e)))?;
        match attr.key.as_ref() {
            b"fontId" => xf.font_id = Some(std::str::from_utf8(&attr.value)?.parse()?),
            b"fillId" => xf.fill_id = Some(std::str::from_utf8(&attr.value)?.parse()?),
            _ => {}
        }
    }
    Ok(xf)
}

/// `<color>`/`<fgColor>`要素を6桁のRGB 16進に解決
///
/// 優先順位は`rgb`（ARGBの先頭2桁を除去）、`indexed`、`theme`の順です。
/// `auto`のみの場合や解決できない場合、`rgb`が6桁/8桁の16進でない場合は`None`です。
fn parse_color(element: &BytesStart<'_>) -> Result<Option<String>> {
    let mut rgb = None;
    let mut indexed = None;
    let mut theme = None;

    for attr in element.attributes() {
        let attr = attr.map_err(|e| XlsxGridError::Xml(format!("XML attribute error: {}", e)))?;
        match attr.key.as_ref() {
            b"rgb" => rgb = Some(std::str::from_utf8(&attr.value)?.to_ascii_uppercase()),
            b"indexed" => indexed = Some(std::str::from_utf8(&attr.value)?.parse::<usize>()?),
            b"theme" => theme = Some(std::str::from_utf8(&attr.value)?.parse::<usize>()?),
            _ => {}
        }
    }

    if let Some(argb) = rgb {
        if !argb.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Ok(None);
        }
        return Ok(match argb.len() {
            8 => Some(argb[2..].to_string()),
            6 => Some(argb),
            _ => None,
        });
    }
    if let Some(index) = indexed {
        return Ok(INDEXED_COLORS.get(index).map(|c| c.to_string()));
    }
    Ok(theme.and_then(|index| THEME_COLORS.get(index)).map(|c| c.to_string()))
}

/// 旧形式のインデックスカラーパレット（64: システム前景色, 65: システム背景色）
const INDEXED_COLORS: [&str; 66] = [
    "000000", "FFFFFF", "FF0000", "00FF00", "0000FF", "FFFF00", "FF00FF", "00FFFF", // 0-7
    "000000", "FFFFFF", "FF0000", "00FF00", "0000FF", "FFFF00", "FF00FF", "00FFFF", // 8-15
    "800000", "008000", "000080", "808000", "800080", "008080", "C0C0C0", "808080", // 16-23
    "9999FF", "993366", "FFFFCC", "CCFFFF", "660066", "FF8080", "0066CC", "CCCCFF", // 24-31
    "000080", "FF00FF", "FFFF00", "00FFFF", "800080", "800000", "008080", "0000FF", // 32-39
    "00CCFF", "CCFFFF", "CCFFCC", "FFFF99", "99CCFF", "FF99CC", "CC99FF", "FFCC99", // 40-47
    "3366FF", "33CCCC", "99CC00", "FFCC00", "FF9900", "FF6600", "666699", "969696", // 48-55
    "003366", "339966", "003300", "333300", "993300", "993366", "333399", "333333", // 56-63
    "000000", "FFFFFF", // 64-65
];

/// 既定のOfficeテーマの配色（theme属性のインデックス順: lt1, dk1, lt2, dk2, accent1-6, hlink, folHlink）
const THEME_COLORS: [&str; 12] = [
    "FFFFFF", "000000", "E7E6E6", "44546A", "4472C4", "ED7D31", "A5A5A5", "FFC000", "5B9BD5",
    "70AD47", "0563C1", "954F72",
];
