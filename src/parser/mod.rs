//! Parser Module
//!
//! XLSXファイルのセルソース実装。
//! calamineで値と数式を、ZIP内のXMLを直接解析してセル配置と色を取得します。

mod metadata;
mod workbook;

pub use workbook::{XlsxSheet, XlsxSource};
pub(crate) use workbook::read_limited;
