//! xlsxgrid - Typed, addressable grids extracted from spreadsheet sheets
//!
//! This crate reads one sheet of a spreadsheet-like source into an immutable
//! [`Grid`] of [`Row`]s and [`Cell`]s, addressable with 1-based row numbers and
//! either 1-based column numbers or column letters (`"A"`..`"XFD"`).
//! Trailing rows without any value are trimmed, and each cell exposes lenient
//! numeric/boolean accessors that fall back to defaults instead of failing.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xlsxgrid::{build_grid, XlsxSource};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut source = XlsxSource::open_path("products.xlsx")?;
//!
//!     // Every row padded/truncated to columns A..F, rows up to the last used one
//!     let grid = build_grid(&mut source, "Products", 0, "F")?;
//!
//!     for row in grid.iter().skip(1) {
//!         let code = row.value("A")?;
//!         let price = row.double_value_or("D", 0.0)?;
//!         let active = row.is_true("F")?;
//!         println!("{code}: {price} ({active})");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxgrid::{GridBuilder, SecurityConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = GridBuilder::new()
//!         .with_max_row(499) // rows 1..=500
//!         .with_max_col(12) // columns A..L
//!         .with_security_config(SecurityConfig {
//!             max_input_file_size: 50 * 1024 * 1024,
//!             ..SecurityConfig::default()
//!         })
//!         .build()?;
//!
//!     let grid = loader.load_xlsx(File::open("report.xlsx")?, "Summary")?;
//!     println!("{}", grid.to_json()?);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Other Sources
//!
//! The grid engine only depends on the [`CellSource`] trait. [`MemorySource`]
//! wraps already-decoded data:
//!
//! ```rust
//! use xlsxgrid::{build_grid, MemorySource};
//!
//! # fn main() -> Result<(), xlsxgrid::XlsxGridError> {
//! let mut source = MemorySource::new().with_text_sheet(
//!     "Sheet1",
//!     vec![vec!["qty", "ok"], vec!["3", "TRUE"], vec!["", ""]],
//! );
//! let grid = build_grid(&mut source, "Sheet1", 0, 0)?;
//! assert_eq!(grid.len(), 2);
//! assert_eq!(grid.int_value("A", 2)?, 3);
//! assert!(grid.is_true("B", 2)?);
//! # Ok(())
//! # }
//! ```

mod builder;
mod cell;
pub mod coerce;
mod column;
mod error;
mod grid;
mod parser;
mod row;
mod security;
mod source;
mod types;

// 公開API
pub use builder::{build_grid, ColumnLimit, GridBuilder, GridLoader};
pub use cell::Cell;
pub use column::{count_total, index_to_letter, letter_to_index, ColumnRef, MAX_COLUMNS, MAX_ROWS};
pub use error::{Result, XlsxGridError};
pub use grid::Grid;
pub use parser::{XlsxSheet, XlsxSource};
pub use row::Row;
pub use security::SecurityConfig;
pub use source::{CellSource, MemoryRow, MemorySource};
pub use types::CellRecord;
