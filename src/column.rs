//! Column Module
//!
//! Excelの列文字列（"A".."XFD"）と列インデックス（1..16384）を相互変換するモジュール。
//!
//! 列文字列は通常の26進数ではなく、0を表す桁を持たない全単射的な26進表記です。
//! そのため "Z" = 26 の次は "AA" = 27 になります。

use crate::error::{Result, XlsxGridError};

/// Excelの最大列数（XFD）
pub const MAX_COLUMNS: usize = 16_384;

/// Excelの最大行数
pub const MAX_ROWS: usize = 1_048_576;

const RADIX: usize = 26;

/// 列文字列を列インデックス（1始まり）に変換
///
/// 大文字・小文字は区別しません。
///
/// # 戻り値
///
/// * `Ok(usize)` - 列インデックス（例: "A" = 1, "Z" = 26, "AA" = 27, "XFD" = 16384）
/// * `Err(XlsxGridError::InvalidColumnLetter)` - 空文字列、A-Z以外の文字を含む、または桁あふれの場合
///
/// # 使用例
///
/// ```rust
/// use xlsxgrid::letter_to_index;
///
/// assert_eq!(letter_to_index("C").unwrap(), 3);
/// assert_eq!(letter_to_index("xfd").unwrap(), 16384);
/// ```
pub fn letter_to_index(letter: &str) -> Result<usize> {
    if letter.is_empty() {
        return Err(XlsxGridError::InvalidColumnLetter(letter.to_string()));
    }

    let mut index: usize = 0;
    for ch in letter.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(XlsxGridError::InvalidColumnLetter(letter.to_string()));
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index
            .checked_mul(RADIX)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| XlsxGridError::InvalidColumnLetter(letter.to_string()))?;
    }

    Ok(index)
}

/// 列インデックス（1始まり）を列文字列に変換
///
/// # 戻り値
///
/// * `Ok(String)` - 列文字列（例: 1 = "A", 26 = "Z", 27 = "AA", 703 = "AAA"）
/// * `Err(XlsxGridError::InvalidColumnIndex)` - `index`が0の場合
pub fn index_to_letter(index: usize) -> Result<String> {
    if index == 0 {
        return Err(XlsxGridError::InvalidColumnIndex(index));
    }

    let mut digits = Vec::new();
    let mut n = index;
    while n > 0 {
        n -= 1;
        digits.push(b'A' + (n % RADIX) as u8);
        n /= RADIX;
    }
    digits.reverse();

    Ok(digits.into_iter().map(char::from).collect())
}

/// 長さ`length`以下の列文字列の総数を計算
///
/// 26 + 26^2 + ... + 26^length。オーバーフローする場合は`u64::MAX`に飽和します。
pub fn count_total(length: u32) -> u64 {
    (1..=length).fold(0u64, |total, i| {
        total.saturating_add((RADIX as u64).saturating_pow(i))
    })
}

/// 列アドレスとして使用できる型
///
/// 1始まりの列インデックス（`usize`）と列文字列（`&str`, `String`, `char`）の
/// どちらでも`Row`や`Grid`のセルを参照できるようにします。
///
/// ```rust
/// use xlsxgrid::ColumnRef;
///
/// assert_eq!(3usize.column_index().unwrap(), 3);
/// assert_eq!("C".column_index().unwrap(), 3);
/// assert_eq!('c'.column_index().unwrap(), 3);
/// ```
pub trait ColumnRef {
    /// 1始まりの列インデックスに解決する
    fn column_index(&self) -> Result<usize>;
}

impl ColumnRef for usize {
    fn column_index(&self) -> Result<usize> {
        Ok(*self)
    }
}

impl ColumnRef for u32 {
    fn column_index(&self) -> Result<usize> {
        Ok(*self as usize)
    }
}

// 整数リテラルは i32 に推論されるため、`row.cell(3)` の形で使えるようにする。
// 負の値は範囲外の列 0 として扱う。
impl ColumnRef for i32 {
    fn column_index(&self) -> Result<usize> {
        Ok(usize::try_from(*self).unwrap_or(0))
    }
}

impl ColumnRef for str {
    fn column_index(&self) -> Result<usize> {
        letter_to_index(self)
    }
}

impl ColumnRef for String {
    fn column_index(&self) -> Result<usize> {
        letter_to_index(self)
    }
}

impl ColumnRef for char {
    fn column_index(&self) -> Result<usize> {
        let mut buf = [0u8; 4];
        letter_to_index(self.encode_utf8(&mut buf))
    }
}

impl<T: ColumnRef + ?Sized> ColumnRef for &T {
    fn column_index(&self) -> Result<usize> {
        (**self).column_index()
    }
}
