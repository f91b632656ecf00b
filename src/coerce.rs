//! Coerce Module
//!
//! セルの文字列値を数値に変換する基本関数群。
//!
//! ここでは失敗を`Result`として返すだけで、デフォルト値への置き換えは行いません。
//! デフォルト値へのフォールバックは`Cell`のアクセサ側の責務です。

use std::str::FromStr;

/// 前後の空白を取り除いてから`T`として解析する
///
/// ```rust
/// use xlsxgrid::coerce::parse_trimmed;
///
/// assert_eq!(parse_trimmed::<i32>(" 7 "), Ok(7));
/// assert!(parse_trimmed::<i32>("abc").is_err());
/// ```
pub fn parse_trimmed<T: FromStr>(s: &str) -> Result<T, T::Err> {
    s.trim().parse::<T>()
}

/// 32ビット符号付き整数として解析
pub fn to_int(s: &str) -> Result<i32, std::num::ParseIntError> {
    parse_trimmed(s)
}

/// 64ビット符号付き整数として解析
pub fn to_long(s: &str) -> Result<i64, std::num::ParseIntError> {
    parse_trimmed(s)
}

/// 倍精度浮動小数点数として解析
pub fn to_double(s: &str) -> Result<f64, std::num::ParseFloatError> {
    parse_trimmed(s)
}

/// 単精度浮動小数点数として解析
pub fn to_float(s: &str) -> Result<f32, std::num::ParseFloatError> {
    parse_trimmed(s)
}
