//! Parsing of compact size literals such as `2G` or `512MB`.

use crate::error::SizeError;

const KIB: u64 = 1024;

/// Parse a size literal into a byte count.
///
/// Accepts one or more decimal digits, an optional unit letter from
/// `K`, `M`, `G`, `T`, `P` and an optional trailing `B`, all
/// case-insensitive and surrounded by optional whitespace. Units are binary
/// multiples (`K` = 1024). The trailing `B` has no effect on magnitude.
///
/// # Examples
///
/// ```
/// use snapdigest_core::parse_bytes;
///
/// assert_eq!(parse_bytes("2KB").unwrap(), 2048);
/// assert_eq!(parse_bytes(" 3m ").unwrap(), 3 * 1024 * 1024);
/// assert!(parse_bytes("1.5G").is_err());
/// ```
pub fn parse_bytes(value: &str) -> Result<u64, SizeError> {
    let invalid = || SizeError::InvalidFormat(value.to_string());

    let text = value.trim();
    let digits_end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, suffix) = text.split_at(digits_end);
    if digits.is_empty() {
        return Err(invalid());
    }

    let suffix = suffix.to_ascii_uppercase();
    let unit = suffix.strip_suffix('B').unwrap_or(&suffix);
    let scale = match unit {
        "" => 1,
        "K" => KIB,
        "M" => KIB.pow(2),
        "G" => KIB.pow(3),
        "T" => KIB.pow(4),
        "P" => KIB.pow(5),
        _ => return Err(invalid()),
    };

    let number: u64 = digits.parse().map_err(|_| invalid())?;
    number.checked_mul(scale).ok_or_else(invalid)
}
