//! Text normalization for noisy portfolio fields
//!
//! Source portfolios arrive with coordinates typed by hand (decimal commas,
//! en-dashes for minus signs, stray units) and monetary amounts in Indonesian
//! formatting ("Rp 1.000.000.000"). Every cleaner returns `Option<f64>`:
//! `None` marks an invalid value and flows downstream as undefined, never as a
//! sentinel zero.

/// Clean a raw coordinate string into a numeric value.
///
/// Trims whitespace, maps en-dash/em-dash to ASCII minus, treats a comma as
/// the decimal separator, strips every remaining character outside `[0-9.-]`,
/// then parses as floating point.
pub fn clean_coordinate(raw: &str) -> Option<f64> {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        let ch = match ch {
            '\u{2013}' | '\u{2014}' => '-',
            ',' => '.',
            c => c,
        };
        if ch.is_ascii_digit() || ch == '.' || ch == '-' {
            cleaned.push(ch);
        }
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Clean a raw monetary string into a numeric value.
///
/// Interprets the id-ID convention used by the source portfolios: `.` is a
/// thousands-grouping character (removed), `,` is the decimal separator.
/// Currency symbols, spaces and letters are dropped. "Rp 1.000.000.000"
/// parses to 1000000000 and "1.234,56" keeps its fractional value as 1234.56.
pub fn clean_money(raw: &str) -> Option<f64> {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        match ch {
            '0'..='9' => cleaned.push(ch),
            ',' => cleaned.push('.'),
            // grouping separator
            '.' => {}
            _ => {}
        }
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Lenient numeric parse for count-like fields (floor counts).
pub fn clean_count(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().replace(',', ".");
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Lenient integer parse for year fields.
///
/// Accepts plain integers and float-formatted years ("2024.0") that spreadsheet
/// round-trips produce.
pub fn clean_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .map(|v| v as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_comma_and_point_agree() {
        assert_eq!(clean_coordinate("-6,200000"), Some(-6.2));
        assert_eq!(clean_coordinate("-6.200000"), Some(-6.2));
        assert_eq!(clean_coordinate("106,8166"), clean_coordinate("106.8166"));
    }

    #[test]
    fn test_coordinate_dashes_and_noise() {
        // en-dash typed instead of minus
        assert_eq!(clean_coordinate("\u{2013}6.2"), Some(-6.2));
        assert_eq!(clean_coordinate("  106.8166 E "), Some(106.8166));
        assert_eq!(clean_coordinate("lat: 1.5"), Some(1.5));
    }

    #[test]
    fn test_coordinate_invalid() {
        assert_eq!(clean_coordinate(""), None);
        assert_eq!(clean_coordinate("abc"), None);
        assert_eq!(clean_coordinate("1.2.3"), None);
        assert_eq!(clean_coordinate("--"), None);
    }

    #[test]
    fn test_money_grouping() {
        assert_eq!(clean_money("Rp 1.000.000.000"), Some(1_000_000_000.0));
        assert_eq!(clean_money("1.000.000"), Some(1_000_000.0));
        assert_eq!(clean_money("500"), Some(500.0));
    }

    #[test]
    fn test_money_keeps_fraction() {
        // grouping dots removed, decimal comma preserved
        assert_eq!(clean_money("1.234,56"), Some(1234.56));
        assert_eq!(clean_money("0,5"), Some(0.5));
    }

    #[test]
    fn test_money_invalid() {
        assert_eq!(clean_money(""), None);
        assert_eq!(clean_money("n/a"), None);
        assert_eq!(clean_money("1,2,3"), None);
    }

    #[test]
    fn test_count_and_year() {
        assert_eq!(clean_count("2"), Some(2.0));
        assert_eq!(clean_count(" 1,5 "), Some(1.5));
        assert_eq!(clean_count("two"), None);

        assert_eq!(clean_year("2024"), Some(2024));
        assert_eq!(clean_year("2024.0"), Some(2024));
        assert_eq!(clean_year("2024.5"), None);
        assert_eq!(clean_year(""), None);
    }
}
