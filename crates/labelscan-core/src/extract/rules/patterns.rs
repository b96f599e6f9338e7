//! Line patterns for equipment label fields.
//!
//! Each pattern is a keyword anchor, an optional same-line separator and a
//! capture of the rest of the line. Captures never cross a line break.

use lazy_static::lazy_static;
use regex::Regex;

/// Separator between an anchor and its value: blanks around `:`, `#`, `.` or `-`.
const SEP: &str = r"[ \t]*[:#.\-]*[ \t]*";

/// Rest of the line.
const VALUE: &str = r"([^\n]*)";

fn line_pattern(anchor: &str) -> Regex {
    Regex::new(&format!(r"(?i){anchor}{SEP}{VALUE}")).unwrap()
}

lazy_static! {
    // "OS: Windows 10"
    pub static ref OS_LINE: Regex = line_pattern(r"\bOS\b");

    // "Exp: Dec 2025", "Expiration Date - 06/2027"
    pub static ref EXPIRATION_LINE: Regex =
        line_pattern(r"\bExp(?:iration|iry|ires|ired)?\b(?:[ \t]+Date\b)?");

    // "P/O: 12345", "PO# 12345", "P.O. 12345", "Purchase Order: 12345"
    pub static ref PURCHASE_ORDER_LINE: Regex =
        line_pattern(r"\b(?:P[ \t]*/[ \t]*O|P\.[ \t]*O|PO|Purchase[ \t]+Order)\b");

    // "Serial: ABC123", "Serial No. ABC123", "SerialNumber ABC123", "S/N ABC123"
    pub static ref SERIAL_LINE: Regex = line_pattern(
        r"\b(?:Serial(?:[ \t]*(?:Number|Num|No))?\b|S[ \t]*/[ \t]*N\b)"
    );

    // "Warranty: 2 years", "Warranties - none"
    pub static ref WARRANTY_LINE: Regex = line_pattern(r"\bWarrant(?:y|ies)?\b");
}

/// Marker that shows a purchase order was captured as part of the expiration line.
pub const PO_MARKER: &str = "P/O:";

#[cfg(test)]
mod tests {
    use super::*;

    fn capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
        re.captures(text).map(|c| c.get(1).map_or("", |m| m.as_str()))
    }

    #[test]
    fn test_anchor_variants() {
        assert_eq!(capture(&OS_LINE, "os - Ubuntu 22.04"), Some("Ubuntu 22.04"));
        assert_eq!(capture(&EXPIRATION_LINE, "Expiration Date: 06/2027"), Some("06/2027"));
        assert_eq!(capture(&PURCHASE_ORDER_LINE, "PO# 998877"), Some("998877"));
        assert_eq!(capture(&PURCHASE_ORDER_LINE, "P.O. 998877"), Some("998877"));
        assert_eq!(capture(&SERIAL_LINE, "SERIAL NO. 5CG1234XYZ"), Some("5CG1234XYZ"));
        assert_eq!(capture(&SERIAL_LINE, "S/N: 5CG1234XYZ"), Some("5CG1234XYZ"));
        assert_eq!(capture(&WARRANTY_LINE, "WARRANTY 3 yrs onsite"), Some("3 yrs onsite"));
    }

    #[test]
    fn test_capture_stops_at_line_break() {
        assert_eq!(capture(&OS_LINE, "OS: Windows 11\nSerial: X"), Some("Windows 11"));
    }

    #[test]
    fn test_anchor_without_value_still_matches() {
        assert_eq!(capture(&WARRANTY_LINE, "Warranty:\nnext"), Some(""));
    }

    #[test]
    fn test_keyword_glued_to_value_is_not_an_anchor() {
        assert!(SERIAL_LINE.captures("SerialABC123").is_none());
        assert!(WARRANTY_LINE.captures("Warranty3yrs").is_none());
        assert_eq!(capture(&SERIAL_LINE, "SerialNumber: X9"), Some("X9"));
        assert_eq!(capture(&SERIAL_LINE, "Serial Nothing"), Some("Nothing"));
    }

    #[test]
    fn test_anchor_needs_word_boundary() {
        assert!(OS_LINE.captures("Windows Pro").is_none());
        assert!(EXPIRATION_LINE.captures("Expert mode").is_none());
        assert!(PURCHASE_ORDER_LINE.captures("Power supply").is_none());
    }
}
