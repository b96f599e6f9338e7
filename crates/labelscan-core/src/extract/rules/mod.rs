//! Rule-based field extractors for equipment labels.

pub mod patterns;

use regex::{Captures, Regex};
use serde::Serialize;

use patterns::{EXPIRATION_LINE, OS_LINE, PURCHASE_ORDER_LINE, SERIAL_LINE, WARRANTY_LINE};

/// The labeled fields a rule can extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    OperatingSystem,
    Expiration,
    PurchaseOrder,
    SerialNumber,
    Warranty,
}

impl FieldKind {
    /// Every kind, in the order matched text is stripped from the remainder.
    pub const ALL: [FieldKind; 5] = [
        FieldKind::OperatingSystem,
        FieldKind::Expiration,
        FieldKind::PurchaseOrder,
        FieldKind::SerialNumber,
        FieldKind::Warranty,
    ];

    /// Line pattern for this field.
    pub fn pattern(self) -> &'static Regex {
        match self {
            FieldKind::OperatingSystem => &OS_LINE,
            FieldKind::Expiration => &EXPIRATION_LINE,
            FieldKind::PurchaseOrder => &PURCHASE_ORDER_LINE,
            FieldKind::SerialNumber => &SERIAL_LINE,
            FieldKind::Warranty => &WARRANTY_LINE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldKind::OperatingSystem => "OS",
            FieldKind::Expiration => "Exp",
            FieldKind::PurchaseOrder => "P/O",
            FieldKind::SerialNumber => "Serial No",
            FieldKind::Warranty => "Warranty",
        }
    }
}

/// One rule hit in the recognized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMatch {
    pub kind: FieldKind,
    /// Trimmed captured value. May be empty.
    pub value: String,
    /// Matched text as it appears in the source, anchor included.
    pub source: String,
    /// Byte range of `source` in the text.
    pub position: (usize, usize),
}

fn to_match(kind: FieldKind, caps: &Captures<'_>) -> Option<FieldMatch> {
    let whole = caps.get(0)?;
    let value = caps.get(1).map_or("", |m| m.as_str()).trim();

    Some(FieldMatch {
        kind,
        value: value.to_string(),
        source: whole.as_str().to_string(),
        position: (whole.start(), whole.end()),
    })
}

/// Apply one field rule. Returns the first (leftmost) hit.
pub fn match_field(kind: FieldKind, text: &str) -> Option<FieldMatch> {
    to_match(kind, &kind.pattern().captures(text)?)
}

/// Like [`match_field`], but prefer the first hit outside `span`.
///
/// Falls back to the leftmost hit when every hit lies inside `span`.
pub fn match_field_outside(
    kind: FieldKind,
    text: &str,
    span: Option<(usize, usize)>,
) -> Option<FieldMatch> {
    let Some((start, end)) = span else {
        return match_field(kind, text);
    };

    kind.pattern()
        .captures_iter(text)
        .filter_map(|caps| to_match(kind, &caps))
        .find(|hit| hit.position.1 <= start || hit.position.0 >= end)
        .or_else(|| match_field(kind, text))
}

/// Independent hits for every field kind.
#[derive(Debug, Clone, Default)]
pub struct LabelMatches {
    pub operating_system: Option<FieldMatch>,
    pub expiration: Option<FieldMatch>,
    pub purchase_order: Option<FieldMatch>,
    pub serial_number: Option<FieldMatch>,
    pub warranty: Option<FieldMatch>,
}

impl LabelMatches {
    /// Run all five rules against `text`.
    ///
    /// An expiration line may carry an inline `P/O:`; a purchase order line
    /// of its own wins over it wherever it appears.
    pub fn find(text: &str) -> Self {
        let expiration = match_field(FieldKind::Expiration, text);
        let purchase_order = match_field_outside(
            FieldKind::PurchaseOrder,
            text,
            expiration.as_ref().map(|m| m.position),
        );

        Self {
            operating_system: match_field(FieldKind::OperatingSystem, text),
            expiration,
            purchase_order,
            serial_number: match_field(FieldKind::SerialNumber, text),
            warranty: match_field(FieldKind::Warranty, text),
        }
    }

    pub fn get(&self, kind: FieldKind) -> Option<&FieldMatch> {
        match kind {
            FieldKind::OperatingSystem => self.operating_system.as_ref(),
            FieldKind::Expiration => self.expiration.as_ref(),
            FieldKind::PurchaseOrder => self.purchase_order.as_ref(),
            FieldKind::SerialNumber => self.serial_number.as_ref(),
            FieldKind::Warranty => self.warranty.as_ref(),
        }
    }

    /// Hits in stripping order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldMatch> {
        FieldKind::ALL.into_iter().filter_map(|kind| self.get(kind))
    }
}

/// Split an expiration value that swallowed a trailing purchase order.
///
/// Returns `(expiration, purchase_order)` when [`patterns::PO_MARKER`] is present.
pub fn split_expiration(value: &str) -> Option<(String, String)> {
    let (exp, po) = value.split_once(patterns::PO_MARKER)?;
    Some((exp.trim().to_string(), po.trim().to_string()))
}

/// Remove the source text of every hit from `text`, first occurrence each, and trim.
pub fn strip_matches(text: &str, matches: &LabelMatches) -> String {
    let mut rest = text.to_string();
    for hit in matches.iter() {
        rest = rest.replacen(&hit.source, "", 1);
    }
    rest.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_match_field_keeps_raw_source() {
        let hit = match_field(FieldKind::SerialNumber, "label\nSerial:   ABC123  \nend").unwrap();

        assert_eq!(hit.value, "ABC123");
        assert_eq!(hit.source, "Serial:   ABC123  ");
        assert_eq!(hit.position, (6, 24));
    }

    #[test]
    fn test_purchase_order_line_after_expiration_is_preferred() {
        let text = "Exp: June, 2020 P/O: 450165\nP/O: 777\nSerial: X1";
        let matches = LabelMatches::find(text);

        let po = matches.purchase_order.as_ref().unwrap();
        assert_eq!(po.value, "777");
        assert_eq!(po.source, "P/O: 777");
        assert_eq!(strip_matches(text, &matches), "");
    }

    #[test]
    fn test_inline_purchase_order_is_used_when_alone() {
        let text = "Exp: June, 2020 P/O: 450165";
        let matches = LabelMatches::find(text);

        assert_eq!(
            matches.purchase_order.as_ref().map(|m| m.value.as_str()),
            Some("450165")
        );
    }

    #[test]
    fn test_split_expiration() {
        assert_eq!(
            split_expiration("June, 2020 P/O: 450165"),
            Some(("June, 2020".to_string(), "450165".to_string()))
        );
        assert_eq!(split_expiration("June, 2020"), None);
    }

    #[test]
    fn test_strip_matches_removes_each_source_once() {
        let text = "OS: Linux\nnote\nOS: Linux";
        let matches = LabelMatches::find(text);

        assert_eq!(strip_matches(text, &matches), "note\nOS: Linux");
    }

    #[test]
    fn test_empty_capture_is_stripped() {
        let text = "Warranty:\nStock item";
        let matches = LabelMatches::find(text);

        assert_eq!(matches.warranty.as_ref().map(|m| m.value.as_str()), Some(""));
        assert_eq!(strip_matches(text, &matches), "Stock item");
    }
}
