//! Label parser turning recognized text into a [`FieldSet`].

use std::time::Instant;

use tracing::debug;

use crate::models::label::{FieldSet, NOT_AVAILABLE};

use super::rules::{split_expiration, strip_matches, FieldKind, FieldMatch, LabelMatches};

/// Result of parsing one block of recognized text.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted fields, sentinel-filled.
    pub fields: FieldSet,
    /// Raw rule hits, before disambiguation.
    pub matches: Vec<FieldMatch>,
    /// Notes about how the fields were derived.
    pub warnings: Vec<String>,
    /// Processing time in microseconds.
    pub processing_time_us: u64,
}

/// Parser for the "keyword: value" label layout.
///
/// Parsing is total and has no side effects: any input yields a complete
/// [`FieldSet`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelParser;

impl LabelParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse recognized text.
    pub fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        let matches = LabelMatches::find(text);
        let value = |kind: FieldKind| {
            matches
                .get(kind)
                .map(|m| m.value.clone())
                .unwrap_or_default()
        };

        let mut expiration = value(FieldKind::Expiration);
        let mut purchase_order = value(FieldKind::PurchaseOrder);

        if let Some((exp, po)) = split_expiration(&expiration) {
            expiration = exp;
            if purchase_order.is_empty() {
                warnings.push("purchase order taken from the expiration line".to_string());
                purchase_order = po;
            }
        }

        let fields = FieldSet {
            serial_number: or_sentinel(value(FieldKind::SerialNumber)),
            expiration_date: or_sentinel(expiration),
            warranty: or_sentinel(value(FieldKind::Warranty)),
            purchase_order: or_sentinel(purchase_order),
            operating_system: or_sentinel(value(FieldKind::OperatingSystem)),
            other: or_sentinel(strip_matches(text, &matches)),
        };

        for kind in FieldKind::ALL {
            if matches.get(kind).is_none() {
                warnings.push(format!("no {} line found", kind.label()));
            }
        }

        let processing_time_us = start.elapsed().as_micros() as u64;
        debug!(
            "Parsed label: {} of 5 fields in {}us",
            fields.found_count(),
            processing_time_us
        );

        ExtractionResult {
            fields,
            matches: matches.iter().cloned().collect(),
            warnings,
            processing_time_us,
        }
    }
}

fn or_sentinel(value: String) -> String {
    if value.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value
    }
}

/// Extract the labeled fields from recognized text.
pub fn extract_fields(text: &str) -> FieldSet {
    LabelParser::new().parse(text).fields
}
