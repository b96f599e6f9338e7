//! Label field extraction module.

mod parser;
pub mod rules;

pub use parser::{extract_fields, ExtractionResult, LabelParser};
pub use rules::{FieldKind, FieldMatch, LabelMatches};
