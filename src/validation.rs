//! Field validation and sanitization for submitted forms
//!
//! Both operations work on an ordered mapping of field name to raw text.
//! A field missing from the mapping is treated as the empty string.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use validator::ValidateLength;

/// Raw form fields, in submission order
pub type Fields = IndexMap<String, String>;

/// A rule applied to one field
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Must contain at least one character
    NotEmpty,
    /// Must contain at least this many characters
    MinLength(u64),
    /// Empty, or a calendar date written `YYYY-MM-DD`
    OptionalDate,
    /// Empty, or a positive integer identity
    Reference,
    /// Must equal one of the listed values
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub rule: Rule,
    pub message: &'static str,
}

impl FieldRule {
    pub const fn new(field: &'static str, rule: Rule, message: &'static str) -> Self {
        Self { field, rule, message }
    }
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub param: String,
    pub msg: String,
    pub value: String,
}

impl FieldError {
    pub fn new(param: &str, msg: &str, value: &str) -> Self {
        Self {
            param: param.to_string(),
            msg: msg.to_string(),
            value: value.to_string(),
        }
    }
}

impl Rule {
    fn accepts(&self, value: &str) -> bool {
        match *self {
            Rule::NotEmpty => value.validate_length(Some(1), None, None),
            Rule::MinLength(min) => value.validate_length(Some(min), None, None),
            Rule::OptionalDate => {
                value.is_empty() || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
            }
            Rule::Reference => value.is_empty() || is_reference(value),
            Rule::OneOf(allowed) => allowed.contains(&value),
        }
    }
}

/// Whether `value` can name a stored record
pub fn is_reference(value: &str) -> bool {
    value.parse::<i32>().map(|id| id > 0).unwrap_or(false)
}

/// Evaluate `rules` in order against `fields`; an empty result means valid
pub fn check(fields: &Fields, rules: &[FieldRule]) -> Vec<FieldError> {
    rules
        .iter()
        .filter_map(|rule| {
            let value = fields.get(rule.field).map(String::as_str).unwrap_or("");
            (!rule.rule.accepts(value)).then(|| FieldError::new(rule.field, rule.message, value))
        })
        .collect()
}

/// Escape markup-significant characters
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape then trim a single value.
///
/// The order matters: stored and re-rendered values were produced this way.
pub fn sanitize_value(value: &str) -> String {
    escape(value).trim().to_string()
}

/// Return a copy of `fields` with each field in `names` escaped then trimmed.
/// Listed fields that are absent are inserted as empty strings.
pub fn sanitize(fields: &Fields, names: &[&str]) -> Fields {
    let mut out = fields.clone();
    for name in names {
        let value = fields.get(*name).map(|v| sanitize_value(v)).unwrap_or_default();
        out.insert(name.to_string(), value);
    }
    out
}
