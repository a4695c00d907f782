use crate::assets::ImageResolver;
use crate::entry_id::SLUG_KEY;
use crate::record::{RawRecord, TypedValue, ValidatedRecord};
use crate::schema::{CollectionSchema, FieldKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Date-only forms accepted besides ISO `YYYY-MM-DD`.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%b %d %Y", "%b %d, %Y", "%B %d %Y", "%B %d, %Y"];

/// Naive date-times are read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Why a field was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ValidationReason {
    #[error("required field is missing")]
    MissingRequiredField,

    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot convert '{value}': {message}")]
    CoercionFailure { value: String, message: String },

    #[error("value '{value}' is not one of {}", .allowed.join(", "))]
    EnumValueNotAllowed { value: String, allowed: Vec<String> },

    #[error("'{value}' is not a valid absolute URL: {message}")]
    UrlMalformed { value: String, message: String },

    #[error("field is not declared in the schema")]
    UnknownField,
}

/// A rejected field in a specific source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub source_id: String,
    pub field: String,
    #[serde(flatten)]
    pub reason: ValidationReason,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: field '{}': {}", self.source_id, self.field, self.reason)
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    fn new(raw: &RawRecord, field: &str, reason: ValidationReason) -> Self {
        ValidationError {
            source_id: raw.source.clone(),
            field: field.to_string(),
            reason,
        }
    }
}

/// Validate a raw record against a schema.
///
/// Every declared field is checked in schema order and all violations are
/// returned together; the record is accepted only if there are none. Absent
/// and `null` values are treated the same. Undeclared keys are dropped, or
/// reported as [`ValidationReason::UnknownField`] when the schema denies them.
pub fn validate(
    schema: &CollectionSchema,
    raw: &RawRecord,
) -> std::result::Result<ValidatedRecord, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut data = BTreeMap::new();

    for field in schema.fields() {
        let value = raw.fields.get(field.name()).filter(|v| !v.is_null());

        let coerced = match value {
            None if field.is_required() => {
                errors.push(ValidationError::new(
                    raw,
                    field.name(),
                    ValidationReason::MissingRequiredField,
                ));
                continue;
            }
            None => match field.default() {
                Some(default) => coerce_value(field.kind(), default, schema.images(), &raw.path),
                None => continue,
            },
            Some(value) => coerce_value(field.kind(), value, schema.images(), &raw.path),
        };

        match coerced {
            Ok(typed) => {
                data.insert(field.name().to_string(), typed);
            }
            Err(reason) => errors.push(ValidationError::new(raw, field.name(), reason)),
        }
    }

    for key in raw.fields.keys() {
        if key == SLUG_KEY || schema.field(key).is_some() {
            continue;
        }
        if schema.additional_properties() {
            log::debug!("{}: dropping undeclared field '{key}'", raw.source);
        } else {
            errors.push(ValidationError::new(raw, key, ValidationReason::UnknownField));
        }
    }

    if errors.is_empty() {
        Ok(ValidatedRecord::new(
            raw.id.clone(),
            raw.source.clone(),
            data,
            raw.body.clone(),
        ))
    } else {
        Err(errors)
    }
}

/// Validate a batch of records independently, splitting accepted records
/// from the errors of rejected ones. Input order is preserved in both.
pub fn validate_records(
    schema: &CollectionSchema,
    raws: &[RawRecord],
) -> (Vec<ValidatedRecord>, Vec<ValidationError>) {
    let mut records = Vec::with_capacity(raws.len());
    let mut errors = Vec::new();

    for raw in raws {
        match validate(schema, raw) {
            Ok(record) => records.push(record),
            Err(mut record_errors) => errors.append(&mut record_errors),
        }
    }

    (records, errors)
}

/// Apply a field kind's coercion rule to one present value.
pub fn coerce_value(
    kind: &FieldKind,
    value: &serde_json::Value,
    images: &dyn ImageResolver,
    entry_path: &Path,
) -> std::result::Result<TypedValue, ValidationReason> {
    match kind {
        FieldKind::String => value
            .as_str()
            .map(|s| TypedValue::String(s.to_string()))
            .ok_or_else(|| mismatch(kind, value)),
        FieldKind::Boolean => value
            .as_bool()
            .map(TypedValue::Boolean)
            .ok_or_else(|| mismatch(kind, value)),
        FieldKind::Enum(allowed) => match value.as_str() {
            Some(s) if allowed.iter().any(|a| a == s) => Ok(TypedValue::String(s.to_string())),
            _ => Err(ValidationReason::EnumValueNotAllowed {
                value: display_value(value),
                allowed: allowed.clone(),
            }),
        },
        FieldKind::Date => coerce_date(value),
        FieldKind::Url => {
            let s = value.as_str().ok_or_else(|| mismatch(kind, value))?;
            parse_absolute_url(s).map(TypedValue::Url)
        }
        FieldKind::Image => {
            let s = value.as_str().ok_or_else(|| mismatch(kind, value))?;
            images
                .resolve(entry_path, s)
                .map(TypedValue::Image)
                .map_err(|message| ValidationReason::CoercionFailure {
                    value: s.to_string(),
                    message,
                })
        }
    }
}

fn coerce_date(value: &serde_json::Value) -> std::result::Result<TypedValue, ValidationReason> {
    match value {
        serde_json::Value::String(s) => {
            parse_date(s)
                .map(TypedValue::Date)
                .ok_or_else(|| ValidationReason::CoercionFailure {
                    value: s.clone(),
                    message: "not a recognized date or date-time".into(),
                })
        }
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(truncate_millis))
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .map(TypedValue::Date)
            .ok_or_else(|| ValidationReason::CoercionFailure {
                value: n.to_string(),
                message: "not a number of epoch milliseconds in range".into(),
            }),
        other => Err(ValidationReason::TypeMismatch {
            expected: "date",
            found: type_name(other),
        }),
    }
}

/// Fractional milliseconds are dropped, rounding toward zero.
fn truncate_millis(ms: f64) -> Option<i64> {
    let ms = ms.trunc();
    (ms.is_finite() && ms.abs() < i64::MAX as f64).then_some(ms as i64)
}

/// Parse a date or date-time string. Date-only values become midnight UTC.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive));
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_absolute_url(s: &str) -> std::result::Result<Url, ValidationReason> {
    match Url::parse(s) {
        Ok(url) if url.host_str().map_or(false, |h| !h.is_empty()) => Ok(url),
        Ok(_) => Err(ValidationReason::UrlMalformed {
            value: s.to_string(),
            message: "missing host".into(),
        }),
        Err(e) => Err(ValidationReason::UrlMalformed {
            value: s.to_string(),
            message: e.to_string(),
        }),
    }
}

fn mismatch(kind: &FieldKind, value: &serde_json::Value) -> ValidationReason {
    ValidationReason::TypeMismatch {
        expected: kind.label(),
        found: type_name(value),
    }
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}
