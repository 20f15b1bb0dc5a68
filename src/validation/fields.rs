//! Per-field value checkers
//!
//! A field's checker is resolved in a fixed order: domain codes keyed by the
//! field *name* (`cofog`, `gfsmExpense`, `gfsmRevenue`, `type`) win over the
//! declared type, then `date`/`datetime`, then the primitive types. Anything
//! else is a configuration error.

use base64::{Engine as _, engine::general_purpose};
use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::datetime::{DateParser, Temporal};
use super::error::{PackageError, ValueError};
use crate::models::{Field, ParsedValue};

static COFOG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^((10)|(0?[1-9]))(\.[1-9]){0,2}$").expect("valid COFOG pattern"));

// GFSM 2001 revenue classes 11-14
static GFSM_REVENUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^1(",
        r"1(1(1|2|3)?|2|3(1|2|3|4|5|6)?|4(1(1|2|3)?|2|3|4|5(1|2)?|6)?|5|6(1|2)?)?",
        r"|2(1(1|2|3|4)?|2(1|2|3)?)?",
        r"|3(1(1|2)?|2(1|2)?|3(1|2)?)?",
        r"|4(1(1|2|3|4)?|2(1|2|3|4)?|3|4(1|2)?|5)?",
        r")?$"
    ))
    .expect("valid GFSM revenue pattern")
});

// GFSM 2001 expense classes 21-28
static GFSM_EXPENSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^2(",
        r"1(1(1|2)?|2(1|2)?)?",
        r"|2|3|4(1|2|3)?|5(1|2)?",
        r"|6(1(1|2)?|2(1|2)?|3(1|2)?)?",
        r"|7(1(1|2)?|2(1|2)?|3(1|2)?)?",
        r"|8(1(1|2|3|4)?|2(1|2)?)?",
        r")?$"
    ))
    .expect("valid GFSM expense pattern")
});

/// Allowed values of the `type` field
pub const EXPENDITURE_TYPES: &[&str] = &["personnel", "non-personnel recurrent", "capital", "other"];

/// Classification and enumeration checks selected by field name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainCode {
    Cofog,
    GfsmExpense,
    GfsmRevenue,
    ExpenditureType,
}

/// Domain codes by field name, consulted before any type-based lookup
pub const DOMAIN_FIELDS: &[(&str, DomainCode)] = &[
    ("cofog", DomainCode::Cofog),
    ("gfsmExpense", DomainCode::GfsmExpense),
    ("gfsmRevenue", DomainCode::GfsmRevenue),
    ("type", DomainCode::ExpenditureType),
];

impl DomainCode {
    pub fn for_field_name(name: &str) -> Option<Self> {
        DOMAIN_FIELDS
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, code)| *code)
    }

    pub fn check(&self, raw: &str) -> Result<ParsedValue, ValueError> {
        let valid = match self {
            DomainCode::Cofog => COFOG.is_match(raw),
            DomainCode::GfsmExpense => GFSM_EXPENSE.is_match(raw),
            DomainCode::GfsmRevenue => GFSM_REVENUE.is_match(raw),
            DomainCode::ExpenditureType => EXPENDITURE_TYPES.contains(&raw),
        };
        if valid {
            return Ok(ParsedValue::Text(raw.to_string()));
        }
        let raw = raw.to_string();
        Err(match self {
            DomainCode::Cofog => ValueError::InvalidCofog(raw),
            DomainCode::GfsmExpense => ValueError::InvalidGfsmExpense(raw),
            DomainCode::GfsmRevenue => ValueError::InvalidGfsmRevenue(raw),
            DomainCode::ExpenditureType => ValueError::InvalidEnum {
                value: raw,
                allowed: EXPENDITURE_TYPES,
            },
        })
    }
}

/// Built-in field types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Number,
    Integer,
    String,
    Time,
    Boolean,
    Binary,
    Json,
    Array,
}

/// Primitive types by declared type name
pub const PRIMITIVE_TYPES: &[(&str, PrimitiveType)] = &[
    ("number", PrimitiveType::Number),
    ("integer", PrimitiveType::Integer),
    ("int", PrimitiveType::Integer),
    ("string", PrimitiveType::String),
    ("time", PrimitiveType::Time),
    ("boolean", PrimitiveType::Boolean),
    ("binary", PrimitiveType::Binary),
    ("object", PrimitiveType::Json),
    ("json", PrimitiveType::Json),
    ("geojson", PrimitiveType::Json),
    ("array", PrimitiveType::Array),
];

impl PrimitiveType {
    pub fn for_type_name(kind: &str) -> Option<Self> {
        PRIMITIVE_TYPES
            .iter()
            .find(|(name, _)| *name == kind)
            .map(|(_, t)| *t)
    }

    pub fn check(&self, raw: &str) -> Result<ParsedValue, ValueError> {
        match self {
            PrimitiveType::Number => raw
                .trim()
                .parse::<f64>()
                .map(ParsedValue::Number)
                .map_err(|_| ValueError::InvalidNumber(raw.to_string())),
            PrimitiveType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(ParsedValue::Integer)
                .map_err(|_| ValueError::InvalidInteger(raw.to_string())),
            PrimitiveType::String => Ok(ParsedValue::Text(raw.to_string())),
            PrimitiveType::Time => NaiveTime::parse_from_str(raw, "%H:%M")
                .map(ParsedValue::Time)
                .map_err(|_| ValueError::InvalidTime(raw.to_string())),
            PrimitiveType::Boolean => Ok(ParsedValue::Boolean(!raw.is_empty())),
            PrimitiveType::Binary => general_purpose::STANDARD
                .decode(raw)
                .map(ParsedValue::Binary)
                .map_err(|_| ValueError::InvalidBinary(raw.to_string())),
            PrimitiveType::Json => serde_json::from_str(raw)
                .map(ParsedValue::Json)
                .map_err(|e| ValueError::InvalidJson {
                    value: raw.to_string(),
                    reason: e.to_string(),
                }),
            PrimitiveType::Array => Ok(ParsedValue::Array(
                raw.chars().map(String::from).collect(),
            )),
        }
    }
}

/// The checker chosen for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValidator {
    Domain(DomainCode),
    Temporal(DateParser),
    Primitive(PrimitiveType),
}

impl FieldValidator {
    /// Check one raw cell value
    pub fn check(&self, raw: &str) -> Result<ParsedValue, ValueError> {
        match self {
            FieldValidator::Domain(code) => code.check(raw),
            FieldValidator::Temporal(parser) => parser.parse(raw),
            FieldValidator::Primitive(kind) => kind.check(raw),
        }
    }
}

impl fmt::Display for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValidator::Domain(code) => write!(f, "domain code {code:?}"),
            FieldValidator::Temporal(parser) => {
                let kind = match parser.kind() {
                    Temporal::Date => "date",
                    Temporal::DateTime => "datetime",
                };
                write!(f, "{kind} ({})", parser.pattern())
            }
            FieldValidator::Primitive(kind) => write!(f, "{kind:?}"),
        }
    }
}

/// Resolve the checker for a field from its metadata
pub fn field_validator(field: &Field) -> Result<FieldValidator, PackageError> {
    if let Some(code) = DomainCode::for_field_name(&field.name) {
        return Ok(FieldValidator::Domain(code));
    }

    match field.kind.as_str() {
        "date" => {
            return Ok(FieldValidator::Temporal(DateParser::new(
                Temporal::Date,
                field.format.as_deref(),
            )));
        }
        "datetime" => {
            return Ok(FieldValidator::Temporal(DateParser::new(
                Temporal::DateTime,
                field.format.as_deref(),
            )));
        }
        _ => {}
    }

    PrimitiveType::for_type_name(&field.kind)
        .map(FieldValidator::Primitive)
        .ok_or_else(|| PackageError::UnknownFieldType {
            field: field.name.clone(),
            kind: field.kind.clone(),
        })
}
