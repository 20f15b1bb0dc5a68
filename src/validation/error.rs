//! Error types for package, rule and value validation

use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

use super::report::PackageReport;
use crate::models::Category;

/// A single JSON Schema violation, located by its instance path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    pub instance_path: String,
    pub message: String,
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Failure of a whole validation run
#[derive(Error, Debug, Diagnostic)]
pub enum PackageError {
    #[error("JSON Schema validation error: {}", join(.issues, "; "))]
    #[diagnostic(
        code(bdp::schema_violation),
        help("the descriptor must match the budget data package schema")
    )]
    SchemaViolation { issues: Vec<SchemaIssue> },

    #[error("Failed to compile JSON schema: {0}")]
    #[diagnostic(code(bdp::invalid_schema))]
    InvalidSchema(String),

    #[error("Malformed descriptor {location}: {source}")]
    #[diagnostic(code(bdp::malformed_descriptor))]
    MalformedDescriptor {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Resource '{resource}' ({category}): {rule}")]
    #[diagnostic(
        code(bdp::field_requirement),
        help("add the missing field(s) to the resource's schema.fields")
    )]
    FieldRequirementViolation {
        resource: String,
        category: Category,
        rule: RuleError,
    },

    #[error("Resource '{resource}' has unknown category '{granularity}-{kind}'")]
    #[diagnostic(
        code(bdp::unknown_category),
        help(
            "granularity must be 'aggregated' or 'transactional' and type must be 'expenditure' or 'revenue'"
        )
    )]
    UnknownCategory {
        resource: String,
        granularity: String,
        kind: String,
    },

    #[error("No field validator for field '{field}' of type '{kind}'")]
    #[diagnostic(code(bdp::unknown_field_type))]
    UnknownFieldType { field: String, kind: String },

    #[error("Could not read descriptor {location}: {source}")]
    #[diagnostic(code(bdp::descriptor_unreadable))]
    DescriptorUnreadable {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read resource {location}: {source}")]
    #[diagnostic(code(bdp::resource_unreadable))]
    ResourceUnreadable {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("missing data resources ({})", .paths.join(", "))]
    #[diagnostic(
        code(bdp::missing_resources),
        help("resource paths are resolved relative to the package location")
    )]
    MissingResources { paths: Vec<String> },

    #[error(
        "{} violation(s) found in {} resource(s)",
        .0.violation_count(),
        .0.invalid_resources().count()
    )]
    #[diagnostic(code(bdp::invalid_resources))]
    InvalidResources(PackageReport),

    #[error("Invalid locator '{locator}': {reason}")]
    #[diagnostic(code(bdp::invalid_locator))]
    InvalidLocator { locator: String, reason: String },

    #[error("Unsupported scheme '{scheme}' in {location}")]
    #[diagnostic(
        code(bdp::unsupported_scheme),
        help("only local paths and file:// URLs can be validated")
    )]
    UnsupportedScheme { location: String, scheme: String },
}

impl PackageError {
    /// Field names reported missing by a field requirement failure
    pub fn missing_fields(&self) -> Vec<&str> {
        match self {
            PackageError::FieldRequirementViolation { rule, .. } => rule.missing_fields(),
            _ => Vec::new(),
        }
    }
}

/// Failure of a field-presence rule
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Field missing: {0}")]
    Missing(String),

    #[error("None satisfied: [{}]", join(.0, "; "))]
    NoneSatisfied(Vec<RuleError>),
}

impl RuleError {
    pub fn missing_fields(&self) -> Vec<&str> {
        match self {
            RuleError::Missing(name) => vec![name.as_str()],
            RuleError::NoneSatisfied(errors) => {
                errors.iter().flat_map(RuleError::missing_fields).collect()
            }
        }
    }
}

/// Failure of a single cell check
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("Invalid COFOG value: {0}")]
    InvalidCofog(String),

    #[error("Invalid GFSM expense value: {0}")]
    InvalidGfsmExpense(String),

    #[error("Invalid GFSM revenue value: {0}")]
    InvalidGfsmRevenue(String),

    #[error("Invalid value '{value}', expected one of: {}", .allowed.join(", "))]
    InvalidEnum {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("Invalid date '{value}' for format '{format}'")]
    InvalidDate { value: String, format: String },

    #[error("Invalid datetime '{value}' for format '{format}'")]
    InvalidDateTime { value: String, format: String },

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Invalid integer: {0}")]
    InvalidInteger(String),

    #[error("Invalid base64 data: {0}")]
    InvalidBinary(String),

    #[error("Invalid JSON '{value}': {reason}")]
    InvalidJson { value: String, reason: String },
}

fn join<T: fmt::Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}
