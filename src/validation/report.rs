use thiserror::Error;

use super::error::ValueError;
use crate::models::Category;

/// A problem found in a CSV resource
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Violation {
    #[error(
        "row 1: header mismatch: expected [{}], found [{}]",
        .expected.join(", "),
        .actual.join(", ")
    )]
    HeaderMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("row {row}, column {column} ({field}): {error}")]
    Value {
        row: usize,
        column: usize,
        field: String,
        value: String,
        error: ValueError,
    },

    #[error("row {row}: unreadable record: {message}")]
    Unreadable { row: usize, message: String },
}

impl Violation {
    pub fn code(&self) -> &'static str {
        match self {
            Violation::HeaderMismatch { .. } => "HEADER_CHECK_FAILED",
            Violation::Value { .. } => "VALUE_CHECK_FAILED",
            Violation::Unreadable { .. } => "RECORD_UNREADABLE",
        }
    }

    /// 1-based row number, counting the header as row 1
    pub fn row(&self) -> usize {
        match self {
            Violation::HeaderMismatch { .. } => 1,
            Violation::Value { row, .. } | Violation::Unreadable { row, .. } => *row,
        }
    }
}

/// Outcome of validating one resource's CSV stream
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceReport {
    pub path: String,
    pub category: Category,
    /// Data rows read, excluding the header
    pub rows_checked: usize,
    pub violations: Vec<Violation>,
    /// Set when value violations stopped being recorded at the limit
    pub truncated: bool,
}

impl ResourceReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Outcome of validating every resource of a package
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageReport {
    pub resources: Vec<ResourceReport>,
}

impl PackageReport {
    pub fn is_valid(&self) -> bool {
        self.resources.iter().all(ResourceReport::is_valid)
    }

    pub fn violation_count(&self) -> usize {
        self.resources.iter().map(|r| r.violations.len()).sum()
    }

    pub fn invalid_resources(&self) -> impl Iterator<Item = &ResourceReport> {
        self.resources.iter().filter(|r| !r.is_valid())
    }
}
