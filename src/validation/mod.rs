pub mod combinators;
pub mod csv;
pub mod datetime;
mod error;
pub mod fields;
pub mod metadata;
mod report;
mod schemas;
mod validator;


pub use error::{PackageError, RuleError, SchemaIssue, ValueError};
pub use metadata::{MetadataValidator, validate_metadata};
pub use report::{PackageReport, ResourceReport, Violation};
pub use schemas::{get_package_schema, package_schema_source};
pub use validator::{ResourcePlan, Validator};

/// Validate the package at `locator` with the embedded schema
pub fn validate(locator: &str, deep: bool) -> Result<PackageReport, PackageError> {
    Validator::new()?.deep(deep).validate(locator)
}
