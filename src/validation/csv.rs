use std::io::Read;
use tracing::{debug, info, warn};

use super::error::PackageError;
use super::fields::{FieldValidator, field_validator};
use super::metadata::resource_category;
use super::report::{ResourceReport, Violation};
use crate::models::{Category, Resource};

/// Row validator bound to one resource's declared fields.
///
/// The header row must equal the field names in declared order. In deep
/// mode every cell of every data row is also checked with its column's
/// [`FieldValidator`]; problems are collected and validation carries on.
/// In shallow mode only the header is read.
#[derive(Debug, Clone)]
pub struct ResourceValidator {
    path: String,
    category: Category,
    field_names: Vec<String>,
    deep: bool,
    // Empty in shallow mode
    value_checks: Vec<FieldValidator>,
    limit: Option<usize>,
}

impl ResourceValidator {
    pub fn new(resource: &Resource, deep: bool) -> Result<Self, PackageError> {
        let category = resource_category(resource)?;
        let value_checks = if deep {
            resource
                .schema
                .fields
                .iter()
                .map(field_validator)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };

        Ok(Self {
            path: resource.path.clone(),
            category,
            field_names: resource.field_names(),
            deep,
            value_checks,
            limit: None,
        })
    }

    /// Stop recording row-level violations after `limit` of them
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Validate a CSV stream. Only I/O failures of the stream itself are
    /// returned as errors; everything else ends up in the report.
    pub fn validate<R: Read>(&self, stream: R) -> Result<ResourceReport, PackageError> {
        debug!(
            "Validating {} ({} fields, {})",
            self.path,
            self.field_names.len(),
            if self.deep { "all values" } else { "header only" }
        );

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(stream);
        let mut records = reader.records();

        let mut report = ResourceReport {
            path: self.path.clone(),
            category: self.category,
            rows_checked: 0,
            violations: Vec::new(),
            truncated: false,
        };

        let header: Vec<String> = match records.next() {
            None => Vec::new(),
            Some(Ok(record)) => record.iter().map(String::from).collect(),
            Some(Err(e)) => {
                let message = self.unreadable_message(e)?;
                report
                    .violations
                    .push(Violation::Unreadable { row: 1, message });
                Vec::new()
            }
        };
        if header != self.field_names {
            report.violations.push(Violation::HeaderMismatch {
                expected: self.field_names.clone(),
                actual: header,
            });
        }

        if self.deep {
            let mut recorded = 0usize;
            for (idx, result) in records.enumerate() {
                let row = idx + 2;
                report.rows_checked += 1;

                let mut found = Vec::new();
                match result {
                    Ok(record) => {
                        for (column, (check, value)) in
                            self.value_checks.iter().zip(record.iter()).enumerate()
                        {
                            if let Err(error) = check.check(value) {
                                found.push(Violation::Value {
                                    row,
                                    column: column + 1,
                                    field: self.field_names[column].clone(),
                                    value: value.to_string(),
                                    error,
                                });
                            }
                        }
                    }
                    Err(e) => {
                        let message = self.unreadable_message(e)?;
                        found.push(Violation::Unreadable { row, message });
                    }
                }

                for violation in found {
                    if self.limit.is_some_and(|limit| recorded >= limit) {
                        report.truncated = true;
                    } else {
                        report.violations.push(violation);
                        recorded += 1;
                    }
                }
            }
        }

        if report.is_valid() {
            info!("✓ {}: {} rows checked", self.path, report.rows_checked);
        } else {
            warn!(
                "{}: {} violation(s) in {} rows",
                self.path,
                report.violations.len(),
                report.rows_checked
            );
        }
        Ok(report)
    }

    // I/O errors are fatal; decoding errors become row violations
    fn unreadable_message(&self, error: csv::Error) -> Result<String, PackageError> {
        let message = error.to_string();
        match error.into_kind() {
            csv::ErrorKind::Io(source) => Err(PackageError::ResourceUnreadable {
                location: self.path.clone(),
                source,
            }),
            _ => Ok(message),
        }
    }
}

/// Build the CSV validator for a resource
pub fn resource_to_csv_validator(
    resource: &Resource,
    deep: bool,
) -> Result<ResourceValidator, PackageError> {
    ResourceValidator::new(resource, deep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, TableSchema};
    use crate::validation::error::ValueError;

    fn resource(fields: Vec<Field>) -> Resource {
        Resource {
            path: "budget.csv".to_string(),
            granularity: "aggregated".to_string(),
            kind: "expenditure".to_string(),
            schema: TableSchema { fields },
        }
    }

    fn budget_fields() -> Vec<Field> {
        vec![
            Field::new("id", "string"),
            Field::new("amount", "number"),
            Field::new("admin", "string"),
            Field::new("cofog", "string"),
        ]
    }

    #[test]
    fn test_valid_csv_has_no_violations() {
        let data = "id,amount,admin,cofog\n1,100.5,Health,7.1\n2,20,Education,9\n";
        let validator = resource_to_csv_validator(&resource(budget_fields()), true).unwrap();
        let report = validator.validate(data.as_bytes()).unwrap();
        assert!(report.is_valid(), "{:?}", report.violations);
        assert_eq!(report.rows_checked, 2);
        assert_eq!(report.category, Category::AggregatedExpenditure);
    }

    #[test]
    fn test_header_order_mismatch() {
        let fields = vec![Field::new("id", "string"), Field::new("amount", "number")];
        let validator = resource_to_csv_validator(&resource(fields), false).unwrap();
        let report = validator.validate("amount,id\n".as_bytes()).unwrap();
        assert_eq!(
            report.violations,
            vec![Violation::HeaderMismatch {
                expected: vec!["id".to_string(), "amount".to_string()],
                actual: vec!["amount".to_string(), "id".to_string()],
            }]
        );
    }

    #[test]
    fn test_empty_stream_is_header_mismatch() {
        let validator = resource_to_csv_validator(&resource(budget_fields()), true).unwrap();
        let report = validator.validate("".as_bytes()).unwrap();
        assert!(matches!(
            report.violations.as_slice(),
            [Violation::HeaderMismatch { actual, .. }] if actual.is_empty()
        ));
    }

    #[test]
    fn test_deep_reports_each_bad_cell_and_continues() {
        let data = "id,amount,admin,cofog\n1,abc,Health,7.1\n2,20,Education,11\n3,5,Defence,2\n";
        let validator = resource_to_csv_validator(&resource(budget_fields()), true).unwrap();
        let report = validator.validate(data.as_bytes()).unwrap();

        assert_eq!(report.rows_checked, 3);
        assert_eq!(
            report.violations,
            vec![
                Violation::Value {
                    row: 2,
                    column: 2,
                    field: "amount".to_string(),
                    value: "abc".to_string(),
                    error: ValueError::InvalidNumber("abc".to_string()),
                },
                Violation::Value {
                    row: 3,
                    column: 4,
                    field: "cofog".to_string(),
                    value: "11".to_string(),
                    error: ValueError::InvalidCofog("11".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_shallow_skips_value_checks() {
        let data = "id,amount,admin,cofog\n1,abc,Health,7.1\n";
        let validator = resource_to_csv_validator(&resource(budget_fields()), false).unwrap();
        let report = validator.validate(data.as_bytes()).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.rows_checked, 0);
    }

    #[test]
    fn test_shallow_does_not_resolve_field_types() {
        let fields = vec![Field::new("id", "string"), Field::new("amount", "money")];
        assert!(resource_to_csv_validator(&resource(fields.clone()), false).is_ok());
        assert!(matches!(
            resource_to_csv_validator(&resource(fields), true),
            Err(PackageError::UnknownFieldType { .. })
        ));
    }

    #[test]
    fn test_short_rows_only_check_present_cells() {
        let data = "id,amount,admin,cofog\n1,10\n2,20,Health,7,extra\n";
        let validator = resource_to_csv_validator(&resource(budget_fields()), true).unwrap();
        let report = validator.validate(data.as_bytes()).unwrap();
        assert!(report.is_valid(), "{:?}", report.violations);
    }

    #[test]
    fn test_invalid_utf8_row_is_recorded() {
        let mut data = b"id,amount,admin,cofog\n".to_vec();
        data.extend_from_slice(b"1,10,\xff\xfe,7\n2,x,Health,7\n");
        let validator = resource_to_csv_validator(&resource(budget_fields()), true).unwrap();
        let report = validator.validate(data.as_slice()).unwrap();

        assert_eq!(report.violations.len(), 2);
        assert_eq!(report.violations[0].code(), "RECORD_UNREADABLE");
        assert_eq!(report.violations[0].row(), 2);
        assert_eq!(report.violations[1].row(), 3);
    }

    #[test]
    fn test_limit_truncates_recorded_violations() {
        let data = "id,amount,admin,cofog\n1,a,x,1\n2,b,x,1\n3,c,x,1\n";
        let validator = resource_to_csv_validator(&resource(budget_fields()), true)
            .unwrap()
            .with_limit(Some(2));
        let report = validator.validate(data.as_bytes()).unwrap();
        assert_eq!(report.violations.len(), 2);
        assert!(report.truncated);
        assert_eq!(report.rows_checked, 3);
    }
}
