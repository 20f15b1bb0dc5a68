use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::combinators::{Rule, all, any, require_field};
use super::error::{PackageError, SchemaIssue};
use super::schemas::{SchemaRetriever, get_package_schema};
use crate::models::{Category, Descriptor, Field, Resource};

// Field requirements for all data types
fn general_fields() -> Rule<[Field]> {
    all(vec![require_field("amount"), require_field("id")])
}

// Transactional revenue data shares the aggregated revenue requirements
fn revenue_fields() -> Rule<[Field]> {
    all(vec![
        general_fields(),
        any(vec![require_field("economicID"), require_field("gfsmRevenue")]),
    ])
}

static AGGREGATED_EXPENDITURE: Lazy<Rule<[Field]>> = Lazy::new(|| {
    all(vec![
        general_fields(),
        require_field("admin"),
        any(vec![require_field("functionalID"), require_field("cofog")]),
    ])
});

static TRANSACTIONAL_EXPENDITURE: Lazy<Rule<[Field]>> = Lazy::new(|| {
    all(vec![
        general_fields(),
        require_field("admin"),
        require_field("date"),
        require_field("supplier"),
    ])
});

static REVENUE: Lazy<Rule<[Field]>> = Lazy::new(revenue_fields);

/// The field-presence rule for a resource category
pub fn category_rule(category: Category) -> &'static Rule<[Field]> {
    match category {
        Category::AggregatedExpenditure => &*AGGREGATED_EXPENDITURE,
        Category::TransactionalExpenditure => &*TRANSACTIONAL_EXPENDITURE,
        Category::AggregatedRevenue | Category::TransactionalRevenue => &*REVENUE,
    }
}

/// Resolve a resource's category, failing on unknown combinations
pub fn resource_category(resource: &Resource) -> Result<Category, PackageError> {
    Category::from_parts(&resource.granularity, &resource.kind).ok_or_else(|| {
        PackageError::UnknownCategory {
            resource: resource.path.clone(),
            granularity: resource.granularity.clone(),
            kind: resource.kind.clone(),
        }
    })
}

/// Apply the category's field-presence rule to a resource
pub fn validate_resource(resource: &Resource) -> Result<&Resource, PackageError> {
    let category = resource_category(resource)?;
    debug!("Resource {} is {category}", resource.path);

    category_rule(category)(&resource.schema.fields[..]).map_err(|rule| {
        PackageError::FieldRequirementViolation {
            resource: resource.path.clone(),
            category,
            rule,
        }
    })?;

    Ok(resource)
}

/// Structural and field-presence validation of package descriptors
pub struct MetadataValidator {
    schema: jsonschema::Validator,
}

impl MetadataValidator {
    /// Compile the embedded budget data package schema
    pub fn new() -> Result<Self, PackageError> {
        let schema =
            get_package_schema().map_err(|e| PackageError::InvalidSchema(e.to_string()))?;
        Self::with_schema(&schema)
    }

    /// Compile a caller-supplied schema; embedded schema URIs stay resolvable
    pub fn with_schema(schema: &Value) -> Result<Self, PackageError> {
        let schema = jsonschema::options()
            .with_retriever(SchemaRetriever)
            .build(schema)
            .map_err(|e| PackageError::InvalidSchema(e.to_string()))?;
        Ok(Self { schema })
    }

    /// Validate a descriptor, handing it back unchanged on success.
    ///
    /// The JSON Schema check runs first; only a structurally valid descriptor
    /// has its resources checked against their category rules. Both stages
    /// stop at the first failing resource.
    pub fn validate<'a>(&self, descriptor: &'a Value) -> Result<&'a Value, PackageError> {
        self.validate_descriptor(descriptor, "descriptor")?;
        Ok(descriptor)
    }

    /// Validate a descriptor and return its typed form. `location` names
    /// where it was read from, for error messages.
    pub fn validate_descriptor(
        &self,
        descriptor: &Value,
        location: &str,
    ) -> Result<Descriptor, PackageError> {
        debug!("Checking descriptor against JSON schema");
        let issues: Vec<SchemaIssue> = self
            .schema
            .iter_errors(descriptor)
            .map(|error| SchemaIssue {
                instance_path: error.instance_path.to_string(),
                message: error.to_string(),
            })
            .collect();
        if !issues.is_empty() {
            return Err(PackageError::SchemaViolation { issues });
        }

        let typed = Descriptor::deserialize(descriptor).map_err(|source| {
            PackageError::MalformedDescriptor {
                location: location.to_string(),
                source,
            }
        })?;

        for resource in &typed.resources {
            validate_resource(resource)?;
        }

        info!(
            "✓ Descriptor validation passed ({} resources)",
            typed.resources.len()
        );
        Ok(typed)
    }
}

/// Validate `descriptor` against `schema`, then every resource against its
/// category's field requirements. Returns the descriptor unchanged.
pub fn validate_metadata<'a>(
    descriptor: &'a Value,
    schema: &Value,
) -> Result<&'a Value, PackageError> {
    MetadataValidator::with_schema(schema)?.validate(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(granularity: &str, kind: &str, fields: &[&str]) -> Value {
        let fields: Vec<Value> = fields
            .iter()
            .map(|name| json!({"name": name, "type": "string"}))
            .collect();
        json!({
            "resources": [{
                "path": "data.csv",
                "granularity": granularity,
                "type": kind,
                "schema": {"fields": fields}
            }]
        })
    }

    fn embedded() -> Value {
        get_package_schema().unwrap()
    }

    #[test]
    fn test_valid_descriptor_is_returned_unchanged() {
        let d = descriptor("aggregated", "expenditure", &["amount", "id", "admin", "cofog"]);
        let result = validate_metadata(&d, &embedded()).unwrap();
        assert!(std::ptr::eq(result, &d));
        assert_eq!(result, &d);
    }

    #[test]
    fn test_every_category_accepts_its_minimal_fields() {
        let cases = [
            ("aggregated", "expenditure", vec!["amount", "id", "admin", "functionalID"]),
            (
                "transactional",
                "expenditure",
                vec!["amount", "id", "admin", "date", "supplier"],
            ),
            ("aggregated", "revenue", vec!["amount", "id", "economicID"]),
            ("transactional", "revenue", vec!["amount", "id", "gfsmRevenue"]),
        ];
        let validator = MetadataValidator::new().unwrap();
        for (granularity, kind, fields) in cases {
            let d = descriptor(granularity, kind, &fields);
            assert!(
                validator.validate(&d).is_ok(),
                "{granularity}-{kind} should accept {fields:?}"
            );
        }
    }

    #[test]
    fn test_unread_keys_are_not_type_checked() {
        let d = json!({
            "version": 1,
            "resources": [{
                "path": "revenue.csv",
                "granularity": "aggregated",
                "type": "revenue",
                "fiscalYear": 2014,
                "status": {"stage": "approved"},
                "schema": {"fields": [
                    {"name": "amount", "type": "number"},
                    {"name": "id", "type": "string"},
                    {"name": "economicID", "type": "string"}
                ]}
            }]
        });
        let result = validate_metadata(&d, &json!({"type": "object"})).unwrap();
        assert_eq!(result, &d);
    }

    #[test]
    fn test_shape_failure_names_location() {
        let d = json!({"resources": [{"path": "a.csv", "granularity": "aggregated"}]});
        let validator = MetadataValidator::with_schema(&json!({"type": "object"})).unwrap();
        let err = validator.validate_descriptor(&d, "pkg/budget.json").unwrap_err();
        assert!(matches!(
            err,
            PackageError::MalformedDescriptor { ref location, .. } if location == "pkg/budget.json"
        ));
    }

    #[test]
    fn test_missing_admin_is_named() {
        let d = descriptor("aggregated", "expenditure", &["amount", "id", "cofog"]);
        let err = validate_metadata(&d, &embedded()).unwrap_err();
        assert!(matches!(err, PackageError::FieldRequirementViolation { .. }));
        assert_eq!(err.missing_fields(), vec!["admin"]);
    }

    #[test]
    fn test_general_fields_checked_first() {
        let d = descriptor("transactional", "expenditure", &["id", "admin"]);
        let err = validate_metadata(&d, &embedded()).unwrap_err();
        assert_eq!(err.missing_fields(), vec!["amount"]);
    }

    #[test]
    fn test_missing_alternatives_reports_both() {
        let d = descriptor("transactional", "revenue", &["amount", "id"]);
        let err = validate_metadata(&d, &embedded()).unwrap_err();
        assert_eq!(err.missing_fields(), vec!["economicID", "gfsmRevenue"]);
        assert!(err.to_string().contains("None satisfied"));
    }

    #[test]
    fn test_schema_violation_reported_before_field_rules() {
        let d = json!({"resources": [{"path": "data.csv", "granularity": "aggregated"}]});
        let err = validate_metadata(&d, &embedded()).unwrap_err();
        match err {
            PackageError::SchemaViolation { issues } => {
                assert!(!issues.is_empty());
                assert!(issues.iter().all(|i| i.instance_path == "/resources/0"));
            }
            other => panic!("expected schema violation, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_category_with_permissive_schema() {
        let d = descriptor("monthly", "expenditure", &["amount", "id"]);
        let err = validate_metadata(&d, &json!({"type": "object"})).unwrap_err();
        assert!(matches!(
            err,
            PackageError::UnknownCategory { ref granularity, .. } if granularity == "monthly"
        ));
    }

    #[test]
    fn test_schema_rejects_unknown_granularity() {
        let d = descriptor("monthly", "expenditure", &["amount", "id"]);
        let err = validate_metadata(&d, &embedded()).unwrap_err();
        assert!(matches!(err, PackageError::SchemaViolation { .. }));
    }

    #[test]
    fn test_invalid_schema_is_a_configuration_error() {
        let d = descriptor("aggregated", "revenue", &["amount", "id", "economicID"]);
        let err = validate_metadata(&d, &json!({"type": 12})).unwrap_err();
        assert!(matches!(err, PackageError::InvalidSchema(_)));
    }

    #[test]
    fn test_first_failing_resource_stops_validation() {
        let d = json!({
            "resources": [
                {
                    "path": "first.csv",
                    "granularity": "aggregated",
                    "type": "revenue",
                    "schema": {"fields": [{"name": "amount", "type": "number"}]}
                },
                {
                    "path": "second.csv",
                    "granularity": "aggregated",
                    "type": "revenue",
                    "schema": {"fields": []}
                }
            ]
        });
        let err = validate_metadata(&d, &embedded()).unwrap_err();
        match err {
            PackageError::FieldRequirementViolation { resource, rule, .. } => {
                assert_eq!(resource, "first.csv");
                assert_eq!(rule.missing_fields(), vec!["id"]);
            }
            other => panic!("expected field requirement violation, got {other:?}"),
        }
    }
}
