use serde_json::Value;
use std::io::{BufReader, ErrorKind};
use tracing::{debug, info, warn};

use super::csv::resource_to_csv_validator;
use super::error::PackageError;
use super::fields::{FieldValidator, field_validator};
use super::metadata::{MetadataValidator, resource_category};
use super::report::PackageReport;
use crate::loader::PackageLocation;
use crate::models::{Category, Descriptor};

/// Validates a whole budget data package: descriptor first, then every
/// resource's CSV data.
pub struct Validator {
    metadata: MetadataValidator,
    deep: bool,
    limit: Option<usize>,
}

/// A resource as the validator sees it, for inspection
#[derive(Debug, Clone)]
pub struct ResourcePlan {
    pub path: String,
    pub category: Category,
    pub fields: Vec<(String, FieldValidator)>,
}

impl Validator {
    /// Validator using the embedded schema, checking every value
    pub fn new() -> Result<Self, PackageError> {
        Ok(Self {
            metadata: MetadataValidator::new()?,
            deep: true,
            limit: None,
        })
    }

    pub fn with_schema(schema: Value) -> Result<Self, PackageError> {
        Ok(Self {
            metadata: MetadataValidator::with_schema(&schema)?,
            deep: true,
            limit: None,
        })
    }

    /// Check values as well as headers
    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    /// Cap the number of row-level violations recorded per resource
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Validate the package at `locator`.
    ///
    /// Descriptor problems abort immediately. Resources that cannot be found
    /// are collected and reported together as [`PackageError::MissingResources`];
    /// header and value problems are collected into the report carried by
    /// [`PackageError::InvalidResources`].
    pub fn validate(&self, locator: &str) -> Result<PackageReport, PackageError> {
        let location = PackageLocation::resolve(locator)?;
        let descriptor = self.load_descriptor(&location)?;

        let mut report = PackageReport::default();
        let mut missing = Vec::new();

        for resource in &descriptor.resources {
            let csv_validator =
                resource_to_csv_validator(resource, self.deep)?.with_limit(self.limit);
            let resource_location = location.resource(&resource.path)?;
            debug!("Opening {resource_location}");

            let file = match resource_location.open()? {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    warn!("Resource not found: {resource_location}");
                    missing.push(resource.path.clone());
                    continue;
                }
                Err(source) => {
                    return Err(PackageError::ResourceUnreadable {
                        location: resource_location.to_string(),
                        source,
                    });
                }
            };

            // The file handle is released at the end of each iteration
            report
                .resources
                .push(csv_validator.validate(BufReader::new(file))?);
        }

        if !missing.is_empty() {
            return Err(PackageError::MissingResources { paths: missing });
        }
        if !report.is_valid() {
            return Err(PackageError::InvalidResources(report));
        }

        info!(
            "✓ Package valid ({} resources checked)",
            report.resources.len()
        );
        Ok(report)
    }

    /// Validate the descriptor at `locator` and describe how each resource
    /// would be checked
    pub fn inspect(&self, locator: &str) -> Result<Vec<ResourcePlan>, PackageError> {
        let location = PackageLocation::resolve(locator)?;
        let descriptor = self.load_descriptor(&location)?;

        descriptor
            .resources
            .iter()
            .map(|resource| {
                let category = resource_category(resource)?;
                let fields = resource
                    .schema
                    .fields
                    .iter()
                    .map(|field| Ok((field.name.clone(), field_validator(field)?)))
                    .collect::<Result<Vec<_>, PackageError>>()?;
                Ok(ResourcePlan {
                    path: resource.path.clone(),
                    category,
                    fields,
                })
            })
            .collect()
    }

    fn load_descriptor(&self, location: &PackageLocation) -> Result<Descriptor, PackageError> {
        let raw = location.read_descriptor()?;
        debug!("Fetched descriptor from {}", location.descriptor());
        self.metadata
            .validate_descriptor(&raw, &location.descriptor().to_string())
    }
}
