use anyhow::{Context, Result};
use bdp_validate::validation::{PackageError, PackageReport, ResourceReport, Validator};
use colored::Colorize;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

use super::report_error;

pub struct ValidateOptions {
    pub shallow: bool,
    pub schema: Option<PathBuf>,
    pub limit: Option<usize>,
}

pub fn validate_command(locator: &str, options: ValidateOptions) -> Result<()> {
    println!("Validating budget data package: {locator}");

    let validator = match &options.schema {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read schema {}", path.display()))?;
            let schema: Value = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse schema {}", path.display()))?;
            Validator::with_schema(schema)?
        }
        None => Validator::new()?,
    };
    let validator = validator.deep(!options.shallow).limit(options.limit);

    match validator.validate(locator) {
        Ok(report) => {
            print_report(&report);
            println!("\n✅ Package is valid!");
            Ok(())
        }
        Err(PackageError::InvalidResources(report)) => {
            print_report(&report);
            anyhow::bail!(
                "{} violation(s) found in {} resource(s)",
                report.violation_count(),
                report.invalid_resources().count()
            );
        }
        Err(err) => {
            report_error(err);
            anyhow::bail!("Package validation failed");
        }
    }
}

fn print_report(report: &PackageReport) {
    for resource in &report.resources {
        print_resource(resource);
    }
}

fn print_resource(resource: &ResourceReport) {
    let status = if resource.is_valid() {
        "OK".green().bold()
    } else {
        "FAIL".red().bold()
    };
    println!(
        "{status} {} ({}, {} rows)",
        resource.path,
        resource.category.key(),
        resource.rows_checked
    );
    for violation in &resource.violations {
        println!("    {} {violation}", format!("[{}]", violation.code()).yellow());
    }
    if resource.truncated {
        println!("    {}", "further violations not shown".dimmed());
    }
}
