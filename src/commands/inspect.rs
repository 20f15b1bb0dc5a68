use anyhow::Result;
use bdp_validate::validation::Validator;
use colored::Colorize;

use super::report_error;

pub fn inspect_command(locator: &str) -> Result<()> {
    let validator = Validator::new()?;
    let plans = match validator.inspect(locator) {
        Ok(plans) => plans,
        Err(err) => {
            report_error(err);
            anyhow::bail!("Could not inspect package: {locator}");
        }
    };

    for plan in plans {
        println!("{} ({})", plan.path.bold(), plan.category.key().cyan());
        for (name, field_validator) in &plan.fields {
            println!("  {name}: {}", field_validator.to_string().dimmed());
        }
    }
    Ok(())
}
