use anyhow::Result;
use bdp_validate::validation::package_schema_source;

pub fn schema_command() -> Result<()> {
    print!("{}", package_schema_source());
    Ok(())
}
