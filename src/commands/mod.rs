mod inspect;
mod schema;
mod validate;

pub use inspect::inspect_command;
pub use schema::schema_command;
pub use validate::{ValidateOptions, validate_command};

use bdp_validate::validation::PackageError;

// Render a library error with its diagnostic code and help text
fn report_error(err: PackageError) {
    eprintln!();
    eprintln!("{:?}", miette::Report::new(err));
}
