pub mod package;
pub mod value;

// Re-export commonly used types
pub use package::{Category, Descriptor, Field, Resource, TableSchema};
pub use value::ParsedValue;
