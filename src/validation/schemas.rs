use jsonschema::{Retrieve, Uri};
use serde_json::Value;
use std::str::FromStr;

// Embed schemas at compile time
const PACKAGE_SCHEMA: &str = include_str!("../../schemas/budget-data-package.json");
const DEFINITIONS_SCHEMA: &str = include_str!("../../schemas/definitions.json");

const SCHEMA_BASE: &str = "https://schemas.openspending.org/bdp/v1/";

// Custom retriever for embedded schemas
pub struct SchemaRetriever;

impl Retrieve for SchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<String>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        match uri.as_str() {
            "./budget-data-package.json" => Ok(serde_json::from_str(PACKAGE_SCHEMA)?),
            "./definitions.json" => Ok(serde_json::from_str(DEFINITIONS_SCHEMA)?),
            uri_str if uri_str.starts_with(SCHEMA_BASE) && !uri_str.contains('#') => {
                match &uri_str[SCHEMA_BASE.len()..] {
                    "budget-data-package.json" => Ok(serde_json::from_str(PACKAGE_SCHEMA)?),
                    "definitions.json" => Ok(serde_json::from_str(DEFINITIONS_SCHEMA)?),
                    other => Err(format!("Unknown embedded schema: {other}").into()),
                }
            }
            // Handle fragment references by stripping the fragment part
            uri_str if uri_str.contains('#') => {
                let base_uri = uri_str.split('#').next().unwrap_or("");
                self.retrieve(
                    &Uri::from_str(base_uri).map_err(|e| format!("Failed to parse URI: {e}"))?,
                )
            }
            _ => Err(format!("Unknown schema URI: {uri}").into()),
        }
    }
}

/// The budget data package descriptor schema
pub fn get_package_schema() -> Result<Value, serde_json::Error> {
    serde_json::from_str(PACKAGE_SCHEMA)
}

/// Raw source of the embedded descriptor schema
pub fn package_schema_source() -> &'static str {
    PACKAGE_SCHEMA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_schemas_parse() {
        let schema = get_package_schema().unwrap();
        assert_eq!(schema["title"], "Budget Data Package");
        let definitions: Value = serde_json::from_str(DEFINITIONS_SCHEMA).unwrap();
        assert!(definitions["definitions"]["resource"].is_object());
    }

    #[test]
    fn test_retriever_resolves_definitions() {
        let uri = Uri::from_str("https://schemas.openspending.org/bdp/v1/definitions.json").unwrap();
        let value = SchemaRetriever.retrieve(&uri).unwrap();
        assert!(value["definitions"]["field"].is_object());
    }

    #[test]
    fn test_retriever_rejects_unknown_uri() {
        let uri = Uri::from_str("https://example.com/other.json").unwrap();
        assert!(SchemaRetriever.retrieve(&uri).is_err());
    }
}
