use serde::{Deserialize, Serialize};
use std::fmt;

/// The parts of a package descriptor (`datapackage.json`) that validation
/// reads. Other keys are left to the JSON Schema and ignored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptor {
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub path: String,

    pub granularity: String,

    #[serde(rename = "type")]
    pub kind: String,

    pub schema: TableSchema,
}

impl Resource {
    /// Field names in declared order
    pub fn field_names(&self) -> Vec<String> {
        self.schema.fields.iter().map(|f| f.name.clone()).collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            format: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Resource category, selecting which field-presence rule applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    AggregatedExpenditure,
    TransactionalExpenditure,
    AggregatedRevenue,
    TransactionalRevenue,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::AggregatedExpenditure,
        Category::TransactionalExpenditure,
        Category::AggregatedRevenue,
        Category::TransactionalRevenue,
    ];

    /// Look up the category for a `granularity`/`type` pair.
    /// Returns `None` for combinations outside the known four.
    pub fn from_parts(granularity: &str, kind: &str) -> Option<Self> {
        match (granularity, kind) {
            ("aggregated", "expenditure") => Some(Category::AggregatedExpenditure),
            ("transactional", "expenditure") => Some(Category::TransactionalExpenditure),
            ("aggregated", "revenue") => Some(Category::AggregatedRevenue),
            ("transactional", "revenue") => Some(Category::TransactionalRevenue),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Category::AggregatedExpenditure => "aggregated-expenditure",
            Category::TransactionalExpenditure => "transactional-expenditure",
            Category::AggregatedRevenue => "aggregated-revenue",
            Category::TransactionalRevenue => "transactional-revenue",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
