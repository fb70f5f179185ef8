use crate::core::{Result, RouteError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical location of a table shard: `(data_source, table)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataNode {
    pub data_source_name: String,
    pub table_name: String,
}

impl DataNode {
    pub fn new(data_source_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            data_source_name: data_source_name.into(),
            table_name: table_name.into(),
        }
    }

    /// Parses the `<data_source>.<table>` notation used in configuration files.
    ///
    /// Only the first `.` separates the two parts, so the table half may not
    /// contain another one.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let (data_source, table) = trimmed
            .split_once('.')
            .ok_or_else(|| RouteError::InvalidDataNode(text.to_string()))?;
        let data_source = data_source.trim();
        let table = table.trim();
        if data_source.is_empty() || table.is_empty() || table.contains('.') {
            return Err(RouteError::InvalidDataNode(text.to_string()));
        }
        Ok(Self::new(data_source, table))
    }
}

impl FromStr for DataNode {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DataNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.data_source_name, self.table_name)
    }
}
