use super::ShardingRule;
use crate::core::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Declarative sharding configuration.
///
/// Built in code with the builder methods or loaded from JSON:
///
/// ```
/// use shardroute::ShardingRuleConfiguration;
///
/// # fn main() -> shardroute::Result<()> {
/// let config = ShardingRuleConfiguration::from_json_str(r#"{
///     "data_sources": ["ds_0", "ds_1"],
///     "tables": [
///         { "logical_table": "t_order", "actual_data_nodes": ["ds_0.t_order_0", "ds_1.t_order_1"] }
///     ],
///     "broadcast_tables": ["t_config"]
/// }"#)?;
/// let rule = config.build()?;
/// assert_eq!(rule.sharded_tables(), vec!["t_order"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShardingRuleConfiguration {
    /// Names of every physical data source
    pub data_sources: Vec<String>,

    /// Sharded tables
    #[serde(default)]
    pub tables: Vec<TableRuleConfiguration>,

    /// Tables replicated under the same name to every data source
    #[serde(default)]
    pub broadcast_tables: Vec<String>,

    /// Data source holding tables that are neither sharded nor broadcast
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_data_source: Option<String>,
}

/// Placement of one sharded table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableRuleConfiguration {
    pub logical_table: String,

    /// `<data_source>.<table>` entries in routing order. Empty means one
    /// same-named table on every data source.
    #[serde(default)]
    pub actual_data_nodes: Vec<String>,
}

impl TableRuleConfiguration {
    pub fn new<I, S>(logical_table: &str, actual_data_nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            logical_table: logical_table.to_string(),
            actual_data_nodes: actual_data_nodes.into_iter().map(Into::into).collect(),
        }
    }
}

impl ShardingRuleConfiguration {
    /// Create a configuration over the given data sources
    pub fn new<I, S>(data_sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            data_sources: data_sources.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Add a sharded table
    pub fn table(mut self, table: TableRuleConfiguration) -> Self {
        self.tables.push(table);
        self
    }

    /// Add a broadcast table
    pub fn broadcast_table(mut self, logical_table: &str) -> Self {
        self.broadcast_tables.push(logical_table.to_string());
        self
    }

    /// Set the default data source
    pub fn default_data_source(mut self, data_source: &str) -> Self {
        self.default_data_source = Some(data_source.to_string());
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate and freeze into a [`ShardingRule`]
    pub fn build(&self) -> Result<ShardingRule> {
        ShardingRule::new(self)
    }
}
