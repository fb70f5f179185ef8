use super::{
    DataNode, DataSourceSelector, RandomSelector, ShardingRuleConfiguration, TableRule,
};
use crate::core::{Result, RouteError};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

/// Read-only view of the sharding configuration used by routing engines.
///
/// Logical table lookups are case-insensitive.
pub trait ShardingRuleLookup: Send + Sync {
    /// Whether the table is replicated, under its own name, to every data source.
    fn is_broadcast_table(&self, logical_table: &str) -> bool;

    /// Table rule of a sharded table; `None` for broadcast and unconfigured tables.
    fn find_table_rule(&self, logical_table: &str) -> Option<&TableRule>;

    /// Every data source known to the configuration.
    fn all_data_source_names(&self) -> &BTreeSet<String>;

    /// Chooses one data source out of `candidates`, `None` when it is empty.
    fn pick_data_source(&self, candidates: &BTreeSet<String>) -> Option<String>;

    fn is_configured_sharded(&self, logical_table: &str) -> bool {
        self.find_table_rule(logical_table).is_some()
    }

    /// `false` for an empty set.
    fn is_all_broadcast_tables(&self, logical_tables: &[String]) -> bool {
        !logical_tables.is_empty()
            && logical_tables
                .iter()
                .all(|table| self.is_broadcast_table(table))
    }

    /// Ordered shard placements; empty when the table is not sharded.
    fn actual_data_nodes(&self, logical_table: &str) -> &[DataNode] {
        self.find_table_rule(logical_table)
            .map(TableRule::actual_data_nodes)
            .unwrap_or(&[])
    }

    /// Places a table may be read from when it is joined with other tables.
    ///
    /// Sharded tables contribute their data nodes. The default keeps
    /// everything else unplaceable.
    fn routable_data_nodes(&self, logical_table: &str) -> Vec<DataNode> {
        self.actual_data_nodes(logical_table).to_vec()
    }

    fn pick_random_data_source(&self) -> Option<String> {
        self.pick_data_source(self.all_data_source_names())
    }
}

/// Immutable sharding configuration snapshot.
#[derive(Debug, Clone)]
pub struct ShardingRule {
    data_source_names: BTreeSet<String>,
    table_rules: HashMap<String, TableRule>,
    broadcast_tables: HashSet<String>,
    default_data_source: Option<String>,
    selector: Arc<dyn DataSourceSelector>,
}

/// Normalized form under which logical tables are compared.
pub(crate) fn table_key(logical_table: &str) -> String {
    logical_table.trim().to_lowercase()
}

impl ShardingRule {
    /// Validates `config` and builds the lookup structures.
    pub fn new(config: &ShardingRuleConfiguration) -> Result<Self> {
        let mut data_source_names = BTreeSet::new();
        for name in &config.data_sources {
            let name = name.trim();
            if name.is_empty() {
                return Err(RouteError::InvalidConfiguration(
                    "data source name must not be empty".to_string(),
                ));
            }
            if !data_source_names.insert(name.to_string()) {
                return Err(RouteError::InvalidConfiguration(format!(
                    "Data source '{}' is declared more than once",
                    name
                )));
            }
        }
        if data_source_names.is_empty() {
            return Err(RouteError::InvalidConfiguration(
                "at least one data source is required".to_string(),
            ));
        }

        let mut table_rules = HashMap::new();
        for table in &config.tables {
            let rule = if table.actual_data_nodes.is_empty() {
                TableRule::across_data_sources(table.logical_table.trim(), &data_source_names)?
            } else {
                let nodes = table
                    .actual_data_nodes
                    .iter()
                    .map(|text| DataNode::parse(text))
                    .collect::<Result<Vec<_>>>()?;
                TableRule::new(table.logical_table.trim(), nodes)?
            };

            for node in rule.actual_data_nodes() {
                if !data_source_names.contains(&node.data_source_name) {
                    return Err(RouteError::InvalidConfiguration(format!(
                        "Table '{}' references unknown data source '{}'",
                        rule.logical_table(),
                        node.data_source_name
                    )));
                }
            }

            let key = table_key(rule.logical_table());
            if table_rules.contains_key(&key) {
                return Err(RouteError::InvalidConfiguration(format!(
                    "Table '{}' is configured more than once",
                    rule.logical_table()
                )));
            }
            table_rules.insert(key, rule);
        }

        let mut broadcast_tables = HashSet::new();
        for table in &config.broadcast_tables {
            let key = table_key(table);
            if key.is_empty() {
                return Err(RouteError::InvalidConfiguration(
                    "broadcast table name must not be empty".to_string(),
                ));
            }
            if table_rules.contains_key(&key) {
                return Err(RouteError::InvalidConfiguration(format!(
                    "Table '{}' cannot be both sharded and broadcast",
                    table.trim()
                )));
            }
            broadcast_tables.insert(key);
        }

        let default_data_source = match config.default_data_source.as_deref().map(str::trim) {
            Some(name) if !data_source_names.contains(name) => {
                return Err(RouteError::InvalidConfiguration(format!(
                    "Default data source '{}' is not declared",
                    name
                )));
            }
            other => other.map(str::to_string),
        };

        Ok(Self {
            data_source_names,
            table_rules,
            broadcast_tables,
            default_data_source,
            selector: Arc::new(RandomSelector),
        })
    }

    /// Replaces the data source selection policy.
    pub fn with_selector(mut self, selector: Arc<dyn DataSourceSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn selector(&self) -> &Arc<dyn DataSourceSelector> {
        &self.selector
    }

    pub fn default_data_source(&self) -> Option<&str> {
        self.default_data_source.as_deref()
    }

    /// Like [`ShardingRuleLookup::find_table_rule`] but fails for unsharded tables.
    pub fn table_rule(&self, logical_table: &str) -> Result<&TableRule> {
        self.find_table_rule(logical_table).ok_or_else(|| {
            RouteError::InvalidConfiguration(format!(
                "Cannot find table rule for logic table '{}'",
                logical_table
            ))
        })
    }

    /// Sharded logical table names, sorted.
    pub fn sharded_tables(&self) -> Vec<&str> {
        let mut tables = self
            .table_rules
            .values()
            .map(TableRule::logical_table)
            .collect::<Vec<_>>();
        tables.sort();
        tables
    }

    /// Broadcast table names in their normalized form, sorted.
    pub fn broadcast_tables(&self) -> Vec<&str> {
        let mut tables = self
            .broadcast_tables
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>();
        tables.sort();
        tables
    }
}

impl ShardingRuleLookup for ShardingRule {
    fn is_broadcast_table(&self, logical_table: &str) -> bool {
        self.broadcast_tables.contains(&table_key(logical_table))
    }

    fn find_table_rule(&self, logical_table: &str) -> Option<&TableRule> {
        self.table_rules.get(&table_key(logical_table))
    }

    fn all_data_source_names(&self) -> &BTreeSet<String> {
        &self.data_source_names
    }

    fn pick_data_source(&self, candidates: &BTreeSet<String>) -> Option<String> {
        self.selector.select(candidates)
    }

    /// Broadcast tables live everywhere; unconfigured tables live on the
    /// default data source when one is set.
    fn routable_data_nodes(&self, logical_table: &str) -> Vec<DataNode> {
        if let Some(rule) = self.find_table_rule(logical_table) {
            return rule.actual_data_nodes().to_vec();
        }
        if self.is_broadcast_table(logical_table) {
            return self
                .data_source_names
                .iter()
                .map(|data_source| DataNode::new(data_source.clone(), logical_table))
                .collect();
        }
        self.default_data_source
            .iter()
            .map(|data_source| DataNode::new(data_source.clone(), logical_table))
            .collect()
    }
}
