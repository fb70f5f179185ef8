use super::DataNode;
use crate::core::{Result, RouteError};
use std::collections::{BTreeSet, HashSet};

/// Placement of one sharded logical table across its data nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRule {
    logical_table: String,
    actual_data_nodes: Vec<DataNode>,
}

impl TableRule {
    /// Creates a rule from an ordered, non-empty list of data nodes.
    ///
    /// Duplicate nodes are dropped; the first occurrence keeps its position.
    pub fn new(logical_table: impl Into<String>, actual_data_nodes: Vec<DataNode>) -> Result<Self> {
        let logical_table = logical_table.into();
        if logical_table.trim().is_empty() {
            return Err(RouteError::InvalidConfiguration(
                "logical table name must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let actual_data_nodes = actual_data_nodes
            .into_iter()
            .filter(|node| seen.insert(node.clone()))
            .collect::<Vec<_>>();
        if actual_data_nodes.is_empty() {
            return Err(RouteError::InvalidConfiguration(format!(
                "Table rule '{}' must have at least one actual data node",
                logical_table
            )));
        }

        Ok(Self {
            logical_table,
            actual_data_nodes,
        })
    }

    /// One node per data source, each holding a physical table named after the
    /// logical one.
    pub fn across_data_sources<'a, I>(logical_table: impl Into<String>, data_sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let logical_table = logical_table.into();
        let nodes = data_sources
            .into_iter()
            .map(|data_source| DataNode::new(data_source.clone(), logical_table.clone()))
            .collect();
        Self::new(logical_table, nodes)
    }

    pub fn logical_table(&self) -> &str {
        &self.logical_table
    }

    pub fn actual_data_nodes(&self) -> &[DataNode] {
        &self.actual_data_nodes
    }

    /// The node routing falls back to when no other choice is made.
    pub fn first_data_node(&self) -> &DataNode {
        // Non-empty by construction.
        &self.actual_data_nodes[0]
    }

    /// Distinct data sources holding at least one shard of the table.
    pub fn actual_data_source_names(&self) -> BTreeSet<String> {
        self.actual_data_nodes
            .iter()
            .map(|node| node.data_source_name.clone())
            .collect()
    }

    /// First node of the table located on `data_source_name`, in configuration order.
    pub fn data_node_in(&self, data_source_name: &str) -> Option<&DataNode> {
        self.actual_data_nodes
            .iter()
            .find(|node| node.data_source_name == data_source_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_rule() -> TableRule {
        TableRule::new(
            "t_order",
            vec![
                DataNode::new("ds_1", "t_order_0"),
                DataNode::new("ds_0", "t_order_1"),
                DataNode::new("ds_1", "t_order_2"),
                DataNode::new("ds_1", "t_order_0"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn keeps_configuration_order_and_drops_duplicates() {
        let rule = order_rule();
        assert_eq!(rule.actual_data_nodes().len(), 3);
        assert_eq!(rule.first_data_node(), &DataNode::new("ds_1", "t_order_0"));
    }

    #[test]
    fn data_source_names_are_distinct() {
        let names = order_rule().actual_data_source_names();
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["ds_0", "ds_1"]);
    }

    #[test]
    fn data_node_in_returns_first_match_on_that_source() {
        let rule = order_rule();
        assert_eq!(rule.data_node_in("ds_1").unwrap().table_name, "t_order_0");
        assert_eq!(rule.data_node_in("ds_0").unwrap().table_name, "t_order_1");
        assert!(rule.data_node_in("ds_9").is_none());
    }

    #[test]
    fn rejects_rule_without_nodes() {
        let err = TableRule::new("t_order", Vec::new()).unwrap_err();
        assert!(matches!(err, RouteError::InvalidConfiguration(_)));
    }

    #[test]
    fn across_data_sources_keeps_logical_name() {
        let sources = vec!["ds_0".to_string(), "ds_1".to_string()];
        let rule = TableRule::across_data_sources("t_dict", &sources).unwrap();
        assert_eq!(
            rule.actual_data_nodes(),
            &[DataNode::new("ds_0", "t_dict"), DataNode::new("ds_1", "t_dict")]
        );
    }
}
