// ============================================================================
// shardroute Library
// ============================================================================

pub mod core;
pub mod result;
pub mod router;
pub mod rule;

// Re-export main types for convenience
pub use crate::core::{Result, RouteError};
pub use result::{RouteResult, RouteUnit, TableUnit};
pub use router::{PhysicalTableBinding, UnicastCase, UnicastRoutingEngine};
pub use rule::{
    DataNode, DataSourceSelector, FirstCandidateSelector, RandomSelector, SeededSelector,
    ShardingRule, ShardingRuleConfiguration, ShardingRuleLookup, TableRule,
    TableRuleConfiguration,
};

/// Routes `logical_tables` to a single data source with the default binding.
///
/// # Examples
///
/// ```
/// use shardroute::{ShardingRuleConfiguration, TableRuleConfiguration};
///
/// # fn main() -> shardroute::Result<()> {
/// let rule = ShardingRuleConfiguration::new(["ds_0", "ds_1"])
///     .table(TableRuleConfiguration::new("t_order", ["ds_1.t_order_1", "ds_0.t_order_0"]))
///     .build()?;
///
/// let result = shardroute::route_unicast(["t_order"], &rule)?;
/// let unit = result.single_route_unit().unwrap();
/// assert_eq!(unit.data_source_name, "ds_1");
/// assert_eq!(unit.table_units[0].actual_table_name, "t_order_1");
/// # Ok(())
/// # }
/// ```
pub fn route_unicast<I, S, R>(logical_tables: I, rule: &R) -> Result<RouteResult>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    R: ShardingRuleLookup + ?Sized,
{
    UnicastRoutingEngine::new(logical_tables).route(rule)
}
