use crate::core::{Result, RouteError};
use crate::result::{RouteResult, RouteUnit, TableUnit};
use crate::rule::ShardingRuleLookup;
use crate::rule::sharding_rule::table_key;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

/// How a table joined with others is bound to a physical table once the
/// shared data source has been chosen.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhysicalTableBinding {
    /// Always the table's first configured data node, whichever data source
    /// ends up being picked. Only consistent when every shard of a table
    /// shares one physical name.
    #[default]
    FirstDataNode,
    /// The table's first data node located on the picked data source.
    SelectedDataSource,
}

/// Shape of the routed table set. Exactly one applies to any input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnicastCase<'a> {
    /// Non-empty set of broadcast tables only.
    AllBroadcast,
    /// No table referenced at all.
    Empty,
    /// One table that is not broadcast.
    Single(&'a str),
    /// Several tables, at least one of them not broadcast.
    Multiple,
}

/// Routes a statement to exactly one data source.
#[derive(Debug, Clone)]
pub struct UnicastRoutingEngine {
    logical_tables: Vec<String>,
    binding: PhysicalTableBinding,
}

impl UnicastRoutingEngine {
    /// Names are trimmed and blank ones dropped. Duplicates are compared the
    /// way the rule looks tables up; the first spelling wins.
    pub fn new<I, S>(logical_tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let logical_tables = logical_tables
            .into_iter()
            .map(|table| Into::<String>::into(table).trim().to_string())
            .filter(|table| !table.is_empty() && seen.insert(table_key(table)))
            .collect();
        Self {
            logical_tables,
            binding: PhysicalTableBinding::default(),
        }
    }

    pub fn with_binding(mut self, binding: PhysicalTableBinding) -> Self {
        self.binding = binding;
        self
    }

    pub fn logical_tables(&self) -> &[String] {
        &self.logical_tables
    }

    pub fn binding(&self) -> PhysicalTableBinding {
        self.binding
    }

    pub fn classify<R>(&self, rule: &R) -> UnicastCase<'_>
    where
        R: ShardingRuleLookup + ?Sized,
    {
        if rule.is_all_broadcast_tables(&self.logical_tables) {
            return UnicastCase::AllBroadcast;
        }
        match self.logical_tables.as_slice() {
            [] => UnicastCase::Empty,
            [table] => UnicastCase::Single(table.as_str()),
            _ => UnicastCase::Multiple,
        }
    }

    pub fn route<R>(&self, rule: &R) -> Result<RouteResult>
    where
        R: ShardingRuleLookup + ?Sized,
    {
        let case = self.classify(rule);
        debug!(?case, tables = ?self.logical_tables, "unicast routing");
        let route_unit = match case {
            UnicastCase::AllBroadcast => self.route_all_broadcast(rule)?,
            UnicastCase::Empty => RouteUnit::new(random_data_source(rule)?),
            UnicastCase::Single(table) => self.route_single(rule, table)?,
            UnicastCase::Multiple => self.route_multiple(rule)?,
        };
        debug!(data_source = %route_unit.data_source_name, "unicast route selected");
        Ok(RouteResult::single(route_unit))
    }

    fn route_all_broadcast<R>(&self, rule: &R) -> Result<RouteUnit>
    where
        R: ShardingRuleLookup + ?Sized,
    {
        let table_units = self
            .logical_tables
            .iter()
            .map(|table| TableUnit::new(table.clone(), table.clone()))
            .collect();
        Ok(RouteUnit::new(random_data_source(rule)?).with_table_units(table_units))
    }

    fn route_single<R>(&self, rule: &R, table: &str) -> Result<RouteUnit>
    where
        R: ShardingRuleLookup + ?Sized,
    {
        if !rule.is_configured_sharded(table) {
            // Left unbound: the statement runs against its original table name.
            return Ok(RouteUnit::new(random_data_source(rule)?));
        }
        let node = rule
            .actual_data_nodes(table)
            .first()
            .ok_or_else(|| missing_data_node(table, None))?;
        Ok(RouteUnit::new(node.data_source_name.clone())
            .with_table_units(vec![TableUnit::new(table, node.table_name.clone())]))
    }

    fn route_multiple<R>(&self, rule: &R) -> Result<RouteUnit>
    where
        R: ShardingRuleLookup + ?Sized,
    {
        let mut placements = Vec::with_capacity(self.logical_tables.len());
        let mut available: Option<BTreeSet<String>> = None;
        for table in &self.logical_tables {
            let nodes = rule.routable_data_nodes(table);
            let data_sources = nodes
                .iter()
                .map(|node| node.data_source_name.clone())
                .collect::<BTreeSet<_>>();
            available = Some(match available {
                None => data_sources,
                Some(acc) => acc.intersection(&data_sources).cloned().collect(),
            });
            placements.push((table, nodes));
        }

        let available = available.unwrap_or_default();
        if available.is_empty() {
            warn!(tables = ?self.logical_tables, "no data source hosts every table");
            return Err(RouteError::routing_impossible(self.logical_tables.iter().cloned()));
        }
        let data_source = pick_from(rule, &available)?;

        let table_units = placements
            .into_iter()
            .map(|(table, nodes)| -> Result<TableUnit> {
                let node = match self.binding {
                    PhysicalTableBinding::FirstDataNode => nodes.first(),
                    PhysicalTableBinding::SelectedDataSource => nodes
                        .iter()
                        .find(|node| node.data_source_name == data_source),
                };
                let node = node.ok_or_else(|| missing_data_node(table, Some(data_source.as_str())))?;
                Ok(TableUnit::new(table.clone(), node.table_name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RouteUnit::new(data_source).with_table_units(table_units))
    }
}

fn random_data_source<R>(rule: &R) -> Result<String>
where
    R: ShardingRuleLookup + ?Sized,
{
    pick_from(rule, rule.all_data_source_names())
}

/// Asks the rule for a data source and rejects answers outside `candidates`.
fn pick_from<R>(rule: &R, candidates: &BTreeSet<String>) -> Result<String>
where
    R: ShardingRuleLookup + ?Sized,
{
    let picked = rule.pick_data_source(candidates).ok_or_else(|| {
        RouteError::InvalidConfiguration("no data source available for routing".to_string())
    })?;
    if !candidates.contains(&picked) {
        return Err(RouteError::InvalidConfiguration(format!(
            "Selected data source '{}' is not one of the candidates [{}]",
            picked,
            candidates.iter().cloned().collect::<Vec<_>>().join(", ")
        )));
    }
    Ok(picked)
}

fn missing_data_node(table: &str, data_source: Option<&str>) -> RouteError {
    RouteError::InvalidConfiguration(match data_source {
        Some(data_source) => format!(
            "Logic table '{}' has no data node on data source '{}'",
            table, data_source
        ),
        None => format!("Logic table '{}' has no actual data node", table),
    })
}
