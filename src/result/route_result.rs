use serde::{Deserialize, Serialize};

/// Binding of a logical table to the physical table accessed inside a route unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TableUnit {
    pub logical_table_name: String,
    pub actual_table_name: String,
}

impl TableUnit {
    pub fn new(logical_table_name: impl Into<String>, actual_table_name: impl Into<String>) -> Self {
        Self {
            logical_table_name: logical_table_name.into(),
            actual_table_name: actual_table_name.into(),
        }
    }
}

/// One physical execution target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteUnit {
    pub data_source_name: String,
    #[serde(default)]
    pub table_units: Vec<TableUnit>,
}

impl RouteUnit {
    pub fn new(data_source_name: impl Into<String>) -> Self {
        Self {
            data_source_name: data_source_name.into(),
            table_units: Vec::new(),
        }
    }

    pub fn with_table_units(mut self, table_units: Vec<TableUnit>) -> Self {
        self.table_units = table_units;
        self
    }

    /// Case-insensitive lookup by logical table name.
    pub fn find_table_unit(&self, logical_table_name: &str) -> Option<&TableUnit> {
        self.table_units
            .iter()
            .find(|unit| unit.logical_table_name.eq_ignore_ascii_case(logical_table_name))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteResult {
    pub route_units: Vec<RouteUnit>,
}

impl RouteResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(route_unit: RouteUnit) -> Self {
        Self {
            route_units: vec![route_unit],
        }
    }

    pub fn route_units(&self) -> &[RouteUnit] {
        &self.route_units
    }

    pub fn is_single_route_unit(&self) -> bool {
        self.route_units.len() == 1
    }

    /// The only route unit, or `None` when the result is empty or scattered.
    pub fn single_route_unit(&self) -> Option<&RouteUnit> {
        match self.route_units.as_slice() {
            [unit] => Some(unit),
            _ => None,
        }
    }

    pub fn data_source_names(&self) -> Vec<&str> {
        self.route_units
            .iter()
            .map(|unit| unit.data_source_name.as_str())
            .collect()
    }

    /// Renders one line per table unit, aligned like a query result grid.
    pub fn to_table_string(&self) -> String {
        let columns = ["data_source", "logical_table", "actual_table"];
        let rows = self
            .route_units
            .iter()
            .flat_map(|unit| {
                let mut rows = unit
                    .table_units
                    .iter()
                    .map(|table| {
                        [
                            unit.data_source_name.as_str(),
                            table.logical_table_name.as_str(),
                            table.actual_table_name.as_str(),
                        ]
                    })
                    .collect::<Vec<_>>();
                if rows.is_empty() {
                    rows.push([unit.data_source_name.as_str(), "-", "-"]);
                }
                rows
            })
            .collect::<Vec<_>>();

        let mut widths = columns.map(str::len);
        for row in &rows {
            for (i, value) in row.iter().enumerate() {
                widths[i] = widths[i].max(value.len());
            }
        }

        let render = |cells: [&str; 3]| {
            cells
                .iter()
                .enumerate()
                .map(|(i, cell)| format!("{:width$}", cell, width = widths[i]))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut out = vec![render(columns)];
        out.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        out.extend(rows.into_iter().map(render));
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_route_unit_only_for_unicast_results() {
        assert!(RouteResult::empty().single_route_unit().is_none());

        let unicast = RouteResult::single(RouteUnit::new("ds_0"));
        assert!(unicast.is_single_route_unit());
        assert_eq!(unicast.single_route_unit().unwrap().data_source_name, "ds_0");

        let scattered = RouteResult {
            route_units: vec![RouteUnit::new("ds_0"), RouteUnit::new("ds_1")],
        };
        assert!(scattered.single_route_unit().is_none());
        assert_eq!(scattered.data_source_names(), vec!["ds_0", "ds_1"]);
    }

    #[test]
    fn find_table_unit_ignores_case() {
        let unit = RouteUnit::new("ds_0")
            .with_table_units(vec![TableUnit::new("t_order", "t_order_0")]);
        assert_eq!(
            unit.find_table_unit("T_ORDER").map(|t| t.actual_table_name.as_str()),
            Some("t_order_0")
        );
        assert!(unit.find_table_unit("t_item").is_none());
    }

    #[test]
    fn table_string_lists_every_binding() {
        let result = RouteResult::single(
            RouteUnit::new("ds_1").with_table_units(vec![TableUnit::new("t_order", "t_order_1")]),
        );
        let rendered = result.to_table_string();
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("data_source | logical_table | actual_table"));
        assert!(lines[2].starts_with("ds_1"));
        assert!(lines[2].contains("t_order_1"));
    }

    #[test]
    fn table_string_marks_units_without_tables() {
        let rendered = RouteResult::single(RouteUnit::new("ds_0")).to_table_string();
        assert!(rendered.lines().last().unwrap().starts_with("ds_0"));
        assert!(rendered.contains(" - "));
    }
}
