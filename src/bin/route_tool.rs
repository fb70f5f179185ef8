use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use shardroute::{
    PhysicalTableBinding, SeededSelector, ShardingRule, ShardingRuleConfiguration,
    ShardingRuleLookup, UnicastRoutingEngine,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "route-tool")]
#[command(about = "Inspect unicast routing decisions for a sharding configuration")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Route a set of logical tables to one data source
    Route {
        #[arg(long)]
        config: PathBuf,
        #[arg(long = "table")]
        tables: Vec<String>,
        /// Seed the data source selector for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = Binding::First)]
        binding: Binding,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Check a configuration file and summarize it
    Validate {
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Binding {
    First,
    Selected,
}

impl From<Binding> for PhysicalTableBinding {
    fn from(binding: Binding) -> Self {
        match binding {
            Binding::First => PhysicalTableBinding::FirstDataNode,
            Binding::Selected => PhysicalTableBinding::SelectedDataSource,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Table,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Route {
            config,
            tables,
            seed,
            binding,
            format,
        } => {
            let output = route(&config, tables, seed, binding.into(), format)?;
            println!("{}", output);
            Ok(())
        }
        Command::Validate { config } => {
            println!("{}", validate(&config)?);
            Ok(())
        }
    }
}

fn load_rule(path: &Path) -> Result<ShardingRule> {
    let config = ShardingRuleConfiguration::from_path(path)
        .with_context(|| format!("Failed to load sharding configuration '{}'", path.display()))?;
    config
        .build()
        .with_context(|| format!("Invalid sharding configuration '{}'", path.display()))
}

fn route(
    config: &Path,
    tables: Vec<String>,
    seed: Option<u64>,
    binding: PhysicalTableBinding,
    format: Format,
) -> Result<String> {
    let mut rule = load_rule(config)?;
    if let Some(seed) = seed {
        rule = rule.with_selector(Arc::new(SeededSelector::new(seed)));
    }

    let engine = UnicastRoutingEngine::new(tables).with_binding(binding);
    let result = engine
        .route(&rule)
        .with_context(|| format!("Failed to route tables {:?}", engine.logical_tables()))?;

    Ok(match format {
        Format::Json => serde_json::to_string_pretty(&result)?,
        Format::Table => result.to_table_string(),
    })
}

fn validate(config: &Path) -> Result<String> {
    let rule = load_rule(config)?;
    let data_sources = rule
        .all_data_source_names()
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>();

    let mut lines = vec![format!("Configuration OK: {}", config.display())];
    lines.push(format!("Data sources: {}", data_sources.join(", ")));
    for table in rule.sharded_tables() {
        let nodes = rule
            .actual_data_nodes(table)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        lines.push(format!("Sharded table {}: {}", table, nodes.join(", ")));
    }
    if !rule.broadcast_tables().is_empty() {
        lines.push(format!("Broadcast tables: {}", rule.broadcast_tables().join(", ")));
    }
    if let Some(default) = rule.default_data_source() {
        lines.push(format!("Default data source: {}", default));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardroute::RouteResult;
    use std::fs;
    use tempfile::tempdir;

    const CONFIG: &str = r#"{
        "data_sources": ["ds_0", "ds_1", "ds_2"],
        "tables": [
            { "logical_table": "t_order", "actual_data_nodes": ["ds_0.t_order_0", "ds_1.t_order_1"] },
            { "logical_table": "t_item", "actual_data_nodes": ["ds_1.t_item_1", "ds_2.t_item_2"] }
        ],
        "broadcast_tables": ["t_config"],
        "default_data_source": "ds_2"
    }"#;

    fn write_config(dir: &Path) -> PathBuf {
        let path = dir.join("sharding.json");
        fs::write(&path, CONFIG).unwrap();
        path
    }

    fn tables(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn binding_flag_maps_to_engine_policy() {
        assert_eq!(
            PhysicalTableBinding::from(Binding::First),
            PhysicalTableBinding::FirstDataNode
        );
        assert_eq!(
            PhysicalTableBinding::from(Binding::Selected),
            PhysicalTableBinding::SelectedDataSource
        );
    }

    #[test]
    fn route_arguments_parse() {
        let cli = Cli::try_parse_from([
            "route-tool", "route", "--config", "rules.json", "--table", "t_order", "--table",
            "t_item", "--seed", "7", "--binding", "selected", "--format", "table",
        ])
        .unwrap();
        match cli.command {
            Command::Route {
                config,
                tables,
                seed,
                binding,
                format,
            } => {
                assert_eq!(config, PathBuf::from("rules.json"));
                assert_eq!(tables, vec!["t_order", "t_item"]);
                assert_eq!(seed, Some(7));
                assert!(matches!(binding, Binding::Selected));
                assert!(matches!(format, Format::Table));
            }
            Command::Validate { .. } => panic!("expected route command"),
        }
    }

    #[test]
    fn route_defaults_to_first_binding_and_json() {
        let cli = Cli::try_parse_from(["route-tool", "route", "--config", "rules.json"]).unwrap();
        match cli.command {
            Command::Route {
                tables,
                seed,
                binding,
                format,
                ..
            } => {
                assert!(tables.is_empty());
                assert_eq!(seed, None);
                assert!(matches!(binding, Binding::First));
                assert!(matches!(format, Format::Json));
            }
            Command::Validate { .. } => panic!("expected route command"),
        }
    }

    #[test]
    fn route_prints_json_result() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path());

        let output = route(
            &path,
            tables(&["t_order", "t_item"]),
            Some(3),
            PhysicalTableBinding::SelectedDataSource,
            Format::Json,
        )
        .unwrap();
        let result: RouteResult = serde_json::from_str(&output).unwrap();
        let unit = result.single_route_unit().unwrap();
        assert_eq!(unit.data_source_name, "ds_1");
        assert_eq!(unit.find_table_unit("t_order").unwrap().actual_table_name, "t_order_1");
        assert_eq!(unit.find_table_unit("t_item").unwrap().actual_table_name, "t_item_1");
    }

    #[test]
    fn same_seed_gives_same_route() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path());
        let run = || {
            route(
                &path,
                tables(&["t_config"]),
                Some(11),
                PhysicalTableBinding::FirstDataNode,
                Format::Table,
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn route_reports_impossible_intersection() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path());
        let err = route(
            &path,
            tables(&["t_order", "t_misc"]),
            None,
            PhysicalTableBinding::FirstDataNode,
            Format::Json,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("Cannot find actual data source intersection"));
    }

    #[test]
    fn validate_summarizes_configuration() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path());
        let summary = validate(&path).unwrap();
        assert!(summary.contains("Data sources: ds_0, ds_1, ds_2"));
        assert!(summary.contains("Sharded table t_order: ds_0.t_order_0, ds_1.t_order_1"));
        assert!(summary.contains("Broadcast tables: t_config"));
        assert!(summary.contains("Default data source: ds_2"));
    }

    #[test]
    fn validate_rejects_missing_file() {
        let dir = tempdir().unwrap();
        let err = validate(&dir.path().join("absent.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load sharding configuration"));
    }
}
