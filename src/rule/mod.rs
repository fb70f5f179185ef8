pub mod config;
pub mod data_node;
pub mod selector;
pub mod sharding_rule;
pub mod table_rule;

pub use config::{ShardingRuleConfiguration, TableRuleConfiguration};
pub use data_node::DataNode;
pub use selector::{DataSourceSelector, FirstCandidateSelector, RandomSelector, SeededSelector};
pub use sharding_rule::{ShardingRule, ShardingRuleLookup};
pub use table_rule::TableRule;
