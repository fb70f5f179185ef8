use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No single data source hosts every referenced table.
    #[error(
        "Cannot find actual data source intersection for logic tables: [{}]",
        .logical_tables.join(", ")
    )]
    RoutingImpossible { logical_tables: Vec<String> },

    #[error("Invalid sharding configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid data node '{0}': expected <data_source>.<table>")]
    InvalidDataNode(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, RouteError>;

impl RouteError {
    pub(crate) fn routing_impossible<I, S>(logical_tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut logical_tables = logical_tables
            .into_iter()
            .map(Into::into)
            .collect::<Vec<_>>();
        logical_tables.sort();
        Self::RoutingImpossible { logical_tables }
    }
}

impl From<serde_json::Error> for RouteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<std::io::Error> for RouteError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_impossible_sorts_tables_for_stable_messages() {
        let err = RouteError::routing_impossible(["t_order", "t_account"]);
        assert_eq!(
            err,
            RouteError::RoutingImpossible {
                logical_tables: vec!["t_account".to_string(), "t_order".to_string()],
            }
        );
        assert_eq!(
            err.to_string(),
            "Cannot find actual data source intersection for logic tables: [t_account, t_order]"
        );
    }
}
