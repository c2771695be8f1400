//! Configuration

use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf, str::FromStr};
use tracing::warn;

use crate::{
    DEFAULT_HEIGHT, MAX_HEIGHT,
    error::{Result, TreeError},
};

/// Exit tree configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitTreeConfig {
    /// Tree height, must match the counterpart contract
    pub height: u8,
    /// Ordered leaf log to rebuild the tree from
    pub leaf_log: Option<PathBuf>,
    /// Leaf index to produce a proof for
    pub prove_index: Option<u64>,
}

impl Default for ExitTreeConfig {
    fn default() -> Self {
        Self { height: DEFAULT_HEIGHT, leaf_log: None, prove_index: None }
    }
}

impl ExitTreeConfig {
    /// Load from environment variables.
    ///
    /// Unset variables take their defaults; a value that is set but does not
    /// parse is an error rather than a silent fallback.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            height: parse_var(&lookup, "EXIT_TREE_HEIGHT")?.unwrap_or(DEFAULT_HEIGHT),
            leaf_log: lookup("EXIT_TREE_LEAF_LOG").map(PathBuf::from),
            prove_index: parse_var(&lookup, "EXIT_TREE_PROVE_INDEX")?,
        })
    }

    /// Check the configured height is supported
    pub fn validate(&self) -> Result<()> {
        if self.height > MAX_HEIGHT {
            return Err(TreeError::InvalidHeight { height: self.height, max: MAX_HEIGHT });
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    match value.trim().parse() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => {
            warn!("Invalid value for {}: {:?}", key, value);
            Err(TreeError::InvalidConfig { key: key.to_string(), value })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExitTreeConfig::default();
        assert_eq!(config.height, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_tall_tree() {
        let config = ExitTreeConfig { height: 65, ..Default::default() };
        assert_eq!(config.validate(), Err(TreeError::InvalidHeight { height: 65, max: 64 }));
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    #[test]
    fn test_from_lookup_defaults_when_unset() {
        let config = ExitTreeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ExitTreeConfig::default());
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let vars = [
            ("EXIT_TREE_HEIGHT", "16"),
            ("EXIT_TREE_LEAF_LOG", "/data/exits.json"),
            ("EXIT_TREE_PROVE_INDEX", "7"),
        ];
        let config = ExitTreeConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.height, 16);
        assert_eq!(config.leaf_log, Some(PathBuf::from("/data/exits.json")));
        assert_eq!(config.prove_index, Some(7));
    }

    #[test]
    fn test_from_lookup_rejects_unparsable_height() {
        for bad in ["300", "abc", "-1", ""] {
            let vars = [("EXIT_TREE_HEIGHT", bad)];
            assert_eq!(
                ExitTreeConfig::from_lookup(lookup(&vars)),
                Err(TreeError::InvalidConfig {
                    key: "EXIT_TREE_HEIGHT".to_string(),
                    value: bad.to_string()
                })
            );
        }
    }

    #[test]
    fn test_from_lookup_rejects_unparsable_prove_index() {
        let vars = [("EXIT_TREE_PROVE_INDEX", "first")];
        assert!(matches!(
            ExitTreeConfig::from_lookup(lookup(&vars)),
            Err(TreeError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_config_serde() {
        let json = r#"{"height":16,"leaf_log":"/data/exits.json","prove_index":3}"#;
        let config: ExitTreeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.height, 16);
        assert_eq!(config.leaf_log, Some(PathBuf::from("/data/exits.json")));
        assert_eq!(config.prove_index, Some(3));
    }
}
