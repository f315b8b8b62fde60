use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::controller::{ControllerSettings, DEFAULT_MAX_PAGES, RollbackScope};
use crate::model::entity::{EntityKind, ListEntity};
use crate::sort::{RankTable, RankTables};

/// Location of the per-workspace config file, relative to its root.
pub const CONFIG_PATH: &str = ".worklist/config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub mutation: MutationConfig,
    #[serde(default)]
    pub ranks: RanksConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationConfig {
    #[serde(default)]
    pub rollback: RollbackScope,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RanksConfig {
    #[serde(default)]
    pub project: RankOverrides,
    #[serde(default)]
    pub work_item: RankOverrides,
}

/// Label lists replacing individual default rank tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankOverrides {
    #[serde(default)]
    pub status_natural: Option<Vec<String>>,
    #[serde(default)]
    pub status_custom: Option<Vec<String>>,
    #[serde(default)]
    pub priority_natural: Option<Vec<String>>,
    #[serde(default)]
    pub priority_custom: Option<Vec<String>>,
}

impl RankOverrides {
    #[must_use]
    pub fn apply_to(&self, base: RankTables) -> RankTables {
        let pick = |over: Option<&Vec<String>>, table: RankTable| {
            over.map_or(table, |labels| RankTable::new(labels.iter().cloned()))
        };
        RankTables {
            status_natural: pick(self.status_natural.as_ref(), base.status_natural),
            status_custom: pick(self.status_custom.as_ref(), base.status_custom),
            priority_natural: pick(self.priority_natural.as_ref(), base.priority_natural),
            priority_custom: pick(self.priority_custom.as_ref(), base.priority_custom),
        }
    }
}

impl ListConfig {
    /// Controller settings for one entity shape: its default rank tables with
    /// the matching `[ranks.*]` overrides applied.
    #[must_use]
    pub fn settings_for<E: ListEntity>(&self) -> ControllerSettings {
        let overrides = match E::KIND {
            EntityKind::Project => &self.ranks.project,
            EntityKind::WorkItem => &self.ranks.work_item,
        };
        ControllerSettings {
            ranks: overrides.apply_to(E::default_ranks()),
            rollback: self.mutation.rollback,
            max_pages: self.fetch.max_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

const fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

/// Parse config text. Unknown keys are ignored.
///
/// # Errors
///
/// Returns the `toml` parse error for malformed input.
pub fn parse_list_config(content: &str) -> Result<ListConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Load `<root>/.worklist/config.toml`, or defaults when it does not exist.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_list_config(root: &Path) -> Result<ListConfig> {
    let path = root.join(CONFIG_PATH);
    if !path.exists() {
        return Ok(ListConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    parse_list_config(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `<config_dir>/worklist/config.toml`, or defaults.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("worklist/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::Project;
    use crate::model::work_item::WorkItem;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_list_config(dir.path()).unwrap();
        assert_eq!(config, ListConfig::default());
        assert_eq!(config.fetch.max_pages, 100);
        assert_eq!(config.mutation.rollback, RollbackScope::Store);
    }

    #[test]
    fn reads_every_section() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".worklist")).unwrap();
        std::fs::write(
            dir.path().join(CONFIG_PATH),
            r#"
[fetch]
max_pages = 5

[mutation]
rollback = "entity"

[ranks.work_item]
status_custom = ["completed", "pending", "in_progress"]
"#,
        )
        .unwrap();

        let config = load_list_config(dir.path()).unwrap();
        assert_eq!(config.fetch.max_pages, 5);
        assert_eq!(config.mutation.rollback, RollbackScope::Entity);

        let items = config.settings_for::<WorkItem>();
        assert_eq!(items.max_pages, 5);
        assert_eq!(items.ranks.status_custom.rank("completed"), 1);
        assert_eq!(
            items.ranks.status_natural,
            WorkItem::default_ranks().status_natural
        );

        let projects = config.settings_for::<Project>();
        assert_eq!(projects.ranks, Project::default_ranks());
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".worklist")).unwrap();
        std::fs::write(dir.path().join(CONFIG_PATH), "[fetch\nmax_pages = ").unwrap();

        let err = load_list_config(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
        assert!(err.downcast_ref::<toml::de::Error>().is_some());
    }

    #[test]
    fn unknown_rollback_scope_is_rejected() {
        assert!(parse_list_config("[mutation]\nrollback = \"sometimes\"").is_err());
    }
}
