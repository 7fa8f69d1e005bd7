use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::storage::ConnectionTarget;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CoffeehouseConfig {
    /// Connection string, e.g. `sqlite://.coffeehouse/coffeehouse.db`
    pub database: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("coffeehouse.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".coffeehouse").join("coffeehouse.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<CoffeehouseConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: CoffeehouseConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &CoffeehouseConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Pick the connection target: CLI flag, then config, then the default file
/// under `base`.
pub fn resolve_target(
    flag: Option<&str>,
    config: Option<&CoffeehouseConfig>,
    base: &Path,
) -> anyhow::Result<ConnectionTarget> {
    let configured = flag.or_else(|| config.and_then(|c| c.database.as_deref()));
    match configured {
        Some(s) => Ok(s.parse()?),
        None => Ok(ConnectionTarget::File(default_database_path_in(base))),
    }
}

pub fn ensure_db_dir(target: &ConnectionTarget) -> anyhow::Result<()> {
    if let ConnectionTarget::File(db_path) = target {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("coffeehouse.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coffeehouse.toml");
        let config = CoffeehouseConfig {
            database: Some("sqlite::memory:".to_string()),
        };

        write_config(&path, &config, false).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), Some(config.clone()));

        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();
    }

    #[test]
    fn test_resolve_target_precedence() {
        let base = Path::new("/work");
        let config = CoffeehouseConfig {
            database: Some("sqlite://from-config.db".to_string()),
        };

        let target = resolve_target(Some(":memory:"), Some(&config), base).unwrap();
        assert_eq!(target, ConnectionTarget::Memory);

        let target = resolve_target(None, Some(&config), base).unwrap();
        assert_eq!(target, ConnectionTarget::File(PathBuf::from("from-config.db")));

        let target = resolve_target(None, None, base).unwrap();
        assert_eq!(target, ConnectionTarget::File(default_database_path_in(base)));
    }

    #[test]
    fn test_ensure_db_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("coffee.db");
        ensure_db_dir(&ConnectionTarget::File(db.clone())).unwrap();
        assert!(db.parent().unwrap().is_dir());
    }
}
