use crate::errors::Result;
use serde::Deserialize;
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Name of the per-user directory searched for config files.
const USER_CONFIG_DIR: &str = ".pathrewrite";

/// A rewrite described in a YAML file.
///
/// Every field is optional; values given on the command line take precedence.
///
/// ```yaml
/// search: 'C:\old_project'
/// replace: 'D:/new_project'
/// extensions: ['.py', '.json']
/// exclude: ['.git', 'node_modules']
/// backup: true
/// ```
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct RewriteConfig {
    pub search: Option<String>,
    pub replace: Option<String>,
    /// File name suffixes whose contents are scanned.
    pub extensions: Option<Vec<String>>,
    pub search_in_names: Option<bool>,
    /// Directory names to skip.
    pub exclude: Option<Vec<String>>,
    pub respect_ignore: Option<bool>,
    pub rename_paths: Option<bool>,
    pub backup: Option<bool>,
}

/// A utility for locating and loading rewrite configurations.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Finds the configuration file by searching in a prioritized list of locations.
    ///
    /// The search order is:
    /// 1. The absolute path provided in `config_path`, if it exists.
    /// 2. A path relative to the current directory.
    /// 3. A path relative to the `working_dir`.
    /// 4. Inside the `~/.pathrewrite` directory.
    /// 5. Next to the executable, then its parent and grandparent directories.
    pub fn find_config(config_path: &Path, working_dir: &Path) -> Result<PathBuf> {
        if config_path.is_absolute() && config_path.exists() {
            return Ok(config_path.to_path_buf());
        }

        let mut candidates = vec![config_path.to_path_buf(), working_dir.join(config_path)];

        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(USER_CONFIG_DIR).join(config_path));
        }

        // Covers running from target/release during development.
        if let Ok(exe_path) = env::current_exe() {
            candidates.extend(
                exe_path
                    .ancestors()
                    .skip(1)
                    .take(3)
                    .map(|dir| dir.join(config_path)),
            );
        }

        if let Some(found) = candidates.iter().find(|p| p.exists()) {
            return Ok(found.clone());
        }

        let tried: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
        Err(format!(
            "Config file '{}' not found. Searched in:\n  - {}",
            config_path.display(),
            tried.join("\n  - ")
        )
        .into())
    }

    /// Loads a `RewriteConfig` from a YAML file.
    pub fn load_rewrite_config(path: &Path) -> Result<RewriteConfig> {
        let file = File::open(path)?;
        Ok(serde_yaml::from_reader(file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rewrite.yaml");
        fs::write(
            &path,
            "search: 'C:\\old'\nextensions: ['.py', '.txt']\nbackup: true\n",
        )
        .unwrap();

        let cfg = ConfigLoader::load_rewrite_config(&path).unwrap();
        assert_eq!(cfg.search.as_deref(), Some("C:\\old"));
        assert_eq!(cfg.replace, None);
        assert_eq!(cfg.extensions, Some(vec![".py".to_string(), ".txt".to_string()]));
        assert_eq!(cfg.backup, Some(true));
        assert_eq!(cfg.rename_paths, None);
    }

    #[test]
    fn test_find_config_relative_to_working_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pathrewrite-test-config.yaml");
        fs::write(&path, "search: x\n").unwrap();

        let found =
            ConfigLoader::find_config(Path::new("pathrewrite-test-config.yaml"), temp_dir.path()).unwrap();
        assert_eq!(found, path);
    }

    #[test]
    fn test_find_config_reports_locations_tried() {
        let temp_dir = TempDir::new().unwrap();
        let err = ConfigLoader::find_config(Path::new("no-such-pathrewrite.yaml"), temp_dir.path())
            .unwrap_err();
        match err {
            Error::Config(msg) => {
                assert!(msg.contains("no-such-pathrewrite.yaml"));
                assert!(msg.contains(&temp_dir.path().display().to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.yaml");
        fs::write(&path, "extensions: {not: [a list\n").unwrap();
        assert!(matches!(ConfigLoader::load_rewrite_config(&path), Err(Error::Yaml(_))));
    }
}
