use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Icon sizes embedded in a converted `.ico`, largest first.
pub const DEFAULT_ICON_SIZES: [u32; 5] = [256, 64, 48, 32, 16];

/// Top-level configuration for folder-icon.
///
/// Controls how non-icon images are converted and how the Windows shell
/// attributes are applied.
///
/// # Loading
///
/// ```rust,no_run
/// use folder_icon::config::{Config, ConverterBackend};
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.converter.backend = ConverterBackend::Builtin;
/// config.converter.search_path.push(r"C:\Program Files\ImageMagick".into());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Image-to-icon conversion settings.
    pub converter: ConverterConfig,
    /// Attribute and short-path settings.
    pub shell: ShellConfig,
}

/// Which converter turns a non-icon image into an `.ico`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterBackend {
    /// Run ImageMagick (`magick`) as a subprocess.
    #[default]
    Magick,
    /// Encode the icon in-process with the `image` crate.
    Builtin,
}

/// Conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub backend: ConverterBackend,
    /// Program name or full path of the external converter.
    pub program: String,
    /// Directories prepended to `PATH` for the converter process only.
    pub search_path: Vec<PathBuf>,
    /// Frame sizes written into the icon.
    pub sizes: Vec<u32>,
}

/// Settings for the attribute step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Program used to toggle hidden/system/read-only flags.
    pub attrib_program: String,
    /// Embed the 8.3 short form of the icon path in `desktop.ini` when available.
    pub short_paths: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            backend: ConverterBackend::Magick,
            program: "magick".to_string(),
            search_path: Vec::new(),
            sizes: DEFAULT_ICON_SIZES.to_vec(),
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            attrib_program: "attrib".to_string(),
            short_paths: true,
        }
    }
}

impl Config {
    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = Config::default();
        assert_eq!(config.converter.backend, ConverterBackend::Magick);
        assert_eq!(config.converter.program, "magick");
        assert_eq!(config.converter.sizes, vec![256, 64, 48, 32, 16]);
        assert!(config.converter.search_path.is_empty());
        assert_eq!(config.shell.attrib_program, "attrib");
        assert!(config.shell.short_paths);
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.converter.backend = ConverterBackend::Builtin;
        config.converter.search_path = vec![PathBuf::from("/opt/magick/bin")];
        config.shell.short_paths = false;
        config.save(Some(&path)).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.converter.backend, ConverterBackend::Builtin);
        assert_eq!(loaded.converter.search_path, vec![PathBuf::from("/opt/magick/bin")]);
        assert!(!loaded.shell.short_paths);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(config.converter.program, "magick");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "converter": { "backend": "builtin" } }"#).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.converter.backend, ConverterBackend::Builtin);
        assert_eq!(config.converter.sizes, DEFAULT_ICON_SIZES.to_vec());
        assert_eq!(config.shell.attrib_program, "attrib");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
