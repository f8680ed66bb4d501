use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinningConfig {
    #[serde(default = "default_bins")]
    pub target_bin_count: usize,
    #[serde(default = "default_closed_last_bin")]
    pub closed_last_bin: bool,
    #[serde(default = "default_degenerate_width")]
    pub degenerate_width: Decimal, // bin width used when every x is identical
}

fn default_bins() -> usize {
    10
}
fn default_closed_last_bin() -> bool {
    true
}
fn default_degenerate_width() -> Decimal {
    Decimal::ONE
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            target_bin_count: default_bins(),
            closed_last_bin: default_closed_last_bin(),
            degenerate_width: default_degenerate_width(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    #[serde(default)]
    pub label_precision: Option<u32>, // exact normalized decimal when None
    #[serde(default)]
    pub dependent_label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_format() -> String {
    "json".into()
}
fn default_output_dir() -> String {
    ".".into()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub binning: BinningConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        if let Ok(env_path) = std::env::var("BINLENS_CONFIG") {
            return PathBuf::from(env_path); // $BINLENS_CONFIG overrides default config path
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("binlens")
            .join("config.toml")
    }

    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::BinLensError::Config(e.to_string()))
    }

    pub fn save(&self) -> crate::Result<PathBuf> {
        let path = Self::config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::BinLensError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg.binning.target_bin_count, 10);
        assert!(cfg.binning.closed_last_bin);
        assert_eq!(cfg.binning.degenerate_width, Decimal::ONE);
        assert_eq!(cfg.export.format, "json");
        assert!(cfg.display.label_precision.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = Config::parse(
            "[binning]\ntarget_bin_count = 20\ndegenerate_width = \"0.5\"\n[display]\nlabel_precision = 2\n",
        )
        .unwrap();
        assert_eq!(cfg.binning.target_bin_count, 20);
        assert!(cfg.binning.closed_last_bin);
        assert_eq!(cfg.binning.degenerate_width, Decimal::from_str("0.5").unwrap());
        assert_eq!(cfg.display.label_precision, Some(2));
        assert_eq!(cfg.export.output_dir, ".");
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = Config::parse("[binning\n").unwrap_err();
        assert!(matches!(err, crate::BinLensError::Config(_)));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.binning.target_bin_count = 7;
        cfg.binning.closed_last_bin = false;
        cfg.display.dependent_label = Some("deposit".into());
        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.binning.target_bin_count, 7);
        assert!(!loaded.binning.closed_last_bin);
        assert_eq!(loaded.display.dependent_label.as_deref(), Some("deposit"));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.binning.target_bin_count, 10);
    }
}
