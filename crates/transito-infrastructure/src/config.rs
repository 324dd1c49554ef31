//! Application configuration loaded from `config.toml`.
//!
//! Every field has a default, so a missing file or a partial one is valid.
//! Relative `catalog_file` and `combo_file` paths resolve against `data_dir`.

use crate::paths::TransitoPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use transito_core::conversion::UnitConversionTable;
use transito_core::label::{DEFAULT_SKU_PREFIX, LabelGenerator};
use transito_core::line::LineRoster;
use transito_core::menus::Menus;
use transito_core::pin::PinPolicy;
use transito_core::session::{ChatId, ComboResolution, PipelineOptions};
use transito_core::{Result, TransitoError};

/// Environment variable holding the Telegram bot token.
pub const BOT_TOKEN_ENV: &str = "BOT_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub combo_resolution: ComboResolution,
    pub label_generation: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            combo_resolution: ComboResolution::Registry,
            label_generation: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub sku_prefix: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            sku_prefix: DEFAULT_SKU_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory for data files and logs. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
    pub catalog_file: PathBuf,
    pub combo_file: PathBuf,
    pub poll_timeout_secs: u64,
    pub session_ttl_secs: u64,
    pub sweep_interval_secs: u64,
    /// Chat that receives a copy of every shift summary.
    pub group_chat_id: Option<ChatId>,
    pub pipeline: PipelineConfig,
    pub label: LabelConfig,
    pub lines: LineRoster,
    pub products: Vec<String>,
    pub sizes: Vec<String>,
    pub markets: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let menus = Menus::default();
        Self {
            data_dir: None,
            catalog_file: PathBuf::from("catalogo_skus.json"),
            combo_file: PathBuf::from("config_turno.json"),
            poll_timeout_secs: 25,
            session_ttl_secs: 7200,
            sweep_interval_secs: 300,
            group_chat_id: None,
            pipeline: PipelineConfig::default(),
            label: LabelConfig::default(),
            lines: LineRoster::default(),
            products: menus.products,
            sizes: menus.sizes,
            markets: menus.markets,
        }
    }
}

impl AppConfig {
    /// The explicit `path`, or the platform config file when `None`.
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => TransitoPaths::config_file().map_err(|e| TransitoError::config(e.to_string())),
        }
    }

    /// Loads the config from `path`, or from the platform config file when `None`.
    ///
    /// A missing file yields the defaults; a malformed one is an error. Runs
    /// before logging is set up, so callers report the outcome themselves.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
            .map_err(|e| TransitoError::config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        if config.lines.is_empty() {
            return Err(TransitoError::config("at least one filling line is required"));
        }
        Ok(config)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| TransitoPaths::data_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.resolve(&self.catalog_file)
    }

    pub fn combo_path(&self) -> PathBuf {
        self.resolve(&self.combo_file)
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir().join(file)
        }
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Never zero: a zero sweep interval would spin.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn menus(&self) -> Menus {
        Menus {
            products: self.products.clone(),
            sizes: self.sizes.clone(),
            markets: self.markets.clone(),
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            combo_resolution: self.pipeline.combo_resolution,
            label_generation: self.pipeline.label_generation,
            broadcast_chat: self.group_chat_id,
        }
    }

    pub fn label_generator(&self) -> LabelGenerator {
        LabelGenerator::new(&self.label.sku_prefix)
    }

    /// Problems that would make some reports impossible, for the `check` command.
    pub fn diagnostics(&self, pins: &PinPolicy, table: &UnitConversionTable) -> Vec<String> {
        let mut problems = Vec::new();

        for size in &self.sizes {
            if pins.permitted(size).is_empty() {
                problems.push(format!("size {size} has no permitted pin"));
            }
            for pin in pins.permitted(size) {
                if !table.is_supported(size, pin) {
                    problems.push(format!("size {size} with pin {pin} converts to 0 boxes"));
                }
            }
        }

        for line in self.lines.iter() {
            if let Some(size) = &line.fixed_size {
                if !self.sizes.contains(size) {
                    problems.push(format!("line {} fixes unknown size {size}", line.code));
                }
                if let Some(pin) = line.fixed_pin {
                    if !pins.is_valid(size, pin) {
                        problems.push(format!(
                            "line {} fixes pin {pin}, not permitted for {size}",
                            line.code
                        ));
                    }
                }
            }
            if let Some(market) = &line.fixed_market {
                if !self.markets.contains(market) {
                    problems.push(format!("line {} fixes unknown market {market}", line.code));
                }
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use transito_core::pin::PinSize;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.poll_timeout(), Duration::from_secs(25));
        assert_eq!(config.session_ttl(), Duration::from_secs(7200));
        assert_eq!(config.label_generator().sku_prefix(), "6173");
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let config = AppConfig::from_toml(
            r#"
            data_dir = "/srv/transito"
            group_chat_id = -1001234
            combo_file = "/etc/transito/combos.json"

            [pipeline]
            combo_resolution = "manual"

            [[lines]]
            code = "L7"
            letter = "F"
            fixed_pin = "grande"
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog_path(), PathBuf::from("/srv/transito/catalogo_skus.json"));
        assert_eq!(config.combo_path(), PathBuf::from("/etc/transito/combos.json"));
        let options = config.pipeline_options();
        assert_eq!(options.combo_resolution, ComboResolution::Manual);
        assert!(options.label_generation);
        assert_eq!(options.broadcast_chat, Some(-1001234));
        assert_eq!(config.lines.codes().collect::<Vec<_>>(), vec!["L7"]);
        assert_eq!(config.lines.get("L7").unwrap().fixed_pin, Some(PinSize::Large));
    }

    #[test]
    fn empty_roster_is_rejected() {
        assert!(AppConfig::from_toml("lines = []").is_err());
    }

    #[test]
    fn load_reads_file_and_tolerates_absence() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        assert_eq!(AppConfig::resolve_path(Some(&path)).unwrap(), path);
        assert_eq!(AppConfig::load(Some(&path)).unwrap(), AppConfig::default());

        std::fs::write(&path, "poll_timeout_secs = 5\n").unwrap();
        assert_eq!(AppConfig::load(Some(&path)).unwrap().poll_timeout_secs, 5);

        std::fs::write(&path, "poll_timeout_secs = \"soon\"\n").unwrap();
        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, TransitoError::Config(_)));
    }

    #[test]
    fn diagnostics_flag_inconsistent_lines() {
        let mut config = AppConfig::default();
        config.lines = LineRoster::new(vec![
            transito_core::line::FillingLine::new("M3")
                .with_fixed_pin(PinSize::Large)
                .with_fixed_size("8oz")
                .with_fixed_market("EU"),
        ]);

        let problems = config.diagnostics(&PinPolicy::default(), &UnitConversionTable::default());
        assert!(problems.iter().any(|p| p.contains("fixes pin grande")));
        assert!(problems.iter().any(|p| p.contains("unknown market EU")));
    }

    #[test]
    fn default_tables_have_no_diagnostics() {
        let config = AppConfig::default();
        assert!(
            config
                .diagnostics(&PinPolicy::default(), &UnitConversionTable::default())
                .is_empty()
        );
    }
}
