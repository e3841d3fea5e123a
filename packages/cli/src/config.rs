use a2ui_interpreter::ProcessorOptions;
use a2ui_protocol::DEFAULT_SURFACE_ID;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "a2ui.config.json";

/// How `render` prints resolved trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Outline,
}

/// `a2ui.config.json`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Surface that receives messages without a `surfaceId`
    pub default_surface_id: String,

    /// Parse data-model strings that look like JSON
    pub parse_json_strings: bool,

    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,

    pub output_format: OutputFormat,
}

impl Config {
    /// Load config from a directory, falling back to defaults
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|err| anyhow::anyhow!("Invalid {}: {}", config_path.display(), err))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn processor_options(&self) -> ProcessorOptions {
        ProcessorOptions {
            parse_json_strings: self.parse_json_strings,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_surface_id: DEFAULT_SURFACE_ID.to_string(),
            parse_json_strings: true,
            log_level: "warn".to_string(),
            output_format: OutputFormat::Json,
        }
    }
}
