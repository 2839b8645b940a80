use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_PREFIX: &str = "NORMFORGE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Substrings that mark a number field as the specimen count.
    pub quantity_keywords: Vec<String>,
    /// Upper bound on specimen rows read back from a flat map.
    pub max_specimens: usize,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quantity_keywords: vec!["qty".into(), "cantidad".into(), "número".into()],
            max_specimens: 500,
            log: LogSettings::default(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

impl EngineConfig {
    /// Defaults, then the optional file, then `NORMFORGE_*` variables
    /// (`__` separates nested keys, e.g. `NORMFORGE_LOG__LEVEL`).
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let defaults = config::Config::try_from(&EngineConfig::default())
            .context("failed to serialise default configuration")?;

        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: EngineConfig = builder
            .build()
            .context("failed to read configuration sources")?
            .try_deserialize()
            .context("invalid configuration")?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_specimens == 0 {
            anyhow::bail!("max_specimens must be at least 1");
        }
        if self.quantity_keywords.iter().any(|k| k.trim().is_empty()) {
            anyhow::bail!("quantity_keywords must not contain blank entries");
        }
        Ok(())
    }
}
