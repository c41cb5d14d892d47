use std::path::{Path, PathBuf};

use anyhow::Result;
use config::{Config, File};
use openfest_core::ParseOptions;
use serde::Deserialize;

fn default_parallel() -> bool {
    true
}

/// Global configuration at ~/.config/openfest/config.toml
///
/// Every key is optional; command-line flags win over the file.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    #[serde(default)]
    pub fail_fast: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            parallel: default_parallel(),
            fail_fast: false,
        }
    }
}

impl CliConfig {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("openfest");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// A missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: CliConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    pub fn parse_options(&self, fail_fast: bool, sequential: bool) -> ParseOptions {
        ParseOptions {
            parallel: self.parallel && !sequential,
            fail_fast: self.fail_fast || fail_fast,
        }
    }
}
