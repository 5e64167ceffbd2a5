use anyhow::{Context, Result};
use ledger_remote::einvoice::{DEFAULT_APP_ID, DEFAULT_ENDPOINT};
use ledger_remote::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use ledger_remote::{CarrierClient, GeminiConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

use crate::state::StateDir;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionSection,
    pub carrier: CarrierSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSection {
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CarrierSection {
    /// Use the fixed sample instead of calling the e-invoice API
    pub mock: bool,
    pub app_id: String,
    pub endpoint: String,
    pub mock_delay_ms: u64,
}

impl Default for ExtractionSection {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for CarrierSection {
    fn default() -> Self {
        Self {
            mock: true,
            app_id: DEFAULT_APP_ID.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            mock_delay_ms: 1500,
        }
    }
}

impl Config {
    pub fn gemini(&self, api_key: Option<String>) -> GeminiConfig {
        GeminiConfig {
            api_key,
            model: self.extraction.model.clone(),
            base_url: self.extraction.base_url.clone(),
        }
    }

    /// `force_live` overrides `carrier.mock`.
    pub fn carrier_client(&self, force_live: bool) -> CarrierClient {
        if self.carrier.mock && !force_live {
            CarrierClient::mock(Duration::from_millis(self.carrier.mock_delay_ms))
        } else {
            CarrierClient::live(&self.carrier.endpoint, &self.carrier.app_id)
        }
    }
}

pub fn load_config(state: &StateDir) -> Result<Config> {
    let p = state.config_path();
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(state: &StateDir, cfg: &Config) -> Result<()> {
    let p = state.config_path();
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config(state: &StateDir) -> Result<()> {
    let p = state.config_path();
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(state, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
