use anyhow::{Context, Result};
use ledger_remote::{ScriptConfig, SheetClient};

use crate::state::StateDir;

/// Store the sheet URL only after a successful connection test.
pub async fn set_sheet(state: &StateDir, sheet: &SheetClient, url: &str) -> Result<ScriptConfig> {
    let url = url.trim();
    sheet
        .check_connection(url)
        .await
        .with_context(|| format!("connection test against {url} failed; config not saved"))?;

    let cfg = ScriptConfig::new(url);
    state.save_script_config(&cfg)?;
    Ok(cfg)
}
