use anyhow::{Context, Result};
use ledger_core::Ledger;
use ledger_remote::ScriptConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the default state directory
pub const HOME_ENV: &str = "LEDGER_HOME";

pub fn ledger_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(HOME_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".smart-ledger"))
}

/// The local state slots: expense snapshot, sheet config, API key, and
/// the config file. Everything is read and written through here.
#[derive(Debug, Clone)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn open_default() -> Result<Self> {
        let dir = Self::new(ledger_home()?);
        dir.ensure()?;
        Ok(dir)
    }

    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root).with_context(|| format!("create {}", self.root.display()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn expenses_path(&self) -> PathBuf {
        self.root.join("expenses.json")
    }

    pub fn script_config_path(&self) -> PathBuf {
        self.root.join("script-config.json")
    }

    pub fn api_key_path(&self) -> PathBuf {
        self.root.join("api-key")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// A missing snapshot is an empty ledger. A corrupt one is an error, so
    /// the next save cannot silently overwrite it.
    pub fn load_ledger(&self) -> Result<Ledger> {
        let p = self.expenses_path();
        if !p.exists() {
            return Ok(Ledger::new());
        }
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        Ledger::from_json(&s).with_context(|| format!("parse {}", p.display()))
    }

    /// Replace the whole snapshot
    pub fn save_ledger(&self, ledger: &Ledger) -> Result<()> {
        let json = ledger.to_json()?;
        write_atomic(&self.expenses_path(), &json)
    }

    pub fn load_script_config(&self) -> Result<Option<ScriptConfig>> {
        let p = self.script_config_path();
        if !p.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        let cfg: ScriptConfig =
            serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
        Ok(Some(cfg).filter(|c| !c.script_url.trim().is_empty()))
    }

    pub fn save_script_config(&self, cfg: &ScriptConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(cfg)?;
        write_atomic(&self.script_config_path(), &json)
    }

    /// Returns whether a config was present
    pub fn clear_script_config(&self) -> Result<bool> {
        let p = self.script_config_path();
        if !p.exists() {
            return Ok(false);
        }
        fs::remove_file(&p).with_context(|| format!("remove {}", p.display()))?;
        Ok(true)
    }

    pub fn load_api_key(&self) -> Result<Option<String>> {
        let p = self.api_key_path();
        if !p.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        let key = s.trim().to_string();
        Ok(if key.is_empty() { None } else { Some(key) })
    }

    pub fn save_api_key(&self, key: &str) -> Result<()> {
        write_atomic(&self.api_key_path(), key.trim())
    }
}

/// Write to a sibling temp file, then rename over the target. A crash
/// mid-write leaves the previous file intact.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::{Category, ExpenseDraft};

    #[test]
    fn test_missing_slots_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateDir::new(dir.path());
        assert!(state.load_ledger().unwrap().is_empty());
        assert!(state.load_script_config().unwrap().is_none());
        assert!(state.load_api_key().unwrap().is_none());
        assert!(!state.clear_script_config().unwrap());
    }

    #[test]
    fn test_ledger_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateDir::new(dir.path());

        let mut ledger = Ledger::new();
        ledger
            .commit(vec![
                ExpenseDraft::new("2024-06-02", "60", Category::Transport, "捷運", "台北捷運"),
                ExpenseDraft::new("2024-06-01", "12.5", Category::Food, "coffee", ""),
            ])
            .unwrap();
        state.save_ledger(&ledger).unwrap();

        let back = state.load_ledger().unwrap();
        assert_eq!(back, ledger);
        assert_eq!(back.expenses()[0].description, "捷運");
        assert!(!dir.path().join("expenses.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateDir::new(dir.path());
        fs::write(state.expenses_path(), "{not json").unwrap();
        assert!(state.load_ledger().is_err());
    }

    #[test]
    fn test_script_config_and_key_slots() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateDir::new(dir.path());

        state.save_script_config(&ScriptConfig::new("https://script.example/exec")).unwrap();
        let raw = fs::read_to_string(state.script_config_path()).unwrap();
        assert!(raw.contains("\"scriptUrl\""));
        assert_eq!(
            state.load_script_config().unwrap().unwrap().script_url,
            "https://script.example/exec"
        );
        assert!(state.clear_script_config().unwrap());
        assert!(state.load_script_config().unwrap().is_none());

        state.save_api_key("  secret-key \n").unwrap();
        assert_eq!(state.load_api_key().unwrap().as_deref(), Some("secret-key"));
    }
}
