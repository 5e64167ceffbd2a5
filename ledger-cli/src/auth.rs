use anyhow::{Result, bail};
use std::io::{self, Write};

use crate::state::StateDir;

/// Fallback when the `api-key` slot is empty
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// y/N question; anything but y/yes is no
pub fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(&format!("{question} [y/N]"))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

/// Stored key first, then the environment
pub fn resolve_api_key(state: &StateDir) -> Result<Option<String>> {
    if let Some(key) = state.load_api_key()? {
        return Ok(Some(key));
    }
    Ok(std::env::var(API_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty()))
}

pub fn paste_api_key(state: &StateDir) -> Result<()> {
    let key = prompt("Paste Gemini API key")?;
    if key.is_empty() {
        bail!("no key entered; nothing saved");
    }
    state.save_api_key(&key)?;
    println!("Saved API key to {}", state.api_key_path().display());
    Ok(())
}
