use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

const HOME_ENV_VAR: &str = "DAYPLAN_HOME";

/// `$DAYPLAN_HOME` if set, else `~/.dayplan`.
pub fn dayplan_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(HOME_ENV_VAR)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".dayplan"))
}

pub fn ensure_dayplan_home() -> Result<PathBuf> {
    let dir = dayplan_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Key/value file holding today's checkmarks.
pub fn completion_state_path() -> Result<PathBuf> {
    Ok(ensure_dayplan_home()?.join("completion.json"))
}
