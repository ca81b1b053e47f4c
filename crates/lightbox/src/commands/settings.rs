use anyhow::Result;
use serde_json::Value;

use fusion_runtime::SettingsStore;

use crate::config::{expand_path, Config};

pub fn get(config: &Config, key: &str) -> Result<()> {
    let store = SettingsStore::new(expand_path(&config.paths.settings_file));
    match store.get(key) {
        Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        None => println!("(unset)"),
    }
    Ok(())
}

pub fn set(config: &Config, key: &str, raw: &str) -> Result<()> {
    let store = SettingsStore::new(expand_path(&config.paths.settings_file));
    // JSON if it parses, bare string otherwise
    let value: Value =
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    store.set(key, value)?;
    println!("Set {}.", key);
    Ok(())
}
