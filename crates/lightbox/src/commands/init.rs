use anyhow::Result;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# Fusion Studio Configuration

[paths]
app_dir = "."
models_dir = "./models"
outputs_dir = "./outputs"
workflows_dir = "./workflows"
modules_dir = "./modules"
settings_file = "./ui_settings.json"

[compute]
url = "http://127.0.0.1:8188"
enabled = true

[ui]
tab_order = ["zimage", "upscale", "llm_settings", "app_settings"]
"#;

/// Initialize a new config file
pub fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config already exists at {:?}", path);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_CONFIG)?;
    println!("Created config at {:?}", path);
    Ok(())
}
