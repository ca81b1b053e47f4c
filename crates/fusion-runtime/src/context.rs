//! Shared services injected into every module at load time.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::components::ComponentRegistry;
use crate::compute::ComputeClient;
use crate::services::{PromptAssistant, ResourceMonitor};
use crate::settings::SettingsStore;
use crate::transfer::TransferRegistry;

/// Service bundle handed to every module factory.
///
/// Built once by the host before any module loads, shared by reference and
/// immutable afterwards; it outlives all modules. Modules must not assume
/// the compute backend or the auxiliary services are present.
pub struct SharedContext {
    /// Backend compute client; `None` when the startup probe failed.
    pub compute: Option<Arc<ComputeClient>>,
    pub app_dir: PathBuf,
    pub models_dir: PathBuf,
    pub outputs_dir: PathBuf,
    pub workflows_dir: PathBuf,
    pub settings: Arc<SettingsStore>,
    pub prompt_assistant: Option<Arc<dyn PromptAssistant>>,
    pub resource_monitor: Option<Arc<dyn ResourceMonitor>>,
    pub transfers: Arc<TransferRegistry>,
    pub components: Arc<ComponentRegistry>,
}

impl SharedContext {
    /// Context with fresh registries, no compute backend and no auxiliary
    /// services. The host fills in the optional handles it managed to
    /// construct.
    pub fn new(
        app_dir: PathBuf,
        models_dir: PathBuf,
        outputs_dir: PathBuf,
        workflows_dir: PathBuf,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self {
            compute: None,
            app_dir,
            models_dir,
            outputs_dir,
            workflows_dir,
            settings,
            prompt_assistant: None,
            resource_monitor: None,
            transfers: Arc::new(TransferRegistry::new()),
            components: Arc::new(ComponentRegistry::new()),
        }
    }

    /// Current outputs directory, honoring an absolute `outputs_dir`
    /// settings override. Creates the directory if needed; relative
    /// overrides are ignored.
    pub fn effective_outputs_dir(&self) -> Result<PathBuf> {
        if let Some(custom) = self.settings.get("outputs_dir") {
            if let Some(path) = custom.as_str().map(PathBuf::from) {
                if path.is_absolute() {
                    std::fs::create_dir_all(&path).with_context(|| {
                        format!("Failed to create outputs directory {:?}", path)
                    })?;
                    return Ok(path);
                }
            }
        }
        std::fs::create_dir_all(&self.outputs_dir)
            .with_context(|| format!("Failed to create outputs directory {:?}", self.outputs_dir))?;
        Ok(self.outputs_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context_in(dir: &tempfile::TempDir) -> SharedContext {
        let root = dir.path().to_path_buf();
        let settings = Arc::new(SettingsStore::new(root.join("ui_settings.json")));
        SharedContext::new(
            root.clone(),
            root.join("models"),
            root.join("outputs"),
            root.join("workflows"),
            settings,
        )
    }

    #[test]
    fn test_effective_outputs_dir_default() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(&dir);

        let outputs = ctx.effective_outputs_dir().unwrap();
        assert_eq!(outputs, dir.path().join("outputs"));
        assert!(outputs.is_dir());
    }

    #[test]
    fn test_effective_outputs_dir_absolute_override() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(&dir);

        let custom = dir.path().join("elsewhere");
        ctx.settings
            .set("outputs_dir", json!(custom.to_string_lossy()))
            .unwrap();

        assert_eq!(ctx.effective_outputs_dir().unwrap(), custom);
        assert!(custom.is_dir());
    }

    #[test]
    fn test_effective_outputs_dir_relative_override_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(&dir);
        ctx.settings.set("outputs_dir", json!("relative/path")).unwrap();

        assert_eq!(ctx.effective_outputs_dir().unwrap(), dir.path().join("outputs"));
    }
}
