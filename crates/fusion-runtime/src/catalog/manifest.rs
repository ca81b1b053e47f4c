use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// How a module's factory is provided.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Factory registered in the host's compiled-in registry.
    Builtin,
    /// Shared library exporting `_module_create`.
    Native,
}

/// Module manifest (parsed from module.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleManifest {
    pub name: String,
    pub api_version: u32,
    #[serde(default = "default_kind")]
    pub kind: ModuleKind,
    /// Native: library path relative to the manifest dir. Builtin: factory
    /// name in the compiled-in registry, defaulting to `name`.
    #[serde(default)]
    pub entry_point: Option<String>,
    /// Tab identifier; defaults to `name`.
    #[serde(default)]
    pub tab_id: Option<String>,
    /// Display label; defaults to a humanized `name`.
    #[serde(default)]
    pub label: Option<String>,
    /// Sort key; defaults to the host's tab-order list.
    #[serde(default)]
    pub order: Option<i64>,
    /// Free-form configuration passed to `Module::init`.
    #[serde(default)]
    pub config: serde_json::Value,
}

fn default_kind() -> ModuleKind {
    ModuleKind::Native
}

impl ModuleManifest {
    /// Load manifest from a module.toml file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read module manifest: {:?}", path))?;
        let manifest: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
        Ok(manifest)
    }

    /// Builtin factory name: `entry_point` when given, else the module name.
    pub fn factory_name(&self) -> &str {
        self.entry_point.as_deref().unwrap_or(&self.name)
    }

    /// Native entry point resolved against the manifest directory.
    pub fn resolve_entry_point(&self, manifest_dir: &Path, entry_point: &str) -> PathBuf {
        manifest_dir.join(entry_point)
    }
}

/// Scan a directory for module manifests. Directories whose name starts
/// with `_` are reserved as private and skipped; a manifest that fails to
/// parse is logged and skipped, never aborting the scan. Results come back
/// sorted by name so discovery is independent of filesystem enumeration
/// order.
pub fn discover_manifests(modules_dir: &Path) -> Result<Vec<(ModuleManifest, PathBuf)>> {
    let mut found = Vec::new();

    if !modules_dir.exists() {
        tracing::warn!(path = ?modules_dir, "Modules directory does not exist");
        return Ok(found);
    }

    for entry in std::fs::read_dir(modules_dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('_') {
            continue;
        }
        let manifest_path = entry.path().join("module.toml");
        if !manifest_path.exists() {
            continue;
        }
        match ModuleManifest::load(&manifest_path) {
            Ok(manifest) => found.push((manifest, entry.path())),
            Err(e) => {
                tracing::warn!(path = ?manifest_path, error = %e, "Skipping invalid module manifest");
            }
        }
    }

    found.sort_by(|a, b| a.0.name.cmp(&b.0.name));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_manifest(dir: &Path, name: &str, body: &str) {
        let module_dir = dir.join(name);
        std::fs::create_dir_all(&module_dir).unwrap();
        let mut f = std::fs::File::create(module_dir.join("module.toml")).unwrap();
        write!(f, "{}", body).unwrap();
    }

    #[test]
    fn test_parse_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("module.toml");
        std::fs::write(
            &manifest_path,
            r#"
name = "upscale"
api_version = 1
kind = "builtin"
label = "🔍 Upscale"

[config]
default_scale = 2
"#,
        )
        .unwrap();

        let manifest = ModuleManifest::load(&manifest_path).unwrap();
        assert_eq!(manifest.name, "upscale");
        assert_eq!(manifest.api_version, 1);
        assert_eq!(manifest.kind, ModuleKind::Builtin);
        assert_eq!(manifest.label.as_deref(), Some("🔍 Upscale"));
        assert_eq!(manifest.config["default_scale"], 2);
        assert_eq!(manifest.factory_name(), "upscale");
    }

    #[test]
    fn test_kind_defaults_to_native() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("module.toml");
        std::fs::write(
            &manifest_path,
            "name = \"video\"\napi_version = 1\nentry_point = \"./libvideo.so\"\n",
        )
        .unwrap();

        let manifest = ModuleManifest::load(&manifest_path).unwrap();
        assert_eq!(manifest.kind, ModuleKind::Native);
        assert_eq!(
            manifest.resolve_entry_point(dir.path(), "./libvideo.so"),
            dir.path().join("./libvideo.so")
        );
    }

    #[test]
    fn test_discover_skips_private_and_broken() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "upscale", "name = \"upscale\"\napi_version = 1\n");
        write_manifest(dir.path(), "_private", "name = \"private\"\napi_version = 1\n");
        write_manifest(dir.path(), "broken", "name = [this is not toml");
        // A directory with no manifest at all is not a candidate
        std::fs::create_dir_all(dir.path().join("assets")).unwrap();

        let found = discover_manifests(dir.path()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0.name, "upscale");
    }

    #[test]
    fn test_discover_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "zimage", "name = \"zimage\"\napi_version = 1\n");
        write_manifest(dir.path(), "upscale", "name = \"upscale\"\napi_version = 1\n");

        let names: Vec<String> = discover_manifests(dir.path())
            .unwrap()
            .into_iter()
            .map(|(m, _)| m.name)
            .collect();
        assert_eq!(names, vec!["upscale", "zimage"]);
    }

    #[test]
    fn test_discover_nonexistent_dir() {
        let found = discover_manifests(Path::new("/nonexistent")).unwrap();
        assert!(found.is_empty());
    }
}
