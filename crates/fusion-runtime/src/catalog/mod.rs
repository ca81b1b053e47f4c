//! Module discovery and loading.
//!
//! One pass at startup: scan the modules directory for manifests, resolve
//! each unit's factory (compiled-in registry or shared library), assign a
//! deterministic presentation order and instantiate every survivor with the
//! shared context. Every per-module failure is isolated: one broken module
//! never takes down discovery of the rest.

pub mod ffi;
pub mod manifest;
pub mod module;

pub use ffi::ModuleHandle;
pub use manifest::{discover_manifests, ModuleKind, ModuleManifest};
pub use module::{Module, TabView};

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use dashmap::DashMap;
use tracing::{debug, error, info, warn};

use crate::context::SharedContext;

/// Current API version modules must match
pub const CURRENT_API_VERSION: u32 = 1;

/// Tab ordering: modules named here present in this order; unknown modules
/// sort after them, roughly alphabetically.
pub const DEFAULT_TAB_ORDER: &[&str] = &["zimage", "upscale", "llm_settings", "app_settings"];

/// Factory for modules compiled into the host.
pub type BuiltinFactory = Arc<dyn Fn() -> Box<dyn Module> + Send + Sync>;

/// The loadable unit behind a descriptor, its factory already resolved.
enum ModuleUnit {
    Builtin(BuiltinFactory),
    Native(ModuleHandle),
}

/// Validated metadata for one discovered module. Never constructed for a
/// unit whose factory failed to resolve.
pub struct ModuleDescriptor {
    pub name: String,
    pub tab_id: String,
    pub label: String,
    pub order: i64,
    config: serde_json::Value,
    unit: ModuleUnit,
}

/// A successfully instantiated module tab.
///
/// Field order is load-bearing: `view` may hold closures whose code lives
/// in the module's library, so it must drop before `module` does.
pub struct LoadedTab {
    pub name: String,
    pub tab_id: String,
    pub label: String,
    pub order: i64,
    pub view: TabView,
    module: ModuleInstance,
}

impl LoadedTab {
    /// The live module instance behind this tab.
    pub fn module(&self) -> &dyn Module {
        match &self.module {
            ModuleInstance::Builtin(module) => module.as_ref(),
            ModuleInstance::Native(handle) => handle.module(),
        }
    }
}

/// Keeps the module object (and for native modules its library) alive for
/// the lifetime of the tab.
enum ModuleInstance {
    Builtin(Box<dyn Module>),
    Native(ModuleHandle),
}

/// Module catalog: discovers, validates, orders and instantiates modules.
pub struct ModuleCatalog {
    builtins: DashMap<String, BuiltinFactory>,
    tab_order: Vec<String>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::with_tab_order(DEFAULT_TAB_ORDER.iter().map(|s| s.to_string()).collect())
    }

    pub fn with_tab_order(tab_order: Vec<String>) -> Self {
        Self {
            builtins: DashMap::new(),
            tab_order,
        }
    }

    /// Register a compiled-in module factory under a name that builtin
    /// manifests can reference as their entry point.
    pub fn register_builtin<F>(&self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Module> + Send + Sync + 'static,
    {
        self.builtins.insert(name.to_string(), Arc::new(factory));
        debug!(factory = name, "Registered builtin module factory");
    }

    /// Scan, load and validate: one descriptor per unit whose factory
    /// resolved and whose API version matches. Broken candidates are
    /// logged and skipped; the pass itself always succeeds. Descriptors
    /// come back sorted by `(order, name)`.
    pub fn discover(&self, modules_dir: &Path) -> Vec<ModuleDescriptor> {
        let candidates = match discover_manifests(modules_dir) {
            Ok(candidates) => candidates,
            Err(e) => {
                error!(path = ?modules_dir, error = %e, "Module scan failed");
                return Vec::new();
            }
        };

        let mut descriptors = Vec::new();

        for (manifest, dir) in candidates {
            if manifest.api_version != CURRENT_API_VERSION {
                warn!(
                    module = %manifest.name,
                    module_api = manifest.api_version,
                    host_api = CURRENT_API_VERSION,
                    "Module API version mismatch, skipping"
                );
                continue;
            }

            let unit = match manifest.kind {
                ModuleKind::Builtin => match self.builtins.get(manifest.factory_name()) {
                    Some(factory) => ModuleUnit::Builtin(factory.value().clone()),
                    None => {
                        debug!(
                            module = %manifest.name,
                            factory = manifest.factory_name(),
                            "No registered factory, not a tab module, skipping"
                        );
                        continue;
                    }
                },
                ModuleKind::Native => {
                    let entry = match manifest.entry_point.as_deref() {
                        Some(entry) => manifest.resolve_entry_point(&dir, entry),
                        None => {
                            warn!(module = %manifest.name, "Native module has no entry_point, skipping");
                            continue;
                        }
                    };
                    if !entry.exists() {
                        error!(module = %manifest.name, entry = ?entry, "Module entry point not found, skipping");
                        continue;
                    }
                    match ModuleHandle::load(&entry) {
                        Ok(Some(handle)) => ModuleUnit::Native(handle),
                        Ok(None) => {
                            debug!(
                                module = %manifest.name,
                                entry = ?entry,
                                "No _module_create export, not a tab module, skipping"
                            );
                            continue;
                        }
                        Err(e) => {
                            error!(module = %manifest.name, error = %e, "Failed to load module library, skipping");
                            continue;
                        }
                    }
                }
            };

            let descriptor = self.describe(manifest, unit);
            info!(
                module = %descriptor.name,
                tab_id = %descriptor.tab_id,
                order = descriptor.order,
                "Discovered module"
            );
            descriptors.push(descriptor);
        }

        descriptors.sort_by(|a, b| (a.order, a.name.as_str()).cmp(&(b.order, b.name.as_str())));
        descriptors
    }

    /// Invoke each descriptor's factory with the shared context, in the
    /// order given. A factory that errors or panics drops only that module
    /// from the presented set.
    pub fn instantiate(
        &self,
        descriptors: Vec<ModuleDescriptor>,
        ctx: &SharedContext,
    ) -> Vec<LoadedTab> {
        let mut loaded = Vec::new();

        for descriptor in descriptors {
            let name = descriptor.name.clone();
            match descriptor.into_tab(ctx) {
                Ok(tab) => {
                    info!(module = %name, tab = %tab.label, "Loaded module tab");
                    loaded.push(tab);
                }
                Err(e) => {
                    error!(module = %name, error = %e, "Failed to create module tab, skipping");
                }
            }
        }

        loaded
    }

    /// Discover and instantiate in one pass.
    pub fn load_all(&self, modules_dir: &Path, ctx: &SharedContext) -> Vec<LoadedTab> {
        let descriptors = self.discover(modules_dir);
        self.instantiate(descriptors, ctx)
    }

    fn describe(&self, manifest: ModuleManifest, unit: ModuleUnit) -> ModuleDescriptor {
        let order = manifest
            .order
            .unwrap_or_else(|| self.default_order(&manifest.name));
        ModuleDescriptor {
            tab_id: manifest.tab_id.clone().unwrap_or_else(|| manifest.name.clone()),
            label: manifest.label.clone().unwrap_or_else(|| humanize(&manifest.name)),
            order,
            config: manifest.config,
            name: manifest.name,
            unit,
        }
    }

    /// Sort key for a module name: its index in the configured tab order,
    /// or for unlisted names a coarse alphabetical slot after every listed
    /// one (collisions between unlisted modules are acceptable, the name
    /// tiebreak keeps the result deterministic).
    fn default_order(&self, name: &str) -> i64 {
        if let Some(index) = self.tab_order.iter().position(|n| n == name) {
            return index as i64;
        }
        let base = self.tab_order.len() as i64;
        match name.chars().next() {
            Some(first) => base + first as i64,
            None => base + 1000,
        }
    }
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleDescriptor {
    /// Run the module factory: construct, init with the manifest config,
    /// build the tab. Panics anywhere in the chain are contained.
    fn into_tab(self, ctx: &SharedContext) -> Result<LoadedTab> {
        let Self {
            name,
            tab_id,
            label,
            order,
            config,
            unit,
        } = self;

        let (view, module) = match unit {
            ModuleUnit::Builtin(factory) => {
                let result = catch_unwind(AssertUnwindSafe(|| {
                    let mut module = factory();
                    module.init(config)?;
                    let view = module.build(ctx)?;
                    Ok::<_, anyhow::Error>((view, module))
                }));
                match result {
                    Ok(Ok((view, module))) => (view, ModuleInstance::Builtin(module)),
                    Ok(Err(e)) => return Err(e),
                    Err(_) => return Err(anyhow!("Module '{}' panicked during tab construction", name)),
                }
            }
            ModuleUnit::Native(mut handle) => {
                let result = catch_unwind(AssertUnwindSafe(|| {
                    handle.module_mut().init(config)?;
                    handle.module().build(ctx)
                }));
                match result {
                    Ok(Ok(view)) => (view, ModuleInstance::Native(handle)),
                    Ok(Err(e)) => return Err(e),
                    Err(_) => return Err(anyhow!("Module '{}' panicked during tab construction", name)),
                }
            }
        };

        Ok(LoadedTab {
            name,
            tab_id,
            label,
            order,
            view,
            module,
        })
    }
}

/// "custom_x" -> "Custom X"
fn humanize(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsStore;
    use serde_json::Value;
    use std::io::Write;

    struct StubModule {
        name: String,
        fail_build: bool,
        panic_build: bool,
    }

    impl StubModule {
        fn named(name: &str) -> Self {
            Self {
                name: name.to_string(),
                fail_build: false,
                panic_build: false,
            }
        }
    }

    impl Module for StubModule {
        fn name(&self) -> &str {
            &self.name
        }

        fn api_version(&self) -> u32 {
            CURRENT_API_VERSION
        }

        fn build(&self, _ctx: &SharedContext) -> Result<TabView> {
            if self.panic_build {
                panic!("boom");
            }
            if self.fail_build {
                anyhow::bail!("build failed");
            }
            Ok(TabView::new(&self.name, &self.name))
        }
    }

    fn write_manifest(dir: &Path, module: &str, body: &str) {
        let module_dir = dir.join(module);
        std::fs::create_dir_all(&module_dir).unwrap();
        let mut f = std::fs::File::create(module_dir.join("module.toml")).unwrap();
        write!(f, "{}", body).unwrap();
    }

    fn builtin_manifest(name: &str) -> String {
        format!("name = \"{}\"\napi_version = 1\nkind = \"builtin\"\n", name)
    }

    fn test_context(dir: &tempfile::TempDir) -> SharedContext {
        let root = dir.path().to_path_buf();
        SharedContext::new(
            root.clone(),
            root.join("models"),
            root.join("outputs"),
            root.join("workflows"),
            std::sync::Arc::new(SettingsStore::new(root.join("ui_settings.json"))),
        )
    }

    #[test]
    fn test_default_order_listed_and_unlisted() {
        let catalog = ModuleCatalog::new();
        assert_eq!(catalog.default_order("zimage"), 0);
        assert_eq!(catalog.default_order("upscale"), 1);
        assert_eq!(catalog.default_order("app_settings"), 3);
        // Unlisted names land after every listed one
        assert!(catalog.default_order("custom_x") >= DEFAULT_TAB_ORDER.len() as i64);
        assert_eq!(catalog.default_order(""), DEFAULT_TAB_ORDER.len() as i64 + 1000);
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("custom_x"), "Custom X");
        assert_eq!(humanize("app_settings"), "App Settings");
        assert_eq!(humanize("face-restore"), "Face Restore");
        assert_eq!(humanize("zimage"), "Zimage");
    }

    #[test]
    fn test_discover_one_valid_of_three_broken_candidates() {
        let dir = tempfile::tempdir().unwrap();
        // Fails during load: unparseable manifest
        write_manifest(dir.path(), "broken", "name = [not toml");
        // No factory entry point: builtin name never registered
        write_manifest(dir.path(), "plain", &builtin_manifest("plain"));
        // Valid
        write_manifest(dir.path(), "upscale", &builtin_manifest("upscale"));

        let catalog = ModuleCatalog::new();
        catalog.register_builtin("upscale", || Box::new(StubModule::named("upscale")));

        let descriptors = catalog.discover(dir.path());
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name, "upscale");
    }

    #[test]
    fn test_discover_orders_by_tab_order_then_name() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zimage", "upscale", "custom_x", "app_settings"] {
            write_manifest(dir.path(), name, &builtin_manifest(name));
        }

        let catalog = ModuleCatalog::new();
        for name in ["zimage", "upscale", "custom_x", "app_settings"] {
            catalog.register_builtin(name, move || Box::new(StubModule::named(name)));
        }

        let descriptors = catalog.discover(dir.path());
        let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["zimage", "upscale", "app_settings", "custom_x"]);
        assert!(descriptors[3].order >= DEFAULT_TAB_ORDER.len() as i64);
    }

    #[test]
    fn test_discover_metadata_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "custom_x", &builtin_manifest("custom_x"));

        let catalog = ModuleCatalog::new();
        catalog.register_builtin("custom_x", || Box::new(StubModule::named("custom_x")));

        let descriptors = catalog.discover(dir.path());
        assert_eq!(descriptors[0].tab_id, "custom_x");
        assert_eq!(descriptors[0].label, "Custom X");
    }

    #[test]
    fn test_discover_manifest_overrides() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(
            dir.path(),
            "upscale",
            "name = \"upscale\"\napi_version = 1\nkind = \"builtin\"\ntab_id = \"up\"\nlabel = \"🔍 Upscale\"\norder = 42\n",
        );

        let catalog = ModuleCatalog::new();
        catalog.register_builtin("upscale", || Box::new(StubModule::named("upscale")));

        let descriptors = catalog.discover(dir.path());
        assert_eq!(descriptors[0].tab_id, "up");
        assert_eq!(descriptors[0].label, "🔍 Upscale");
        assert_eq!(descriptors[0].order, 42);
    }

    #[test]
    fn test_discover_skips_api_version_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(
            dir.path(),
            "old",
            "name = \"old\"\napi_version = 999\nkind = \"builtin\"\n",
        );

        let catalog = ModuleCatalog::new();
        catalog.register_builtin("old", || Box::new(StubModule::named("old")));

        assert!(catalog.discover(dir.path()).is_empty());
    }

    #[test]
    fn test_instantiate_isolates_failing_and_panicking_factories() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["good", "bad", "worse"] {
            write_manifest(dir.path(), name, &builtin_manifest(name));
        }

        let catalog = ModuleCatalog::new();
        catalog.register_builtin("good", || Box::new(StubModule::named("good")));
        catalog.register_builtin("bad", || {
            Box::new(StubModule {
                fail_build: true,
                ..StubModule::named("bad")
            })
        });
        catalog.register_builtin("worse", || {
            Box::new(StubModule {
                panic_build: true,
                ..StubModule::named("worse")
            })
        });

        let ctx = test_context(&dir);
        let tabs = catalog.load_all(dir.path(), &ctx);
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].name, "good");
        assert_eq!(tabs[0].module().name(), "good");
    }

    #[test]
    fn test_instantiate_passes_manifest_config_to_init() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(
            dir.path(),
            "upscale",
            "name = \"upscale\"\napi_version = 1\nkind = \"builtin\"\n\n[config]\nscale = 4\n",
        );

        let catalog = ModuleCatalog::new();
        catalog.register_builtin("upscale", || Box::new(ConfigProbe::default()));

        let ctx = test_context(&dir);
        let tabs = catalog.load_all(dir.path(), &ctx);
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].view.title, "4");
    }

    /// Builds its tab title from the config it was given.
    #[derive(Default)]
    struct ConfigProbe {
        scale: i64,
    }

    impl Module for ConfigProbe {
        fn name(&self) -> &str {
            "upscale"
        }

        fn api_version(&self) -> u32 {
            CURRENT_API_VERSION
        }

        fn init(&mut self, config: Value) -> Result<()> {
            self.scale = config["scale"].as_i64().unwrap_or(0);
            Ok(())
        }

        fn build(&self, _ctx: &SharedContext) -> Result<TabView> {
            Ok(TabView::new("upscale", &self.scale.to_string()))
        }
    }

    #[test]
    fn test_load_all_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(&dir);
        let catalog = ModuleCatalog::new();
        assert!(catalog.load_all(dir.path(), &ctx).is_empty());
    }
}
