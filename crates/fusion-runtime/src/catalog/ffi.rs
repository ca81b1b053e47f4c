//! FFI bridge for loading native modules (.so/.dylib) via libloading.
//!
//! Uses double-boxing pattern: `Box<Box<dyn Module>>` → thin `*mut c_void`
//! to avoid passing fat pointers over `extern "C"` boundary.
//!
//! **Constraint:** Module and host must share the same Rust compiler version.

use std::ffi::c_void;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use anyhow::{bail, Context, Result};
use libloading::Library;

use super::module::Module;

/// Symbol type for `_module_create() -> *mut c_void`
type CreateFn = extern "C" fn() -> *mut c_void;

/// Safe wrapper around a dynamically loaded module.
///
/// Drop order matters: `module` must be dropped before `_library`
/// (Rust drops fields in declaration order).
pub struct ModuleHandle {
    module: Box<dyn Module>,
    _library: Library,
}

impl std::fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleHandle")
            .field("module_name", &self.module.name())
            .finish()
    }
}

impl ModuleHandle {
    /// Load a native module from a shared library path (.so/.dylib).
    ///
    /// `Ok(None)` means the library loaded but exports no `_module_create`:
    /// a shared object that is not a tab module. Calls the creation function
    /// with panic isolation and reconstructs the double-boxed
    /// `Box<dyn Module>` from the returned thin pointer.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let lib = unsafe { Library::new(path) }
            .with_context(|| format!("Failed to load library: {}", path.display()))?;

        let create_fn = match unsafe { lib.get::<CreateFn>(b"_module_create\0") } {
            Ok(f) => f,
            Err(_) => return Ok(None),
        };

        let raw = catch_unwind(AssertUnwindSafe(|| create_fn()))
            .map_err(|_| anyhow::anyhow!("Module panicked during _module_create"))?;

        if raw.is_null() {
            bail!("_module_create returned null in {}", path.display());
        }

        // Reconstruct Box<dyn Module> from double-boxed thin pointer.
        // SAFETY: no fallible ops between from_raw and return — prevents
        // double-free. This takes ownership of the allocation, which is safe
        // ONLY when host and module share the same allocator (same Rust
        // toolchain / same workspace build).
        let module = unsafe { *Box::from_raw(raw as *mut Box<dyn Module>) };

        Ok(Some(Self {
            module,
            _library: lib,
        }))
    }

    /// Get immutable reference to the loaded module.
    pub fn module(&self) -> &dyn Module {
        &*self.module
    }

    /// Get mutable reference to the loaded module.
    pub fn module_mut(&mut self) -> &mut dyn Module {
        &mut *self.module
    }
}
