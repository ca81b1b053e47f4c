//! Fusion Studio Module SDK
//!
//! Re-exports the runtime types needed for module development. Module
//! authors implement the `Module` trait and, for dynamic-library modules,
//! export a creation function with `declare_module!`.

pub use anyhow::Result;
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use serde_json::Value;

// Re-export the module contract and the surfaces modules touch
pub use fusion_runtime::catalog::{Module, TabView};
pub use fusion_runtime::context::SharedContext;
pub use fusion_runtime::services::{PromptAssistant, ResourceMonitor, ResourceSample};
pub use fusion_runtime::transfer::{ReceiverEndpoint, SendOutputs, TransferRegistry};
pub use fusion_runtime::ui::{
    GalleryItem, GalleryView, TabDirective, TabSwitcher, Trigger, UiUpdate, UiValue,
};

/// Current module API version. Modules must match this to load.
pub const API_VERSION: u32 = 1;

/// Macro for the native module entry point. Use in a module crate:
/// ```ignore
/// use fusion_module_sdk::*;
///
/// #[derive(Default)]
/// struct MyModule;
/// impl Module for MyModule { ... }
///
/// declare_module!(MyModule);
/// ```
///
/// Exports `_module_create() -> *mut c_void` returning a double-boxed
/// `Box<dyn Module>` as a thin pointer, matching what the host loader
/// reconstructs.
#[macro_export]
macro_rules! declare_module {
    ($module_type:ty) => {
        #[no_mangle]
        pub extern "C" fn _module_create() -> *mut ::std::ffi::c_void {
            let module: Box<dyn $crate::Module> = Box::new(<$module_type>::default());
            Box::into_raw(Box::new(module)) as *mut ::std::ffi::c_void
        }
    };
}
