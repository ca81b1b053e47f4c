pub mod catalog;
pub mod components;
pub mod compute;
pub mod context;
pub mod services;
pub mod settings;
pub mod transfer;
pub mod ui;

pub use catalog::{
    LoadedTab, Module, ModuleCatalog, ModuleDescriptor, ModuleHandle, ModuleKind, ModuleManifest,
    TabView, CURRENT_API_VERSION, DEFAULT_TAB_ORDER,
};
pub use components::ComponentRegistry;
pub use compute::ComputeClient;
pub use context::SharedContext;
pub use services::{PromptAssistant, ResourceMonitor, ResourceSample};
pub use settings::{SettingsStore, Snapshot};
pub use transfer::{ReceiverEndpoint, SendOutputs, TransferRegistry};
pub use ui::{GalleryItem, GalleryView, TabDirective, TabSwitcher, Trigger, UiUpdate, UiValue};

/// Initialize structured JSON logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
