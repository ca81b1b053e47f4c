use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use fusion_runtime::ui::TabBar;
use fusion_runtime::{ComputeClient, ModuleCatalog, SettingsStore, SharedContext, TabSwitcher};

use crate::config::{expand_path, Config};

/// Launch the studio: probe the compute backend, build the shared context,
/// load every module and attach its tab to the shell.
pub async fn execute(config: &Config) -> Result<()> {
    let settings = Arc::new(SettingsStore::new(expand_path(&config.paths.settings_file)));

    let compute = if config.compute.enabled {
        match ComputeClient::connect(&config.compute.url).await {
            Ok(client) => {
                info!(url = %config.compute.url, "Compute backend connected");
                Some(Arc::new(client))
            }
            Err(e) => {
                warn!(error = %e, "Compute backend unavailable, starting degraded");
                None
            }
        }
    } else {
        None
    };

    let mut ctx = SharedContext::new(
        expand_path(&config.paths.app_dir),
        expand_path(&config.paths.models_dir),
        expand_path(&config.paths.outputs_dir),
        expand_path(&config.paths.workflows_dir),
        settings,
    );
    ctx.compute = compute;

    let tab_bar = Arc::new(TabBar::new());
    ctx.transfers.set_tab_switcher(tab_bar.clone());

    let modules_dir = expand_path(&config.paths.modules_dir);
    let catalog = ModuleCatalog::with_tab_order(config.ui.tab_order.clone());
    let mut tabs = catalog.load_all(&modules_dir, &ctx);

    if tabs.is_empty() {
        println!("No modules loaded.");
        println!("Modules directory: {:?}", modules_dir);
        return Ok(());
    }

    for tab in &mut tabs {
        if let Some(handler) = tab.view.on_activate.take() {
            tab_bar.attach(&tab.view.tab_id, handler);
        }
    }

    println!("Loaded {} module tab(s):", tabs.len());
    for tab in &tabs {
        println!("  {} [{}]", tab.view.title, tab.tab_id);
    }
    let receivers = ctx.transfers.receivers();
    if !receivers.is_empty() {
        println!("Image receivers:");
        for (tab_id, label) in receivers {
            println!("  {} ({})", tab_id, label);
        }
    }

    // Activate the first tab; the rendering toolkit takes over from here.
    if let Some(first) = tabs.first() {
        tab_bar.switch_to(&first.tab_id);
    }

    Ok(())
}
