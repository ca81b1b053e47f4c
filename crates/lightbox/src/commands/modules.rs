use anyhow::Result;

use fusion_runtime::ModuleCatalog;

use crate::config::{expand_path, Config};

/// Discovery report without instantiation: what would load, in what order.
pub fn execute(config: &Config) -> Result<()> {
    let modules_dir = expand_path(&config.paths.modules_dir);
    let catalog = ModuleCatalog::with_tab_order(config.ui.tab_order.clone());
    let descriptors = catalog.discover(&modules_dir);

    if descriptors.is_empty() {
        println!("No modules discovered.");
        println!("Modules directory: {:?}", modules_dir);
    } else {
        println!("Discovered modules:");
        for descriptor in descriptors {
            println!(
                "  {:>4}  {}  (tab: {}, \"{}\")",
                descriptor.order, descriptor.name, descriptor.tab_id, descriptor.label
            );
        }
    }

    Ok(())
}
