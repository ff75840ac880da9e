//! The `sketchlens categories` command.

use sketchlens_core::{CategorySet, Config};

/// Print the category list from the model directory, one label per line.
pub async fn execute(config: Config) -> anyhow::Result<()> {
    let path = config.model_dir().join(&config.model.categories_file);
    let categories = CategorySet::load(&path)?;

    for label in categories.iter() {
        println!("{label}");
    }
    tracing::debug!("{} categories from {:?}", categories.len(), path);
    Ok(())
}
