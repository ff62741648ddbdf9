use std::collections::BTreeMap;

use anyhow::Result;

use bizdir_core::AppConfig;

use super::list::load_catalog;

pub fn run(config: &AppConfig) -> Result<()> {
    let catalog = load_catalog(config)?;

    if catalog.is_empty() {
        println!("The catalog is empty.");
        return Ok(());
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in catalog.records() {
        *counts.entry(record.category.as_str()).or_default() += 1;
    }

    println!("Categories ({}):\n", counts.len());
    for (category, count) in counts {
        println!("  {:<40} {:>4}", category, count);
    }

    Ok(())
}
