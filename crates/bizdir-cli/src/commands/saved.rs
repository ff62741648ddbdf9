use anyhow::Result;

use bizdir_core::storage::SavedSet;
use bizdir_core::AppConfig;

use super::open_store;

pub fn run(config: &AppConfig) -> Result<()> {
    let saved = SavedSet::load(open_store(&config.local_store_path()));
    let records = saved.saved_records();

    if records.is_empty() {
        println!("No saved businesses yet.");
        println!("\nPress 's' on a business in the browser to save it.");
        return Ok(());
    }

    println!("Saved businesses ({}):\n", records.len());
    for record in &records {
        println!("  {} - {}", record.name, record.category);
        if !record.contact.is_empty() {
            println!("    Contact: {}", record.contact);
        }
    }

    Ok(())
}
