use anyhow::{Context, Result};

use bizdir_core::catalog::{Catalog, CatalogProvider, JsonCatalog};
use bizdir_core::filter::{filter, FilterCriteria};
use bizdir_core::paging::{AdvanceOutcome, WindowingController};
use bizdir_core::AppConfig;

pub fn run(
    config: &AppConfig,
    search: Option<String>,
    categories: Vec<String>,
    certifications: Vec<String>,
    page: usize,
) -> Result<()> {
    let catalog = load_catalog(config)?;
    let criteria = FilterCriteria {
        search_term: search.unwrap_or_default(),
        categories: categories.into_iter().collect(),
        certifications: certifications.into_iter().collect(),
    };
    let filtered = filter(&catalog, &criteria);

    if filtered.is_empty() {
        println!("No businesses match.");
        return Ok(());
    }

    let mut window = WindowingController::new(config.paging.page_size);
    window.reset(&filtered);
    while window.cursor() < page {
        match window.advance(&filtered, None) {
            AdvanceOutcome::Appended { .. } => {}
            _ => break,
        }
    }
    if window.cursor() < page {
        println!(
            "Only {} pages available; showing page {}.\n",
            window.cursor() + 1,
            window.cursor()
        );
    }

    let start = window.cursor() * window.page_size();
    let shown = &window.window()[start.min(window.window().len())..];

    println!(
        "{} businesses found, page {} ({}-{}):\n",
        filtered.len(),
        window.cursor(),
        start + 1,
        start + shown.len()
    );

    for record in shown {
        let mut badges = String::new();
        if record.is_board_member {
            badges.push_str(" [Board]");
        }
        if record.is_member {
            badges.push_str(" [Member]");
        }
        println!("  {} ({}){}", record.name, record.category, badges);
        if let Some(owner) = &record.owner {
            println!("    Owner: {}", owner);
        }
        if let Some(url) = record.contact_url() {
            println!("    Web: {}", url);
        }
        if !record.description.is_empty() {
            println!("    {}", record.description_preview(72));
        }
        println!();
    }

    if window.has_more() {
        println!("More results: bizdir list --page {}", window.cursor() + 1);
    }

    Ok(())
}

/// Load the catalog for one-shot commands; a failure is fatal here
pub fn load_catalog(config: &AppConfig) -> Result<Catalog> {
    let path = config.catalog_path();
    let records = JsonCatalog::new(&path)
        .load()
        .with_context(|| format!("Failed to load catalog from {}", path.display()))?;
    Ok(Catalog::new(records))
}
