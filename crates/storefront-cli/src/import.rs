//! `import-products`: seeds the datastore with the external and supplemental
//! catalog so admins can edit those records in place.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use storefront_catalog::ProductApiClient;
use storefront_core::{merge_catalog, AppConfig, Product};
use storefront_db::Datastore;

const IMPORT_CONCURRENCY: usize = 8;

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ImportSummary {
    pub imported: usize,
    pub skipped_existing: usize,
    pub failed: usize,
}

/// Products from `catalog` whose id has no record in the datastore yet.
/// Existing records are admin edits and are never overwritten.
pub(crate) fn plan_import(catalog: Vec<Product>, existing: &HashSet<i64>) -> (Vec<Product>, usize) {
    let before = catalog.len();
    let pending: Vec<Product> = catalog
        .into_iter()
        .filter(|p| !existing.contains(&p.id))
        .collect();
    let skipped = before - pending.len();
    (pending, skipped)
}

/// Writes `products` with bounded concurrency. Individual failures are
/// logged and counted; the rest of the batch still runs.
pub(crate) async fn import_products(
    store: &dyn Datastore,
    products: Vec<Product>,
) -> ImportSummary {
    let results: Vec<bool> = stream::iter(products)
        .map(|product| async move {
            match storefront_db::save_product(store, &product).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!(product_id = product.id, error = %e, "product import failed");
                    false
                }
            }
        })
        .buffer_unordered(IMPORT_CONCURRENCY)
        .collect()
        .await;

    let imported = results.iter().filter(|ok| **ok).count();
    ImportSummary {
        imported,
        skipped_existing: 0,
        failed: results.len() - imported,
    }
}

/// # Errors
///
/// Returns an error if the product API or the datastore cannot be read.
/// Per-product write failures are reported in the summary instead.
pub(crate) async fn run_import_products(
    config: &AppConfig,
    store: &dyn Datastore,
    dry_run: bool,
) -> anyhow::Result<()> {
    let client = ProductApiClient::with_base_url(
        &config.product_api_url,
        config.http_timeout_secs,
        &config.user_agent,
    )?;
    let api = client.fetch_products().await?;
    let supplemental =
        storefront_core::load_supplemental_products(config.supplemental_products_path.as_deref())?;
    let catalog = merge_catalog(api, supplemental, Vec::new());

    let existing: HashSet<i64> = store.list_products().await?.iter().map(|p| p.id).collect();
    let (pending, skipped) = plan_import(catalog, &existing);

    if dry_run {
        println!(
            "dry run: would import {} product(s), {skipped} already in the {} datastore",
            pending.len(),
            store.backend()
        );
        for product in &pending {
            println!("  {:>5}  {:<20}  {}", product.id, product.category, product.title);
        }
        return Ok(());
    }

    let mut summary = import_products(store, pending).await;
    summary.skipped_existing = skipped;
    tracing::info!(
        imported = summary.imported,
        skipped = summary.skipped_existing,
        failed = summary.failed,
        "product import finished"
    );
    println!(
        "imported {} product(s), skipped {} existing, {} failed",
        summary.imported, summary.skipped_existing, summary.failed
    );

    if summary.failed > 0 {
        anyhow::bail!("{} product(s) failed to import", summary.failed);
    }
    Ok(())
}
