use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One product tracked by the dashboard.
///
/// Upstream rows may be keyed by either `code` (the supplier's own article) or
/// `external_id` (the marketplace's numeric id), so both are unique keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCatalogEntry {
    pub code: String,
    /// Marketplace-assigned id (`nmId`), kept as a string.
    pub external_id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "image", default)]
    pub image_url: String,
}

/// Ordered, validated product catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub products: Vec<ProductCatalogEntry>,
}

impl Catalog {
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductCatalogEntry> {
        self.products.iter()
    }

    #[must_use]
    pub fn find_by_code(&self, code: &str) -> Option<&ProductCatalogEntry> {
        self.products.iter().find(|p| p.code == code)
    }
}

/// Load and validate the product catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<Catalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_catalog(&content)
}

/// Parse and validate catalog YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_catalog(content: &str) -> Result<Catalog, ConfigError> {
    let catalog: Catalog = serde_yaml::from_str(content).map_err(ConfigError::CatalogFileParse)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

fn validate_catalog(catalog: &Catalog) -> Result<(), ConfigError> {
    let mut seen_codes = HashSet::new();
    let mut seen_ids = HashSet::new();

    for product in &catalog.products {
        if product.code.trim().is_empty() {
            return Err(ConfigError::Validation(
                "product code must be non-empty".to_string(),
            ));
        }

        if product.external_id.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "product '{}' has an empty external_id",
                product.code
            )));
        }

        if product.display_name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "product '{}' has an empty name",
                product.code
            )));
        }

        if !seen_codes.insert(product.code.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate product code: '{}'",
                product.code
            )));
        }

        if !seen_ids.insert(product.external_id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate external_id: '{}' (from product '{}')",
                product.external_id, product.code
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
