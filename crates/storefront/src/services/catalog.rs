//! Product catalog: landing page and product detail.
//!
//! Both reads are cached with `moka` for the configured TTL; listings with a
//! filter go straight to the API.

use std::time::Duration;

use digi_core::ProductId;
use moka::future::Cache;
use tracing::{debug, instrument};

use super::Notice;
use crate::api::ApiClient;
use crate::api::types::{Dashboard, Product, ProductFilter};
use crate::error::Result;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Dashboard,
    Product(ProductId),
}

#[derive(Debug, Clone)]
enum CacheValue {
    Dashboard(Box<Dashboard>),
    Product(Box<Product>),
}

/// Catalog service.
#[derive(Clone)]
pub struct CatalogService {
    api: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogService {
    #[must_use]
    pub fn new(api: ApiClient, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(ttl)
            .build();
        Self { api, cache }
    }

    /// Latest and top rated products for the landing page.
    ///
    /// # Errors
    ///
    /// Returns the API failure.
    #[instrument(skip(self))]
    pub async fn home(&self) -> Result<Dashboard> {
        if let Some(CacheValue::Dashboard(dashboard)) = self.cache.get(&CacheKey::Dashboard).await {
            debug!("Cache hit for dashboard");
            return Ok(*dashboard);
        }

        let dashboard = self.api.products().dashboard().await?.into_result()?;
        self.cache
            .insert(
                CacheKey::Dashboard,
                CacheValue::Dashboard(Box::new(dashboard.clone())),
            )
            .await;
        Ok(dashboard)
    }

    /// One product with SKUs and reviews.
    ///
    /// # Errors
    ///
    /// Returns the API failure, or `MissingResult` if the product is absent.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product = self.api.products().get(id).await?.into_result()?;
        self.cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Search the catalog. Not cached.
    ///
    /// # Errors
    ///
    /// Returns the API failure.
    #[instrument(skip(self))]
    pub async fn search(&self, filter: &ProductFilter) -> Result<Notice<Vec<Product>>> {
        let accepted = self.api.products().list(filter).await?;
        Ok(Notice::new(
            accepted.message,
            accepted.result.unwrap_or_default(),
        ))
    }

    /// Drop one cached product.
    pub async fn invalidate_product(&self, id: &ProductId) {
        self.cache.invalidate(&CacheKey::Product(id.clone())).await;
    }

    /// Drop everything cached.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("api", &self.api)
            .field("cached_entries", &self.cache.entry_count())
            .finish()
    }
}
