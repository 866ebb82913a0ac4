//! Product catalog endpoints.
//!
//! Read endpoints serve the storefront; the write endpoints (products,
//! SKUs, licenses) are used by admin accounts and take loosely typed bodies
//! because the backend owns their schema.

use digi_core::{LicenseId, ProductId, ReviewId, SkuId};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::types::{Dashboard, ImageUpload, License, NewReview, Product, ProductFilter, Sku};
use super::{Accepted, ApiClient, ApiResult, Body, RequestOptions, segment};

/// Multipart field carrying an uploaded product image.
pub const IMAGE_FIELD: &str = "productImage";

/// Product endpoint group, borrowed from an [`ApiClient`].
#[derive(Debug, Clone, Copy)]
pub struct Products<'a> {
    client: &'a ApiClient,
}

impl<'a> Products<'a> {
    pub(super) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &ProductFilter) -> ApiResult<Vec<Product>> {
        let query = filter.to_query();
        let url = self.client.endpoint_with_query(
            "products",
            query.iter().map(|(key, value)| (*key, value.as_str())),
        )?;
        self.client
            .request(Method::GET, url, Body::Empty, RequestOptions::default())
            .await?
            .into_accepted()
    }

    /// Landing page groups (latest and top rated products).
    ///
    /// The backend wraps the groups in a one-element array; an empty array
    /// yields empty groups.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> ApiResult<Dashboard> {
        let url = self
            .client
            .endpoint_with_query("products", [("dashboard", "true")])?;
        let accepted: Accepted<Vec<Dashboard>> = self
            .client
            .request(Method::GET, url, Body::Empty, RequestOptions::default())
            .await?
            .into_accepted()?;

        Ok(Accepted {
            message: accepted.message,
            result: Some(
                accepted
                    .result
                    .and_then(|groups| groups.into_iter().next())
                    .unwrap_or_default(),
            ),
        })
    }

    /// Fetch one product with its SKUs and reviews.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: &ProductId) -> ApiResult<Product> {
        self.client
            .get(&product_path(id))
            .await?
            .into_accepted()
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded or the request fails.
    #[instrument(skip(self, product))]
    pub async fn create<P: Serialize + Sync>(&self, product: &P) -> ApiResult<Product> {
        self.client
            .send_to(Method::POST, "products", Body::json(product)?)
            .await?
            .into_accepted()
    }

    /// Update the fields of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded or the request fails.
    #[instrument(skip(self, product), fields(product_id = %id))]
    pub async fn update<P: Serialize + Sync>(&self, id: &ProductId, product: &P) -> ApiResult<Product> {
        self.client
            .send_to(Method::PATCH, &product_path(id), Body::json(product)?)
            .await?
            .into_accepted()
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: &ProductId) -> ApiResult<Value> {
        self.client
            .send_to(Method::DELETE, &product_path(id), Body::Empty)
            .await?
            .into_accepted()
    }

    /// Upload the product image as multipart form data.
    ///
    /// # Errors
    ///
    /// Returns an error if the MIME type is invalid or the request fails.
    #[instrument(skip(self, image), fields(product_id = %id, file = %image.file_name, size = image.bytes.len()))]
    pub async fn upload_image(&self, id: &ProductId, image: ImageUpload) -> ApiResult<Value> {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.mime_type)?;
        let form = Form::new().part(IMAGE_FIELD, part);

        self.client
            .send_to(
                Method::POST,
                &format!("{}/image", product_path(id)),
                Body::Multipart(form),
            )
            .await?
            .into_accepted()
    }

    // =========================================================================
    // SKUs
    // =========================================================================

    /// Add a SKU to a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded or the request fails.
    #[instrument(skip(self, sku), fields(product_id = %product))]
    pub async fn add_sku<S: Serialize + Sync>(&self, product: &ProductId, sku: &S) -> ApiResult<Sku> {
        self.client
            .send_to(
                Method::POST,
                &format!("{}/skus", product_path(product)),
                Body::json(sku)?,
            )
            .await?
            .into_accepted()
    }

    /// Replace a SKU.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded or the request fails.
    #[instrument(skip(self, sku), fields(product_id = %product, sku_id = %sku_id))]
    pub async fn update_sku<S: Serialize + Sync>(
        &self,
        product: &ProductId,
        sku_id: &SkuId,
        sku: &S,
    ) -> ApiResult<Sku> {
        self.client
            .send_to(Method::PUT, &sku_path(product, sku_id), Body::json(sku)?)
            .await?
            .into_accepted()
    }

    /// Delete a SKU.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self), fields(product_id = %product, sku_id = %sku_id))]
    pub async fn delete_sku(&self, product: &ProductId, sku_id: &SkuId) -> ApiResult<Value> {
        self.client
            .send_to(Method::DELETE, &sku_path(product, sku_id), Body::Empty)
            .await?
            .into_accepted()
    }

    // =========================================================================
    // Licenses
    // =========================================================================

    /// List the licenses of a SKU.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self), fields(product_id = %product, sku_id = %sku_id))]
    pub async fn get_licenses(&self, product: &ProductId, sku_id: &SkuId) -> ApiResult<Vec<License>> {
        self.client
            .get(&format!("{}/licenses", sku_path(product, sku_id)))
            .await?
            .into_accepted()
    }

    /// Add license keys to a SKU.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded or the request fails.
    #[instrument(skip(self, license), fields(product_id = %product, sku_id = %sku_id))]
    pub async fn add_license<L: Serialize + Sync>(
        &self,
        product: &ProductId,
        sku_id: &SkuId,
        license: &L,
    ) -> ApiResult<Value> {
        self.client
            .send_to(
                Method::POST,
                &format!("{}/licenses", sku_path(product, sku_id)),
                Body::json(license)?,
            )
            .await?
            .into_accepted()
    }

    /// Replace a license key.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded or the request fails.
    #[instrument(skip(self, license), fields(product_id = %product, sku_id = %sku_id, license_id = %license_id))]
    pub async fn update_license<L: Serialize + Sync>(
        &self,
        product: &ProductId,
        sku_id: &SkuId,
        license_id: &LicenseId,
        license: &L,
    ) -> ApiResult<Value> {
        self.client
            .send_to(
                Method::PUT,
                &format!(
                    "{}/licenses/{}",
                    sku_path(product, sku_id),
                    segment(license_id.as_str())
                ),
                Body::json(license)?,
            )
            .await?
            .into_accepted()
    }

    /// Delete a license key. Licenses are addressed without their SKU.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self), fields(license_id = %license_id))]
    pub async fn delete_license(&self, license_id: &LicenseId) -> ApiResult<Value> {
        self.client
            .send_to(
                Method::DELETE,
                &format!("products/licenses/{}", segment(license_id.as_str())),
                Body::Empty,
            )
            .await?
            .into_accepted()
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// Review a purchased product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self, review), fields(product_id = %product, rating = review.rating))]
    pub async fn add_review(&self, product: &ProductId, review: &NewReview) -> ApiResult<Value> {
        self.client
            .send_to(
                Method::POST,
                &format!("{}/reviews", product_path(product)),
                Body::json(review)?,
            )
            .await?
            .into_accepted()
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self), fields(product_id = %product, review_id = %review_id))]
    pub async fn delete_review(&self, product: &ProductId, review_id: &ReviewId) -> ApiResult<Value> {
        self.client
            .send_to(
                Method::DELETE,
                &format!(
                    "{}/reviews/{}",
                    product_path(product),
                    segment(review_id.as_str())
                ),
                Body::Empty,
            )
            .await?
            .into_accepted()
    }
}

fn product_path(id: &ProductId) -> String {
    format!("products/{}", segment(id.as_str()))
}

fn sku_path(product: &ProductId, sku_id: &SkuId) -> String {
    format!("{}/skus/{}", product_path(product), segment(sku_id.as_str()))
}
