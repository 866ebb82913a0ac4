//! Catalog types returned by the product endpoints.
//!
//! Only the fields the storefront reads are typed; everything else is kept
//! in the flattened `details` map so admin callers can round-trip documents.

use digi_core::{LicenseId, Price, ProductId, ReviewId, SkuId};
use serde::{Deserialize, Serialize};

type Details = serde_json::Map<String, serde_json::Value>;

/// A product with its SKUs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub avg_rating: Option<f64>,
    #[serde(default)]
    pub sku_details: Vec<Sku>,
    #[serde(default)]
    pub feedback_details: Vec<Review>,
    #[serde(flatten)]
    pub details: Details,
}

impl Product {
    /// Lowest SKU price, if the product has any SKU.
    #[must_use]
    pub fn starting_price(&self) -> Option<Price> {
        self.sku_details.iter().map(|sku| sku.price).min()
    }

    /// Find a SKU by id.
    #[must_use]
    pub fn sku(&self, sku_id: &SkuId) -> Option<&Sku> {
        self.sku_details.iter().find(|sku| &sku.id == sku_id)
    }
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sku {
    #[serde(rename = "_id")]
    pub id: SkuId,
    pub sku_name: String,
    pub price: Price,
    #[serde(default)]
    pub validity: Option<u32>,
    #[serde(default)]
    pub lifetime: bool,
    #[serde(flatten)]
    pub details: Details,
}

/// A license key attached to a SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    #[serde(rename = "_id")]
    pub id: LicenseId,
    pub license_key: String,
    #[serde(default)]
    pub is_sold: bool,
    #[serde(flatten)]
    pub details: Details,
}

/// A customer review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    pub rating: f64,
    #[serde(default)]
    pub feedback_msg: Option<String>,
    #[serde(flatten)]
    pub details: Details,
}

/// Landing page product groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(default)]
    pub latest_products: Vec<Product>,
    /// Shown as "Top Rated Products".
    #[serde(default)]
    pub top_sold_products: Vec<Product>,
}

/// Query parameters of the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub platform_type: Option<String>,
    pub base_type: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ProductFilter {
    /// Query pairs in the backend's parameter names; unset fields are omitted.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        let text = [
            ("search", &self.search),
            ("category", &self.category),
            ("platformType", &self.platform_type),
            ("baseType", &self.base_type),
            ("sort", &self.sort),
        ];
        for (key, value) in text {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                query.push((key, value.to_string()));
            }
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset", offset.to_string()));
        }
        query
    }
}

/// Body of a new review.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub rating: u8,
    pub review: String,
}

/// Image upload for a product.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_product_with_skus() {
        let json = r#"{
            "_id": "p1",
            "productName": "Office 2021",
            "image": "https://cdn.example.com/office.png",
            "platformType": "windows",
            "skuDetails": [
                {"_id": "s1", "skuName": "1 year", "price": 2999, "validity": 1},
                {"_id": "s2", "skuName": "Lifetime", "price": "4999.00", "lifetime": true}
            ]
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.product_name, "Office 2021");
        assert_eq!(product.starting_price(), Some(Price::from_paise(299_900)));
        assert!(product.sku(&SkuId::new("s2")).unwrap().lifetime);
        assert_eq!(product.details["platformType"], "windows");
        assert!(product.feedback_details.is_empty());
    }

    #[test]
    fn test_dashboard_tolerates_missing_groups() {
        let dashboard: Dashboard = serde_json::from_str(r#"{"latestProducts": []}"#).unwrap();
        assert!(dashboard.top_sold_products.is_empty());
    }

    #[test]
    fn test_filter_query_skips_unset_fields() {
        let filter = ProductFilter {
            search: Some("office".to_string()),
            category: Some(String::new()),
            limit: Some(12),
            ..ProductFilter::default()
        };

        assert_eq!(
            filter.to_query(),
            vec![("search", "office".to_string()), ("limit", "12".to_string())]
        );
        assert!(ProductFilter::default().to_query().is_empty());
    }
}
