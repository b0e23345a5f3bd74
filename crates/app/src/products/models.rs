//! Product Models

use std::collections::BTreeMap;

use jiff::Timestamp;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use serde::{Deserialize, Serialize};
use swiftshop::{
    ids::TypedId,
    prices::Price,
    products::{Product, ProductId},
};

use crate::{auth::UserId, products::ProductsServiceError, timestamps::server_time};

/// Product as the catalog API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub size_images: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub size_colors: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub size_stock: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub main_category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl TryFrom<ProductRecord> for Product {
    type Error = ProductsServiceError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        Ok(Product {
            id: record.id,
            price: price_from_wire(record.price)?,
            name: record.name,
            stock: record.stock,
            description: record.description,
            category: record.category,
            main_category: record.main_category,
            sub_category: record.sub_category,
            size_stock: record.size_stock.unwrap_or_default(),
            size_colors: record.size_colors.unwrap_or_default(),
        })
    }
}

/// Convert a major-unit float from the wire into a [`Price`].
///
/// # Errors
///
/// Returns an error for non-finite or negative amounts.
pub fn price_from_wire(amount: f64) -> Result<Price, ProductsServiceError> {
    let decimal = Decimal::from_f64(amount).ok_or(ProductsServiceError::InvalidPrice(amount))?;

    Ok(Price::from_decimal(decimal)?)
}

/// Major-unit float for a [`Price`], as the API expects it.
#[must_use]
pub fn price_to_wire(price: Price) -> f64 {
    Decimal::from_u64(*price)
        .map(|minor| minor / Decimal::ONE_HUNDRED)
        .and_then(|major| major.to_f64())
        .unwrap_or_default()
}

/// Catalog search filters. Unset filters are omitted from the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
}

impl ProductFilters {
    /// Free-text search only.
    #[must_use]
    pub fn search(query: impl Into<String>) -> Self {
        let query = query.into();

        Self {
            q: (!query.trim().is_empty()).then_some(query),
            ..Self::default()
        }
    }
}

/// Product fields an admin submits when creating or editing a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub size_stock: BTreeMap<String, u32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub size_colors: BTreeMap<String, Vec<String>>,
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: price_to_wire(product.price),
            description: product.description.clone(),
            image_url: None,
            category: product.category.clone(),
            stock: product.stock,
            main_category: product.main_category.clone(),
            sub_category: product.sub_category.clone(),
            size_stock: product.size_stock.clone(),
            size_colors: product.size_colors.clone(),
        }
    }
}

/// Review Id
pub type ReviewId = TypedId<Review>;

/// Product review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(with = "server_time")]
    pub created_at: Timestamp,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// New review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewInput {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Average rating across reviews, `None` when there are none.
#[must_use]
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }

    let sum: u32 = reviews.iter().map(|review| u32::from(review.rating)).sum();

    Some(f64::from(sum) / f64::from(u32::try_from(reviews.len()).unwrap_or(u32::MAX)))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn record_converts_to_core_product() -> TestResult {
        let record: ProductRecord = serde_json::from_str(
            r#"{
                "id": 7, "name": "Ténis Runner", "price": 149.9, "stock": 8,
                "main_category": "Vestuário", "sub_category": "Sapato",
                "size_stock": {"42": 5, "43": 3}, "size_colors": {"42": ["azul"]},
                "image_url": null, "attributes": {"marca": "Swift"}
            }"#,
        )?;

        let product = Product::try_from(record)?;

        assert_eq!(product.id, ProductId::new(7));
        assert_eq!(product.price, Price::new(149_90));
        assert_eq!(product.stock_for(Some("43")), 3);
        assert_eq!(product.colors_for("42"), ["azul"]);

        Ok(())
    }

    #[test]
    fn missing_optional_fields_default() -> TestResult {
        let record: ProductRecord =
            serde_json::from_str(r#"{"id": 1, "name": "Caneca", "price": 35}"#)?;

        let product = Product::try_from(record)?;

        assert_eq!(product.price, Price::new(35_00));
        assert_eq!(product.stock, 0);
        assert!(!product.is_size_variant());

        Ok(())
    }

    #[test]
    fn negative_or_non_finite_prices_are_rejected() {
        assert!(price_from_wire(-1.0).is_err());
        assert!(matches!(
            price_from_wire(f64::NAN),
            Err(ProductsServiceError::InvalidPrice(_))
        ));
    }

    #[test]
    fn price_round_trips_to_wire() -> TestResult {
        assert!((price_to_wire(Price::new(19_90)) - 19.9).abs() < f64::EPSILON);
        assert_eq!(price_from_wire(price_to_wire(Price::new(1_234_56)))?, Price::new(1_234_56));

        Ok(())
    }

    #[test]
    fn filters_skip_unset_fields() -> TestResult {
        let filters = ProductFilters {
            main_category: Some("Tecnologia".to_string()),
            ..ProductFilters::search("  ")
        };

        assert_eq!(
            serde_json::to_value(&filters)?,
            serde_json::json!({"main_category": "Tecnologia"})
        );

        Ok(())
    }

    #[test]
    fn average_rating_of_reviews() -> TestResult {
        let review = |id: u64, rating: u8| -> Result<Review, serde_json::Error> {
            serde_json::from_value(serde_json::json!({
                "id": id, "product_id": 1, "user_id": 2, "rating": rating,
                "created_at": "2025-01-01T09:00:00", "user_name": "Ana"
            }))
        };

        let reviews = [review(1, 5)?, review(2, 4)?];

        assert_eq!(average_rating(&reviews), Some(4.5));
        assert_eq!(average_rating(&[]), None);

        Ok(())
    }
}
