//! Products service.

use async_trait::async_trait;
use mockall::automock;
use swiftshop::products::{Product, ProductId};
use tracing::debug;

use crate::{
    api::ApiClient,
    products::{
        errors::ProductsServiceError,
        models::{ProductFilters, ProductInput, ProductRecord, Review, ReviewInput},
    },
};

#[derive(Debug, Clone)]
pub struct HttpProductsService {
    api: ApiClient,
}

impl HttpProductsService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ProductsService for HttpProductsService {
    async fn list_products(
        &self,
        filters: ProductFilters,
    ) -> Result<Vec<Product>, ProductsServiceError> {
        let records: Vec<ProductRecord> = self.api.get_with_query("/products", &filters).await?;

        debug!(count = records.len(), "catalog page loaded");

        records.into_iter().map(Product::try_from).collect()
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, ProductsServiceError> {
        let record: ProductRecord = self.api.get(&format!("/products/{id}")).await?;

        Product::try_from(record)
    }

    async fn list_reviews(&self, id: ProductId) -> Result<Vec<Review>, ProductsServiceError> {
        Ok(self.api.get(&format!("/products/{id}/reviews")).await?)
    }

    async fn create_review(
        &self,
        id: ProductId,
        review: ReviewInput,
    ) -> Result<Review, ProductsServiceError> {
        if !(1..=5).contains(&review.rating) {
            return Err(ProductsServiceError::InvalidRating(review.rating));
        }

        Ok(self
            .api
            .post(&format!("/products/{id}/reviews"), &review)
            .await?)
    }

    async fn create_product(&self, product: ProductInput) -> Result<Product, ProductsServiceError> {
        let record: ProductRecord = self.api.post("/products", &product).await?;

        Product::try_from(record)
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: ProductInput,
    ) -> Result<Product, ProductsServiceError> {
        let record: ProductRecord = self.api.put(&format!("/products/{id}"), &update).await?;

        Product::try_from(record)
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), ProductsServiceError> {
        Ok(self.api.delete(&format!("/products/{id}")).await?)
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieves products matching the filters.
    async fn list_products(
        &self,
        filters: ProductFilters,
    ) -> Result<Vec<Product>, ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, id: ProductId) -> Result<Product, ProductsServiceError>;

    /// Reviews left on a product.
    async fn list_reviews(&self, id: ProductId) -> Result<Vec<Review>, ProductsServiceError>;

    /// Review a product; the rating must be 1 to 5.
    async fn create_review(
        &self,
        id: ProductId,
        review: ReviewInput,
    ) -> Result<Review, ProductsServiceError>;

    /// Creates a new product.
    async fn create_product(&self, product: ProductInput) -> Result<Product, ProductsServiceError>;

    /// Replaces a product's details.
    async fn update_product(
        &self,
        id: ProductId,
        update: ProductInput,
    ) -> Result<Product, ProductsServiceError>;

    /// Deletes a product.
    async fn delete_product(&self, id: ProductId) -> Result<(), ProductsServiceError>;
}
