// src/services/product_service.rs
//
// Product operations.

use std::sync::Arc;

use async_trait::async_trait;

use super::{check_page, run_in_unit_of_work, saved};
use crate::application::mapping::map_all;
use crate::application::{
    ApiResponse, CreateProductRequest, PagedResponse, ProductDto, ServiceError,
    UpdateProductRequest,
};
use crate::cancellation::CancellationSignal;
use crate::config::PagingConfig;
use crate::domain::{validate_product, EntityId, Product};
use crate::repositories::UnitOfWorkFactory;

/// What the HTTP layer calls for products.
#[async_trait]
pub trait ProductOperations: Send + Sync {
    async fn get_by_id(&self, id: EntityId, cancel: CancellationSignal) -> ApiResponse<ProductDto>;

    async fn get_all(&self, cancel: CancellationSignal) -> ApiResponse<Vec<ProductDto>>;

    async fn get_paged(
        &self,
        page_number: i64,
        page_size: i64,
        cancel: CancellationSignal,
    ) -> ApiResponse<PagedResponse<ProductDto>>;

    async fn get_by_category(
        &self,
        category_id: EntityId,
        cancel: CancellationSignal,
    ) -> ApiResponse<Vec<ProductDto>>;

    async fn get_in_stock(&self, cancel: CancellationSignal) -> ApiResponse<Vec<ProductDto>>;

    async fn search(&self, term: &str, cancel: CancellationSignal) -> ApiResponse<Vec<ProductDto>>;

    async fn create(
        &self,
        request: CreateProductRequest,
        cancel: CancellationSignal,
    ) -> ApiResponse<ProductDto>;

    async fn update(
        &self,
        id: EntityId,
        request: UpdateProductRequest,
        cancel: CancellationSignal,
    ) -> ApiResponse<ProductDto>;

    async fn delete(&self, id: EntityId, cancel: CancellationSignal) -> ApiResponse<bool>;
}

pub struct ProductService {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    paging: PagingConfig,
}

impl ProductService {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>, paging: PagingConfig) -> Self {
        Self {
            uow_factory,
            paging,
        }
    }
}

#[async_trait]
impl ProductOperations for ProductService {
    async fn get_by_id(&self, id: EntityId, cancel: CancellationSignal) -> ApiResponse<ProductDto> {
        let result = run_in_unit_of_work(&self.uow_factory, cancel, move |uow| {
            match uow.products().get_by_id(id)? {
                Some(product) => Ok(ProductDto::from(&product)),
                None => Err(ServiceError::not_found("Product", id)),
            }
        })
        .await;

        ApiResponse::from_result(result, "Product retrieved successfully", "Error retrieving product")
    }

    async fn get_all(&self, cancel: CancellationSignal) -> ApiResponse<Vec<ProductDto>> {
        let result = run_in_unit_of_work(&self.uow_factory, cancel, |uow| {
            let products = uow.products().get_all()?;
            Ok(map_all::<Product, ProductDto>(&products))
        })
        .await;

        ApiResponse::from_result(result, "Products retrieved successfully", "Error retrieving products")
    }

    async fn get_paged(
        &self,
        page_number: i64,
        page_size: i64,
        cancel: CancellationSignal,
    ) -> ApiResponse<PagedResponse<ProductDto>> {
        if let Err(e) = check_page(&self.paging, page_number, page_size) {
            return ApiResponse::from_error(e, "Error retrieving products");
        }

        let result = run_in_unit_of_work(&self.uow_factory, cancel, move |uow| {
            let (products, total) = uow.products().get_paged(page_number, page_size)?;
            Ok(PagedResponse::new(
                map_all::<Product, ProductDto>(&products),
                page_number,
                page_size,
                total,
            ))
        })
        .await;

        ApiResponse::from_result(result, "Products retrieved successfully", "Error retrieving products")
    }

    async fn get_by_category(
        &self,
        category_id: EntityId,
        cancel: CancellationSignal,
    ) -> ApiResponse<Vec<ProductDto>> {
        let result = run_in_unit_of_work(&self.uow_factory, cancel, move |uow| {
            let products = uow.products().get_by_category(category_id)?;
            Ok(map_all::<Product, ProductDto>(&products))
        })
        .await;

        ApiResponse::from_result(result, "Products retrieved successfully", "Error retrieving products")
    }

    async fn get_in_stock(&self, cancel: CancellationSignal) -> ApiResponse<Vec<ProductDto>> {
        let result = run_in_unit_of_work(&self.uow_factory, cancel, |uow| {
            let products = uow.products().get_in_stock()?;
            Ok(map_all::<Product, ProductDto>(&products))
        })
        .await;

        ApiResponse::from_result(result, "Products retrieved successfully", "Error retrieving products")
    }

    async fn search(&self, term: &str, cancel: CancellationSignal) -> ApiResponse<Vec<ProductDto>> {
        let term = term.to_string();
        let result = run_in_unit_of_work(&self.uow_factory, cancel, move |uow| {
            let products = uow.products().search(&term)?;
            Ok(map_all::<Product, ProductDto>(&products))
        })
        .await;

        match result {
            Ok(products) => {
                let message = format!("Found {} products", products.len());
                ApiResponse::success(products, message)
            }
            Err(e) => ApiResponse::from_error(e, "Error searching products"),
        }
    }

    async fn create(
        &self,
        request: CreateProductRequest,
        cancel: CancellationSignal,
    ) -> ApiResponse<ProductDto> {
        let result = run_in_unit_of_work(&self.uow_factory, cancel, move |uow| {
            let product = Product::new(
                request.name,
                request.description,
                request.price,
                request.stock,
                request.category_id,
            );
            validate_product(&product)?;

            let Some(category) = uow.categories().get_by_id(product.category_id)? else {
                return Err(ServiceError::invalid_category(product.category_id));
            };

            let key = uow.products().add(product)?;
            uow.save_changes()?;

            let mut created = saved(uow.products().entry(key))?;
            created.category_name = Some(category.name);
            Ok(ProductDto::from(&created))
        })
        .await;

        ApiResponse::from_result(result, "Product created successfully", "Error creating product")
    }

    async fn update(
        &self,
        id: EntityId,
        request: UpdateProductRequest,
        cancel: CancellationSignal,
    ) -> ApiResponse<ProductDto> {
        let result = run_in_unit_of_work(&self.uow_factory, cancel, move |uow| {
            let Some(mut product) = uow.products().get_by_id(id)? else {
                return Err(ServiceError::not_found("Product", id));
            };

            let Some(category) = uow.categories().get_by_id(request.category_id)? else {
                return Err(ServiceError::invalid_category(request.category_id));
            };

            product.update_details(
                request.name,
                request.description,
                request.price,
                request.stock,
                request.category_id,
            );
            validate_product(&product)?;

            let key = uow.products().update(product)?;
            uow.save_changes()?;

            let mut updated = saved(uow.products().entry(key))?;
            updated.category_name = Some(category.name);
            Ok(ProductDto::from(&updated))
        })
        .await;

        ApiResponse::from_result(result, "Product updated successfully", "Error updating product")
    }

    async fn delete(&self, id: EntityId, cancel: CancellationSignal) -> ApiResponse<bool> {
        let result = run_in_unit_of_work(&self.uow_factory, cancel, move |uow| {
            if !uow.products().exists(id)? {
                return Err(ServiceError::not_found("Product", id));
            }

            uow.products().delete(id)?;
            uow.save_changes()?;
            Ok(true)
        })
        .await;

        ApiResponse::from_result(result, "Product deleted successfully", "Error deleting product")
    }
}
