// src/services/category_service.rs
//
// Category operations.
//
// Names are unique among live categories: checked here first (Conflict),
// backed by a partial unique index in the schema.

use std::sync::Arc;

use async_trait::async_trait;
use log::warn;

use super::{check_page, run_in_unit_of_work, saved};
use crate::application::mapping::map_all;
use crate::application::{
    ApiResponse, CategoryDto, CreateCategoryRequest, CreateCategoryWithProductsRequest,
    PagedResponse, ServiceError, UpdateCategoryRequest,
};
use crate::cancellation::CancellationSignal;
use crate::config::PagingConfig;
use crate::domain::{validate_category, validate_product, Category, Entity, EntityId, Product};
use crate::repositories::{UnitOfWork, UnitOfWorkFactory};

/// What the HTTP layer calls for categories.
#[async_trait]
pub trait CategoryOperations: Send + Sync {
    async fn get_by_id(&self, id: EntityId, cancel: CancellationSignal) -> ApiResponse<CategoryDto>;

    async fn get_all(&self, cancel: CancellationSignal) -> ApiResponse<Vec<CategoryDto>>;

    async fn get_paged(
        &self,
        page_number: i64,
        page_size: i64,
        cancel: CancellationSignal,
    ) -> ApiResponse<PagedResponse<CategoryDto>>;

    /// The category with its live products listed.
    async fn get_with_products(
        &self,
        id: EntityId,
        cancel: CancellationSignal,
    ) -> ApiResponse<CategoryDto>;

    async fn search(&self, term: &str, cancel: CancellationSignal) -> ApiResponse<Vec<CategoryDto>>;

    async fn create(
        &self,
        request: CreateCategoryRequest,
        cancel: CancellationSignal,
    ) -> ApiResponse<CategoryDto>;

    /// Category and products in one transaction: all persisted or none.
    async fn create_with_products(
        &self,
        request: CreateCategoryWithProductsRequest,
        cancel: CancellationSignal,
    ) -> ApiResponse<CategoryDto>;

    async fn update(
        &self,
        id: EntityId,
        request: UpdateCategoryRequest,
        cancel: CancellationSignal,
    ) -> ApiResponse<CategoryDto>;

    async fn delete(&self, id: EntityId, cancel: CancellationSignal) -> ApiResponse<bool>;
}

pub struct CategoryService {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    paging: PagingConfig,
}

impl CategoryService {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>, paging: PagingConfig) -> Self {
        Self {
            uow_factory,
            paging,
        }
    }
}

fn name_taken(name: &str) -> ServiceError {
    ServiceError::conflict(
        "Category name already exists",
        format!("A category named '{}' already exists", name),
    )
}

/// Stage and save the category, then its products, inside the open
/// transaction of `uow`.
fn stage_category_with_products(
    uow: &mut UnitOfWork,
    request: CreateCategoryWithProductsRequest,
) -> Result<CategoryDto, ServiceError> {
    let category = Category::new(request.name, request.description);
    validate_category(&category)?;
    if uow.categories().exists_by_name(&category.name, None)? {
        return Err(name_taken(&category.name));
    }

    let category_key = uow.categories().add(category)?;
    uow.save_changes()?;
    let mut created = saved(uow.categories().entry(category_key))?;

    let mut product_keys = Vec::with_capacity(request.products.len());
    for line in request.products {
        let product = Product::new(
            line.name,
            line.description,
            line.price,
            line.stock,
            created.id(),
        );
        validate_product(&product)?;
        product_keys.push(uow.products().add(product)?);
    }
    uow.save_changes()?;

    let mut products = Vec::with_capacity(product_keys.len());
    for key in product_keys {
        let mut product = saved(uow.products().entry(key))?;
        product.category_name = Some(created.name.clone());
        products.push(product);
    }
    created.products = Some(products);

    Ok(CategoryDto::from(&created))
}

#[async_trait]
impl CategoryOperations for CategoryService {
    async fn get_by_id(&self, id: EntityId, cancel: CancellationSignal) -> ApiResponse<CategoryDto> {
        let result = run_in_unit_of_work(&self.uow_factory, cancel, move |uow| {
            match uow.categories().get_with_products(id)? {
                Some(mut category) => {
                    // Count only; the listing belongs to get_with_products.
                    category.product_count = category.products.take().map(|p| p.len() as i64);
                    Ok(CategoryDto::from(&category))
                }
                None => Err(ServiceError::not_found("Category", id)),
            }
        })
        .await;

        ApiResponse::from_result(result, "Category retrieved successfully", "Error retrieving category")
    }

    async fn get_all(&self, cancel: CancellationSignal) -> ApiResponse<Vec<CategoryDto>> {
        let result = run_in_unit_of_work(&self.uow_factory, cancel, |uow| {
            let categories = uow.categories().get_with_product_count()?;
            Ok(map_all::<Category, CategoryDto>(&categories))
        })
        .await;

        ApiResponse::from_result(
            result,
            "Categories retrieved successfully",
            "Error retrieving categories",
        )
    }

    async fn get_paged(
        &self,
        page_number: i64,
        page_size: i64,
        cancel: CancellationSignal,
    ) -> ApiResponse<PagedResponse<CategoryDto>> {
        if let Err(e) = check_page(&self.paging, page_number, page_size) {
            return ApiResponse::from_error(e, "Error retrieving categories");
        }

        let result = run_in_unit_of_work(&self.uow_factory, cancel, move |uow| {
            let (categories, total) = uow
                .categories()
                .get_paged_with_product_count(page_number, page_size)?;
            Ok(PagedResponse::new(
                map_all::<Category, CategoryDto>(&categories),
                page_number,
                page_size,
                total,
            ))
        })
        .await;

        ApiResponse::from_result(
            result,
            "Categories retrieved successfully",
            "Error retrieving categories",
        )
    }

    async fn get_with_products(
        &self,
        id: EntityId,
        cancel: CancellationSignal,
    ) -> ApiResponse<CategoryDto> {
        let result = run_in_unit_of_work(&self.uow_factory, cancel, move |uow| {
            match uow.categories().get_with_products(id)? {
                Some(category) => Ok(CategoryDto::from(&category)),
                None => Err(ServiceError::not_found("Category", id)),
            }
        })
        .await;

        ApiResponse::from_result(result, "Category retrieved successfully", "Error retrieving category")
    }

    async fn search(&self, term: &str, cancel: CancellationSignal) -> ApiResponse<Vec<CategoryDto>> {
        let term = term.to_string();
        let result = run_in_unit_of_work(&self.uow_factory, cancel, move |uow| {
            let categories = uow.categories().search(&term)?;
            Ok(map_all::<Category, CategoryDto>(&categories))
        })
        .await;

        match result {
            Ok(categories) => {
                let message = format!("Found {} categories", categories.len());
                ApiResponse::success(categories, message)
            }
            Err(e) => ApiResponse::from_error(e, "Error searching categories"),
        }
    }

    async fn create(
        &self,
        request: CreateCategoryRequest,
        cancel: CancellationSignal,
    ) -> ApiResponse<CategoryDto> {
        let result = run_in_unit_of_work(&self.uow_factory, cancel, move |uow| {
            let category = Category::new(request.name, request.description);
            validate_category(&category)?;
            if uow.categories().exists_by_name(&category.name, None)? {
                return Err(name_taken(&category.name));
            }

            let key = uow.categories().add(category)?;
            uow.save_changes()?;

            let created = saved(uow.categories().entry(key))?;
            Ok(CategoryDto::from(&created))
        })
        .await;

        ApiResponse::from_result(result, "Category created successfully", "Error creating category")
    }

    async fn create_with_products(
        &self,
        request: CreateCategoryWithProductsRequest,
        cancel: CancellationSignal,
    ) -> ApiResponse<CategoryDto> {
        let result = run_in_unit_of_work(&self.uow_factory, cancel, move |uow| {
            uow.begin_transaction()?;

            match stage_category_with_products(uow, request) {
                Ok(dto) => {
                    uow.commit()?;
                    Ok(dto)
                }
                Err(e) => {
                    if let Err(rollback_err) = uow.rollback() {
                        warn!(
                            "event=uow_rollback module=services status=error error={}",
                            rollback_err
                        );
                    }
                    Err(e)
                }
            }
        })
        .await;

        ApiResponse::from_result(result, "Category created successfully", "Error creating category")
    }

    async fn update(
        &self,
        id: EntityId,
        request: UpdateCategoryRequest,
        cancel: CancellationSignal,
    ) -> ApiResponse<CategoryDto> {
        let result = run_in_unit_of_work(&self.uow_factory, cancel, move |uow| {
            let Some(mut category) = uow.categories().get_with_products(id)? else {
                return Err(ServiceError::not_found("Category", id));
            };
            category.product_count = category.products.take().map(|p| p.len() as i64);

            if category.name != request.name
                && uow.categories().exists_by_name(&request.name, Some(id))?
            {
                return Err(name_taken(&request.name));
            }

            category.update_details(request.name, request.description);
            validate_category(&category)?;

            let key = uow.categories().update(category)?;
            uow.save_changes()?;

            let updated = saved(uow.categories().entry(key))?;
            Ok(CategoryDto::from(&updated))
        })
        .await;

        ApiResponse::from_result(result, "Category updated successfully", "Error updating category")
    }

    async fn delete(&self, id: EntityId, cancel: CancellationSignal) -> ApiResponse<bool> {
        let result = run_in_unit_of_work(&self.uow_factory, cancel, move |uow| {
            let Some(category) = uow.categories().get_with_products(id)? else {
                return Err(ServiceError::not_found("Category", id));
            };

            if category.products.as_ref().is_some_and(|p| !p.is_empty()) {
                return Err(ServiceError::conflict(
                    "Cannot delete category",
                    "Category has associated products",
                ));
            }

            uow.categories().delete(id)?;
            uow.save_changes()?;
            Ok(true)
        })
        .await;

        ApiResponse::from_result(result, "Category deleted successfully", "Error deleting category")
    }
}
