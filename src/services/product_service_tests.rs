// src/services/product_service_tests.rs
//
// Product service against a real file-backed database, plus a mocked
// factory for the internal-failure path.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use crate::application::{
        CreateProductRequest, ErrorKind, UpdateProductRequest, INTERNAL_ERROR_DETAIL,
    };
    use crate::cancellation::{CancellationSignal, CancellationSource};
    use crate::config::PagingConfig;
    use crate::error::AppError;
    use crate::repositories::{MockUnitOfWorkFactory, UnitOfWorkFactory};
    use crate::services::{ProductOperations, ProductService};
    use crate::test_support::TestDb;

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn service(db: &TestDb) -> ProductService {
        let factory: Arc<dyn UnitOfWorkFactory> = Arc::new(db.factory());
        ProductService::new(factory, PagingConfig::default())
    }

    fn laptop_request(category_id: i64) -> CreateProductRequest {
        CreateProductRequest {
            name: "Laptop".to_string(),
            description: "15-inch".to_string(),
            price: Decimal::new(99999, 2),
            stock: 5,
            category_id,
        }
    }

    // ========================================================================
    // CREATE / READ
    // ========================================================================

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let db = TestDb::new();
        let electronics = db.seed_category("Electronics");
        let service = service(&db);

        let created = service
            .create(laptop_request(electronics.meta.id), CancellationSignal::never())
            .await;
        assert!(created.success, "{:?}", created.errors);
        assert_eq!(created.message, "Product created successfully");
        let dto = created.data.unwrap();
        assert!(dto.id > 0);
        assert_eq!(dto.category_name.as_deref(), Some("Electronics"));

        let fetched = service.get_by_id(dto.id, CancellationSignal::never()).await;
        assert!(fetched.success);
        let fetched = fetched.data.unwrap();
        assert_eq!(fetched.name, "Laptop");
        assert_eq!(fetched.description, "15-inch");
        assert_eq!(fetched.price, Decimal::new(99999, 2));
        assert_eq!(fetched.stock, 5);
        assert_eq!(fetched.category_name.as_deref(), Some("Electronics"));
        assert!(fetched.updated_at.is_none());
        assert_eq!(fetched.created_at, dto.created_at);

        let json = serde_json::to_value(&fetched).unwrap();
        assert_eq!(json["price"], serde_json::json!(999.99));
        assert!(json["updatedAt"].is_null());
        assert!(json["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_create_with_unknown_category_writes_nothing() {
        let db = TestDb::new();
        let service = service(&db);

        let response = service
            .create(laptop_request(999), CancellationSignal::never())
            .await;

        assert!(!response.success);
        assert_eq!(response.kind, Some(ErrorKind::InvalidReference));
        assert_eq!(response.status_code(), 400);

        let all = service.get_all(CancellationSignal::never()).await;
        assert!(all.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_invalid_price_is_validation_failure() {
        let db = TestDb::new();
        let electronics = db.seed_category("Electronics");
        let service = service(&db);

        let mut request = laptop_request(electronics.meta.id);
        request.price = Decimal::ZERO;
        let response = service.create(request, CancellationSignal::never()).await;

        assert!(!response.success);
        assert_eq!(response.kind, Some(ErrorKind::Validation));
        assert_eq!(response.message, "Validation failed");
        assert_eq!(response.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_product_is_not_found() {
        let db = TestDb::new();
        let service = service(&db);

        let response = service.get_by_id(42, CancellationSignal::never()).await;

        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.kind, Some(ErrorKind::NotFound));
        assert_eq!(response.status_code(), 404);
    }

    // ========================================================================
    // UPDATE / DELETE
    // ========================================================================

    #[tokio::test]
    async fn test_update_stamps_updated_at() {
        let db = TestDb::new();
        let electronics = db.seed_category("Electronics");
        let computers = db.seed_category("Computers");
        let service = service(&db);

        let created = service
            .create(laptop_request(electronics.meta.id), CancellationSignal::never())
            .await
            .data
            .unwrap();

        let response = service
            .update(
                created.id,
                UpdateProductRequest {
                    name: "Laptop Pro".to_string(),
                    description: "16-inch".to_string(),
                    price: Decimal::new(149999, 2),
                    stock: 2,
                    category_id: computers.meta.id,
                },
                CancellationSignal::never(),
            )
            .await;
        assert!(response.success, "{:?}", response.errors);

        let updated = service
            .get_by_id(created.id, CancellationSignal::never())
            .await
            .data
            .unwrap();
        assert_eq!(updated.name, "Laptop Pro");
        assert_eq!(updated.price, Decimal::new(149999, 2));
        assert_eq!(updated.category_name.as_deref(), Some("Computers"));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at.unwrap() >= updated.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let db = TestDb::new();
        let electronics = db.seed_category("Electronics");
        let service = service(&db);

        let response = service
            .update(
                7,
                UpdateProductRequest {
                    name: "Ghost".to_string(),
                    description: "Nowhere".to_string(),
                    price: Decimal::ONE,
                    stock: 1,
                    category_id: electronics.meta.id,
                },
                CancellationSignal::never(),
            )
            .await;

        assert_eq!(response.kind, Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_deleted_product_disappears_from_reads() {
        let db = TestDb::new();
        let electronics = db.seed_category("Electronics");
        let service = service(&db);
        let created = service
            .create(laptop_request(electronics.meta.id), CancellationSignal::never())
            .await
            .data
            .unwrap();

        let deleted = service.delete(created.id, CancellationSignal::never()).await;
        assert!(deleted.success);
        assert_eq!(deleted.data, Some(true));
        assert_eq!(deleted.message, "Product deleted successfully");

        let fetched = service.get_by_id(created.id, CancellationSignal::never()).await;
        assert_eq!(fetched.kind, Some(ErrorKind::NotFound));
        assert!(service
            .get_all(CancellationSignal::never())
            .await
            .data
            .unwrap()
            .is_empty());
        assert!(service
            .search("lap", CancellationSignal::never())
            .await
            .data
            .unwrap()
            .is_empty());

        let again = service.delete(created.id, CancellationSignal::never()).await;
        assert_eq!(again.kind, Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_delete_missing_product_is_not_found() {
        let db = TestDb::new();
        let service = service(&db);

        let response = service.delete(3, CancellationSignal::never()).await;

        assert!(!response.success);
        assert_eq!(response.kind, Some(ErrorKind::NotFound));
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    #[tokio::test]
    async fn test_second_page_of_twenty_five() {
        let db = TestDb::new();
        let category = db.seed_category("Fixtures");
        db.seed_products(category.meta.id, 25);
        let service = service(&db);

        let response = service.get_paged(2, 10, CancellationSignal::never()).await;
        assert!(response.success);
        let page = response.data.unwrap();

        let ids: Vec<i64> = page.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, (11..=20).collect::<Vec<i64>>());
        assert_eq!(page.page_number, 2);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.total_count, 25);
        assert_eq!(page.total_pages, 3);
    }

    #[tokio::test]
    async fn test_paging_arguments_are_validated() {
        let db = TestDb::new();
        let service = service(&db);

        for (page_number, page_size) in [(0, 10), (1, 0), (1, 101)] {
            let response = service
                .get_paged(page_number, page_size, CancellationSignal::never())
                .await;
            assert!(!response.success);
            assert_eq!(response.kind, Some(ErrorKind::Validation));
        }

        let largest = service.get_paged(1, 100, CancellationSignal::never()).await;
        assert!(largest.success);
    }

    #[tokio::test]
    async fn test_in_stock_and_by_category() {
        let db = TestDb::new();
        let electronics = db.seed_category("Electronics");
        let books = db.seed_category("Books");
        let service = service(&db);

        service
            .create(laptop_request(electronics.meta.id), CancellationSignal::never())
            .await;
        let mut sold_out = laptop_request(books.meta.id);
        sold_out.name = "Rare Atlas".to_string();
        sold_out.stock = 0;
        service.create(sold_out, CancellationSignal::never()).await;

        let in_stock = service.get_in_stock(CancellationSignal::never()).await.data.unwrap();
        assert_eq!(in_stock.len(), 1);
        assert_eq!(in_stock[0].name, "Laptop");

        let book_list = service
            .get_by_category(books.meta.id, CancellationSignal::never())
            .await
            .data
            .unwrap();
        assert_eq!(book_list.len(), 1);
        assert_eq!(book_list[0].category_name.as_deref(), Some("Books"));
    }

    #[tokio::test]
    async fn test_search_matches_fragment_and_rejects_blank() {
        let db = TestDb::new();
        let electronics = db.seed_category("Electronics");
        let service = service(&db);
        service
            .create(laptop_request(electronics.meta.id), CancellationSignal::never())
            .await;

        let found = service.search("lap", CancellationSignal::never()).await;
        assert!(found.success);
        assert_eq!(found.message, "Found 1 products");
        assert_eq!(found.data.unwrap()[0].name, "Laptop");

        let blank = service.search("", CancellationSignal::never()).await;
        assert!(blank.success);
        assert_eq!(blank.message, "Found 0 products");
        assert!(blank.data.unwrap().is_empty());
    }

    // ========================================================================
    // FAILURE PATHS
    // ========================================================================

    #[tokio::test]
    async fn test_internal_failure_is_sanitized() {
        let mut factory = MockUnitOfWorkFactory::new();
        factory
            .expect_create()
            .returning(|_| Err(AppError::Pool("secret connection string".to_string())));
        let service = ProductService::new(Arc::new(factory), PagingConfig::default());

        let response = service.get_all(CancellationSignal::never()).await;

        assert!(!response.success);
        assert_eq!(response.kind, Some(ErrorKind::Internal));
        assert_eq!(response.message, "Error retrieving products");
        assert_eq!(response.errors, vec![INTERNAL_ERROR_DETAIL.to_string()]);
        assert!(!serde_json::to_string(&response).unwrap().contains("secret"));
    }

    #[tokio::test]
    async fn test_cancelled_request_writes_nothing() {
        let db = TestDb::new();
        let electronics = db.seed_category("Electronics");
        let service = service(&db);

        let source = CancellationSource::new();
        source.cancel();
        let response = service
            .create(laptop_request(electronics.meta.id), source.signal())
            .await;

        assert!(!response.success);
        assert_eq!(response.kind, Some(ErrorKind::Cancelled));
        assert!(service
            .get_all(CancellationSignal::never())
            .await
            .data
            .unwrap()
            .is_empty());
    }
}
