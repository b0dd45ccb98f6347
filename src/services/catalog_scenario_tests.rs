// src/services/catalog_scenario_tests.rs
//
// End-to-end flows through AppState, the way a host drives the services.

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::application::{
        AppState, CreateCategoryRequest, CreateProductRequest, ErrorKind,
    };
    use crate::cancellation::CancellationSignal;
    use crate::config::PagingConfig;
    use crate::test_support::TestDb;

    #[tokio::test]
    async fn test_category_with_products_cannot_be_deleted() {
        let db = TestDb::new();
        let state = AppState::new(db.pool.clone(), PagingConfig::default());

        let electronics = state
            .category_service
            .create(
                CreateCategoryRequest {
                    name: "Electronics".to_string(),
                    description: "Devices".to_string(),
                },
                CancellationSignal::never(),
            )
            .await
            .data
            .unwrap();

        let laptop = state
            .product_service
            .create(
                CreateProductRequest {
                    name: "Laptop".to_string(),
                    description: "15-inch".to_string(),
                    price: Decimal::new(99999, 2),
                    stock: 5,
                    category_id: electronics.id,
                },
                CancellationSignal::never(),
            )
            .await
            .data
            .unwrap();

        let listed = state
            .product_service
            .get_by_category(electronics.id, CancellationSignal::never())
            .await
            .data
            .unwrap();
        assert!(listed.iter().any(|p| p.id == laptop.id));

        let refused = state
            .category_service
            .delete(electronics.id, CancellationSignal::never())
            .await;
        assert!(!refused.success);
        assert_eq!(refused.kind, Some(ErrorKind::Conflict));
        assert_eq!(refused.message, "Cannot delete category");
        assert_eq!(refused.errors, vec!["Category has associated products".to_string()]);

        let still_there = state
            .category_service
            .get_by_id(electronics.id, CancellationSignal::never())
            .await;
        assert!(still_there.success);
        assert_eq!(still_there.data.unwrap().product_count, 1);
    }

    #[tokio::test]
    async fn test_category_becomes_deletable_once_emptied() {
        let db = TestDb::new();
        let state = AppState::new(db.pool.clone(), PagingConfig::default());
        let garden = db.seed_category("Garden");
        let products = db.seed_products(garden.meta.id, 2);

        for product in &products {
            let deleted = state
                .product_service
                .delete(product.meta.id, CancellationSignal::never())
                .await;
            assert!(deleted.success);
        }

        let count = state
            .category_service
            .get_by_id(garden.meta.id, CancellationSignal::never())
            .await
            .data
            .unwrap()
            .product_count;
        assert_eq!(count, 0);

        let response = state
            .category_service
            .delete(garden.meta.id, CancellationSignal::never())
            .await;
        assert!(response.success, "{:?}", response.errors);
    }

    #[tokio::test]
    async fn test_product_cannot_be_created_in_deleted_category() {
        let db = TestDb::new();
        let state = AppState::new(db.pool.clone(), PagingConfig::default());
        let closed = db.seed_category("Closed");
        assert!(
            state
                .category_service
                .delete(closed.meta.id, CancellationSignal::never())
                .await
                .success
        );

        let response = state
            .product_service
            .create(
                CreateProductRequest {
                    name: "Orphan".to_string(),
                    description: "No home".to_string(),
                    price: Decimal::new(500, 2),
                    stock: 1,
                    category_id: closed.meta.id,
                },
                CancellationSignal::never(),
            )
            .await;

        assert_eq!(response.kind, Some(ErrorKind::InvalidReference));
        assert_eq!(response.message, "Invalid category");
    }
}
