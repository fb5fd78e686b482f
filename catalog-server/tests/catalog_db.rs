//! Database-backed integration tests for the catalog repositories.
//!
//! These exercise the transactional write path (atomicity, full
//! replacement, rollback) and the aggregated reads against a real
//! PostgreSQL instance.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p catalog-server -- --ignored

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rust_decimal::Decimal;
use sqlx::PgPool;

use catalog_server::db::{self, CategoryRepo, DbError, ProductRepo, UserRepo};
use catalog_server::models::{CategoryPatch, CreateCategoryRequest, CreateProductRequest, ProductPatch};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique per-test name suffix so runs never collide on unique columns.
fn unique(name: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}-{}", name, std::process::id(), nanos, n)
}

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = db::create_pool(&url).await.expect("pool creation failed");
    db::ensure_schema(&pool).await.expect("schema bootstrap failed");
    pool
}

async fn create_category(pool: &PgPool, name: &str) -> catalog_server::models::Category {
    CategoryRepo::new(pool)
        .create(CreateCategoryRequest {
            name: name.to_owned(),
            description: None,
        })
        .await
        .expect("category creation failed")
}

async fn association_count(pool: &PgPool, product_id: i64) -> i64 {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM product_categories WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(pool)
            .await
            .expect("count query failed");
    row.0
}

#[tokio::test]
#[ignore = "requires database"]
async fn create_product_attaches_named_category() {
    // Scenario A
    let pool = test_pool().await;
    let books = unique("books");
    create_category(&pool, &books).await;

    let product = ProductRepo::new(&pool)
        .create(CreateProductRequest {
            name: unique("novel"),
            description: "a novel".into(),
            price: Decimal::new(999, 2),
            categories: vec![books.clone()],
        })
        .await
        .expect("product creation failed");

    assert_eq!(product.categories.len(), 1);
    assert_eq!(product.categories[0].name, books);
    assert_eq!(product.price, Decimal::new(999, 2));
}

#[tokio::test]
#[ignore = "requires database"]
async fn unknown_category_leaves_no_product_row() {
    // Scenario B / P1: the inserted product row rolls back with the
    // failed resolution.
    let pool = test_pool().await;
    let repo = ProductRepo::new(&pool);
    let name = unique("phantom");

    let err = repo
        .create(CreateProductRequest {
            name: name.clone(),
            description: String::new(),
            price: Decimal::new(100, 2),
            categories: vec![unique("ghost")],
        })
        .await
        .expect_err("creation should fail");
    assert!(matches!(err, DbError::CategoryNotFound { .. }));

    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE name = $1")
        .bind(&name)
        .fetch_one(&pool)
        .await
        .expect("count query failed");
    assert_eq!(row.0, 0, "rolled-back create must leave no row");
}

#[tokio::test]
#[ignore = "requires database"]
async fn price_only_update_preserves_categories_exactly() {
    // Scenario C: category set untouched, price exact with no drift.
    let pool = test_pool().await;
    let cat_a = create_category(&pool, &unique("fiction")).await;
    let cat_b = create_category(&pool, &unique("paperback")).await;

    let repo = ProductRepo::new(&pool);
    let product = repo
        .create(CreateProductRequest {
            name: unique("novel"),
            description: String::new(),
            price: Decimal::new(1250, 2),
            categories: vec![cat_a.name.clone(), cat_b.name.clone()],
        })
        .await
        .expect("product creation failed");

    repo.update(
        product.id,
        ProductPatch {
            price: Some(Decimal::new(999, 2)),
            ..Default::default()
        },
    )
    .await
    .expect("update failed");

    let fetched = repo.get(product.id).await.expect("get failed");
    assert_eq!(fetched.price, Decimal::new(999, 2));
    let ids: Vec<i64> = fetched.categories.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![cat_a.id.min(cat_b.id), cat_a.id.max(cat_b.id)]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn categories_update_is_full_replacement() {
    // P2: the new set fully replaces the old one, whatever it was.
    let pool = test_pool().await;
    let old = create_category(&pool, &unique("old")).await;
    let new_a = create_category(&pool, &unique("new-a")).await;
    let new_b = create_category(&pool, &unique("new-b")).await;

    let repo = ProductRepo::new(&pool);
    let product = repo
        .create(CreateProductRequest {
            name: unique("gadget"),
            description: String::new(),
            price: Decimal::new(500, 2),
            categories: vec![old.name.clone()],
        })
        .await
        .expect("product creation failed");

    repo.update(
        product.id,
        ProductPatch {
            categories: Some(vec![new_a.name.clone(), new_b.name.clone()]),
            ..Default::default()
        },
    )
    .await
    .expect("update failed");

    let fetched = repo.get(product.id).await.expect("get failed");
    let mut expected = vec![new_a.id, new_b.id];
    expected.sort_unstable();
    let ids: Vec<i64> = fetched.categories.iter().map(|c| c.id).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
#[ignore = "requires database"]
async fn absent_categories_field_differs_from_empty_set() {
    // P3
    let pool = test_pool().await;
    let cat = create_category(&pool, &unique("kept")).await;

    let repo = ProductRepo::new(&pool);
    let product = repo
        .create(CreateProductRequest {
            name: unique("widget"),
            description: String::new(),
            price: Decimal::new(100, 2),
            categories: vec![cat.name.clone()],
        })
        .await
        .expect("product creation failed");

    // Field absent: association set untouched.
    repo.update(
        product.id,
        ProductPatch {
            name: Some(unique("renamed")),
            ..Default::default()
        },
    )
    .await
    .expect("update failed");
    assert_eq!(association_count(&pool, product.id).await, 1);

    // Explicit empty set: cleared.
    repo.update(
        product.id,
        ProductPatch {
            categories: Some(vec![]),
            ..Default::default()
        },
    )
    .await
    .expect("update failed");
    assert_eq!(association_count(&pool, product.id).await, 0);

    let fetched = repo.get(product.id).await.expect("get failed");
    assert!(fetched.categories.is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn categories_read_back_sorted_by_id() {
    // P4: insertion order does not leak into the read.
    let pool = test_pool().await;
    let c1 = create_category(&pool, &unique("aa")).await;
    let c2 = create_category(&pool, &unique("bb")).await;
    let c3 = create_category(&pool, &unique("cc")).await;

    let repo = ProductRepo::new(&pool);
    let product = repo
        .create(CreateProductRequest {
            name: unique("sorted"),
            description: String::new(),
            price: Decimal::new(100, 2),
            categories: vec![c3.name.clone(), c1.name.clone(), c2.name.clone()],
        })
        .await
        .expect("product creation failed");

    let fetched = repo.get(product.id).await.expect("get failed");
    let ids: Vec<i64> = fetched.categories.iter().map(|c| c.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
#[ignore = "requires database"]
async fn delete_removes_product_and_associations_together() {
    // P5
    let pool = test_pool().await;
    let cat = create_category(&pool, &unique("doomed")).await;

    let repo = ProductRepo::new(&pool);
    let product = repo
        .create(CreateProductRequest {
            name: unique("ephemeral"),
            description: String::new(),
            price: Decimal::new(100, 2),
            categories: vec![cat.name.clone()],
        })
        .await
        .expect("product creation failed");

    repo.delete(product.id).await.expect("delete failed");

    assert_eq!(association_count(&pool, product.id).await, 0);
    let err = repo.get(product.id).await.expect_err("product should be gone");
    assert!(matches!(err, DbError::NotFound { .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn failed_replacement_preserves_prior_associations() {
    // Resolution failure mid-replacement must not leave the product with
    // zero categories.
    let pool = test_pool().await;
    let cat = create_category(&pool, &unique("stable")).await;

    let repo = ProductRepo::new(&pool);
    let product = repo
        .create(CreateProductRequest {
            name: unique("resilient"),
            description: String::new(),
            price: Decimal::new(100, 2),
            categories: vec![cat.name.clone()],
        })
        .await
        .expect("product creation failed");

    let err = repo
        .update(
            product.id,
            ProductPatch {
                categories: Some(vec![cat.name.clone(), unique("ghost")]),
                ..Default::default()
            },
        )
        .await
        .expect_err("update should fail");
    assert!(matches!(err, DbError::CategoryNotFound { .. }));

    let fetched = repo.get(product.id).await.expect("get failed");
    assert_eq!(fetched.categories.len(), 1);
    assert_eq!(fetched.categories[0].id, cat.id);
}

#[tokio::test]
#[ignore = "requires database"]
async fn concurrent_updates_serialize_to_one_set() {
    // Scenario D: disjoint sets {A} and {B} end as exactly one of the
    // two, never an interleaving.
    let pool = test_pool().await;
    let cat_a = create_category(&pool, &unique("set-a")).await;
    let cat_b = create_category(&pool, &unique("set-b")).await;

    let product = ProductRepo::new(&pool)
        .create(CreateProductRequest {
            name: unique("contended"),
            description: String::new(),
            price: Decimal::new(100, 2),
            categories: vec![],
        })
        .await
        .expect("product creation failed");

    let pool_a = pool.clone();
    let name_a = cat_a.name.clone();
    let id = product.id;
    let task_a = tokio::spawn(async move {
        ProductRepo::new(&pool_a)
            .update(
                id,
                ProductPatch {
                    categories: Some(vec![name_a]),
                    ..Default::default()
                },
            )
            .await
    });

    let pool_b = pool.clone();
    let name_b = cat_b.name.clone();
    let task_b = tokio::spawn(async move {
        ProductRepo::new(&pool_b)
            .update(
                id,
                ProductPatch {
                    categories: Some(vec![name_b]),
                    ..Default::default()
                },
            )
            .await
    });

    task_a.await.expect("task panicked").expect("update A failed");
    task_b.await.expect("task panicked").expect("update B failed");

    let fetched = ProductRepo::new(&pool).get(id).await.expect("get failed");
    let ids: Vec<i64> = fetched.categories.iter().map(|c| c.id).collect();
    assert!(
        ids == vec![cat_a.id] || ids == vec![cat_b.id],
        "expected one winner, got {:?}",
        ids
    );
}

#[tokio::test]
#[ignore = "requires database"]
async fn listing_by_category_groups_products_once() {
    let pool = test_pool().await;
    let cat_x = create_category(&pool, &unique("x")).await;
    let cat_y = create_category(&pool, &unique("y")).await;

    let repo = ProductRepo::new(&pool);
    let product = repo
        .create(CreateProductRequest {
            name: unique("multi"),
            description: String::new(),
            price: Decimal::new(100, 2),
            categories: vec![cat_x.name.clone(), cat_y.name.clone()],
        })
        .await
        .expect("product creation failed");

    let listed = repo
        .list_by_category(cat_x.id)
        .await
        .expect("list failed");

    let entry: Vec<_> = listed.iter().filter(|p| p.id == product.id).collect();
    assert_eq!(entry.len(), 1, "product must appear exactly once");
    let ids: Vec<i64> = entry[0].categories.iter().map(|c| c.id).collect();
    let mut expected = vec![cat_x.id, cat_y.id];
    expected.sort_unstable();
    assert_eq!(ids, expected);
}

#[tokio::test]
#[ignore = "requires database"]
async fn listing_by_unused_category_is_empty_not_an_error() {
    let pool = test_pool().await;
    let cat = create_category(&pool, &unique("empty")).await;

    let listed = ProductRepo::new(&pool)
        .list_by_category(cat.id)
        .await
        .expect("list failed");
    assert!(listed.is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn empty_patch_is_rejected_without_touching_store() {
    let pool = test_pool().await;
    let repo = ProductRepo::new(&pool);

    let err = repo
        .update(i64::MAX, ProductPatch::default())
        .await
        .expect_err("empty patch should fail");
    assert!(matches!(err, DbError::NoFieldsToUpdate));
}

#[tokio::test]
#[ignore = "requires database"]
async fn updating_missing_product_is_not_found() {
    let pool = test_pool().await;
    let err = ProductRepo::new(&pool)
        .update(
            i64::MAX,
            ProductPatch {
                name: Some("nobody".into()),
                ..Default::default()
            },
        )
        .await
        .expect_err("update should fail");
    assert!(matches!(err, DbError::NotFound { .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn duplicate_category_name_conflicts() {
    let pool = test_pool().await;
    let name = unique("dup");
    create_category(&pool, &name).await;

    let err = CategoryRepo::new(&pool)
        .create(CreateCategoryRequest {
            name: name.clone(),
            description: None,
        })
        .await
        .expect_err("duplicate should fail");
    assert!(matches!(err, DbError::AlreadyExists { .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn category_patch_and_delete_roundtrip() {
    let pool = test_pool().await;
    let repo = CategoryRepo::new(&pool);
    let category = create_category(&pool, &unique("mutable")).await;

    let renamed = unique("renamed");
    repo.update(
        category.id,
        CategoryPatch {
            name: Some(renamed.clone()),
            description: None,
        },
    )
    .await
    .expect("update failed");

    let fetched = repo.get(category.id).await.expect("get failed");
    assert_eq!(fetched.name, renamed);

    repo.delete(category.id).await.expect("delete failed");
    let err = repo.get(category.id).await.expect_err("category should be gone");
    assert!(matches!(err, DbError::NotFound { .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn deleting_category_cascades_its_associations() {
    let pool = test_pool().await;
    let cat = create_category(&pool, &unique("cascading")).await;

    let product = ProductRepo::new(&pool)
        .create(CreateProductRequest {
            name: unique("survivor"),
            description: String::new(),
            price: Decimal::new(100, 2),
            categories: vec![cat.name.clone()],
        })
        .await
        .expect("product creation failed");

    CategoryRepo::new(&pool)
        .delete(cat.id)
        .await
        .expect("delete failed");

    // Associations are gone, the product itself survives.
    assert_eq!(association_count(&pool, product.id).await, 0);
    let fetched = ProductRepo::new(&pool)
        .get(product.id)
        .await
        .expect("get failed");
    assert!(fetched.categories.is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn duplicate_username_conflicts() {
    let pool = test_pool().await;
    let repo = UserRepo::new(&pool);
    let username = unique("user").replace('-', "_");

    repo.create(&username, Some("First"), "hash-1")
        .await
        .expect("user creation failed");
    let err = repo
        .create(&username, Some("Second"), "hash-2")
        .await
        .expect_err("duplicate should fail");
    assert!(matches!(err, DbError::AlreadyExists { .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn token_lookup_finds_registered_user() {
    let pool = test_pool().await;
    let repo = UserRepo::new(&pool);
    let username = unique("holder").replace('-', "_");
    let token = catalog_server::models::derive_token(&username, "secret");

    repo.create(&username, None, &token)
        .await
        .expect("user creation failed");

    let found = repo.find_by_token(&token).await.expect("lookup failed");
    assert_eq!(found.map(|u| u.username), Some(username));

    let missing = repo
        .find_by_token("no-such-token")
        .await
        .expect("lookup failed");
    assert!(missing.is_none());
}
