//! Product repository: transactional writes and aggregated reads
//!
//! Every product mutation runs as a single transaction covering the row
//! write, category resolution, and association writes; an early error
//! return drops the transaction and rolls the whole operation back. The
//! association policy on update is full replacement: a present categories
//! field discards the previous set, an absent one leaves it alone.
//!
//! Reads reassemble the normalized rows into a nested product-with-
//! categories view. Each read is one statement, so a concurrent write can
//! never show up half-applied within a single response.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Row};

use crate::db::sql::SetClause;
use crate::models::{Category, CreateProductRequest, Product, ProductPatch};

use super::categories::resolve_categories;
use super::DbError;

/// Insert one junction row per resolved category. Escalates every failure
/// (including a duplicate pair) to the surrounding transaction.
async fn write_associations(
    conn: &mut PgConnection,
    product_id: i64,
    categories: &[Category],
) -> Result<(), DbError> {
    for category in categories {
        sqlx::query("INSERT INTO product_categories (product_id, category_id) VALUES ($1, $2)")
            .bind(product_id)
            .bind(category.id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Product repository
pub struct ProductRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product and its category associations atomically.
    ///
    /// An unresolvable category name rolls back the inserted product row
    /// as well: no orphan product is left behind.
    pub async fn create(&self, req: CreateProductRequest) -> Result<Product, DbError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO products (name, description, price)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.price)
        .fetch_one(&mut *tx)
        .await?;
        let id: i64 = row.get("id");
        let created_at: DateTime<Utc> = row.get("created_at");

        let mut categories = resolve_categories(&mut *tx, &req.categories).await?;
        write_associations(&mut *tx, id, &categories).await?;

        tx.commit().await?;

        categories.sort_by_key(|c| c.id);
        Ok(Product {
            id,
            name: req.name,
            description: req.description,
            price: req.price,
            created_at,
            categories,
        })
    }

    /// Fetch a product with its category set, ordered by category id.
    ///
    /// A product with zero associations yields an empty category list.
    pub async fn get(&self, id: i64) -> Result<Product, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT
                p.id, p.name, p.description, p.price, p.created_at,
                c.id AS category_id,
                c.name AS category_name,
                c.description AS category_description,
                c.created_at AS category_created_at
            FROM products p
            LEFT JOIN product_categories pc ON pc.product_id = p.id
            LEFT JOIN categories c ON c.id = pc.category_id
            WHERE p.id = $1
            ORDER BY c.id ASC
            "#,
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let first = rows.first().ok_or_else(|| DbError::NotFound {
            resource: "product",
            id: id.to_string(),
        })?;

        let mut product = Product {
            id: first.get("id"),
            name: first.get("name"),
            description: first.get("description"),
            price: first.get("price"),
            created_at: first.get("created_at"),
            categories: Vec::new(),
        };
        for row in &rows {
            let category_id: Option<i64> = row.get("category_id");
            if let Some(category_id) = category_id {
                product.categories.push(Category {
                    id: category_id,
                    name: row.get("category_name"),
                    description: row.get("category_description"),
                    created_at: row.get("category_created_at"),
                });
            }
        }

        Ok(product)
    }

    /// List the products associated with a category, each carrying its
    /// full category set.
    ///
    /// Rows arrive sorted by product id then category id, so a single
    /// pass groups them: a row either extends the product accumulated
    /// last or starts a new one. Zero matches yield an empty list.
    pub async fn list_by_category(&self, category_id: i64) -> Result<Vec<Product>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT
                p.id, p.name, p.description, p.price, p.created_at,
                c.id AS category_id,
                c.name AS category_name,
                c.description AS category_description,
                c.created_at AS category_created_at
            FROM products p
            JOIN product_categories pcm ON pcm.product_id = p.id AND pcm.category_id = $1
            JOIN product_categories pc ON pc.product_id = p.id
            JOIN categories c ON c.id = pc.category_id
            ORDER BY p.id, c.id
            "#,
        )
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        let mut products: Vec<Product> = Vec::new();
        for row in rows {
            let product_id: i64 = row.get("id");
            let category = Category {
                id: row.get("category_id"),
                name: row.get("category_name"),
                description: row.get("category_description"),
                created_at: row.get("category_created_at"),
            };

            match products.last_mut() {
                Some(product) if product.id == product_id => {
                    product.categories.push(category);
                }
                _ => products.push(Product {
                    id: product_id,
                    name: row.get("name"),
                    description: row.get("description"),
                    price: row.get("price"),
                    created_at: row.get("created_at"),
                    categories: vec![category],
                }),
            }
        }

        Ok(products)
    }

    /// Apply a partial-field patch to a product.
    ///
    /// The product row is locked up front, so two concurrent updates of
    /// the same product serialize instead of interleaving their
    /// association replacements. A resolution failure mid-replacement
    /// rolls back, leaving the prior association set untouched.
    pub async fn update(&self, id: i64, patch: ProductPatch) -> Result<(), DbError> {
        if patch.is_empty() {
            return Err(DbError::NoFieldsToUpdate);
        }

        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(DbError::NotFound {
                resource: "product",
                id: id.to_string(),
            });
        }

        if patch.has_scalar_fields() {
            let mut set = SetClause::new();
            if let Some(name) = &patch.name {
                set.push_text("name", name.clone());
            }
            if let Some(description) = &patch.description {
                set.push_text("description", description.clone());
            }
            if let Some(price) = patch.price {
                set.push_decimal("price", price);
            }

            let sql = format!(
                "UPDATE products SET {} WHERE id = ${}",
                set.render(),
                set.len() + 1
            );
            set.bind_values(sqlx::query(&sql))
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        // Full replacement: an explicit empty list clears the set, an
        // absent field never reaches this branch.
        if let Some(names) = &patch.categories {
            sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            let categories = resolve_categories(&mut *tx, names).await?;
            write_associations(&mut *tx, id, &categories).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a product and its association rows atomically.
    ///
    /// Both deletions share one transaction: either the junction rows and
    /// the product row all go, or none do.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(DbError::NotFound {
                resource: "product",
                id: id.to_string(),
            });
        }

        sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
