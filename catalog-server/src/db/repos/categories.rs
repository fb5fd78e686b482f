//! Category repository and category resolution
//!
//! Categories are addressed by name at the write API boundary; the resolver
//! turns an ordered list of names into `Category` rows, failing fast on the
//! first unknown name. It runs on the caller's open transaction so it
//! observes the same snapshot as the surrounding write.

use sqlx::{PgConnection, PgPool};

use crate::db::sql::SetClause;
use crate::models::{Category, CategoryPatch, CreateCategoryRequest};

use super::{on_unique_violation, DbError};

/// Resolve category names into rows, in input order, fail-fast.
///
/// Read-only; executes on the caller's connection or transaction.
pub(crate) async fn resolve_categories(
    conn: &mut PgConnection,
    names: &[String],
) -> Result<Vec<Category>, DbError> {
    let mut categories = Vec::with_capacity(names.len());
    for name in names {
        let category: Option<Category> = sqlx::query_as(
            "SELECT id, name, description, created_at FROM categories WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        match category {
            Some(category) => categories.push(category),
            None => {
                return Err(DbError::CategoryNotFound {
                    name: name.clone(),
                })
            }
        }
    }
    Ok(categories)
}

/// Category repository
pub struct CategoryRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a category. Duplicate names map to `AlreadyExists`.
    pub async fn create(&self, req: CreateCategoryRequest) -> Result<Category, DbError> {
        sqlx::query_as(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(&req.name)
        .bind(req.description.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| on_unique_violation(e, "category", &req.name))
    }

    /// Get a single category by id.
    pub async fn get(&self, id: i64) -> Result<Category, DbError> {
        sqlx::query_as("SELECT id, name, description, created_at FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: "category",
                id: id.to_string(),
            })
    }

    /// List all categories ordered by id ascending.
    pub async fn get_all(&self) -> Result<Vec<Category>, DbError> {
        let categories = sqlx::query_as(
            "SELECT id, name, description, created_at FROM categories ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(categories)
    }

    /// Apply a partial-field patch. Fails with `NoFieldsToUpdate` when the
    /// patch carries nothing, without touching the store.
    pub async fn update(&self, id: i64, patch: CategoryPatch) -> Result<(), DbError> {
        let mut set = SetClause::new();
        if let Some(name) = &patch.name {
            set.push_text("name", name.clone());
        }
        if let Some(description) = &patch.description {
            set.push_text("description", description.clone());
        }
        if set.is_empty() {
            return Err(DbError::NoFieldsToUpdate);
        }

        let sql = format!(
            "UPDATE categories SET {} WHERE id = ${}",
            set.render(),
            set.len() + 1
        );
        let result = set
            .bind_values(sqlx::query(&sql))
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                on_unique_violation(e, "category", patch.name.as_deref().unwrap_or_default())
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "category",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Delete a category. Its junction rows go with it (ON DELETE CASCADE);
    /// the associated products themselves are untouched.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "category",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
