//! Dynamic SET-clause construction for partial-field updates
//!
//! Patch types mark field presence with `Option`; this builder turns the
//! present fields into `SET col = $n, ..` with positional parameters and
//! binds the collected values in the same order. No ad-hoc string
//! concatenation of values ever reaches the statement text.

use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

/// A value destined for a positional bind slot.
#[derive(Debug)]
pub enum SqlValue {
    Text(String),
    Decimal(Decimal),
}

/// Accumulates (column, value) pairs for an UPDATE statement.
#[derive(Debug, Default)]
pub struct SetClause {
    parts: Vec<(&'static str, SqlValue)>,
}

impl SetClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, column: &'static str, value: impl Into<String>) {
        self.parts.push((column, SqlValue::Text(value.into())));
    }

    pub fn push_decimal(&mut self, column: &'static str, value: Decimal) {
        self.parts.push((column, SqlValue::Decimal(value)));
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Render `col = $1, col2 = $2, ..` in accumulation order.
    pub fn render(&self) -> String {
        self.parts
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ${}", column, i + 1))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Bind the accumulated values onto `query`, in accumulation order.
    /// The caller appends any trailing binds (e.g. the WHERE id) afterwards.
    pub fn bind_values<'q>(
        self,
        mut query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        for (_, value) in self.parts {
            query = match value {
                SqlValue::Text(s) => query.bind(s),
                SqlValue::Decimal(d) => query.bind(d),
            };
        }
        query
    }
}
