use sqlx::{
    self,
    postgres::{PgArguments, PgRow},
    FromRow, PgPool, Row,
};
use uuid::Uuid;

use crate::database::query::{validate_identifier, Query, SqlParam, SqlQuery};
use crate::database::StoreError;

/// Column/value pairs for insert and partial-update writes.
pub type ColumnValues = Vec<(&'static str, SqlParam)>;

/// Collection-oriented access to one table: filtered reads plus atomic
/// single-row writes. Multi-statement sequences are NOT transactional here;
/// callers needing one (the like toggle) open their own transaction.
pub struct Repository<T> {
    table_name: String,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

// Manual impl: cloning shares the pool and must not require T: Clone.
impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            table_name: self.table_name.clone(),
            pool: self.pool.clone(),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>, pool: PgPool) -> Self {
        Self {
            table_name: table_name.into(),
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn find(&self, query: Query) -> Result<Vec<T>, StoreError> {
        let SqlQuery { sql, params } = query.select_sql(&self.table_name)?;
        let mut q = sqlx::query_as::<_, T>(&sql);
        for p in params {
            q = bind_query_as(q, p);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    pub async fn find_one(&self, query: Query) -> Result<Option<T>, StoreError> {
        let SqlQuery { sql, params } = query.limit(1).select_sql(&self.table_name)?;
        let mut q = sqlx::query_as::<_, T>(&sql);
        for p in params {
            q = bind_query_as(q, p);
        }
        Ok(q.fetch_optional(&self.pool).await?)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<T, StoreError> {
        self.find_one(Query::new().eq("id", id))
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Record {} not found in {}", id, self.table_name)))
    }

    pub async fn count(&self, query: Query) -> Result<i64, StoreError> {
        let SqlQuery { sql, params } = query.count_sql(&self.table_name)?;
        let mut q = sqlx::query(&sql);
        for p in params {
            q = bind_query(q, p);
        }
        let row = q.fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    pub async fn insert(&self, columns: ColumnValues) -> Result<T, StoreError> {
        let sql = insert_sql(&self.table_name, &columns)?;
        let mut q = sqlx::query_as::<_, T>(&sql);
        for (_, p) in columns {
            q = bind_query_as(q, p);
        }
        Ok(q.fetch_one(&self.pool).await?)
    }

    /// Partial update: only the given columns change. Missing row maps to
    /// NotFound rather than an empty result.
    pub async fn update(&self, id: Uuid, columns: ColumnValues) -> Result<T, StoreError> {
        let sql = update_sql(&self.table_name, &columns)?;
        let mut q = sqlx::query_as::<_, T>(&sql);
        for (_, p) in columns {
            q = bind_query_as(q, p);
        }
        q = q.bind(id);
        q.fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Record {} not found in {}", id, self.table_name)))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM \"{}\" WHERE id = $1", self.table_name);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "Record {} not found in {}",
                id, self.table_name
            )));
        }
        Ok(())
    }
}

fn insert_sql(table: &str, columns: &ColumnValues) -> Result<String, StoreError> {
    validate_identifier(table)?;
    if columns.is_empty() {
        return Err(StoreError::QueryError("Insert requires at least one column".to_string()));
    }
    for (name, _) in columns {
        validate_identifier(name)?;
    }

    let names = columns
        .iter()
        .map(|(name, _)| format!("\"{}\"", name))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|n| format!("${}", n))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING *",
        table, names, placeholders
    ))
}

fn update_sql(table: &str, columns: &ColumnValues) -> Result<String, StoreError> {
    validate_identifier(table)?;
    if columns.is_empty() {
        return Err(StoreError::QueryError("Update requires at least one column".to_string()));
    }
    for (name, _) in columns {
        validate_identifier(name)?;
    }

    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, (name, _))| format!("\"{}\" = ${}", name, i + 1))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "UPDATE \"{}\" SET {} WHERE id = ${} RETURNING *",
        table,
        assignments,
        columns.len() + 1
    ))
}

fn bind_query(
    q: sqlx::query::Query<'_, sqlx::Postgres, PgArguments>,
    p: SqlParam,
) -> sqlx::query::Query<'_, sqlx::Postgres, PgArguments> {
    match p {
        SqlParam::Text(v) => q.bind(v),
        SqlParam::Uuid(v) => q.bind(v),
        SqlParam::Int(v) => q.bind(v),
        SqlParam::Float(v) => q.bind(v),
        SqlParam::Bool(v) => q.bind(v),
        SqlParam::Timestamp(v) => q.bind(v),
    }
}

fn bind_query_as<O>(
    q: sqlx::query::QueryAs<'_, sqlx::Postgres, O, PgArguments>,
    p: SqlParam,
) -> sqlx::query::QueryAs<'_, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match p {
        SqlParam::Text(v) => q.bind(v),
        SqlParam::Uuid(v) => q.bind(v),
        SqlParam::Int(v) => q.bind(v),
        SqlParam::Float(v) => q.bind(v),
        SqlParam::Bool(v) => q.bind(v),
        SqlParam::Timestamp(v) => q.bind(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_insert_with_returning() {
        let columns: ColumnValues = vec![
            ("id", Uuid::new_v4().into()),
            ("name", "Wax hollandais".into()),
            ("price", 25.0.into()),
        ];
        let sql = insert_sql("products", &columns).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"products\" (\"id\", \"name\", \"price\") VALUES ($1, $2, $3) RETURNING *"
        );
    }

    #[test]
    fn builds_partial_update_with_trailing_id_param() {
        let columns: ColumnValues = vec![("price", 30.0.into()), ("stock_quantity", SqlParam::Int(5))];
        let sql = update_sql("products", &columns).unwrap();
        assert_eq!(
            sql,
            "UPDATE \"products\" SET \"price\" = $1, \"stock_quantity\" = $2 WHERE id = $3 RETURNING *"
        );
    }

    #[test]
    fn rejects_empty_writes() {
        assert!(insert_sql("products", &vec![]).is_err());
        assert!(update_sql("products", &vec![]).is_err());
    }

    #[test]
    fn rejects_hostile_column_names() {
        let columns: ColumnValues = vec![("price\" = 0 --", 1.0.into())];
        assert!(update_sql("products", &columns).is_err());
    }
}
