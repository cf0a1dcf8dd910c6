use serde::Serialize;
use serde_json::Value;
use sqlx::{self, postgres::PgRow, FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::query_builder::{bind_param_query_as, QueryBuilder};
use crate::filter::{Filter, FilterData};

/// Document-collection access over a single table. Reads go through the JSON
/// filter layer; mutations return the affected row (the findOneAndUpdate /
/// findOneAndDelete shapes), with any owner constraint riding in the filter
/// rather than being checked after a fetch.
pub struct Repository<T> {
    collection: String,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + Serialize,
{
    pub fn new(collection: impl Into<String>, pool: PgPool) -> Self {
        Self {
            collection: collection.into(),
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_any(&self, filter_data: FilterData) -> Result<Vec<T>, DatabaseError> {
        QueryBuilder::<T>::new(&self.collection)?
            .filter(filter_data)?
            .select_all(&self.pool)
            .await
    }

    pub async fn select_one(&self, filter_data: FilterData) -> Result<Option<T>, DatabaseError> {
        QueryBuilder::<T>::new(&self.collection)?
            .filter(filter_data)?
            .select_optional(&self.pool)
            .await
    }

    /// Insert a document and return the stored row.
    pub async fn insert_one(&self, columns: Vec<(&str, Value)>) -> Result<Option<T>, DatabaseError> {
        Self::validate_columns(&columns)?;
        let names: Vec<String> = columns.iter().map(|(c, _)| format!("\"{}\"", c)).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING *",
            self.collection,
            names.join(", "),
            placeholders.join(", ")
        );

        let values: Vec<Value> = columns.into_iter().map(|(_, v)| v).collect();
        let mut q = sqlx::query_as::<_, T>(&sql);
        for v in values.iter() {
            q = bind_param_query_as(q, v);
        }
        let row = q.fetch_optional(&self.pool).await?;
        Ok(row)
    }

    /// Update the document matching the filter and return the new row, or
    /// None when nothing matched (wrong id, or an owner constraint in the
    /// filter excluded the caller).
    pub async fn update_one(
        &self,
        filter_data: FilterData,
        changes: Vec<(&str, Value)>,
    ) -> Result<Option<T>, DatabaseError> {
        if changes.is_empty() {
            return Err(DatabaseError::QueryError("update requires at least one change".to_string()));
        }
        Self::validate_columns(&changes)?;

        let set_parts: Vec<String> = changes
            .iter()
            .enumerate()
            .map(|(i, (c, _))| format!("\"{}\" = ${}", c, i + 1))
            .collect();

        let where_sql = self.where_sql(filter_data, changes.len())?;
        let sql = format!(
            "UPDATE \"{}\" SET {} WHERE {} RETURNING *",
            self.collection,
            set_parts.join(", "),
            where_sql.query
        );

        let change_values: Vec<Value> = changes.into_iter().map(|(_, v)| v).collect();
        let mut q = sqlx::query_as::<_, T>(&sql);
        for v in change_values.iter() {
            q = bind_param_query_as(q, v);
        }
        for v in where_sql.params.iter() {
            q = bind_param_query_as(q, v);
        }
        let row = q.fetch_optional(&self.pool).await?;
        Ok(row)
    }

    /// Delete the document matching the filter and return the deleted row,
    /// or None when nothing matched.
    pub async fn delete_one(&self, filter_data: FilterData) -> Result<Option<T>, DatabaseError> {
        let where_sql = self.where_sql(filter_data, 0)?;
        let sql = format!(
            "DELETE FROM \"{}\" WHERE {} RETURNING *",
            self.collection, where_sql.query
        );

        let mut q = sqlx::query_as::<_, T>(&sql);
        for v in where_sql.params.iter() {
            q = bind_param_query_as(q, v);
        }
        let row = q.fetch_optional(&self.pool).await?;
        Ok(row)
    }

    fn where_sql(
        &self,
        filter_data: FilterData,
        starting_param_index: usize,
    ) -> Result<crate::filter::types::SqlResult, DatabaseError> {
        let mut filter = Filter::new(&self.collection).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        filter
            .assign(filter_data)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        filter
            .to_where_sql(starting_param_index)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))
    }

    fn validate_columns(columns: &[(&str, Value)]) -> Result<(), DatabaseError> {
        for (name, _) in columns {
            let mut chars = name.chars();
            let ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !ok {
                return Err(DatabaseError::QueryError(format!("Invalid column name: {}", name)));
            }
        }
        Ok(())
    }
}
