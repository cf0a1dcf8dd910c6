use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, FilterOrderInfo, SqlResult};

pub struct Filter {
    collection: String,
    select_columns: Vec<String>,
    where_data: Option<Value>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i32>,
    offset: Option<i32>,
}

impl Filter {
    pub fn new(collection: impl Into<String>) -> Result<Self, FilterError> {
        let collection = collection.into();
        Self::validate_collection_name(&collection)?;
        Ok(Self {
            collection,
            select_columns: vec![],
            where_data: None,
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(select) = data.select {
            self.select(select)?;
        }
        if let Some(where_clause) = data.where_clause {
            self.where_clause(where_clause)?;
        }
        if let Some(order) = data.order {
            self.order(order)?;
        }
        if let Some(limit) = data.limit {
            self.limit(limit, data.offset)?;
        }
        Ok(self)
    }

    pub fn select(&mut self, columns: Vec<String>) -> Result<&mut Self, FilterError> {
        Self::validate_select_columns(&columns)?;
        self.select_columns = columns;
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        self.where_data = Some(conditions);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: Value) -> Result<&mut Self, FilterError> {
        let order_info = FilterOrder::validate_and_parse(&order_spec)?;
        self.order_data = order_info;
        Ok(self)
    }

    pub fn limit(&mut self, limit: i32, offset: Option<i32>) -> Result<&mut Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        if let Some(off) = offset {
            if off < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
        }

        // Apply max limit from config
        let max_limit = crate::config::CONFIG.api.max_list_limit.unwrap_or(i32::MAX);
        let applied_limit = if limit > max_limit {
            tracing::warn!("Limit {} exceeds max {}, capping to max", limit, max_limit);
            max_limit
        } else {
            limit
        };

        self.limit = Some(applied_limit);
        self.offset = offset;
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let select_clause = self.build_select_clause();
        let (where_clause, params) = self.to_where_parts()?;
        let order_clause = FilterOrder::generate(&self.order_data)?;
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT {}", select_clause),
            format!("FROM \"{}\"", self.collection),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    /// Just the WHERE body plus its params, for callers that embed the filter
    /// into UPDATE/DELETE statements. Params are numbered from
    /// `starting_param_index + 1`.
    pub fn to_where_sql(&self, starting_param_index: usize) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = if let Some(ref where_data) = self.where_data {
            FilterWhere::generate(where_data, starting_param_index)?
        } else {
            ("1=1".to_string(), vec![])
        };
        Ok(SqlResult { query: where_clause, params })
    }

    fn to_where_parts(&self) -> Result<(String, Vec<Value>), FilterError> {
        if let Some(ref where_data) = self.where_data {
            FilterWhere::generate(where_data, 0)
        } else {
            Ok(("1=1".to_string(), vec![]))
        }
    }

    fn validate_collection_name(name: &str) -> Result<(), FilterError> {
        if name.is_empty() {
            return Err(FilterError::InvalidCollectionName("Collection name cannot be empty".to_string()));
        }
        let first = name.chars().next().unwrap();
        if !name.chars().all(|c| c.is_alphanumeric() || c == '_') || (!first.is_alphabetic() && first != '_') {
            return Err(FilterError::InvalidCollectionName(format!("Invalid collection name format: {}", name)));
        }
        Ok(())
    }

    fn validate_select_columns(columns: &[String]) -> Result<(), FilterError> {
        for column in columns {
            if column == "*" {
                continue;
            }
            if column.is_empty() {
                return Err(FilterError::InvalidColumn("Column name cannot be empty".to_string()));
            }
            let first = column.chars().next().unwrap();
            if !column.chars().all(|c| c.is_alphanumeric() || c == '_') || (!first.is_alphabetic() && first != '_') {
                return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)));
            }
        }
        Ok(())
    }

    fn build_select_clause(&self) -> String {
        if self.select_columns.is_empty() || self.select_columns.contains(&"*".to_string()) {
            "*".to_string()
        } else {
            self.select_columns.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", ")
        }
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_select_all() {
        let filter = Filter::new("cats").unwrap();
        let sql = filter.to_sql().unwrap();
        assert_eq!(sql.query, "SELECT * FROM \"cats\" WHERE 1=1");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn where_and_order() {
        let mut filter = Filter::new("cats").unwrap();
        filter
            .assign(FilterData {
                where_clause: Some(json!({"owner_id": "7e57ed11-0000-4000-8000-000000000001"})),
                order: Some(json!("created_at desc")),
                ..Default::default()
            })
            .unwrap();
        let sql = filter.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"cats\" WHERE \"owner_id\" = $1 ORDER BY \"created_at\" DESC"
        );
        assert_eq!(sql.params.len(), 1);
    }

    #[test]
    fn where_sql_respects_starting_index() {
        let mut filter = Filter::new("cats").unwrap();
        filter.where_clause(json!({"id": "a", "owner_id": "b"})).unwrap();
        let sql = filter.to_where_sql(3).unwrap();
        assert_eq!(sql.query, "\"id\" = $4 AND \"owner_id\" = $5");
    }

    #[test]
    fn rejects_bad_collection_names() {
        assert!(Filter::new("cats; DROP TABLE users").is_err());
        assert!(Filter::new("").is_err());
    }
}
