use serde_json::Value;

use super::error::FilterError;
use super::types::{FilterOp, FilterWhereInfo};

/// Compiles a JSON where-clause into a SQL condition string plus bind params.
///
/// Conditions are mongo-flavored: implicit equality (`{"name": "Siiri"}`),
/// `$`-prefixed comparison operators, `$and`/`$or`/`$not` logical nesting,
/// and `$geoWithin` on the `location` pseudo-column which compiles to a
/// Postgres point-in-polygon containment test.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
    conditions: Vec<FilterWhereInfo>,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    pub fn generate(where_data: &Value, starting_param_index: usize) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(where_data)
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        if where_data.is_null() {
            return Ok(());
        }
        match where_data {
            Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn build(&mut self, where_data: &Value) -> Result<(String, Vec<Value>), FilterError> {
        self.parse_where_data(where_data)?;

        let mut sql_conditions = vec![];
        let conditions_snapshot = self.conditions.clone();
        for condition in &conditions_snapshot {
            sql_conditions.push(self.build_sql_condition(condition)?);
        }
        let where_clause = if sql_conditions.is_empty() {
            "1=1".to_string()
        } else {
            sql_conditions.join(" AND ")
        };
        Ok((where_clause, self.param_values.clone()))
    }

    fn parse_where_data(&mut self, where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Object(obj) => {
                for (key, value) in obj {
                    if key.starts_with('$') {
                        self.parse_logical_operator(key, value)?;
                    } else {
                        self.parse_field_condition(key, value)?;
                    }
                }
                Ok(())
            }
            _ => Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        }
    }

    fn parse_logical_operator(&mut self, op: &str, value: &Value) -> Result<(), FilterError> {
        match op {
            "$and" | "$or" => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;
                let mut sql_parts = Vec::new();
                for v in arr {
                    let (sql, params) = Self::generate(v, self.param_index)?;
                    self.param_index += params.len();
                    self.param_values.extend(params);
                    sql_parts.push(format!("({})", sql));
                }
                let joiner = if op == "$and" { " AND " } else { " OR " };
                let combined = sql_parts.join(joiner);
                self.conditions.push(FilterWhereInfo { column: combined, operator: FilterOp::Text, data: Value::Null });
                Ok(())
            }
            "$not" => {
                let (sql, params) = Self::generate(value, self.param_index)?;
                self.param_index += params.len();
                self.param_values.extend(params);
                self.conditions.push(FilterWhereInfo { column: format!("NOT ({})", sql), operator: FilterOp::Text, data: Value::Null });
                Ok(())
            }
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn parse_field_condition(&mut self, field: &str, value: &Value) -> Result<(), FilterError> {
        if let Value::Object(obj) = value {
            for (op_key, op_val) in obj {
                let operator = Self::map_operator(op_key)?;
                self.conditions.push(FilterWhereInfo { column: field.to_string(), operator, data: op_val.clone() });
            }
        } else {
            // Implicit equality: { field: value }
            self.conditions.push(FilterWhereInfo { column: field.to_string(), operator: FilterOp::Eq, data: value.clone() });
        }
        Ok(())
    }

    fn map_operator(op_key: &str) -> Result<FilterOp, FilterError> {
        Ok(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$like" => FilterOp::Like,
            "$ilike" => FilterOp::ILike,
            "$in" => FilterOp::In,
            "$between" => FilterOp::Between,
            "$geoWithin" => FilterOp::GeoWithin,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        // Pseudo conditions where column already contains SQL (logical operators)
        if matches!(condition.operator, FilterOp::Text) && condition.data.is_null() {
            return Ok(condition.column.clone());
        }

        Self::validate_column_name(&condition.column)?;
        let quoted_column = format!("\"{}\"", condition.column);
        match condition.operator {
            FilterOp::Eq => {
                if condition.data.is_null() {
                    Ok(format!("{} IS NULL", quoted_column))
                } else {
                    Ok(format!("{} = {}", quoted_column, self.scalar_param(&condition.data)?))
                }
            }
            FilterOp::Ne => {
                if condition.data.is_null() {
                    Ok(format!("{} IS NOT NULL", quoted_column))
                } else {
                    Ok(format!("{} <> {}", quoted_column, self.scalar_param(&condition.data)?))
                }
            }
            FilterOp::Gt => Ok(format!("{} > {}", quoted_column, self.scalar_param(&condition.data)?)),
            FilterOp::Gte => Ok(format!("{} >= {}", quoted_column, self.scalar_param(&condition.data)?)),
            FilterOp::Lt => Ok(format!("{} < {}", quoted_column, self.scalar_param(&condition.data)?)),
            FilterOp::Lte => Ok(format!("{} <= {}", quoted_column, self.scalar_param(&condition.data)?)),
            FilterOp::Like => Ok(format!("{} LIKE {}", quoted_column, self.scalar_param(&condition.data)?)),
            FilterOp::ILike => Ok(format!("{} ILIKE {}", quoted_column, self.scalar_param(&condition.data)?)),
            FilterOp::In => {
                if let Value::Array(values) = &condition.data {
                    if values.is_empty() {
                        return Ok("1=0".to_string());
                    }
                    let params: Vec<String> = values.iter().map(|v| self.param(v.clone())).collect();
                    Ok(format!("{} IN ({})", quoted_column, params.join(", ")))
                } else {
                    Ok(format!("{} = {}", quoted_column, self.scalar_param(&condition.data)?))
                }
            }
            FilterOp::Between => {
                if let Value::Array(values) = &condition.data {
                    if values.len() != 2 {
                        return Err(FilterError::InvalidOperatorData("$between requires exactly 2 values".to_string()));
                    }
                    Ok(format!(
                        "{} BETWEEN {} AND {}",
                        quoted_column,
                        self.param(values[0].clone()),
                        self.param(values[1].clone())
                    ))
                } else {
                    Err(FilterError::InvalidOperatorData("$between requires array with 2 values".to_string()))
                }
            }
            FilterOp::GeoWithin => {
                let literal = Self::polygon_literal(&condition.data)?;
                // location is stored as lng/lat double columns; postgres point
                // containment does the polygon test in one round trip
                Ok(format!(
                    "point(\"lng\", \"lat\") <@ {}::polygon",
                    self.param(Value::String(literal))
                ))
            }
            _ => Err(FilterError::UnsupportedOperator(format!("{:?}", condition.operator))),
        }
    }

    /// Render a GeoJSON-style exterior ring ([[lng, lat], ...], closed) as a
    /// Postgres polygon literal. The closing duplicate point is dropped since
    /// Postgres polygons close implicitly.
    fn polygon_literal(ring: &Value) -> Result<String, FilterError> {
        let points = ring
            .as_array()
            .ok_or_else(|| FilterError::InvalidOperatorData("$geoWithin requires a coordinate ring".to_string()))?;
        if points.len() < 4 {
            return Err(FilterError::InvalidOperatorData(
                "$geoWithin ring needs at least 4 points".to_string(),
            ));
        }

        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(points.len());
        for point in points {
            let coords = point
                .as_array()
                .filter(|c| c.len() == 2)
                .ok_or_else(|| FilterError::InvalidOperatorData("ring points must be [lng, lat] pairs".to_string()))?;
            let lng = coords[0]
                .as_f64()
                .ok_or_else(|| FilterError::InvalidOperatorData("ring coordinates must be numbers".to_string()))?;
            let lat = coords[1]
                .as_f64()
                .ok_or_else(|| FilterError::InvalidOperatorData("ring coordinates must be numbers".to_string()))?;
            pairs.push((lng, lat));
        }

        if pairs.first() == pairs.last() {
            pairs.pop();
        }

        let rendered: Vec<String> = pairs.iter().map(|(lng, lat)| format!("({},{})", lng, lat)).collect();
        Ok(format!("({})", rendered.join(",")))
    }

    fn validate_column_name(column: &str) -> Result<(), FilterError> {
        let mut chars = column.chars();
        let valid = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if valid {
            Ok(())
        } else {
            Err(FilterError::InvalidColumn(column.to_string()))
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }

    /// Comparison operators take a single value; arrays only appear inside
    /// `$in`, `$between` and `$geoWithin`, which expand them themselves.
    fn scalar_param(&mut self, value: &Value) -> Result<String, FilterError> {
        if value.is_array() {
            return Err(FilterError::InvalidOperatorData(
                "comparison operators take a scalar value".to_string(),
            ));
        }
        Ok(self.param(value.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn implicit_equality() {
        let (sql, params) = FilterWhere::generate(&json!({"name": "Siiri"}), 0).unwrap();
        assert_eq!(sql, "\"name\" = $1");
        assert_eq!(params, vec![json!("Siiri")]);
    }

    #[test]
    fn owner_scoped_filter_folds_both_constraints() {
        let id = "0d5ad1ab-3b24-4b66-9a0c-0efb84ad1e84";
        let owner = "f3b9a3a6-35c5-4f3b-9b36-0f42b7ab4f11";
        let (sql, params) = FilterWhere::generate(&json!({"id": id, "owner_id": owner}), 0).unwrap();
        assert_eq!(sql, "\"id\" = $1 AND \"owner_id\" = $2");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn geo_within_renders_polygon_containment() {
        let ring = json!([[10.0, 10.0], [0.0, 10.0], [0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]);
        let (sql, params) = FilterWhere::generate(&json!({"location": {"$geoWithin": ring}}), 0).unwrap();
        assert_eq!(sql, "point(\"lng\", \"lat\") <@ $1::polygon");
        // closing duplicate dropped in the literal
        assert_eq!(params, vec![json!("((10,10),(0,10),(0,0),(10,0))")]);
    }

    #[test]
    fn geo_within_rejects_short_rings() {
        let ring = json!([[0.0, 0.0], [1.0, 1.0]]);
        let err = FilterWhere::generate(&json!({"location": {"$geoWithin": ring}}), 0).unwrap_err();
        assert!(matches!(err, FilterError::InvalidOperatorData(_)));
    }

    #[test]
    fn rejects_array_values_for_scalar_operators() {
        let err = FilterWhere::generate(&json!({"weight": [1, 2]}), 0).unwrap_err();
        assert!(matches!(err, FilterError::InvalidOperatorData(_)));

        let err = FilterWhere::generate(&json!({"weight": {"$gt": [1, 2]}}), 0).unwrap_err();
        assert!(matches!(err, FilterError::InvalidOperatorData(_)));
    }

    #[test]
    fn rejects_unknown_operator() {
        let err = FilterWhere::generate(&json!({"name": {"$regex": "^S"}}), 0).unwrap_err();
        assert!(matches!(err, FilterError::UnsupportedOperator(_)));
    }

    #[test]
    fn rejects_hostile_column_names() {
        let err = FilterWhere::generate(&json!({"name\"; DROP TABLE cats; --": 1}), 0).unwrap_err();
        assert!(matches!(err, FilterError::InvalidColumn(_)));
    }

    #[test]
    fn or_subclauses_keep_param_numbering() {
        let (sql, params) = FilterWhere::generate(
            &json!({"$or": [{"weight": {"$gt": 4.0}}, {"name": "Siiri"}]}),
            0,
        )
        .unwrap();
        assert_eq!(sql, "(\"weight\" > $1) OR (\"name\" = $2)");
        assert_eq!(params.len(), 2);
    }
}
