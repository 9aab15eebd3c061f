use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::StoreError;

/// A single bind parameter, typed so sqlx encodes it against the actual
/// column type (uuid, timestamptz, ...) without SQL-side casts.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Uuid(Uuid),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<Uuid> for SqlParam {
    fn from(v: Uuid) -> Self {
        SqlParam::Uuid(v)
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Int(v as i64)
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        SqlParam::Float(v)
    }
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        SqlParam::Bool(v)
    }
}

impl From<DateTime<Utc>> for SqlParam {
    fn from(v: DateTime<Utc>) -> Self {
        SqlParam::Timestamp(v)
    }
}

/// One predicate in a WHERE clause. Top-level conditions compose
/// conjunctively; `AnyOf` expresses a disjunction of conjunction groups
/// (used for the two-party message log query).
#[derive(Debug, Clone)]
pub enum Condition {
    Eq(String, SqlParam),
    ILike(String, SqlParam),
    In(String, Vec<SqlParam>),
    AnyOf(Vec<Vec<Condition>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Rendered SQL plus its bind parameters in placeholder order.
#[derive(Debug, Clone)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// Filter/sort/range specification against a single table.
#[derive(Debug, Clone, Default)]
pub struct Query {
    conditions: Vec<Condition>,
    order: Vec<(String, SortDirection)>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<SqlParam>) -> Self {
        self.conditions.push(Condition::Eq(column.into(), value.into()));
        self
    }

    pub fn ilike(mut self, column: impl Into<String>, pattern: impl Into<SqlParam>) -> Self {
        self.conditions.push(Condition::ILike(column.into(), pattern.into()));
        self
    }

    pub fn is_in(mut self, column: impl Into<String>, values: Vec<SqlParam>) -> Self {
        self.conditions.push(Condition::In(column.into(), values));
        self
    }

    pub fn any_of(mut self, groups: Vec<Vec<Condition>>) -> Self {
        self.conditions.push(Condition::AnyOf(groups));
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order.push((column.into(), direction));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Render `SELECT * FROM "table" ...` with `$n` placeholders.
    pub fn select_sql(&self, table: &str) -> Result<SqlQuery, StoreError> {
        validate_identifier(table)?;

        let mut params = Vec::new();
        let where_clause = render_conditions(&self.conditions, &mut params)?;

        let mut sql = format!("SELECT * FROM \"{}\"", table);
        if !where_clause.is_empty() {
            sql.push_str(&format!(" WHERE {}", where_clause));
        }
        if !self.order.is_empty() {
            let order_clause = self
                .order
                .iter()
                .map(|(column, direction)| {
                    validate_identifier(column).map(|_| format!("\"{}\" {}", column, direction.to_sql()))
                })
                .collect::<Result<Vec<_>, _>>()?
                .join(", ");
            sql.push_str(&format!(" ORDER BY {}", order_clause));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        Ok(SqlQuery { sql, params })
    }

    /// Render `SELECT COUNT(*) ...` over the same conditions (no order/range).
    pub fn count_sql(&self, table: &str) -> Result<SqlQuery, StoreError> {
        validate_identifier(table)?;

        let mut params = Vec::new();
        let where_clause = render_conditions(&self.conditions, &mut params)?;

        let sql = if where_clause.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", table)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", table, where_clause)
        };

        Ok(SqlQuery { sql, params })
    }
}

fn render_conditions(
    conditions: &[Condition],
    params: &mut Vec<SqlParam>,
) -> Result<String, StoreError> {
    let rendered = conditions
        .iter()
        .map(|condition| render_condition(condition, params))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rendered.join(" AND "))
}

fn render_condition(condition: &Condition, params: &mut Vec<SqlParam>) -> Result<String, StoreError> {
    match condition {
        Condition::Eq(column, value) => {
            validate_identifier(column)?;
            Ok(format!("\"{}\" = {}", column, push_param(params, value.clone())))
        }
        Condition::ILike(column, pattern) => {
            validate_identifier(column)?;
            Ok(format!("\"{}\" ILIKE {}", column, push_param(params, pattern.clone())))
        }
        Condition::In(column, values) => {
            validate_identifier(column)?;
            if values.is_empty() {
                return Ok("1=0".to_string());
            }
            let placeholders = values
                .iter()
                .map(|v| push_param(params, v.clone()))
                .collect::<Vec<_>>()
                .join(", ");
            Ok(format!("\"{}\" IN ({})", column, placeholders))
        }
        Condition::AnyOf(groups) => {
            if groups.is_empty() {
                return Err(StoreError::QueryError("AnyOf requires at least one group".to_string()));
            }
            let rendered = groups
                .iter()
                .map(|group| {
                    if group.is_empty() {
                        return Err(StoreError::QueryError("AnyOf group cannot be empty".to_string()));
                    }
                    render_conditions(group, params).map(|sql| format!("({})", sql))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!("({})", rendered.join(" OR ")))
        }
    }
}

fn push_param(params: &mut Vec<SqlParam>, value: SqlParam) -> String {
    params.push(value);
    format!("${}", params.len())
}

/// Validate table/column identifiers to prevent injection
pub fn validate_identifier(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::QueryError(format!("Invalid identifier: {}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_conjunctive_filters_with_range() {
        let query = Query::new()
            .eq("category", "Mode")
            .eq("supplier_country", "Cameroun")
            .order_by("created_at", SortDirection::Desc)
            .order_by("seq", SortDirection::Asc)
            .limit(2)
            .offset(0);

        let sql = query.select_sql("products").unwrap();
        assert_eq!(
            sql.sql,
            "SELECT * FROM \"products\" WHERE \"category\" = $1 AND \"supplier_country\" = $2 \
             ORDER BY \"created_at\" DESC, \"seq\" ASC LIMIT 2 OFFSET 0"
        );
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn renders_ilike_substring_search() {
        let sql = Query::new()
            .ilike("name", "%tissu%")
            .select_sql("products")
            .unwrap();
        assert_eq!(sql.sql, "SELECT * FROM \"products\" WHERE \"name\" ILIKE $1");
        assert_eq!(sql.params[0], SqlParam::Text("%tissu%".to_string()));
    }

    #[test]
    fn renders_two_party_disjunction() {
        let viewer = Uuid::new_v4();
        let peer = Uuid::new_v4();
        let sql = Query::new()
            .any_of(vec![
                vec![
                    Condition::Eq("sender_id".into(), viewer.into()),
                    Condition::Eq("recipient_id".into(), peer.into()),
                ],
                vec![
                    Condition::Eq("sender_id".into(), peer.into()),
                    Condition::Eq("recipient_id".into(), viewer.into()),
                ],
            ])
            .select_sql("messages")
            .unwrap();

        assert_eq!(
            sql.sql,
            "SELECT * FROM \"messages\" WHERE \
             ((\"sender_id\" = $1 AND \"recipient_id\" = $2) OR \
             (\"sender_id\" = $3 AND \"recipient_id\" = $4))"
        );
        assert_eq!(sql.params.len(), 4);
    }

    #[test]
    fn empty_in_never_matches() {
        let sql = Query::new().is_in("id", vec![]).select_sql("profiles").unwrap();
        assert_eq!(sql.sql, "SELECT * FROM \"profiles\" WHERE 1=0");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn count_ignores_order_and_range() {
        let sql = Query::new()
            .eq("category", "Mode")
            .order_by("created_at", SortDirection::Desc)
            .limit(5)
            .count_sql("products")
            .unwrap();
        assert_eq!(
            sql.sql,
            "SELECT COUNT(*) AS count FROM \"products\" WHERE \"category\" = $1"
        );
    }

    #[test]
    fn rejects_invalid_identifiers() {
        assert!(validate_identifier("products").is_ok());
        assert!(validate_identifier("_seq").is_ok());
        assert!(validate_identifier("1abc").is_err());
        assert!(validate_identifier("name; DROP TABLE products").is_err());
        assert!(Query::new().eq("bad\"col", "x").select_sql("products").is_err());
    }
}
