use birdseye_domain::Row;
use serde_json::Value;
use std::cmp::Ordering;

/// Equality predicates plus an optional ascending sort column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    pub eq: Vec<(String, Value)>,
    pub order: Option<String>,
}

impl RowFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.eq.push((column.into(), value.into()));
        self
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order = Some(column.into());
        self
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.eq
            .iter()
            .all(|(column, value)| row.get(column) == Some(value))
    }

    /// Sorts rows ascending by the order column, nulls last. Stable.
    pub fn sort(&self, rows: &mut [Row]) {
        if let Some(column) = &self.order {
            rows.sort_by(|a, b| compare_values(a.get(column), b.get(column)));
        }
    }

    /// PostgREST query parameters: `col=eq.value` and `order=col.asc`.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), "*".to_string())];
        for (column, value) in &self.eq {
            pairs.push((column.clone(), format!("eq.{}", query_value(value))));
        }
        if let Some(column) = &self.order {
            pairs.push(("order".to_string(), format!("{}.asc", column)));
        }
        pairs
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
