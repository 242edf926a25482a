// src/core/query.rs
//! Table-scoped select queries understood by every store backend

use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Employers,
    Workers,
    WorkExperience,
    WorkerLanguages,
    WorkerSkills,
    WorkerReferences,
    ShortlistedWorkers,
    ContactRequests,
    Faqs,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Employers => "employers",
            Table::Workers => "workers",
            Table::WorkExperience => "work_experience",
            Table::WorkerLanguages => "worker_languages",
            Table::WorkerSkills => "worker_skills",
            Table::WorkerReferences => "worker_references",
            Table::ShortlistedWorkers => "shortlisted_workers",
            Table::ContactRequests => "contact_requests",
            Table::Faqs => "faqs",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    In(String, Vec<Value>),
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(column.to_string(), value.into())
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(column, _) | Filter::In(column, _) => column,
        }
    }

    /// PostgREST operator expression, e.g. `eq.abc` or `in.("a","b")`
    pub fn to_param(&self) -> String {
        match self {
            Filter::Eq(_, value) => format!("eq.{}", scalar_text(value)),
            Filter::In(_, values) => {
                let items: Vec<String> = values
                    .iter()
                    .map(|value| match value {
                        Value::String(text) => {
                            format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
                        }
                        other => scalar_text(other),
                    })
                    .collect();
                format!("in.({})", items.join(","))
            }
        }
    }

    /// Row-level evaluation used by the in-memory backend
    pub fn matches(&self, row: &Value) -> bool {
        let cell = row.get(self.column()).unwrap_or(&Value::Null);
        match self {
            Filter::Eq(_, value) => cell == value,
            Filter::In(_, values) => values.iter().any(|value| value == cell),
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn to_param(&self) -> String {
        let direction = if self.ascending { "asc" } else { "desc" };
        format!("{}.{}", self.column, direction)
    }

    /// Ascending puts nulls last, descending puts them first.
    pub fn compare(&self, left: &Value, right: &Value) -> Ordering {
        let a = left.get(&self.column).unwrap_or(&Value::Null);
        let b = right.get(&self.column).unwrap_or(&Value::Null);
        let natural = match (a, b) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Greater,
            (_, Value::Null) => Ordering::Less,
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => Ordering::Equal,
        };
        if self.ascending {
            natural
        } else {
            natural.reverse()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: Table,
    pub columns: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
}

impl Query {
    pub fn table(table: Table) -> Self {
        Self {
            table,
            columns: None,
            filters: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn is_in<V: Into<Value>>(
        mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.filters.push(Filter::In(
            column.to_string(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending: true,
        });
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending: false,
        });
        self
    }

    /// Query-string pairs for `GET /rest/v1/<table>`
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![(
            "select".to_string(),
            self.columns.clone().unwrap_or_else(|| "*".to_string()),
        )];
        params.extend(
            self.filters
                .iter()
                .map(|filter| (filter.column().to_string(), filter.to_param())),
        );
        if !self.order.is_empty() {
            let order: Vec<String> = self.order.iter().map(Order::to_param).collect();
            params.push(("order".to_string(), order.join(",")));
        }
        params
    }

    /// Apply filters, ordering and projection to already materialised rows.
    pub fn apply(&self, rows: &[Value]) -> Vec<Value> {
        let mut selected: Vec<Value> = rows
            .iter()
            .filter(|row| self.filters.iter().all(|filter| filter.matches(row)))
            .cloned()
            .collect();

        if !self.order.is_empty() {
            selected.sort_by(|a, b| {
                self.order
                    .iter()
                    .map(|order| order.compare(a, b))
                    .find(|ordering| *ordering != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        match self.projection() {
            Some(columns) => selected
                .into_iter()
                .map(|row| project(&row, &columns))
                .collect(),
            None => selected,
        }
    }

    fn projection(&self) -> Option<Vec<String>> {
        let columns = self.columns.as_deref()?;
        if columns.trim() == "*" {
            return None;
        }
        Some(
            columns
                .split(',')
                .map(|column| column.trim().to_string())
                .filter(|column| !column.is_empty())
                .collect(),
        )
    }
}

fn project(row: &Value, columns: &[String]) -> Value {
    let mut projected = serde_json::Map::new();
    for column in columns {
        if let Some(value) = row.get(column) {
            projected.insert(column.clone(), value.clone());
        }
    }
    Value::Object(projected)
}
