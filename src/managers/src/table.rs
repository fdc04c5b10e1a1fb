use std::{fmt, sync::Arc};

use serde::Serialize;
use serde_json::Value;
use types::Id;

pub type Render<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// One table column: the row field it shows and, optionally, how.
pub struct Column<T> {
    pub key: &'static str,
    pub header: &'static str,
    render: Option<Render<T>>,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            header: self.header,
            render: self.render.clone(),
        }
    }
}

impl<T: Serialize> Column<T> {
    pub fn new(key: &'static str, header: &'static str) -> Self {
        Self {
            key,
            header,
            render: None,
        }
    }

    pub fn render(mut self, f: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.render = Some(Arc::new(f));
        self
    }
}

/// Text of a raw JSON cell. Nested objects show their `name`, then `id`.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(fields) => match (fields.get("name"), fields.get("id")) {
            (Some(Value::String(name)), _) => name.clone(),
            (_, Some(id)) => cell_text(id),
            _ => value.to_string(),
        },
        Value::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join(", "),
    }
}

/// Renders every column of one row. The row is serialized at most once.
pub fn cells<T: Serialize>(columns: &[Column<T>], row: &T) -> Vec<String> {
    let mut raw: Option<Value> = None;
    columns
        .iter()
        .map(|column| match &column.render {
            Some(render) => render(row),
            None => {
                let raw = raw.get_or_insert_with(|| serde_json::to_value(row).unwrap_or(Value::Null));
                raw.get(column.key).map(cell_text).unwrap_or_default()
            }
        })
        .collect()
}

/// Case-insensitive substring match against any cell; blank query matches.
pub fn matches(query: &str, cells: &[String]) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    cells.iter().any(|cell| cell.to_lowercase().contains(&query))
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub id: Id,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> Vec<Id> {
        self.rows.iter().map(|row| row.id).collect()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = std::iter::once(2)
            .chain(self.headers.iter().map(|h| h.chars().count()))
            .collect();
        for row in &self.rows {
            widths[0] = widths[0].max(row.id.to_string().len());
            for (i, cell) in row.cells.iter().enumerate() {
                if let Some(w) = widths.get_mut(i + 1) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        write!(f, "{:<w$}", "ID", w = widths[0])?;
        for (header, w) in self.headers.iter().zip(&widths[1..]) {
            write!(f, "  {:<w$}", header, w = *w)?;
        }
        writeln!(f)?;
        for row in &self.rows {
            write!(f, "{:<w$}", row.id, w = widths[0])?;
            for (cell, w) in row.cells.iter().zip(&widths[1..]) {
                write!(f, "  {:<w$}", cell, w = *w)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
