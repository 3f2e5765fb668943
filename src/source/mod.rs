//! Remote document source abstraction.
//!
//! A source answers list queries for a doctype: a projection, a set of
//! `[field, operator, value]` filters, an optional ordering and a page window.
//! [`FrappeClient`](crate::client::FrappeClient) talks to a live site,
//! [`MemorySource`] serves records from memory or a fixture file.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

mod memory;

pub use memory::MemorySource;

/// Filter operators understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    In,
    Like,
    Gte,
    Lt,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::In => "in",
            Operator::Like => "like",
            Operator::Gte => ">=",
            Operator::Lt => "<",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: Operator,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Eq, value)
    }

    pub fn is_in<S: AsRef<str>>(field: impl Into<String>, values: &[S]) -> Self {
        let values: Vec<Value> = values
            .iter()
            .map(|value| Value::String(value.as_ref().to_string()))
            .collect();
        Self::new(field, Operator::In, Value::Array(values))
    }

    /// Substring match: the needle is wrapped in `%` wildcards.
    pub fn contains(field: impl Into<String>, needle: &str) -> Self {
        Self::new(field, Operator::Like, format!("%{needle}%"))
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Gte, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Lt, value)
    }

    /// Wire form: `[field, operator, value]`.
    pub fn to_json(&self) -> Value {
        Value::Array(vec![
            Value::String(self.field.clone()),
            Value::String(self.op.as_str().to_string()),
            self.value.clone(),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub order: SortOrder,
}

/// One list request. `limit == 0` means "no limit".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub fields: Vec<String>,
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub start: usize,
    pub limit: usize,
}

impl ListQuery {
    pub fn new<S: AsRef<str>>(fields: &[S]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            order,
        });
        self
    }

    pub fn window(mut self, start: usize, limit: usize) -> Self {
        self.start = start;
        self.limit = limit;
        self
    }
}

/// Capability to list backend documents.
pub trait DocumentSource {
    fn list(&self, doctype: &str, query: &ListQuery) -> Result<Vec<Value>>;
}

impl<T: DocumentSource + ?Sized> DocumentSource for &T {
    fn list(&self, doctype: &str, query: &ListQuery) -> Result<Vec<Value>> {
        (**self).list(doctype, query)
    }
}

/// Fetch every record matching `query`, one page of `page_size` at a time.
///
/// Stops at the first short page. The window in `query` is ignored. Queries
/// without an ordering are paged by `name asc` so offsets stay stable.
pub fn fetch_all<S: DocumentSource + ?Sized>(
    source: &S,
    doctype: &str,
    query: &ListQuery,
    page_size: usize,
) -> Result<Vec<Value>> {
    if page_size == 0 {
        return Err(Error::InvalidConfig(
            "fetch.page_size must be > 0".to_string(),
        ));
    }

    let mut records = Vec::new();
    let mut page_query = query.clone();
    if page_query.order_by.is_none() {
        page_query = page_query.order_by("name", SortOrder::Asc);
    }
    let mut start = 0;
    loop {
        page_query.start = start;
        page_query.limit = page_size;
        let page = source.list(doctype, &page_query)?;
        let count = page.len();
        tracing::debug!(doctype, start, count, "fetched page");
        records.extend(page);
        // A page longer than requested means the backend ignored the window.
        if count != page_size {
            break;
        }
        start += count;
    }
    Ok(records)
}

/// [`fetch_all`] followed by decoding each record into `T`.
pub fn fetch_typed<T, S>(
    source: &S,
    doctype: &str,
    query: &ListQuery,
    page_size: usize,
) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    S: DocumentSource + ?Sized,
{
    fetch_all(source, doctype, query, page_size)?
        .into_iter()
        .map(|record| {
            serde_json::from_value(record).map_err(|source| Error::Decode {
                doctype: doctype.to_string(),
                source,
            })
        })
        .collect()
}
