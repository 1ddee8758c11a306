// ── Paginated list envelope ──
//
// Paginated endpoints answer `{results, count, total_pages, page_size}`;
// unpaginated ones answer a bare array. `Page::from_body` accepts both.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::record::Record;

/// Parameters of a filtered, paginated list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: u32,
    /// Server-side search term; sent even when empty.
    pub search: String,
    /// Field name, `-` prefix for descending.
    pub ordering: Option<String>,
    /// Extra `key=value` filters appended verbatim.
    pub filters: Vec<(String, String)>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            search: String::new(),
            ordering: None,
            filters: Vec::new(),
        }
    }
}

impl ListQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page: page.max(1),
            ..Self::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_ordering(mut self, ordering: Option<impl Into<String>>) -> Self {
        self.ordering = ordering.map(Into::into);
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    /// Query-string pairs in wire order: page, search, ordering, filters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_owned(), self.page.to_string()),
            ("search".to_owned(), self.search.clone()),
        ];
        if let Some(ref ordering) = self.ordering {
            params.push(("ordering".to_owned(), ordering.clone()));
        }
        params.extend(self.filters.iter().cloned());
        params
    }
}

/// One page of records plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Record>,
    pub page: u32,
    pub page_size: usize,
    pub total_pages: u32,
    pub total_items: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            page_size: 0,
            total_pages: 1,
            total_items: 0,
        }
    }
}

impl Page {
    /// Unwrap a response body into a page.
    ///
    /// With a `results` field, metadata comes from the sibling fields;
    /// otherwise the whole body is the record sequence and
    /// `total_pages` is 1. Missing metadata falls back to the item count.
    pub fn from_body(body: Value, requested_page: u32) -> Result<Self, Error> {
        match body {
            Value::Object(mut map) if map.contains_key("results") => {
                let results = map.remove("results").unwrap_or(Value::Null);
                let items = records_from(results)?;
                let len = items.len();
                let page_size = map
                    .get("page_size")
                    .and_then(Value::as_u64)
                    .and_then(|n| usize::try_from(n).ok())
                    .unwrap_or(len);
                let total_pages = map
                    .get("total_pages")
                    .and_then(Value::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or(1)
                    .max(1);
                let total_items = map
                    .get("count")
                    .and_then(Value::as_u64)
                    .unwrap_or_else(|| u64::try_from(len).unwrap_or(u64::MAX));
                Ok(Self {
                    items,
                    page: requested_page.max(1),
                    page_size,
                    total_pages,
                    total_items,
                })
            }
            other => Ok(Self::single(records_from(other)?)),
        }
    }

    /// A one-page view over an unpaginated sequence.
    pub fn single(items: Vec<Record>) -> Self {
        let len = items.len();
        Self {
            items,
            page: 1,
            page_size: len,
            total_pages: 1,
            total_items: u64::try_from(len).unwrap_or(u64::MAX),
        }
    }

    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }

    pub fn is_first(&self) -> bool {
        self.page <= 1
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Unwrap either an envelope's `results` or a bare array into records.
pub fn records_from_body(body: Value) -> Result<Vec<Record>, Error> {
    match body {
        Value::Object(mut map) if map.contains_key("results") => {
            records_from(map.remove("results").unwrap_or(Value::Null))
        }
        other => records_from(other),
    }
}

fn records_from(value: Value) -> Result<Vec<Record>, Error> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|v| {
                Record::try_from(v).map_err(|rejected| Error::Deserialization {
                    message: "expected a JSON object for each record".into(),
                    body: rejected.to_string(),
                })
            })
            .collect(),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::Deserialization {
            message: "expected a record array or a paginated envelope".into(),
            body: other.to_string(),
        }),
    }
}
