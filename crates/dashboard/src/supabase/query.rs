//! PostgREST query builder.
//!
//! Renders the `select`, filter and `order` query parameters PostgREST
//! understands:
//!
//! ```text
//! /rest/v1/customers?select=*,profiles(full_name,phone)&order=created_at.desc
//! /rest/v1/deliveries?select=*&customer_id=eq.<uuid>&order=delivery_date.desc
//! /rest/v1/deliveries?select=id&delivery_status=in.(pending,assigned,in_transit)
//! ```

use std::fmt::Display;

use url::Url;

/// A read/update target: one table plus filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestQuery {
    table: &'static str,
    select: Option<String>,
    params: Vec<(String, String)>,
}

impl RestQuery {
    /// Start a query against `table`.
    #[must_use]
    pub const fn table(table: &'static str) -> Self {
        Self {
            table,
            select: None,
            params: Vec::new(),
        }
    }

    /// Columns (and embedded relations) to return.
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_owned());
        self
    }

    /// Equality filter: `column=eq.value`.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.params.push((column.to_owned(), format!("eq.{value}")));
        self
    }

    /// Inclusion filter: `column=in.(a,b,c)`.
    #[must_use]
    pub fn in_<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        let list = values
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.params.push((column.to_owned(), format!("in.({list})")));
        self
    }

    /// Ordering: `order=column.asc` or `order=column.desc`.
    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".to_owned(), format!("{column}.{direction}")));
        self
    }

    /// Render the full request URL under `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` cannot be joined with the REST path.
    pub fn to_url(&self, base: &Url) -> Result<Url, url::ParseError> {
        let mut url = base.join(&format!("rest/v1/{}", self.table))?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(select) = &self.select {
                pairs.append_pair("select", select);
            }
            for (key, value) in &self.params {
                pairs.append_pair(key, value);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }
}

/// Extract the total row count from a `Content-Range` header value.
///
/// PostgREST answers exact-count requests with `0-24/3573`, or `*/0` when
/// the range is empty. An unknown total (`0-24/*`) yields `None`.
#[must_use]
pub fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.parse().ok()
}
