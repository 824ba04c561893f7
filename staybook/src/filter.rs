//! Translation of client filter requests into store queries.

use staybook_core::{
    document::{EntityId, ID_FIELD},
    error::DocumentStoreResult,
    page::PageRequest,
    query::{Expr, Filter, Query},
};

/// Criteria a client may narrow a listing by. Every field is optional and empty strings are
/// treated the same as absent ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterBy {
    /// Free text matched against the country and city of a stay.
    pub txt: Option<String>,
    /// Category label matched against the stay type.
    pub label: Option<String>,
    /// Minimum capacity.
    pub guests: Option<u32>,
    /// Restricts results to these stay ids.
    pub user_wishlist: Vec<String>,
    pub host_id: Option<String>,
    pub buyer_id: Option<String>,
    pub page_idx: Option<usize>,
}

/// Builds the query for `filter_by`: a conjunction of one constraint per present field, windowed
/// to one page when `page_idx` is set.
///
/// # Errors
///
/// Returns [`DocumentStoreError::InvalidId`](staybook_core::error::DocumentStoreError::InvalidId)
/// if a wishlist entry is not a valid id.
pub fn build_query(filter_by: &FilterBy) -> DocumentStoreResult<Query> {
    let mut criteria = Vec::new();

    if let Some(txt) = present(&filter_by.txt) {
        criteria.push(Filter::or([
            Filter::icontains("loc.country", txt),
            Filter::icontains("loc.city", txt),
        ]));
    }
    if let Some(label) = present(&filter_by.label) {
        criteria.push(Filter::icontains("type", label));
    }
    if let Some(guests) = filter_by.guests {
        criteria.push(Filter::gte("capacity", i64::from(guests)));
    }
    if !filter_by.user_wishlist.is_empty() {
        let ids = filter_by
            .user_wishlist
            .iter()
            .map(|id| EntityId::parse(id))
            .collect::<DocumentStoreResult<Vec<_>>>()?;

        criteria.push(Filter::any_of(ID_FIELD, ids));
    }
    if let Some(host_id) = present(&filter_by.host_id) {
        criteria.push(Filter::eq("hostId", host_id));
    }
    if let Some(buyer_id) = present(&filter_by.buyer_id) {
        criteria.push(Filter::eq("buyer._id", buyer_id));
    }

    let mut builder = Query::builder().filter_opt(combine(criteria));
    if let Some(page_idx) = filter_by.page_idx {
        builder = builder.page(PageRequest::new(page_idx));
    }

    Ok(builder.build())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn combine(mut criteria: Vec<Expr>) -> Option<Expr> {
    match criteria.len() {
        0 => None,
        1 => criteria.pop(),
        _ => Some(Filter::and(criteria)),
    }
}
