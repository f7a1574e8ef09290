use crate::errors::QueryError;

/// Reconciles `page`/`limit` with `offset` into the number of documents to skip.
///
/// A positive `offset` wins outright. Otherwise a `page` (1-indexed) needs a
/// positive `limit` and yields `(page - 1) * limit`. With neither, nothing is skipped.
///
/// # Errors
/// `QueryError::PageRequiresLimit` when `page` is set without a positive `limit`,
/// and `QueryError::InvalidParameter` when the product does not fit in a `u64`.
pub fn resolve_skip(
    page: Option<u64>,
    limit: Option<u64>,
    offset: Option<u64>,
) -> Result<u64, QueryError> {
    if let Some(offset) = offset.filter(|o| *o > 0) {
        return Ok(offset);
    }
    let Some(page) = page else { return Ok(0) };
    let Some(limit) = limit.filter(|l| *l > 0) else {
        return Err(QueryError::PageRequiresLimit);
    };
    page.saturating_sub(1).checked_mul(limit).ok_or_else(|| QueryError::InvalidParameter {
        field: "page".into(),
        reason: format!("page {page} with limit {limit} is out of range"),
    })
}
