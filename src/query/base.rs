use bson::Bson;
use std::collections::BTreeSet;

use super::params::ParameterSet;
use super::policy::{CompileOptions, Policy};
use super::types::{FilterTerm, Filters, Order, SortSpec};
use crate::errors::QueryError;
use crate::types::{PRIMARY_KEY, parse_object_id};

const LOG_TARGET: &str = "nexusquery::query";

/// What the fixed query conventions contribute to a descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseQuery {
    pub filters: Filters,
    pub projection: BTreeSet<String>,
    pub sort: Option<Vec<SortSpec>>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Reads `id`, `status`, `fields`, `page`, `limit`, `offset`, `sort` and `order`.
///
/// # Errors
/// Only under `Policy::Strict`: a malformed pagination value (with the default
/// options) or a malformed `id` (when `base_id` is strict).
pub fn extract_base(params: &ParameterSet, opts: &CompileOptions) -> Result<BaseQuery, QueryError> {
    let mut out = BaseQuery::default();

    if let Some(raw) = params.first("id") {
        match parse_object_id(raw.trim()) {
            Ok(oid) => {
                out.filters.insert(PRIMARY_KEY.to_string(), FilterTerm::Value(Bson::ObjectId(oid)));
            }
            Err(e) => match opts.base_id {
                Policy::Strict => {
                    return Err(QueryError::InvalidParameter {
                        field: "id".into(),
                        reason: e.to_string(),
                    });
                }
                Policy::Lenient => log::warn!(target: LOG_TARGET, "ignoring id parameter: {e}"),
            },
        }
    }

    if let Some(status) = params.first("status") {
        out.filters.insert("status".into(), FilterTerm::Value(Bson::String(status.to_string())));
    }

    if let Some(fields) = params.first("fields") {
        out.projection = fields
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
    }

    out.page = pagination_value(params, "page", true, opts.pagination)?;
    out.limit = pagination_value(params, "limit", true, opts.pagination)?;
    out.offset = pagination_value(params, "offset", false, opts.pagination)?;

    let sort_field = params.first("sort").map(str::trim).filter(|f| !f.is_empty());
    if let (Some(field), Some(order)) = (sort_field, params.first("order")) {
        let order = if order.trim().eq_ignore_ascii_case("asc") { Order::Asc } else { Order::Desc };
        out.sort = Some(vec![SortSpec { field: field.to_string(), order }]);
    }

    Ok(out)
}

fn pagination_value(
    params: &ParameterSet,
    name: &str,
    positive: bool,
    policy: Policy,
) -> Result<Option<u64>, QueryError> {
    let Some(raw) = params.first(name) else { return Ok(None) };
    let reason = match raw.trim().parse::<i64>() {
        Ok(n) if positive && n <= 0 => "must be a positive integer".to_string(),
        Ok(n) if n < 0 => "must be a non-negative integer".to_string(),
        // n >= 0 on both remaining paths
        Ok(n) => return Ok(Some(n.unsigned_abs())),
        Err(e) => e.to_string(),
    };
    match policy {
        Policy::Strict => Err(QueryError::InvalidParameter { field: name.to_string(), reason }),
        Policy::Lenient => {
            log::warn!(target: LOG_TARGET, "ignoring {name}={raw:?}: {reason}");
            Ok(None)
        }
    }
}
