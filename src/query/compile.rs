use super::base::extract_base;
use super::pagination::resolve_skip;
use super::params::ParameterSet;
use super::policy::CompileOptions;
use super::schema::compile_schema;
use super::types::FilterDescriptor;
use crate::errors::QueryError;
use crate::types::Schema;

/// Compiles a request's query parameters with the default policies.
///
/// # Errors
/// See [`compile_with`].
pub fn compile(params: &ParameterSet, schema: &Schema) -> Result<FilterDescriptor, QueryError> {
    compile_with(params, schema, &CompileOptions::default())
}

/// Base conventions first, then schema fields (which overwrite base filters on
/// the same key), then pagination.
///
/// # Errors
/// Any strict-policy parse failure, a malformed `Int`/`Bool`/`Id` schema value,
/// or `page` without `limit`. No partial descriptor is ever returned.
pub fn compile_with(
    params: &ParameterSet,
    schema: &Schema,
    opts: &CompileOptions,
) -> Result<FilterDescriptor, QueryError> {
    let base = extract_base(params, opts)?;
    let typed = compile_schema(params, schema, opts)?;
    let skip = resolve_skip(base.page, base.limit, base.offset)?;

    let mut filters = base.filters;
    filters.extend(typed);

    let desc = FilterDescriptor {
        filters,
        projection: base.projection,
        sort: base.sort,
        page: base.page,
        limit: base.limit,
        offset: base.offset,
        skip,
    };
    log::debug!(
        target: "nexusquery::query",
        "compiled {} filter(s), {} projected field(s), skip={} limit={:?}",
        desc.filters.len(),
        desc.projection.len(),
        desc.skip,
        desc.limit
    );
    Ok(desc)
}

/// Decodes `query` and compiles it.
///
/// # Errors
/// See [`compile_with`].
pub fn compile_str(
    query: &str,
    schema: &Schema,
    opts: &CompileOptions,
) -> Result<FilterDescriptor, QueryError> {
    compile_with(&ParameterSet::parse(query), schema, opts)
}
