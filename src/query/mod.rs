// Query compiler: query string + schema -> filter/sort/pagination descriptor
mod base;
mod compile;
mod merge;
mod pagination;
mod params;
mod policy;
mod schema;
mod types;

pub use base::{BaseQuery, extract_base};
pub use compile::{compile, compile_str, compile_with};
pub use merge::merge;
pub use pagination::resolve_skip;
pub use params::{ParameterSet, RouteParams};
pub use policy::{ArrayKeying, CompileOptions, Policy};
pub use schema::compile_schema;
pub use types::{
    FilterDescriptor, FilterTerm, Filters, FindOptions, Order, SortSpec, filters_to_document,
};
