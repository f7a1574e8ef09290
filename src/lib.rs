pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod logger;
pub mod query;
pub mod types;
pub mod validation;

pub use crate::errors::{ApiError, FieldParseError, QueryError};
pub use crate::query::{
    CompileOptions, FilterDescriptor, FilterTerm, Filters, ParameterSet, compile, compile_with,
    merge,
};
pub use crate::types::{FieldType, PRIMARY_KEY, Schema};
