use bson::Bson;
use chrono::{NaiveDate, NaiveTime};

use super::params::ParameterSet;
use super::policy::{ArrayKeying, CompileOptions, Policy};
use super::types::{FilterTerm, Filters};
use crate::errors::{FieldParseError, QueryError};
use crate::types::{FieldType, PRIMARY_KEY, Schema, parse_object_id};

const LOG_TARGET: &str = "nexusquery::query";

/// Compiles every schema-declared parameter present in `params` into a filter.
///
/// Missing and empty values are skipped. Dates that fail to parse are skipped
/// unless `opts.dates` is strict.
///
/// # Errors
/// The first malformed `Int`, `Bool` or `Id` value (or `Date` under a strict
/// policy) aborts the call with `QueryError::InvalidField`.
pub fn compile_schema(
    params: &ParameterSet,
    schema: &Schema,
    opts: &CompileOptions,
) -> Result<Filters, QueryError> {
    let mut filters = Filters::new();
    for (name, ty) in schema.iter() {
        let raw = params.first(name).map(str::trim).filter(|v| !v.is_empty());
        let invalid = |source: FieldParseError| QueryError::InvalidField { field: name.to_string(), source };
        let value = match (ty, raw) {
            (FieldType::Array, _) => {
                if let Some((key, term)) = compile_array(name, params.all(name), opts.array_keying) {
                    filters.insert(key, term);
                }
                continue;
            }
            (_, None) => continue,
            (FieldType::String, Some(raw)) => Bson::String(raw.to_string()),
            (FieldType::Int, Some(raw)) => {
                Bson::Int64(raw.parse::<i64>().map_err(|e| invalid(e.into()))?)
            }
            (FieldType::Bool, Some(raw)) => Bson::Boolean(parse_bool(raw).map_err(invalid)?),
            (FieldType::Id, Some(raw)) => Bson::ObjectId(parse_object_id(raw).map_err(invalid)?),
            (FieldType::Date, Some(raw)) => match parse_date(raw) {
                Ok(dt) => Bson::DateTime(dt),
                Err(e) if opts.dates == Policy::Strict => return Err(invalid(e)),
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "skipping date field {name}={raw:?}: {e}");
                    continue;
                }
            },
        };
        filters.insert(name.to_string(), FilterTerm::Value(value));
    }
    Ok(filters)
}

fn compile_array(
    name: &str,
    raw: &[String],
    keying: ArrayKeying,
) -> Option<(String, FilterTerm)> {
    let mut values = Vec::new();
    let mut last_was_id = false;
    for v in raw.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        match parse_object_id(v) {
            Ok(oid) => {
                values.push(Bson::ObjectId(oid));
                last_was_id = true;
            }
            Err(_) => {
                values.push(Bson::String(v.to_string()));
                last_was_id = false;
            }
        }
    }
    if values.is_empty() {
        return None;
    }
    let key = match keying {
        ArrayKeying::Declared => name.to_string(),
        ArrayKeying::LastElement if last_was_id => PRIMARY_KEY.to_string(),
        ArrayKeying::LastElement => name.to_string(),
    };
    Some((key, FilterTerm::In(values)))
}

fn parse_bool(raw: &str) -> Result<bool, FieldParseError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(FieldParseError::Bool(other.to_string())),
    }
}

/// `YYYY-MM-DD` to midnight UTC.
fn parse_date(raw: &str) -> Result<bson::DateTime, FieldParseError> {
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
    let millis = day.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
    Ok(bson::DateTime::from_millis(millis))
}
