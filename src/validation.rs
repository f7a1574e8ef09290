//! Named validation rules for request bodies.
//!
//! A [`RuleSet`] is assembled once at startup and then only read; handlers receive it by
//! reference. Request types implement [`Validate`] and report every failing field at once.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::types::parse_object_id;

type RuleFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Immutable registry of named string rules.
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: BTreeMap<String, RuleFn>,
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet").field("rules", &self.rules.keys().collect::<Vec<_>>()).finish()
    }
}

impl RuleSet {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// `required`, `objectid`, and `ltnow` (a `YYYY-MM-DD` date strictly before `today`).
    #[must_use]
    pub fn standard(today: NaiveDate) -> Self {
        Self::empty()
            .with_rule("required", |v| !v.trim().is_empty())
            .with_rule("objectid", |v| parse_object_id(v).is_ok())
            .with_rule("ltnow", move |v| {
                NaiveDate::parse_from_str(v, "%Y-%m-%d").is_ok_and(|d| d < today)
            })
    }

    /// Adds or replaces a rule. Only available while the set is being built.
    #[must_use]
    pub fn with_rule<F>(mut self, name: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.rules.insert(name.into(), Arc::new(rule));
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// `None` when no rule is registered under `name`.
    #[must_use]
    pub fn check(&self, name: &str, value: &str) -> Option<bool> {
        self.rules.get(name).map(|r| r(value))
    }

    #[must_use]
    pub fn validator(&self) -> Validator<'_> {
        Validator { rules: self, errors: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub rule: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}' failed on '{}' rule", self.field, self.rule)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", join(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn join(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Collects field failures for one value.
pub struct Validator<'a> {
    rules: &'a RuleSet,
    errors: Vec<FieldError>,
}

impl Validator<'_> {
    /// Records a failure when `value` does not satisfy `rule`. An unknown rule counts as a failure.
    pub fn check(&mut self, field: &str, rule: &str, value: &str) -> &mut Self {
        if self.rules.check(rule, value) != Some(true) {
            log::debug!("field '{field}' failed on '{rule}' rule");
            self.errors.push(FieldError { field: field.to_string(), rule: rule.to_string() });
        }
        self
    }

    /// Like `check`, but an absent value passes.
    pub fn check_opt(&mut self, field: &str, rule: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            self.check(field, rule, v);
        }
        self
    }

    /// # Errors
    /// Every recorded failure, when there is at least one.
    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(ValidationErrors { errors: std::mem::take(&mut self.errors) })
    }
}

/// Request types that can check themselves against a rule registry.
pub trait Validate {
    /// # Errors
    /// Every field that failed its rule.
    fn validate(&self, rules: &RuleSet) -> Result<(), ValidationErrors>;
}
