use serde::{Deserialize, Serialize};

/// What to do with a value that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Policy {
    /// Abort the compile call.
    Strict,
    /// Log a warning and leave the value unset.
    Lenient,
}

/// Which key an `Array` field's membership predicate is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArrayKeying {
    /// The field name the schema declares.
    #[default]
    Declared,
    /// Legacy behavior: the classification of the last element decides, so an
    /// identifier-shaped last element files the predicate under `_id`.
    LastElement,
}

/// Per-parameter-class strictness and array keying for one compile call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// `page`, `limit`, `offset`.
    pub pagination: Policy,
    /// The base `id` parameter.
    pub base_id: Policy,
    /// `Date` schema fields.
    pub dates: Policy,
    pub array_keying: ArrayKeying,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            pagination: Policy::Strict,
            base_id: Policy::Lenient,
            dates: Policy::Lenient,
            array_keying: ArrayKeying::Declared,
        }
    }
}

impl CompileOptions {
    #[must_use]
    pub const fn with_pagination(mut self, policy: Policy) -> Self {
        self.pagination = policy;
        self
    }

    #[must_use]
    pub const fn with_base_id(mut self, policy: Policy) -> Self {
        self.base_id = policy;
        self
    }

    #[must_use]
    pub const fn with_dates(mut self, policy: Policy) -> Self {
        self.dates = policy;
        self
    }

    #[must_use]
    pub const fn with_array_keying(mut self, keying: ArrayKeying) -> Self {
        self.array_keying = keying;
        self
    }
}
