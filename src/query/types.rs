use bson::{Bson, Document as BsonDocument, doc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    /// Storage-engine sort direction: `1` ascending, `-1` descending.
    #[must_use]
    pub const fn direction(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

/// One filter entry: an equality value or a membership predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterTerm {
    Value(Bson),
    In(Vec<Bson>),
}

impl FilterTerm {
    #[must_use]
    pub fn to_bson(&self) -> Bson {
        match self {
            Self::Value(v) => v.clone(),
            Self::In(values) => Bson::Document(doc! { "$in": values.clone() }),
        }
    }
}

impl From<Bson> for FilterTerm {
    fn from(value: Bson) -> Self {
        Self::Value(value)
    }
}

/// Field name to filter term. Ordered so rendering is deterministic.
pub type Filters = BTreeMap<String, FilterTerm>;

/// Renders a filter map into the document shape the storage engine's `find` takes.
#[must_use]
pub fn filters_to_document(filters: &Filters) -> BsonDocument {
    let mut out = BsonDocument::new();
    for (k, term) in filters {
        out.insert(k.clone(), term.to_bson());
    }
    out
}

/// Options for the storage layer's `find`.
///
/// Semantics:
/// - When `projection` is `Some(fields)`, the returned documents contain only those fields.
/// - Results are sliced by `skip`/`limit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindOptions {
    pub projection: Option<Vec<String>>,
    pub sort: Option<Vec<SortSpec>>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
}

/// The compiler's output for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    pub filters: Filters,
    /// Fields to include. Empty means every field.
    pub projection: BTreeSet<String>,
    pub sort: Option<Vec<SortSpec>>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Authoritative number of documents to discard.
    pub skip: u64,
}

impl FilterDescriptor {
    #[must_use]
    pub fn filter_document(&self) -> BsonDocument {
        filters_to_document(&self.filters)
    }

    #[must_use]
    pub fn find_options(&self) -> FindOptions {
        FindOptions {
            projection: (!self.projection.is_empty())
                .then(|| self.projection.iter().cloned().collect()),
            sort: self.sort.clone(),
            limit: self.limit,
            skip: (self.skip > 0).then_some(self.skip),
        }
    }

    /// Projection in storage-engine form (`{ field: 1, ... }`), if any.
    #[must_use]
    pub fn projection_document(&self) -> Option<BsonDocument> {
        if self.projection.is_empty() {
            return None;
        }
        let mut out = BsonDocument::new();
        for f in &self.projection {
            out.insert(f.clone(), 1i32);
        }
        Some(out)
    }

    /// Sort in storage-engine form (`{ field: 1 | -1 }`), if any.
    #[must_use]
    pub fn sort_document(&self) -> Option<BsonDocument> {
        let specs = self.sort.as_ref()?;
        let mut out = BsonDocument::new();
        for s in specs {
            out.insert(s.field.clone(), s.order.direction());
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_renders_as_in_operator() {
        let mut filters = Filters::new();
        filters.insert("status".into(), FilterTerm::Value(Bson::String("open".into())));
        filters.insert(
            "tags".into(),
            FilterTerm::In(vec![Bson::String("a".into()), Bson::String("b".into())]),
        );
        let d = filters_to_document(&filters);
        assert_eq!(d.get_str("status").unwrap(), "open");
        let tags = d.get_document("tags").unwrap();
        assert_eq!(tags.get_array("$in").unwrap().len(), 2);
    }

    #[test]
    fn find_options_omit_empty_parts() {
        let desc = FilterDescriptor::default();
        assert_eq!(desc.find_options(), FindOptions::default());
        assert!(desc.projection_document().is_none());
        assert!(desc.sort_document().is_none());
    }

    #[test]
    fn find_options_carry_projection_sort_and_slice() {
        let desc = FilterDescriptor {
            projection: ["name".to_string(), "age".to_string()].into_iter().collect(),
            sort: Some(vec![SortSpec { field: "name".into(), order: Order::Desc }]),
            limit: Some(20),
            skip: 40,
            ..FilterDescriptor::default()
        };
        let opts = desc.find_options();
        assert_eq!(opts.projection, Some(vec!["age".to_string(), "name".to_string()]));
        assert_eq!(opts.limit, Some(20));
        assert_eq!(opts.skip, Some(40));
        assert_eq!(desc.sort_document().unwrap().get_i32("name").unwrap(), -1);
        assert_eq!(desc.projection_document().unwrap().get_i32("age").unwrap(), 1);
    }
}
