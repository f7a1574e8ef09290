use super::types::Filters;

/// Unions compiled query filters with programmatically injected ones.
///
/// `extra` wins on collisions: it carries trusted scoping (tenant, owner) that a
/// query string must not be able to override.
#[must_use]
pub fn merge(compiled: &Filters, extra: &Filters) -> Filters {
    let mut out = compiled.clone();
    out.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::types::FilterTerm;
    use bson::Bson;

    fn term(s: &str) -> FilterTerm {
        FilterTerm::Value(Bson::String(s.into()))
    }

    #[test]
    fn extra_overrides_compiled() {
        let compiled: Filters =
            [("tenant".to_string(), term("evil")), ("status".to_string(), term("open"))].into();
        let extra: Filters = [("tenant".to_string(), term("acme"))].into();
        let merged = merge(&compiled, &extra);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("tenant"), Some(&term("acme")));
        assert_eq!(merged.get("status"), Some(&term("open")));
    }

    #[test]
    fn empty_sides() {
        let one: Filters = [("a".to_string(), term("x"))].into();
        assert_eq!(merge(&one, &Filters::new()), one);
        assert_eq!(merge(&Filters::new(), &one), one);
    }
}
