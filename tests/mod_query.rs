use bson::Bson;
use nexusquery::query::{
    ArrayKeying, CompileOptions, FilterTerm, Filters, Order, Policy, SortSpec, compile_str,
};
use nexusquery::{FieldType, ParameterSet, QueryError, Schema, compile, compile_with, merge};
use std::collections::BTreeSet;

const OID: &str = "5f1a2b3c4d5e6f7a8b9c0d1e";

fn run(query: &str, schema: &Schema) -> Result<nexusquery::FilterDescriptor, QueryError> {
    compile(&ParameterSet::parse(query), schema)
}

#[test]
fn page_and_limit_give_skip() {
    let d = run("page=3&limit=20", &Schema::new()).unwrap();
    assert_eq!(d.skip, 40);
    assert_eq!(d.find_options().skip, Some(40));
    assert_eq!(d.find_options().limit, Some(20));
}

#[test]
fn offset_beats_page() {
    let d = run("offset=5&page=3&limit=20", &Schema::new()).unwrap();
    assert_eq!(d.skip, 5);
    assert_eq!(d.limit, Some(20));
}

#[test]
fn page_without_limit_is_rejected() {
    let err = run("page=2&status=open", &Schema::new()).unwrap_err();
    assert_eq!(err, QueryError::PageRequiresLimit);
    assert_eq!(err.to_string(), "page requires limit");
}

#[test]
fn malformed_pagination_is_strict_by_default_and_lenient_on_request() {
    let err = run("page=two&limit=10", &Schema::new()).unwrap_err();
    assert_eq!(err.field(), Some("page"));

    let lenient = CompileOptions::default().with_pagination(Policy::Lenient);
    let d = compile_str("page=two&limit=10", &Schema::new(), &lenient).unwrap();
    assert_eq!(d.page, None);
    assert_eq!(d.skip, 0);
}

#[test]
fn sort_needs_order_and_defaults_to_descending() {
    let asc = run("sort=name&order=asc", &Schema::new()).unwrap();
    assert_eq!(asc.sort, Some(vec![SortSpec { field: "name".into(), order: Order::Asc }]));
    assert!(run("sort=name", &Schema::new()).unwrap().sort.is_none());
    for order in ["DESC", "descending", "x", ""] {
        let d = run(&format!("sort=name&order={order}"), &Schema::new()).unwrap();
        assert_eq!(d.sort, Some(vec![SortSpec { field: "name".into(), order: Order::Desc }]));
    }
}

#[test]
fn int_schema_field() {
    let schema = Schema::new().field("age", FieldType::Int);
    let d = run("age=42", &schema).unwrap();
    assert_eq!(d.filters.get("age"), Some(&FilterTerm::Value(Bson::Int64(42))));
    let err = run("age=abc", &schema).unwrap_err();
    assert_eq!(err.field(), Some("age"));
    assert!(err.to_string().contains("'age'"));
}

#[test]
fn invalid_calendar_date_is_silently_omitted() {
    let schema = Schema::new().field("since", FieldType::Date);
    let d = run("since=2024-02-30", &schema).unwrap();
    assert!(!d.filters.contains_key("since"));
}

#[test]
fn projection_from_fields() {
    let d = run("fields=name,status,,age", &Schema::new()).unwrap();
    let expected: BTreeSet<String> = ["name", "status", "age"].into_iter().map(String::from).collect();
    assert_eq!(d.projection, expected);
}

#[test]
fn wide_projection_and_large_array_are_kept_whole() {
    let schema = Schema::new().field("tags", FieldType::Array);
    let fields = (0..70).map(|i| format!("f{i}")).collect::<Vec<_>>().join(",");
    let tags = (0..1500).map(|i| format!("tags=t{i}")).collect::<Vec<_>>().join("&");
    let d = run(&format!("fields={fields}&{tags}"), &schema).unwrap();
    assert_eq!(d.projection.len(), 70);
    let Some(FilterTerm::In(values)) = d.filters.get("tags") else { panic!("no $in under tags") };
    assert_eq!(values.len(), 1500);
}

#[test]
fn blank_sort_is_treated_as_absent() {
    let d = run("sort=&order=asc", &Schema::new()).unwrap();
    assert!(d.sort.is_none());
    assert!(d.sort_document().is_none());
}

#[test]
fn mixed_array_lands_under_declared_field() {
    let schema = Schema::new().field("refs", FieldType::Array);
    let d = run(&format!("refs={OID}&refs=open"), &schema).unwrap();
    let Some(FilterTerm::In(values)) = d.filters.get("refs") else { panic!("no $in under refs") };
    assert_eq!(values.len(), 2);
    assert!(matches!(values[0], Bson::ObjectId(_)));
    assert_eq!(values[1], Bson::String("open".into()));
}

// Legacy keying: the last element's classification picks the key. Pinned on purpose.
#[test]
fn legacy_array_keying_follows_last_element() {
    let schema = Schema::new().field("refs", FieldType::Array);
    let legacy = CompileOptions::default().with_array_keying(ArrayKeying::LastElement);

    let d = compile_str(&format!("refs=open&refs={OID}"), &schema, &legacy).unwrap();
    assert!(!d.filters.contains_key("refs"));
    let Some(FilterTerm::In(values)) = d.filters.get("_id") else { panic!("no $in under _id") };
    assert_eq!(values[0], Bson::String("open".into()));

    let d = compile_str(&format!("refs={OID}&refs=open"), &schema, &legacy).unwrap();
    assert!(d.filters.contains_key("refs"));
    assert!(!d.filters.contains_key("_id"));
}

#[test]
fn legacy_array_key_overwrites_base_id() {
    let schema = Schema::new().field("refs", FieldType::Array);
    let legacy = CompileOptions::default().with_array_keying(ArrayKeying::LastElement);
    let other = "65a0b1c2d3e4f5a6b7c8d9e0";
    let d = compile_str(&format!("id={other}&refs={OID}"), &schema, &legacy).unwrap();
    assert!(matches!(d.filters.get("_id"), Some(FilterTerm::In(_))));
}

#[test]
fn malformed_base_id_is_dropped_but_schema_id_fails() {
    let d = run("id=not-an-id&status=open", &Schema::new()).unwrap();
    assert!(!d.filters.contains_key("_id"));
    assert!(d.filters.contains_key("status"));

    let schema = Schema::new().field("owner", FieldType::Id);
    assert!(run("owner=not-an-id", &schema).is_err());
}

#[test]
fn compile_is_deterministic() {
    let schema = Schema::new()
        .field("age", FieldType::Int)
        .field("refs", FieldType::Array)
        .field("since", FieldType::Date)
        .field("active", FieldType::Bool);
    let q = format!(
        "id={OID}&status=open&fields=a,b&page=2&limit=5&sort=a&order=asc&age=7&refs=x&refs={OID}&since=2024-01-02&active=true"
    );
    let params = ParameterSet::parse(&q);
    let a = compile(&params, &schema).unwrap();
    let b = compile(&params, &schema).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.filter_document(), b.filter_document());
}

#[test]
fn caller_scoping_wins_over_query() {
    let schema = Schema::new().field("tenant", FieldType::String);
    let d = run("tenant=other&status=open", &schema).unwrap();
    let extra: Filters =
        [("tenant".to_string(), FilterTerm::Value(Bson::String("acme".into())))].into();
    let merged = merge(&d.filters, &extra);
    assert_eq!(merged.get("tenant"), Some(&FilterTerm::Value(Bson::String("acme".into()))));
    assert_eq!(merged.get("status"), Some(&FilterTerm::Value(Bson::String("open".into()))));
}

#[test]
fn strict_options_propagate() {
    let opts = CompileOptions::default().with_base_id(Policy::Strict).with_dates(Policy::Strict);
    let schema = Schema::new().field("since", FieldType::Date);
    assert!(compile_with(&ParameterSet::parse("id=bad"), &schema, &opts).is_err());
    assert!(compile_with(&ParameterSet::parse("since=yesterday"), &schema, &opts).is_err());
}
