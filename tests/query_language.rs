//! Filter language to wire tree, through the public API only

use serde_json::json;

use zbase_core::wire::{LogicalOperator, QueryOperator, QueryOrdering, SubQuery};
use zbase_core::{parse_filter, Error, Query};

fn compile_text(filter: &str) -> SubQuery {
    parse_filter(filter)
        .expect("filter should parse")
        .compile("owner", "table")
        .expect("filter should compile")
}

#[test]
fn test_parsed_and_built_queries_agree() {
    let cases = vec![
        (r#"uid = "jason""#, Query::eq("uid", "jason")),
        ("age >= 18", Query::gte("age", 18)),
        ("score < 2.5", Query::lt("score", 2.5)),
        (r#"body ~ "rust""#, Query::text("body", "rust")),
        (r#"uid != "x""#, Query::not_eq("uid", "x")),
        (r#"uid not "x""#, Query::not_eq("uid", "x")),
        (
            r#"(uid = "jason" or uid = "charlotte") and type = 1"#,
            Query::and(
                Query::or(Query::eq("uid", "jason"), Query::eq("uid", "charlotte")),
                Query::eq("type", 1),
            ),
        ),
    ];

    for (text, built) in cases {
        assert_eq!(
            compile_text(text),
            built.compile("owner", "table"),
            "filter {:?}",
            text
        );
    }
}

#[test]
fn test_wire_shape() {
    let tree = compile_text(r#"(uid = "jason" or uid = "charlotte") and type = 1"#);
    let value = serde_json::to_value(&tree).unwrap();

    assert_eq!(
        value,
        json!({
            "isCompound": true,
            "compoundOperator": "AND",
            "compoundLeft": {
                "isCompound": true,
                "compoundOperator": "OR",
                "compoundLeft": {
                    "isCompound": false,
                    "comparison": {
                        "operator": "EQ",
                        "field": "uid",
                        "value": "jason",
                        "ordering": "LEXICOGRAPHIC"
                    }
                },
                "compoundRight": {
                    "isCompound": false,
                    "comparison": {
                        "operator": "EQ",
                        "field": "uid",
                        "value": "charlotte",
                        "ordering": "LEXICOGRAPHIC"
                    }
                }
            },
            "compoundRight": {
                "isCompound": false,
                "comparison": {
                    "operator": "EQ",
                    "field": "type",
                    "value": "1",
                    "ordering": "REAL_NUMBERS"
                }
            }
        })
    );

    let back: SubQuery = serde_json::from_value(value).unwrap();
    assert_eq!(back, tree);
    assert!(back.is_well_formed());
}

#[test]
fn test_conjunctions_fold_left_to_right() {
    // a and b or c  ->  (a and b) or c
    let tree = compile_text("a = 1 and b = 2 or c = 3");
    assert_eq!(tree.compound_operator, Some(LogicalOperator::Or));
    let left = tree.compound_left.as_deref().unwrap();
    assert_eq!(left.compound_operator, Some(LogicalOperator::And));
    let right = tree.compound_right.as_deref().unwrap();
    assert_eq!(right.comparison.as_ref().unwrap().field, "c");

    // a or b and c  ->  (a or b) and c, not a or (b and c)
    let tree = compile_text("a = 1 or b = 2 and c = 3");
    assert_eq!(tree.compound_operator, Some(LogicalOperator::And));
    assert_eq!(tree.leaf_count(), 3);
}

#[test]
fn test_text_search_is_always_full_text() {
    let tree = Query::text("age", 30).compile("owner", "table");
    let comparison = tree.comparison.unwrap();
    assert_eq!(comparison.operator, QueryOperator::TextSearch);
    assert_eq!(comparison.ordering, QueryOrdering::FullText);
    assert_eq!(comparison.value, "30");
}

#[test]
fn test_float_literals_keep_six_decimals() {
    let tree = compile_text("(age > 30.0)");
    let comparison = tree.comparison.unwrap();
    assert_eq!(comparison.operator, QueryOperator::GreaterThan);
    assert_eq!(comparison.value, "30.000000");
    assert_eq!(comparison.ordering, QueryOrdering::RealNumbers);
}

#[test]
fn test_whitespace_is_insignificant() {
    assert_eq!(
        compile_text("a=1 and(b>=2)"),
        compile_text("  a =  1\n and ( b >= 2 )  ")
    );
}

#[test]
fn test_syntax_errors_report_position() {
    for (text, at) in [(r#"rig BLAH "hello""#, 4), ("age >", 5), (r#"a = 1 xor b = 2"#, 6)] {
        match parse_filter(text) {
            Err(Error::Parse { position, .. }) => assert_eq!(position, at, "filter {:?}", text),
            other => panic!("expected parse error for {:?}, got {:?}", text, other),
        }
    }
}

#[test]
fn test_operator_value_kind_mismatch_is_rejected() {
    let relational = parse_filter(r#"age > "old""#).unwrap();
    assert!(matches!(relational.to_query(), Err(Error::InvalidQuery(_))));

    let text = parse_filter("body ~ 12").unwrap();
    assert!(matches!(
        text.compile("owner", "table"),
        Err(Error::InvalidQuery(_))
    ));
}

#[test]
fn test_parser_is_reusable() {
    let first = parse_filter(r#"rig = "hello""#).unwrap();
    let _ = parse_filter("broken (");
    let again = parse_filter(r#"rig = "hello""#).unwrap();
    assert_eq!(first, again);
}
