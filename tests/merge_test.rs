use std::str::FromStr;

use typedframe::{
    float64, int64, nullable, unique, utf8, Cardinality, Column, DataFrame, Error, JoinType,
    MergeOptions, TypedFrame,
};

fn orders() -> TypedFrame {
    let df = DataFrame::from_columns([
        ("order_id", Column::int64(vec![10, 11, 12, 13])),
        ("customer", Column::int64(vec![1, 1, 2, 4])),
        ("total", Column::float64(vec![5.0, 7.5, 1.25, 9.0])),
    ])
    .unwrap();
    TypedFrame::new(
        df,
        [
            ("order_id", unique(int64())),
            ("customer", int64()),
            ("total", float64()),
        ],
    )
    .validate(true)
    .unwrap()
}

fn customers() -> TypedFrame {
    let df = DataFrame::from_columns([
        ("id", Column::int64(vec![1, 2, 3])),
        ("name", Column::utf8(vec!["alice", "bob", "carol"])),
    ])
    .unwrap();
    TypedFrame::new(df, [("id", unique(int64())), ("name", utf8())])
        .validate(true)
        .unwrap()
}

#[test]
fn test_inner_merge_on_shared_key() {
    let left = customers();
    let right = customers();

    let merged = left
        .merge(
            &right,
            MergeOptions::on(["id"])
                .how(JoinType::Inner)
                .cardinality(Cardinality::OneToOne),
        )
        .unwrap();

    let id = merged.schema().get("id").unwrap();
    assert!(id.unique);
    assert!(!id.nullable);

    let name_x = merged.schema().get("name_x").unwrap();
    let name_y = merged.schema().get("name_y").unwrap();
    assert!(!name_x.nullable);
    assert!(!name_y.nullable);

    assert_eq!(merged.row_count(), 3);
    assert_eq!(
        merged.data().column_names(),
        &["id", "name_x", "name_y"]
    );
}

#[test]
fn test_many_to_one_merge_joins_rows() {
    let merged = orders()
        .merge(
            &customers(),
            MergeOptions::left_right(["customer"], ["id"])
                .how(JoinType::Inner)
                .cardinality(Cardinality::ManyToOne),
        )
        .unwrap();

    // Order 13 references customer 4, which does not exist
    assert_eq!(merged.row_count(), 3);
    // Both key columns appear since their names differ
    assert!(merged.schema().contains("customer"));
    assert!(merged.schema().contains("id"));
    assert_eq!(
        merged.schema().get("customer"),
        merged.schema().get("id")
    );

    let names = merged.data().column("name").unwrap().as_string().unwrap();
    assert_eq!(names.get(0).unwrap().map(String::as_str), Some("alice"));
    assert_eq!(names.get(2).unwrap().map(String::as_str), Some("bob"));
}

#[test]
fn test_left_merge_relaxes_nullability() {
    let merged = orders()
        .merge(
            &customers(),
            MergeOptions::left_right(["customer"], ["id"])
                .how(JoinType::Left)
                .cardinality(Cardinality::ManyToOne),
        )
        .unwrap();

    assert_eq!(merged.row_count(), 4);
    assert!(merged.schema().get("name").unwrap().nullable);

    // The unmatched order keeps its row with a null name
    let names = merged.data().column("name").unwrap().as_string().unwrap();
    assert_eq!(names.get(3).unwrap(), None);
}

#[test]
fn test_one_sided_cardinality_requires_unique_left_key() {
    // "customer" is not unique on the left side
    match orders().merge(
        &customers(),
        MergeOptions::left_right(["customer"], ["id"]).cardinality(Cardinality::OneToMany),
    ) {
        Err(Error::CardinalityViolation { column, side }) => {
            assert_eq!(column, "customer");
            assert_eq!(side, "one-to-x");
        }
        _ => panic!("Expected a CardinalityViolation error"),
    }
}

#[test]
fn test_cardinality_checks_right_side_too() {
    let df = DataFrame::from_columns([
        ("id", Column::int64(vec![1, 2])),
        ("v", Column::float64(vec![1.0, 2.0])),
    ])
    .unwrap();
    // Unique but nullable: still invalid for the "one" side
    let right = TypedFrame::new(df, [("id", unique(nullable(int64()))), ("v", float64())])
        .validate(false)
        .unwrap();

    match orders().merge(
        &right,
        MergeOptions::left_right(["customer"], ["id"]).cardinality(Cardinality::ManyToOne),
    ) {
        Err(Error::CardinalityViolation { column, side }) => {
            assert_eq!(column, "id");
            assert_eq!(side, "x-to-one");
        }
        _ => panic!("Expected a CardinalityViolation error"),
    }
}

#[test]
fn test_merge_requires_join_keys() {
    match orders().merge(&customers(), MergeOptions::default()) {
        Err(Error::MissingJoinKeys) => {}
        _ => panic!("Expected a MissingJoinKeys error"),
    }
}

#[test]
fn test_merge_rejects_mismatched_key_lists() {
    match orders().merge(
        &customers(),
        MergeOptions::left_right(["customer", "order_id"], ["id"]),
    ) {
        Err(Error::JoinKeyLengthMismatch { left, right }) => {
            assert_eq!(left, 2);
            assert_eq!(right, 1);
        }
        _ => panic!("Expected a JoinKeyLengthMismatch error"),
    }
}

#[test]
fn test_merge_rejects_incompatible_key_types() {
    let df = DataFrame::from_columns([("id", Column::utf8(vec!["1", "2"]))]).unwrap();
    let right = TypedFrame::new(df, [("id", utf8())]).validate(true).unwrap();

    match orders().merge(
        &right,
        MergeOptions::left_right(["customer"], ["id"]),
    ) {
        Err(Error::MergeTypeMismatch { left, right, .. }) => {
            assert_eq!(left, "customer");
            assert_eq!(right, "id");
        }
        _ => panic!("Expected a MergeTypeMismatch error"),
    }
}

#[test]
fn test_cardinality_parses_all_literals() {
    assert_eq!(
        Cardinality::from_str("one-to-one").unwrap(),
        Cardinality::OneToOne
    );
    assert_eq!(
        Cardinality::from_str("one-to-many").unwrap(),
        Cardinality::OneToMany
    );
    assert_eq!(
        Cardinality::from_str("many-to-one").unwrap(),
        Cardinality::ManyToOne
    );
    assert_eq!(
        Cardinality::from_str("many-to-many").unwrap(),
        Cardinality::ManyToMany
    );
    assert_eq!(Cardinality::OneToMany.as_str(), "one-to-many");
}

#[test]
fn test_invalid_cardinality_lists_valid_values() {
    match Cardinality::from_str("sideways") {
        Err(error @ Error::InvalidCardinality(_)) => {
            let message = error.to_string();
            assert!(message.contains("sideways"));
            assert!(message.contains("many-to-many"));
            assert!(message.contains("one-to-many"));
            assert!(message.contains("many-to-one"));
            assert!(message.contains("one-to-one"));
        }
        _ => panic!("Expected an InvalidCardinality error"),
    }
}

#[test]
fn test_custom_suffixes_flow_through_schema_and_data() {
    let merged = customers()
        .merge(
            &customers(),
            MergeOptions::on(["id"])
                .how(JoinType::Inner)
                .cardinality(Cardinality::OneToOne)
                .suffixes("_left", "_right"),
        )
        .unwrap();

    assert!(merged.schema().contains("name_left"));
    assert!(merged.schema().contains("name_right"));
    assert!(merged.data().contains_column("name_left"));
    assert!(merged.data().contains_column("name_right"));
}

#[test]
fn test_failed_merge_leaves_inputs_untouched() {
    let left = orders();
    let right = customers();

    assert!(left
        .merge(
            &right,
            MergeOptions::left_right(["customer"], ["id"]).cardinality(Cardinality::OneToMany),
        )
        .is_err());

    assert_eq!(left.row_count(), 4);
    assert_eq!(right.row_count(), 3);
}
