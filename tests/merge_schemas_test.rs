use typedframe::{
    float64, int64, merge_schemas, nullable, unique, utf8, Error, Schema,
};

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_merge_requires_matching_representations() {
    let left = Schema::from([("id", int64())]);
    let right = Schema::from([("id", utf8())]);

    match merge_schemas(
        &left,
        &right,
        &keys(&["id"]),
        &keys(&["id"]),
        ("_x", "_y"),
        true,
        false,
    ) {
        Err(Error::MergeTypeMismatch {
            left, right, ..
        }) => {
            assert_eq!(left, "id");
            assert_eq!(right, "id");
        }
        _ => panic!("Expected a MergeTypeMismatch error"),
    }
}

#[test]
fn test_one_to_one_inner_merge_keeps_constraints() {
    let left = Schema::from([("id", unique(int64())), ("x", unique(int64()))]);
    let right = Schema::from([("id", unique(int64())), ("x", unique(int64()))]);

    let merged = merge_schemas(
        &left,
        &right,
        &keys(&["id"]),
        &keys(&["id"]),
        ("_x", "_y"),
        true,
        true,
    )
    .unwrap();

    let id = merged.get("id").unwrap();
    assert!(id.unique);
    assert!(!id.nullable);

    // Shared non-key columns are suffixed on both sides; inner keeps them
    // non-nullable and one-to-one keeps their declared uniqueness
    let x_x = merged.get("x_x").unwrap();
    let x_y = merged.get("x_y").unwrap();
    assert!(!x_x.nullable);
    assert!(!x_y.nullable);
    assert!(x_x.unique);
    assert!(x_y.unique);
    assert!(!merged.contains("x"));
}

#[test]
fn test_left_merge_relaxes_shared_columns_to_nullable() {
    let left = Schema::from([("id", unique(int64())), ("x", int64())]);
    let right = Schema::from([("id", unique(int64())), ("x", int64())]);

    let merged = merge_schemas(
        &left,
        &right,
        &keys(&["id"]),
        &keys(&["id"]),
        ("_x", "_y"),
        false,
        false,
    )
    .unwrap();

    assert!(merged.get("x_x").unwrap().nullable);
    assert!(merged.get("x_y").unwrap().nullable);
}

#[test]
fn test_key_uniqueness_is_and_of_both_sides() {
    let left = Schema::from([("id", unique(int64()))]);
    let right = Schema::from([("id", int64())]);

    let merged = merge_schemas(
        &left,
        &right,
        &keys(&["id"]),
        &keys(&["id"]),
        ("_x", "_y"),
        true,
        false,
    )
    .unwrap();

    assert!(!merged.get("id").unwrap().unique);
}

#[test]
fn test_inner_suppresses_left_key_nullability_only() {
    let left = Schema::from([("id", nullable(int64()))]);
    let right = Schema::from([("id", int64())]);

    let inner = merge_schemas(
        &left,
        &right,
        &keys(&["id"]),
        &keys(&["id"]),
        ("_x", "_y"),
        true,
        false,
    )
    .unwrap();
    assert!(!inner.get("id").unwrap().nullable);

    let outer = merge_schemas(
        &left,
        &right,
        &keys(&["id"]),
        &keys(&["id"]),
        ("_x", "_y"),
        false,
        false,
    )
    .unwrap();
    assert!(outer.get("id").unwrap().nullable);

    // Nullability on the right key survives even for inner joins
    let right_nullable = merge_schemas(
        &Schema::from([("id", int64())]),
        &Schema::from([("id", nullable(int64()))]),
        &keys(&["id"]),
        &keys(&["id"]),
        ("_x", "_y"),
        true,
        false,
    )
    .unwrap();
    assert!(right_nullable.get("id").unwrap().nullable);
}

#[test]
fn test_differently_named_keys_both_appear_with_merged_type() {
    let left = Schema::from([("lhs_id", unique(int64())), ("a", float64())]);
    let right = Schema::from([("rhs_id", unique(int64())), ("b", utf8())]);

    let merged = merge_schemas(
        &left,
        &right,
        &keys(&["lhs_id"]),
        &keys(&["rhs_id"]),
        ("_x", "_y"),
        true,
        false,
    )
    .unwrap();

    assert_eq!(merged.get("lhs_id"), merged.get("rhs_id"));
    assert!(merged.get("lhs_id").unwrap().unique);
}

#[test]
fn test_passthrough_columns_relax_per_join_kind() {
    let left = Schema::from([("id", unique(int64())), ("only_left", unique(utf8()))]);
    let right = Schema::from([("id", unique(int64())), ("only_right", float64())]);

    // Not inner, not one-to-one: passthroughs become nullable and lose uniqueness
    let relaxed = merge_schemas(
        &left,
        &right,
        &keys(&["id"]),
        &keys(&["id"]),
        ("_x", "_y"),
        false,
        false,
    )
    .unwrap();
    let only_left = relaxed.get("only_left").unwrap();
    assert!(only_left.nullable);
    assert!(!only_left.unique);
    assert!(relaxed.get("only_right").unwrap().nullable);

    // Inner one-to-one: passthroughs keep their declared constraints
    let kept = merge_schemas(
        &left,
        &right,
        &keys(&["id"]),
        &keys(&["id"]),
        ("_x", "_y"),
        true,
        true,
    )
    .unwrap();
    let only_left = kept.get("only_left").unwrap();
    assert!(!only_left.nullable);
    assert!(only_left.unique);
}

#[test]
fn test_merged_schema_order_follows_join_output() {
    let left = Schema::from([("id", int64()), ("shared", utf8()), ("l", float64())]);
    let right = Schema::from([("id", int64()), ("shared", utf8()), ("r", float64())]);

    let merged = merge_schemas(
        &left,
        &right,
        &keys(&["id"]),
        &keys(&["id"]),
        ("_x", "_y"),
        true,
        false,
    )
    .unwrap();

    let names: Vec<&str> = merged.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["id", "shared_x", "l", "shared_y", "r"]);
}

#[test]
fn test_key_list_length_mismatch_fails() {
    let left = Schema::from([("a", int64()), ("b", int64())]);
    let right = Schema::from([("a", int64())]);

    match merge_schemas(
        &left,
        &right,
        &keys(&["a", "b"]),
        &keys(&["a"]),
        ("_x", "_y"),
        true,
        false,
    ) {
        Err(Error::JoinKeyLengthMismatch { left, right }) => {
            assert_eq!(left, 2);
            assert_eq!(right, 1);
        }
        _ => panic!("Expected a JoinKeyLengthMismatch error"),
    }
}
