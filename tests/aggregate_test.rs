use typedframe::{
    float64, int64, nullable, utf8, Aggregation, Column, DataFrame, Error, Schema, TypedFrame,
};

fn sales() -> TypedFrame {
    let df = DataFrame::from_columns([
        ("region", Column::utf8(vec!["north", "south", "north", "south", "north"])),
        ("rep", Column::utf8(vec!["ann", "ann", "bo", "bo", "ann"])),
        ("amount", Column::int64(vec![10, 20, 30, 40, 50])),
        ("rating", Column::float64(vec![1.0, 2.0, 3.0, 4.0, 5.0])),
    ])
    .unwrap();
    TypedFrame::new(
        df,
        [
            ("region", utf8()),
            ("rep", utf8()),
            ("amount", int64()),
            ("rating", float64()),
        ],
    )
    .validate(true)
    .unwrap()
}

#[test]
fn test_single_by_column_becomes_unique() {
    let frame = sales();
    let aggregated = frame
        .aggregate(
            &["region"],
            vec![("best".to_string(), Aggregation::max("amount"))],
        )
        .unwrap();

    let region = aggregated.schema().get("region").unwrap();
    assert!(region.unique);
    // The aggregation output keeps the source column's type verbatim
    assert_eq!(
        aggregated.schema().get("best"),
        frame.schema().get("amount")
    );

    let best = aggregated.data().column("best").unwrap().as_int64().unwrap();
    // Groups appear in first-occurrence order: north, south
    assert_eq!(best.get(0).unwrap(), Some(&50));
    assert_eq!(best.get(1).unwrap(), Some(&40));
}

#[test]
fn test_multiple_by_columns_stay_non_unique() {
    let aggregated = sales()
        .aggregate(
            &["region", "rep"],
            vec![("total".to_string(), Aggregation::sum("amount"))],
        )
        .unwrap();

    assert!(!aggregated.schema().get("region").unwrap().unique);
    assert!(!aggregated.schema().get("rep").unwrap().unique);
    assert_eq!(aggregated.row_count(), 4);

    let totals = aggregated.data().column("total").unwrap().as_int64().unwrap();
    // (north, ann) = 10 + 50
    assert_eq!(totals.get(0).unwrap(), Some(&60));
}

#[test]
fn test_reduction_values() {
    let aggregated = sales()
        .aggregate(
            &["region"],
            vec![
                ("lowest".to_string(), Aggregation::min("amount")),
                ("first_rep".to_string(), Aggregation::first("rep")),
                ("last_rep".to_string(), Aggregation::last("rep")),
                ("avg".to_string(), Aggregation::mean("rating")),
                ("mid".to_string(), Aggregation::median("rating")),
                ("usual_rep".to_string(), Aggregation::mode("rep")),
            ],
        )
        .unwrap();

    // north rows: amounts 10, 30, 50 / ratings 1, 3, 5 / reps ann, bo, ann
    let lowest = aggregated.data().column("lowest").unwrap().as_int64().unwrap();
    assert_eq!(lowest.get(0).unwrap(), Some(&10));

    let first_rep = aggregated.data().column("first_rep").unwrap().as_string().unwrap();
    assert_eq!(first_rep.get(0).unwrap().map(String::as_str), Some("ann"));
    let last_rep = aggregated.data().column("last_rep").unwrap().as_string().unwrap();
    assert_eq!(last_rep.get(0).unwrap().map(String::as_str), Some("ann"));

    let avg = aggregated.data().column("avg").unwrap().as_float64().unwrap();
    assert_eq!(avg.get(0).unwrap(), Some(&3.0));
    let mid = aggregated.data().column("mid").unwrap().as_float64().unwrap();
    assert_eq!(mid.get(0).unwrap(), Some(&3.0));

    let usual = aggregated.data().column("usual_rep").unwrap().as_string().unwrap();
    assert_eq!(usual.get(0).unwrap().map(String::as_str), Some("ann"));
}

#[test]
fn test_aggregation_skips_nulls() {
    let df = DataFrame::from_columns([
        ("key", Column::utf8(vec!["a", "a", "b"])),
        ("v", Column::int64_opt(vec![Some(2), None, None])),
    ])
    .unwrap();
    let frame = TypedFrame::new(df, [("key", utf8()), ("v", nullable(int64()))])
        .validate(true)
        .unwrap();

    let aggregated = frame
        .aggregate(
            &["key"],
            vec![
                ("top".to_string(), Aggregation::max("v")),
                ("total".to_string(), Aggregation::sum("v")),
            ],
        )
        .unwrap();

    let top = aggregated.data().column("top").unwrap().as_int64().unwrap();
    assert_eq!(top.get(0).unwrap(), Some(&2));
    // A group with no non-null values aggregates to null for max
    assert_eq!(top.get(1).unwrap(), None);

    let totals = aggregated.data().column("total").unwrap().as_int64().unwrap();
    assert_eq!(totals.get(0).unwrap(), Some(&2));
    assert_eq!(totals.get(1).unwrap(), Some(&0));
}

#[test]
fn test_sum_requires_numeric_column() {
    match sales().aggregate(
        &["region"],
        vec![("oops".to_string(), Aggregation::sum("rep"))],
    ) {
        Err(Error::Type(message)) => assert!(message.contains("rep")),
        _ => panic!("Expected a Type error"),
    }
}

#[test]
fn test_aggregate_unknown_column_fails_before_engine() {
    let result = sales().aggregate(
        &["region"],
        vec![("x".to_string(), Aggregation::max("ghost"))],
    );
    match result {
        Err(Error::ColumnNotFound(name)) => assert_eq!(name, "ghost"),
        _ => panic!("Expected a ColumnNotFound error"),
    }
}

#[test]
fn test_aggregate_output_order_follows_specs() {
    let aggregated = sales()
        .aggregate(
            &["region"],
            vec![
                ("z".to_string(), Aggregation::max("amount")),
                ("a".to_string(), Aggregation::min("amount")),
            ],
        )
        .unwrap();

    assert_eq!(aggregated.schema().names(), &["region", "z", "a"]);
    assert_eq!(aggregated.data().column_names(), &["region", "z", "a"]);
}

#[test]
fn test_schema_derivation_only_uses_declared_types() {
    // A mean over an integer column keeps the declared int64 in the schema
    // even though the engine emits floats; the mismatch persists until the
    // next validation pass.
    let frame = sales();
    let aggregated = frame
        .aggregate(
            &["region"],
            vec![("avg_amount".to_string(), Aggregation::mean("amount"))],
        )
        .unwrap();

    assert_eq!(
        aggregated.schema().get("avg_amount"),
        Some(&int64())
    );
    assert!(aggregated
        .data()
        .column("avg_amount")
        .unwrap()
        .as_float64()
        .is_some());

    // Validation converts the engine's floats back to the declared type
    let validated = aggregated.validate(false).unwrap();
    assert!(validated
        .data()
        .column("avg_amount")
        .unwrap()
        .as_int64()
        .is_some());
}

#[test]
fn test_schema_from_mapping_auto_promotes() {
    // Construction accepts plain mappings wherever a schema is expected
    let schema: Schema = vec![("a", int64()), ("b", float64())].into();
    assert_eq!(schema.names(), &["a", "b"]);
}
