use typedframe::io::{read_csv, read_csv_from, read_json, write_csv, write_json};
use typedframe::{
    boolean, date, float64, int64, nullable, unique, utf8, Column, DataFrame, Error, TypedFrame,
};

fn sample_frame() -> TypedFrame {
    let df = DataFrame::from_columns([
        ("id", Column::int64(vec![1, 2, 3])),
        ("name", Column::utf8(vec!["ann", "bo", "cy"])),
        ("score", Column::float64(vec![1.5, 2.0, 3.25])),
        ("active", Column::boolean(vec![true, false, true])),
    ])
    .unwrap();
    TypedFrame::new(
        df,
        [
            ("id", unique(int64())),
            ("name", utf8()),
            ("score", float64()),
            ("active", boolean()),
        ],
    )
    .validate(true)
    .unwrap()
}

#[test]
fn test_csv_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.csv");

    let frame = sample_frame();
    write_csv(&frame, &path).unwrap();
    let read_back = read_csv(
        &path,
        [
            ("id", unique(int64())),
            ("name", utf8()),
            ("score", float64()),
            ("active", boolean()),
        ],
    )
    .unwrap();

    assert_eq!(read_back.row_count(), 3);
    let ids = read_back.data().column("id").unwrap().as_int64().unwrap();
    assert_eq!(ids.get(2).unwrap(), Some(&3));
    let scores = read_back.data().column("score").unwrap().as_float64().unwrap();
    assert_eq!(scores.get(2).unwrap(), Some(&3.25));
    let active = read_back.data().column("active").unwrap().as_boolean().unwrap();
    assert_eq!(active.get(1).unwrap(), Some(&false));
}

#[test]
fn test_read_csv_empty_fields_become_nulls() {
    let data = "id,score\n1,\n2,4.5\n";
    let frame = read_csv_from(
        data.as_bytes(),
        [("id", int64()), ("score", nullable(float64()))],
    )
    .unwrap();

    let scores = frame.data().column("score").unwrap().as_float64().unwrap();
    assert_eq!(scores.get(0).unwrap(), None);
    assert_eq!(scores.get(1).unwrap(), Some(&4.5));
}

#[test]
fn test_read_csv_enforces_schema_strictly() {
    // Null in a non-nullable column
    let data = "id,score\n1,\n2,4.5\n";
    match read_csv_from(data.as_bytes(), [("id", int64()), ("score", float64())]) {
        Err(Error::NullConstraint(column)) => assert_eq!(column, "score"),
        _ => panic!("Expected a NullConstraint error"),
    }

    // Duplicate in a unique column
    let data = "id\n7\n7\n";
    match read_csv_from(data.as_bytes(), [("id", unique(int64()))]) {
        Err(Error::UniquenessViolation(column)) => assert_eq!(column, "id"),
        _ => panic!("Expected a UniquenessViolation error"),
    }

    // A declared column absent from the file
    let data = "id\n1\n";
    match read_csv_from(data.as_bytes(), [("id", int64()), ("ghost", utf8())]) {
        Err(Error::MissingColumns(columns)) => assert_eq!(columns, vec!["ghost".to_string()]),
        _ => panic!("Expected a MissingColumns error"),
    }

    // A column that cannot be parsed into its declared representation
    let data = "id\nseven\n";
    match read_csv_from(data.as_bytes(), [("id", int64())]) {
        Err(Error::TypeConversion { column, .. }) => assert_eq!(column, "id"),
        _ => panic!("Expected a TypeConversion error"),
    }
}

#[test]
fn test_read_csv_parses_dates() {
    let data = "day,v\n2024-01-02,1\n2024-01-03,2\n";
    let frame = read_csv_from(data.as_bytes(), [("day", unique(date())), ("v", int64())]).unwrap();

    let days = frame.data().column("day").unwrap().as_date().unwrap();
    assert_eq!(days.format_value(0).as_deref(), Some("2024-01-02"));
}

#[test]
fn test_json_records_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.json");

    let frame = sample_frame();
    write_json(&frame, &path).unwrap();
    let read_back = read_json(
        &path,
        [
            ("id", unique(int64())),
            ("name", utf8()),
            ("score", float64()),
            ("active", boolean()),
        ],
    )
    .unwrap();

    assert_eq!(read_back.row_count(), 3);
    let names = read_back.data().column("name").unwrap().as_string().unwrap();
    assert_eq!(names.get(0).unwrap().map(String::as_str), Some("ann"));
    let scores = read_back.data().column("score").unwrap().as_float64().unwrap();
    assert_eq!(scores.get(1).unwrap(), Some(&2.0));
}

#[test]
fn test_read_json_column_oriented() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("columns.json");
    std::fs::write(&path, r#"{"id": [1, 2], "name": ["a", null]}"#).unwrap();

    let frame = read_json(&path, [("id", int64()), ("name", nullable(utf8()))]).unwrap();
    assert_eq!(frame.row_count(), 2);
    let names = frame.data().column("name").unwrap().as_string().unwrap();
    assert_eq!(names.get(1).unwrap(), None);
}

#[test]
fn test_read_json_rejects_scalar_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "42").unwrap();

    match read_json(&path, [("id", int64())]) {
        Err(Error::Format(_)) => {}
        _ => panic!("Expected a Format error"),
    }
}

#[test]
fn test_write_returns_frame_for_chaining() {
    let dir = tempfile::tempdir().unwrap();
    let frame = sample_frame();

    let returned = write_csv(&frame, dir.path().join("a.csv")).unwrap();
    write_json(returned, dir.path().join("a.json")).unwrap();
}
