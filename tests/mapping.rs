use gridcast::testing::TestGrid;
use gridcast::{block, read, write, CellValue, Convert, Mapping, Options, Region, Registry, Value};

fn registry() -> Registry {
    Registry::with_defaults()
}

#[test]
fn two_column_blocks_read_as_mappings() -> gridcast::Result<()> {
    let grid = TestGrid::from_rows(1, 1, block![["a", 1.0], ["b", 2.0]]);
    let options = Options::new().convert(Convert::Mapping);
    let value = read(&grid, Region::new(1, 1, 2, 2), None, &options, &registry())?;

    let expected: Mapping = [("a".into(), 1.0.into()), ("b".into(), 2.0.into())]
        .into_iter()
        .collect();
    assert_eq!(value, Value::Mapping(expected));
    Ok(())
}

#[test]
fn the_dict_alias_selects_the_mapping_converter() -> gridcast::Result<()> {
    let grid = TestGrid::from_rows(1, 1, block![["k", 5.0]]);
    let options = Options::new().convert("dict".parse()?);
    let value = read(&grid, Region::new(1, 1, 1, 2), None, &options, &registry())?;

    let Value::Mapping(map) = value else {
        panic!("expected a mapping, got {value:?}");
    };
    assert_eq!(map.get("k"), Some(&5.0.into()));
    assert_eq!(map.len(), 1);
    Ok(())
}

#[test]
fn mappings_round_trip_through_the_grid() -> gridcast::Result<()> {
    let mut original = Mapping::default();
    original.insert("first", 1.0);
    original.insert("second", 2.0);

    let grid = TestGrid::new();
    write(
        &grid,
        Value::Mapping(original.clone()),
        Region::anchor(1, 1),
        &Options::new(),
        &registry(),
    )?;
    assert_eq!(grid.cell(1, 1), CellValue::Text("first".into()));
    assert_eq!(grid.cell(2, 2), CellValue::Number(2.0));

    let options = Options::new().convert(Convert::Mapping);
    let value = read(&grid, Region::new(1, 1, 2, 2), None, &options, &registry())?;
    assert_eq!(value, Value::Mapping(original));
    Ok(())
}

#[test]
fn writes_route_by_value_variant_without_a_tag() -> gridcast::Result<()> {
    let mut map = Mapping::default();
    map.insert("x", 10.0);

    let grid = TestGrid::new();
    write(
        &grid,
        Value::Mapping(map),
        Region::anchor(3, 3),
        &Options::new(),
        &registry(),
    )?;
    assert_eq!(grid.cell(3, 3), CellValue::Text("x".into()));
    assert_eq!(grid.cell(3, 4), CellValue::Number(10.0));
    Ok(())
}

#[test]
fn wider_blocks_are_rejected() {
    let grid = TestGrid::from_rows(1, 1, block![["a", 1.0, 2.0]]);
    let options = Options::new().convert(Convert::Mapping);
    let err = read(&grid, Region::new(1, 1, 1, 3), None, &options, &registry()).unwrap_err();
    assert!(err.is_shape());
}

#[test]
fn later_duplicate_keys_replace_earlier_ones() -> gridcast::Result<()> {
    let grid = TestGrid::from_rows(1, 1, block![["a", 1.0], ["a", 2.0]]);
    let options = Options::new().convert(Convert::Mapping);
    let value = read(&grid, Region::new(1, 1, 2, 2), None, &options, &registry())?;

    let Value::Mapping(map) = value else {
        panic!("expected a mapping, got {value:?}");
    };
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("a"), Some(&2.0.into()));
    Ok(())
}
