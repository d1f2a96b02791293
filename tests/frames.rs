#![cfg(feature = "frame")]

use gridcast::testing::TestGrid;
use gridcast::{
    block, read, rows, write, CellValue, Convert, Frame, Options, Region, Registry, Scalar, Series,
    Value,
};

fn registry() -> Registry {
    Registry::with_defaults()
}

fn labeled_table() -> TestGrid {
    TestGrid::from_rows(
        1,
        1,
        block![
            ["", "c1", "c2"],
            ["r1", 1.0, 2.0],
            ["r2", 3.0, 4.0],
        ],
    )
}

#[test]
fn labeled_blocks_read_as_frames() -> gridcast::Result<()> {
    let options = Options::new().convert(Convert::Frame).header(1).index(1);
    let value = read(&labeled_table(), Region::new(1, 1, 3, 3), None, &options, &registry())?;

    let expected = Frame::new(vec!["c1", "c2"], rows![[1.0, 2.0], [3.0, 4.0]])?
        .with_index(Scalar::Empty, vec!["r1", "r2"])?;
    assert_eq!(value, Value::Frame(expected));
    Ok(())
}

#[test]
fn frames_write_back_the_original_block() -> gridcast::Result<()> {
    let options = Options::new().convert(Convert::Frame);
    let value = read(&labeled_table(), Region::new(1, 1, 3, 3), None, &options, &registry())?;

    let grid = TestGrid::new();
    write(&grid, value, Region::anchor(1, 1), &Options::new(), &registry())?;

    assert_eq!(grid.cell(1, 1), CellValue::Empty);
    assert_eq!(grid.cell(1, 2), CellValue::Text("c1".into()));
    assert_eq!(grid.cell(1, 3), CellValue::Text("c2".into()));
    assert_eq!(grid.cell(2, 1), CellValue::Text("r1".into()));
    assert_eq!(grid.cell(2, 2), CellValue::Number(1.0));
    assert_eq!(grid.cell(3, 3), CellValue::Number(4.0));
    Ok(())
}

#[test]
fn multi_level_headers_round_trip() -> gridcast::Result<()> {
    let grid = TestGrid::from_rows(
        1,
        1,
        block![
            ["", "a", "a"],
            ["ix", "one", "two"],
            ["r1", 1.0, 2.0],
        ],
    );
    let options = Options::new().convert(Convert::Frame).header(2).index(1);
    let value = read(&grid, Region::new(1, 1, 3, 3), None, &options, &registry())?;

    let Value::Frame(frame) = &value else {
        panic!("expected a frame, got {value:?}");
    };
    assert_eq!(frame.header_levels(), 2);
    assert_eq!(frame.columns()[0], vec!["a".into(), "one".into()]);
    assert_eq!(frame.index_names(), &["ix".into()]);

    let target = TestGrid::new();
    let options = Options::new().header(2).index(1);
    write(&target, value, Region::anchor(1, 1), &options, &registry())?;
    // The row above the index names stays blank.
    assert_eq!(target.cell(1, 1), CellValue::Empty);
    assert_eq!(target.cell(2, 1), CellValue::Text("ix".into()));
    assert_eq!(target.cell(2, 2), CellValue::Text("one".into()));
    assert_eq!(target.cell(3, 2), CellValue::Number(1.0));
    Ok(())
}

#[test]
fn headerless_frames_are_positional() -> gridcast::Result<()> {
    let grid = TestGrid::from_rows(1, 1, block![[1.0, 2.0], [3.0, 4.0]]);
    let options = Options::new().convert(Convert::Frame).header(0).index(0);
    let value = read(&grid, Region::new(1, 1, 2, 2), None, &options, &registry())?;

    let Value::Frame(frame) = &value else {
        panic!("expected a frame, got {value:?}");
    };
    assert_eq!(frame.header_levels(), 0);
    assert_eq!(frame.index_levels(), 0);
    assert_eq!(frame.data(), rows![[1.0, 2.0], [3.0, 4.0]].as_slice());

    let target = TestGrid::new();
    write(&target, value, Region::anchor(1, 1), &Options::new(), &registry())?;
    assert_eq!(target.cell(1, 1), CellValue::Number(1.0));
    assert_eq!(target.cell(2, 2), CellValue::Number(4.0));
    Ok(())
}

#[test]
fn one_column_blocks_read_as_series() -> gridcast::Result<()> {
    let grid = TestGrid::from_rows(
        1,
        1,
        block![
            ["wday", "total"],
            ["mon", 10.0],
            ["tue", 20.0],
        ],
    );
    let options = Options::new().convert(Convert::Series).header(1).index(1);
    let value = read(&grid, Region::new(1, 1, 3, 2), None, &options, &registry())?;

    let expected = Series::new("total", vec![10.0.into(), 20.0.into()])
        .with_index("wday", vec!["mon", "tue"])?;
    assert_eq!(value, Value::Series(expected));
    Ok(())
}

#[test]
fn series_write_their_header_and_index_by_default() -> gridcast::Result<()> {
    let series = Series::new("total", vec![10.0.into(), 20.0.into()])
        .with_index("wday", vec!["mon", "tue"])?;

    let grid = TestGrid::new();
    write(
        &grid,
        Value::Series(series),
        Region::anchor(1, 1),
        &Options::new(),
        &registry(),
    )?;
    assert_eq!(grid.cell(1, 1), CellValue::Text("wday".into()));
    assert_eq!(grid.cell(1, 2), CellValue::Text("total".into()));
    assert_eq!(grid.cell(2, 1), CellValue::Text("mon".into()));
    assert_eq!(grid.cell(3, 2), CellValue::Number(20.0));
    Ok(())
}

#[test]
fn anonymous_series_write_values_only() -> gridcast::Result<()> {
    let series = Series::new(Scalar::Empty, vec![1.0.into(), 2.0.into()]);
    let grid = TestGrid::new();
    write(
        &grid,
        Value::Series(series),
        Region::anchor(1, 1),
        &Options::new(),
        &registry(),
    )?;
    assert_eq!(grid.cell(1, 1), CellValue::Number(1.0));
    assert_eq!(grid.cell(2, 1), CellValue::Number(2.0));
    assert_eq!(grid.cell(3, 1), CellValue::Empty);
    Ok(())
}

#[test]
fn an_explicit_header_count_overrides_the_series_default() -> gridcast::Result<()> {
    let series = Series::new("named", vec![1.0.into()]);
    let grid = TestGrid::new();
    write(
        &grid,
        Value::Series(series),
        Region::anchor(1, 1),
        &Options::new().header(0),
        &registry(),
    )?;
    // Named, but the caller said no header.
    assert_eq!(grid.cell(1, 1), CellValue::Number(1.0));
    Ok(())
}

#[test]
fn series_reject_blocks_wider_than_one_data_column() {
    let grid = TestGrid::from_rows(1, 1, block![[1.0, 2.0], [3.0, 4.0]]);
    let options = Options::new().convert(Convert::Series).header(0).index(0);
    let err = read(&grid, Region::new(1, 1, 2, 2), None, &options, &registry()).unwrap_err();
    assert!(err.is_shape());
}
