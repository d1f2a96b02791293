use gridcast::testing::TestGrid;
use gridcast::{
    read, write, Accessor, ConversionContext, Convert, Error, Options, Pipeline, Region, Registry,
    Scalar, Stage, Value,
};

#[test]
fn an_empty_registry_rejects_every_tag() {
    let grid = TestGrid::new();
    let registry = Registry::new();
    let err = read(&grid, Region::anchor(1, 1), None, &Options::new(), &registry).unwrap_err();
    assert!(err.is_lookup());
    assert!(err.to_string().contains("no converter registered"));
}

#[test]
fn error_displays_carry_their_category_prefix() {
    assert!(Error::shape("too wide").to_string().starts_with("shape error: "));
    assert!(Error::lookup("no such tag").to_string().starts_with("lookup error: "));
    assert!(
        Error::backend(anyhow::anyhow!("socket closed"))
            .to_string()
            .starts_with("backend error: ")
    );
    assert!(
        Error::resource(anyhow::anyhow!("file gone"))
            .to_string()
            .starts_with("resource error: ")
    );
}

#[test]
fn backend_errors_expose_their_source() {
    use std::error::Error as _;
    let err = Error::backend(anyhow::anyhow!("boom"));
    assert!(err.source().is_some());
}

#[test]
fn wrongly_typed_options_read_as_absent() -> gridcast::Result<()> {
    let grid = TestGrid::from_rows(
        1,
        1,
        gridcast::block![[1.0, 2.0], [3.0, 4.0]],
    );
    // NDIM set to text is ignored, so the block keeps its natural shape.
    let options = Options::new().set(gridcast::options::keys::NDIM, "two");
    let value = read(&grid, Region::new(1, 1, 2, 2), None, &options, &Registry::with_defaults())?;
    assert_eq!(value, Value::Rows(gridcast::rows![[1.0, 2.0], [3.0, 4.0]]));
    Ok(())
}

struct Shout;

impl Stage for Shout {
    fn read(&self, ctx: &mut ConversionContext<'_>) -> gridcast::Result<()> {
        if let Some(Value::Scalar(Scalar::Text(text))) = &mut ctx.value {
            *text = text.to_uppercase();
        }
        Ok(())
    }
}

struct ShoutingAccessor;

impl Accessor for ShoutingAccessor {
    fn reader(&self, options: &Options) -> Pipeline {
        gridcast::convert::plain::reader(options).append_stage(Shout)
    }

    fn writer(&self, options: &Options) -> Pipeline {
        gridcast::convert::plain::writer(options)
    }
}

#[test]
fn registered_converters_replace_the_stock_ones() -> gridcast::Result<()> {
    let grid = TestGrid::new();
    grid.put(1, 1, "quiet");

    let mut registry = Registry::with_defaults();
    registry.register(Convert::Plain, ShoutingAccessor);

    let value = read(&grid, Region::anchor(1, 1), None, &Options::new(), &registry)?;
    assert_eq!(value, Value::Scalar(Scalar::Text("QUIET".into())));
    Ok(())
}

#[test]
fn unwritable_value_kinds_fail_with_shape_errors() {
    let grid = TestGrid::new();
    // A raw block routed through the plain converter has no plain layout.
    let err = write(
        &grid,
        Value::Raw(vec![vec![gridcast::CellValue::Number(1.0)]]),
        Region::anchor(1, 1),
        &Options::new().convert(Convert::Plain),
        &Registry::with_defaults(),
    )
    .unwrap_err();
    assert!(err.is_shape());
    assert_eq!(grid.set_block_count(), 0);
}
