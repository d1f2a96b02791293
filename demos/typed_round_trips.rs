//! Typed grid round-trips example.
//!
//! Demonstrates:
//! - Writing plain values and reading them back
//! - Region expansion from an anchor cell
//! - Read options: transpose, integer coercion, scalar fills
//! - Mapping round-trips and write routing by value kind
//! - Replacing a stock converter in the registry
//!
//! Run with: cargo run --example typed_round_trips

use anyhow::Result;
use gridcast::testing::TestGrid;
use gridcast::*;

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
        convert::plain::reader(options).append_stage(Shout)
    }

    fn writer(&self, options: &Options) -> Pipeline {
        convert::plain::writer(options)
    }
}

fn main() -> Result<()> {
    println!("🔄 Typed Grid Round-Trips Example\n");

    let registry = Registry::with_defaults();

    // =========================================================================
    // EXAMPLE 1: Plain blocks
    // =========================================================================
    println!("📋 Example 1: Plain blocks");

    let grid = TestGrid::new();
    write(
        &grid,
        Value::Rows(rows![
            ["city", "population"],
            ["berlin", 3_645_000.0],
            ["madrid", 3_223_000.0],
        ]),
        Region::anchor(1, 1),
        &Options::new(),
        &registry,
    )?;
    println!("Wrote a 3x2 block at (1, 1)");

    let block = read(
        &grid,
        Region::new(1, 1, 3, 2),
        None,
        &Options::new(),
        &registry,
    )?;
    println!("Read it back as: {block:?}\n");

    // =========================================================================
    // EXAMPLE 2: Region expansion
    // =========================================================================
    println!("📐 Example 2: Region expansion");

    let table = expand(&grid, &Region::anchor(1, 1), ExpandMode::Table, false)?;
    println!("The anchor (1, 1) expands to {table}");

    let expanded = read(
        &grid,
        Region::anchor(1, 1),
        None,
        &Options::new().expand(ExpandMode::Table),
        &registry,
    )?;
    if let Value::Rows(rows) = &expanded {
        println!("An expanding read returned {} rows\n", rows.len());
    }

    // =========================================================================
    // EXAMPLE 3: Read options
    // =========================================================================
    println!("🔧 Example 3: Read options");

    let counts = TestGrid::from_rows(1, 1, block![[1.0, 2.0], [3.0, 4.0]]);
    let transposed = read(
        &counts,
        Region::new(1, 1, 2, 2),
        None,
        &Options::new().transpose(true),
        &registry,
    )?;
    println!("Transposed: {transposed:?}");

    let integers = read(
        &counts,
        Region::new(1, 1, 2, 2),
        None,
        &Options::new().numbers(NumberFormat::Int),
        &registry,
    )?;
    println!("As integers: {integers:?}");

    let fill = TestGrid::new();
    write(
        &fill,
        Value::from(0.0),
        Region::new(1, 1, 2, 3),
        &Options::new(),
        &registry,
    )?;
    println!("A scalar fill put {} in every cell up to (2, 3)\n", fill.cell(2, 3));

    // =========================================================================
    // EXAMPLE 4: Mappings
    // =========================================================================
    println!("🗺️ Example 4: Mappings");

    let mut totals = Mapping::new();
    totals.insert("mon", 10.0);
    totals.insert("tue", 20.0);

    let ledger = TestGrid::new();
    // Writes route by value kind, so no tag is needed here.
    write(
        &ledger,
        Value::Mapping(totals),
        Region::anchor(1, 1),
        &Options::new(),
        &registry,
    )?;
    println!("Wrote the mapping as a two-column block");

    let back = read(
        &ledger,
        Region::new(1, 1, 2, 2),
        None,
        &Options::new().convert(Convert::Mapping),
        &registry,
    )?;
    println!("Round-tripped: {back:?}\n");

    // =========================================================================
    // EXAMPLE 5: A custom converter
    // =========================================================================
    println!("🔌 Example 5: A custom converter");

    let mut custom = Registry::with_defaults();
    custom.register(Convert::Plain, ShoutingAccessor);

    let loud = TestGrid::new();
    loud.put(1, 1, "hello");
    let value = read(&loud, Region::anchor(1, 1), None, &Options::new(), &custom)?;
    println!("The replaced plain converter read: {value:?}");

    println!("\n✅ Done");
    Ok(())
}
