//! Labeled tables and series example.
//!
//! Demonstrates:
//! - Reading a labeled block as a frame
//! - Writing a frame back with its header and index
//! - Multi-level column headers
//! - Series defaults for named and anonymous data
//!
//! Run with: cargo run --example frame_tables

use anyhow::Result;
use gridcast::testing::TestGrid;
use gridcast::*;

fn main() -> Result<()> {
    println!("🧮 Labeled Tables and Series Example\n");

    let registry = Registry::with_defaults();

    // =========================================================================
    // EXAMPLE 1: Reading a labeled block
    // =========================================================================
    println!("📊 Example 1: Reading a labeled block");

    let grid = TestGrid::from_rows(
        1,
        1,
        block![
            ["", "q1", "q2"],
            ["berlin", 10.0, 12.0],
            ["madrid", 8.0, 11.0],
        ],
    );

    let options = Options::new().convert(Convert::Frame);
    let value = read(&grid, Region::new(1, 1, 3, 3), None, &options, &registry)?;
    let Value::Frame(frame) = value else {
        anyhow::bail!("expected a frame");
    };
    println!(
        "Frame with {} rows x {} columns, {} header level(s)",
        frame.nrows(),
        frame.ncols(),
        frame.header_levels()
    );
    println!("Columns: {:?}", frame.columns());
    println!("Index labels: {:?}\n", frame.index_labels());

    // =========================================================================
    // EXAMPLE 2: Writing a frame
    // =========================================================================
    println!("✏️ Example 2: Writing a frame");

    let report = Frame::new(vec!["total", "delta"], rows![[18.0, 2.0], [22.0, 3.0]])?
        .with_index("city", vec!["berlin", "madrid"])?;

    let target = TestGrid::new();
    write(
        &target,
        Value::Frame(report),
        Region::anchor(1, 1),
        &Options::new(),
        &registry,
    )?;
    println!(
        "Header row: '{}' | '{}' | '{}'",
        target.cell(1, 1),
        target.cell(1, 2),
        target.cell(1, 3)
    );
    println!(
        "First data row: '{}' | {} | {}\n",
        target.cell(2, 1),
        target.cell(2, 2),
        target.cell(2, 3)
    );

    // =========================================================================
    // EXAMPLE 3: Multi-level headers
    // =========================================================================
    println!("🏛️ Example 3: Multi-level headers");

    let wide = TestGrid::from_rows(
        1,
        1,
        block![
            ["", "actual", "actual", "plan"],
            ["city", "q1", "q2", "q1"],
            ["berlin", 10.0, 12.0, 9.0],
        ],
    );
    let options = Options::new().convert(Convert::Frame).header(2).index(1);
    let value = read(&wide, Region::new(1, 1, 3, 4), None, &options, &registry)?;
    if let Value::Frame(frame) = &value {
        println!("Header levels: {}", frame.header_levels());
        println!("First column path: {:?}", frame.columns()[0]);
        println!("Index names: {:?}\n", frame.index_names());
    }

    // =========================================================================
    // EXAMPLE 4: Series
    // =========================================================================
    println!("📈 Example 4: Series");

    let totals = Series::new("total", vec![10.0.into(), 20.0.into()])
        .with_index("wday", vec!["mon", "tue"])?;
    let sheet = TestGrid::new();
    write(
        &sheet,
        Value::Series(totals),
        Region::anchor(1, 1),
        &Options::new(),
        &registry,
    )?;
    println!(
        "A named series writes its header: '{}' | '{}'",
        sheet.cell(1, 1),
        sheet.cell(1, 2)
    );

    let anonymous = Series::new(Scalar::Empty, vec![1.0.into(), 2.0.into()]);
    let plain_sheet = TestGrid::new();
    write(
        &plain_sheet,
        Value::Series(anonymous),
        Region::anchor(1, 1),
        &Options::new(),
        &registry,
    )?;
    println!(
        "An anonymous series writes values only, starting with {}",
        plain_sheet.cell(1, 1)
    );

    println!("\n✅ Done");
    Ok(())
}
