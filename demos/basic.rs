/// Basic example: build a sprite package with holes, then read it back
///
/// Run with: cargo run --example basic
use anyhow::{Context, Result};
use blobpack_rs::{CompressionAlgorithm, Dimensions, PackageReader, PackageWriter};

const PACKAGE_PATH: &str = "example_sprites.pak";

fn main() -> Result<()> {
    println!("=== Blobpack-rs Basic Example ===\n");

    println!("1. Writing package...");
    write_package().context("writing package")?;

    println!("\n2. Reading package...");
    read_package().context("reading package")?;

    std::fs::remove_file(PACKAGE_PATH)?;
    println!("\n✓ Example complete!");
    Ok(())
}

fn write_package() -> Result<()> {
    let mut writer = PackageWriter::<Dimensions>::create(PACKAGE_PATH)?;

    // Entries may arrive in any index order; index 1 stays a hole
    writer.write_entry_with_metadata(
        2,
        &vec![0u8; 64 * 64 * 4],
        CompressionAlgorithm::Zstd,
        Dimensions::new(64, 64),
    )?;
    writer.write_entry_with_metadata(
        0,
        &[0xFF, 0x00, 0x00, 0xFF],
        CompressionAlgorithm::None,
        Dimensions::new(1, 1),
    )?;

    writer.close()?;
    println!("   ✓ Package created: {}", PACKAGE_PATH);
    Ok(())
}

fn read_package() -> Result<()> {
    let reader = PackageReader::<Dimensions>::open(PACKAGE_PATH)?;
    println!("   Entries: {}", reader.entry_count());
    println!("   Index table: {} slots", reader.table_len());

    for index in 0..reader.table_len() as u32 {
        let size = reader.metadata(index);
        let bytes = reader.read_span(index)?;
        println!(
            "   [{}] {} bytes, {}x{}{}",
            index,
            bytes.len(),
            size.width,
            size.height,
            if reader.contains(index) { "" } else { " (hole)" }
        );
    }

    println!("\n{}", reader.summary().to_json()?);
    Ok(())
}
