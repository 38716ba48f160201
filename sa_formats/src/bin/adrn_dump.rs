use std::env;

use anyhow::{Context, Result};
use sa_formats::AdrnIndex;

fn main() -> Result<()> {
    let path = env::args().nth(1).context("usage: adrn_dump <adrn.bin>")?;
    let index = AdrnIndex::open(&path)?;
    println!(
        "{} records in {}",
        index.blocks().len(),
        index.path().display()
    );
    for block in index.blocks() {
        println!(
            "{id:>8} {address:>10} {size:>8} {x:>6},{y:<6} {width:>5}x{height:<5} map {map:<6} {name}",
            id = block.index,
            address = block.address,
            size = block.size,
            x = block.x_offset,
            y = block.y_offset,
            width = block.width,
            height = block.height,
            map = block.map,
            name = block.name
        );
    }
    Ok(())
}
