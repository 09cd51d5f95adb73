use anyhow::Result;
use std::path::PathBuf;

use super::load_processor;

/// Print the signal table with the ids reports must use
pub fn handle_signals(config: Option<PathBuf>) -> Result<()> {
    let processor = load_processor(config)?;

    println!("{:>4}  {:<45} {:>10} {:>10}", "ID", "NAME", "LAT", "LON");
    for signal in processor.registry().iter() {
        println!(
            "{:>4}  {:<45} {:>10.6} {:>10.6}",
            signal.id, signal.name, signal.latitude, signal.longitude
        );
    }
    Ok(())
}
