use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

use crate::util::delimiter_for;

/// Wall-clock time of one benchmark stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timing {
    pub suite: String,
    pub stage: String,
    pub iterations: usize,
    pub seconds: f64,
}

impl Timing {
    pub fn new(suite: &str, stage: &str, iterations: usize, elapsed: Duration) -> Self {
        Timing {
            suite: suite.to_string(),
            stage: stage.to_string(),
            iterations,
            seconds: elapsed.as_secs_f64(),
        }
    }
}

/// Total of all stage times, in seconds.
pub fn total_seconds(timings: &[Timing]) -> f64 {
    timings.iter().map(|t| t.seconds).sum()
}

pub fn log_timings(timings: &[Timing]) {
    for t in timings {
        log::info!(
            "[{}] {:<22} {:>4} iter  {:.4} s",
            t.suite,
            t.stage,
            t.iterations,
            t.seconds
        );
    }
    log::info!("Total execution time: {:.4} s", total_seconds(timings));
}

/// Write timings to a CSV or TSV file based on the file extension.
pub fn write_timings<P: AsRef<Path>>(timings: &[Timing], output_path: P) -> Result<()> {
    let path = output_path.as_ref();
    let file =
        File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter_for(path))
        .from_writer(BufWriter::new(file));

    for timing in timings {
        writer
            .serialize(timing)
            .with_context(|| format!("Failed to write timing row to {:?}", path))?;
    }

    writer.flush()?;
    Ok(())
}
