use std::fs;
use std::path::Path;

use csv::WriterBuilder;
use sysinfo::{ProcessExt, System, SystemExt};

use crate::metric::Metric;

pub fn append_metric_to_csv(path: &Path, metric: &Metric) -> Result<(), csv::Error> {
    let file_exists = path.exists();
    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    let mut wtr = WriterBuilder::new().has_headers(!file_exists).from_writer(file);
    wtr.serialize(metric)?;
    wtr.flush()?;
    Ok(())
}

/// Resident memory of this process in MiB, or 0 when it cannot be read.
pub fn sample_proc_memory_mb() -> f64 {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return 0.0;
    };
    let mut sys = System::new();
    if !sys.refresh_process(pid) {
        return 0.0;
    }
    sys.process(pid)
        .map(|p| p.memory() as f64 / (1024.0 * 1024.0))
        .unwrap_or(0.0)
}
