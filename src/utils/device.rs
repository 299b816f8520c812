//! Stateless queries for the compute devices visible to this process.

use std::path::Path;

use tracing::debug;

/// Directory the NVIDIA kernel driver populates with one entry per GPU.
const NVIDIA_GPU_DIR: &str = "/proc/driver/nvidia/gpus";

/// Number of CPUs available to this process, at least 1.
pub fn available_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Names of the GPUs visible through the NVIDIA driver, as `/device:GPU:{i}`.
///
/// Returns an empty list when no driver is loaded or the platform does not expose
/// the driver directory.
pub fn available_gpus() -> Vec<String> {
    gpus_in(Path::new(NVIDIA_GPU_DIR))
}

fn gpus_in(dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("No GPUs listed in {}: {}", dir.display(), err);
            return Vec::new();
        }
    };
    let count = entries.filter_map(Result::ok).count();
    (0..count).map(|i| format!("/device:GPU:{i}")).collect()
}
