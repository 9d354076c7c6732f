//! Parallel job count from the `jobs` setting

use crate::{Error, Result};

/// Number of processing units available to this process
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Turn a `jobs` value into a job count
///
/// Empty or `all` gives every available unit; a number is clamped to
/// `1..=available`.
pub fn resolve_jobs(value: &str, available: usize) -> Result<usize> {
    let available = available.max(1);
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        return Ok(available);
    }

    let requested: i64 = value.parse().map_err(|_| Error::InvalidJobs {
        value: value.to_string(),
    })?;
    let requested = usize::try_from(requested.max(1)).unwrap_or(available);
    Ok(requested.min(available))
}
