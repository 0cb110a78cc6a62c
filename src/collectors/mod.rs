//! # Collectors Module
//!
//! Loads endpoint documents, merges them into one snapshot and presents the result.
//!
//! ## Architecture
//!
//! - **`Collector` trait**: a view over the snapshot that renders a terminal table and a JSON summary
//! - **`OverviewCollector`**: channel counters, in total and per unit
//! - **`CameraCollector`**: the camera grid and issue counters per primary target
//! - **`StorageCollector`**: targets, LUNs, blocks and per-target capacities
//! - **`Orchestrator`**: loads every endpoint through a [`DocumentSource`](crate::source::DocumentSource), merges the
//!   reports and hands the snapshot to the collectors

pub mod camera_collector;
pub mod collector;
pub mod orchestrator;
pub mod overview_collector;
pub mod storage_collector;

pub use camera_collector::CameraCollector;
pub use collector::Collector;
pub use orchestrator::Orchestrator;
pub use overview_collector::OverviewCollector;
pub use storage_collector::StorageCollector;

/// Counts with thousands separators: `1234567` becomes `1,234,567`.
pub(crate) fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Capacities: whole numbers without decimals, everything else with two.
pub(crate) fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn counts() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn amounts() {
        assert_eq!(format_amount(10.0), "10");
        assert_eq!(format_amount(1024.5), "1024.50");
        assert_eq!(format_amount(-2.0), "-2");
    }
}
