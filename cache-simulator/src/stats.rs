// Reporting for cache simulation results

use crate::models::{Algorithm, AlgorithmStats, CsvResultRow, SimulationResult};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Nanoseconds in `duration`, clamped to `u64::MAX`
fn duration_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Formats and exports the results of a simulation run
#[derive(Debug)]
pub struct SimulationStats<'a> {
    result: &'a SimulationResult,
}

impl<'a> SimulationStats<'a> {
    pub fn new(result: &'a SimulationResult) -> Self {
        Self { result }
    }

    /// Belady's numbers, if the oracle was part of the run
    fn ceiling(&self) -> Option<&'a AlgorithmStats> {
        self.result.stats.get(&Algorithm::Belady)
    }

    /// Fraction of the optimal hit count `stats` reached
    fn fraction_of_optimal(&self, stats: &AlgorithmStats) -> Option<f64> {
        let ceiling = self.ceiling()?;
        Some(if ceiling.hits == 0 {
            1.0
        } else {
            stats.hits as f64 / ceiling.hits as f64
        })
    }

    fn rows(&self) -> impl Iterator<Item = CsvResultRow> + '_ {
        self.result.stats.iter().map(move |(algorithm, stats)| CsvResultRow {
            algorithm: algorithm.as_str().to_string(),
            capacity: self.result.capacity,
            requests: stats.hits + stats.misses,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            hit_rate: stats.hit_rate(),
            fraction_of_optimal: self.fraction_of_optimal(stats),
            duration_ns: duration_nanos(stats.duration),
            ops_per_sec: stats.ops_per_sec(),
        })
    }

    /// Write the summary table to `out`
    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let result = self.result;
        writeln!(out, "\nCache Simulation Summary")?;
        writeln!(out, "========================")?;
        writeln!(out, "Total requests: {}", result.total_requests)?;
        writeln!(out, "Unique keys: {}", result.unique_keys)?;
        writeln!(out, "Capacity: {}", result.capacity)?;
        writeln!(
            out,
            "Duration: {:.3}s",
            result.duration.as_secs_f64()
        )?;

        writeln!(out, "\nResults by Algorithm:")?;
        writeln!(
            out,
            "{:<8} {:>10} {:>10} {:>10} {:>8} {:>9} {:>12}",
            "Algo", "Hits", "Misses", "Evictions", "HitRate", "OfOptim", "Ops/sec"
        )?;
        writeln!(out, "{}", "-".repeat(73))?;

        for row in self.rows() {
            let of_optimal = match row.fraction_of_optimal {
                Some(f) => format!("{:.2}%", f * 100.0),
                None => "-".to_string(),
            };
            let label = if row.algorithm == Algorithm::Belady.as_str() {
                format!("{}*", row.algorithm)
            } else {
                row.algorithm
            };
            writeln!(
                out,
                "{:<8} {:>10} {:>10} {:>10} {:>7.2}% {:>9} {:>12.0}",
                label, row.hits, row.misses, row.evictions, row.hit_rate, of_optimal, row.ops_per_sec
            )?;
        }

        if self.ceiling().is_some() {
            writeln!(
                out,
                "\n* Belady is the offline optimum: no policy can score more hits."
            )?;
        }
        Ok(())
    }

    /// Print a summary report of the simulation results
    pub fn print_summary(&self) {
        let stdout = io::stdout();
        if let Err(e) = self.write_summary(&mut stdout.lock()) {
            tracing::warn!(error = %e, "failed to print summary");
        }
    }

    /// Export results to a CSV file
    pub fn export_csv(&self, path: &Path) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in self.rows() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn result() -> SimulationResult {
        let mut stats = BTreeMap::new();
        stats.insert(
            Algorithm::Lfu,
            AlgorithmStats {
                hits: 3,
                misses: 7,
                evictions: 5,
                duration: Duration::from_millis(1),
            },
        );
        stats.insert(
            Algorithm::Belady,
            AlgorithmStats {
                hits: 6,
                misses: 4,
                evictions: 2,
                duration: Duration::from_millis(2),
            },
        );
        SimulationResult {
            stats,
            total_requests: 10,
            unique_keys: 6,
            duration: Duration::from_millis(3),
            capacity: 2,
        }
    }

    #[test]
    fn test_duration_nanos_clamps() {
        assert_eq!(duration_nanos(Duration::from_micros(3)), 3_000);
        assert_eq!(duration_nanos(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_summary_marks_ceiling() {
        let result = result();
        let mut out = Vec::new();
        SimulationStats::new(&result).write_summary(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Total requests: 10"));
        assert!(text.contains("Belady*"));
        assert!(text.contains("50.00%"), "{text}");
        assert!(text.contains("offline optimum"));
    }

    #[test]
    fn test_summary_without_oracle() {
        let mut result = result();
        result.stats.remove(&Algorithm::Belady);
        let mut out = Vec::new();
        SimulationStats::new(&result).write_summary(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(!text.contains("Belady"));
        assert!(!text.contains("offline optimum"));
    }

    #[test]
    fn test_export_csv() {
        let path = std::env::temp_dir().join(format!(
            "cache_sim_stats_{}.csv",
            std::process::id()
        ));
        let result = result();
        SimulationStats::new(&result).export_csv(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("algorithm,capacity,requests,hits,misses,evictions,hit_rate,fraction_of_optimal,duration_ns,ops_per_sec")
        );
        let lfu = lines.next().unwrap();
        assert!(lfu.starts_with("LFU,2,10,3,7,5,30.0,0.5,1000000,"), "{lfu}");
        let belady = lines.next().unwrap();
        assert!(belady.starts_with("Belady,2,10,6,4,2,60.0,1.0,"), "{belady}");
        assert_eq!(lines.next(), None);

        std::fs::remove_file(&path).ok();
    }
}
