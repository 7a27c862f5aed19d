//! Optional per-pass timing diagnostics, ported from `performance_test.h`.
//!
//! Collection is opt-in: a [`Diagnostics`] instance does nothing until
//! `measure` is called around a pass, matching the original's
//! `#ifdef PERFORMANCE_TEST` — here that's simply "don't construct one".

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

const CELL_DELIMITER: char = ';';
const SAMPLE_DELIMITER: char = ',';

/// Accumulates wall-clock millisecond samples per instrumented
/// function name.
#[derive(Default)]
pub struct Diagnostics {
    execution_times: HashMap<String, Vec<u128>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Times `f`, appending the elapsed milliseconds under `name`.
    pub fn measure<F, R>(&mut self, name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed().as_millis();
        self.execution_times
            .entry(name.to_string())
            .or_default()
            .push(elapsed);
        result
    }

    pub fn samples(&self, name: &str) -> Option<&[u128]> {
        self.execution_times.get(name).map(|v| v.as_slice())
    }

    /// Writes `function;sample,sample,...` rows, one per instrumented
    /// name, matching `save_exection_time_to_csv`'s column layout.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut file = std::fs::File::create(path.as_ref())?;
        writeln!(file, "function{CELL_DELIMITER}execution_times")?;
        for (name, samples) in &self.execution_times {
            write!(file, "{name}{CELL_DELIMITER}")?;
            let joined = samples
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(&SAMPLE_DELIMITER.to_string());
            writeln!(file, "{joined}")?;
        }
        log::info!("performance diagnostics written to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_records_a_sample_and_returns_the_closures_value() {
        let mut diag = Diagnostics::new();
        let value = diag.measure("pass_density_pressure", || 1 + 1);
        assert_eq!(value, 2);
        assert_eq!(diag.samples("pass_density_pressure").unwrap().len(), 1);
    }

    #[test]
    fn repeated_measure_appends_samples() {
        let mut diag = Diagnostics::new();
        diag.measure("pass_integration", || ());
        diag.measure("pass_integration", || ());
        assert_eq!(diag.samples("pass_integration").unwrap().len(), 2);
    }

    #[test]
    fn unknown_function_has_no_samples() {
        let diag = Diagnostics::new();
        assert!(diag.samples("never_measured").is_none());
    }

    #[test]
    fn write_csv_produces_a_header_and_one_row_per_function() {
        let mut diag = Diagnostics::new();
        diag.measure("pass_acceleration", || ());
        let path = std::env::temp_dir().join("sph_core_diagnostics_test.csv");
        diag.write_csv(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("function;execution_times"));
        assert!(contents.contains("pass_acceleration;"));
        std::fs::remove_file(&path).ok();
    }
}
