use anyhow::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;

use crate::engine::types::Combination;

pub struct CsvLogger {
    log_path: String,
}

impl CsvLogger {
    pub fn new(log_path: String) -> Result<Self> {
        // Create CSV file with headers if it doesn't exist
        if !std::path::Path::new(&log_path).exists() {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .open(&log_path)?;

            writeln!(
                file,
                "timestamp,period,target_odds,total_odds,confidence,selections,is_exact"
            )?;
        }

        Ok(Self { log_path })
    }

    /// Append one recommendation row.
    pub fn log_recommendation(
        &self,
        period: &str,
        target_odds: f64,
        best: &Combination,
    ) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.log_path)?;

        writeln!(
            file,
            "{},{},{:.2},{:.2},{:.1},{},{}",
            Utc::now().to_rfc3339(),
            period,
            target_odds,
            best.total_odds,
            best.aggregate_confidence,
            best.selections.len(),
            best.is_exact
        )?;

        Ok(())
    }
}
