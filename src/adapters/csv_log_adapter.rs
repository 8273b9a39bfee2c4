//! Append-only CSV trade log adapter.
//!
//! One `{session}_trade_history.csv` per session: header row on creation,
//! one row per portfolio transition. Existing rows are never rewritten.

use crate::domain::error::ZenithError;
use crate::domain::portfolio::{AllocationState, TransitionRecord};
use crate::ports::log_port::TradeLogPort;
use chrono::NaiveDateTime;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use super::csv_price_adapter::TIMESTAMP_FORMAT;

pub struct CsvTradeLogAdapter {
    base_path: PathBuf,
}

impl CsvTradeLogAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn log_path(&self, session: &str) -> PathBuf {
        self.base_path
            .join(format!("{}_trade_history.csv", session))
    }
}

impl TradeLogPort for CsvTradeLogAdapter {
    fn append(&self, session: &str, record: &TransitionRecord) -> Result<(), ZenithError> {
        fs::create_dir_all(&self.base_path)?;
        let path = self.log_path(session);
        let is_new = !path.exists();

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            wtr.write_record(["timestamp", "from", "to", "price", "valuation"])
                .map_err(|e| ZenithError::TradeLog {
                    reason: format!("failed to write header: {}", e),
                })?;
        }
        wtr.write_record([
            record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            record.from.to_string(),
            record.to.to_string(),
            record.price.to_string(),
            record.valuation.to_string(),
        ])
        .map_err(|e| ZenithError::TradeLog {
            reason: format!("failed to append record: {}", e),
        })?;
        wtr.flush()?;
        Ok(())
    }

    fn read_all(&self, session: &str) -> Result<Vec<TransitionRecord>, ZenithError> {
        let path = self.log_path(session);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut rdr = csv::Reader::from_path(&path).map_err(|e| ZenithError::TradeLog {
            reason: format!("failed to open {}: {}", path.display(), e),
        })?;

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result.map_err(|e| ZenithError::TradeLog {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            records.push(parse_row(&row)?);
        }
        Ok(records)
    }
}

fn get_field<'a>(
    row: &'a csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'a str, ZenithError> {
    row.get(index).ok_or_else(|| ZenithError::TradeLog {
        reason: format!("missing {name} column"),
    })
}

fn parse_row(row: &csv::StringRecord) -> Result<TransitionRecord, ZenithError> {
    let timestamp =
        NaiveDateTime::parse_from_str(get_field(row, 0, "timestamp")?, TIMESTAMP_FORMAT)
            .map_err(|e| ZenithError::TradeLog {
                reason: format!("invalid timestamp: {}", e),
            })?;
    let from_raw = get_field(row, 1, "from")?;
    let from = AllocationState::parse(from_raw).ok_or_else(|| ZenithError::TradeLog {
        reason: format!("unknown state '{from_raw}'"),
    })?;
    let to_raw = get_field(row, 2, "to")?;
    let to = AllocationState::parse(to_raw).ok_or_else(|| ZenithError::TradeLog {
        reason: format!("unknown state '{to_raw}'"),
    })?;
    let price: f64 = get_field(row, 3, "price")?
        .parse()
        .map_err(|e| ZenithError::TradeLog {
            reason: format!("invalid price: {}", e),
        })?;
    let valuation: f64 = get_field(row, 4, "valuation")?
        .parse()
        .map_err(|e| ZenithError::TradeLog {
            reason: format!("invalid valuation: {}", e),
        })?;

    Ok(TransitionRecord {
        timestamp,
        from,
        to,
        price,
        valuation,
    })
}
