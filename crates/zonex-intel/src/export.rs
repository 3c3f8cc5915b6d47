//! JSON and CSV export of a record set.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;
use zonex_core::{DnsRecord, Result};

/// Writes `<dir>/<domain>.json` and `<dir>/<domain>.csv`
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
    domain: String,
}

impl Exporter {
    /// Exporter into `output_dir`, created if missing
    pub fn new(output_dir: impl Into<PathBuf>, domain: impl Into<String>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            domain: domain.into(),
        })
    }

    fn path(&self, extension: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{extension}", self.domain))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the records as pretty-printed JSON
    pub fn to_json(&self, records: &[DnsRecord]) -> Result<PathBuf> {
        let path = self.path("json");
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, records)?;
        info!(path = %path.display(), "JSON saved");
        Ok(path)
    }

    /// Write the records as CSV with a `name,type,value` header
    ///
    /// Nothing is written for an empty record set.
    pub fn to_csv(&self, records: &[DnsRecord]) -> Result<Option<PathBuf>> {
        if records.is_empty() {
            return Ok(None);
        }
        let path = self.path("csv");
        let mut writer = csv::Writer::from_path(&path).map_err(std::io::Error::from)?;
        for record in records {
            writer.serialize(record).map_err(std::io::Error::from)?;
        }
        writer.flush()?;
        info!(path = %path.display(), "CSV saved");
        Ok(Some(path))
    }
}
