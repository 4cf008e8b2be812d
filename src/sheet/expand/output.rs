//! The three output tables and the expansion of sample rows into them.

use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
};

use serde::Serialize;

use super::input::SampleRow;
use crate::refs::normalize::{FASTA_EXTENSION, REFERENCE_DIR};

/// File name suffix of the size table.
pub const SIZE_TABLE_SUFFIX: &str = "_size_sheet.csv";
/// File name suffix of the metadata table.
pub const METADATA_TABLE_SUFFIX: &str = "_metadata.txt";
/// File name suffix of the sample table.
pub const SAMPLE_TABLE_SUFFIX: &str = "_sample.txt";

pub const SIZE_HEADER: [&str; 3] = ["barcode", "alias", "approx_size"];
pub const METADATA_HEADER: [&str; 4] = [
    "sequencing_set_path",
    "plate",
    "barcode_num",
    "reference_path",
];
pub const SAMPLE_HEADER: [&str; 5] = ["name", "plate", "barcode_num", "return_type", "sample"];

/// Row of the size table.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SizeRecord {
    pub barcode: String,
    pub alias: String,
    pub approx_size: String,
}

/// Row of the metadata table.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub sequencing_set_path: String,
    pub plate: String,
    pub barcode_num: String,
    pub reference_path: String,
}

/// Row of the sample table.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SampleRecord {
    pub name: String,
    pub plate: String,
    pub barcode_num: String,
    pub return_type: String,
    pub sample: String,
}

/// A CSV table that is created with its header and then only appended to.
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
}

impl Table {
    /// Create (or truncate) the table at `path`, writing only `header`.
    pub fn create(path: PathBuf, header: &[&str]) -> Result<Self, anyhow::Error> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .map_err(|e| anyhow::anyhow!("cannot create table {:?}: {}", &path, e))?;
        writer.write_record(header)?;
        writer.flush()?;
        tracing::debug!("created table {:?}", &path);
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `records` to the table without writing a header.
    pub fn append<T>(&self, records: &[T]) -> Result<(), anyhow::Error>
    where
        T: Serialize,
    {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| anyhow::anyhow!("cannot open table {:?} for appending: {}", &self.path, e))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// The size, metadata and sample tables of one run.
#[derive(Debug, Clone)]
pub struct Tables {
    pub size: Table,
    pub metadata: Table,
    pub sample: Table,
}

impl Tables {
    /// Create the three header-only tables for `run_id` in `dir`.
    pub fn create(dir: &Path, run_id: &str) -> Result<Self, anyhow::Error> {
        Ok(Self {
            size: Table::create(
                dir.join(format!("{}{}", run_id, SIZE_TABLE_SUFFIX)),
                &SIZE_HEADER,
            )?,
            metadata: Table::create(
                dir.join(format!("{}{}", run_id, METADATA_TABLE_SUFFIX)),
                &METADATA_HEADER,
            )?,
            sample: Table::create(
                dir.join(format!("{}{}", run_id, SAMPLE_TABLE_SUFFIX)),
                &SAMPLE_HEADER,
            )?,
        })
    }

    /// Append the records of one sample row.
    pub fn write_expansion(&self, expansion: &Expansion) -> Result<(), anyhow::Error> {
        self.size.append(std::slice::from_ref(&expansion.size))?;
        self.metadata.append(&expansion.metadata)?;
        self.sample.append(std::slice::from_ref(&expansion.sample))?;
        Ok(())
    }
}

/// Constants of the expansion.
#[derive(Debug, Clone)]
pub struct ExpandConfig {
    /// Storage prefix concatenated with the run identifier.
    pub sequencing_set_path: String,
    pub plate: String,
    pub default_size: String,
    pub reference_delimiter: String,
}

impl ExpandConfig {
    fn reference_path(&self, stem: &str) -> String {
        format!(
            "{}/{}/{}.{}",
            self.sequencing_set_path, REFERENCE_DIR, stem, FASTA_EXTENSION
        )
    }

    fn metadata(&self, barcode: &str, reference_path: String) -> MetadataRecord {
        MetadataRecord {
            sequencing_set_path: self.sequencing_set_path.clone(),
            plate: self.plate.clone(),
            barcode_num: barcode.to_string(),
            reference_path,
        }
    }
}

/// The records produced by one sample row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub size: SizeRecord,
    pub metadata: Vec<MetadataRecord>,
    pub sample: SampleRecord,
}

/// Expand `row` into its size, metadata and sample records.
pub fn expand_row(row: &SampleRow, config: &ExpandConfig) -> Expansion {
    let barcode = row.barcode_token();

    let size = SizeRecord {
        barcode: barcode.clone(),
        alias: barcode.clone(),
        approx_size: row
            .size
            .clone()
            .unwrap_or_else(|| config.default_size.clone()),
    };

    let mut metadata = vec![config.metadata(
        &barcode,
        config.reference_path(&format!("{}.final", barcode)),
    )];
    if let Some(names) = &row.reference_names {
        metadata.extend(
            names
                .split(config.reference_delimiter.as_str())
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| config.metadata(&barcode, config.reference_path(name))),
        );
    }

    let sample = SampleRecord {
        name: row.customer_name.clone(),
        plate: config.plate.clone(),
        barcode_num: barcode,
        return_type: row.sample_type.clone(),
        sample: row.sample_name.clone(),
    };

    Expansion {
        size,
        metadata,
        sample,
    }
}
