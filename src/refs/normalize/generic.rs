//! Conversion of formats that are read by a sequence library.

use std::{fs::File, io::Read, path::Path};

use bio::io::fastq;
use gb_io::seq::Seq;

use super::record::SequenceRecord;
use crate::common::file_stem_string;

/// Read all GenBank records from `reader`.
pub fn read_genbank<R>(reader: R) -> Result<Vec<Seq>, anyhow::Error>
where
    R: Read,
{
    gb_io::reader::SeqReader::new(reader)
        .map(|seq| seq.map_err(|e| anyhow::anyhow!("invalid GenBank record: {}", e)))
        .collect()
}

/// Convert a GenBank record, identified by version, accession, or name.
pub fn genbank_to_record(seq: &Seq, fallback_id: &str) -> SequenceRecord {
    let id = seq
        .version
        .as_deref()
        .or(seq.accession.as_deref())
        .or(seq.name.as_deref())
        .filter(|id| !id.trim().is_empty())
        .unwrap_or(fallback_id);
    SequenceRecord::new(id, seq.definition.as_deref(), &seq.seq)
}

/// Read the GenBank file at `path`.
pub fn read_genbank_records(path: &Path) -> Result<Vec<SequenceRecord>, anyhow::Error> {
    let stem = file_stem_string(path);
    Ok(read_genbank(File::open(path)?)?
        .iter()
        .map(|seq| genbank_to_record(seq, &stem))
        .collect())
}

/// Read the FASTQ file at `path`, dropping qualities.
pub fn read_fastq_records(path: &Path) -> Result<Vec<SequenceRecord>, anyhow::Error> {
    fastq::Reader::new(File::open(path)?)
        .records()
        .map(|record| {
            let record = record.map_err(|e| anyhow::anyhow!("invalid FASTQ record: {}", e))?;
            Ok(SequenceRecord::new(record.id(), record.desc(), record.seq()))
        })
        .collect()
}

/// Read the tab-separated `id<TAB>sequence` file at `path`.
pub fn read_tab_records(path: &Path) -> Result<Vec<SequenceRecord>, anyhow::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_path(path)?;

    let mut result = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        match (record.get(0), record.get(1)) {
            (Some(id), Some(seq)) => result.push(SequenceRecord::new(id, None, seq.as_bytes())),
            (Some(id), None) if id.trim().is_empty() => continue,
            _ => anyhow::bail!("line {} of {:?} is not `id<TAB>sequence`", i + 1, path),
        }
    }
    Ok(result)
}
