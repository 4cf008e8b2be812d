//! Canonical sequence records and their FASTA serialization.

use std::io::{Read, Write};

use bio::io::fasta;

use crate::err::ConvertError;

/// One canonical output record.
///
/// The identifier never contains whitespace and the sequence never contains
/// whitespace or line breaks, so the written FASTA re-parses unambiguously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    id: String,
    desc: Option<String>,
    seq: Vec<u8>,
}

impl SequenceRecord {
    /// Construct a record, normalizing identifier, description and sequence.
    pub fn new(id: &str, desc: Option<&str>, seq: &[u8]) -> Self {
        let id = id.split_whitespace().collect::<Vec<_>>().join("_");
        let desc = desc
            .map(|d| d.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|d| !d.is_empty() && d != ".");
        let seq = seq
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        Self { id, desc, seq }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn seq(&self) -> &[u8] {
        &self.seq
    }
}

/// Write `records` as FASTA to `writer`.
pub fn write_fasta<W>(writer: W, records: &[SequenceRecord]) -> Result<(), anyhow::Error>
where
    W: Write,
{
    let mut writer = fasta::Writer::new(writer);
    for record in records {
        writer.write(record.id(), record.desc(), record.seq())?;
    }
    writer.flush()?;
    Ok(())
}

/// Read all FASTA records from `reader`.
pub fn read_fasta<R>(reader: R) -> Result<Vec<SequenceRecord>, anyhow::Error>
where
    R: Read,
{
    fasta::Reader::new(reader)
        .records()
        .map(|record| {
            let record = record?;
            Ok(SequenceRecord::new(record.id(), record.desc(), record.seq()))
        })
        .collect()
}

/// IUPAC nucleotide codes accepted in text without a FASTA header.
const NUCLEOTIDE_CODES: &[u8] = b"ACGTUNRYKMSWBDHV";

fn is_sequence_symbol(c: char) -> bool {
    c == '-'
        || c == '*'
        || (c.is_ascii_alphabetic() && NUCLEOTIDE_CODES.contains(&(c.to_ascii_uppercase() as u8)))
}

/// Interpret free text extracted from a document as sequence records.
///
/// Text with a `>` header line is parsed as FASTA; anything before the first
/// header is dropped.  Otherwise the IUPAC nucleotide codes (plus `-` and
/// `*`) of the whole text form one record named `default_id`; any other
/// letter fails with `ConvertError::NonSequenceText`.
pub fn records_from_text(
    text: &str,
    default_id: &str,
) -> Result<Vec<SequenceRecord>, anyhow::Error> {
    if text.trim().is_empty() {
        return Err(ConvertError::EmptyText.into());
    }

    let lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .skip_while(|line| !line.starts_with('>'))
        .collect::<Vec<_>>();

    let records = if lines.is_empty() {
        if let Some(letter) = text
            .chars()
            .find(|c| c.is_alphabetic() && !is_sequence_symbol(*c))
        {
            return Err(ConvertError::NonSequenceText { letter }.into());
        }
        let seq = text
            .bytes()
            .filter(|b| is_sequence_symbol(*b as char))
            .collect::<Vec<_>>();
        if seq.is_empty() {
            vec![]
        } else {
            vec![SequenceRecord::new(default_id, None, &seq)]
        }
    } else {
        let mut fasta_text = lines.join("\n");
        fasta_text.push('\n');
        read_fasta(fasta_text.as_bytes())?
    };

    if records.is_empty() {
        Err(ConvertError::NoRecords.into())
    } else {
        Ok(records)
    }
}
