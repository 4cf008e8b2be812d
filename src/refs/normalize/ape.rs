//! Conversion of ApE files.
//!
//! ApE writes GenBank files whose LOCUS line (e.g. `ds-DNA` molecule types)
//! is rejected by GenBank parsers.  The LOCUS line is replaced by a known-good
//! template carrying the original length before parsing as GenBank.

use std::path::Path;

use super::{generic::read_genbank, record::SequenceRecord};
use crate::{common::file_stem_string, err::ConvertError};

/// Known-good LOCUS line, taken from the NCBI GenBank sample record.
pub const LOCUS_TEMPLATE: &str =
    "LOCUS       SCU49845     5028 bp    DNA             PLN       21-JUN-1999";
/// Length field of `LOCUS_TEMPLATE`.
const TEMPLATE_LENGTH: &str = "5028";
/// Unit marker following the length in the LOCUS line.
const LENGTH_UNIT: &str = "bp";

/// Replace the first line of `content` with the LOCUS template.
///
/// The length is the token directly preceding the `bp` token of the first line.
pub fn patch_header(content: &str) -> Result<String, ConvertError> {
    let (first_line, rest) = match content.split_once('\n') {
        Some((first_line, rest)) => (first_line, Some(rest)),
        None => (content, None),
    };
    let words = first_line.split_whitespace().collect::<Vec<_>>();
    let length = words
        .iter()
        .position(|word| *word == LENGTH_UNIT)
        .and_then(|idx| idx.checked_sub(1))
        .map(|idx| words[idx])
        .ok_or_else(|| ConvertError::MissingLengthMarker {
            line: first_line.trim_end().to_string(),
        })?;

    let mut patched = LOCUS_TEMPLATE.replace(TEMPLATE_LENGTH, length);
    patched.push('\n');
    if let Some(rest) = rest {
        patched.push_str(rest);
    }
    Ok(patched)
}

/// Read the ApE file at `path`; the records are named after the file stem.
///
/// The file itself is not modified, patching happens in memory.
pub fn read_records(path: &Path) -> Result<Vec<SequenceRecord>, anyhow::Error> {
    let content = std::fs::read_to_string(path)?;
    let patched = patch_header(&content)?;
    let stem = file_stem_string(path);
    Ok(read_genbank(patched.as_bytes())?
        .iter()
        .map(|seq| SequenceRecord::new(&stem, seq.definition.as_deref(), &seq.seq))
        .collect())
}
