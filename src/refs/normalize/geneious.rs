//! Conversion of Geneious `.geneious` archives.

use std::{
    fs::File,
    io::{Read, Seek},
    path::Path,
};

use quick_xml::{events::Event, Reader};
use zip::ZipArchive;

use super::record::SequenceRecord;
use crate::{
    common::{file_name_string, file_stem_string},
    err::ConvertError,
};

/// Element holding the raw sequence.
const SEQUENCE_ELEMENT: &[u8] = b"charSequence";

/// Read the Geneious archive at `path` as one record named after the file stem.
pub fn read_records(path: &Path) -> Result<Vec<SequenceRecord>, anyhow::Error> {
    let sequence = extract_char_sequence(File::open(path)?, &file_name_string(path))?;
    Ok(vec![SequenceRecord::new(
        &file_stem_string(path),
        None,
        sequence.as_bytes(),
    )])
}

/// Extract the `charSequence` text of the XML document in the archive.
///
/// The document is the entry named `entry_name` (Geneious names it like the
/// archive), falling back to the first file entry.
pub fn extract_char_sequence<R>(reader: R, entry_name: &str) -> Result<String, anyhow::Error>
where
    R: Read + Seek,
{
    let mut archive = ZipArchive::new(reader)?;
    let name = if archive.file_names().any(|name| name == entry_name) {
        entry_name.to_string()
    } else {
        let mut first = None;
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            if entry.is_file() {
                first = Some(entry.name().to_string());
                break;
            }
        }
        first.ok_or_else(|| anyhow::anyhow!("Geneious archive is empty"))?
    };
    tracing::debug!("reading Geneious document {:?}", &name);

    let mut xml = String::new();
    archive.by_name(&name)?.read_to_string(&mut xml)?;
    char_sequence_from_xml(&xml)
}

fn char_sequence_from_xml(xml: &str) -> Result<String, anyhow::Error> {
    let mut reader = Reader::from_str(xml);
    let mut sequence = String::new();
    let mut in_sequence = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == SEQUENCE_ELEMENT => in_sequence = true,
            Event::End(e) if in_sequence && e.local_name().as_ref() == SEQUENCE_ELEMENT => {
                return Ok(sequence)
            }
            Event::Text(t) if in_sequence => sequence.push_str(&t.unescape()?),
            Event::CData(c) if in_sequence => sequence.push_str(&String::from_utf8_lossy(&c)),
            Event::Eof => return Err(ConvertError::MissingCharSequence.into()),
            _ => (),
        }
    }
}
