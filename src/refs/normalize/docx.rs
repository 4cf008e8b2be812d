//! Text extraction from Word `.docx` documents.

use std::{
    fs::File,
    io::{Read, Seek},
    path::Path,
};

use quick_xml::{events::Event, Reader};
use zip::ZipArchive;

use super::record::{records_from_text, SequenceRecord};
use crate::common::file_stem_string;

/// Path of the main document part inside the archive.
const DOCUMENT_PART: &str = "word/document.xml";

/// Read the sequence records written as text into the document at `path`.
pub fn read_records(path: &Path) -> Result<Vec<SequenceRecord>, anyhow::Error> {
    let text = extract_text(File::open(path)?)?;
    records_from_text(&text, &file_stem_string(path))
}

/// Extract the plain text of a `.docx` archive, one line per paragraph.
pub fn extract_text<R>(reader: R) -> Result<String, anyhow::Error>
where
    R: Read + Seek,
{
    let mut archive = ZipArchive::new(reader)?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| anyhow::anyhow!("no {} in document: {}", DOCUMENT_PART, e))?
        .read_to_string(&mut xml)?;
    text_from_document_xml(&xml)
}

fn text_from_document_xml(xml: &str) -> Result<String, anyhow::Error> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_text_run = true,
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => text.push('\n'),
                _ => (),
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => (),
            },
            Event::Text(t) if in_text_run => text.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => (),
        }
    }
    Ok(text)
}
