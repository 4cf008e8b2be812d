//! Reading of SnapGene `.dna` files.
//!
//! A SnapGene file is a sequence of packets, each made of a one byte packet
//! type, a big-endian `u32` payload length and the payload.  The first packet
//! is the cookie (type `0x09`) starting with `SnapGene`; the DNA packet (type
//! `0x00`) holds a topology flag byte followed by the sequence.

use std::{
    fs::File,
    io::{BufReader, ErrorKind, Read},
    path::Path,
};

use byteorder::{BigEndian, ReadBytesExt};

use super::record::SequenceRecord;
use crate::{common::file_stem_string, err::ConvertError};

const PACKET_DNA: u8 = 0x00;
const PACKET_COOKIE: u8 = 0x09;
const COOKIE_MAGIC: &[u8] = b"SnapGene";

/// The DNA packet of a SnapGene file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapGeneDna {
    pub sequence: Vec<u8>,
    pub circular: bool,
}

/// Read the SnapGene file at `path` as one record named after the file stem.
pub fn read_records(path: &Path) -> Result<Vec<SequenceRecord>, anyhow::Error> {
    let dna = parse(BufReader::new(File::open(path)?))?;
    let topology = if dna.circular { "circular" } else { "linear" };
    Ok(vec![SequenceRecord::new(
        &file_stem_string(path),
        Some(topology),
        &dna.sequence,
    )])
}

/// Parse the packet stream from `reader` and return the first DNA packet.
pub fn parse<R>(mut reader: R) -> Result<SnapGeneDna, anyhow::Error>
where
    R: Read,
{
    let mut seen_cookie = false;
    let mut dna = None;

    loop {
        let packet_type = match reader.read_u8() {
            Ok(packet_type) => packet_type,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        };
        if !seen_cookie && packet_type != PACKET_COOKIE {
            return Err(ConvertError::NotSnapGene.into());
        }
        let len = reader
            .read_u32::<BigEndian>()
            .map_err(|_| ConvertError::TruncatedPacket { packet_type })?;
        let mut payload = Vec::new();
        reader
            .by_ref()
            .take(u64::from(len))
            .read_to_end(&mut payload)?;
        if payload.len() != len as usize {
            return Err(ConvertError::TruncatedPacket { packet_type }.into());
        }

        if !seen_cookie {
            if !payload.starts_with(COOKIE_MAGIC) {
                return Err(ConvertError::NotSnapGene.into());
            }
            seen_cookie = true;
            continue;
        }

        if packet_type == PACKET_DNA && dna.is_none() {
            let (flags, sequence) = payload
                .split_first()
                .ok_or(ConvertError::TruncatedPacket { packet_type })?;
            dna = Some(SnapGeneDna {
                sequence: sequence.to_vec(),
                circular: flags & 0x01 != 0,
            });
        } else {
            tracing::trace!("skipping SnapGene packet {:#04x} ({} bytes)", packet_type, len);
        }
    }

    if !seen_cookie {
        return Err(ConvertError::NotSnapGene.into());
    }
    dna.ok_or_else(|| ConvertError::MissingDnaPacket.into())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::common::fixtures::snapgene_bytes;

    #[test]
    fn parse_circular() -> Result<(), anyhow::Error> {
        let bytes = snapgene_bytes("ATGCATGC", true)?;

        let dna = parse(bytes.as_slice())?;

        assert_eq!(
            dna,
            SnapGeneDna {
                sequence: b"ATGCATGC".to_vec(),
                circular: true,
            }
        );

        Ok(())
    }

    #[test]
    fn read_records_linear() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("pTEST.dna");
        std::fs::write(&path, snapgene_bytes("GGGAAATTTCCC", false)?)?;

        let records = read_records(&path)?;

        assert_eq!(
            records,
            vec![SequenceRecord::new("pTEST", Some("linear"), b"GGGAAATTTCCC")]
        );

        Ok(())
    }

    #[test]
    fn parse_rejects_non_snapgene() {
        let err = parse(b"LOCUS  something".as_slice()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConvertError>(),
            Some(&ConvertError::NotSnapGene)
        );

        let err = parse(b"".as_slice()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConvertError>(),
            Some(&ConvertError::NotSnapGene)
        );
    }

    #[test]
    fn parse_missing_dna_packet() -> Result<(), anyhow::Error> {
        let bytes = snapgene_bytes("ACGT", false)?;
        // keep only the cookie packet (1 + 4 + 14 bytes)
        let err = parse(&bytes[..19]).unwrap_err();

        assert_eq!(
            err.downcast_ref::<ConvertError>(),
            Some(&ConvertError::MissingDnaPacket)
        );

        Ok(())
    }

    #[test]
    fn parse_truncated_packet() -> Result<(), anyhow::Error> {
        let bytes = snapgene_bytes("ACGTACGT", false)?;
        // cut into the DNA packet payload
        let err = parse(&bytes[..27]).unwrap_err();

        assert_eq!(
            err.downcast_ref::<ConvertError>(),
            Some(&ConvertError::TruncatedPacket { packet_type: 0x00 })
        );

        Ok(())
    }
}
