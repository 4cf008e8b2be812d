//! Domain errors raised by the sub commands.

use std::path::PathBuf;

/// Errors of a single reference file conversion.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("no length token before `bp` in first line {line:?}")]
    MissingLengthMarker { line: String },
    #[error("no charSequence element in Geneious document")]
    MissingCharSequence,
    #[error("not a SnapGene file (missing cookie packet)")]
    NotSnapGene,
    #[error("SnapGene file has no DNA packet")]
    MissingDnaPacket,
    #[error("SnapGene packet of type {packet_type:#04x} is truncated")]
    TruncatedPacket { packet_type: u8 },
    #[error("input did not contain any sequence records")]
    NoRecords,
    #[error("extracted text is empty")]
    EmptyText,
    #[error("text without FASTA header contains non-nucleotide letter {letter:?}")]
    NonSequenceText { letter: char },
}

/// Errors of the workbook lookup, sheet resolution and row expansion.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    #[error("no file matching `Nanopore Run *.xlsx` in {dir:?}")]
    NoWorkbook { dir: PathBuf },
    #[error("run ID {run_id:?} not found in any sheet, make sure it is in the spreadsheet")]
    SheetNotFound { run_id: String },
    #[error("invalid barcode {value:?} in sheet row {row}")]
    InvalidBarcode { row: u32, value: String },
    #[error("invalid column reference {spec:?}")]
    InvalidColumn { spec: String },
    #[error("column header {header:?} not found in header row")]
    HeaderNotFound { header: String },
    #[error("column header {header:?} occurs more than once in header row")]
    AmbiguousHeader { header: String },
    #[error("column {column} is mapped to more than one field")]
    DuplicateColumn { column: String },
}
