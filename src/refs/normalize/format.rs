//! The pinned set of reference file formats that can be normalized.

use std::path::Path;

use strum::IntoEnumIterator;

/// Supported reference file formats, in dispatch priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum SourceFormat {
    /// Word document with the sequence as text.
    #[strum(serialize = "docx")]
    Docx,
    /// Rich text document with the sequence as text.
    #[strum(serialize = "rtf")]
    Rtf,
    /// FASTA with the short `.fa` extension, only renamed.
    #[strum(serialize = "fa")]
    FastaShort,
    /// SnapGene binary file.
    #[strum(serialize = "snapgene")]
    SnapGene,
    /// Canonical FASTA, nothing to do.
    #[strum(serialize = "fasta")]
    Fasta,
    /// GenBank flat file.
    #[strum(serialize = "genbank")]
    Genbank,
    /// FASTQ reads.
    #[strum(serialize = "fastq")]
    Fastq,
    /// Tab-separated identifier and sequence.
    #[strum(serialize = "tab")]
    Tab,
    /// ApE file, GenBank with a LOCUS line other parsers choke on.
    #[strum(serialize = "ape")]
    Ape,
    /// Geneious zipped XML document.
    #[strum(serialize = "geneious")]
    Geneious,
}

impl SourceFormat {
    /// File extensions (lower case, without dot) mapped to this format.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            SourceFormat::Docx => &["docx"],
            SourceFormat::Rtf => &["rtf"],
            SourceFormat::FastaShort => &["fa"],
            SourceFormat::SnapGene => &["dna"],
            SourceFormat::Fasta => &["fasta"],
            // `gbk` is not a format name of its own but means GenBank
            SourceFormat::Genbank => &["gb", "genbank", "gbk"],
            SourceFormat::Fastq => &["fastq", "fq"],
            SourceFormat::Tab => &["tab"],
            SourceFormat::Ape => &["ape"],
            SourceFormat::Geneious => &["geneious"],
        }
    }

    /// Detect the format from the (case-insensitive) extension of `path`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        SourceFormat::iter().find(|format| format.extensions().contains(&extension.as_str()))
    }
}
