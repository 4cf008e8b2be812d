//! Code implementing the `refs normalize` sub command.
//!
//! Every file of `<run-id>/reference_fastas/` is converted into a sibling
//! `.fasta` file.  Each file is an independent unit of work: a failing file is
//! reported and the batch continues with the next one.

pub mod ape;
pub mod docx;
pub mod format;
pub mod generic;
pub mod geneious;
pub mod record;
pub mod rtf;
pub mod snapgene;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use itertools::Itertools;
use strum::IntoEnumIterator;

use self::{format::SourceFormat, record::SequenceRecord};
use crate::{
    common::{expand_path, file_name_string, file_stem_string, list_files_sorted},
    err::ConvertError,
};

/// Name of the per-run directory holding the reference files.
pub const REFERENCE_DIR: &str = "reference_fastas";
/// Extension of the canonical output files.
pub const FASTA_EXTENSION: &str = "fasta";

/// Command line arguments for `refs normalize` sub command.
#[derive(Parser, Debug)]
#[command(about = "Convert the reference files of a run to FASTA", long_about = None)]
pub struct Args {
    /// Directory holding the run directories.
    #[arg(long, default_value = ".")]
    pub path_base: String,
    /// Run ID, references are read from `<path-base>/<run-id>/reference_fastas/`.
    #[arg(value_parser = crate::common::parse_run_id)]
    pub run_id: String,
}

/// Result of handling one reference file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Records were written to `path`.
    Converted { path: PathBuf, records: usize },
    /// A `.fa` file was renamed to `path`.
    Renamed { path: PathBuf },
    /// The file already is canonical FASTA.
    AlreadyFasta,
    /// The file format is not supported, the file was left alone.
    Unsupported,
}

/// Tally of a batch run.
#[derive(Debug, Default)]
pub struct Summary {
    pub converted: usize,
    pub renamed: usize,
    pub already_fasta: usize,
    pub unsupported: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl Summary {
    /// Total number of files seen.
    pub fn total(&self) -> usize {
        self.converted
            + self.renamed
            + self.already_fasta
            + self.unsupported.len()
            + self.failed.len()
    }

    fn record(&mut self, path: &Path, result: Result<Outcome, anyhow::Error>) {
        let name = file_name_string(path);
        match result {
            Ok(Outcome::Converted { path, records }) => {
                tracing::info!("Wrote {} record(s) of {} to {:?}", records, name, path);
                self.converted += 1;
            }
            Ok(Outcome::Renamed { path }) => {
                tracing::info!("Renamed {} to {:?}", name, path);
                self.renamed += 1;
            }
            Ok(Outcome::AlreadyFasta) => {
                tracing::info!("Reference {} already in fasta format", name);
                self.already_fasta += 1;
            }
            Ok(Outcome::Unsupported) => {
                tracing::warn!("Unsupported file {}", name);
                self.unsupported.push(path.to_path_buf());
            }
            Err(e) => {
                tracing::error!("Could not convert {}: {:#}", name, e);
                self.failed.push((path.to_path_buf(), format!("{:#}", e)));
            }
        }
    }

    fn log(&self) {
        tracing::info!(
            "Processed {} file(s): {} converted, {} renamed, {} already FASTA, {} unsupported, {} failed",
            self.total(),
            self.converted,
            self.renamed,
            self.already_fasta,
            self.unsupported.len(),
            self.failed.len()
        );
        for (path, message) in &self.failed {
            tracing::error!("  failed: {:?}: {}", path, message);
        }
    }
}

/// Write `records` to `path` through a temporary file in the same directory.
fn write_records(path: &Path, records: &[SequenceRecord]) -> Result<(), anyhow::Error> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp_file = tempfile::NamedTempFile::new_in(dir)?;
    record::write_fasta(tmp_file.as_file_mut(), records)?;
    tmp_file
        .persist(path)
        .map_err(|e| anyhow::anyhow!("could not write {:?}: {}", path, e.error))?;
    Ok(())
}

/// Convert the single reference file at `path`.
pub fn process_file(path: &Path) -> Result<Outcome, anyhow::Error> {
    let Some(format) = SourceFormat::from_path(path) else {
        return Ok(Outcome::Unsupported);
    };
    let path_output = path.with_extension(FASTA_EXTENSION);
    tracing::debug!("{:?} has format {}", path, format);

    let records = match format {
        SourceFormat::Fasta => return Ok(Outcome::AlreadyFasta),
        SourceFormat::FastaShort => {
            if path_output.exists() {
                tracing::warn!("Replacing existing {:?}", &path_output);
            }
            std::fs::rename(path, &path_output)
                .with_context(|| format!("could not rename {:?} to {:?}", path, &path_output))?;
            return Ok(Outcome::Renamed { path: path_output });
        }
        SourceFormat::Docx => docx::read_records(path),
        SourceFormat::Rtf => rtf::read_records(path),
        SourceFormat::SnapGene => snapgene::read_records(path),
        SourceFormat::Genbank => generic::read_genbank_records(path),
        SourceFormat::Fastq => generic::read_fastq_records(path),
        SourceFormat::Tab => generic::read_tab_records(path),
        SourceFormat::Ape => ape::read_records(path),
        SourceFormat::Geneious => geneious::read_records(path),
    }
    .with_context(|| format!("could not read {:?} as {}", path, format))?;
    if records.is_empty() {
        return Err(ConvertError::NoRecords.into());
    }

    tracing::info!(
        "Converting {} to fasta as {}",
        file_stem_string(path),
        format
    );
    write_records(&path_output, &records)
        .with_context(|| format!("could not write {:?}", &path_output))?;
    Ok(Outcome::Converted {
        path: path_output,
        records: records.len(),
    })
}

/// Convert every file in `dir`, continuing past failures.
pub fn normalize_dir(dir: &Path) -> Result<Summary, anyhow::Error> {
    let mut summary = Summary::default();
    for path in list_files_sorted(dir)? {
        let result = process_file(&path);
        summary.record(&path, result);
    }
    Ok(summary)
}

/// Main entry point for the `refs normalize` command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `refs normalize`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let dir = expand_path(&args.path_base)
        .join(&args.run_id)
        .join(REFERENCE_DIR);
    tracing::info!("Reading reference files from {:?}", &dir);
    tracing::debug!(
        "supported formats: {}",
        SourceFormat::iter()
            .map(|format| format!("{} ({})", format, format.extensions().join(", ")))
            .join("; ")
    );

    let summary = normalize_dir(&dir)?;
    summary.log();

    if !summary.failed.is_empty() {
        anyhow::bail!(
            "{} of {} reference file(s) could not be converted",
            summary.failed.len(),
            summary.total()
        );
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::common::{
        self,
        fixtures::{docx_bytes, geneious_bytes, snapgene_bytes},
    };

    fn setup_run_dir(tmp_dir: &Path, run_id: &str) -> Result<PathBuf, anyhow::Error> {
        let dir = tmp_dir.join(run_id).join(REFERENCE_DIR);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    #[test]
    fn run_docx_fa_and_unsupported() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let dir = setup_run_dir(&tmp_dir, "20250228")?;
        std::fs::write(
            dir.join("ref1.docx"),
            docx_bytes(&["&gt;ref1 from word", "ACGTACGT", "GGCC"])?,
        )?;
        std::fs::write(dir.join("ref2.fa"), ">ref2\nTTTT\nAAAA\n")?;
        std::fs::write(dir.join("ref3.xyz"), "not a sequence")?;

        let common_args = common::Args::default();
        let args = Args {
            path_base: tmp_dir.to_string_lossy().into_owned(),
            run_id: String::from("20250228"),
        };

        run(&common_args, &args)?;

        assert_eq!(
            std::fs::read_to_string(dir.join("ref1.fasta"))?,
            ">ref1 from word\nACGTACGTGGCC\n"
        );
        assert_eq!(
            std::fs::read_to_string(dir.join("ref2.fasta"))?,
            ">ref2\nTTTT\nAAAA\n"
        );
        assert!(!dir.join("ref2.fa").exists());
        assert_eq!(
            std::fs::read_to_string(dir.join("ref3.xyz"))?,
            "not a sequence"
        );
        assert!(!dir.join("ref3.fasta").exists());

        Ok(())
    }

    #[test]
    fn normalize_dir_summary() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let dir = setup_run_dir(&tmp_dir, "run")?;
        std::fs::write(dir.join("a.docx"), docx_bytes(&["ACGT"])?)?;
        std::fs::write(dir.join("b.fa"), ">b\nAC\n")?;
        std::fs::write(dir.join("c.fasta"), ">c\nAC\n")?;
        std::fs::write(dir.join("d.xyz"), "")?;
        std::fs::write(dir.join("e.dna"), snapgene_bytes("ACGTT", true)?)?;
        std::fs::write(dir.join("f.geneious"), geneious_bytes("f.geneious", "GGG")?)?;
        std::fs::copy("tests/refs/normalize/pTEST.gb", dir.join("g.gbk"))?;

        let summary = normalize_dir(&dir)?;

        assert_eq!(summary.converted, 4);
        assert_eq!(summary.renamed, 1);
        assert_eq!(summary.already_fasta, 1);
        assert_eq!(summary.unsupported, vec![dir.join("d.xyz")]);
        assert!(summary.failed.is_empty());
        assert_eq!(summary.total(), 7);
        assert_eq!(
            std::fs::read_to_string(dir.join("e.fasta"))?,
            ">e circular\nACGTT\n"
        );
        assert_eq!(
            std::fs::read_to_string(dir.join("f.fasta"))?,
            ">f\nGGG\n"
        );
        assert!(dir.join("g.fasta").exists());

        Ok(())
    }

    #[test]
    fn failure_does_not_abort_batch() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let dir = setup_run_dir(&tmp_dir, "run")?;
        std::fs::copy("tests/refs/normalize/no_length.ape", dir.join("a.ape"))?;
        std::fs::copy("tests/refs/normalize/insert.ape", dir.join("b.ape"))?;
        let broken_before = std::fs::read(dir.join("a.ape"))?;

        let summary = normalize_dir(&dir)?;

        assert_eq!(summary.converted, 1);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, dir.join("a.ape"));
        assert!(!dir.join("a.fasta").exists());
        assert!(dir.join("b.fasta").exists());
        assert_eq!(std::fs::read(dir.join("a.ape"))?, broken_before);

        Ok(())
    }

    #[test]
    fn run_fails_after_summary() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let dir = setup_run_dir(&tmp_dir, "run")?;
        std::fs::write(dir.join("broken.dna"), "not snapgene")?;
        std::fs::write(dir.join("ok.fa"), ">ok\nA\n")?;

        let common_args = common::Args::default();
        let args = Args {
            path_base: tmp_dir.to_string_lossy().into_owned(),
            run_id: String::from("run"),
        };

        assert!(run(&common_args, &args).is_err());
        assert!(dir.join("ok.fasta").exists());

        Ok(())
    }

    #[test]
    fn run_missing_directory() {
        let tmp_dir = temp_testdir::TempDir::default();
        let common_args = common::Args::default();
        let args = Args {
            path_base: tmp_dir.to_string_lossy().into_owned(),
            run_id: String::from("missing"),
        };

        assert!(run(&common_args, &args).is_err());
    }

    #[test]
    fn prose_docx_fails() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let dir = setup_run_dir(&tmp_dir, "run")?;
        std::fs::write(
            dir.join("notes.docx"),
            docx_bytes(&["Insert for sample 3", "ACGT"])?,
        )?;
        std::fs::write(dir.join("ok.docx"), docx_bytes(&["ACGT"])?)?;

        let summary = normalize_dir(&dir)?;

        assert_eq!(summary.converted, 1);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, dir.join("notes.docx"));
        assert!(!dir.join("notes.fasta").exists());

        Ok(())
    }

    #[test]
    fn process_file_error_names_path() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("broken.docx");
        std::fs::write(&path, "not a zip archive")?;

        let err = process_file(&path).unwrap_err();

        assert!(format!("{:#}", err).contains("broken.docx"));
        assert!(format!("{:#}", err).contains("docx"));

        Ok(())
    }

    #[test]
    fn process_file_prose_error_kind() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("notes.docx");
        std::fs::write(&path, docx_bytes(&["Insert for sample 3", "ACGT"])?)?;

        let err = process_file(&path).unwrap_err();

        assert_eq!(
            err.downcast_ref::<ConvertError>(),
            Some(&ConvertError::NonSequenceText { letter: 'I' })
        );

        Ok(())
    }

    #[test]
    fn process_file_fastq() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("reads.fq");
        std::fs::copy("tests/refs/normalize/reads.fastq", &path)?;

        let outcome = process_file(&path)?;

        assert_eq!(
            outcome,
            Outcome::Converted {
                path: tmp_dir.join("reads.fasta"),
                records: 2
            }
        );
        assert_eq!(
            std::fs::read_to_string(tmp_dir.join("reads.fasta"))?,
            ">read1 sample=a\nACGTACGTAC\n>read2\nTTTTGGGG\n"
        );

        Ok(())
    }
}
