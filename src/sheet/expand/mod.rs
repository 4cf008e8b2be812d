//! Code implementing the `sheet expand` sub command.
//!
//! Turns the worksheet of one run in the `Nanopore Run *.xlsx` workbook into
//! the size, metadata and sample tables of the run.

pub mod columns;
pub mod input;
pub mod output;
pub mod workbook;

use calamine::Reader;
use clap::Parser;

use self::{
    columns::{ColumnLayout, ColumnRef},
    output::{expand_row, ExpandConfig, Tables},
};
use crate::{common::expand_path, err::SheetError};

/// Storage location of the sequencing sets on the cluster.
pub const DEFAULT_STORAGE_PREFIX: &str = "/global/home/groups/fc_fpsdnaseq/";
/// Plate label written to the metadata and sample tables.
pub const DEFAULT_PLATE: &str = "plate1";
/// Size written when the size cell is empty.
pub const DEFAULT_SIZE: u32 = 7000;
/// Separator of the names in a reference name cell.
pub const DEFAULT_REFERENCE_DELIMITER: &str = "_UNIQUE_STRING_";

/// Command line arguments for `sheet expand` sub command.
#[derive(Parser, Debug)]
#[command(about = "Expand the run worksheet into size, metadata and sample tables", long_about = None)]
pub struct Args {
    /// Directory holding the `Nanopore Run *.xlsx` workbook.
    #[arg(long, default_value = ".")]
    pub path_working_dir: String,
    /// Directory to write the tables to.
    #[arg(long, default_value = ".")]
    pub path_output_dir: String,
    /// Prefix of the sequencing set path, the run ID is appended verbatim.
    #[arg(long, default_value = DEFAULT_STORAGE_PREFIX)]
    pub storage_prefix: String,
    /// Plate label.
    #[arg(long, default_value = DEFAULT_PLATE)]
    pub plate: String,
    /// Approximate size used for samples without a size.
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    pub default_size: u32,
    /// Separator of the names in the reference name column.
    #[arg(long, default_value = DEFAULT_REFERENCE_DELIMITER)]
    pub reference_delimiter: String,

    /// Customer name column, a letter or `header:<name>`.
    #[arg(long, default_value = "B")]
    pub col_customer_name: ColumnRef,
    /// Sample name column, a letter or `header:<name>`.
    #[arg(long, default_value = "C")]
    pub col_sample_name: ColumnRef,
    /// Barcode column, a letter or `header:<name>`.
    #[arg(long, default_value = "D")]
    pub col_barcode: ColumnRef,
    /// Approximate size column, a letter or `header:<name>`.
    #[arg(long, default_value = "G")]
    pub col_size: ColumnRef,
    /// Reference name column, a letter or `header:<name>`.
    #[arg(long, default_value = "H")]
    pub col_reference_name: ColumnRef,
    /// Sample type column, a letter or `header:<name>`.
    #[arg(long, default_value = "I")]
    pub col_sample_type: ColumnRef,

    /// Run ID to search for in the worksheets.
    #[arg(value_parser = crate::common::parse_run_id)]
    pub run_id: String,
}

impl Args {
    pub fn layout(&self) -> ColumnLayout {
        ColumnLayout {
            customer_name: self.col_customer_name.clone(),
            sample_name: self.col_sample_name.clone(),
            barcode: self.col_barcode.clone(),
            size: self.col_size.clone(),
            reference_name: self.col_reference_name.clone(),
            sample_type: self.col_sample_type.clone(),
        }
    }

    pub fn expand_config(&self) -> ExpandConfig {
        ExpandConfig {
            sequencing_set_path: format!("{}{}", self.storage_prefix, self.run_id),
            plate: self.plate.clone(),
            default_size: self.default_size.to_string(),
            reference_delimiter: self.reference_delimiter.clone(),
        }
    }
}

/// Main entry point for the `sheet expand` command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `sheet expand`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let path_workbook = workbook::find_workbook(&expand_path(&args.path_working_dir))?;
    tracing::info!("Selected workbook {:?}", &path_workbook);

    let tables = Tables::create(&expand_path(&args.path_output_dir), &args.run_id)?;

    let mut xlsx = workbook::open(&path_workbook)?;
    let sheet_name = workbook::find_sheet_with_id(&mut xlsx, &args.run_id)?.ok_or_else(|| {
        SheetError::SheetNotFound {
            run_id: args.run_id.clone(),
        }
    })?;
    tracing::info!("Run ID {:?} found in sheet {:?}", &args.run_id, &sheet_name);

    let range = xlsx
        .worksheet_range(&sheet_name)
        .map_err(|e| anyhow::anyhow!("could not read sheet {:?}: {}", &sheet_name, e))?;
    let columns = args.layout().resolve(&input::header_row(&range))?;
    tracing::debug!("resolved columns: {:?}", &columns);
    let rows = input::read_rows(&range, &columns)?;

    let config = args.expand_config();
    for row in &rows {
        tracing::debug!("expanding sheet row {}: {:?}", row.row + 1, row);
        tables.write_expansion(&expand_row(row, &config))?;
    }
    tracing::info!(
        "Wrote {} sample(s) to {:?}, {:?} and {:?}",
        rows.len(),
        tables.size.path(),
        tables.metadata.path(),
        tables.sample.path()
    );

    Ok(())
}
