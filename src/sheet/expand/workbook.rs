//! Workbook lookup and worksheet resolution.

use std::{
    fs::File,
    io::{BufReader, Read, Seek},
    path::{Path, PathBuf},
};

use calamine::{open_workbook, Data, Reader, Xlsx};

use super::input::cell_text;
use crate::{
    common::{file_name_string, list_files_sorted},
    err::SheetError,
};

/// File name prefix of the run workbook.
pub const WORKBOOK_PREFIX: &str = "Nanopore Run ";
/// File name suffix of the run workbook.
pub const WORKBOOK_SUFFIX: &str = ".xlsx";
/// Column (`C`) holding the run identifier in the first rows of a sheet.
const ID_COLUMN: u32 = 2;
/// Rows of `ID_COLUMN` searched for the run identifier.
const ID_ROWS: [u32; 2] = [0, 1];

/// Find the run workbook in `dir`.
///
/// Matching names are sorted and the first one is used.
pub fn find_workbook(dir: &Path) -> Result<PathBuf, anyhow::Error> {
    let matches = list_files_sorted(dir)?
        .into_iter()
        .filter(|path| {
            let name = file_name_string(path);
            name.starts_with(WORKBOOK_PREFIX) && name.ends_with(WORKBOOK_SUFFIX)
        })
        .collect::<Vec<_>>();

    let (first, rest) = matches.split_first().ok_or_else(|| SheetError::NoWorkbook {
        dir: dir.to_path_buf(),
    })?;
    if !rest.is_empty() {
        tracing::warn!(
            "{} workbooks match, using {:?} and ignoring {:?}",
            matches.len(),
            first,
            rest
        );
    }
    Ok(first.clone())
}

/// Open the workbook at `path`.
pub fn open(path: &Path) -> Result<Xlsx<BufReader<File>>, anyhow::Error> {
    open_workbook::<Xlsx<_>, _>(path)
        .map_err(|e| anyhow::anyhow!("could not open workbook {:?}: {}", path, e))
}

/// Return the name of the first sheet whose identifier cells contain
/// `run_id` as a whole whitespace-separated token.
///
/// Sheets are streamed cell by cell and reading stops after the last
/// identifier row, so the rest of each sheet is never parsed.
pub fn find_sheet_with_id<RS>(
    workbook: &mut Xlsx<RS>,
    run_id: &str,
) -> Result<Option<String>, anyhow::Error>
where
    RS: Read + Seek,
{
    let last_id_row = ID_ROWS.iter().copied().max().unwrap_or_default();
    for sheet_name in workbook.sheet_names() {
        tracing::debug!("checking sheet {:?}", &sheet_name);
        let mut cells = workbook
            .worksheet_cells_reader(&sheet_name)
            .map_err(|e| anyhow::anyhow!("could not read sheet {:?}: {}", &sheet_name, e))?;
        let mut found = false;
        while let Some(cell) = cells
            .next_cell()
            .map_err(|e| anyhow::anyhow!("could not read sheet {:?}: {}", &sheet_name, e))?
        {
            let (row, col) = cell.get_position();
            if row > last_id_row {
                break;
            }
            if col == ID_COLUMN && ID_ROWS.contains(&row) {
                let text = cell_text(&Data::from(cell.get_value().clone()));
                if text.split_whitespace().any(|token| token == run_id) {
                    found = true;
                    break;
                }
            }
        }
        if found {
            return Ok(Some(sheet_name));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::common::fixtures::{xlsx_bytes, Cell};

    fn id_sheet(title: &'static str, id: &'static str) -> Vec<Vec<Cell>> {
        vec![
            vec![Cell::Empty, Cell::Empty, Cell::Text(title)],
            vec![Cell::Empty, Cell::Text("Customer"), Cell::Text(id)],
        ]
    }

    fn write_workbook(
        dir: &Path,
        sheets: &[(&str, Vec<Vec<Cell>>)],
    ) -> Result<PathBuf, anyhow::Error> {
        let path = dir.join("Nanopore Run 2025.xlsx");
        std::fs::write(&path, xlsx_bytes(sheets)?)?;
        Ok(path)
    }

    #[test]
    fn find_workbook_picks_first_match() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        std::fs::write(tmp_dir.join("Nanopore Run B.xlsx"), "")?;
        std::fs::write(tmp_dir.join("Nanopore Run A.xlsx"), "")?;
        std::fs::write(tmp_dir.join("Nanopore Run C.csv"), "")?;
        std::fs::write(tmp_dir.join("Other Run.xlsx"), "")?;

        let path = find_workbook(&tmp_dir)?;

        assert_eq!(path, tmp_dir.join("Nanopore Run A.xlsx"));

        Ok(())
    }

    #[test]
    fn find_workbook_none() {
        let tmp_dir = temp_testdir::TempDir::default();

        let err = find_workbook(&tmp_dir).unwrap_err();

        assert_eq!(
            err.downcast_ref::<SheetError>(),
            Some(&SheetError::NoWorkbook {
                dir: tmp_dir.to_path_buf()
            })
        );
    }

    #[test]
    fn find_sheet_longer_id_first() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = write_workbook(
            &tmp_dir,
            &[
                ("nb", id_sheet("Run ID", "20250228NB")),
                ("plain", id_sheet("Run ID", "20250228")),
            ],
        )?;
        let mut workbook = open(&path)?;

        assert_eq!(
            find_sheet_with_id(&mut workbook, "20250228")?,
            Some(String::from("plain"))
        );
        assert_eq!(
            find_sheet_with_id(&mut workbook, "20250228NB")?,
            Some(String::from("nb"))
        );

        Ok(())
    }

    #[test]
    fn find_sheet_shorter_id_first() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = write_workbook(
            &tmp_dir,
            &[
                ("plain", id_sheet("Run ID", "20250228")),
                ("nb", id_sheet("Run ID", "20250228NB")),
            ],
        )?;
        let mut workbook = open(&path)?;

        assert_eq!(
            find_sheet_with_id(&mut workbook, "20250228NB")?,
            Some(String::from("nb"))
        );
        assert_eq!(
            find_sheet_with_id(&mut workbook, "20250228")?,
            Some(String::from("plain"))
        );

        Ok(())
    }

    #[test]
    fn find_sheet_stops_after_id_rows() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let mut broken = id_sheet("Run ID", "20250101");
        for _ in 0..500 {
            broken.push(vec![Cell::Empty, Cell::Text("Lab"), Cell::Number(7.0)]);
        }
        broken.push(vec![Cell::Empty, Cell::Error("#BOGUS!")]);
        let path = write_workbook(
            &tmp_dir,
            &[
                ("broken", broken),
                ("plain", id_sheet("Run ID", "20250228")),
            ],
        )?;
        let mut workbook = open(&path)?;

        assert_eq!(
            find_sheet_with_id(&mut workbook, "20250228")?,
            Some(String::from("plain"))
        );
        assert_eq!(
            find_sheet_with_id(&mut workbook, "20250101")?,
            Some(String::from("broken"))
        );

        Ok(())
    }

    #[test]
    fn find_sheet_in_header_cell() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = write_workbook(
            &tmp_dir,
            &[("only", id_sheet("Run 20250301 samples", "Sample"))],
        )?;
        let mut workbook = open(&path)?;

        assert_eq!(
            find_sheet_with_id(&mut workbook, "20250301")?,
            Some(String::from("only"))
        );
        assert_eq!(find_sheet_with_id(&mut workbook, "2025")?, None);

        Ok(())
    }
}
