//! Explicit mapping of the worksheet columns read by `sheet expand`.

use std::{fmt, str::FromStr};

use crate::err::SheetError;

/// Prefix of a column reference that names a header instead of a letter.
const HEADER_PREFIX: &str = "header:";
/// Largest column index in a worksheet (`XFD`).
const MAX_COLUMN: u32 = 16_383;

/// Reference to a worksheet column, by letter or by header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    /// 0-based column index, given as letters (`A`, `B`, ..., `AA`).
    Letter(u32),
    /// Header text in the header row.
    Header(String),
}

impl FromStr for ColumnRef {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(header) = s.strip_prefix(HEADER_PREFIX) {
            let header = header.trim();
            if header.is_empty() {
                return Err(SheetError::InvalidColumn {
                    spec: s.to_string(),
                });
            }
            Ok(ColumnRef::Header(header.to_string()))
        } else {
            letters_to_index(s).map(ColumnRef::Letter)
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Letter(index) => write!(f, "{}", index_to_letters(*index)),
            ColumnRef::Header(header) => write!(f, "{}{}", HEADER_PREFIX, header),
        }
    }
}

/// Convert column letters to a 0-based index (`A` → 0, `AA` → 26).
pub fn letters_to_index(s: &str) -> Result<u32, SheetError> {
    let invalid = || SheetError::InvalidColumn {
        spec: s.to_string(),
    };
    let letters = s.trim();
    if letters.is_empty() || letters.len() > 3 {
        return Err(invalid());
    }
    let mut value = 0u32;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(invalid());
        }
        value = value * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    let index = value - 1;
    if index > MAX_COLUMN {
        return Err(invalid());
    }
    Ok(index)
}

/// Convert a 0-based column index to letters.
pub fn index_to_letters(index: u32) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// The six columns of a sample row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub customer_name: ColumnRef,
    pub sample_name: ColumnRef,
    pub barcode: ColumnRef,
    pub size: ColumnRef,
    pub reference_name: ColumnRef,
    pub sample_type: ColumnRef,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            customer_name: ColumnRef::Letter(1),
            sample_name: ColumnRef::Letter(2),
            barcode: ColumnRef::Letter(3),
            size: ColumnRef::Letter(6),
            reference_name: ColumnRef::Letter(7),
            sample_type: ColumnRef::Letter(8),
        }
    }
}

/// Column indices after resolving a `ColumnLayout` against a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub customer_name: u32,
    pub sample_name: u32,
    pub barcode: u32,
    pub size: u32,
    pub reference_name: u32,
    pub sample_type: u32,
}

impl ResolvedColumns {
    pub fn all(&self) -> [u32; 6] {
        [
            self.customer_name,
            self.sample_name,
            self.barcode,
            self.size,
            self.reference_name,
            self.sample_type,
        ]
    }
}

impl ColumnLayout {
    /// Resolve against `header_row` (indexed by column) and validate that no
    /// column is used twice.
    pub fn resolve(&self, header_row: &[String]) -> Result<ResolvedColumns, SheetError> {
        let resolve_one = |column: &ColumnRef| -> Result<u32, SheetError> {
            match column {
                ColumnRef::Letter(index) => Ok(*index),
                ColumnRef::Header(header) => {
                    let wanted = header.trim().to_lowercase();
                    let mut found = header_row
                        .iter()
                        .enumerate()
                        .filter(|(_, text)| text.trim().to_lowercase() == wanted)
                        .map(|(index, _)| index as u32);
                    match (found.next(), found.next()) {
                        (Some(index), None) => Ok(index),
                        (None, _) => Err(SheetError::HeaderNotFound {
                            header: header.clone(),
                        }),
                        (Some(_), Some(_)) => Err(SheetError::AmbiguousHeader {
                            header: header.clone(),
                        }),
                    }
                }
            }
        };

        let resolved = ResolvedColumns {
            customer_name: resolve_one(&self.customer_name)?,
            sample_name: resolve_one(&self.sample_name)?,
            barcode: resolve_one(&self.barcode)?,
            size: resolve_one(&self.size)?,
            reference_name: resolve_one(&self.reference_name)?,
            sample_type: resolve_one(&self.sample_type)?,
        };

        let all = resolved.all();
        for (i, column) in all.iter().enumerate() {
            if all[..i].contains(column) {
                return Err(SheetError::DuplicateColumn {
                    column: index_to_letters(*column),
                });
            }
        }

        Ok(resolved)
    }
}
