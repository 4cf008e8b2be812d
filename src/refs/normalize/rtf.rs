//! Plain text extraction from RTF documents.

use std::path::Path;

use super::record::{records_from_text, SequenceRecord};
use crate::common::file_stem_string;

/// Destinations whose content is never part of the document text.
const IGNORED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "pict",
    "header",
    "headerl",
    "headerr",
    "headerf",
    "footer",
    "footerl",
    "footerr",
    "footerf",
    "listtable",
    "listoverridetable",
    "rsidtbl",
    "generator",
    "xmlnstbl",
    "latentstyles",
    "datastore",
    "themedata",
    "colorschememapping",
    "fldinst",
    "object",
];

/// Read the sequence records written as text into the RTF file at `path`.
pub fn read_records(path: &Path) -> Result<Vec<SequenceRecord>, anyhow::Error> {
    let content = std::fs::read(path)?;
    let text = rtf_to_text(&String::from_utf8_lossy(&content));
    records_from_text(&text, &file_stem_string(path))
}

/// Parser state of one `{...}` group.
#[derive(Debug, Clone, Copy)]
struct Group {
    ignorable: bool,
    /// Number of fallback characters following a `\uN` escape.
    uc: usize,
}

/// Convert RTF markup to plain text.
pub fn rtf_to_text(rtf: &str) -> String {
    let chars = rtf.chars().collect::<Vec<_>>();
    let mut out = String::new();
    let mut stack = Vec::new();
    let mut group = Group {
        ignorable: false,
        uc: 1,
    };
    // number of fallback characters still to skip after `\uN`
    let mut skip = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '{' => {
                stack.push(group);
                skip = 0;
                i += 1;
            }
            '}' => {
                group = stack.pop().unwrap_or(group);
                skip = 0;
                i += 1;
            }
            '\\' => {
                let Some(&next) = chars.get(i + 1) else {
                    break;
                };
                if next.is_ascii_alphabetic() {
                    let start = i + 1;
                    let mut end = start;
                    while end < chars.len() && chars[end].is_ascii_alphabetic() {
                        end += 1;
                    }
                    let word = chars[start..end].iter().collect::<String>();
                    let param_start = end;
                    if end < chars.len() && chars[end] == '-' {
                        end += 1;
                    }
                    while end < chars.len() && chars[end].is_ascii_digit() {
                        end += 1;
                    }
                    let param = chars[param_start..end]
                        .iter()
                        .collect::<String>()
                        .parse::<i32>()
                        .ok();
                    // a single space delimits the control word
                    if end < chars.len() && chars[end] == ' ' {
                        end += 1;
                    }
                    i = end;

                    if IGNORED_DESTINATIONS.contains(&word.as_str()) {
                        group.ignorable = true;
                        continue;
                    }
                    if word == "uc" {
                        group.uc = param.unwrap_or(1).max(0) as usize;
                        continue;
                    }
                    if group.ignorable {
                        continue;
                    }
                    if skip > 0 {
                        skip -= 1;
                        continue;
                    }
                    match word.as_str() {
                        "par" | "line" | "sect" | "row" | "page" => out.push('\n'),
                        "tab" | "cell" => out.push('\t'),
                        "emdash" | "endash" => out.push('-'),
                        "u" => {
                            if let Some(code) = param {
                                let code = if code < 0 { code + 65536 } else { code };
                                if let Some(ch) = char::from_u32(code as u32) {
                                    out.push(ch);
                                }
                                skip = group.uc;
                            }
                        }
                        _ => (),
                    }
                } else {
                    i += 2;
                    match next {
                        '*' => group.ignorable = true,
                        '\'' => {
                            let hex = chars.get(i..i + 2).map(|h| h.iter().collect::<String>());
                            i += 2;
                            if group.ignorable {
                                continue;
                            }
                            if skip > 0 {
                                skip -= 1;
                                continue;
                            }
                            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(&h, 16).ok())
                            {
                                out.push(char::from(byte));
                            }
                        }
                        '\\' | '{' | '}' if !group.ignorable => out.push(next),
                        '~' if !group.ignorable => out.push(' '),
                        '_' if !group.ignorable => out.push('-'),
                        '\n' | '\r' if !group.ignorable => out.push('\n'),
                        _ => (),
                    }
                }
            }
            '\r' | '\n' => i += 1,
            _ => {
                if !group.ignorable {
                    if skip > 0 {
                        skip -= 1;
                    } else {
                        out.push(c);
                    }
                }
                i += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("{\\rtf1\\ansi hello\\par world}", "hello\nworld")]
    #[case("{\\rtf1{\\fonttbl{\\f0 Arial;}}\\f0\\fs24 ACGT}", "ACGT")]
    #[case("{\\rtf1{\\*\\generator Riched20;}AC\\tab GT}", "AC\tGT")]
    #[case("{\\rtf1 a\\'e9b}", "a\u{e9}b")]
    #[case("{\\rtf1\\uc1 x\\u252?y}", "x\u{fc}y")]
    #[case("{\\rtf1 \\{x\\}\\\\}", "{x}\\")]
    #[case("{\\rtf1 AC\r\nGT}", "ACGT")]
    fn rtf_to_text_cases(#[case] rtf: &str, #[case] expected: &str) {
        assert_eq!(rtf_to_text(rtf), expected);
    }

    #[test]
    fn read_records_from_fixture() -> Result<(), anyhow::Error> {
        let records = read_records(Path::new("tests/refs/normalize/insert.rtf"))?;

        assert_eq!(
            records,
            vec![SequenceRecord::new(
                "insert",
                Some("GFP fragment"),
                b"ATGGTGAGCAAGGGCGAGGAGCTGTTCACCGGGGTGGTGCCCATCCTGGTCGAGCTGGAC"
            )]
        );

        Ok(())
    }
}
