//! Minimal CSV reading and writing for participant import and data export.
//!
//! Handles quoted fields with embedded commas and doubled quotes. Quoted
//! newlines are not supported; every record is one line.

/// A record type that can be written as one CSV row.
pub trait CsvRow {
    /// Header names, in column order.
    const HEADERS: &'static [&'static str];

    /// Field values, one per header.
    fn csv_fields(&self) -> Vec<String>;
}

/// A parsed CSV document: normalized header names plus raw rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRecord>,
}

/// One data row with its 1-based line number in the source (header is line 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub line: usize,
    pub values: Vec<String>,
}

impl CsvTable {
    /// Index of a column by normalized header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        let wanted = normalize_header(name);
        self.headers.iter().position(|h| *h == wanted)
    }

    /// Trimmed value of `column` in `record`; empty cells yield `None`.
    pub fn value<'a>(&self, record: &'a CsvRecord, column: &str) -> Option<&'a str> {
        let idx = self.column(column)?;
        record
            .values
            .get(idx)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Escape a value for CSV: wrap in quotes if it contains comma, quote, or newline.
pub fn escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Build a CSV document with a header row followed by one row per record.
pub fn build_csv<T: CsvRow>(records: &[T]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(
        T::HEADERS
            .iter()
            .map(|h| escape(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    for record in records {
        let row: Vec<String> = record.csv_fields().iter().map(|v| escape(v)).collect();
        lines.push(row.join(","));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Render an optional value as a CSV cell.
pub fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Lower-case, trim, and map spaces/dashes to underscores.
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Parse raw CSV bytes. The first non-empty line is the header.
pub fn parse_csv(data: &[u8]) -> Result<CsvTable, String> {
    let text = std::str::from_utf8(data).map_err(|e| format!("Invalid UTF-8: {e}"))?;
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header_line) = lines.next().ok_or("CSV is empty")?;
    let headers: Vec<String> = parse_csv_line(header_line)
        .iter()
        .map(|h| normalize_header(h))
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err("CSV header row is empty".into());
    }

    let rows = lines
        .map(|(idx, line)| CsvRecord {
            line: idx + 1,
            values: parse_csv_line(line),
        })
        .collect();

    Ok(CsvTable { headers, rows })
}

/// Parse a single CSV line, handling quoted fields.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == ',' {
            result.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    result.push(current);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Person {
        name: String,
        age: Option<u32>,
    }

    impl CsvRow for Person {
        const HEADERS: &'static [&'static str] = &["name", "age"];

        fn csv_fields(&self) -> Vec<String> {
            vec![self.name.clone(), opt(&self.age)]
        }
    }

    #[test]
    fn escape_plain_value_unchanged() {
        assert_eq!(escape("hello"), "hello");
    }

    #[test]
    fn escape_wraps_commas_and_doubles_quotes() {
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn build_writes_header_and_rows() {
        let rows = vec![
            Person {
                name: "Smith, Jo".to_string(),
                age: Some(40),
            },
            Person {
                name: "Sam".to_string(),
                age: None,
            },
        ];
        assert_eq!(build_csv(&rows), "name,age\n\"Smith, Jo\",40\nSam,\n");
    }

    #[test]
    fn parse_line_handles_quotes() {
        assert_eq!(
            parse_csv_line(r#"a,"b,c","d ""e""""#),
            vec!["a", "b,c", "d \"e\""]
        );
    }

    #[test]
    fn parse_line_keeps_trailing_empty() {
        assert_eq!(parse_csv_line("a,"), vec!["a", ""]);
    }

    #[test]
    fn parse_skips_blank_lines_and_tracks_line_numbers() {
        let table = parse_csv(b"Full Name,Email\nJane,j@x.org\n\nSam,s@x.org\n").unwrap();
        assert_eq!(table.headers, vec!["full_name", "email"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].line, 4);
        assert_eq!(table.value(&table.rows[1], "email"), Some("s@x.org"));
    }

    #[test]
    fn value_returns_none_for_empty_or_missing() {
        let table = parse_csv(b"name,email\nJane,  \n").unwrap();
        assert_eq!(table.value(&table.rows[0], "email"), None);
        assert_eq!(table.value(&table.rows[0], "phone"), None);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(parse_csv(b"").is_err());
        assert!(parse_csv(b"\n\n").is_err());
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        assert!(parse_csv(&[0xff, 0xfe, 0x00]).is_err());
    }

    #[test]
    fn header_bom_is_stripped() {
        let table = parse_csv("\u{feff}Name\nJane\n".as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["name"]);
    }
}
