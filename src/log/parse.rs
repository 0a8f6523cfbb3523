use crate::error::{FileRejection, ParseError};
use crate::log::row::RawRecord;

/// Split one result line into operation, event and value.
///
/// Expected shape:
/// [OPERATION], EVENT, VALUE
///
/// Example:
/// [READ], 95thPercentileLatency(us), 1021
pub fn tokenize_line(line: &str) -> Result<RawRecord, ParseError> {
    let line = line.trim_end_matches(['\n', '\r']);

    let fields: Vec<&str> = line.split(", ").collect();
    if fields.len() < 3 {
        return Err(ParseError::MissingFields {
            found: fields.len(),
        });
    }

    let operation = fields[0].replace(['[', ']'], "");
    let event = fields[1].to_string();
    let value = fields[2]
        .trim()
        .parse::<f64>()
        .map_err(|_| ParseError::BadValue {
            value: fields[2].to_string(),
        })?;

    Ok(RawRecord {
        operation,
        event,
        value,
    })
}

/// Parse the full text of a result file into its data rows.
///
/// The first line is a header and is dropped. The file is accepted only as a
/// whole: a wrong row count or any line that fails to tokenize rejects it.
pub fn parse_result_text(
    text: &str,
    expected_rows: usize,
) -> Result<Vec<RawRecord>, FileRejection> {
    let rows: Vec<&str> = text.lines().skip(1).collect();
    if rows.len() != expected_rows {
        return Err(FileRejection::RowCount {
            found: rows.len(),
            expected: expected_rows,
        });
    }

    let mut out = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        // +1 for the header, +1 for 1-based numbering.
        let line = idx + 2;
        let record = tokenize_line(row).map_err(|source| FileRejection::Parse { line, source })?;
        out.push(record);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn result_text(rows: usize) -> String {
        let mut text = String::from("header line\n");
        for i in 0..rows {
            text.push_str(&format!("[OP{}], Event, {}\n", i, i));
        }
        text
    }

    #[test]
    fn tokenizes_bracketed_line() {
        let rec = tokenize_line("[OVERALL], RunTime(ms), 10240.5\n").unwrap();
        assert_eq!(
            rec,
            RawRecord {
                operation: "OVERALL".to_string(),
                event: "RunTime(ms)".to_string(),
                value: 10240.5,
            }
        );
        assert_eq!(rec.key().as_str(), "OVERALL, RunTime(ms)");
    }

    #[test]
    fn handles_crlf() {
        let rec = tokenize_line("[READ], Operations, 1000\r\n").unwrap();
        assert_eq!(rec.value, 1000.0);
    }

    #[test]
    fn too_few_fields() {
        assert_eq!(
            tokenize_line("[READ], Operations"),
            Err(ParseError::MissingFields { found: 2 })
        );
        assert_eq!(tokenize_line(""), Err(ParseError::MissingFields { found: 1 }));
    }

    #[test]
    fn non_numeric_value() {
        assert_eq!(
            tokenize_line("[READ], Return=OK, many"),
            Err(ParseError::BadValue {
                value: "many".to_string()
            })
        );
    }

    #[test]
    fn accepts_exact_row_count() {
        let rows = parse_result_text(&result_text(38), 38).unwrap();
        assert_eq!(rows.len(), 38);
        assert_eq!(rows[37].operation, "OP37");
    }

    #[test]
    fn short_file_is_rejected() {
        assert_eq!(
            parse_result_text(&result_text(37), 38),
            Err(FileRejection::RowCount {
                found: 37,
                expected: 38
            })
        );
    }

    #[test]
    fn interior_blank_line_counts_as_a_row() {
        let mut lines: Vec<String> = result_text(37).lines().map(String::from).collect();
        lines.insert(20, String::new());
        let text = lines.join("\n") + "\n";

        let err = parse_result_text(&text, 38).unwrap_err();
        assert_eq!(
            err,
            FileRejection::Parse {
                line: 21,
                source: ParseError::MissingFields { found: 1 },
            }
        );
    }

    #[test]
    fn final_newline_is_not_a_row() {
        let text = result_text(38);
        assert!(text.ends_with('\n'));
        assert_eq!(parse_result_text(&text, 38).unwrap().len(), 38);
        assert_eq!(parse_result_text(text.trim_end(), 38).unwrap().len(), 38);
    }

    #[test]
    fn one_bad_line_rejects_whole_file() {
        let mut lines: Vec<String> = result_text(38).lines().map(String::from).collect();
        // 10th data line.
        lines[10] = "[OP9], Event, oops".to_string();
        let text = lines.join("\n");

        let err = parse_result_text(&text, 38).unwrap_err();
        assert_eq!(
            err,
            FileRejection::Parse {
                line: 11,
                source: ParseError::BadValue {
                    value: "oops".to_string()
                },
            }
        );
    }
}
