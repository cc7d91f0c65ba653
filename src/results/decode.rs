//! CSV decoder for downloaded prediction results.
//!
//! Turns the raw CSV blob served by `/api/download/predicted/{id}` into
//! typed rows. Per-row oddities (bad `pred_label`, bad `pred_proba`, empty
//! `text`) degrade gracefully; only an empty or untokenizable blob fails
//! the whole decode.

use thiserror::Error;

use super::label::Label;

/// One analyzed text as decoded from the results CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRow {
    /// Review text, trimmed, never empty.
    pub text: String,
    /// Provenance label from the `src`/`source` column, if supplied.
    pub source: Option<String>,
    /// Model-assigned class; defaults to `Negative` when the column is
    /// missing or unparsable.
    pub predicted: Label,
    /// Per-class probabilities aligned index-to-class, if supplied.
    pub probabilities: Option<[f32; 3]>,
    /// Ground-truth label from the optional `label` column (validation
    /// uploads only).
    pub true_label: Option<Label>,
}

/// Whole-decode failures. Row-level tolerances never produce these.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("csv text is empty")]
    Empty,
    #[error("missing required column 'text'")]
    MissingTextColumn,
    #[error("malformed csv: {0}")]
    Malformed(String),
}

/// Decode a raw CSV blob into prediction rows, preserving record order.
///
/// Rows whose `text` is empty after trimming are skipped silently. Row
/// identity downstream is the zero-based position in the returned vector.
pub fn decode(raw: &str) -> Result<Vec<PredictionRow>, DecodeError> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    if text.trim().is_empty() {
        return Err(DecodeError::Empty);
    }

    let delimiter = sniff_delimiter(text);
    let mut records = split_records(text, delimiter)?;
    if records.is_empty() {
        return Err(DecodeError::Malformed("no records found".to_string()));
    }

    let header = records.remove(0);
    let columns = ColumnMap::from_header(&header)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    let mut defaulted = 0usize;
    for record in &records {
        let Some(text_value) = columns.field(record, columns.text) else {
            skipped += 1;
            continue;
        };
        let text_value = text_value.trim();
        if text_value.is_empty() {
            skipped += 1;
            continue;
        }

        let source = columns
            .source
            .and_then(|idx| columns.field(record, idx))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        let predicted = columns
            .pred_label
            .and_then(|idx| columns.field(record, idx))
            .and_then(|value| value.trim().parse::<i64>().ok())
            .and_then(|value| Label::try_from(value).ok());
        if predicted.is_none() {
            defaulted += 1;
        }

        let probabilities = columns
            .pred_proba
            .and_then(|idx| columns.field(record, idx))
            .and_then(parse_probabilities);

        let true_label = columns
            .true_label
            .and_then(|idx| columns.field(record, idx))
            .and_then(|value| value.trim().parse::<f64>().ok())
            .and_then(|value| Label::try_from(value as i64).ok());

        rows.push(PredictionRow {
            text: text_value.to_string(),
            source,
            predicted: predicted.unwrap_or(Label::Negative),
            probabilities,
            true_label,
        });
    }

    if skipped > 0 {
        tracing::debug!(skipped, "dropped records with empty text during decode");
    }
    if defaulted > 0 {
        tracing::debug!(defaulted, "records fell back to the default pred_label");
    }
    Ok(rows)
}

/// Column indices resolved from the header row.
struct ColumnMap {
    text: usize,
    source: Option<usize>,
    pred_label: Option<usize>,
    pred_proba: Option<usize>,
    true_label: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Result<Self, DecodeError> {
        let mut text = None;
        let mut source = None;
        let mut pred_label = None;
        let mut pred_proba = None;
        let mut true_label = None;
        for (idx, name) in header.iter().enumerate() {
            match name.trim().to_lowercase().as_str() {
                "text" => text = text.or(Some(idx)),
                "src" | "source" => source = source.or(Some(idx)),
                "pred_label" => pred_label = pred_label.or(Some(idx)),
                "pred_proba" => pred_proba = pred_proba.or(Some(idx)),
                "label" => true_label = true_label.or(Some(idx)),
                _ => {}
            }
        }
        let Some(text) = text else {
            return Err(DecodeError::MissingTextColumn);
        };
        Ok(Self {
            text,
            source,
            pred_label,
            pred_proba,
            true_label,
        })
    }

    fn field<'a>(&self, record: &'a [String], idx: usize) -> Option<&'a str> {
        record.get(idx).map(String::as_str)
    }
}

/// Prefer `;` only when the header line carries more of them than commas.
fn sniff_delimiter(text: &str) -> char {
    let first_line = text.lines().next().unwrap_or(text);
    let commas = first_line.matches(',').count();
    let semicolons = first_line.matches(';').count();
    if semicolons > commas { ';' } else { ',' }
}

/// Parse a `pred_proba` cell into a class-aligned triple.
///
/// First attempt repairs a Python-style repr by swapping single quotes for
/// double quotes; the second parses the raw value. Anything else is absent.
fn parse_probabilities(value: &str) -> Option<[f32; 3]> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let repaired = trimmed.replace('\'', "\"");
    let parsed: Vec<f64> = serde_json::from_str(&repaired)
        .or_else(|_| serde_json::from_str(trimmed))
        .ok()?;
    if parsed.len() != 3 {
        return None;
    }
    Some([parsed[0] as f32, parsed[1] as f32, parsed[2] as f32])
}

/// Split CSV text into records of fields, honoring quoted fields with
/// doubled internal quotes and CRLF record separators.
fn split_records(text: &str, delimiter: char) -> Result<Vec<Vec<String>>, DecodeError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();
    let mut saw_any = false;

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(ch),
            }
            continue;
        }
        match ch {
            '"' => {
                in_quotes = true;
                saw_any = true;
            }
            c if c == delimiter => {
                record.push(std::mem::take(&mut field));
                saw_any = true;
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                finish_record(&mut records, &mut record, &mut field);
            }
            '\n' => finish_record(&mut records, &mut record, &mut field),
            _ => {
                field.push(ch);
                saw_any = true;
            }
        }
    }
    if in_quotes {
        return Err(DecodeError::Malformed(
            "unterminated quoted field".to_string(),
        ));
    }
    if !field.is_empty() || !record.is_empty() {
        finish_record(&mut records, &mut record, &mut field);
    }
    if !saw_any {
        return Err(DecodeError::Malformed("no records found".to_string()));
    }
    Ok(records)
}

fn finish_record(records: &mut Vec<Vec<String>>, record: &mut Vec<String>, field: &mut String) {
    if field.is_empty() && record.is_empty() {
        // Blank line between records; not a record of its own.
        return;
    }
    record.push(std::mem::take(field));
    records.push(std::mem::take(record));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_basic_rows_in_order() {
        let rows =
            decode("text,src,pred_label\n\"Great!\",review,1\n\"Bad.\",review,0\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "Great!");
        assert_eq!(rows[0].source.as_deref(), Some("review"));
        assert_eq!(rows[0].predicted, Label::Neutral);
        assert_eq!(rows[1].text, "Bad.");
        assert_eq!(rows[1].predicted, Label::Negative);
    }

    #[test]
    fn skips_rows_with_empty_text() {
        let rows = decode("text,pred_label\n  ,1\nok,2\n\nalso ok,0\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "ok");
        assert_eq!(rows[1].text, "also ok");
    }

    #[test]
    fn defaults_unparsable_pred_label_to_negative() {
        let rows = decode("text,pred_label\nhello,abc\nworld,7\nthere,\n").unwrap();
        assert!(rows.iter().all(|row| row.predicted == Label::Negative));
    }

    #[test]
    fn parses_python_style_probabilities() {
        let rows = decode("text,pred_proba\nhi,\"[0.1, 0.2, 0.7]\"\nyo,\"['0.5', 0.25, 0.25]\"\n")
            .unwrap();
        assert_eq!(rows[0].probabilities, Some([0.1, 0.2, 0.7]));
        // Repaired quotes still fail for string elements; field stays absent.
        assert_eq!(rows[1].probabilities, None);
    }

    #[test]
    fn drops_probability_vectors_of_wrong_length() {
        let rows = decode("text,pred_proba\nhi,\"[0.5, 0.5]\"\n").unwrap();
        assert_eq!(rows[0].probabilities, None);
    }

    #[test]
    fn matches_header_names_case_insensitively() {
        let rows = decode("TEXT, Pred_Label ,SOURCE\nhello,2,shop\n").unwrap();
        assert_eq!(rows[0].predicted, Label::Positive);
        assert_eq!(rows[0].source.as_deref(), Some("shop"));
    }

    #[test]
    fn handles_quoted_commas_and_doubled_quotes() {
        let rows = decode("text,pred_label\n\"say \"\"hi\"\", ok?\",1\n").unwrap();
        assert_eq!(rows[0].text, "say \"hi\", ok?");
    }

    #[test]
    fn sniffs_semicolon_delimiter() {
        let rows = decode("text;src;pred_label\nпривет;отзыв;2\n").unwrap();
        assert_eq!(rows[0].text, "привет");
        assert_eq!(rows[0].source.as_deref(), Some("отзыв"));
        assert_eq!(rows[0].predicted, Label::Positive);
    }

    #[test]
    fn strips_utf8_bom() {
        let rows = decode("\u{feff}text,pred_label\nhello,1\n").unwrap();
        assert_eq!(rows[0].text, "hello");
    }

    #[test]
    fn reads_optional_true_label() {
        let rows = decode("text,label\ngood,2\nbad,9\nugly,x\n").unwrap();
        assert_eq!(rows[0].true_label, Some(Label::Positive));
        assert_eq!(rows[1].true_label, None);
        assert_eq!(rows[2].true_label, None);
    }

    #[test]
    fn fails_on_empty_input() {
        assert!(matches!(decode(""), Err(DecodeError::Empty)));
        assert!(matches!(decode("   \n  "), Err(DecodeError::Empty)));
    }

    #[test]
    fn fails_without_text_column() {
        assert!(matches!(
            decode("src,pred_label\nreview,1\n"),
            Err(DecodeError::MissingTextColumn)
        ));
    }

    #[test]
    fn fails_on_unterminated_quote() {
        assert!(matches!(
            decode("text\n\"unclosed"),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn handles_crlf_records() {
        let rows = decode("text,pred_label\r\none,1\r\ntwo,2\r\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].predicted, Label::Positive);
    }
}
