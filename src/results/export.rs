//! Serialize the corrected row set back to CSV.

use crate::results::store::RowStore;

/// Render the store as downloadable CSV with overlay-resolved labels.
///
/// Column order is `text`, `src` (only when some row has a source),
/// `pred_label`, `pred_proba` (only when some row has probabilities). Text
/// and source are quoted with doubled internal quotes; labels and the
/// probability array are written bare. Returns an empty string for an empty
/// store, matching the backend exporter.
pub fn to_csv(store: &RowStore) -> String {
    if store.is_empty() {
        return String::new();
    }
    let has_source = store.rows().iter().any(|row| row.source.is_some());
    let has_proba = store.rows().iter().any(|row| row.probabilities.is_some());

    let mut header = vec!["text"];
    if has_source {
        header.push("src");
    }
    header.push("pred_label");
    if has_proba {
        header.push("pred_proba");
    }

    let mut lines = vec![header.join(",")];
    for (_, row, effective) in store.iter_effective() {
        let mut fields = vec![quote(&row.text)];
        if has_source {
            fields.push(quote(row.source.as_deref().unwrap_or("")));
        }
        fields.push(effective.as_index().to_string());
        if has_proba {
            fields.push(format_probabilities(row.probabilities.as_ref()));
        }
        lines.push(fields.join(","));
    }
    lines.join("\n")
}

/// Fixed 3-column serialization used for clipboard copies: `text`, `src`
/// (empty when absent), `pred_label`.
pub fn to_clipboard_csv(store: &RowStore) -> String {
    let mut lines = vec!["text,src,pred_label".to_string()];
    for (_, row, effective) in store.iter_effective() {
        lines.push(format!(
            "{},{},{}",
            quote(&row.text),
            quote(row.source.as_deref().unwrap_or("")),
            effective.as_index()
        ));
    }
    lines.join("\n")
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn format_probabilities(probabilities: Option<&[f32; 3]>) -> String {
    match probabilities {
        Some(values) => serde_json::to_string(values).unwrap_or_default(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::decode::{PredictionRow, decode};
    use crate::results::label::Label;

    fn row(text: &str, source: Option<&str>, predicted: Label) -> PredictionRow {
        PredictionRow {
            text: text.to_string(),
            source: source.map(str::to_string),
            predicted,
            probabilities: None,
            true_label: None,
        }
    }

    #[test]
    fn omits_optional_columns_when_absent() {
        let store = RowStore::new(vec![row("hello", None, Label::Neutral)]);
        assert_eq!(to_csv(&store), "text,pred_label\n\"hello\",1");
    }

    #[test]
    fn includes_source_column_when_any_row_has_one() {
        let store = RowStore::new(vec![
            row("a", Some("review"), Label::Negative),
            row("b", None, Label::Positive),
        ]);
        assert_eq!(
            to_csv(&store),
            "text,src,pred_label\n\"a\",\"review\",0\n\"b\",\"\",2"
        );
    }

    #[test]
    fn uses_effective_labels() {
        let mut store = RowStore::new(vec![row("a", None, Label::Negative)]);
        store.set_correction(0, 2).unwrap();
        assert_eq!(to_csv(&store), "text,pred_label\n\"a\",2");
    }

    #[test]
    fn writes_probabilities_as_bare_json() {
        let mut base = row("a", None, Label::Positive);
        base.probabilities = Some([0.1, 0.2, 0.7]);
        let store = RowStore::new(vec![base]);
        assert_eq!(
            to_csv(&store),
            "text,pred_label,pred_proba\n\"a\",2,[0.1,0.2,0.7]"
        );
    }

    #[test]
    fn escapes_embedded_quotes() {
        let store = RowStore::new(vec![row("say \"hi\"", None, Label::Neutral)]);
        assert_eq!(to_csv(&store), "text,pred_label\n\"say \"\"hi\"\"\",1");
    }

    #[test]
    fn empty_store_serializes_to_empty_string() {
        assert_eq!(to_csv(&RowStore::default()), "");
    }

    #[test]
    fn clipboard_variant_always_has_three_columns() {
        let mut store = RowStore::new(vec![
            row("with, comma", None, Label::Negative),
            row("b", Some("shop"), Label::Neutral),
        ]);
        store.set_correction(0, 1).unwrap();
        assert_eq!(
            to_clipboard_csv(&store),
            "text,src,pred_label\n\"with, comma\",\"\",1\n\"b\",\"shop\",1"
        );
    }

    #[test]
    fn round_trips_text_and_effective_label_through_decode() {
        let mut store = RowStore::new(vec![
            row("quoted \"text\", with comma", Some("review"), Label::Negative),
            row("plain", None, Label::Positive),
        ]);
        store.set_correction(0, 2).unwrap();

        let decoded = decode(&to_csv(&store)).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].text, "quoted \"text\", with comma");
        assert_eq!(decoded[0].predicted, Label::Positive);
        assert_eq!(decoded[1].text, "plain");
        assert_eq!(decoded[1].predicted, Label::Positive);
    }
}
