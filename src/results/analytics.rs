//! Aggregate views for the dashboard charts.
//!
//! Both aggregations run over the raw model prediction, not the correction
//! overlay; the results table shows corrected labels while the charts keep
//! showing what the model said. Intentional, see the tests at the bottom.

use std::collections::HashMap;

use super::decode::PredictionRow;
use super::label::Label;

/// Tokens shorter than this never reach the frequency tally.
const MIN_TOKEN_CHARS: usize = 3;

/// Closed list of common Russian function words excluded from top-words
/// ranking. Words of one or two characters are dropped by the length rule
/// and are not listed here.
const STOPWORDS: &[&str] = &[
    "без", "более", "больше", "будет", "будто", "была", "были", "было", "быть", "вам", "вас",
    "вдруг", "ведь", "вот", "впрочем", "все", "всегда", "всего", "всех", "всю", "вся", "где",
    "даже", "для", "его", "еще", "ему", "если", "есть", "зачем", "здесь", "или", "иногда",
    "как", "какая", "какой", "когда", "конечно", "кто", "куда", "лучше", "меня", "мне", "много",
    "может", "можно", "мой", "моя", "надо", "наконец", "нас", "нее", "ней", "нельзя", "нет",
    "нибудь", "никогда", "ним", "них", "ничего", "него", "один", "они", "опять",
    "перед", "под", "после", "потом", "потому", "почти", "при", "про", "раз", "разве", "сам",
    "свою", "себе", "себя", "сейчас", "совсем", "так", "такой", "там", "тебя", "тем", "теперь",
    "того", "тогда", "тоже", "только", "том", "тот", "три", "тут", "уже", "хорошо", "хоть",
    "чего", "чем", "через", "что", "чтоб", "чтобы", "чуть", "эти", "этого", "этой", "этом",
    "этот", "эту", "это",
];

/// Per-class row counts over the whole (uncorrected) row set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassDistribution {
    counts: [usize; Label::COUNT],
    total: usize,
}

impl ClassDistribution {
    pub fn count(&self, label: Label) -> usize {
        self.counts[label.as_index()]
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Share of rows in this class, 0.0 when the set is empty.
    pub fn percentage(&self, label: Label) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(label) as f32 / self.total as f32 * 100.0
    }
}

/// Tally predicted labels across all rows.
pub fn class_distribution(rows: &[PredictionRow]) -> ClassDistribution {
    let mut distribution = ClassDistribution::default();
    for row in rows {
        distribution.counts[row.predicted.as_index()] += 1;
        distribution.total += 1;
    }
    distribution
}

/// A ranked word with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordFrequency {
    pub word: String,
    pub count: usize,
}

/// Most frequent content words among rows predicted as `label`.
///
/// Texts are lowercased, stripped to Unicode letters and whitespace, split
/// on whitespace, then filtered by length and the stopword list. Ties keep
/// first-encountered order so the ranking is deterministic.
pub fn top_words(rows: &[PredictionRow], label: Label, top_n: usize) -> Vec<WordFrequency> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut tally: Vec<WordFrequency> = Vec::new();

    for row in rows.iter().filter(|row| row.predicted == label) {
        let cleaned: String = row
            .text
            .to_lowercase()
            .chars()
            .filter(|ch| ch.is_alphabetic() || ch.is_whitespace())
            .collect();
        for token in cleaned.split_whitespace() {
            if token.chars().count() < MIN_TOKEN_CHARS || STOPWORDS.contains(&token) {
                continue;
            }
            match index.get(token) {
                Some(&slot) => tally[slot].count += 1,
                None => {
                    index.insert(token.to_string(), tally.len());
                    tally.push(WordFrequency {
                        word: token.to_string(),
                        count: 1,
                    });
                }
            }
        }
    }

    // Stable sort keeps insertion order within equal counts.
    tally.sort_by(|a, b| b.count.cmp(&a.count));
    tally.truncate(top_n);
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::store::RowStore;

    fn row(text: &str, predicted: Label) -> PredictionRow {
        PredictionRow {
            text: text.to_string(),
            source: None,
            predicted,
            probabilities: None,
            true_label: None,
        }
    }

    #[test]
    fn distribution_counts_and_percentages() {
        let rows = vec![
            row("a", Label::Negative),
            row("b", Label::Negative),
            row("c", Label::Positive),
            row("d", Label::Neutral),
        ];
        let dist = class_distribution(&rows);
        assert_eq!(dist.count(Label::Negative), 2);
        assert_eq!(dist.count(Label::Neutral), 1);
        assert_eq!(dist.count(Label::Positive), 1);
        assert_eq!(dist.total(), 4);
        assert!((dist.percentage(Label::Negative) - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn empty_set_yields_zero_percentages() {
        let dist = class_distribution(&[]);
        assert_eq!(dist.total(), 0);
        assert_eq!(dist.percentage(Label::Positive), 0.0);
    }

    #[test]
    fn top_words_ranks_by_frequency() {
        let rows = vec![
            row("доставка быстрая, доставка удобная", Label::Positive),
            row("быстрая доставка!", Label::Positive),
            row("ужасная доставка", Label::Negative),
        ];
        let words = top_words(&rows, Label::Positive, 10);
        assert_eq!(words[0].word, "доставка");
        assert_eq!(words[0].count, 3);
        assert_eq!(words[1].word, "быстрая");
        assert_eq!(words[1].count, 2);
        assert_eq!(words[2].word, "удобная");
    }

    #[test]
    fn ties_keep_first_encountered_order() {
        let rows = vec![row("zzz aaa", Label::Neutral)];
        let words = top_words(&rows, Label::Neutral, 10);
        assert_eq!(words[0].word, "zzz");
        assert_eq!(words[1].word, "aaa");
    }

    #[test]
    fn filters_stopwords_short_tokens_and_punctuation() {
        let rows = vec![row("Это было очень хорошо, но я не рад 123", Label::Neutral)];
        let words = top_words(&rows, Label::Neutral, 10);
        let found: Vec<&str> = words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(found, vec!["очень", "рад"]);
    }

    #[test]
    fn frequencies_sum_to_surviving_token_count() {
        let rows = vec![
            row("сервис отличный сервис", Label::Positive),
            row("персонал вежливый", Label::Positive),
            row("не считается", Label::Negative),
        ];
        let words = top_words(&rows, Label::Positive, 100);
        let total: usize = words.iter().map(|w| w.count).sum();
        assert_eq!(total, 5);
        for pair in words.windows(2) {
            assert!(pair[0].count >= pair[1].count);
        }
    }

    #[test]
    fn truncates_to_top_n() {
        let rows = vec![row("один два три четыре пять шесть семь", Label::Neutral)];
        assert_eq!(top_words(&rows, Label::Neutral, 2).len(), 2);
    }

    // The charts intentionally ignore the correction overlay: a corrected
    // row still counts under its original predicted class here even though
    // the table and export show the corrected label.
    #[test]
    fn aggregations_ignore_the_correction_overlay() {
        let mut store = RowStore::new(vec![
            row("отличный сервис", Label::Positive),
            row("плохой сервис", Label::Positive),
        ]);
        store.set_correction(1, 0).unwrap();

        let dist = class_distribution(store.rows());
        assert_eq!(dist.count(Label::Positive), 2);
        assert_eq!(dist.count(Label::Negative), 0);

        let words = top_words(store.rows(), Label::Positive, 10);
        assert!(words.iter().any(|w| w.word == "плохой"));
        assert_eq!(store.effective_label(1), Some(Label::Negative));
    }
}
