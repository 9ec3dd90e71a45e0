use std::collections::HashMap;

use serde::Serialize;

use super::round2;

/// Occurrence counter that remembers first-seen order so that ties are
/// broken deterministically (descending count, then first encountered).
#[derive(Debug, Default)]
pub struct FrequencyTable {
    counts: HashMap<String, (u64, usize)>,
    next_rank: usize,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str) {
        if let Some((count, _)) = self.counts.get_mut(key) {
            *count += 1;
        } else {
            self.counts.insert(key.to_string(), (1, self.next_rank));
            self.next_rank += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.values().map(|(c, _)| c).sum()
    }

    /// Categories sorted by descending count, first-seen tie-break.
    pub fn into_sorted(self) -> Vec<(String, u64)> {
        let mut items: Vec<(String, u64, usize)> = self
            .counts
            .into_iter()
            .map(|(k, (c, seen))| (k, c, seen))
            .collect();
        items.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        items.into_iter().map(|(k, c, _)| (k, c)).collect()
    }

    /// The dominant category, or `None` for an empty table.
    pub fn dominant(self) -> Option<String> {
        self.into_sorted().into_iter().next().map(|(k, _)| k)
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmotionShare {
    pub emotion: String,
    pub count: u64,
    pub percent: f64,
}

/// Count emotion labels and express each as a share of the total.
/// The total is the number of rows with a resolvable label; the
/// `Unknown` sentinel counts like any other category when it occurs.
pub fn emotion_composition<I>(labels: I) -> Vec<EmotionShare>
where
    I: IntoIterator<Item = String>,
{
    let mut table = FrequencyTable::new();
    for label in labels {
        table.add(&label);
    }
    let total = table.total();

    table
        .into_sorted()
        .into_iter()
        .map(|(emotion, count)| EmotionShare {
            emotion,
            count,
            percent: round2(count as f64 / total as f64 * 100.0),
        })
        .collect()
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

/// How many entries the word cloud keeps.
pub const WORD_CLOUD_LIMIT: usize = 50;

/// Function words excluded from the word cloud.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can",
    "had", "has", "have", "her", "his", "him", "its", "our", "out", "she",
    "was", "were", "will", "with", "this", "that", "they", "them", "then",
    "there", "their", "what", "when", "where", "which", "while", "who",
    "why", "how", "from", "into", "just", "like", "more", "most", "much",
    "some", "such", "than", "too", "very", "about", "after", "again",
    "because", "been", "before", "being", "between", "both", "did", "does",
    "doing", "down", "during", "each", "few", "get", "got", "here", "now",
    "only", "other", "over", "own", "same", "should", "would", "could",
    "under", "until", "your", "also", "day", "today", "really",
];

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Tokenize the concatenated journal content: strip punctuation,
/// lowercase, split on whitespace, drop short tokens and stop words,
/// count exact matches (no stemming), keep the top `limit`.
pub fn word_cloud<'a, I>(texts: I, limit: usize) -> Vec<WordCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut table = FrequencyTable::new();
    for text in texts {
        let cleaned: String = text
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect::<String>()
            .to_lowercase();
        for token in cleaned.split_whitespace() {
            if token.chars().count() <= 2 || is_stop_word(token) {
                continue;
            }
            table.add(token);
        }
    }

    table
        .into_sorted()
        .into_iter()
        .take(limit)
        .map(|(word, count)| WordCount { word, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_cloud_folds_case_and_strips_punctuation() {
        let words = word_cloud(["The the cat, sat; on THE mat!"], WORD_CLOUD_LIMIT);
        let mut counts: Vec<(&str, u64)> =
            words.iter().map(|w| (w.word.as_str(), w.count)).collect();
        counts.sort();
        assert_eq!(counts, vec![("cat", 1), ("mat", 1), ("sat", 1)]);
    }

    #[test]
    fn word_cloud_drops_short_tokens_and_stop_words() {
        let words = word_cloud(["I am so so happy about it"], WORD_CLOUD_LIMIT);
        assert_eq!(
            words,
            vec![WordCount { word: "happy".into(), count: 1 }]
        );
    }

    #[test]
    fn word_cloud_sorts_descending_with_first_seen_ties() {
        let words = word_cloud(["rain rain coffee walk walk walk coffee rain"], 10);
        assert_eq!(words[0].word, "rain");
        assert_eq!(words[0].count, 3);
        assert_eq!(words[1].word, "walk");
        assert_eq!(words[1].count, 3);
        assert_eq!(words[2].word, "coffee");
        assert_eq!(words[2].count, 2);
    }

    #[test]
    fn word_cloud_truncates_to_limit() {
        let text = (0..60)
            .map(|i| format!("token{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        let words = word_cloud([text.as_str()], WORD_CLOUD_LIMIT);
        assert_eq!(words.len(), WORD_CLOUD_LIMIT);
    }

    #[test]
    fn emotion_percentages_sum_to_about_100() {
        let labels = ["Joy", "Joy", "Joy", "Sadness", "Sadness", "Fear", "Unknown"]
            .iter()
            .map(|s| s.to_string());
        let shares = emotion_composition(labels);

        let count_sum: u64 = shares.iter().map(|s| s.count).sum();
        assert_eq!(count_sum, 7);

        let percent_sum: f64 = shares.iter().map(|s| s.percent).sum();
        assert!((99.9..=100.1).contains(&percent_sum), "sum was {percent_sum}");

        assert_eq!(shares[0].emotion, "Joy");
        assert_eq!(shares[0].percent, 42.86);
    }

    #[test]
    fn empty_input_yields_empty_composition() {
        assert!(emotion_composition(std::iter::empty::<String>()).is_empty());
    }

    #[test]
    fn dominant_breaks_ties_by_first_seen() {
        let mut table = FrequencyTable::new();
        for label in ["Calm", "Joy", "Joy", "Calm"] {
            table.add(label);
        }
        assert_eq!(table.dominant(), Some("Calm".to_string()));
    }
}
