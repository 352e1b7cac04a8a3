//! Semantic concept clustering over normalized tokens

use std::collections::HashMap;

/// Synonym sets and the canonical label each collapses to
pub const DEFAULT_CONCEPTS: &[(&[&str], &str)] = &[
    // Property types
    (&["flat", "apartment", "apt"], "apartment"),
    (&["house", "home", "property"], "house"),
    (&["studio", "bedsit"], "studio"),
    (&["penthouse"], "penthouse"),
    // Locations
    (&["london"], "london"),
    (&["manchester"], "manchester"),
    (&["birmingham", "brum"], "birmingham"),
    // Price tiers
    (&["cheap", "budget", "affordable"], "budget"),
    (&["luxury", "premium", "expensive", "upmarket"], "luxury"),
    // Bedrooms
    (&["1bedroom", "1bed"], "1bed"),
    (&["2bedroom", "2bed"], "2bed"),
    (&["3bedroom", "3bed"], "3bed"),
    (&["4bedroom", "4bed"], "4bed"),
];

/// Maps tokens onto coarse concept labels
///
/// Many distinct queries collapse onto one clustered form, which trades
/// precision for hit rate.
#[derive(Debug, Clone)]
pub struct ConceptClusterer {
    labels: HashMap<String, String>,
}

impl Default for ConceptClusterer {
    fn default() -> Self {
        let mut clusterer = Self {
            labels: HashMap::new(),
        };

        for (synonyms, label) in DEFAULT_CONCEPTS {
            clusterer = clusterer.with_concept(synonyms.iter().copied(), label);
        }

        clusterer
    }
}

impl ConceptClusterer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or overrides) a synonym set for `label`
    pub fn with_concept<I, S>(mut self, synonyms: I, label: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for synonym in synonyms {
            self.labels
                .insert(synonym.as_ref().to_lowercase(), label.to_string());
        }
        self
    }

    pub fn label_for(&self, token: &str) -> Option<&str> {
        self.labels.get(token).map(String::as_str)
    }

    /// Clusters already-normalized tokens into a sorted, space-joined form
    ///
    /// Concept labels appear at most once; unmapped tokens pass through as-is.
    pub fn cluster(&self, tokens: &[String]) -> String {
        let mut clustered: Vec<&str> = Vec::with_capacity(tokens.len());

        for token in tokens {
            match self.label_for(token) {
                Some(label) => {
                    if !clustered.contains(&label) {
                        clustered.push(label);
                    }
                }
                None => clustered.push(token.as_str()),
            }
        }

        clustered.sort_unstable();
        clustered.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_synonyms_collapse_to_label() {
        let clusterer = ConceptClusterer::new();

        assert_eq!(clusterer.cluster(&tokens(&["flat", "london"])), "apartment london");
        assert_eq!(clusterer.cluster(&tokens(&["apt", "london"])), "apartment london");
        assert_eq!(
            clusterer.cluster(&tokens(&["apartment", "london"])),
            "apartment london"
        );
    }

    #[test]
    fn test_labels_deduplicated() {
        let clusterer = ConceptClusterer::new();

        assert_eq!(
            clusterer.cluster(&tokens(&["expensive", "luxury", "premium"])),
            "luxury"
        );
    }

    #[test]
    fn test_unmapped_tokens_pass_through() {
        let clusterer = ConceptClusterer::new();

        assert_eq!(
            clusterer.cluster(&tokens(&["garden", "garden", "home"])),
            "garden garden house"
        );
    }

    #[test]
    fn test_output_sorted_after_mapping() {
        let clusterer = ConceptClusterer::new();

        assert_eq!(
            clusterer.cluster(&tokens(&["2bed", "brum", "cheap"])),
            "2bed birmingham budget"
        );
    }

    #[test]
    fn test_custom_concept() {
        let clusterer = ConceptClusterer::new().with_concept(["Maisonette", "duplex"], "maisonette");

        assert_eq!(clusterer.label_for("maisonette"), Some("maisonette"));
        assert_eq!(clusterer.cluster(&tokens(&["duplex"])), "maisonette");
    }

    #[test]
    fn test_empty_tokens() {
        assert_eq!(ConceptClusterer::new().cluster(&[]), "");
    }
}
