//! Fuzzy matching for the `/` search over key rows.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// Case-insensitive fuzzy matcher.
pub struct Matcher {
    inner: SkimMatcherV2,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self {
            inner: SkimMatcherV2::default().ignore_case(),
        }
    }

    /// Returns `true` if the pattern fuzzy-matches the text.
    ///
    /// Characters of the pattern must appear in order but need not be adjacent.
    pub fn matches(&self, text: &str, pattern: &str) -> bool {
        self.inner.fuzzy_match(text, pattern).is_some()
    }

    /// Check if any of the provided texts match the pattern.
    pub fn matches_any<'a>(&self, texts: impl IntoIterator<Item = &'a str>, pattern: &str) -> bool {
        texts.into_iter().any(|text| self.matches(text, pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_key_names_fuzzily() {
        let matcher = Matcher::new();

        assert!(matcher.matches("stripe-live", "stl"));
        assert!(matcher.matches("OpenAI", "oai"));
        assert!(matcher.matches("openai", "OAI"));
        assert!(!matcher.matches("mailgun", "xyz"));
    }

    #[test]
    fn matches_any_checks_every_text() {
        let matcher = Matcher::new();

        assert!(matcher.matches_any(["Stripe", "Payments"], "pay"));
        assert!(!matcher.matches_any(["Stripe", "Payments"], "gh"));
    }
}
