//! Severity classifier
//!
//! Maps free-text monitor output to an [`EventSeverity`] with an ordered
//! list of keyword rules. Rules are tried in order and the first one with a
//! keyword occurring in the message (case-insensitive) wins; nothing
//! matching means the fallback level.

use crate::event::EventSeverity;
use once_cell::sync::Lazy;

/// Default rule table: "risk"/"critical" escalate to High,
/// "borderline"/"drift" to Medium
const DEFAULT_RULES: [(EventSeverity, &[&str]); 2] = [
    (EventSeverity::High, &["risk", "critical"]),
    (EventSeverity::Medium, &["borderline", "drift"]),
];

static DEFAULT_CLASSIFIER: Lazy<SeverityClassifier> = Lazy::new(SeverityClassifier::default);

/// One ordered rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    severity: EventSeverity,
    keywords: Vec<String>,
}

impl KeywordRule {
    /// Create rule; keywords are matched case-insensitively
    #[must_use]
    pub fn new<I, S>(severity: EventSeverity, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            severity,
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Severity assigned on match
    #[inline]
    #[must_use]
    pub fn severity(&self) -> EventSeverity {
        self.severity
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// Ordered keyword classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityClassifier {
    rules: Vec<KeywordRule>,
    fallback: EventSeverity,
}

impl SeverityClassifier {
    /// Create classifier from ordered rules; unmatched messages are Low
    #[must_use]
    pub fn with_rules(rules: Vec<KeywordRule>) -> Self {
        Self {
            rules,
            fallback: EventSeverity::Low,
        }
    }

    /// Classify a message
    #[must_use]
    pub fn classify(&self, message: &str) -> EventSeverity {
        let lowered = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map_or(self.fallback, KeywordRule::severity)
    }

    /// Rules in evaluation order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }
}

impl Default for SeverityClassifier {
    fn default() -> Self {
        Self::with_rules(
            DEFAULT_RULES
                .iter()
                .map(|(severity, keywords)| KeywordRule::new(*severity, keywords.iter()))
                .collect(),
        )
    }
}

/// Classify with the default rule table
#[must_use]
pub fn classify(message: &str) -> EventSeverity {
    DEFAULT_CLASSIFIER.classify(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_table() {
        assert_eq!(classify("NPSH margin tight; cavitation risk"), EventSeverity::High);
        assert_eq!(classify("Insulation resistance borderline; schedule IR test"), EventSeverity::Medium);
        assert_eq!(classify("MPPT tracking nominal"), EventSeverity::Low);
        assert_eq!(classify("AFR drift; burner tuning required"), EventSeverity::Medium);
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(classify("CRITICAL bus fault"), EventSeverity::High);
        assert_eq!(classify("Frequency DRIFT"), EventSeverity::Medium);
    }

    #[test]
    fn first_matching_rule_wins() {
        assert_eq!(classify("borderline reading, critical soon"), EventSeverity::High);
    }

    #[test]
    fn substring_match_inside_words() {
        // "risk" inside "asterisk" still counts
        assert_eq!(classify("asterisk in label"), EventSeverity::High);
    }

    #[test]
    fn custom_rules() {
        let classifier = SeverityClassifier::with_rules(vec![
            KeywordRule::new(EventSeverity::Medium, ["ripple"]),
            KeywordRule::new(EventSeverity::High, ["ripple exceeded"]),
        ]);
        assert_eq!(classifier.classify("Ripple exceeded limit"), EventSeverity::Medium);
        assert_eq!(classifier.classify("All good"), EventSeverity::Low);
        assert_eq!(classifier.rules().len(), 2);
    }
}
