use crate::utils::constants::DEFAULT_CLOUD_FALLBACK;

/// One step of the estimator: any keyword present yields `value`
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRule {
    keywords: Vec<String>,
    value: f64,
}

impl KeywordRule {
    pub fn new(keywords: &[&str], value: f64) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            value,
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Rules in evaluation order. "partly" sits before the generic "cloud"
/// so "Partly cloudy" resolves to 55, not 70.
pub fn default_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(&["overcast"], 95.0),
        KeywordRule::new(&["mostly"], 80.0),
        KeywordRule::new(&["partly"], 55.0),
        KeywordRule::new(&["cloud"], 70.0),
        KeywordRule::new(&["fog"], 85.0),
        KeywordRule::new(&["clear", "sun"], 15.0),
    ]
}

/// Estimates cloud cover (%) from a free-text weather summary.
///
/// A coarse proxy: first matching rule wins, case-insensitive substring
/// test, otherwise the fallback. Values from here are lower-confidence
/// than a measured cloud column.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudEstimator {
    rules: Vec<KeywordRule>,
    fallback: f64,
}

impl CloudEstimator {
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
            fallback: DEFAULT_CLOUD_FALLBACK,
        }
    }

    pub fn with_rules(rules: Vec<KeywordRule>) -> Self {
        Self {
            rules,
            fallback: DEFAULT_CLOUD_FALLBACK,
        }
    }

    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> f64 {
        self.fallback
    }

    /// The first matching rule's value, if any rule matches
    pub fn classify(&self, text: Option<&str>) -> Option<f64> {
        let text = text?.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&text))
            .map(KeywordRule::value)
    }

    pub fn estimate(&self, text: Option<&str>) -> f64 {
        self.estimate_with_fallback(text, self.fallback)
    }

    pub fn estimate_with_fallback(&self, text: Option<&str>, fallback: f64) -> f64 {
        self.classify(text).unwrap_or(fallback)
    }
}

impl Default for CloudEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_examples() {
        let estimator = CloudEstimator::new();

        assert_eq!(estimator.estimate(Some("Overcast clouds throughout")), 95.0);
        assert_eq!(estimator.estimate(Some("Partly cloudy skies")), 55.0);
        assert_eq!(estimator.estimate(Some("Mostly sunny")), 80.0);
        assert_eq!(estimator.estimate(Some("Hazy")), 50.0);
    }

    #[test]
    fn test_precedence_order() {
        let estimator = CloudEstimator::new();

        assert_eq!(estimator.estimate(Some("Mostly Cloudy")), 80.0);
        assert_eq!(estimator.estimate(Some("Cloudy")), 70.0);
        assert_eq!(estimator.estimate(Some("Foggy")), 85.0);
        assert_eq!(estimator.estimate(Some("Clear")), 15.0);
        assert_eq!(estimator.estimate(Some("SUNNY")), 15.0);
        // "cloud" is checked before "fog"
        assert_eq!(estimator.estimate(Some("Fog and low clouds")), 70.0);
    }

    #[test]
    fn test_fallback_overrides() {
        let estimator = CloudEstimator::new().with_fallback(60.0);

        assert_eq!(estimator.estimate(Some("Breezy")), 60.0);
        assert_eq!(estimator.estimate(None), 60.0);
        assert_eq!(estimator.estimate_with_fallback(Some("Hazy"), 42.0), 42.0);
        assert_eq!(estimator.classify(Some("Hazy")), None);
    }

    #[test]
    fn test_custom_rules_are_evaluated_in_given_order() {
        let estimator = CloudEstimator::with_rules(vec![
            KeywordRule::new(&["Haze"], 30.0),
            KeywordRule::new(&["hazy"], 99.0),
        ]);

        assert_eq!(estimator.estimate(Some("hazy haze")), 30.0);
        assert_eq!(estimator.estimate(Some("Hazy")), 99.0);
    }
}
