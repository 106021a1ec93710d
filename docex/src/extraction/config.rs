//! Configuration for the extraction pipeline.

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for the extraction pipeline and its retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Model identifier passed to the gateway (default: `gpt-4o-mini`).
    pub model: String,
    /// Sampling temperature for every gateway call (default: 0.0).
    pub temperature: f32,
    /// Attempts shared by classification, extraction and validation (default: 2).
    pub max_attempts: usize,
    /// Characters taken from each end of the document for classification (default: 200).
    pub excerpt_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            max_attempts: 2,
            excerpt_chars: 200,
        }
    }
}

impl ExtractionConfig {
    /// Set the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the attempt budget. Values below one are raised to one.
    #[must_use]
    pub fn with_max_attempts(mut self, max: usize) -> Self {
        self.max_attempts = max.max(1);
        self
    }

    /// Set how many characters of each end of the document the classifier sees.
    #[must_use]
    pub const fn with_excerpt_chars(mut self, chars: usize) -> Self {
        self.excerpt_chars = chars;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.excerpt_chars, 200);
        assert!(config.temperature.abs() < f32::EPSILON);
    }

    #[test]
    fn test_max_attempts_never_zero() {
        let config = ExtractionConfig::default().with_max_attempts(0);
        assert_eq!(config.max_attempts, 1);
    }
}
