use super::{Config, ConfigError};

fn invalid(key: &str, value: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.into(),
    }
}

impl Config {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let thresholds = &self.thresholds;
        if !(thresholds.low_ctr > 0.0 && thresholds.low_ctr <= 1.0) {
            return Err(invalid(
                "low_ctr",
                format!("{} must be a fraction in (0, 1]", thresholds.low_ctr),
            ));
        }
        if !thresholds.low_roas.is_finite() || thresholds.low_roas < 0.0 {
            return Err(invalid(
                "low_roas",
                format!("{} must not be negative", thresholds.low_roas),
            ));
        }
        if !thresholds.min_spend.is_finite() || thresholds.min_spend < 0.0 {
            return Err(invalid(
                "min_spend",
                format!("{} must not be negative", thresholds.min_spend),
            ));
        }

        let min_confidence = self.agents.min_confidence;
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(invalid(
                "min_confidence",
                format!("{min_confidence} must be between 0.0 and 1.0"),
            ));
        }

        if self.llm.timeout_secs < 5 {
            return Err(invalid("timeout_secs", "must be at least 5 seconds"));
        }
        if self.llm.timeout_secs > 3600 {
            return Err(invalid(
                "timeout_secs",
                "exceeds maximum limit of 3600 seconds (1 hour)",
            ));
        }

        if self.model.name.trim().is_empty() {
            return Err(invalid("model", "must not be empty"));
        }

        for (name, settings) in [("groq", &self.llm.groq), ("openai", &self.llm.openai)] {
            if let Some(url) = &settings.base_url
                && !(url.starts_with("https://") || url.starts_with("http://"))
            {
                return Err(invalid(
                    &format!("llm.{name}.base_url"),
                    format!("'{url}' is not an http(s) URL"),
                ));
            }
        }

        Ok(())
    }
}
