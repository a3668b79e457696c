//! Metric/unit extraction from pivoted headers.

use regex::Regex;

/// Splits header text into a metric name and trailing unit annotation.
#[derive(Debug, Clone)]
pub struct UnitSplitter {
    pattern: Regex,
}

impl UnitSplitter {
    /// Compiles a pattern with `metric` and `unit` named groups.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// `"Nitrogen (mg/kg)"` → `("Nitrogen", "mg/kg")`; `"pH"` → `("pH", "")`.
    ///
    /// A header that is nothing but an annotation keeps its full text as the
    /// metric so no measurement ends up nameless.
    pub fn split(&self, header: &str) -> (String, String) {
        let trimmed = header.trim();
        let Some(caps) = self.pattern.captures(trimmed) else {
            return (trimmed.to_string(), String::new());
        };
        let metric = caps.name("metric").map_or("", |m| m.as_str().trim());
        let unit = caps.name("unit").map_or("", |m| m.as_str().trim());
        if metric.is_empty() {
            return (trimmed.to_string(), String::new());
        }
        (metric.to_string(), unit.to_string())
    }
}
