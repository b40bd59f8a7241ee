//! Leaderboard settings
//!
//! Settings are read from YAML with snake_case keys. Every field has a default,
//! so an empty document is a valid configuration:
//!
//! ```yaml
//! server_url: http://example.com:8772/api/live-timings/leaderboard.json
//! participants_csv_url: ""
//! pace_percent_threshold: 107
//! refresh_interval_secs: 300
//! car_classes:
//!   - name: GT3
//!     patterns: [GT3]
//!   - name: Silver
//!     patterns: [SUPER-PRODUCTION]
//! ```
//!
//! Loading is lenient where the value has an obvious fallback: an out-of-range
//! pace threshold becomes the default and class rules are deduplicated.
//! [`Settings::validate`] is strict and reports what an editor should reject.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::matching::MatchMode;
use crate::transform::DEFAULT_PACE_PERCENT_THRESHOLD;
use crate::types::CarClassRule;
use crate::{Result, TimingError};

/// Lowest accepted pace threshold.
pub const MIN_PACE_PERCENT_THRESHOLD: u32 = 101;

/// Highest accepted pace threshold.
pub const MAX_PACE_PERCENT_THRESHOLD: u32 = 115;

/// Default refresh period of the leaderboard feed.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Live timings leaderboard endpoint
    pub server_url: String,
    /// Ordered class rules; first match wins
    pub car_classes: Vec<CarClassRule>,
    /// Roster export; blank disables registration matching
    pub participants_csv_url: String,
    #[serde(deserialize_with = "deserialize_threshold")]
    pub pace_percent_threshold: u32,
    pub refresh_interval_secs: u64,
    /// Explicit match mode; derived from `car_classes` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_by_driver_name_only: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            car_classes: Vec::new(),
            participants_csv_url: String::new(),
            pace_percent_threshold: DEFAULT_PACE_PERCENT_THRESHOLD,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            match_by_driver_name_only: None,
        }
    }
}

impl Settings {
    /// Parse settings from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let settings: Settings = serde_yaml_ng::from_str(yaml)?;
        Ok(settings.normalized())
    }

    /// Read settings from a YAML file.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading settings from {}", path.display());

        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| TimingError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Trim URLs and deduplicate class rules.
    pub fn normalized(mut self) -> Self {
        self.server_url = self.server_url.trim().to_string();
        self.participants_csv_url = self.participants_csv_url.trim().to_string();
        self.car_classes = dedupe_car_class_rules(self.car_classes);
        self
    }

    /// Check every field an editor would reject.
    pub fn validate(&self) -> Result<()> {
        validate_required_http_url(&self.server_url)?;
        validate_optional_http_url(&self.participants_csv_url)?;
        validate_pace_percent_threshold(&self.pace_percent_threshold.to_string())?;

        if self.refresh_interval_secs == 0 {
            return Err(TimingError::invalid_setting("refresh_interval_secs", "must be at least one second"));
        }
        Ok(())
    }

    /// Registration match mode.
    ///
    /// Without class rules every car is `Other`, so class matching would reject
    /// everyone; name-only is used unless the mode was set explicitly.
    pub fn match_mode(&self) -> MatchMode {
        let name_only = self.match_by_driver_name_only.unwrap_or(self.car_classes.is_empty());
        MatchMode::from_name_only(name_only)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    /// Class rules in the editable text form.
    pub fn car_classes_text(&self) -> String {
        format_car_classes(&self.car_classes)
    }

    pub fn set_car_classes_text(&mut self, text: &str) {
        self.car_classes = parse_car_classes(text);
    }
}

fn deserialize_threshold<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml_ng::Value>::deserialize(deserializer)?;
    let numeric = match &value {
        Some(serde_yaml_ng::Value::Number(number)) => number.as_f64(),
        Some(serde_yaml_ng::Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    let threshold = numeric.map_or(DEFAULT_PACE_PERCENT_THRESHOLD, normalize_threshold_value);
    if numeric.is_none() && value.is_some() {
        warn!("Ignoring non-numeric pace threshold, using {}", threshold);
    }
    Ok(threshold)
}

/// Clamp an untrusted threshold into the accepted range.
///
/// Non-finite values and values that round outside
/// [`MIN_PACE_PERCENT_THRESHOLD`]..=[`MAX_PACE_PERCENT_THRESHOLD`] become the
/// default.
pub fn normalize_threshold_value(value: f64) -> u32 {
    if !value.is_finite() {
        return DEFAULT_PACE_PERCENT_THRESHOLD;
    }

    let rounded = value.round();
    if rounded < f64::from(MIN_PACE_PERCENT_THRESHOLD) || rounded > f64::from(MAX_PACE_PERCENT_THRESHOLD) {
        return DEFAULT_PACE_PERCENT_THRESHOLD;
    }
    rounded as u32
}

/// Validate threshold text as typed by a user.
pub fn validate_pace_percent_threshold(value: &str) -> Result<u32> {
    const FIELD: &str = "pace_percent_threshold";

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TimingError::invalid_setting(FIELD, "threshold is required"));
    }

    let threshold: i64 = trimmed
        .parse()
        .map_err(|_| TimingError::invalid_setting(FIELD, "threshold must be an integer"))?;

    let range = i64::from(MIN_PACE_PERCENT_THRESHOLD)..=i64::from(MAX_PACE_PERCENT_THRESHOLD);
    if !range.contains(&threshold) {
        return Err(TimingError::invalid_setting(
            FIELD,
            format!("threshold must be between {MIN_PACE_PERCENT_THRESHOLD} and {MAX_PACE_PERCENT_THRESHOLD}"),
        ));
    }

    Ok(threshold as u32)
}

/// Validate a URL that must be present.
pub fn validate_required_http_url(value: &str) -> Result<Url> {
    match validate_optional_http_url(value)? {
        Some(url) => Ok(url),
        None => Err(TimingError::invalid_url(value, "URL is required")),
    }
}

/// Validate a URL that may be blank.
///
/// Returns `None` for blank input.
pub fn validate_optional_http_url(value: &str) -> Result<Option<Url>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let url = Url::parse(trimmed).map_err(|e| TimingError::invalid_url(trimmed, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(Some(url)),
        scheme => Err(TimingError::invalid_url(trimmed, format!("unsupported scheme '{scheme}', use http or https"))),
    }
}

/// Parse class rules from text, one `Name: pattern, pattern` rule per line.
///
/// A line without a colon is both the class name and its only pattern. A rule
/// without patterns matches on its own name. The result is deduplicated.
pub fn parse_car_classes(text: &str) -> Vec<CarClassRule> {
    let rules = text.lines().map(str::trim).filter(|line| !line.is_empty()).map(|line| {
        let Some((name, patterns)) = line.split_once(':') else {
            return CarClassRule::new(line, [line]);
        };

        let name = name.trim();
        let patterns: Vec<&str> = patterns.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
        if patterns.is_empty() { CarClassRule::new(name, [name]) } else { CarClassRule::new(name, patterns) }
    });

    dedupe_car_class_rules(rules)
}

/// Render class rules back into their text form.
pub fn format_car_classes(rules: &[CarClassRule]) -> String {
    rules.iter().map(|rule| format!("{}: {}", rule.name, rule.patterns.join(", "))).collect::<Vec<_>>().join("\n")
}

/// Drop unnamed and repeated rules and repeated patterns.
///
/// Names and patterns compare case-insensitively; the first occurrence wins
/// and keeps its original spelling.
pub fn dedupe_car_class_rules<I>(rules: I) -> Vec<CarClassRule>
where
    I: IntoIterator<Item = CarClassRule>,
{
    let mut names = HashSet::new();
    let mut output = Vec::new();

    for rule in rules {
        let name = rule.name.trim();
        if name.is_empty() || !names.insert(name.to_lowercase()) {
            continue;
        }

        let mut seen = HashSet::new();
        let patterns: Vec<String> = rule
            .patterns
            .iter()
            .map(|pattern| pattern.trim())
            .filter(|pattern| !pattern.is_empty() && seen.insert(pattern.to_lowercase()))
            .map(str::to_string)
            .collect();

        if patterns.is_empty() {
            output.push(CarClassRule::new(name, [name]));
        } else {
            output.push(CarClassRule::new(name, patterns));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let settings = Settings::from_yaml_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.pace_percent_threshold, 107);
        assert_eq!(settings.refresh_interval(), Duration::from_secs(300));
    }

    #[test]
    fn parses_full_document() {
        let yaml = r#"
server_url: " http://example.com:8772/api/live-timings/leaderboard.json "
participants_csv_url: https://example.com/roster.csv
pace_percent_threshold: 110
refresh_interval_secs: 60
car_classes:
  - name: GT3
    patterns: [GT3, gt3, " "]
  - name: gt3
    patterns: [R8]
  - name: Silver
    patterns: []
"#;
        let settings = Settings::from_yaml_str(yaml).unwrap();

        assert_eq!(settings.server_url, "http://example.com:8772/api/live-timings/leaderboard.json");
        assert_eq!(settings.pace_percent_threshold, 110);
        assert_eq!(settings.refresh_interval(), Duration::from_secs(60));
        assert_eq!(
            settings.car_classes,
            vec![CarClassRule::new("GT3", ["GT3"]), CarClassRule::new("Silver", ["Silver"])]
        );
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn out_of_range_threshold_falls_back_to_default() {
        for raw in ["150", "100", "abc", "~", "\".inf\"", "120.4"] {
            let settings = Settings::from_yaml_str(&format!("pace_percent_threshold: {raw}")).unwrap();
            assert_eq!(settings.pace_percent_threshold, 107, "input {raw}");
        }

        let settings = Settings::from_yaml_str("pace_percent_threshold: 104.6").unwrap();
        assert_eq!(settings.pace_percent_threshold, 105);
        let settings = Settings::from_yaml_str("pace_percent_threshold: \"112\"").unwrap();
        assert_eq!(settings.pace_percent_threshold, 112);
    }

    #[test]
    fn normalizes_threshold_values() {
        assert_eq!(normalize_threshold_value(101.0), 101);
        assert_eq!(normalize_threshold_value(115.4), 115);
        assert_eq!(normalize_threshold_value(115.6), 107);
        assert_eq!(normalize_threshold_value(f64::NAN), 107);
        assert_eq!(normalize_threshold_value(f64::INFINITY), 107);
    }

    #[test]
    fn validates_threshold_text() {
        assert_eq!(validate_pace_percent_threshold(" 105 ").unwrap(), 105);
        assert!(validate_pace_percent_threshold("").is_err());
        assert!(validate_pace_percent_threshold("105.5").is_err());
        assert!(validate_pace_percent_threshold("100").is_err());
        assert!(validate_pace_percent_threshold("116").is_err());
    }

    #[test]
    fn validates_urls() {
        assert!(validate_optional_http_url("").unwrap().is_none());
        assert!(validate_optional_http_url("https://example.com/a.csv").unwrap().is_some());
        assert!(matches!(validate_optional_http_url("ftp://example.com"), Err(TimingError::InvalidUrl { .. })));
        assert!(validate_optional_http_url("not a url").is_err());
        assert!(validate_required_http_url("  ").is_err());
        assert!(validate_required_http_url("http://localhost:8772/").is_ok());
    }

    #[test]
    fn validate_rejects_missing_server_url() {
        let settings = Settings::default();
        assert!(matches!(settings.validate(), Err(TimingError::InvalidUrl { .. })));
    }

    #[test]
    fn match_mode_follows_class_rules_unless_explicit() {
        let mut settings = Settings::default();
        assert_eq!(settings.match_mode(), MatchMode::NameOnly);

        settings.car_classes = vec![CarClassRule::new("GT3", ["GT3"])];
        assert_eq!(settings.match_mode(), MatchMode::Strict);

        settings.match_by_driver_name_only = Some(true);
        assert_eq!(settings.match_mode(), MatchMode::NameOnly);

        settings.car_classes.clear();
        settings.match_by_driver_name_only = Some(false);
        assert_eq!(settings.match_mode(), MatchMode::Strict);
    }

    #[test]
    fn parses_car_class_text() {
        let rules = parse_car_classes("GT3: gt3, GT3 , r8\n\n  Silver  \nBronze:\ngt3: other\n: nameless");
        assert_eq!(
            rules,
            vec![
                CarClassRule::new("GT3", ["gt3", "r8"]),
                CarClassRule::new("Silver", ["Silver"]),
                CarClassRule::new("Bronze", ["Bronze"]),
            ]
        );
    }

    #[test]
    fn formats_car_class_text() {
        let rules = vec![CarClassRule::new("GT3", ["gt3", "r8"]), CarClassRule::new("Silver", ["Silver"])];
        let text = format_car_classes(&rules);
        assert_eq!(text, "GT3: gt3, r8\nSilver: Silver");
        assert_eq!(parse_car_classes(&text), rules);
    }

    #[tokio::test]
    async fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server_url: http://localhost:8772/leaderboard.json").unwrap();
        writeln!(file, "match_by_driver_name_only: false").unwrap();

        let settings = Settings::load(file.path()).await.unwrap();
        assert_eq!(settings.server_url, "http://localhost:8772/leaderboard.json");
        assert_eq!(settings.match_mode(), MatchMode::Strict);

        let yaml = settings.to_yaml().unwrap();
        assert_eq!(Settings::from_yaml_str(&yaml).unwrap(), settings);
    }

    #[tokio::test]
    async fn missing_file_is_file_error() {
        let err = Settings::load("/nonexistent/pitboard.yaml").await.unwrap_err();
        assert!(matches!(err, TimingError::File { .. }));
    }
}
