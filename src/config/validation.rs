//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for PipelineConfig.
///
/// Maintained by hand against pipeline_config.rs; a new field there needs
/// an entry here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [paths]
        "paths",
        "paths.data_root",
        "paths.statistics_dir",
        "paths.log_file",
        // [encounters]
        "encounters",
        "encounters.names",
        "encounters.primary_dir",
        "encounters.secondary_dir",
        // [binning]
        "binning",
        "binning.bin_width",
        "binning.lower_bound",
        "binning.max_domain",
        "binning.ceiling",
        "binning.ceiling_boundary",
        "binning.distance_label",
        "binning.restrict_to_ceiling",
        "binning.file_prefix",
        // [averaging]
        "averaging",
        "averaging.window_secs",
        // [quality]
        "quality",
        "quality.sentinel",
        "quality.secondary_bad_bits",
        "quality.fov_threshold_index",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_len = a.len();
    let b_len = b.len();
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist <= 3 {
            if let Some((_, best_dist)) = best {
                if dist < best_dist {
                    best = Some((k, dist));
                }
            } else {
                best = Some((k, dist));
            }
        }
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Never fails on unknown keys, only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    let found = walk_toml_keys(&value, "");
    let mut warnings = Vec::new();

    for key in &found {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(key, &known);
            let message = format!("Unknown config key '{key}'");
            warnings.push(ValidationWarning {
                field: key.clone(),
                message,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Typical longest cadence-averaging window before profiles smear (seconds)
const MAX_TYPICAL_WINDOW_SECS: f64 = 600.0;

/// Validate physical ranges on a parsed PipelineConfig.
///
/// Returns (errors, warnings). Errors are values that make the reduction
/// meaningless; warnings are suspicious but runnable.
pub fn validate_physical_ranges(
    config: &super::PipelineConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let b = &config.binning;

    // Heliocentric distance is never negative
    if b.lower_bound < 0.0 {
        errors.push(format!(
            "binning.lower_bound = {:.3} cannot be negative (distances are heliocentric)",
            b.lower_bound
        ));
    }

    // Fill values are large negative numbers; a non-negative threshold
    // would reject ordinary measurements
    if config.quality.sentinel >= 0.0 {
        errors.push(format!(
            "quality.sentinel = {:e} must be negative",
            config.quality.sentinel
        ));
    }

    // A bin wider than the whole ceiling range yields a single bin
    if b.bin_width > 0.0 && b.bin_width > b.ceiling - b.lower_bound {
        warnings.push(ValidationWarning {
            field: "binning.bin_width".to_string(),
            message: format!(
                "bin_width = {} exceeds the binned range below the ceiling ({} Rs)",
                b.bin_width,
                b.ceiling - b.lower_bound
            ),
            suggestion: None,
        });
    }

    // The bin straddling the ceiling is handled by ceiling_boundary
    if b.bin_width > 0.0 {
        let n = (b.ceiling - b.lower_bound) / b.bin_width;
        if (n - n.round()).abs() > super::defaults::TILING_TOLERANCE * n.abs().max(1.0) {
            warnings.push(ValidationWarning {
                field: "binning.ceiling".to_string(),
                message: format!(
                    "ceiling = {} is not on a bin edge for bin_width = {}; the straddling bin follows ceiling_boundary",
                    b.ceiling, b.bin_width
                ),
                suggestion: None,
            });
        }
    }

    let w = config.averaging.window_secs;
    if w > MAX_TYPICAL_WINDOW_SECS {
        warnings.push(ValidationWarning {
            field: "averaging.window_secs".to_string(),
            message: format!(
                "window_secs = {w:.1} is unusually long (typical cadence windows are under {MAX_TYPICAL_WINDOW_SECS:.0} s)"
            ),
            suggestion: None,
        });
    }

    if config.quality.secondary_bad_bits.is_empty() {
        warnings.push(ValidationWarning {
            field: "quality.secondary_bad_bits".to_string(),
            message: "secondary_bad_bits is empty; no secondary samples are rejected by flag".to_string(),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("hello", "hello"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("celing", "ceiling"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [binning]
            bin_width = 0.5
            [averaging]
            window_secs = 10.0
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"binning".to_string()));
        assert!(keys.contains(&"binning.bin_width".to_string()));
        assert!(keys.contains(&"averaging.window_secs".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[binning]
bin_widht = 0.5
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].field.contains("bin_widht"));
        assert_eq!(warnings[0].suggestion.as_deref(), Some("binning.bin_width"));
    }

    #[test]
    fn test_all_valid_keys_produce_zero_warnings() {
        let toml_str = r#"
[paths]
data_root = "DATA"

[encounters]
names = ["encounter_7"]

[binning]
bin_width = 0.25
ceiling_boundary = "inclusive"
distance_label = "centre"

[quality]
secondary_bad_bits = [0, 1, 2]
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.is_empty(), "Expected 0 warnings, got: {:?}", warnings);
    }

    #[test]
    fn test_unknown_section_produces_warning() {
        let warnings = validate_unknown_keys("[plotting]\ncolour = \"red\"\n");
        assert!(warnings.iter().any(|w| w.field == "plotting"));
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_physical_range_defaults_clean() {
        let (errors, warnings) = validate_physical_ranges(&PipelineConfig::default());
        assert!(errors.is_empty(), "Defaults should produce no errors: {:?}", errors);
        assert!(warnings.is_empty(), "Defaults should produce no warnings: {:?}", warnings);
    }

    #[test]
    fn test_positive_sentinel_is_error() {
        let mut config = PipelineConfig::default();
        config.quality.sentinel = 0.0;
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("quality.sentinel")));
    }

    #[test]
    fn test_negative_lower_bound_is_error() {
        let mut config = PipelineConfig::default();
        config.binning.lower_bound = -5.0;
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("lower_bound")));
    }

    #[test]
    fn test_ceiling_off_bin_edge_warns() {
        let mut config = PipelineConfig::default();
        config.binning.bin_width = 3.0;
        config.binning.max_domain = 99.0;
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.field == "binning.ceiling"));
    }

    #[test]
    fn test_long_window_warns() {
        let mut config = PipelineConfig::default();
        config.averaging.window_secs = 3600.0;
        let (_, warnings) = validate_physical_ranges(&config);
        assert!(warnings.iter().any(|w| w.field == "averaging.window_secs"));
    }
}
