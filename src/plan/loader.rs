//! Plan file and environment loading
//!
//! A plan file is a JSON object with any subset of the `PlanConfig` fields;
//! missing fields fall back to the published offering.

use std::env;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, info};

use super::PlanConfig;
use crate::error::LoadError;

/// Default plan file location
pub const DEFAULT_PLAN_PATH: &str = "data/plan.json";

/// Load a plan from a JSON file and validate it
pub fn load_plan_file<P: AsRef<Path>>(path: P) -> Result<PlanConfig, LoadError> {
    let path = path.as_ref();
    info!("Loading plan terms from {}", path.display());
    let file = File::open(path)?;
    load_plan_from_reader(BufReader::new(file))
}

/// Load a plan from any reader (e.g., request body, string buffer)
pub fn load_plan_from_reader<R: Read>(reader: R) -> Result<PlanConfig, LoadError> {
    let config: PlanConfig = serde_json::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}

/// Overlay `MONTHLY_RATE`, `TERM_MONTHS`, `LOCK_IN_MONTHS`,
/// `EARLY_WITHDRAWAL_PENALTY_RATE` and `PERFORMANCE_BONUS_RATE`
pub fn apply_env_overrides(config: PlanConfig) -> Result<PlanConfig, LoadError> {
    apply_overrides(config, |key| env::var(key).ok())
}

fn apply_overrides<F>(mut config: PlanConfig, lookup: F) -> Result<PlanConfig, LoadError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = parse_var(&lookup, "MONTHLY_RATE")? {
        config.monthly_rate = v;
    }
    if let Some(v) = parse_var(&lookup, "TERM_MONTHS")? {
        config.term_months = v;
    }
    if let Some(v) = parse_var(&lookup, "LOCK_IN_MONTHS")? {
        config.lock_in_months = v;
    }
    if let Some(v) = parse_var(&lookup, "EARLY_WITHDRAWAL_PENALTY_RATE")? {
        config.early_withdrawal_penalty_rate = v;
    }
    if let Some(v) = parse_var(&lookup, "PERFORMANCE_BONUS_RATE")? {
        config.performance_bonus_rate = v;
    }

    config.validate()?;
    Ok(config)
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, LoadError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => {
            debug!("Plan override {}={}", key, raw);
            raw.trim().parse().map(Some).map_err(|_| LoadError::InvalidOverride {
                key: key.to_string(),
                value: raw,
            })
        }
    }
}

/// Resolve the plan used by the binaries: file if given, defaults otherwise,
/// then environment overrides on top.
pub fn resolve_plan(path: Option<&Path>) -> Result<PlanConfig, LoadError> {
    let base = match path {
        Some(p) => load_plan_file(p)?,
        None => PlanConfig::default(),
    };
    apply_env_overrides(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_plan_file_uses_defaults() {
        let json = r#"{ "monthly_rate": 0.02, "term_months": 7, "lock_in_months": 3 }"#;
        let config = load_plan_from_reader(json.as_bytes()).unwrap();

        assert_eq!(config.term_months, 7);
        assert_eq!(config.lock_in_months, 3);
        assert!((config.monthly_rate - 0.02).abs() < 1e-12);
        assert!((config.early_withdrawal_penalty_rate - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_plan_file_is_validated() {
        let json = r#"{ "term_months": 6, "lock_in_months": 9 }"#;
        let err = load_plan_from_reader(json.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));

        let json = r#"{ "term_months": 6.5 }"#;
        assert!(matches!(load_plan_from_reader(json.as_bytes()), Err(LoadError::Json(_))));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> =
            [("MONTHLY_RATE", "0.03"), ("LOCK_IN_MONTHS", "4")].into_iter().collect();
        let config = apply_overrides(PlanConfig::default(), |k| {
            vars.get(k).map(|v| v.to_string())
        })
        .unwrap();

        assert!((config.monthly_rate - 0.03).abs() < 1e-12);
        assert_eq!(config.lock_in_months, 4);
        assert_eq!(config.term_months, 13);
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let result = apply_overrides(PlanConfig::default(), |k| {
            (k == "TERM_MONTHS").then(|| "thirteen".to_string())
        });
        match result {
            Err(LoadError::InvalidOverride { key, value }) => {
                assert_eq!(key, "TERM_MONTHS");
                assert_eq!(value, "thirteen");
            }
            other => panic!("expected InvalidOverride, got {:?}", other),
        }

        let result = apply_overrides(PlanConfig::default(), |k| {
            (k == "LOCK_IN_MONTHS").then(|| "20".to_string())
        });
        assert!(matches!(result, Err(LoadError::Invalid(_))));
    }
}
