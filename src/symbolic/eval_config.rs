//! Tunables of an evaluation session, read from a task document:
//!
//! ```text
//! evaluation
//!     max_iterations: 4096
//!     max_recursion_depth: 512
//! printing
//!     context: Global`
//!     context_path: System`
//! logging
//!     loglevel: info
//!     log_file: session.txt
//! ```
use crate::Utils::task_parser::{ConfigValue, parse_document};
use crate::symbolic::eval_errors::EvalError;
use crate::symbolic::symbolic_engine::{GLOBAL_CONTEXT, SYSTEM_CONTEXT};
use log::warn;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq)]
pub struct EvalConfig {
    /// fixed-point iterations per node before the current form is returned
    pub max_iterations: usize,
    /// nesting depth before an expression is returned unevaluated
    pub max_recursion_depth: usize,
    pub context: String,
    pub context_path: Vec<String>,
    pub loglevel: String,
    pub log_file: Option<String>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_iterations: 4096,
            max_recursion_depth: 512,
            context: GLOBAL_CONTEXT.to_string(),
            context_path: vec![SYSTEM_CONTEXT.to_string()],
            loglevel: "info".to_string(),
            log_file: None,
        }
    }
}

fn single_value<'a>(key: &str, values: &'a [ConfigValue]) -> Result<&'a ConfigValue, EvalError> {
    match values {
        [value] => Ok(value),
        _ => Err(EvalError::Config(format!(
            "key {} expects exactly one value, got {}",
            key,
            values.len()
        ))),
    }
}

fn positive_count(key: &str, values: &[ConfigValue]) -> Result<usize, EvalError> {
    let value = single_value(key, values)?;
    match value.as_integer() {
        Some(n) if n > 0 => Ok(n as usize),
        _ => Err(EvalError::Config(format!(
            "key {} expects a positive integer, got {}",
            key, value
        ))),
    }
}

fn text(key: &str, values: &[ConfigValue]) -> Result<String, EvalError> {
    Ok(single_value(key, values)?.to_string_value())
}

impl EvalConfig {
    /// Reads a configuration document. Missing keys keep their defaults.
    pub fn parse(document: &str) -> Result<EvalConfig, EvalError> {
        let parsed = parse_document(document, None)?;
        let mut config = EvalConfig::default();
        for (section, keys) in parsed.iter() {
            for (key, values) in keys.iter() {
                let values = values.as_deref().unwrap_or(&[]);
                match (section.as_str(), key.as_str()) {
                    ("evaluation", "max_iterations") => {
                        config.max_iterations = positive_count(key, values)?
                    }
                    ("evaluation", "max_recursion_depth") => {
                        config.max_recursion_depth = positive_count(key, values)?
                    }
                    ("printing", "context") => config.context = text(key, values)?,
                    ("printing", "context_path") => {
                        config.context_path =
                            values.iter().map(ConfigValue::to_string_value).collect()
                    }
                    ("logging", "loglevel") => config.loglevel = text(key, values)?,
                    ("logging", "log_file") => config.log_file = Some(text(key, values)?),
                    _ => warn!("ignoring unknown configuration key {}.{}", section, key),
                }
            }
        }
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<EvalConfig, EvalError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            EvalError::Config(format!("cannot read {}: {}", path.as_ref().display(), e))
        })?;
        EvalConfig::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.max_iterations, 4096);
        assert_eq!(config.max_recursion_depth, 512);
        assert_eq!(config.context, "Global`");
        assert_eq!(config.context_path, vec!["System`".to_string()]);
        assert_eq!(config.loglevel, "info");
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn test_parse_overrides() {
        let doc = "evaluation\n\
                   max_iterations: 10\n\
                   printing\n\
                   context: Work`\n\
                   context_path: System`, Global`\n\
                   logging\n\
                   loglevel: debug\n";
        let config = EvalConfig::parse(doc).unwrap();
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.max_recursion_depth, 512);
        assert_eq!(config.context, "Work`");
        assert_eq!(
            config.context_path,
            vec!["System`".to_string(), "Global`".to_string()]
        );
        assert_eq!(config.loglevel, "debug");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = EvalConfig::parse("plotting\n width: 3").unwrap();
        assert_eq!(config, EvalConfig::default());
    }

    #[test]
    fn test_bad_values() {
        let negative = EvalConfig::parse("evaluation\n max_iterations: -3");
        assert!(matches!(negative, Err(EvalError::Config(_))));
        let two = EvalConfig::parse("evaluation\n max_recursion_depth: 3, 4");
        assert!(matches!(two, Err(EvalError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# session").unwrap();
        writeln!(file, "evaluation").unwrap();
        writeln!(file, "    max_recursion_depth: 64").unwrap();
        writeln!(file, "logging").unwrap();
        writeln!(file, "    log_file: session.txt").unwrap();
        let config = EvalConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_recursion_depth, 64);
        assert_eq!(config.log_file, Some("session.txt".to_string()));
    }

    #[test]
    fn test_missing_file() {
        let result = EvalConfig::from_file("/nonexistent/dir/session.cfg");
        assert!(matches!(result, Err(EvalError::Config(_))));
    }
}
