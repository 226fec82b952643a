//! Reader for small sectioned configuration documents: a section title on its own
//! line, then `key: value, value, ...` lines. Evaluation sessions use it:
//!
//! ```text
//! evaluation
//!     max_iterations: 4096
//!     max_recursion_depth: 512
//! printing
//!     context: Global`
//!     context_path: System`, Custom`
//! logging
//!     loglevel: debug
//! ```
//!
//! Lines starting with `//`, `#`, `%` or `;` are comments.
use crate::symbolic::eval_errors::EvalError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, multispace0, space0},
    combinator::{map, recognize},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, preceded, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Display;

pub type DocumentMap = HashMap<String, SectionMap>;
pub type SectionMap = HashMap<String, Option<Vec<ConfigValue>>>;

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl ConfigValue {
    pub fn as_string(&self) -> Option<&String> {
        if let ConfigValue::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let ConfigValue::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let ConfigValue::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    // Try to convert to string representation
    pub fn to_string_value(&self) -> String {
        match self {
            ConfigValue::String(s) => s.clone(),
            ConfigValue::Float(f) => f.to_string(),
            ConfigValue::Integer(i) => i.to_string(),
            ConfigValue::Boolean(b) => b.to_string(),
        }
    }
}

impl Display for ConfigValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_value())
    }
}

/// identifier used for section titles and keys: a letter or `_` followed by word characters
fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0(alt((alphanumeric1, tag("_")))),
        )),
        String::from,
    )
    .parse(input)
}

/// section title; swallows the whitespace after it
fn parse_title(input: &str) -> IResult<&str, String> {
    let (rest, title) = identifier(input)?;
    Ok((rest.trim(), title))
}

fn parse_key(input: &str) -> IResult<&str, String> {
    identifier(input)
}

fn classify(token: &str) -> ConfigValue {
    let token = token.trim();
    if let Ok(i) = token.parse::<i64>() {
        ConfigValue::Integer(i)
    } else if let Ok(x) = token.parse::<f64>() {
        ConfigValue::Float(x)
    } else if let Ok(b) = token.parse::<bool>() {
        ConfigValue::Boolean(b)
    } else {
        ConfigValue::String(token.to_string())
    }
}

/// one value: everything up to a separator or whitespace
fn parse_value(input: &str) -> IResult<&str, ConfigValue> {
    map(
        take_while1(|c: char| !matches!(c, ',' | ';') && !c.is_whitespace()),
        classify,
    )
    .parse(input)
}

fn parse_value_list(input: &str) -> IResult<&str, Vec<ConfigValue>> {
    preceded(
        space0,
        separated_list0(delimited(space0, tag(","), space0), parse_value),
    )
    .parse(input)
}

fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<ConfigValue>)> {
    let (rest, entry) = separated_pair(
        parse_key,
        delimited(space0, tag(":"), space0),
        parse_value_list,
    )
    .parse(input)?;
    Ok((rest.trim(), entry))
}

/// title followed by at least one `key: values` line
fn parse_section(input: &str) -> IResult<&str, (String, SectionMap)> {
    let (rest, (title, entries)) = pair(
        terminated(preceded(space0, parse_title), multispace0),
        many1(terminated(parse_key_value_pair, space0)),
    )
    .parse(input)?;
    let section = entries
        .into_iter()
        .map(|(key, values)| (key, Some(values)))
        .collect();
    Ok((rest, (title, section)))
}

fn is_comment(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || ["//", "#", "%", ";"].iter().any(|mark| line.starts_with(mark))
}

fn strip_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| !is_comment(line))
        .collect::<Vec<&str>>()
        .join("\n")
}

fn parse_sections(input: &str) -> IResult<&str, DocumentMap> {
    let (rest, sections) = many1(delimited(space0, parse_section, multispace0)).parse(input)?;
    Ok((rest, sections.into_iter().collect()))
}

/// Parses the entire document into a HashMap. Missing titles/keys of the optional
/// template are inserted with `None`.
pub fn parse_document(input: &str, template: Option<&DocumentMap>) -> Result<DocumentMap, EvalError> {
    let filtered = strip_comments(input);
    if filtered.trim().is_empty() {
        return Ok(fill_template(HashMap::new(), template));
    }
    match parse_sections(filtered.trim()) {
        Ok((remaining, parsed)) => {
            if !remaining.trim().is_empty() {
                return Err(EvalError::Config(format!(
                    "Failed to parse entire document. Remaining: '{}'",
                    remaining
                )));
            }
            Ok(fill_template(parsed, template))
        }
        Err(e) => Err(EvalError::Config(format!("Parsing error: {:?}", e))),
    }
}

fn fill_template(mut parsed: DocumentMap, template: Option<&DocumentMap>) -> DocumentMap {
    if let Some(template) = template {
        for (title, keys_map) in template {
            let section_map = parsed.entry(title.clone()).or_default();
            for key in keys_map.keys() {
                section_map.entry(key.clone()).or_insert(None);
            }
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title_and_key() {
        let (remaining, title) = parse_title("evaluation\n max_iterations: 10").unwrap();
        assert_eq!(title, "evaluation");
        assert_eq!(remaining, "max_iterations: 10");

        let (remaining, key) = parse_key("context_path: System`").unwrap();
        assert_eq!(key, "context_path");
        assert_eq!(remaining, ": System`");
    }

    #[test]
    fn test_parse_value() {
        let (remaining, value) = parse_value("Global`, System`").unwrap();
        assert_eq!(value, ConfigValue::String("Global`".to_string()));
        assert_eq!(remaining, ", System`");

        let (_, value) = parse_value("4096").unwrap();
        assert_eq!(value, ConfigValue::Integer(4096));

        let (_, value) = parse_value("true").unwrap();
        assert_eq!(value, ConfigValue::Boolean(true));
    }

    #[test]
    fn test_parse_document_with_comments() {
        let doc = "# session settings\n\
                   evaluation\n\
                   max_iterations: 100\n\
                   max_recursion_depth: 64\n\
                   // printing options\n\
                   printing\n\
                   context_path: System`, Custom`\n";
        let parsed = parse_document(doc, None).unwrap();
        let evaluation = &parsed["evaluation"];
        assert_eq!(
            evaluation["max_iterations"],
            Some(vec![ConfigValue::Integer(100)])
        );
        assert_eq!(
            parsed["printing"]["context_path"],
            Some(vec![
                ConfigValue::String("System`".to_string()),
                ConfigValue::String("Custom`".to_string())
            ])
        );
    }

    #[test]
    fn test_template_fills_missing_keys() {
        let mut template = DocumentMap::new();
        let mut logging = SectionMap::new();
        logging.insert("loglevel".to_string(), None);
        template.insert("logging".to_string(), logging);

        let parsed = parse_document("evaluation\n max_iterations: 5", Some(&template)).unwrap();
        assert_eq!(parsed["logging"]["loglevel"], None);
        assert!(parsed.contains_key("evaluation"));
    }

    #[test]
    fn test_malformed_document() {
        let result = parse_document("evaluation\n max_iterations 5", None);
        assert!(matches!(result, Err(EvalError::Config(_))));
    }
}
