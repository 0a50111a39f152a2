// Copyright (c) 2024 Mike Tsao

//! A tokenizer for the line-oriented text formats (speaker layouts and
//! scripts). Both share the same shape: a command word, positional
//! arguments, and `KEY=value` fields, or a `key = value` assignment.

use crate::{error::ParseError, types::Position};
use once_cell::sync::Lazy;
use regex::Regex;

static ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)\s*=\s*(.*)$").expect("assignment pattern"));
static KEYED_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b([A-Z_][A-Z0-9_]*)=("[^"]*"|\S+)"#).expect("keyed field pattern")
});

/// One classified input line.
#[derive(Debug, PartialEq)]
pub(crate) enum Line {
    /// Empty or a `#` comment.
    Blank,
    /// `key = value`. The key is lowercased.
    Assignment { key: String, value: String },
    /// A command with arguments.
    Command(Directive),
}
impl Line {
    pub(crate) fn classify(raw: &str) -> Self {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            return Line::Blank;
        }
        if let Some(captures) = ASSIGNMENT.captures(line) {
            return Line::Assignment {
                key: captures[1].to_ascii_lowercase(),
                value: captures[2].trim().to_string(),
            };
        }
        Line::Command(Directive::parse(line))
    }
}

/// Drops a trailing `# comment`. A `#` only starts a comment at the start of
/// the line or after whitespace, and never inside double quotes.
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut previous = ' ';
    for (index, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes && previous.is_whitespace() => return &line[..index],
            _ => {}
        }
        previous = c;
    }
    line
}

/// A command line broken into its parts. Command and field names are
/// uppercased; values keep their case.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Directive {
    pub(crate) command: String,
    positional: Vec<String>,
    keyed: Vec<(String, String)>,
}
impl Directive {
    fn parse(line: &str) -> Self {
        let keyed = KEYED_FIELD
            .captures_iter(line)
            .map(|c| (c[1].to_ascii_uppercase(), c[2].to_string()))
            .collect();
        let remainder = KEYED_FIELD.replace_all(line, " ");
        let mut words = remainder.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_uppercase();
        Self {
            command,
            positional: words.map(str::to_string).collect(),
            keyed,
        }
    }

    fn missing(&self, field: &str) -> ParseError {
        ParseError::MissingField {
            command: self.command.clone(),
            field: field.to_string(),
        }
    }

    /// The raw value of a keyed field, with surrounding quotes removed.
    pub(crate) fn text(&self, key: &str) -> Option<&str> {
        self.keyed
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim_matches('"'))
    }

    pub(crate) fn positional(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    pub(crate) fn optional_f64(&self, key: &str) -> Result<Option<f64>, ParseError> {
        self.text(key).map(|v| parse_f64(key, v)).transpose()
    }

    pub(crate) fn required_f64(&self, key: &str) -> Result<f64, ParseError> {
        self.optional_f64(key)?.ok_or_else(|| self.missing(key))
    }

    pub(crate) fn optional_i64(&self, key: &str) -> Result<Option<i64>, ParseError> {
        self.text(key)
            .map(|v| {
                v.parse::<i64>().map_err(|_| ParseError::InvalidNumber {
                    field: key.to_string(),
                    value: v.to_string(),
                })
            })
            .transpose()
    }

    pub(crate) fn required_i64(&self, key: &str) -> Result<i64, ParseError> {
        self.optional_i64(key)?.ok_or_else(|| self.missing(key))
    }

    /// Like [Directive::required_i64()], but rejects negative values.
    pub(crate) fn required_count(&self, key: &str) -> Result<usize, ParseError> {
        let value = self.required_i64(key)?;
        usize::try_from(value).map_err(|_| ParseError::InvalidNumber {
            field: key.to_string(),
            value: value.to_string(),
        })
    }

    pub(crate) fn optional_point(&self, key: &str) -> Result<Option<Position>, ParseError> {
        self.text(key).map(parse_point).transpose()
    }

    pub(crate) fn required_point(&self, key: &str) -> Result<Position, ParseError> {
        self.optional_point(key)?.ok_or_else(|| self.missing(key))
    }

    /// Every positional argument that looks like a coordinate pair, in order.
    pub(crate) fn positional_points(&self) -> Result<Vec<Position>, ParseError> {
        self.positional
            .iter()
            .filter(|p| p.contains(','))
            .map(|p| parse_point(p))
            .collect()
    }
}

pub(crate) fn parse_f64(field: &str, value: &str) -> Result<f64, ParseError> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parses `x,y`.
pub(crate) fn parse_point(text: &str) -> Result<Position, ParseError> {
    let mut parts = text.split(',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(x), Some(y), None) => match (x.trim().parse::<f64>(), y.trim().parse::<f64>()) {
            (Ok(x), Ok(y)) if x.is_finite() && y.is_finite() => Ok(Position::new(x, y)),
            _ => Err(ParseError::InvalidCoordinates(text.to_string())),
        },
        _ => Err(ParseError::InvalidCoordinates(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(raw: &str) -> Directive {
        match Line::classify(raw) {
            Line::Command(d) => d,
            other => panic!("expected a command, got {other:?}"),
        }
    }

    #[test]
    fn classify() {
        assert_eq!(Line::classify("   "), Line::Blank);
        assert_eq!(Line::classify("# SOUND 0,0"), Line::Blank);
        assert_eq!(
            Line::classify("ITD_Exaggeration = 2.5"),
            Line::Assignment {
                key: "itd_exaggeration".to_string(),
                value: "2.5".to_string()
            }
        );
        assert!(matches!(Line::classify("sound 0,0 FREQ=1 AMP=1"), Line::Command(_)));
    }

    #[test]
    fn trailing_comments() {
        assert_eq!(
            Line::classify("tone_duration = 0.2   # longer bursts"),
            Line::Assignment {
                key: "tone_duration".to_string(),
                value: "0.2".to_string()
            }
        );
        let d = command("SOUND -0.06,-0.06 FREQ=200 AMP=0.5   # Bottom-left corner");
        assert_eq!(d.positional(1), None);

        let d = command(r#"SPEAKER A 0,0 CHANNEL=1 DESCRIPTION="bay #2" # note"#);
        assert_eq!(d.text("DESCRIPTION"), Some("bay #2"));
        assert_eq!(d.positional(2), None);
    }

    #[test]
    fn fields_and_positionals() {
        let d = command(r#"speaker LEFT -0.05,0 CHANNEL=3 DESCRIPTION="left edge""#);
        assert_eq!(d.command, "SPEAKER");
        assert_eq!(d.positional(0), Some("LEFT"));
        assert_eq!(d.positional(1), Some("-0.05,0"));
        assert_eq!(d.required_count("CHANNEL"), Ok(3));
        assert_eq!(d.text("DESCRIPTION"), Some("left edge"));
        assert_eq!(d.positional_points().unwrap(), vec![Position::new(-0.05, 0.0)]);
    }

    #[test]
    fn longer_keys_do_not_shadow_shorter_ones() {
        let d = command("FREQ_RAMP POS=0,0 START_FREQ=100 END_FREQ=300 DURATION=1 STEPS=4 AMP=0.5");
        assert_eq!(d.required_f64("START_FREQ"), Ok(100.0));
        assert_eq!(d.required_f64("END_FREQ"), Ok(300.0));
        assert!(d.text("FREQ").is_none());
        assert_eq!(d.required_point("POS"), Ok(Position::new(0.0, 0.0)));
        assert!(d.positional_points().unwrap().is_empty());
    }

    #[test]
    fn errors() {
        let d = command("SOUND 0,0 FREQ=abc STEPS=-2");
        assert_eq!(
            d.required_f64("FREQ"),
            Err(ParseError::InvalidNumber {
                field: "FREQ".to_string(),
                value: "abc".to_string()
            })
        );
        assert_eq!(
            d.required_f64("AMP"),
            Err(ParseError::MissingField {
                command: "SOUND".to_string(),
                field: "AMP".to_string()
            })
        );
        assert_eq!(d.required_i64("STEPS"), Ok(-2));
        assert!(d.required_count("STEPS").is_err());
        assert!(parse_point("1,2,3").is_err());
        assert!(parse_point("x,2").is_err());
    }
}
