//! Parser for inline decorator invocations.
//!
//! A prompt may open with any number of invocations, separated by
//! whitespace or newlines:
//!
//! ```text
//! +++Reasoning(depth=comprehensive)
//! +++OutputFormat@1.0.0(format="markdown")
//! +++StepByStep
//! Explain photosynthesis.
//! ```
//!
//! Argument values are `true`/`false`, numbers, `[a, b]` lists, quoted
//! strings, or bare words. Everything after the last invocation is the base
//! prompt.

use decorator_primitives::{Version, parse_version};
use serde_json::{Map, Number, Value};
use thiserror::Error;

const MARKER: &str = "+++";

/// Errors raised by [`parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// The text did not match the invocation grammar.
    #[error("malformed decorator invocation at byte {position}: {reason}")]
    Malformed {
        /// Byte offset of the problem.
        position: usize,
        /// What was expected.
        reason: String,
    },
    /// An argument list was opened but never closed.
    #[error("unterminated argument list for `{decorator}`")]
    UnterminatedArguments {
        /// Decorator whose arguments were open.
        decorator: String,
    },
    /// `@version` was not a semantic version.
    #[error("invalid version `{version}` for `{decorator}`")]
    InvalidVersion {
        /// Decorator being invoked.
        decorator: String,
        /// Supplied text.
        version: String,
    },
}

/// One `+++Name@version(args)` occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Decorator name as written.
    pub name: String,
    /// Version constraint, when given.
    pub version: Option<Version>,
    /// Raw argument values, unvalidated.
    pub parameters: Map<String, Value>,
}

/// A prompt split into its leading invocations and the remaining text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPrompt {
    /// Invocations in written order.
    pub invocations: Vec<Invocation>,
    /// Text after the invocations, with leading whitespace removed.
    pub prompt: String,
}

/// Splits leading decorator invocations from a prompt.
///
/// # Errors
///
/// Returns a [`SyntaxError`] describing the first malformed invocation.
pub fn parse(input: &str) -> Result<ParsedPrompt, SyntaxError> {
    let mut cursor = Cursor { input, pos: 0 };
    let mut invocations = Vec::new();

    loop {
        cursor.skip_whitespace();
        if !cursor.rest().starts_with(MARKER) {
            break;
        }
        cursor.pos += MARKER.len();
        invocations.push(cursor.invocation()?);
    }

    Ok(ParsedPrompt {
        invocations,
        prompt: cursor.rest().to_owned(),
    })
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let next = self.peek()?;
        self.pos += next.len_utf8();
        Some(next)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn skip_inline_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c == ' ' || c == '\t') {
            self.bump();
        }
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&accept) {
            self.bump();
        }
        &self.input[start..self.pos]
    }

    fn malformed(&self, reason: impl Into<String>) -> SyntaxError {
        SyntaxError::Malformed {
            position: self.pos,
            reason: reason.into(),
        }
    }

    fn invocation(&mut self) -> Result<Invocation, SyntaxError> {
        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        if name.is_empty() {
            return Err(self.malformed("expected a decorator name after `+++`"));
        }

        let version = if self.peek() == Some('@') {
            self.bump();
            let text = self.take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+'));
            let version = parse_version(text).map_err(|_| SyntaxError::InvalidVersion {
                decorator: name.to_owned(),
                version: text.to_owned(),
            })?;
            Some(version)
        } else {
            None
        };

        let parameters = if self.peek() == Some('(') {
            self.bump();
            self.arguments(name)?
        } else {
            Map::new()
        };

        Ok(Invocation {
            name: name.to_owned(),
            version,
            parameters,
        })
    }

    fn arguments(&mut self, decorator: &str) -> Result<Map<String, Value>, SyntaxError> {
        let unterminated = || SyntaxError::UnterminatedArguments {
            decorator: decorator.to_owned(),
        };
        let mut parameters = Map::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(unterminated()),
                Some(')') => {
                    self.bump();
                    return Ok(parameters);
                }
                Some(_) => {}
            }

            let key = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
            if key.is_empty() {
                return Err(self.malformed("expected a parameter name"));
            }
            self.skip_inline_whitespace();
            if self.bump() != Some('=') {
                return Err(self.malformed(format!("expected `=` after `{key}`")));
            }
            let value = self.value(decorator, &[',', ')'])?;
            parameters.insert(key.to_owned(), value);

            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(')') => {}
                None => return Err(unterminated()),
                Some(other) => {
                    return Err(self.malformed(format!("unexpected `{other}` in arguments")));
                }
            }
        }
    }

    fn value(&mut self, decorator: &str, terminators: &[char]) -> Result<Value, SyntaxError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(SyntaxError::UnterminatedArguments {
                decorator: decorator.to_owned(),
            }),
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                self.quoted(decorator, quote).map(Value::String)
            }
            Some('[') => {
                self.bump();
                self.list(decorator)
            }
            Some(_) => {
                let token = self.take_while(|c| !terminators.contains(&c)).trim();
                if token.is_empty() {
                    return Err(self.malformed("expected a value"));
                }
                Ok(literal(token))
            }
        }
    }

    fn quoted(&mut self, decorator: &str, quote: char) -> Result<String, SyntaxError> {
        let mut text = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(SyntaxError::UnterminatedArguments {
                        decorator: decorator.to_owned(),
                    });
                }
                Some('\\') => match self.bump() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some(escaped) => text.push(escaped),
                    None => {
                        return Err(SyntaxError::UnterminatedArguments {
                            decorator: decorator.to_owned(),
                        });
                    }
                },
                Some(c) if c == quote => return Ok(text),
                Some(c) => text.push(c),
            }
        }
    }

    fn list(&mut self, decorator: &str) -> Result<Value, SyntaxError> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => {
                    return Err(SyntaxError::UnterminatedArguments {
                        decorator: decorator.to_owned(),
                    });
                }
                Some(']') => {
                    self.bump();
                    return Ok(Value::Array(items));
                }
                Some(_) => {}
            }

            items.push(self.value(decorator, &[',', ']', ')'])?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {}
                None => {
                    return Err(SyntaxError::UnterminatedArguments {
                        decorator: decorator.to_owned(),
                    });
                }
                Some(other) => return Err(self.malformed(format!("unexpected `{other}` in list"))),
            }
        }
    }
}

fn literal(token: &str) -> Value {
    match token {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(integer) = token.parse::<i64>() {
                return Value::Number(integer.into());
            }
            token
                .parse::<f64>()
                .ok()
                .filter(|float| float.is_finite())
                .and_then(Number::from_f64)
                .map_or_else(|| Value::String(token.to_owned()), Value::Number)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn splits_invocations_from_prompt() {
        let parsed = parse("+++Reasoning(depth=basic)\n+++StepByStep\nExplain photosynthesis.").unwrap();
        assert_eq!(parsed.invocations.len(), 2);
        assert_eq!(parsed.invocations[0].name, "Reasoning");
        assert_eq!(parsed.invocations[0].parameters["depth"], json!("basic"));
        assert!(parsed.invocations[1].parameters.is_empty());
        assert_eq!(parsed.prompt, "Explain photosynthesis.");
    }

    #[test]
    fn plain_prompt_has_no_invocations() {
        let parsed = parse("Just a question? +++NotADecorator").unwrap();
        assert!(parsed.invocations.is_empty());
        assert_eq!(parsed.prompt, "Just a question? +++NotADecorator");
    }

    #[test]
    fn parses_literals_lists_and_quotes() {
        let parsed = parse(
            r#"+++Mixed(flag=true, count=3, ratio=0.5, items=[Concise, "Detailed"], note="a, (b)", bare=hello world)"#,
        )
        .unwrap();
        let parameters = &parsed.invocations[0].parameters;
        assert_eq!(parameters["flag"], json!(true));
        assert_eq!(parameters["count"], json!(3));
        assert_eq!(parameters["ratio"], json!(0.5));
        assert_eq!(parameters["items"], json!(["Concise", "Detailed"]));
        assert_eq!(parameters["note"], json!("a, (b)"));
        assert_eq!(parameters["bare"], json!("hello world"));
    }

    #[test]
    fn parses_version_suffix() {
        let parsed = parse("+++OutputFormat@1.2.0(format=json) go").unwrap();
        let invocation = &parsed.invocations[0];
        assert_eq!(invocation.version, Some(Version::new(1, 2, 0)));
        assert_eq!(parsed.prompt, "go");
    }

    #[test]
    fn rejects_bad_version() {
        let err = parse("+++Tone@latest(style=formal)").expect_err("version");
        assert!(matches!(err, SyntaxError::InvalidVersion { ref version, .. } if version == "latest"));
    }

    #[test]
    fn rejects_unterminated_arguments() {
        let err = parse("+++Tone(style=formal").expect_err("unterminated");
        assert!(matches!(err, SyntaxError::UnterminatedArguments { ref decorator } if decorator == "Tone"));

        let err = parse("+++Tone(style=\"formal)").expect_err("unterminated quote");
        assert!(matches!(err, SyntaxError::UnterminatedArguments { .. }));
    }

    #[test]
    fn instance_display_parses_back() {
        use decorator_registry::{DecoratorDefinition, DecoratorInstance};
        use decorator_schema::{ParameterKind, ParameterSchema};

        let definition = DecoratorDefinition::builder("Note", "1.0.0")
            .parameter(ParameterSchema::new("text", ParameterKind::String))
            .parameter(ParameterSchema::new("count", ParameterKind::Number))
            .build()
            .unwrap();
        for text in ["'hi", "it's", "line one\nline two", "tab\there", "say \"x\"", "7"] {
            let raw = json!({ "text": text, "count": 2 }).as_object().cloned().unwrap();
            let instance = DecoratorInstance::bind(&definition, &raw).unwrap();

            let parsed = parse(&format!("{instance}\nQ")).unwrap();
            assert_eq!(parsed.invocations[0].parameters, raw, "{instance}");
            assert_eq!(parsed.prompt, "Q");
        }
    }

    #[test]
    fn rejects_missing_name_and_equals() {
        assert!(matches!(parse("+++ (x=1)"), Err(SyntaxError::Malformed { .. })));
        assert!(matches!(parse("+++Tone(style formal)"), Err(SyntaxError::Malformed { .. })));
    }
}
