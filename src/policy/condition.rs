//! Evaluation of `Condition` attributes.
//!
//! Conditions are boolean expressions over build symbols, with the same meaning as C#
//! conditional compilation but a keyword syntax that does not need escaping inside XML:
//!
//! ```text
//! expr    ::= subexpr (('and' | 'or') subexpr)*
//! subexpr ::= symbol | '(' expr ')' | 'not' subexpr
//! ```
//!
//! `and` and `or` have equal precedence and are applied left to right. Symbols consist of ASCII
//! letters, digits and underscores and are compared case-insensitively. A symbol is true if it
//! is among the defined symbols.

use std::{collections::HashSet, fmt};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Symbol(String),
    And,
    Or,
    Not,
    OpenParen,
    CloseParen,
    End,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Symbol(symbol) => write!(f, "'{}'", symbol),
            Token::And => f.write_str("'and'"),
            Token::Or => f.write_str("'or'"),
            Token::Not => f.write_str("'not'"),
            Token::OpenParen => f.write_str("'('"),
            Token::CloseParen => f.write_str("')'"),
            Token::End => f.write_str("end of expression"),
        }
    }
}

/// Evaluates conditions against a fixed set of defined symbols.
///
/// # Examples
///
/// ```rust
/// use dottrim::policy::ConditionEvaluator;
///
/// let evaluator = ConditionEvaluator::from_defines("FEATURE_COMINTEROP;FEATURE_CORECLR");
/// assert!(evaluator.evaluate("feature_cominterop and not FEATURE_PAL")?);
/// assert!(!evaluator.evaluate("FEATURE_PAL or (FEATURE_CORECLR and FEATURE_PAL)")?);
/// # Ok::<(), dottrim::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionEvaluator {
    symbols: HashSet<String>,
}

impl ConditionEvaluator {
    /// An evaluator for which the given symbols are defined
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ConditionEvaluator {
            symbols: symbols
                .into_iter()
                .filter(|symbol| !symbol.as_ref().is_empty())
                .map(|symbol| symbol.as_ref().to_ascii_uppercase())
                .collect(),
        }
    }

    /// An evaluator for a `;`-separated define list, as passed to the C# compiler
    #[must_use]
    pub fn from_defines(defines: &str) -> Self {
        Self::new(defines.split(';'))
    }

    /// `true` if `symbol` is defined
    #[must_use]
    pub fn is_defined(&self, symbol: &str) -> bool {
        self.symbols.contains(&symbol.to_ascii_uppercase())
    }

    /// Evaluate `condition`.
    ///
    /// # Errors
    /// Returns [`Error::Condition`] if the expression contains an illegal character or does not
    /// follow the grammar.
    pub fn evaluate(&self, condition: &str) -> Result<bool> {
        let tokens = tokenize(condition)?;
        let mut parser = Parser {
            evaluator: self,
            condition,
            tokens,
            position: 0,
        };

        let value = parser.expression(0)?;
        Ok(value)
    }
}

fn tokenize(condition: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = condition.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' => {}
            '(' => tokens.push(Token::OpenParen),
            ')' => tokens.push(Token::CloseParen),
            c if is_symbol_char(c) => {
                let mut symbol = String::new();
                symbol.push(c.to_ascii_uppercase());
                while let Some(&next) = chars.peek() {
                    if !is_symbol_char(next) {
                        break;
                    }
                    symbol.push(next.to_ascii_uppercase());
                    chars.next();
                }

                tokens.push(match symbol.as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "NOT" => Token::Not,
                    _ => Token::Symbol(symbol),
                });
            }
            other => {
                return Err(condition_error(
                    condition,
                    format!("Illegal character: '{}'", other),
                ))
            }
        }
    }

    tokens.push(Token::End);
    Ok(tokens)
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn condition_error(condition: &str, message: String) -> Error {
    Error::Condition {
        expression: condition.to_string(),
        message,
    }
}

struct Parser<'a> {
    evaluator: &'a ConditionEvaluator,
    condition: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl Parser<'_> {
    fn next(&mut self) -> Token {
        match self.tokens.get(self.position) {
            Some(token) => {
                self.position += 1;
                token.clone()
            }
            None => Token::End,
        }
    }

    /// `depth` counts the open parentheses around this expression
    fn expression(&mut self, depth: usize) -> Result<bool> {
        let mut value = self.subexpression(depth)?;

        loop {
            match self.next() {
                Token::End if depth == 0 => return Ok(value),
                Token::CloseParen if depth > 0 => return Ok(value),
                Token::And => {
                    let right = self.subexpression(depth)?;
                    value = value && right;
                }
                Token::Or => {
                    let right = self.subexpression(depth)?;
                    value = value || right;
                }
                Token::End => {
                    return Err(condition_error(self.condition, "Missing ')'".to_string()))
                }
                token => return Err(self.unexpected(&token)),
            }
        }
    }

    fn subexpression(&mut self, depth: usize) -> Result<bool> {
        match self.next() {
            Token::Symbol(symbol) => Ok(self.evaluator.symbols.contains(&symbol)),
            Token::OpenParen => self.expression(depth + 1),
            Token::Not => Ok(!self.subexpression(depth)?),
            token => Err(self.unexpected(&token)),
        }
    }

    fn unexpected(&self, token: &Token) -> Error {
        condition_error(self.condition, format!("Unexpected token: {}", token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator() -> ConditionEvaluator {
        ConditionEvaluator::from_defines("FEATURE_A;feature_b;;")
    }

    #[test]
    fn symbols() {
        let evaluator = evaluator();
        assert!(evaluator.is_defined("Feature_A"));
        assert!(evaluator.evaluate("FEATURE_A").unwrap());
        assert!(evaluator.evaluate("FEATURE_B").unwrap());
        assert!(!evaluator.evaluate("FEATURE_C").unwrap());
        assert!(!evaluator.is_defined(""));
    }

    #[test]
    fn operators() {
        let evaluator = evaluator();
        assert!(evaluator.evaluate("FEATURE_A and FEATURE_B").unwrap());
        assert!(!evaluator.evaluate("FEATURE_A AND FEATURE_C").unwrap());
        assert!(evaluator.evaluate("FEATURE_C Or FEATURE_B").unwrap());
        assert!(evaluator.evaluate("not FEATURE_C").unwrap());
        assert!(!evaluator.evaluate("not not FEATURE_C").unwrap());
        assert!(evaluator.evaluate("\tnot(FEATURE_C)").unwrap());
    }

    #[test]
    fn left_to_right() {
        let evaluator = evaluator();
        // (A or C) and C, not A or (C and C)
        assert!(!evaluator.evaluate("FEATURE_A or FEATURE_C and FEATURE_C").unwrap());
        assert!(evaluator
            .evaluate("FEATURE_A or (FEATURE_C and FEATURE_C)")
            .unwrap());
    }

    #[test]
    fn nesting() {
        let evaluator = evaluator();
        assert!(evaluator
            .evaluate("((FEATURE_A) and (not (FEATURE_C or FEATURE_D)))")
            .unwrap());
    }

    #[test]
    fn errors() {
        let evaluator = evaluator();

        match evaluator.evaluate("FEATURE_A && FEATURE_B") {
            Err(Error::Condition {
                expression,
                message,
            }) => {
                assert_eq!(expression, "FEATURE_A && FEATURE_B");
                assert_eq!(message, "Illegal character: '&'");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        match evaluator.evaluate("FEATURE_A FEATURE_B") {
            Err(Error::Condition { message, .. }) => {
                assert_eq!(message, "Unexpected token: 'FEATURE_B'")
            }
            other => panic!("unexpected result: {:?}", other),
        }

        assert!(evaluator.evaluate("").is_err());
        assert!(evaluator.evaluate("and").is_err());
        assert!(evaluator.evaluate("FEATURE_A and").is_err());
        assert!(evaluator.evaluate("(FEATURE_A").is_err());
        assert!(evaluator.evaluate("FEATURE_A)").is_err());
    }
}
