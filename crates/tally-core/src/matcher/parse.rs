//! Parse matcher expressions written in their description form.
//!
//! ```text
//! expr    := "not" expr | operand (("and" | "or") operand)*
//! operand := "not" operand | "(" expr ")" | leaf
//! leaf    := "any" ["count"] | "exactly" N | "at" "least" N
//! ```
//!
//! A leading `not` covers the whole expression that follows it, which is how
//! `Display` renders a negated `and`/`or` node. Chains are left-associative.
//! Runs of `not` are folded without recursion; parentheses and `and`/`or`
//! chains are limited to 64 levels.

use super::CountMatcher;
use std::fmt;
use std::str::FromStr;

/// Error from parsing a matcher expression. Offsets are byte offsets into the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseMatcherError {
    #[error("empty matcher expression")]
    Empty,
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("number at offset {offset} is out of range")]
    NumberOutOfRange { offset: usize },
    #[error("expected {expected} at offset {offset}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: String,
        offset: usize,
    },
    #[error("expected {expected}, found end of input")]
    UnexpectedEnd { expected: &'static str },
    #[error("expression nested too deeply at offset {offset}")]
    TooDeep { offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Word(String),
    Number(usize),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Open => write!(f, "'('"),
            Token::Close => write!(f, "')'"),
            Token::Word(w) => write!(f, "'{}'", w),
            Token::Number(n) => write!(f, "{}", n),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, ParseMatcherError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
        } else if ch == '(' {
            chars.next();
            tokens.push((Token::Open, offset));
        } else if ch == ')' {
            chars.next();
            tokens.push((Token::Close, offset));
        } else if ch.is_ascii_digit() {
            let mut digits = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if !d.is_ascii_digit() && d != '_' {
                    break;
                }
                if d != '_' {
                    digits.push(d);
                }
                chars.next();
            }
            let n = digits
                .parse::<usize>()
                .map_err(|_| ParseMatcherError::NumberOutOfRange { offset })?;
            tokens.push((Token::Number(n), offset));
        } else if ch.is_alphabetic() {
            let mut word = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if !c.is_alphabetic() {
                    break;
                }
                word.extend(c.to_lowercase());
                chars.next();
            }
            tokens.push((Token::Word(word), offset));
        } else {
            return Err(ParseMatcherError::UnexpectedChar { ch, offset });
        }
    }

    Ok(tokens)
}

/// Deepest parenthesis nesting, and deepest `and`/`or` tree, the parser accepts.
const MAX_DEPTH: usize = 64;

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    nesting: usize,
}

/// Applies `nots` negations; only the parity matters once `not` unwraps itself.
fn negate(m: CountMatcher, nots: usize) -> CountMatcher {
    if nots % 2 == 1 {
        m.not()
    } else {
        m
    }
}

impl Parser {
    fn bump(&mut self) -> Option<(Token, usize)> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(0, |(_, offset)| *offset)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        match self.tokens.get(self.pos) {
            Some((Token::Word(w), _)) if w == word => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn eat_nots(&mut self) -> usize {
        let mut n = 0;
        while self.eat_word("not") {
            n += 1;
        }
        n
    }

    fn expect(&mut self, want: Token, expected: &'static str) -> Result<(), ParseMatcherError> {
        match self.bump() {
            Some((tok, _)) if tok == want => Ok(()),
            Some((tok, offset)) => Err(ParseMatcherError::Unexpected {
                expected,
                found: tok.to_string(),
                offset,
            }),
            None => Err(ParseMatcherError::UnexpectedEnd { expected }),
        }
    }

    fn number(&mut self) -> Result<usize, ParseMatcherError> {
        match self.bump() {
            Some((Token::Number(n), _)) => Ok(n),
            Some((tok, offset)) => Err(ParseMatcherError::Unexpected {
                expected: "a count",
                found: tok.to_string(),
                offset,
            }),
            None => Err(ParseMatcherError::UnexpectedEnd {
                expected: "a count",
            }),
        }
    }

    /// Returns the matcher and the depth of its `and`/`or` tree.
    fn expr(&mut self) -> Result<(CountMatcher, usize), ParseMatcherError> {
        let nots = self.eat_nots();
        let (mut acc, mut depth) = self.operand()?;
        loop {
            let offset = self.offset();
            let and = if self.eat_word("and") {
                true
            } else if self.eat_word("or") {
                false
            } else {
                break;
            };
            let (rhs, rhs_depth) = self.operand()?;
            depth = depth.max(rhs_depth) + 1;
            if depth > MAX_DEPTH {
                return Err(ParseMatcherError::TooDeep { offset });
            }
            acc = if and { acc.and(rhs) } else { acc.or(rhs) };
        }
        Ok((negate(acc, nots), depth + nots % 2))
    }

    fn operand(&mut self) -> Result<(CountMatcher, usize), ParseMatcherError> {
        let nots = self.eat_nots();
        let (m, depth) = match self.bump() {
            Some((Token::Open, offset)) => {
                if self.nesting >= MAX_DEPTH {
                    return Err(ParseMatcherError::TooDeep { offset });
                }
                self.nesting += 1;
                let inner = self.expr()?;
                self.nesting -= 1;
                self.expect(Token::Close, "')'")?;
                inner
            }
            Some((Token::Word(word), offset)) => (self.leaf(&word, offset)?, 1),
            Some((tok, offset)) => {
                return Err(ParseMatcherError::Unexpected {
                    expected: "a matcher",
                    found: tok.to_string(),
                    offset,
                })
            }
            None => {
                return Err(ParseMatcherError::UnexpectedEnd {
                    expected: "a matcher",
                })
            }
        };
        Ok((negate(m, nots), depth + nots % 2))
    }

    fn leaf(&mut self, word: &str, offset: usize) -> Result<CountMatcher, ParseMatcherError> {
        match word {
            "any" => {
                self.eat_word("count");
                Ok(CountMatcher::Any)
            }
            "exactly" => Ok(CountMatcher::Exactly(self.number()?)),
            "at" => {
                self.expect(Token::Word("least".to_string()), "'least'")?;
                Ok(CountMatcher::AtLeast(self.number()?))
            }
            _ => Err(ParseMatcherError::Unexpected {
                expected: "a matcher",
                found: format!("'{}'", word),
                offset,
            }),
        }
    }
}

impl FromStr for CountMatcher {
    type Err = ParseMatcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(s)?;
        if tokens.is_empty() {
            return Err(ParseMatcherError::Empty);
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            nesting: 0,
        };
        let (matcher, _) = parser.expr()?;
        match parser.bump() {
            None => Ok(matcher),
            Some((tok, offset)) => Err(ParseMatcherError::Unexpected {
                expected: "end of input",
                found: tok.to_string(),
                offset,
            }),
        }
    }
}
