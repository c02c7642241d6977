//! Tokenizer for config scripts.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Eq,
    Semi,
}

impl Token {
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("'{name}'"),
            Token::Str(_) => "string".to_string(),
            Token::Int(_) | Token::Float(_) => "number".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Eq => "'='".to_string(),
            Token::Semi => "';'".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

/// A lexing or parsing failure, positioned within the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

pub fn tokenize(input: &str) -> Result<Vec<Spanned>, SyntaxError> {
    Lexer {
        chars: input.chars().peekable(),
        line: 1,
        column: 1,
    }
    .run()
}

impl Lexer<'_> {
    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Looks one character past the next one.
    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    fn run(mut self) -> Result<Vec<Spanned>, SyntaxError> {
        let mut tokens = Vec::new();

        while let Some(&ch) = self.chars.peek() {
            let (line, column) = (self.line, self.column);

            let token = match ch {
                c if c.is_whitespace() => {
                    self.bump();
                    continue;
                }
                '#' => {
                    while self.chars.peek().is_some_and(|&c| c != '\n') {
                        self.bump();
                    }
                    continue;
                }
                '(' | ')' | '{' | '}' | '[' | ']' | ',' | '=' | ';' => {
                    self.bump();
                    match ch {
                        '(' => Token::LParen,
                        ')' => Token::RParen,
                        '{' => Token::LBrace,
                        '}' => Token::RBrace,
                        '[' => Token::LBracket,
                        ']' => Token::RBracket,
                        ',' => Token::Comma,
                        '=' => Token::Eq,
                        _ => Token::Semi,
                    }
                }
                '"' => self.string(line, column)?,
                c if c.is_ascii_digit() => self.number(line, column)?,
                '-' | '+' if self.peek_second().is_some_and(|c| c.is_ascii_digit()) => {
                    self.number(line, column)?
                }
                c if c.is_ascii_alphabetic() || c == '_' => self.ident(),
                other => {
                    return Err(SyntaxError::new(
                        line,
                        column,
                        format!("unexpected character '{other}'"),
                    ));
                }
            };

            tokens.push(Spanned {
                token,
                line,
                column,
            });
        }

        Ok(tokens)
    }

    fn ident(&mut self) -> Token {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Token::Ident(name)
    }

    fn string(&mut self, line: usize, column: usize) -> Result<Token, SyntaxError> {
        self.bump(); // opening quote
        let mut value = String::new();

        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(SyntaxError::new(line, column, "unterminated string"));
                }
                Some('"') => return Ok(Token::Str(value)),
                Some('\\') => {
                    let escaped = match self.bump() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('0') => '\0',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some(other) => {
                            return Err(SyntaxError::new(
                                self.line,
                                self.column - 1,
                                format!("unknown escape sequence '\\{other}'"),
                            ));
                        }
                        None => {
                            return Err(SyntaxError::new(line, column, "unterminated string"));
                        }
                    };
                    value.push(escaped);
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn number(&mut self, line: usize, column: usize) -> Result<Token, SyntaxError> {
        let mut text = String::new();
        if let Some(&sign) = self.chars.peek().filter(|&&c| c == '-' || c == '+') {
            text.push(sign);
            self.bump();
        }

        while let Some(&c) = self.chars.peek() {
            let exponent_sign =
                (c == '-' || c == '+') && text.ends_with(|p: char| p == 'e' || p == 'E');
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || exponent_sign {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }

        let digits: String = text.chars().filter(|&c| c != '_').collect();
        let invalid = || SyntaxError::new(line, column, format!("invalid number '{text}'"));

        if digits.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
            digits
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| invalid())
        } else {
            digits.parse::<i64>().map(Token::Int).map_err(|_| invalid())
        }
    }
}
