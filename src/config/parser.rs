//! Recursive-descent parser turning script tokens into operations.

use toml::Value;

use super::lexer::{tokenize, Spanned, SyntaxError, Token};
use super::script::{LoadOptions, Op, Statement};

/// Deepest allowed nesting of groups and arrays.
pub const MAX_NESTING: usize = 128;

/// Parses a whole script into its top-level statements.
pub fn parse(input: &str) -> Result<Vec<Statement>, SyntaxError> {
    let tokens = tokenize(input)?;
    let end = end_position(input);
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        end,
    };
    parser.block(false)
}

fn end_position(input: &str) -> (usize, usize) {
    let line = input.lines().count().max(1);
    let column = input
        .lines()
        .last()
        .map_or(1, |l| l.chars().count() + 1);
    (line, column)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
    end: (usize, usize),
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn position(&self) -> (usize, usize) {
        self.tokens
            .get(self.pos)
            .map_or(self.end, |s| (s.line, s.column))
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        let (line, column) = self.position();
        SyntaxError::new(line, column, message)
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        match self.peek() {
            Some(token) => self.error(format!("expected {expected}, found {}", token.describe())),
            None => self.error(format!("expected {expected}, found end of input")),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), SyntaxError> {
        if self.peek() == Some(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(&expected.describe()))
        }
    }

    fn enter(&mut self) -> Result<(), SyntaxError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(format!("nesting exceeds {MAX_NESTING} levels")));
        }
        self.depth += 1;
        Ok(())
    }

    fn ident(&mut self) -> Result<String, SyntaxError> {
        if let Some(Token::Ident(name)) = self.peek() {
            let name = name.clone();
            self.pos += 1;
            Ok(name)
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    fn block(&mut self, nested: bool) -> Result<Vec<Statement>, SyntaxError> {
        let mut statements = Vec::new();

        loop {
            while self.peek() == Some(&Token::Semi) {
                self.pos += 1;
            }

            match self.peek() {
                None if nested => return Err(self.unexpected("'}'")),
                None => break,
                Some(Token::RBrace) if nested => {
                    self.pos += 1;
                    break;
                }
                Some(Token::Ident(_)) => statements.push(self.statement()?),
                Some(_) => return Err(self.unexpected("statement")),
            }
        }

        Ok(statements)
    }

    fn statement(&mut self) -> Result<Statement, SyntaxError> {
        let (line, column) = self.position();
        let name = self.ident()?;

        let op = match name.as_str() {
            "set" => {
                self.expect(Token::LParen)?;
                let key = self.ident()?;
                self.expect(Token::Comma)?;
                let value = self.value()?;
                self.expect(Token::RParen)?;
                Op::Set { key, value }
            }
            "unset" => {
                self.expect(Token::LParen)?;
                let key = self.ident()?;
                self.expect(Token::RParen)?;
                Op::Unset { key }
            }
            "group" => {
                self.expect(Token::LParen)?;
                let name = self.ident()?;
                self.expect(Token::RParen)?;
                self.enter()?;
                self.expect(Token::LBrace)?;
                let body = self.block(true)?;
                self.depth -= 1;
                Op::Group { name, body }
            }
            "load" => {
                self.expect(Token::LParen)?;
                let location = match self.peek() {
                    Some(Token::Str(location)) => location.clone(),
                    _ => return Err(self.unexpected("source location string")),
                };
                self.pos += 1;
                let options = self.load_options()?;
                self.expect(Token::RParen)?;
                Op::Load { location, options }
            }
            other => {
                return Err(SyntaxError::new(
                    line,
                    column,
                    format!("unknown operation '{other}'"),
                ));
            }
        };

        Ok(Statement { op, line })
    }

    fn load_options(&mut self) -> Result<LoadOptions, SyntaxError> {
        let mut options = LoadOptions::default();

        while self.peek() == Some(&Token::Comma) {
            self.pos += 1;
            if self.peek() == Some(&Token::RParen) {
                break;
            }

            let (line, column) = self.position();
            let name = self.ident()?;
            self.expect(Token::Eq)?;
            match (name.as_str(), self.value()?) {
                ("if_exists", Value::Boolean(flag)) => options.if_exists = flag,
                ("if_exists", _) => {
                    return Err(SyntaxError::new(line, column, "if_exists must be a boolean"));
                }
                (other, _) => {
                    return Err(SyntaxError::new(
                        line,
                        column,
                        format!("unknown load option '{other}'"),
                    ));
                }
            }
        }

        Ok(options)
    }

    fn value(&mut self) -> Result<Value, SyntaxError> {
        if self.peek() == Some(&Token::LBracket) {
            self.enter()?;
            self.pos += 1;
            let array = self.array()?;
            self.depth -= 1;
            return Ok(array);
        }

        let value = match self.peek() {
            Some(Token::Str(s)) => Value::String(s.clone()),
            Some(Token::Int(i)) => Value::Integer(*i),
            Some(Token::Float(f)) => Value::Float(*f),
            Some(Token::Ident(word)) if word == "true" => Value::Boolean(true),
            Some(Token::Ident(word)) if word == "false" => Value::Boolean(false),
            _ => return Err(self.unexpected("value")),
        };
        self.pos += 1;
        Ok(value)
    }

    fn array(&mut self) -> Result<Value, SyntaxError> {
        let mut items = Vec::new();

        loop {
            if self.peek() == Some(&Token::RBracket) {
                self.pos += 1;
                break;
            }
            items.push(self.value()?);
            match self.peek() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::RBracket) => {}
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }

        Ok(Value::Array(items))
    }
}
