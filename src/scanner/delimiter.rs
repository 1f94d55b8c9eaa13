//! Delimiter balance tracking for embedded code
//!
//! Works on the token stream from [`super::lexer`], so delimiters inside
//! string literals and comments are never counted. The matcher does not know
//! what a brace *means*: a block body and an object literal count the same.

use crate::error::{CompileError, Construct, Span};

use super::lexer::{self, Token};

/// The delimiter pairs the matcher balances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Paren,
    Bracket,
    Brace,
}

impl Delimiter {
    fn tokens(self) -> (Token, Token) {
        match self {
            Delimiter::Paren => (Token::ParenOpen, Token::ParenClose),
            Delimiter::Bracket => (Token::BracketOpen, Token::BracketClose),
            Delimiter::Brace => (Token::BraceOpen, Token::BraceClose),
        }
    }

    /// The construct reported when this delimiter is left open
    pub fn construct(self) -> Construct {
        match self {
            Delimiter::Paren => Construct::Paren,
            Delimiter::Bracket => Construct::Bracket,
            Delimiter::Brace => Construct::Block,
        }
    }
}

/// Signed depth counters for parens and braces inside a code block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Balance {
    pub parens: i32,
    pub braces: i32,
}

impl Balance {
    /// Counters for a block whose opening `{` has already been consumed
    pub fn block() -> Self {
        Self {
            parens: 0,
            braces: 1,
        }
    }

    /// Update the counters for one token
    pub fn feed(&mut self, token: Token) {
        match token {
            Token::ParenOpen => self.parens += 1,
            Token::ParenClose => self.parens -= 1,
            Token::BraceOpen => self.braces += 1,
            Token::BraceClose => self.braces -= 1,
            _ => {}
        }
    }

    /// True while inside a parenthesized group
    pub fn in_parens(&self) -> bool {
        self.parens > 0
    }
}

/// Lex one token at `offset`, turning an unterminated quote into an error
pub(crate) fn next_token(source: &str, offset: usize) -> Option<Result<(Token, Span), CompileError>> {
    let (token, span) = lexer::token_at(source, offset)?;
    Some(match token {
        Ok(token) => Ok((token, span)),
        Err(()) => Err(CompileError::unmatched(Construct::Quote, span.start..span.start + 1)),
    })
}

/// Find the delimiter closing the group opened just before `start`
///
/// Returns the byte offset of the closing delimiter.
pub fn find_closing(source: &str, start: usize, kind: Delimiter) -> Result<usize, CompileError> {
    let (open, close) = kind.tokens();
    let mut depth: i32 = 1;
    let mut pos = start;
    while let Some(next) = next_token(source, pos) {
        let (token, span) = next?;
        if token == open {
            depth += 1;
        } else if token == close {
            depth -= 1;
            if depth == 0 {
                return Ok(span.start);
            }
        }
        pos = span.end;
    }
    let opened_at = start.saturating_sub(1);
    Err(CompileError::unmatched(kind.construct(), opened_at..start))
}

/// Find the `{` that opens a block body after a keyword header
///
/// Braces inside the header's parentheses (`for (x of {a: 1})`) are skipped.
/// `keyword` is the span reported when no body is found.
pub fn find_block_open(source: &str, start: usize, keyword: Span) -> Result<usize, CompileError> {
    let mut parens: i32 = 0;
    let mut pos = start;
    while let Some(next) = next_token(source, pos) {
        let (token, span) = next?;
        match token {
            Token::ParenOpen => parens += 1,
            Token::ParenClose => parens -= 1,
            Token::BraceOpen if parens <= 0 => return Ok(span.start),
            _ => {}
        }
        pos = span.end;
    }
    Err(CompileError::unmatched(Construct::Block, keyword))
}
