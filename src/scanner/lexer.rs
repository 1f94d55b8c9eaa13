//! Token set for embedded code, using logos
//!
//! Code inside `@( ... )`, `@{ ... }` and keyword blocks is never parsed; the
//! scanner only needs to see delimiters, quoted strings, comments and the
//! characters that can hand control back to markup. Quoted strings and
//! comments are single tokens, so a `}` or `)` inside them is never counted.

use logos::Logos;

use crate::error::Span;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    // Delimiters
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,

    // Characters that may switch modes
    #[token("@")]
    At,
    #[token("<")]
    AngleOpen,
    #[token("\n")]
    Newline,

    #[regex(r"[ \t\r]+")]
    Space,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    // String literals, escape-aware. An unterminated quote matches nothing
    // and surfaces as a lexer error.
    #[regex(r#""([^"\\\n]|\\(.|\n))*""#)]
    DoubleQuoted,
    #[regex(r#"'([^'\\\n]|\\(.|\n))*'"#)]
    SingleQuoted,
    #[regex(r#"`([^`\\]|\\(.|\n))*`"#)]
    BackQuoted,

    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    #[token("/")]
    Slash,

    // Any other single character
    #[regex(r#"[^(){}\[\]@<\n \t\rA-Za-z_$"'`/]"#)]
    Other,
}

/// Lex the single token starting at `offset`, with its absolute span
///
/// `Err(())` marks a quote that is never closed.
pub fn token_at(source: &str, offset: usize) -> Option<(Result<Token, ()>, Span)> {
    let mut lexer = Token::lexer(&source[offset..]);
    let token = lexer.next()?;
    let span = lexer.span();
    Some((token, offset + span.start..offset + span.end))
}

/// Lex input string into tokens with spans, skipping lexer errors
#[cfg(test)]
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}
