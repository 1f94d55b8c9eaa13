//! Dispatch on the characters following an `@`

/// Control-structure keywords
///
/// Only `if`, `for`, `while`, `try` and `function` introduce a block after
/// `@`; the remaining clauses continue a block that just closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    If,
    Else,
    For,
    While,
    Try,
    Catch,
    Finally,
    Function,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "if" => Some(Keyword::If),
            "else" => Some(Keyword::Else),
            "for" => Some(Keyword::For),
            "while" => Some(Keyword::While),
            "try" => Some(Keyword::Try),
            "catch" => Some(Keyword::Catch),
            "finally" => Some(Keyword::Finally),
            "function" => Some(Keyword::Function),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::For => "for",
            Keyword::While => "while",
            Keyword::Try => "try",
            Keyword::Catch => "catch",
            Keyword::Finally => "finally",
            Keyword::Function => "function",
        }
    }

    /// Whether `@keyword` opens a block
    pub fn starts_block(self) -> bool {
        matches!(
            self,
            Keyword::If | Keyword::For | Keyword::While | Keyword::Try | Keyword::Function
        )
    }

    /// Whether `rest`, the text after this clause keyword, reads as the
    /// clause's head rather than prose that happens to start with the word
    pub fn heads_clause(self, rest: &str) -> bool {
        let rest = rest.trim_start();
        match self {
            Keyword::Else => {
                rest.starts_with('{')
                    || (rest.starts_with("if") && ident_len(rest) == "if".len())
            }
            Keyword::Catch => rest.starts_with(['(', '{']),
            Keyword::Finally => rest.starts_with('{'),
            _ => true,
        }
    }

    /// Whether a block opened by `self` may be followed by a `next` clause
    pub fn continued_by(self, next: Keyword) -> bool {
        matches!(
            (self, next),
            (Keyword::If | Keyword::Else, Keyword::Else)
                | (Keyword::Try, Keyword::Catch | Keyword::Finally)
                | (Keyword::Catch, Keyword::Finally)
        )
    }
}

/// What an `@` introduces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// `@@`
    Escape,
    /// `@:`
    LineEscape,
    /// `@*`
    Comment,
    /// `@(`
    Explicit,
    /// `@{`
    AnonymousBlock,
    /// `@}`
    CloseBlock,
    /// `@<`, markup inside a code block
    Markup,
    /// `@if`, `@for`, ...
    Keyword(Keyword),
    /// `@name`, `@a.b[0]()`
    Implicit,
    /// Not a directive: a lone `@` or one inside an e-mail address
    Literal,
}

impl Directive {
    /// Directives that push a code block
    pub fn opens_block(&self) -> bool {
        matches!(self, Directive::AnonymousBlock | Directive::Keyword(_))
    }
}

pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Length in bytes of the identifier at the start of `rest`
pub fn ident_len(rest: &str) -> usize {
    match rest.chars().next() {
        Some(c) if is_ident_start(c) => rest
            .char_indices()
            .find(|(_, c)| !is_ident_char(*c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len()),
        _ => 0,
    }
}

/// Resolve the directive for the `@` at byte offset `at`
pub fn resolve(source: &str, at: usize) -> Directive {
    let rest = &source[at + 1..];
    let Some(next) = rest.chars().next() else {
        return Directive::Literal;
    };
    match next {
        '@' => Directive::Escape,
        ':' => Directive::LineEscape,
        '*' => Directive::Comment,
        '(' => Directive::Explicit,
        '{' => Directive::AnonymousBlock,
        '}' => Directive::CloseBlock,
        '<' => Directive::Markup,
        c if is_ident_start(c) => {
            // user@example.com
            let preceded_by_word = source[..at]
                .chars()
                .next_back()
                .is_some_and(|p| p.is_alphanumeric() || p == '_');
            if preceded_by_word {
                return Directive::Literal;
            }
            match Keyword::from_word(&rest[..ident_len(rest)]) {
                Some(keyword) if keyword.starts_block() => Directive::Keyword(keyword),
                _ => Directive::Implicit,
            }
        }
        _ => Directive::Literal,
    }
}
