//! The mode-tracking scanner
//!
//! One forward pass over the template. Each step looks at the frame on top of
//! the [`ModeStack`] and consumes one run of text, one code token, or one
//! directive. Nothing is parsed beyond what is needed to find where code ends
//! and markup begins again.

use tracing::debug;

use crate::error::{CompileError, Construct};

use super::delimiter::{self, Balance, Delimiter};
use super::directive::{self, Directive, Keyword};
use super::lexer::Token;
use super::mode::{BlockFrame, Frame, MarkupFrame, ModeStack};
use super::segment::{Segment, SegmentBuilder};
use super::tags;

const TEXT_OPEN: &str = "<text>";
const TEXT_CLOSE: &str = "</text>";
const HTML_COMMENT_OPEN: &str = "<!--";
const HTML_COMMENT_CLOSE: &str = "-->";

/// Scan template text into segments
pub fn scan(source: &str) -> Result<Vec<Segment>, CompileError> {
    Scanner::new(source).run()
}

/// Scan state for one template; discarded when the scan ends
pub struct Scanner<'src> {
    source: &'src str,
    pos: usize,
    stack: ModeStack,
    out: SegmentBuilder,
}

type Step<'src> = fn(&mut Scanner<'src>) -> Result<(), CompileError>;

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            stack: ModeStack::new(),
            out: SegmentBuilder::new(),
        }
    }

    pub fn run(mut self) -> Result<Vec<Segment>, CompileError> {
        while self.pos < self.source.len() {
            let step: Step<'src> = match self.stack.top() {
                Frame::Document => Self::step_document,
                Frame::Block(_) => Self::step_block,
                Frame::Markup(_) => Self::step_markup,
                Frame::Tag { .. } => Self::step_tag,
                Frame::AttributeValue { .. } => Self::step_attribute,
                // Closed by the routine that opened them
                Frame::Expression { .. } | Frame::Comment { .. } | Frame::LineEscape { .. } => {
                    Self::discard_frame
                }
            };
            step(&mut self)?;
        }
        self.finish()
    }

    fn finish(self) -> Result<Vec<Segment>, CompileError> {
        if !self.stack.is_settled() {
            debug!(open = ?self.stack.modes(), "frames open at end of input");
            if let Some(err) = self.stack.iter_innermost().find_map(unclosed) {
                return Err(err);
            }
        }
        debug!(segments = self.out.len(), bytes = self.source.len(), "scan complete");
        Ok(self.out.finish())
    }

    fn discard_frame(&mut self) -> Result<(), CompileError> {
        self.stack.pop();
        Ok(())
    }

    /// Emit the next `len` bytes as literal text
    fn literal_run(&mut self, len: usize) {
        let end = self.pos + len;
        self.out.literal(&self.source[self.pos..end]);
        self.pos = end;
    }

    /// Text that is output in markup but stays source inside a code block
    fn plain(&mut self, text: &str) {
        if matches!(self.stack.top(), Frame::Block(_)) {
            self.out.code(text);
        } else {
            self.out.literal(text);
        }
    }

    fn markup_mut(&mut self) -> Option<&mut MarkupFrame> {
        match self.stack.top_mut() {
            Frame::Markup(markup) => Some(markup),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Top-level markup

    fn step_document(&mut self) -> Result<(), CompileError> {
        let source = self.source;
        let rest = &source[self.pos..];
        match rest.find('@') {
            Some(0) => self.directive(),
            Some(offset) => {
                self.literal_run(offset);
                Ok(())
            }
            None => {
                self.literal_run(rest.len());
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // Directives

    fn directive(&mut self) -> Result<(), CompileError> {
        let at = self.pos;
        let kind = directive::resolve(self.source, at);
        if kind.opens_block() {
            self.yield_to_code();
        }
        match kind {
            Directive::Escape => {
                self.out.literal("@");
                self.pos = at + 2;
            }
            Directive::Literal => {
                self.plain("@");
                self.pos = at + 1;
            }
            Directive::LineEscape => self.line_escape(at),
            Directive::Comment => self.comment(at)?,
            Directive::Explicit => self.explicit_expression(at)?,
            Directive::Implicit => self.implicit_expression(at)?,
            Directive::Keyword(keyword) => self.open_clause(at + 1, keyword)?,
            Directive::AnonymousBlock => {
                self.out.code("{");
                self.stack.push(Frame::Block(BlockFrame {
                    opened_at: at,
                    balance: Balance::block(),
                    clause: None,
                }));
                self.pos = at + 2;
            }
            Directive::CloseBlock => self.force_close(at)?,
            Directive::Markup => {
                self.yield_to_code();
                if matches!(self.stack.top(), Frame::Block(_)) {
                    self.stack.push(Frame::Markup(MarkupFrame::new(at + 1)));
                } else if !matches!(self.stack.top(), Frame::Markup(_)) {
                    // Outside code the `@` is plain text
                    self.out.literal("@");
                }
                self.pos = at + 1;
            }
        }
        Ok(())
    }

    /// `@:` copies the rest of the line, newline included
    fn line_escape(&mut self, at: usize) {
        let source = self.source;
        self.stack.push(Frame::LineEscape { opened_at: at });
        let start = at + 2;
        let end = source[start..]
            .find('\n')
            .map(|i| start + i + 1)
            .unwrap_or(source.len());
        self.out.literal(&source[start..end]);
        self.pos = end;
        self.stack.pop();
    }

    fn comment(&mut self, at: usize) -> Result<(), CompileError> {
        self.stack.push(Frame::Comment { opened_at: at });
        let start = at + 2;
        let end = self.source[start..]
            .find("*@")
            .ok_or_else(|| CompileError::unmatched(Construct::Comment, at..start))?;
        self.pos = start + end + 2;
        self.stack.pop();
        Ok(())
    }

    fn explicit_expression(&mut self, at: usize) -> Result<(), CompileError> {
        let source = self.source;
        self.stack.push(Frame::Expression { opened_at: at });
        let start = at + 2;
        let close = delimiter::find_closing(source, start, Delimiter::Paren)?;
        self.out.expression(&source[start..close]);
        self.pos = close + 1;
        self.stack.pop();
        Ok(())
    }

    /// `@name`, extended greedily by `.member`, `[index]` and `(args)`
    fn implicit_expression(&mut self, at: usize) -> Result<(), CompileError> {
        let source = self.source;
        self.stack.push(Frame::Expression { opened_at: at });
        let start = at + 1;
        let mut end = start + directive::ident_len(&source[start..]);
        loop {
            let rest = &source[end..];
            if let Some(member) = rest.strip_prefix('.') {
                let len = directive::ident_len(member);
                if len == 0 {
                    break;
                }
                end += 1 + len;
            } else if rest.starts_with('[') {
                end = delimiter::find_closing(source, end + 1, Delimiter::Bracket)? + 1;
            } else if rest.starts_with('(') {
                end = delimiter::find_closing(source, end + 1, Delimiter::Paren)? + 1;
            } else {
                break;
            }
        }
        self.out.expression(&source[start..end]);
        self.pos = end;
        self.stack.pop();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Code blocks

    /// Markup whose elements are all closed hands control back to the
    /// enclosing block before a new block opens
    fn yield_to_code(&mut self) {
        if let Frame::Markup(markup) = self.stack.top() {
            if markup.is_settled() {
                self.stack.pop();
            }
        }
    }

    /// Emit `keyword ... {` as code and enter its block
    fn open_clause(&mut self, start: usize, keyword: Keyword) -> Result<(), CompileError> {
        let source = self.source;
        let keyword_span = start..start + keyword.as_str().len();
        let brace = delimiter::find_block_open(source, keyword_span.end, keyword_span)?;
        self.out.code(&source[start..=brace]);
        self.stack.push(Frame::Block(BlockFrame {
            opened_at: start,
            balance: Balance::block(),
            clause: Some(keyword),
        }));
        self.pos = brace + 1;
        Ok(())
    }

    fn step_block(&mut self) -> Result<(), CompileError> {
        let source = self.source;
        let Some(next) = delimiter::next_token(source, self.pos) else {
            self.pos = source.len();
            return Ok(());
        };
        let (token, span) = next?;
        match token {
            Token::At => return self.directive(),
            Token::AngleOpen if self.markup_allowed() && starts_markup(&source[span.start..]) => {
                self.stack.push(Frame::Markup(MarkupFrame::new(span.start)));
                return Ok(());
            }
            _ => {}
        }

        self.out.code(&source[span.clone()]);
        self.pos = span.end;
        let closed = match self.stack.top_mut() {
            Frame::Block(block) => {
                block.balance.feed(token);
                block.balance.braces <= 0
            }
            _ => false,
        };
        if closed {
            self.close_block()?;
        }
        Ok(())
    }

    /// Tags are only recognized outside parentheses, so `i < n` in a loop
    /// header or call argument stays code
    fn markup_allowed(&self) -> bool {
        matches!(self.stack.top(), Frame::Block(block) if !block.balance.in_parens())
    }

    fn close_block(&mut self) -> Result<(), CompileError> {
        let Some(Frame::Block(block)) = self.stack.pop() else {
            return Ok(());
        };
        match block.clause {
            Some(clause) => self.continue_clause(clause),
            None => Ok(()),
        }
    }

    /// `} else {`, `} catch (e) {` and `} finally {` continue the statement
    fn continue_clause(&mut self, clause: Keyword) -> Result<(), CompileError> {
        let source = self.source;
        let rest = &source[self.pos..];
        let word_start = rest.len() - rest.trim_start().len();
        let word_len = directive::ident_len(&rest[word_start..]);
        let word_end = word_start + word_len;
        match Keyword::from_word(&rest[word_start..word_end]) {
            Some(next) if clause.continued_by(next) && next.heads_clause(&rest[word_end..]) => {
                self.out.code(&rest[..word_start]);
                self.open_clause(self.pos + word_start, next)
            }
            _ => Ok(()),
        }
    }

    /// `@}` closes the innermost block whatever its brace balance
    fn force_close(&mut self, at: usize) -> Result<(), CompileError> {
        let Some(index) = self.stack.innermost_block() else {
            self.out.literal("@}");
            self.pos = at + 2;
            return Ok(());
        };
        while self.stack.depth() > index + 1 {
            if let Some(err) = self.stack.pop().as_ref().and_then(unclosed) {
                return Err(err);
            }
        }
        if let Some(Frame::Block(block)) = self.stack.pop() {
            let braces = block.balance.braces.max(1) as usize;
            self.out.code(&"}".repeat(braces));
        }
        self.pos = at + 2;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Markup nested in a code block

    fn step_markup(&mut self) -> Result<(), CompileError> {
        let source = self.source;
        let rest = &source[self.pos..];
        let Some(offset) = rest.find(|c: char| matches!(c, '@' | '<' | '\n' | '}')) else {
            self.literal_run(rest.len());
            return Ok(());
        };
        if offset > 0 {
            self.literal_run(offset);
            return Ok(());
        }

        let settled = matches!(self.stack.top(), Frame::Markup(markup) if markup.is_settled());
        match rest.as_bytes()[0] {
            b'@' => self.directive(),
            b'<' => self.markup_angle(),
            b'\n' if settled => {
                // The line ends the markup; indentation of the next line is
                // still output
                let next_line = &rest[1..];
                let indent =
                    next_line.len() - next_line.trim_start_matches([' ', '\t']).len();
                self.literal_run(1 + indent);
                self.stack.pop();
                Ok(())
            }
            b'}' if settled => {
                // Left for the enclosing block to consume
                self.stack.pop();
                Ok(())
            }
            _ => {
                self.literal_run(1);
                Ok(())
            }
        }
    }

    fn markup_angle(&mut self) -> Result<(), CompileError> {
        let source = self.source;
        let at = self.pos;
        let rest = &source[at..];
        let in_text = matches!(self.stack.top(), Frame::Markup(markup) if markup.in_text);

        if in_text {
            if rest.starts_with(TEXT_CLOSE) {
                if let Some(markup) = self.markup_mut() {
                    markup.in_text = false;
                }
                self.pos += TEXT_CLOSE.len();
            } else {
                self.literal_run(1);
            }
            return Ok(());
        }

        if rest.starts_with(TEXT_OPEN) {
            if let Some(markup) = self.markup_mut() {
                markup.in_text = true;
            }
            self.pos += TEXT_OPEN.len();
            return Ok(());
        }

        if rest.starts_with(HTML_COMMENT_OPEN) {
            return self.html_comment(at);
        }

        if let Some(after) = rest.strip_prefix("</") {
            let name_len = tags::tag_name_len(after);
            if name_len > 0 {
                return self.closing_tag(at, &after[..name_len]);
            }
        }

        let name_len = tags::tag_name_len(&rest[1..]);
        if name_len == 0 {
            self.literal_run(1);
            return Ok(());
        }
        let end = at + 1 + name_len;
        self.out.literal(&source[at..end]);
        self.stack.push(Frame::Tag {
            name: source[at + 1..end].to_string(),
            span: at..end,
        });
        self.pos = end;
        Ok(())
    }

    /// `<!-- ... -->` is output as is; nothing inside it is interpreted
    fn html_comment(&mut self, at: usize) -> Result<(), CompileError> {
        let start = at + HTML_COMMENT_OPEN.len();
        let end = self.source[start..]
            .find(HTML_COMMENT_CLOSE)
            .ok_or_else(|| CompileError::unmatched(Construct::Comment, at..start))?;
        self.literal_run(start + end + HTML_COMMENT_CLOSE.len() - at);
        Ok(())
    }

    fn closing_tag(&mut self, at: usize, name: &str) -> Result<(), CompileError> {
        let source = self.source;
        let name_end = at + 2 + name.len();
        let after = &source[name_end..];
        let trimmed = after.trim_start();
        if !trimmed.starts_with('>') {
            return Err(if trimmed.is_empty() {
                CompileError::unmatched(Construct::Tag, at..name_end)
            } else {
                CompileError::malformed(
                    format!("unexpected content in closing tag </{}>", name),
                    at..name_end,
                )
            });
        }
        let end = source.len() - trimmed.len() + 1;
        if let Some(markup) = self.markup_mut() {
            markup.tags.close(name, at..end)?;
        }
        self.out.literal(&source[at..end]);
        self.pos = end;
        Ok(())
    }

    /// Inside `<name ...>`: attributes, quoted values and the closing `>`
    fn step_tag(&mut self) -> Result<(), CompileError> {
        let source = self.source;
        let rest = &source[self.pos..];
        let Some(offset) = rest.find(|c: char| matches!(c, '>' | '"' | '\'' | '@' | '/')) else {
            let span = match self.stack.top() {
                Frame::Tag { span, .. } => span.clone(),
                _ => self.pos..self.pos,
            };
            return Err(CompileError::unmatched(Construct::Tag, span));
        };
        if offset > 0 {
            self.literal_run(offset);
            return Ok(());
        }

        match rest.as_bytes()[0] {
            b'@' => self.directive(),
            quote @ (b'"' | b'\'') => {
                self.stack.push(Frame::AttributeValue {
                    quote: quote as char,
                    opened_at: self.pos,
                });
                self.literal_run(1);
                Ok(())
            }
            b'/' if rest.starts_with("/>") => {
                self.literal_run(2);
                self.end_tag(true);
                Ok(())
            }
            b'>' => {
                self.literal_run(1);
                self.end_tag(false);
                Ok(())
            }
            _ => {
                self.literal_run(1);
                Ok(())
            }
        }
    }

    fn end_tag(&mut self, self_closing: bool) {
        let Some(Frame::Tag { name, span }) = self.stack.pop() else {
            return;
        };
        if let Some(markup) = self.markup_mut() {
            if self_closing {
                markup.tags.open_self_closing(name, span);
            } else {
                markup.tags.open(name, span);
            }
        }
    }

    fn step_attribute(&mut self) -> Result<(), CompileError> {
        let source = self.source;
        let (quote, opened_at) = match self.stack.top() {
            Frame::AttributeValue { quote, opened_at } => (*quote, *opened_at),
            _ => return self.discard_frame(),
        };
        let rest = &source[self.pos..];
        let Some(offset) = rest.find(|c: char| c == quote || c == '@') else {
            return Err(CompileError::unmatched(
                Construct::Attribute,
                opened_at..opened_at + 1,
            ));
        };
        if offset > 0 {
            self.literal_run(offset);
            return Ok(());
        }
        if rest.starts_with('@') {
            return self.directive();
        }
        self.literal_run(1);
        self.stack.pop();
        Ok(())
    }
}

/// Whether a `<` in a code block starts markup: an element, a closing tag or
/// an HTML comment
fn starts_markup(rest: &str) -> bool {
    tags::starts_tag(rest) || rest.starts_with(HTML_COMMENT_OPEN)
}

/// The error for a frame still open at end of input, if it must be closed
fn unclosed(frame: &Frame) -> Option<CompileError> {
    match frame {
        Frame::Document | Frame::LineEscape { .. } => None,
        Frame::Block(block) => Some(CompileError::unmatched(
            Construct::Block,
            block.opened_at..block.opened_at + 1,
        )),
        Frame::Markup(markup) => match markup.tags.innermost() {
            Some(tag) => Some(CompileError::unmatched(Construct::Tag, tag.span.clone())),
            None if markup.in_text => Some(CompileError::unmatched(
                Construct::Tag,
                markup.opened_at..markup.opened_at + 1,
            )),
            None => None,
        },
        Frame::Tag { span, .. } => Some(CompileError::unmatched(Construct::Tag, span.clone())),
        Frame::AttributeValue { opened_at, .. } => Some(CompileError::unmatched(
            Construct::Attribute,
            *opened_at..*opened_at + 1,
        )),
        Frame::Expression { opened_at } => Some(CompileError::unmatched(
            Construct::Paren,
            *opened_at..*opened_at + 1,
        )),
        Frame::Comment { opened_at } => Some(CompileError::unmatched(
            Construct::Comment,
            *opened_at..*opened_at + 2,
        )),
    }
}
