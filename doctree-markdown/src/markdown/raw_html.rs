//! Incremental tokenization of raw HTML chunks.
//!
//! The Markdown parser hands raw HTML to us one chunk at a time, in the
//! order comrak encounters `HtmlBlock`/`HtmlInline` nodes. A single
//! html5ever tokenizer lives for the whole parse and is fed through a
//! [`BufferQueue`], so tag state carries across chunks; the lowering layer
//! consumes the drained tokens to open and close element scopes.

use std::cell::RefCell;
use std::collections::VecDeque;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::{
    BufferQueue, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

#[derive(Default)]
struct TokenBuffer {
    tokens: RefCell<VecDeque<Token>>,
}

impl TokenSink for TokenBuffer {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        self.tokens.borrow_mut().push_back(token);
        TokenSinkResult::Continue
    }
}

/// Chunk-fed HTML tokenizer with buffered output.
pub(crate) struct HtmlStream {
    tokenizer: Tokenizer<TokenBuffer>,
    input: BufferQueue,
}

impl HtmlStream {
    pub fn new() -> HtmlStream {
        HtmlStream {
            tokenizer: Tokenizer::new(TokenBuffer::default(), TokenizerOpts::default()),
            input: BufferQueue::default(),
        }
    }

    /// Feeds one raw chunk and returns every token completed by it.
    pub fn feed(&mut self, chunk: &str) -> Vec<Token> {
        self.input.push_back(StrTendril::from_slice(chunk));
        let _ = self.tokenizer.feed(&self.input);
        self.drain()
    }

    /// Signals end of input and returns any remaining tokens.
    pub fn finish(&mut self) -> Vec<Token> {
        self.tokenizer.end();
        self.drain()
    }

    fn drain(&mut self) -> Vec<Token> {
        self.tokenizer.sink.tokens.borrow_mut().drain(..).collect()
    }
}

/// HTML void elements: start tags that never take a close tag.
pub(crate) fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use html5ever::tokenizer::TagKind;

    #[test]
    fn tokenizes_tags_and_text_in_one_chunk() {
        let mut stream = HtmlStream::new();
        let tokens = stream.feed("<b class=\"x\">hi</b>");
        let mut kinds = Vec::new();
        for token in tokens {
            match token {
                Token::TagToken(tag) => {
                    kinds.push(match tag.kind {
                        TagKind::StartTag => format!("<{}>", tag.name),
                        TagKind::EndTag => format!("</{}>", tag.name),
                    });
                }
                Token::CharacterTokens(text) => kinds.push(text.to_string()),
                _ => {}
            }
        }
        assert_eq!(kinds, vec!["<b>", "hi", "</b>"]);
    }

    #[test]
    fn comment_survives_as_single_token() {
        let mut stream = HtmlStream::new();
        let tokens = stream.feed("<!--__marker__:0-->");
        let comments: Vec<String> = tokens
            .into_iter()
            .filter_map(|t| match t {
                Token::CommentToken(text) => Some(text.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(comments, vec!["__marker__:0"]);
    }

    #[test]
    fn state_carries_across_chunks() {
        let mut stream = HtmlStream::new();
        let first = stream.feed("<span>");
        let second = stream.feed("</span>");
        assert!(first
            .iter()
            .any(|t| matches!(t, Token::TagToken(tag) if tag.kind == TagKind::StartTag)));
        assert!(second
            .iter()
            .any(|t| matches!(t, Token::TagToken(tag) if tag.kind == TagKind::EndTag)));
    }
}
