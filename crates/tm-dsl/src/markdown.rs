//! Fenced code block extraction from markdown documents.
//!
//! Table definitions travel inside fenced code blocks. This module
//! pulls every fenced block out of an in-memory document and identifies
//! the ones tagged as table definitions; it never touches the
//! filesystem.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// The fence language tag that marks a table definition block.
pub const TABLE_LANGUAGE: &str = "perchance";

/// One fenced code block lifted out of a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Language tag from the opening fence (empty for untagged or
    /// indented blocks).
    pub language: String,
    /// The block's content, fences excluded.
    pub content: String,
    /// Byte range of the whole block (fences included) in the document.
    pub span: Range<usize>,
    /// Byte offset in the document where the content begins; used to
    /// rebase content-relative diagnostic spans.
    pub content_start: usize,
}

/// Whether a block carries the table-definition language tag.
pub fn is_table_block(block: &CodeBlock) -> bool {
    block.language.eq_ignore_ascii_case(TABLE_LANGUAGE)
}

/// Extract every fenced or indented code block from `source`.
pub fn extract_code_blocks(source: &str) -> Vec<CodeBlock> {
    let parser = Parser::new_ext(source, Options::empty());
    let mut blocks = Vec::new();
    let mut current: Option<CodeBlock> = None;

    for (event, range) in parser.into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                current = Some(CodeBlock {
                    language,
                    content: String::new(),
                    span: range.clone(),
                    content_start: range.start,
                });
            }
            Event::Text(text) => {
                if let Some(block) = current.as_mut() {
                    if block.content.is_empty() {
                        block.content_start = range.start;
                    }
                    block.content.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
            }
            _ => {}
        }
    }

    blocks
}
