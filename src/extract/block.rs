//! Best-result block extraction
//!
//! A block starts right after a literal banner and runs to the first blank
//! line (`"\n\n"`) or end of text. Training writes a new block every time the
//! validation score improves, so the last block in a log is the authoritative
//! one.

use crate::precedence::last_wins;

/// Finds banner-delimited blocks in log text.
#[derive(Debug, Clone)]
pub struct BlockExtractor {
    banner: String,
}

impl BlockExtractor {
    /// Extractor for the given literal banner.
    #[must_use]
    pub fn new(banner: impl Into<String>) -> Self {
        Self {
            banner: banner.into(),
        }
    }

    /// The literal banner.
    #[must_use]
    pub fn banner(&self) -> &str {
        &self.banner
    }

    /// All blocks in order of appearance (banner excluded).
    ///
    /// Blocks never overlap: scanning resumes after the blank line that closed
    /// the previous block, so a banner inside an unterminated block is part of
    /// that block's text.
    #[must_use]
    pub fn blocks<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut blocks = Vec::new();
        if self.banner.is_empty() {
            return blocks;
        }

        let mut cursor = 0;
        while let Some(offset) = text[cursor..].find(&self.banner) {
            let start = cursor + offset + self.banner.len();
            let (end, next) = match text[start..].find("\n\n") {
                Some(blank) => (start + blank, start + blank + 2),
                None => (text.len(), text.len()),
            };
            blocks.push(&text[start..end]);
            cursor = next;
        }

        blocks
    }

    /// The authoritative (last) block, or `None` if the banner never occurs.
    #[must_use]
    pub fn last_block<'a>(&self, text: &'a str) -> Option<&'a str> {
        last_wins(self.blocks(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BANNER;

    #[test]
    fn test_no_banner() {
        let extractor = BlockExtractor::new(DEFAULT_BANNER);
        assert!(extractor.blocks("epoch 1 loss 0.3\nepoch 2 loss 0.2\n").is_empty());
        assert!(extractor.last_block("").is_none());
    }

    #[test]
    fn test_block_ends_at_blank_line() {
        let extractor = BlockExtractor::new("BEST");
        let text = "noise\nBEST\nValid: a\nTest: b\n\ntrailing epoch lines\n";
        assert_eq!(extractor.blocks(text), ["\nValid: a\nTest: b"]);
    }

    #[test]
    fn test_block_runs_to_end_of_text() {
        let extractor = BlockExtractor::new("BEST");
        assert_eq!(extractor.blocks("x\nBEST\nTest: 1\n"), ["\nTest: 1\n"]);
    }

    #[test]
    fn test_last_block_wins() {
        let extractor = BlockExtractor::new("BEST");
        let text = "BEST\nTest: early\n\nepoch 30\nBEST\nTest: late\n\n";
        assert_eq!(extractor.blocks(text).len(), 2);
        assert_eq!(extractor.last_block(text), Some("\nTest: late"));
    }

    #[test]
    fn test_unicode_banner() {
        let extractor = BlockExtractor::new(DEFAULT_BANNER);
        let text = format!("start\n{DEFAULT_BANNER}\nTest: recall@10: 0.05\n\n");
        assert_eq!(extractor.last_block(&text), Some("\nTest: recall@10: 0.05"));
    }
}
