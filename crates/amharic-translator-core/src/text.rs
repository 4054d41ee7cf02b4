//! Plain-text normalisation and chunking.
//!
//! Translation backends accept bounded inputs, so free text is cleaned and cut
//! into word-aligned chunks of at most `max_len` characters before it is sent.
//! A single word longer than `max_len` is emitted on its own and is allowed to
//! exceed the limit; words are never split.

use std::iter::Peekable;
use std::str::SplitWhitespace;

/// Collapse every whitespace run to a single space and trim both ends.
pub fn clean(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into word-aligned chunks of at most `max_len` characters.
///
/// Chunks never are empty, and joining them with single spaces gives back
/// `clean(text)`. Cloning the iterator restarts from the same position.
pub fn split(text: &str, max_len: usize) -> Chunks<'_> {
    Chunks {
        words: text.split_whitespace().peekable(),
        max_len,
    }
}

/// Iterator over the chunks of a text. See [`split`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    words: Peekable<SplitWhitespace<'a>>,
    max_len: usize,
}

impl Iterator for Chunks<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let first = self.words.next()?;
        let mut chunk = first.to_string();
        let mut len = first.chars().count();

        if len > self.max_len {
            return Some(chunk);
        }

        while let Some(word) = self.words.peek() {
            let word_len = word.chars().count();
            if len + 1 + word_len > self.max_len {
                break;
            }
            chunk.push(' ');
            chunk.push_str(word);
            len += 1 + word_len;
            self.words.next();
        }

        Some(chunk)
    }
}
