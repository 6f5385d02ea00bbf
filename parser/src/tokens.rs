//! Index-based token cursor.

use std::mem;

/// An ordered token buffer consumed left to right.
///
/// Consumed tokens stay in the buffer behind the cursor; [`remaining`]
/// exposes only the unconsumed tail. The alias resolver swaps the whole tail
/// out in one step with [`replace_remaining`] rather than rebuilding the
/// cursor.
///
/// [`remaining`]: TokenStream::remaining
/// [`replace_remaining`]: TokenStream::replace_remaining
///
/// # Examples
///
/// ```
/// use cmdtree_parser::TokenStream;
///
/// let mut tokens: TokenStream = ["remote", "add", "origin"].into_iter().collect();
/// assert_eq!(tokens.peek(), Some("remote"));
/// assert_eq!(tokens.next().as_deref(), Some("remote"));
/// assert_eq!(tokens.remaining(), ["add", "origin"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: Vec<String>,
    cursor: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens, cursor: 0 }
    }

    /// Next token, without consuming it.
    pub fn peek(&self) -> Option<&str> {
        self.tokens.get(self.cursor).map(String::as_str)
    }

    /// Unconsumed tokens.
    pub fn remaining(&self) -> &[String] {
        &self.tokens[self.cursor..]
    }

    pub fn len(&self) -> usize {
        self.tokens.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the next token in place. Does nothing on an exhausted stream.
    pub fn replace_front(&mut self, token: String) {
        if let Some(slot) = self.tokens.get_mut(self.cursor) {
            *slot = token;
        }
    }

    /// Replaces every unconsumed token and rewinds onto the new ones.
    pub fn replace_remaining(&mut self, tokens: Vec<String>) {
        self.tokens = tokens;
        self.cursor = 0;
    }

    /// Consumes the stream, returning the unconsumed tokens.
    pub fn into_remaining(mut self) -> Vec<String> {
        self.tokens.split_off(self.cursor)
    }
}

impl Iterator for TokenStream {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let token = self.tokens.get_mut(self.cursor).map(mem::take)?;
        self.cursor += 1;
        Some(token)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }
}

impl PartialEq for TokenStream {
    fn eq(&self, other: &Self) -> bool {
        self.remaining() == other.remaining()
    }
}

impl Eq for TokenStream {}

impl From<Vec<String>> for TokenStream {
    fn from(tokens: Vec<String>) -> Self {
        Self::new(tokens)
    }
}

impl<S: Into<String>> FromIterator<S> for TokenStream {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}
