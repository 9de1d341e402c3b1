//! Bounded chat transcript kept for display.

use std::collections::VecDeque;

pub const DEFAULT_TRANSCRIPT_CAPACITY: usize = 50;

/// Who wrote a chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub text: String,
    pub author: Author,
}

/// FIFO of chat entries. Pushing past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct ChatTranscript {
    entries: VecDeque<ChatEntry>,
    capacity: usize,
}

impl ChatTranscript {
    /// A zero capacity is bumped to one so the latest entry is always visible.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, author: Author, text: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ChatEntry {
            text: text.into(),
            author,
        });
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(Author::User, text);
    }

    pub fn push_bot(&mut self, text: impl Into<String>) {
        self.push(Author::Bot, text);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> impl Iterator<Item = &ChatEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.back()
    }
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSCRIPT_CAPACITY)
    }
}
