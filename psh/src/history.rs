//! In-memory history of processed lines and `replay N` substitution.

use std::collections::VecDeque;
use tracing::debug;

const REPLAY_PREFIX: &str = "replay ";

/// Bounded ring buffer of processed lines; the oldest entry is evicted when
/// a new line arrives at capacity.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        History {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records `line` unless it is blank.
    pub fn record(&mut self, line: &str) {
        if line.trim().is_empty() || self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line.to_string());
    }

    /// 1-based access, oldest first.
    pub fn get(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(String::as_str)
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// Expands a leading `replay N` into history entry N followed by the rest
    /// of the line as written. Lines that do not name a valid entry come back
    /// unchanged.
    pub fn substitute_replay(&self, line: &str) -> String {
        let Some(args) = line.strip_prefix(REPLAY_PREFIX) else {
            return line.to_string();
        };
        let args = args.trim_start_matches(' ');
        let token_end = args.find(' ').unwrap_or(args.len());
        let (token, rest) = args.split_at(token_end);

        let digits = token
            .find(|c: char| !c.is_ascii_digit())
            .map_or(token, |end| &token[..end]);
        let Some(entry) = digits.parse::<usize>().ok().and_then(|n| self.get(n)) else {
            return line.to_string();
        };

        let replayed = format!("{entry}{rest}");
        debug!("replay '{}' -> '{}'", line, replayed);
        replayed
    }
}
