//! Final leaderboard and its text wire form.
//!
//! One `name\tscore` line per entry, lines joined with `\n`. Tabs and
//! newlines inside names become a single space before encoding. Existing
//! mirrors parse exactly this format.

use serde::{Deserialize, Serialize};

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Display name.
    pub name: String,
    /// Score.
    pub score: u32,
}

impl LeaderboardEntry {
    /// Create an entry.
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Replace field and record separators in a name with a space.
pub fn sanitize_name(name: &str) -> String {
    name.replace(['\t', '\n'], " ")
}

/// Encode entries. An empty list encodes to an empty string.
pub fn encode(entries: &[LeaderboardEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{}\t{}", sanitize_name(&e.name), e.score))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode entries. Lines without a tab or with an unparsable score are skipped.
pub fn decode(text: &str) -> Vec<LeaderboardEntry> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n')
        .filter_map(|line| {
            let (name, score) = line.split_once('\t')?;
            let score = score.trim().parse::<u32>().ok()?;
            Some(LeaderboardEntry::new(name, score))
        })
        .collect()
}
