use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::EntryId;
use crate::registry::EntrySet;

pub const PATTERN_SIZE_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    pub ids: BTreeSet<EntryId>,
    pub result: MatchResult,
}

#[derive(Debug, Clone)]
pub struct QueryPattern {
    matchers: Vec<Regex>,
}

impl QueryPattern {
    /// Returns `None` for a blank query, which matches everything.
    pub fn compile(query: &str) -> Option<Self> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return None;
        }

        let alternation = tokens
            .iter()
            .map(|token| regex::escape(token))
            .collect::<Vec<_>>()
            .join("|");

        let matchers = match build(&alternation) {
            Ok(regex) => vec![regex],
            Err(error) => {
                warn!(%error, tokens = tokens.len(), "query pattern rejected; compiling tokens separately");
                tokens
                    .iter()
                    .filter_map(|token| match build(&regex::escape(token)) {
                        Ok(regex) => Some(regex),
                        Err(error) => {
                            warn!(%error, token_len = token.len(), "dropping query token");
                            None
                        }
                    })
                    .collect()
            }
        };

        Some(Self { matchers })
    }

    pub fn is_match(&self, search_key: &str) -> bool {
        self.matchers.iter().any(|regex| regex.is_match(search_key))
    }
}

pub fn tokenize(query: &str) -> Vec<&str> {
    query.split_whitespace().collect()
}

/// Runs `query` against every entry. Never reorders entries and never fails;
/// a token that cannot be compiled simply matches nothing.
pub fn match_entries(query: &str, entries: &EntrySet) -> MatchSet {
    let pattern = QueryPattern::compile(query);

    let ids: BTreeSet<EntryId> = entries
        .iter()
        .filter(|entry| {
            pattern
                .as_ref()
                .map(|pattern| pattern.is_match(entry.search_key()))
                .unwrap_or(true)
        })
        .map(|entry| entry.id())
        .collect();

    MatchSet {
        result: MatchResult {
            matched_count: ids.len(),
            total_count: entries.len(),
        },
        ids,
    }
}

fn build(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
}
