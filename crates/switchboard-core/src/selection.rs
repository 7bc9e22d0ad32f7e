//! Capability scoring for auto-selection
//!
//! A scorer maps `(query, card)` to a number. The orchestrator picks the
//! highest score, breaking ties by registration order, so any scorer that is
//! a pure function of its inputs keeps routing deterministic.

use std::collections::{BTreeMap, BTreeSet};

use crate::card::AgentCard;

/// Pluggable matching strategy between a query and an agent's declared tags
pub trait CapabilityScorer: Send + Sync {
    /// Human-readable name for logging
    fn name(&self) -> &str;

    fn score(&self, query: &str, card: &AgentCard) -> f32;
}

/// The outcome of auto-selection
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub agent_name: String,
    pub score: f32,
}

/// Pick the best card: highest score above `min_score`, first-registered on ties
pub fn select<'a>(
    scorer: &dyn CapabilityScorer,
    query: &str,
    cards: impl IntoIterator<Item = &'a AgentCard>,
    min_score: f32,
) -> Option<Selection> {
    let mut best: Option<Selection> = None;
    for card in cards {
        let score = scorer.score(query, card);
        if score <= min_score {
            continue;
        }
        // Strictly greater keeps the earlier card on a tie
        if best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(Selection {
                agent_name: card.name.clone(),
                score,
            });
        }
    }
    best
}

const SEARCH_KEYWORDS: &[&str] = &[
    "search",
    "research",
    "find",
    "information",
    "info",
    "lookup",
    "latest",
    "news",
    "learn",
    "compare",
];

/// Question words that lean towards search without naming a topic
const SEARCH_HINTS: &[&str] = &["what", "who", "why", "how", "when", "where", "new", "explain"];

/// A hint counts for a fraction of a keyword, so a topical keyword outweighs
/// a question full of hints
const HINT_WEIGHT: f32 = 0.25;

const VIDEO_KEYWORDS: &[&str] = &[
    "video", "videos", "youtube", "youtu", "watch", "clip", "transcript", "channel", "vimeo",
];

const PODCAST_KEYWORDS: &[&str] = &["podcast", "episode", "audio", "listen", "show"];

type KeywordTable = BTreeMap<String, BTreeSet<String>>;

fn table_of(entries: &[(&str, &[&str])]) -> KeywordTable {
    entries
        .iter()
        .map(|(tag, words)| {
            (
                tag.to_string(),
                words.iter().map(|w| w.to_string()).collect(),
            )
        })
        .collect()
}

fn builtin_keywords() -> KeywordTable {
    table_of(&[
        ("search", SEARCH_KEYWORDS),
        ("research", SEARCH_KEYWORDS),
        ("web-search", SEARCH_KEYWORDS),
        ("video", VIDEO_KEYWORDS),
        ("video-analysis", VIDEO_KEYWORDS),
        ("youtube", VIDEO_KEYWORDS),
        ("podcast", PODCAST_KEYWORDS),
    ])
}

fn builtin_hints() -> KeywordTable {
    table_of(&[
        ("search", SEARCH_HINTS),
        ("research", SEARCH_HINTS),
        ("web-search", SEARCH_HINTS),
    ])
}

/// Lowercase alphanumeric words of `text`
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Keyword-table scorer.
///
/// Each tag expands to its table entry plus the words of the tag itself
/// (`web-search` -> `web`, `search`). Every distinct query word that hits one of
/// the card's keywords scores 1; a word that only hits a hint scores
/// `HINT_WEIGHT`.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    table: KeywordTable,
    hints: KeywordTable,
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self {
            table: builtin_keywords(),
            hints: builtin_hints(),
        }
    }
}

impl KeywordScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scorer with no built-in table; tags only match their own words
    pub fn empty() -> Self {
        Self {
            table: BTreeMap::new(),
            hints: BTreeMap::new(),
        }
    }

    /// Extend the keyword list for a tag
    pub fn with_keywords<I, S>(mut self, tag: &str, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self.table.entry(tag.to_lowercase()).or_default();
        for kw in keywords {
            entry.extend(tokenize(kw.as_ref()));
        }
        self
    }

    /// Keywords and hints of every tag on the card
    fn keywords_for(&self, card: &AgentCard) -> (BTreeSet<String>, BTreeSet<String>) {
        let mut keywords = BTreeSet::new();
        let mut hints = BTreeSet::new();
        for tag in card.tags() {
            let lower = tag.to_lowercase();
            if let Some(words) = self.table.get(&lower) {
                keywords.extend(words.iter().cloned());
            }
            if let Some(words) = self.hints.get(&lower) {
                hints.extend(words.iter().cloned());
            }
            keywords.extend(tokenize(&lower));
        }
        (keywords, hints)
    }
}

impl CapabilityScorer for KeywordScorer {
    fn name(&self) -> &str {
        "keyword"
    }

    fn score(&self, query: &str, card: &AgentCard) -> f32 {
        let (keywords, hints) = self.keywords_for(card);
        tokenize(query)
            .iter()
            .map(|word| {
                if keywords.contains(word) {
                    1.0
                } else if hints.contains(word) {
                    HINT_WEIGHT
                } else {
                    0.0
                }
            })
            .sum()
    }
}
