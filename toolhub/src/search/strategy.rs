//! Scoring strategies for the tool search engine
//!
//! Every strategy scores candidates in `[0, 1]` and leaves out candidates it
//! does not match at all. [`WeightedStrategy`] sums weighted sub-scores, so a
//! sub-strategy that finds nothing contributes zero rather than a penalty.

use super::index::{tokenize, StaticIndexEntry};
use super::types::SearchResult;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::collections::HashMap;

/// Scores index entries against a normalized query
pub trait SearchStrategy: Send + Sync {
    /// Identifier reported in [`SearchResult::strategy_type`]
    fn strategy_type(&self) -> &'static str;

    /// Score `candidates`, returning results in candidate order
    ///
    /// `query` is already trimmed and lower-cased. Candidates with a score of
    /// zero are omitted.
    fn search(&self, query: &str, candidates: &[&StaticIndexEntry]) -> Vec<SearchResult>;
}

/// A query token matches a candidate token when one is a prefix of the other
///
/// The reverse direction needs at least three characters so that `a` never
/// matches `abc` from the candidate side.
fn token_matches(query_token: &str, candidate: &str) -> bool {
    candidate.starts_with(query_token)
        || (candidate.len() >= 3 && query_token.starts_with(candidate))
}

/// Fraction of query tokens matching at least one candidate token
fn token_coverage<'a, I>(query_tokens: &[String], candidates: I) -> f64
where
    I: Iterator<Item = &'a String> + Clone,
{
    if query_tokens.is_empty() {
        return 0.0;
    }

    let matched = query_tokens
        .iter()
        .filter(|q| candidates.clone().any(|c| token_matches(q, c)))
        .count();
    matched as f64 / query_tokens.len() as f64
}

fn score_all<F>(
    strategy_type: &'static str,
    query: &str,
    candidates: &[&StaticIndexEntry],
    score: F,
) -> Vec<SearchResult>
where
    F: Fn(&[String], &StaticIndexEntry) -> f64,
{
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() {
        return Vec::new();
    }

    candidates
        .iter()
        .filter_map(|entry| {
            let score = score(query_tokens.as_slice(), *entry);
            (score > 0.0).then(|| SearchResult::new(&entry.name, score, strategy_type))
        })
        .collect()
}

/// Scores the tool name: exact 1.0, containment 0.8, partial token overlap up to 0.6
#[derive(Debug, Default, Clone, Copy)]
pub struct NameStrategy;

impl NameStrategy {
    fn score(query_tokens: &[String], entry: &StaticIndexEntry) -> f64 {
        let compact_query = query_tokens.join("_");
        let compact_name = entry.name_tokens.join("_");

        if compact_name == compact_query {
            1.0
        } else if compact_name.contains(&compact_query) {
            0.8
        } else {
            0.6 * token_coverage(query_tokens, entry.name_tokens.iter())
        }
    }
}

impl SearchStrategy for NameStrategy {
    fn strategy_type(&self) -> &'static str {
        "name"
    }

    fn search(&self, query: &str, candidates: &[&StaticIndexEntry]) -> Vec<SearchResult> {
        score_all(self.strategy_type(), query, candidates, Self::score)
    }
}

/// Scores the description: the whole query as a phrase 1.0, else token coverage
#[derive(Debug, Default, Clone, Copy)]
pub struct DescriptionStrategy;

impl DescriptionStrategy {
    fn score(query_tokens: &[String], entry: &StaticIndexEntry) -> f64 {
        if query_tokens.len() > 1 {
            let phrase = query_tokens.join(" ");
            if entry.description_tokens.join(" ").contains(&phrase) {
                return 1.0;
            }
        }
        token_coverage(query_tokens, entry.description_tokens.iter())
    }
}

impl SearchStrategy for DescriptionStrategy {
    fn strategy_type(&self) -> &'static str {
        "description"
    }

    fn search(&self, query: &str, candidates: &[&StaticIndexEntry]) -> Vec<SearchResult> {
        score_all(self.strategy_type(), query, candidates, Self::score)
    }
}

/// Scores the category and tags by token coverage
#[derive(Debug, Default, Clone, Copy)]
pub struct CategoryStrategy;

impl CategoryStrategy {
    fn score(query_tokens: &[String], entry: &StaticIndexEntry) -> f64 {
        let mut labels = tokenize(&entry.category);
        labels.extend(entry.tags.iter().flat_map(|tag| tokenize(tag)));
        token_coverage(query_tokens, labels.iter())
    }
}

impl SearchStrategy for CategoryStrategy {
    fn strategy_type(&self) -> &'static str {
        "category"
    }

    fn search(&self, query: &str, candidates: &[&StaticIndexEntry]) -> Vec<SearchResult> {
        score_all(self.strategy_type(), query, candidates, Self::score)
    }
}

/// Subsequence matching of the query against the tool name
///
/// The skim score is normalized by the score of the query matched against
/// itself, which is the best any candidate can reach.
#[derive(Debug, Default, Clone, Copy)]
pub struct FuzzyStrategy;

impl SearchStrategy for FuzzyStrategy {
    fn strategy_type(&self) -> &'static str {
        "fuzzy"
    }

    fn search(&self, query: &str, candidates: &[&StaticIndexEntry]) -> Vec<SearchResult> {
        let pattern: String = tokenize(query).concat();
        if pattern.is_empty() {
            return Vec::new();
        }

        let matcher = SkimMatcherV2::default();
        let best = match matcher.fuzzy_match(&pattern, &pattern) {
            Some(best) if best > 0 => best as f64,
            _ => return Vec::new(),
        };

        candidates
            .iter()
            .filter_map(|entry| {
                let raw = matcher.fuzzy_match(&entry.name.to_lowercase(), &pattern)?;
                let score = (raw as f64 / best).min(1.0);
                (score > 0.0).then(|| SearchResult::new(&entry.name, score, self.strategy_type()))
            })
            .collect()
    }
}

/// One weighted member of a [`WeightedStrategy`]
pub struct WeightedComponent {
    /// Member strategy
    pub strategy: Box<dyn SearchStrategy>,
    /// Multiplier applied to the member's scores
    pub weight: f64,
}

/// Weighted sum of several strategies, capped at 1.0
///
/// `match_details` carries the raw score of every member that matched.
pub struct WeightedStrategy {
    components: Vec<WeightedComponent>,
}

impl WeightedStrategy {
    /// Empty combination; add members with [`with`](Self::with)
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Add a member strategy with its weight
    pub fn with(mut self, strategy: impl SearchStrategy + 'static, weight: f64) -> Self {
        self.components.push(WeightedComponent {
            strategy: Box::new(strategy),
            weight,
        });
        self
    }
}

impl Default for WeightedStrategy {
    /// name 0.4, description 0.3, category 0.1, fuzzy 0.2
    fn default() -> Self {
        Self::new()
            .with(NameStrategy, 0.4)
            .with(DescriptionStrategy, 0.3)
            .with(CategoryStrategy, 0.1)
            .with(FuzzyStrategy, 0.2)
    }
}

impl SearchStrategy for WeightedStrategy {
    fn strategy_type(&self) -> &'static str {
        "weighted"
    }

    fn search(&self, query: &str, candidates: &[&StaticIndexEntry]) -> Vec<SearchResult> {
        let mut totals: HashMap<String, (f64, serde_json::Map<String, serde_json::Value>)> =
            HashMap::new();

        for component in &self.components {
            for result in component.strategy.search(query, candidates) {
                let (total, details) = totals.entry(result.tool_name).or_default();
                *total += result.score * component.weight;
                details.insert(
                    component.strategy.strategy_type().to_string(),
                    serde_json::json!(super::types::round_score(result.score)),
                );
            }
        }

        candidates
            .iter()
            .filter_map(|entry| {
                let (total, details) = totals.remove(&entry.name)?;
                (total > 0.0).then(|| {
                    SearchResult::new(&entry.name, total.min(1.0), self.strategy_type())
                        .with_details(serde_json::Value::Object(details))
                })
            })
            .collect()
    }
}
