//! Next-item selection
//!
//! Two strategies decide what to show after a vote:
//!
//! - [`NextItemStrategy::TagOverlap`]: the server's order-dependent pick of the
//!   first item sharing (or not sharing) a tag with the rated item.
//! - [`NextItemStrategy::Weighted`]: the client's preference-weighted ranking
//!   over the language-filtered pool.
//!
//! Both are pure functions of their inputs plus the supplied RNG.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Item, Locale, RatingEvent, RatingValue};
use crate::preference::PreferenceWeights;

/// Upper bound (exclusive) of the tie-breaking jitter added to every score
pub const SCORE_JITTER: f64 = 0.1;

/// Fraction of the ranking skipped before sampling on the dissimilar path
pub const DISSIMILAR_TAIL_START: f64 = 0.7;

/// Whether the next item should resemble the rated one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Similar,
    Dissimilar,
}

impl From<RatingValue> for Direction {
    fn from(value: RatingValue) -> Self {
        match value {
            RatingValue::Up => Direction::Similar,
            RatingValue::Down => Direction::Dissimilar,
        }
    }
}

/// Named selection strategies behind one entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextItemStrategy {
    TagOverlap,
    Weighted,
}

/// Inputs shared by both strategies
#[derive(Debug, Clone, Copy)]
pub struct NextItemQuery<'a> {
    /// The item that was just rated
    pub current: &'a Item,
    /// Every known item, in store order
    pub items: &'a [Item],
    /// Rating history, oldest first
    pub history: &'a [RatingEvent],
    pub language: Locale,
    pub direction: Direction,
}

impl NextItemStrategy {
    /// Pick the next item, or `None` when there is nothing to show
    pub fn select<'a, R: Rng + ?Sized>(
        self,
        query: &NextItemQuery<'a>,
        rng: &mut R,
    ) -> Option<&'a Item> {
        match self {
            NextItemStrategy::TagOverlap => {
                select_by_tag_overlap(query.current, query.items, query.direction, rng)
            }
            NextItemStrategy::Weighted => select_weighted(
                query.items,
                query.history,
                query.language,
                query.direction,
                rng,
            ),
        }
    }
}

/// Server-side selection by tag overlap
///
/// Scans `pool` in order, skipping `current` and untagged items, for the first
/// item that shares a tag with `current` ([`Direction::Similar`]) or shares none
/// ([`Direction::Dissimilar`]). Without a match, falls back to a uniformly
/// random item from the pool minus `current`. An empty pool yields `None`.
///
/// Untagged candidates are skipped in both directions, so an untagged item is
/// never a "dissimilar" match; it can still be returned by the random fallback.
pub fn select_by_tag_overlap<'a, R: Rng + ?Sized>(
    current: &Item,
    pool: &'a [Item],
    direction: Direction,
    rng: &mut R,
) -> Option<&'a Item> {
    let candidates: Vec<&'a Item> = pool.iter().filter(|c| c.id != current.id).collect();

    let first_match = candidates.iter().copied().find(|candidate| {
        if candidate.tags.is_empty() {
            return false;
        }
        let shares = candidate.shares_tag_with(current);
        match direction {
            Direction::Similar => shares,
            Direction::Dissimilar => !shares,
        }
    });

    first_match.or_else(|| candidates.choose(rng).copied())
}

/// Candidate with its directed, jittered score
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    pub item: &'a Item,
    pub score: f64,
}

/// Score and sort language-matching candidates, best first
///
/// Scores are the preference score (negated for [`Direction::Dissimilar`])
/// plus jitter in `[0, SCORE_JITTER)`.
pub fn rank_candidates<'a, R: Rng + ?Sized>(
    items: &'a [Item],
    history: &[RatingEvent],
    language: Locale,
    direction: Direction,
    rng: &mut R,
) -> Vec<ScoredCandidate<'a>> {
    let weights = PreferenceWeights::from_history(items, history);

    let mut scored: Vec<ScoredCandidate<'a>> = items
        .iter()
        .filter(|item| item.matches_language(language))
        .map(|item| {
            let base = weights.score(item);
            let directed = match direction {
                Direction::Similar => base,
                Direction::Dissimilar => -base,
            };
            ScoredCandidate {
                item,
                score: directed + rng.gen::<f64>() * SCORE_JITTER,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// Client-side preference-weighted selection
///
/// 1. Restrict to items whose `lang` is unset or equals `language`; if none
///    remain, return a random item from the full list.
/// 2. Without history, return a random language-matching item.
/// 3. Otherwise rank with [`rank_candidates`]. Similar: the top item.
///    Dissimilar: a uniform pick from ranks `floor(0.7 * n)..n`.
pub fn select_weighted<'a, R: Rng + ?Sized>(
    items: &'a [Item],
    history: &[RatingEvent],
    language: Locale,
    direction: Direction,
    rng: &mut R,
) -> Option<&'a Item> {
    if items.is_empty() {
        return None;
    }

    let language_matches: Vec<&'a Item> = items
        .iter()
        .filter(|item| item.matches_language(language))
        .collect();
    if language_matches.is_empty() {
        return items.choose(rng);
    }

    if history.is_empty() {
        return language_matches.choose(rng).copied();
    }

    let ranked = rank_candidates(items, history, language, direction, rng);

    match direction {
        Direction::Similar => ranked.first().map(|c| c.item),
        Direction::Dissimilar => {
            let n = ranked.len();
            let start = (n as f64 * DISSIMILAR_TAIL_START).floor() as usize;
            let end = n.saturating_sub(1);
            if start > end {
                return ranked.last().map(|c| c.item);
            }
            let idx = rng.gen_range(start..=end);
            ranked.get(idx).map(|c| c.item)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn vote(item_id: &str, value: RatingValue) -> RatingEvent {
        RatingEvent::new(item_id, value, None)
    }

    /// Random pool of `n` items drawing tags from a small alphabet
    fn random_pool(r: &mut StdRng, n: usize) -> Vec<Item> {
        const TAGS: [&str; 5] = ["a", "b", "c", "d", "e"];
        (0..n)
            .map(|i| {
                let count = r.gen_range(0..3);
                let tags: Vec<&str> = (0..count).map(|_| TAGS[r.gen_range(0..TAGS.len())]).collect();
                Item::new(format!("item-{i}")).with_tags(tags)
            })
            .collect()
    }

    #[test]
    fn test_similar_returns_first_tag_match() {
        let pool = vec![
            Item::new("a").with_tags(["x"]),
            Item::new("b").with_tags(["y"]),
        ];
        let current = Item::new("c").with_tags(["x"]);

        for seed in 0..20 {
            let picked = select_by_tag_overlap(&current, &pool, Direction::Similar, &mut rng(seed));
            assert_eq!(picked.map(|i| i.id.as_str()), Some("a"));
        }
    }

    #[test]
    fn test_dissimilar_returns_first_tagged_non_match() {
        let current = Item::new("c").with_tags(["x"]);
        let pool = vec![
            current.clone(),
            Item::new("untagged"),
            Item::new("a").with_tags(["x", "z"]),
            Item::new("b").with_tags(["y"]),
            Item::new("d").with_tags(["w"]),
        ];

        let picked = select_by_tag_overlap(&current, &pool, Direction::Dissimilar, &mut rng(1));
        assert_eq!(picked.map(|i| i.id.as_str()), Some("b"));
    }

    #[test]
    fn test_tag_overlap_fallback_excludes_current() {
        let current = Item::new("c").with_tags(["x"]);
        let pool = vec![current.clone(), Item::new("a"), Item::new("b")];

        let mut seen = HashSet::new();
        for seed in 0..200 {
            let picked = select_by_tag_overlap(&current, &pool, Direction::Similar, &mut rng(seed))
                .expect("non-empty pool");
            assert_ne!(picked.id, "c");
            seen.insert(picked.id.clone());
        }
        assert_eq!(seen.len(), 2, "fallback should reach every candidate");
    }

    #[test]
    fn test_tag_overlap_empty_pool_is_none() {
        let current = Item::new("c").with_tags(["x"]);
        assert!(select_by_tag_overlap(&current, &[], Direction::Similar, &mut rng(0)).is_none());
        let only_current = vec![current.clone()];
        assert!(
            select_by_tag_overlap(&current, &only_current, Direction::Dissimilar, &mut rng(0))
                .is_none()
        );
    }

    #[test]
    fn test_tag_overlap_exclusivity_over_random_pools() {
        let mut r = rng(7);
        for round in 0..300 {
            let size = r.gen_range(0..8);
            let pool = random_pool(&mut r, size);
            let current = pool
                .first()
                .cloned()
                .unwrap_or_else(|| Item::new("outside").with_tags(["a"]));

            for direction in [Direction::Similar, Direction::Dissimilar] {
                let Some(picked) = select_by_tag_overlap(&current, &pool, direction, &mut r) else {
                    assert!(pool.iter().all(|i| i.id == current.id), "round {round}");
                    continue;
                };
                assert_ne!(picked.id, current.id, "round {round}");

                let qualifying = pool.iter().find(|c| {
                    c.id != current.id
                        && !c.tags.is_empty()
                        && match direction {
                            Direction::Similar => c.shares_tag_with(&current),
                            Direction::Dissimilar => !c.shares_tag_with(&current),
                        }
                });
                if let Some(expected) = qualifying {
                    assert_eq!(picked.id, expected.id, "round {round}");
                    match direction {
                        Direction::Similar => assert!(picked.shares_tag_with(&current)),
                        Direction::Dissimilar => assert!(!picked.shares_tag_with(&current)),
                    }
                }
            }
        }
    }

    #[test]
    fn test_weighted_without_history_stays_in_language_pool() {
        let mut items: Vec<Item> = (0..5)
            .map(|i| Item::new(format!("en-{i}")).with_lang(Locale::En))
            .collect();
        items.push(Item::new("ro-0").with_lang(Locale::Ro));
        items.push(Item::new("ru-0").with_lang(Locale::Ru));

        let mut seen = HashSet::new();
        let mut r = rng(3);
        for _ in 0..500 {
            let picked = select_weighted(&items, &[], Locale::En, Direction::Similar, &mut r)
                .expect("pool is non-empty");
            assert_eq!(picked.lang, Some(Locale::En));
            seen.insert(picked.id.clone());
        }
        assert_eq!(seen.len(), 5, "every English item should be reachable");
    }

    #[test]
    fn test_weighted_unset_lang_matches_any_language() {
        let items = vec![Item::new("neutral"), Item::new("ro").with_lang(Locale::Ro)];
        for seed in 0..50 {
            let picked = select_weighted(&items, &[], Locale::Ru, Direction::Similar, &mut rng(seed));
            assert_eq!(picked.map(|i| i.id.as_str()), Some("neutral"));
        }
    }

    #[test]
    fn test_weighted_falls_back_to_unfiltered_pool() {
        let items = vec![
            Item::new("ro").with_lang(Locale::Ro),
            Item::new("ru").with_lang(Locale::Ru),
        ];
        let history = vec![vote("ro", RatingValue::Up)];
        let mut seen = HashSet::new();
        for seed in 0..100 {
            let picked = select_weighted(&items, &history, Locale::En, Direction::Similar, &mut rng(seed))
                .expect("fallback draws from all items");
            seen.insert(picked.id.clone());
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_weighted_empty_items_is_none() {
        assert!(select_weighted(&[], &[], Locale::En, Direction::Similar, &mut rng(0)).is_none());
    }

    #[test]
    fn test_weighted_prefers_upvoted_category() {
        let items = vec![
            Item::new("liked").with_category("tech"),
            Item::new("disliked").with_category("ads"),
            Item::new("tech").with_category("tech"),
            Item::new("ads").with_category("ads"),
        ];
        let history = vec![vote("liked", RatingValue::Up), vote("disliked", RatingValue::Down)];

        for seed in 0..100 {
            let picked = select_weighted(&items, &history, Locale::En, Direction::Similar, &mut rng(seed))
                .expect("candidates exist");
            assert_eq!(picked.category, "tech", "seed {seed}");
        }
    }

    #[test]
    fn test_rank_scores_include_bounded_jitter() {
        let items = vec![
            Item::new("a").with_category("tech"),
            Item::new("b").with_category("ads"),
            Item::new("c"),
        ];
        let history = vec![vote("a", RatingValue::Up), vote("a", RatingValue::Up), vote("b", RatingValue::Down)];
        let weights = PreferenceWeights::from_history(&items, &history);

        for direction in [Direction::Similar, Direction::Dissimilar] {
            let ranked = rank_candidates(&items, &history, Locale::En, direction, &mut rng(11));
            assert_eq!(ranked.len(), 3);
            for pair in ranked.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }
            for c in &ranked {
                let base = weights.score(c.item);
                let directed = if direction == Direction::Similar { base } else { -base };
                let jitter = c.score - directed;
                assert!(jitter > -1e-9 && jitter < SCORE_JITTER + 1e-9, "jitter {jitter}");
            }
        }
    }

    #[test]
    fn test_dissimilar_samples_from_ranking_tail() {
        // Ten candidates with base scores 0, 2, 4, ... so jitter never reorders them
        let mut items = Vec::new();
        let mut history = Vec::new();
        for i in 0..10 {
            let category = format!("cat-{i}");
            items.push(Item::new(format!("item-{i}")).with_category(category.clone()));
            items.push(Item::new(format!("seed-{i}")).with_category(category).with_lang(Locale::Ro));
            for _ in 0..i {
                history.push(vote(&format!("seed-{i}"), RatingValue::Up));
            }
        }

        let order_rng = &mut rng(5);
        let ranked = rank_candidates(&items, &history, Locale::En, Direction::Dissimilar, order_rng);
        let tail: HashSet<&str> = ranked[7..].iter().map(|c| c.item.id.as_str()).collect();
        assert_eq!(tail.len(), 3);

        let mut seen = HashSet::new();
        for seed in 0..300 {
            let picked = select_weighted(&items, &history, Locale::En, Direction::Dissimilar, &mut rng(seed))
                .expect("candidates exist");
            assert!(tail.contains(picked.id.as_str()), "{} outside tail", picked.id);
            seen.insert(picked.id.clone());
        }
        assert_eq!(seen.len(), 3, "every tail rank should be reachable");
    }

    #[test]
    fn test_dissimilar_single_candidate() {
        let items = vec![Item::new("only").with_category("tech")];
        let history = vec![vote("only", RatingValue::Down)];
        let picked = select_weighted(&items, &history, Locale::En, Direction::Dissimilar, &mut rng(0));
        assert_eq!(picked.map(|i| i.id.as_str()), Some("only"));
    }

    #[test]
    fn test_strategy_dispatch() {
        let current = Item::new("c").with_tags(["x"]);
        let items = vec![
            current.clone(),
            Item::new("a").with_tags(["x"]),
            Item::new("b").with_tags(["y"]),
        ];
        let query = NextItemQuery {
            current: &current,
            items: &items,
            history: &[],
            language: Locale::En,
            direction: Direction::from(RatingValue::Down),
        };

        let picked = NextItemStrategy::TagOverlap.select(&query, &mut rng(0));
        assert_eq!(picked.map(|i| i.id.as_str()), Some("b"));

        let weighted = NextItemStrategy::Weighted.select(&query, &mut rng(0));
        assert!(weighted.is_some());
    }
}
