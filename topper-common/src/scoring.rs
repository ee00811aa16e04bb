//! Score updater
//!
//! Applies one rating to one item: `score += value`, `votes += 1`.

use crate::models::{Item, RatingValue};

/// Apply a rating to an item in place and return the new score
pub fn apply_rating(item: &mut Item, value: RatingValue) -> i64 {
    item.score = item.score.saturating_add(value.as_i64());
    item.votes = item.votes.saturating_add(1);
    item.score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_initial_plus_sum_of_values() {
        let mut item = Item::new("x");
        item.score = 4;
        item.votes = 2;

        let values = [
            RatingValue::Up,
            RatingValue::Down,
            RatingValue::Down,
            RatingValue::Up,
            RatingValue::Up,
        ];
        for v in values {
            apply_rating(&mut item, v);
        }

        let sum: i64 = values.iter().map(|v| v.as_i64()).sum();
        assert_eq!(item.score, 4 + sum);
        assert_eq!(item.votes, 2 + values.len() as u64);
    }
}
