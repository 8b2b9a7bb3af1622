//! Ranking engine
//!
//! Pure scoring functions used by leaderboards. Nothing here touches
//! storage; callers feed in raw counts and ages and get scores back.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Default decay rate for [`momentum_score`]
pub const DEFAULT_DECAY_RATE: f64 = 0.1;

/// One week, the default half-life for [`half_life_score`]
pub const DEFAULT_HALF_LIFE_HOURS: f64 = 168.0;

/// Default window for [`growth_score`]
pub const DEFAULT_GROWTH_WINDOW_DAYS: f64 = 7.0;

/// Exponential decay: `base * e^(-rate * age_days)`.
///
/// Future-dated items (negative age) keep their base score.
pub fn momentum_score(base: f64, age_days: f64, decay_rate: f64) -> f64 {
    if age_days < 0.0 {
        return base;
    }
    base * (-decay_rate * age_days).exp()
}

/// Half-life decay: `base * 0.5^(age_hours / half_life_hours)`
pub fn half_life_score(base: f64, age_hours: f64, half_life_hours: f64) -> f64 {
    if age_hours < 0.0 {
        return base;
    }
    base * 0.5_f64.powf(age_hours / half_life_hours)
}

/// Growth of `recent` over a `historical` baseline, weighted by recent
/// activity per day of the window.
pub fn growth_score(recent: f64, historical: f64, window_days: f64) -> f64 {
    if historical == 0.0 {
        return if recent > 0.0 { recent * 2.0 } else { 0.0 };
    }
    let growth = (recent - historical) / historical;
    (growth * 100.0).max(0.0) * (recent / window_days)
}

/// Composite trending score over plays, tip count and tip amount
pub fn trending_score(plays: f64, tips: f64, tip_amount: f64, age_days: f64) -> f64 {
    momentum_score(plays, age_days, 0.15)
        + momentum_score(tips * 10.0, age_days, 0.12)
        + momentum_score(tip_amount * 100.0, age_days, 0.10)
}

/// An item that can be ranked
pub trait Scored {
    type Key: Eq + Hash;

    fn key(&self) -> &Self::Key;

    fn score(&self) -> f64;
}

/// A ranked entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranked<T> {
    #[serde(flatten)]
    pub item: T,
    /// 1-based
    pub rank: u32,
    pub previous_rank: Option<u32>,
    /// Positive when the item climbed
    pub change: i64,
}

/// Sort by score descending and assign ranks.
///
/// Ties keep input order. `change` is `previous - rank` when the item has
/// a previous rank, otherwise 0.
pub fn rank_items<T: Scored>(
    mut items: Vec<T>,
    previous: Option<&HashMap<T::Key, u32>>,
) -> Vec<Ranked<T>> {
    items.sort_by(|a, b| b.score().total_cmp(&a.score()));

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let rank = u32::try_from(index + 1).unwrap_or(u32::MAX);
            let previous_rank = previous
                .and_then(|ranks| ranks.get(item.key()))
                .copied()
                .filter(|&r| r > 0);
            let change = previous_rank.map_or(0, |prev| i64::from(prev) - i64::from(rank));
            Ranked {
                item,
                rank,
                previous_rank,
                change,
            }
        })
        .collect()
}

/// Leaderboard window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[serde(rename = "all-time")]
    #[default]
    AllTime,
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "weekly")]
    Weekly,
}

impl Timeframe {
    /// `(start, end)` of the window ending now
    pub fn date_range(self) -> (DateTime<Utc>, DateTime<Utc>) {
        self.date_range_ending(Utc::now())
    }

    pub fn date_range_ending(self, end: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = match self {
            Timeframe::Weekly => end - Duration::days(7),
            Timeframe::Monthly => end
                .checked_sub_months(Months::new(1))
                .unwrap_or(DateTime::UNIX_EPOCH),
            Timeframe::AllTime => DateTime::UNIX_EPOCH,
        };
        (start, end)
    }
}

/// Whole days elapsed since `at`, rounded down
pub fn age_in_days(at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - at).num_milliseconds().div_euclid(86_400_000)
}

/// Whole hours elapsed since `at`, rounded down
pub fn age_in_hours(at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - at).num_milliseconds().div_euclid(3_600_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        id: String,
        score: f64,
    }

    impl Scored for Entry {
        type Key = String;

        fn key(&self) -> &String {
            &self.id
        }

        fn score(&self) -> f64 {
            self.score
        }
    }

    fn entry(id: &str, score: f64) -> Entry {
        Entry {
            id: id.to_string(),
            score,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn momentum_decays_and_ignores_future_dates() {
        assert!(close(momentum_score(100.0, 0.0, 0.1), 100.0));
        assert!(close(momentum_score(100.0, 10.0, 0.1), 100.0 * (-1.0_f64).exp()));
        assert!(close(momentum_score(100.0, -3.0, 0.1), 100.0));
    }

    #[test]
    fn half_life_halves_at_one_period() {
        assert!(close(half_life_score(80.0, 168.0, DEFAULT_HALF_LIFE_HOURS), 40.0));
        assert!(close(half_life_score(80.0, -1.0, DEFAULT_HALF_LIFE_HOURS), 80.0));
    }

    #[test]
    fn growth_from_zero_baseline() {
        assert!(close(growth_score(5.0, 0.0, 7.0), 10.0));
        assert!(close(growth_score(0.0, 0.0, 7.0), 0.0));
    }

    #[test]
    fn growth_against_baseline() {
        // 100% growth, weighted by 14/7 per day
        assert!(close(growth_score(14.0, 7.0, 7.0), 200.0));
        // shrinking never goes negative
        assert!(close(growth_score(2.0, 10.0, 7.0), 0.0));
    }

    #[test]
    fn trending_sums_weighted_terms() {
        assert!(close(trending_score(10.0, 2.0, 1.5, 0.0), 10.0 + 20.0 + 150.0));
        let aged = trending_score(10.0, 2.0, 1.5, 5.0);
        let expected = 10.0 * (-0.75_f64).exp() + 20.0 * (-0.6_f64).exp() + 150.0 * (-0.5_f64).exp();
        assert!(close(aged, expected));
    }

    #[test]
    fn ranks_are_one_based_with_changes() {
        let previous: HashMap<String, u32> = [("a".to_string(), 1), ("c".to_string(), 3)].into();
        let ranked = rank_items(
            vec![entry("a", 5.0), entry("b", 9.0), entry("c", 7.0)],
            Some(&previous),
        );

        let summary: Vec<(&str, u32, i64)> = ranked
            .iter()
            .map(|r| (r.item.id.as_str(), r.rank, r.change))
            .collect();
        assert_eq!(summary, vec![("b", 1, 0), ("c", 2, 1), ("a", 3, -2)]);
        assert_eq!(ranked[0].previous_rank, None);
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = rank_items(vec![entry("x", 1.0), entry("y", 1.0), entry("z", 1.0)], None);
        let order: Vec<&str> = ranked.iter().map(|r| r.item.id.as_str()).collect();
        assert_eq!(order, vec!["x", "y", "z"]);
    }

    #[test]
    fn timeframe_windows() {
        let end = Utc.with_ymd_and_hms(2025, 3, 31, 10, 0, 0).unwrap();
        let (start, _) = Timeframe::Weekly.date_range_ending(end);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 24, 10, 0, 0).unwrap());

        let (start, _) = Timeframe::Monthly.date_range_ending(end);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 2, 28, 10, 0, 0).unwrap());

        let (start, _) = Timeframe::AllTime.date_range_ending(end);
        assert_eq!(start, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn ages_round_down() {
        let now = Utc.with_ymd_and_hms(2025, 1, 3, 5, 0, 0).unwrap();
        let then = Utc.with_ymd_and_hms(2025, 1, 1, 6, 0, 0).unwrap();
        assert_eq!(age_in_days(then, now), 1);
        assert_eq!(age_in_hours(then, now), 47);
    }

    proptest! {
        /// Property: ranking yields ranks 1..=n over scores in descending order
        #[test]
        fn ranking_is_a_descending_permutation(scores in prop::collection::vec(-1000.0f64..1000.0, 0..40)) {
            let items: Vec<Entry> = scores
                .iter()
                .enumerate()
                .map(|(i, s)| entry(&i.to_string(), *s))
                .collect();
            let ranked = rank_items(items, None);

            prop_assert_eq!(ranked.len(), scores.len());
            for (i, r) in ranked.iter().enumerate() {
                prop_assert_eq!(r.rank as usize, i + 1);
                prop_assert_eq!(r.change, 0);
            }
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].item.score >= pair[1].item.score);
            }
        }

        /// Property: decay never increases a non-negative score
        #[test]
        fn decay_is_monotone(base in 0.0f64..1e6, age in 0.0f64..365.0, rate in 0.0f64..2.0) {
            prop_assert!(momentum_score(base, age, rate) <= base + 1e-9);
            prop_assert!(half_life_score(base, age * 24.0, DEFAULT_HALF_LIFE_HOURS) <= base + 1e-9);
        }
    }
}
