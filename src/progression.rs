use crate::history::HistoryIndex;
use crate::models::{RawValue, Session, SetRecord};

/// Smallest plate jump; increases are rounded to a multiple of it.
pub const LOAD_INCREMENT_KG: f64 = 2.5;
pub const DELOAD_FACTOR: f64 = 0.9;
pub const MAX_COMFORTABLE_RPE: f64 = 8.0;
pub const NEAR_FAILURE_RPE: f64 = 9.0;
/// Used when a stored set carries no usable target.
pub const FALLBACK_TARGET_REPS: f64 = 5.0;

/// Epley estimate `weight × (1 + reps/30)`. `None` when either input is zero or
/// not a number.
pub fn estimate_1rm(weight: &RawValue, reps: &RawValue) -> Option<f64> {
    let weight = weight.as_measure()?;
    let reps = reps.as_measure()?;
    Some(weight * (1.0 + reps / 30.0))
}

pub fn round_to_increment(kg: f64) -> f64 {
    (kg / LOAD_INCREMENT_KG).round() * LOAD_INCREMENT_KG
}

fn round_to_tenth(kg: f64) -> f64 {
    (kg * 10.0).round() / 10.0
}

/// A set is a PR only when it beats the best estimate recorded before it.
pub fn is_personal_record(estimate: Option<f64>, prior_best: f64) -> bool {
    estimate.is_some_and(|e| e > prior_best)
}

/// How a recorded set went relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effort {
    /// Target reached without grinding (RPE unreported or ≤ 8).
    Good,
    /// Target missed, or the set was near failure (RPE ≥ 9).
    Bad,
    /// Neither, e.g. target reached at RPE 8.5.
    Borderline,
}

pub fn classify(set: &SetRecord) -> Effort {
    let reps = set.reps.as_measure().unwrap_or(0.0);
    let target = set
        .target_reps
        .as_ref()
        .and_then(RawValue::as_measure)
        .unwrap_or(FALLBACK_TARGET_REPS);
    let rpe = set.reported_rpe();

    let good = reps >= target && rpe.map_or(true, |r| r <= MAX_COMFORTABLE_RPE);
    let bad = reps < target || rpe.is_some_and(|r| r >= NEAR_FAILURE_RPE);

    match (good, bad) {
        (true, _) => Effort::Good,
        (false, true) => Effort::Bad,
        (false, false) => Effort::Borderline,
    }
}

/// Which branch of the load semaphore produced a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionBasis {
    /// Nothing recorded for this slot; the plan default stands.
    NoHistory,
    /// Only one usable session; its weight is repeated.
    Repeat,
    Increase,
    Hold,
    Deload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub weight: RawValue,
    pub basis: SuggestionBasis,
}

impl Suggestion {
    fn new(weight: RawValue, basis: SuggestionBasis) -> Self {
        Self { weight, basis }
    }

    pub fn kg(&self) -> Option<f64> {
        self.weight.as_number()
    }
}

/// Progression math over a borrowed history. Nothing here fails on bad input:
/// unreadable numbers fall back to 0, `None` or the plan default.
#[derive(Debug, Clone, Copy)]
pub struct ProgressionEngine<'a> {
    history: HistoryIndex<'a>,
}

impl<'a> ProgressionEngine<'a> {
    pub fn new(sessions: &'a [Session]) -> Self {
        Self { history: HistoryIndex::new(sessions) }
    }

    /// Best estimated 1RM across every recorded set of `name`, or 0.
    pub fn best_estimated_1rm(&self, name: &str) -> f64 {
        self.history
            .history_for(name)
            .flat_map(|exercise| exercise.sets.iter())
            .filter_map(|set| estimate_1rm(&set.weight, &set.reps))
            .fold(0.0, f64::max)
    }

    pub fn is_personal_record(&self, name: &str, weight: &RawValue, reps: &RawValue) -> bool {
        is_personal_record(estimate_1rm(weight, reps), self.best_estimated_1rm(name))
    }

    /// Next target for set slot `slot` of `name`, driven by the two most recent
    /// sessions that recorded the exercise.
    pub fn suggested_weight(&self, name: &str, slot: usize, default: &RawValue) -> Suggestion {
        let mut occurrences = self.history.history_for(name);

        let Some(last1) = occurrences.next().and_then(|ex| ex.sets.get(slot)) else {
            return Suggestion::new(default.clone(), SuggestionBasis::NoHistory);
        };
        let recorded = last1.weight.as_measure();
        let repeat = || {
            let weight = recorded.map_or_else(|| default.clone(), RawValue::from);
            Suggestion::new(weight, SuggestionBasis::Repeat)
        };

        let Some(last2) = occurrences.next() else {
            return repeat();
        };
        let Some(last2) = last2.sets.get(slot) else {
            return repeat();
        };

        let Some(base) = recorded.or_else(|| default.as_measure()) else {
            return Suggestion::new(default.clone(), SuggestionBasis::Hold);
        };

        match (classify(last1), classify(last2)) {
            (Effort::Good, Effort::Good) => Suggestion::new(
                RawValue::from(round_to_increment(base + LOAD_INCREMENT_KG)),
                SuggestionBasis::Increase,
            ),
            (Effort::Bad, Effort::Bad) => Suggestion::new(
                RawValue::from(round_to_tenth(base * DELOAD_FACTOR)),
                SuggestionBasis::Deload,
            ),
            _ => Suggestion::new(RawValue::from(base), SuggestionBasis::Hold),
        }
    }
}
