use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::models::{
    CardioRecord, DayKey, ExercisePlan, ExerciseRecord, RawValue, Session, SessionType, SetRecord,
};
use crate::progression::{estimate_1rm, is_personal_record, ProgressionEngine};

/// Raw values typed for one set slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetInput {
    pub weight: String,
    pub reps: String,
    pub rpe: String,
}

impl SetInput {
    pub fn new(weight: impl Into<String>, reps: impl Into<String>, rpe: impl Into<String>) -> Self {
        Self { weight: weight.into(), reps: reps.into(), rpe: rpe.into() }
    }
}

/// Everything entered for a strength day, keyed by `(exercise_index, set_index)`.
#[derive(Debug, Clone, Default)]
pub struct SetInputs {
    entries: HashMap<(usize, usize), SetInput>,
}

impl SetInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, exercise: usize, set: usize, input: SetInput) {
        self.entries.insert((exercise, set), input);
    }

    pub fn with(mut self, exercise: usize, set: usize, input: SetInput) -> Self {
        self.insert(exercise, set, input);
        self
    }

    pub fn get(&self, exercise: usize, set: usize) -> Option<&SetInput> {
        self.entries.get(&(exercise, set))
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Assembles a finished workout into a `Session`. PR flags are judged against
/// the sessions handed to `new`, i.e. the history as it was before this save.
pub struct SessionBuilder<'a> {
    engine: ProgressionEngine<'a>,
    date: NaiveDate,
    notes: String,
}

impl<'a> SessionBuilder<'a> {
    pub fn new(prior_sessions: &'a [Session], date: NaiveDate) -> Self {
        Self { engine: ProgressionEngine::new(prior_sessions), date, notes: String::new() }
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn strength(&self, day: DayKey, plan: &[ExercisePlan], inputs: &SetInputs) -> Session {
        let exercises: Vec<ExerciseRecord> = plan
            .iter()
            .enumerate()
            .map(|(ex_index, exercise)| self.exercise_record(ex_index, exercise, inputs))
            .collect();

        self.session(day.session_type(), |session| session.exercises = Some(exercises))
    }

    pub fn cardio(&self, cardio: CardioRecord) -> Session {
        self.session(SessionType::Cardio, |session| session.cardio = Some(cardio))
    }

    pub fn mobility(&self, done: Vec<String>) -> Session {
        self.session(SessionType::Movilidad, |session| session.mobility_done = Some(done))
    }

    fn exercise_record(&self, ex_index: usize, exercise: &ExercisePlan, inputs: &SetInputs) -> ExerciseRecord {
        let prior_best = self.engine.best_estimated_1rm(exercise.name);

        let sets = exercise
            .default_sets
            .iter()
            .enumerate()
            .map(|(set_index, planned)| {
                let input = inputs.get(ex_index, set_index).cloned().unwrap_or_default();
                let weight = RawValue::Text(input.weight);
                let reps = RawValue::Text(input.reps);
                let estimate = estimate_1rm(&weight, &reps);
                let is_pr = is_personal_record(estimate, prior_best);
                if is_pr {
                    debug!(exercise = exercise.name, set = set_index, estimate = ?estimate, prior_best, "personal record");
                }

                SetRecord {
                    label: planned.label.to_string(),
                    weight,
                    reps,
                    rpe: Some(RawValue::Text(input.rpe)),
                    target_reps: Some(RawValue::from(planned.target_reps)),
                    est_1rm: estimate,
                    is_pr,
                }
            })
            .collect();

        ExerciseRecord { name: exercise.name.to_string(), rest: exercise.rest.to_string(), sets }
    }

    fn session(&self, kind: SessionType, fill: impl FnOnce(&mut Session)) -> Session {
        let mut session = Session {
            date: self.date.format("%Y-%m-%d").to_string(),
            kind,
            notes: self.notes.clone(),
            exercises: None,
            cardio: None,
            mobility_done: None,
        };
        fill(&mut session);
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routines::{day_plan, DAY_A};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 14).unwrap()
    }

    #[test]
    fn strength_session_follows_plan_layout() {
        let inputs = SetInputs::new()
            .with(0, 0, SetInput::new("70", "4", "8"))
            .with(1, 2, SetInput::new("50", "8", ""));
        let session = SessionBuilder::new(&[], date()).notes("buen día").strength(DayKey::A, DAY_A, &inputs);

        assert_eq!(session.date, "2024-09-14");
        assert_eq!(session.kind, SessionType::A);
        assert_eq!(session.notes, "buen día");
        assert!(session.cardio.is_none());

        let exercises = session.exercises();
        assert_eq!(exercises.len(), DAY_A.len());
        assert_eq!(exercises[0].name, "Squat (Barbell)");
        assert_eq!(exercises[0].rest, "2–4 min");
        assert_eq!(exercises[2].sets.len(), 4);

        let top = &exercises[0].sets[0];
        assert_eq!(top.label, "Set 1 (Top)");
        assert_eq!(top.weight, RawValue::text("70"));
        assert_eq!(top.target_reps, Some(RawValue::from(4u32)));
        assert_eq!(top.est_1rm, estimate_1rm(&"70".into(), &"4".into()));
        assert!(top.is_pr);

        let unfilled = &exercises[0].sets[1];
        assert!(unfilled.weight.is_blank());
        assert_eq!(unfilled.est_1rm, None);
        assert!(!unfilled.is_pr);
    }

    #[test]
    fn pr_is_judged_against_prior_history_only() {
        let plan = day_plan(DayKey::A);
        let first = SessionBuilder::new(&[], date())
            .strength(DayKey::A, plan.exercises, &SetInputs::new().with(1, 0, SetInput::new("60", "15", "")));
        let history = vec![first];

        // Slot 1 still counts as a PR although slot 0 of the same session is heavier.
        let inputs = SetInputs::new()
            .with(1, 0, SetInput::new("62", "15", ""))
            .with(1, 1, SetInput::new("61", "15", ""))
            .with(1, 2, SetInput::new("60", "15", ""));
        let second = SessionBuilder::new(&history, date()).strength(DayKey::A, plan.exercises, &inputs);
        let bench = &second.exercises()[1];

        assert!(bench.sets[0].is_pr);
        assert!(bench.sets[1].is_pr);
        assert!(!bench.sets[2].is_pr);
    }

    #[test]
    fn cardio_and_mobility_carry_no_exercises() {
        let builder = SessionBuilder::new(&[], date());
        let cardio = builder.cardio(CardioRecord {
            modality: "Elíptica".into(),
            duration: "30".into(),
            zone: "Z2".into(),
            rpe: "4".into(),
        });
        assert_eq!(cardio.kind, SessionType::Cardio);
        assert!(cardio.exercises.is_none());
        assert_eq!(cardio.cardio.as_ref().map(|c| c.zone.as_str()), Some("Z2"));

        let mobility = builder.mobility(vec!["Dead Bug — 2×6–8".into()]);
        assert_eq!(mobility.kind, SessionType::Movilidad);
        assert_eq!(mobility.mobility_done.as_deref(), Some(&["Dead Bug — 2×6–8".to_string()][..]));
        assert!(mobility.exercises.is_none());
    }
}
