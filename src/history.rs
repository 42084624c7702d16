use crate::models::{ExerciseRecord, Session};

/// Read-only view over stored sessions, newest first. Nothing is cached; every
/// lookup rescans the sessions it borrows.
#[derive(Debug, Clone, Copy)]
pub struct HistoryIndex<'a> {
    sessions: &'a [Session],
}

impl<'a> HistoryIndex<'a> {
    pub fn new(sessions: &'a [Session]) -> Self {
        Self { sessions }
    }

    /// Every recorded occurrence of `name` (exact match), most recent session
    /// first, exercises within a session in their original order.
    pub fn history_for<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s ExerciseRecord> + 's {
        history_for(self.sessions, name)
    }

    /// Sessions newest first, paired with their stored (oldest-first) index.
    pub fn newest_first(&self) -> impl Iterator<Item = (usize, &'a Session)> + 'a {
        self.sessions.iter().enumerate().rev()
    }
}

pub fn history_for<'a>(sessions: &'a [Session], name: &'a str) -> impl Iterator<Item = &'a ExerciseRecord> + 'a {
    sessions
        .iter()
        .rev()
        .flat_map(|session| session.exercises().iter())
        .filter(move |exercise| exercise.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SessionType, SetRecord};

    fn strength(date: &str, exercises: &[(&str, &str)]) -> Session {
        Session {
            date: date.to_string(),
            kind: SessionType::A,
            notes: String::new(),
            exercises: Some(
                exercises
                    .iter()
                    .map(|(name, weight)| ExerciseRecord {
                        name: name.to_string(),
                        rest: String::new(),
                        sets: vec![SetRecord { weight: (*weight).into(), ..SetRecord::default() }],
                    })
                    .collect(),
            ),
            cardio: None,
            mobility_done: None,
        }
    }

    #[test]
    fn history_is_most_recent_first() {
        let sessions = vec![
            strength("2024-01-01", &[("Squat", "60"), ("Bench", "40")]),
            strength("2024-01-03", &[("Bench", "42.5")]),
            strength("2024-01-05", &[("Squat", "62.5"), ("Squat", "50")]),
        ];
        let index = HistoryIndex::new(&sessions);

        let squat: Vec<String> =
            index.history_for("Squat").map(|ex| ex.sets[0].weight.to_string()).collect();
        assert_eq!(squat, vec!["62.5", "50", "60"]);

        let bench: Vec<String> =
            index.history_for("Bench").map(|ex| ex.sets[0].weight.to_string()).collect();
        assert_eq!(bench, vec!["42.5", "40"]);
    }

    #[test]
    fn name_match_is_exact() {
        let sessions = vec![strength("2024-01-01", &[("Squat (Barbell)", "60")])];
        assert_eq!(history_for(&sessions, "Squat").count(), 0);
        assert_eq!(history_for(&sessions, "squat (barbell)").count(), 0);
        assert_eq!(history_for(&sessions, "Squat (Barbell)").count(), 1);
    }

    #[test]
    fn sessions_without_exercises_are_skipped() {
        let mut cardio = strength("2024-01-02", &[]);
        cardio.kind = SessionType::Cardio;
        cardio.exercises = None;
        let sessions = vec![strength("2024-01-01", &[("Squat", "60")]), cardio];
        assert_eq!(history_for(&sessions, "Squat").count(), 1);
    }

    #[test]
    fn newest_first_keeps_stored_indices() {
        let sessions = vec![strength("a", &[]), strength("b", &[]), strength("c", &[])];
        let order: Vec<(usize, &str)> =
            HistoryIndex::new(&sessions).newest_first().map(|(i, s)| (i, s.date.as_str())).collect();
        assert_eq!(order, vec![(2, "c"), (1, "b"), (0, "a")]);
        assert_eq!(sessions[0].date, "a");
    }
}
