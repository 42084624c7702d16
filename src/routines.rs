use crate::models::{
    CardioZone, DayKey, DayPlan, ExercisePlan, MobilityBlock, PlanLoad, SetPlan, WarmupStep,
};

const fn set(label: &'static str, weight: f64, target_reps: u32) -> SetPlan {
    SetPlan { label, weight: PlanLoad::Kg(weight), target_reps }
}

const fn hold(label: &'static str, duration: &'static str) -> SetPlan {
    SetPlan { label, weight: PlanLoad::Text(duration), target_reps: 1 }
}

const fn warmup(percent: f64, reps: &'static str) -> WarmupStep {
    WarmupStep { percent, reps }
}

pub const DAY_A: &[ExercisePlan] = &[
    ExercisePlan {
        name: "Squat (Barbell)",
        rest: "2–4 min",
        description: "Top set + 2 back-offs al 90%. Técnica y bracing.",
        warmups: &[warmup(0.0, "8"), warmup(0.4, "5"), warmup(0.6, "3"), warmup(0.8, "1–2")],
        default_sets: &[
            set("Set 1 (Top)", 70.0, 4),
            set("Set 2 (90%)", 63.0, 5),
            set("Set 3 (90%)", 63.0, 5),
        ],
    },
    ExercisePlan {
        name: "Bench Press (Barbell)",
        rest: "2–3 min",
        description: "Empuje principal del día.",
        warmups: &[],
        default_sets: &[set("Set 1", 50.0, 8), set("Set 2", 50.0, 8), set("Set 3", 50.0, 8)],
    },
    ExercisePlan {
        name: "Seated Row (Machine)",
        rest: "60–90 s",
        description: "Tirón horizontal dominante.",
        warmups: &[],
        default_sets: &[
            set("Set 1", 60.0, 10),
            set("Set 2", 60.0, 10),
            set("Set 3", 60.0, 10),
            set("Set 4", 60.0, 10),
        ],
    },
    ExercisePlan {
        name: "Lat Pulldown",
        rest: "60–90 s",
        description: "Tirón vertical, pecho arriba.",
        warmups: &[],
        default_sets: &[set("Set 1", 50.0, 10), set("Set 2", 50.0, 10), set("Set 3", 50.0, 10)],
    },
    ExercisePlan {
        name: "Face Pull",
        rest: "60 s",
        description: "Postura y deltoides posterior.",
        warmups: &[],
        default_sets: &[set("Set 1", 20.0, 12), set("Set 2", 20.0, 12), set("Set 3", 20.0, 12)],
    },
    ExercisePlan {
        name: "Core (Plancha 25s)",
        rest: "45–60 s",
        description: "3×25 s controlando lumbar.",
        warmups: &[],
        default_sets: &[hold("Set 1", "25 s"), hold("Set 2", "25 s"), hold("Set 3", "25 s")],
    },
];

pub const DAY_B: &[ExercisePlan] = &[
    ExercisePlan {
        name: "Deadlift (Barbell)",
        rest: "2–4 min",
        description: "Top set + 2 back-offs, lumbar neutra.",
        warmups: &[warmup(0.4, "5"), warmup(0.6, "3"), warmup(0.8, "1–2")],
        default_sets: &[
            set("Set 1 (Top)", 90.0, 3),
            set("Set 2 (90%)", 80.0, 5),
            set("Set 3 (90%)", 80.0, 5),
        ],
    },
    ExercisePlan {
        name: "Overhead Press",
        rest: "2–3 min",
        description: "Empuje vertical, controlado.",
        warmups: &[],
        default_sets: &[set("Set 1", 30.0, 8), set("Set 2", 30.0, 8), set("Set 3", 30.0, 8)],
    },
    ExercisePlan {
        name: "Single Arm Row (DB)",
        rest: "60–90 s",
        description: "Tirón unilateral, estabilidad.",
        warmups: &[],
        default_sets: &[set("Set 1", 26.0, 10), set("Set 2", 26.0, 10), set("Set 3", 26.0, 10)],
    },
];

pub const CARDIO_MODALITIES: &[&str] = &[
    "Bici estática / Spinning",
    "Elíptica",
    "Caminata cinta 2–6%",
    "Remo",
    "Piscina",
];

pub const CARDIO_ZONES: &[CardioZone] = &[
    CardioZone { label: "Zona 2 (110–128 lpm) — RPE 3–4", value: "Z2" },
    CardioZone { label: "Zona 3 (128–146 lpm) — RPE 5–6", value: "Z3" },
    CardioZone { label: "Picos controlados (155–170 lpm) — RPE 7–8", value: "PICOS" },
];

pub const DEFAULT_CARDIO_MINUTES: u32 = 30;

pub const MOBILITY_BLOCKS: &[MobilityBlock] = &[
    MobilityBlock {
        title: "Daily Reset (8–10 min)",
        items: &[
            "90/90 Hip Lift con reach — 3×5 resp.",
            "Dead Bug — 2×6–8",
            "Wall Slides — 2×8–10",
            "Chin Tucks + Nods — 2×8 (2 s)",
            "Short-Foot + Toe Splay — 2×20–30 s/pie",
        ],
    },
    MobilityBlock {
        title: "Pre-Fuerza A (sentadilla/rodilla)",
        items: &[
            "Knee-to-Wall — 2×8/lado",
            "Couch Stretch — 2×30–40 s/lado",
            "90/90 Hip Lift — 1×3 resp.",
            "Wall Slides — 1×10",
            "Goblet Squat respirado — 2×5",
        ],
    },
    MobilityBlock {
        title: "Pre-Fuerza B (bisagra/peso muerto)",
        items: &[
            "Hinge Drill con palo — 2×8",
            "Soleus Raises — 2×12",
            "Hamstring Sweep — 2×8/lado",
            "Pallof Press — 2×8/lado",
            "Serratus Punches — 2×10",
        ],
    },
    MobilityBlock {
        title: "Post-Fuerza (6–8 min)",
        items: &[
            "Open Book — 1×8/lado",
            "Extensión torácica en foam — 1–2 min",
            "Child’s Pose con exhalación — 1–2 min",
            "Pantorrilla a pared — 1×30 s/ángulo",
        ],
    },
    MobilityBlock {
        title: "Pies / Fascitis (3×/sem)",
        items: &[
            "Gemelos de pie — 3×12 @ 3-0-3",
            "Sóleo sentado — 3×12 @ 3-0-3",
            "Big-Toe Stretch — 2×30 s/pie",
            "Rodillo/Bola fascia plantar — 1–2 min/pie",
        ],
    },
];

pub fn day_plan(day: DayKey) -> DayPlan {
    let exercises = match day {
        DayKey::A => DAY_A,
        DayKey::B => DAY_B,
    };
    DayPlan { day, exercises }
}

pub fn mobility_item(block: usize, item: usize) -> Option<&'static str> {
    MOBILITY_BLOCKS.get(block)?.items.get(item).copied()
}

#[derive(Clone, Debug, PartialEq)]
pub struct WarmupSet {
    pub weight: f64,
    pub reps: &'static str,
}

/// Warm-up ladder for an exercise, scaled from the top set's weight. Falls back
/// to the first planned set when no usable top weight is given.
pub fn warmup_sets(exercise: &ExercisePlan, top_weight: Option<f64>) -> Vec<WarmupSet> {
    let top = top_weight
        .filter(|w| *w != 0.0)
        .or_else(|| exercise.default_sets.first().and_then(|s| s.weight.kg()))
        .unwrap_or(0.0);

    exercise
        .warmups
        .iter()
        .map(|step| WarmupSet { weight: (top * step.percent).round(), reps: step.reps })
        .collect()
}

pub const DEFAULT_REST_SECONDS: u32 = 60;

pub fn rest_to_seconds(rest: &str) -> u32 {
    if rest.is_empty() {
        return DEFAULT_REST_SECONDS;
    }
    let rest = rest.to_lowercase();
    let has = |en_dash: &str, hyphen: &str| rest.contains(en_dash) || rest.contains(hyphen);

    if has("2–4", "2-4") {
        180
    } else if has("2–3", "2-3") {
        150
    } else if has("60–90", "60-90") {
        75
    } else if has("45–60", "45-60") {
        50
    } else if rest.contains("90 s") {
        90
    } else if has("60 s", "60s") {
        60
    } else {
        DEFAULT_REST_SECONDS
    }
}

pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_strings_map_to_seconds() {
        assert_eq!(rest_to_seconds("2–4 min"), 180);
        assert_eq!(rest_to_seconds("2-3 min"), 150);
        assert_eq!(rest_to_seconds("60–90 s"), 75);
        assert_eq!(rest_to_seconds("45–60 s"), 50);
        assert_eq!(rest_to_seconds("90 s"), 90);
        assert_eq!(rest_to_seconds("60 s"), 60);
        assert_eq!(rest_to_seconds("whenever"), 60);
        assert_eq!(rest_to_seconds(""), 60);
    }

    #[test]
    fn every_catalog_rest_is_recognised() {
        for exercise in DAY_A.iter().chain(DAY_B) {
            assert!(rest_to_seconds(exercise.rest) >= 50, "{}", exercise.name);
        }
    }

    #[test]
    fn warmups_scale_from_top_set() {
        let squat = &DAY_A[0];
        let ladder = warmup_sets(squat, Some(100.0));
        let weights: Vec<f64> = ladder.iter().map(|w| w.weight).collect();
        assert_eq!(weights, vec![0.0, 40.0, 60.0, 80.0]);
        assert_eq!(ladder[3].reps, "1–2");

        let fallback = warmup_sets(&DAY_B[0], None);
        assert_eq!(fallback.iter().map(|w| w.weight).collect::<Vec<_>>(), vec![36.0, 54.0, 72.0]);

        assert!(warmup_sets(&DAY_A[1], Some(50.0)).is_empty());
    }

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(180), "03:00");
        assert_eq!(format_clock(75), "01:15");
        assert_eq!(format_clock(5), "00:05");
    }

    #[test]
    fn mobility_items_resolve_by_position() {
        assert_eq!(mobility_item(1, 0), Some("Knee-to-Wall — 2×8/lado"));
        assert_eq!(mobility_item(9, 0), None);
        assert_eq!(mobility_item(0, 9), None);
    }

    #[test]
    fn day_plans_match_their_key() {
        assert_eq!(day_plan(DayKey::A).day, DayKey::A);
        assert_eq!(day_plan(DayKey::B).day, DayKey::B);
        assert_eq!(day_plan(DayKey::A).exercises.len(), 6);
        assert_eq!(day_plan(DayKey::B).exercises[0].name, "Deadlift (Barbell)");
    }
}
