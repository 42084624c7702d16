//models.rs
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// A user-entered value as it was typed or stored: either a JSON number or a
/// raw string. Serializes back in the same form it was read. Any other JSON
/// (null, booleans, nested values) reads as blank text.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(Number),
    Text(String),
}

impl RawValue {
    pub fn text(value: impl Into<String>) -> Self {
        RawValue::Text(value.into())
    }

    /// Numeric reading of the value. Empty text reads as 0, anything that
    /// does not parse (or is not finite) reads as `None`.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            RawValue::Number(n) => n.as_f64()?,
            RawValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().ok()?
                }
            }
        };
        n.is_finite().then_some(n)
    }

    /// Like `as_number`, but 0 also counts as absent.
    pub fn as_measure(&self) -> Option<f64> {
        self.as_number().filter(|n| *n != 0.0)
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, RawValue::Text(s) if s.trim().is_empty())
    }

    /// The value as it would be typed into a form: whole numbers lose their
    /// `.0` suffix.
    pub fn entry_text(&self) -> String {
        match self {
            RawValue::Number(n) => match n.as_f64() {
                Some(x) if n.is_f64() && x.is_finite() && x.fract() == 0.0 => format!("{x:.0}"),
                _ => n.to_string(),
            },
            RawValue::Text(s) => s.clone(),
        }
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => RawValue::Number(n),
            Value::String(s) => RawValue::Text(s),
            _ => RawValue::default(),
        })
    }
}

/// Reads `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Default for RawValue {
    fn default() -> Self {
        RawValue::Text(String::new())
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        match Number::from_f64(value) {
            Some(n) => RawValue::Number(n),
            None => RawValue::Text(value.to_string()),
        }
    }
}

impl From<u32> for RawValue {
    fn from(value: u32) -> Self {
        RawValue::Number(Number::from(value))
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{n}"),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

/// Strength day variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DayKey {
    A,
    B,
}

impl DayKey {
    pub fn session_type(self) -> SessionType {
        match self {
            DayKey::A => SessionType::A,
            DayKey::B => SessionType::B,
        }
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayKey::A => f.write_str("A"),
            DayKey::B => f.write_str("B"),
        }
    }
}

/// The `type` tag of a stored session. Unknown tags are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionType {
    A,
    B,
    Cardio,
    Movilidad,
    Other(String),
}

impl SessionType {
    pub fn is_strength(&self) -> bool {
        matches!(self, SessionType::A | SessionType::B)
    }

    pub fn as_str(&self) -> &str {
        match self {
            SessionType::A => "A",
            SessionType::B => "B",
            SessionType::Cardio => "Cardio",
            SessionType::Movilidad => "Movilidad",
            SessionType::Other(tag) => tag,
        }
    }
}

impl From<String> for SessionType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "A" => SessionType::A,
            "B" => SessionType::B,
            "Cardio" => SessionType::Cardio,
            "Movilidad" => SessionType::Movilidad,
            _ => SessionType::Other(tag),
        }
    }
}

impl From<SessionType> for String {
    fn from(kind: SessionType) -> Self {
        match kind {
            SessionType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(rename = "type")]
    pub kind: SessionType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<ExerciseRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardio: Option<CardioRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobility_done: Option<Vec<String>>,
}

impl Session {
    pub fn exercises(&self) -> &[ExerciseRecord] {
        self.exercises.as_deref().unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExerciseRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rest: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sets: Vec<SetRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default)]
    pub weight: RawValue,
    #[serde(default)]
    pub reps: RawValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<RawValue>,
    #[serde(rename = "targetReps", default, skip_serializing_if = "Option::is_none")]
    pub target_reps: Option<RawValue>,
    #[serde(rename = "est1RM", default)]
    pub est_1rm: Option<f64>,
    #[serde(rename = "isPR", default, deserialize_with = "null_as_default")]
    pub is_pr: bool,
}

impl SetRecord {
    /// Reported RPE, `None` when blank, zero or unparseable.
    pub fn reported_rpe(&self) -> Option<f64> {
        self.rpe.as_ref().and_then(RawValue::as_measure)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CardioRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub modality: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub zone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rpe: String,
}

/// Planned load for a set slot. Timed holds carry a text target instead of kilos.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlanLoad {
    Kg(f64),
    Text(&'static str),
}

impl PlanLoad {
    pub fn to_raw(self) -> RawValue {
        match self {
            PlanLoad::Kg(kg) => RawValue::from(kg),
            PlanLoad::Text(text) => RawValue::from(text),
        }
    }

    pub fn kg(self) -> Option<f64> {
        match self {
            PlanLoad::Kg(kg) => Some(kg),
            PlanLoad::Text(_) => None,
        }
    }
}

impl fmt::Display for PlanLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanLoad::Kg(kg) => write!(f, "{kg} kg"),
            PlanLoad::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetPlan {
    pub label: &'static str,
    pub weight: PlanLoad,
    pub target_reps: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WarmupStep {
    pub percent: f64,
    pub reps: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExercisePlan {
    pub name: &'static str,
    pub rest: &'static str,
    pub description: &'static str,
    pub warmups: &'static [WarmupStep],
    pub default_sets: &'static [SetPlan],
}

#[derive(Clone, Debug, PartialEq)]
pub struct DayPlan {
    pub day: DayKey,
    pub exercises: &'static [ExercisePlan],
}

#[derive(Clone, Debug, PartialEq)]
pub struct CardioZone {
    pub label: &'static str,
    pub value: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MobilityBlock {
    pub title: &'static str,
    pub items: &'static [&'static str],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_value_reads_numbers_leniently() {
        assert_eq!(RawValue::text(" 100 ").as_number(), Some(100.0));
        assert_eq!(RawValue::text("97.5").as_measure(), Some(97.5));
        assert_eq!(RawValue::text("").as_number(), Some(0.0));
        assert_eq!(RawValue::text("").as_measure(), None);
        assert_eq!(RawValue::text("25 s").as_number(), None);
        assert_eq!(RawValue::text("NaN").as_number(), None);
        assert_eq!(RawValue::from(4u32).as_number(), Some(4.0));
    }

    #[test]
    fn raw_value_keeps_its_json_shape() {
        let set: SetRecord = serde_json::from_str(
            r#"{"label":"Set 1","weight":"100","reps":"5","rpe":"","targetReps":5,"est1RM":null,"isPR":false}"#,
        )
        .unwrap();
        assert_eq!(set.weight, RawValue::text("100"));
        assert_eq!(set.target_reps, Some(RawValue::from(5u32)));
        assert_eq!(set.reported_rpe(), None);

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["weight"], "100");
        assert_eq!(json["targetReps"], 5);
        assert!(json["est1RM"].is_null());
    }

    #[test]
    fn unknown_session_type_is_preserved() {
        let session: Session =
            serde_json::from_str(r#"{"date":"2024-05-01","type":"Yoga","notes":""}"#).unwrap();
        assert_eq!(session.kind, SessionType::Other("Yoga".to_string()));
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["type"], "Yoga");
        assert!(json.get("exercises").is_none());
    }

    #[test]
    fn session_without_exercises_has_empty_slice() {
        let session: Session =
            serde_json::from_str(r#"{"date":"2024-05-01","type":"Cardio"}"#).unwrap();
        assert!(session.exercises().is_empty());
        assert!(session.notes.is_empty());
    }

    #[test]
    fn nulls_and_odd_values_read_as_blank() {
        let session: Session = serde_json::from_str(
            r#"{"date":"2024-05-02","type":"A","notes":null,"exercises":[{"name":"Squat (Barbell)","rest":null,"sets":[
                {"label":"Set 1","weight":null,"reps":true,"rpe":null,"targetReps":null,"est1RM":null,"isPR":null}
            ]}]}"#,
        )
        .unwrap();
        assert!(session.notes.is_empty());

        let set = &session.exercises()[0].sets[0];
        assert!(set.weight.is_blank());
        assert!(set.reps.is_blank());
        assert_eq!(set.rpe, None);
        assert_eq!(set.target_reps, None);
        assert!(!set.is_pr);

        let cardio: Session =
            serde_json::from_str(r#"{"type":"Cardio","cardio":{"modality":"Remo","duration":null,"zone":"Z2"}}"#)
                .unwrap();
        assert_eq!(cardio.cardio.map(|c| c.duration), Some(String::new()));
    }

    #[test]
    fn entry_text_drops_whole_number_fraction() {
        assert_eq!(RawValue::from(63.0).entry_text(), "63");
        assert_eq!(RawValue::from(72.5).entry_text(), "72.5");
        assert_eq!(RawValue::from(5u32).entry_text(), "5");
        assert_eq!(RawValue::text("25 s").entry_text(), "25 s");
    }
}
