use once_cell::sync::Lazy;
use std::{collections::HashMap, fmt::Display, str::FromStr};
use strsim::jaro_winkler;

use serde::{Deserialize, Serialize};
use sqlx::prelude::Type;

/// The exercises the remote trainer knows how to count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
pub enum ExerciseKind {
    #[serde(rename = "squats")]
    #[sqlx(rename = "squats")]
    Squat,
    #[serde(rename = "pushups")]
    #[sqlx(rename = "pushups")]
    Pushup,
    #[serde(rename = "bicep_curls")]
    #[sqlx(rename = "bicep_curls")]
    BicepCurl,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 3] = [Self::Squat, Self::Pushup, Self::BicepCurl];

    /// Name used in stored records and in the video feed path.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Squat => "squats",
            Self::Pushup => "pushups",
            Self::BicepCurl => "bicep_curls",
        }
    }

    /// Slug used by the trainer's start/end/report routes.
    ///
    /// The trainer spells bicep curl routes with a hyphen while its video feed
    /// uses the underscore form.
    pub fn route_slug(self) -> &'static str {
        match self {
            Self::Squat => "squats",
            Self::Pushup => "pushups",
            Self::BicepCurl => "bicep-curls",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Squat => "Squats",
            Self::Pushup => "Pushups",
            Self::BicepCurl => "Bicep Curls",
        }
    }

    /// Singular noun used in status lines ("squat trainer", "bicep curl workout").
    pub fn singular(self) -> &'static str {
        match self {
            Self::Squat => "squat",
            Self::Pushup => "pushup",
            Self::BicepCurl => "bicep curl",
        }
    }
}

impl Display for ExerciseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Every spelling accepted on the command line, mapped to its exercise.
static EXERCISE_ALIASES: Lazy<HashMap<&'static str, ExerciseKind>> = Lazy::new(|| {
    HashMap::from([
        ("squats", ExerciseKind::Squat),
        ("squat", ExerciseKind::Squat),
        ("pushups", ExerciseKind::Pushup),
        ("pushup", ExerciseKind::Pushup),
        ("push-ups", ExerciseKind::Pushup),
        ("bicep_curls", ExerciseKind::BicepCurl),
        ("bicep-curls", ExerciseKind::BicepCurl),
        ("bicep-curl", ExerciseKind::BicepCurl),
        ("bicep_curl", ExerciseKind::BicepCurl),
        ("curls", ExerciseKind::BicepCurl),
    ])
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown exercise `{input}`")]
pub struct UnknownExercise {
    pub input: String,
    pub suggestion: Option<ExerciseKind>,
}

impl FromStr for ExerciseKind {
    type Err = UnknownExercise;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(' ', "_");
        EXERCISE_ALIASES
            .get(key.as_str())
            .copied()
            .ok_or_else(|| UnknownExercise {
                input: s.to_string(),
                suggestion: best_exercise_suggestion(&key),
            })
    }
}

/// Return the closest exercise for `input`
/// if similarity ≥ 0.80 *and* clearly better than the runner-up.
pub fn best_exercise_suggestion(input: &str) -> Option<ExerciseKind> {
    if input.trim().is_empty() {
        return None;
    }

    let mut scores: Vec<(ExerciseKind, f64)> = ExerciseKind::ALL
        .iter()
        .map(|k| (*k, jaro_winkler(input, k.as_str())))
        .collect();

    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (best, best_score) = scores[0];
    let second_score = scores.get(1).map(|(_, s)| *s).unwrap_or(0.0);

    const MIN_SCORE: f64 = 0.80;
    const GAP: f64 = 0.02;

    if best_score >= MIN_SCORE && best_score - second_score >= GAP {
        Some(best)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_wire_name_and_alias() {
        for kind in ExerciseKind::ALL {
            assert_eq!(kind.as_str().parse::<ExerciseKind>(), Ok(kind));
            assert_eq!(kind.route_slug().parse::<ExerciseKind>(), Ok(kind));
        }
        assert_eq!("Bicep Curls".parse::<ExerciseKind>(), Ok(ExerciseKind::BicepCurl));
        assert_eq!("SQUAT".parse::<ExerciseKind>(), Ok(ExerciseKind::Squat));
    }

    #[test]
    fn typo_gets_a_suggestion() {
        let err = "sqauts".parse::<ExerciseKind>().unwrap_err();
        assert_eq!(err.suggestion, Some(ExerciseKind::Squat));
    }

    #[test]
    fn garbage_gets_no_suggestion() {
        let err = "zzz".parse::<ExerciseKind>().unwrap_err();
        assert_eq!(err.suggestion, None);
    }

    #[test]
    fn serde_uses_storage_names() {
        let json = serde_json::to_string(&ExerciseKind::BicepCurl).unwrap();
        assert_eq!(json, "\"bicep_curls\"");
    }
}
