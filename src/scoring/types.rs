//! Constitution scoring types
//!
//! Wire types use camelCase JSON, matching the rest of the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the three constitution categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dosha {
    Vata,
    Pitta,
    Kapha,
}

impl Dosha {
    /// All doshas in canonical order (also the tie-break order when ranking)
    pub const ALL: [Dosha; 3] = [Dosha::Vata, Dosha::Pitta, Dosha::Kapha];
}

impl std::fmt::Display for Dosha {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vata => write!(f, "vata"),
            Self::Pitta => write!(f, "pitta"),
            Self::Kapha => write!(f, "kapha"),
        }
    }
}

impl std::str::FromStr for Dosha {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vata" => Ok(Self::Vata),
            "pitta" => Ok(Self::Pitta),
            "kapha" => Ok(Self::Kapha),
            other => Err(format!("unknown dosha: {}", other)),
        }
    }
}

/// Per-dosha weights attached to a questionnaire item
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DoshaWeights {
    pub vata: f64,
    pub pitta: f64,
    pub kapha: f64,
}

impl DoshaWeights {
    pub fn new(vata: f64, pitta: f64, kapha: f64) -> Self {
        Self { vata, pitta, kapha }
    }

    pub fn get(&self, dosha: Dosha) -> f64 {
        match dosha {
            Dosha::Vata => self.vata,
            Dosha::Pitta => self.pitta,
            Dosha::Kapha => self.kapha,
        }
    }
}

/// A single questionnaire answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub question_id: i64,
    /// Likert value, 1..=5
    pub answer_value: i64,
    pub dosha_weights: DoshaWeights,
}

impl QuizAnswer {
    pub fn new(question_id: i64, answer_value: i64, dosha_weights: DoshaWeights) -> Self {
        Self {
            question_id,
            answer_value,
            dosha_weights,
        }
    }
}

/// Normalized scores, each in `[0, 100]` with two decimals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoshaScores {
    pub vata: f64,
    pub pitta: f64,
    pub kapha: f64,
}

impl DoshaScores {
    pub fn get(&self, dosha: Dosha) -> f64 {
        match dosha {
            Dosha::Vata => self.vata,
            Dosha::Pitta => self.pitta,
            Dosha::Kapha => self.kapha,
        }
    }

    /// Highest score
    pub fn max(&self) -> f64 {
        self.vata.max(self.pitta).max(self.kapha)
    }

    /// Lowest score
    pub fn min(&self) -> f64 {
        self.vata.min(self.pitta).min(self.kapha)
    }

    /// Doshas ranked by descending score; ties keep canonical order
    pub fn ranked(&self) -> [(Dosha, f64); 3] {
        let mut ranked = Dosha::ALL.map(|d| (d, self.get(d)));
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// Dominant classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dominant {
    Vata,
    Pitta,
    Kapha,
    /// No dosha is sufficiently distinct from the others
    Balanced,
}

impl Dominant {
    /// The dosha this outcome names, `None` for balanced
    pub fn dosha(&self) -> Option<Dosha> {
        match self {
            Self::Vata => Some(Dosha::Vata),
            Self::Pitta => Some(Dosha::Pitta),
            Self::Kapha => Some(Dosha::Kapha),
            Self::Balanced => None,
        }
    }
}

impl From<Dosha> for Dominant {
    fn from(dosha: Dosha) -> Self {
        match dosha {
            Dosha::Vata => Self::Vata,
            Dosha::Pitta => Self::Pitta,
            Dosha::Kapha => Self::Kapha,
        }
    }
}

/// Computed constitution profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstitutionProfile {
    pub subject_id: String,
    pub scores: DoshaScores,
    pub dominant: Dominant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Dosha>,
    pub computed_at: DateTime<Utc>,
}

impl ConstitutionProfile {
    pub fn is_balanced(&self) -> bool {
        self.dominant == Dominant::Balanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_orders_descending() {
        let scores = DoshaScores {
            vata: 40.0,
            pitta: 100.0,
            kapha: 72.5,
        };
        let ranked = scores.ranked();
        assert_eq!(ranked[0].0, Dosha::Pitta);
        assert_eq!(ranked[1].0, Dosha::Kapha);
        assert_eq!(ranked[2].0, Dosha::Vata);
    }

    #[test]
    fn test_ranked_tie_keeps_canonical_order() {
        let scores = DoshaScores {
            vata: 80.0,
            pitta: 100.0,
            kapha: 100.0,
        };
        let ranked = scores.ranked();
        assert_eq!(ranked[0].0, Dosha::Pitta);
        assert_eq!(ranked[1].0, Dosha::Kapha);
    }

    #[test]
    fn test_quiz_answer_camel_case() {
        let json = r#"{"questionId":3,"answerValue":4,"doshaWeights":{"vata":1.0,"pitta":0.5,"kapha":0.0}}"#;
        let answer: QuizAnswer = serde_json::from_str(json).unwrap();
        assert_eq!(answer.question_id, 3);
        assert_eq!(answer.answer_value, 4);
        assert_eq!(answer.dosha_weights.get(Dosha::Pitta), 0.5);
    }

    #[test]
    fn test_profile_omits_missing_secondary() {
        let profile = ConstitutionProfile {
            subject_id: "u1".to_string(),
            scores: DoshaScores {
                vata: 33.33,
                pitta: 33.33,
                kapha: 33.33,
            },
            dominant: Dominant::Balanced,
            secondary: None,
            computed_at: Utc::now(),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["dominant"], "balanced");
        assert!(json.get("secondary").is_none());
        assert!(json.get("computedAt").is_some());
    }

    #[test]
    fn test_dosha_parse_roundtrip_names() {
        for dosha in Dosha::ALL {
            assert_eq!(dosha.to_string().parse::<Dosha>().unwrap(), dosha);
        }
        assert!("tridosha".parse::<Dosha>().is_err());
    }
}
