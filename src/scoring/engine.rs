//! Constitution scoring engine
//!
//! Turns weighted questionnaire answers into a normalized three-way
//! profile and classifies it as dominant / secondary / balanced.
//!
//! ```text
//! answers → raw Σ(value × weight) → normalize to max = 100 → rank → classify
//! ```
//!
//! Threshold comparisons run on integer hundredths so that rounded scores
//! such as `100.0 - 90.0` never miss the boundary by a float ulp.

use crate::config::ScoringConfig;
use crate::error::{Error, Result};
use crate::scoring::types::*;
use chrono::{DateTime, Utc};

/// Score emitted for every dosha when all raw scores are zero
pub const BALANCED_TIE_SCORE: f64 = 33.33;

/// Valid Likert range for `answer_value`
pub const ANSWER_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// Stateless constitution scoring engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Compute a constitution profile stamped with the current time.
    pub fn compute_profile(
        &self,
        subject_id: &str,
        answers: &[QuizAnswer],
    ) -> Result<ConstitutionProfile> {
        self.compute_profile_at(subject_id, answers, Utc::now())
    }

    /// Compute a constitution profile with an explicit timestamp.
    pub fn compute_profile_at(
        &self,
        subject_id: &str,
        answers: &[QuizAnswer],
        computed_at: DateTime<Utc>,
    ) -> Result<ConstitutionProfile> {
        validate_input(subject_id, answers)?;

        let raw = raw_scores(answers)?;
        let scores = self.normalize(raw);
        let (dominant, secondary) = self.classify(&scores);

        tracing::debug!(
            answers = answers.len(),
            dominant = ?dominant,
            secondary = ?secondary,
            "Constitution profile computed"
        );

        Ok(ConstitutionProfile {
            subject_id: subject_id.to_string(),
            scores,
            dominant,
            secondary,
            computed_at,
        })
    }

    fn normalize(&self, raw: [f64; 3]) -> DoshaScores {
        let max = raw.iter().copied().fold(0.0_f64, f64::max);
        if max == 0.0 {
            return DoshaScores {
                vata: BALANCED_TIE_SCORE,
                pitta: BALANCED_TIE_SCORE,
                kapha: BALANCED_TIE_SCORE,
            };
        }
        let [vata, pitta, kapha] = raw.map(|r| round2(r / max * 100.0));
        DoshaScores { vata, pitta, kapha }
    }

    fn classify(&self, scores: &DoshaScores) -> (Dominant, Option<Dosha>) {
        let [first, second, third] = scores.ranked();

        if hundredths(first.1) - hundredths(third.1) <= hundredths(self.config.balanced_threshold)
        {
            return (Dominant::Balanced, None);
        }

        let close_enough = hundredths(first.1) - hundredths(second.1)
            <= hundredths(self.config.secondary_threshold);
        let distinct_from_third = hundredths(second.1) > hundredths(third.1);
        let secondary = (close_enough && distinct_from_third).then_some(second.0);

        (first.0.into(), secondary)
    }
}

/// Compute a profile with the default thresholds.
pub fn compute_profile(subject_id: &str, answers: &[QuizAnswer]) -> Result<ConstitutionProfile> {
    ScoringEngine::default().compute_profile(subject_id, answers)
}

fn validate_input(subject_id: &str, answers: &[QuizAnswer]) -> Result<()> {
    if subject_id.trim().is_empty() {
        return Err(Error::Validation("subjectId must not be empty".to_string()));
    }
    if answers.is_empty() {
        return Err(Error::Validation("answers must not be empty".to_string()));
    }
    for answer in answers {
        if !ANSWER_RANGE.contains(&answer.answer_value) {
            return Err(Error::Validation(format!(
                "question {}: answerValue {} outside [1,5]",
                answer.question_id, answer.answer_value
            )));
        }
        for dosha in Dosha::ALL {
            let weight = answer.dosha_weights.get(dosha);
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::Validation(format!(
                    "question {}: {} weight must be a non-negative number",
                    answer.question_id, dosha
                )));
            }
        }
    }
    Ok(())
}

fn raw_scores(answers: &[QuizAnswer]) -> Result<[f64; 3]> {
    let raw = Dosha::ALL.map(|dosha| {
        answers
            .iter()
            .map(|a| a.answer_value as f64 * a.dosha_weights.get(dosha))
            .sum::<f64>()
    });
    if raw.iter().any(|r| !r.is_finite()) {
        return Err(Error::Validation("weights overflow the score range".to_string()));
    }
    Ok(raw)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn hundredths(value: f64) -> i64 {
    (value * 100.0).round() as i64
}
