//! Constitution (prakriti) scoring
//!
//! Computes a vata / pitta / kapha profile from weighted questionnaire
//! answers. Pure and stateless; safe to call from any number of tasks.

pub mod engine;
pub mod handler;
pub mod types;

pub use engine::{compute_profile, ScoringEngine, BALANCED_TIE_SCORE};
pub use handler::{scoring_router, ScoringState};
pub use types::{ConstitutionProfile, Dominant, Dosha, DoshaScores, DoshaWeights, QuizAnswer};
