//! Drinking-character classification from quiz answers.
//!
//! Answers are validated, folded into a fresh [`FactorScoreboard`], each axis
//! is resolved to one letter and the resulting five-letter code is looked up
//! in the character tables.

use std::{cmp::Ordering, fmt, str::FromStr};

use db::models::{
    factor::{Factor, FactorScoreboard},
    quiz_response::{QuizAnswer, QuizAnswers},
};
use thiserror::Error;

use super::character_profiles::{self, CharacterProfile};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("invalid answer {key}: {reason}")]
    InvalidAnswer { key: String, reason: String },
    #[error("no character registered for code {code}")]
    UnknownCharacterCode { code: String },
}

impl ScoringError {
    fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAnswer {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Largest weight a single answer may carry.
pub const MAX_ANSWER_VALUE: i64 = 10;

/// An answer whose axis and pole have been checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedAnswer {
    pub factor: Factor,
    pub pole: char,
    pub value: i64,
}

pub fn validate_answer(key: &str, answer: &QuizAnswer) -> Result<ValidatedAnswer, ScoringError> {
    let factor = Factor::from_str(&answer.factor)
        .map_err(|_| ScoringError::invalid(key, format!("unknown factor {:?}", answer.factor)))?;

    let mut letters = answer.pole.chars();
    let pole = match (letters.next(), letters.next()) {
        (Some(pole), None) => pole,
        _ => {
            return Err(ScoringError::invalid(
                key,
                format!("type must be a single letter, got {:?}", answer.pole),
            ));
        }
    };

    if !factor.contains(pole) {
        return Err(ScoringError::invalid(
            key,
            format!("type {pole} is not a pole of {factor}"),
        ));
    }
    if !(0..=MAX_ANSWER_VALUE).contains(&answer.value) {
        return Err(ScoringError::invalid(
            key,
            format!(
                "value must be between 0 and {MAX_ANSWER_VALUE}, got {}",
                answer.value
            ),
        ));
    }

    Ok(ValidatedAnswer {
        factor,
        pole,
        value: answer.value,
    })
}

/// Validate every answer, stopping at the first invalid one.
pub fn validate_answers(answers: &QuizAnswers) -> Result<Vec<ValidatedAnswer>, ScoringError> {
    answers
        .iter()
        .map(|(key, answer)| validate_answer(key, answer))
        .collect()
}

pub fn tally(answers: &[ValidatedAnswer]) -> FactorScoreboard {
    let mut scoreboard = FactorScoreboard::new();
    for answer in answers {
        // Validation guarantees the pole belongs to the factor.
        scoreboard.add(answer.factor, answer.pole, answer.value);
    }
    scoreboard
}

pub fn score_answers(answers: &QuizAnswers) -> Result<FactorScoreboard, ScoringError> {
    Ok(tally(&validate_answers(answers)?))
}

/// Winning letter for one axis: the strictly larger tally, or the axis'
/// tie-break letter on equal tallies.
pub fn resolve_axis(scoreboard: &FactorScoreboard, factor: Factor) -> char {
    let (first, second) = factor.poles();
    match scoreboard
        .tally(factor, second)
        .cmp(&scoreboard.tally(factor, first))
    {
        Ordering::Greater => second,
        Ordering::Less => first,
        Ordering::Equal => factor.tie_break(),
    }
}

/// Five winning letters in `E/I, A/H, C/R, N/T, O/S` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharacterCode([char; 5]);

impl CharacterCode {
    pub fn from_scoreboard(scoreboard: &FactorScoreboard) -> Self {
        Self(Factor::ALL.map(|factor| resolve_axis(scoreboard, factor)))
    }

    pub fn letters(&self) -> [char; 5] {
        self.0
    }

    /// Letters `[0, 3)`: the character itself.
    pub fn front(&self) -> String {
        self.0[..3].iter().collect()
    }

    /// Letters `[3, 5)`: the modifier.
    pub fn back(&self) -> String {
        self.0[3..].iter().collect()
    }
}

impl fmt::Display for CharacterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|letter| write!(f, "{letter}"))
    }
}

impl FromStr for CharacterCode {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ScoringError::UnknownCharacterCode {
            code: s.to_string(),
        };

        let letters: Vec<char> = s.chars().collect();
        let letters: [char; 5] = letters.try_into().map_err(|_| unknown())?;
        if Factor::ALL
            .iter()
            .zip(letters)
            .any(|(factor, letter)| !factor.contains(letter))
        {
            return Err(unknown());
        }
        Ok(Self(letters))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub scoreboard: FactorScoreboard,
    pub code: CharacterCode,
    pub profile: CharacterProfile,
}

/// Score `answers` and resolve the display profile.
pub fn classify(answers: &QuizAnswers) -> Result<Classification, ScoringError> {
    let scoreboard = score_answers(answers)?;
    let code = CharacterCode::from_scoreboard(&scoreboard);
    let profile = character_profiles::resolve(&code)?;
    Ok(Classification {
        scoreboard,
        code,
        profile,
    })
}
