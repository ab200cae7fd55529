//! The drinking-character questionnaire.
//!
//! Each question carries its option table up front; the kind of input
//! (single choice, checklist, toggle list) is fixed when the question is
//! defined.

use std::collections::{BTreeMap, BTreeSet};

use db::models::{
    factor::Factor,
    quiz_response::{QuizAnswer, QuizAnswers},
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogueError {
    #[error("unknown question {0}")]
    UnknownQuestion(u32),
    #[error("question {index} has no option {key:?}")]
    UnknownOption { index: u32, key: String },
    #[error("question {0} accepts a single selection")]
    TooManySelections(u32),
    #[error("option {key:?} selected twice on question {index}")]
    DuplicateSelection { index: u32, key: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct QuizOption {
    pub key: String,
    pub label: String,
    pub factor: Factor,
    #[serde(rename = "type")]
    pub pole: char,
    #[ts(type = "number")]
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "options", rename_all = "snake_case")]
pub enum QuestionKind {
    Radio(Vec<QuizOption>),
    Checklist(Vec<QuizOption>),
    ToggleList(Vec<QuizOption>),
}

impl QuestionKind {
    pub fn options(&self) -> &[QuizOption] {
        match self {
            QuestionKind::Radio(options)
            | QuestionKind::Checklist(options)
            | QuestionKind::ToggleList(options) => options,
        }
    }

    pub fn allows_multiple(&self) -> bool {
        !matches!(self, QuestionKind::Radio(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct QuizQuestion {
    pub index: u32,
    pub prompt: String,
    #[serde(flatten)]
    #[ts(flatten)]
    pub kind: QuestionKind,
}

impl QuizQuestion {
    pub fn option(&self, key: &str) -> Option<&QuizOption> {
        self.kind.options().iter().find(|option| option.key == key)
    }

    /// The stored answer for choosing `key` on this question.
    pub fn answer(&self, key: &str) -> Option<QuizAnswer> {
        self.option(key).map(|option| QuizAnswer {
            question: self.prompt.clone(),
            answer: option.key.clone(),
            factor: option.factor.to_string(),
            pole: option.pole.to_string(),
            value: option.value,
        })
    }
}

fn option(key: &str, label: &str, factor: Factor, pole: char, value: i64) -> QuizOption {
    QuizOption {
        key: key.to_string(),
        label: label.to_string(),
        factor,
        pole,
        value,
    }
}

fn question(index: u32, prompt: &str, kind: QuestionKind) -> QuizQuestion {
    QuizQuestion {
        index,
        prompt: prompt.to_string(),
        kind,
    }
}

static CATALOGUE: Lazy<Vec<QuizQuestion>> = Lazy::new(|| {
    use Factor::*;

    vec![
        question(
            0,
            "飲み会に誘われたら？",
            QuestionKind::Radio(vec![
                option("A", "自分から人を集めて店を探す", EI, 'E', 2),
                option("B", "気の合う人となら行く", EI, 'I', 1),
                option("C", "家でゆっくり飲みたい", EI, 'I', 2),
            ]),
        ),
        question(
            1,
            "初対面の人との乾杯、どうする？",
            QuestionKind::Radio(vec![
                option("A", "自分から話しかける", EI, 'E', 2),
                option("B", "話しかけられるのを待つ", EI, 'I', 2),
            ]),
        ),
        question(
            2,
            "お酒の強さは？",
            QuestionKind::Radio(vec![
                option("A", "いくらでも飲める", AH, 'A', 2),
                option("B", "ほどほど", AH, 'H', 1),
                option("C", "すぐ顔に出る", AH, 'H', 2),
            ]),
        ),
        question(
            3,
            "好きなお酒を選んでください（複数可）",
            QuestionKind::Checklist(vec![
                option("A", "日本酒", AH, 'A', 1),
                option("B", "ウイスキー", AH, 'A', 1),
                option("C", "カクテル", AH, 'H', 1),
                option("D", "ノンアルコール", AH, 'H', 2),
            ]),
        ),
        question(
            4,
            "お店選びは？",
            QuestionKind::Radio(vec![
                option("A", "事前に予約しておく", CR, 'C', 2),
                option("B", "その場の気分で決める", CR, 'R', 2),
            ]),
        ),
        question(
            5,
            "終電が近づいたら？",
            QuestionKind::Radio(vec![
                option("A", "きっちり帰る", CR, 'C', 2),
                option("B", "流れに任せる", CR, 'R', 2),
                option("C", "その日の気分次第", CR, 'R', 1),
            ]),
        ),
        question(
            6,
            "飲みの席での話題は？",
            QuestionKind::Radio(vec![
                option("A", "思いつくまま何でも", NT, 'N', 2),
                option("B", "じっくり深い話", NT, 'T', 2),
            ]),
        ),
        question(
            7,
            "飲み会で大事にしていること",
            QuestionKind::ToggleList(vec![
                option("A", "その場の雰囲気", NT, 'N', 1),
                option("B", "料理の味", NT, 'T', 1),
                option("C", "会話の中身", NT, 'T', 1),
                option("D", "特にない", NT, 'N', 0),
            ]),
        ),
        question(
            8,
            "二軒目に行くなら？",
            QuestionKind::Radio(vec![
                option("A", "新しい店を開拓したい", OS, 'O', 2),
                option("B", "いつもの店が落ち着く", OS, 'S', 2),
            ]),
        ),
        question(
            9,
            "旅行先で飲むなら？",
            QuestionKind::Radio(vec![
                option("A", "地元の居酒屋に飛び込む", OS, 'O', 2),
                option("B", "ホテルのバーで一杯", OS, 'S', 1),
                option("C", "部屋でのんびり", OS, 'S', 2),
            ]),
        ),
    ]
});

pub fn catalogue() -> &'static [QuizQuestion] {
    &CATALOGUE
}

pub fn find_question(index: u32) -> Option<&'static QuizQuestion> {
    CATALOGUE.iter().find(|question| question.index == index)
}

/// Turn `{question index → selected option keys}` into the stored answers
/// map. Single-choice questions are keyed `"{index}"`, multi-select ones
/// `"{index}-{n}"`. Questions with no selection are skipped.
pub fn build_answers(
    selections: &BTreeMap<u32, Vec<String>>,
) -> Result<QuizAnswers, CatalogueError> {
    let mut answers = QuizAnswers::new();

    for (&index, keys) in selections {
        let question = find_question(index).ok_or(CatalogueError::UnknownQuestion(index))?;
        let multiple = question.kind.allows_multiple();
        if !multiple && keys.len() > 1 {
            return Err(CatalogueError::TooManySelections(index));
        }

        let mut seen = BTreeSet::new();
        for (n, key) in keys.iter().enumerate() {
            if !seen.insert(key.as_str()) {
                return Err(CatalogueError::DuplicateSelection {
                    index,
                    key: key.clone(),
                });
            }
            let answer = question
                .answer(key)
                .ok_or_else(|| CatalogueError::UnknownOption {
                    index,
                    key: key.clone(),
                })?;
            let slot = if multiple {
                format!("{index}-{n}")
            } else {
                index.to_string()
            };
            answers.insert(slot, answer);
        }
    }

    Ok(answers)
}
