//! Writes the TypeScript declarations of the API types for the web client.
//!
//! Usage: `cargo run --bin generate_types [output-path]`

use std::{env, fs, path::PathBuf};

use anyhow::Context;
use db::models::{
    character_result::{CharacterResultView, ProcessedResult, ResultStatus},
    factor::Factor,
    quiz_response::{QuizAnswer, ResponseStatus},
};
use server::routes::{
    character::{ProcessCharacterRequest, ProcessCharacterResponse},
    quiz::{SubmitQuizResponse, SubmittedQuizResponse},
};
use services::services::{
    character_profiles::CharacterProfile,
    question_catalogue::{QuestionKind, QuizOption, QuizQuestion},
};
use ts_rs::TS;
use utils::response::ApiResponse;

const DEFAULT_OUTPUT: &str = "shared/types.ts";

fn generate_types_content() -> String {
    let decls = [
        ApiResponse::<()>::decl(),
        Factor::decl(),
        QuizAnswer::decl(),
        ResponseStatus::decl(),
        ResultStatus::decl(),
        ProcessedResult::decl(),
        CharacterResultView::decl(),
        CharacterProfile::decl(),
        QuizOption::decl(),
        QuestionKind::decl(),
        QuizQuestion::decl(),
        SubmitQuizResponse::decl(),
        SubmittedQuizResponse::decl(),
        ProcessCharacterRequest::decl(),
        ProcessCharacterResponse::decl(),
    ];

    let body = decls
        .iter()
        .map(|decl| format!("export {decl}"))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("// This file was generated by `generate_types`. Do not edit it by hand.\n\n{body}\n")
}

fn main() -> anyhow::Result<()> {
    let output = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&output, generate_types_content())
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("Wrote {}", output.display());
    Ok(())
}
