//! Word management handlers
//!
//! The word in the path is the identity; for updates it is the *previous*
//! lemma, so a rename carries the new lemma in the body.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;
use validator::Validate;

use crate::handlers::SuccessResponse;
use crate::AppState;
use lexhub_common::{
    auth::AuthContext,
    db::models::{Example, Meaning, Role, Word},
    db::{CreateWord, CreatedWord, MeaningInput, Repository, UpdateWord, UpdatedWord, WordOptions},
    errors::{AppError, Result},
    metrics,
    search::WordStatus,
};

/// Request to create or update a word
#[derive(Debug, Deserialize, Validate)]
pub struct WordRequest {
    /// Defaults to the lemma in the path; for updates this is the new lemma
    #[serde(default)]
    #[validate(length(min = 1, max = 200))]
    pub lemma: Option<String>,

    #[serde(default)]
    pub root: Option<String>,

    #[serde(default)]
    pub letter: Option<String>,

    #[serde(default)]
    pub status: Option<WordStatus>,

    #[serde(default)]
    pub assigned_to: Option<Uuid>,

    #[serde(default)]
    pub created_by: Option<Uuid>,

    /// Full meaning set in submission order
    #[serde(default)]
    pub values: Vec<MeaningInput>,
}

impl WordRequest {
    fn options(&self, fallback_author: Uuid) -> WordOptions {
        WordOptions {
            letter: self.letter.clone(),
            status: self.status,
            assigned_to: self.assigned_to,
            created_by: Some(self.created_by.unwrap_or(fallback_author)),
        }
    }
}

/// A word with its full meaning/example tree
#[derive(Serialize)]
pub struct WordDetailResponse {
    #[serde(flatten)]
    pub word: Word,
    pub meanings: Vec<MeaningWithExamples>,
}

#[derive(Serialize)]
pub struct MeaningWithExamples {
    #[serde(flatten)]
    pub meaning: Meaning,
    pub examples: Vec<Example>,
}

/// Create a word with its meanings and examples
pub async fn create_word(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(lemma): Path<String>,
    Json(request): Json<WordRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<CreatedWord>>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let user = auth.authorize(&repo, Role::Lexicographer).await?;

    let start = Instant::now();
    let input = CreateWord {
        lemma: request.lemma.clone().unwrap_or(lemma),
        root: request.root.clone(),
        values: request.values.clone(),
    };
    let options = request.options(user.id);

    let created = repo.create_word(input, options).await;
    metrics::record_mutation(start.elapsed().as_secs_f64(), "create", created.is_ok());
    let created = created?;

    tracing::info!(
        lemma = %created.lemma,
        letter = %created.letter,
        user_id = %user.id,
        "Word created"
    );

    Ok((StatusCode::CREATED, Json(SuccessResponse::new(created))))
}

/// Replace a word's data and full meaning set
pub async fn update_word(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(prev_lemma): Path<String>,
    Json(request): Json<WordRequest>,
) -> Result<Json<SuccessResponse<UpdatedWord>>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let user = auth.authorize(&repo, Role::Lexicographer).await?;

    let start = Instant::now();
    let input = UpdateWord {
        lemma: request.lemma.clone().unwrap_or_else(|| prev_lemma.clone()),
        root: request.root.clone(),
        values: request.values.clone(),
    };
    let options = request.options(user.id);

    let updated = repo.update_word_by_lemma(&prev_lemma, input, options).await;
    metrics::record_mutation(start.elapsed().as_secs_f64(), "update", updated.is_ok());
    let updated = updated?;

    tracing::info!(
        prev_lemma = %prev_lemma,
        lemma = %updated.lemma,
        user_id = %user.id,
        "Word updated"
    );

    Ok(Json(SuccessResponse::new(updated)))
}

/// Delete a word; meanings, examples, and notes cascade away
pub async fn delete_word(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(lemma): Path<String>,
) -> Result<StatusCode> {
    let repo = Repository::new(state.db.clone());
    let user = auth.authorize(&repo, Role::Editor).await?;

    let start = Instant::now();
    let deleted = repo.delete_word_by_lemma(&lemma).await;
    metrics::record_mutation(start.elapsed().as_secs_f64(), "delete", deleted.is_ok());
    deleted?;

    tracing::info!(lemma = %lemma, user_id = %user.id, "Word deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Public read of a word with its meanings and examples.
///
/// Unpublished words are indistinguishable from absent ones here.
pub async fn get_word(
    State(state): State<AppState>,
    Path(lemma): Path<String>,
) -> Result<Json<WordDetailResponse>> {
    let repo = Repository::new(state.db.clone());

    let word = repo
        .find_word_by_lemma(&lemma)
        .await?
        .filter(Word::is_published)
        .ok_or(AppError::WordNotFound { lemma })?;

    let mut meanings = Vec::new();
    for meaning in repo.get_meanings(word.id).await? {
        let examples = repo.get_examples(meaning.id).await?;
        meanings.push(MeaningWithExamples { meaning, examples });
    }

    Ok(Json(WordDetailResponse { word, meanings }))
}
