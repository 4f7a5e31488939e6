//! Editorial note handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::handlers::SuccessResponse;
use crate::AppState;
use lexhub_common::{
    auth::AuthContext,
    db::models::{Note, Role, User},
    db::{NoteWithAuthor, Repository},
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize, Validate)]
pub struct AddNoteRequest {
    #[validate(length(min = 1, max = 5000))]
    pub text: String,
}

#[derive(Serialize)]
pub struct NoteView {
    #[serde(flatten)]
    pub note: Note,
    pub author: Option<User>,
}

/// Attach a note to a word
pub async fn add_note(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(lemma): Path<String>,
    Json(request): Json<AddNoteRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<NoteWithAuthor>>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("text".to_string()),
    })?;

    let repo = Repository::new(state.db.clone());
    let user = auth.authorize(&repo, Role::Lexicographer).await?;

    let note = repo
        .add_note_to_word(&lemma, &request.text, Some(user.id))
        .await?;

    tracing::info!(lemma = %lemma, user_id = %user.id, "Note added");

    Ok((StatusCode::CREATED, Json(SuccessResponse::new(note))))
}

/// List the notes on a word, newest first
pub async fn list_notes(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(lemma): Path<String>,
) -> Result<Json<Vec<NoteView>>> {
    let repo = Repository::new(state.db.clone());
    auth.authorize(&repo, Role::Lexicographer).await?;

    let word = repo
        .find_word_by_lemma(&lemma)
        .await?
        .ok_or(AppError::WordNotFound { lemma })?;

    let notes = repo
        .get_notes(word.id)
        .await?
        .into_iter()
        .map(|(note, author)| NoteView { note, author })
        .collect();

    Ok(Json(notes))
}

/// Mark a note as resolved
pub async fn resolve_note(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(note_id): Path<Uuid>,
) -> Result<Json<SuccessResponse<Note>>> {
    let repo = Repository::new(state.db.clone());
    auth.authorize(&repo, Role::Lexicographer).await?;

    let note = repo.resolve_note(note_id).await?;

    Ok(Json(SuccessResponse::new(note)))
}
