//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations with proper
//! error handling and transaction support. Editing a word's meanings is a
//! full replace: the delete-then-reinsert sequence runs inside one
//! transaction so readers never observe a word with zero meanings mid-edit.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::search::{
    Pagination, SearchCriteria, SearchMode, SearchOutcome, SearchPage, WordHit, WordStatus,
    PAGE_SIZE,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    QueryFilter, Set, Statement, TransactionTrait, Value,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload for creating a word
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWord {
    pub lemma: String,
    #[serde(default)]
    pub root: Option<String>,
    /// Meanings in submission order
    #[serde(default)]
    pub values: Vec<MeaningInput>,
}

/// Payload for updating a word (full replace of its meanings)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWord {
    pub lemma: String,
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub values: Vec<MeaningInput>,
}

/// Optional knobs shared by create and update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WordOptions {
    /// Explicit letter; its first character wins over lemma derivation
    #[serde(default)]
    pub letter: Option<String>,
    #[serde(default)]
    pub status: Option<WordStatus>,
    #[serde(default)]
    pub assigned_to: Option<Uuid>,
    #[serde(default)]
    pub created_by: Option<Uuid>,
}

/// One submitted meaning
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeaningInput {
    pub meaning: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub observation: Option<String>,
    #[serde(default)]
    pub remission: Option<String>,
    #[serde(default)]
    pub grammar_category: Option<String>,
    #[serde(default)]
    pub social_valuation: Option<String>,
    #[serde(default)]
    pub social_stratum: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub intentionality: Option<String>,
    #[serde(default)]
    pub geography: Option<String>,
    #[serde(default)]
    pub chronology: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub dictionary: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub examples: Option<Vec<ExampleInput>>,
}

/// One submitted example quotation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExampleInput {
    pub quotation: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub publication: Option<String>,
    /// Legacy field; mapped onto `publication` when that is absent
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub editorial: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Identity of a freshly created word
#[derive(Debug, Clone, Serialize)]
pub struct CreatedWord {
    pub id: Uuid,
    pub lemma: String,
    pub letter: String,
}

/// Identity of an updated word
#[derive(Debug, Clone, Serialize)]
pub struct UpdatedWord {
    pub id: Uuid,
    pub lemma: String,
    pub status: String,
}

/// A note joined with its author
#[derive(Debug, Clone, Serialize)]
pub struct NoteWithAuthor {
    pub note: Note,
    pub author: Option<User>,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Word Mutations
    // ========================================================================

    /// Create a word together with its full meaning/example set.
    ///
    /// The lemma is trimmed and must be non-empty; the letter comes from the
    /// explicit option when given, else from the lemma. Everything runs in
    /// one transaction: either the word and all of its meanings exist
    /// afterwards, or nothing does.
    pub async fn create_word(
        &self,
        input: CreateWord,
        options: WordOptions,
    ) -> Result<CreatedWord> {
        let lemma = input.lemma.trim().to_string();
        if lemma.is_empty() {
            return Err(AppError::Validation {
                message: "lemma must not be empty".to_string(),
                field: Some("lemma".to_string()),
            });
        }

        let letter = derive_letter(options.letter.as_deref(), &lemma);
        let status = options.status.unwrap_or(WordStatus::Draft);
        let now = chrono::Utc::now();
        let word_id = Uuid::new_v4();

        let txn = self.write_conn().begin().await?;

        // Exact-match uniqueness check before insert
        let existing = WordEntity::find()
            .filter(WordColumn::Lemma.eq(lemma.as_str()))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::DuplicateLemma { lemma });
        }

        let word = WordActiveModel {
            id: Set(word_id),
            lemma: Set(lemma.clone()),
            root: Set(none_if_blank(input.root)),
            letter: Set(letter.clone()),
            status: Set(status.as_str().to_string()),
            created_by: Set(options.created_by),
            assigned_to: Set(options.assigned_to),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        word.insert(&txn).await?;

        insert_meanings(&txn, word_id, input.values).await?;

        txn.commit().await?;

        tracing::info!(lemma = %lemma, letter = %letter, "Word created");

        Ok(CreatedWord {
            id: word_id,
            lemma,
            letter,
        })
    }

    /// Update a word looked up by its previous lemma.
    ///
    /// The meaning set is replaced wholesale: all prior meanings (and their
    /// examples, via cascade) are deleted and the submitted list reinserted.
    /// The whole sequence shares one transaction, so a failed reinsert rolls
    /// the delete back instead of leaving the word meaningless.
    pub async fn update_word_by_lemma(
        &self,
        prev_lemma: &str,
        input: UpdateWord,
        options: WordOptions,
    ) -> Result<UpdatedWord> {
        let lemma = input.lemma.trim().to_string();
        if lemma.is_empty() {
            return Err(AppError::Validation {
                message: "lemma must not be empty".to_string(),
                field: Some("lemma".to_string()),
            });
        }

        let txn = self.write_conn().begin().await?;

        let word = WordEntity::find()
            .filter(WordColumn::Lemma.eq(prev_lemma))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::WordNotFound {
                lemma: prev_lemma.to_string(),
            })?;

        if lemma != prev_lemma {
            let taken = WordEntity::find()
                .filter(WordColumn::Lemma.eq(lemma.as_str()))
                .one(&txn)
                .await?;
            if taken.is_some() {
                return Err(AppError::DuplicateLemma { lemma });
            }
        }

        let word_id = word.id;
        let mut active: WordActiveModel = word.into();
        active.lemma = Set(lemma.clone());
        active.root = Set(none_if_blank(input.root));
        active.updated_at = Set(chrono::Utc::now().into());
        if let Some(letter) = options.letter.as_deref() {
            active.letter = Set(derive_letter(Some(letter), &lemma));
        }
        if let Some(status) = options.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(assignee) = options.assigned_to {
            active.assigned_to = Set(Some(assignee));
        }
        let updated = active.update(&txn).await?;

        // Full replace: cascade clears the examples of each deleted meaning
        MeaningEntity::delete_many()
            .filter(MeaningColumn::WordId.eq(word_id))
            .exec(&txn)
            .await?;

        insert_meanings(&txn, word_id, input.values).await?;

        txn.commit().await?;

        tracing::info!(prev_lemma = %prev_lemma, lemma = %lemma, "Word updated");

        Ok(UpdatedWord {
            id: word_id,
            lemma,
            status: updated.status,
        })
    }

    /// Delete a word; meanings, examples, and notes go with it via cascade
    pub async fn delete_word_by_lemma(&self, lemma: &str) -> Result<()> {
        let word = self
            .find_word_by_lemma(lemma)
            .await?
            .ok_or_else(|| AppError::WordNotFound {
                lemma: lemma.to_string(),
            })?;

        WordEntity::delete_by_id(word.id)
            .exec(self.write_conn())
            .await?;

        tracing::info!(lemma = %lemma, "Word deleted");

        Ok(())
    }

    /// Find a word by its lemma
    pub async fn find_word_by_lemma(&self, lemma: &str) -> Result<Option<Word>> {
        WordEntity::find()
            .filter(WordColumn::Lemma.eq(lemma))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Get the meanings of a word ordered by their number
    pub async fn get_meanings(&self, word_id: Uuid) -> Result<Vec<Meaning>> {
        use sea_orm::QueryOrder;

        MeaningEntity::find()
            .filter(MeaningColumn::WordId.eq(word_id))
            .order_by_asc(MeaningColumn::Number)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Get the examples of a meaning
    pub async fn get_examples(&self, meaning_id: Uuid) -> Result<Vec<Example>> {
        ExampleEntity::find()
            .filter(ExampleColumn::MeaningId.eq(meaning_id))
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List words by status (report feeds)
    pub async fn list_words_by_status(&self, status: Option<WordStatus>) -> Result<Vec<Word>> {
        use sea_orm::QueryOrder;

        let mut query = WordEntity::find();
        if let Some(status) = status {
            query = query.filter(WordColumn::Status.eq(status.as_str()));
        }
        query
            .order_by_asc(WordColumn::Lemma)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Note Operations
    // ========================================================================

    /// Attach a note to a word and return it joined with its author.
    ///
    /// The joined re-read failing right after the insert means the storage
    /// layer contradicted itself, which surfaces as an integrity error.
    pub async fn add_note_to_word(
        &self,
        lemma: &str,
        text: &str,
        user_id: Option<Uuid>,
    ) -> Result<NoteWithAuthor> {
        if text.trim().is_empty() {
            return Err(AppError::Validation {
                message: "note text must not be empty".to_string(),
                field: Some("text".to_string()),
            });
        }

        let word = self
            .find_word_by_lemma(lemma)
            .await?
            .ok_or_else(|| AppError::WordNotFound {
                lemma: lemma.to_string(),
            })?;

        let note_id = Uuid::new_v4();
        let note = NoteActiveModel {
            id: Set(note_id),
            word_id: Set(word.id),
            user_id: Set(user_id),
            text: Set(text.trim().to_string()),
            resolved: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };
        note.insert(self.write_conn()).await?;

        // Read-your-write on the primary connection
        let (note, author) = NoteEntity::find_by_id(note_id)
            .find_also_related(UserEntity)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::Integrity {
                message: format!("note {} vanished after insert on word {}", note_id, lemma),
            })?;

        Ok(NoteWithAuthor { note, author })
    }

    /// Mark a note as resolved
    pub async fn resolve_note(&self, note_id: Uuid) -> Result<Note> {
        let note = NoteEntity::find_by_id(note_id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::NotFound {
                resource_type: "note".to_string(),
                id: note_id.to_string(),
            })?;

        let mut active: NoteActiveModel = note.into();
        active.resolved = Set(true);
        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Get the notes on a word, newest first
    pub async fn get_notes(&self, word_id: Uuid) -> Result<Vec<(Note, Option<User>)>> {
        use sea_orm::QueryOrder;

        NoteEntity::find()
            .filter(NoteColumn::WordId.eq(word_id))
            .find_also_related(UserEntity)
            .order_by_desc(NoteColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Run a criteria search and return one page of ranked results.
    ///
    /// Criteria are normalized and mode-sanitized first; empty criteria are
    /// reported as `NoCriteria` without touching the database.
    pub async fn search_words(
        &self,
        criteria: SearchCriteria,
        mode: SearchMode,
        page: u64,
    ) -> Result<SearchOutcome> {
        let criteria = criteria.normalized().sanitized(mode);
        if criteria.is_empty() {
            return Ok(SearchOutcome::NoCriteria);
        }

        let page = page.max(1);
        let stmt = build_search_sql(&criteria, mode, page);

        let count_stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            &stmt.count_sql,
            stmt.count_values,
        );
        let total = self
            .read_conn()
            .query_one(count_stmt)
            .await?
            .and_then(|row| row.try_get_by_index::<i64>(0).ok())
            .unwrap_or(0)
            .max(0) as u64;

        let mut page_values = stmt.values;
        page_values.push((PAGE_SIZE as i64).into());
        page_values.push((((page - 1) * PAGE_SIZE) as i64).into());
        let page_stmt =
            Statement::from_sql_and_values(DbBackend::Postgres, &stmt.page_sql, page_values);

        let results = self
            .read_conn()
            .query_all(page_stmt)
            .await?
            .into_iter()
            .filter_map(|row| {
                Some(WordHit {
                    id: row.try_get_by_index::<Uuid>(0).ok()?,
                    lemma: row.try_get_by_index::<String>(1).ok()?,
                    status: row.try_get_by_index::<String>(2).ok()?,
                    snippet: row.try_get_by_index::<Option<String>>(3).ok()?,
                })
            })
            .collect();

        Ok(SearchOutcome::Page(SearchPage {
            results,
            pagination: Pagination::from_total(total, page, PAGE_SIZE),
        }))
    }

    // ========================================================================
    // User / Session Operations
    // ========================================================================

    /// Find a user by username
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::Username.eq(username))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find the user holding a live session token
    pub async fn find_user_by_session_token(&self, token: &str) -> Result<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::SessionToken.eq(token))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Overwrite a user's session token.
    ///
    /// The column is unique and singular, so setting a fresh token is also
    /// what ends any previous session; `None` logs the user out.
    pub async fn set_session_token(&self, user_id: Uuid, token: Option<String>) -> Result<User> {
        let user = UserEntity::find_by_id(user_id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::UserNotFound {
                id: user_id.to_string(),
            })?;

        let mut active: UserActiveModel = user.into();
        active.session_token = Set(token);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Store a password reset token hash
    pub async fn create_password_reset_token(
        &self,
        user_id: Uuid,
        token_hash: String,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<PasswordResetToken> {
        let token = PasswordResetTokenActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            token_hash: Set(token_hash),
            expires_at: Set(expires_at.into()),
            created_at: Set(chrono::Utc::now().into()),
        };
        token.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Consume a password reset token: returns it once, then deletes it
    pub async fn consume_password_reset_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordResetToken>> {
        let found = PasswordResetTokenEntity::find()
            .filter(PasswordResetTokenColumn::TokenHash.eq(token_hash))
            .one(self.write_conn())
            .await?;

        if let Some(ref token) = found {
            PasswordResetTokenEntity::delete_by_id(token.id)
                .exec(self.write_conn())
                .await?;
        }

        Ok(found)
    }
}

// ============================================================================
// Meaning insertion helper
// ============================================================================

/// Insert a submitted meaning list for a word, in submission order.
///
/// Marker fields are normalized independently (blank becomes NULL), example
/// lists default to empty, blank example fields become NULL, and the legacy
/// `source` field maps onto `publication` when that is absent.
async fn insert_meanings<C: ConnectionTrait>(
    conn: &C,
    word_id: Uuid,
    values: Vec<MeaningInput>,
) -> Result<()> {
    for (index, input) in values.into_iter().enumerate() {
        let number = (index + 1) as i32;

        if input.meaning.trim().is_empty() {
            return Err(AppError::Validation {
                message: format!("meaning {} must not be empty", number),
                field: Some("meaning".to_string()),
            });
        }

        let meaning_id = Uuid::new_v4();
        let meaning = MeaningActiveModel {
            id: Set(meaning_id),
            word_id: Set(word_id),
            number: Set(number),
            meaning: Set(input.meaning.trim().to_string()),
            origin: Set(none_if_blank(input.origin)),
            observation: Set(none_if_blank(input.observation)),
            remission: Set(none_if_blank(input.remission)),
            grammar_category: Set(none_if_blank(input.grammar_category)),
            social_valuation: Set(none_if_blank(input.social_valuation)),
            social_stratum: Set(none_if_blank(input.social_stratum)),
            style: Set(none_if_blank(input.style)),
            intentionality: Set(none_if_blank(input.intentionality)),
            geography: Set(none_if_blank(input.geography)),
            chronology: Set(none_if_blank(input.chronology)),
            frequency: Set(none_if_blank(input.frequency)),
            dictionary: Set(none_if_blank(input.dictionary)),
            variant: Set(none_if_blank(input.variant)),
        };
        meaning.insert(conn).await?;

        for example in input.examples.unwrap_or_default() {
            if example.quotation.trim().is_empty() {
                return Err(AppError::Validation {
                    message: format!("example quotation in meaning {} must not be empty", number),
                    field: Some("quotation".to_string()),
                });
            }

            let example = normalize_example(example);
            let row = ExampleActiveModel {
                id: Set(Uuid::new_v4()),
                meaning_id: Set(meaning_id),
                quotation: Set(example.quotation.trim().to_string()),
                author: Set(example.author),
                year: Set(example.year),
                publication: Set(example.publication),
                format: Set(example.format),
                title: Set(example.title),
                date: Set(example.date),
                city: Set(example.city),
                editorial: Set(example.editorial),
                volume: Set(example.volume),
                number: Set(example.number),
                page: Set(example.page),
                doi: Set(example.doi),
                url: Set(example.url),
            };
            row.insert(conn).await?;
        }
    }

    Ok(())
}

/// Blank example fields become NULL; the legacy `source` backfills
/// `publication` when the latter is absent.
fn normalize_example(mut example: ExampleInput) -> ExampleInput {
    example.author = none_if_blank(example.author);
    example.year = none_if_blank(example.year);
    example.publication =
        none_if_blank(example.publication).or_else(|| none_if_blank(example.source.take()));
    example.source = None;
    example.format = none_if_blank(example.format);
    example.title = none_if_blank(example.title);
    example.date = none_if_blank(example.date);
    example.city = none_if_blank(example.city);
    example.editorial = none_if_blank(example.editorial);
    example.volume = none_if_blank(example.volume);
    example.number = none_if_blank(example.number);
    example.page = none_if_blank(example.page);
    example.doi = none_if_blank(example.doi);
    example.url = none_if_blank(example.url);
    example
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

/// Derive the filing letter: explicit option first, else the lemma, else 'a'.
///
/// The first character is lower-cased and Spanish acute accents and the
/// diaeresis are folded away; ñ stays its own letter.
fn derive_letter(explicit: Option<&str>, lemma: &str) -> String {
    let source = explicit
        .and_then(|s| s.trim().chars().next())
        .or_else(|| lemma.trim().chars().next())
        .unwrap_or('a');

    let lowered = source.to_lowercase().next().unwrap_or('a');
    let folded = match lowered {
        'á' => 'a',
        'é' => 'e',
        'í' => 'i',
        'ó' => 'o',
        'ú' | 'ü' => 'u',
        other => other,
    };
    folded.to_string()
}

// ============================================================================
// Search SQL assembly
// ============================================================================

/// Count and page SQL over one shared WHERE-parameter prefix. The count
/// query binds only `count_values`; the page query binds `values` (WHERE
/// plus ranking parameters) with LIMIT and OFFSET appended after them.
#[derive(Debug)]
struct SearchStatement {
    count_sql: String,
    count_values: Vec<Value>,
    page_sql: String,
    values: Vec<Value>,
}

struct SqlBuilder {
    conditions: Vec<String>,
    values: Vec<Value>,
}

impl SqlBuilder {
    fn new() -> Self {
        Self {
            conditions: Vec::new(),
            values: Vec::new(),
        }
    }

    fn bind<V: Into<Value>>(&mut self, value: V) -> String {
        self.values.push(value.into());
        format!("${}", self.values.len())
    }

    fn in_list(&mut self, column: &str, items: &[String]) -> String {
        let placeholders: Vec<String> = items.iter().map(|v| self.bind(v.clone())).collect();
        format!("{} IN ({})", column, placeholders.join(", "))
    }

    /// Filter on a meaning column without multiplying word rows
    fn meaning_filter(&mut self, column: &str, items: &[String]) {
        let list = self.in_list(&format!("m.{}", column), items);
        self.conditions.push(format!(
            "EXISTS (SELECT 1 FROM meanings m WHERE m.word_id = w.id AND {})",
            list
        ));
    }
}

/// Escape LIKE wildcards in user input; queries are data, not patterns
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn build_search_sql(criteria: &SearchCriteria, mode: SearchMode, page: u64) -> SearchStatement {
    debug_assert!(page >= 1);

    let mut builder = SqlBuilder::new();

    // Public searches only ever see published words
    if mode == SearchMode::Public {
        let p = builder.bind(WordStatus::Published.as_str());
        builder.conditions.push(format!("w.status = {}", p));
    } else if let Some(status) = criteria.status {
        let p = builder.bind(status.as_str());
        builder.conditions.push(format!("w.status = {}", p));
    }

    let query = criteria.query.trim();
    if !query.is_empty() {
        let pattern = format!("%{}%", escape_like(query));
        let p = builder.bind(pattern);
        builder.conditions.push(format!(
            "(w.lemma ILIKE {p} ESCAPE '\\' OR EXISTS (SELECT 1 FROM meanings m WHERE m.word_id = w.id AND m.meaning ILIKE {p} ESCAPE '\\'))",
            p = p
        ));
    }

    if !criteria.letters.is_empty() {
        let list = builder.in_list("w.letter", &criteria.letters);
        builder.conditions.push(list);
    }
    if !criteria.categories.is_empty() {
        builder.meaning_filter("grammar_category", &criteria.categories);
    }
    if !criteria.origins.is_empty() {
        builder.meaning_filter("origin", &criteria.origins);
    }
    if !criteria.dictionaries.is_empty() {
        builder.meaning_filter("dictionary", &criteria.dictionaries);
    }
    for (column, values) in criteria.markers.active() {
        builder.meaning_filter(column, values);
    }

    if !criteria.assigned_to.is_empty() {
        let placeholders: Vec<String> = criteria
            .assigned_to
            .iter()
            .map(|id| builder.bind(*id))
            .collect();
        builder
            .conditions
            .push(format!("w.assigned_to IN ({})", placeholders.join(", ")));
    }

    let where_clause = if builder.conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", builder.conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM words w {}", where_clause);
    let count_values = builder.values.clone();

    // Ranking: exact lemma, then lemma prefix, then the rest; alphabetical
    // within each band
    let order_by = if query.is_empty() {
        "ORDER BY w.lemma ASC".to_string()
    } else {
        let exact = builder.bind(query.to_lowercase());
        let prefix = builder.bind(format!("{}%", escape_like(query)));
        format!(
            "ORDER BY CASE WHEN lower(w.lemma) = {} THEN 0 WHEN w.lemma ILIKE {} ESCAPE '\\' THEN 1 ELSE 2 END, w.lemma ASC",
            exact, prefix
        )
    };

    let limit = format!("${}", builder.values.len() + 1);
    let offset = format!("${}", builder.values.len() + 2);

    let page_sql = format!(
        r#"
        SELECT
            w.id,
            w.lemma,
            w.status,
            (SELECT m.meaning FROM meanings m WHERE m.word_id = w.id ORDER BY m.number ASC LIMIT 1) AS snippet
        FROM words w
        {}
        {}
        LIMIT {} OFFSET {}
        "#,
        where_clause, order_by, limit, offset
    );

    SearchStatement {
        count_sql,
        count_values,
        page_sql,
        values: builder.values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::MarkerFilters;

    #[test]
    fn test_derive_letter_from_lemma() {
        assert_eq!(derive_letter(None, "casa"), "c");
        assert_eq!(derive_letter(None, "Árbol"), "a");
        assert_eq!(derive_letter(None, "Émbolo"), "e");
        assert_eq!(derive_letter(None, "ñandú"), "ñ");
        assert_eq!(derive_letter(None, ""), "a");
    }

    #[test]
    fn test_derive_letter_explicit_wins() {
        assert_eq!(derive_letter(Some("Z"), "casa"), "z");
        assert_eq!(derive_letter(Some("Úl"), "casa"), "u");
        // Blank explicit falls back to the lemma
        assert_eq!(derive_letter(Some("  "), "casa"), "c");
    }

    #[test]
    fn test_none_if_blank() {
        assert_eq!(none_if_blank(Some("  ".into())), None);
        assert_eq!(none_if_blank(Some("".into())), None);
        assert_eq!(none_if_blank(None), None);
        assert_eq!(none_if_blank(Some(" x ".into())), Some("x".into()));
    }

    #[test]
    fn test_legacy_source_maps_to_publication() {
        let example = normalize_example(ExampleInput {
            quotation: "q".into(),
            source: Some("X".into()),
            ..Default::default()
        });
        assert_eq!(example.publication, Some("X".into()));
        assert_eq!(example.source, None);
    }

    #[test]
    fn test_explicit_publication_beats_source() {
        let example = normalize_example(ExampleInput {
            quotation: "q".into(),
            publication: Some("P".into()),
            source: Some("X".into()),
            ..Default::default()
        });
        assert_eq!(example.publication, Some("P".into()));
    }

    #[test]
    fn test_blank_example_fields_become_null() {
        let example = normalize_example(ExampleInput {
            quotation: "q".into(),
            author: Some("  ".into()),
            city: Some("Quito".into()),
            ..Default::default()
        });
        assert_eq!(example.author, None);
        assert_eq!(example.city, Some("Quito".into()));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_public_search_forces_published() {
        let criteria = SearchCriteria {
            query: "casa".into(),
            ..Default::default()
        };
        let stmt = build_search_sql(&criteria, SearchMode::Public, 1);
        assert!(stmt.count_sql.contains("w.status = $1"));
        assert_eq!(stmt.values[0], Value::from("published"));
    }

    #[test]
    fn test_editor_search_without_status_has_no_status_guard() {
        let criteria = SearchCriteria {
            query: "casa".into(),
            ..Default::default()
        };
        let stmt = build_search_sql(&criteria, SearchMode::Editor, 1);
        assert!(!stmt.count_sql.contains("w.status"));
    }

    #[test]
    fn test_editor_status_filter() {
        let criteria = SearchCriteria {
            status: Some(WordStatus::Redacted),
            ..Default::default()
        };
        let stmt = build_search_sql(&criteria, SearchMode::Editor, 1);
        assert!(stmt.count_sql.contains("w.status = $1"));
        assert_eq!(stmt.values[0], Value::from("redacted"));
    }

    #[test]
    fn test_query_matches_lemma_and_meaning() {
        let criteria = SearchCriteria {
            query: "casa".into(),
            ..Default::default()
        };
        let stmt = build_search_sql(&criteria, SearchMode::Editor, 1);
        assert!(stmt.count_sql.contains("w.lemma ILIKE $1"));
        assert!(stmt.count_sql.contains("m.meaning ILIKE $1"));
        assert_eq!(stmt.values[0], Value::from("%casa%"));
    }

    #[test]
    fn test_marker_filters_become_exists_subqueries() {
        let criteria = SearchCriteria {
            markers: MarkerFilters {
                geography: vec!["andino".into()],
                ..Default::default()
            },
            ..Default::default()
        };
        let stmt = build_search_sql(&criteria, SearchMode::Editor, 1);
        assert!(stmt
            .count_sql
            .contains("EXISTS (SELECT 1 FROM meanings m WHERE m.word_id = w.id AND m.geography IN ($1))"));
    }

    #[test]
    fn test_in_list_expands_one_placeholder_per_value() {
        let criteria = SearchCriteria {
            letters: vec!["a".into(), "b".into(), "c".into()],
            ..Default::default()
        };
        let stmt = build_search_sql(&criteria, SearchMode::Editor, 1);
        assert!(stmt.count_sql.contains("w.letter IN ($1, $2, $3)"));
        assert_eq!(stmt.values.len(), 3);
    }

    #[test]
    fn test_ranking_bands_present_with_query() {
        let criteria = SearchCriteria {
            query: "casa".into(),
            ..Default::default()
        };
        let stmt = build_search_sql(&criteria, SearchMode::Editor, 1);
        assert!(stmt.page_sql.contains("CASE WHEN lower(w.lemma) ="));
        // limit/offset are the two placeholders past the bound values
        assert!(stmt.page_sql.contains(&format!("${}", stmt.values.len() + 1)));
        assert!(stmt.page_sql.contains(&format!("${}", stmt.values.len() + 2)));
    }

    #[test]
    fn test_count_binds_only_where_parameters() {
        let criteria = SearchCriteria {
            query: "casa".into(),
            letters: vec!["c".into()],
            ..Default::default()
        };
        let stmt = build_search_sql(&criteria, SearchMode::Public, 1);
        // The two ranking parameters exist only for the page query
        assert_eq!(stmt.values.len(), stmt.count_values.len() + 2);
        for index in 1..=stmt.count_values.len() {
            assert!(stmt.count_sql.contains(&format!("${}", index)));
        }
    }

    #[test]
    fn test_no_query_orders_alphabetically() {
        let criteria = SearchCriteria {
            letters: vec!["a".into()],
            ..Default::default()
        };
        let stmt = build_search_sql(&criteria, SearchMode::Editor, 1);
        assert!(stmt.page_sql.contains("ORDER BY w.lemma ASC"));
        assert!(!stmt.page_sql.contains("CASE WHEN"));
    }
}
