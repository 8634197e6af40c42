//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP backend adapter, the concrete implementation
//! of the `AuthApi`, `SourceApi`, `GenerationApi` and `ChatApi` ports. It owns
//! every wire-format concern: request shapes, the tolerant decoding of the
//! backend's heterogeneous response envelopes, and the mapping of HTTP
//! statuses onto `PortError`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use study_assistant_core::domain::{
    ChatMessage, ChatRole, ChatSession, Credential, Difficulty, Flashcard, FlashcardSet,
    Generated, QuizQuestion, QuizSet, Source, SourceKind, UserProfile,
};
use study_assistant_core::ports::{
    AuthApi, ChatApi, GenerationApi, PortError, PortResult, SourceApi,
};
use study_assistant_core::quiz::normalize_answer;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An HTTP adapter speaking the study-assistant backend's REST surface.
#[derive(Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a new `HttpBackend` for the given base URL (no trailing slash).
    pub fn new(base_url: &str, timeout: Duration) -> PortResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport(e: reqwest::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// Maps a non-2xx response onto the error taxonomy: 401 is fatal session
/// expiry, 413 (or a server message mentioning an oversize payload) gets its
/// own variant, everything else carries the status and server message.
async fn check(response: reqwest::Response) -> PortResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(PortError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "Request failed".to_string()
            } else {
                body.trim().to_string()
            }
        });

    if status == StatusCode::PAYLOAD_TOO_LARGE || message.to_lowercase().contains("too large") {
        return Err(PortError::PayloadTooLarge(message));
    }
    Err(PortError::Http {
        status: status.as_u16(),
        message,
    })
}

//=========================================================================================
// "Impure" Wire Payload Structs
//=========================================================================================

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct AuthPayload {
    token: String,
    id: i64,
    username: String,
    email: Option<String>,
}

impl AuthPayload {
    fn to_domain(self) -> Credential {
        Credential {
            token: self.token,
            user: UserProfile {
                id: self.id,
                username: self.username,
                email: self.email.unwrap_or_default(),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SourcePayload {
    id: i64,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    content: Option<String>,
    created_at: Option<String>,
}

impl SourcePayload {
    fn to_domain(self) -> Source {
        Source {
            id: self.id.to_string(),
            name: self.name.unwrap_or_else(|| "Untitled".to_string()),
            kind: self
                .kind
                .as_deref()
                .and_then(SourceKind::parse)
                .unwrap_or(SourceKind::Text),
            content: self.content.unwrap_or_default(),
            created_at: parse_timestamp(self.created_at.as_deref()),
        }
    }
}

#[derive(Deserialize)]
struct SlideSectionPayload {
    content: Option<String>,
}

/// The upload endpoint answers either a persisted source object or a raw
/// extraction document; both are accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum UploadPayload {
    Source(SourcePayload),
    Slides { sections: Vec<SlideSectionPayload> },
}

#[derive(Deserialize)]
struct FlashcardPayload {
    question: String,
    answer: String,
}

impl FlashcardPayload {
    fn to_domain(self) -> Flashcard {
        Flashcard {
            question: self.question,
            answer: self.answer,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizQuestionPayload {
    question: String,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: Option<Value>,
    explanation: Option<String>,
}

impl QuizQuestionPayload {
    fn to_domain(self) -> QuizQuestion {
        let correct = normalize_answer_value(self.correct_answer.as_ref(), self.options.len());
        QuizQuestion {
            question: self.question,
            options: self.options,
            correct_answer: correct,
            explanation: self.explanation,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlashcardSetPayload {
    id: i64,
    title: Option<String>,
    #[serde(default)]
    flashcards: Vec<FlashcardPayload>,
    created_at: Option<String>,
}

impl FlashcardSetPayload {
    fn to_domain(self) -> FlashcardSet {
        FlashcardSet {
            id: self.id,
            title: self.title.unwrap_or_else(|| "Untitled set".to_string()),
            flashcards: self.flashcards.into_iter().map(|f| f.to_domain()).collect(),
            created_at: parse_timestamp(self.created_at.as_deref()),
        }
    }
}

/// History quiz rows spread the options over `optionA..optionD` and code the
/// correct answer as a letter; both are folded back into the canonical shape
/// here, at the boundary.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizHistoryQuestionPayload {
    question: String,
    option_a: Option<String>,
    option_b: Option<String>,
    option_c: Option<String>,
    option_d: Option<String>,
    correct_answer: Option<String>,
    explanation: Option<String>,
}

impl QuizHistoryQuestionPayload {
    fn to_domain(self) -> QuizQuestion {
        let options: Vec<String> = [self.option_a, self.option_b, self.option_c, self.option_d]
            .into_iter()
            .flatten()
            .collect();
        let correct = self
            .correct_answer
            .as_deref()
            .and_then(|raw| normalize_answer(raw, options.len()));
        QuizQuestion {
            question: self.question,
            options,
            correct_answer: correct,
            explanation: self.explanation,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizSetPayload {
    id: i64,
    title: Option<String>,
    difficulty: Option<String>,
    #[serde(default)]
    questions: Vec<QuizHistoryQuestionPayload>,
    created_at: Option<String>,
}

impl QuizSetPayload {
    fn to_domain(self) -> QuizSet {
        QuizSet {
            id: self.id,
            title: self.title.unwrap_or_else(|| "Untitled quiz".to_string()),
            questions: self.questions.into_iter().map(|q| q.to_domain()).collect(),
            difficulty: self
                .difficulty
                .as_deref()
                .and_then(Difficulty::parse)
                .unwrap_or(Difficulty::Medium),
            created_at: parse_timestamp(self.created_at.as_deref()),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatSessionPayload {
    id: i64,
    user_id: i64,
    created_at: Option<String>,
}

impl ChatSessionPayload {
    fn to_domain(self) -> ChatSession {
        ChatSession {
            id: self.id,
            user_id: self.user_id,
            created_at: parse_timestamp(self.created_at.as_deref()),
        }
    }
}

#[derive(Deserialize)]
struct ChatMessagePayload {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ConversationPayload {
    response: String,
}

//=========================================================================================
// Decode Helpers
//=========================================================================================

/// Parses the backend's timestamps, which arrive either RFC 3339 or as a bare
/// `LocalDateTime`. Missing or unparseable values fall back to now.
fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    let Some(raw) = raw else {
        return Utc::now();
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_utc();
    }
    Utc::now()
}

/// Accepts a generation answer code as either a JSON number (already an
/// index) or a string (index digits or a letter). Out-of-range or
/// unrecognized codes normalize to `None`.
fn normalize_answer_value(value: Option<&Value>, option_count: usize) -> Option<usize> {
    match value? {
        Value::Number(n) => {
            let idx = usize::try_from(n.as_i64()?).ok()?;
            (idx < option_count).then_some(idx)
        }
        Value::String(s) => normalize_answer(s, option_count),
        _ => None,
    }
}

/// Decodes a generation response, tolerating the three shapes the backend has
/// shipped: a bare array, `{<key>: [...]}` for any of `keys`, or `{data:
/// [...]}`. Anything else is an invalid-format error, never a silent empty
/// result.
fn decode_generated<T: DeserializeOwned>(
    value: Value,
    keys: &[&str],
) -> PortResult<Generated<T>> {
    let warning = value
        .get("warning")
        .and_then(Value::as_str)
        .filter(|w| !w.is_empty())
        .map(str::to_string);

    let items_value = if value.is_array() {
        value
    } else {
        let mut found = None;
        for key in keys.iter().chain(&["data"]) {
            if let Some(v) = value.get(*key) {
                if v.is_array() {
                    found = Some(v.clone());
                    break;
                }
            }
        }
        found.ok_or_else(|| {
            PortError::InvalidFormat(format!(
                "expected an array or one of {:?} in the response",
                keys
            ))
        })?
    };

    let items: Vec<T> = serde_json::from_value(items_value)
        .map_err(|e| PortError::InvalidFormat(e.to_string()))?;
    Ok(Generated { items, warning })
}

//=========================================================================================
// `AuthApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthApi for HttpBackend {
    async fn login(&self, username: &str, password: &str) -> PortResult<Credential> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(transport)?;
        let payload: AuthPayload = check(response).await?.json().await.map_err(transport)?;
        Ok(payload.to_domain())
    }

    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> PortResult<Credential> {
        let response = self
            .http
            .post(self.url("/api/auth/register"))
            .json(&json!({ "username": username, "email": email, "password": password }))
            .send()
            .await
            .map_err(transport)?;
        let payload: AuthPayload = check(response).await?.json().await.map_err(transport)?;
        Ok(payload.to_domain())
    }
}

//=========================================================================================
// `SourceApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl SourceApi for HttpBackend {
    async fn upload_document(
        &self,
        token: &str,
        user_id: i64,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> PortResult<Source> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.url("/api/slides/upload"))
            .query(&[("userId", user_id)])
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        let payload: UploadPayload = check(response).await?.json().await.map_err(transport)?;

        match payload {
            UploadPayload::Source(source) => Ok(source.to_domain()),
            UploadPayload::Slides { sections } => {
                // Raw extraction output: wrap it in a client-side source.
                let content = sections
                    .into_iter()
                    .filter_map(|s| s.content)
                    .collect::<Vec<_>>()
                    .join("\n\n");
                let kind = match file_name.rsplit('.').next() {
                    Some(ext) if ext.eq_ignore_ascii_case("pdf") => SourceKind::Pdf,
                    _ => SourceKind::Ppt,
                };
                Ok(Source {
                    id: Uuid::new_v4().to_string(),
                    name: file_name.to_string(),
                    kind,
                    content,
                    created_at: Utc::now(),
                })
            }
        }
    }

    async fn create_text_source(
        &self,
        token: &str,
        user_id: i64,
        content: &str,
    ) -> PortResult<Source> {
        let response = self
            .http
            .post(self.url("/api/sources"))
            .bearer_auth(token)
            .json(&json!({
                "userId": user_id,
                "name": "Text Source",
                "type": "text",
                "content": content,
            }))
            .send()
            .await
            .map_err(transport)?;
        let payload: SourcePayload = check(response).await?.json().await.map_err(transport)?;
        Ok(payload.to_domain())
    }

    async fn list_sources(&self, token: &str, user_id: i64) -> PortResult<Vec<Source>> {
        let response = self
            .http
            .get(self.url(&format!("/api/sources/user/{}", user_id)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        let payload: Vec<SourcePayload> = check(response).await?.json().await.map_err(transport)?;
        Ok(payload.into_iter().map(|s| s.to_domain()).collect())
    }

    async fn delete_source(&self, token: &str, id: &str) -> PortResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("/api/sources/{}", id)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;
        Ok(())
    }
}

//=========================================================================================
// `GenerationApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl GenerationApi for HttpBackend {
    async fn generate_flashcards(
        &self,
        token: &str,
        study_material: &str,
        count: u32,
        user_id: i64,
        title: &str,
    ) -> PortResult<Generated<Flashcard>> {
        let response = self
            .http
            .post(self.url("/api/flashcards/generate"))
            .bearer_auth(token)
            .json(&json!({
                "studyMaterial": study_material,
                "count": count,
                "userId": user_id,
                "title": title,
            }))
            .send()
            .await
            .map_err(transport)?;
        let value: Value = check(response).await?.json().await.map_err(transport)?;
        let generated = decode_generated::<FlashcardPayload>(value, &["flashcards"])?;
        Ok(Generated {
            items: generated.items.into_iter().map(|f| f.to_domain()).collect(),
            warning: generated.warning,
        })
    }

    async fn generate_quiz(
        &self,
        token: &str,
        study_material: &str,
        count: u32,
        difficulty: Difficulty,
        user_id: i64,
        title: &str,
    ) -> PortResult<Generated<QuizQuestion>> {
        let response = self
            .http
            .post(self.url("/api/quiz/generate"))
            .bearer_auth(token)
            .json(&json!({
                "studyMaterial": study_material,
                "count": count,
                "difficulty": difficulty.as_str(),
                "userId": user_id,
                "title": title,
            }))
            .send()
            .await
            .map_err(transport)?;
        let value: Value = check(response).await?.json().await.map_err(transport)?;
        let generated = decode_generated::<QuizQuestionPayload>(value, &["questions"])?;
        Ok(Generated {
            items: generated.items.into_iter().map(|q| q.to_domain()).collect(),
            warning: generated.warning,
        })
    }

    async fn flashcard_history(&self, token: &str) -> PortResult<Vec<FlashcardSet>> {
        let response = self
            .http
            .get(self.url("/api/flashcards/history"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        let payload: Vec<FlashcardSetPayload> =
            check(response).await?.json().await.map_err(transport)?;
        Ok(payload.into_iter().map(|s| s.to_domain()).collect())
    }

    async fn quiz_history(&self, token: &str) -> PortResult<Vec<QuizSet>> {
        let response = self
            .http
            .get(self.url("/api/quiz/history"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        let payload: Vec<QuizSetPayload> =
            check(response).await?.json().await.map_err(transport)?;
        Ok(payload.into_iter().map(|s| s.to_domain()).collect())
    }

    async fn delete_flashcard_set(&self, token: &str, id: i64) -> PortResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("/api/flashcards/{}", id)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;
        Ok(())
    }

    async fn delete_quiz_set(&self, token: &str, id: i64) -> PortResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("/api/quiz/{}", id)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;
        Ok(())
    }
}

//=========================================================================================
// `ChatApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatApi for HttpBackend {
    async fn list_sessions(&self, token: &str, user_id: i64) -> PortResult<Vec<ChatSession>> {
        let response = self
            .http
            .get(self.url(&format!("/api/chat/history/sessions/{}", user_id)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        let payload: Vec<ChatSessionPayload> =
            check(response).await?.json().await.map_err(transport)?;
        let mut sessions: Vec<ChatSession> =
            payload.into_iter().map(|s| s.to_domain()).collect();
        // Most recently created first, per the port contract.
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn create_session(&self, token: &str, user_id: i64) -> PortResult<ChatSession> {
        let response = self
            .http
            .post(self.url("/api/chat/history/session"))
            .query(&[("userId", user_id)])
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        let payload: ChatSessionPayload =
            check(response).await?.json().await.map_err(transport)?;
        Ok(payload.to_domain())
    }

    async fn delete_session(&self, token: &str, session_id: i64) -> PortResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("/api/chat/history/session/{}", session_id)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;
        Ok(())
    }

    async fn list_messages(&self, token: &str, session_id: i64) -> PortResult<Vec<ChatMessage>> {
        let response = self
            .http
            .get(self.url(&format!("/api/chat/history/messages/{}", session_id)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        let payload: Vec<ChatMessagePayload> =
            check(response).await?.json().await.map_err(transport)?;
        Ok(payload
            .into_iter()
            .filter_map(|m| match ChatRole::parse(&m.role) {
                Some(role) => Some(ChatMessage {
                    role,
                    content: m.content,
                }),
                None => {
                    warn!("Dropping chat message with unknown role '{}'", m.role);
                    None
                }
            })
            .collect())
    }

    async fn save_message(
        &self,
        token: &str,
        session_id: i64,
        role: ChatRole,
        content: &str,
    ) -> PortResult<()> {
        let response = self
            .http
            .post(self.url("/api/chat/history/message"))
            .query(&[
                ("sessionId", session_id.to_string()),
                ("role", role.as_str().to_string()),
                ("content", content.to_string()),
            ])
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;
        Ok(())
    }

    async fn complete(&self, token: &str, session_id: i64, message: &str) -> PortResult<String> {
        let response = self
            .http
            .post(self.url("/api/chat/conversation"))
            .bearer_auth(token)
            .json(&json!({ "sessionId": session_id, "message": message }))
            .send()
            .await
            .map_err(transport)?;
        let payload: ConversationPayload =
            check(response).await?.json().await.map_err(transport)?;
        Ok(payload.response)
    }
}
