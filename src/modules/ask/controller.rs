use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde_json::Value;
use std::time::Instant;

use crate::error::AppError;
use crate::modules::ask::{
    prompt::format_conversation,
    schema::{is_ping, AskRequest, AskResponse},
};
use crate::modules::session::{
    cookie,
    model::{new_session_id, SessionTurn},
};
use crate::AppState;

pub async fn ask(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload?;

    // Liveness check: only `question` is looked at, the rest of the body may be anything.
    if is_ping(&body) {
        return Ok(Json(AskResponse::pong()).into_response());
    }

    let payload: AskRequest = serde_json::from_value(body)?;

    let session_id = match cookie::session_id(&jar) {
        Some(id) => id,
        None => {
            let id = new_session_id();
            tracing::info!(session_id = %id, "new session");
            id
        }
    };

    let transcript = format_conversation(&payload.question, payload.history());
    tracing::debug!(
        session_id = %session_id,
        history_turns = payload.history().len(),
        transcript_len = transcript.len(),
        "formatted conversation"
    );

    let started = Instant::now();
    let raw = state.models.chat.generate(&transcript).await?;
    let chat_ms = started.elapsed().as_millis() as u64;

    let started = Instant::now();
    let answer = state.models.paraphraser.paraphrase(&raw).await?;
    let paraphrase_ms = started.elapsed().as_millis() as u64;

    let stored = state
        .sessions
        .append(
            &session_id,
            vec![SessionTurn::user(payload.question), SessionTurn::bot(answer.clone())],
        )
        .await?;

    tracing::info!(
        session_id = %session_id,
        chat_model = state.models.chat.name(),
        paraphraser = state.models.paraphraser.name(),
        chat_ms,
        paraphrase_ms,
        stored_turns = stored,
        "answered question"
    );

    let jar = cookie::with_session(jar, &session_id);
    Ok((jar, Json(AskResponse { answer })).into_response())
}
