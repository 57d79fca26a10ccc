use crate::modules::ask::schema::ConversationTurn;

/// Renders history as `Role: content` lines. Without history the bare question is the transcript.
///
/// When history is present the question itself is not added; callers that want it in the
/// prompt send it as the last history entry.
pub fn format_conversation(question: &str, history: &[ConversationTurn]) -> String {
    if history.is_empty() {
        return question.to_string();
    }

    history
        .iter()
        .map(|turn| format!("{}: {}\n", capitalize(&turn.role), turn.content))
        .collect()
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
