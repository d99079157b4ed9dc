//! Prompt construction for the two generation chains.
//!
//! Each chain sends a system message (instructions, schema, conversation
//! history) followed by a user message carrying the question.

use crate::conversation::ConversationTurn;
use crate::llm::types::Message;

/// Sentence the SQL chain must answer with for unrelated questions.
pub const SQL_REFUSAL: &str =
    "You question is not related to the database. Please ask a related question to the database";

/// Sentence the answer chain must answer with when the SQL does not match the schema.
pub const ANSWER_SENTINEL: &str = "No results found. The SQL query is not from the table schema. Please ask a related question to the table schema";

const SQL_SYSTEM_TEMPLATE: &str = r#"You are a data analyst at a company. You are interacting with a user who is asking you questions about the company's database.
Based on the table schema below, write a SQL query that would answer the user's question. Take the conversation history into account.
If the user's question is not related to the table schema, just write "{refusal}".

<SCHEMA>{schema}</SCHEMA>

Conversation History: {history}

Write only the SQL query and nothing else. Do not wrap the SQL query in any other text, not even backticks.

For example:
Question: which 3 artists have the most tracks?
SQL Query: SELECT ArtistId, COUNT(*) as track_count FROM Track GROUP BY ArtistId ORDER BY track_count DESC LIMIT 3;
Question: Name 10 artists
SQL Query: SELECT Name FROM Artist LIMIT 10;

Your turn:"#;

const ANSWER_SYSTEM_TEMPLATE: &str = r#"You are a data analyst at a company. You are interacting with a user who is asking you questions about the company's database.
Based on the table schema below, question, sql query, and sql response, write a natural language response.
Double check on the sql query. Make sure the sql query is only from the available table schema.
If the sql query is not from the table schema, just write "{sentinel}".

<SCHEMA>{schema}</SCHEMA>

Conversation History: {history}"#;

/// Fills `{name}` placeholders in one pass, so substituted text is never
/// scanned again. Unknown placeholders are left as written.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let value = after.find('}').and_then(|end| {
            values
                .iter()
                .find(|(name, _)| *name == &after[..end])
                .map(|(_, value)| (end, *value))
        });

        match value {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Serializes conversation turns as `Role: content` lines.
pub fn format_history(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the messages for the question-to-SQL chain.
pub fn build_sql_messages(
    question: &str,
    history: &[ConversationTurn],
    schema: &str,
) -> Vec<Message> {
    let system = render(
        SQL_SYSTEM_TEMPLATE,
        &[
            ("refusal", SQL_REFUSAL),
            ("schema", schema),
            ("history", &format_history(history)),
        ],
    );

    vec![
        Message::system(system),
        Message::user(format!("Question: {question}\nSQL Query:")),
    ]
}

/// Builds the messages for the result-to-answer chain.
pub fn build_answer_messages(
    question: &str,
    history: &[ConversationTurn],
    schema: &str,
    sql: &str,
    sql_response: &str,
) -> Vec<Message> {
    let system = render(
        ANSWER_SYSTEM_TEMPLATE,
        &[
            ("sentinel", ANSWER_SENTINEL),
            ("schema", schema),
            ("history", &format_history(history)),
        ],
    );

    vec![
        Message::system(system),
        Message::user(format!(
            "SQL Query: <SQL>{sql}</SQL>\nUser question: {question}\nSQL Response: {sql_response}"
        )),
    ]
}
