//! The two generation chains.
//!
//! Each chain fills its template, makes one completion call and classifies
//! the reply. Provider errors propagate unchanged.

use std::time::Instant;

use tracing::{debug, info};

use crate::conversation::ConversationTurn;
use crate::error::Result;
use crate::llm::parser::{parse_answer_response, parse_sql_response};
use crate::llm::prompt::{build_answer_messages, build_sql_messages};
use crate::llm::{AnswerGeneration, LlmClient, SqlGeneration};

/// Generates one SQL statement for `question`.
pub async fn generate_sql(
    llm: &dyn LlmClient,
    question: &str,
    history: &[ConversationTurn],
    schema: &str,
) -> Result<SqlGeneration> {
    let messages = build_sql_messages(question, history, schema);

    let start = Instant::now();
    let response = llm.complete(&messages).await?;
    debug!("SQL chain raw response: {response}");

    let generation = parse_sql_response(&response);
    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        out_of_scope = matches!(generation, SqlGeneration::OutOfScope),
        "SQL chain completed"
    );

    Ok(generation)
}

/// Turns the executed SQL and its serialized result into an answer.
pub async fn generate_answer(
    llm: &dyn LlmClient,
    question: &str,
    history: &[ConversationTurn],
    schema: &str,
    sql: &str,
    sql_response: &str,
) -> Result<AnswerGeneration> {
    let messages = build_answer_messages(question, history, schema, sql, sql_response);

    let start = Instant::now();
    let response = llm.complete(&messages).await?;

    let generation = parse_answer_response(&response);
    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        out_of_scope = matches!(generation, AnswerGeneration::OutOfScope),
        "Answer chain completed"
    );

    Ok(generation)
}
