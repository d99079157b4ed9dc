//! Response parsing for LLM outputs.
//!
//! Turns the raw text of each chain into a structured result. The fixed
//! sentences the prompts ask for become enum variants here, so nothing past
//! this point compares against free text.

use lazy_static::lazy_static;
use regex::Regex;

use crate::llm::prompt::{ANSWER_SENTINEL, SQL_REFUSAL};

lazy_static! {
    static ref SQL_LABEL: Regex = Regex::new(r"(?i)^\s*SQL\s*Query\s*:\s*").unwrap();
    static ref CODE_BLOCK: Regex = Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)```").unwrap();
}

/// Output of the question-to-SQL chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlGeneration {
    /// A single SQL statement to execute.
    Sql(String),
    /// The model declared the question unrelated to the database.
    OutOfScope,
}

/// Output of the result-to-answer chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerGeneration {
    /// Natural-language answer for the user.
    Answer(String),
    /// The model judged the SQL not to match the schema.
    OutOfScope,
}

/// Classifies the SQL chain's output.
pub fn parse_sql_response(response: &str) -> SqlGeneration {
    if contains_sentence(response, SQL_REFUSAL) {
        return SqlGeneration::OutOfScope;
    }

    let sql = clean_sql(response);
    if sql.is_empty() {
        SqlGeneration::OutOfScope
    } else {
        SqlGeneration::Sql(sql)
    }
}

/// Classifies the answer chain's output.
pub fn parse_answer_response(response: &str) -> AnswerGeneration {
    if contains_sentence(response, ANSWER_SENTINEL) {
        AnswerGeneration::OutOfScope
    } else {
        AnswerGeneration::Answer(response.trim().to_string())
    }
}

/// Strips markdown fences and a leading `SQL Query:` label.
///
/// The prompt asks for bare SQL, but models still wrap it now and then.
pub fn clean_sql(response: &str) -> String {
    let text = extract_code_block(response).unwrap_or_else(|| response.trim().to_string());
    let text = SQL_LABEL.replace(&text, "");

    text.trim().trim_matches('`').trim().to_string()
}

/// Returns the body of the first fenced code block, if any.
fn extract_code_block(text: &str) -> Option<String> {
    CODE_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Matches a fixed sentence while tolerating quotes, case and a trailing period.
fn contains_sentence(response: &str, sentence: &str) -> bool {
    let normalize = |s: &str| {
        s.trim()
            .trim_matches(|c| c == '"' || c == '\'' || c == '.')
            .to_lowercase()
    };
    normalize(response).contains(&normalize(sentence))
}
