//! Tokenizer for command argument parsing.
//!
//! Splits command arguments on whitespace, honouring:
//! - Quoted strings (single and double quotes)
//! - Escape sequences within quotes
//! - Key=value pairs, including quoted values

use std::iter::Peekable;
use std::str::Chars;

/// A token parsed from command input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A plain word (unquoted argument).
    Word(String),
    /// A key=value pair.
    KeyValue { key: String, value: String },
}

impl Token {
    /// Returns the token as a word if it is one.
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Token::Word(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the key-value pair if this is a KeyValue token.
    pub fn as_key_value(&self) -> Option<(&str, &str)> {
        match self {
            Token::KeyValue { key, value } => Some((key, value)),
            _ => None,
        }
    }
}

/// Tokenizes a command argument string.
///
/// - `host=localhost` → `KeyValue { key: "host", value: "localhost" }`
/// - `password="my secret"` → `KeyValue { key: "password", value: "my secret" }`
/// - `"hello world"` → `Word("hello world")`
///
/// Only the first `=` splits a pair, so values may contain `=`. An opening
/// quote without a closing one runs to the end of the input.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let (text, key) = collect_token(&mut chars);
        match key {
            Some(key) => tokens.push(Token::KeyValue { key, value: text }),
            None => tokens.push(Token::Word(text)),
        }
    }

    tokens
}

/// Collects one whitespace-delimited token.
///
/// Returns the token text and, when an unquoted `=` was seen, the key before it.
fn collect_token(chars: &mut Peekable<Chars<'_>>) -> (String, Option<String>) {
    let mut text = String::new();
    let mut key = None;

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            break;
        }
        chars.next();

        match c {
            '"' | '\'' => text.push_str(&collect_quoted(chars, c)),
            '=' if key.is_none() => key = Some(std::mem::take(&mut text)),
            _ => text.push(c),
        }
    }

    (text, key)
}

/// Collects characters inside quotes, handling escape sequences.
fn collect_quoted(chars: &mut Peekable<Chars<'_>>, quote: char) -> String {
    let mut result = String::new();
    let mut escaped = false;

    for c in chars.by_ref() {
        if escaped {
            match c {
                'n' => result.push('\n'),
                't' => result.push('\t'),
                '\\' | '"' | '\'' => result.push(c),
                _ => {
                    // Unknown escape, keep as-is
                    result.push('\\');
                    result.push(c);
                }
            }
            escaped = false;
            continue;
        }

        if c == '\\' {
            escaped = true;
        } else if c == quote {
            break;
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kv(key: &str, value: &str) -> Token {
        Token::KeyValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_simple_words() {
        assert_eq!(
            tokenize("gpt-4-turbo  extra"),
            vec![
                Token::Word("gpt-4-turbo".to_string()),
                Token::Word("extra".to_string())
            ]
        );
    }

    #[test]
    fn test_key_value_unquoted() {
        assert_eq!(
            tokenize("host=localhost port=3306"),
            vec![kv("host", "localhost"), kv("port", "3306")]
        );
    }

    #[test]
    fn test_password_with_spaces() {
        assert_eq!(
            tokenize("password=\"my secret password\" user=root"),
            vec![kv("password", "my secret password"), kv("user", "root")]
        );
    }

    #[test]
    fn test_single_quoted_value() {
        assert_eq!(tokenize("database='my db'"), vec![kv("database", "my db")]);
    }

    #[test]
    fn test_value_containing_equals() {
        assert_eq!(
            tokenize("password=\"p@ss=word!\" path=a=b"),
            vec![kv("password", "p@ss=word!"), kv("path", "a=b")]
        );
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(
            tokenize(r#"password="say \"hi\"""#),
            vec![kv("password", "say \"hi\"")]
        );
    }

    #[test]
    fn test_empty_value() {
        assert_eq!(tokenize("password="), vec![kv("password", "")]);
    }

    #[test]
    fn test_quoted_word_standalone() {
        assert_eq!(
            tokenize("\"hello world\""),
            vec![Token::Word("hello world".to_string())]
        );
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(tokenize("password=\"abc def"), vec![kv("password", "abc def")]);
    }

    #[test]
    fn test_token_accessors() {
        let word = Token::Word("test".to_string());
        assert_eq!(word.as_word(), Some("test"));
        assert_eq!(word.as_key_value(), None);

        let pair = kv("host", "localhost");
        assert_eq!(pair.as_key_value(), Some(("host", "localhost")));
        assert_eq!(pair.as_word(), None);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("   ").is_empty());
    }
}
