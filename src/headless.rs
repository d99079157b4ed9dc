//! Headless front end for scripting and testing.
//!
//! Reads one input per line and writes the rendered transcript: the greeting,
//! then `Human:`/`AI:` turns for questions and plain text for command output.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::commands::{submit, CommandOutput};
use crate::error::{Result, SqlChatError};
use crate::session::Session;

/// Runs the session over `input` until end of input or `/quit`.
///
/// `startup` is written after the greeting, e.g. the result of a `--connect`.
pub async fn run<R, W>(
    session: &mut Session,
    startup: Option<CommandOutput>,
    input: R,
    output: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if let Some(greeting) = session.conversation().last() {
        write_line(output, &greeting.to_string()).await?;
    }
    if let Some(startup) = startup {
        write_output(session, startup, output).await?;
    }

    let mut lines = input.lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| SqlChatError::internal(format!("Failed to read input: {e}")))?
    {
        debug!("Headless input: {line}");

        let result = submit(session, &line).await;
        if result.is_exit() {
            break;
        }
        write_output(session, result, output).await?;
    }

    output
        .flush()
        .await
        .map_err(|e| SqlChatError::internal(format!("Failed to flush output: {e}")))
}

async fn write_output<W: AsyncWrite + Unpin>(
    session: &Session,
    result: CommandOutput,
    output: &mut W,
) -> Result<()> {
    match result {
        CommandOutput::Asked(_) => {
            // The question and its reply are the last two turns
            let turns = session.conversation().as_context();
            for turn in &turns[turns.len().saturating_sub(2)..] {
                write_line(output, &turn.to_string()).await?;
            }
            Ok(())
        }
        CommandOutput::Info(msg) => write_line(output, &msg).await,
        CommandOutput::Error(msg) => write_line(output, &format!("Error: {msg}")).await,
        CommandOutput::None | CommandOutput::Exit => Ok(()),
    }
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output
        .write_all(format!("{text}\n").as_bytes())
        .await
        .map_err(|e| SqlChatError::internal(format!("Failed to write output: {e}")))
}
