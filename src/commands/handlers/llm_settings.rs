//! LLM settings command handlers (/model, /models).

use crate::commands::output::CommandOutput;
use crate::llm::ModelSelector;
use crate::session::Session;

/// Handle /model without arguments.
pub fn handle_model_show(session: &Session) -> CommandOutput {
    CommandOutput::info(format!(
        "Current model: {}. Use /model <name> to change.",
        session.model()
    ))
}

/// Handle /model <name>.
pub fn handle_model_set(session: &mut Session, name: &str) -> CommandOutput {
    match session.set_model(name) {
        Ok(()) => CommandOutput::info(format!("LLM model set to '{}'.", session.model())),
        Err(e) => CommandOutput::error(e.to_string()),
    }
}

/// Handle /models.
pub fn handle_models(session: &Session) -> CommandOutput {
    let current = session.model().model();
    let lines = ModelSelector::AVAILABLE
        .iter()
        .map(|name| {
            let marker = if *name == current { "*" } else { " " };
            format!(" {marker} {}", ModelSelector::resolve(name))
        })
        .collect::<Vec<_>>()
        .join("\n");

    CommandOutput::info(format!("Available models:\n{lines}"))
}
