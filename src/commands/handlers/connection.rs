//! Connection command handler (/connect).

use crate::commands::output::CommandOutput;
use crate::commands::router::ConnectArgs;
use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::session::Session;

/// Handle /connect command.
///
/// Starts from the current form (or the given connection string), applies the
/// `key=value` overrides and connects. Missing keys keep their form values.
pub async fn handle_connect(session: &mut Session, args: ConnectArgs) -> CommandOutput {
    let config = match build_config(session.form(), &args) {
        Ok(config) => config,
        Err(e) => return CommandOutput::error(e.to_string()),
    };

    match session.connect_to(config).await {
        Ok(()) => {
            let info = session
                .connection_config()
                .map(ConnectionConfig::display_string)
                .unwrap_or_default();
            CommandOutput::info(format!("Connected to database! {info}"))
        }
        Err(e) => CommandOutput::error(format!("Failed to connect to database: {e}")),
    }
}

fn build_config(form: &ConnectionConfig, args: &ConnectArgs) -> Result<ConnectionConfig> {
    let mut config = match &args.url {
        Some(url) => ConnectionConfig::from_connection_string(url)?,
        None => form.clone(),
    };

    for (key, value) in &args.fields {
        config.set_field(key, value)?;
    }

    Ok(config)
}
