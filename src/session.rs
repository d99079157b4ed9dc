//! The chat session: one connection, one conversation, one model.
//!
//! Front ends own a `Session` and call into it for every action. Each action
//! runs to completion before the next one starts.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{ApiKeys, Config, ConnectionConfig};
use crate::connection::ConnectionManager;
use crate::conversation::{Conversation, ConversationTurn};
use crate::db::DatabaseClient;
use crate::error::{Result, SqlChatError};
use crate::llm::{
    create_client, generate_answer, generate_sql, AnswerGeneration, LlmClient, LlmProvider,
    ModelSelector, SqlGeneration,
};

/// AI reply for every question that did not produce an answer.
pub const FALLBACK_REPLY: &str = "No results found. Please ask a related question to the table schema.";

/// How a question ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// The answer chain produced an answer.
    Answered(String),
    /// One of the chains declared the question out of scope.
    OutOfScope,
    /// The generated SQL (or schema read) failed on the database.
    ExecutionFailed(String),
    /// An LLM call failed.
    GenerationFailed(String),
    /// No connection is open.
    NotConnected,
}

impl AskOutcome {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Answered(_) => "answered",
            Self::OutOfScope => "out_of_scope",
            Self::ExecutionFailed(_) => "execution_failed",
            Self::GenerationFailed(_) => "generation_failed",
            Self::NotConnected => "not_connected",
        }
    }

    /// The text appended to the conversation for this outcome.
    pub fn reply(&self) -> &str {
        match self {
            Self::Answered(text) => text,
            Self::OutOfScope
            | Self::ExecutionFailed(_)
            | Self::GenerationFailed(_)
            | Self::NotConnected => FALLBACK_REPLY,
        }
    }
}

/// How LLM clients are built when the model changes.
#[derive(Debug, Clone, Default)]
struct LlmSettings {
    keys: ApiKeys,
    timeout: Option<Duration>,
    use_mock: bool,
}

impl LlmSettings {
    fn provider_for(&self, model: &ModelSelector) -> LlmProvider {
        if self.use_mock {
            LlmProvider::Mock
        } else {
            model.provider()
        }
    }

    fn client_for(&self, model: &ModelSelector) -> Result<Box<dyn LlmClient>> {
        create_client(self.provider_for(model), model.model(), &self.keys, self.timeout)
    }
}

/// Session state threaded through every handler.
pub struct Session {
    connection: ConnectionManager,
    conversation: Conversation,
    model: ModelSelector,
    llm: Box<dyn LlmClient>,
    llm_settings: LlmSettings,
    form: ConnectionConfig,
    last_sql: Option<String>,
    sample_rows: usize,
    history_window: Option<usize>,
}

impl Session {
    /// Creates a disconnected session from the loaded configuration.
    pub fn new(config: &Config, keys: ApiKeys, use_mock_llm: bool) -> Result<Self> {
        let llm_settings = LlmSettings {
            keys,
            timeout: config.llm.timeout_secs.map(Duration::from_secs),
            use_mock: use_mock_llm,
        };

        let model = ModelSelector::resolve(&config.llm.model);
        let llm = llm_settings.client_for(&model)?;
        info!(
            "Model {} via {}",
            model.model(),
            llm_settings.provider_for(&model)
        );

        Ok(Self {
            connection: ConnectionManager::new(),
            conversation: Conversation::new(),
            model,
            llm,
            llm_settings,
            form: config.connection.clone(),
            last_sql: None,
            sample_rows: config.schema.sample_rows,
            history_window: config.llm.history_window,
        })
    }

    /// Replaces the LLM client, keeping the selected model name.
    pub fn with_llm_client(mut self, llm: Box<dyn LlmClient>) -> Self {
        self.llm = llm;
        self
    }

    /// Connects using the current form values.
    ///
    /// On failure the previous connection and the conversation are untouched.
    pub async fn connect(&mut self) -> Result<()> {
        let config = self.form.clone();
        self.connection.connect(&config, self.sample_rows).await
    }

    /// Sets the form to `config` and connects with it.
    pub async fn connect_to(&mut self, config: ConnectionConfig) -> Result<()> {
        self.form = config;
        self.connect().await
    }

    /// Installs an already opened database client.
    pub async fn attach(&mut self, config: ConnectionConfig, db: Box<dyn DatabaseClient>) {
        self.form = config.clone();
        self.connection.replace(config, db).await;
    }

    /// Closes the connection, if any.
    pub async fn close(&mut self) -> Result<()> {
        self.connection.close().await
    }

    /// Switches the model. Only the selectable models are accepted.
    pub fn set_model(&mut self, name: &str) -> Result<()> {
        if !ModelSelector::is_known(name) {
            return Err(SqlChatError::config(format!(
                "Unknown model '{name}'. Available: {}",
                ModelSelector::AVAILABLE.join(", ")
            )));
        }

        let model = ModelSelector::resolve(name);
        self.llm = self.llm_settings.client_for(&model)?;
        info!("Switched model to {model}");
        self.model = model;
        Ok(())
    }

    /// Handles one chat input.
    ///
    /// Blank input is ignored and returns `None`. Anything else appends the
    /// Human turn and exactly one AI turn, whatever happens in between.
    pub async fn ask(&mut self, question: &str) -> Option<AskOutcome> {
        if question.trim().is_empty() {
            return None;
        }

        self.conversation.append(ConversationTurn::human(question));

        let outcome = self.answer(question).await;
        match &outcome {
            AskOutcome::Answered(_) => info!(outcome = outcome.kind(), "Question answered"),
            AskOutcome::OutOfScope | AskOutcome::NotConnected => {
                info!(outcome = outcome.kind(), "Question not answered")
            }
            AskOutcome::ExecutionFailed(reason) | AskOutcome::GenerationFailed(reason) => {
                warn!(outcome = outcome.kind(), %reason, "Question failed")
            }
        }

        self.conversation
            .append(ConversationTurn::ai(outcome.reply()));
        Some(outcome)
    }

    /// Runs schema read, SQL chain, execution and answer chain.
    async fn answer(&mut self, question: &str) -> AskOutcome {
        self.last_sql = None;

        let Some(db) = self.connection.db() else {
            return AskOutcome::NotConnected;
        };

        let schema = match db.introspect_schema().await {
            Ok(schema) => schema.format_for_llm(),
            Err(e) => return AskOutcome::ExecutionFailed(e.to_string()),
        };

        let history = self.conversation.recent(self.history_window);

        let sql = match generate_sql(self.llm.as_ref(), question, history, &schema).await {
            Ok(SqlGeneration::Sql(sql)) => sql,
            Ok(SqlGeneration::OutOfScope) => return AskOutcome::OutOfScope,
            Err(e) => return AskOutcome::GenerationFailed(e.to_string()),
        };

        debug!("Generated SQL: {sql}");
        self.last_sql = Some(sql.clone());

        let result = match db.execute_query(&sql).await {
            Ok(result) => result,
            Err(e) => return AskOutcome::ExecutionFailed(e.to_string()),
        };
        debug!(
            rows = result.row_count(),
            elapsed_ms = result.execution_time.as_millis() as u64,
            "SQL executed"
        );

        match generate_answer(
            self.llm.as_ref(),
            question,
            history,
            &schema,
            &sql,
            &result.format_for_llm(),
        )
        .await
        {
            Ok(AnswerGeneration::Answer(text)) => AskOutcome::Answered(text),
            Ok(AnswerGeneration::OutOfScope) => AskOutcome::OutOfScope,
            Err(e) => AskOutcome::GenerationFailed(e.to_string()),
        }
    }

    /// Returns the schema text of the open connection.
    pub async fn schema_text(&self) -> Result<String> {
        let db = self
            .connection
            .db()
            .ok_or_else(|| SqlChatError::connection("Not connected. Use /connect first."))?;
        Ok(db.introspect_schema().await?.format_for_llm())
    }

    /// Returns the conversation.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns the selected model.
    pub fn model(&self) -> &ModelSelector {
        &self.model
    }

    /// Returns the provider actually serving requests.
    pub fn provider(&self) -> LlmProvider {
        self.llm_settings.provider_for(&self.model)
    }

    /// Returns the connect form values.
    pub fn form(&self) -> &ConnectionConfig {
        &self.form
    }

    /// Returns the SQL generated for the most recent question, if any.
    pub fn last_sql(&self) -> Option<&str> {
        self.last_sql.as_deref()
    }

    /// Returns true if a connection is open.
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Returns the settings of the open connection.
    pub fn connection_config(&self) -> Option<&ConnectionConfig> {
        self.connection.config()
    }
}
