use async_trait::async_trait;
use eyre::Result;
use tracing::debug;

use crate::cli::chat::conversation_state::{ConversationState, Message, Role};

const REWRITE_INSTRUCTION: &str = "You are a helpful assistant that is great at processing user queries and turning them into a singular search query. \
You will be given a user query, and your job is to rewrite it into one new query that will be used to search the internet \
for information relevant to the original request. \
Do not bloat the query with unnecessary information, but make sure the context of the original query is preserved.";

const FORMAT_INSTRUCTION: &str = "You are a helpful assistant that is great at formatting search results into a human readable report. \
You will receive the results of a web search containing travel information, such as destinations, cities, and countries. \
Format the results exactly as follows:\n\
A topic sentence introducing the travel location.\n\
3-5 bullet points describing the travel location as a whole.\n\
3-5 bullet points naming destinations to visit in the travel location.\n\
3-5 bullet points naming top things to do in the travel location.\n\
1-3 bullet points with any other interesting facts about the travel location (N/A if not applicable).\n\
A list of the sources that were used.\n\
Stick to this format, and do not bloat the output with unnecessary information. \
Do not write out metadata labels such as 'title' or 'source', only their values.";

/// Chat-completion collaborator: a system instruction plus one user message
/// in, one assistant reply out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, messages: &[Message]) -> Result<String>;
}

/// Web-search collaborator: plain-text query in, rendered results out.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ProcessInput,
    ProcessSearch,
    FormatOutput,
    End,
}

/// Transition table for the pipeline. The rewrite and search stages bail out
/// to `End` when the previous stage flagged its input as invalid.
fn next_stage(stage: Stage, valid_input: bool) -> Stage {
    match (stage, valid_input) {
        (Stage::ProcessInput, true) => Stage::ProcessSearch,
        (Stage::ProcessSearch, true) => Stage::FormatOutput,
        (Stage::ProcessInput, false) | (Stage::ProcessSearch, false) => Stage::End,
        (Stage::FormatOutput, _) | (Stage::End, _) => Stage::End,
    }
}

/// The three-stage search pipeline: rewrite the user query, run the web
/// search, format the results into a travel report.
pub struct Pipeline {
    llm: Box<dyn LanguageModel>,
    search: Box<dyn SearchProvider>,
}

impl Pipeline {
    pub fn new(llm: Box<dyn LanguageModel>, search: Box<dyn SearchProvider>) -> Self {
        Self { llm, search }
    }

    /// Run one pipeline turn over the conversation state, starting from the
    /// rewrite stage and stepping the state machine until `End`.
    pub async fn run(&self, state: &mut ConversationState) -> Result<()> {
        let mut stage = Stage::ProcessInput;

        loop {
            match stage {
                Stage::ProcessInput => self.process_input(state).await?,
                Stage::ProcessSearch => self.process_search(state).await?,
                Stage::FormatOutput => self.format_output(state).await?,
                Stage::End => break,
            }

            stage = next_stage(stage, state.valid_input());
        }

        Ok(())
    }

    /// Rewrite the latest user message into a single search query.
    async fn process_input(&self, state: &mut ConversationState) -> Result<()> {
        // The turn must start with a non-empty user message.
        let query = match state.last_message() {
            Some(message)
                if message.role == Role::User && !message.content.trim().is_empty() =>
            {
                message.content.clone()
            }
            _ => {
                state.add_assistant_message("No user input received.");
                state.set_valid_input(false);
                return Ok(());
            }
        };

        debug!("Rewriting user query into a search query");
        let rewritten = self
            .llm
            .generate(&[Message::system(REWRITE_INSTRUCTION), Message::user(query)])
            .await?;

        state.add_assistant_message(&rewritten);
        state.set_valid_input(true);
        Ok(())
    }

    /// Run the web search using the rewritten query.
    async fn process_search(&self, state: &mut ConversationState) -> Result<()> {
        let query = match state.last_message() {
            Some(message) if message.role == Role::Assistant => message.content.clone(),
            _ => {
                state.add_assistant_message("No search query received.");
                state.set_valid_input(false);
                return Ok(());
            }
        };

        debug!("Running web search for: {}", query);
        let results = self.search.search(&query).await?;

        state.add_assistant_message(&format!("Search results: {}", results));
        state.set_valid_input(true);
        Ok(())
    }

    /// Format the raw search results into the travel report.
    async fn format_output(&self, state: &mut ConversationState) -> Result<()> {
        let results = match state.last_message() {
            Some(message) if message.role == Role::Assistant => message.content.clone(),
            _ => {
                state.add_assistant_message("No search results received.");
                state.set_valid_input(false);
                return Ok(());
            }
        };

        debug!("Formatting search results");
        let formatted = self
            .llm
            .generate(&[Message::system(FORMAT_INSTRUCTION), Message::user(results)])
            .await?;

        state.add_assistant_message(&formatted);
        state.set_valid_input(true);
        Ok(())
    }
}
