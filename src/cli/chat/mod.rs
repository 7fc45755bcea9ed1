pub mod conversation_state;
pub mod pipeline;
pub mod prompt;

use std::io::Write;
use std::process::ExitCode;

use eyre::Result;
use prompt::generate_prompt;

use crate::cli::chat::conversation_state::{ConversationState, Role};
use crate::cli::chat::pipeline::Pipeline;

/// Drives the search pipeline from the terminal: reads one query per turn,
/// runs the pipeline over the shared conversation state, and prints the
/// final message.
pub struct ChatContext {
    output: Box<dyn Write>,
    input: Option<String>,
    interactive: bool,
    conversation_state: ConversationState,
    pipeline: Pipeline,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        input: Option<String>,
        interactive: bool,
        pipeline: Pipeline,
    ) -> Self {
        Self {
            output,
            input,
            interactive,
            conversation_state: ConversationState::new(),
            pipeline,
        }
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        // Handle non-interactive mode (single query)
        if let Some(input) = self.input.take() {
            self.run_turn(&input).await?;
            return Ok(ExitCode::SUCCESS);
        }

        // Interactive mode
        if self.interactive {
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;

        loop {
            let prompt_text = generate_prompt(None);
            let readline = rl.readline(&prompt_text);

            match readline {
                Ok(line) => {
                    if line == "q" {
                        break;
                    }

                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str());
                    }

                    // An empty line is still a turn; the pipeline answers it
                    // with its own diagnostic.
                    if let Err(e) = self.run_turn(&line).await {
                        writeln!(self.output, "Error: {}", e)?;
                    }
                }
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        Ok(())
    }

    async fn run_turn(&mut self, input: &str) -> Result<()> {
        // Add the user input to the state
        self.conversation_state.add_user_message(input);

        // Run the pipeline over the updated state
        self.pipeline.run(&mut self.conversation_state).await?;

        tracing::debug!(
            "Conversation now holds {} messages",
            self.conversation_state.get_messages().len()
        );

        self.print_response()?;
        Ok(())
    }

    fn print_response(&mut self) -> Result<()> {
        match self.conversation_state.last_message() {
            Some(message) if message.role == Role::Assistant => {
                writeln!(self.output, "{}", message.content)?;
            }
            _ => {
                writeln!(self.output, "Invalid response received.")?;
            }
        }

        Ok(())
    }
}
