//! Built-in REPL commands prefixed with `/`.
//!
//! Commands implement the [`Command`] trait and are registered in a
//! [`CommandRegistry`]. The registry handles dispatch, alias resolution,
//! argument splitting, and help generation.

mod endpoint;
mod help;
mod history;
mod model;
mod quit;

use async_trait::async_trait;
use std::sync::Arc;

use crate::client::EnhanceClient;
use crate::config::Config;

/// Session info available to commands during execution.
pub struct SessionInfo<'a> {
    pub endpoint: &'a str,
    pub model: Option<&'a str>,
    pub user: Option<&'a str>,
    pub db_path: &'a str,
    pub client: &'a EnhanceClient,
    pub config: &'a Config,
}

/// A state change the REPL needs to apply after a command runs.
#[derive(Debug, Clone)]
pub enum StateChange {
    /// Preferred model changed (None = back to the server default).
    Model(Option<String>),
    /// Endpoint override changed; the REPL rebuilds its client.
    Endpoint(String),
}

/// What the REPL should do after a command runs.
pub enum CommandResult {
    /// Not a command — treat the input as a prompt to enhance.
    NotACommand,
    /// Command handled, continue the REPL loop.
    Handled,
    /// Command produced a state change the REPL must apply.
    StateChanged(StateChange),
    /// Exit the REPL.
    Quit,
}

/// A REPL command. Implement this trait to add new commands.
#[async_trait]
pub trait Command: Send + Sync {
    /// Primary name, e.g. `"/model"`.
    fn name(&self) -> &str;

    /// Alternative names, e.g. `&["/h", "/?"]`.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// One-line description for `/help`.
    fn description(&self) -> &str;

    /// Run the command with everything after its name as `args`.
    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult;
}

/// Holds registered commands.
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Create a registry with all built-in commands.
    pub fn new() -> Self {
        let commands: Vec<Arc<dyn Command>> = vec![
            Arc::new(help::HelpCommand),
            Arc::new(model::ModelCommand),
            Arc::new(endpoint::EndpointCommand),
            Arc::new(history::HistoryCommand),
            Arc::new(quit::QuitCommand),
        ];
        Self { commands }
    }

    /// Dispatch input to a matching command, or return `NotACommand`.
    pub async fn dispatch(&self, input: &str, info: &SessionInfo<'_>) -> CommandResult {
        let input = input.trim();
        let (head, args) = match input.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (input, ""),
        };

        for command in &self.commands {
            if head == command.name() || command.aliases().contains(&head) {
                // /help is special — it needs the registry to list commands
                if command.name() == "/help" {
                    print!("{}", self.help_text());
                    return CommandResult::Handled;
                }
                return command.execute(args, info).await;
            }
        }

        if head.starts_with('/') {
            println!("unknown command: {head}");
            println!("type /help for available commands");
            return CommandResult::Handled;
        }

        CommandResult::NotACommand
    }

    /// Dynamic help text listing every registered command.
    pub fn help_text(&self) -> String {
        let mut text = String::from("commands:\n");
        for command in &self.commands {
            let aliases = if command.aliases().is_empty() {
                String::new()
            } else {
                format!(" ({})", command.aliases().join(", "))
            };
            text.push_str(&format!(
                "  {:<12} {}{}\n",
                command.name(),
                command.description(),
                aliases
            ));
        }
        text.push_str("anything else is sent to the enhancer as a prompt\n");
        text
    }
}
