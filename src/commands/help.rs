use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

pub struct HelpCommand;

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &str {
        "/help"
    }

    fn aliases(&self) -> &[&str] {
        &["/h", "/?"]
    }

    fn description(&self) -> &str {
        "show this help"
    }

    // The registry intercepts /help to print the full listing; this body
    // only runs if someone wires the command up without a registry.
    async fn execute(&self, _args: &str, _info: &SessionInfo<'_>) -> CommandResult {
        println!("type /help for available commands");
        CommandResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata() {
        assert_eq!(HelpCommand.name(), "/help");
        assert!(HelpCommand.aliases().contains(&"/h"));
        assert!(!HelpCommand.description().is_empty());
    }
}
