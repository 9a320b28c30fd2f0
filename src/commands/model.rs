use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo, StateChange};
use crate::config::KEY_MODEL;
use crate::consts::DEFAULT_MODEL;

pub struct ModelCommand;

#[async_trait]
impl Command for ModelCommand {
    fn name(&self) -> &str {
        "/model"
    }

    fn description(&self) -> &str {
        "show or set the preferred model (/model <name>, /model clear)"
    }

    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult {
        match args {
            "" => {
                match info.model {
                    Some(model) => println!("  model: {model}"),
                    None => println!("  model: {DEFAULT_MODEL} (server default)"),
                }
                CommandResult::Handled
            }
            "clear" | "default" => {
                if let Err(e) = info.config.remove(KEY_MODEL) {
                    eprintln!("  ✗ failed to clear model: {e}");
                    return CommandResult::Handled;
                }
                println!("  ✓ model preference cleared");
                CommandResult::StateChanged(StateChange::Model(None))
            }
            name => {
                if let Err(e) = info.config.set(KEY_MODEL, name) {
                    eprintln!("  ✗ failed to save model: {e}");
                    return CommandResult::Handled;
                }
                println!("  ✓ model set to {name}");
                CommandResult::StateChanged(StateChange::Model(Some(name.to_string())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::TestSession;

    #[test]
    fn metadata() {
        assert_eq!(ModelCommand.name(), "/model");
        assert!(ModelCommand.aliases().is_empty());
        assert!(!ModelCommand.description().is_empty());
    }

    #[tokio::test]
    async fn bare_invocation_is_handled() {
        let session = TestSession::new();
        let result = ModelCommand.execute("", &session.info()).await;
        assert!(matches!(result, CommandResult::Handled));
    }

    #[tokio::test]
    async fn setting_persists_and_reports_change() {
        let session = TestSession::new();
        let result = ModelCommand.execute("gpt-4o", &session.info()).await;

        assert!(matches!(
            result,
            CommandResult::StateChanged(StateChange::Model(Some(ref m))) if m == "gpt-4o"
        ));
        assert_eq!(
            session.config.get(KEY_MODEL).unwrap().as_deref(),
            Some("gpt-4o")
        );
    }

    #[tokio::test]
    async fn clear_removes_the_preference() {
        let session = TestSession::new();
        session.config.set(KEY_MODEL, "gpt-4o").unwrap();

        let result = ModelCommand.execute("clear", &session.info()).await;

        assert!(matches!(
            result,
            CommandResult::StateChanged(StateChange::Model(None))
        ));
        assert!(session.config.get(KEY_MODEL).unwrap().is_none());
    }
}
