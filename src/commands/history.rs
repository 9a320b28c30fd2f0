use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

/// Records shown when `/history` is given no count.
const DEFAULT_SHOWN: usize = 10;

pub struct HistoryCommand;

/// First line of `text`, cut to `max` characters.
fn preview(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let cut: String = line.chars().take(max).collect();
        format!("{cut}…")
    }
}

#[async_trait]
impl Command for HistoryCommand {
    fn name(&self) -> &str {
        "/history"
    }

    fn description(&self) -> &str {
        "show recent enhancements (/history [count])"
    }

    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult {
        let limit = match args {
            "" => DEFAULT_SHOWN,
            n => match n.parse() {
                Ok(n) => n,
                Err(_) => {
                    eprintln!("  ✗ not a count: {n}");
                    return CommandResult::Handled;
                }
            },
        };

        let records = match info.client.history(info.user, limit).await {
            Ok(records) => records,
            Err(e) => {
                eprintln!("  ✗ failed to fetch history: {e}");
                return CommandResult::Handled;
            }
        };

        if records.is_empty() {
            println!("  no enhancements yet");
            return CommandResult::Handled;
        }

        for record in &records {
            let model = record.model.as_deref().unwrap_or("-");
            println!(
                "  {}  [{}]  {}",
                record.created_at,
                model,
                preview(&record.raw_prompt, 60)
            );
        }
        CommandResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::TestSession;

    #[test]
    fn metadata() {
        assert_eq!(HistoryCommand.name(), "/history");
        assert!(!HistoryCommand.description().is_empty());
    }

    #[test]
    fn preview_keeps_short_lines() {
        assert_eq!(preview("short prompt", 60), "short prompt");
    }

    #[test]
    fn preview_cuts_long_lines() {
        let long = "x".repeat(80);
        let cut = preview(&long, 60);
        assert_eq!(cut.chars().count(), 61);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn preview_uses_first_line_only() {
        assert_eq!(preview("first\nsecond", 60), "first");
    }

    #[tokio::test]
    async fn bad_count_is_handled() {
        let session = TestSession::new();
        let result = HistoryCommand.execute("lots", &session.info()).await;
        assert!(matches!(result, CommandResult::Handled));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_reported_not_fatal() {
        let session = TestSession::new();
        let result = HistoryCommand.execute("", &session.info()).await;
        assert!(matches!(result, CommandResult::Handled));
    }
}
