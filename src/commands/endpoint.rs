use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo, StateChange};
use crate::config::KEY_API_BASE_URL;

pub struct EndpointCommand;

#[async_trait]
impl Command for EndpointCommand {
    fn name(&self) -> &str {
        "/endpoint"
    }

    fn description(&self) -> &str {
        "show or override the endpoint (/endpoint <url>, /endpoint clear)"
    }

    async fn execute(&self, args: &str, info: &SessionInfo<'_>) -> CommandResult {
        match args {
            "" => {
                println!("  endpoint: {}", info.endpoint);
                CommandResult::Handled
            }
            "clear" => {
                if let Err(e) = info.config.remove(KEY_API_BASE_URL) {
                    eprintln!("  ✗ failed to clear endpoint override: {e}");
                    return CommandResult::Handled;
                }
                let endpoint = match info.config.resolve_api_base_url() {
                    Ok(url) => url,
                    Err(e) => {
                        eprintln!("  ✗ failed to resolve endpoint: {e}");
                        return CommandResult::Handled;
                    }
                };
                println!("  ✓ override cleared, endpoint is {endpoint}");
                CommandResult::StateChanged(StateChange::Endpoint(endpoint))
            }
            url => {
                let url = url.trim_end_matches('/');
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    eprintln!("  ✗ endpoint must start with http:// or https://");
                    return CommandResult::Handled;
                }
                if let Err(e) = info.config.set(KEY_API_BASE_URL, url) {
                    eprintln!("  ✗ failed to save endpoint: {e}");
                    return CommandResult::Handled;
                }
                println!("  ✓ endpoint set to {url}");
                CommandResult::StateChanged(StateChange::Endpoint(url.to_string()))
            }
        }
    }
}
