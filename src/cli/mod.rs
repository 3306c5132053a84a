//! CLI command handling.
//!
//! Provides subcommands for:
//! - Serving tool calls over stdin/stdout (`serve`, the default)
//! - Listing tool schemas (`list`)
//! - Running a single tool call (`call`)

mod serve;

pub use serve::{CallRequest, CallResponse, ErrorBody, handle_line, serve};

use clap::{ColorChoice, Parser, Subcommand};

use crate::tools::{CallContext, ToolRegistry};

#[derive(Parser, Debug)]
#[command(name = "toolhouse")]
#[command(about = "Stateful tools for agents: memo, rate limiter, jobs, access guard, order ledger")]
#[command(
    long_about = "Serves tool calls as newline-delimited JSON on stdin/stdout.\nExamples:\n  toolhouse serve\n  toolhouse call ledger.checkAvailability '{\"sku\":\"A-100\"}'"
)]
#[command(version)]
#[command(color = ColorChoice::Auto)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Emit logs as JSON lines on stderr
    #[arg(long = "json", global = true, env = "TOOLHOUSE_LOG_JSON")]
    pub json_logs: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve tool calls over stdin/stdout (default if no subcommand given)
    #[command(
        about = "Serve tool calls",
        long_about = "Reads one JSON request per line from stdin and writes one JSON response per line to stdout.\nRequest: {\"id\": 1, \"tool\": \"memo.stats\", \"arguments\": {}}"
    )]
    Serve,

    /// Print every tool's name, description and parameter schema
    #[command(about = "List tools")]
    List,

    /// Run a single tool call and print the response
    #[command(
        about = "Call one tool",
        long_about = "Runs one tool call against fresh state.\nExample: toolhouse call guard.publicOp"
    )]
    Call {
        /// Tool name, e.g. memo.computeOrFetch
        tool: String,

        /// JSON object of arguments
        #[arg(default_value = "{}")]
        arguments: String,
    },
}

impl Cli {
    /// The chosen subcommand, defaulting to `serve`.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

/// Run a one-shot `call` command, returning the response line.
pub async fn run_call_command(registry: &ToolRegistry, tool: &str, arguments: &str) -> String {
    let response = match serde_json::from_str::<serde_json::Value>(arguments) {
        Ok(arguments) => {
            let ctx = CallContext::new();
            CallResponse::from_result(None, registry.execute(tool, arguments, &ctx).await)
        }
        Err(e) => CallResponse::invalid(None, format!("arguments are not valid JSON: {e}")),
    };
    response.to_line()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::toolbox::Toolbox;
    use clap::CommandFactory;

    #[test]
    fn test_version() {
        let cmd = Cli::command();
        assert_eq!(
            cmd.get_version().unwrap_or("unknown"),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::parse_from(["toolhouse"]);
        assert!(matches!(cli.resolved_command(), Command::Serve));
        assert!(!cli.json_logs);
    }

    #[test]
    fn test_parse_call() {
        let cli = Cli::parse_from(["toolhouse", "call", "memo.stats"]);
        match cli.resolved_command() {
            Command::Call { tool, arguments } => {
                assert_eq!(tool, "memo.stats");
                assert_eq!(arguments, "{}");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_call_command() {
        let registry = ToolRegistry::with_toolbox(&Toolbox::new(&Config::default())).await;

        let line = run_call_command(&registry, "ledger.checkAvailability", r#"{"sku":"C-300"}"#)
            .await;
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["result"]["available"], 12);

        let line = run_call_command(&registry, "memo.stats", "{not json").await;
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["error"]["kind"], "invalid_argument");
    }
}
