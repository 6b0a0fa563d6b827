//! Terminal implementations of the delete confirmation prompt.

use async_trait::async_trait;
use client_core::{ConfirmationPrompt, ConfirmationRequest, Decision};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

/// Asks on stdout and reads the answer from stdin. Anything but `y`/`yes`
/// cancels.
pub struct StdinPrompt;

#[async_trait]
impl ConfirmationPrompt for StdinPrompt {
    async fn ask(&self, request: &ConfirmationRequest) -> Decision {
        let mut stdout = io::stdout();
        let question = format!("{}: {} [y/N] ", request.title, request.message);
        let shown = match stdout.write_all(question.as_bytes()).await {
            Ok(()) => stdout.flush().await,
            Err(error) => Err(error),
        };
        if let Err(error) = shown {
            warn!(%error, "failed to show confirmation prompt");
            return Decision::Cancel;
        }

        let mut line = String::new();
        match BufReader::new(io::stdin()).read_line(&mut line).await {
            Ok(_) => parse_answer(&line),
            Err(error) => {
                warn!(%error, "failed to read confirmation answer");
                Decision::Cancel
            }
        }
    }
}

/// Used for `--yes`.
pub struct AssumeYes;

#[async_trait]
impl ConfirmationPrompt for AssumeYes {
    async fn ask(&self, _request: &ConfirmationRequest) -> Decision {
        Decision::Accept
    }
}

fn parse_answer(line: &str) -> Decision {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Decision::Accept,
        _ => Decision::Cancel,
    }
}
