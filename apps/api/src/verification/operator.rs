//! The human on the other side of verification.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tracing::warn;

use crate::errors::AppError;

/// Display text and read one line of input. Each `ask` suspends the flow
/// until exactly one answer arrives.
#[async_trait]
pub trait OperatorIo: Send {
    async fn show(&mut self, text: &str) -> Result<(), AppError>;

    async fn ask(&mut self, prompt: &str) -> Result<String, AppError>;
}

/// Terminal operator over tokio stdin/stdout.
pub struct ConsoleOperator {
    input: Lines<BufReader<Stdin>>,
    output: Stdout,
}

impl ConsoleOperator {
    pub fn new() -> Self {
        Self {
            input: BufReader::new(tokio::io::stdin()).lines(),
            output: tokio::io::stdout(),
        }
    }

    async fn write(&mut self, text: &str) -> Result<(), AppError> {
        self.output
            .write_all(text.as_bytes())
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("write to terminal: {e}")))?;
        self.output
            .flush()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("flush terminal: {e}")))
    }
}

impl Default for ConsoleOperator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OperatorIo for ConsoleOperator {
    async fn show(&mut self, text: &str) -> Result<(), AppError> {
        self.write(&format!("{text}\n")).await
    }

    async fn ask(&mut self, prompt: &str) -> Result<String, AppError> {
        self.write(prompt).await?;
        match self.input.next_line().await {
            Ok(Some(line)) => Ok(line),
            // Closed stdin leaves no way to approve.
            Ok(None) => {
                warn!("operator input closed during verification");
                Err(AppError::VerificationCancelled)
            }
            Err(e) => Err(AppError::Internal(anyhow::anyhow!("read from terminal: {e}"))),
        }
    }
}

/// Replays a fixed list of answers and keeps everything it was shown.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: VecDeque<String>,
    /// Simulated think time before each answer.
    delay: Duration,
    pub shown: Vec<String>,
    pub prompts: Vec<String>,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl OperatorIo for ScriptedOperator {
    async fn show(&mut self, text: &str) -> Result<(), AppError> {
        self.shown.push(text.to_string());
        Ok(())
    }

    async fn ask(&mut self, prompt: &str) -> Result<String, AppError> {
        self.prompts.push(prompt.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.answers.pop_front().ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("scripted operator ran out of answers"))
        })
    }
}
