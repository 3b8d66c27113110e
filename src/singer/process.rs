//! Tap process execution
//!
//! Generated command lines are handed to `sh -c` as-is, so whatever the
//! source builds (including an overridden tap command with its own
//! arguments) runs exactly as written.

use crate::error::{Error, Result};
use crate::message::Logger;
use std::collections::VecDeque;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::debug;

/// Lines of stderr kept for the error raised on a failed run
const STDERR_TAIL_LINES: usize = 20;

/// One invocation of the tap
#[derive(Debug, Clone)]
pub struct TapProcess {
    command: String,
}

impl TapProcess {
    /// Wrap a command line
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// The command line being run
    pub fn command(&self) -> &str {
        &self.command
    }

    fn build(&self) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> Error {
        Error::TapSpawn {
            command: self.command.clone(),
            source,
        }
    }

    fn failed(&self, code: Option<i32>, stderr: String) -> Error {
        Error::TapFailed {
            command: self.command.clone(),
            code,
            stderr,
        }
    }

    /// Run to completion and return stdout
    pub async fn run_capture(&self) -> Result<String> {
        debug!(command = %self.command, "Running tap");
        let output = self
            .build()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(self.failed(output.status.code(), stderr));
        }
        if !stderr.is_empty() {
            debug!(command = %self.command, stderr = %stderr, "Tap wrote to stderr");
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run to completion, handing each stdout line to `on_line` as it arrives
    ///
    /// Stderr lines are forwarded to `logger` while the tap runs.
    pub async fn run_streaming<F>(&self, logger: &Logger, mut on_line: F) -> Result<()>
    where
        F: FnMut(&str),
    {
        debug!(command = %self.command, "Running tap");
        let mut child = self
            .build()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Other("Tap stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Other("Tap stderr was not captured".to_string()))?;

        let stderr_task = tokio::spawn(forward_stderr(stderr, logger.clone()));

        let mut stdout = BufReader::new(stdout);
        let mut buf = Vec::new();
        while let Some(line) = next_lossy_line(&mut stdout, &mut buf).await? {
            on_line(&line);
        }

        let status = child.wait().await?;
        let stderr_tail = stderr_task.await.map_err(anyhow::Error::from)?;

        if status.success() {
            Ok(())
        } else {
            Err(self.failed(status.code(), stderr_tail))
        }
    }
}

/// Read one line, replacing invalid UTF-8 instead of failing on it
///
/// Returns `None` at end of stream. The trailing `\n` (and `\r`) is stripped.
async fn next_lossy_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

/// Log every stderr line, returning the last few joined for error reporting
async fn forward_stderr<R>(stderr: R, logger: Logger) -> String
where
    R: AsyncRead + Unpin,
{
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut stderr = BufReader::new(stderr);
    let mut buf = Vec::new();
    while let Ok(Some(line)) = next_lossy_line(&mut stderr, &mut buf).await {
        if line.trim().is_empty() {
            continue;
        }
        logger.info(line.clone());
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    Vec::from(tail).join("\n")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::message::{Emitter, Message};
    use crate::types::LogLevel;

    #[tokio::test]
    async fn test_run_capture() {
        let out = TapProcess::new("echo hello").run_capture().await.unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_capture_failure() {
        let err = TapProcess::new("echo oops >&2; exit 3")
            .run_capture()
            .await
            .unwrap_err();
        match err {
            Error::TapFailed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "oops");
            }
            other => panic!("Expected TapFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_fails() {
        let err = TapProcess::new("definitely-not-a-real-tap-binary --discover")
            .run_capture()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TapFailed { code: Some(127), .. }));
    }

    #[tokio::test]
    async fn test_run_streaming() {
        let logger = Logger::new(Emitter::capture());
        let mut seen = Vec::new();
        TapProcess::new("printf 'a\\nb\\n'; echo warn >&2")
            .run_streaming(&logger, |line| seen.push(line.to_string()))
            .await
            .unwrap();

        assert_eq!(seen, vec!["a", "b"]);
        assert_eq!(
            logger.emitter().captured(),
            vec![Message::log(LogLevel::Info, "warn")]
        );
    }

    #[tokio::test]
    async fn test_run_streaming_survives_invalid_utf8() {
        let logger = Logger::new(Emitter::capture());
        let mut seen = Vec::new();
        TapProcess::new("printf 'a\\n\\377bad\\nb\\n'; printf '\\376warn\\nlater\\n' >&2")
            .run_streaming(&logger, |line| seen.push(line.to_string()))
            .await
            .unwrap();

        assert_eq!(seen, vec!["a", "\u{FFFD}bad", "b"]);
        assert_eq!(
            logger.emitter().captured(),
            vec![
                Message::log(LogLevel::Info, "\u{FFFD}warn"),
                Message::log(LogLevel::Info, "later"),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_streaming_last_line_without_newline() {
        let logger = Logger::new(Emitter::capture());
        let mut seen = Vec::new();
        TapProcess::new("printf 'a\\r\\nb'")
            .run_streaming(&logger, |line| seen.push(line.to_string()))
            .await
            .unwrap();

        assert_eq!(seen, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_run_streaming_failure_keeps_stderr() {
        let logger = Logger::new(Emitter::capture());
        let err = TapProcess::new("echo partial; echo 'auth failed' >&2; exit 1")
            .run_streaming(&logger, |_| {})
            .await
            .unwrap_err();
        match err {
            Error::TapFailed { code, stderr, .. } => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "auth failed");
            }
            other => panic!("Expected TapFailed, got {other:?}"),
        }
    }
}
