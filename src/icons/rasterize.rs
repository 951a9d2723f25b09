use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::IconError;

/// Turns SVG markup into PNG bytes.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, svg: &str) -> Result<Vec<u8>, IconError>;
}

/// Pipes the SVG through an external converter (`rsvg-convert` by default)
/// and reads the PNG from its stdout.
pub struct CommandRasterizer {
    program: String,
    args: Vec<String>,
}

impl CommandRasterizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl Rasterizer for CommandRasterizer {
    async fn rasterize(&self, svg: &str) -> Result<Vec<u8>, IconError> {
        let mut child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| IconError::Convert(format!("Failed to spawn {}: {e}", self.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| IconError::Convert("converter stdin unavailable".into()))?;
        let input = svg.as_bytes().to_vec();
        let write = async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        };

        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output
            .map_err(|e| IconError::Convert(format!("{} failed: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IconError::Convert(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        written.map_err(|e| IconError::Convert(format!("Failed to write svg: {e}")))?;

        if output.stdout.is_empty() {
            return Err(IconError::Convert(format!(
                "{} produced no output",
                self.program
            )));
        }
        Ok(output.stdout)
    }
}
