use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::{SegmentationError, Segmenter};

/// Runs an external program per image, e.g. `rembg i - -`.
///
/// The image is written to the child's stdin and the PNG result is read
/// from its stdout.
#[derive(Debug, Clone)]
pub struct CommandSegmenter {
    program: String,
    args: Vec<String>,
}

impl CommandSegmenter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl Segmenter for CommandSegmenter {
    async fn remove_background(&self, image: Bytes) -> Result<Bytes, SegmentationError> {
        info!("Running {} on {} bytes", self.program, image.len());

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SegmentationError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "child stdin unavailable"))?;

        // Feed stdin concurrently so a child that streams output early cannot deadlock us.
        let writer = tokio::spawn(async move {
            stdin.write_all(&image).await?;
            stdin.shutdown().await
        });

        let output = child.wait_with_output().await?;
        let written = writer.await.map_err(io::Error::other)?;

        if !output.status.success() {
            return Err(SegmentationError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        if output.stdout.is_empty() {
            return Err(SegmentationError::EmptyOutput);
        }

        debug!("{} produced {} bytes", self.program, output.stdout.len());
        Ok(Bytes::from(output.stdout))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandSegmenter {
        CommandSegmenter::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn pipes_image_through_the_command() {
        let segmenter = CommandSegmenter::new("cat", Vec::new());
        let out = segmenter
            .remove_background(Bytes::from_static(b"\x89PNG\r\n\x1a\nrest"))
            .await
            .unwrap();
        assert_eq!(&out[..], b"\x89PNG\r\n\x1a\nrest");
    }

    #[tokio::test]
    async fn non_zero_exit_carries_stderr() {
        let err = sh("cat >/dev/null; echo 'model not found' >&2; exit 3")
            .remove_background(Bytes::from_static(b"img"))
            .await
            .unwrap_err();

        match err {
            SegmentationError::Failed { stderr, .. } => assert_eq!(stderr, "model not found"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_stdout_is_an_error() {
        let err = sh("cat >/dev/null")
            .remove_background(Bytes::from_static(b"img"))
            .await
            .unwrap_err();
        assert!(matches!(err, SegmentationError::EmptyOutput));
    }

    #[tokio::test]
    async fn missing_program_fails_to_spawn() {
        let err = CommandSegmenter::new("definitely-not-a-segmenter-binary", Vec::new())
            .remove_background(Bytes::from_static(b"img"))
            .await
            .unwrap_err();
        assert!(matches!(err, SegmentationError::Spawn { .. }));
    }
}
