//! External LaTeX compilation.
//!
//! `PdfLatex` shells out to `pdflatex` with a bounded wall-clock deadline.
//! The intermediate `.tex` file is held by a scoped guard whose drop removes
//! it best-effort on every pipeline exit path, success or failure; removal
//! problems are logged and never fail the request.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("could not prepare output directory: {0}")]
    Workspace(std::io::Error),

    #[error("failed to invoke pdflatex: {0}")]
    Spawn(std::io::Error),

    #[error("pdflatex exited with {status}: {log_tail}")]
    Failed { status: String, log_tail: String },

    #[error("pdflatex exceeded its deadline")]
    Timeout,

    #[error("pdflatex reported success but produced no PDF at {0}")]
    MissingOutput(PathBuf),
}

/// Scoped handle to an intermediate `.tex` file. Dropping the guard removes
/// the file; a failed removal is logged, never propagated.
pub struct TexGuard {
    path: PathBuf,
}

impl TexGuard {
    pub async fn write(path: PathBuf, source: &str) -> std::io::Result<Self> {
        tokio::fs::write(&path, source).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TexGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed intermediate tex file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "failed to remove intermediate tex file: {e}"),
        }
    }
}

/// The compiler surface the pipeline depends on. `PdfLatex` is the real
/// implementation; tests substitute a stub.
#[async_trait]
pub trait DocumentCompiler: Send + Sync {
    /// Compiles `tex_path` into `out_dir`, returning the path of the
    /// produced PDF.
    async fn compile(&self, tex_path: &Path, out_dir: &Path) -> Result<PathBuf, CompileError>;
}

/// Compiles via the external `pdflatex` binary.
pub struct PdfLatex {
    timeout: Duration,
}

impl PdfLatex {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl DocumentCompiler for PdfLatex {
    async fn compile(&self, tex_path: &Path, out_dir: &Path) -> Result<PathBuf, CompileError> {
        tokio::fs::create_dir_all(out_dir)
            .await
            .map_err(CompileError::Workspace)?;

        let child = Command::new("pdflatex")
            .arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg("-output-directory")
            .arg(out_dir)
            .arg(tex_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(CompileError::Spawn)?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(CompileError::Spawn)?,
            Err(_) => return Err(CompileError::Timeout),
        };

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(CompileError::Failed {
                status: output.status.to_string(),
                log_tail: tail(&stdout, 600),
            });
        }

        let pdf_path = pdf_output_path(tex_path, out_dir);
        if !pdf_path.exists() {
            return Err(CompileError::MissingOutput(pdf_path));
        }

        debug!(pdf = %pdf_path.display(), "pdflatex succeeded");
        Ok(pdf_path)
    }
}

/// Where pdflatex will place the PDF for a given input and output directory.
pub fn pdf_output_path(tex_path: &Path, out_dir: &Path) -> PathBuf {
    let stem = tex_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    out_dir.join(format!("{stem}.pdf"))
}

fn tail(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let start = s.len() - max;
        // avoid splitting a UTF-8 sequence
        let start = (start..s.len())
            .find(|i| s.is_char_boundary(*i))
            .unwrap_or(start);
        s[start..].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tex_guard_removes_file_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let tex_path = dir.path().join("resume.tex");
        {
            let guard = TexGuard::write(tex_path.clone(), "\\documentclass{article}")
                .await
                .unwrap();
            assert!(guard.path().exists());
        }
        assert!(!tex_path.exists());
    }

    #[tokio::test]
    async fn test_tex_guard_tolerates_already_removed_file() {
        let dir = tempfile::tempdir().unwrap();
        let tex_path = dir.path().join("resume.tex");
        let guard = TexGuard::write(tex_path.clone(), "x").await.unwrap();
        tokio::fs::remove_file(&tex_path).await.unwrap();
        drop(guard); // must not panic
    }

    #[tokio::test]
    async fn test_unpreparable_output_dir_is_a_workspace_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        tokio::fs::write(&blocker, b"not a directory").await.unwrap();

        // out_dir nested under a regular file cannot be created
        let err = PdfLatex::new(Duration::from_secs(1))
            .compile(Path::new("resume.tex"), &blocker.join("nested"))
            .await
            .unwrap_err();

        assert!(matches!(err, CompileError::Workspace(_)));
        assert!(err.to_string().starts_with("could not prepare output directory"));
    }

    #[test]
    fn test_pdf_output_path_uses_tex_stem() {
        let pdf = pdf_output_path(Path::new("/tmp/work/resume.tex"), Path::new("build/abc"));
        assert_eq!(pdf, Path::new("build/abc/resume.pdf"));
    }

    #[test]
    fn test_tail_keeps_end_of_log() {
        let log = "a".repeat(1000) + "ERROR at end";
        let t = tail(&log, 20);
        assert!(t.ends_with("ERROR at end"));
        assert!(t.len() <= 20);
    }
}
