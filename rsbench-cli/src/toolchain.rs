//! External Tools
//!
//! Thin wrappers over the native compiler and the structure recovery tool.
//! Both are located up front so a missing tool fails before any work is done.

use crate::settings::CompilerSettings;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Native C++ compiler.
pub struct Compiler {
    program: PathBuf,
    flags: Vec<String>,
}

impl Compiler {
    /// Resolve the configured compiler through `PATH`.
    pub fn locate(settings: &CompilerSettings) -> Result<Self> {
        let program = which::which(&settings.program)
            .with_context(|| format!("Compiler `{}` not found in PATH", settings.program))?;
        log::debug!("Using compiler {}", program.display());
        Ok(Self {
            program,
            flags: settings.flags.clone(),
        })
    }

    /// Compile `source` into the executable `output`.
    pub fn compile(&self, source: &Path, output: &Path) -> Result<()> {
        log::info!(
            "Compiling {} -> {} ({})",
            source.display(),
            output.display(),
            self.flags.join(" ")
        );
        let result = Command::new(&self.program)
            .args(&self.flags)
            .arg(source)
            .arg("-o")
            .arg(output)
            .output()
            .with_context(|| format!("Failed to run {}", self.program.display()))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            anyhow::bail!(
                "Compilation of {} failed ({}):\n{}",
                source.display(),
                result.status,
                stderr
            );
        }
        if !result.stderr.is_empty() {
            log::warn!("Compiler warnings: {}", String::from_utf8_lossy(&result.stderr));
        }
        Ok(())
    }
}

/// Structure recovery tool under test.
pub struct RecoveryTool {
    program: PathBuf,
}

impl RecoveryTool {
    /// Resolve the tool, accepting either a bare name or a path.
    pub fn locate(program: &Path) -> Result<Self> {
        let program = which::which(program)
            .with_context(|| format!("Recovery tool `{}` not found", program.display()))?;
        Ok(Self { program })
    }

    /// Run the tool on `binary` and return the recovered struct listing.
    pub fn recover(&self, binary: &Path) -> Result<String> {
        log::info!("Recovering structs from {}", binary.display());
        let result = Command::new(&self.program)
            .arg(binary)
            .output()
            .with_context(|| format!("Failed to run {}", self.program.display()))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            anyhow::bail!("Recovery tool exited with {}:\n{}", result.status, stderr);
        }
        if !result.stderr.is_empty() {
            log::warn!("Recovery tool stderr: {}", String::from_utf8_lossy(&result.stderr));
        }
        String::from_utf8(result.stdout).context("Recovery tool output is not valid UTF-8")
    }
}
