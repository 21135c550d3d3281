//! External KickAssembler runner
//!
//! Minimal wrapper that assembles the player harness once the relocated
//! binaries and the configuration include are on disk.
//!
//! Jar resolution order:
//!   1) config.kickass_jar
//!   2) environment variable `KICKASS_JAR`
//!   3) `PATH` environment variable
//!   4) current working directory
//!
//! This program is unlicensed and dedicated to the public domain.
//! Developed by the EVO64 Super Quattro project.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::Config;

#[derive(Debug)]
pub enum AsmError {
    Asm(String),
    Io(std::io::Error),
}

impl From<std::io::Error> for AsmError {
    fn from(e: std::io::Error) -> Self {
        AsmError::Io(e)
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AsmError::Asm(msg) => write!(f, "Assembly failed: {}", msg),
            AsmError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for AsmError {}

pub struct KickAssembler {
    config: Config,
}

impl KickAssembler {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Assemble `source` into `output`, with the output directory on the
    /// library path so `.import` of the generated binaries resolves.
    pub fn assemble_prg(&self, source: &Path, output: &Path) -> Result<(), AsmError> {
        let jar = resolve_kickass_jar(&self.config)?;

        let result = Command::new("java")
            .arg("-jar")
            .arg(&jar)
            .arg(source)
            .arg("-libdir")
            .arg(&self.config.output_path)
            .arg("-o")
            .arg(output)
            .output()
            .map_err(|e| AsmError::Asm(format!("Failed to run java: {}", e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let stdout = String::from_utf8_lossy(&result.stdout);
            let detail = if !stderr.trim().is_empty() {
                stderr.trim().to_string()
            } else if !stdout.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                "(no output from assembler)".to_string()
            };
            return Err(AsmError::Asm(format!(
                "KickAssembler failed (exit code: {})\n{}",
                result.status.code().unwrap_or(-1),
                detail
            )));
        }

        if !output.exists() {
            return Err(AsmError::Asm(
                "KickAssembler reported success but no output file was produced".to_string(),
            ));
        }

        Ok(())
    }
}

const JAR_NAME: &str = "KickAss.jar";

fn resolve_kickass_jar(config: &Config) -> Result<PathBuf, AsmError> {
    // 1) Config kickass_jar
    if let Some(jar) = &config.kickass_jar {
        if jar.exists() {
            return Ok(jar.clone());
        }
    }

    // 2) KICKASS_JAR environment variable
    if let Ok(path) = std::env::var("KICKASS_JAR") {
        let candidate = PathBuf::from(path);
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    // 3) PATH lookup
    if let Ok(path_env) = std::env::var("PATH") {
        let separator = if cfg!(windows) { ';' } else { ':' };
        for dir in path_env.split(separator) {
            let candidate = Path::new(dir).join(JAR_NAME);
            if candidate.exists() {
                return Ok(candidate);
            }
        }
    }

    // 4) Current working directory
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let candidate = cwd.join(JAR_NAME);
    if candidate.exists() {
        return Ok(candidate);
    }

    Err(AsmError::Asm(format!(
        "Could not locate {}. Set config.kickass_jar, KICKASS_JAR, or add it to PATH.",
        JAR_NAME
    )))
}
