//! Benchmark Settings
//!
//! File paths, external tool locations and generator parameters for one run.
//! Loaded from an optional JSON file; command-line flags override it.

use anyhow::{Context, Result};
use rsbench_core::config::{validate_config, GeneratorConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Native compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Program name or path, resolved through `PATH`
    pub program: String,
    /// Flags placed before the source file
    pub flags: Vec<String>,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            program: "clang++".to_string(),
            flags: vec!["-std=c++17".to_string(), "-O1".to_string()],
        }
    }
}

/// Settings for a benchmark run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchSettings {
    pub struct_count: usize,
    pub func_count: usize,
    pub generator: GeneratorConfig,
    /// Generated translation unit
    pub source: PathBuf,
    /// Compiled benchmark binary
    pub binary: PathBuf,
    /// Recovery tool output
    pub recovered: PathBuf,
    /// Recovery tool executable
    pub recovery_tool: PathBuf,
    /// Header replacing the built-in boilerplate
    pub preamble: Option<PathBuf>,
    pub compiler: CompilerSettings,
}

impl Default for BenchSettings {
    fn default() -> Self {
        Self {
            struct_count: 10,
            func_count: 100,
            generator: GeneratorConfig::default(),
            source: PathBuf::from("test.cxx"),
            binary: PathBuf::from("rs-bench"),
            recovered: PathBuf::from("recovered.hxx"),
            recovery_tool: PathBuf::from("restruc"),
            preamble: None,
            compiler: CompilerSettings::default(),
        }
    }
}

impl BenchSettings {
    /// Load settings from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
        validate_config(&settings.generator)?;
        Ok(settings)
    }

    /// Settings from `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Ground-truth struct graph stored next to the source (`test.cxx` -> `test.json`).
    pub fn ground_truth(&self) -> PathBuf {
        self.source.with_extension("json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_keep_defaults() {
        let settings: BenchSettings =
            serde_json::from_str(r#"{ "struct_count": 3, "generator": { "seed": 9 } }"#)
                .expect("settings should parse");
        assert_eq!(settings.struct_count, 3);
        assert_eq!(settings.func_count, 100);
        assert_eq!(settings.generator.seed, 9);
        assert_eq!(settings.generator.field_count.max, 10);
        assert_eq!(settings.compiler.program, "clang++");
    }

    #[test]
    fn test_ground_truth_path() {
        let settings = BenchSettings {
            source: PathBuf::from("out/bench.cxx"),
            ..BenchSettings::default()
        };
        assert_eq!(settings.ground_truth(), PathBuf::from("out/bench.json"));
    }
}
