//! Configuration for the fernt CLI.
//!
//! An optional `fernt.toml` in the working directory (or a file named
//! with `--config`) tunes the prompt and the interpreter's heap and
//! lexer sizes. Missing files fall back to defaults; malformed files
//! are errors.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FerntError, Result};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "fernt.toml";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Global verbose setting.
    #[serde(default)]
    pub verbose: bool,

    /// REPL prompt string.
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Interpreter tunables.
    #[serde(default)]
    pub interpreter: InterpreterConfig,
}

/// Interpreter heap and lexer tunables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterpreterConfig {
    /// Heap page size in bytes.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Streaming lexer buffer size in bytes.
    #[serde(default = "default_lex_buffer_size")]
    pub lex_buffer_size: usize,
}

fn default_prompt() -> String {
    "> ".to_string()
}

fn default_page_size() -> usize {
    fern::Config::default().page_size
}

fn default_lex_buffer_size() -> usize {
    fern::Config::default().lex_buffer_size
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            prompt: default_prompt(),
            interpreter: InterpreterConfig::default(),
        }
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            lex_buffer_size: default_lex_buffer_size(),
        }
    }
}

impl Config {
    /// Load `fernt.toml` from the working directory, or defaults when
    /// it does not exist.
    pub fn load() -> Result<Config> {
        let path = Path::new(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load_from_path(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from an explicit path.
    pub fn load_from_path(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| FerntError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&text)
            .map_err(|e| FerntError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// The interpreter configuration this CLI configuration selects.
    pub fn interpreter_config(&self) -> fern::Config {
        fern::Config {
            page_size: self.interpreter.page_size,
            lex_buffer_size: self.interpreter.lex_buffer_size,
            ..fern::Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.prompt, "> ");
        assert!(!config.verbose);
        assert_eq!(config.interpreter.page_size, 8192);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "prompt = \"fern> \"\n\n[interpreter]\npage_size = 4096\n"
        )
        .unwrap();
        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.prompt, "fern> ");
        assert_eq!(config.interpreter.page_size, 4096);
        // unset fields keep their defaults
        assert_eq!(
            config.interpreter.lex_buffer_size,
            fern::Config::default().lex_buffer_size
        );
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "prompt = [not a string").unwrap();
        assert!(Config::load_from_path(file.path()).is_err());
    }

    #[test]
    fn test_interpreter_config_mapping() {
        let mut config = Config::default();
        config.interpreter.page_size = 1 << 16;
        let interp = config.interpreter_config();
        assert_eq!(interp.page_size, 1 << 16);
        assert!(interp.validate().is_ok());
    }
}
