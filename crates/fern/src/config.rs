//! Interpreter configuration parameters.

use thiserror::Error;

use crate::heap::page::PAGE_SIZE;

/// Default size of each streaming lexer buffer in bytes.
pub const LEX_BUFFER_SIZE: usize = 4096;

/// Default bucket count of the symbol interner table.
pub const SYMBOL_TABLE_CAPACITY: u32 = 512;

/// Default bucket count of the global environment table.
pub const GLOBAL_TABLE_CAPACITY: u32 = 256;

/// Default bucket count of a lambda call frame table.
pub const FRAME_CAPACITY: u32 = 13;

/// Tunable parameters of an interpreter context.
///
/// All sizes have conservative minimums; construct with
/// `Config::default()` and override fields as needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Capacity of a heap page in bytes. Allocations larger than a
    /// page get a dedicated page of their own size.
    pub page_size: usize,

    /// Size of each of the two streaming lexer buffers in bytes. A
    /// single token may span at most two buffers.
    pub lex_buffer_size: usize,

    /// Bucket count of the symbol interner table.
    pub symbol_table_capacity: u32,

    /// Bucket count of the global environment frame.
    pub global_table_capacity: u32,

    /// Bucket count of the table allocated per lambda call frame.
    pub frame_capacity: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            lex_buffer_size: LEX_BUFFER_SIZE,
            symbol_table_capacity: SYMBOL_TABLE_CAPACITY,
            global_table_capacity: GLOBAL_TABLE_CAPACITY,
            frame_capacity: FRAME_CAPACITY,
        }
    }
}

/// Error type for configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("page size {0} is below the minimum of {}", Config::MIN_PAGE_SIZE)]
    PageSizeTooSmall(usize),

    #[error("lexer buffer size {0} is below the minimum of {}", Config::MIN_LEX_BUFFER_SIZE)]
    LexBufferTooSmall(usize),

    #[error("table capacity must be at least 1")]
    ZeroTableCapacity,
}

impl Config {
    /// Smallest allowed page size: enough for a pair block.
    pub const MIN_PAGE_SIZE: usize = 64;

    /// Smallest allowed lexer buffer size.
    pub const MIN_LEX_BUFFER_SIZE: usize = 16;

    /// Check the configuration for out-of-range values.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.page_size < Self::MIN_PAGE_SIZE {
            return Err(ConfigError::PageSizeTooSmall(self.page_size));
        }
        if self.lex_buffer_size < Self::MIN_LEX_BUFFER_SIZE {
            return Err(ConfigError::LexBufferTooSmall(self.lex_buffer_size));
        }
        if self.symbol_table_capacity == 0
            || self.global_table_capacity == 0
            || self.frame_capacity == 0
        {
            return Err(ConfigError::ZeroTableCapacity);
        }
        Ok(())
    }

    /// Clamp all fields to their minimums.
    pub(crate) fn normalized(mut self) -> Self {
        self.page_size = self.page_size.max(Self::MIN_PAGE_SIZE);
        self.lex_buffer_size = self.lex_buffer_size.max(Self::MIN_LEX_BUFFER_SIZE);
        self.symbol_table_capacity = self.symbol_table_capacity.max(1);
        self.global_table_capacity = self.global_table_capacity.max(1);
        self.frame_capacity = self.frame_capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_tiny_page() {
        let config = Config {
            page_size: 8,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::PageSizeTooSmall(8)));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = Config {
            frame_capacity: 0,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTableCapacity));
    }

    #[test]
    fn test_normalized_clamps() {
        let config = Config {
            page_size: 0,
            lex_buffer_size: 0,
            symbol_table_capacity: 0,
            global_table_capacity: 0,
            frame_capacity: 0,
        }
        .normalized();
        assert!(config.validate().is_ok());
    }
}
