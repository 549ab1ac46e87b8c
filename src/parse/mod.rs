//! Shell command parsing: tokenizer, command decomposition, and pipeline
//! segmentation.
//!
//! - `tokenize` — quote/escape-aware word splitting and [`ParsedCommand`]
//!   assembly (env assignments, program, subcommand, flags, args).
//! - `segments` — unquoted `|`/`||`/`&&`/`;` splitting for command-position
//!   matching.
//! - `types` — the [`ParsedCommand`] data type.

/// Pipeline segmentation and command-position matching.
pub mod segments;
/// Word splitting and command decomposition.
pub mod tokenize;
/// Parsed command data types.
pub mod types;

pub use segments::{first_command, is_command_in_position, split_segments};
pub use tokenize::{parse, tokenize};
pub use types::{ParsedCommand, SUBCOMMAND_PROGRAMS};
