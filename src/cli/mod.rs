// CLI module for admeta
//
// Command implementations and output formatting for the admeta binary.
// Compiled only into the binary target, never into the library.

pub mod commands;
pub mod output;
