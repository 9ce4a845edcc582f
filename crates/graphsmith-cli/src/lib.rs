//! graphsmith command-line interface
//!
//! Argument parsing lives in [`cli`], command implementations in
//! [`commands`]; `main` only wires configuration and dispatches.

pub mod cli;
pub mod commands;
