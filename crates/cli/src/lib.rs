//! galfont command-line interface.

pub mod cli;
