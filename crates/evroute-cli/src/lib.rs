//! evroute CLI library.
//!
//! Command handlers, data-file resolution, and terminal rendering for the
//! `evroute` binary. Planning itself lives in `evroute-lib`.

pub mod commands;
pub mod output;
pub mod terminal;
