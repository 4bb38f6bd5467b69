//! Domain logic for the OCR gateway.
//!
//! Everything needed to turn one caller-supplied input into one
//! [`runner::Outcome`] lives here: input validation, startup resolution of
//! the external recognition script, deadline handling, subprocess management
//! and result extraction. Nothing in this crate knows about HTTP.

pub mod error;
pub mod input;
pub mod runner;
