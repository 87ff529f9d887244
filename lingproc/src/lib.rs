//! Linguistic processing utilities.
//!
//! This crate turns streamed model output into narratable units: the
//! [`LineSplitter`] cuts chunked text into indexed lines and
//! [`strip_markup`] derives the spoken copy of a displayed line.

pub mod line_splitter;
pub mod markup;

pub use crate::line_splitter::*;
pub use crate::markup::*;
