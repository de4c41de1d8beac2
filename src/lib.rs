//! Animation exposure-sheet (X-Sheet) editor.
//!
//! A frame-by-frame dope sheet synced to an audio waveform: editable
//! text columns per frame, a vertical waveform strip that scrubs audio,
//! freehand annotation layers over the whole sheet, and an export
//! engine that reprojects everything onto a print-resolution page.

pub mod annotate;
pub mod app;
pub mod audio;
pub mod cli;
pub mod core;
pub mod entities;
pub mod export;
pub mod render;
pub mod waveform;
pub mod widgets;
