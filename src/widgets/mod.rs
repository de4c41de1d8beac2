//! UI widgets: toolbar, the sheet grid, export preview and status bar.

pub mod export_preview;
pub mod painter_surface;
pub mod sheet;
pub mod status;
pub mod toolbar;

pub use painter_surface::PainterSurface;
pub use status::StatusBar;
