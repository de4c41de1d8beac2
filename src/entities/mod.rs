//! Persistent entities: project, sheet rows, drawing objects and layers.

pub mod drawing;
pub mod project;
pub mod store;

pub use drawing::{DrawingObject, ObjectKind, StrokePoint, StrokeStyle, Tool};
pub use project::{AudioMeta, CellField, Column, ColumnKind, Metadata, Project, RowCells, COLUMNS};
pub use store::{DrawingLayer, DrawingStore};
