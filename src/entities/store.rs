//! Drawing object store: ordered layers of annotation objects.
//!
//! One layer is active at a time; only the active layer receives new
//! objects and erasure, but all visible layers render (and export).
//! Erasure is atomic per call: the layer's object list is partitioned in
//! one pass and replaced only if something was actually removed.

use log::debug;
use serde::{Deserialize, Serialize};

use super::drawing::DrawingObject;

/// Named, orderable layer of drawing objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawingLayer {
    pub name: String,
    pub visible: bool,
    pub objects: Vec<DrawingObject>,
}

impl DrawingLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), visible: true, objects: Vec::new() }
    }
}

/// Layer stack plus the active-layer index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawingStore {
    pub layers: Vec<DrawingLayer>,
    pub active_layer_index: usize,
}

impl Default for DrawingStore {
    fn default() -> Self {
        Self { layers: vec![DrawingLayer::new("foreground")], active_layer_index: 0 }
    }
}

impl DrawingStore {
    pub fn active_layer(&self) -> Option<&DrawingLayer> {
        self.layers.get(self.active_layer_index)
    }

    /// Append an object to a layer. Out-of-range index is a silent no-op
    /// (returns false).
    pub fn add_object(&mut self, layer_index: usize, object: DrawingObject) -> bool {
        match self.layers.get_mut(layer_index) {
            Some(layer) => {
                layer.objects.push(object);
                true
            }
            None => false,
        }
    }

    /// Append to the active layer.
    pub fn add_to_active(&mut self, object: DrawingObject) -> bool {
        self.add_object(self.active_layer_index, object)
    }

    /// Remove every object on the active layer within `radius` of the point.
    /// Returns whether anything was removed.
    pub fn erase_at_point(&mut self, x: f32, y: f32, radius: f32) -> bool {
        let index = self.active_layer_index;
        let Some(layer) = self.layers.get_mut(index) else {
            return false;
        };
        let before = layer.objects.len();
        let kept: Vec<DrawingObject> = layer
            .objects
            .iter()
            .filter(|obj| !obj.hit_test(x, y, radius))
            .cloned()
            .collect();
        let removed = before - kept.len();
        if removed == 0 {
            return false;
        }
        debug!("erased {removed} object(s) on layer {index} at ({x:.1}, {y:.1})");
        layer.objects = kept;
        true
    }

    pub fn clear_layer(&mut self, layer_index: usize) {
        if let Some(layer) = self.layers.get_mut(layer_index) {
            layer.objects.clear();
        }
    }

    pub fn clear_all_layers(&mut self) {
        for layer in &mut self.layers {
            layer.objects.clear();
        }
    }

    /// Any object on any layer?
    pub fn has_objects(&self) -> bool {
        self.layers.iter().any(|l| !l.objects.is_empty())
    }

    /// Visible layers in stacking order.
    pub fn visible_layers(&self) -> impl Iterator<Item = &DrawingLayer> {
        self.layers.iter().filter(|l| l.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::drawing::{ObjectKind, StrokePoint, StrokeStyle};

    fn line(x0: f32, y0: f32, x1: f32, y1: f32) -> DrawingObject {
        let mut o = DrawingObject::new(ObjectKind::Line, StrokeStyle::default());
        o.points = vec![StrokePoint::new(x0, y0), StrokePoint::new(x1, y1)];
        o
    }

    #[test]
    fn test_add_object_out_of_range_is_noop() {
        let mut store = DrawingStore::default();
        assert!(!store.add_object(5, line(0.0, 0.0, 10.0, 0.0)));
        assert!(!store.has_objects());
        assert!(store.add_object(0, line(0.0, 0.0, 10.0, 0.0)));
        assert!(store.has_objects());
    }

    #[test]
    fn test_erase_is_idempotent() {
        let mut store = DrawingStore::default();
        store.add_to_active(line(0.0, 0.0, 10.0, 0.0));
        assert!(store.erase_at_point(5.0, 0.0, 5.0));
        // Nothing left at that spot: second call reports no removal.
        assert!(!store.erase_at_point(5.0, 0.0, 5.0));
    }

    #[test]
    fn test_erase_only_touches_active_layer() {
        let mut store = DrawingStore::default();
        store.layers.push(DrawingLayer::new("background"));
        store.add_object(1, line(0.0, 0.0, 10.0, 0.0));
        // Active layer is 0; the object lives on layer 1.
        assert!(!store.erase_at_point(5.0, 0.0, 5.0));
        store.active_layer_index = 1;
        assert!(store.erase_at_point(5.0, 0.0, 5.0));
    }

    #[test]
    fn test_erase_removes_all_hits_in_one_pass() {
        let mut store = DrawingStore::default();
        store.add_to_active(line(0.0, 0.0, 10.0, 0.0));
        store.add_to_active(line(0.0, 2.0, 10.0, 2.0));
        store.add_to_active(line(0.0, 500.0, 10.0, 500.0));
        assert!(store.erase_at_point(5.0, 1.0, 5.0));
        assert_eq!(store.active_layer().unwrap().objects.len(), 1);
    }

    #[test]
    fn test_rectangle_top_edge_erase() {
        // Rectangle (10,10)-(50,40), eraser click at (30,10) r=5 hits the
        // top edge.
        let mut store = DrawingStore::default();
        let mut rect = DrawingObject::new(ObjectKind::Rectangle, StrokeStyle::default());
        rect.points = vec![StrokePoint::new(10.0, 10.0), StrokePoint::new(50.0, 40.0)];
        store.add_to_active(rect);
        assert!(store.erase_at_point(30.0, 10.0, 5.0));
    }

    #[test]
    fn test_clear_all_layers() {
        let mut store = DrawingStore::default();
        store.layers.push(DrawingLayer::new("notes"));
        store.add_object(0, line(0.0, 0.0, 10.0, 0.0));
        store.add_object(1, line(0.0, 0.0, 10.0, 0.0));
        store.clear_all_layers();
        assert!(!store.has_objects());
        assert_eq!(store.layers.len(), 2);
    }
}
