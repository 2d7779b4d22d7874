use crate::foundation::core::{Canvas, Point, Size};
use crate::layer::model::{Geometry, LayerId};
use crate::layer::store::LayerStore;

/// Which part of a layer a point landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitRegion {
    /// Inside the box, outside the resize handle.
    Body,
    /// Inside the handle square at the box's bottom-right corner.
    ResizeHandle,
}

/// Result of a successful hit-test. A miss is `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Hit {
    /// Topmost eligible layer under the point.
    pub layer: LayerId,
    /// Region of that layer.
    pub region: HitRegion,
}

/// Find the topmost visible box layer containing `point` (surface-logical coordinates).
///
/// Hidden layers and anchor-only layers (text, timer) are never hit. Box edges are inclusive.
/// The handle square has side `handle_size` and shares its bottom-right corner with the box.
pub fn hit_test(store: &LayerStore, point: Point, handle_size: f64) -> Option<Hit> {
    store
        .iter()
        .rev()
        .filter(|l| l.is_visible() && l.has_box())
        .find(|l| l.geometry().contains(point))
        .map(|l| Hit {
            layer: l.id(),
            region: region_of(l.geometry(), point, handle_size),
        })
}

fn region_of(g: Geometry, p: Point, handle_size: f64) -> HitRegion {
    let br = g.bottom_right();
    if p.x >= br.x - handle_size && p.y >= br.y - handle_size {
        HitRegion::ResizeHandle
    } else {
        HitRegion::Body
    }
}

/// Map a pointer position from display space into surface-logical space.
///
/// `surface = (client - element_origin) * (canvas / displayed_size)`. Returns `None` when the
/// displayed size is degenerate.
pub fn map_client_point(
    client: Point,
    element_origin: Point,
    displayed_size: Size,
    canvas: Canvas,
) -> Option<Point> {
    let ok = |v: f64| v.is_finite() && v > 0.0;
    if !ok(displayed_size.width) || !ok(displayed_size.height) {
        return None;
    }
    let sx = f64::from(canvas.width) / displayed_size.width;
    let sy = f64::from(canvas.height) / displayed_size.height;
    Some(Point::new(
        (client.x - element_origin.x) * sx,
        (client.y - element_origin.y) * sy,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/interact/hit.rs"]
mod tests;
