use eframe::egui::{Pos2, Vec2, vec2};

use crate::graph::GraphEdge;
use crate::layout::LayoutSnapshot;

pub const LABEL_BIAS_DEFAULT: f32 = 0.38;
pub const LABEL_BIAS_MULTI: f32 = 0.32;
pub const LABEL_BIAS_HUB: f32 = 0.26;
pub const CURVE_SCALE_MULTI: f32 = 1.6;
pub const CURVE_SCALE_HUB: f32 = 1.2;
pub const HUB_LABEL_OFFSET_SCALE: f32 = 1.05;

/// The per-edge inputs the geometry needs, independent of node positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveShape {
    pub curve_offset: f32,
    pub is_hub: bool,
    pub is_multiple: bool,
    pub hub_total: usize,
}

impl From<&GraphEdge> for CurveShape {
    fn from(edge: &GraphEdge) -> Self {
        Self {
            curve_offset: edge.curve_offset,
            is_hub: edge.is_hub,
            is_multiple: edge.is_multiple,
            hub_total: edge.hub_total,
        }
    }
}

impl CurveShape {
    fn is_straight(self) -> bool {
        !self.is_multiple || self.curve_offset == 0.0
    }

    fn is_hub_fan(self) -> bool {
        self.is_hub && self.hub_total > 3
    }

    pub fn label_bias(self) -> f32 {
        if self.is_hub {
            LABEL_BIAS_HUB
        } else if self.is_multiple {
            LABEL_BIAS_MULTI
        } else {
            LABEL_BIAS_DEFAULT
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgePath {
    /// Both endpoints coincide.
    Point(Pos2),
    Line { start: Pos2, end: Pos2 },
    Quadratic { start: Pos2, control: Pos2, end: Pos2 },
}

impl EdgePath {
    pub fn start(&self) -> Pos2 {
        match *self {
            Self::Point(point) => point,
            Self::Line { start, .. } | Self::Quadratic { start, .. } => start,
        }
    }

    pub fn end(&self) -> Pos2 {
        match *self {
            Self::Point(point) => point,
            Self::Line { end, .. } | Self::Quadratic { end, .. } => end,
        }
    }

    pub fn point_at(&self, t: f32) -> Pos2 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Self::Point(point) => point,
            Self::Line { start, end } => start + (end - start) * t,
            Self::Quadratic {
                start,
                control,
                end,
            } => quadratic_point(start, control, end, t),
        }
    }

    /// Unit direction of travel at the end point, used for arrowheads.
    pub fn end_tangent(&self) -> Option<Vec2> {
        let (from, to) = match *self {
            Self::Point(_) => return None,
            Self::Line { start, end } => (start, end),
            Self::Quadratic { control, end, .. } => (control, end),
        };
        let direction = to - from;
        let length = direction.length();
        (length > f32::EPSILON).then(|| direction / length)
    }

    pub fn is_finite(&self) -> bool {
        let finite = |point: Pos2| point.x.is_finite() && point.y.is_finite();
        match *self {
            Self::Point(point) => finite(point),
            Self::Line { start, end } => finite(start) && finite(end),
            Self::Quadratic {
                start,
                control,
                end,
            } => finite(start) && finite(control) && finite(end),
        }
    }

    /// SVG path data, handy for exports and debugging.
    pub fn to_svg(&self) -> String {
        match *self {
            Self::Point(point) => format!("M {} {} L {} {}", point.x, point.y, point.x, point.y),
            Self::Line { start, end } => {
                format!("M {} {} L {} {}", start.x, start.y, end.x, end.y)
            }
            Self::Quadratic {
                start,
                control,
                end,
            } => format!(
                "M {} {} Q {} {} {} {}",
                start.x, start.y, control.x, control.y, end.x, end.y
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeGeometry {
    pub path: EdgePath,
    pub label_anchor: Pos2,
}

pub fn quadratic_point(start: Pos2, control: Pos2, end: Pos2, t: f32) -> Pos2 {
    let inverse = 1.0 - t;
    let x = inverse * inverse * start.x + 2.0 * inverse * t * control.x + t * t * end.x;
    let y = inverse * inverse * start.y + 2.0 * inverse * t * control.y + t * t * end.y;
    Pos2::new(x, y)
}

fn control_point(start: Pos2, end: Pos2, shape: CurveShape, hub_scale: f32) -> Option<Pos2> {
    let delta = end - start;
    let distance = delta.length();
    if distance <= f32::EPSILON {
        return None;
    }

    let mid = start + delta * 0.5;
    if shape.is_hub_fan() {
        let normal = vec2(-delta.y, delta.x) / distance;
        Some(mid + normal * (shape.curve_offset * hub_scale))
    } else {
        let ratio = (shape.curve_offset * CURVE_SCALE_MULTI) / distance;
        Some(mid + vec2(-delta.y, delta.x) * ratio)
    }
}

pub fn edge_path(start: Pos2, end: Pos2, shape: CurveShape) -> EdgePath {
    if (end - start).length_sq() <= f32::EPSILON * f32::EPSILON {
        return EdgePath::Point(start);
    }
    if shape.is_straight() {
        return EdgePath::Line { start, end };
    }

    match control_point(start, end, shape, CURVE_SCALE_HUB) {
        Some(control) => EdgePath::Quadratic {
            start,
            control,
            end,
        },
        None => EdgePath::Point(start),
    }
}

pub fn label_anchor(start: Pos2, end: Pos2, shape: CurveShape) -> Pos2 {
    let bias = shape.label_bias();
    if shape.is_straight() {
        return start + (end - start) * bias;
    }

    match control_point(start, end, shape, HUB_LABEL_OFFSET_SCALE) {
        Some(control) => quadratic_point(start, control, end, bias),
        None => start,
    }
}

pub fn edge_geometry(start: Pos2, end: Pos2, shape: CurveShape) -> EdgeGeometry {
    EdgeGeometry {
        path: edge_path(start, end, shape),
        label_anchor: label_anchor(start, end, shape),
    }
}

/// Geometry for every edge whose endpoints the snapshot can place, paired
/// with the edge index. Unplaceable edges are skipped for this tick.
pub fn layout_edges(edges: &[GraphEdge], snapshot: &LayoutSnapshot<'_>) -> Vec<(usize, EdgeGeometry)> {
    edges
        .iter()
        .enumerate()
        .filter_map(|(index, edge)| {
            let start = snapshot.position(&edge.source)?.to_pos2();
            let end = snapshot.position(&edge.target)?.to_pos2();
            Some((index, edge_geometry(start, end, CurveShape::from(edge))))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    fn shape(curve_offset: f32, is_hub: bool, is_multiple: bool, hub_total: usize) -> CurveShape {
        CurveShape {
            curve_offset,
            is_hub,
            is_multiple,
            hub_total,
        }
    }

    #[test]
    fn zero_offset_is_a_straight_segment() {
        let path = edge_path(pos2(0.0, 0.0), pos2(100.0, 0.0), shape(0.0, false, true, 1));
        assert_eq!(
            path,
            EdgePath::Line {
                start: pos2(0.0, 0.0),
                end: pos2(100.0, 0.0)
            }
        );

        let anchor = label_anchor(pos2(0.0, 0.0), pos2(100.0, 0.0), shape(0.0, false, false, 1));
        assert!((anchor.x - 38.0).abs() < 1e-4);
    }

    #[test]
    fn parallel_edge_bows_perpendicular() {
        let path = edge_path(pos2(0.0, 0.0), pos2(100.0, 0.0), shape(30.0, false, true, 1));
        let EdgePath::Quadratic { control, .. } = path else {
            panic!("expected a curve, got {path:?}");
        };
        assert!((control.x - 50.0).abs() < 1e-4);
        assert!((control.y - 48.0).abs() < 1e-4);

        let mirrored = edge_path(pos2(0.0, 0.0), pos2(100.0, 0.0), shape(-60.0, false, true, 1));
        let EdgePath::Quadratic { control, .. } = mirrored else {
            panic!("expected a curve");
        };
        assert!(control.y < 0.0);
    }

    #[test]
    fn hub_edge_offset_does_not_scale_with_distance() {
        let near = edge_path(pos2(0.0, 0.0), pos2(10.0, 0.0), shape(20.0, true, true, 5));
        let far = edge_path(pos2(0.0, 0.0), pos2(1000.0, 0.0), shape(20.0, true, true, 5));
        let (EdgePath::Quadratic { control: a, .. }, EdgePath::Quadratic { control: b, .. }) =
            (near, far)
        else {
            panic!("expected curves");
        };
        assert!((a.y - 24.0).abs() < 1e-4);
        assert!((b.y - 24.0).abs() < 1e-4);
    }

    #[test]
    fn label_sits_on_the_curve_near_the_source() {
        let start = pos2(0.0, 0.0);
        let end = pos2(200.0, 0.0);
        let multi = shape(30.0, false, true, 1);

        let anchor = label_anchor(start, end, multi);
        let path = edge_path(start, end, multi);
        let on_curve = path.point_at(LABEL_BIAS_MULTI);
        assert!((anchor - on_curve).length() < 1e-3);
        assert!(anchor.x < 100.0);

        let hub = shape(20.0, true, true, 4);
        let hub_anchor = label_anchor(start, end, hub);
        assert!(hub_anchor.x < anchor.x);
    }

    #[test]
    fn coincident_endpoints_stay_finite() {
        let point = pos2(42.0, 42.0);
        for candidate in [
            shape(0.0, false, false, 1),
            shape(30.0, false, true, 2),
            shape(-25.0, true, true, 6),
        ] {
            let geometry = edge_geometry(point, point, candidate);
            assert_eq!(geometry.path, EdgePath::Point(point));
            assert!(geometry.path.is_finite());
            assert!(geometry.label_anchor.x.is_finite() && geometry.label_anchor.y.is_finite());
            assert!(geometry.path.end_tangent().is_none());
        }
    }

    #[test]
    fn svg_output_matches_path_kind() {
        let line = EdgePath::Line {
            start: pos2(1.0, 2.0),
            end: pos2(3.0, 4.0),
        };
        assert_eq!(line.to_svg(), "M 1 2 L 3 4");
        let curve = EdgePath::Quadratic {
            start: pos2(0.0, 0.0),
            control: pos2(5.0, 5.0),
            end: pos2(10.0, 0.0),
        };
        assert_eq!(curve.to_svg(), "M 0 0 Q 5 5 10 0");
    }
}
