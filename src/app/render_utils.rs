use eframe::egui::epaint::QuadraticBezierShape;
use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2, vec2};

use hearing_graph::geometry::EdgePath;

const ARROW_LENGTH: f32 = 9.0;
const ARROW_HALF_WIDTH: f32 = 4.5;
const EDGE_SAMPLES: usize = 16;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(15, 19, 26));

    let step = (64.0 * zoom.clamp(0.6, 1.8)).max(24.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 60));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Layout coordinates span the viewport with its center at `rect.center()`
/// when unpanned and unzoomed.
pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + (world - rect.size() * 0.5) * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom + rect.size() * 0.5
}

/// Maps a layout-space path into screen space. The transform is affine, so
/// control points map directly.
pub(super) fn path_to_screen(rect: Rect, pan: Vec2, zoom: f32, path: EdgePath) -> EdgePath {
    let map = |point: Pos2| world_to_screen(rect, pan, zoom, point.to_vec2());
    match path {
        EdgePath::Point(point) => EdgePath::Point(map(point)),
        EdgePath::Line { start, end } => EdgePath::Line {
            start: map(start),
            end: map(end),
        },
        EdgePath::Quadratic {
            start,
            control,
            end,
        } => EdgePath::Quadratic {
            start: map(start),
            control: map(control),
            end: map(end),
        },
    }
}

pub(super) fn path_visible(rect: Rect, path: &EdgePath, padding: f32) -> bool {
    let bounds = match *path {
        EdgePath::Point(point) => Rect::from_center_size(point, Vec2::ZERO),
        EdgePath::Line { start, end } => Rect::from_two_pos(start, end),
        EdgePath::Quadratic {
            start,
            control,
            end,
        } => Rect::from_two_pos(start, end).union(Rect::from_center_size(control, Vec2::ZERO)),
    };
    rect.intersects(bounds.expand(padding))
}

pub(super) fn draw_edge_path(painter: &Painter, path: &EdgePath, stroke: Stroke) {
    match *path {
        EdgePath::Point(_) => {}
        EdgePath::Line { start, end } => {
            painter.line_segment([start, end], stroke);
        }
        EdgePath::Quadratic {
            start,
            control,
            end,
        } => {
            painter.add(QuadraticBezierShape::from_points_stroke(
                [start, control, end],
                false,
                Color32::TRANSPARENT,
                stroke,
            ));
        }
    }
}

/// Arrowhead whose tip touches the target circle.
pub(super) fn draw_arrowhead(painter: &Painter, path: &EdgePath, target_radius: f32, color: Color32) {
    let Some(direction) = path.end_tangent() else {
        return;
    };

    let tip = path.end() - direction * target_radius;
    let base = tip - direction * ARROW_LENGTH;
    let normal = vec2(-direction.y, direction.x) * ARROW_HALF_WIDTH;
    painter.add(Shape::convex_polygon(
        vec![tip, base + normal, base - normal],
        color,
        Stroke::NONE,
    ));
}

/// Approximate screen distance from `point` to the path.
pub(super) fn distance_to_path(path: &EdgePath, point: Pos2) -> f32 {
    if let EdgePath::Point(anchor) = *path {
        return anchor.distance(point);
    }

    let mut best = f32::INFINITY;
    let mut previous = path.start();
    for step in 1..=EDGE_SAMPLES {
        let next = path.point_at(step as f32 / EDGE_SAMPLES as f32);
        best = best.min(distance_to_segment(previous, next, point));
        previous = next;
    }
    best
}

fn distance_to_segment(start: Pos2, end: Pos2, point: Pos2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return start.distance(point);
    }
    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    (start + segment * t).distance(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    #[test]
    fn screen_round_trip_under_pan_and_zoom() {
        let rect = Rect::from_min_size(pos2(100.0, 50.0), vec2(800.0, 600.0));
        let pan = vec2(-35.0, 12.0);
        let world = vec2(130.0, 470.0);
        let screen = world_to_screen(rect, pan, 1.7, world);
        assert!((screen_to_world(rect, pan, 1.7, screen) - world).length() < 1e-3);
        assert_eq!(world_to_screen(rect, Vec2::ZERO, 1.0, rect.size() * 0.5), rect.center());
    }

    #[test]
    fn distance_to_straight_path() {
        let path = EdgePath::Line {
            start: pos2(0.0, 0.0),
            end: pos2(100.0, 0.0),
        };
        assert!((distance_to_path(&path, pos2(50.0, 7.0)) - 7.0).abs() < 1e-3);
        assert!((distance_to_path(&path, pos2(-3.0, 4.0)) - 5.0).abs() < 1e-3);
    }
}
