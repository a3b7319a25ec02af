use eframe::egui::{self, Color32, Painter, Pos2, Rect, Response, Stroke, Ui, Vec2};

use crate::scale;

/// Shared camera handling for both graph panes: wheel zoom anchored at the
/// pointer, secondary/middle-button panning.
pub(super) fn handle_camera(
    ui: &Ui,
    rect: Rect,
    response: &Response,
    pan: &mut Vec2,
    zoom: &mut f32,
) {
    if response.hovered() {
        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() > f32::EPSILON {
            let pointer = ui
                .input(|input| input.pointer.hover_pos())
                .unwrap_or_else(|| rect.center());
            let graph_anchor = scale::screen_to_graph_point(rect, *pan, *zoom, pointer);

            let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
            *zoom = (*zoom * zoom_factor).clamp(0.05, 6.0);
            *pan = scale::pan_for_anchor(rect, pointer, graph_anchor, *zoom);
        }
    }

    if response.dragged_by(egui::PointerButton::Secondary)
        || response.dragged_by(egui::PointerButton::Middle)
    {
        *pan += response.drag_delta();
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        color.a(),
    )
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Cheap bounding-box cull for edge segments.
pub(super) fn segment_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

/// Rectangle outline drawn as four segments.
pub(super) fn stroke_rect(painter: &Painter, rect: Rect, stroke: Stroke) {
    painter.line_segment([rect.left_top(), rect.right_top()], stroke);
    painter.line_segment([rect.right_top(), rect.right_bottom()], stroke);
    painter.line_segment([rect.right_bottom(), rect.left_bottom()], stroke);
    painter.line_segment([rect.left_bottom(), rect.left_top()], stroke);
}

pub(super) fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
}
