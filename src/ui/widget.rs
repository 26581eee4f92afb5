use crate::core::{
    geo::{LatLng, Point},
    map::MapHost,
};

const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(0xE6, 0xE6, 0xE6);

/// Result of embedding the map for one frame
pub struct MapResponse {
    pub response: egui::Response,
    /// Geographic coordinate of a completed click on the map surface, if
    /// any. Drags do not produce clicks.
    pub clicked_at: Option<LatLng>,
}

/// Renders the map host into the available space of a `Ui`, handling pan,
/// zoom and click input for the frame.
///
/// The embedding app dispatches `clicked_at` to its layer controllers.
pub fn map_view(ui: &mut egui::Ui, host: &mut MapHost) -> MapResponse {
    let size = ui.available_size();
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());

    if let Err(e) = host.attach(Point::new(rect.width() as f64, rect.height() as f64)) {
        log::warn!("cannot attach map host: {}", e);
        return MapResponse {
            response,
            clicked_at: None,
        };
    }

    let options = host.options().clone();

    if options.dragging && response.dragged() {
        let delta = response.drag_delta();
        if delta != egui::Vec2::ZERO {
            let viewport = host.viewport();
            let center_px = Point::new(
                viewport.size.x / 2.0 - delta.x as f64,
                viewport.size.y / 2.0 - delta.y as f64,
            );
            let new_center = viewport.pixel_to_lat_lng(&center_px);
            let zoom = viewport.zoom;
            host.set_view(new_center, zoom);
        }
    }

    if options.scroll_wheel_zoom && response.hovered() {
        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        if scroll != 0.0 {
            let step = if scroll > 0.0 { 1.0 } else { -1.0 };
            let center = host.viewport().center;
            let zoom = host.viewport().zoom + step;
            host.set_view(center, zoom);
        }
    }

    let mut clicked_at = None;
    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let pixel = Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);
            let lat_lng = host.viewport().pixel_to_lat_lng(&pixel);
            host.emit_click(lat_lng, pixel);
            clicked_at = Some(lat_lng);
        }
    }

    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, BACKGROUND);

    if let Err(e) = host.render(&painter) {
        log::warn!("map render failed: {}", e);
    }

    if options.attribution_control {
        if let Some(attribution) = host.attribution() {
            painter.text(
                rect.right_bottom() - egui::vec2(4.0, 2.0),
                egui::Align2::RIGHT_BOTTOM,
                attribution,
                egui::FontId::proportional(10.0),
                egui::Color32::DARK_GRAY,
            );
        }
    }

    MapResponse {
        response,
        clicked_at,
    }
}

/// Extension trait so apps can write `ui.map_view(&mut host)`
pub trait MapSurfaceExt {
    fn map_view(&mut self, host: &mut MapHost) -> MapResponse;
}

impl MapSurfaceExt for egui::Ui {
    fn map_view(&mut self, host: &mut MapHost) -> MapResponse {
        map_view(self, host)
    }
}
