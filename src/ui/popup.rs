use crate::core::{geo::LatLng, viewport::Viewport};
use crate::prelude::HashMap;
use egui::{Color32, FontId};

#[derive(Debug, Clone)]
pub struct PopupStyle {
    pub background_color: Color32,
    pub border_color: Color32,
    pub border_width: f32,
    pub rounding: f32,
    pub padding: f32,
    pub font_id: FontId,
    pub text_color: Color32,
    pub max_width: f32,
}

impl Default for PopupStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::WHITE,
            border_color: Color32::GRAY,
            border_width: 1.0,
            rounding: 4.0,
            padding: 8.0,
            font_id: FontId::proportional(12.0),
            text_color: Color32::BLACK,
            max_width: 300.0,
        }
    }
}

/// Overlay anchored to a geographic coordinate, showing feature details
pub struct Popup {
    pub id: String,
    pub position: LatLng,
    pub content: String,
    pub visible: bool,
    pub style: PopupStyle,
}

impl Popup {
    pub fn new(id: String, position: LatLng, content: String) -> Self {
        Self {
            id,
            position,
            content,
            visible: false,
            style: PopupStyle::default(),
        }
    }

    pub fn with_style(mut self, style: PopupStyle) -> Self {
        self.style = style;
        self
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Renders the popup box with its anchor tip at `anchor`
    pub fn render_at_screen_pos(&self, painter: &egui::Painter, anchor: egui::Pos2) {
        if !self.visible {
            return;
        }

        let galley = painter.layout_no_wrap(
            self.content.clone(),
            self.style.font_id.clone(),
            self.style.text_color,
        );
        let text_size = galley.size();

        let popup_size = egui::vec2(
            (text_size.x + self.style.padding * 2.0).min(self.style.max_width),
            text_size.y + self.style.padding * 2.0,
        );

        // Box sits above the anchor point, horizontally centered
        let popup_rect = egui::Rect::from_min_size(
            egui::pos2(anchor.x - popup_size.x / 2.0, anchor.y - popup_size.y - 12.0),
            popup_size,
        );

        painter.rect_filled(popup_rect, self.style.rounding, self.style.background_color);
        painter.rect_stroke(
            popup_rect,
            self.style.rounding,
            egui::Stroke::new(self.style.border_width, self.style.border_color),
        );
        painter.galley(
            popup_rect.min + egui::vec2(self.style.padding, self.style.padding),
            galley,
            self.style.text_color,
        );
    }
}

/// Holds one popup overlay per controller, keyed by the controller's layer ID
pub struct PopupManager {
    popups: HashMap<String, Popup>,
}

impl PopupManager {
    pub fn new() -> Self {
        Self {
            popups: HashMap::default(),
        }
    }

    /// Opens (or moves) the popup with the given ID
    pub fn show_text(&mut self, id: &str, position: LatLng, content: String) {
        let mut popup = Popup::new(id.to_string(), position, content);
        popup.show();
        self.popups.insert(id.to_string(), popup);
    }

    /// Hides the popup with the given ID, if present
    pub fn hide(&mut self, id: &str) {
        if let Some(popup) = self.popups.get_mut(id) {
            popup.hide();
        }
    }

    pub fn get(&self, id: &str) -> Option<&Popup> {
        self.popups.get(id)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.popups.get(id).map(|p| p.visible).unwrap_or(false)
    }

    pub fn visible_count(&self) -> usize {
        self.popups.values().filter(|p| p.visible).count()
    }

    pub fn clear(&mut self) {
        self.popups.clear();
    }

    /// Renders all visible popups anchored at their geographic positions
    pub fn render(&self, painter: &egui::Painter, viewport: &Viewport) {
        let origin = painter.clip_rect().min;
        for popup in self.popups.values() {
            if popup.visible {
                let px = viewport.lat_lng_to_pixel(&popup.position);
                let anchor = egui::pos2(origin.x + px.x as f32, origin.y + px.y as f32);
                popup.render_at_screen_pos(painter, anchor);
            }
        }
    }
}

impl Default for PopupManager {
    fn default() -> Self {
        Self::new()
    }
}
