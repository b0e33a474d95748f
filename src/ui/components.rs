//! Reusable UI components
//!
//! Standalone helpers used by the main render loop.

use crate::theme;
use crate::types::FlashKind;
use eframe::egui;

/// Availability line for an activity card.
pub fn spots_left_text(spots: i64) -> String {
    format!("{} spots left", spots)
}

/// Color for the availability line: green while open, amber when nearly
/// full, red at or over capacity.
pub fn availability_color(spots: i64) -> egui::Color32 {
    if spots <= 0 {
        theme::STATUS_ERROR
    } else if spots <= 3 {
        theme::STATUS_WARNING
    } else {
        theme::STATUS_SUCCESS
    }
}

/// Banner frame for the transient flash message.
pub fn flash_frame(kind: FlashKind) -> egui::Frame {
    let (fill, stroke) = match kind {
        FlashKind::Success => (
            egui::Color32::from_rgba_unmultiplied(0x05, 0x2e, 0x1f, 200),
            theme::STATUS_SUCCESS,
        ),
        FlashKind::Error => (
            egui::Color32::from_rgba_unmultiplied(0x34, 0x0f, 0x0f, 200),
            theme::STATUS_ERROR,
        ),
    };
    egui::Frame::new()
        .fill(fill)
        .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, stroke))
        .corner_radius(theme::RADIUS_DEFAULT)
        .inner_margin(egui::Margin::symmetric(12, 8))
}
