//! Dark palette for the water quality form.

use client_core::Rgb;
use eframe::egui;

pub const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(0x12, 0x12, 0x12);
pub const CARD: egui::Color32 = egui::Color32::from_rgb(0x1E, 0x1E, 0x1E);
pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(0x21, 0x96, 0xF3);
pub const TRACK: egui::Color32 = egui::Color32::from_rgb(0x33, 0x33, 0x33);
pub const TEXT: egui::Color32 = egui::Color32::WHITE;
pub const TEXT_MUTED: egui::Color32 = egui::Color32::from_rgb(0xB0, 0xB0, 0xB0);
pub const RANGE_TEXT: egui::Color32 = egui::Color32::from_rgb(0x88, 0x88, 0x88);

pub fn color(rgb: Rgb) -> egui::Color32 {
    let Rgb(r, g, b) = rgb;
    egui::Color32::from_rgb(r, g, b)
}

pub fn visuals() -> egui::Visuals {
    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = BACKGROUND;
    visuals.window_fill = CARD;
    visuals.extreme_bg_color = BACKGROUND;
    visuals.selection.bg_fill = ACCENT;
    visuals.hyperlink_color = ACCENT;
    visuals.override_text_color = Some(TEXT);
    visuals
}
