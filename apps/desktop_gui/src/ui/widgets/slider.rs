//! Custom horizontal slider driven by `client_core::SliderState`.
//!
//! egui only reports pointer state; translating it into press/drag/release
//! and painting the track is all this widget does. Value mapping and
//! quantization live in `client_core::slider`.

use client_core::{PointerInput, SliderState, SliderTrack};
use eframe::egui;
use shared::domain::ParameterDescriptor;

use crate::ui::theme;

const TRACK_HEIGHT: f32 = 6.0;
const THUMB_RADIUS: f32 = 11.0;
const PRESSED_SCALE: f32 = 1.2;

pub struct ParameterSlider<'a> {
    state: &'a mut SliderState,
    descriptor: &'static ParameterDescriptor,
}

impl<'a> ParameterSlider<'a> {
    pub fn new(state: &'a mut SliderState, descriptor: &'static ParameterDescriptor) -> Self {
        Self { state, descriptor }
    }

    /// Returns the response and, when the pointer changed the value, the new value.
    pub fn show(self, ui: &mut egui::Ui) -> (egui::Response, Option<f64>) {
        let desired = egui::vec2(
            ui.available_width(),
            THUMB_RADIUS * PRESSED_SCALE * 2.0 + 4.0,
        );
        let (rect, mut response) = ui.allocate_exact_size(desired, egui::Sense::click_and_drag());
        // Inset so the thumb stays inside the allocation at both ends.
        let track_rect = rect.shrink2(egui::vec2(THUMB_RADIUS * PRESSED_SCALE, 0.0));
        let track = SliderTrack::for_parameter(f64::from(track_rect.width()), self.descriptor);

        let local_x = response
            .interact_pointer_pos()
            .map(|pos| f64::from(pos.x - track_rect.left()));
        let input = pointer_input(
            self.state.is_pressed(),
            response.is_pointer_button_down_on(),
            local_x,
        );
        let previous = self.state.current_value();
        let changed = input
            .and_then(|input| self.state.handle(input, &track))
            .filter(|value| *value != previous);
        if changed.is_some() {
            response.mark_changed();
        }

        if ui.is_rect_visible(rect) {
            paint(ui, track_rect, &track, self.state);
        }

        (response, changed)
    }
}

pub(crate) fn pointer_input(
    was_pressed: bool,
    button_down_on_track: bool,
    local_x: Option<f64>,
) -> Option<PointerInput> {
    match (was_pressed, button_down_on_track, local_x) {
        (false, true, Some(local_x)) => Some(PointerInput::Pressed { local_x }),
        (true, true, Some(local_x)) => Some(PointerInput::Dragged { local_x }),
        (true, true, None) => Some(PointerInput::Cancelled),
        (true, false, _) => Some(PointerInput::Released),
        (false, _, _) => None,
    }
}

fn paint(ui: &egui::Ui, track_rect: egui::Rect, track: &SliderTrack, state: &SliderState) {
    let painter = ui.painter();
    let center_y = track_rect.center().y;
    let bar = egui::Rect::from_min_max(
        egui::pos2(track_rect.left(), center_y - TRACK_HEIGHT / 2.0),
        egui::pos2(track_rect.right(), center_y + TRACK_HEIGHT / 2.0),
    );
    let rounding = egui::CornerRadius::same((TRACK_HEIGHT / 2.0) as u8);
    painter.rect_filled(bar, rounding, theme::TRACK);

    let thumb_x = track_rect.left() + track.thumb_offset(state.current_value()) as f32;
    let mut filled = bar;
    filled.set_right(thumb_x);
    painter.rect_filled(filled, rounding, theme::ACCENT);

    let radius = if state.is_pressed() {
        THUMB_RADIUS * PRESSED_SCALE
    } else {
        THUMB_RADIUS
    };
    painter.circle(
        egui::pos2(thumb_x, center_y),
        radius,
        theme::ACCENT,
        egui::Stroke::new(3.0, theme::TEXT),
    );
}
