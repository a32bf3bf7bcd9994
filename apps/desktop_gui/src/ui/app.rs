//! Application shell: owns the session and renders the analysis form.

use chrono::{DateTime, Local};
use client_core::{OutcomePresentation, SessionController, SliderState};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{
    domain::{ParameterKey, SubmissionId},
    protocol::PredictionOutcome,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{
    classify_startup_failure, err_label, UiError, UiErrorContext, UiEvent,
};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::{theme, widgets::ParameterSlider};

pub const APP_TITLE: &str = "Water Quality Analysis";
const SUBTITLE: &str = "Adjust the parameters and analyze water potability";
const SUBMIT_LABEL: &str = "Analyze potability";
const SUBMITTING_LABEL: &str = "Analyzing water...";
const CONNECTION_MODAL_ID: &str = "connection_error_modal";

const ERROR_BANNER_FILL: egui::Color32 = egui::Color32::from_rgb(111, 53, 53);
const ERROR_BANNER_STROKE: egui::Color32 = egui::Color32::from_rgb(175, 96, 96);

pub struct WaterQualityApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    session: SessionController,
    sliders: [SliderState; ParameterKey::ALL.len()],
    status: String,
    error_banner: Option<String>,
    last_resolved_at: Option<DateTime<Local>>,
    applied_theme: bool,
}

impl WaterQualityApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let session = SessionController::new();
        let sliders = ParameterKey::ALL.map(|key| SliderState::new(session.store().get(key)));
        Self {
            cmd_tx,
            ui_rx,
            session,
            sliders,
            status: "Starting...".to_string(),
            error_banner: None,
            last_resolved_at: None,
            applied_theme: false,
        }
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Startup failure shown above the form until dismissed.
    pub fn error_banner(&self) -> Option<&str> {
        self.error_banner.as_deref()
    }

    pub fn request_probe(&mut self) {
        let _ = dispatch_backend_command(&self.cmd_tx, BackendCommand::Probe, &mut self.status);
    }

    pub fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::PredictionResolved {
                    submission,
                    outcome,
                } => self.resolve(submission, outcome),
                UiEvent::Error(err) => {
                    self.status = if err.context() == UiErrorContext::BackendStartup {
                        classify_startup_failure(err.message())
                    } else {
                        format!("{} error: {}", err_label(err.category()), err.message())
                    };
                    if err.context() == UiErrorContext::BackendStartup {
                        self.error_banner = Some(self.status.clone());
                    }
                }
            }
        }
    }

    pub fn set_parameter(&mut self, key: ParameterKey, value: f64) {
        match self.session.edit(key, value) {
            Ok(stored) => self.sliders[key.index()].sync(stored),
            Err(err) => {
                self.sliders[key.index()].sync(self.session.store().get(key));
                self.status = format!("Rejected {key} value: {err}");
            }
        }
    }

    pub fn submit(&mut self) {
        let pending = match self.session.begin_submit() {
            Ok(pending) => pending,
            Err(rejected) => {
                tracing::debug!("submit ignored: {rejected}");
                return;
            }
        };

        self.status = SUBMITTING_LABEL.to_string();
        let cmd = BackendCommand::Predict {
            submission: pending.id,
            snapshot: pending.snapshot,
        };
        if let Err(failure) = dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            tracing::warn!(submission = %pending.id, "could not queue prediction: {}", failure.message());
            self.resolve(
                pending.id,
                PredictionOutcome::TransportError {
                    reason: failure.message().to_string(),
                },
            );
        }
    }

    fn resolve(&mut self, submission: SubmissionId, outcome: PredictionOutcome) {
        let status = match &outcome {
            PredictionOutcome::Potable => "Prediction complete: potable".to_string(),
            PredictionOutcome::NotPotable => "Prediction complete: not potable".to_string(),
            PredictionOutcome::InvalidResponse { reason }
            | PredictionOutcome::TransportError { reason } => {
                let err = UiError::from_message(UiErrorContext::Prediction, reason.clone());
                format!("{} error: {}", err_label(err.category()), err.message())
            }
        };

        if self.session.resolve(submission, outcome) {
            self.status = status;
            self.last_resolved_at = Some(Local::now());
        } else {
            tracing::debug!(%submission, "ignoring stale prediction result");
        }
    }

    fn apply_theme_if_needed(&mut self, ctx: &egui::Context) {
        if self.applied_theme {
            return;
        }
        ctx.set_visuals(theme::visuals());
        self.applied_theme = true;
    }

    fn show_header(&self, ui: &mut egui::Ui) {
        ui.add_space(8.0);
        ui.label(egui::RichText::new(APP_TITLE).size(26.0).strong());
        ui.label(egui::RichText::new(SUBTITLE).color(theme::TEXT_MUTED));
        ui.add_space(12.0);
    }

    fn show_error_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(message) = self.error_banner.clone() {
            egui::Frame::NONE
                .fill(ERROR_BANNER_FILL)
                .stroke(egui::Stroke::new(1.0, ERROR_BANNER_STROKE))
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.error_banner = None;
                            }
                        });
                    });
                });
            ui.add_space(12.0);
        }
    }

    fn show_parameter_card(&mut self, ui: &mut egui::Ui, key: ParameterKey) {
        let descriptor = key.descriptor();
        let value = self.session.store().get(key);
        let slider = &mut self.sliders[key.index()];
        if !slider.is_pressed() {
            slider.sync(value);
        }

        let mut edited = None;
        card_frame().show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(descriptor.display_name).size(16.0).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format_value(value, descriptor.unit))
                            .size(16.0)
                            .strong()
                            .color(theme::ACCENT),
                    );
                });
            });
            ui.add_space(6.0);

            let (_, changed) = ParameterSlider::new(slider, descriptor).show(ui);
            edited = changed;

            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(format_bound(descriptor.min))
                        .small()
                        .color(theme::RANGE_TEXT),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format_bound(descriptor.max))
                            .small()
                            .color(theme::RANGE_TEXT),
                    );
                });
            });
        });
        ui.add_space(10.0);

        if let Some(value) = edited {
            self.set_parameter(key, value);
        }
    }

    fn show_submit_area(&mut self, ui: &mut egui::Ui) {
        ui.add_space(6.0);
        if self.session.is_submitting() {
            ui.horizontal(|ui| {
                ui.add(egui::Spinner::new().size(22.0).color(theme::ACCENT));
                ui.label(egui::RichText::new(SUBMITTING_LABEL).color(theme::TEXT_MUTED));
            });
            return;
        }

        let button = egui::Button::new(egui::RichText::new(SUBMIT_LABEL).size(17.0).strong())
            .fill(theme::ACCENT)
            .corner_radius(10.0);
        if ui
            .add_sized([ui.available_width(), 44.0], button)
            .clicked()
        {
            self.submit();
        }
    }

    fn show_result_panel(&self, ui: &mut egui::Ui) {
        let (Some(outcome), Some(presentation)) =
            (self.session.outcome(), self.session.presentation())
        else {
            return;
        };
        let OutcomePresentation {
            headline,
            description,
            color,
        } = presentation;
        let color = theme::color(color);

        ui.add_space(14.0);
        card_frame()
            .stroke(egui::Stroke::new(2.0, color))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(egui::RichText::new(headline).size(22.0).strong().color(color));
                if let Some(description) = description {
                    ui.label(egui::RichText::new(description).color(theme::TEXT_MUTED));
                }
                if let Some(reason) = outcome.reason() {
                    ui.label(egui::RichText::new(reason).small().color(theme::RANGE_TEXT));
                }
                if let Some(at) = self.last_resolved_at {
                    ui.add_space(4.0);
                    ui.label(
                        egui::RichText::new(format!("Analyzed at {}", at.format("%H:%M:%S")))
                            .small()
                            .color(theme::RANGE_TEXT),
                    );
                }
            });
    }

    fn show_connection_alert(&mut self, ctx: &egui::Context) {
        let Some(notification) = self.session.notification().copied() else {
            return;
        };

        let modal = egui::Modal::new(egui::Id::new(CONNECTION_MODAL_ID)).show(ctx, |ui| {
            ui.set_width(320.0);
            ui.label(egui::RichText::new(notification.title).size(18.0).strong());
            ui.add_space(8.0);
            ui.label(notification.message);
            ui.add_space(12.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.button("OK").clicked()
            })
            .inner
        });

        if modal.inner || modal.should_close() {
            self.session.acknowledge_notification();
        }
    }

    fn show_status_line(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_line").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(&self.status)
                        .small()
                        .color(theme::TEXT_MUTED),
                );
            });
        });
    }
}

impl eframe::App for WaterQualityApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.apply_theme_if_needed(ctx);

        self.show_status_line(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.show_header(ui);
                    self.show_error_banner(ui);
                    for key in ParameterKey::ALL {
                        self.show_parameter_card(ui, key);
                    }
                    self.show_submit_area(ui);
                    self.show_result_panel(ui);
                    ui.add_space(16.0);
                });
        });
        self.show_connection_alert(ctx);

        if self.session.is_submitting() {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

fn card_frame() -> egui::Frame {
    egui::Frame::NONE
        .fill(theme::CARD)
        .corner_radius(12.0)
        .inner_margin(egui::Margin::same(16))
}

pub(crate) fn format_value(value: f64, unit: &str) -> String {
    if unit.is_empty() {
        format!("{value:.2}")
    } else {
        format!("{value:.2} {unit}")
    }
}

fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 {
        format!("{bound:.0}")
    } else {
        bound.to_string()
    }
}
