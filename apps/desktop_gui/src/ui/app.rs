//! egui shell for the consultation workflow. All decisions live in
//! the controller; this layer only paints state and forwards actions.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{RiskLevel, SymptomId};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::{
    BannerSeverity, CatalogStatus, ConsultationController, Phase,
};
use crate::ui::view_model::{
    build_explanation_table, build_results_view, build_rules_table, AccentColor, DiagnosisBlock,
    ResultsView,
};

pub struct ConsultApp {
    controller: ConsultationController,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
}

impl ConsultApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            controller: ConsultationController::new(),
            cmd_tx,
            ui_rx,
        };
        app.dispatch(BackendCommand::LoadCatalog);
        app
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        if let Err(message) = dispatch_backend_command(&self.cmd_tx, cmd) {
            self.controller
                .raise(message, BannerSeverity::Error, Instant::now());
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.controller.apply(event, Instant::now());
        }
    }

    fn accent_fill(accent: AccentColor) -> egui::Color32 {
        match accent {
            AccentColor::Blue => egui::Color32::from_rgb(59, 130, 196),
            AccentColor::Gray => egui::Color32::from_rgb(108, 117, 125),
            AccentColor::Green => egui::Color32::from_rgb(64, 145, 108),
            AccentColor::Amber => egui::Color32::from_rgb(196, 148, 48),
            AccentColor::Teal => egui::Color32::from_rgb(50, 140, 140),
        }
    }

    fn risk_color(risk: RiskLevel) -> egui::Color32 {
        match risk {
            RiskLevel::Low => egui::Color32::from_rgb(80, 160, 90),
            RiskLevel::Medium => egui::Color32::from_rgb(200, 160, 40),
            RiskLevel::High => egui::Color32::from_rgb(200, 90, 60),
            RiskLevel::Critical => egui::Color32::from_rgb(190, 40, 40),
            RiskLevel::Unknown => egui::Color32::GRAY,
        }
    }

    fn show_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = self.controller.banner.clone() else {
            return;
        };
        let (fill, stroke) = match banner.severity {
            BannerSeverity::Info => (
                egui::Color32::from_rgb(40, 60, 90),
                egui::Color32::from_rgb(90, 120, 170),
            ),
            BannerSeverity::Warning => (
                egui::Color32::from_rgb(95, 80, 30),
                egui::Color32::from_rgb(170, 140, 60),
            ),
            BannerSeverity::Error => (
                egui::Color32::from_rgb(111, 53, 53),
                egui::Color32::from_rgb(175, 96, 96),
            ),
        };
        egui::Frame::NONE
            .fill(fill)
            .stroke(egui::Stroke::new(1.0, stroke))
            .corner_radius(egui::CornerRadius::same(4))
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&banner.text).color(egui::Color32::WHITE));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("Dismiss").clicked() {
                            self.controller.dismiss_banner();
                        }
                    });
                });
            });
        ui.add_space(6.0);
    }

    fn show_selecting(&mut self, ui: &mut egui::Ui) {
        if let CatalogStatus::Failed(_) = self.controller.catalog_status {
            ui.label("The symptom catalog could not be loaded.");
            if ui.button("Retry").clicked() {
                let cmd = self.controller.retry_catalog();
                self.dispatch(cmd);
            }
            return;
        }
        if self.controller.catalog_status == CatalogStatus::Loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading symptom catalog...");
            });
            return;
        }

        ui.horizontal(|ui| {
            ui.label("Search:");
            ui.add(
                egui::TextEdit::singleline(&mut self.controller.catalog.query)
                    .hint_text("filter by id or name")
                    .desired_width(240.0),
            );
            ui.separator();
            ui.label(format!("{} selected", self.controller.selection.len()));
        });
        ui.add_space(4.0);

        // Snapshot the filtered view before mutating the selection.
        let rows: Vec<(SymptomId, String, bool)> = self
            .controller
            .catalog
            .filtered()
            .into_iter()
            .map(|s| {
                let selected = self.controller.selection.contains(&s.id);
                (s.id.clone(), format!("{}: {}", s.id, s.name), selected)
            })
            .collect();

        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 48.0)
            .show(ui, |ui| {
                for (id, label, selected) in rows {
                    let mut checked = selected;
                    if ui.checkbox(&mut checked, label).changed() {
                        self.controller.toggle_symptom(id, checked);
                    }
                }
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let run = ui.add_enabled(
                self.controller.run_enabled(),
                egui::Button::new("Run diagnosis"),
            );
            if run.clicked() {
                if let Some(cmd) = self.controller.start_diagnosis(Instant::now()) {
                    self.dispatch(cmd);
                }
            }
            if ui.button("Reset").clicked() {
                self.controller.reset_selection();
            }
            if ui.button("Knowledge base").clicked() {
                if let Some(cmd) = self.controller.open_rules() {
                    self.dispatch(cmd);
                }
            }
        });
    }

    fn show_submitting(&self, ui: &mut egui::Ui) {
        ui.add_space(40.0);
        ui.vertical_centered(|ui| {
            ui.spinner();
            ui.add_space(8.0);
            ui.label("Running diagnosis...");
        });
    }

    fn show_presenting(&mut self, ui: &mut egui::Ui) {
        let Some(view) = self.controller.response.as_ref().map(build_results_view) else {
            // Presenting without a response is unreachable via the
            // state machine; recover by starting over.
            self.controller.new_consultation();
            return;
        };

        match view {
            ResultsView::NoMatch { title, detail } => {
                ui.add_space(24.0);
                ui.vertical_centered(|ui| {
                    ui.heading(&title);
                    ui.label(&detail);
                });
            }
            ResultsView::Ranked {
                summary,
                blocks,
                has_reasoning,
            } => {
                ui.label(&summary);
                ui.add_space(6.0);
                egui::ScrollArea::vertical()
                    .max_height(ui.available_height() - 48.0)
                    .show(ui, |ui| {
                        for block in &blocks {
                            Self::show_diagnosis_block(ui, block);
                            ui.add_space(10.0);
                        }
                    });
                if has_reasoning && ui.button("Show reasoning").clicked() {
                    self.controller.show_reasoning = true;
                }
            }
        }

        ui.add_space(8.0);
        if ui.button("New diagnosis").clicked() {
            self.controller.new_consultation();
        }
    }

    fn show_diagnosis_block(ui: &mut egui::Ui, block: &DiagnosisBlock) {
        let accent = Self::accent_fill(block.accent);
        egui::Frame::group(ui.style())
            .stroke(egui::Stroke::new(1.2, accent))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(&block.name);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(&block.confidence_label)
                                .strong()
                                .color(accent),
                        );
                    });
                });
                if !block.description.is_empty() {
                    ui.label(&block.description);
                }
                ui.add_space(4.0);

                ui.add(
                    egui::ProgressBar::new(block.confidence_fraction)
                        .text(&block.confidence_label)
                        .fill(accent),
                );

                // Risk and confidence are sibling fields by design.
                ui.horizontal(|ui| {
                    ui.label("Risk level:");
                    ui.label(
                        egui::RichText::new(&block.risk_label)
                            .strong()
                            .color(Self::risk_color(block.risk)),
                    );
                    if !block.maintenance_time.is_empty() {
                        ui.separator();
                        ui.label(format!("Estimated maintenance: {}", block.maintenance_time));
                    }
                });

                if !block.causes.is_empty() {
                    ui.add_space(4.0);
                    ui.label(egui::RichText::new("Possible causes").strong());
                    for cause in &block.causes {
                        ui.label(format!("• {cause}"));
                    }
                }
                if !block.solutions.is_empty() {
                    ui.add_space(4.0);
                    ui.label(egui::RichText::new("Solutions & recommendations").strong());
                    for (idx, solution) in block.solutions.iter().enumerate() {
                        ui.label(format!("Step {}: {}", idx + 1, solution));
                    }
                }
                if !block.tools_required.is_empty() {
                    ui.add_space(4.0);
                    ui.label(egui::RichText::new("Tools required").strong());
                    ui.horizontal_wrapped(|ui| {
                        for tool in &block.tools_required {
                            ui.label(format!("[{tool}]"));
                        }
                    });
                }
            });
    }

    fn show_reasoning_window(&mut self, ctx: &egui::Context) {
        if !self.controller.show_reasoning {
            return;
        }
        let table = self
            .controller
            .response
            .as_ref()
            .map(|r| build_explanation_table(&r.reasoning))
            .unwrap_or(crate::ui::view_model::ExplanationTable { rows: vec![] });

        let mut open = self.controller.show_reasoning;
        egui::Window::new("Reasoning trace")
            .open(&mut open)
            .resizable(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    egui::Grid::new("reasoning_grid")
                        .striped(true)
                        .min_col_width(60.0)
                        .show(ui, |ui| {
                            ui.label(egui::RichText::new("Rule").strong());
                            ui.label(egui::RichText::new("Description").strong());
                            ui.label(egui::RichText::new("Evidence").strong());
                            ui.label(egui::RichText::new("Conclusion").strong());
                            ui.label(egui::RichText::new("CF").strong());
                            ui.end_row();
                            for row in &table.rows {
                                ui.label(egui::RichText::new(&row.rule_id).strong());
                                ui.label(&row.description);
                                ui.label(&row.evidence);
                                ui.label(&row.conclusion);
                                ui.label(&row.cf_percent);
                                ui.end_row();
                            }
                        });
                });
            });
        self.controller.show_reasoning = open;
    }

    fn show_rules_window(&mut self, ctx: &egui::Context) {
        if !self.controller.show_rules {
            return;
        }
        let table = self
            .controller
            .rules
            .as_deref()
            .map(build_rules_table)
            .unwrap_or(crate::ui::view_model::RulesTable { rows: vec![] });

        let mut open = self.controller.show_rules;
        egui::Window::new("Knowledge base")
            .open(&mut open)
            .resizable(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    egui::Grid::new("rules_grid")
                        .striped(true)
                        .min_col_width(60.0)
                        .show(ui, |ui| {
                            ui.label(egui::RichText::new("Rule").strong());
                            ui.label(egui::RichText::new("Description").strong());
                            ui.label(egui::RichText::new("Conditions").strong());
                            ui.label(egui::RichText::new("Conclusion").strong());
                            ui.label(egui::RichText::new("CF").strong());
                            ui.end_row();
                            for row in &table.rows {
                                ui.label(egui::RichText::new(&row.id).strong());
                                ui.label(&row.description);
                                ui.label(&row.conditions);
                                ui.label(&row.conclusion);
                                ui.label(&row.cf_percent);
                                ui.end_row();
                            }
                        });
                });
            });
        self.controller.show_rules = open;
    }
}

impl eframe::App for ConsultApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        self.controller.tick(Instant::now());
        if self.controller.banner.is_some() || self.controller.phase == Phase::Submitting {
            // Keep painting while waiting on the worker or a banner TTL.
            ctx.request_repaint_after(Duration::from_millis(250));
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.heading("Machine Fault Consultation");
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_banner(ui);
            match self.controller.phase {
                Phase::Selecting => self.show_selecting(ui),
                Phase::Submitting => self.show_submitting(ui),
                Phase::Presenting => self.show_presenting(ui),
            }
        });

        self.show_reasoning_window(ctx);
        self.show_rules_window(ctx);
    }
}
