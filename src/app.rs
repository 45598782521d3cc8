//! Main application state and UI

use eframe::egui;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

use primer_qc::{
    parse_primer_fasta, run_screening, Primer, PrimerReport, ProgressUpdate, ScreenParams,
    ScreeningResults, ThreadCount, ThresholdKey, Thresholds,
};

/// Application state
pub struct PrimerQcApp {
    // Input tab state
    primer_input: String,
    primers: Option<Vec<Primer>>,
    primer_error: Option<String>,

    // Threshold tab state
    thresholds: Thresholds,
    threshold_error: Option<String>,

    // Screening parameters
    thread_selection: ThreadSelection,
    manual_thread_count: usize,

    // Screening state
    is_screening: bool,
    screening_progress: Option<ProgressUpdate>,
    progress_rx: Option<Receiver<ProgressUpdate>>,
    results_rx: Option<Receiver<ScreeningResults>>,

    // Results state
    results: Option<ScreeningResults>,
    rank_by_score: bool,
    selected_report: Option<usize>,
    show_detail_window: bool,

    // View state
    current_tab: Tab,

    // Save/Load
    save_error: Option<String>,
    load_error: Option<String>,

    // Deferred actions
    pending_save: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Input,
    Thresholds,
    Screening,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThreadSelection {
    Auto,
    Manual,
}

impl Default for PrimerQcApp {
    fn default() -> Self {
        let available_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            primer_input: String::new(),
            primers: None,
            primer_error: None,
            thresholds: Thresholds::new(),
            threshold_error: None,
            thread_selection: ThreadSelection::Auto,
            manual_thread_count: available_threads,
            is_screening: false,
            screening_progress: None,
            progress_rx: None,
            results_rx: None,
            results: None,
            rank_by_score: true,
            selected_report: None,
            show_detail_window: false,
            current_tab: Tab::Input,
            save_error: None,
            load_error: None,
            pending_save: false,
        }
    }
}

impl PrimerQcApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::default()
    }

    fn parse_primer_input(&mut self) {
        self.primer_error = None;
        self.primers = None;

        if self.primer_input.trim().is_empty() {
            return;
        }

        match parse_primer_fasta(&self.primer_input) {
            Ok(primers) => {
                self.primers = Some(primers);
            }
            Err(e) => {
                self.primer_error = Some(e.to_string());
            }
        }
    }

    fn start_screening(&mut self) {
        let Some(primers) = &self.primers else {
            return;
        };

        let params = ScreenParams {
            thresholds: self.thresholds.clone(),
            thread_count: match self.thread_selection {
                ThreadSelection::Auto => ThreadCount::Auto,
                ThreadSelection::Manual => ThreadCount::Fixed(self.manual_thread_count),
            },
        };
        let primers_clone = primers.clone();

        let (progress_tx, progress_rx) = channel();
        let (results_tx, results_rx) = channel();

        self.progress_rx = Some(progress_rx);
        self.results_rx = Some(results_rx);
        self.is_screening = true;
        self.screening_progress = None;

        thread::spawn(move || {
            let results = run_screening(&primers_clone, &params, Some(progress_tx));
            let _ = results_tx.send(results);
        });
    }

    fn check_screening_progress(&mut self) {
        if let Some(rx) = &self.progress_rx {
            while let Ok(progress) = rx.try_recv() {
                self.screening_progress = Some(progress);
            }
        }

        if let Some(rx) = &self.results_rx {
            if let Ok(results) = rx.try_recv() {
                self.results = Some(results);
                self.selected_report = None;
                self.show_detail_window = false;
                self.is_screening = false;
                self.progress_rx = None;
                self.results_rx = None;
                self.current_tab = Tab::Results;
            }
        }
    }

    fn save_results(&mut self) {
        let Some(results) = &self.results else {
            self.save_error = Some("No results to save".to_string());
            return;
        };

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("primer_scores.json")
            .save_file()
        {
            match serde_json::to_string_pretty(results) {
                Ok(json) => {
                    if let Err(e) = std::fs::write(&path, json) {
                        self.save_error = Some(format!("Failed to write file: {}", e));
                    } else {
                        self.save_error = None;
                    }
                }
                Err(e) => {
                    self.save_error = Some(format!("Failed to serialize: {}", e));
                }
            }
        }
    }

    fn load_results(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            match std::fs::read_to_string(&path) {
                Ok(json) => match serde_json::from_str::<ScreeningResults>(&json) {
                    Ok(results) => {
                        self.results = Some(results);
                        self.selected_report = None;
                        self.load_error = None;
                        self.current_tab = Tab::Results;
                    }
                    Err(e) => {
                        self.load_error = Some(format!("Failed to parse: {}", e));
                    }
                },
                Err(e) => {
                    self.load_error = Some(format!("Failed to read file: {}", e));
                }
            }
        }
    }

    fn load_primer_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("FASTA", &["fasta", "fa", "fas", "txt"])
            .pick_file()
        {
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    self.primer_input = content;
                    self.parse_primer_input();
                }
                Err(e) => {
                    self.primer_error = Some(format!("Failed to read file: {}", e));
                }
            }
        }
    }

    fn load_threshold_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            match Thresholds::load(&path) {
                Ok(thresholds) => {
                    self.thresholds = thresholds;
                    self.threshold_error = None;
                }
                Err(e) => {
                    self.threshold_error = Some(e.to_string());
                }
            }
        }
    }

    fn save_threshold_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("variables.json")
            .save_file()
        {
            let written = self
                .thresholds
                .to_json_string()
                .map_err(|e| e.to_string())
                .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
            self.threshold_error = written.err();
        }
    }
}

impl eframe::App for PrimerQcApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.is_screening {
            self.check_screening_progress();
            ctx.request_repaint();
        }

        if self.pending_save {
            self.pending_save = false;
            self.save_results();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Load Primers...").clicked() {
                        self.load_primer_file();
                        ui.close_menu();
                    }
                    if ui.button("Load Thresholds...").clicked() {
                        self.load_threshold_file();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Load Results...").clicked() {
                        self.load_results();
                        ui.close_menu();
                    }
                    if ui.button("Save Results...").clicked() {
                        self.save_results();
                        ui.close_menu();
                    }
                });
            });
        });

        // Tab bar
        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.current_tab, Tab::Input, "Primers");
                ui.selectable_value(&mut self.current_tab, Tab::Thresholds, "Thresholds");
                ui.selectable_value(&mut self.current_tab, Tab::Screening, "Screening");
                ui.selectable_value(&mut self.current_tab, Tab::Results, "Results");
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.is_screening {
                    ui.spinner();
                    if let Some(ref progress) = self.screening_progress {
                        ui.label(&progress.message);
                    } else {
                        ui.label("Starting screen...");
                    }
                } else if let Some(ref results) = self.results {
                    ui.label(format!(
                        "Results: {}/{} primers scored",
                        results.scored_count(),
                        results.reports.len()
                    ));
                } else {
                    let mut parts = Vec::new();
                    if let Some(ref primers) = self.primers {
                        parts.push(format!("Primers: {}", primers.len()));
                    }
                    let missing = self.thresholds.missing_keys().len();
                    if missing > 0 {
                        parts.push(format!("{} thresholds not set", missing));
                    }
                    if parts.is_empty() {
                        ui.label("Load primers and thresholds to begin");
                    } else {
                        ui.label(parts.join(" | "));
                    }
                }
            });
        });

        // Main content
        egui::CentralPanel::default().show(ctx, |ui| match self.current_tab {
            Tab::Input => self.show_input_tab(ui),
            Tab::Thresholds => self.show_thresholds_tab(ui),
            Tab::Screening => self.show_screening_tab(ui),
            Tab::Results => self.show_results_tab(ui),
        });

        // Detail window
        if self.show_detail_window {
            self.show_primer_detail_window(ctx);
        }
    }
}

impl PrimerQcApp {
    fn show_input_tab(&mut self, ui: &mut egui::Ui) {
        ui.heading("Primers");
        ui.separator();

        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.heading("Primer Sequences");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Clear").clicked() {
                        self.primer_input.clear();
                        self.primers = None;
                        self.primer_error = None;
                    }
                    if ui.button("Load File").clicked() {
                        self.load_primer_file();
                    }
                    if ui.button("Load Example").clicked() {
                        self.primer_input = EXAMPLE_PRIMERS.to_string();
                        self.parse_primer_input();
                    }
                });
            });

            ui.label("FASTA (optional strand after the name, e.g. '>P1 reverse') or one 'name sequence [strand]' per line:");

            let panel_height = (ui.available_height() - 60.0).max(120.0);
            egui::ScrollArea::vertical()
                .id_salt("primer_scroll")
                .max_height(panel_height)
                .show(ui, |ui| {
                    let response = ui.add(
                        egui::TextEdit::multiline(&mut self.primer_input)
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY)
                            .desired_rows(12),
                    );
                    if response.changed() {
                        self.parse_primer_input();
                    }
                });

            if let Some(ref error) = self.primer_error {
                ui.colored_label(egui::Color32::RED, format!("Error: {}", error));
            }
            if let Some(ref primers) = self.primers {
                let invalid = primers.iter().filter(|p| !p.primer_qc_check()).count();
                ui.colored_label(
                    egui::Color32::from_rgb(100, 200, 100),
                    format!("Primers: {}", primers.len()),
                );
                if invalid > 0 {
                    ui.colored_label(
                        egui::Color32::YELLOW,
                        format!("{} primer(s) contain symbols other than A, C, G, T", invalid),
                    );
                }
            }
        });
    }

    fn show_thresholds_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Scoring Thresholds");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Clear").clicked() {
                    self.thresholds = Thresholds::new();
                }
                if ui.button("Save File").clicked() {
                    self.save_threshold_file();
                }
                if ui.button("Load File").clicked() {
                    self.load_threshold_file();
                }
                if ui.button("Load Example").clicked() {
                    self.thresholds = Thresholds::reference();
                    self.threshold_error = None;
                }
            });
        });
        ui.separator();

        ui.group(|ui| {
            egui::Grid::new("threshold_grid")
                .num_columns(2)
                .spacing([20.0, 6.0])
                .striped(true)
                .show(ui, |ui| {
                    for key in ThresholdKey::ALL {
                        ui.label(key.label());
                        match self.thresholds.get(key) {
                            Some(mut value) => {
                                ui.horizontal(|ui| {
                                    if ui
                                        .add(egui::DragValue::new(&mut value).speed(0.5).range(0.0..=1000.0))
                                        .changed()
                                    {
                                        self.thresholds.set(key, value);
                                    }
                                    if ui.small_button("Unset").clicked() {
                                        self.thresholds.remove(key);
                                    }
                                });
                            }
                            None => {
                                if ui.button("Set").clicked() {
                                    self.thresholds.set(key, 0.0);
                                }
                            }
                        }
                        ui.end_row();
                    }
                });
        });

        ui.add_space(5.0);
        ui.label("Length, GC and Tm windows include the lower bound and exclude the upper bound; values are truncated to whole numbers before comparison.");

        let missing = self.thresholds.missing_keys();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|k| k.as_str()).collect();
            ui.colored_label(
                egui::Color32::YELLOW,
                format!("Not set (primers cannot be scored): {}", names.join(", ")),
            );
        }
        if let Some(ref error) = self.threshold_error {
            ui.colored_label(egui::Color32::RED, format!("Error: {}", error));
        }
    }

    fn show_screening_tab(&mut self, ui: &mut egui::Ui) {
        ui.heading("Screening");
        ui.separator();

        let has_primers = self.primers.is_some();
        if !has_primers {
            ui.colored_label(
                egui::Color32::YELLOW,
                "Please load primer sequences in the Primers tab.",
            );
            return;
        }

        // Thread count
        ui.group(|ui| {
            ui.heading("Parallelization");

            let available_threads = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1);

            ui.horizontal(|ui| {
                ui.radio_value(
                    &mut self.thread_selection,
                    ThreadSelection::Auto,
                    format!("Auto ({} threads)", available_threads),
                );
            });

            ui.horizontal(|ui| {
                ui.radio_value(&mut self.thread_selection, ThreadSelection::Manual, "Manual:");
                let enabled = self.thread_selection == ThreadSelection::Manual;
                ui.add_enabled(
                    enabled,
                    egui::DragValue::new(&mut self.manual_thread_count)
                        .range(1..=available_threads.max(32)),
                );
                ui.label("threads");
            });
        });

        ui.add_space(10.0);

        let missing = self.thresholds.missing_keys().len();
        if missing > 0 {
            ui.colored_label(
                egui::Color32::YELLOW,
                format!(
                    "{} threshold(s) not set: properties will be reported without a score.",
                    missing
                ),
            );
        }

        ui.add_space(10.0);

        ui.horizontal(|ui| {
            let can_run = has_primers && !self.is_screening;
            if ui
                .add_enabled(can_run, egui::Button::new("Run Screening"))
                .clicked()
            {
                self.start_screening();
            }

            if self.is_screening {
                ui.spinner();
                if let Some(ref progress) = self.screening_progress {
                    ui.label(&progress.message);
                }
            }
        });
    }

    fn show_results_tab(&mut self, ui: &mut egui::Ui) {
        let Some(results) = self.results.as_ref() else {
            ui.heading("Results");
            ui.separator();
            ui.label("No results yet. Run a screen from the Screening tab.");
            return;
        };

        let mut open_detail: Option<usize> = None;
        let mut request_save = false;

        ui.horizontal(|ui| {
            ui.heading("Results");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Save Results").clicked() {
                    request_save = true;
                }
                ui.checkbox(&mut self.rank_by_score, "Rank by score");
            });
        });
        ui.separator();

        let rows: Vec<(usize, &PrimerReport)> = if self.rank_by_score {
            results.ranked()
        } else {
            results.reports.iter().enumerate().collect()
        };

        egui::ScrollArea::both().id_salt("results_scroll").show(ui, |ui| {
            egui::Grid::new("results_grid")
                .num_columns(11)
                .spacing([14.0, 4.0])
                .striped(true)
                .show(ui, |ui| {
                    for header in [
                        "Name", "Strand", "Length", "GC %", "Tm °C", "3' G/C", "Homopolymer",
                        "Hairpin %", "Self-dimer %", "QC", "Score",
                    ] {
                        ui.strong(header);
                    }
                    ui.end_row();

                    for (index, report) in rows {
                        if ui
                            .selectable_label(self.selected_report == Some(index), report.primer.name())
                            .clicked()
                        {
                            open_detail = Some(index);
                        }
                        ui.label(report.primer.orientation().as_str());
                        ui.label(report.length.to_string());
                        ui.label(format_optional(report.gc_percentage));
                        ui.label(format!("{:.2}", report.melting_temperature));
                        ui.label(if report.last_base_is_gc { "yes" } else { "no" });
                        ui.label(report.homopolymer_run.to_string());
                        ui.label(format_optional(report.hairpin_score));
                        ui.label(format_optional(report.self_dimer_score));
                        if report.passes_qc {
                            ui.colored_label(egui::Color32::from_rgb(100, 200, 100), "ok");
                        } else {
                            ui.colored_label(egui::Color32::YELLOW, "invalid");
                        }
                        match report.score() {
                            Some(score) => {
                                ui.colored_label(score_color(score), score.to_string());
                            }
                            None => {
                                ui.colored_label(egui::Color32::GRAY, "-");
                            }
                        }
                        ui.end_row();
                    }
                });
        });

        if let Some(ref error) = self.save_error {
            ui.colored_label(egui::Color32::RED, error);
        }
        if let Some(ref error) = self.load_error {
            ui.colored_label(egui::Color32::RED, error);
        }

        if let Some(index) = open_detail {
            self.selected_report = Some(index);
            self.show_detail_window = true;
        }
        if request_save {
            self.pending_save = true;
        }
    }

    fn show_primer_detail_window(&mut self, ctx: &egui::Context) {
        let Some(ref results) = self.results else {
            self.show_detail_window = false;
            return;
        };

        let Some(report) = self.selected_report.and_then(|i| results.reports.get(i)) else {
            self.show_detail_window = false;
            return;
        };

        egui::Window::new(format!("{} Details", report.primer.name()))
            .open(&mut self.show_detail_window)
            .default_width(520.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(format!("Binding strand: {}", report.primer.orientation()));
                    ui.separator();
                    ui.label(format!("Length: {} bp", report.length));
                });

                ui.horizontal(|ui| {
                    ui.label("Sequence:");
                    show_colored_sequence(ui, report.primer.sequence());
                });
                ui.horizontal(|ui| {
                    ui.label("Reverse complement:");
                    match report.reverse_complement {
                        Some(ref rc) => show_colored_sequence(ui, rc),
                        None => {
                            ui.colored_label(egui::Color32::YELLOW, "unavailable (invalid symbols)");
                        }
                    }
                });

                if let Some(best) = report.self_dimer_alignment {
                    ui.label(format!(
                        "Self-dimer: {} of {} overlapping positions pair",
                        best.pairs, best.overlap
                    ));
                }

                ui.separator();

                if let Some(ref error) = report.error {
                    ui.colored_label(egui::Color32::RED, format!("Not scored: {}", error));
                }

                if let Some(ref card) = report.score_card {
                    ui.heading(format!("Score: {}", card.total));
                    if card.fired.is_empty() {
                        ui.label("No rule applied.");
                    }
                    egui::Grid::new("rule_grid").num_columns(2).show(ui, |ui| {
                        for rule in &card.fired {
                            ui.label(rule.description());
                            let adjustment = rule.adjustment();
                            ui.colored_label(score_color(adjustment), format!("{:+}", adjustment));
                            ui.end_row();
                        }
                    });
                }
            });
    }
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

/// Draw a sequence with one color per base
fn show_colored_sequence(ui: &mut egui::Ui, seq: &str) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for base in seq.chars() {
            ui.label(
                egui::RichText::new(base.to_string())
                    .monospace()
                    .color(base_color(base)),
            );
        }
    });
}

/// Green for good scores, red for penalized ones
fn score_color(score: i32) -> egui::Color32 {
    if score >= 6 {
        egui::Color32::from_rgb(0, 180, 0)
    } else if score >= 4 {
        egui::Color32::from_rgb(150, 180, 0)
    } else if score >= 0 {
        egui::Color32::from_rgb(255, 165, 0)
    } else {
        egui::Color32::from_rgb(220, 50, 50)
    }
}

/// Color for DNA base letters
fn base_color(base: char) -> egui::Color32 {
    match base {
        'a' => egui::Color32::from_rgb(100, 200, 100), // Green
        't' => egui::Color32::from_rgb(220, 80, 80),   // Red
        'g' => egui::Color32::from_rgb(255, 200, 60),  // Yellow/gold
        'c' => egui::Color32::from_rgb(100, 150, 255), // Blue
        _ => egui::Color32::GRAY,
    }
}

const EXAMPLE_PRIMERS: &str = r#">TDSP1712 reverse
tgaggccgccatccacgc
>Palindromic
acgtacgtacgtacgtac
>PolyA_tail
gcatcgatcgaaaaaaaagc
>Short
atgcatgc
"#;
