//! Main application state and UI.

use crate::api::{parse_repo_ref, ApiClient, FetchLimits};
use crate::camera::{advance_camera, world_to_screen, CameraState};
use crate::graph::{build_race, BranchCommits, NodeShape, RaceGraph};
use crate::playback::Playback;
use crate::settings::Settings;
use crate::theme;
use eframe::egui::{self, Stroke};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};
use tracing::info;

/// World-space footprint of a regular commit cube.
const CUBE_SIZE: f32 = 1.5;
/// Screen distance within which a node counts as hovered.
const HOVER_RADIUS: f32 = 20.0;

/// Main race application
pub struct RaceApp {
    // Fetch state
    repo_input: String,
    fetching: bool,
    fetch_error: Option<String>,
    fetch_receiver: Option<Receiver<Result<Vec<BranchCommits>, String>>>,

    // Graph and temporal state
    graph: RaceGraph,
    playback: Playback,
    camera: CameraState,
    finished: bool,

    // Selection state
    hovered_sha: Option<String>,
    selected_sha: Option<String>,

    // Performance tracking
    last_frame: Instant,
    frame_dt: Duration,
    frame_times: Vec<f32>,
    fps: f32,

    // Settings persistence
    settings: Settings,
    settings_dirty: bool,
    last_settings_save: Instant,
}

impl RaceApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::load();

        Self {
            repo_input: settings.repo_url.clone(),
            fetching: false,
            fetch_error: None,
            fetch_receiver: None,

            graph: RaceGraph::default(),
            playback: Playback::new(),
            camera: CameraState::new(),
            finished: false,

            hovered_sha: None,
            selected_sha: None,

            last_frame: Instant::now(),
            frame_dt: Duration::ZERO,
            frame_times: Vec::with_capacity(60),
            fps: 0.0,

            settings,
            settings_dirty: false,
            last_settings_save: Instant::now(),
        }
    }

    /// Mark settings as needing to be saved
    fn mark_settings_dirty(&mut self) {
        self.settings_dirty = true;
    }

    /// Save settings if dirty and enough time has passed (debounce)
    fn maybe_save_settings(&mut self) {
        if self.settings_dirty && self.last_settings_save.elapsed().as_secs() >= 2 {
            self.settings.repo_url = self.repo_input.clone();
            self.settings.save();
            self.settings_dirty = false;
            self.last_settings_save = Instant::now();
        }
    }

    /// Kick off a background fetch cycle. Malformed input is reported
    /// immediately without touching anything; a prior playback sequence is
    /// cancelled before the request leaves, and the previous receiver is
    /// dropped so stale results can never land on new state.
    fn trigger_fetch(&mut self) {
        let (owner, repo) = match parse_repo_ref(&self.repo_input) {
            Ok(parts) => parts,
            Err(e) => {
                self.fetch_error = Some(e);
                return;
            }
        };

        self.playback.stop();
        self.fetching = true;
        self.fetch_error = None;
        self.finished = false;

        let limits = FetchLimits {
            max_branches: self.settings.max_branches,
            commits_per_branch: self.settings.commits_per_branch,
        };

        info!(%owner, %repo, "starting fetch cycle");
        let (tx, rx) = mpsc::channel();
        self.fetch_receiver = Some(rx);

        std::thread::spawn(move || {
            let result = match tokio::runtime::Runtime::new() {
                Ok(rt) => {
                    rt.block_on(async { ApiClient::new().fetch_race(&owner, &repo, limits).await })
                }
                Err(e) => Err(format!("Failed to start fetch runtime: {e}")),
            };
            let _ = tx.send(result);
        });
    }

    /// Replace the graph with freshly fetched data and start the reveal.
    fn load_race(&mut self, branch_data: Vec<BranchCommits>) {
        let config = self.settings.layout_config();
        self.graph = build_race(&branch_data, &config);

        self.hovered_sha = None;
        self.selected_sha = None;
        self.finished = false;
        self.camera.reset_follow();
        self.playback.start(
            self.graph.len(),
            Duration::from_millis(self.settings.reveal_interval_ms),
        );
    }

    /// Restart the reveal over the already-loaded graph.
    fn replay(&mut self) {
        if self.graph.is_empty() {
            return;
        }
        self.finished = false;
        self.camera.reset_follow();
        self.playback.start(
            self.graph.len(),
            Duration::from_millis(self.settings.reveal_interval_ms),
        );
    }

    fn update_frame_timing(&mut self) {
        let now = Instant::now();
        self.frame_dt = now.duration_since(self.last_frame);
        self.last_frame = now;

        self.frame_times.push(self.frame_dt.as_secs_f32());
        if self.frame_times.len() > 60 {
            self.frame_times.remove(0);
        }
        if !self.frame_times.is_empty() {
            let avg: f32 = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
            self.fps = 1.0 / avg.max(1e-6);
        }
    }

    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading("Commit Race");
        ui.add_space(10.0);

        let busy = self.fetching || self.playback.is_revealing();

        ui.label("GitHub repository");
        ui.add_enabled(
            !busy,
            egui::TextEdit::singleline(&mut self.repo_input)
                .hint_text("e.g. https://github.com/facebook/react"),
        );
        if ui
            .add_enabled(!busy, egui::Button::new(if self.fetching { "Fetching…" } else { "Fetch commits" }))
            .clicked()
        {
            self.mark_settings_dirty();
            self.trigger_fetch();
        }

        if let Some(ref err) = self.fetch_error {
            ui.colored_label(theme::race::DELETIONS, err);
        }

        ui.add_space(6.0);
        if self.playback.is_revealing() {
            ui.colored_label(
                theme::text::SECONDARY,
                format!("Revealing {} / {}", self.playback.revealed(), self.graph.len()),
            );
            if ui.button("Stop").clicked() {
                self.playback.stop();
            }
        } else if self.finished {
            ui.colored_label(theme::text::SECONDARY, "Race finished");
        }
        if ui
            .add_enabled(!busy && !self.graph.is_empty(), egui::Button::new("Replay"))
            .clicked()
        {
            self.replay();
        }

        ui.add_space(10.0);
        egui::CollapsingHeader::new("Fetch & playback")
            .default_open(false)
            .show(ui, |ui| {
                let mut changed = false;
                changed |= ui
                    .add(
                        egui::Slider::new(&mut self.settings.max_branches, 1..=20)
                            .text("Branches"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut self.settings.commits_per_branch, 10..=100)
                            .text("Commits per branch"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut self.settings.reveal_interval_ms, 10..=500)
                            .text("Reveal interval (ms)"),
                    )
                    .changed();
                if changed {
                    self.mark_settings_dirty();
                }
            });

        ui.add_space(10.0);
        egui::CollapsingHeader::new("Legend")
            .default_open(true)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.colored_label(theme::race::MAIN_BRANCH, "■");
                    ui.label("Main branch");
                });
                ui.horizontal(|ui| {
                    ui.colored_label(theme::race::FEATURE_COLD, "■");
                    ui.label("Feature branch");
                });
                ui.horizontal(|ui| {
                    ui.colored_label(theme::race::MERGE, "●");
                    ui.label("Merge commit");
                });
                ui.horizontal(|ui| {
                    ui.colored_label(theme::race::MERGE_EDGE, "—");
                    ui.label("Merge path");
                });
                ui.horizontal(|ui| {
                    ui.colored_label(theme::race::HISTORY_EDGE, "—");
                    ui.label("Commit history");
                });
                ui.horizontal(|ui| {
                    ui.colored_label(theme::text::MUTED, "Newest → Oldest");
                });
            });

        ui.add_space(10.0);
        if !self.graph.is_empty() {
            ui.colored_label(
                theme::text::MUTED,
                format!(
                    "{} commits · {} branches",
                    self.graph.len(),
                    self.graph.labels.len()
                ),
            );
            ui.colored_label(
                theme::text::MUTED,
                format!("largest commit: {} changed lines", self.graph.max_change as u32),
            );
        }
        ui.colored_label(theme::text::MUTED, format!("{:.0} FPS", self.fps));
    }

    fn render_info_window(&mut self, ctx: &egui::Context) {
        let Some(sha) = self.selected_sha.clone() else {
            return;
        };
        // Selected-commit hand-off: a miss simply shows nothing.
        let Some(node) = self.graph.get_node(&sha) else {
            self.selected_sha = None;
            return;
        };
        let record = node.record.clone();

        let mut open = true;
        egui::Window::new("Commit details")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.strong(record.author_label());
                ui.colored_label(
                    theme::text::SECONDARY,
                    record
                        .commit
                        .author
                        .date
                        .format("%Y-%m-%d %H:%M UTC")
                        .to_string(),
                );

                if let Some(stats) = record.stats {
                    ui.horizontal(|ui| {
                        ui.colored_label(theme::race::ADDITIONS, format!("++ {}", stats.additions));
                        ui.colored_label(theme::race::DELETIONS, format!("-- {}", stats.deletions));
                    });
                }

                ui.add_space(4.0);
                ui.label(truncate(&record.commit.message, 200));
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    ui.colored_label(theme::text::MUTED, "SHA:");
                    ui.hyperlink_to(record.short_sha().to_string(), record.html_url.clone());
                });
            });
        if !open {
            self.selected_sha = None;
        }
    }

    fn render_scene(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;

        // Manual camera control persists whenever the tracker is inactive.
        if !self.playback.is_revealing() {
            if response.dragged_by(egui::PointerButton::Primary) {
                let drag = response.drag_delta();
                self.camera.pan(-drag.x * 0.05, drag.y * 0.05);
            }
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 && response.hovered() {
                self.camera.dolly(scroll * 0.1);
            }
        }

        let visible = self.playback.revealed();
        if visible == 0 {
            return;
        }

        // Edges first, behind the nodes. Both endpoints must be revealed.
        for edge in &self.graph.edges {
            let (Some(&from), Some(&to)) = (
                self.graph.index.get(&edge.from_sha),
                self.graph.index.get(&edge.to_sha),
            ) else {
                continue;
            };
            if from >= visible || to >= visible {
                continue;
            }

            let (Some(a), Some(b)) = (
                world_to_screen(self.graph.nodes[from].position, &self.camera, rect),
                world_to_screen(self.graph.nodes[to].position, &self.camera, rect),
            ) else {
                continue;
            };

            let stroke = if edge.is_merge_edge {
                Stroke::new(2.0, theme::race::MERGE_EDGE)
            } else {
                Stroke::new(1.0, theme::race::HISTORY_EDGE)
            };
            painter.line_segment([a.screen, b.screen], stroke);
        }

        // Hover: nearest revealed node within reach of the cursor.
        let mut new_hovered: Option<(String, f32)> = None;
        let hover_pos = response.hover_pos();

        for node in &self.graph.nodes[..visible] {
            let Some(projected) = world_to_screen(node.position, &self.camera, rect) else {
                continue;
            };

            if let Some(cursor) = hover_pos {
                let distance = projected.screen.distance(cursor);
                if distance < HOVER_RADIUS
                    && new_hovered.as_ref().map_or(true, |(_, d)| distance < *d)
                {
                    new_hovered = Some((node.record.sha.clone(), distance));
                }
            }

            let is_hovered = self.hovered_sha.as_deref() == Some(node.sha());
            let is_selected = self.selected_sha.as_deref() == Some(node.sha());
            let accent = is_hovered || is_selected;

            match node.shape {
                NodeShape::Merge => {
                    let radius = (CUBE_SIZE * 0.7 * projected.scale).max(1.5);
                    painter.circle_filled(projected.screen, radius, theme::race::MERGE);
                    let rim = if accent {
                        Stroke::new(2.0, theme::race::HIGHLIGHT)
                    } else {
                        Stroke::new(1.0, theme::race::MERGE_RIM)
                    };
                    painter.circle_stroke(projected.screen, radius, rim);
                }
                NodeShape::Regular => {
                    let width = (CUBE_SIZE * projected.scale).max(1.0);
                    let height = (node.height * projected.scale).max(1.0);
                    let shape_rect =
                        egui::Rect::from_center_size(projected.screen, egui::vec2(width, height));
                    let color = theme::commit_color(node.is_main_branch, node.color_weight);
                    painter.rect_filled(shape_rect, 1.0, color);
                    if accent {
                        painter.rect_stroke(shape_rect, 1.0, Stroke::new(2.0, theme::race::HIGHLIGHT));
                    }
                }
            }
        }
        self.hovered_sha = new_hovered.map(|(sha, _)| sha);

        // Branch labels appear once their anchor commit is revealed.
        for label in &self.graph.labels {
            let Some(&anchor_index) = self.graph.index.get(&label.sha) else {
                continue;
            };
            if anchor_index >= visible {
                continue;
            }
            if let Some(projected) = world_to_screen(label.anchor, &self.camera, rect) {
                painter.text(
                    projected.screen,
                    egui::Align2::CENTER_CENTER,
                    &label.name,
                    egui::FontId::proportional(13.0),
                    theme::text::PRIMARY,
                );
            }
        }

        // Click toggles selection of the hovered commit.
        if response.clicked() {
            self.selected_sha = match (&self.hovered_sha, &self.selected_sha) {
                (Some(hovered), Some(selected)) if hovered == selected => None,
                (Some(hovered), _) => Some(hovered.clone()),
                (None, _) => None,
            };
        }
    }
}

impl eframe::App for RaceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_frame_timing();
        self.maybe_save_settings();

        // Check for a fetch result from the background thread
        if let Some(ref rx) = self.fetch_receiver {
            match rx.try_recv() {
                Ok(Ok(branch_data)) => {
                    self.fetching = false;
                    self.fetch_receiver = None;
                    self.load_race(branch_data);
                }
                Ok(Err(e)) => {
                    // Total fetch failure: report once, keep whatever was
                    // on screen before.
                    self.fetching = false;
                    self.fetch_receiver = None;
                    self.fetch_error = Some(e);
                }
                Err(mpsc::TryRecvError::Empty) => {
                    ctx.request_repaint();
                }
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.fetching = false;
                    self.fetch_receiver = None;
                    self.fetch_error = Some("Fetch was interrupted".to_string());
                }
            }
        }

        // Advance the reveal and chase the frontier while revealing.
        self.playback.advance(self.frame_dt);
        if self.playback.is_revealing() {
            if self.playback.revealed() > 0 {
                let frontier = self.graph.nodes[self.playback.revealed() - 1].position;
                self.camera =
                    advance_camera(&self.camera, frontier, &self.settings.layout_config());
            }
            ctx.request_repaint();
        }
        if self.playback.take_completed() {
            info!(commits = self.graph.len(), "race finished");
            self.finished = true;
        }

        ctx.set_visuals(egui::Visuals::dark());

        egui::SidePanel::left("sidebar")
            .min_width(220.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_sidebar(ui);
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(theme::bg::SCENE))
            .show(ctx, |ui| {
                self.render_scene(ui);
            });

        self.render_info_window(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // Force save settings on exit
        if self.settings_dirty {
            self.settings.repo_url = self.repo_input.clone();
            self.settings.save();
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}
