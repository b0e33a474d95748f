#![windows_subsystem = "windows"]
//! Activity Roster - Main entry point

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod api;
mod app;
mod constants;
mod settings;
mod theme;
mod types;
mod ui;
mod utils;

use api::ApiClient;
use app::App;
use constants::*;
use eframe::egui;
use reqwest::Url;
use std::sync::Arc;
use tracing::{info, warn};
use ui::components::{availability_color, flash_frame, spots_left_text};
use utils::get_data_dir;

/// Initialize file logging. Returns a guard that must be held for the app lifetime.
fn init_logging(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "activity-roster.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,activity_roster=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

fn main() -> eframe::Result<()> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir).ok();

    // Initialize logging - guard must live for entire app lifetime
    let _log_guard = init_logging(&data_dir);

    info!(version = APP_VERSION, "Activity Roster starting");

    let settings = settings::Settings::load(&data_dir);

    // Env var wins over settings.json, settings over the built-in default
    let server_url =
        std::env::var(SERVER_URL_ENV).unwrap_or_else(|_| settings.server_url_or_default());
    let base = match Url::parse(&server_url) {
        Ok(url) => url,
        Err(e) => {
            warn!(error = %e, url = %server_url, "Invalid server URL, using default");
            Url::parse(DEFAULT_SERVER_URL).expect("default server url is valid")
        }
    };
    info!(server = %base, "Using backend");

    // Load saved window position/size
    let win_pos = match (settings.window_x, settings.window_y) {
        (Some(x), Some(y)) => Some(egui::pos2(x, y)),
        _ => None,
    };
    let win_size = match (settings.window_w, settings.window_h) {
        (Some(w), Some(h)) => Some(egui::vec2(w, h)),
        _ => None,
    };

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(win_size.unwrap_or(egui::vec2(980.0, 700.0)))
        .with_min_inner_size([760.0, 520.0])
        .with_title("Activity Roster");

    // Window/taskbar icon rasterized from the embedded logo SVG
    {
        let (rgba, w, h) = utils::rasterize_logo_square(64);
        let icon = egui::IconData {
            rgba,
            width: w,
            height: h,
        };
        viewport = viewport.with_icon(std::sync::Arc::new(icon));
    }

    let needs_center = win_pos.is_none();

    if let Some(pos) = win_pos {
        viewport = viewport.with_position(pos);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Activity Roster",
        options,
        Box::new(move |cc| {
            let api = Arc::new(ApiClient::new(base));
            let mut app = App::new(cc, api, settings, data_dir);
            app.needs_center = needs_center;
            Ok(Box::new(app))
        }),
    )
}

// ============================================================================
// MAIN UPDATE LOOP & UI RENDERING
// ============================================================================

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window position/size for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().outer_rect {
                self.window_pos = Some(rect.min);
            }
            if let Some(rect) = i.viewport().inner_rect {
                self.window_size = Some(rect.size());
            }
        });

        // Center window on first launch
        if self.needs_center {
            self.needs_center = false;
            if let Some(cmd) = egui::ViewportCommand::center_on_screen(ctx) {
                ctx.send_viewport_cmd(cmd);
            }
        }

        // Kick off the initial directory fetch on the first frame
        if !self.initial_fetch_started {
            self.initial_fetch_started = true;
            self.refresh_activities(ctx);
        }

        // Apply completions from background requests
        self.poll_events(ctx);

        // Expire the flash banner. The deadline is fixed at creation; user
        // activity in between does not extend it.
        if self.flash.as_ref().is_some_and(|f| f.is_expired()) {
            self.flash = None;
        } else if self.flash.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }

        self.render_sidebar(ctx);
        self.render_activity_list(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Shutting down, saving settings");
        self.save_settings();
    }
}

impl App {
    // ========================================================================
    // SIDEBAR - logo + signup form
    // ========================================================================

    fn render_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("signup_panel")
            .exact_width(theme::SIDEBAR_WIDTH)
            .resizable(false)
            .show_separator_line(false)
            .frame(
                egui::Frame::new().fill(theme::BG_BASE).inner_margin(egui::Margin {
                    left: 16,
                    right: 16,
                    top: 0,
                    bottom: 12,
                }),
            )
            .show(ctx, |ui| {
                let avail_w = ui.available_width();

                ui.add_space(21.0);
                ui.with_layout(egui::Layout::top_down(egui::Align::Center), |ui| {
                    let texture = self.logo_texture.get_or_insert_with(|| {
                        let (pixels, w, h) = utils::rasterize_logo(avail_w as u32 * 2);
                        ctx.load_texture(
                            "logo",
                            egui::ColorImage::from_rgba_unmultiplied(
                                [w as usize, h as usize],
                                &pixels,
                            ),
                            egui::TextureOptions::LINEAR,
                        )
                    });

                    let aspect = texture.size()[1] as f32 / texture.size()[0] as f32;
                    let logo_w = avail_w * 0.3;
                    let logo_size = egui::vec2(logo_w, logo_w * aspect);
                    ui.image(egui::load::SizedTexture::new(texture.id(), logo_size));

                    ui.add_space(4.0);
                    ui.label(
                        egui::RichText::new("ACTIVITY ROSTER")
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_DIM),
                    );
                });
                ui.add_space(theme::SPACING_XL);

                self.render_signup_form(ui, ctx);

                // Footer pinned to the panel bottom
                ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!("v{}", APP_VERSION))
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_DIM),
                    );
                });
            });
    }

    fn render_signup_form(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let mut submit = false;

        theme::section_frame().show(ui, |ui| {
            ui.label(
                egui::RichText::new("SIGN UP FOR AN ACTIVITY")
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_DIM),
            );
            ui.add_space(theme::SPACING_MD);

            ui.label(
                egui::RichText::new("Email")
                    .size(theme::FONT_LABEL)
                    .color(theme::TEXT_MUTED),
            );
            let email_resp = ui.add(
                egui::TextEdit::singleline(&mut self.signup_email)
                    .hint_text("student@mergington.edu")
                    .desired_width(ui.available_width()),
            );
            if email_resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }

            ui.add_space(theme::SPACING_SM);
            ui.label(
                egui::RichText::new("Activity")
                    .size(theme::FONT_LABEL)
                    .color(theme::TEXT_MUTED),
            );
            let names: Vec<String> = self.activities.keys().cloned().collect();
            egui::ComboBox::from_id_salt("activity_select")
                .width(ui.available_width())
                .selected_text(
                    self.signup_activity
                        .as_deref()
                        .unwrap_or("-- Pick an activity --"),
                )
                .show_ui(ui, |ui| {
                    for name in &names {
                        let selected = self.signup_activity.as_deref() == Some(name);
                        if ui.selectable_label(selected, name.as_str()).clicked() {
                            self.signup_activity = Some(name.clone());
                        }
                    }
                });

            ui.add_space(theme::SPACING_LG);
            let label = if self.signup_in_flight {
                format!("{}  Signing up...", egui_phosphor::regular::HOURGLASS)
            } else {
                format!("{}  Sign Up", egui_phosphor::regular::CHECK)
            };
            let can_submit = !self.signup_in_flight
                && !self.signup_email.trim().is_empty()
                && self.signup_activity.is_some();
            let button = ui.add_enabled(
                can_submit,
                theme::button_accent(label).min_size(egui::vec2(ui.available_width(), 28.0)),
            );
            if button.clicked() {
                submit = true;
            }
        });

        if submit {
            self.submit_signup(ctx);
        }
    }

    // ========================================================================
    // CENTRAL PANEL - flash banner + activity cards
    // ========================================================================

    fn render_activity_list(&mut self, ctx: &egui::Context) {
        let mut refresh_clicked = false;
        let mut removal_clicks: Vec<(String, String)> = Vec::new();

        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::same(16)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new("Extracurricular Activities")
                            .size(theme::FONT_TITLE)
                            .strong()
                            .color(theme::TEXT_PRIMARY),
                    );
                    if self.loading {
                        ui.add(egui::Spinner::new().size(14.0));
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let refresh = ui.add(theme::button(format!(
                            "{}  Refresh",
                            egui_phosphor::regular::ARROW_CLOCKWISE
                        )));
                        if refresh.clicked() {
                            refresh_clicked = true;
                        }
                    });
                });
                ui.add_space(theme::SPACING_MD);

                if let Some(flash) = &self.flash {
                    flash_frame(flash.kind).show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(
                            egui::RichText::new(&flash.text)
                                .size(theme::FONT_BODY)
                                .color(theme::TEXT_PRIMARY),
                        );
                    });
                    ui.add_space(theme::SPACING_MD);
                }

                if let Some(error_text) = self.load_error {
                    ui.add_space(theme::SPACING_XL);
                    ui.label(
                        egui::RichText::new(error_text)
                            .size(theme::FONT_BODY)
                            .color(theme::STATUS_ERROR),
                    );
                    return;
                }

                if self.activities.is_empty() {
                    ui.add_space(theme::SPACING_XL);
                    if self.loading {
                        ui.label(
                            egui::RichText::new("Loading activities...")
                                .size(theme::FONT_BODY)
                                .color(theme::TEXT_MUTED),
                        );
                    } else {
                        ui.label(
                            egui::RichText::new("No activities available.")
                                .size(theme::FONT_BODY)
                                .color(theme::TEXT_MUTED),
                        );
                    }
                    return;
                }

                egui::ScrollArea::vertical().show(ui, |ui| {
                    for (name, activity) in &self.activities {
                        theme::card_frame().show(ui, |ui| {
                            ui.set_width(ui.available_width());

                            ui.label(
                                egui::RichText::new(name)
                                    .size(theme::FONT_HEADING)
                                    .strong()
                                    .color(theme::TEXT_PRIMARY),
                            );
                            ui.label(
                                egui::RichText::new(&activity.description)
                                    .size(theme::FONT_BODY)
                                    .color(theme::TEXT_SECONDARY),
                            );

                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new("Schedule:")
                                        .size(theme::FONT_LABEL)
                                        .strong()
                                        .color(theme::TEXT_MUTED),
                                );
                                ui.label(
                                    egui::RichText::new(&activity.schedule)
                                        .size(theme::FONT_LABEL)
                                        .color(theme::TEXT_MUTED),
                                );
                            });

                            let spots = activity.spots_left();
                            ui.label(
                                egui::RichText::new(spots_left_text(spots))
                                    .size(theme::FONT_LABEL)
                                    .color(availability_color(spots)),
                            );

                            ui.add_space(theme::SPACING_MD);
                            ui.label(
                                egui::RichText::new("PARTICIPANTS")
                                    .size(theme::FONT_SMALL)
                                    .color(theme::TEXT_DIM),
                            );

                            if activity.participants.is_empty() {
                                ui.label(
                                    egui::RichText::new("No participants yet. Be the first!")
                                        .size(theme::FONT_LABEL)
                                        .italics()
                                        .color(theme::TEXT_DIM),
                                );
                            } else {
                                for email in &activity.participants {
                                    ui.horizontal(|ui| {
                                        ui.label(
                                            egui::RichText::new(egui_phosphor::regular::USER)
                                                .size(12.0)
                                                .color(theme::TEXT_DIM),
                                        );
                                        ui.label(
                                            egui::RichText::new(email)
                                                .size(theme::FONT_LABEL)
                                                .color(theme::TEXT_SECONDARY),
                                        );
                                        ui.with_layout(
                                            egui::Layout::right_to_left(egui::Align::Center),
                                            |ui| {
                                                let pending = self
                                                    .pending_removals
                                                    .contains(&(name.clone(), email.clone()));
                                                let x = egui::RichText::new(
                                                    egui_phosphor::regular::X,
                                                )
                                                .size(12.0)
                                                .color(theme::BTN_REMOVE_IDLE);
                                                let button = ui
                                                    .add_enabled(
                                                        !pending,
                                                        egui::Button::new(x).frame(false),
                                                    )
                                                    .on_hover_text(format!(
                                                        "Remove {} from {}",
                                                        email, name
                                                    ));
                                                if button.clicked() {
                                                    removal_clicks
                                                        .push((name.clone(), email.clone()));
                                                }
                                            },
                                        );
                                    });
                                }
                            }
                        });
                        ui.add_space(theme::SPACING_MD);
                    }
                });
            });

        if refresh_clicked {
            self.refresh_activities(ctx);
        }
        for (activity, email) in removal_clicks {
            self.remove_participant(activity, email, ctx);
        }
    }
}
