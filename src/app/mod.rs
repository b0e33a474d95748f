//! App module - contains the main application state and logic

mod requests;

use crate::api::{ActivityDirectory, ApiClient, ApiError};
use crate::settings::Settings;
use crate::theme;
use crate::types::{AppEvent, Flash};
use eframe::egui;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::error;

/// Shown in place of the card list when the directory fetch fails.
pub const LOAD_ERROR_TEXT: &str = "Failed to load activities. Please try again later.";

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) api: Arc<ApiClient>,
    pub(crate) runtime: tokio::runtime::Runtime,
    // Background tasks push completions here; drained once per frame.
    pub(crate) inbox: Arc<Mutex<Vec<AppEvent>>>,

    // Server data. Transient copy, re-fetched after every mutation.
    pub(crate) activities: ActivityDirectory,
    pub(crate) load_error: Option<&'static str>,
    pub(crate) loading: bool,

    // Signup form
    pub(crate) signup_email: String,
    pub(crate) signup_activity: Option<String>,
    pub(crate) signup_in_flight: bool,

    // Removals awaiting a response, keyed by (activity, email). A row's
    // remove button renders disabled while its pair is in here.
    pub(crate) pending_removals: HashSet<(String, String)>,

    // Transient banner message
    pub(crate) flash: Option<Flash>,

    // Window chrome
    pub(crate) logo_texture: Option<egui::TextureHandle>,
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
    pub(crate) initial_fetch_started: bool,
    pub(crate) data_dir: PathBuf,
    pub(crate) server_url: Option<String>,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        api: Arc<ApiClient>,
        settings: Settings,
        data_dir: PathBuf,
    ) -> Self {
        // Force dark theme
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Add Phosphor icons font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        // Apply theme from theme.rs
        theme::apply_visuals(&cc.egui_ctx);

        let mut app = Self::from_parts(api, data_dir);
        app.server_url = settings.server_url;
        app
    }

    /// State-only constructor; `new` layers the egui context setup on top.
    pub(crate) fn from_parts(api: Arc<ApiClient>, data_dir: PathBuf) -> Self {
        Self {
            api,
            runtime: tokio::runtime::Runtime::new().unwrap(),
            inbox: Arc::new(Mutex::new(Vec::new())),
            activities: ActivityDirectory::new(),
            load_error: None,
            loading: false,
            signup_email: String::new(),
            signup_activity: None,
            signup_in_flight: false,
            pending_removals: HashSet::new(),
            flash: None,
            logo_texture: None,
            window_pos: None,
            window_size: None,
            needs_center: false,
            initial_fetch_started: false,
            data_dir,
            server_url: None,
        }
    }

    pub fn save_settings(&self) {
        let settings = Settings {
            window_x: self.window_pos.map(|p| p.x),
            window_y: self.window_pos.map(|p| p.y),
            window_w: self.window_size.map(|s| s.x),
            window_h: self.window_size.map(|s| s.y),
            server_url: self.server_url.clone(),
        };
        settings.save(&self.data_dir);
    }

    /// Apply one background completion. Returns true when the directory
    /// should be re-fetched (after a successful mutation).
    pub(crate) fn apply_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::ActivitiesLoaded(Ok(directory)) => {
                self.loading = false;
                self.load_error = None;
                self.activities = directory;
                false
            }
            AppEvent::ActivitiesLoaded(Err(e)) => {
                self.loading = false;
                error!(error = %e, "Failed to fetch activities");
                self.load_error = Some(LOAD_ERROR_TEXT);
                false
            }
            AppEvent::SignupFinished(Ok(message)) => {
                self.signup_in_flight = false;
                self.signup_email.clear();
                self.signup_activity = None;
                self.flash = Some(Flash::success(message));
                true
            }
            AppEvent::SignupFinished(Err(e)) => {
                self.signup_in_flight = false;
                if let ApiError::Http(_) = e {
                    error!(error = %e, "Signup request failed");
                }
                self.flash = Some(Flash::error(signup_error_text(&e)));
                false
            }
            AppEvent::RemovalFinished {
                activity,
                email,
                outcome,
            } => {
                self.pending_removals.remove(&(activity, email));
                match outcome {
                    Ok(message) => {
                        self.flash = Some(Flash::success(message));
                        true
                    }
                    Err(e) => {
                        if let ApiError::Http(_) = e {
                            error!(error = %e, "Removal request failed");
                        }
                        self.flash = Some(Flash::error(removal_error_text(&e)));
                        false
                    }
                }
            }
        }
    }

    pub(crate) fn can_submit_signup(&self) -> bool {
        !self.signup_in_flight
            && !self.signup_email.trim().is_empty()
            && self.signup_activity.is_some()
    }
}

fn signup_error_text(e: &ApiError) -> String {
    match e {
        ApiError::Rejected {
            detail: Some(detail),
            ..
        } => detail.clone(),
        ApiError::Rejected { detail: None, .. } => "An error occurred".to_string(),
        ApiError::Http(_) => "Failed to sign up. Please try again.".to_string(),
    }
}

fn removal_error_text(e: &ApiError) -> String {
    match e {
        ApiError::Rejected {
            detail: Some(detail),
            ..
        } => detail.clone(),
        ApiError::Rejected { detail: None, .. } => "Failed to remove participant".to_string(),
        ApiError::Http(_) => "Failed to remove participant. Try again.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Activity;
    use crate::types::FlashKind;
    use reqwest::{StatusCode, Url};

    fn test_app() -> App {
        let api = Arc::new(ApiClient::new(Url::parse("http://localhost:8000").unwrap()));
        App::from_parts(api, std::env::temp_dir())
    }

    fn chess_directory() -> ActivityDirectory {
        let mut directory = ActivityDirectory::new();
        directory.insert(
            "Chess Club".into(),
            Activity {
                description: "d".into(),
                schedule: "s".into(),
                max_participants: 10,
                participants: vec!["a@x.com".into()],
            },
        );
        directory
    }

    #[test]
    fn loaded_directory_replaces_state_and_clears_error() {
        let mut app = test_app();
        app.load_error = Some(LOAD_ERROR_TEXT);
        app.loading = true;
        let refresh = app.apply_event(AppEvent::ActivitiesLoaded(Ok(chess_directory())));
        assert!(!refresh);
        assert!(!app.loading);
        assert!(app.load_error.is_none());
        assert_eq!(app.activities["Chess Club"].spots_left(), 9);
    }

    #[test]
    fn signup_success_clears_form_and_requests_refetch() {
        let mut app = test_app();
        app.signup_email = "a@x.com".into();
        app.signup_activity = Some("Chess Club".into());
        app.signup_in_flight = true;
        let refresh = app.apply_event(AppEvent::SignupFinished(Ok("Signed up!".into())));
        assert!(refresh);
        assert!(app.signup_email.is_empty());
        assert!(app.signup_activity.is_none());
        let flash = app.flash.as_ref().unwrap();
        assert_eq!(flash.text, "Signed up!");
        assert_eq!(flash.kind, FlashKind::Success);
    }

    #[test]
    fn signup_rejection_shows_detail_and_keeps_form() {
        let mut app = test_app();
        app.signup_email = "a@x.com".into();
        app.signup_activity = Some("Chess Club".into());
        app.signup_in_flight = true;
        let refresh = app.apply_event(AppEvent::SignupFinished(Err(ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            detail: Some("Activity full".into()),
        })));
        assert!(!refresh);
        assert_eq!(app.signup_email, "a@x.com");
        assert_eq!(app.signup_activity.as_deref(), Some("Chess Club"));
        let flash = app.flash.as_ref().unwrap();
        assert_eq!(flash.text, "Activity full");
        assert_eq!(flash.kind, FlashKind::Error);
    }

    #[test]
    fn signup_rejection_without_detail_uses_generic_text() {
        let mut app = test_app();
        app.apply_event(AppEvent::SignupFinished(Err(ApiError::Rejected {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: None,
        })));
        assert_eq!(app.flash.as_ref().unwrap().text, "An error occurred");
    }

    #[test]
    fn removal_success_reenables_row_and_requests_refetch() {
        let mut app = test_app();
        app.pending_removals
            .insert(("Chess Club".into(), "a@x.com".into()));
        let refresh = app.apply_event(AppEvent::RemovalFinished {
            activity: "Chess Club".into(),
            email: "a@x.com".into(),
            outcome: Ok("a@x.com removed from Chess Club".into()),
        });
        assert!(refresh);
        assert!(app.pending_removals.is_empty());
        assert_eq!(
            app.flash.as_ref().unwrap().text,
            "a@x.com removed from Chess Club"
        );
    }

    #[test]
    fn removal_rejection_reenables_row_without_refetch() {
        let mut app = test_app();
        app.pending_removals
            .insert(("Chess Club".into(), "a@x.com".into()));
        let refresh = app.apply_event(AppEvent::RemovalFinished {
            activity: "Chess Club".into(),
            email: "a@x.com".into(),
            outcome: Err(ApiError::Rejected {
                status: StatusCode::NOT_FOUND,
                detail: None,
            }),
        });
        assert!(!refresh);
        assert!(app.pending_removals.is_empty());
        assert_eq!(
            app.flash.as_ref().unwrap().text,
            "Failed to remove participant"
        );
    }

    #[test]
    fn fetch_failure_sets_static_list_error() {
        let mut app = test_app();
        app.activities = chess_directory();
        app.loading = true;
        app.apply_event(AppEvent::ActivitiesLoaded(Err(ApiError::Rejected {
            status: StatusCode::BAD_GATEWAY,
            detail: None,
        })));
        assert!(!app.loading);
        assert_eq!(app.load_error, Some(LOAD_ERROR_TEXT));
    }

    #[test]
    fn submit_gate_requires_both_fields_and_no_inflight_request() {
        let mut app = test_app();
        assert!(!app.can_submit_signup());
        app.signup_email = "  ".into();
        app.signup_activity = Some("Chess Club".into());
        assert!(!app.can_submit_signup());
        app.signup_email = "a@x.com".into();
        assert!(app.can_submit_signup());
        app.signup_in_flight = true;
        assert!(!app.can_submit_signup());
    }
}
