//! Background request spawning
//!
//! Every user action maps to one task on the app's tokio runtime. Tasks do
//! not touch app state; they push a single AppEvent into the shared inbox
//! and request a repaint, and the update loop applies it on the next frame.

use super::App;
use crate::types::AppEvent;
use eframe::egui;
use tracing::debug;

impl App {
    pub fn refresh_activities(&mut self, ctx: &egui::Context) {
        // Overlapping fetches are allowed; the last response applied wins.
        self.loading = true;
        let api = self.api.clone();
        let inbox = self.inbox.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let outcome = api.list_activities().await;
            inbox.lock().unwrap().push(AppEvent::ActivitiesLoaded(outcome));
            ctx.request_repaint();
        });
    }

    pub fn submit_signup(&mut self, ctx: &egui::Context) {
        if !self.can_submit_signup() {
            return;
        }
        let email = self.signup_email.trim().to_string();
        let activity = match self.signup_activity.clone() {
            Some(activity) => activity,
            None => return,
        };
        self.signup_in_flight = true;
        debug!(activity = %activity, "Submitting signup");

        let api = self.api.clone();
        let inbox = self.inbox.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let outcome = api.sign_up(&activity, &email).await;
            inbox.lock().unwrap().push(AppEvent::SignupFinished(outcome));
            ctx.request_repaint();
        });
    }

    pub fn remove_participant(&mut self, activity: String, email: String, ctx: &egui::Context) {
        // Already awaiting a response for this row
        if !self
            .pending_removals
            .insert((activity.clone(), email.clone()))
        {
            return;
        }
        debug!(activity = %activity, email = %email, "Removing participant");

        let api = self.api.clone();
        let inbox = self.inbox.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let outcome = api.remove_participant(&activity, &email).await;
            inbox.lock().unwrap().push(AppEvent::RemovalFinished {
                activity,
                email,
                outcome,
            });
            ctx.request_repaint();
        });
    }

    /// Drain the inbox and apply completions in arrival order. A successful
    /// mutation triggers one directory re-fetch.
    pub fn poll_events(&mut self, ctx: &egui::Context) {
        let events: Vec<AppEvent> = std::mem::take(&mut *self.inbox.lock().unwrap());
        let mut needs_refetch = false;
        for event in events {
            needs_refetch |= self.apply_event(event);
        }
        if needs_refetch {
            self.refresh_activities(ctx);
        }
    }
}
