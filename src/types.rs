//! Common types shared between the update loop and background tasks

use crate::api::{ActivityDirectory, ApiError};
use crate::constants::FLASH_SECS;
use std::time::Instant;

/// Completion of one background request, pushed into the app inbox and
/// applied by the update loop on the next frame.
pub enum AppEvent {
    ActivitiesLoaded(Result<ActivityDirectory, ApiError>),
    SignupFinished(Result<String, ApiError>),
    RemovalFinished {
        activity: String,
        email: String,
        outcome: Result<String, ApiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

/// Transient banner message. Expires a fixed time after creation, regardless
/// of what the user does in between.
pub struct Flash {
    pub text: String,
    pub kind: FlashKind,
    shown_at: Instant,
}

impl Flash {
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, FlashKind::Success)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, FlashKind::Error)
    }

    fn new(text: impl Into<String>, kind: FlashKind) -> Self {
        Self {
            text: text.into(),
            kind,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at).as_secs_f32() >= FLASH_SECS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn flash_is_not_expired_before_the_deadline() {
        let flash = Flash::success("Signed up!");
        let just_before = flash.shown_at + Duration::from_millis(4_999);
        assert!(!flash.is_expired_at(just_before));
    }

    #[test]
    fn flash_expires_after_five_seconds() {
        let flash = Flash::error("Activity full");
        let deadline = flash.shown_at + Duration::from_millis(5_000);
        assert!(flash.is_expired_at(deadline));
        assert!(flash.is_expired_at(deadline + Duration::from_secs(60)));
    }
}
