//! Dashboard UI state: toasts and theme

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::toast::{Toast, ToastAction, ToastState};
use super::{Reducible, Store};

/// Colour scheme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    /// Concrete theme once the platform preference is known
    pub fn resolve(self, prefers_dark: bool) -> Theme {
        match self {
            Theme::System if prefers_dark => Theme::Dark,
            Theme::System => Theme::Light,
            explicit => explicit,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UiState {
    pub toasts: ToastState,
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    Toast(ToastAction),
    SetTheme(Theme),
}

impl Reducible for UiState {
    type Action = AppAction;

    fn reduce(&mut self, action: AppAction) {
        match action {
            AppAction::Toast(action) => self.toasts.reduce(action),
            AppAction::SetTheme(theme) => self.theme = theme,
        }
    }
}

pub type AppStore = Store<UiState>;

impl Store<UiState> {
    /// Show a toast; returns its id
    pub async fn toast(&self, toast: Toast) -> String {
        let id = toast.id.clone();
        self.dispatch(AppAction::Toast(ToastAction::Add(toast))).await;
        id
    }

    /// Dismiss one toast, or all when `id` is `None`
    pub async fn dismiss_toast(&self, id: Option<&str>) {
        self.dispatch(AppAction::Toast(ToastAction::Dismiss {
            id: id.map(str::to_string),
            at: Utc::now(),
        }))
        .await;
    }

    /// Remove toasts dismissed long enough ago
    pub async fn prune_dismissed(&self, now: DateTime<Utc>) {
        self.dispatch(AppAction::Toast(ToastAction::PruneDismissed { now }))
            .await;
    }

    pub async fn set_theme(&self, theme: Theme) {
        self.dispatch(AppAction::SetTheme(theme)).await;
    }
}
