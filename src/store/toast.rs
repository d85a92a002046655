//! Toast notifications
//!
//! Newest toast first, at most [`TOAST_LIMIT`] kept. Dismissing closes a
//! toast; it is removed once [`TOAST_REMOVE_DELAY`] has passed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::Reducible;

pub const TOAST_LIMIT: usize = 5;
pub const TOAST_REMOVE_DELAY: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub variant: ToastVariant,
    pub open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dismissed_at: Option<DateTime<Utc>>,
}

impl Toast {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: Some(title.into()),
            description: None,
            variant: ToastVariant::Default,
            open: true,
            dismissed_at: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn variant(mut self, variant: ToastVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Error toast
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title)
            .description(description)
            .variant(ToastVariant::Destructive)
    }

    fn expired(&self, now: DateTime<Utc>) -> bool {
        self.dismissed_at
            .and_then(|at| (now - at).to_std().ok())
            .map(|elapsed| elapsed >= TOAST_REMOVE_DELAY)
            .unwrap_or(false)
    }
}

/// Partial update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastUpdate {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub variant: Option<ToastVariant>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToastAction {
    Add(Toast),
    Update(ToastUpdate),
    /// Close one toast, or all when `id` is `None`
    Dismiss { id: Option<String>, at: DateTime<Utc> },
    /// Remove one toast, or all when `id` is `None`
    Remove { id: Option<String> },
    /// Remove dismissed toasts whose delay has elapsed
    PruneDismissed { now: DateTime<Utc> },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToastState {
    pub toasts: Vec<Toast>,
}

impl ToastState {
    pub fn get(&self, id: &str) -> Option<&Toast> {
        self.toasts.iter().find(|t| t.id == id)
    }

    pub fn open_count(&self) -> usize {
        self.toasts.iter().filter(|t| t.open).count()
    }
}

impl Reducible for ToastState {
    type Action = ToastAction;

    fn reduce(&mut self, action: ToastAction) {
        match action {
            ToastAction::Add(toast) => {
                self.toasts.insert(0, toast);
                self.toasts.truncate(TOAST_LIMIT);
            }
            ToastAction::Update(update) => {
                if let Some(toast) = self.toasts.iter_mut().find(|t| t.id == update.id) {
                    if let Some(title) = update.title {
                        toast.title = Some(title);
                    }
                    if let Some(description) = update.description {
                        toast.description = Some(description);
                    }
                    if let Some(variant) = update.variant {
                        toast.variant = variant;
                    }
                }
            }
            ToastAction::Dismiss { id, at } => {
                for toast in &mut self.toasts {
                    if id.as_deref().map_or(true, |id| toast.id == id) && toast.open {
                        toast.open = false;
                        toast.dismissed_at = Some(at);
                    }
                }
            }
            ToastAction::Remove { id: Some(id) } => self.toasts.retain(|t| t.id != id),
            ToastAction::Remove { id: None } => self.toasts.clear(),
            ToastAction::PruneDismissed { now } => self.toasts.retain(|t| !t.expired(now)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn state_with(n: usize) -> ToastState {
        let mut state = ToastState::default();
        for i in 0..n {
            state.reduce(ToastAction::Add(Toast::new(format!("toast {}", i))));
        }
        state
    }

    #[test]
    fn test_add_is_newest_first_and_limited() {
        let state = state_with(7);
        assert_eq!(state.toasts.len(), TOAST_LIMIT);
        assert_eq!(state.toasts[0].title.as_deref(), Some("toast 6"));
        assert_eq!(state.toasts[4].title.as_deref(), Some("toast 2"));
    }

    #[test]
    fn test_update_merges_fields() {
        let mut state = state_with(1);
        let id = state.toasts[0].id.clone();

        state.reduce(ToastAction::Update(ToastUpdate {
            id: id.clone(),
            description: Some("details".to_string()),
            ..Default::default()
        }));

        let toast = state.get(&id).unwrap();
        assert_eq!(toast.title.as_deref(), Some("toast 0"));
        assert_eq!(toast.description.as_deref(), Some("details"));
    }

    #[test]
    fn test_dismiss_one_and_all() {
        let mut state = state_with(3);
        let now = Utc::now();
        let id = state.toasts[1].id.clone();

        state.reduce(ToastAction::Dismiss { id: Some(id.clone()), at: now });
        assert!(!state.get(&id).unwrap().open);
        assert_eq!(state.open_count(), 2);

        state.reduce(ToastAction::Dismiss { id: None, at: now });
        assert_eq!(state.open_count(), 0);
        assert_eq!(state.toasts.len(), 3);
    }

    #[test]
    fn test_remove_one_and_all() {
        let mut state = state_with(3);
        let id = state.toasts[0].id.clone();

        state.reduce(ToastAction::Remove { id: Some(id.clone()) });
        assert!(state.get(&id).is_none());
        assert_eq!(state.toasts.len(), 2);

        state.reduce(ToastAction::Remove { id: None });
        assert!(state.toasts.is_empty());
    }

    #[test]
    fn test_prune_waits_for_remove_delay() {
        let mut state = state_with(2);
        let dismissed_at = Utc::now();
        let id = state.toasts[0].id.clone();
        state.reduce(ToastAction::Dismiss { id: Some(id), at: dismissed_at });

        state.reduce(ToastAction::PruneDismissed {
            now: dismissed_at + ChronoDuration::milliseconds(4999),
        });
        assert_eq!(state.toasts.len(), 2);

        state.reduce(ToastAction::PruneDismissed {
            now: dismissed_at + ChronoDuration::milliseconds(5000),
        });
        assert_eq!(state.toasts.len(), 1);
        assert!(state.toasts[0].open);
    }
}
