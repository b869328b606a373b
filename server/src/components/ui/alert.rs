use maud::{html, Markup, Render};

use crate::outcome::FormOutcome;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertKind {
    Info,
    Error,
}

pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    pub fn info(message: &str) -> Self {
        Self {
            kind: AlertKind::Info,
            message: message.to_string(),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            kind: AlertKind::Error,
            message: message.to_string(),
        }
    }

    /// Info on success, error on fault, nothing when there is no message
    pub fn for_outcome<T>(outcome: Option<&FormOutcome<T>>) -> Option<Self> {
        let outcome = outcome?;
        let message = outcome.message()?;

        Some(if outcome.is_success() {
            Self::info(message)
        } else {
            Self::error(message)
        })
    }
}

impl Render for Alert {
    fn render(&self) -> Markup {
        let classes = match self.kind {
            AlertKind::Info => "bg-sky-100 text-sky-800 border-sky-200",
            AlertKind::Error => "bg-red-100 text-red-800 border-red-200",
        };

        html! {
            div class={"mb-10 rounded-lg border px-4 py-3 " (classes)} role="alert" {
                (self.message)
            }
        }
    }
}
