//! User-facing messages for the outcome of each store operation.

use taskboard_shared::Task;

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Fetch,
    Add,
    Update,
    Toggle,
    Delete,
}

impl Action {
    fn failure_message(self) -> &'static str {
        match self {
            Action::Fetch => "Failed to fetch todos",
            Action::Add => "Failed to add todo",
            Action::Update | Action::Toggle => "Failed to update todo",
            Action::Delete => "Failed to delete todo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
    pub icon: Option<char>,
}

impl Notice {
    fn new(level: Level, message: &str) -> Self {
        Self {
            level,
            message: message.to_string(),
            icon: None,
        }
    }

    /// Acknowledgement for a finished operation. Fetches are silent.
    pub fn success(action: Action) -> Option<Self> {
        match action {
            Action::Fetch => None,
            Action::Add => Some(Self::new(Level::Success, "Todo added successfully!")),
            Action::Update => Some(Self::new(Level::Success, "Todo updated successfully!")),
            Action::Delete => Some(Self::new(Level::Success, "Todo deleted")),
            // toggle depends on the resulting state
            Action::Toggle => None,
        }
    }

    /// `task` is the representation returned by the service.
    pub fn toggled(task: &Task) -> Self {
        if task.completed {
            Self {
                level: Level::Info,
                message: "Todo completed!".to_string(),
                icon: Some('✅'),
            }
        } else {
            Self {
                level: Level::Info,
                message: "Todo marked incomplete".to_string(),
                icon: Some('❌'),
            }
        }
    }

    pub fn failure(action: Action, err: &StoreError) -> Self {
        match err {
            StoreError::Validation(crate::error::ValidationError::EmptyText) => {
                Self::new(Level::Error, "Todo cannot be empty")
            }
            _ => Self::new(Level::Error, action.failure_message()),
        }
    }
}
