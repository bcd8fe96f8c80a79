use std::fmt;
use std::hash::{
  Hash,
  Hasher
};
use std::str::FromStr;

use serde::{
  Deserialize,
  Serialize
};

/// Identifier of a task as the remote
/// service hands it out. Services in the
/// wild answer with either numbers or
/// strings, so the JSON form is kept
/// verbatim for the round trip back.
///
/// Two ids are the same id when their
/// wire text matches: `42` and `"42"`
/// name one task.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
)]
#[serde(untagged)]
pub enum TaskId {
  Number(serde_json::Number),
  Text(String)
}

impl TaskId {
  pub fn number(n: u64) -> Self {
    TaskId::Number(n.into())
  }

  /// Non-negative integer value, if the
  /// id has one.
  pub fn as_u64(&self) -> Option<u64> {
    match self {
      | TaskId::Number(n) => n.as_u64(),
      | TaskId::Text(s) => s.parse().ok()
    }
  }
}

impl PartialEq for TaskId {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      | (
        TaskId::Text(a),
        TaskId::Text(b)
      ) => a == b,
      | _ => {
        self.to_string()
          == other.to_string()
      }
    }
  }
}

impl Eq for TaskId {}

impl Hash for TaskId {
  fn hash<H: Hasher>(
    &self,
    state: &mut H
  ) {
    self.to_string().hash(state);
  }
}

impl fmt::Display for TaskId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    match self {
      | TaskId::Number(n) => {
        write!(f, "{n}")
      }
      | TaskId::Text(s) => {
        f.write_str(s)
      }
    }
  }
}

impl From<u64> for TaskId {
  fn from(value: u64) -> Self {
    TaskId::number(value)
  }
}

impl From<&str> for TaskId {
  fn from(value: &str) -> Self {
    TaskId::Text(value.to_string())
  }
}

impl FromStr for TaskId {
  type Err = std::convert::Infallible;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    Ok(match trimmed.parse::<u64>() {
      | Ok(n) => TaskId::number(n),
      | Err(_) => {
        TaskId::Text(trimmed.to_string())
      }
    })
  }
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
)]
pub struct ParseEnumError {
  pub kind:  &'static str,
  pub value: String
}

impl fmt::Display for ParseEnumError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "unknown {}: {}",
      self.kind, self.value
    )
  }
}

impl std::error::Error
  for ParseEnumError
{
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
  Low,
  #[default]
  Medium,
  High
}

impl Priority {
  pub const ALL: [Priority; 3] = [
    Priority::Low,
    Priority::Medium,
    Priority::High
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | Priority::Low => "low",
      | Priority::Medium => "medium",
      | Priority::High => "high"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Priority::Low => "Low",
      | Priority::Medium => "Medium",
      | Priority::High => "High"
    }
  }
}

impl fmt::Display for Priority {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Priority {
  type Err = ParseEnumError;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let wanted =
      s.trim().to_ascii_lowercase();
    Priority::ALL
      .into_iter()
      .find(|p| p.as_str() == wanted)
      .ok_or_else(|| ParseEnumError {
        kind:  "priority",
        value: s.to_string()
      })
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Work,
  #[default]
  Personal,
  Shopping,
  Health
}

impl Category {
  pub const ALL: [Category; 4] = [
    Category::Work,
    Category::Personal,
    Category::Shopping,
    Category::Health
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | Category::Work => "work",
      | Category::Personal => "personal",
      | Category::Shopping => "shopping",
      | Category::Health => "health"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Category::Work => "Work",
      | Category::Personal => "Personal",
      | Category::Shopping => "Shopping",
      | Category::Health => "Health"
    }
  }
}

impl fmt::Display for Category {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Category {
  type Err = ParseEnumError;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let wanted =
      s.trim().to_ascii_lowercase();
    Category::ALL
      .into_iter()
      .find(|c| c.as_str() == wanted)
      .ok_or_else(|| ParseEnumError {
        kind:  "category",
        value: s.to_string()
      })
  }
}

/// Wire representation of a to-do item.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Task {
  pub id:        TaskId,
  pub text:      String,
  pub priority:  Priority,
  pub category:  Category,
  #[serde(default)]
  pub completed: bool
}

impl Task {
  pub fn from_draft(
    id: TaskId,
    draft: TaskDraft
  ) -> Self {
    Self {
      id,
      text: draft.text,
      priority: draft.priority,
      category: draft.category,
      completed: false
    }
  }

  /// Returns a copy with every field
  /// present in `patch` replaced.
  pub fn merged(
    &self,
    patch: &TaskPatch
  ) -> Self {
    Self {
      id:        self.id.clone(),
      text:      patch
        .text
        .clone()
        .unwrap_or_else(|| {
          self.text.clone()
        }),
      priority:  patch
        .priority
        .unwrap_or(self.priority),
      category:  patch
        .category
        .unwrap_or(self.category),
      completed: patch
        .completed
        .unwrap_or(self.completed)
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct TaskDraft {
  pub text:     String,
  pub priority: Priority,
  pub category: Category
}

impl TaskDraft {
  pub fn new(
    text: impl Into<String>
  ) -> Self {
    Self {
      text: text.into(),
      ..Self::default()
    }
  }

  pub fn with_priority(
    mut self,
    priority: Priority
  ) -> Self {
    self.priority = priority;
    self
  }

  pub fn with_category(
    mut self,
    category: Category
  ) -> Self {
    self.category = category;
    self
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct TaskPatch {
  pub text:      Option<String>,
  pub priority:  Option<Priority>,
  pub category:  Option<Category>,
  pub completed: Option<bool>
}

impl TaskPatch {
  pub fn completed(done: bool) -> Self {
    Self {
      completed: Some(done),
      ..Self::default()
    }
  }

  pub fn is_empty(&self) -> bool {
    self.text.is_none()
      && self.priority.is_none()
      && self.category.is_none()
      && self.completed.is_none()
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
  #[default]
  Incomplete,
  Complete
}

impl FromStr for Tab {
  type Err = ParseEnumError;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "incomplete" => {
        Ok(Tab::Incomplete)
      }
      | "complete" | "completed" => {
        Ok(Tab::Complete)
      }
      | _ => {
        Err(ParseEnumError {
          kind:  "tab",
          value: s.to_string()
        })
      }
    }
  }
}

/// Either every value or exactly one.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Selection<T> {
  #[default]
  All,
  Only(T)
}

impl<T: PartialEq> Selection<T> {
  pub fn admits(
    &self,
    value: &T
  ) -> bool {
    match self {
      | Selection::All => true,
      | Selection::Only(wanted) => {
        wanted == value
      }
    }
  }
}

impl<T> FromStr for Selection<T>
where
  T: FromStr<Err = ParseEnumError>
{
  type Err = ParseEnumError;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    if s.trim()
      .eq_ignore_ascii_case("all")
    {
      return Ok(Selection::All);
    }
    s.parse().map(Selection::Only)
  }
}

/// Filter state for a listing, passed
/// by value into the view derivation.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct TaskFilters {
  pub tab:      Tab,
  #[serde(default)]
  pub search:   String,
  #[serde(default)]
  pub priority: Selection<Priority>,
  #[serde(default)]
  pub category: Selection<Category>
}

impl TaskFilters {
  pub fn tab(mut self, tab: Tab) -> Self {
    self.tab = tab;
    self
  }

  pub fn search(
    mut self,
    term: impl Into<String>
  ) -> Self {
    self.search = term.into();
    self
  }

  pub fn priority(
    mut self,
    priority: Selection<Priority>
  ) -> Self {
    self.priority = priority;
    self
  }

  pub fn category(
    mut self,
    category: Selection<Category>
  ) -> Self {
    self.category = category;
    self
  }
}
