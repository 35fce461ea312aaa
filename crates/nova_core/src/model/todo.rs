use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Category {
    Daily,
    Weekly,
    #[default]
    Others,
    /// A name this build does not know about. Kept verbatim so that a
    /// round trip through storage never rewrites it.
    Unknown(String),
    /// A stored value that is not a string at all (`null`, a number...).
    /// Written back exactly as read.
    Raw(Value),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Others => "others",
            Self::Unknown(raw) => raw,
            Self::Raw(_) => "others",
        }
    }

    /// Translation key of the badge shown in the aggregate view.
    pub fn badge_key(&self) -> &'static str {
        match self {
            Self::Daily => "catDaily",
            Self::Weekly => "catWeekly",
            Self::Others | Self::Unknown(_) | Self::Raw(_) => "catOther",
        }
    }
}

impl From<&str> for Category {
    fn from(raw: &str) -> Self {
        match raw {
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "others" => Self::Others,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        match Category::from(raw.as_str()) {
            Self::Unknown(_) => Self::Unknown(raw),
            known => known,
        }
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Raw(value) => value.serialize(serializer),
            named => serializer.serialize_str(named.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => Self::from(raw),
            other => Self::Raw(other),
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which slice of the todo list is on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tab {
    General,
    Only(Category),
}

impl Tab {
    pub fn as_str(&self) -> &str {
        match self {
            Self::General => "general",
            Self::Only(category) => category.as_str(),
        }
    }

    pub fn includes(&self, todo: &Todo) -> bool {
        match self {
            Self::General => true,
            Self::Only(category) => &todo.category == category,
        }
    }

    /// Category given to a todo added while this tab is active.
    pub fn category_for_new(&self) -> Category {
        match self {
            Self::General => Category::Others,
            Self::Only(category) => category.clone(),
        }
    }
}

impl Default for Tab {
    fn default() -> Self {
        Self::Only(Category::Daily)
    }
}

impl From<&str> for Tab {
    fn from(raw: &str) -> Self {
        match raw.trim() {
            "general" => Self::General,
            other => Self::Only(Category::from(other)),
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub completed: bool,
    pub created_at: String,
}

impl Todo {
    /// Deadline label, if one was entered.
    pub fn deadline(&self) -> Option<&str> {
        self.deadline
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTaskRecord {
    pub id: i64,
    pub text: String,
    pub completed_at: String,
}
