use clap::{Parser, Subcommand};
use nova_core::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(name = "nova_dash", author, version, about = "Clock, to-dos, pomodoro and notes in the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage to-dos
    ///
    /// Example: nova_dash todo add "Buy milk" --category daily
    Todo {
        #[command(subcommand)]
        todo: TodoCommand,
    },
    /// Manage notes
    ///
    /// Example: nova_dash note add "Call the dentist"
    Note {
        #[command(subcommand)]
        note: NoteCommand,
    },
    /// Show completion statistics
    Stats,
    /// Show the current time and date
    Clock,
    /// Show the whole dashboard
    Show,
    /// Show or change the language
    ///
    /// Example: nova_dash lang en
    Lang { code: Option<String> },
    /// Show or toggle the theme
    ///
    /// Example: nova_dash theme toggle
    Theme {
        #[command(subcommand)]
        action: Option<ThemeCommand>,
    },
    /// Pomodoro timer
    ///
    /// Example: nova_dash pomodoro run --cycles 2
    Pomodoro {
        #[command(subcommand)]
        action: PomodoroCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum TodoCommand {
    /// Add a to-do to the current tab, or to --category
    Add {
        text: String,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Mark a to-do done, or undo that
    Toggle { id: i64 },
    /// Delete a to-do
    Delete { id: i64 },
    /// Switch the current tab (general, daily, weekly, others)
    Tab { name: String },
    /// List to-dos of the current tab, or of --tab
    List {
        #[arg(long)]
        tab: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum NoteCommand {
    /// Add a note
    Add { text: String },
    /// Delete a note
    Delete { id: i64 },
    /// List notes
    List,
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommand {
    /// Switch between dark and light
    Toggle,
}

#[derive(Subcommand, Debug)]
pub enum PomodoroCommand {
    /// Run the timer in the foreground
    Run {
        /// Number of sessions to run before exiting
        #[arg(long, default_value_t = 1)]
        cycles: u32,
    },
    /// Start the timer, or pause it when running
    Start,
    /// Stop the timer and go back to a fresh work session
    Reset,
    /// Show the timer
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverride {
    StorePath(String),
    Language(String),
    Notifications(bool),
}

/// Parse a raw `KEY=VALUE` override string.
pub fn parse_config_override(raw: &str) -> Result<ConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let key = canonicalize_flag_name(key_raw)
        .ok_or_else(|| "override key cannot be empty".to_string())?;

    match key.as_str() {
        "store_path" | "store" => Ok(ConfigOverride::StorePath(value)),
        "language" | "lang" => Ok(ConfigOverride::Language(value.to_ascii_lowercase())),
        "notifications" => match value.to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Ok(ConfigOverride::Notifications(true)),
            "false" | "off" | "no" | "0" => Ok(ConfigOverride::Notifications(false)),
            other => Err(format!("notifications must be true or false, got '{other}'")),
        },
        other => Err(format!("unknown config field '{other}'")),
    }
}

pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        match parse_config_override(entry)? {
            ConfigOverride::StorePath(path) => overrides.store_path = Some(path),
            ConfigOverride::Language(code) => overrides.language = Some(code),
            ConfigOverride::Notifications(enabled) => overrides.notifications = Some(enabled),
        }
    }
    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Splits a REPL line into arguments. Double quotes group words; inside
/// quotes `\"` and `\\` are escapes.
pub fn split_command_line(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        match ch {
            '\\' if in_quotes => escape = true,
            '"' => in_quotes = !in_quotes,
            ch if ch.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            ch => current.push(ch),
        }
    }

    if in_quotes {
        return Err("unterminated quote in command".to_string());
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}
