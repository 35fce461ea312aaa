use serde::Serialize;

pub const WORK_SECONDS: u32 = 25 * 60;
pub const BREAK_SECONDS: u32 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pomodoro {
    remaining_seconds: u32,
    is_work_session: bool,
    running: bool,
}

/// Emitted by [`Pomodoro::tick`] when a session runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSwitch {
    /// Session type that is about to start.
    pub work_session: bool,
}

impl SessionSwitch {
    /// Translation key of the message announcing the new session.
    pub fn message_key(&self) -> &'static str {
        if self.work_session {
            "breakOver"
        } else {
            "workDone"
        }
    }
}

impl Default for Pomodoro {
    fn default() -> Self {
        Self {
            remaining_seconds: WORK_SECONDS,
            is_work_session: true,
            running: false,
        }
    }
}

impl Pomodoro {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn is_work_session(&self) -> bool {
        self.is_work_session
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starts an idle timer, or pauses a running one.
    pub fn start(&mut self) {
        self.running = !self.running;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// One second of countdown. Ignored while idle.
    pub fn tick(&mut self) -> Option<SessionSwitch> {
        if !self.running {
            return None;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return None;
        }

        self.running = false;
        self.is_work_session = !self.is_work_session;
        self.remaining_seconds = if self.is_work_session {
            WORK_SECONDS
        } else {
            BREAK_SECONDS
        };

        Some(SessionSwitch {
            work_session: self.is_work_session,
        })
    }

    pub fn display(&self) -> String {
        format_time(self.remaining_seconds)
    }

    pub fn label_key(&self) -> &'static str {
        if self.is_work_session { "focus" } else { "break" }
    }
}

/// `mm:ss`, both fields zero padded to two digits.
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
