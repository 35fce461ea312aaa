use crate::clock::Clock;
use crate::error::AppError;
use crate::i18n::{self, Translator};
use crate::model::{Category, Note, Tab, Theme, Todo};
use crate::notes::NotesStore;
use crate::notify::{Notice, Notifier};
use crate::pomodoro::Pomodoro;
use crate::stats::Stats;
use crate::storage::{KeyValueStore, Storage, keys};
use crate::todos::TodoStore;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

/// Every input the dashboard reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Without a category the todo lands in the current tab.
    AddTodo {
        text: String,
        deadline: Option<String>,
        category: Option<Category>,
    },
    ToggleTodo(i64),
    DeleteTodo(i64),
    SelectTab(Tab),
    AddNote(String),
    DeleteNote(i64),
    /// Starts the pomodoro, or pauses it when running.
    PomodoroStart,
    PomodoroReset,
    /// One second elapsed.
    Tick,
    SetLanguage(String),
    ToggleTheme,
}

/// What a dispatched event changed. An empty update means the event was a
/// no-op (blank text, unknown id, unsupported language...).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Update {
    pub todos: bool,
    pub stats: bool,
    pub notes: bool,
    pub pomodoro: bool,
    pub language: bool,
    pub theme: bool,
    /// Id of the todo or note the event created.
    pub created: Option<i64>,
    pub notice: Option<Notice>,
}

impl Update {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn merge(&mut self, other: Update) {
        self.todos |= other.todos;
        self.stats |= other.stats;
        self.notes |= other.notes;
        self.pomodoro |= other.pomodoro;
        self.language |= other.language;
        self.theme |= other.theme;
        self.created = other.created.or(self.created);
        self.notice = other.notice.or(self.notice.take());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoRow {
    pub id: i64,
    pub text: String,
    pub deadline: Option<String>,
    pub completed: bool,
    /// Translated category, only in the aggregate tab.
    pub badge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PomodoroView {
    pub display: String,
    pub label: String,
    pub running: bool,
    pub work_session: bool,
}

/// Render-ready snapshot of the whole dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub clock: String,
    pub date: String,
    pub language: String,
    pub theme: String,
    pub tab: String,
    pub todos: Vec<TodoRow>,
    pub notes: Vec<Note>,
    pub stats: Stats,
    pub pomodoro: PomodoroView,
}

pub struct Dashboard<S, C> {
    storage: Storage<S>,
    clock: C,
    notifier: Box<dyn Notifier>,
    translator: Translator,
    todos: TodoStore,
    notes: NotesStore,
    pomodoro: Pomodoro,
    tab: Tab,
    theme: Theme,
}

impl<S: KeyValueStore, C: Clock> Dashboard<S, C> {
    /// Restores persisted state. `fallback_language` applies only when no
    /// supported language has been stored yet.
    pub fn load(
        backend: S,
        clock: C,
        notifier: Box<dyn Notifier>,
        fallback_language: Option<&str>,
    ) -> Result<Self, AppError> {
        let mut storage = Storage::new(backend);

        let language = storage
            .try_load::<String>(keys::LANGUAGE)
            .filter(|code| i18n::is_supported(code))
            .or_else(|| fallback_language.map(str::to_string))
            .unwrap_or_else(|| i18n::DEFAULT_LANGUAGE.to_string());
        let theme = storage.load(keys::THEME, Theme::default());
        let todos = TodoStore::load(&mut storage, &clock)?;
        let notes = NotesStore::load(&storage);

        Ok(Self {
            storage,
            clock,
            notifier,
            translator: Translator::new(&language),
            todos,
            notes,
            pomodoro: Pomodoro::new(),
            tab: Tab::default(),
            theme,
        })
    }

    pub fn dispatch(&mut self, event: Event) -> Result<Update, AppError> {
        let mut update = Update::default();

        match event {
            Event::AddTodo {
                text,
                deadline,
                category,
            } => {
                let category = category.unwrap_or_else(|| self.tab.category_for_new());
                if let Some(todo) = self.todos.add(
                    &mut self.storage,
                    &self.clock,
                    &text,
                    deadline.as_deref(),
                    category,
                )? {
                    update.todos = true;
                    update.created = Some(todo.id);
                }
            }
            Event::ToggleTodo(id) => {
                if self.todos.toggle(&mut self.storage, &self.clock, id)?.is_some() {
                    update.todos = true;
                    update.stats = true;
                }
            }
            Event::DeleteTodo(id) => {
                if self.todos.delete(&mut self.storage, id).is_some() {
                    update.todos = true;
                    update.stats = true;
                }
            }
            Event::SelectTab(tab) => {
                if tab != self.tab {
                    self.tab = tab;
                    update.todos = true;
                }
            }
            Event::AddNote(text) => {
                if let Some(note) = self.notes.add(&mut self.storage, &self.clock, &text)? {
                    update.notes = true;
                    update.created = Some(note.id);
                }
            }
            Event::DeleteNote(id) => {
                update.notes = self.notes.delete(&mut self.storage, id).is_some();
            }
            Event::PomodoroStart => {
                self.pomodoro.start();
                update.pomodoro = true;
            }
            Event::PomodoroReset => {
                self.pomodoro.reset();
                update.pomodoro = true;
            }
            Event::Tick => {
                if self.pomodoro.is_running() {
                    update.pomodoro = true;
                    if let Some(switch) = self.pomodoro.tick() {
                        let notice = Notice::new(self.translator.t(switch.message_key()));
                        if let Err(err) = self.notifier.notify(&notice) {
                            warn!(error = %err, "failed to show session notification");
                        }
                        update.notice = Some(notice);
                    }
                }
            }
            Event::SetLanguage(code) => {
                let code = code.trim();
                if self.translator.set_language(code) {
                    self.storage.save(keys::LANGUAGE, code);
                    info!(language = code, "language changed");
                    update.language = true;
                    update.todos = true;
                    update.pomodoro = true;
                }
            }
            Event::ToggleTheme => {
                self.theme = self.theme.toggled();
                self.storage.save(keys::THEME, &self.theme);
                update.theme = true;
            }
        }

        Ok(update)
    }

    /// Feeds up to `seconds` ticks, stopping as soon as the timer goes idle.
    pub fn advance(&mut self, seconds: u64) -> Result<Update, AppError> {
        let mut update = Update::default();
        for _ in 0..seconds {
            if !self.pomodoro.is_running() {
                break;
            }
            update.merge(self.dispatch(Event::Tick)?);
        }
        Ok(update)
    }

    pub fn view(&self) -> DashboardView {
        let now = self.clock.now();
        let aggregate = self.tab == Tab::General;

        let todos = self
            .todos
            .filter(&self.tab)
            .into_iter()
            .map(|todo| self.todo_row(todo, aggregate))
            .collect();

        DashboardView {
            clock: clock_text(now),
            date: self.translator.format_long_date(now.date()),
            language: self.translator.language().to_string(),
            theme: self.theme.as_str().to_string(),
            tab: self.tab.to_string(),
            todos,
            notes: self.notes.notes().to_vec(),
            stats: self.stats(),
            pomodoro: PomodoroView {
                display: self.pomodoro.display(),
                label: self.translator.t(self.pomodoro.label_key()).to_string(),
                running: self.pomodoro.is_running(),
                work_session: self.pomodoro.is_work_session(),
            },
        }
    }

    fn todo_row(&self, todo: &Todo, aggregate: bool) -> TodoRow {
        TodoRow {
            id: todo.id,
            text: todo.text.clone(),
            deadline: todo.deadline().map(str::to_string),
            completed: todo.completed,
            badge: aggregate.then(|| self.translator.t(todo.category.badge_key()).to_string()),
        }
    }

    pub fn stats(&self) -> Stats {
        self.todos.stats(self.clock.now())
    }

    pub fn todos(&self) -> &TodoStore {
        &self.todos
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.notes()
    }

    pub fn pomodoro(&self) -> &Pomodoro {
        &self.pomodoro
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn tab(&self) -> &Tab {
        &self.tab
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }
}

/// `HH:MM` in the clock's offset.
pub fn clock_text(now: OffsetDateTime) -> String {
    format!("{:02}:{:02}", now.hour(), now.minute())
}

#[cfg(test)]
mod tests {
    use super::{Dashboard, Event, Update, clock_text};
    use crate::clock::FixedClock;
    use crate::error::AppError;
    use crate::model::{Category, Tab, Theme};
    use crate::notify::{Notice, Notifier};
    use crate::pomodoro::{BREAK_SECONDS, WORK_SECONDS};
    use crate::storage::{KeyValueStore, MemoryStore, keys};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;
    use time::Duration;
    use time::macros::datetime;

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        seen: Rc<RefCell<Vec<Notice>>>,
        fail: bool,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: &Notice) -> Result<(), AppError> {
            self.seen.borrow_mut().push(notice.clone());
            if self.fail {
                Err(AppError::io("no notification daemon"))
            } else {
                Ok(())
            }
        }
    }

    fn dashboard_with(
        store: MemoryStore,
        notifier: RecordingNotifier,
    ) -> Dashboard<MemoryStore, FixedClock> {
        let clock = FixedClock::new(datetime!(2026-10-16 12:00 UTC));
        Dashboard::load(store, clock, Box::new(notifier), None).unwrap()
    }

    fn dashboard() -> Dashboard<MemoryStore, FixedClock> {
        dashboard_with(MemoryStore::new(), RecordingNotifier::default())
    }

    fn add(dashboard: &mut Dashboard<MemoryStore, FixedClock>, text: &str) -> i64 {
        dashboard
            .dispatch(Event::AddTodo {
                text: text.to_string(),
                deadline: None,
                category: None,
            })
            .unwrap()
            .created
            .unwrap()
    }

    #[test]
    fn new_todos_take_the_current_tab_category() {
        let mut dashboard = dashboard();
        let daily = add(&mut dashboard, "daily one");

        dashboard.dispatch(Event::SelectTab(Tab::General)).unwrap();
        let other = add(&mut dashboard, "from general");

        dashboard
            .dispatch(Event::SelectTab(Tab::Only(Category::Weekly)))
            .unwrap();
        let weekly = add(&mut dashboard, "weekly one");

        let store = dashboard.todos();
        assert_eq!(store.get(daily).unwrap().category, Category::Daily);
        assert_eq!(store.get(other).unwrap().category, Category::Others);
        assert_eq!(store.get(weekly).unwrap().category, Category::Weekly);
    }

    #[test]
    fn blank_todo_yields_empty_update() {
        let mut dashboard = dashboard();
        let update = dashboard
            .dispatch(Event::AddTodo {
                text: "   ".to_string(),
                deadline: Some("10:00".to_string()),
                category: Some(Category::Daily),
            })
            .unwrap();

        assert!(update.is_empty());
        assert!(dashboard.todos().todos().is_empty());
    }

    #[test]
    fn toggle_and_delete_update_stats() {
        let mut dashboard = dashboard();
        let id = add(&mut dashboard, "a");

        let update = dashboard.dispatch(Event::ToggleTodo(id)).unwrap();
        assert!(update.stats);
        assert_eq!(dashboard.stats().today, 1);

        dashboard.dispatch(Event::DeleteTodo(id)).unwrap();
        assert_eq!(dashboard.stats().total, 0);

        assert!(dashboard.dispatch(Event::DeleteTodo(id)).unwrap().is_empty());
        assert!(dashboard.dispatch(Event::ToggleTodo(id)).unwrap().is_empty());
    }

    #[test]
    fn badges_only_in_general_view() {
        let mut dashboard = dashboard();
        dashboard.dispatch(Event::SetLanguage("en".into())).unwrap();
        add(&mut dashboard, "a");
        dashboard
            .dispatch(Event::AddTodo {
                text: "b".into(),
                deadline: Some("18:00".into()),
                category: Some(Category::Unknown("monthly".into())),
            })
            .unwrap();

        let daily_view = dashboard.view();
        assert_eq!(daily_view.tab, "daily");
        assert_eq!(daily_view.todos.len(), 1);
        assert_eq!(daily_view.todos[0].badge, None);

        dashboard.dispatch(Event::SelectTab(Tab::General)).unwrap();
        let general = dashboard.view();
        let badges: Vec<Option<String>> =
            general.todos.iter().map(|row| row.badge.clone()).collect();
        assert_eq!(badges, vec![Some("Daily".into()), Some("Other".into())]);
        assert_eq!(general.todos[1].deadline.as_deref(), Some("18:00"));
    }

    #[test]
    fn notes_flow_through_dispatch() {
        let mut dashboard = dashboard();
        let id = dashboard
            .dispatch(Event::AddNote("remember".into()))
            .unwrap()
            .created
            .unwrap();
        assert_eq!(dashboard.notes().len(), 1);

        assert!(dashboard.dispatch(Event::AddNote(" ".into())).unwrap().is_empty());

        let update = dashboard.dispatch(Event::DeleteNote(id)).unwrap();
        assert!(update.notes);
        assert!(dashboard.notes().is_empty());
    }

    #[test]
    fn finished_work_session_notifies_in_current_language() {
        let notifier = RecordingNotifier::default();
        let seen = notifier.seen.clone();
        let mut dashboard = dashboard_with(MemoryStore::new(), notifier);
        dashboard.dispatch(Event::SetLanguage("en".into())).unwrap();

        dashboard.dispatch(Event::PomodoroStart).unwrap();
        let update = dashboard.advance(u64::from(WORK_SECONDS) + 30).unwrap();

        assert_eq!(
            update.notice,
            Some(Notice::new("Great work! Time for a break."))
        );
        assert_eq!(seen.borrow().len(), 1);
        assert!(!dashboard.pomodoro().is_running());
        assert_eq!(dashboard.pomodoro().remaining_seconds(), BREAK_SECONDS);
        assert_eq!(dashboard.view().pomodoro.label, "Break");

        dashboard.dispatch(Event::PomodoroStart).unwrap();
        let update = dashboard.advance(u64::from(BREAK_SECONDS)).unwrap();
        assert_eq!(
            update.notice.map(|notice| notice.body),
            Some("Break is over! Time to focus.".to_string())
        );
        assert!(dashboard.pomodoro().is_work_session());
        assert_eq!(dashboard.pomodoro().remaining_seconds(), WORK_SECONDS);
    }

    #[test]
    fn notification_failures_are_swallowed() {
        let notifier = RecordingNotifier {
            fail: true,
            ..RecordingNotifier::default()
        };
        let mut dashboard = dashboard_with(MemoryStore::new(), notifier);

        dashboard.dispatch(Event::PomodoroStart).unwrap();
        let update = dashboard.advance(u64::from(WORK_SECONDS)).unwrap();

        assert!(update.notice.is_some());
        assert!(!dashboard.pomodoro().is_work_session());
    }

    #[test]
    fn ticks_while_idle_change_nothing() {
        let mut dashboard = dashboard();
        assert!(dashboard.dispatch(Event::Tick).unwrap().is_empty());
        assert_eq!(dashboard.advance(10).unwrap(), Update::default());
        assert_eq!(dashboard.view().pomodoro.display, "25:00");
    }

    #[test]
    fn pause_and_reset() {
        let mut dashboard = dashboard();
        dashboard.dispatch(Event::PomodoroStart).unwrap();
        dashboard.advance(65).unwrap();
        assert_eq!(dashboard.view().pomodoro.display, "23:55");

        dashboard.dispatch(Event::PomodoroStart).unwrap();
        dashboard.advance(5).unwrap();
        assert_eq!(dashboard.view().pomodoro.display, "23:55");

        dashboard.dispatch(Event::PomodoroReset).unwrap();
        let view = dashboard.view();
        assert_eq!(view.pomodoro.display, "25:00");
        assert!(!view.pomodoro.running);
        assert!(view.pomodoro.work_session);
    }

    #[test]
    fn language_is_persisted_and_restored() {
        let mut dashboard = dashboard();
        assert_eq!(dashboard.translator().language(), "tr");

        assert!(dashboard.dispatch(Event::SetLanguage("xx".into())).unwrap().is_empty());
        let update = dashboard.dispatch(Event::SetLanguage("de".into())).unwrap();
        assert!(update.language);

        let store = dashboard.storage().backend().clone();
        assert_eq!(store.get(keys::LANGUAGE).unwrap().as_deref(), Some("\"de\""));

        let restored = dashboard_with(store, RecordingNotifier::default());
        assert_eq!(restored.translator().language(), "de");
        assert_eq!(restored.view().pomodoro.label, "Fokus");
    }

    #[test]
    fn fallback_language_applies_only_without_stored_choice() {
        let clock = FixedClock::new(datetime!(2026-10-16 12:00 UTC));
        let fresh = Dashboard::load(
            MemoryStore::new(),
            clock.clone(),
            Box::new(RecordingNotifier::default()),
            Some("en"),
        )
        .unwrap();
        assert_eq!(fresh.translator().language(), "en");

        let stored = MemoryStore::new().with_entry(keys::LANGUAGE, "\"de\"");
        let chosen = Dashboard::load(
            stored,
            clock,
            Box::new(RecordingNotifier::default()),
            Some("en"),
        )
        .unwrap();
        assert_eq!(chosen.translator().language(), "de");
    }

    #[test]
    fn theme_toggle_persists() {
        let mut dashboard = dashboard();
        assert_eq!(dashboard.theme(), Theme::Dark);

        dashboard.dispatch(Event::ToggleTheme).unwrap();
        assert_eq!(dashboard.theme(), Theme::Light);

        let store = dashboard.storage().backend().clone();
        let restored = dashboard_with(store, RecordingNotifier::default());
        assert_eq!(restored.theme(), Theme::Light);
    }

    #[test]
    fn unknown_stored_theme_falls_back_to_dark() {
        let store = MemoryStore::new().with_entry(keys::THEME, "\"sepia\"");
        assert_eq!(
            dashboard_with(store, RecordingNotifier::default()).theme(),
            Theme::Dark
        );
    }

    #[test]
    fn view_shows_clock_and_localized_date() {
        let mut dashboard = dashboard();
        dashboard.clock().advance(Duration::minutes(7));

        let view = dashboard.view();
        assert_eq!(view.clock, "12:07");
        assert_eq!(view.date, "16 Ekim Cuma");

        dashboard.dispatch(Event::SetLanguage("en".into())).unwrap();
        assert_eq!(dashboard.view().date, "Friday, October 16");

        dashboard.clock().set(datetime!(2026-10-18 09:30 UTC));
        let view = dashboard.view();
        assert_eq!(view.clock, "09:30");
        assert_eq!(view.date, "Sunday, October 18");
    }

    #[test]
    fn clock_text_pads_fields() {
        assert_eq!(clock_text(datetime!(2026-10-16 07:05 UTC)), "07:05");
    }

    #[test]
    fn stats_use_the_injected_clock() {
        let mut dashboard = dashboard();
        let id = add(&mut dashboard, "a");
        dashboard.dispatch(Event::ToggleTodo(id)).unwrap();

        dashboard.clock().advance(Duration::days(1));
        let stats = dashboard.stats();
        assert_eq!((stats.today, stats.week, stats.total), (0, 1, 1));

        dashboard.clock().advance(Duration::days(2));
        let stats = dashboard.stats();
        assert_eq!((stats.today, stats.week, stats.total), (0, 0, 1));
    }
}
