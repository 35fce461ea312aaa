use clap::{CommandFactory, Parser};
use nova_cli::cli::{
    Cli, Command, NoteCommand, PomodoroCommand, ThemeCommand, TodoCommand, collect_overrides,
    split_command_line,
};
use nova_core::clock::SystemClock;
use nova_core::config::{self, ConfigOverrides};
use nova_core::dashboard::{DashboardView, TodoRow};
use nova_core::error::AppError;
use nova_core::i18n;
use nova_core::model::{Category, Note, Tab};
use nova_core::notify::notifier_from_env;
use nova_core::storage::JsonFileStore;
use nova_core::storage::json_store::store_path;
use nova_core::{Dashboard, Event, Update};
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

type App = Dashboard<JsonFileStore, SystemClock>;

#[derive(Tabled)]
struct TodoLine {
    #[tabled(rename = "id")]
    id: i64,
    #[tabled(rename = "done")]
    done: &'static str,
    #[tabled(rename = "text")]
    text: String,
    #[tabled(rename = "deadline")]
    deadline: String,
    #[tabled(rename = "category")]
    badge: String,
}

impl From<&TodoRow> for TodoLine {
    fn from(row: &TodoRow) -> Self {
        Self {
            id: row.id,
            done: if row.completed { "x" } else { "" },
            text: row.text.clone(),
            deadline: row.deadline.clone().unwrap_or_else(|| "-".to_string()),
            badge: row.badge.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct NoteLine {
    #[tabled(rename = "id")]
    id: i64,
    #[tabled(rename = "note")]
    text: String,
}

impl From<&Note> for NoteLine {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id,
            text: note.text.clone(),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("NOVA_DASH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn open_dashboard(overrides: &ConfigOverrides) -> Result<App, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        warn!(error = %err, "using default configuration");
    }
    let config = config::merge_overrides(&loaded.config, overrides);

    let path = store_path(config.store_path.as_deref())?;
    let store = JsonFileStore::open(&path)?;
    debug!(path = %store.path().display(), "opened store");
    let notifier = notifier_from_env(config.notifications_enabled())?;

    Dashboard::load(store, SystemClock, notifier, config.language.as_deref())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn print_todos(rows: &[TodoRow]) {
    let lines: Vec<TodoLine> = rows.iter().map(TodoLine::from).collect();
    println!("{}", Table::new(lines).with(Style::psql()));
}

fn print_notes(notes: &[Note]) {
    let lines: Vec<NoteLine> = notes.iter().map(NoteLine::from).collect();
    println!("{}", Table::new(lines).with(Style::psql()));
}

fn print_stats(app: &App) {
    let stats = app.stats();
    let t = app.translator();
    println!(
        "{}: {} | {}: {} | {}: {}",
        t.t("statToday"),
        stats.today,
        t.t("statWeek"),
        stats.week,
        t.t("statTotal"),
        stats.total
    );
}

fn print_pomodoro(view: &DashboardView) {
    let state = if view.pomodoro.running { "running" } else { "paused" };
    println!(
        "{} {} ({})",
        view.pomodoro.label, view.pomodoro.display, state
    );
}

fn print_dashboard(app: &App, view: &DashboardView) {
    println!("{}  {}", view.clock, view.date);
    print_pomodoro(view);
    print_stats(app);
    println!("[{}]", view.tab);
    print_todos(&view.todos);
    println!("{}", app.translator().t("notes"));
    print_notes(&view.notes);
}

fn print_notice(update: &Update) {
    if let Some(notice) = update.notice.as_ref() {
        println!("{}: {}", notice.title, notice.body);
    }
}

fn parse_tab(raw: &str) -> Result<Tab, AppError> {
    match Tab::from(raw.trim().to_ascii_lowercase().as_str()) {
        Tab::Only(Category::Unknown(name)) => {
            Err(AppError::invalid_input(format!("unknown tab: {name}")))
        }
        tab => Ok(tab),
    }
}

fn parse_category(raw: &str) -> Result<Category, AppError> {
    match Category::from(raw.trim().to_ascii_lowercase().as_str()) {
        Category::Unknown(name) => Err(AppError::invalid_input(format!(
            "unknown category: {name}"
        ))),
        category => Ok(category),
    }
}

fn run_todo(app: &mut App, command: TodoCommand, json: bool) -> Result<(), AppError> {
    match command {
        TodoCommand::Add {
            text,
            deadline,
            category,
        } => {
            let category = category.as_deref().map(parse_category).transpose()?;
            let update = app.dispatch(Event::AddTodo {
                text,
                deadline,
                category,
            })?;
            let created = update.created.and_then(|id| app.todos().get(id));
            match created {
                Some(todo) if json => print_json(todo)?,
                Some(todo) => println!("Added todo: {} ({})", todo.text, todo.id),
                None if json => print_json(&serde_json::Value::Null)?,
                None => {}
            }
        }
        TodoCommand::Toggle { id } => {
            if app.dispatch(Event::ToggleTodo(id))?.is_empty() {
                return Err(AppError::invalid_input("todo not found"));
            }
            let todo = app
                .todos()
                .get(id)
                .ok_or_else(|| AppError::invalid_input("todo not found"))?;
            if json {
                print_json(todo)?;
            } else if todo.completed {
                println!("Completed todo: {} ({})", todo.text, todo.id);
            } else {
                println!("Reopened todo: {} ({})", todo.text, todo.id);
            }
        }
        TodoCommand::Delete { id } => {
            let todo = app
                .todos()
                .get(id)
                .cloned()
                .ok_or_else(|| AppError::invalid_input("todo not found"))?;
            app.dispatch(Event::DeleteTodo(id))?;
            if json {
                print_json(&todo)?;
            } else {
                println!("Deleted todo: {} ({})", todo.text, todo.id);
            }
        }
        TodoCommand::Tab { name } => {
            app.dispatch(Event::SelectTab(parse_tab(&name)?))?;
            if json {
                print_json(&serde_json::json!({ "tab": app.tab().as_str() }))?;
            } else {
                println!("Tab: {}", app.tab());
            }
        }
        TodoCommand::List { tab } => {
            if let Some(name) = tab {
                app.dispatch(Event::SelectTab(parse_tab(&name)?))?;
            }
            let view = app.view();
            if json {
                print_json(&view.todos)?;
            } else {
                print_todos(&view.todos);
            }
        }
    }

    Ok(())
}

fn run_note(app: &mut App, command: NoteCommand, json: bool) -> Result<(), AppError> {
    match command {
        NoteCommand::Add { text } => {
            let update = app.dispatch(Event::AddNote(text))?;
            let created = update
                .created
                .and_then(|id| app.notes().iter().find(|note| note.id == id));
            match created {
                Some(note) if json => print_json(note)?,
                Some(note) => println!("Added note: {} ({})", note.text, note.id),
                None if json => print_json(&serde_json::Value::Null)?,
                None => {}
            }
        }
        NoteCommand::Delete { id } => {
            let note = app
                .notes()
                .iter()
                .find(|note| note.id == id)
                .cloned()
                .ok_or_else(|| AppError::invalid_input("note not found"))?;
            app.dispatch(Event::DeleteNote(id))?;
            if json {
                print_json(&note)?;
            } else {
                println!("Deleted note: {} ({})", note.text, note.id);
            }
        }
        NoteCommand::List => {
            if json {
                print_json(app.notes())?;
            } else {
                print_notes(app.notes());
            }
        }
    }

    Ok(())
}

/// Runs the timer in the foreground until `cycles` sessions have ended.
/// With `--json` nothing is printed until the end, then one summary document.
fn run_pomodoro(app: &mut App, cycles: u32, json: bool) -> Result<(), AppError> {
    let mut notices = Vec::new();
    while notices.len() < cycles as usize {
        if !app.pomodoro().is_running() {
            app.dispatch(Event::PomodoroStart)?;
        }

        std::thread::sleep(Duration::from_secs(1));
        let update = app.advance(1)?;

        if !json {
            let view = app.view();
            print!("\r{} {}", view.pomodoro.label, view.pomodoro.display);
            io::stdout()
                .flush()
                .map_err(|err| AppError::io(err.to_string()))?;
        }

        if let Some(notice) = update.notice.as_ref() {
            if !json {
                println!();
                print_notice(&update);
            }
            notices.push(notice.body.clone());
        }
    }

    if json {
        print_json(&serde_json::json!({
            "sessions": notices.len(),
            "notices": notices,
            "pomodoro": app.view().pomodoro,
        }))?;
    }

    Ok(())
}

fn run_command(app: &mut App, command: Command, json: bool) -> Result<(), AppError> {
    match command {
        Command::Todo { todo } => run_todo(app, todo, json)?,
        Command::Note { note } => run_note(app, note, json)?,
        Command::Stats => {
            if json {
                print_json(&app.stats())?;
            } else {
                print_stats(app);
            }
        }
        Command::Clock => {
            let view = app.view();
            if json {
                print_json(&serde_json::json!({
                    "clock": view.clock,
                    "date": view.date,
                    "locale": app.translator().date_locale(),
                }))?;
            } else {
                println!("{}  {}", view.clock, view.date);
            }
        }
        Command::Show => {
            let view = app.view();
            if json {
                print_json(&view)?;
            } else {
                print_dashboard(app, &view);
            }
        }
        Command::Lang { code } => {
            if let Some(code) = code {
                let code = code.trim().to_ascii_lowercase();
                if !i18n::is_supported(&code) {
                    return Err(AppError::invalid_input(format!(
                        "unsupported language: {code}"
                    )));
                }
                app.dispatch(Event::SetLanguage(code))?;
            }
            let language = app.translator().language();
            if json {
                print_json(&serde_json::json!({
                    "language": language,
                    "available": i18n::supported_languages().collect::<Vec<_>>(),
                }))?;
            } else {
                println!("Language: {language}");
            }
        }
        Command::Theme { action } => {
            if let Some(ThemeCommand::Toggle) = action {
                app.dispatch(Event::ToggleTheme)?;
            }
            let theme = app.theme().as_str();
            if json {
                print_json(&serde_json::json!({ "theme": theme }))?;
            } else {
                println!("Theme: {theme}");
            }
        }
        Command::Pomodoro { action } => {
            match action {
                PomodoroCommand::Run { cycles } => return run_pomodoro(app, cycles, json),
                PomodoroCommand::Start => {
                    app.dispatch(Event::PomodoroStart)?;
                }
                PomodoroCommand::Reset => {
                    app.dispatch(Event::PomodoroReset)?;
                }
                PomodoroCommand::Status => {}
            }
            let view = app.view();
            if json {
                print_json(&view.pomodoro)?;
            } else {
                print_pomodoro(&view);
            }
        }
    }

    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

/// Line-oriented session. The pomodoro keeps counting between commands: each
/// line first replays the whole seconds elapsed since the previous one.
fn run_interactive(app: &mut App) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();
    let mut last_tick = Instant::now();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let elapsed = last_tick.elapsed().as_secs();
        last_tick += Duration::from_secs(elapsed);
        print_notice(&app.advance(elapsed)?);

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(message) => {
                eprintln!("ERROR: {}", AppError::invalid_input(message));
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("nova_dash".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if !cli.config_override.is_empty() {
            eprintln!(
                "ERROR: {}",
                AppError::invalid_input("--config-override is not available in interactive mode")
            );
            continue;
        }

        if let Err(err) = run_command(app, cli.command, cli.json) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn exit_with(err: AppError) -> ! {
    eprintln!("ERROR: {}", err);
    std::process::exit(1);
}

fn main() {
    init_tracing();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        let result = open_dashboard(&ConfigOverrides::default())
            .and_then(|mut app| run_interactive(&mut app));
        if let Err(err) = result {
            exit_with(err);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version
            let _ = err.print();
            return;
        }
        Err(err) => exit_with(normalize_parse_error(err)),
    };

    let overrides = collect_overrides(&cli.config_override)
        .map_err(AppError::invalid_input)
        .unwrap_or_else(|err| exit_with(err));

    let result = open_dashboard(&overrides)
        .and_then(|mut app| run_command(&mut app, cli.command, cli.json));
    if let Err(err) = result {
        exit_with(err);
    }
}
