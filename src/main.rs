mod app;
mod config;
mod doc;
mod editor;
mod format;
mod grid;
mod history;
mod input;
mod mode;
mod selection;
mod session;
mod store;
mod string;
mod style;
mod ui;
mod util;

use std::io::{self, Write};
use std::panic;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::fmt::writer::MakeWriter;

use crossterm::{
    cursor::MoveToColumn,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use app::{App, Message};
use config::AppConfig;
use editor::CellTableEditor;
use grid::Surface;
use store::FileStore;
use style::{Style, Theme};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    store: Option<PathBuf>,
    tables: Option<usize>,
    rows: Option<usize>,
    cols: Option<usize>,
    theme: Option<String>,
}

fn fail(msg: &str) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

/// Value following a flag
fn value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i + 1) {
        Some(v) => v.as_str(),
        None => fail(&format!("{} requires an argument", flag)),
    }
}

fn count(args: &[String], i: usize, flag: &str) -> usize {
    match value(args, i, flag).parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => fail(&format!("{} expects a positive number", flag)),
    }
}

/// Parse command line arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" => parsed.config = Some(PathBuf::from(value(&args, i, "--config"))),
            "-s" | "--store" => parsed.store = Some(PathBuf::from(value(&args, i, "--store"))),
            "--tables" => parsed.tables = Some(count(&args, i, "--tables")),
            "--rows" => parsed.rows = Some(count(&args, i, "--rows")),
            "--cols" => parsed.cols = Some(count(&args, i, "--cols")),
            "-t" | "--theme" => parsed.theme = Some(value(&args, i, "--theme").to_string()),
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            arg => fail(&format!("unknown option: {}", arg)),
        }
        i += 2;
    }

    parsed
}

/// Handle panics gracefully
fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);

        if let Some(location) = info.location() {
            error!(file = location.file(), line = location.line(), "panic occured");
        } else {
            error!("panic occured");
        }

        if let Some(s) = info.payload().downcast_ref::<&str>() {
            error!(message = %s);
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            error!(message = %s);
        }

        default_hook(info);
    }));
}

/// A `MakeWriter` for `tracing` that logs to the **main screen** by leaving the alternate screen temporarily.
pub struct MainScreenWriter;

impl<'a> MakeWriter<'a> for MainScreenWriter {
    type Writer = MainScreenWriterHandle;

    fn make_writer(&'a self) -> Self::Writer {
        MainScreenWriterHandle
    }
}

/// A handle that writes to stdout outside the alternate screen
pub struct MainScreenWriterHandle;

impl Write for MainScreenWriterHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        execute!(io::stdout(), LeaveAlternateScreen)?;
        println!();
        execute!(io::stdout(), MoveToColumn(0))?;
        let result = io::stdout().write(buf);
        execute!(io::stdout(), MoveToColumn(0))?;
        io::stdout().flush()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        result
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

fn print_help() {
    eprintln!("celltable - A terminal rich-text table editor with undo history");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    celltable [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -c, --config <PATH>   Config file (default ~/.config/celltable/config.toml)");
    eprintln!("    -s, --store <PATH>    Store file holding saved content");
    eprintln!("    --tables <N>          Number of tables in a new surface");
    eprintln!("    --rows <N>            Rows per table in a new surface");
    eprintln!("    --cols <N>            Columns per table in a new surface");
    eprintln!("    -t, --theme <NAME>    Theme name or theme TOML file");
    eprintln!("    -h, --help            Print this help message");
    eprintln!();
    eprintln!("Saved content, if any, is offered for loading at startup.");
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt().with_writer(MainScreenWriter).init();
    info!("celltable started");

    install_panic_hook();

    let args = parse_args();

    let config_path = args.config.clone().or_else(config::default_config_path);
    let mut config = match &config_path {
        Some(path) => AppConfig::load(path).unwrap_or_else(|e| fail(&e.to_string())),
        None => AppConfig::default(),
    };
    if let Some(store) = args.store {
        config.store_path = Some(store);
    }
    if let Some(theme) = args.theme {
        config.theme = theme;
    }
    config.surface.tables = args.tables.unwrap_or(config.surface.tables).max(1);
    config.surface.rows = args.rows.unwrap_or(config.surface.rows).max(1);
    config.surface.cols = args.cols.unwrap_or(config.surface.cols).max(1);

    let (theme, theme_error) = match config.theme() {
        Ok(theme) => (theme, None),
        Err(e) => {
            warn!(error = %e, "falling back to the default theme");
            (Theme::default(), Some(e.to_string()))
        }
    };

    let store = FileStore::new(config.store_path());
    info!(store = %store.path().display(), "using store");

    let surface = Surface::blank(config.surface.tables, config.surface.rows, config.surface.cols);
    let editor = CellTableEditor::new(surface, config.history_capacity);
    let mut app = App::new(editor, Box::new(store), Style::with_theme(theme), config.session());
    if let Some(e) = theme_error {
        app.message = Some(Message::Warning(e));
    }
    app.offer_saved();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;

    result
}
