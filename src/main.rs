//! quicklog - A terminal browser for git commit history.

use std::io::{self, Write};
use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use quicklog::config::{Backend, CliOverrides, FileConfig, Settings};
use quicklog::core::{
    GitObjectReader, LibGitObjectReader, ObjectReader, RepoError, RepoRoot, WorktreeReader,
    WORKTREE_ID,
};
use quicklog::theme::Theme;
use quicklog::ui::{handle_input, render, App};

/// A terminal browser for git commit history.
#[derive(Parser, Debug)]
#[command(name = "quicklog", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Revision to start browsing from (default: HEAD)
    #[arg(value_name = "REV")]
    revision: Option<String>,

    /// Lines of context around changes
    #[arg(short = 'U', long = "context", value_name = "N", global = true)]
    context: Option<usize>,

    /// Start in unified instead of split layout
    #[arg(long, global = true)]
    unified: bool,

    /// Color theme (default, light, or a file in ~/.config/quicklog/themes)
    #[arg(short = 't', long = "theme", value_name = "THEME", global = true)]
    theme: Option<String>,

    /// Object store backend
    #[arg(long, value_enum, value_name = "BACKEND", global = true)]
    backend: Option<Backend>,

    /// Write a debug log to FILE (also: QUICKLOG_LOG)
    #[arg(long = "log", value_name = "FILE", global = true)]
    log: Option<PathBuf>,

    /// Print available themes and exit
    #[arg(long)]
    list_themes: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse uncommitted changes instead of history
    Diff {
        /// Show staged changes (index against HEAD)
        #[arg(long, visible_alias = "staged")]
        cached: bool,

        /// Limit the diff to these paths
        #[arg(value_name = "PATH")]
        paths: Vec<String>,
    },
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            revision: self.revision.clone(),
            context: self.context,
            unified: self.unified,
            theme: self.theme.clone(),
            backend: self.backend,
        }
    }
}

/// RAII guard for terminal state. Restores terminal on drop (including panic).
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
    let _ = disable_raw_mode();
    let _ = io::stdout().flush();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list_themes {
        for name in Theme::list() {
            println!("{}", name);
        }
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    quicklog::logger::init(cli.log.as_deref())?;
    quicklog::metrics::init();

    let file_config = FileConfig::load()?;
    let mut settings = Settings::resolve(file_config, cli.overrides())?;
    log::debug!("settings: {:?}", settings);

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let repo = match RepoRoot::discover(&cwd) {
        Ok(repo) => repo,
        Err(RepoError::NotARepo) => anyhow::bail!("Not inside a git repository"),
        Err(e) => return Err(e.into()),
    };

    let reader: Box<dyn ObjectReader> = match cli.command {
        Some(Command::Diff { cached, paths }) => {
            if settings.backend != Backend::Git {
                log::info!("diff mode always runs the git executable");
            }
            settings.revision = WORKTREE_ID.to_string();
            Box::new(WorktreeReader::new(repo).staged(cached).with_paths(paths))
        }
        None => open_reader(repo, settings.backend)?,
    };
    let app = App::new(reader, &settings)
        .with_context(|| format!("Failed to open revision {}", settings.revision))?;

    run_tui(app)
}

fn open_reader(repo: RepoRoot, backend: Backend) -> Result<Box<dyn ObjectReader>> {
    log::info!("using {:?} backend in {}", backend, repo.as_str());
    let reader: Box<dyn ObjectReader> = match backend {
        Backend::Git => Box::new(GitObjectReader::new(repo)),
        Backend::Libgit => Box::new(
            LibGitObjectReader::open(&repo).context("Failed to open repository with libgit2")?,
        ),
    };
    Ok(reader)
}

/// Run the TUI application.
fn run_tui(mut app: App) -> Result<()> {
    // Restore the terminal before the panic message is printed
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        default_hook(info);
    }));

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    run_loop(&mut terminal, &mut app)
}

fn run_loop<B>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B: ratatui::backend::Backend,
{
    loop {
        // Only redraw if dirty or on resize
        if app.ui.dirty {
            terminal.draw(|frame| render(frame, app))?;
            app.clear_dirty();
        }

        if event::poll(Duration::from_millis(50))? {
            handle_input(app, event::read()?);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
