//! Progress reporting for store builds
//!
//! Every long-running step talks to a [`Ui`]. Three implementations exist:
//! a full-screen ratatui dashboard ([`UiApp`]), line output with an
//! indicatif bar ([`ConsoleUi`]), and [`SilentUi`] for tests and embedding.

mod components;
mod console;

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;

use components::{LogPanel, PhasePanel, ProgressPanel};
pub use console::ConsoleUi;

/// Pipeline stages, in the order a build walks through them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Checking,
    Fetching,
    Normalizing,
    Writing,
    Complete,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Checking,
        Phase::Fetching,
        Phase::Normalizing,
        Phase::Writing,
        Phase::Complete,
    ];

    /// Short label used in the phase strip
    pub fn short_name(self) -> &'static str {
        match self {
            Phase::Checking => "check",
            Phase::Fetching => "fetch",
            Phase::Normalizing => "normalize",
            Phase::Writing => "write",
            Phase::Complete => "done",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Phase::Checking => "Checking existing store",
            Phase::Fetching => "Loading source tables",
            Phase::Normalizing => "Normalizing records",
            Phase::Writing => "Writing SQLite store",
            Phase::Complete => "Complete",
        };
        f.write_str(text)
    }
}

/// Position within the current step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    pub label: String,
}

impl Progress {
    pub fn new(current: u64, total: u64, label: impl Into<String>) -> Self {
        Self {
            current,
            total,
            label: label.into(),
        }
    }

    /// Completed fraction, clamped to 1.0; 0.0 when the total is unknown
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.current as f64 / self.total as f64).min(1.0)
        }
    }
}

/// Progress reporting used by every long-running operation
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_info(&mut self, info: impl Into<String>);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn clear_progress(&mut self);
    fn log(&mut self, message: impl Into<String>);
}

/// Full-screen dashboard on the alternate screen
pub struct UiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    phase: PhasePanel,
    progress: ProgressPanel,
    log: LogPanel,
}

impl UiApp {
    /// Switch the terminal to raw mode and the alternate screen
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            phase: PhasePanel::default(),
            progress: ProgressPanel::default(),
            log: LogPanel::with_capacity(200),
        })
    }

    fn draw(&mut self) -> Result<()> {
        let (phase, progress, log) = (&self.phase, &self.progress, &self.log);

        self.terminal.draw(|frame| {
            let [top, middle, bottom] = Layout::vertical([
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Min(5),
            ])
            .areas(frame.area());

            phase.render(frame, top);
            progress.render(frame, middle);
            log.render(frame, bottom);
        })?;

        Ok(())
    }

    /// Show the summary, wait for a key, then restore the terminal
    pub fn finish(mut self, summary: &str) -> Result<()> {
        self.set_phase(Phase::Complete);
        self.log(summary);
        self.log("Press any key to exit...");

        loop {
            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }

        self.restore()
    }

    /// Leave the alternate screen without waiting
    pub fn restore(mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Ui for UiApp {
    fn set_phase(&mut self, phase: Phase) {
        self.phase.set_phase(phase);
        self.progress.clear();
        self.draw().ok();
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.phase.set_info(info);
        self.draw().ok();
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        self.progress.set(Progress::new(current, total, label));
        self.draw().ok();
    }

    fn clear_progress(&mut self) {
        self.progress.clear();
        self.draw().ok();
    }

    fn log(&mut self, message: impl Into<String>) {
        self.log.push(message);
        self.draw().ok();
    }
}

impl Drop for UiApp {
    fn drop(&mut self) {
        terminal::disable_raw_mode().ok();
        self.terminal.backend_mut().execute(LeaveAlternateScreen).ok();
        self.terminal.show_cursor().ok();
    }
}

/// Discards everything
#[derive(Debug, Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, _message: impl Into<String>) {}
}
