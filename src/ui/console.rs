//! Plain terminal output with an indicatif progress bar

use indicatif::{ProgressBar, ProgressStyle};

use super::{Phase, Ui};

/// Line-oriented UI for non-interactive terminals
#[derive(Default)]
pub struct ConsoleUi {
    bar: Option<ProgressBar>,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self::default()
    }

    fn bar(&mut self, total: u64) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::with_template("{msg:30} [{bar:40.cyan/blue}] {pos}/{len}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            pb
        })
    }
}

impl Ui for ConsoleUi {
    fn set_phase(&mut self, phase: Phase) {
        self.clear_progress();
        println!("==> {}", phase);
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.log(info);
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        let pb = self.bar(total);
        pb.set_length(total);
        pb.set_position(current);
        pb.set_message(label.into());
    }

    fn clear_progress(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.finish_and_clear();
        }
    }

    fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        match &self.bar {
            Some(pb) => pb.println(format!("    {}", message)),
            None => println!("    {}", message),
        }
    }
}
