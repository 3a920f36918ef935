//! Dashboard panels

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph};
use ratatui::Frame;
use std::collections::VecDeque;

use super::{Phase, Progress};

const BORDER: Color = Color::Blue;

/// Phase strip plus a free-form info line
pub struct PhasePanel {
    phase: Phase,
    info: String,
}

impl Default for PhasePanel {
    fn default() -> Self {
        Self {
            phase: Phase::Checking,
            info: String::new(),
        }
    }
}

impl PhasePanel {
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    fn strip(&self) -> Line<'static> {
        let current = Phase::ALL.iter().position(|p| *p == self.phase).unwrap_or(0);
        let mut spans = vec![Span::raw(" ")];

        for (idx, phase) in Phase::ALL.iter().enumerate() {
            if idx > 0 {
                spans.push(Span::styled(" › ", Style::default().fg(Color::DarkGray)));
            }
            let style = match idx.cmp(&current) {
                std::cmp::Ordering::Less => Style::default().fg(Color::Green),
                std::cmp::Ordering::Equal => Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
                std::cmp::Ordering::Greater => Style::default().fg(Color::DarkGray),
            };
            spans.push(Span::styled(phase.short_name(), style));
        }
        Line::from(spans)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let headline_color = if self.phase == Phase::Complete {
            Color::Green
        } else {
            Color::Cyan
        };

        let lines = vec![
            self.strip(),
            Line::from(Span::styled(
                format!(" {}", self.phase),
                Style::default().fg(headline_color),
            )),
            Line::from(Span::styled(
                format!(" {}", self.info),
                Style::default().fg(Color::Gray),
            )),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" pokewiki store ")
            .border_style(Style::default().fg(BORDER));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Gauge for the current step, blank when idle
#[derive(Default)]
pub struct ProgressPanel {
    progress: Option<Progress>,
}

impl ProgressPanel {
    pub fn set(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    pub fn clear(&mut self) {
        self.progress = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(BORDER));

        let Some(progress) = &self.progress else {
            frame.render_widget(block, area);
            return;
        };

        let label = match progress.total {
            0 => progress.label.clone(),
            total => format!("{} {}/{}", progress.label, progress.current, total),
        };
        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(progress.ratio())
            .label(label);

        frame.render_widget(gauge, area);
    }
}

/// Bounded message history, newest at the bottom
pub struct LogPanel {
    entries: VecDeque<String>,
    capacity: usize,
}

impl LogPanel {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(message.into());
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Log ")
            .border_style(Style::default().fg(BORDER));

        let visible = area.height.saturating_sub(2) as usize;
        let skip = self.entries.len().saturating_sub(visible);
        let newest = self.entries.len().saturating_sub(1);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(idx, entry)| {
                let color = if idx == newest { Color::White } else { Color::DarkGray };
                ListItem::new(Span::styled(format!(" {}", entry), Style::default().fg(color)))
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }
}
