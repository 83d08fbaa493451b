//! Terminal chart for the live peak-level window.
//!
//! Renders the projected window as a scrolling line chart: x axis is seconds
//! before now over `[-timeline_length, 0]`, y axis is the 0-100 level scale.
//! Also handles the small set of keys the monitor responds to.

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Chart, Dataset, GraphType},
};
use std::error::Error;
use std::io::{stdout, Stdout};

use crate::series::WindowPoint;

/// User input command during monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorCommand {
    /// Keep monitoring (no key pressed)
    Continue,
    /// Exit the monitor (Escape, 'q' or Ctrl+C)
    Quit,
    /// Pause/resume the meter (Space key)
    TogglePause,
}

/// Terminal UI for the live peak-level chart.
pub struct MonitorTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    timeline_length: f64,
    peak_threshold: u8,
    /// Whether the meter is currently paused
    pub is_paused: bool,
    start_time: std::time::Instant,
    peak_hold: u8,
    peak_hold_time: std::time::Instant,
}

impl MonitorTui {
    /// Creates a new TUI instance and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    pub fn new(timeline_length: u32, peak_threshold: u8) -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let now = std::time::Instant::now();
        Ok(MonitorTui {
            terminal,
            timeline_length: timeline_length as f64,
            peak_threshold,
            is_paused: false,
            start_time: now,
            peak_hold: 0,
            peak_hold_time: now,
        })
    }

    /// Renders one frame of the level chart from the projected window.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(&mut self, points: &[WindowPoint]) -> Result<(), Box<dyn Error>> {
        let current_level = points.first().map(|p| p.level).unwrap_or(0);
        self.update_peak_hold(current_level);

        let data: Vec<(f64, f64)> = points
            .iter()
            .map(|p| (p.time_offset, p.level as f64))
            .collect();

        let timeline_length = self.timeline_length;
        let is_paused = self.is_paused;
        let peak_hold = self.peak_hold;
        let peak_threshold = self.peak_threshold;
        let elapsed = self.start_time.elapsed();

        self.terminal.draw(|frame| {
            let area = frame.area();

            let footer_height = 1;
            let chart_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(footer_height),
            };

            let dataset = Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Rgb(206, 224, 220)))
                .data(&data);

            let x_labels = vec![
                Span::raw(format!("-{timeline_length:.0}s")),
                Span::raw(format!("-{:.0}s", timeline_length / 2.0)),
                Span::raw("0s".to_string()),
            ];
            let chart = Chart::new(vec![dataset])
                .block(Block::default())
                .x_axis(
                    Axis::default()
                        .bounds([-timeline_length, 0.0])
                        .labels(x_labels)
                        .style(Style::default().fg(Color::DarkGray)),
                )
                .y_axis(
                    Axis::default()
                        .bounds([0.0, 100.0])
                        .labels(vec![Span::raw("0"), Span::raw("50"), Span::raw("100")])
                        .style(Style::default().fg(Color::DarkGray)),
                );

            frame.render_widget(chart, chart_area);

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(footer_height),
                width: area.width,
                height: footer_height,
            };

            // When paused, show zeros for meters
            let (display_level, display_peak) = if is_paused {
                (0u8, 0u8)
            } else {
                (current_level, peak_hold)
            };

            let peak_style = if display_peak >= peak_threshold {
                Style::default()
                    .bg(Color::Red)
                    .fg(Color::Rgb(255, 255, 255))
            } else {
                Style::default()
            };

            let duration_secs = elapsed.as_secs();
            let minutes = duration_secs / 60;
            let secs = duration_secs % 60;
            let duration_span = Span::raw(format!("{minutes}:{secs:02}"));

            let level_span = Span::raw(format!("{display_level}%"));
            let peak_span = Span::styled(format!("peak {display_peak}%"), peak_style);

            let indicator = if is_paused {
                Span::styled("⏸ ", Style::default().fg(Color::Yellow))
            } else {
                Span::styled("● ", Style::default().fg(Color::Red))
            };

            let status_line = Line::from(vec![
                indicator,
                duration_span,
                Span::raw(" / "),
                level_span,
                Span::raw(" / "),
                peak_span,
            ]);

            let footer = ratatui::widgets::Paragraph::new(status_line).style(
                Style::default()
                    .fg(Color::Rgb(185, 207, 212))
                    .bg(Color::Rgb(0, 0, 0)),
            );

            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Tracks the maximum level seen in the last 3 seconds for the peak
    /// readout.
    fn update_peak_hold(&mut self, level: u8) {
        if level > self.peak_hold || self.peak_hold_time.elapsed().as_secs() >= 3 {
            self.peak_hold = level;
            self.peak_hold_time = std::time::Instant::now();
        }
    }

    /// Processes user input and returns the appropriate monitor command.
    ///
    /// # Returns
    /// - `Continue` if no key or unrecognized key was pressed
    /// - `Quit` if Escape, 'q' or Ctrl+C was pressed
    /// - `TogglePause` if Space was pressed
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> Result<MonitorCommand, Box<dyn Error>> {
        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        tracing::debug!("Escape or 'q' pressed: leaving monitor");
                        MonitorCommand::Quit
                    }
                    KeyCode::Char('c')
                        if key
                            .modifiers
                            .contains(crossterm::event::KeyModifiers::CONTROL) =>
                    {
                        tracing::debug!("Ctrl+C pressed: leaving monitor");
                        MonitorCommand::Quit
                    }
                    KeyCode::Char(' ') => {
                        tracing::debug!("Space pressed: toggling pause");
                        self.is_paused = !self.is_paused;
                        MonitorCommand::TogglePause
                    }
                    _ => MonitorCommand::Continue,
                });
            }
        }
        Ok(MonitorCommand::Continue)
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> Result<(), Box<dyn Error>> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
