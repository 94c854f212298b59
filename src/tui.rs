use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders, Paragraph,
    },
    Frame, Terminal,
};

use crate::app::InitError;
use crate::chart::{AxisState, ChartModel, Series};
use crate::queue::SampleQueue;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Consumer loop: poll input, feed at most one sample per frame into the
/// chart, draw. An empty queue just means the chart does not change this
/// frame; the loop never blocks on the producer.
pub fn run(
    queue: Arc<SampleQueue>,
    url: &str,
    stop: Arc<AtomicBool>,
    done: Arc<AtomicBool>,
) -> Result<()> {
    enable_raw_mode().map_err(InitError::Terminal)?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| InitError::Terminal(e.into()))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(InitError::Terminal)?;

    let mut chart = ChartModel::new(AxisState::default());

    while !stop.load(Ordering::Relaxed) {
        if let Some(sample) = queue.pop() {
            chart.update(sample);
        }

        let transfer_done = done.load(Ordering::Relaxed);
        terminal.draw(|f| draw(f, &chart, url, transfer_done))?;

        if event::poll(FRAME_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.code == KeyCode::Char('q')
                    || key.code == KeyCode::Esc
                    || (key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL))
                {
                    stop.store(true, Ordering::Relaxed);
                }
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn draw(f: &mut Frame, chart: &ChartModel, url: &str, transfer_done: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)].as_ref())
        .split(f.size());

    // Header: size downloaded, URL, transfer status.
    let status = if transfer_done {
        Span::styled("transfer ended", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled("downloading", Style::default().fg(Color::Green))
    };
    let header = Line::from(vec![
        Span::styled(
            chart.labels.size_text.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::raw(url.to_string()),
        Span::raw("  |  "),
        status,
        Span::raw("  |  press 'q' to quit"),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    // The chart model projects into a screen-down pixel space; the canvas is
    // math-up, so every Y is flipped against the total surface height.
    let axis = &chart.axis;
    let total_w = axis.plot_width + axis.padding.0 * 2.0 + 100.0;
    let total_h = axis.plot_height + axis.padding.1 * 2.0;
    let flip = move |y: f64| total_h - y;

    let labels = chart.labels.clone();
    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(" Bandwidth ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, total_w])
        .y_bounds([0.0, total_h])
        .paint(move |ctx| {
            // Axis rulers.
            ctx.draw(&CanvasLine {
                x1: axis.padding.0,
                y1: axis.padding.1,
                x2: axis.padding.0 + axis.plot_width,
                y2: axis.padding.1,
                color: Color::White,
            });
            ctx.draw(&CanvasLine {
                x1: axis.padding.0,
                y1: axis.padding.1,
                x2: axis.padding.0,
                y2: axis.padding.1 + axis.plot_height,
                color: Color::White,
            });

            draw_series(ctx, chart.average(), flip);
            draw_series(ctx, chart.window(), flip);

            // Point labels track the newest vertex of each curve.
            ctx.print(
                labels.avg_pos.0,
                flip(labels.avg_pos.1),
                Line::styled(labels.avg_text.clone(), Style::default().fg(Color::Red)),
            );
            ctx.print(
                labels.window_pos.0,
                flip(labels.window_pos.1),
                Line::styled(
                    labels.window_text.clone(),
                    Style::default().fg(Color::Yellow),
                ),
            );

            // Ceiling above the Y axis, elapsed time under the X axis.
            ctx.print(
                10.0,
                axis.padding.1 + axis.plot_height + 20.0,
                Line::styled(
                    labels.ceiling_text.clone(),
                    Style::default().fg(Color::White),
                ),
            );
            ctx.print(
                axis.padding.0 + axis.plot_width - 150.0,
                axis.padding.1 - 20.0,
                Line::styled(labels.time_text.clone(), Style::default().fg(Color::White)),
            );

            // Legend.
            ctx.draw(&CanvasLine {
                x1: 10.0,
                y1: 15.0,
                x2: 40.0,
                y2: 15.0,
                color: Color::Red,
            });
            ctx.print(
                50.0,
                15.0,
                Line::styled("Average speed", Style::default().fg(Color::Red)),
            );
            ctx.draw(&CanvasLine {
                x1: 10.0,
                y1: 35.0,
                x2: 40.0,
                y2: 35.0,
                color: Color::Yellow,
            });
            ctx.print(
                50.0,
                35.0,
                Line::styled("Current speed", Style::default().fg(Color::Yellow)),
            );
        });
    f.render_widget(canvas, chunks[1]);
}

fn draw_series(
    ctx: &mut ratatui::widgets::canvas::Context<'_>,
    series: &Series,
    flip: impl Fn(f64) -> f64,
) {
    let vertices: Vec<_> = series.vertices().collect();
    for pair in vertices.windows(2) {
        ctx.draw(&CanvasLine {
            x1: pair[0].x,
            y1: flip(pair[0].y),
            x2: pair[1].x,
            y2: flip(pair[1].y),
            color: series.color(),
        });
    }
}
