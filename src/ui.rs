use crate::app::App;
use crate::braille;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

/// Height of the optional status bar
const STATUS_HEIGHT: u16 = 1;

// UI color scheme
const ACCENT_COLOR: Color = Color::Cyan;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::DarkGray;

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // The overlay is a black full-screen backdrop
    frame.render_widget(Block::default().style(Style::default().bg(Color::Black)), area);

    let canvas_area = if app.show_status {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(STATUS_HEIGHT)])
            .split(area);
        render_status_bar(frame, layout[1], app);
        layout[0]
    } else {
        area
    };

    if app.is_complete() {
        render_finished(frame, canvas_area, app);
    } else {
        render_canvas(frame, canvas_area, app);
    }
}

/// Calculate the canvas size in cells for a terminal area
pub fn get_canvas_size(frame_area: Rect, show_status: bool) -> (u16, u16) {
    if show_status {
        (frame_area.width, frame_area.height.saturating_sub(STATUS_HEIGHT))
    } else {
        (frame_area.width, frame_area.height)
    }
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let Some(dots) = app.host.render() else {
        return;
    };

    let cells = braille::render_to_braille(&dots, area.width, area.height, app.host.brightness());

    for cell in cells {
        let x = area.x + cell.x;
        let y = area.y + cell.y;

        if x < area.x + area.width && y < area.y + area.height {
            let cell_rect = Rect {
                x,
                y,
                width: 1,
                height: 1,
            };
            let span = Span::styled(cell.char.to_string(), Style::default().fg(cell.color));
            frame.render_widget(Paragraph::new(Line::from(span)), cell_rect);
        }
    }
}

fn render_finished(frame: &mut Frame, area: Rect, app: &App) {
    let content = vec![
        Line::from(Span::styled(
            app.text.clone(),
            Style::default().fg(TEXT_COLOR).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("press any key", Style::default().fg(DIM_TEXT_COLOR))),
    ];
    let height = content.len() as u16;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let text_area = Rect {
        x: area.x,
        y,
        width: area.width,
        height: height.min(area.height),
    };
    frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), text_area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let host = &app.host;
    let elapsed = host.elapsed().as_secs_f32();
    let total = app.schedule.total().as_secs_f32();
    let particles = host.field().map(|f| f.len()).unwrap_or(0);

    let progress_width = 12usize;
    let filled = if total > 0.0 {
        ((elapsed / total).min(1.0) * progress_width as f32) as usize
    } else {
        progress_width
    };

    let sep = Span::styled(" │ ", Style::default().fg(DIM_TEXT_COLOR));
    let line = Line::from(vec![
        Span::styled(format!(" {}", host.phase().name()), Style::default().fg(ACCENT_COLOR)),
        sep.clone(),
        Span::styled("█".repeat(filled), Style::default().fg(Color::Green)),
        Span::styled(
            "░".repeat(progress_width - filled),
            Style::default().fg(DIM_TEXT_COLOR),
        ),
        Span::styled(format!(" {:.1}s / {:.1}s", elapsed, total), Style::default().fg(TEXT_COLOR)),
        sep.clone(),
        Span::styled(
            format!("{} particles ({})", particles, app.viewport.name()),
            Style::default().fg(TEXT_COLOR),
        ),
        sep,
        Span::styled("H", Style::default().fg(Color::Yellow)),
        Span::styled(" status  ", Style::default().fg(DIM_TEXT_COLOR)),
        Span::styled("Q", Style::default().fg(Color::Yellow)),
        Span::styled(" skip", Style::default().fg(DIM_TEXT_COLOR)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_size_reserves_status_row() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 100,
            height: 30,
        };
        assert_eq!(get_canvas_size(area, false), (100, 30));
        assert_eq!(get_canvas_size(area, true), (100, 29));
    }
}
