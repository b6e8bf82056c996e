use crate::data::{Priority, Status};
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};

/// Renders a ticket status as a short colored label.
pub fn status_badge(status: Status) -> Span<'static> {
    let (label, color) = match status {
        Status::Open => ("Open", Color::Blue),
        Status::InProgress => ("In Progress", Color::Yellow),
        Status::Resolved => ("Resolved", Color::Green),
        Status::Closed => ("Closed", Color::DarkGray),
    };
    Span::styled(
        format!("[{label}]"),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}
