use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::list::ListKind;
use crate::ops::task_ops::MoveEdge;
use crate::tui::app::{App, Mode, PendingAction};
use crate::tui::text::display_width;

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let (text, color) = match app.mode {
        Mode::Confirm => (confirm_prompt(app), app.theme.yellow),
        _ if app.drag.is_active() => (drag_status(app), app.theme.highlight),
        _ => match &app.message {
            Some(msg) => (msg.clone(), app.theme.text_bright),
            None => (String::new(), app.theme.text),
        },
    };

    let mut spans = vec![Span::styled(format!(" {}", text), Style::default().fg(color).bg(bg))];
    if app.show_key_hints {
        let hint = key_hint(app);
        let used = display_width(&text) + 1;
        let hint_width = display_width(hint);
        if used + hint_width < width {
            spans.push(Span::styled(
                " ".repeat(width - used - hint_width),
                Style::default().bg(bg),
            ));
            spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn confirm_prompt(app: &App) -> String {
    match app.pending {
        Some(PendingAction::Delete(id)) => {
            let title = app.list().task(id).map_or("", |t| t.title.as_str());
            format!("delete \"{}\" and its subtasks? y/n", title)
        }
        Some(PendingAction::Complete(_)) => "subtasks are still open, complete all? y/n".into(),
        None => String::new(),
    }
}

fn drag_status(app: &App) -> String {
    match app.drag.pending() {
        Some(target) => {
            let title = app.list().task(target.id).map_or("", |t| t.title.as_str());
            match target.edge {
                MoveEdge::Sibling => format!("drop after \"{}\"", title),
                MoveEdge::Child => format!("drop into \"{}\"", title),
            }
        }
        None => "dragging".into(),
    }
}

fn key_hint(app: &App) -> &'static str {
    match app.mode {
        Mode::Edit => "Enter save  Esc cancel",
        Mode::Confirm => "",
        Mode::Navigate if app.active == ListKind::Library => {
            "a add  s sub  e edit  d del  p promote  Tab todo  q quit"
        }
        Mode::Navigate => "a add  s sub  e edit  d del  space done  Tab library  q quit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn test_message_with_hint() {
        let mut app = app_with_tasks(&[("a", None)]);
        app.message = Some("deleted 2 tasks".into());
        let out = render_to_string(100, 1, |frame, area| render_status_row(frame, &app, area));
        assert!(out.starts_with(" deleted 2 tasks "));
        assert!(out.ends_with("q quit"));
    }

    #[test]
    fn test_confirm_prompt_names_task() {
        let mut app = app_with_tasks(&[("groceries", None)]);
        app.pending = Some(PendingAction::Delete(1));
        app.mode = Mode::Confirm;
        let out = render_to_string(TERM_W, 1, |frame, area| render_status_row(frame, &app, area));
        assert_eq!(out, " delete \"groceries\" and its subtasks? y/n");
    }

    #[test]
    fn test_drag_shows_pending_target() {
        let mut app = app_with_tasks(&[("a", None), ("b", None)]);
        app.show_key_hints = false;
        app.drag.start(1);
        let out = render_to_string(TERM_W, 1, |frame, area| render_status_row(frame, &app, area));
        assert_eq!(out, " dragging");
    }
}
