use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::list::ListKind;
use crate::tui::app::App;

/// Render the header: one tab per list with its open-task count
pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let mut spans: Vec<Span> = vec![Span::styled(" ", Style::default().bg(bg))];

    for kind in [ListKind::Todo, ListKind::Library] {
        let open = app
            .doc
            .list(kind)
            .all_tasks()
            .filter(|t| !t.completed)
            .count();
        spans.push(Span::styled(
            format!(" {} {} ", kind, open),
            tab_style(app, kind == app.active),
        ));
        spans.push(Span::styled(
            "\u{2502}",
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }

    let tabs = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(tabs, area);
}

fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.dim).bg(app.theme.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn test_tabs_count_open_tasks() {
        let mut app = app_with_tasks(&[("a", None), ("b", None)]);
        crate::ops::task_ops::toggle_completed(app.list_mut(), 2, true).unwrap();
        let out = render_to_string(TERM_W, 1, |frame, area| render_tab_bar(frame, &app, area));
        assert_eq!(out, "  Todo 1 \u{2502} Library 0 \u{2502}");
    }
}
