use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::task::Task;
use crate::ops::drag::{DropTarget, RowGeometry};
use crate::ops::hierarchy::{build_tree, flatten};
use crate::ops::task_ops::MoveEdge;
use crate::tui::app::App;
use crate::tui::text::{display_width, truncate_to_width, width_before};

/// Cells taken by the drag handle at the start of every row
pub const HANDLE_WIDTH: u16 = 2;
/// Cells between the row start and the title at depth zero:
/// handle, expander and checkbox
const TITLE_OFFSET: u16 = 8;
const INDENT: u16 = 2;

/// Screen column of the expand/collapse marker for a row at `depth`
pub fn expander_column(area_x: u16, depth: usize) -> u16 {
    area_x + HANDLE_WIDTH + INDENT * depth as u16
}

fn title_column(area_x: u16, depth: usize) -> u16 {
    area_x + TITLE_OFFSET + INDENT * depth as u16
}

struct RowInfo {
    task: Task,
    depth: usize,
    has_children: bool,
}

/// Render the task rows of the active list and record where each one landed
pub fn render_list_view(frame: &mut Frame, app: &mut App, area: Rect) {
    app.list_area = area;
    app.rows.clear();

    let forest = build_tree(&app.list().visible);
    let rows: Vec<RowInfo> = flatten(&forest)
        .into_iter()
        .map(|flat| RowInfo {
            task: flat.node.task.clone(),
            depth: flat.depth,
            has_children: app.list().has_children(flat.node.id()),
        })
        .collect();

    if rows.is_empty() {
        let empty = Paragraph::new(" No tasks")
            .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
        frame.render_widget(empty, area);
        return;
    }

    // Keep the focused row on screen
    let visible_height = area.height as usize;
    let focus_row = app
        .list()
        .focus_id
        .and_then(|id| rows.iter().position(|r| r.task.id == id));
    if let Some(cursor) = focus_row {
        if cursor < app.scroll_offset {
            app.scroll_offset = cursor;
        } else if visible_height > 0 && cursor >= app.scroll_offset + visible_height {
            app.scroll_offset = cursor + 1 - visible_height;
        }
    }
    app.scroll_offset = app.scroll_offset.min(rows.len().saturating_sub(1));

    let scroll = app.scroll_offset;
    let end = rows.len().min(scroll + visible_height);
    let mut lines: Vec<Line> = Vec::with_capacity(visible_height);
    let mut cursor_pos: Option<(u16, u16)> = None;

    for (info, row) in rows[scroll..end].iter().zip(scroll..end) {
        let y = area.y + (row - scroll) as u16;
        let left = title_column(area.x, info.depth);
        app.rows.insert(
            info.task.id,
            RowGeometry {
                top: y as f64,
                center_y: y as f64 + 0.5,
                bottom: y as f64 + 1.0,
                left: left as f64,
                width: area.right().saturating_sub(left) as f64,
            },
        );

        let (line, edit_col) = render_row(app, info, focus_row == Some(row), area.width as usize);
        if let Some(col) = edit_col {
            cursor_pos = Some((area.x + col, y));
        }
        lines.push(line);
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(app.theme.background));
    frame.render_widget(paragraph, area);

    if let Some(target) = app.drag.pending() {
        render_drop_indicator(frame, app, area, &target);
    }
    if let Some(pos) = cursor_pos {
        frame.set_cursor_position(pos);
    }
}

/// Build one row. Returns the cursor column when the row is being edited.
fn render_row(
    app: &App,
    info: &RowInfo,
    is_focus: bool,
    width: usize,
) -> (Line<'static>, Option<u16>) {
    let task = &info.task;
    let theme = &app.theme;
    let bg = if is_focus {
        theme.selection_bg
    } else {
        theme.background
    };
    let dragged = app.drag.source() == Some(task.id);
    let base = Style::default().bg(bg);
    let text_fg = if dragged || task.completed {
        theme.dim
    } else if is_focus {
        theme.text_bright
    } else {
        theme.text
    };

    let mut spans: Vec<Span<'static>> = Vec::new();
    spans.push(Span::styled("\u{2261} ", base.fg(theme.dim)));
    spans.push(Span::styled(" ".repeat(INDENT as usize * info.depth), base));
    let expander = match (info.has_children, task.expand) {
        (false, _) => " ",
        (true, true) => "\u{25BE}",
        (true, false) => "\u{25B8}",
    };
    spans.push(Span::styled(format!("{} ", expander), base.fg(theme.dim)));
    let check = if task.completed { "[x] " } else { "[ ] " };
    spans.push(Span::styled(check, base.fg(theme.priority_color(task.priority))));

    let prefix_w = (TITLE_OFFSET + INDENT * info.depth as u16) as usize;
    let room = width.saturating_sub(prefix_w);

    let editing = app.edit.as_ref().filter(|e| e.target == task.id);
    if let Some(edit) = editing {
        let shown = truncate_to_width(&edit.buffer, room);
        spans.push(Span::styled(shown, base.fg(theme.text_bright)));
        let col = prefix_w + width_before(&edit.buffer, edit.cursor).min(room);
        return (Line::from(spans), Some(col as u16));
    }

    let mut title_style = base.fg(text_fg);
    if task.completed {
        title_style = title_style.add_modifier(Modifier::CROSSED_OUT);
    }
    let title = truncate_to_width(&task.title, room);
    let mut used = display_width(&title);
    spans.push(Span::styled(title, title_style));

    for tag in &task.tags {
        let label = format!(" #{}", tag);
        let w = display_width(&label);
        if used + w > room {
            break;
        }
        used += w;
        spans.push(Span::styled(label, base.fg(theme.tag_color(tag))));
    }

    // Pad so the selection background spans the row
    if is_focus && used < room {
        spans.push(Span::styled(" ".repeat(room - used), base));
    }
    (Line::from(spans), None)
}

/// Underline the target row from where the dragged task would start
fn render_drop_indicator(frame: &mut Frame, app: &App, area: Rect, target: &DropTarget) {
    let y = target.indicator_y as u16;
    // The indicator sits on the bottom edge, which is the target row's last line
    let Some(row_y) = y.checked_sub(1) else {
        return;
    };
    if row_y < area.y || row_y >= area.bottom() {
        return;
    }
    let mut x = target.indicator_left as u16;
    if target.edge == MoveEdge::Child {
        x += INDENT;
    }
    let buf = frame.buffer_mut();
    for col in x..area.right() {
        if let Some(cell) = buf.cell_mut((col, row_y)) {
            cell.set_style(
                Style::default()
                    .fg(app.theme.drop_line)
                    .add_modifier(Modifier::UNDERLINED),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::task_ops::toggle_expand;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn test_rows_show_hierarchy_and_markers() {
        let mut app = app_with_tasks(&[("plan", None), ("draft", Some(1)), ("ship", None)]);
        let out = render_to_string(40, 5, |frame, area| render_list_view(frame, &mut app, area));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "\u{2261} \u{25BE} [ ] plan");
        assert_eq!(lines[1], "\u{2261}     [ ] draft");
        assert_eq!(lines[2], "\u{2261}   [ ] ship");
    }

    #[test]
    fn test_collapsed_parent_hides_children() {
        let mut app = app_with_tasks(&[("plan", None), ("draft", Some(1))]);
        toggle_expand(app.list_mut(), 1, false).unwrap();
        let out = render_to_string(40, 5, |frame, area| render_list_view(frame, &mut app, area));
        assert_eq!(out, "\u{2261} \u{25B8} [ ] plan");
    }

    #[test]
    fn test_geometry_recorded_for_drawn_rows() {
        let mut app = app_with_tasks(&[("plan", None), ("draft", Some(1))]);
        render_to_string(40, 5, |frame, area| render_list_view(frame, &mut app, area));

        let child = app.rows[&2];
        assert_eq!(child.top, 1.0);
        assert_eq!(child.center_y, 1.5);
        assert_eq!(child.left, 10.0);
        assert_eq!(app.row_at(0), Some(1));
        assert_eq!(app.row_at(3), None);
    }

    #[test]
    fn test_scrolls_to_keep_focus_visible() {
        let titles: Vec<(String, Option<u64>)> =
            (0..10).map(|i| (format!("t{}", i), None)).collect();
        let refs: Vec<(&str, Option<u64>)> = titles.iter().map(|(t, p)| (t.as_str(), *p)).collect();
        let mut app = app_with_tasks(&refs);
        app.list_mut().focus_id = Some(9);

        let out = render_to_string(20, 3, |frame, area| render_list_view(frame, &mut app, area));
        assert_eq!(app.scroll_offset, 6);
        assert!(out.ends_with("t8"));
        assert!(!app.rows.contains_key(&1));
    }

    #[test]
    fn test_long_titles_truncate() {
        let mut app = app_with_tasks(&[("a very long task title indeed", None)]);
        let out = render_to_string(20, 1, |frame, area| render_list_view(frame, &mut app, area));
        assert_eq!(out, "\u{2261}   [ ] a very long\u{2026}");
    }

    #[test]
    fn test_empty_list() {
        let mut app = app_with_tasks(&[]);
        let out = render_to_string(20, 2, |frame, area| render_list_view(frame, &mut app, area));
        assert_eq!(out, " No tasks");
    }
}
