use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::document_io::Document;
use crate::model::config::AppConfig;
use crate::ops::task_ops::{InsertPosition, add_task};
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// An App over a todo list built from `(title, parent)` pairs, ids from 1.
/// Nothing is focused.
pub fn app_with_tasks(tasks: &[(&str, Option<u64>)]) -> App {
    let mut doc = Document::default();
    for (title, parent) in tasks {
        add_task(&mut doc.todo, title.to_string(), *parent, InsertPosition::Bottom, false).unwrap();
    }
    App::new(doc, &AppConfig::default())
}
