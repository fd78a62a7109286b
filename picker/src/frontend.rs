// Line-driven stand-in for the window: one instruction per stdin line,
// status lines on stderr so stdout stays reserved for picked output.

use crate::catalog::{CandidateIndex, SkinTone};
use crate::cursor::CursorState;
use crate::session::{Event, Key, PickerSession};

pub fn parse_line(line: &str) -> anyhow::Result<Option<Event>> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(text) = line.strip_prefix("query ") {
        return Ok(Some(Event::QueryChanged(text.to_string())));
    }
    let ev = match line.trim() {
        "" => return Ok(None),
        "query" => Event::QueryChanged(String::new()),
        "right" => Event::Key(Key::Right),
        "left" => Event::Key(Key::Left),
        "down" => Event::Key(Key::Down),
        "up" => Event::Key(Key::Up),
        "pgdn" => Event::Key(Key::PageDown),
        "pgup" => Event::Key(Key::PageUp),
        "home" => Event::Key(Key::Home),
        "end" => Event::Key(Key::End),
        "enter" => Event::Key(Key::Accept(SkinTone::None)),
        "f1" => Event::Key(Key::Accept(SkinTone::Light)),
        "f2" => Event::Key(Key::Accept(SkinTone::MediumLight)),
        "f3" => Event::Key(Key::Accept(SkinTone::Medium)),
        "f4" => Event::Key(Key::Accept(SkinTone::MediumDark)),
        "f5" => Event::Key(Key::Accept(SkinTone::Dark)),
        "esc" => Event::Cancel,
        other => anyhow::bail!("unknown input {:?}", other),
    };
    Ok(Some(ev))
}

pub fn status_line<I: CandidateIndex>(session: &PickerSession<I>) -> String {
    let scope = if session.engine().current_result_set().is_all() {
        "all"
    } else {
        "found"
    };
    let total = session.cursor().len();
    match (session.cursor().state(), session.highlighted()) {
        (CursorState::At(i), Some(c)) => {
            format!("[{} {}/{}] {} {}", scope, i + 1, total, c.text, c.name)
        }
        _ => format!("[{} 0/{}] (nothing)", scope, total),
    }
}
