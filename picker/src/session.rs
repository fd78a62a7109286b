use utils::Command;

use crate::catalog::{Candidate, CandidateIndex, SkinTone};
use crate::cursor::SelectionCursor;
use crate::format::{format_candidate, OutputFormat};
use crate::search::SearchEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Accept(SkinTone),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A command recognized on the channel; the sending peer is still connected.
    Remote(Command),
    /// The channel peer went away without waiting for a reply.
    PeerGone,
    QueryChanged(String),
    Key(Key),
    Cancel,
}

/// Side effects requested by the session, executed in order by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Show,
    Hide,
    Print(String),
    Reply(String),
    Run { command: String, argument: String },
    Exit(i32),
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub output: OutputFormat,
    pub command: Option<String>,
    /// Serving a channel: hide instead of exiting after accept/cancel.
    pub persistent: bool,
    pub columns: usize,
    pub page_rows: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            output: OutputFormat::default(),
            command: None,
            persistent: false,
            columns: crate::consts::DEFAULT_COLUMNS,
            page_rows: crate::consts::DEFAULT_PAGE_ROWS,
        }
    }
}

pub struct PickerSession<I> {
    engine: SearchEngine<I>,
    cursor: SelectionCursor,
    opts: SessionOptions,
    // A peer woke us and has not been replied to yet.
    awaiting_reply: bool,
}

impl<I: CandidateIndex> PickerSession<I> {
    pub fn new(index: I, mut opts: SessionOptions) -> Self {
        // The command gets the bare text as its argument.
        if opts.command.is_some() {
            opts.output.newline = false;
        }
        let engine = SearchEngine::new(index);
        let mut cursor = SelectionCursor::new(opts.columns);
        cursor.replace(engine.groups());
        Self {
            engine,
            cursor,
            opts,
            awaiting_reply: false,
        }
    }

    pub fn handle(&mut self, ev: Event) -> Vec<Action> {
        match ev {
            Event::Remote(Command::Wake) => {
                self.awaiting_reply = true;
                // Every showing starts from the full listing.
                self.engine.set_query_text("");
                self.cursor.replace(self.engine.groups());
                self.cursor.first();
                vec![Action::Show]
            }
            Event::Remote(Command::Quit) => {
                log::info!("session: quit requested");
                self.awaiting_reply = false;
                vec![Action::Reply(String::new()), Action::Exit(0)]
            }
            Event::PeerGone => {
                self.awaiting_reply = false;
                Vec::new()
            }
            Event::QueryChanged(text) => {
                self.engine.set_query_text(&text);
                self.cursor.replace(self.engine.groups());
                Vec::new()
            }
            Event::Key(Key::Accept(tone)) => self.accept(tone),
            Event::Key(key) => {
                self.navigate(key);
                Vec::new()
            }
            Event::Cancel => self.cancel(),
        }
    }

    fn navigate(&mut self, key: Key) {
        let page = self.opts.page_rows;
        match key {
            Key::Right => self.cursor.next(),
            Key::Left => self.cursor.previous(),
            Key::Down => self.cursor.next_row(1),
            Key::Up => self.cursor.previous_row(1),
            Key::PageDown => self.cursor.next_row(page),
            Key::PageUp => self.cursor.previous_row(page),
            Key::Home => self.cursor.first(),
            Key::End => self.cursor.last(),
            Key::Accept(_) => {}
        }
    }

    fn accept(&mut self, tone: SkinTone) -> Vec<Action> {
        let Some(sel) = self.cursor.accept(tone) else {
            log::debug!("session: accept with nothing highlighted");
            return Vec::new();
        };
        let Some(c) = self.engine.index().candidate(sel.id) else {
            log::warn!("session: highlighted id {:?} not in index", sel.id);
            return Vec::new();
        };
        let text = format_candidate(c, sel.tone, &self.opts.output);
        log::info!("session: accept name={:?} tone={:?}", c.name, sel.tone);

        let mut actions = Vec::new();
        let reply_due = self.opts.persistent && self.awaiting_reply;
        self.awaiting_reply = false;
        match &self.opts.command {
            Some(command) => {
                if reply_due {
                    actions.push(Action::Reply(String::new()));
                }
                actions.push(Action::Run {
                    command: command.clone(),
                    argument: text,
                });
            }
            None if reply_due => actions.push(Action::Reply(text)),
            None => actions.push(Action::Print(text)),
        }
        actions.push(Action::Hide);
        if !self.opts.persistent {
            actions.push(Action::Exit(0));
        }

        self.engine.index_mut().record_use(sel.id);
        self.engine.refresh();
        self.cursor.replace(self.engine.groups());
        actions
    }

    fn cancel(&mut self) -> Vec<Action> {
        if !self.opts.persistent {
            return vec![Action::Exit(1)];
        }
        let mut actions = Vec::new();
        if self.awaiting_reply {
            self.awaiting_reply = false;
            actions.push(Action::Reply(String::new()));
        }
        actions.push(Action::Hide);
        actions
    }

    pub fn highlighted(&self) -> Option<&Candidate> {
        self.cursor
            .current()
            .and_then(|id| self.engine.index().candidate(id))
    }

    pub fn cursor(&self) -> &SelectionCursor {
        &self.cursor
    }

    pub fn engine(&self) -> &SearchEngine<I> {
        &self.engine
    }

    pub fn is_persistent(&self) -> bool {
        self.opts.persistent
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }
}
