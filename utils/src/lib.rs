/// Keyword asking a running instance to surface its window.
pub const WAKE_KEYWORD: &[u8; 4] = b"wake";

/// Keyword asking a running instance to terminate.
pub const QUIT_KEYWORD: &[u8; 4] = b"quit";

/// Length of the longest recognized keyword.
///
/// The inbound buffer is cleared once it holds this many bytes without a
/// match. Any longer keyword added to the alphabet must raise this bound.
pub const MAX_KEYWORD_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Wake,
    Quit,
}

impl Command {
    pub fn keyword(self) -> &'static [u8] {
        match self {
            Command::Wake => WAKE_KEYWORD,
            Command::Quit => QUIT_KEYWORD,
        }
    }

    fn recognize(buf: &[u8]) -> Option<Command> {
        if buf == WAKE_KEYWORD {
            Some(Command::Wake)
        } else if buf == QUIT_KEYWORD {
            Some(Command::Quit)
        } else {
            None
        }
    }
}

/// Outcome of feeding one byte to an [`InboundBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// Still a possible prefix (or simply not long enough to judge).
    Pending,
    /// The buffer spelled a keyword; it has been reset.
    Matched(Command),
    /// The buffer reached [`MAX_KEYWORD_LEN`] without matching and was cleared.
    Reset,
}

/// Per-connection accumulator for the keyword protocol.
///
/// There is no framing: bytes may arrive split over any number of reads, so
/// the buffer is tested after every byte.
#[derive(Debug, Default, Clone)]
pub struct InboundBuffer {
    buf: Vec<u8>,
}

impl InboundBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, byte: u8) -> Scan {
        self.buf.push(byte);
        if let Some(cmd) = Command::recognize(&self.buf) {
            self.buf.clear();
            return Scan::Matched(cmd);
        }
        if self.buf.len() >= MAX_KEYWORD_LEN {
            self.buf.clear();
            return Scan::Reset;
        }
        Scan::Pending
    }

    /// Feed one read's worth of bytes.
    ///
    /// At most one command is recognized per chunk: once a keyword matches,
    /// the rest of the chunk is dropped. An empty chunk still re-tests the
    /// (possibly empty) buffer and never matches.
    pub fn feed(&mut self, chunk: &[u8]) -> Option<Command> {
        for &b in chunk {
            match self.push(b) {
                Scan::Matched(cmd) => return Some(cmd),
                Scan::Reset | Scan::Pending => {}
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
