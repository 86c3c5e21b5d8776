//! Bounded TX/RX event log.
//!
//! Fixed-capacity store of timestamped entries backed by a `heapless::Vec`
//! (no heap).  Entry ids come from a counter that is independent of buffer
//! position and never goes backwards, not even across [`LogBuffer::clear`].
//!
//! Overflow policy: once [`LOG_CAPACITY`] entries are held, the write
//! cursor jumps back to position 0 and the next append overwrites that
//! slot; the length stays at capacity.
//!
//! ```text
//!  after C+2 appends (C = 256):
//!  position:  0      1      2      …   C-1
//!  entry id:  C      C+1    2      …   C-1
//!                          ▲ cursor
//!  iteration: 2, 3, …, C-1, C, C+1   (oldest still present first)
//! ```

use core::fmt;

/// Maximum number of entries the buffer holds.
pub const LOG_CAPACITY: usize = 256;

/// Maximum byte length of an entry's text; longer text is truncated.
pub const LOG_TEXT_MAX: usize = 159;

// ---------------------------------------------------------------------------
// Entry types
// ---------------------------------------------------------------------------

/// Direction of a logged frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// Simulated transmit (or a panel notice such as a stop).
    Tx,
    /// Simulated acknowledgement received.
    Rx,
}

impl LogKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tx => "TX",
            Self::Rx => "RX",
        }
    }
}

/// Wall-clock time of day with one-second resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    secs_of_day: u32,
}

impl Timestamp {
    const SECS_PER_DAY: u64 = 86_400;

    /// Build from seconds since local midnight; values past one day wrap.
    pub const fn from_secs_of_day(secs: u64) -> Self {
        Self {
            secs_of_day: (secs % Self::SECS_PER_DAY) as u32,
        }
    }

    pub const fn from_hms(hour: u8, minute: u8, second: u8) -> Self {
        Self::from_secs_of_day(hour as u64 * 3600 + minute as u64 * 60 + second as u64)
    }

    pub const fn hour(self) -> u8 {
        (self.secs_of_day / 3600) as u8
    }

    pub const fn minute(self) -> u8 {
        (self.secs_of_day / 60 % 60) as u8
    }

    pub const fn second(self) -> u8 {
        (self.secs_of_day % 60) as u8
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour(), self.minute(), self.second())
    }
}

/// One immutable log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    id: u64,
    kind: LogKind,
    timestamp: Timestamp,
    text: heapless::String<LOG_TEXT_MAX>,
}

impl LogEntry {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> LogKind {
        self.kind
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Renders the panel's log line, e.g. `12:00:01 [TX] 声音 (Sound) - 调节座椅`.
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.timestamp, self.kind.as_str(), self.text)
    }
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// Fixed-capacity ordered store of [`LogEntry`] values.
pub struct LogBuffer {
    /// Backing storage.  Slots past `len` may hold stale entries after a
    /// clear; they are never exposed.
    slots: heapless::Vec<LogEntry, LOG_CAPACITY>,
    /// Number of live entries (`<= LOG_CAPACITY`).
    len: usize,
    /// Position the next append writes to.
    cursor: usize,
    /// Id handed to the next appended entry.
    next_id: u64,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LogBuffer {
    pub fn new() -> Self {
        Self {
            slots: heapless::Vec::new(),
            len: 0,
            cursor: 0,
            next_id: 0,
        }
    }

    /// Append an entry and return its id.  Never fails: oversized text is
    /// truncated and a full buffer restarts at position 0.
    pub fn append(&mut self, kind: LogKind, text: &str, timestamp: Timestamp) -> u64 {
        if self.cursor == LOG_CAPACITY {
            self.cursor = 0;
        }

        let id = self.next_id;
        self.next_id += 1;

        let entry = LogEntry {
            id,
            kind,
            timestamp,
            text: bounded(text),
        };

        if let Some(slot) = self.slots.get_mut(self.cursor) {
            *slot = entry;
        } else {
            // cursor == slots.len() < LOG_CAPACITY here, so the push fits.
            let pushed = self.slots.push(entry);
            debug_assert!(pushed.is_ok());
        }

        self.cursor += 1;
        self.len = (self.len + 1).min(LOG_CAPACITY);
        id
    }

    /// Drop every entry from view.  Ids keep counting from where they were.
    pub fn clear(&mut self) {
        self.len = 0;
        self.cursor = 0;
    }

    /// Live entries, oldest still present first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        let live = &self.slots[..self.len];
        // Only a full buffer can have wrapped; below capacity the newest
        // entry is always at `len - 1`.
        let split = if self.len == LOG_CAPACITY {
            self.cursor
        } else {
            0
        };
        let (newer, older) = live.split_at(split);
        older.iter().chain(newer.iter())
    }

    /// Entry stored at buffer `position`, if that position is live.
    pub fn at(&self, position: usize) -> Option<&LogEntry> {
        self.slots[..self.len].get(position)
    }

    /// Most recently appended entry still present.
    pub fn last(&self) -> Option<&LogEntry> {
        if self.len == 0 {
            return None;
        }
        self.slots.get(self.cursor - 1)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Position the next append will write to (before any wrap).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Id the next appended entry will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }
}

/// Copy `text` into a fixed-capacity string, cutting at the last UTF-8
/// boundary that fits.
pub(crate) fn bounded<const N: usize>(text: &str) -> heapless::String<N> {
    let mut end = text.len().min(N);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = heapless::String::new();
    let fits = out.push_str(&text[..end]);
    debug_assert!(fits.is_ok());
    out
}

/// Format into a fixed-capacity string.  Output past `N` bytes is dropped
/// at a UTF-8 boundary, so the result is always a prefix of the full text.
pub(crate) fn bounded_fmt<const N: usize>(args: fmt::Arguments<'_>) -> heapless::String<N> {
    let mut out = Clipped {
        buf: heapless::String::new(),
        full: false,
    };
    // `Clipped` never reports an error.
    let _ = fmt::Write::write_fmt(&mut out, args);
    out.buf
}

struct Clipped<const N: usize> {
    buf: heapless::String<N>,
    full: bool,
}

impl<const N: usize> fmt::Write for Clipped<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.full {
            return Ok(());
        }
        let mut end = s.len().min(N - self.buf.len());
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.full = end < s.len();
        let fits = self.buf.push_str(&s[..end]);
        debug_assert!(fits.is_ok());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: Timestamp = Timestamp::from_hms(12, 0, 0);

    fn fill(buf: &mut LogBuffer, n: usize) {
        for i in 0..n {
            let mut text: heapless::String<16> = heapless::String::new();
            let _ = core::fmt::Write::write_fmt(&mut text, format_args!("m{}", i));
            buf.append(LogKind::Tx, &text, T0);
        }
    }

    #[test]
    fn append_assigns_increasing_ids() {
        let mut buf = LogBuffer::new();
        let a = buf.append(LogKind::Tx, "a", T0);
        let b = buf.append(LogKind::Rx, "b", T0);
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(buf.len(), 2);
        let texts: Vec<&str> = buf.iter().map(LogEntry::text).collect();
        assert_eq!(texts, ["a", "b"]);
    }

    #[test]
    fn overflow_restarts_at_position_zero() {
        let mut buf = LogBuffer::new();
        fill(&mut buf, LOG_CAPACITY + 1);

        assert_eq!(buf.len(), LOG_CAPACITY);
        let first = buf.at(0).unwrap();
        assert_eq!(first.id(), LOG_CAPACITY as u64);
        assert_eq!(first.text(), "m256");
        assert_eq!(buf.cursor(), 1);

        // Iteration skips the overwritten entry and ends with the newest.
        let ids: Vec<u64> = buf.iter().map(LogEntry::id).collect();
        assert_eq!(ids.len(), LOG_CAPACITY);
        assert_eq!(ids[0], 1);
        assert_eq!(*ids.last().unwrap(), LOG_CAPACITY as u64);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn clear_keeps_id_counter() {
        let mut buf = LogBuffer::new();
        fill(&mut buf, 5);
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.iter().count(), 0);
        assert!(buf.at(0).is_none());
        assert!(buf.last().is_none());

        let id = buf.append(LogKind::Tx, "after", T0);
        assert_eq!(id, 5);
        assert_eq!(buf.at(0).unwrap().text(), "after");
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn clear_on_empty_is_noop() {
        let mut buf = LogBuffer::new();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.next_id(), 0);
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn clear_after_wrap_hides_stale_slots() {
        let mut buf = LogBuffer::new();
        fill(&mut buf, LOG_CAPACITY + 3);
        buf.clear();
        buf.append(LogKind::Rx, "fresh", T0);
        let texts: Vec<&str> = buf.iter().map(LogEntry::text).collect();
        assert_eq!(texts, ["fresh"]);
    }

    #[test]
    fn formatted_text_stops_at_first_piece_that_overflows() {
        // "ab" + "停停" does not fit in 6 bytes; the trailing "c" would,
        // but must not leak past the cut.
        let text: heapless::String<6> = bounded_fmt(format_args!("{}{}{}", "ab", "停停", "c"));
        assert_eq!(text, "ab停");
        let short: heapless::String<6> = bounded_fmt(format_args!("{}-{}", 1, 2));
        assert_eq!(short, "1-2");
    }

    #[test]
    fn long_text_is_truncated_on_char_boundary() {
        let mut buf = LogBuffer::new();
        // One ASCII byte then 3-byte characters: byte 159 is mid-character.
        let long = format!("a{}", "停".repeat(60));
        buf.append(LogKind::Tx, &long, T0);
        let text = buf.last().unwrap().text();
        assert!(text.len() <= LOG_TEXT_MAX);
        assert_eq!(text.len(), 1 + 52 * 3);
        assert!(text[1..].chars().all(|c| c == '停'));
    }

    #[test]
    fn entry_renders_as_panel_line() {
        let mut buf = LogBuffer::new();
        buf.append(LogKind::Rx, "ACK: OK", Timestamp::from_hms(9, 5, 7));
        assert_eq!(buf.last().unwrap().to_string(), "09:05:07 [RX] ACK: OK");
    }

    #[test]
    fn timestamp_wraps_at_midnight() {
        let ts = Timestamp::from_secs_of_day(86_400 + 61);
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (0, 1, 1));
        assert_eq!(Timestamp::from_hms(23, 59, 59).to_string(), "23:59:59");
    }

    #[test]
    fn last_tracks_newest_across_wrap() {
        let mut buf = LogBuffer::new();
        fill(&mut buf, LOG_CAPACITY + 2);
        assert_eq!(buf.last().unwrap().text(), "m257");
    }
}
