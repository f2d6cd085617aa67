//! Page selection over a byte stream.
//!
//! The input is read one segment at a time, where a segment runs up to and
//! including the next delimiter byte. Each segment is assigned a page number
//! and copied verbatim to the sink when that page is inside the requested
//! range. Reading stops as soon as a page past the end of the range shows up.

use crate::page_range::PageRange;
use log::{debug, trace};
use std::io::{self, BufRead, Write};
use std::num::NonZeroUsize;
use thiserror::Error;

pub const LINE_FEED: u8 = b'\n';
pub const FORM_FEED: u8 = b'\x0c';

/// How page boundaries are found in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDelimiter {
    /// Every `n` newline-terminated lines make up a page.
    FixedLineCount(NonZeroUsize),
    /// Every form feed ends a page.
    ExplicitBreakCharacter,
}

impl PageDelimiter {
    /// The byte a single read stops at.
    pub fn byte(&self) -> u8 {
        match self {
            PageDelimiter::FixedLineCount(_) => LINE_FEED,
            PageDelimiter::ExplicitBreakCharacter => FORM_FEED,
        }
    }

    /// Whether trailing data with no final delimiter is still a segment.
    /// Form-feed pages are only complete once their break byte is seen.
    fn keeps_unterminated_tail(&self) -> bool {
        match self {
            PageDelimiter::FixedLineCount(_) => true,
            PageDelimiter::ExplicitBreakCharacter => false,
        }
    }
}

impl std::fmt::Display for PageDelimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageDelimiter::FixedLineCount(n) => write!(f, "{} lines per page", n),
            PageDelimiter::ExplicitBreakCharacter => write!(f, "form feed page breaks"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PaginateError {
    #[error("failed to read input")]
    Read(#[source] io::Error),
    #[error("failed to write output")]
    Write(#[source] io::Error),
}

/// Why the read loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The input ran out.
    Exhausted,
    /// A page past the end of the range was reached; the rest of the input
    /// was left unread.
    RangeSatisfied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub stop: StopReason,
    pub pages_written: u64,
    pub bytes_written: u64,
}

/// Page position within the stream, advanced once per segment.
struct PageCounter {
    page: u64,
    lines_in_page: usize,
}

impl PageCounter {
    fn new(delimiter: PageDelimiter) -> Self {
        // In break mode `page` counts completed pages and is bumped before
        // the segment is classified, so the first segment still lands on 1.
        let page = match delimiter {
            PageDelimiter::FixedLineCount(_) => 1,
            PageDelimiter::ExplicitBreakCharacter => 0,
        };
        PageCounter {
            page,
            lines_in_page: 0,
        }
    }

    /// Account for one more segment and return the page it belongs to.
    fn advance(&mut self, delimiter: PageDelimiter) -> u64 {
        match delimiter {
            PageDelimiter::ExplicitBreakCharacter => self.page += 1,
            PageDelimiter::FixedLineCount(n) => {
                self.lines_in_page += 1;
                if self.lines_in_page > n.get() {
                    self.lines_in_page = 1;
                    self.page += 1;
                    trace!("page {} starts", self.page);
                }
            }
        }
        self.page
    }
}

/// Copy the pages of `source` that fall inside `range` to `sink`.
///
/// Segments are written whole and in input order. Pages before the range are
/// read and dropped; the first page after it ends the run without consuming
/// anything further. Any I/O failure aborts immediately, leaving whatever was
/// already written in place. The sink is flushed before returning `Ok`.
pub fn paginate<R, W>(
    mut source: R,
    mut sink: W,
    delimiter: PageDelimiter,
    range: PageRange,
) -> Result<Outcome, PaginateError>
where
    R: BufRead,
    W: Write,
{
    let byte = delimiter.byte();
    let mut counter = PageCounter::new(delimiter);
    let mut segment = Vec::new();
    let mut last_written = None;
    let mut pages_written = 0;
    let mut bytes_written = 0;

    let stop = loop {
        segment.clear();
        let n = source
            .read_until(byte, &mut segment)
            .map_err(PaginateError::Read)?;
        if n == 0 {
            break StopReason::Exhausted;
        }

        if segment.last() != Some(&byte) && !delimiter.keeps_unterminated_tail() {
            debug!("dropping {} bytes after the last page break", n);
            break StopReason::Exhausted;
        }

        let page = counter.advance(delimiter);
        if range.is_past(page) {
            break StopReason::RangeSatisfied;
        }
        if !range.contains(page) {
            continue;
        }

        sink.write_all(&segment).map_err(PaginateError::Write)?;
        bytes_written += n as u64;
        if last_written != Some(page) {
            last_written = Some(page);
            pages_written += 1;
        }
    };

    sink.flush().map_err(PaginateError::Write)?;

    Ok(Outcome {
        stop,
        pages_written,
        bytes_written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    const BREAKS: PageDelimiter = PageDelimiter::ExplicitBreakCharacter;

    fn lines(n: usize) -> PageDelimiter {
        PageDelimiter::FixedLineCount(NonZeroUsize::new(n).unwrap())
    }

    fn range(start: u32, end: u32) -> PageRange {
        PageRange::new(start, end).unwrap()
    }

    fn run(input: &[u8], delimiter: PageDelimiter, pages: PageRange) -> (Vec<u8>, Outcome) {
        let mut out = Vec::new();
        let outcome = paginate(input, &mut out, delimiter, pages).unwrap();
        (out, outcome)
    }

    fn numbered_lines(count: usize) -> Vec<u8> {
        (1..=count).flat_map(|i| format!("{}\n", i).into_bytes()).collect()
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "source went away"))
        }
    }

    /// Accepts `budget` bytes, then fails every write.
    struct FailingWriter {
        written: Vec<u8>,
        budget: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "sink is full"));
            }
            let n = buf.len().min(self.budget);
            self.written.extend_from_slice(&buf[..n]);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_second_page_of_150_lines() {
        let input = b"x\n".repeat(150);
        let (out, outcome) = run(&input, lines(72), range(2, 2));
        assert_eq!(out, b"x\n".repeat(72));
        assert_eq!(outcome.pages_written, 1);
        assert_eq!(outcome.stop, StopReason::RangeSatisfied);
    }

    #[test]
    fn test_second_page_holds_lines_73_to_144() {
        let input = numbered_lines(150);
        let (out, _) = run(&input, lines(72), range(2, 2));
        let expected: Vec<u8> = (73..=144)
            .flat_map(|i| format!("{}\n", i).into_bytes())
            .collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_exact_multiple_of_page_length() {
        let input = numbered_lines(6);
        let (out, outcome) = run(&input, lines(3), range(1, u32::MAX));
        assert_eq!(out, input);
        assert_eq!(outcome.pages_written, 2);
        assert_eq!(outcome.stop, StopReason::Exhausted);

        let (out, _) = run(&input, lines(3), range(3, 3));
        assert!(out.is_empty());
    }

    #[test]
    fn test_partial_last_page() {
        let input = numbered_lines(7);
        let (_, outcome) = run(&input, lines(3), range(1, u32::MAX));
        assert_eq!(outcome.pages_written, 3);

        let (out, _) = run(&input, lines(3), range(3, 3));
        assert_eq!(out, b"7\n");
    }

    #[test]
    fn test_boundary_line_opens_new_page() {
        let (out, _) = run(b"a\nb\nc\n", lines(2), range(1, 1));
        assert_eq!(out, b"a\nb\n");
        let (out, _) = run(b"a\nb\nc\n", lines(2), range(2, 2));
        assert_eq!(out, b"c\n");
    }

    #[test]
    fn test_unterminated_last_line_is_kept() {
        let (out, outcome) = run(b"a\nb\nc", lines(2), range(2, 2));
        assert_eq!(out, b"c");
        assert_eq!(outcome.bytes_written, 1);
        assert_eq!(outcome.stop, StopReason::Exhausted);
    }

    #[test]
    fn test_form_feed_drops_unterminated_tail() {
        let (out, outcome) = run(b"A\x0cB\x0cC", BREAKS, range(1, 3));
        assert_eq!(out, b"A\x0cB\x0c");
        assert_eq!(outcome.pages_written, 2);
        assert_eq!(outcome.stop, StopReason::Exhausted);
    }

    #[test]
    fn test_form_feed_page_count_matches_breaks() {
        let input = b"one\nline\x0ctwo\x0cthree\n\x0c";
        let (out, outcome) = run(input, BREAKS, range(1, 10));
        assert_eq!(out, input);
        assert_eq!(outcome.pages_written, 3);

        let (out, _) = run(input, BREAKS, range(2, 2));
        assert_eq!(out, b"two\x0c");
    }

    #[test]
    fn test_form_feed_ignores_newlines() {
        let (out, _) = run(b"a\nb\nc\n\x0cd\x0c", BREAKS, range(1, 1));
        assert_eq!(out, b"a\nb\nc\n\x0c");
    }

    #[test]
    fn test_single_page_round_trip() {
        let (out, _) = run(b"only page\n", lines(72), range(1, 1));
        assert_eq!(out, b"only page\n");
        let (out, _) = run(b"only page\x0c", BREAKS, range(1, 1));
        assert_eq!(out, b"only page\x0c");
    }

    #[test]
    fn test_start_beyond_input_is_empty_success() {
        let input = numbered_lines(9);
        let (out, outcome) = run(&input, lines(3), range(5, 10));
        assert!(out.is_empty());
        assert_eq!(outcome.pages_written, 0);
        assert_eq!(outcome.stop, StopReason::Exhausted);

        let (out, outcome) = run(b"a\x0cb\x0cc\x0c", BREAKS, range(5, 10));
        assert!(out.is_empty());
        assert_eq!(outcome.stop, StopReason::Exhausted);
    }

    #[test]
    fn test_empty_input() {
        let (out, outcome) = run(b"", lines(72), range(1, 1));
        assert!(out.is_empty());
        assert_eq!(outcome.stop, StopReason::Exhausted);
    }

    #[test]
    fn test_stops_reading_after_range() {
        let mut source = Cursor::new(b"a\nb\nc\nd\n".to_vec());
        let mut out = Vec::new();
        let outcome = paginate(&mut source, &mut out, lines(1), range(1, 1)).unwrap();
        assert_eq!(out, b"a\n");
        assert_eq!(outcome.stop, StopReason::RangeSatisfied);
        // "a\n" was written and "b\n" was read to discover page 2; nothing more.
        assert_eq!(source.position(), 4);
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let input = numbered_lines(500);
        let (first, _) = run(&input, lines(10), range(7, 19));
        let (second, _) = run(&input.clone(), lines(10), range(7, 19));
        assert_eq!(first, second);
        assert_eq!(first.iter().filter(|&&b| b == b'\n').count(), 130);
    }

    #[test]
    fn test_read_error_keeps_written_bytes() {
        let source = BufReader::new(Cursor::new(b"a\nb\n".to_vec()).chain(FailingReader));
        let mut out = Vec::new();
        let err = paginate(source, &mut out, lines(72), range(1, 1)).unwrap_err();
        assert!(matches!(err, PaginateError::Read(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert_eq!(out, b"a\nb\n");
    }

    #[test]
    fn test_write_error_aborts() {
        let mut sink = FailingWriter {
            written: Vec::new(),
            budget: 3,
        };
        let err = paginate(&b"ab\ncd\nef\n"[..], &mut sink, lines(72), range(1, 1)).unwrap_err();
        assert!(matches!(err, PaginateError::Write(_)));
        assert_eq!(sink.written, b"ab\n");
    }
}
