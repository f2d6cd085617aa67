use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRangeError {
    #[error("page numbers must be >= 1 (got {start}-{end})")]
    ZeroPage { start: u32, end: u32 },
    #[error("start page {start} cannot be greater than end page {end}")]
    Reversed { start: u32, end: u32 },
}

/// Inclusive range of 1-based page numbers, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    start: u32,
    end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Result<Self, PageRangeError> {
        if start == 0 || end == 0 {
            return Err(PageRangeError::ZeroPage { start, end });
        }
        if start > end {
            return Err(PageRangeError::Reversed { start, end });
        }
        Ok(PageRange { start, end })
    }

    /// Number of pages the range covers
    pub fn page_count(&self) -> u32 {
        self.end - self.start + 1
    }

    pub fn contains(&self, page: u64) -> bool {
        page >= u64::from(self.start) && page <= u64::from(self.end)
    }

    /// True once `page` lies beyond the end of the range. Pages are visited
    /// in increasing order, so nothing after this point can match.
    pub fn is_past(&self, page: u64) -> bool {
        page > u64::from(self.end)
    }
}

impl std::fmt::Display for PageRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}
