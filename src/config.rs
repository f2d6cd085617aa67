use crate::cli::Cli;
use crate::page_range::PageRange;
use crate::paginate::PageDelimiter;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PAGE_LENGTH: usize = 72;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("page number must be positive (got {0})")]
    NonPositivePage(i64),
    #[error("start page {start} cannot be greater than end page {end}")]
    StartAfterEnd { start: i64, end: i64 },
    #[error("page number {0} is too large")]
    PageTooLarge(i64),
    #[error("page length must be positive (got {0})")]
    NonPositivePageLength(i64),
    #[error("-f and -l{0} cannot be used together")]
    ConflictingDelimiters(i64),
    #[error("print destination cannot be empty")]
    EmptyDestination,
}

/// Validated run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub range: PageRange,
    pub delimiter: PageDelimiter,
    pub input: Option<PathBuf>,
    pub destination: Option<String>,
}

impl Config {
    pub fn from_args(cli: &Cli) -> Result<Self, ConfigError> {
        let range = page_range(cli.start_page, cli.end_page)?;
        let delimiter = delimiter(cli.use_page_break, cli.page_len)?;

        let destination = match &cli.print_dest {
            Some(dest) if dest.trim().is_empty() => return Err(ConfigError::EmptyDestination),
            dest => dest.clone(),
        };

        Ok(Config {
            range,
            delimiter,
            input: cli.file.clone(),
            destination,
        })
    }
}

fn page_number(n: i64) -> Result<u32, ConfigError> {
    if n <= 0 {
        return Err(ConfigError::NonPositivePage(n));
    }
    u32::try_from(n).map_err(|_| ConfigError::PageTooLarge(n))
}

fn page_range(start: i64, end: i64) -> Result<PageRange, ConfigError> {
    let start_page = page_number(start)?;
    let end_page = page_number(end)?;
    PageRange::new(start_page, end_page).map_err(|_| ConfigError::StartAfterEnd { start, end })
}

fn delimiter(use_page_break: bool, page_len: Option<i64>) -> Result<PageDelimiter, ConfigError> {
    if use_page_break {
        // An explicit default length is indistinguishable from no length at all.
        return match page_len {
            Some(len) if len != DEFAULT_PAGE_LENGTH as i64 => {
                Err(ConfigError::ConflictingDelimiters(len))
            }
            _ => Ok(PageDelimiter::ExplicitBreakCharacter),
        };
    }

    let len = page_len.unwrap_or(DEFAULT_PAGE_LENGTH as i64);
    usize::try_from(len)
        .ok()
        .and_then(NonZeroUsize::new)
        .map(PageDelimiter::FixedLineCount)
        .ok_or(ConfigError::NonPositivePageLength(len))
}
