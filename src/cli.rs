use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "selpg")]
#[command(about = "Select a range of pages from a text stream")]
#[command(version)]
#[command(allow_negative_numbers = true)]
pub struct Cli {
    /// First page to print
    #[arg(short, long, value_name = "NUMBER")]
    pub start_page: i64,

    /// Last page to print
    #[arg(short, long, value_name = "NUMBER")]
    pub end_page: i64,

    /// Number of lines in a page [default: 72]
    #[arg(short = 'l', long, value_name = "NUMBER")]
    pub page_len: Option<i64>,

    /// Pages are delimited by form feed characters instead of a line count
    #[arg(short = 'f', long)]
    pub use_page_break: bool,

    /// Send output to this printer via `lp` instead of stdout
    #[arg(short = 'd', long, value_name = "DESTINATION")]
    pub print_dest: Option<String>,

    /// Input file (reads stdin when omitted)
    pub file: Option<PathBuf>,
}
