use anyhow::{bail, Context, Result};
use log::debug;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, StdoutLock, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

/// Command that receives the selected pages when a print destination is set.
pub const PRINT_COMMAND: &str = "lp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl From<Option<PathBuf>> for InputSource {
    fn from(path: Option<PathBuf>) -> Self {
        path.map_or(InputSource::Stdin, InputSource::File)
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Stdin => write!(f, "stdin"),
            InputSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    Stdout,
    Printer(String),
}

impl From<Option<String>> for OutputSink {
    fn from(destination: Option<String>) -> Self {
        destination.map_or(OutputSink::Stdout, OutputSink::Printer)
    }
}

pub fn open_input(source: &InputSource) -> Result<Box<dyn BufRead>> {
    match source {
        InputSource::Stdin => Ok(Box::new(io::stdin().lock())),
        InputSource::File(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

pub fn open_output(sink: &OutputSink) -> Result<Output> {
    match sink {
        OutputSink::Stdout => Ok(Output::Stdout(BufWriter::new(io::stdout().lock()))),
        OutputSink::Printer(destination) => {
            let mut command = Command::new(PRINT_COMMAND);
            command.arg(format!("-d{}", destination));
            Ok(Output::Printer(PrintJob::spawn(command)?))
        }
    }
}

/// An opened sink. Call [`Output::finish`] once writing is done so that
/// failures while closing are reported.
pub enum Output {
    Stdout(BufWriter<StdoutLock<'static>>),
    Printer(PrintJob),
}

impl Output {
    pub fn finish(self) -> Result<()> {
        match self {
            Output::Stdout(mut out) => out.flush().context("Failed to flush stdout"),
            Output::Printer(job) => job.finish(),
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(out) => out.write(buf),
            Output::Printer(job) => job.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(out) => out.flush(),
            Output::Printer(job) => job.flush(),
        }
    }
}

/// A print command fed through its stdin.
///
/// Dropping a job without calling [`PrintJob::finish`] still closes the pipe
/// and reaps the child, but any failure is lost.
pub struct PrintJob {
    program: String,
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
}

impl PrintJob {
    /// Start `command` with a piped stdin. Its stdout and stderr are
    /// inherited.
    pub fn spawn(mut command: Command) -> Result<Self> {
        let program = command.get_program().to_string_lossy().into_owned();
        let mut child = command
            .stdin(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start print command: {}", program))?;
        let stdin = child
            .stdin
            .take()
            .with_context(|| format!("Print command has no stdin: {}", program))?;
        debug!("started {} (pid {})", program, child.id());

        Ok(PrintJob {
            program,
            child,
            stdin: Some(BufWriter::new(stdin)),
        })
    }

    /// Flush and close the pipe, then wait for the command to exit.
    pub fn finish(mut self) -> Result<()> {
        let flushed = match self.stdin.take() {
            Some(mut stdin) => stdin.flush(),
            None => Ok(()),
        };
        let status = self
            .child
            .wait()
            .with_context(|| format!("Failed to wait for print command: {}", self.program))?;
        flushed.with_context(|| format!("Failed to write to print command: {}", self.program))?;

        if !status.success() {
            bail!("Print command {} failed: {}", self.program, status);
        }
        debug!("{} finished", self.program);
        Ok(())
    }

    fn stdin_mut(&mut self) -> io::Result<&mut BufWriter<ChildStdin>> {
        self.stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "print job is closed"))
    }
}

impl Write for PrintJob {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stdin_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdin_mut()?.flush()
    }
}

impl Drop for PrintJob {
    fn drop(&mut self) {
        if let Some(stdin) = self.stdin.take() {
            drop(stdin);
            let _ = self.child.wait();
        }
    }
}
