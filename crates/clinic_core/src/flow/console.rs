use std::io::{self, BufRead, Write};

/// Line-oriented terminal used by the flows.
pub trait Console {
    /// Shows `prompt` and returns the next input line without its line ending.
    ///
    /// End of input is reported as `io::ErrorKind::UnexpectedEof`.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// Console over any buffered reader and writer; stdin/stdout by default.
pub struct StdConsole<R, W> {
    input: R,
    output: W,
}

impl StdConsole<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Console for StdConsole<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            ));
        }
        let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed_len);
        Ok(line)
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }
}
