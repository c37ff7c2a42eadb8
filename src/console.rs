//! Console abstraction
//!
//! The conversation talks to the user through `Console` so stages can be
//! driven from stdin in the binary and from a fixed script in tests.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::error::{LeadError, LeadResult};

/// Line-oriented user interaction
pub trait Console {
    /// Show one line of output
    fn say(&mut self, line: &str) -> LeadResult<()>;

    /// Show `prompt` and block until the user answers
    ///
    /// The returned line has its trailing newline removed but is otherwise raw.
    /// An answer that cannot be decoded comes back blank, so collectors re-prompt.
    fn read_line(&mut self, prompt: &str) -> LeadResult<String>;
}

/// Console backed by the process's stdin/stdout
pub struct StdConsole<R, W> {
    input: R,
    output: W,
}

impl StdConsole<io::StdinLock<'static>, io::Stdout> {
    pub fn new() -> Self {
        Self {
            input: io::stdin().lock(),
            output: io::stdout(),
        }
    }
}

impl Default for StdConsole<io::StdinLock<'static>, io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead, W: Write> StdConsole<R, W> {
    /// Console over arbitrary reader/writer pair
    pub fn with_io(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Console for StdConsole<R, W> {
    fn say(&mut self, line: &str) -> LeadResult<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> LeadResult<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut buf = Vec::new();
        let read = self.input.read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Err(LeadError::InputClosed {
                prompt: prompt.trim_end().to_string(),
            });
        }

        let mut line = match String::from_utf8(buf) {
            Ok(line) => line,
            Err(e) => {
                warn!(bytes = e.as_bytes().len(), "discarding answer that is not valid UTF-8");
                String::new()
            }
        };

        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }
}

/// Console that replays canned answers and records everything shown
///
/// Used by tests and demos; running out of answers behaves like a closed stdin.
#[derive(Debug, Default, Clone)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Every line said and every prompt shown, in order
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Whether any shown line contains `needle`
    pub fn saw(&self, needle: &str) -> bool {
        self.transcript.iter().any(|line| line.contains(needle))
    }

    /// Number of shown lines containing `needle`
    pub fn count(&self, needle: &str) -> usize {
        self.transcript
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }

    pub fn remaining_answers(&self) -> usize {
        self.answers.len()
    }
}

impl Console for ScriptedConsole {
    fn say(&mut self, line: &str) -> LeadResult<()> {
        self.transcript.push(line.to_string());
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> LeadResult<String> {
        self.transcript.push(prompt.to_string());
        self.answers.pop_front().ok_or_else(|| LeadError::InputClosed {
            prompt: prompt.trim_end().to_string(),
        })
    }
}
