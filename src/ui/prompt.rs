// Line-based console prompts

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    /// Nobody answered in time, or stdin was closed
    NoAnswer,
}

/// Only an explicit "y"/"yes" counts as agreement
pub fn is_yes(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Console input fed by a dedicated reader thread, so a question can time out
/// without leaving a stray reader that swallows the next line.
///
/// Create it only after the file picker has released the terminal.
pub struct Console {
    lines: Receiver<String>,
}

impl Console {
    pub fn stdin() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines().map_while(Result::ok) {
                if tx.send(line).is_err() {
                    break; // Console dropped
                }
            }
        });
        Self::from_receiver(rx)
    }

    pub fn from_receiver(lines: Receiver<String>) -> Self {
        Self { lines }
    }

    fn prompt(question: &str) {
        print!("{}", question);
        io::stdout().flush().ok();
    }

    /// Ask a yes/no question and block until a line arrives.
    /// A closed stdin counts as "no".
    pub fn ask(&self, question: &str) -> bool {
        Self::prompt(question);
        match self.lines.recv() {
            Ok(line) => is_yes(&line),
            Err(_) => {
                println!();
                false
            }
        }
    }

    /// Ask a yes/no question, giving up after `timeout`
    pub fn ask_with_timeout(&self, question: &str, timeout: Duration) -> Answer {
        Self::prompt(question);
        match self.lines.recv_timeout(timeout) {
            Ok(line) if is_yes(&line) => Answer::Yes,
            Ok(_) => Answer::No,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                println!();
                Answer::NoAnswer
            }
        }
    }

    /// Wait for Enter so a double-clicked console window stays readable
    pub fn pause(&self, message: &str) {
        Self::prompt(message);
        let _ = self.lines.recv();
    }
}
