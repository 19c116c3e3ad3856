//! Line-at-a-time REPL.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use colored::Colorize;

use crate::session::Session;

const HISTORY_FILE: &str = ".triples_history";
const PROMPT: &str = "> ";

pub struct Repl {
    session: Session,
    history: Vec<String>,
    history_file: PathBuf,
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

impl Repl {
    pub fn new() -> Self {
        let mut repl = Self {
            session: Session::new(),
            history: Vec::new(),
            history_file: Self::history_path(),
        };
        repl.load_history();
        repl
    }

    fn history_path() -> PathBuf {
        match dirs::home_dir() {
            Some(home) => home.join(HISTORY_FILE),
            None => PathBuf::from(HISTORY_FILE),
        }
    }

    fn load_history(&mut self) {
        if let Ok(content) = std::fs::read_to_string(&self.history_file) {
            self.history = content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect();
        }
    }

    fn save_history(&self) {
        let _ = std::fs::write(&self.history_file, self.history.join("\n"));
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Read lines until `exit` or end of input. Errors are reported and the loop goes on.
    pub fn run(&mut self) -> io::Result<()> {
        println!("{}", "TripleS REPL".bold());
        println!("Type exit to quit.\n");

        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print!("{}", PROMPT);
            io::stdout().flush()?;

            let Some(line) = lines.next() else {
                println!();
                break;
            };
            let line = line?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }
            if line == "exit" {
                break;
            }

            self.history.push(line.to_string());
            let _ = self.session.run(line);
        }

        self.save_history();
        Ok(())
    }
}
