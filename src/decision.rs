//! Decision providers: the external collaborator asked to pick a primary
//! key when a table has more than one candidate.

use std::io::{self, BufRead, Write};

#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error("Failed to read selection: {0}")]
    Io(#[from] io::Error),
    #[error("Decision input closed before a selection was made")]
    Closed,
}

/// Picks one of `candidates` (human-readable renderings such as
/// `(SSN,Name)`) as the primary key for `table`, returning its zero-based
/// index. Only consulted with two or more candidates; range checking is
/// the caller's job.
pub trait DecisionProvider {
    fn choose(&mut self, table: &str, candidates: &[String]) -> Result<usize, DecisionError>;
}

/// Batch default: always the first candidate. Used where blocking on a
/// console is impossible (WASM) or unwanted (`--batch`).
pub struct FirstCandidate;

impl DecisionProvider for FirstCandidate {
    fn choose(&mut self, _table: &str, _candidates: &[String]) -> Result<usize, DecisionError> {
        Ok(0)
    }
}

/// Deterministic stub: always the same index.
pub struct Fixed(pub usize);

impl DecisionProvider for Fixed {
    fn choose(&mut self, _table: &str, _candidates: &[String]) -> Result<usize, DecisionError> {
        Ok(self.0)
    }
}

/// Numbered prompt on stdout, one line read from stdin. Re-prompts on
/// non-numeric input; a closed stdin aborts the run.
pub struct ConsolePrompt;

fn render_prompt(table: &str, candidates: &[String]) -> String {
    let mut prompt = format!("Which key do you want to use as primary key for {}:\n", table);
    for (i, candidate) in candidates.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i, candidate));
    }
    prompt.push_str(&format!(
        "Your choice (0-{}): ",
        candidates.len().saturating_sub(1)
    ));
    prompt
}

impl DecisionProvider for ConsolePrompt {
    fn choose(&mut self, table: &str, candidates: &[String]) -> Result<usize, DecisionError> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        write!(out, "{}", render_prompt(table, candidates))?;
        out.flush()?;

        let stdin = io::stdin();
        let mut input = stdin.lock();
        loop {
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Err(DecisionError::Closed);
            }
            match line.trim().parse::<usize>() {
                Ok(index) => {
                    if let Some(candidate) = candidates.get(index) {
                        writeln!(out, "Selected {} as primary key for {}", candidate, table)?;
                    }
                    return Ok(index);
                }
                Err(_) => {
                    write!(out, "Not a number, try again: ")?;
                    out.flush()?;
                }
            }
        }
    }
}
