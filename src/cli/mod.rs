//! CLI module - interactive prompts

use crate::resolver::{ResolveError, StateChooser};
use std::io::{self, BufRead, Write};

/// Print a prompt and read one trimmed line from stdin.
pub fn prompt(text: &str) -> io::Result<String> {
    print!("{text}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Interactive chooser backed by stdin, shown only when a county name
/// matches several states.
pub struct StdinChooser;

impl StateChooser for StdinChooser {
    fn choose(&mut self, county: &str, states: &[String]) -> Result<usize, ResolveError> {
        println!("Multiple states found for the county '{county}'. Choose a state:");
        for (i, state) in states.iter().enumerate() {
            println!("{}. {state}", i + 1);
        }

        let answer = prompt("\nEnter the number corresponding to the desired state: ")
            .map_err(|_| ResolveError::InvalidChoice)?;
        println!();

        answer.parse::<usize>().map_err(|_| ResolveError::InvalidChoice)
    }
}
