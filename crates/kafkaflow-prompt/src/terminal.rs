//! Console seam for prompts
//!
//! Strategies only talk to a [`Terminal`]. [`StdTerminal`] is the process
//! console; [`ScriptedTerminal`] replays queued answers and records what was
//! printed, which is how the interactive paths are tested.

use crate::error::{PromptError, Result};
use crate::interactive;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;

pub trait Terminal {
    fn is_interactive(&self) -> bool;

    /// Prints one full line
    fn print(&mut self, line: &str);

    /// Prints an inline prompt and flushes
    fn prompt(&mut self, text: &str) -> Result<()>;

    /// Next input line without its line ending. End of input is
    /// [`PromptError::InputClosed`], an interrupt is [`PromptError::Cancelled`].
    fn read_line(&mut self) -> Result<String>;

    /// Like [`read_line`](Self::read_line) without echoing the input
    fn read_secret(&mut self) -> Result<String>;
}

/// Process stdin/stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdTerminal;

impl StdTerminal {
    pub fn new() -> Self {
        Self
    }
}

impl Terminal for StdTerminal {
    fn is_interactive(&self) -> bool {
        interactive::is_interactive()
    }

    fn print(&mut self, line: &str) {
        println!("{}", line);
    }

    fn prompt(&mut self, text: &str) -> Result<()> {
        print!("{}", text);
        io::stdout().flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => Err(PromptError::InputClosed),
            Ok(_) => Ok(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(PromptError::Cancelled),
            Err(e) => Err(e.into()),
        }
    }

    fn read_secret(&mut self) -> Result<String> {
        let guard = RawMode::enable()?;
        let secret = read_masked();
        drop(guard);
        println!();
        secret
    }
}

/// Raw mode for the lifetime of the guard
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

// raw mode swallows SIGINT, so Ctrl+C arrives here as a key event
fn read_masked() -> Result<String> {
    let mut secret = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => return Ok(secret),
            KeyCode::Char('c') if ctrl => return Err(PromptError::Cancelled),
            KeyCode::Char('d') if ctrl && secret.is_empty() => {
                return Err(PromptError::InputClosed);
            }
            KeyCode::Backspace => {
                secret.pop();
            }
            KeyCode::Char(c) if !ctrl => secret.push(c),
            _ => {}
        }
    }
}

/// Scripted console: `Some(line)` answers a read, `None` simulates Ctrl+C.
///
/// Clones share the same script and transcript, so a test can keep one
/// handle while the prompt layer owns another.
#[derive(Debug, Clone)]
pub struct ScriptedTerminal {
    interactive: bool,
    state: Rc<RefCell<Script>>,
}

#[derive(Debug, Default)]
struct Script {
    inputs: VecDeque<Option<String>>,
    output: Vec<String>,
}

impl ScriptedTerminal {
    pub fn interactive<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terminal = Self {
            interactive: true,
            state: Rc::new(RefCell::new(Script::default())),
        };
        for input in inputs {
            terminal.push_line(input);
        }
        terminal
    }

    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            state: Rc::new(RefCell::new(Script::default())),
        }
    }

    pub fn push_line(&self, line: impl Into<String>) {
        self.state.borrow_mut().inputs.push_back(Some(line.into()));
    }

    pub fn push_interrupt(&self) {
        self.state.borrow_mut().inputs.push_back(None);
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.state.borrow().inputs.len()
    }

    /// Everything printed so far, prompts included
    pub fn output(&self) -> Vec<String> {
        self.state.borrow().output.clone()
    }

    pub fn transcript(&self) -> String {
        self.output().join("\n")
    }

    pub fn assert_printed(&self, substring: &str) {
        let output = self.output();
        assert!(
            output.iter().any(|line| line.contains(substring)),
            "Expected output containing '{}', but got: {:?}",
            substring,
            output
        );
    }

    fn next_input(&mut self) -> Result<String> {
        match self.state.borrow_mut().inputs.pop_front() {
            Some(Some(line)) => Ok(line),
            Some(None) => Err(PromptError::Cancelled),
            None => Err(PromptError::InputClosed),
        }
    }
}

impl Terminal for ScriptedTerminal {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn print(&mut self, line: &str) {
        self.state.borrow_mut().output.push(line.to_string());
    }

    fn prompt(&mut self, text: &str) -> Result<()> {
        self.state.borrow_mut().output.push(text.to_string());
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        self.next_input()
    }

    fn read_secret(&mut self) -> Result<String> {
        self.next_input()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_replays_in_order() {
        let mut terminal = ScriptedTerminal::interactive(["one", "two"]);
        assert_eq!(terminal.read_line().unwrap(), "one");
        assert_eq!(terminal.read_secret().unwrap(), "two");
        assert!(matches!(terminal.read_line(), Err(PromptError::InputClosed)));
    }

    #[test]
    fn test_scripted_interrupt_is_cancel() {
        let mut terminal = ScriptedTerminal::interactive(Vec::<String>::new());
        terminal.push_interrupt();
        assert!(matches!(terminal.read_line(), Err(PromptError::Cancelled)));
    }

    #[test]
    fn test_clones_share_transcript() {
        let terminal = ScriptedTerminal::non_interactive();
        let mut owned = terminal.clone();
        owned.print("hello");
        owned.prompt("name: ").unwrap();

        assert!(!terminal.is_interactive());
        assert_eq!(terminal.output(), ["hello", "name: "]);
        terminal.assert_printed("name");
    }
}
