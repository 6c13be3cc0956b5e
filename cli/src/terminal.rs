//! Line-oriented front end: command parsing, a `Prompt` over any
//! `BufRead`/`Write` pair, and the interactive list loop.

use std::fmt;
use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};

use animal_core::{ListScreen, ListView, Prompt, Row, RowControl};
use tokio::task::{self, JoinHandle};
use tracing::{debug, warn};

pub const HELP: &str = "a: add   e N: edit row N   d N: delete row N   r: refresh   q: quit";
const PROMPT: &str = "> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    Edit(usize),
    Delete(usize),
    Refresh,
    Redraw,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Command::Redraw);
        };
        let command = match verb {
            "a" | "add" => Command::Add,
            "e" | "edit" => Command::Edit(row_number(verb, words.next())?),
            "d" | "delete" => Command::Delete(row_number(verb, words.next())?),
            "r" | "refresh" => Command::Refresh,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            other => return Err(format!("Unknown command '{other}'. Type h for help.")),
        };
        if let Some(extra) = words.next() {
            return Err(format!("Unexpected '{extra}' after '{verb}'"));
        }
        Ok(command)
    }
}

fn row_number(verb: &str, arg: Option<&str>) -> Result<usize, String> {
    let arg = arg.ok_or_else(|| format!("'{verb}' needs a row number"))?;
    arg.parse()
        .map_err(|_| format!("'{arg}' is not a row number"))
}

/// Reads answers line by line. End of input cancels; an empty answer to a
/// pre-filled question keeps the pre-filled value.
///
/// Input sits behind a mutex so the command loop can wait for the next line
/// on the blocking pool. Dialog answers are read on the calling thread.
pub struct LinePrompt<R, W> {
    input: Arc<Mutex<R>>,
    output: W,
    closed: bool,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Arc::new(Mutex::new(input)),
            output,
            closed: false,
        }
    }

    pub fn read_line(&mut self, label: &str) -> Option<String> {
        self.write(format_args!("{}", label));
        read_from(&self.input)
    }

    pub fn show(&mut self, view: &ListView) {
        self.write(format_args!("{view}"));
    }

    /// Whether writing to the output has failed. Nothing more can be shown.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn write(&mut self, text: fmt::Arguments<'_>) {
        let written = self.output.write_fmt(text).and_then(|()| self.output.flush());
        if let Err(err) = written {
            debug!(error = %err, "writing output failed");
            self.closed = true;
        }
    }
}

impl<R: BufRead + Send + 'static, W: Write> LinePrompt<R, W> {
    /// Print `label`, then read the next line on the blocking pool.
    fn next_line(&mut self, label: &str) -> JoinHandle<Option<String>> {
        self.write(format_args!("{}", label));
        let input = Arc::clone(&self.input);
        task::spawn_blocking(move || read_from(&input))
    }
}

fn read_from<R: BufRead>(input: &Mutex<R>) -> Option<String> {
    let Ok(mut input) = input.lock() else {
        debug!("input reader panicked earlier, treating as end of input");
        return None;
    };
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        Err(err) => {
            debug!(error = %err, "reading input failed");
            None
        }
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn ask(&mut self, label: &str, initial: &str) -> Option<String> {
        if initial.is_empty() {
            return self.read_line(&format!("{label}: "));
        }
        let answer = self.read_line(&format!("{label} [{initial}]: "))?;
        if answer.is_empty() {
            Some(initial.to_string())
        } else {
            Some(answer)
        }
    }

    fn notify(&mut self, message: &str) {
        self.write(format_args!("  {message}\n"));
    }
}

/// Run the list screen until `q`, end of input, or closed output.
///
/// Commands start operations without waiting for them; the list is redrawn
/// whenever the store changes. Leaving aborts whatever is still in flight.
/// Returns how many operations failed.
pub async fn run_interactive<R, W>(screen: &mut ListScreen, prompt: &mut LinePrompt<R, W>) -> usize
where
    R: BufRead + Send + 'static,
    W: Write,
{
    screen.activate();
    let mut shown = Vec::new();
    redraw(screen, prompt, &mut shown, true);

    if !prompt.is_closed() {
        let mut next = prompt.next_line(PROMPT);
        loop {
            tokio::select! {
                line = &mut next => {
                    let Ok(Some(line)) = line else { break };
                    if !dispatch(&line, screen, prompt, &mut shown) {
                        break;
                    }
                    next = prompt.next_line(PROMPT);
                }
                alive = screen.changed() => {
                    if !alive {
                        break;
                    }
                    if redraw(screen, prompt, &mut shown, false) {
                        prompt.write(format_args!("{}", PROMPT));
                    }
                }
            }
            if prompt.is_closed() {
                warn!("output closed, ending session");
                break;
            }
        }
    }

    screen.deactivate();
    screen.settle().await
}

/// Apply one command line. `false` ends the session.
fn dispatch<R: BufRead, W: Write>(
    line: &str,
    screen: &mut ListScreen,
    prompt: &mut LinePrompt<R, W>,
    shown: &mut Vec<Row>,
) -> bool {
    match Command::parse(line) {
        Ok(Command::Quit) => return false,
        Ok(Command::Help) => prompt.notify(HELP),
        Ok(Command::Add) => {
            screen.add(prompt);
        }
        Ok(Command::Edit(number)) => {
            screen.select(number, RowControl::Edit, prompt);
        }
        Ok(Command::Delete(number)) => {
            screen.select(number, RowControl::Delete, prompt);
        }
        Ok(Command::Refresh) => screen.refresh(),
        Ok(Command::Redraw) => {
            redraw(screen, prompt, shown, true);
        }
        Err(message) => prompt.notify(&message),
    }
    true
}

/// Show the latest state unless its rows are already on screen and there is
/// no message. Messages are shown once, then cleared. Returns whether
/// anything was printed.
fn redraw<R: BufRead, W: Write>(
    screen: &mut ListScreen,
    prompt: &mut LinePrompt<R, W>,
    shown: &mut Vec<Row>,
    force: bool,
) -> bool {
    let view = screen.view();
    if !force && view.status.is_none() && view.rows == *shown {
        return false;
    }
    prompt.show(&view);
    if view.status.is_some() {
        screen.store().clear_error();
    }
    *shown = view.rows;
    true
}
