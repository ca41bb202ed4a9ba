//! Text commands for interactive front-ends
//!
//! One input line may chain several commands (`a 10 a 20 d 10`). Each
//! command consumes a fixed number of arguments:
//!
//! ```text
//!   0 args   tree status hint preorder inorder postorder undo redo reset
//!            help clear exit
//!   1 arg    a <v>  d <v>  rl <v>  rr <v>
//!   2 args   rotate <kind> <v>   config <setting> <value>
//! ```
//!
//! A line with any malformed command is rejected as a whole.

use std::ops::RangeInclusive;

use thiserror::Error;

use crate::engine::{QueryKind, Request};
use crate::rotation::{ParseRotationKindError, RotationKind};
use crate::tree::Key;
use crate::Mode;

/// Values accepted from the command line
pub const VALUE_RANGE: RangeInclusive<Key> = -99..=999;

/// Help text printed by `help`
pub const HELP: &str = "\
Commands:
  a <value>                 Add a node
  d <value>                 Delete a node
  rl <value>                Left rotation (practice mode)
  rr <value>                Right rotation (practice mode)
  rotate <kind> <value>     Rotation by name: left, right, left-right, right-left
  undo / redo               Step through committed trees
  tree                      Display current tree
  status                    Show configuration and tree status
  hint                      Show the rotation owed (practice mode)
  preorder                  Show preorder traversal
  inorder                   Show inorder traversal
  postorder                 Show postorder traversal
  reset                     Empty the tree
  clear                     Clear screen
  help                      Show this
  exit                      Quit

Multiple commands:
  Chain commands on one line: 'a 10 a 20 d 10'

Configuration:
  config autoshow on|off    Print the tree after every change
  config steps on|off       Show each rotation step in automatic mode
  config mode <mode>        automatic: balance immediately
                            practice: wait for your rotations
";

/// Parsed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Request for the engine
    Engine(Request),
    /// Print help
    Help,
    /// Clear the screen
    Clear,
    /// Leave the session
    Exit,
}

/// Parse failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// First word is not a command
    #[error("invalid command '{0}'; try 'help'")]
    UnknownCommand(String),

    /// Line ended before the command's arguments
    #[error("'{command}' expects {expected}")]
    MissingArgument {
        /// Command word
        command: &'static str,
        /// Usage of the missing part
        expected: &'static str,
    },

    /// Value is not an integer
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    /// Value outside `VALUE_RANGE`
    #[error("value {0} out of range (allowed: -99 to 999)")]
    OutOfRange(Key),

    /// Unknown rotation name
    #[error(transparent)]
    InvalidRotation(#[from] ParseRotationKindError),

    /// Unknown mode name
    #[error("{0}")]
    InvalidMode(String),

    /// Toggle other than on/off
    #[error("use 'on' or 'off', not '{0}'")]
    InvalidToggle(String),

    /// `config` with an unknown setting
    #[error("unknown setting '{0}' (use autoshow, mode or steps)")]
    UnknownSetting(String),
}

/// Parse one line into commands; blank lines yield none
pub fn parse_line(line: &str) -> Result<Vec<Command>, CommandError> {
    let lowered = line.to_ascii_lowercase();
    let mut tokens = lowered.split_whitespace();
    let mut commands = Vec::new();

    while let Some(word) = tokens.next() {
        let command = match word {
            "a" => Command::Engine(Request::Insert(value(&mut tokens, "a")?)),
            "d" => Command::Engine(Request::Delete(value(&mut tokens, "d")?)),
            "rl" => {
                let key = value(&mut tokens, "rl")?;
                Command::Engine(Request::Rotate(RotationKind::Left, key))
            }
            "rr" => {
                let key = value(&mut tokens, "rr")?;
                Command::Engine(Request::Rotate(RotationKind::Right, key))
            }
            "rotate" => {
                let kind = tokens
                    .next()
                    .ok_or(CommandError::MissingArgument {
                        command: "rotate",
                        expected: "<kind> <value>",
                    })?
                    .parse::<RotationKind>()?;
                Command::Engine(Request::Rotate(kind, value(&mut tokens, "rotate")?))
            }
            "config" => Command::Engine(config(&mut tokens)?),
            "undo" => Command::Engine(Request::Undo),
            "redo" => Command::Engine(Request::Redo),
            "reset" => Command::Engine(Request::Reset),
            "tree" => Command::Engine(Request::Query(QueryKind::Tree)),
            "status" => Command::Engine(Request::Query(QueryKind::Status)),
            "hint" => Command::Engine(Request::Query(QueryKind::Hint)),
            "preorder" => Command::Engine(Request::Query(QueryKind::PreOrder)),
            "inorder" => Command::Engine(Request::Query(QueryKind::InOrder)),
            "postorder" => Command::Engine(Request::Query(QueryKind::PostOrder)),
            "help" => Command::Help,
            "clear" => Command::Clear,
            "exit" | "quit" => Command::Exit,
            other => return Err(CommandError::UnknownCommand(other.to_string())),
        };
        commands.push(command);
    }
    Ok(commands)
}

/// Parse a node value and check its range
pub fn parse_value(token: &str) -> Result<Key, CommandError> {
    let value: Key = token
        .parse()
        .map_err(|_| CommandError::InvalidNumber(token.to_string()))?;
    if !VALUE_RANGE.contains(&value) {
        return Err(CommandError::OutOfRange(value));
    }
    Ok(value)
}

fn value<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
) -> Result<Key, CommandError> {
    let token = tokens.next().ok_or(CommandError::MissingArgument {
        command,
        expected: "a value",
    })?;
    parse_value(token)
}

fn config<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<Request, CommandError> {
    let missing = CommandError::MissingArgument {
        command: "config",
        expected: "<setting> <value>",
    };
    let setting = tokens.next().ok_or(missing.clone())?;
    let value = tokens.next().ok_or(missing)?;
    match setting {
        "mode" => value
            .parse::<Mode>()
            .map(Request::SetMode)
            .map_err(CommandError::InvalidMode),
        "steps" => toggle(value).map(Request::SetSteps),
        "autoshow" => toggle(value).map(Request::SetAutoShow),
        other => Err(CommandError::UnknownSetting(other.to_string())),
    }
}

fn toggle(token: &str) -> Result<bool, CommandError> {
    match token {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        other => Err(CommandError::InvalidToggle(other.to_string())),
    }
}
