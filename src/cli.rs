/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::str::FromStr;
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::dispatcher::Dispatcher;
use crate::shared::{DispatchError, ElevatorStatus};

pub const HELP: &str = "\
Commands:
  status <id>              Show one elevator
  list                     Show every elevator
  request <from> <to>      Request an elevator from one floor to another
  offline <id>             Take an elevator out of service
  online <id>              Put an elevator back in service
  help                     Show this text
  quit                     Exit";

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Status(usize),
    List,
    Request { origin: u8, destination: u8 },
    Offline(usize),
    Online(usize),
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a valid number")]
    BadNumber(String),
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Command, ParseError> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(ParseError::Empty)?;

        let command = match name.to_ascii_lowercase().as_str() {
            "status" | "1" => Command::Status(number(words.next(), "elevator id")?),
            "list" | "ls" => Command::List,
            "request" | "2" => Command::Request {
                origin: number(words.next(), "origin floor")?,
                destination: number(words.next(), "destination floor")?,
            },
            "offline" => Command::Offline(number(words.next(), "elevator id")?),
            "online" => Command::Online(number(words.next(), "elevator id")?),
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn number<T: FromStr>(word: Option<&str>, what: &'static str) -> Result<T, ParseError> {
    let word = word.ok_or(ParseError::MissingArgument(what))?;
    word.parse()
        .map_err(|_| ParseError::BadNumber(word.to_string()))
}

/***************************************/
/*             Public API              */
/***************************************/

/// Runs `command` against `dispatcher` and returns the text to show the operator.
pub fn execute(command: Command, dispatcher: &Dispatcher, json: bool) -> Result<String, DispatchError> {
    match command {
        Command::Status(id) => Ok(render(&[dispatcher.get_elevator_status(id)?], json)),
        Command::List => Ok(render(&dispatcher.statuses(), json)),
        Command::Request {
            origin,
            destination,
        } => match dispatcher.submit_request(origin, destination)? {
            Some(elevator) => Ok(format!("Elevator {} is on its way", elevator.id())),
            None => Ok(format!("Already at floor {}", origin)),
        },
        Command::Offline(id) => {
            dispatcher.set_elevator_operating(id, false)?;
            Ok(format!("Elevator {} is out of service", id))
        }
        Command::Online(id) => {
            dispatcher.set_elevator_operating(id, true)?;
            Ok(format!("Elevator {} is back in service", id))
        }
        Command::Help => Ok(HELP.to_string()),
        Command::Quit => Ok(String::new()),
    }
}

fn render(statuses: &[ElevatorStatus], json: bool) -> String {
    statuses
        .iter()
        .map(|status| {
            if json {
                serde_json::to_string(status).unwrap_or_else(|e| e.to_string())
            } else {
                status.to_string()
            }
        })
        .collect::<Vec<String>>()
        .join("\n")
}
