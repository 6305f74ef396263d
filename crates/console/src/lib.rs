//! Command parsing shared by the kiosk console binaries.
//!
//! Both consoles read one line at a time; parsing enforces the shape of
//! a command (argument counts, number formats) and leaves content rules
//! to the client libraries.

use kiosk_comments::query::SortOrder;
use kiosk_imaging::job::Resize;

/// A rejected console line, carrying the message to show the user.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ParseError(pub String);

pub const BOARD_HELP: &str = "\
Commands:
  reload               reload the current page
  next                 go to the next page
  prev                 go to the previous page
  sort asc|desc        change the date sort order
  find [text]          filter comments; no text clears the filter
  add <text>           post a new root comment
  reply <id> <text>    reply to a comment
  rm <id>              delete a comment and all its replies
  help                 show this help
  quit                 exit";

pub const RETOUCH_HELP: &str = "\
Commands:
  send <path> [resize WxH] [mark <text>]
                       upload an image and start processing; either
                       resize side may be left out (800x, x600)
  status               show the current job
  save [path]          write the processed image to disk
  rm                   delete the processed image from the server
  help                 show this help
  quit                 exit";

/// One comment board console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCommand {
    Reload,
    NextPage,
    PrevPage,
    Sort(SortOrder),
    Find(String),
    Add(String),
    Reply { parent: String, text: String },
    Remove(String),
    Help,
    Quit,
}

/// One retouch console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetouchCommand {
    Send {
        path: String,
        resize: Option<Resize>,
        watermark: Option<String>,
    },
    Status,
    Save(Option<String>),
    Remove,
    Help,
    Quit,
}

pub fn parse_board_command(line: &str) -> Result<BoardCommand, ParseError> {
    let (word, rest) = split_word(line.trim());
    match word {
        "" => Err(ParseError("empty line; try 'help'".to_string())),
        "reload" => Ok(BoardCommand::Reload),
        "next" => Ok(BoardCommand::NextPage),
        "prev" => Ok(BoardCommand::PrevPage),
        "sort" => rest
            .parse::<SortOrder>()
            .map(BoardCommand::Sort)
            .map_err(|_| ParseError("usage: sort asc|desc".to_string())),
        "find" => Ok(BoardCommand::Find(rest.to_string())),
        "add" => {
            if rest.is_empty() {
                return Err(ParseError("usage: add <text>".to_string()));
            }
            Ok(BoardCommand::Add(rest.to_string()))
        }
        "reply" => {
            let (parent, text) = split_word(rest);
            if parent.is_empty() || text.is_empty() {
                return Err(ParseError("usage: reply <id> <text>".to_string()));
            }
            Ok(BoardCommand::Reply {
                parent: parent.to_string(),
                text: text.to_string(),
            })
        }
        "rm" => {
            if rest.is_empty() {
                return Err(ParseError("usage: rm <id>".to_string()));
            }
            Ok(BoardCommand::Remove(rest.to_string()))
        }
        "help" => Ok(BoardCommand::Help),
        "quit" | "exit" => Ok(BoardCommand::Quit),
        other => Err(ParseError(format!("unknown command '{other}'; try 'help'"))),
    }
}

pub fn parse_retouch_command(line: &str) -> Result<RetouchCommand, ParseError> {
    let (word, rest) = split_word(line.trim());
    match word {
        "" => Err(ParseError("empty line; try 'help'".to_string())),
        "send" => parse_send(rest),
        "status" => Ok(RetouchCommand::Status),
        "save" => Ok(RetouchCommand::Save(if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        })),
        "rm" => Ok(RetouchCommand::Remove),
        "help" => Ok(RetouchCommand::Help),
        "quit" | "exit" => Ok(RetouchCommand::Quit),
        other => Err(ParseError(format!("unknown command '{other}'; try 'help'"))),
    }
}

/// Grammar: `send <path> [resize WxH] [mark <text>]`. The watermark
/// text runs to the end of the line, so `mark` has to come last.
fn parse_send(args: &str) -> Result<RetouchCommand, ParseError> {
    let (path, mut rest) = split_word(args);
    if path.is_empty() {
        return Err(ParseError(
            "usage: send <path> [resize WxH] [mark <text>]".to_string(),
        ));
    }

    let mut resize = None;
    let mut watermark = None;
    while !rest.is_empty() {
        let (word, tail) = split_word(rest);
        match word {
            "resize" => {
                let (bounds, tail) = split_word(tail);
                resize = Some(parse_dimensions(bounds)?);
                rest = tail;
            }
            "mark" => {
                if tail.is_empty() {
                    return Err(ParseError("mark needs the watermark text".to_string()));
                }
                watermark = Some(tail.to_string());
                rest = "";
            }
            other => {
                return Err(ParseError(format!(
                    "unexpected argument '{other}'; usage: send <path> [resize WxH] [mark <text>]"
                )))
            }
        }
    }

    Ok(RetouchCommand::Send {
        path: path.to_string(),
        resize,
        watermark,
    })
}

/// Parse `WxH` resize bounds. Either side may be left out (`800x`,
/// `x600`); an omitted side is zero, meaning unconstrained.
pub fn parse_dimensions(input: &str) -> Result<Resize, ParseError> {
    let Some((width, height)) = input.split_once(|c| c == 'x' || c == 'X') else {
        return Err(ParseError(format!(
            "resize bounds must look like 800x600, got '{input}'"
        )));
    };
    let width = parse_side("width", width)?;
    let height = parse_side("height", height)?;
    if width == 0 && height == 0 {
        return Err(ParseError(
            "at least one resize side is required".to_string(),
        ));
    }
    Ok(Resize { width, height })
}

fn parse_side(name: &str, input: &str) -> Result<u32, ParseError> {
    if input.is_empty() {
        return Ok(0);
    }
    input
        .parse::<u32>()
        .map_err(|_| ParseError(format!("{name} must be a number, got '{input}'")))
}

/// Whether a confirmation answer counts as yes (`y` / `yes`, any case).
pub fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    )
}

fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

// ---------- Tests ----------
