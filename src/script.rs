//! Line-oriented input for the terminal host.
//!
//! Each line is one event:
//!
//! ```text
//! start | submit | clear | giveup | quit | speak <row> | show <row>
//! mousedown <x> <y> | mousemove <x> <y> | mouseup | mouseleave
//! touchstart <x> <y> [<x> <y>...] | touchmove <x> <y> [...] | touchend
//! ```
//!
//! Coordinates are finite screen coordinates. Blank lines and `#` comments are skipped.

use crate::ink::capture::PointerEvent;
use crate::ink::Point;
use crate::quiz::controller::UserEvent;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ScriptError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("{command} expects {expected}")]
    BadArguments {
        command: String,
        expected: &'static str,
    },
}

/// Parses one script line. `Ok(None)` means the line holds no event.
pub fn parse_line(line: &str) -> Result<Option<UserEvent>, ScriptError> {
    let line = line.split('#').next().unwrap_or("").trim();
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();
    let command = command.to_ascii_lowercase();

    let bad = |expected: &'static str| ScriptError::BadArguments {
        command: command.clone(),
        expected,
    };
    let no_args = |event: UserEvent| {
        if args.is_empty() {
            Ok(Some(event))
        } else {
            Err(bad("no arguments"))
        }
    };

    match command.as_str() {
        "start" => no_args(UserEvent::Start),
        "submit" => no_args(UserEvent::Submit),
        "clear" => no_args(UserEvent::Clear),
        "giveup" => no_args(UserEvent::GiveUp),
        "quit" => no_args(UserEvent::Quit),
        "mouseup" => no_args(UserEvent::Pointer(PointerEvent::MouseUp)),
        "mouseleave" => no_args(UserEvent::Pointer(PointerEvent::MouseLeave)),
        "touchend" => no_args(UserEvent::Pointer(PointerEvent::TouchEnd)),
        "speak" | "show" => {
            let row = match args.as_slice() {
                [row] => row.parse().map_err(|_| bad("a row number"))?,
                _ => return Err(bad("a row number")),
            };
            Ok(Some(if command == "speak" {
                UserEvent::Speak(row)
            } else {
                UserEvent::Show(row)
            }))
        }
        "mousedown" | "mousemove" => {
            let point = match points(&args).as_deref() {
                Some([point]) => *point,
                _ => return Err(bad("<x> <y>")),
            };
            Ok(Some(UserEvent::Pointer(if command == "mousedown" {
                PointerEvent::MouseDown(point)
            } else {
                PointerEvent::MouseMove(point)
            })))
        }
        "touchstart" | "touchmove" => {
            let touches = match points(&args) {
                Some(touches) if !touches.is_empty() => touches,
                _ => return Err(bad("one or more <x> <y> pairs")),
            };
            Ok(Some(UserEvent::Pointer(if command == "touchstart" {
                PointerEvent::TouchStart(touches)
            } else {
                PointerEvent::TouchMove(touches)
            })))
        }
        _ => Err(ScriptError::UnknownCommand(command.clone())),
    }
}

fn points(args: &[&str]) -> Option<Vec<Point>> {
    if args.len() % 2 != 0 {
        return None;
    }
    args.chunks(2)
        .map(|pair| Some(Point::new(coordinate(pair[0])?, coordinate(pair[1])?)))
        .collect()
}

// `f64::from_str` takes "NaN" and "inf", neither of which is a position
fn coordinate(word: &str) -> Option<f64> {
    word.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_and_pointer_events_parse() {
        assert_eq!(parse_line("start"), Ok(Some(UserEvent::Start)));
        assert_eq!(parse_line("  GiveUp "), Ok(Some(UserEvent::GiveUp)));
        assert_eq!(parse_line("speak 4"), Ok(Some(UserEvent::Speak(4))));
        assert_eq!(parse_line("show 10"), Ok(Some(UserEvent::Show(10))));
        assert_eq!(
            parse_line("mousedown 12 30.5"),
            Ok(Some(UserEvent::Pointer(PointerEvent::MouseDown(Point::new(12.0, 30.5)))))
        );
        assert_eq!(
            parse_line("touchmove 1 2 3 4 # two fingers"),
            Ok(Some(UserEvent::Pointer(PointerEvent::TouchMove(vec![
                Point::new(1.0, 2.0),
                Point::new(3.0, 4.0)
            ]))))
        );
    }

    #[test]
    fn blank_lines_and_comments_hold_no_event() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("# draw the first stroke"), Ok(None));
    }

    #[test]
    fn bad_lines_are_rejected() {
        assert_eq!(
            parse_line("paint 1 2"),
            Err(ScriptError::UnknownCommand("paint".to_string()))
        );
        assert!(matches!(parse_line("mousedown 1"), Err(ScriptError::BadArguments { .. })));
        assert!(matches!(parse_line("mousemove a b"), Err(ScriptError::BadArguments { .. })));
        assert!(matches!(parse_line("touchstart"), Err(ScriptError::BadArguments { .. })));
        assert!(matches!(parse_line("submit now"), Err(ScriptError::BadArguments { .. })));
        assert!(matches!(parse_line("speak first"), Err(ScriptError::BadArguments { .. })));
        assert!(matches!(parse_line("show"), Err(ScriptError::BadArguments { .. })));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        assert!(matches!(parse_line("mousemove NaN 1"), Err(ScriptError::BadArguments { .. })));
        assert!(matches!(parse_line("mousedown inf 0"), Err(ScriptError::BadArguments { .. })));
        assert!(matches!(parse_line("mousedown 0 -infinity"), Err(ScriptError::BadArguments { .. })));
        assert!(matches!(parse_line("touchstart 1 2 nan 4"), Err(ScriptError::BadArguments { .. })));
        assert!(matches!(parse_line("mousedown 1e400 0"), Err(ScriptError::BadArguments { .. })));
    }
}
