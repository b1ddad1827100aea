use std::{
    io::{self, BufRead},
    iter::Peekable,
};

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::digit1,
    combinator::{all_consuming, map_res, value, verify},
    IResult,
};

use crate::ast::{ArithOp, Command, CommandKind, Segment};
use crate::error::ParseError;

const COMMENT: &str = "//";

/// Largest value a Hack A-instruction can load.
pub const MAX_INDEX: u16 = 0x7fff;

fn integer(input: &str) -> IResult<&str, u16> {
    verify(map_res(digit1, |c: &str| c.parse::<u16>()), |n: &u16| *n <= MAX_INDEX)(input)
}

#[test]
fn test_integer() {
    assert_eq!(integer("32767"), Ok(("", 32767)));
    assert!(integer("32768").is_err());
    assert!(integer("65536").is_err());
    assert!(integer("-1").is_err());
}

fn segment(input: &str) -> IResult<&str, Segment> {
    alt((
        value(Segment::Constant, tag("constant")),
        value(Segment::Local, tag("local")),
        value(Segment::Static, tag("static")),
        value(Segment::Argument, tag("argument")),
        value(Segment::This, tag("this")),
        value(Segment::That, tag("that")),
        value(Segment::Pointer, tag("pointer")),
        value(Segment::Temp, tag("temp")),
    ))(input)
}

#[test]
fn test_segment() {
    assert_eq!(segment("pointer"), Ok(("", Segment::Pointer)));
    assert_eq!(segment("that"), Ok(("", Segment::That)));
    assert!(all_consuming(segment)("thisish").is_err());
}

fn prim(input: &str) -> IResult<&str, ArithOp> {
    alt((
        value(ArithOp::Add, tag("add")),
        value(ArithOp::Sub, tag("sub")),
        value(ArithOp::Neg, tag("neg")),
        value(ArithOp::Eq, tag("eq")),
        value(ArithOp::Gt, tag("gt")),
        value(ArithOp::Lt, tag("lt")),
        value(ArithOp::And, tag("and")),
        value(ArithOp::Or, tag("or")),
        value(ArithOp::Not, tag("not")),
    ))(input)
}

#[test]
fn test_prim() {
    assert_eq!(prim("neg"), Ok(("", ArithOp::Neg)));
    assert!(all_consuming(prim)("addx").is_err());
}

/// Strips the comment, lowercases and splits on whitespace.
fn clean_line(raw: &str) -> Vec<String> {
    let code = raw.split_once(COMMENT).map(|(s, _)| s).unwrap_or(raw);
    code.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn stack_command(line: usize, op: &str, args: &[String]) -> Result<(Segment, u16), ParseError> {
    let seg_token = args.first().ok_or_else(|| ParseError::MissingArgument {
        line,
        command: op.to_string(),
        what: "segment",
    })?;
    let (_, seg) =
        all_consuming(segment)(seg_token.as_str()).map_err(|_| ParseError::UnknownSegment {
            line,
            segment: seg_token.clone(),
        })?;

    let index_token = args.get(1).ok_or_else(|| ParseError::MissingArgument {
        line,
        command: format!("{} {}", op, seg),
        what: "index",
    })?;
    let (_, index) =
        all_consuming(integer)(index_token.as_str()).map_err(|_| ParseError::BadIndex {
            line,
            segment: seg.to_string(),
            index: index_token.clone(),
        })?;

    if args.len() > 2 {
        return Err(ParseError::TrailingInput {
            line,
            rest: args[2..].join(" "),
        });
    }

    Ok((seg, index))
}

/// Classifies one raw source line. `Ok(None)` means the line holds no command.
pub fn parse_line(raw: &str, line: usize) -> Result<Option<Command>, ParseError> {
    let tokens = clean_line(raw);
    let Some((first, rest)) = tokens.split_first() else {
        return Ok(None);
    };

    if let Ok((_, op)) = all_consuming(prim)(first.as_str()) {
        if !rest.is_empty() {
            return Err(ParseError::TrailingInput {
                line,
                rest: rest.join(" "),
            });
        }
        return Ok(Some(Command::Arithmetic(op)));
    }

    let command = match first.as_str() {
        "push" => {
            let (seg, index) = stack_command(line, first, rest)?;
            Command::Push(seg, index)
        }
        "pop" => {
            let (seg, index) = stack_command(line, first, rest)?;
            Command::Pop(seg, index)
        }
        _ => {
            return Err(ParseError::UnknownCommand {
                line,
                token: first.clone(),
            })
        }
    };

    Ok(Some(command))
}

/// Streams commands out of a line source, one line per `advance`.
pub struct Parser<R: BufRead> {
    lines: Peekable<io::Lines<R>>,
    line_number: usize,
    raw_line: String,
    current: Option<Command>,
}

impl<R: BufRead> Parser<R> {
    pub fn new(reader: R) -> Self {
        Parser {
            lines: reader.lines().peekable(),
            line_number: 0,
            raw_line: String::new(),
            current: None,
        }
    }

    pub fn has_more_commands(&mut self) -> bool {
        self.lines.peek().is_some()
    }

    /// Reads the next line and replaces the current command. The current
    /// command is cleared even when the line fails to parse.
    pub fn advance(&mut self) -> Result<(), ParseError> {
        let next = self.lines.next().ok_or(ParseError::Exhausted {
            line: self.line_number,
        })?;
        self.line_number += 1;
        self.current = None;

        let line = self.line_number;
        self.raw_line = next.map_err(|source| ParseError::Io { line, source })?;
        self.current = parse_line(&self.raw_line, line)?;
        Ok(())
    }

    pub fn command(&self) -> Option<Command> {
        self.current
    }

    pub fn command_type(&self) -> CommandKind {
        self.current.map_or(CommandKind::None, |c| c.kind())
    }

    pub fn arg1(&self) -> Option<&'static str> {
        self.current.map(|c| c.arg1())
    }

    pub fn arg2(&self) -> Option<u16> {
        self.current.and_then(|c| c.arg2())
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }
}

/// Parses a whole source text, skipping blank and comment lines.
pub fn parse(input: &str) -> Result<Vec<Command>, ParseError> {
    let mut parser = Parser::new(input.as_bytes());
    let mut commands = vec![];

    while parser.has_more_commands() {
        parser.advance()?;
        if let Some(command) = parser.command() {
            commands.push(command);
        }
    }

    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ArithOp::*, Command::*, Segment::*};

    #[test]
    fn blank_and_comment_lines_are_none() {
        for line in ["", "   ", "\t", "// push constant 1", "   // note"] {
            assert_eq!(parse_line(line, 1).unwrap(), None, "{:?}", line);
        }
    }

    #[test]
    fn canonicalizes_case_and_whitespace() {
        assert_eq!(
            parse_line("  PUSH\tConstant   17 // seventeen", 1).unwrap(),
            Some(Push(Constant, 17))
        );
        assert_eq!(parse_line("Add//x", 1).unwrap(), Some(Arithmetic(Add)));
    }

    #[test]
    fn pop_keeps_segment_and_index() {
        assert_eq!(parse_line("pop that 5", 1).unwrap(), Some(Pop(That, 5)));
    }

    #[test]
    fn unknown_first_token() {
        let err = parse_line("label LOOP", 4).unwrap_err();
        assert!(matches!(err, ParseError::UnknownCommand { line: 4, ref token } if token == "label"));
    }

    #[test]
    fn unknown_segment() {
        let err = parse_line("push heap 1", 2).unwrap_err();
        assert!(matches!(err, ParseError::UnknownSegment { ref segment, .. } if segment == "heap"));
    }

    #[test]
    fn bad_or_missing_index() {
        assert!(matches!(
            parse_line("push local x", 1),
            Err(ParseError::BadIndex { ref index, .. }) if index == "x"
        ));
        assert!(matches!(
            parse_line("push constant 40000", 1),
            Err(ParseError::BadIndex { ref index, .. }) if index == "40000"
        ));
        assert!(matches!(
            parse_line("push local 65535", 1),
            Err(ParseError::BadIndex { .. })
        ));
        assert!(matches!(
            parse_line("pop local -1", 1),
            Err(ParseError::BadIndex { .. })
        ));
        assert!(matches!(
            parse_line("push local", 1),
            Err(ParseError::MissingArgument { what: "index", .. })
        ));
        assert!(matches!(
            parse_line("pop", 1),
            Err(ParseError::MissingArgument { what: "segment", .. })
        ));
    }

    #[test]
    fn trailing_tokens_rejected() {
        assert!(matches!(
            parse_line("add 1", 1),
            Err(ParseError::TrailingInput { .. })
        ));
        assert!(matches!(
            parse_line("push constant 1 2", 1),
            Err(ParseError::TrailingInput { ref rest, .. }) if rest == "2"
        ));
    }

    #[test]
    fn parser_tracks_current_command() {
        let mut parser = Parser::new("// header\npush argument 2\n\nlt\n".as_bytes());

        parser.advance().unwrap();
        assert_eq!(parser.command_type(), CommandKind::None);
        assert_eq!(parser.arg1(), None);

        parser.advance().unwrap();
        assert_eq!(parser.command_type(), CommandKind::Push);
        assert_eq!(parser.arg1(), Some("argument"));
        assert_eq!(parser.arg2(), Some(2));
        assert_eq!(parser.line_number(), 2);

        parser.advance().unwrap();
        assert_eq!(parser.command(), None);

        parser.advance().unwrap();
        assert_eq!(parser.command(), Some(Arithmetic(Lt)));
        assert_eq!(parser.arg2(), None);
        assert!(!parser.has_more_commands());
    }

    #[test]
    fn advance_past_end_is_an_error() {
        let mut parser = Parser::new("add".as_bytes());
        parser.advance().unwrap();
        assert!(!parser.has_more_commands());
        assert!(matches!(
            parser.advance(),
            Err(ParseError::Exhausted { line: 1 })
        ));
    }

    #[test]
    fn failed_line_clears_current_command() {
        let mut parser = Parser::new("neg\nfrobnicate\n".as_bytes());
        parser.advance().unwrap();
        assert_eq!(parser.command(), Some(Arithmetic(Neg)));
        assert!(parser.advance().is_err());
        assert_eq!(parser.command(), None);
    }

    #[test]
    fn parse_collects_commands() {
        let program = "push constant 7\npush constant 8\nadd // sum\n";
        assert_eq!(
            parse(program).unwrap(),
            vec![Push(Constant, 7), Push(Constant, 8), Arithmetic(Add)]
        );
    }

    #[test]
    fn parse_reports_line_of_failure() {
        let err = parse("add\n\npush nowhere 1\n").unwrap_err();
        assert_eq!(err.line(), 3);
    }
}
