use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Segment {
    Constant,
    Local,
    Static,
    Argument,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub fn name(&self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithOp {
    pub fn name(&self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Neg => "neg",
            ArithOp::Eq => "eq",
            ArithOp::Gt => "gt",
            ArithOp::Lt => "lt",
            ArithOp::And => "and",
            ArithOp::Or => "or",
            ArithOp::Not => "not",
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classification of a source line. `None` is a blank or comment-only line.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CommandKind {
    None,
    Arithmetic,
    Push,
    Pop,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Command {
    // Stack Basics
    Arithmetic(ArithOp),
    Push(Segment, u16),
    Pop(Segment, u16),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Arithmetic(_) => CommandKind::Arithmetic,
            Command::Push(..) => CommandKind::Push,
            Command::Pop(..) => CommandKind::Pop,
        }
    }

    /// Operator name for arithmetic, segment name for push/pop.
    pub fn arg1(&self) -> &'static str {
        match self {
            Command::Arithmetic(op) => op.name(),
            Command::Push(seg, _) | Command::Pop(seg, _) => seg.name(),
        }
    }

    pub fn arg2(&self) -> Option<u16> {
        match self {
            Command::Arithmetic(_) => None,
            Command::Push(_, index) | Command::Pop(_, index) => Some(*index),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Arithmetic(op) => write!(f, "{}", op),
            Command::Push(seg, index) => write!(f, "push {} {}", seg, index),
            Command::Pop(seg, index) => write!(f, "pop {} {}", seg, index),
        }
    }
}
