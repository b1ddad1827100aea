use crate::ast::{ArithOp, Command, CommandKind, Segment};
use crate::error::TranslateError;
use crate::parser::MAX_INDEX;

macro_rules! svec {
    ($($x:expr),* $(,)?) => (vec![$($x.to_string()),*]);
}

/// Scratch register used to hold a computed address across a pop.
const SCRATCH: &str = "R13";
const TEMP_BASE: u16 = 5;
const TEMP_SIZE: u16 = 8;

/// Destination for emitted assembly, one line at a time, in order.
pub trait Sink {
    fn line(&mut self, line: String);
}

impl Sink for Vec<String> {
    fn line(&mut self, line: String) {
        self.push(line);
    }
}

/// Adapts a closure into a [`Sink`].
pub struct FnSink<F>(pub F);

impl<F: FnMut(&str)> Sink for FnSink<F> {
    fn line(&mut self, line: String) {
        (self.0)(&line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Precede each command's instructions with a comment restating it.
    pub comments: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options { comments: true }
    }
}

/// Where a push reads from or a pop writes to.
#[derive(Debug, PartialEq, Eq)]
enum Address {
    Literal(u16),
    /// Base pointer register plus offset, resolved at run time.
    Based(&'static str, u16),
    /// A symbol the assembler resolves on its own.
    Direct(String),
}

// Stores D at the top of the stack
fn push_d() -> Vec<String> {
    svec![
        "@SP",
        "M=M+1",
        "A=M-1", // Don't need to refetch SP; this is safe
        "M=D"
    ]
}

// Pops the top of the stack into D
fn pop_d() -> Vec<String> {
    svec!["@SP", "AM=M-1", "D=M"]
}

fn push(address: &Address) -> Vec<String> {
    let mut code = match address {
        Address::Literal(k) => svec![format!("@{}", k), "D=A"],
        Address::Based(base, index) => svec![
            format!("@{}", base),
            "D=M",
            format!("@{}", index),
            "A=D+A", // A = SEG+arg
            "D=M"    // D = value to push
        ],
        Address::Direct(symbol) => svec![format!("@{}", symbol), "D=M"],
    };
    code.extend(push_d());
    code
}

fn pop(address: &Address) -> Result<Vec<String>, TranslateError> {
    let code = match address {
        Address::Literal(_) => return Err(TranslateError::PopConstant),
        Address::Based(base, index) => {
            let mut code = svec![
                format!("@{}", base),
                "D=M",
                format!("@{}", index),
                "D=D+A", // D = SEG+arg
                format!("@{}", SCRATCH),
                "M=D" // Stash the address before D is reused
            ];
            code.extend(pop_d());
            code.extend(svec![
                format!("@{}", SCRATCH),
                "A=M", // At the segment address...
                "M=D"  // ... store the popped val
            ]);
            code
        }
        Address::Direct(symbol) => {
            let mut code = pop_d();
            code.extend(svec![format!("@{}", symbol), "M=D"]);
            code
        }
    };
    Ok(code)
}

fn simple_un_op(comp: &str) -> Vec<String> {
    svec!["@SP", "A=M-1", format!("M={}", comp)]
}

// i.e. no conditions or jumps, just pop and run
fn simple_bin_op(comp: &str) -> Vec<String> {
    svec![
        "@SP",
        "AM=M-1",              // SP--, looking at top of stack now
        "D=M",                 // Right arg in D
        "A=A-1",               // Looking at second arg of stack, will overwrite
        format!("M={}", comp)  // Op and overwrite second element
    ]
}

/// Translates VM commands for one translation unit into Hack assembly.
///
/// Each instance owns its label counter, so labels never repeat within the
/// output of one translator. Static symbols are qualified with the name given
/// at construction.
pub struct Translator<'a, S: Sink> {
    qualifier: &'a str,
    sink: S,
    options: Options,
    gen_sym: usize,
}

impl<'a, S: Sink> Translator<'a, S> {
    pub fn new(qualifier: &'a str, sink: S) -> Self {
        Self::with_options(qualifier, sink, Options::default())
    }

    pub fn with_options(qualifier: &'a str, sink: S, options: Options) -> Self {
        Translator {
            qualifier,
            sink,
            options,
            gen_sym: 0,
        }
    }

    fn next_gen_sym(&mut self) -> usize {
        let tmp = self.gen_sym;
        self.gen_sym += 1;
        tmp
    }

    /// Number of label pairs issued so far.
    pub fn label_count(&self) -> usize {
        self.gen_sym
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn address(&self, segment: Segment, index: u16) -> Result<Address, TranslateError> {
        if index > MAX_INDEX {
            return Err(TranslateError::IndexRange(index));
        }
        let address = match segment {
            Segment::Constant => Address::Literal(index),
            Segment::Local => Address::Based("LCL", index),
            Segment::Argument => Address::Based("ARG", index),
            Segment::This => Address::Based("THIS", index),
            Segment::That => Address::Based("THAT", index),
            Segment::Temp if index < TEMP_SIZE => {
                Address::Direct(format!("R{}", TEMP_BASE + index))
            }
            Segment::Temp => return Err(TranslateError::TempIndex(index)),
            Segment::Pointer => match index {
                0 => Address::Direct("THIS".to_string()),
                1 => Address::Direct("THAT".to_string()),
                _ => return Err(TranslateError::PointerIndex(index)),
            },
            Segment::Static => Address::Direct(format!("{}.{}", self.qualifier, index)),
        };
        Ok(address)
    }

    fn compare(&mut self, jump: &str) -> Vec<String> {
        let sym = self.next_gen_sym();
        let true_sym = format!("{}T", sym);
        let false_sym = format!("{}F", sym);
        svec![
            "@SP",
            "AM=M-1", // SP--, looking at top of stack now
            "D=M",    // Right arg in D
            "A=A-1",  // Looking at second arg of stack, will overwrite
            "D=M-D",
            format!("@{}", true_sym),
            format!("D;{}", jump),
            "D=0",
            format!("@{}", false_sym),
            "0;JMP",
            format!("({})", true_sym),
            "D=-1",
            format!("({})", false_sym),
            "@SP",
            "A=M-1",
            "M=D"
        ]
    }

    fn write(&mut self, header: String, body: Vec<String>) {
        if self.options.comments {
            self.sink.line(format!("// {}", header));
        }
        for line in body {
            self.sink.line(line);
        }
        self.sink.line(String::new());
    }

    pub fn emit_arithmetic(&mut self, op: ArithOp) {
        let body = match op {
            ArithOp::Not => simple_un_op("!M"),
            ArithOp::Neg => simple_un_op("-M"),
            ArithOp::Add => simple_bin_op("D+M"),
            ArithOp::Sub => simple_bin_op("M-D"),
            ArithOp::And => simple_bin_op("D&M"),
            ArithOp::Or => simple_bin_op("D|M"),
            ArithOp::Eq => self.compare("JEQ"),
            ArithOp::Gt => self.compare("JGT"),
            ArithOp::Lt => self.compare("JLT"),
        };
        self.write(op.to_string(), body);
    }

    /// Emits a push or pop. Nothing is written when the command is rejected.
    pub fn emit_push_pop(
        &mut self,
        kind: CommandKind,
        segment: Segment,
        index: u16,
    ) -> Result<(), TranslateError> {
        let command = match kind {
            CommandKind::Push => Command::Push(segment, index),
            CommandKind::Pop => Command::Pop(segment, index),
            CommandKind::None | CommandKind::Arithmetic => {
                return Err(TranslateError::InvalidDispatch(kind))
            }
        };
        let address = self.address(segment, index)?;
        let body = match kind {
            CommandKind::Push => push(&address),
            _ => pop(&address)?,
        };
        self.write(command.to_string(), body);
        Ok(())
    }

    pub fn emit(&mut self, command: &Command) -> Result<(), TranslateError> {
        match *command {
            Command::Arithmetic(op) => {
                self.emit_arithmetic(op);
                Ok(())
            }
            Command::Push(seg, index) => self.emit_push_pop(CommandKind::Push, seg, index),
            Command::Pop(seg, index) => self.emit_push_pop(CommandKind::Pop, seg, index),
        }
    }

    pub fn translate(&mut self, commands: &[Command]) -> Result<(), TranslateError> {
        for command in commands {
            self.emit(command)?;
        }
        Ok(())
    }
}
