//! File-level translation: one `.vm` input becomes one `.asm` output.

use std::{
    ffi::OsStr,
    fs::{self, File},
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};
use crate::parser::Parser;
use crate::translator::{Options, Translator};

/// `dir/Foo.vm` becomes `dir/Foo.asm`.
pub fn output_path(input: &Path) -> PathBuf {
    input.with_extension("asm")
}

/// Name used to qualify static symbols: the input's file stem.
pub fn static_qualifier(input: &Path) -> Result<&str> {
    input
        .file_stem()
        .and_then(OsStr::to_str)
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| Error::NoQualifier(input.to_path_buf()))
}

/// Runs the parse/emit loop over `reader`, collecting the assembly in memory.
pub fn translate_source<R: BufRead>(
    reader: R,
    qualifier: &str,
    options: Options,
) -> Result<Vec<String>> {
    let mut parser = Parser::new(reader);
    let mut translator = Translator::with_options(qualifier, Vec::new(), options);

    while parser.has_more_commands() {
        parser.advance()?;
        if let Some(command) = parser.command() {
            crate::debug!(
                "line {}: `{}` -> {}",
                parser.line_number(),
                parser.raw_line().trim(),
                command
            );
            translator
                .emit(&command)
                .map_err(|source| Error::Translate {
                    line: parser.line_number(),
                    source,
                })?;
        }
    }

    Ok(translator.into_sink())
}

fn write_lines(path: &Path, lines: &[String]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

/// Translates `input` into `output`, returning the number of lines written.
///
/// The output file is only created once the whole input has translated, and
/// is removed again if writing it fails part way.
pub fn translate_file(input: &Path, output: &Path, options: Options) -> Result<usize> {
    let file = File::open(input).map_err(|_| Error::InputNotFound(input.to_path_buf()))?;
    let qualifier = static_qualifier(input)?;

    let lines = translate_source(BufReader::new(file), qualifier, options)?;

    if let Err(source) = write_lines(output, &lines) {
        if fs::remove_file(output).is_ok() {
            crate::warn!("removed partial output {}", output.display());
        }
        return Err(Error::Write {
            path: output.to_path_buf(),
            source,
        });
    }

    Ok(lines.len())
}
