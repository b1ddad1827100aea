use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;

use vm_translator::{
    driver,
    error::Error,
    log::{self, Level},
    translator::Options,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Translates VM stack code into Hack assembly")]
struct Cli {
    /// VM source file to translate
    input: PathBuf,

    /// Output file (defaults to the input path with an .asm extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Omit the comment line restating each VM command
    #[arg(long)]
    no_comments: bool,

    /// Only report warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log every translated command
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: &Cli) -> Result<()> {
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| driver::output_path(&cli.input));
    let options = Options {
        comments: !cli.no_comments,
    };

    vm_translator::info!("{} -> {}", cli.input.display(), output.display());
    let written = driver::translate_file(&cli.input, &output, options)
        .with_context(|| format!("translation of {} failed", cli.input.display()))?;
    vm_translator::info!("wrote {} lines to {}", written, output.display());

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.quiet {
        log::set_level(Level::Warn);
    } else if cli.verbose {
        log::set_level(Level::Debug);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            vm_translator::error!("{:#}", err);
            let code = err.downcast_ref::<Error>().map_or(1, Error::exit_code);
            ExitCode::from(code)
        }
    }
}
