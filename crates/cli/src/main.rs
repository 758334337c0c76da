use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use anyhow::Context;
use clap::Parser;
use env_logger::Env;

mod args;

use args::Args;

fn main() -> anyhow::Result<()> {
    // Skipped-element warnings should show up without RUST_LOG set.
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let input: Box<dyn Read> = match &args.input {
        Some(path) if path.as_os_str() != "-" => Box::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        ),
        _ => Box::new(io::stdin()),
    };
    let output: Box<dyn Write> = match &args.output {
        Some(path) if path.as_os_str() != "-" => Box::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        ),
        _ => Box::new(io::stdout()),
    };

    let source = match &args.input {
        Some(path) if path.as_os_str() != "-" => path.display().to_string(),
        _ => "-".to_string(),
    };

    let mut reader = BufReader::new(input);
    plyraw::convert(&mut reader, &source, BufWriter::new(output))?;
    Ok(())
}
