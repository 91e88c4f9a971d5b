//! streammark CLI - replay a Markdown file through the incremental parser
//!
//! Usage: streammark [--chunk N] [--engine fast|conservative] [--html] [FILE|-]

use std::io::{self, Read, Write};
use std::process::ExitCode;

use streammark::{Config, Parser, engine_named};

struct Args {
    chunk: usize,
    engine: String,
    html: bool,
    path: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        chunk: 16,
        engine: "fast".to_string(),
        html: false,
        path: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--chunk" => {
                let value = iter.next().ok_or("--chunk needs a value")?;
                args.chunk = value
                    .parse()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| format!("invalid chunk size: {value}"))?;
            }
            "--engine" => args.engine = iter.next().ok_or("--engine needs a value")?,
            "--html" => args.html = true,
            "-" => args.path = None,
            other if other.starts_with("--") => return Err(format!("unknown flag: {other}")),
            other => args.path = Some(other.to_string()),
        }
    }
    Ok(args)
}

/// Split `text` into pieces of about `size` bytes on char boundaries.
fn chunks(text: &str, size: usize) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let mut end = size.min(rest.len());
        while !rest.is_char_boundary(end) {
            end += 1;
        }
        let (head, tail) = rest.split_at(end);
        rest = tail;
        Some(head)
    })
}

fn run(args: Args) -> Result<(), String> {
    let input = match &args.path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("stdin: {e}"))?;
            buf
        }
    };
    let engine = engine_named(&args.engine).ok_or_else(|| format!("unknown engine: {}", args.engine))?;

    let mut parser = Parser::new(Config::gfm()).with_engine(engine);
    let mut stderr = io::stderr().lock();
    for chunk in chunks(&input, args.chunk) {
        let update = parser.append(chunk).map_err(|e| e.to_string())?;
        for block in &update.completed {
            let _ = writeln!(stderr, "completed {} {}", block.id, block.node.type_name());
        }
    }
    let update = parser.finalize();
    for block in &update.completed {
        let _ = writeln!(stderr, "completed {} {}", block.id, block.node.type_name());
    }

    let out = if args.html {
        parser.to_html()
    } else {
        parser.resolved_ast().to_string()
    };
    io::stdout()
        .write_all(out.as_bytes())
        .map_err(|e| format!("stdout: {e}"))
}

fn main() -> ExitCode {
    env_logger::init();
    match parse_args().and_then(run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("streammark: {message}");
            ExitCode::FAILURE
        }
    }
}
