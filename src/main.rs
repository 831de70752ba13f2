use std::fs;

use clap::Parser;
use lilt::{Compiler, Location, RuntimeError};

/// lilt is an embeddable, statically typed scripting language with a
/// C-like surface.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Treat the input as inline source text instead of a file path.
    #[arg(short, long)]
    eval: bool,

    contents: String,
}

fn main() {
    let args = Args::parse();

    let (path, source) = if args.eval {
        ("<eval>".to_string(), args.contents)
    } else {
        let source = fs::read_to_string(&args.contents).unwrap_or_else(|_| {
            eprintln!("Failed to read the input file '{}'. Perhaps this file does not exist?",
                      &args.contents);
            std::process::exit(1);
        });
        (args.contents, source)
    };

    let mut compiler = Compiler::new();
    bind_standard(&mut compiler);

    let mut program = match compiler.compile(&source) {
        Ok(program) => program,
        Err(error) => {
            eprintln!("{}", error.show(&path, &source));
            std::process::exit(1);
        },
    };

    if let Err(error) = program.run() {
        eprintln!("{}", error.show(&path, &source));
        std::process::exit(1);
    }
}

/// Installs the small set of I/O and assertion functions the CLI offers
/// to scripts.
fn bind_standard(compiler: &mut Compiler) {
    compiler.bind("prints", |s: String| println!("{s}"));
    compiler.bind("printi", |n: i64| println!("{n}"));
    compiler.bind("printf", |x: f32| println!("{x}"));
    compiler.bind("printd", |x: f64| println!("{x}"));
    compiler.bind("printb", |b: bool| println!("{b}"));
    compiler.bind("printc", |c: char| println!("{c}"));
    compiler.bind("assert", |condition: bool| {
                if condition {
                    Ok(())
                } else {
                    Err(RuntimeError::AssertionFailed { location: Location::default(), })
                }
            });
}
