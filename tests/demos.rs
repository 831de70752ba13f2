use std::{cell::RefCell, fs, rc::Rc};

use lilt::{Compiler, Location, RuntimeError};
use walkdir::WalkDir;

/// Runs every demo script with the standard CLI bindings, printing into
/// a buffer instead of stdout. A failing `assert` inside a script fails
/// the test.
#[test]
fn demo_scripts_run_cleanly() {
    let mut count = 0;

    for entry in
        WalkDir::new("demos").into_iter()
                             .filter_map(Result::ok)
                             .filter(|e| e.path().extension().is_some_and(|ext| ext == "lilt"))
    {
        let path = entry.path();
        let source =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        count += 1;
        let output = Rc::new(RefCell::new(String::new()));

        let mut compiler = Compiler::new();
        bind_standard(&mut compiler, &output);

        let mut program = match compiler.compile(&source) {
            Ok(program) => program,
            Err(e) => panic!("Demo {path:?} failed to compile:\n{}",
                             e.show(&path.display().to_string(), &source)),
        };

        if let Err(e) = program.run() {
            panic!("Demo {path:?} failed:\n{}",
                   e.show(&path.display().to_string(), &source));
        }
    }

    assert!(count > 0, "No demo scripts found in demos/");
}

/// The same function set the CLI binary installs, with prints going to a
/// shared buffer so the test stays quiet.
fn bind_standard(compiler: &mut Compiler, output: &Rc<RefCell<String>>) {
    let sink = Rc::clone(output);
    compiler.bind("prints", move |s: String| {
                let mut buffer = sink.borrow_mut();
                buffer.push_str(&s);
                buffer.push('\n');
            });

    let sink = Rc::clone(output);
    compiler.bind("printi", move |n: i64| {
                sink.borrow_mut().push_str(&format!("{n}\n"));
            });

    let sink = Rc::clone(output);
    compiler.bind("printf", move |x: f32| {
                sink.borrow_mut().push_str(&format!("{x}\n"));
            });

    let sink = Rc::clone(output);
    compiler.bind("printd", move |x: f64| {
                sink.borrow_mut().push_str(&format!("{x}\n"));
            });

    let sink = Rc::clone(output);
    compiler.bind("printb", move |b: bool| {
                sink.borrow_mut().push_str(&format!("{b}\n"));
            });

    let sink = Rc::clone(output);
    compiler.bind("printc", move |c: char| {
                sink.borrow_mut().push_str(&format!("{c}\n"));
            });

    compiler.bind("assert", |condition: bool| {
                if condition {
                    Ok(())
                } else {
                    Err(RuntimeError::AssertionFailed { location: Location::default(), })
                }
            });
}
