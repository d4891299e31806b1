#![allow(dead_code)]

use macslang::interpreter::run_with_io;
use macslang::{Error, Limits, Value};

/// Runs `source` with empty stdin and returns everything it printed.
pub fn run(source: &str) -> String {
    run_with_input(source, "")
}

pub fn run_with_input(source: &str, input: &str) -> String {
    let (result, output) = execute(source, input, Limits::default());
    if let Err(e) = result {
        panic!("program failed: {}\n--- output so far ---\n{}", e, output);
    }
    output
}

/// Runs `source` expecting a failure; returns the error and the output
/// printed before it.
pub fn run_err(source: &str) -> (Error, String) {
    run_err_with_limits(source, Limits::default())
}

pub fn run_err_with_limits(source: &str, limits: Limits) -> (Error, String) {
    match execute(source, "", limits) {
        (Err(e), output) => (e, output),
        (Ok(_), output) => panic!("program should have failed, printed:\n{}", output),
    }
}

/// Value of a top-level `return`, if any.
pub fn result_of(source: &str) -> Option<Value> {
    let (result, _) = execute(source, "", Limits::default());
    result.expect("program failed")
}

pub fn execute(source: &str, input: &str, limits: Limits) -> (Result<Option<Value>, Error>, String) {
    let mut output = Vec::new();
    let result = run_with_io(source, input.as_bytes(), &mut output, limits);
    (result, String::from_utf8(output).expect("output is not utf-8"))
}

pub fn lines(output: &str) -> Vec<&str> {
    output.lines().collect()
}
