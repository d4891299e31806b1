mod common;

use common::run_with_input;
use macslang::interpreter::run_with_io;
use macslang::Limits;

#[test]
fn test_input_integer() {
    let source = "var n: int; input(n); print(n * 2);";
    assert_eq!(run_with_input(source, "21\n"), "42\n");
}

#[test]
fn test_input_integers_on_one_line() {
    let source = "var a: int; var b: int; input(a); input(b); print(a + b);";
    assert_eq!(run_with_input(source, "  3   4\n"), "7\n");
}

#[test]
fn test_input_negative_integer() {
    assert_eq!(run_with_input("var n: int = 1; input(n); print(n);", "-15"), "-15\n");
}

#[test]
fn test_input_malformed_integer_is_zero() {
    assert_eq!(run_with_input("var n: int = 9; input(n); print(n);", "abc\n"), "0\n");
}

#[test]
fn test_input_at_eof() {
    let source = "var n: int = 9; var s: string = \"x\"; input(n); input(s); print(n); print(s);";
    assert_eq!(run_with_input(source, ""), "0\n\n");
}

#[test]
fn test_input_bool() {
    let source = "var a: bool; var b: bool = true; input(a); input(b); print(a); print(b);";
    assert_eq!(run_with_input(source, "5 0"), "true\nfalse\n");
}

#[test]
fn test_input_string_line() {
    let source = "var name: string; input(name); print(\"Hello, \" + name + \"!\");";
    assert_eq!(run_with_input(source, "Ada Lovelace\nignored\n"), "Hello, Ada Lovelace!\n");
}

#[test]
fn test_string_after_integer_reads_rest_of_line() {
    let source = "var n: int; var s: string; input(n); input(s); print(\"[\" + s + \"]\"); input(s); print(s);";
    assert_eq!(run_with_input(source, "7\nnext line\n"), "[]\nnext line\n");
}

#[test]
fn test_input_follows_current_value_type() {
    let source = r#"
        func read_into(v: int): int { input(v); return v; }
        print(read_into("s") + "|");
    "#;
    assert_eq!(run_with_input(source, "a line\n"), "a line|\n");
}

#[test]
fn test_interactive_loop() {
    let source = r#"
        var total: int = 0;
        var n: int = 1;
        while (n != 0) {
            input(n);
            total = total + n;
        }
        print(total);
    "#;
    assert_eq!(run_with_input(source, "1 2 3\n4 0\n"), "10\n");
}

#[test]
fn test_input_string_with_invalid_utf8() {
    let source = "var s: string = \"x\"; input(s); print(\"[\" + s + \"]\"); input(s); print(s);";
    let mut output = Vec::new();
    run_with_io(source, &b"\xff\xfe\nnext\n"[..], &mut output, Limits::default()).expect("program failed");
    assert_eq!(String::from_utf8(output).expect("utf-8 output"), "[\u{fffd}\u{fffd}]\nnext\n");
}
