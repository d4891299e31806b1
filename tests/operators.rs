mod common;

use common::{lines, run, run_err};
use macslang::Error;

#[test]
fn test_arithmetic() {
    let source = "print(7 + 3); print(7 - 10); print(6 * 7); print(7 / 2); print(7 % 3);";
    assert_eq!(lines(&run(source)), vec!["10", "-3", "42", "3", "1"]);
}

#[test]
fn test_no_unary_minus() {
    let (err, output) = run_err("print(1); print(-7);");
    assert_eq!(output, "", "nothing runs when the program does not parse");
    assert!(matches!(err, Error::Parse(_)));
}

#[test]
fn test_negative_results_via_subtraction() {
    assert_eq!(run("print((0 - 7) / 2); print((0 - 7) % 3);"), "-3\n-1\n");
}

#[test]
fn test_division_and_modulo_by_zero() {
    assert_eq!(run("print(10 / 0); print(10 % 0); var z: int = 0; print(5 / z);"), "0\n0\n0\n");
}

#[test]
fn test_left_associativity() {
    assert_eq!(run("print(10 - 3 - 2); print(100 / 10 / 5); print(2 * 3 % 4);"), "5\n2\n2\n");
}

#[test]
fn test_comparison_binds_loosest() {
    assert_eq!(run("print(1 + 2 == 6 - 3); print(2 * 3 < 2 + 3);"), "true\nfalse\n");
}

#[test]
fn test_comparisons() {
    let source = "print(1 < 2); print(2 <= 2); print(3 > 4); print(4 >= 5); print(5 == 5); print(5 != 5);";
    assert_eq!(lines(&run(source)), vec!["true", "true", "false", "false", "true", "false"]);
}

#[test]
fn test_overflow_wraps() {
    assert_eq!(run("print(2147483647 + 1);"), "-2147483648\n");
    assert_eq!(run("print(65536 * 65536);"), "0\n");
}

#[test]
fn test_booleans_read_as_zero_in_arithmetic() {
    assert_eq!(
        lines(&run("print(true + true); print(true * 5); print(true == 1); print(true == false);")),
        vec!["0", "0", "false", "true"]
    );
    assert_eq!(run("print((1 < 2) + 1);"), "1\n");
}

#[test]
fn test_string_concatenation_is_left_to_right() {
    assert_eq!(run("print(1 + 2 + \"x\"); print(\"x\" + 1 + 2);"), "3x\nx12\n");
    assert_eq!(run("print(\"\" + false);"), "false\n");
}

#[test]
fn test_string_comparisons() {
    let source = r#"
        print("abc" == "abc");
        print("abc" != "abd");
        print("apple" < "banana");
        print("b" >= "ab");
        print("10" == 10);
        print("true" == true);
    "#;
    assert_eq!(lines(&run(source)), vec!["true", "true", "true", "true", "true", "true"]);
}

#[test]
fn test_any_operator_with_a_string_concatenates() {
    let source = r#"
        print("a" - 1);
        print(2 * "b");
        print("x" / 0);
        print("m" % true);
    "#;
    assert_eq!(lines(&run(source)), vec!["a1", "2b", "x0", "mtrue"]);
}

#[test]
fn test_assignment_copies_string() {
    let source = r#"
        var b: string = "x";
        var a: string = "";
        a = b;
        a = a + "y";
        print(b);
        print(a);
    "#;
    assert_eq!(lines(&run(source)), vec!["x", "xy"]);
}

#[test]
fn test_escape_in_string_literal() {
    assert_eq!(run(r#"print("one\ntwo");"#), "one\ntwo\n");
    assert_eq!(run(r#"print("back\slash");"#), "back\\slash\n");
}
