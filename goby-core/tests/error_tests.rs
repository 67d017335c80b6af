//! 错误与 begin/rescue 测试。
//!
//! 错误按值沿帧栈外抛，最近的补救点截回栈深并接住错误值；
//! 没有补救点时以 "类别: 消息" 的形式报给调用方。

mod common;

use common::{get_int, get_string, run_code, run_error, run_output};

use goby_core::compiler::lexer::tokenize;
use goby_core::compiler::parser::Parser;
use goby_core::runtime::compiler::compile;
use goby_core::{LimitConfig, Vm};

// ===== 错误类别测试 =====

#[test]
fn test_zero_division() {
    assert_eq!(run_error("1 / 0"), "ZeroDivisionError: divided by 0");
    assert_eq!(run_error("10 % 0"), "ZeroDivisionError: divided by 0");
}

#[test]
fn test_type_error() {
    assert_eq!(run_error(r#"1 + "a""#), "TypeError: expected Integer, got String");
    assert_eq!(run_error("1 < nil"), "TypeError: expected Integer, got NilClass");
}

#[test]
fn test_argument_errors_report_arity() {
    let message = run_error(
        r#"
        def one(a)
          a
        end
        one(1, 2)
        "#,
    );
    assert_eq!(message, "ArgumentError: wrong number of arguments (given 2, expected 1)");

    let message = run_error(
        r#"
        def opt(a, b = 1)
          a + b
        end
        opt()
        "#,
    );
    assert_eq!(message, "ArgumentError: wrong number of arguments (given 0, expected 1..2)");

    let message = run_error(
        r#"
        def spread(a, *rest)
          a
        end
        spread()
        "#,
    );
    assert_eq!(message, "ArgumentError: wrong number of arguments (given 0, expected 1+)");
}

#[test]
fn test_undefined_constant() {
    assert_eq!(run_error("Nope"), "UndefinedConstantError: uninitialized constant Nope");
}

#[test]
fn test_stack_overflow_on_runaway_recursion() {
    let message = run_error(
        r#"
        def dig
          dig
        end
        dig
        "#,
    );
    assert_eq!(message, "StackOverflowError: stack level too deep");
}

// ===== rescue 测试 =====

#[test]
fn test_rescue_catches_error() {
    let result = run_code(
        r#"
        begin
          1 / 0
        rescue
          42
        end
        "#,
    )
    .unwrap();
    assert_eq!(get_int(&result), Some(42));
}

#[test]
fn test_rescue_body_skipped_on_success() {
    let output = run_output(
        r#"
        begin
          puts("ok")
        rescue
          puts("rescued")
        end
        "#,
    );
    assert_eq!(output, "ok\n");
}

#[test]
fn test_rescue_binds_error_object() {
    let result = run_code(
        r#"
        begin
          1 / 0
        rescue => e
          e.message
        end
        "#,
    )
    .unwrap();
    assert_eq!(get_string(&result), Some("divided by 0".to_string()));

    let result = run_code(
        r#"
        begin
          [].missing
        rescue => e
          e.error_type
        end
        "#,
    )
    .unwrap();
    assert_eq!(get_string(&result), Some("NoMethodError".to_string()));
}

#[test]
fn test_error_value_inspect() {
    let result = run_code(
        r#"
        begin
          1 / 0
        rescue => e
          e
        end
        "#,
    )
    .unwrap();
    assert_eq!(result.inspect, "#<ZeroDivisionError: divided by 0>");
}

#[test]
fn test_rescue_catches_errors_from_called_methods() {
    let result = run_code(
        r#"
        def risky
          1 / 0
        end

        def wrapper
          risky
        end

        begin
          wrapper
        rescue => e
          e.error_type
        end
        "#,
    )
    .unwrap();
    assert_eq!(get_string(&result), Some("ZeroDivisionError".to_string()));
}

#[test]
fn test_execution_continues_after_rescue() {
    let output = run_output(
        r#"
        begin
          1 / 0
        rescue
          puts("rescued")
        end
        puts("after")
        "#,
    );
    assert_eq!(output, "rescued\nafter\n");
}

#[test]
fn test_error_in_rescue_body_escapes_to_outer_handler() {
    let result = run_code(
        r#"
        begin
          begin
            1 / 0
          rescue
            Missing
          end
        rescue => e
          e.error_type
        end
        "#,
    )
    .unwrap();
    assert_eq!(get_string(&result), Some("UndefinedConstantError".to_string()));
}

#[test]
fn test_inner_rescue_shields_outer_code() {
    let output = run_output(
        r#"
        begin
          begin
            1 / 0
          rescue
            puts("inner")
          end
          puts("outer continues")
        rescue
          puts("outer")
        end
        "#,
    );
    assert_eq!(output, "inner\nouter continues\n");
}

#[test]
fn test_rescue_inside_method() {
    let result = run_code(
        r#"
        def safe_div(a, b)
          begin
            a / b
          rescue
            0
          end
        end
        safe_div(10, 2) + safe_div(1, 0)
        "#,
    )
    .unwrap();
    assert_eq!(get_int(&result), Some(5));
}

#[test]
fn test_locals_survive_rescue() {
    let result = run_code(
        r#"
        kept = 7
        begin
          1 / 0
        rescue
          kept += 1
        end
        kept
        "#,
    )
    .unwrap();
    assert_eq!(get_int(&result), Some(8));
}

// ===== 执行限额测试 =====

#[test]
fn test_recursion_limit_is_configurable() {
    let tokens = tokenize(
        r#"
        def countdown(n)
          countdown(n + 1)
        end
        countdown(0)
        "#,
    )
    .unwrap();
    let program = Parser::new(tokens).parse().unwrap();
    let sequence = compile(&program).unwrap();

    let mut vm = Vm::with_config(LimitConfig {
        max_stack_size: 1024,
        max_recursion_depth: 8,
    });
    let error = vm.run(sequence).unwrap_err();
    assert_eq!(error.class_name, "StackOverflowError");
    assert_eq!(error.message, "stack level too deep");
}
