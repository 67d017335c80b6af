//! VM 执行测试
//!
//! 端到端测试：编译并执行 Goby 代码

mod common;
use common::{get_bool, get_int, get_string, run_code, run_output};

// ===== 基础运算测试 =====

#[test]
fn test_basic_arithmetic() {
    // 加法
    let result = run_code("1 + 2").unwrap();
    assert_eq!(get_int(&result), Some(3));

    // 减法
    let result = run_code("10 - 3").unwrap();
    assert_eq!(get_int(&result), Some(7));

    // 乘法
    let result = run_code("4 * 5").unwrap();
    assert_eq!(get_int(&result), Some(20));

    // 整数除法向零截断
    let result = run_code("20 / 4").unwrap();
    assert_eq!(get_int(&result), Some(5));
    let result = run_code("7 / 2").unwrap();
    assert_eq!(get_int(&result), Some(3));

    // 取余
    let result = run_code("10 % 3").unwrap();
    assert_eq!(get_int(&result), Some(1));
}

#[test]
fn test_operator_precedence() {
    // 先乘除后加减
    let result = run_code("2 + 3 * 4").unwrap();
    assert_eq!(get_int(&result), Some(14));

    // 括号改变优先级
    let result = run_code("(2 + 3) * 4").unwrap();
    assert_eq!(get_int(&result), Some(20));

    // 比较的优先级低于算术
    let result = run_code("1 + 2 == 3").unwrap();
    assert_eq!(get_bool(&result), Some(true));
}

#[test]
fn test_unary_operators() {
    let result = run_code("-5").unwrap();
    assert_eq!(get_int(&result), Some(-5));

    let result = run_code("a = 5\n-a").unwrap();
    assert_eq!(get_int(&result), Some(-5));

    let result = run_code("!true").unwrap();
    assert_eq!(get_bool(&result), Some(false));

    let result = run_code("!nil").unwrap();
    assert_eq!(get_bool(&result), Some(true));
}

#[test]
fn test_comparison_operators() {
    assert_eq!(get_bool(&run_code("3 < 5").unwrap()), Some(true));
    assert_eq!(get_bool(&run_code("5 <= 5").unwrap()), Some(true));
    assert_eq!(get_bool(&run_code("3 > 5").unwrap()), Some(false));
    assert_eq!(get_bool(&run_code("5 >= 6").unwrap()), Some(false));
    assert_eq!(get_int(&run_code("3 <=> 5").unwrap()), Some(-1));
    assert_eq!(get_int(&run_code("5 <=> 5").unwrap()), Some(0));
    assert_eq!(get_int(&run_code("7 <=> 5").unwrap()), Some(1));
}

#[test]
fn test_equality_across_types() {
    assert_eq!(get_bool(&run_code("1 == \"1\"").unwrap()), Some(false));
    assert_eq!(get_bool(&run_code("nil == false").unwrap()), Some(false));
    assert_eq!(get_bool(&run_code("nil == nil").unwrap()), Some(true));
    assert_eq!(get_bool(&run_code("1 != 2").unwrap()), Some(true));
}

// ===== 变量测试 =====

#[test]
fn test_variable_declaration() {
    let result = run_code("x = 42\nx").unwrap();
    assert_eq!(get_int(&result), Some(42));
}

#[test]
fn test_variable_reassignment() {
    let result = run_code("x = 10\nx = 20\nx").unwrap();
    assert_eq!(get_int(&result), Some(20));
}

#[test]
fn test_assignment_is_an_expression() {
    let result = run_code("a = b = 7\na + b").unwrap();
    assert_eq!(get_int(&result), Some(14));
}

#[test]
fn test_constants() {
    let result = run_code("TOTAL = 100\nTOTAL / 4").unwrap();
    assert_eq!(get_int(&result), Some(25));
}

#[test]
fn test_compound_assignment() {
    let result = run_code("x = 10\nx += 5\nx -= 3\nx *= 2\nx").unwrap();
    assert_eq!(get_int(&result), Some(24));
}

// ===== 逻辑运算测试 =====

#[test]
fn test_logical_and_short_circuits() {
    // 右侧不求值：求值就会除零
    let result = run_code("false && 1 / 0").unwrap();
    assert_eq!(get_bool(&result), Some(false));

    let result = run_code("true && 42").unwrap();
    assert_eq!(get_int(&result), Some(42));
}

#[test]
fn test_logical_or_short_circuits() {
    let result = run_code("true || 1 / 0").unwrap();
    assert_eq!(get_bool(&result), Some(true));

    let result = run_code("nil || \"fallback\"").unwrap();
    assert_eq!(get_string(&result), Some("fallback".to_string()));
}

// ===== 条件测试 =====

#[test]
fn test_if_statement() {
    let result = run_code("x = 5\nif x > 3\n  1\nelse\n  0\nend").unwrap();
    assert_eq!(get_int(&result), Some(1));
}

#[test]
fn test_if_without_else_yields_nil() {
    let result = run_code("if false\n  1\nend").unwrap();
    assert!(result.value.is_nil());
}

#[test]
fn test_elsif_chain() {
    let source = r#"
def grade(score)
  if score >= 90
    "A"
  elsif score >= 80
    "B"
  elsif score >= 70
    "C"
  else
    "F"
  end
end
grade(85)
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_string(&result), Some("B".to_string()));
}

#[test]
fn test_truthiness() {
    // 0 和空串都是真，只有 nil 与 false 为假
    assert_eq!(get_int(&run_code("if 0\n  1\nelse\n  2\nend").unwrap()), Some(1));
    assert_eq!(get_int(&run_code("if \"\"\n  1\nelse\n  2\nend").unwrap()), Some(1));
    assert_eq!(get_int(&run_code("if nil\n  1\nelse\n  2\nend").unwrap()), Some(2));
}

// ===== 循环测试 =====

#[test]
fn test_while_loop() {
    let source = r#"
sum = 0
i = 1
while i <= 10 do
  sum = sum + i
  i = i + 1
end
sum
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_int(&result), Some(55));
}

#[test]
fn test_while_loop_without_do() {
    let source = r#"
i = 0
while i < 3
  i = i + 1
end
i
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_int(&result), Some(3));
}

// ===== 方法定义测试 =====

#[test]
fn test_method_definition_and_call() {
    let source = r#"
def add(a, b)
  a + b
end
add(3, 4)
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_int(&result), Some(7));
}

#[test]
fn test_method_without_parens() {
    let source = r#"
def greeting
  "hello"
end
greeting
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_string(&result), Some("hello".to_string()));
}

#[test]
fn test_method_implicit_return_is_last_expression() {
    let source = r#"
def pick(flag)
  if flag
    "yes"
  else
    "no"
  end
end
pick(false)
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_string(&result), Some("no".to_string()));
}

#[test]
fn test_explicit_return() {
    let source = r#"
def early(n)
  if n > 10
    return "big"
  end
  "small"
end
early(11)
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_string(&result), Some("big".to_string()));
}

#[test]
fn test_return_without_value_is_nil() {
    let source = r#"
def nothing
  return
end
nothing
"#;
    let result = run_code(source).unwrap();
    assert!(result.value.is_nil());
}

#[test]
fn test_optional_parameters() {
    let source = r#"
def greet(name, greeting = "Hello")
  greeting + ", " + name
end
greet("Goby")
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_string(&result), Some("Hello, Goby".to_string()));

    let source = r#"
def greet(name, greeting = "Hello")
  greeting + ", " + name
end
greet("Goby", "Hi")
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_string(&result), Some("Hi, Goby".to_string()));
}

#[test]
fn test_default_value_may_reference_earlier_param() {
    let source = r#"
def double_or(a, b = a)
  a + b
end
double_or(5)
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_int(&result), Some(10));
}

#[test]
fn test_splat_parameter_collects_rest() {
    let source = r#"
def tally(first, *rest)
  first + rest.length
end
tally(10, 1, 2, 3)
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_int(&result), Some(13));
}

#[test]
fn test_splat_parameter_may_be_empty() {
    let source = r#"
def count_rest(*rest)
  rest.length
end
count_rest
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_int(&result), Some(0));
}

#[test]
fn test_recursion() {
    let source = r#"
def fib(n)
  if n < 2
    n
  else
    fib(n - 1) + fib(n - 2)
  end
end
fib(10)
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_int(&result), Some(55));
}

#[test]
fn test_method_redefinition_wins() {
    let source = r#"
def speak
  "old"
end
def speak
  "new"
end
speak
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_string(&result), Some("new".to_string()));
}

// ===== 块测试 =====

#[test]
fn test_yield_passes_values() {
    let source = r#"
def twice
  yield(1) + yield(2)
end
twice do |n|
  n * 10
end
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_int(&result), Some(30));
}

#[test]
fn test_block_captures_outer_local_by_reference() {
    let source = r#"
total = 0
[1, 2, 3].each do |n|
  total = total + n
end
total
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_int(&result), Some(6));
}

#[test]
fn test_block_sees_defining_self() {
    let source = r#"
class Counter
  def initialize
    @count = 0
  end

  def bump_each(items)
    items.each do |n|
      @count = @count + n
    end
    @count
  end
end
Counter.new.bump_each([5, 6])
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_int(&result), Some(11));
}

#[test]
fn test_block_given() {
    let source = r#"
def ask
  if block_given
    yield
  else
    "no block"
  end
end
ask
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_string(&result), Some("no block".to_string()));

    let source = r#"
def ask
  if block_given
    yield
  else
    "no block"
  end
end
ask do
  "got one"
end
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_string(&result), Some("got one".to_string()));
}

#[test]
fn test_block_extra_args_are_ignored_and_missing_are_nil() {
    let source = r#"
def feed
  yield(1)
end
feed do |a, b|
  if b == nil
    "missing"
  else
    "present"
  end
end
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_string(&result), Some("missing".to_string()));
}

// ===== 输出测试 =====

#[test]
fn test_puts_writes_display_form() {
    assert_eq!(run_output("puts(123)"), "123\n");
    assert_eq!(run_output("puts(\"hi\")"), "hi\n");
    assert_eq!(run_output("puts(true)"), "true\n");
    // nil 的显示形式是空串
    assert_eq!(run_output("puts(nil)"), "\n");
    // 无参数输出空行
    assert_eq!(run_output("puts"), "\n");
}

#[test]
fn test_puts_multiple_arguments() {
    assert_eq!(run_output("puts(1, 2, 3)"), "1\n2\n3\n");
}

#[test]
fn test_print_has_no_newline() {
    assert_eq!(run_output("print(\"a\")\nprint(\"b\")"), "ab");
}

#[test]
fn test_puts_array_uses_inspect_form() {
    assert_eq!(run_output("puts([1, \"two\", nil])"), "[1, \"two\", nil]\n");
}

// ===== 注释与琐碎语法 =====

#[test]
fn test_comments_are_skipped() {
    let source = r#"
# leading comment
x = 1 # trailing comment
# another
x + 1
"#;
    let result = run_code(source).unwrap();
    assert_eq!(get_int(&result), Some(2));
}

#[test]
fn test_semicolons_separate_statements() {
    let result = run_code("a = 1; b = 2; a + b").unwrap();
    assert_eq!(get_int(&result), Some(3));
}

#[test]
fn test_empty_program_is_nil() {
    let result = run_code("").unwrap();
    assert!(result.value.is_nil());
}

#[test]
fn test_single_quoted_strings_are_raw() {
    let result = run_code(r#"'a\nb'"#).unwrap();
    assert_eq!(get_string(&result), Some("a\\nb".to_string()));

    let result = run_code(r#""a\nb""#).unwrap();
    assert_eq!(get_string(&result), Some("a\nb".to_string()));
}

// ===== 整数方法测试 =====

#[test]
fn test_integer_times() {
    let result = run_code(
        r#"
        sum = 0
        4.times do |i|
          sum += i
        end
        sum
        "#,
    )
    .unwrap();
    assert_eq!(get_int(&result), Some(6));

    // 非正数不迭代，返回接收者。
    let result = run_code("0.times do |i| i end").unwrap();
    assert_eq!(get_int(&result), Some(0));
}

#[test]
fn test_integer_predicates() {
    let result = run_code("4.even").unwrap();
    assert_eq!(get_bool(&result), Some(true));

    let result = run_code("4.odd").unwrap();
    assert_eq!(get_bool(&result), Some(false));

    let result = run_code("(-3).odd").unwrap();
    assert_eq!(get_bool(&result), Some(true));
}

#[test]
fn test_integer_next_pred_abs() {
    let result = run_code("7.next").unwrap();
    assert_eq!(get_int(&result), Some(8));

    let result = run_code("7.pred").unwrap();
    assert_eq!(get_int(&result), Some(6));

    let result = run_code("(-7).abs").unwrap();
    assert_eq!(get_int(&result), Some(7));
}

#[test]
fn test_integer_conversions() {
    let result = run_code("42.to_s").unwrap();
    assert_eq!(get_string(&result), Some("42".to_string()));

    let result = run_code("42.to_i").unwrap();
    assert_eq!(get_int(&result), Some(42));
}

// ===== 剖析计数 =====

#[test]
fn test_instruction_count_grows_with_work() {
    use goby_core::compiler::lexer::tokenize;
    use goby_core::compiler::parser::Parser;
    use goby_core::runtime::compiler::compile;
    use goby_core::runtime::vm::Vm;

    let run = |source: &str| {
        let tokens = tokenize(source).unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        let sequence = compile(&program).unwrap();
        let mut vm = Vm::new();
        vm.run(sequence).unwrap();
        vm.instructions_executed()
    };

    let small = run("1");
    let large = run("i = 0\nwhile i < 100 do\n  i = i + 1\nend");
    assert!(small > 0);
    assert!(large > small);
}
