//! Array、Hash、Range 内建方法测试。
//!
//! 数组就地改动，哈希键只能是字符串且按键排序输出，
//! 区间是闭区间的整数对。

mod common;

use common::{get_bool, get_int, get_string, run_code, run_error};

// ===== 数组字面量 测试 =====

#[test]
fn test_array_literal() {
    let result = run_code(r#"[1, "two", nil, true]"#).unwrap();
    assert_eq!(result.inspect, r#"[1, "two", nil, true]"#);
}

#[test]
fn test_empty_array() {
    let result = run_code("[].length").unwrap();
    assert_eq!(get_int(&result), Some(0));

    let result = run_code("[].empty").unwrap();
    assert_eq!(get_bool(&result), Some(true));

    let result = run_code("[]").unwrap();
    assert_eq!(result.inspect, "[]");
}

#[test]
fn test_nested_array_literal() {
    let result = run_code("[[1, 2], [3]]").unwrap();
    assert_eq!(result.inspect, "[[1, 2], [3]]");
}

// ===== 数组下标 测试 =====

#[test]
fn test_array_index_read() {
    let result = run_code("a = [10, 20, 30]\na[0]").unwrap();
    assert_eq!(get_int(&result), Some(10));

    let result = run_code("a = [10, 20, 30]\na[-1]").unwrap();
    assert_eq!(get_int(&result), Some(30));
}

#[test]
fn test_array_index_out_of_range_is_nil() {
    let result = run_code("[1, 2][5]").unwrap();
    assert_eq!(result.inspect, "nil");

    let result = run_code("[1, 2][-3]").unwrap();
    assert_eq!(result.inspect, "nil");
}

#[test]
fn test_array_index_requires_integer() {
    let message = run_error(r#"[1, 2]["0"]"#);
    assert_eq!(message, "TypeError: expected Integer, got String");
}

#[test]
fn test_array_index_set() {
    let result = run_code("a = [1, 2, 3]\na[1] = 99\na").unwrap();
    assert_eq!(result.inspect, "[1, 99, 3]");

    // 赋值表达式的值是右值。
    let result = run_code("a = [1]\na[0] = 42").unwrap();
    assert_eq!(get_int(&result), Some(42));
}

#[test]
fn test_array_index_set_extends_with_nil() {
    let result = run_code("a = [1]\na[3] = 4\na").unwrap();
    assert_eq!(result.inspect, "[1, nil, nil, 4]");
}

#[test]
fn test_array_index_set_negative_out_of_range() {
    let message = run_error(r#"a = [1, 2]
a[-5] = 0"#);
    assert_eq!(message, "ArgumentError: index -5 out of range");
}

// ===== 数组修改 测试 =====

#[test]
fn test_push_returns_self() {
    let result = run_code("[1].push(2).push(3)").unwrap();
    assert_eq!(result.inspect, "[1, 2, 3]");

    let result = run_code("a = [1]\na.push(2, 3)\na.length").unwrap();
    assert_eq!(get_int(&result), Some(3));
}

#[test]
fn test_append_operator() {
    let result = run_code(r#"a = []
a << 1
a << "x"
a"#).unwrap();
    assert_eq!(result.inspect, r#"[1, "x"]"#);
}

#[test]
fn test_pop() {
    let result = run_code("a = [1, 2, 3]\na.pop").unwrap();
    assert_eq!(get_int(&result), Some(3));

    let result = run_code("a = [1, 2, 3]\na.pop\na.length").unwrap();
    assert_eq!(get_int(&result), Some(2));

    let result = run_code("[].pop").unwrap();
    assert_eq!(result.inspect, "nil");
}

#[test]
fn test_shift_and_unshift() {
    let result = run_code("a = [1, 2, 3]\na.shift").unwrap();
    assert_eq!(get_int(&result), Some(1));

    let result = run_code("[].shift").unwrap();
    assert_eq!(result.inspect, "nil");

    let result = run_code("a = [3, 4]\na.unshift(1, 2)\na").unwrap();
    assert_eq!(result.inspect, "[1, 2, 3, 4]");
}

#[test]
fn test_first_and_last() {
    let result = run_code("[1, 2, 3].first").unwrap();
    assert_eq!(get_int(&result), Some(1));

    let result = run_code("[1, 2, 3].last").unwrap();
    assert_eq!(get_int(&result), Some(3));

    let result = run_code("[].first").unwrap();
    assert_eq!(result.inspect, "nil");

    let result = run_code("[].last").unwrap();
    assert_eq!(result.inspect, "nil");
}

// ===== 数组查询 测试 =====

#[test]
fn test_array_include_compares_by_value() {
    let result = run_code("[[1, 2], 3].include([1, 2])").unwrap();
    assert_eq!(get_bool(&result), Some(true));

    let result = run_code(r#"[1, 2].include("1")"#).unwrap();
    assert_eq!(get_bool(&result), Some(false));
}

#[test]
fn test_array_reverse_returns_new_array() {
    let result = run_code("a = [1, 2, 3]\nb = a.reverse\na[0] + b[0]").unwrap();
    assert_eq!(get_int(&result), Some(4));
}

#[test]
fn test_array_concatenation() {
    let result = run_code("[1] + [2, 3]").unwrap();
    assert_eq!(result.inspect, "[1, 2, 3]");

    let message = run_error("[1] + 1");
    assert_eq!(message, "TypeError: expected Array, got Integer");
}

#[test]
fn test_array_equality_is_deep() {
    let result = run_code(r#"[1, [2, "x"]] == [1, [2, "x"]]"#).unwrap();
    assert_eq!(get_bool(&result), Some(true));

    let result = run_code("[1] == [1, 2]").unwrap();
    assert_eq!(get_bool(&result), Some(false));

    let result = run_code("[1] == 1").unwrap();
    assert_eq!(get_bool(&result), Some(false));
}

#[test]
fn test_array_to_s() {
    let result = run_code(r#"[1, "a"].to_s"#).unwrap();
    assert_eq!(get_string(&result), Some(r#"[1, "a"]"#.to_string()));
}

// ===== 数组迭代 测试 =====

#[test]
fn test_each_visits_in_order() {
    let result = run_code(
        r#"
        sum = 0
        [1, 2, 3, 4].each do |x|
          sum += x
        end
        sum
        "#,
    )
    .unwrap();
    assert_eq!(get_int(&result), Some(10));
}

#[test]
fn test_each_returns_receiver() {
    let result = run_code("([5, 6].each do |x| x end).length").unwrap();
    assert_eq!(get_int(&result), Some(2));
}

#[test]
fn test_map_collects_block_results() {
    let result = run_code("[1, 2, 3].map do |x| x * 10 end").unwrap();
    assert_eq!(result.inspect, "[10, 20, 30]");
}

#[test]
fn test_each_without_block() {
    let message = run_error("[1].each");
    assert_eq!(message, "InternalError: no block given");
}

// ===== 哈希字面量 测试 =====

#[test]
fn test_hash_literal() {
    let result = run_code(r#"{ name: "Goby", age: 5 }"#).unwrap();
    assert_eq!(result.inspect, r#"{ age: 5, name: "Goby" }"#);
}

#[test]
fn test_empty_hash() {
    let result = run_code("{}").unwrap();
    assert_eq!(result.inspect, "{}");

    let result = run_code("{}.length").unwrap();
    assert_eq!(get_int(&result), Some(0));

    let result = run_code("{}.empty").unwrap();
    assert_eq!(get_bool(&result), Some(true));
}

#[test]
fn test_hash_literal_with_quoted_key() {
    let result = run_code(r#"h = { "with space": 1 }
h["with space"]"#).unwrap();
    assert_eq!(get_int(&result), Some(1));
}

// ===== 哈希读写 测试 =====

#[test]
fn test_hash_index_read() {
    let result = run_code(r#"h = { name: "Goby" }
h["name"]"#).unwrap();
    assert_eq!(get_string(&result), Some("Goby".to_string()));

    let result = run_code(r#"{ a: 1 }["missing"]"#).unwrap();
    assert_eq!(result.inspect, "nil");
}

#[test]
fn test_hash_index_set() {
    let result = run_code(r#"h = {}
h["k"] = 7"#).unwrap();
    assert_eq!(get_int(&result), Some(7));

    let result = run_code(r#"h = { a: 1 }
h["a"] = 2
h["a"]"#).unwrap();
    assert_eq!(get_int(&result), Some(2));
}

#[test]
fn test_hash_key_must_be_string() {
    let message = run_error("{}[1]");
    assert_eq!(message, "TypeError: expected String, got Integer");

    let message = run_error(r#"h = {}
h[1] = 2"#);
    assert_eq!(message, "TypeError: expected String, got Integer");
}

#[test]
fn test_has_key() {
    let result = run_code(r#"{ a: 1 }.has_key("a")"#).unwrap();
    assert_eq!(get_bool(&result), Some(true));

    let result = run_code(r#"{ a: 1 }.has_key("b")"#).unwrap();
    assert_eq!(get_bool(&result), Some(false));
}

#[test]
fn test_hash_delete() {
    let result = run_code(r#"h = { a: 1, b: 2 }
h.delete("a")"#).unwrap();
    assert_eq!(get_int(&result), Some(1));

    let result = run_code(r#"h = { a: 1 }
h.delete("a")
h.has_key("a")"#).unwrap();
    assert_eq!(get_bool(&result), Some(false));

    let result = run_code(r#"{}.delete("a")"#).unwrap();
    assert_eq!(result.inspect, "nil");
}

#[test]
fn test_keys_and_values_are_sorted() {
    let result = run_code("{ b: 2, a: 1, c: 3 }.keys").unwrap();
    assert_eq!(result.inspect, r#"["a", "b", "c"]"#);

    let result = run_code("{ b: 2, a: 1, c: 3 }.values").unwrap();
    assert_eq!(result.inspect, "[1, 2, 3]");
}

#[test]
fn test_hash_equality_ignores_insertion_order() {
    let result = run_code("{ a: 1, b: 2 } == { b: 2, a: 1 }").unwrap();
    assert_eq!(get_bool(&result), Some(true));

    let result = run_code("{ a: 1 } == { a: 2 }").unwrap();
    assert_eq!(get_bool(&result), Some(false));

    let result = run_code("{ a: 1 } == { a: 1, b: 2 }").unwrap();
    assert_eq!(get_bool(&result), Some(false));
}

#[test]
fn test_hash_to_s() {
    let result = run_code("{ b: 2, a: 1 }.to_s").unwrap();
    assert_eq!(get_string(&result), Some("{ a: 1, b: 2 }".to_string()));
}

// ===== 区间 测试 =====

#[test]
fn test_range_literal() {
    let result = run_code("1..5").unwrap();
    assert_eq!(result.inspect, "(1..5)");

    let result = run_code("-3..3").unwrap();
    assert_eq!(result.inspect, "(-3..3)");
}

#[test]
fn test_range_bounds() {
    let result = run_code("(2..8).first").unwrap();
    assert_eq!(get_int(&result), Some(2));

    let result = run_code("(2..8).last").unwrap();
    assert_eq!(get_int(&result), Some(8));
}

#[test]
fn test_range_size() {
    let result = run_code("(1..5).size").unwrap();
    assert_eq!(get_int(&result), Some(5));

    let result = run_code("(3..3).size").unwrap();
    assert_eq!(get_int(&result), Some(1));

    // 起点大于终点的区间为空。
    let result = run_code("(5..1).size").unwrap();
    assert_eq!(get_int(&result), Some(0));
}

#[test]
fn test_range_to_a() {
    let result = run_code("(1..3).to_a").unwrap();
    assert_eq!(result.inspect, "[1, 2, 3]");

    let result = run_code("(3..1).to_a").unwrap();
    assert_eq!(result.inspect, "[]");
}

#[test]
fn test_range_each_and_map() {
    let result = run_code(
        r#"
        sum = 0
        (1..10).each do |i|
          sum += i
        end
        sum
        "#,
    )
    .unwrap();
    assert_eq!(get_int(&result), Some(55));

    let result = run_code("(1..3).map do |i| i * i end").unwrap();
    assert_eq!(result.inspect, "[1, 4, 9]");
}

#[test]
fn test_range_include() {
    let result = run_code("(1..5).include(3)").unwrap();
    assert_eq!(get_bool(&result), Some(true));

    let result = run_code("(1..5).include(6)").unwrap();
    assert_eq!(get_bool(&result), Some(false));

    // 非整数一律不在区间里。
    let result = run_code(r#"(1..5).include("3")"#).unwrap();
    assert_eq!(get_bool(&result), Some(false));
}

#[test]
fn test_range_equality() {
    let result = run_code("(1..3) == (1..3)").unwrap();
    assert_eq!(get_bool(&result), Some(true));

    let result = run_code("(1..3) == (1..4)").unwrap();
    assert_eq!(get_bool(&result), Some(false));
}

#[test]
fn test_range_bounds_must_be_integers() {
    let message = run_error(r#""a".."z""#);
    assert_eq!(message, "TypeError: expected Integer, got String");
}

#[test]
fn test_range_as_index_argument() {
    let result = run_code(r#"bounds = 1..3
"abcdef"[bounds]"#).unwrap();
    assert_eq!(get_string(&result), Some("bcd".to_string()));
}
