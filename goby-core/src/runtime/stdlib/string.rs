//! String 类的内建方法。
//!
//! 所有下标都按码点计，负下标自动加上长度。字符串没有变更方法，
//! 连 `[]=` 也返回新串。

use std::rc::Rc;

use crate::runtime::object::{ArrayObject, BlockId, ErrorObject, Heap, RString, Value};
use crate::runtime::vm::{values_equal, Vm};

use super::{define_native, expect_argc, expect_argc_range, int_arg, str_arg, CoreClasses};

pub(super) fn install(heap: &mut Heap, core: &CoreClasses) {
    define_native(heap, core.string, "[]", string_index);
    define_native(heap, core.string, "[]=", string_index_set);
    define_native(heap, core.string, "count", string_length);
    define_native(heap, core.string, "size", string_length);
    define_native(heap, core.string, "length", string_length);
    define_native(heap, core.string, "+", string_add);
    define_native(heap, core.string, "concat", string_add);
    define_native(heap, core.string, "*", string_mul);
    define_native(heap, core.string, "==", string_eq);
    define_native(heap, core.string, "!=", string_neq);
    define_native(heap, core.string, "<", string_lt);
    define_native(heap, core.string, ">", string_gt);
    define_native(heap, core.string, "<=>", string_cmp);
    define_native(heap, core.string, "slice", string_slice);
    define_native(heap, core.string, "capitalize", string_capitalize);
    define_native(heap, core.string, "upcase", string_upcase);
    define_native(heap, core.string, "downcase", string_downcase);
    define_native(heap, core.string, "reverse", string_reverse);
    define_native(heap, core.string, "strip", string_strip);
    define_native(heap, core.string, "chop", string_chop);
    define_native(heap, core.string, "ljust", string_ljust);
    define_native(heap, core.string, "rjust", string_rjust);
    define_native(heap, core.string, "split", string_split);
    define_native(heap, core.string, "replace", string_replace);
    define_native(heap, core.string, "insert", string_insert);
    define_native(heap, core.string, "delete", string_delete);
    define_native(heap, core.string, "empty", string_empty);
    define_native(heap, core.string, "eql", string_eql);
    define_native(heap, core.string, "start_with", string_start_with);
    define_native(heap, core.string, "end_with", string_end_with);
    define_native(heap, core.string, "to_i", string_to_i);
    define_native(heap, core.string, "to_a", string_to_a);
    define_native(heap, core.string, "to_s", string_to_s);
    define_native(heap, core.string, "include", string_include);
}

fn receiver_str(receiver: &Value) -> Result<Rc<RString>, ErrorObject> {
    str_arg(receiver)
}

/// 读下标：负值加长度，仍越界则 None。
fn resolve_read_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let resolved = if index < 0 { index + len } else { index };
    if resolved < 0 || resolved >= len {
        None
    } else {
        Some(resolved as usize)
    }
}

fn char_value(c: char) -> Value {
    Value::from_rstring(RString::from_chars(vec![c]))
}

/// s[i] -> String | nil，s[a..b] 等价于 slice。
fn string_index(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let s = receiver_str(&receiver)?;
    match &args[0] {
        Value::Integer(i) => Ok(index_read(&s, *i)),
        Value::Range { start, end } => Ok(slice_range(&s, *start, *end)),
        other => Err(ErrorObject::type_mismatch("Integer", other.type_name())),
    }
}

fn index_read(s: &RString, index: i64) -> Value {
    match resolve_read_index(index, s.len()) {
        Some(at) => match s.char_at(at) {
            Some(c) => char_value(c),
            None => Value::Nil,
        },
        None => Value::Nil,
    }
}

/// s[i] = v -> String，替换一个码点为子串 v 的新串；
/// i == 长度时追加，越界是 ArgumentError。
fn string_index_set(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 2)?;
    let s = receiver_str(&receiver)?;
    let index = int_arg(&args[0])?;
    let replacement = str_arg(&args[1])?;

    let len = s.len() as i64;
    let resolved = if index < 0 { index + len } else { index };
    if resolved < 0 || resolved > len {
        return Err(ErrorObject::argument_error(format!("index {} out of range", index)));
    }
    let at = resolved as usize;
    let mut chars = Vec::with_capacity(s.len() + replacement.len());
    chars.extend_from_slice(&s.chars()[..at]);
    chars.extend_from_slice(replacement.chars());
    if at < s.len() {
        chars.extend_from_slice(&s.chars()[at + 1..]);
    }
    Ok(Value::from_rstring(RString::from_chars(chars)))
}

fn string_length(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::Integer(receiver_str(&receiver)?.len() as i64))
}

fn string_add(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let left = receiver_str(&receiver)?;
    let right = str_arg(&args[0])?;
    let mut chars = Vec::with_capacity(left.len() + right.len());
    chars.extend_from_slice(left.chars());
    chars.extend_from_slice(right.chars());
    Ok(Value::from_rstring(RString::from_chars(chars)))
}

/// s * n -> String，n 为 0 得空串，负数是 ArgumentError。
fn string_mul(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let s = receiver_str(&receiver)?;
    let n = int_arg(&args[0])?;
    if n < 0 {
        return Err(ErrorObject::argument_error("negative argument"));
    }
    let mut chars = Vec::with_capacity(s.len().saturating_mul(n as usize));
    for _ in 0..n {
        chars.extend_from_slice(s.chars());
    }
    Ok(Value::from_rstring(RString::from_chars(chars)))
}

fn string_eq(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    Ok(Value::Boolean(values_equal(vm, &receiver, &args[0])))
}

fn string_neq(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    Ok(Value::Boolean(!values_equal(vm, &receiver, &args[0])))
}

fn string_lt(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let left = receiver_str(&receiver)?;
    let right = str_arg(&args[0])?;
    Ok(Value::Boolean(left < right))
}

fn string_gt(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let left = receiver_str(&receiver)?;
    let right = str_arg(&args[0])?;
    Ok(Value::Boolean(left > right))
}

/// <=> -> -1 | 0 | 1，按码点字典序。
fn string_cmp(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let left = receiver_str(&receiver)?;
    let right = str_arg(&args[0])?;
    Ok(Value::Integer(match left.cmp(&right) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }))
}

/// slice(i) 等价于 s[i]；slice(a..b) 是闭区间切片。
fn string_slice(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let s = receiver_str(&receiver)?;
    match &args[0] {
        Value::Integer(i) => Ok(index_read(&s, *i)),
        Value::Range { start, end } => Ok(slice_range(&s, *start, *end)),
        other => Err(ErrorObject::type_mismatch("Integer or Range", other.type_name())),
    }
}

/// 闭区间切片。两端负值各加一次长度；起点仍越界得 nil，
/// 终点越过末尾截到末尾，起点大于终点得空串。
fn slice_range(s: &RString, start: i64, end: i64) -> Value {
    let len = s.len() as i64;
    let mut start = start;
    if start < 0 {
        start += len;
        if start < 0 {
            return Value::Nil;
        }
    }
    if start > len {
        return Value::Nil;
    }
    let mut end = end;
    if end < 0 {
        end += len;
    }
    if end >= len {
        end = len - 1;
    }
    if start > end {
        return Value::from_rstring(RString::from_chars(Vec::new()));
    }
    let chars = s.chars()[start as usize..=end as usize].to_vec();
    Value::from_rstring(RString::from_chars(chars))
}

/// 首码点大写，其余一律小写。
fn string_capitalize(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let s = receiver_str(&receiver)?;
    let mut chars = Vec::with_capacity(s.len());
    for (i, c) in s.chars().iter().enumerate() {
        if i == 0 {
            chars.extend(c.to_uppercase());
        } else {
            chars.extend(c.to_lowercase());
        }
    }
    Ok(Value::from_rstring(RString::from_chars(chars)))
}

fn string_upcase(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let s = receiver_str(&receiver)?;
    let chars = s.chars().iter().flat_map(|c| c.to_uppercase()).collect();
    Ok(Value::from_rstring(RString::from_chars(chars)))
}

fn string_downcase(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let s = receiver_str(&receiver)?;
    let chars = s.chars().iter().flat_map(|c| c.to_lowercase()).collect();
    Ok(Value::from_rstring(RString::from_chars(chars)))
}

fn string_reverse(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let s = receiver_str(&receiver)?;
    let chars = s.chars().iter().rev().copied().collect();
    Ok(Value::from_rstring(RString::from_chars(chars)))
}

fn is_strippable(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\r' | '\t')
}

fn string_strip(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let s = receiver_str(&receiver)?;
    let chars = s.chars();
    let begin = chars.iter().position(|c| !is_strippable(*c));
    match begin {
        Some(begin) => {
            let end = chars.iter().rposition(|c| !is_strippable(*c)).unwrap_or(begin);
            Ok(Value::from_rstring(RString::from_chars(chars[begin..=end].to_vec())))
        }
        None => Ok(Value::from_rstring(RString::from_chars(Vec::new()))),
    }
}

fn string_chop(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let s = receiver_str(&receiver)?;
    if s.is_empty() {
        return Ok(receiver);
    }
    let chars = s.chars()[..s.len() - 1].to_vec();
    Ok(Value::from_rstring(RString::from_chars(chars)))
}

/// ljust(n) / ljust(n, pad) -> String，pad 循环补齐到宽度 n，
/// n 不超过长度时原样返回。
fn string_ljust(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    let (s, padding) = justify_operands(&receiver, args)?;
    match padding {
        Some(padding) => {
            let mut chars = s.chars().to_vec();
            chars.extend(padding);
            Ok(Value::from_rstring(RString::from_chars(chars)))
        }
        None => Ok(receiver),
    }
}

fn string_rjust(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    let (s, padding) = justify_operands(&receiver, args)?;
    match padding {
        Some(mut chars) => {
            chars.extend_from_slice(s.chars());
            Ok(Value::from_rstring(RString::from_chars(chars)))
        }
        None => Ok(receiver),
    }
}

/// 算出补齐用的码点序列；不需要补齐时返回 None。
fn justify_operands(
    receiver: &Value,
    args: &[Value],
) -> Result<(Rc<RString>, Option<Vec<char>>), ErrorObject> {
    expect_argc_range(args, 1, 2)?;
    let s = receiver_str(receiver)?;
    let width = int_arg(&args[0])?;
    let pad = match args.get(1) {
        Some(value) => str_arg(value)?,
        None => Rc::new(RString::new(" ")),
    };
    if width <= s.len() as i64 || pad.is_empty() {
        return Ok((s, None));
    }
    let fill = width as usize - s.len();
    let padding: Vec<char> = pad.chars().iter().copied().cycle().take(fill).collect();
    Ok((s, Some(padding)))
}

/// split(sep) -> Array，保留空段；sep 为空串时逐码点拆分。
fn string_split(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let s = receiver_str(&receiver)?;
    let sep = str_arg(&args[0])?;

    let mut parts: Vec<Value> = Vec::new();
    if sep.is_empty() {
        for c in s.chars() {
            parts.push(char_value(*c));
        }
    } else {
        let mut from = 0;
        while let Some(at) = s.find(&sep, from) {
            let chars = s.chars()[from..at].to_vec();
            parts.push(Value::from_rstring(RString::from_chars(chars)));
            from = at + sep.len();
        }
        let chars = s.chars()[from..].to_vec();
        parts.push(Value::from_rstring(RString::from_chars(chars)));
    }
    let id = vm.heap.alloc_array(ArrayObject { elements: parts });
    Ok(Value::Array(id))
}

/// replace(other) -> String，整串替换。
fn string_replace(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    receiver_str(&receiver)?;
    let replacement = str_arg(&args[0])?;
    Ok(Value::Str(replacement))
}

/// insert(i, t) -> String，在码点 i 前插入；i == 长度时追加，
/// 负下标加长度后向 0 收口，正下标越界是 ArgumentError。
fn string_insert(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 2)?;
    let s = receiver_str(&receiver)?;
    let index = int_arg(&args[0])?;
    let insertion = str_arg(&args[1])?;

    let len = s.len() as i64;
    let at = if index < 0 {
        (index + len).max(0) as usize
    } else {
        if index > len {
            return Err(ErrorObject::argument_error(format!("index {} out of range", index)));
        }
        index as usize
    };
    let mut chars = Vec::with_capacity(s.len() + insertion.len());
    chars.extend_from_slice(&s.chars()[..at]);
    chars.extend_from_slice(insertion.chars());
    chars.extend_from_slice(&s.chars()[at..]);
    Ok(Value::from_rstring(RString::from_chars(chars)))
}

/// delete(sub) -> String，删掉每一处精确匹配的子串。
fn string_delete(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let s = receiver_str(&receiver)?;
    let needle = str_arg(&args[0])?;
    if needle.is_empty() {
        return Ok(receiver);
    }
    let mut chars = Vec::with_capacity(s.len());
    let mut from = 0;
    while let Some(at) = s.find(&needle, from) {
        chars.extend_from_slice(&s.chars()[from..at]);
        from = at + needle.len();
    }
    chars.extend_from_slice(&s.chars()[from..]);
    Ok(Value::from_rstring(RString::from_chars(chars)))
}

fn string_empty(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::Boolean(receiver_str(&receiver)?.is_empty()))
}

/// eql(other) -> Boolean，同类且等值。
fn string_eql(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let s = receiver_str(&receiver)?;
    let equal = match &args[0] {
        Value::Str(other) => s == *other,
        _ => false,
    };
    Ok(Value::Boolean(equal))
}

fn string_start_with(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let s = receiver_str(&receiver)?;
    let prefix = str_arg(&args[0])?;
    Ok(Value::Boolean(s.starts_with(&prefix)))
}

fn string_end_with(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let s = receiver_str(&receiver)?;
    let suffix = str_arg(&args[0])?;
    Ok(Value::Boolean(s.ends_with(&suffix)))
}

/// to_i -> Integer，取开头连续的 ASCII 数字，没有就是 0。
fn string_to_i(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let s = receiver_str(&receiver)?;
    let digits: String = s.chars().iter().take_while(|c| c.is_ascii_digit()).collect();
    Ok(Value::Integer(digits.parse().unwrap_or(0)))
}

fn string_to_a(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let s = receiver_str(&receiver)?;
    let elements = s.chars().iter().map(|c| char_value(*c)).collect();
    let id = vm.heap.alloc_array(ArrayObject { elements });
    Ok(Value::Array(id))
}

fn string_to_s(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    receiver_str(&receiver)?;
    Ok(receiver)
}

fn string_include(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let s = receiver_str(&receiver)?;
    let needle = str_arg(&args[0])?;
    Ok(Value::Boolean(s.contains(&needle)))
}
