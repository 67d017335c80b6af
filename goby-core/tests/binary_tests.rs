//! .gbbc 序列化与加载的端到端测试。
//!
//! 程序编译后序列化为字节、重新加载、在全新虚拟机里执行，
//! 行为应与直接执行完全一致。

mod common;

use std::rc::Rc;

use common::SharedBuffer;

use goby_core::binary::{load_program, serialize_program, LoadError, HEADER_SIZE, MAGIC};
use goby_core::compiler::lexer::tokenize;
use goby_core::compiler::parser::Parser;
use goby_core::runtime::compiler::compile;
use goby_core::{CompiledSequence, CompilerConfig, Vm};

fn build(source: &str) -> Rc<CompiledSequence> {
    let tokens = tokenize(source).unwrap();
    let program = Parser::new(tokens).parse().unwrap();
    compile(&program).unwrap()
}

/// 执行序列并返回 (结果检视形式, 输出)。
fn execute(sequence: Rc<CompiledSequence>) -> (String, String) {
    let buffer = SharedBuffer::default();
    let mut vm = Vm::new();
    vm.set_output(Box::new(buffer.clone()));
    let value = vm.run(sequence).unwrap();
    (vm.inspect(&value), buffer.contents())
}

const SAMPLE: &str = r#"
class Accumulator
  def initialize
    @total = 0
  end

  def add(n)
    @total += n
  end

  def total
    @total
  end
end

acc = Accumulator.new
[3, 5, 7].each do |n|
  acc.add(n)
end
puts("total: " + acc.total.to_s)
acc.total
"#;

#[test]
fn test_roundtrip_preserves_behavior() {
    let sequence = build(SAMPLE);
    let (direct_inspect, direct_output) = execute(sequence.clone());

    let bytes = serialize_program(&sequence, &CompilerConfig::default()).unwrap();
    let loaded = load_program(&bytes).unwrap();
    let (loaded_inspect, loaded_output) = execute(loaded);

    assert_eq!(loaded_inspect, direct_inspect);
    assert_eq!(loaded_output, direct_output);
    assert_eq!(direct_output, "total: 15\n");
    assert_eq!(direct_inspect, "15");
}

#[test]
fn test_roundtrip_without_debug_info_still_executes() {
    let sequence = build(SAMPLE);
    let config = CompilerConfig { emit_debug_info: false };
    let bytes = serialize_program(&sequence, &config).unwrap();

    let loaded = load_program(&bytes).unwrap();
    let (inspect, output) = execute(loaded);
    assert_eq!(inspect, "15");
    assert_eq!(output, "total: 15\n");
}

#[test]
fn test_debug_info_carries_line_numbers() {
    let sequence = build("a = 1\nb = 2\na + b");

    let with_debug = load_program(
        &serialize_program(&sequence, &CompilerConfig { emit_debug_info: true }).unwrap(),
    )
    .unwrap();
    assert_eq!(with_debug.lines, sequence.lines);

    let without_debug = load_program(
        &serialize_program(&sequence, &CompilerConfig { emit_debug_info: false }).unwrap(),
    )
    .unwrap();
    assert!(without_debug.lines.is_empty());
}

#[test]
fn test_rejects_corrupted_header() {
    let sequence = build("1 + 1");
    let mut bytes = serialize_program(&sequence, &CompilerConfig::default()).unwrap();
    assert_eq!(&bytes[..4], MAGIC);

    bytes[0] = b'X';
    assert_eq!(load_program(&bytes), Err(LoadError::BadMagic));
}

#[test]
fn test_rejects_future_format_version() {
    let sequence = build("1 + 1");
    let mut bytes = serialize_program(&sequence, &CompilerConfig::default()).unwrap();
    bytes[4] = 0xFF;
    bytes[5] = 0xFF;
    assert_eq!(load_program(&bytes), Err(LoadError::UnsupportedVersion(0xFFFF)));
}

#[test]
fn test_rejects_truncated_payload() {
    let sequence = build(SAMPLE);
    let bytes = serialize_program(&sequence, &CompilerConfig::default()).unwrap();

    // 只留下头部和目录的一部分，负载整段缺失。
    assert!(load_program(&bytes[..HEADER_SIZE + 4]).is_err());
    assert!(load_program(&bytes[..bytes.len() - 1]).is_err());
}
