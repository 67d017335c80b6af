//! 测试辅助工具
//!
//! 提供端到端测试的辅助函数

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use goby_core::compiler::lexer::tokenize;
use goby_core::compiler::parser::Parser;
use goby_core::runtime::compiler::compile;
use goby_core::runtime::object::Value;
use goby_core::runtime::vm::Vm;

/// 可克隆的输出缓冲，一份句柄交给虚拟机，另一份留给断言。
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// 执行结果
#[derive(Debug)]
pub struct ExecResult {
    /// 最后一条表达式的值
    pub value: Value,
    /// 值的 inspect 形式（堆对象在虚拟机销毁前展开）
    pub inspect: String,
    /// puts / print 写出的内容
    pub output: String,
}

/// 执行错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    Lexer(String),
    Parser(String),
    Compiler(String),
    Runtime(String),
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecError::Lexer(msg) => write!(f, "Lexer error: {}", msg),
            ExecError::Parser(msg) => write!(f, "Parser error: {}", msg),
            ExecError::Compiler(msg) => write!(f, "Compiler error: {}", msg),
            ExecError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
        }
    }
}

impl std::error::Error for ExecError {}

/// 执行 Goby 代码并返回结果（完整流程：词法 + 语法 + 编译 + 执行）
///
/// # Example
/// ```
/// let result = run_code("1 + 2").unwrap();
/// assert_eq!(get_int(&result), Some(3));
/// ```
pub fn run_code(source: &str) -> Result<ExecResult, ExecError> {
    let tokens = tokenize(source).map_err(|e| ExecError::Lexer(e.to_string()))?;
    let program = Parser::new(tokens)
        .parse()
        .map_err(|e| ExecError::Parser(e.to_string()))?;
    let sequence = compile(&program).map_err(|e| ExecError::Compiler(e.to_string()))?;

    let buffer = SharedBuffer::new();
    let mut vm = Vm::new();
    vm.set_output(Box::new(buffer.clone()));
    let value = vm.run(sequence).map_err(|e| ExecError::Runtime(e.to_string()))?;

    Ok(ExecResult {
        inspect: vm.inspect(&value),
        value,
        output: buffer.contents(),
    })
}

/// 执行代码并返回打印输出，出错即 panic。
pub fn run_output(source: &str) -> String {
    match run_code(source) {
        Ok(result) => result.output,
        Err(e) => panic!("execution failed: {}\nsource:\n{}", e, source),
    }
}

/// 执行应当失败的代码，返回 "类名: 消息" 形式的运行期错误。
pub fn run_error(source: &str) -> String {
    match run_code(source) {
        Ok(result) => panic!("expected a runtime error, got {:?}", result.inspect),
        Err(ExecError::Runtime(msg)) => msg,
        Err(other) => panic!("expected a runtime error, got {}", other),
    }
}

/// 获取整数值
pub fn get_int(result: &ExecResult) -> Option<i64> {
    match result.value {
        Value::Integer(n) => Some(n),
        _ => None,
    }
}

/// 获取布尔值
pub fn get_bool(result: &ExecResult) -> Option<bool> {
    match result.value {
        Value::Boolean(b) => Some(b),
        _ => None,
    }
}

/// 获取字符串值
pub fn get_string(result: &ExecResult) -> Option<String> {
    match &result.value {
        Value::Str(s) => Some(s.to_string()),
        _ => None,
    }
}
