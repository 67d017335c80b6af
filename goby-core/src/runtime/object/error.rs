//! 语言层错误对象
//!
//! 运行期错误是普通的值：由虚拟机或内建方法构造，沿调用栈向外
//! 传播，可被 begin/rescue 捕获。错误类别用类名字符串区分，
//! rescue 不按类别过滤。

use std::fmt;

// ==================== ErrorObject ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorObject {
    pub class_name: String,
    pub message: String,
}

impl ErrorObject {
    pub fn new(class_name: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorObject { class_name: class_name.into(), message: message.into() }
    }

    pub fn no_method(name: &str, receiver: &str) -> Self {
        ErrorObject::new("NoMethodError", format!("undefined method '{}' for {}", name, receiver))
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        ErrorObject::new("TypeError", message)
    }

    /// 实参类型不符的统一口径。
    pub fn type_mismatch(expected: &str, got: &str) -> Self {
        ErrorObject::new("TypeError", format!("expected {}, got {}", expected, got))
    }

    pub fn argument_error(message: impl Into<String>) -> Self {
        ErrorObject::new("ArgumentError", message)
    }

    pub fn wrong_arguments(given: usize, expected: &str) -> Self {
        ErrorObject::new(
            "ArgumentError",
            format!("wrong number of arguments (given {}, expected {})", given, expected),
        )
    }

    pub fn zero_division() -> Self {
        ErrorObject::new("ZeroDivisionError", "divided by 0")
    }

    pub fn undefined_constant(name: &str) -> Self {
        ErrorObject::new("UndefinedConstantError", format!("uninitialized constant {}", name))
    }

    pub fn stack_overflow() -> Self {
        ErrorObject::new("StackOverflowError", "stack level too deep")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ErrorObject::new("InternalError", message)
    }
}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class_name, self.message)
    }
}

// ==================== 测试 ====================
