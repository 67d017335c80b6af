use super::super::lexer::token_kind::GobyTokenKind;
use super::stmt::Stmt;
use std::fmt;

// 表达式类型别名
pub type Expr = Box<ExprKind>;

/// 解析器表达式枚举
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // 整数字面量表达式
    LiteralInt(LiteralInt),
    // 字符串字面量表达式
    LiteralString(LiteralString),
    // 布尔true字面量
    LiteralTrue(LiteralTrue),
    // 布尔false字面量
    LiteralFalse(LiteralFalse),
    // nil字面量
    LiteralNil(LiteralNil),
    // self引用
    SelfRef(SelfRef),
    // 数组字面量表达式
    LiteralArray(LiteralArray),
    // 哈希字面量表达式（键固定为字符串）
    LiteralHash(LiteralHash),
    // 范围字面量表达式（a..b，闭区间）
    RangeLiteral(RangeLiteral),
    // 标识符（局部变量或无接收者方法调用，编译期消解）
    Identifier(Identifier),
    // 常量引用表达式
    ConstantRef(ConstantRef),
    // 实例变量引用表达式
    InstanceVarRef(InstanceVarRef),
    // 二元运算符表达式（编译为方法派发）
    Binary(Binary),
    // 逻辑运算符表达式（&& ||，编译为短路跳转）
    Logical(Logical),
    // 一元运算符表达式（- !，编译为方法派发）
    Unary(Unary),
    // 赋值表达式
    Assignment(Assignment),
    // 方法调用表达式
    MethodCall(MethodCall),
    // 索引访问表达式（编译为 "[]" 派发）
    IndexAccess(IndexAccess),
    // yield表达式
    YieldExpr(YieldExpr),
}

// 整数字面量结构体
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralInt {
    pub value: i64,
}

// 字符串字面量结构体
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralString {
    pub value: String,
}

// 布尔true字面量（无数据）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiteralTrue;

// 布尔false字面量（无数据）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiteralFalse;

// nil字面量（无数据）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiteralNil;

// self引用（无数据）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelfRef;

// 数组字面量结构体
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralArray {
    pub elements: Vec<Expr>,
}

// 哈希字面量结构体
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralHash {
    pub entries: Vec<(String, Expr)>,
}

// 范围字面量结构体
#[derive(Debug, Clone, PartialEq)]
pub struct RangeLiteral {
    pub start: Expr,
    pub end: Expr,
    pub line: u32,
}

// 标识符结构体
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub line: u32,
}

// 常量引用结构体
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantRef {
    pub name: String,
    pub line: u32,
}

// 实例变量引用结构体
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceVarRef {
    pub name: String,
}

// 二元运算符表达式结构体
#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub left: Expr,
    pub op: GobyTokenKind,
    pub right: Expr,
    pub line: u32,
}

// 逻辑运算符表达式结构体
#[derive(Debug, Clone, PartialEq)]
pub struct Logical {
    pub left: Expr,
    pub op: GobyTokenKind,
    pub right: Expr,
}

// 一元运算符表达式结构体
#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub op: GobyTokenKind,
    pub operand: Expr,
    pub line: u32,
}

/// 赋值目标
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    /// 局部变量
    Local(String),
    /// 实例变量
    InstanceVariable(String),
    /// 常量
    Constant(String),
    /// 索引赋值（编译为 "[]=" 派发）
    Index { receiver: Expr, index: Expr },
}

// 赋值表达式结构体
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: AssignTarget,
    pub value: Expr,
    pub line: u32,
}

// 块字面量（do |params| ... end），只能附着在方法调用上
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLiteral {
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub line: u32,
}

// 方法调用表达式结构体
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    /// 接收者，None表示self调用
    pub receiver: Option<Expr>,
    pub name: String,
    pub arguments: Vec<Expr>,
    pub block: Option<BlockLiteral>,
    pub line: u32,
}

// 索引访问表达式结构体
#[derive(Debug, Clone, PartialEq)]
pub struct IndexAccess {
    pub receiver: Expr,
    pub index: Expr,
    pub line: u32,
}

// yield表达式结构体
#[derive(Debug, Clone, PartialEq)]
pub struct YieldExpr {
    pub arguments: Vec<Expr>,
    pub line: u32,
}

// 实现Display trait（调试输出用）
impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprKind::LiteralInt(int) => write!(f, "{}", int.value),
            ExprKind::LiteralString(s) => write!(f, "\"{}\"", s.value),
            ExprKind::LiteralTrue(_) => write!(f, "true"),
            ExprKind::LiteralFalse(_) => write!(f, "false"),
            ExprKind::LiteralNil(_) => write!(f, "nil"),
            ExprKind::SelfRef(_) => write!(f, "self"),
            ExprKind::LiteralArray(array) => {
                let elements = array
                    .elements
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{}]", elements)
            }
            ExprKind::LiteralHash(hash) => {
                let entries = hash
                    .entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{ {} }}", entries)
            }
            ExprKind::RangeLiteral(range) => write!(f, "({}..{})", range.start, range.end),
            ExprKind::Identifier(ident) => write!(f, "{}", ident.name),
            ExprKind::ConstantRef(c) => write!(f, "{}", c.name),
            ExprKind::InstanceVarRef(ivar) => write!(f, "{}", ivar.name),
            ExprKind::Binary(bin) => write!(f, "({} {:?} {})", bin.left, bin.op, bin.right),
            ExprKind::Logical(l) => write!(f, "({} {:?} {})", l.left, l.op, l.right),
            ExprKind::Unary(un) => write!(f, "({:?} {})", un.op, un.operand),
            ExprKind::Assignment(assign) => match &assign.target {
                AssignTarget::Local(name)
                | AssignTarget::InstanceVariable(name)
                | AssignTarget::Constant(name) => write!(f, "{} = {}", name, assign.value),
                AssignTarget::Index { receiver, index } => {
                    write!(f, "{}[{}] = {}", receiver, index, assign.value)
                }
            },
            ExprKind::MethodCall(call) => {
                let args = call
                    .arguments
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                let block_suffix = if call.block.is_some() { " do ... end" } else { "" };
                match &call.receiver {
                    Some(receiver) => {
                        write!(f, "{}.{}({}){}", receiver, call.name, args, block_suffix)
                    }
                    None => write!(f, "{}({}){}", call.name, args, block_suffix),
                }
            }
            ExprKind::IndexAccess(access) => {
                write!(f, "{}[{}]", access.receiver, access.index)
            }
            ExprKind::YieldExpr(y) => {
                if y.arguments.is_empty() {
                    write!(f, "yield")
                } else {
                    let args = y
                        .arguments
                        .iter()
                        .map(|a| a.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    write!(f, "yield({})", args)
                }
            }
        }
    }
}
