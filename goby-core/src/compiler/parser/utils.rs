use super::super::lexer::token_kind::GobyTokenKind;

/// 运算符优先级表
///
/// 返回 0 表示不是二元运算符
pub fn get_precedence(op: GobyTokenKind) -> i32 {
    match op {
        GobyTokenKind::Equal
        | GobyTokenKind::PlusEqual
        | GobyTokenKind::MinusEqual
        | GobyTokenKind::AsteriskEqual => 10,
        // && 与 || 同级，左结合
        GobyTokenKind::AndAnd | GobyTokenKind::OrOr => 20,
        GobyTokenKind::DotDot => 30,
        GobyTokenKind::DoubleEqual | GobyTokenKind::BangEqual | GobyTokenKind::Spaceship => 40,
        GobyTokenKind::LessThan
        | GobyTokenKind::LessThanEqual
        | GobyTokenKind::GreaterThan
        | GobyTokenKind::GreaterThanEqual => 50,
        GobyTokenKind::Plus | GobyTokenKind::Minus => 60,
        GobyTokenKind::Asterisk | GobyTokenKind::Slash | GobyTokenKind::Percent => 70,
        _ => 0,
    }
}

/// 二元运算符对应的方法名（a + b 派发 "+" 方法）
pub fn binary_method_name(op: GobyTokenKind) -> Option<&'static str> {
    match op {
        GobyTokenKind::Plus => Some("+"),
        GobyTokenKind::Minus => Some("-"),
        GobyTokenKind::Asterisk => Some("*"),
        GobyTokenKind::Slash => Some("/"),
        GobyTokenKind::Percent => Some("%"),
        GobyTokenKind::DoubleEqual => Some("=="),
        GobyTokenKind::BangEqual => Some("!="),
        GobyTokenKind::LessThan => Some("<"),
        GobyTokenKind::LessThanEqual => Some("<="),
        GobyTokenKind::GreaterThan => Some(">"),
        GobyTokenKind::GreaterThanEqual => Some(">="),
        GobyTokenKind::Spaceship => Some("<=>"),
        _ => None,
    }
}

/// 复合赋值运算符对应的基础运算符（a += b 脱糖为 a = a + b）
pub fn compound_assign_base(op: GobyTokenKind) -> Option<GobyTokenKind> {
    match op {
        GobyTokenKind::PlusEqual => Some(GobyTokenKind::Plus),
        GobyTokenKind::MinusEqual => Some(GobyTokenKind::Minus),
        GobyTokenKind::AsteriskEqual => Some(GobyTokenKind::Asterisk),
        _ => None,
    }
}
