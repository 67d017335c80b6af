//! Goby Token 类型定义

#[derive(Debug, Clone, Copy, PartialEq, Eq, Ord, PartialOrd, Default)]
#[repr(u8)]
pub enum GobyTokenKind {
    // 关键字 (0-17)
    Def = 0,
    End,
    Class,
    Module,
    SelfKw,
    If,
    Elsif,
    Else,
    While,
    Do,
    Return,
    True,
    False,
    Nil,
    Yield,
    Begin,
    Rescue,
    Include,

    // 字面量 (100-101)
    LiteralInteger = 100,
    LiteralString,

    // 名字类 (120-122)
    Identifier = 120,
    Constant,
    InstanceVariable,

    // 多字符符号 (130-141)
    DoubleEqual = 130,
    BangEqual,
    GreaterThanEqual,
    LessThanEqual,
    Spaceship,
    AndAnd,
    OrOr,
    DotDot,
    HashRocket,
    PlusEqual,
    MinusEqual,
    AsteriskEqual,

    // 单字符符号 (150-168)
    GreaterThan = 150,
    LessThan,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    Equal,
    Bang,
    Comma,
    Dot,
    Colon,
    Pipe,
    LeftParenthesis,
    RightParenthesis,
    LeftCurlyBrace,
    RightCurlyBrace,
    LeftSquareBracket,
    RightSquareBracket,

    // 语句终结符 (240-241)
    Newline = 240,
    Semicolon,

    // 无效 token（默认值）
    #[default]
    InvalidToken = 255,
}

impl From<GobyTokenKind> for u8 {
    fn from(val: GobyTokenKind) -> Self {
        val as u8
    }
}
