//! XPath parser: tokens to location paths and predicate expressions

use super::lexer::Token;

/// Evaluated from the document root, whether written as `/a`, `//a` or `a`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LocationPath {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

impl Step {
    fn new(axis: Axis, test: NodeTest) -> Self {
        Self {
            axis,
            test,
            predicates: Vec::new(),
        }
    }

    /// The hidden step behind `//`
    fn descendant_or_self() -> Self {
        Self::new(Axis::DescendantOrSelf, NodeTest::AnyNode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    SelfNode,
    Parent,
    Ancestor,
    AncestorOrSelf,
    FollowingSibling,
    PrecedingSibling,
    Attribute,
}

impl Axis {
    fn from_name(name: &str) -> Result<Self, String> {
        match name {
            "child" => Ok(Axis::Child),
            "descendant" => Ok(Axis::Descendant),
            "descendant-or-self" => Ok(Axis::DescendantOrSelf),
            "self" => Ok(Axis::SelfNode),
            "parent" => Ok(Axis::Parent),
            "ancestor" => Ok(Axis::Ancestor),
            "ancestor-or-self" => Ok(Axis::AncestorOrSelf),
            "following-sibling" => Ok(Axis::FollowingSibling),
            "preceding-sibling" => Ok(Axis::PrecedingSibling),
            "attribute" => Ok(Axis::Attribute),
            other => Err(format!("unsupported axis `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeTest {
    /// `node()`
    AnyNode,
    /// `*`: any element, or any attribute on the attribute axis
    Wildcard,
    /// `text()`
    Text,
    /// Lower-cased element name
    Name(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Function {
    Position,
    Last,
    Not,
    Contains,
    StartsWith,
    NormalizeSpace,
    StringLength,
    Name,
    True,
    False,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "position" => Function::Position,
            "last" => Function::Last,
            "not" => Function::Not,
            "contains" => Function::Contains,
            "starts-with" => Function::StartsWith,
            "normalize-space" => Function::NormalizeSpace,
            "string-length" => Function::StringLength,
            "name" | "local-name" => Function::Name,
            "true" => Function::True,
            "false" => Function::False,
            _ => return None,
        })
    }

    /// Accepted argument counts, inclusive
    fn arity(self) -> (usize, usize) {
        match self {
            Function::Position
            | Function::Last
            | Function::True
            | Function::False
            | Function::Name => (0, 0),
            Function::Not => (1, 1),
            Function::Contains | Function::StartsWith => (2, 2),
            Function::NormalizeSpace | Function::StringLength => (0, 1),
        }
    }
}

/// Predicate expression
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Compare(Box<Expr>, CmpOp, Box<Expr>),
    Arith(Box<Expr>, ArithOp, Box<Expr>),
    Negate(Box<Expr>),
    Call(Function, Vec<Expr>),
    /// `@name`
    Attribute(String),
    /// `text()`
    Text,
    /// `.`
    Context,
    /// Bare element name: the child elements of that name
    Child(String),
    Literal(String),
    Number(f64),
}

pub(crate) fn parse(tokens: Vec<Token>) -> Result<Vec<LocationPath>, String> {
    let mut parser = Parser { tokens, pos: 0 };
    let paths = parser.union()?;

    match parser.peek() {
        None => Ok(paths),
        Some(token) => Err(format!("unexpected {token} after the end of the path")),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), String> {
        match self.next() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(format!("expected {expected}, found {token}")),
            None => Err(format!("expected {expected}, found end of query")),
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Token::Name(name)) if name == keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn union(&mut self) -> Result<Vec<LocationPath>, String> {
        let mut paths = vec![self.location_path()?];
        while self.eat(&Token::Pipe) {
            paths.push(self.location_path()?);
        }
        Ok(paths)
    }

    fn location_path(&mut self) -> Result<LocationPath, String> {
        let mut steps = Vec::new();

        match self.peek() {
            Some(Token::Slash) => {
                self.pos += 1;
                if !self.at_step_start() {
                    // `/` alone is the document root
                    return Ok(LocationPath { steps });
                }
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                steps.push(Step::descendant_or_self());
            }
            _ => {}
        }

        steps.push(self.step()?);
        loop {
            if self.eat(&Token::Slash) {
                steps.push(self.step()?);
            } else if self.eat(&Token::DoubleSlash) {
                steps.push(Step::descendant_or_self());
                steps.push(self.step()?);
            } else {
                break;
            }
        }

        Ok(LocationPath { steps })
    }

    fn at_step_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Name(_) | Token::Star | Token::Dot | Token::DotDot | Token::At)
        )
    }

    fn step(&mut self) -> Result<Step, String> {
        match self.peek() {
            Some(Token::Dot) => {
                self.pos += 1;
                return Ok(Step::new(Axis::SelfNode, NodeTest::AnyNode));
            }
            Some(Token::DotDot) => {
                self.pos += 1;
                return Ok(Step::new(Axis::Parent, NodeTest::AnyNode));
            }
            _ => {}
        }

        let explicit_axis = match (self.peek(), self.peek_at(1)) {
            (Some(Token::At), _) => Some((Axis::Attribute, 1)),
            (Some(Token::Name(name)), Some(Token::ColonColon)) => {
                Some((Axis::from_name(name)?, 2))
            }
            _ => None,
        };
        let axis = match explicit_axis {
            Some((axis, width)) => {
                self.pos += width;
                axis
            }
            None => Axis::Child,
        };

        let mut step = Step::new(axis, self.node_test()?);
        while self.eat(&Token::LBracket) {
            step.predicates.push(self.or_expr()?);
            self.expect(&Token::RBracket)?;
        }
        Ok(step)
    }

    fn node_test(&mut self) -> Result<NodeTest, String> {
        match self.next() {
            Some(Token::Star) => Ok(NodeTest::Wildcard),
            Some(Token::Name(name)) if self.peek() == Some(&Token::LParen) => {
                self.pos += 1;
                self.expect(&Token::RParen)?;
                match name.as_str() {
                    "node" => Ok(NodeTest::AnyNode),
                    "text" => Ok(NodeTest::Text),
                    other => Err(format!("unsupported node test `{other}()`")),
                }
            }
            Some(Token::Name(name)) => Ok(NodeTest::Name(name.to_ascii_lowercase())),
            Some(token) => Err(format!("expected a node test, found {token}")),
            None => Err("expected a node test, found end of query".to_string()),
        }
    }

    fn or_expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.and_expr()?;
        while self.eat_keyword("or") {
            let rhs = self.and_expr()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.comparison()?;
        while self.eat_keyword("and") {
            let rhs = self.comparison()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Expr, String> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => CmpOp::Eq,
                Some(Token::NotEq) => CmpOp::NotEq,
                Some(Token::Lt) => CmpOp::Lt,
                Some(Token::LtEq) => CmpOp::LtEq,
                Some(Token::Gt) => CmpOp::Gt,
                Some(Token::GtEq) => CmpOp::GtEq,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.additive()?;
            lhs = Expr::Compare(Box::new(lhs), op, Box::new(rhs));
        }
    }

    fn additive(&mut self) -> Result<Expr, String> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithOp::Add,
                Some(Token::Minus) => ArithOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.multiplicative()?;
            lhs = Expr::Arith(Box::new(lhs), op, Box::new(rhs));
        }
    }

    /// `*` after an operand is multiplication; `div` and `mod` are keywords
    /// only in operator position
    fn multiplicative(&mut self) -> Result<Expr, String> {
        let mut lhs = self.unary()?;
        loop {
            let op = if self.eat(&Token::Star) {
                ArithOp::Mul
            } else if self.eat_keyword("div") {
                ArithOp::Div
            } else if self.eat_keyword("mod") {
                ArithOp::Mod
            } else {
                return Ok(lhs);
            };
            let rhs = self.unary()?;
            lhs = Expr::Arith(Box::new(lhs), op, Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Expr, String> {
        if self.eat(&Token::Minus) {
            Ok(Expr::Negate(Box::new(self.unary()?)))
        } else {
            self.primary()
        }
    }

    fn primary(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::LParen) => {
                let expr = self.or_expr()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            Some(Token::Literal(literal)) => Ok(Expr::Literal(literal)),
            Some(Token::Number(number)) => Ok(Expr::Number(number)),
            Some(Token::Dot) => Ok(Expr::Context),
            Some(Token::At) => match self.next() {
                Some(Token::Name(name)) => Ok(Expr::Attribute(name.to_ascii_lowercase())),
                Some(token) => Err(format!("expected an attribute name, found {token}")),
                None => Err("expected an attribute name, found end of query".to_string()),
            },
            Some(Token::Name(name)) if self.peek() == Some(&Token::LParen) => {
                self.pos += 1;
                self.call(&name)
            }
            Some(Token::Name(name)) => Ok(Expr::Child(name.to_ascii_lowercase())),
            Some(token) => Err(format!("unexpected {token} in predicate")),
            None => Err("unexpected end of query in predicate".to_string()),
        }
    }

    /// Function call; the opening parenthesis is already consumed
    fn call(&mut self, name: &str) -> Result<Expr, String> {
        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.or_expr()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::RParen)?;
                break;
            }
        }

        if name == "text" {
            return if args.is_empty() {
                Ok(Expr::Text)
            } else {
                Err("text() takes no arguments".to_string())
            };
        }

        let function =
            Function::from_name(name).ok_or_else(|| format!("unsupported function `{name}()`"))?;
        let (min, max) = function.arity();
        if args.len() < min || args.len() > max {
            return Err(format!(
                "{name}() takes {} argument(s), got {}",
                if min == max {
                    min.to_string()
                } else {
                    format!("{min} to {max}")
                },
                args.len()
            ));
        }
        Ok(Expr::Call(function, args))
    }
}
