//! XPath evaluation over the `scraper` tree

use std::collections::HashSet;

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Node as DomNode};

use super::parser::{ArithOp, Axis, CmpOp, Expr, Function, LocationPath, NodeTest, Step};
use crate::document::Document;
use crate::node::{is_ignorable, text_content, Node};

type DomRef<'a> = NodeRef<'a, DomNode>;

/// A tree node, or an attribute of an element. Attributes are not part of
/// the `ego_tree` tree, so they carry their owner and their index in it.
#[derive(Clone, Copy)]
enum Item<'a> {
    Tree(DomRef<'a>),
    Attribute {
        owner: DomRef<'a>,
        index: usize,
        name: &'a str,
        value: &'a str,
    },
}

impl<'a> Item<'a> {
    /// Unique per node; attributes sort right after their owner
    fn identity(&self) -> (NodeId, usize) {
        match self {
            Item::Tree(node) => (node.id(), 0),
            Item::Attribute { owner, index, .. } => (owner.id(), index + 1),
        }
    }

    fn order(&self, document: &Document) -> (usize, usize) {
        let (id, sub) = self.identity();
        (document.position(id), sub)
    }

    fn tree(&self) -> Option<DomRef<'a>> {
        match self {
            Item::Tree(node) => Some(*node),
            Item::Attribute { .. } => None,
        }
    }

    /// Selectable nodes only: elements, text and attributes
    fn into_node(self) -> Option<Node<'a>> {
        match self {
            Item::Tree(node) => match node.value() {
                DomNode::Text(text) => Some(Node::from_text(&**text)),
                DomNode::Element(_) => ElementRef::wrap(node).map(Node::from_element),
                _ => None,
            },
            Item::Attribute { name, value, .. } => Some(Node::from_attribute(name, value)),
        }
    }
}

/// Evaluate a union of paths. Result is deduplicated and in document order.
pub(crate) fn evaluate<'a>(document: &'a Document, paths: &[LocationPath]) -> Vec<Node<'a>> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for path in paths {
        for item in evaluate_path(document, path) {
            if seen.insert(item.identity()) {
                items.push(item);
            }
        }
    }
    if paths.len() > 1 {
        items.sort_by_key(|item| item.order(document));
    }

    items.into_iter().filter_map(Item::into_node).collect()
}

fn evaluate_path<'a>(document: &'a Document, path: &LocationPath) -> Vec<Item<'a>> {
    let mut context = vec![Item::Tree(document.root())];

    for step in &path.steps {
        let mut seen = HashSet::new();
        let mut next = Vec::new();

        for &item in &context {
            for found in apply_step(item, step) {
                if seen.insert(found.identity()) {
                    next.push(found);
                }
            }
        }

        // reverse axes and multiple context nodes both scramble the order
        next.sort_by_key(|item| item.order(document));
        context = next;

        if context.is_empty() {
            break;
        }
    }

    context
}

fn apply_step<'a>(item: Item<'a>, step: &Step) -> Vec<Item<'a>> {
    let candidates: Vec<Item<'a>> = axis_items(item, step.axis)
        .filter(|candidate| matches_test(&step.test, step.axis, candidate))
        .collect();

    step.predicates
        .iter()
        .fold(candidates, |items, predicate| filter(items, predicate))
}

/// Items along `axis`, nearest first
fn axis_items<'a>(item: Item<'a>, axis: Axis) -> Box<dyn Iterator<Item = Item<'a>> + 'a> {
    let node = match item {
        Item::Tree(node) => node,
        Item::Attribute { owner, .. } => {
            return match axis {
                Axis::SelfNode => Box::new(std::iter::once(item)),
                Axis::Parent => Box::new(std::iter::once(Item::Tree(owner))),
                Axis::Ancestor => {
                    Box::new(std::iter::once(owner).chain(owner.ancestors()).map(Item::Tree))
                }
                Axis::AncestorOrSelf => Box::new(
                    std::iter::once(item)
                        .chain(std::iter::once(owner).chain(owner.ancestors()).map(Item::Tree)),
                ),
                _ => Box::new(std::iter::empty()),
            };
        }
    };

    match axis {
        Axis::Child => Box::new(node.children().map(Item::Tree)),
        Axis::Descendant => Box::new(node.descendants().skip(1).map(Item::Tree)),
        Axis::DescendantOrSelf => Box::new(node.descendants().map(Item::Tree)),
        Axis::SelfNode => Box::new(std::iter::once(item)),
        Axis::Parent => Box::new(node.parent().into_iter().map(Item::Tree)),
        Axis::Ancestor => Box::new(node.ancestors().map(Item::Tree)),
        Axis::AncestorOrSelf => Box::new(std::iter::once(node).chain(node.ancestors()).map(Item::Tree)),
        Axis::FollowingSibling => Box::new(node.next_siblings().map(Item::Tree)),
        Axis::PrecedingSibling => Box::new(node.prev_siblings().map(Item::Tree)),
        Axis::Attribute => match node.value().as_element() {
            Some(element) => Box::new(element.attrs().enumerate().map(move |(index, (name, value))| {
                Item::Attribute {
                    owner: node,
                    index,
                    name,
                    value,
                }
            })),
            None => Box::new(std::iter::empty()),
        },
    }
}

/// `*` and names match the principal node type of the axis: attributes on
/// the attribute axis, elements everywhere else
fn matches_test(test: &NodeTest, axis: Axis, item: &Item<'_>) -> bool {
    match item {
        Item::Attribute { name, .. } => match test {
            NodeTest::AnyNode => true,
            NodeTest::Wildcard => axis == Axis::Attribute,
            NodeTest::Name(wanted) => axis == Axis::Attribute && name.eq_ignore_ascii_case(wanted),
            NodeTest::Text => false,
        },
        Item::Tree(node) => match test {
            NodeTest::AnyNode => !is_ignorable(node),
            NodeTest::Wildcard => node.value().is_element(),
            NodeTest::Text => node.value().is_text() && !is_ignorable(node),
            NodeTest::Name(name) => is_element_named(node, name),
        },
    }
}

fn is_element_named(node: &DomRef<'_>, name: &str) -> bool {
    node.value()
        .as_element()
        .is_some_and(|element| element.name().eq_ignore_ascii_case(name))
}

fn string_value(item: &Item<'_>) -> String {
    match item {
        Item::Tree(node) => match node.value() {
            DomNode::Text(text) => String::from(&**text),
            _ => text_content(node),
        },
        Item::Attribute { value, .. } => value.to_string(),
    }
}

fn filter<'a>(items: Vec<Item<'a>>, predicate: &Expr) -> Vec<Item<'a>> {
    let size = items.len();

    items
        .into_iter()
        .enumerate()
        .filter(|&(index, item)| {
            let context = Context {
                item,
                position: index + 1,
                size,
            };
            match eval(predicate, &context) {
                Value::Number(n) => n == context.position as f64,
                value => value.truthy(),
            }
        })
        .map(|(_, item)| item)
        .collect()
}

struct Context<'a> {
    item: Item<'a>,
    /// 1-based, in axis order
    position: usize,
    size: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    /// String values of a node-set
    Nodes(Vec<String>),
    Str(String),
    Number(f64),
    Bool(bool),
}

impl Value {
    fn truthy(&self) -> bool {
        match self {
            Value::Nodes(nodes) => !nodes.is_empty(),
            Value::Str(s) => !s.is_empty(),
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Bool(b) => *b,
        }
    }

    fn into_string(self) -> String {
        match self {
            Value::Nodes(nodes) => nodes.into_iter().next().unwrap_or_default(),
            Value::Str(s) => s,
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 => format!("{}", n as i64),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
        }
    }

    fn number(&self) -> f64 {
        match self {
            Value::Nodes(nodes) => nodes.first().map_or(f64::NAN, |s| Atom::Text(s).number()),
            Value::Str(s) => Atom::Text(s).number(),
            Value::Number(n) => *n,
            Value::Bool(b) => f64::from(u8::from(*b)),
        }
    }

    fn atoms(&self) -> Vec<Atom<'_>> {
        match self {
            Value::Nodes(nodes) => nodes.iter().map(|s| Atom::Text(s)).collect(),
            Value::Str(s) => vec![Atom::Text(s)],
            Value::Number(n) => vec![Atom::Number(*n)],
            Value::Bool(b) => vec![Atom::Number(if *b { 1.0 } else { 0.0 })],
        }
    }
}

enum Atom<'v> {
    Text(&'v str),
    Number(f64),
}

impl Atom<'_> {
    fn number(&self) -> f64 {
        match self {
            Atom::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
            Atom::Number(n) => *n,
        }
    }
}

fn eval(expr: &Expr, ctx: &Context<'_>) -> Value {
    match expr {
        Expr::Or(lhs, rhs) => Value::Bool(eval(lhs, ctx).truthy() || eval(rhs, ctx).truthy()),
        Expr::And(lhs, rhs) => Value::Bool(eval(lhs, ctx).truthy() && eval(rhs, ctx).truthy()),
        Expr::Compare(lhs, op, rhs) => {
            Value::Bool(compare(&eval(lhs, ctx), *op, &eval(rhs, ctx)))
        }
        Expr::Arith(lhs, op, rhs) => {
            let (l, r) = (eval(lhs, ctx).number(), eval(rhs, ctx).number());
            Value::Number(match op {
                ArithOp::Add => l + r,
                ArithOp::Sub => l - r,
                ArithOp::Mul => l * r,
                ArithOp::Div => l / r,
                ArithOp::Mod => l % r,
            })
        }
        Expr::Negate(operand) => Value::Number(-eval(operand, ctx).number()),
        Expr::Call(function, args) => call(*function, args, ctx),
        Expr::Attribute(name) => Value::Nodes(
            ctx.item
                .tree()
                .and_then(|node| node.value().as_element())
                .and_then(|element| element.attr(name))
                .map(str::to_string)
                .into_iter()
                .collect(),
        ),
        Expr::Text => Value::Nodes(
            ctx.item
                .tree()
                .into_iter()
                .flat_map(|node| node.children())
                .filter(|child| !is_ignorable(child))
                .filter_map(|child| child.value().as_text().map(|text| String::from(&**text)))
                .collect(),
        ),
        Expr::Context => Value::Nodes(vec![string_value(&ctx.item)]),
        Expr::Child(name) => Value::Nodes(
            ctx.item
                .tree()
                .into_iter()
                .flat_map(|node| node.children())
                .filter(|child| is_element_named(child, name))
                .map(|child| string_value(&Item::Tree(child)))
                .collect(),
        ),
        Expr::Literal(literal) => Value::Str(literal.clone()),
        Expr::Number(number) => Value::Number(*number),
    }
}

fn call(function: Function, args: &[Expr], ctx: &Context<'_>) -> Value {
    // a missing string argument defaults to the context node
    let string_arg = |index: usize| -> String {
        args.get(index)
            .map(|arg| eval(arg, ctx).into_string())
            .unwrap_or_else(|| string_value(&ctx.item))
    };

    match function {
        Function::Position => Value::Number(ctx.position as f64),
        Function::Last => Value::Number(ctx.size as f64),
        Function::Not => Value::Bool(!args.first().is_some_and(|arg| eval(arg, ctx).truthy())),
        Function::Contains => Value::Bool(string_arg(0).contains(string_arg(1).as_str())),
        Function::StartsWith => Value::Bool(string_arg(0).starts_with(string_arg(1).as_str())),
        Function::NormalizeSpace => {
            Value::Str(string_arg(0).split_whitespace().collect::<Vec<_>>().join(" "))
        }
        Function::StringLength => Value::Number(string_arg(0).chars().count() as f64),
        Function::Name => Value::Str(match ctx.item {
            Item::Tree(node) => node
                .value()
                .as_element()
                .map(|element| element.name().to_string())
                .unwrap_or_default(),
            Item::Attribute { name, .. } => name.to_string(),
        }),
        Function::True => Value::Bool(true),
        Function::False => Value::Bool(false),
    }
}

/// XPath 1.0 comparison: node-sets compare existentially, booleans win for
/// `=`/`!=`, then numbers, then strings
fn compare(lhs: &Value, op: CmpOp, rhs: &Value) -> bool {
    let equality = matches!(op, CmpOp::Eq | CmpOp::NotEq);
    if equality && (matches!(lhs, Value::Bool(_)) || matches!(rhs, Value::Bool(_))) {
        let equal = lhs.truthy() == rhs.truthy();
        return if op == CmpOp::Eq { equal } else { !equal };
    }

    let right = rhs.atoms();
    lhs.atoms()
        .iter()
        .any(|l| right.iter().any(|r| compare_atoms(l, op, r)))
}

fn compare_atoms(lhs: &Atom<'_>, op: CmpOp, rhs: &Atom<'_>) -> bool {
    match op {
        CmpOp::Eq | CmpOp::NotEq => {
            let equal = match (lhs, rhs) {
                (Atom::Text(l), Atom::Text(r)) => l == r,
                _ => lhs.number() == rhs.number(),
            };
            if op == CmpOp::Eq {
                equal
            } else {
                !equal
            }
        }
        CmpOp::Lt => lhs.number() < rhs.number(),
        CmpOp::LtEq => lhs.number() <= rhs.number(),
        CmpOp::Gt => lhs.number() > rhs.number(),
        CmpOp::GtEq => lhs.number() >= rhs.number(),
    }
}
