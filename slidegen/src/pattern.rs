//! A deliberately small text pattern language.
//!
//! Patterns consist of literal text, `{{ name }}` placeholders and at most
//! one level of conditional blocks:
//!
//! ```text
//! {{ city }} supply {% if growth > 0 %}rose{% else %}fell{% endif %} by {{ growth }}%.
//! ```
//!
//! Conditions support variable names, numbers, quoted strings, `true`,
//! `false` and `none` as operands, the comparisons `== != < <= > >=`, and
//! `not`, `and` and `or`, where `and` binds tighter than `or`.
//!
//! Markup such as `**bold**` is literal text here.

use std::cmp::Ordering;

use crate::{Error, Map, Value};

/// A parsed text pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    source: String,
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Literal(String),
    Placeholder(String),
    Conditional {
        condition: Expr,
        then_branch: Vec<Node>,
        else_branch: Vec<Node>,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Operand(Operand),
    Compare(Operand, CmpOp, Operand),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Variable(String),
    Literal(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Pattern {
    /// Parses the given source text.
    pub fn parse<S: AsRef<str>>(source: S) -> Result<Self, Error> {
        let source = source.as_ref();
        let nodes = Parser::new(source).parse()?;
        Ok(Self {
            source: source.to_string(),
            nodes,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names of all variables referenced anywhere in the pattern, in source
    /// order, including both branches of conditionals.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_nodes(&self.nodes, &mut names);
        names
    }

    /// Renders the pattern. Either every referenced variable is available
    /// and the full text is returned, or nothing is.
    pub fn render(&self, variables: &Map<String, Value>) -> Result<String, Error> {
        if let Some(missing) = self
            .variables()
            .into_iter()
            .find(|name| !variables.contains_key(*name))
        {
            return Err(Error::MissingVariable(missing.to_string()));
        }
        let mut out = String::with_capacity(self.source.len());
        render_nodes(&self.nodes, variables, &mut out)?;
        Ok(out)
    }
}

fn collect_nodes<'a>(nodes: &'a [Node], names: &mut Vec<&'a str>) {
    for node in nodes {
        match node {
            Node::Literal(_) => {}
            Node::Placeholder(name) => names.push(name),
            Node::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                collect_expr(condition, names);
                collect_nodes(then_branch, names);
                collect_nodes(else_branch, names);
            }
        }
    }
}

fn collect_expr<'a>(expr: &'a Expr, names: &mut Vec<&'a str>) {
    let mut operand = |o: &'a Operand| {
        if let Operand::Variable(name) = o {
            names.push(name);
        }
    };
    match expr {
        Expr::Operand(o) => operand(o),
        Expr::Compare(a, _, b) => {
            operand(a);
            operand(b);
        }
        Expr::Not(inner) => collect_expr(inner, names),
        Expr::And(a, b) | Expr::Or(a, b) => {
            collect_expr(a, names);
            collect_expr(b, names);
        }
    }
}

fn render_nodes(nodes: &[Node], variables: &Map<String, Value>, out: &mut String) -> Result<(), Error> {
    for node in nodes {
        match node {
            Node::Literal(text) => out.push_str(text),
            Node::Placeholder(name) => out.push_str(&lookup(name, variables)?.to_string()),
            Node::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                let branch = if evaluate(condition, variables)? {
                    then_branch
                } else {
                    else_branch
                };
                render_nodes(branch, variables, out)?;
            }
        }
    }
    Ok(())
}

fn lookup<'a>(name: &str, variables: &'a Map<String, Value>) -> Result<&'a Value, Error> {
    variables
        .get(name)
        .ok_or_else(|| Error::MissingVariable(name.to_string()))
}

fn evaluate(expr: &Expr, variables: &Map<String, Value>) -> Result<bool, Error> {
    Ok(match expr {
        Expr::Operand(o) => operand_value(o, variables)?.is_truthy(),
        Expr::Compare(a, op, b) => {
            let a = operand_value(a, variables)?;
            let b = operand_value(b, variables)?;
            compare(a, *op, b)?
        }
        Expr::Not(inner) => !evaluate(inner, variables)?,
        Expr::And(a, b) => evaluate(a, variables)? && evaluate(b, variables)?,
        Expr::Or(a, b) => evaluate(a, variables)? || evaluate(b, variables)?,
    })
}

fn operand_value<'a>(o: &'a Operand, variables: &'a Map<String, Value>) -> Result<&'a Value, Error> {
    match o {
        Operand::Variable(name) => lookup(name, variables),
        Operand::Literal(v) => Ok(v),
    }
}

fn compare(a: &Value, op: CmpOp, b: &Value) -> Result<bool, Error> {
    match op {
        CmpOp::Eq => return Ok(a.loose_eq(b)),
        CmpOp::Ne => return Ok(!a.loose_eq(b)),
        _ => {}
    }
    let ordering = a.partial_order(b).ok_or_else(|| {
        Error::config(format!(
            "cannot order {} \"{}\" against {} \"{}\"",
            a.type_name(),
            a,
            b.type_name(),
            b
        ))
    })?;
    Ok(op.accepts(ordering))
}

impl CmpOp {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Gt => ordering == Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
        }
    }
}

/// Splits the source into literal text and tags, assembling the node tree.
struct Parser<'a> {
    source: &'a str,
    rest: &'a str,
}

enum Tag<'a> {
    Placeholder(&'a str),
    Block(&'a str),
}

/// An `if` block whose `endif` has not been seen yet.
struct OpenBlock {
    condition: Expr,
    then_branch: Vec<Node>,
    else_branch: Option<Vec<Node>>,
}

impl OpenBlock {
    fn current(&mut self) -> &mut Vec<Node> {
        match &mut self.else_branch {
            Some(branch) => branch,
            None => &mut self.then_branch,
        }
    }
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            rest: source,
        }
    }

    fn error<R: Into<String>>(&self, reason: R) -> Error {
        Error::PatternSyntax {
            pattern: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn parse(mut self) -> Result<Vec<Node>, Error> {
        let mut nodes = Vec::new();
        let mut open: Option<OpenBlock> = None;
        loop {
            let (literal, tag) = self.next_tag()?;
            if !literal.is_empty() {
                let target = match open.as_mut() {
                    Some(block) => block.current(),
                    None => &mut nodes,
                };
                target.push(Node::Literal(literal.to_string()));
            }
            let tag = match tag {
                Some(tag) => tag,
                None => break,
            };
            match tag {
                Tag::Placeholder(inner) => {
                    let name = inner.trim();
                    if !is_identifier(name) {
                        return Err(self.error(format!("invalid variable name \"{}\"", name)));
                    }
                    let target = match open.as_mut() {
                        Some(block) => block.current(),
                        None => &mut nodes,
                    };
                    target.push(Node::Placeholder(name.to_string()));
                }
                Tag::Block(inner) => {
                    let inner = inner.trim();
                    let (keyword, rest) = match inner.find(char::is_whitespace) {
                        Some(pos) => (&inner[..pos], inner[pos..].trim()),
                        None => (inner, ""),
                    };
                    match (keyword, open.take()) {
                        ("if", Some(_)) => {
                            return Err(self.error("nested conditional blocks are not supported"))
                        }
                        ("if", None) => {
                            if rest.is_empty() {
                                return Err(self.error("\"if\" requires a condition"));
                            }
                            open = Some(OpenBlock {
                                condition: self.parse_expr(rest)?,
                                then_branch: Vec::new(),
                                else_branch: None,
                            });
                        }
                        ("else", Some(mut block)) if rest.is_empty() => {
                            if block.else_branch.is_some() {
                                return Err(self.error("duplicate \"else\" in conditional block"));
                            }
                            block.else_branch = Some(Vec::new());
                            open = Some(block);
                        }
                        ("endif", Some(block)) if rest.is_empty() => {
                            nodes.push(Node::Conditional {
                                condition: block.condition,
                                then_branch: block.then_branch,
                                else_branch: block.else_branch.unwrap_or_default(),
                            });
                        }
                        ("else", None) | ("endif", None) => {
                            return Err(self.error(format!(
                                "\"{}\" without a matching \"if\"",
                                keyword
                            )))
                        }
                        _ => return Err(self.error(format!("unsupported block tag \"{}\"", inner))),
                    }
                }
            }
        }
        if open.is_some() {
            return Err(self.error("unterminated \"if\" block"));
        }
        Ok(nodes)
    }

    /// Returns the literal text before the next tag, and the tag itself.
    fn next_tag(&mut self) -> Result<(&'a str, Option<Tag<'a>>), Error> {
        let rest = self.rest;
        let start = match (rest.find("{{"), rest.find("{%")) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => {
                self.rest = "";
                return Ok((rest, None));
            }
        };
        let literal = &rest[..start];
        let is_block = rest[start..].starts_with("{%");
        let close = if is_block { "%}" } else { "}}" };
        let body = &rest[start + 2..];
        let end = body
            .find(close)
            .ok_or_else(|| self.error(format!("unclosed tag, expected \"{}\"", close)))?;
        let inner = &body[..end];
        self.rest = &body[end + 2..];
        let tag = if is_block {
            Tag::Block(inner)
        } else {
            Tag::Placeholder(inner)
        };
        Ok((literal, Some(tag)))
    }

    fn parse_expr(&self, source: &str) -> Result<Expr, Error> {
        let tokens = tokenize(source).map_err(|reason| self.error(reason))?;
        let mut stream = TokenStream { tokens, pos: 0 };
        let expr = stream.or_expr().map_err(|reason| self.error(reason))?;
        if stream.pos != stream.tokens.len() {
            return Err(self.error(format!("unexpected trailing input in condition \"{}\"", source)));
        }
        Ok(expr)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Literal(Value),
    Op(CmpOp),
    Not,
    And,
    Or,
}

fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();
    while let Some(&(i, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' || c == '\'' {
            chars.next();
            let mut s = String::new();
            let mut closed = false;
            for (_, ch) in chars.by_ref() {
                if ch == c {
                    closed = true;
                    break;
                }
                s.push(ch);
            }
            if !closed {
                return Err(format!("unterminated string literal in \"{}\"", source));
            }
            tokens.push(Token::Literal(Value::String(s)));
        } else if c.is_ascii_digit() || (c == '-' && source[i + 1..].starts_with(|d: char| d.is_ascii_digit())) {
            let mut end = i + c.len_utf8();
            chars.next();
            while let Some(&(j, d)) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    end = j + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let text = &source[i..end];
            let value = match text.parse::<i64>() {
                Ok(n) => Value::Signed(n),
                Err(_) => Value::Float(
                    text.parse::<f64>()
                        .map_err(|_| format!("invalid number \"{}\"", text))?,
                ),
            };
            tokens.push(Token::Literal(value));
        } else if "=!<>".contains(c) {
            chars.next();
            let followed_by_eq = matches!(chars.peek(), Some(&(_, '=')));
            if followed_by_eq {
                chars.next();
            }
            let op = match (c, followed_by_eq) {
                ('=', true) => CmpOp::Eq,
                ('!', true) => CmpOp::Ne,
                ('<', false) => CmpOp::Lt,
                ('<', true) => CmpOp::Le,
                ('>', false) => CmpOp::Gt,
                ('>', true) => CmpOp::Ge,
                _ => return Err(format!("invalid operator in \"{}\"", source)),
            };
            tokens.push(Token::Op(op));
        } else if c.is_alphabetic() || c == '_' {
            let mut end = i;
            while let Some(&(j, d)) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    end = j + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(match &source[i..end] {
                "not" => Token::Not,
                "and" => Token::And,
                "or" => Token::Or,
                "true" => Token::Literal(Value::Bool(true)),
                "false" => Token::Literal(Value::Bool(false)),
                "none" => Token::Literal(Value::Null),
                word => Token::Ident(word.to_string()),
            });
        } else {
            return Err(format!("unexpected character '{}' in \"{}\"", c, source));
        }
    }
    Ok(tokens)
}

struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn or_expr(&mut self) -> Result<Expr, String> {
        let mut expr = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.next();
            expr = Expr::Or(Box::new(expr), Box::new(self.and_expr()?));
        }
        Ok(expr)
    }

    fn and_expr(&mut self) -> Result<Expr, String> {
        let mut expr = self.unary()?;
        while self.peek() == Some(&Token::And) {
            self.next();
            expr = Expr::And(Box::new(expr), Box::new(self.unary()?));
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, String> {
        if self.peek() == Some(&Token::Not) {
            self.next();
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        let left = self.operand()?;
        if let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            self.next();
            let right = self.operand()?;
            return Ok(Expr::Compare(left, op, right));
        }
        Ok(Expr::Operand(left))
    }

    fn operand(&mut self) -> Result<Operand, String> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(Operand::Variable(name)),
            Some(Token::Literal(value)) => Ok(Operand::Literal(value)),
            Some(other) => Err(format!("expected a variable or literal, found {:?}", other)),
            None => Err("condition ends unexpectedly".to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn vars(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn substitutes_placeholders() {
        let p = Pattern::parse("{{city}}-{{ block }}").unwrap();
        let v = vars(&[("city", "Beijing".into()), ("block", "Liangxiang".into())]);
        assert_eq!(p.render(&v).unwrap(), "Beijing-Liangxiang");
    }

    #[test]
    fn missing_variable_is_named() {
        let p = Pattern::parse("{{city}}-{{block}}").unwrap();
        let v = vars(&[("city", "Beijing".into())]);
        match p.render(&v) {
            Err(Error::MissingVariable(name)) => assert_eq!(name, "block"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_variable_in_untaken_branch_still_fails() {
        let p = Pattern::parse("{% if up %}rose {{ pct }}%{% else %}flat{% endif %}").unwrap();
        let v = vars(&[("up", false.into())]);
        assert!(matches!(p.render(&v), Err(Error::MissingVariable(n)) if n == "pct"));
        let v = vars(&[("pct", 3.into())]);
        assert!(matches!(p.render(&v), Err(Error::MissingVariable(n)) if n == "up"));
    }

    #[test]
    fn selects_exactly_one_branch() {
        let p = Pattern::parse(
            "Supply {% if growth > 0 and city == \"Beijing\" %}rose by **{{growth}}%**{% else %}did not rise{% endif %}.",
        )
        .unwrap();
        let up = vars(&[("growth", 12.5.into()), ("city", "Beijing".into())]);
        assert_eq!(p.render(&up).unwrap(), "Supply rose by **12.5%**.");
        let down = vars(&[("growth", (-3).into()), ("city", "Beijing".into())]);
        assert_eq!(p.render(&down).unwrap(), "Supply did not rise.");
    }

    #[test]
    fn conditions_without_else_render_nothing_when_false() {
        let p = Pattern::parse("a{% if not flag %}b{% endif %}c").unwrap();
        assert_eq!(p.render(&vars(&[("flag", true.into())])).unwrap(), "ac");
        assert_eq!(p.render(&vars(&[("flag", Value::Null)])).unwrap(), "abc");
    }

    #[test]
    fn operator_precedence() {
        let p = Pattern::parse("{% if a or b and c %}yes{% else %}no{% endif %}").unwrap();
        let v = vars(&[("a", true.into()), ("b", false.into()), ("c", false.into())]);
        assert_eq!(p.render(&v).unwrap(), "yes");
        let v = vars(&[("a", false.into()), ("b", true.into()), ("c", false.into())]);
        assert_eq!(p.render(&v).unwrap(), "no");
    }

    #[test]
    fn mismatched_ordering_is_config_error() {
        let p = Pattern::parse("{% if year >= 2020 %}recent{% endif %}").unwrap();
        let v = vars(&[("year", "twenty".into())]);
        assert!(matches!(p.render(&v), Err(Error::Config(_))));
        let v = vars(&[("year", 2021.into())]);
        assert_eq!(p.render(&v).unwrap(), "recent");
    }

    #[test]
    fn rendering_is_idempotent() {
        let p = Pattern::parse("{{a}} {% if b != 'x' %}{{b}}{% endif %}").unwrap();
        let v = vars(&[("a", 1.5.into()), ("b", "y".into())]);
        assert_eq!(p.render(&v).unwrap(), p.render(&v).unwrap());
    }

    #[test]
    fn lists_referenced_variables_in_order() {
        let p = Pattern::parse("{{a}}{% if b > c %}{{d}}{% else %}{{e}}{% endif %}").unwrap();
        assert_eq!(p.variables(), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn syntax_errors() {
        const BAD: &[&str] = &[
            "{{ unclosed",
            "{{ two words }}",
            "{% if a %}{% if b %}x{% endif %}{% endif %}",
            "{% if a %}never closed",
            "{% else %}",
            "{% endif %}",
            "{% if %}x{% endif %}",
            "{% if a == %}x{% endif %}",
            "{% if a %}x{% else %}y{% else %}z{% endif %}",
            "{% for x in y %}{% endfor %}",
            "{% if 'open %}x{% endif %}",
        ];
        for source in BAD {
            assert!(
                matches!(Pattern::parse(source), Err(Error::PatternSyntax { .. })),
                "expected syntax error for {}",
                source
            );
        }
    }

    #[test]
    fn single_braces_are_literal() {
        let p = Pattern::parse("{x} and %} stay").unwrap();
        assert_eq!(p.render(&Map::new()).unwrap(), "{x} and %} stay");
    }
}
