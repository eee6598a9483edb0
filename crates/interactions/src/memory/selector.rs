//! A small CSS selector matcher.
//!
//! Supports selector lists (`,`), the descendant combinator, type and
//! universal selectors, `.class`, `#id` and attribute tests
//! (`[a]`, `[a=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`). Other combinators and
//! pseudo-classes are rejected.

use std::fmt;

use foundation::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    Empty,
    Unexpected { found: char, at: usize },
    Unterminated(&'static str),
    Unsupported(String),
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorError::Empty => write!(f, "empty selector"),
            SelectorError::Unexpected { found, at } => {
                write!(f, "unexpected `{found}` at offset {at}")
            }
            SelectorError::Unterminated(what) => write!(f, "unterminated {what}"),
            SelectorError::Unsupported(what) => write!(f, "unsupported selector syntax: {what}"),
        }
    }
}

impl std::error::Error for SelectorError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrTest {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

/// Read access to a tree of elements.
pub trait ElementTree {
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn tag(&self, node: NodeId) -> &str;
    fn attr(&self, node: NodeId, name: &str) -> Option<&str>;
    fn has_class(&self, node: NodeId, class: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    // Alternatives of descendant chains, outermost ancestor first.
    alternatives: Vec<Vec<Compound>>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut alternatives = Vec::new();
        for part in split_outside_brackets(input, |c| c == ',')? {
            let mut chain = Vec::new();
            for token in split_outside_brackets(part, char::is_whitespace)? {
                if token.is_empty() {
                    continue;
                }
                chain.push(parse_compound(token)?);
            }
            if chain.is_empty() {
                return Err(SelectorError::Empty);
            }
            alternatives.push(chain);
        }
        Ok(Self { alternatives })
    }

    pub fn matches(&self, tree: &impl ElementTree, node: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|chain| matches_chain(chain, tree, node))
    }
}

fn matches_chain(chain: &[Compound], tree: &impl ElementTree, node: NodeId) -> bool {
    let Some((last, ancestors)) = chain.split_last() else {
        return false;
    };
    if !last.matches(tree, node) {
        return false;
    }
    // Descendant-only chains can be matched greedily, nearest ancestor first.
    let mut current = tree.parent(node);
    for compound in ancestors.iter().rev() {
        loop {
            let Some(candidate) = current else {
                return false;
            };
            current = tree.parent(candidate);
            if compound.matches(tree, candidate) {
                break;
            }
        }
    }
    true
}

impl Compound {
    fn matches(&self, tree: &impl ElementTree, node: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            if !tree.tag(node).eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if self.ids.iter().any(|id| tree.attr(node, "id") != Some(id.as_str())) {
            return false;
        }
        if self.classes.iter().any(|c| !tree.has_class(node, c)) {
            return false;
        }
        self.attrs.iter().all(|test| {
            let Some(value) = tree.attr(node, &test.name) else {
                return false;
            };
            match &test.op {
                AttrOp::Exists => true,
                AttrOp::Equals(v) => value == v,
                // Empty operands never match for the substring forms.
                AttrOp::Prefix(v) => !v.is_empty() && value.starts_with(v.as_str()),
                AttrOp::Suffix(v) => !v.is_empty() && value.ends_with(v.as_str()),
                AttrOp::Contains(v) => !v.is_empty() && value.contains(v.as_str()),
            }
        })
    }
}

/// Splits on `is_sep` while skipping bracketed and quoted text.
fn split_outside_brackets(
    input: &str,
    is_sep: impl Fn(char) -> bool,
) -> Result<Vec<&str>, SelectorError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (i, c) in input.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' if depth > 0 => quote = Some(c),
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(SelectorError::Unexpected { found: c, at: i })?;
            }
            _ if depth == 0 && is_sep(c) => {
                parts.push(input[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err(SelectorError::Unterminated("string"));
    }
    if depth > 0 {
        return Err(SelectorError::Unterminated("attribute selector"));
    }
    parts.push(input[start..].trim());
    Ok(parts)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[(usize, char)], pos: &mut usize) -> Result<String, SelectorError> {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos].1) {
        *pos += 1;
    }
    if *pos == start {
        return Err(match chars.get(start) {
            Some(&(at, found)) => SelectorError::Unexpected { found, at },
            None => SelectorError::Empty,
        });
    }
    Ok(chars[start..*pos].iter().map(|(_, c)| c).collect())
}

fn parse_compound(token: &str) -> Result<Compound, SelectorError> {
    let chars: Vec<(usize, char)> = token.char_indices().collect();
    let mut pos = 0usize;
    let mut compound = Compound::default();

    match chars.first() {
        Some((_, '*')) => pos = 1,
        Some(&(_, c)) if is_ident_char(c) => {
            compound.tag = Some(take_ident(&chars, &mut pos)?.to_ascii_lowercase());
        }
        _ => {}
    }

    while pos < chars.len() {
        let (at, c) = chars[pos];
        pos += 1;
        match c {
            '.' => compound.classes.push(take_ident(&chars, &mut pos)?),
            '#' => compound.ids.push(take_ident(&chars, &mut pos)?),
            '[' => {
                let close = find_closing_bracket(&chars, pos)?;
                let body: String = chars[pos..close].iter().map(|(_, c)| c).collect();
                compound.attrs.push(parse_attr(&body)?);
                pos = close + 1;
            }
            '>' | '+' | '~' => return Err(SelectorError::Unsupported(format!("combinator `{c}`"))),
            ':' => return Err(SelectorError::Unsupported(token[at..].to_string())),
            _ => return Err(SelectorError::Unexpected { found: c, at }),
        }
    }
    Ok(compound)
}

fn find_closing_bracket(chars: &[(usize, char)], from: usize) -> Result<usize, SelectorError> {
    let mut quote: Option<char> = None;
    for (i, &(_, c)) in chars.iter().enumerate().skip(from) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, ']') => return Ok(i),
            _ => {}
        }
    }
    Err(SelectorError::Unterminated("attribute selector"))
}

fn parse_attr(body: &str) -> Result<AttrTest, SelectorError> {
    let Some(eq) = body.find('=') else {
        let name = body.trim();
        if name.is_empty() || !name.chars().all(is_ident_char) {
            return Err(SelectorError::Unsupported(format!("[{body}]")));
        }
        return Ok(AttrTest {
            name: name.to_string(),
            op: AttrOp::Exists,
        });
    };

    let (lhs, rhs) = (&body[..eq], &body[eq + 1..]);
    let (name, op_char) = match lhs.chars().last() {
        Some(c @ ('^' | '$' | '*')) => (&lhs[..lhs.len() - 1], Some(c)),
        Some('|' | '~') => return Err(SelectorError::Unsupported(format!("[{body}]"))),
        _ => (lhs, None),
    };
    let name = name.trim();
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(SelectorError::Unsupported(format!("[{body}]")));
    }

    let rhs = rhs.trim();
    let value = match rhs.chars().next() {
        Some(q @ ('"' | '\'')) => {
            if rhs.len() < 2 || !rhs.ends_with(q) {
                return Err(SelectorError::Unterminated("string"));
            }
            rhs[1..rhs.len() - 1].to_string()
        }
        _ => {
            if rhs.is_empty() || !rhs.chars().all(is_ident_char) {
                return Err(SelectorError::Unsupported(format!("[{body}]")));
            }
            rhs.to_string()
        }
    };

    let op = match op_char {
        None => AttrOp::Equals(value),
        Some('^') => AttrOp::Prefix(value),
        Some('$') => AttrOp::Suffix(value),
        _ => AttrOp::Contains(value),
    };
    Ok(AttrTest {
        name: name.to_string(),
        op,
    })
}
