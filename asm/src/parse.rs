use std::fmt;

use crate::operand::{Address, Base, Index, Operand, Width};

/// Operand syntax:
///
///   5, 5:16      immediate, with optional width tag
///   &name        immediate equal to the symbol's cell number
///   name         symbol (declaration contexts only)
///   @top, @top:16 the value at the top of the simulated stack
///   @5, @name    address with a direct base
///   @a[3]        address with a constant index, folded at assembly time
///   @a[@i]       indirect: index read from cell i at runtime
///   @a[@top]     indirect: index taken from the stack at runtime
///   +-<>[],.     raw machine code (internal instructions only)
///
/// Mnemonics are four characters of letters or underscore, optionally
/// suffixed with widths (`PUSH:16`, `EQLS:8:16:16`). A single suffix applies
/// to every operand; a list applies positionally. Per-operand tags win over
/// the suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub mnemonic: String,
    pub operands: Vec<Operand>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    BadMnemonic(String),
    BadWidth(String),
    BadOperand(String),
    IndexOnTop(String),
    NestedIndirect(String),
    WidthCountMismatch { suffixes: usize, operands: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BadMnemonic(s) => write!(f, "bad mnemonic: {}", s),
            ParseError::BadWidth(s) => write!(f, "bad width: {}", s),
            ParseError::BadOperand(s) => write!(f, "bad operand: {}", s),
            ParseError::IndexOnTop(s) => write!(f, "top operand cannot take an index: {}", s),
            ParseError::NestedIndirect(s) => write!(f, "nested indirect address: {}", s),
            ParseError::WidthCountMismatch { suffixes, operands } => write!(
                f,
                "mnemonic carries {} width tags for {} operands",
                suffixes, operands
            ),
        }
    }
}

const RAW_CHARS: &str = "+-<>[],.";

fn is_raw_run(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| RAW_CHARS.contains(c))
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split a trailing `:width` tag off a token fragment.
fn split_tag(s: &str) -> Result<(&str, Option<Width>), ParseError> {
    match s.find(':') {
        None => Ok((s, None)),
        Some(i) => {
            let tag = &s[i + 1..];
            let bits: u32 = tag.parse().map_err(|_| ParseError::BadWidth(s.to_string()))?;
            let width = Width::from_bits(bits).ok_or_else(|| ParseError::BadWidth(s.to_string()))?;
            Ok((&s[..i], Some(width)))
        }
    }
}

fn parse_base(s: &str, orig: &str) -> Result<Base, ParseError> {
    if s.chars().all(|c| c.is_ascii_digit()) && !s.is_empty() {
        let cell: u64 = s
            .parse()
            .map_err(|_| ParseError::BadOperand(orig.to_string()))?;
        Ok(Base::Cell(cell))
    } else if is_ident(s) && s != "top" {
        Ok(Base::Symbol(s.to_string()))
    } else {
        Err(ParseError::BadOperand(orig.to_string()))
    }
}

fn parse_address(rest: &str, orig: &str) -> Result<Operand, ParseError> {
    let (base_part, index_part) = match rest.find('[') {
        Some(i) => {
            if !rest.ends_with(']') {
                return Err(ParseError::BadOperand(orig.to_string()));
            }
            (&rest[..i], Some(&rest[i + 1..rest.len() - 1]))
        }
        None => (rest, None),
    };

    let (base_str, base_width) = split_tag(base_part)?;
    let base = parse_base(base_str, orig)?;

    let index = match index_part {
        None => Index::Const {
            value: 0,
            width: Width::W8,
        },
        Some("@top") => Index::Top,
        Some(s) if s.starts_with('@') => {
            let inner = &s[1..];
            if inner.contains('[') || inner.contains('@') {
                return Err(ParseError::NestedIndirect(orig.to_string()));
            }
            let (istr, iw) = split_tag(inner)?;
            Index::Cell {
                base: parse_base(istr, orig)?,
                width: iw.unwrap_or_default(),
            }
        }
        Some(s) => {
            let (istr, iw) = split_tag(s)?;
            if istr.chars().all(|c| c.is_ascii_digit()) && !istr.is_empty() {
                Index::Const {
                    value: istr
                        .parse()
                        .map_err(|_| ParseError::BadOperand(orig.to_string()))?,
                    width: iw.unwrap_or_default(),
                }
            } else {
                return Err(ParseError::BadOperand(orig.to_string()));
            }
        }
    };

    Ok(Operand::Address(Address {
        base,
        width: base_width.unwrap_or_default(),
        index,
    }))
}

/// Parse one operand token. The second half of the result marks whether the
/// token carried its own width tag (those are exempt from mnemonic-suffix
/// broadcast).
fn parse_operand(tok: &str) -> Result<(Operand, bool), ParseError> {
    if let Some(rest) = tok.strip_prefix('@') {
        if rest == "top" {
            return Ok((Operand::Top { width: Width::W8 }, false));
        }
        if let Some(tag) = rest.strip_prefix("top:") {
            let bits: u32 = tag
                .parse()
                .map_err(|_| ParseError::BadWidth(tok.to_string()))?;
            let width =
                Width::from_bits(bits).ok_or_else(|| ParseError::BadWidth(tok.to_string()))?;
            return Ok((Operand::Top { width }, true));
        }
        if rest.starts_with("top[") {
            return Err(ParseError::IndexOnTop(tok.to_string()));
        }
        let tagged = rest.split('[').next().unwrap_or(rest).contains(':');
        return Ok((parse_address(rest, tok)?, tagged));
    }

    if let Some(rest) = tok.strip_prefix('&') {
        let (name, width) = split_tag(rest)?;
        if !is_ident(name) || name == "top" {
            return Err(ParseError::BadOperand(tok.to_string()));
        }
        return Ok((
            Operand::AddressOf {
                name: name.to_string(),
                width: width.unwrap_or_default(),
            },
            width.is_some(),
        ));
    }

    let first = tok.chars().next().unwrap_or(' ');
    if first.is_ascii_digit() || first == '-' {
        let (num, width) = split_tag(tok)?;
        let value: i64 = num
            .parse()
            .map_err(|_| ParseError::BadOperand(tok.to_string()))?;
        return Ok((
            Operand::Immediate {
                value,
                width: width.unwrap_or_default(),
            },
            width.is_some(),
        ));
    }

    let (name, width) = split_tag(tok)?;
    if is_ident(name) && name != "top" {
        return Ok((
            Operand::Symbol {
                name: name.to_string(),
                width: width.unwrap_or_default(),
            },
            width.is_some(),
        ));
    }

    Err(ParseError::BadOperand(tok.to_string()))
}

/// Parse one source line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Line>, ParseError> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let head = tokens[0];
    let mut parts = head.split(':');
    let name = parts.next().unwrap_or("");
    if name.len() != 4 || !name.chars().all(|c| c.is_ascii_alphabetic() || c == '_') {
        return Err(ParseError::BadMnemonic(head.to_string()));
    }
    let mut suffixes = Vec::new();
    for p in parts {
        let bits: u32 = p
            .parse()
            .map_err(|_| ParseError::BadWidth(head.to_string()))?;
        suffixes.push(Width::from_bits(bits).ok_or_else(|| ParseError::BadWidth(head.to_string()))?);
    }

    // raw machine code: every remaining token must be a run of the eight
    // primitive characters; they join into a single operand
    let mut operands: Vec<(Operand, bool)> = Vec::new();
    if tokens.len() > 1 && is_raw_run(tokens[1]) {
        let mut text = String::new();
        for tok in &tokens[1..] {
            if !is_raw_run(tok) {
                return Err(ParseError::BadOperand(tok.to_string()));
            }
            text.push_str(tok);
        }
        operands.push((Operand::Raw(text), true));
    } else {
        for tok in &tokens[1..] {
            operands.push(parse_operand(tok)?);
        }
    }

    // broadcast mnemonic suffixes onto untagged operands
    if suffixes.len() == 1 {
        for (op, tagged) in operands.iter_mut() {
            if !*tagged {
                op.set_width(suffixes[0]);
            }
        }
    } else if !suffixes.is_empty() {
        if suffixes.len() != operands.len() {
            return Err(ParseError::WidthCountMismatch {
                suffixes: suffixes.len(),
                operands: operands.len(),
            });
        }
        for ((op, tagged), w) in operands.iter_mut().zip(&suffixes) {
            if !*tagged {
                op.set_width(*w);
            }
        }
    }

    // all-8 suffixes collapse to the bare name, all-16 to NAME:16, and a
    // mixed list keeps the full spelling as its own dispatch key
    let mnemonic = if suffixes.is_empty() || suffixes.iter().all(|w| *w == Width::W8) {
        name.to_string()
    } else if suffixes.iter().all(|w| *w == Width::W16) {
        format!("{}:16", name)
    } else {
        head.to_string()
    };

    Ok(Some(Line {
        mnemonic,
        operands: operands.into_iter().map(|(op, _)| op).collect(),
    }))
}
