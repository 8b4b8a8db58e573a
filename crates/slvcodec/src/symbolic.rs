//! A symbolic arithmetic engine: integer expressions over unresolved names
//! (component A of the design). Expressions are parsed from HDL source
//! text, simplified by the ring laws, substituted, and evaluated.
//!
//! The five-pass parse pipeline (parenthesize, multiplication,
//! multiplication-simplify, addition, addition-simplify) mirrors the
//! reference implementation's duck-typed traversal, collapsed here into
//! total `match` arms over a sealed `Expr` enum.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Result, SlvError};

/// A sum-of-products expression over integer literals and free names.
///
/// `Raw` only ever appears transiently while parsing a token stream; no
/// simplified expression contains one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Int(i64),
    Name(String),
    /// Product of numerators divided by product of denominators.
    Mul { num: Vec<Expr>, den: Vec<Expr> },
    /// Signed sum of terms, each `(coefficient, expression)`.
    Add(Vec<(i64, Expr)>),
    /// Transient token stream used only during parsing.
    Raw(Vec<RawItem>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawItem {
    Op(char),
    Value(Expr),
}

impl Expr {
    pub fn int(n: i64) -> Self {
        Expr::Int(n)
    }

    pub fn name(s: impl Into<String>) -> Self {
        Expr::Name(s.into())
    }
}

// ---------------------------------------------------------------------
// Lexing
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum LexTok {
    Op(char),
    Operand(String),
}

const OPS: &[char] = &['(', ')', '+', '-', '*', '/'];

fn lex(s: &str) -> Result<Vec<LexTok>> {
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    let mut toks = Vec::new();
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if OPS.contains(&c) {
            toks.push(LexTok::Op(c));
            i += 1;
        } else if c.is_alphanumeric() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            toks.push(LexTok::Operand(chars[start..i].iter().collect()));
        } else {
            return Err(SlvError::ParseError(format!(
                "unexpected character `{c}` in expression `{s}`"
            )));
        }
    }
    Ok(toks)
}

fn classify_operand(s: &str) -> Expr {
    match s.parse::<i64>() {
        Ok(n) => Expr::Int(n),
        Err(_) => Expr::Name(s.to_string()),
    }
}

fn items_to_expr(items: Vec<RawItem>) -> Expr {
    if items.len() == 1 {
        match items.into_iter().next().unwrap() {
            RawItem::Value(e) => e,
            op @ RawItem::Op(_) => Expr::Raw(vec![op]),
        }
    } else {
        Expr::Raw(items)
    }
}

/// Pass 1: scan left to right, replacing each balanced `(...)` span with a
/// sub-expression. Unbalanced parentheses fail with `ParseError`.
fn parse_parentheses(tokens: &[LexTok]) -> Result<Expr> {
    let mut stack: Vec<Vec<RawItem>> = vec![Vec::new()];
    for tok in tokens {
        match tok {
            LexTok::Op('(') => stack.push(Vec::new()),
            LexTok::Op(')') => {
                if stack.len() == 1 {
                    return Err(SlvError::ParseError(
                        "unbalanced parentheses: more closing than opening".into(),
                    ));
                }
                let finished = stack.pop().expect("checked len above");
                let sub = items_to_expr(finished);
                stack.last_mut().expect("non-empty").push(RawItem::Value(sub));
            }
            LexTok::Op(c) => stack.last_mut().expect("non-empty").push(RawItem::Op(*c)),
            LexTok::Operand(s) => stack
                .last_mut()
                .expect("non-empty")
                .push(RawItem::Value(classify_operand(s))),
        }
    }
    if stack.len() != 1 {
        return Err(SlvError::ParseError(
            "unbalanced parentheses: not all braces closed".into(),
        ));
    }
    Ok(items_to_expr(stack.pop().expect("checked len above")))
}

// ---------------------------------------------------------------------
// Pass 2/3: multiplication
// ---------------------------------------------------------------------

fn mul_from_span(span: Vec<RawItem>) -> Result<Expr> {
    if span.len() % 2 == 0 || span.len() < 3 {
        return Err(SlvError::ParseError(
            "malformed multiplication: expected operand/operator alternation".into(),
        ));
    }
    let mut iter = span.into_iter();
    let first = match iter.next() {
        Some(RawItem::Value(v)) => v,
        _ => return Err(SlvError::ParseError("expected operand before `*`/`/`".into())),
    };
    let mut num = vec![first];
    let mut den = Vec::new();
    loop {
        let op = match iter.next() {
            Some(RawItem::Op(c)) => c,
            Some(RawItem::Value(_)) => {
                return Err(SlvError::ParseError("missing operator between operands".into()));
            }
            None => break,
        };
        let val = match iter.next() {
            Some(RawItem::Value(v)) => v,
            _ => return Err(SlvError::ParseError("expected operand after operator".into())),
        };
        match op {
            '*' => num.push(val),
            '/' => den.push(val),
            other => {
                return Err(SlvError::ParseError(format!(
                    "invalid operator `{other}` inside a multiplication span"
                )));
            }
        }
    }
    Ok(Expr::Mul { num, den })
}

fn finish_span(span: Vec<RawItem>, out: &mut Vec<RawItem>) -> Result<()> {
    if span.is_empty() {
        return Ok(());
    }
    let has_mul_div = span
        .iter()
        .any(|it| matches!(it, RawItem::Op('*') | RawItem::Op('/')));
    if has_mul_div {
        out.push(RawItem::Value(mul_from_span(span)?));
    } else {
        out.extend(span);
    }
    Ok(())
}

/// Pass 2: split by `+`/`-`; each span of alternating `x op y op ...`
/// operands with `op` in `{*, /}` becomes one `Mul`.
pub fn parse_multiplication(e: Expr) -> Result<Expr> {
    match e {
        Expr::Raw(items) => {
            let items = items
                .into_iter()
                .map(|it| match it {
                    RawItem::Op(c) => Ok(RawItem::Op(c)),
                    RawItem::Value(v) => Ok(RawItem::Value(parse_multiplication(v)?)),
                })
                .collect::<Result<Vec<_>>>()?;
            let mut out = Vec::new();
            let mut span = Vec::new();
            for it in items {
                match it {
                    RawItem::Op('+') | RawItem::Op('-') => {
                        finish_span(std::mem::take(&mut span), &mut out)?;
                        out.push(it);
                    }
                    other => span.push(other),
                }
            }
            finish_span(span, &mut out)?;
            Ok(items_to_expr(out))
        }
        Expr::Mul { num, den } => Ok(Expr::Mul {
            num: num
                .into_iter()
                .map(parse_multiplication)
                .collect::<Result<_>>()?,
            den: den
                .into_iter()
                .map(parse_multiplication)
                .collect::<Result<_>>()?,
        }),
        Expr::Add(terms) => Ok(Expr::Add(
            terms
                .into_iter()
                .map(|(c, t)| Ok((c, parse_multiplication(t)?)))
                .collect::<Result<_>>()?,
        )),
        leaf => Ok(leaf),
    }
}

/// A canonical, order-independent serialization of an expression, used to
/// compare operands for structural equality when cancelling `Mul` factors
/// or merging `Add` terms (spec's design notes on multiset handling).
fn canonical_key(e: &Expr) -> String {
    match e {
        Expr::Int(n) => format!("I{n}"),
        Expr::Name(s) => format!("N{s}"),
        Expr::Mul { num, den } => {
            let mut ns: Vec<String> = num.iter().map(canonical_key).collect();
            ns.sort();
            let mut ds: Vec<String> = den.iter().map(canonical_key).collect();
            ds.sort();
            format!("M[{}][{}]", ns.join(","), ds.join(","))
        }
        Expr::Add(terms) => {
            let mut ts: Vec<String> = terms
                .iter()
                .map(|(c, t)| format!("{c}*{}", canonical_key(t)))
                .collect();
            ts.sort();
            format!("A[{}]", ts.join(","))
        }
        Expr::Raw(_) => "RAW".to_string(),
    }
}

/// Counts of structurally-equal expressions, keyed canonically, preserving
/// one representative value per key (multiset semantics, per spec §9).
fn multiset_counts(items: Vec<Expr>) -> Vec<(usize, Expr)> {
    let mut counts: Vec<(String, usize, Expr)> = Vec::new();
    for e in items {
        let key = canonical_key(&e);
        if let Some(entry) = counts.iter_mut().find(|(k, _, _)| *k == key) {
            entry.1 += 1;
        } else {
            counts.push((key, 1, e));
        }
    }
    counts.into_iter().map(|(_, c, e)| (c, e)).collect()
}

fn cancel(num: Vec<Expr>, den: Vec<Expr>) -> (i64, Vec<Expr>, i64, Vec<Expr>) {
    let mut num_counts = multiset_counts(num);
    let mut den_counts = multiset_counts(den);
    for (nc, ne) in num_counts.iter_mut() {
        let nkey = canonical_key(ne);
        if let Some((dc, _)) = den_counts.iter_mut().find(|(_, de)| canonical_key(de) == nkey) {
            let cancelled = (*nc).min(*dc);
            *nc -= cancelled;
            *dc -= cancelled;
        }
    }
    let mut num_int = 1i64;
    let mut num_rest = Vec::new();
    for (count, e) in num_counts {
        if count == 0 {
            continue;
        }
        if let Expr::Int(n) = e {
            num_int *= n.pow(count as u32);
        } else {
            for _ in 0..count {
                num_rest.push(e.clone());
            }
        }
    }
    let mut den_int = 1i64;
    let mut den_rest = Vec::new();
    for (count, e) in den_counts {
        if count == 0 {
            continue;
        }
        if let Expr::Int(n) = e {
            den_int *= n.pow(count as u32);
        } else {
            for _ in 0..count {
                den_rest.push(e.clone());
            }
        }
    }
    num_rest.sort_by_key(canonical_key);
    den_rest.sort_by_key(canonical_key);
    (num_int, num_rest, den_int, den_rest)
}

/// Pass 3: recursively flatten nested `Mul`, cancel common factors, and
/// fold integer literals into one numerator and one denominator integer.
pub fn simplify_multiplication(e: Expr) -> Result<Expr> {
    match e {
        Expr::Mul { num, den } => {
            let num: Vec<Expr> = num
                .into_iter()
                .map(simplify_multiplication)
                .collect::<Result<_>>()?;
            let den: Vec<Expr> = den
                .into_iter()
                .map(simplify_multiplication)
                .collect::<Result<_>>()?;

            let mut flat_num = Vec::new();
            let mut flat_den = Vec::new();
            for x in num {
                match x {
                    Expr::Mul { num: n2, den: d2 } => {
                        flat_num.extend(n2);
                        flat_den.extend(d2);
                    }
                    other => flat_num.push(other),
                }
            }
            for x in den {
                match x {
                    Expr::Mul { num: n2, den: d2 } => {
                        // dividing by (n2/d2) multiplies by d2/n2.
                        flat_num.extend(d2);
                        flat_den.extend(n2);
                    }
                    other => flat_den.push(other),
                }
            }

            let (num_int, num_rest, den_int, den_rest) = cancel(flat_num, flat_den);

            if num_int == 0 {
                return Ok(Expr::Int(0));
            }
            if num_rest.is_empty() && den_rest.is_empty() && den_int == 1 {
                return Ok(Expr::Int(num_int));
            }

            let mut num_final = num_rest;
            if num_int != 1 {
                num_final.push(Expr::Int(num_int));
            }
            num_final.sort_by_key(canonical_key);
            let mut den_final = den_rest;
            if den_int != 1 {
                den_final.push(Expr::Int(den_int));
            }
            den_final.sort_by_key(canonical_key);

            if den_final.is_empty() && num_final.len() == 1 {
                Ok(num_final.into_iter().next().unwrap())
            } else {
                Ok(Expr::Mul {
                    num: num_final,
                    den: den_final,
                })
            }
        }
        Expr::Add(terms) => Ok(Expr::Add(
            terms
                .into_iter()
                .map(|(c, t)| Ok((c, simplify_multiplication(t)?)))
                .collect::<Result<_>>()?,
        )),
        Expr::Raw(items) => Ok(Expr::Raw(
            items
                .into_iter()
                .map(|it| match it {
                    RawItem::Op(c) => Ok(RawItem::Op(c)),
                    RawItem::Value(v) => Ok(RawItem::Value(simplify_multiplication(v)?)),
                })
                .collect::<Result<_>>()?,
        )),
        leaf => Ok(leaf),
    }
}

// ---------------------------------------------------------------------
// Pass 4/5: addition
// ---------------------------------------------------------------------

fn build_addition(items: Vec<RawItem>) -> Result<Expr> {
    let mut sign: Option<i64> = Some(1);
    let mut terms = Vec::new();
    for it in items {
        match it {
            RawItem::Op('+') => {
                if sign.is_none() {
                    sign = Some(1);
                }
            }
            RawItem::Op('-') => {
                sign = Some(match sign {
                    None => -1,
                    Some(s) => -s,
                });
            }
            RawItem::Op(other) => {
                return Err(SlvError::ParseError(format!(
                    "unexpected operator `{other}` in addition"
                )));
            }
            RawItem::Value(v) => {
                let s = sign
                    .ok_or_else(|| SlvError::ParseError("two operands with no operator between them".into()))?;
                terms.push((s, v));
                sign = None;
            }
        }
    }
    if sign.is_some() {
        return Err(SlvError::ParseError(
            "expression ends with a dangling `+`/`-`".into(),
        ));
    }
    Ok(Expr::Add(terms))
}

/// Pass 4: consume signed terms, collapsing consecutive `+`/`-` into a
/// single sign.
pub fn parse_addition(e: Expr) -> Result<Expr> {
    match e {
        Expr::Raw(items) => {
            let items = items
                .into_iter()
                .map(|it| match it {
                    RawItem::Op(c) => Ok(RawItem::Op(c)),
                    RawItem::Value(v) => Ok(RawItem::Value(parse_addition(v)?)),
                })
                .collect::<Result<Vec<_>>>()?;
            build_addition(items)
        }
        Expr::Mul { num, den } => Ok(Expr::Mul {
            num: num.into_iter().map(parse_addition).collect::<Result<_>>()?,
            den: den.into_iter().map(parse_addition).collect::<Result<_>>()?,
        }),
        Expr::Add(terms) => Ok(Expr::Add(
            terms
                .into_iter()
                .map(|(c, t)| Ok((c, parse_addition(t)?)))
                .collect::<Result<_>>()?,
        )),
        leaf => Ok(leaf),
    }
}

/// Pass 5: group by structural equality, sum coefficients, fold integer
/// terms into a single constant.
pub fn simplify_addition(e: Expr) -> Result<Expr> {
    match e {
        Expr::Add(terms) => {
            let terms: Vec<(i64, Expr)> = terms
                .into_iter()
                .map(|(c, t)| Ok((c, simplify_addition(t)?)))
                .collect::<Result<_>>()?;

            let mut groups: Vec<(String, i64, Expr)> = Vec::new();
            let mut int_part: i64 = 0;
            for (c, t) in terms {
                if let Expr::Int(n) = t {
                    int_part += c * n;
                } else {
                    let key = canonical_key(&t);
                    if let Some(entry) = groups.iter_mut().find(|(k, _, _)| *k == key) {
                        entry.1 += c;
                    } else {
                        groups.push((key, c, t));
                    }
                }
            }
            groups.retain(|(_, coef, _)| *coef != 0);

            if int_part != 0 || groups.is_empty() {
                let key = canonical_key(&Expr::Int(int_part));
                groups.push((key, 1, Expr::Int(int_part)));
            }

            if groups.len() == 1 {
                let (_, coef, t) = groups.into_iter().next().unwrap();
                if coef == 1 {
                    Ok(t)
                } else {
                    let mut num = vec![Expr::Int(coef), t];
                    num.sort_by_key(canonical_key);
                    Ok(Expr::Mul { num, den: vec![] })
                }
            } else {
                groups.sort_by(|a, b| a.0.cmp(&b.0));
                Ok(Expr::Add(
                    groups.into_iter().map(|(_, c, t)| (c, t)).collect(),
                ))
            }
        }
        Expr::Mul { num, den } => Ok(Expr::Mul {
            num: num
                .into_iter()
                .map(simplify_addition)
                .collect::<Result<_>>()?,
            den: den
                .into_iter()
                .map(simplify_addition)
                .collect::<Result<_>>()?,
        }),
        Expr::Raw(items) => Ok(Expr::Raw(
            items
                .into_iter()
                .map(|it| match it {
                    RawItem::Op(c) => Ok(RawItem::Op(c)),
                    RawItem::Value(v) => Ok(RawItem::Value(simplify_addition(v)?)),
                })
                .collect::<Result<_>>()?,
        )),
        leaf => Ok(leaf),
    }
}

/// Re-runs the simplification passes (multiplication, addition, and their
/// simplify steps) over an already-parsed expression. Idempotent: calling
/// this twice in a row yields the same structure both times.
pub fn simplify(e: Expr) -> Result<Expr> {
    let e = parse_multiplication(e)?;
    let e = simplify_multiplication(e)?;
    let e = parse_addition(e)?;
    simplify_addition(e)
}

/// Lexes, parses, and simplifies a right-hand-side expression in one step.
pub fn parse_and_simplify(s: &str) -> Result<Expr> {
    let tokens = lex(s)?;
    let parsed = parse_parentheses(&tokens)?;
    simplify(parsed)
}

/// Replaces every free name bound in `env` with its value, recursing
/// structurally. Names absent from `env` are left untouched.
pub fn substitute(e: &Expr, env: &indexmap::IndexMap<String, Expr>) -> Expr {
    match e {
        Expr::Name(s) => env.get(s).cloned().unwrap_or_else(|| e.clone()),
        Expr::Int(_) => e.clone(),
        Expr::Mul { num, den } => Expr::Mul {
            num: num.iter().map(|x| substitute(x, env)).collect(),
            den: den.iter().map(|x| substitute(x, env)).collect(),
        },
        Expr::Add(terms) => {
            Expr::Add(terms.iter().map(|(c, t)| (*c, substitute(t, env))).collect())
        }
        Expr::Raw(items) => Expr::Raw(
            items
                .iter()
                .map(|it| match it {
                    RawItem::Op(c) => RawItem::Op(*c),
                    RawItem::Value(v) => RawItem::Value(substitute(v, env)),
                })
                .collect(),
        ),
    }
}

/// Evaluates a fully-resolved expression to an integer. Fails if a free
/// name remains, or if a division does not come out even.
pub fn value(e: &Expr) -> Result<i64> {
    match e {
        Expr::Int(n) => Ok(*n),
        Expr::Name(s) => Err(SlvError::UnresolvedExpression(s.clone())),
        Expr::Raw(_) => Err(SlvError::UnresolvedExpression("<unparsed expression>".into())),
        Expr::Add(terms) => {
            let mut total = 0i64;
            for (c, t) in terms {
                total += c * value(t)?;
            }
            Ok(total)
        }
        Expr::Mul { num, den } => {
            let mut numerator = 1i64;
            for n in num {
                numerator *= value(n)?;
            }
            let mut denominator = 1i64;
            for d in den {
                denominator *= value(d)?;
            }
            if denominator == 0 {
                return Err(SlvError::NonIntegralValue {
                    numerator,
                    denominator,
                });
            }
            if numerator % denominator != 0 {
                return Err(SlvError::NonIntegralValue {
                    numerator,
                    denominator,
                });
            }
            Ok(numerator / denominator)
        }
    }
}

/// Collects the set of free names reachable in an expression.
pub fn get_constant_list(e: &Expr) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    collect_names(e, &mut out);
    out
}

fn collect_names(e: &Expr, out: &mut BTreeSet<String>) {
    match e {
        Expr::Int(_) => {}
        Expr::Name(s) => {
            out.insert(s.clone());
        }
        Expr::Mul { num, den } => {
            num.iter().for_each(|x| collect_names(x, out));
            den.iter().for_each(|x| collect_names(x, out));
        }
        Expr::Add(terms) => terms.iter().for_each(|(_, t)| collect_names(t, out)),
        Expr::Raw(items) => items.iter().for_each(|it| {
            if let RawItem::Value(v) = it {
                collect_names(v, out);
            }
        }),
    }
}

/// Renders an expression in HDL surface syntax (§4.E `str_expression`).
pub fn str_expression(e: &Expr) -> String {
    render_add(e)
}

fn render_add(e: &Expr) -> String {
    match e {
        Expr::Add(terms) => {
            let mut out = String::new();
            for (i, (c, t)) in terms.iter().enumerate() {
                let mag = render_mul_factor(t);
                if i == 0 {
                    if *c < 0 {
                        out.push('-');
                    }
                } else {
                    out.push_str(if *c < 0 { " - " } else { " + " });
                }
                out.push_str(&mag);
            }
            out
        }
        other => render_mul_factor(other),
    }
}

fn render_mul_factor(e: &Expr) -> String {
    match e {
        Expr::Int(n) => n.to_string(),
        Expr::Name(s) => s.clone(),
        Expr::Mul { num, den } => {
            let nums: Vec<String> = num.iter().map(render_mul_operand).collect();
            let dens: Vec<String> = den.iter().map(render_mul_operand).collect();
            let mut out = nums.join(" * ");
            if out.is_empty() {
                out.push('1');
            }
            for d in dens {
                out.push_str(" / ");
                out.push_str(&d);
            }
            out
        }
        add @ Expr::Add(_) => format!("({})", render_add(add)),
        Expr::Raw(_) => "<raw>".to_string(),
    }
}

fn render_mul_operand(e: &Expr) -> String {
    match e {
        add @ Expr::Add(_) => format!("({})", render_add(add)),
        other => render_mul_factor(other),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&str_expression(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_identity() {
        assert_eq!(parse_and_simplify("4").unwrap(), Expr::Int(4));
        assert_eq!(parse_and_simplify("1+(1+1)").unwrap(), Expr::Int(3));
        assert_eq!(parse_and_simplify("1+2+4*5").unwrap(), Expr::Int(23));
    }

    #[test]
    fn cancellation() {
        let simplified = parse_and_simplify("3*2/fish/(3/4)").unwrap();
        assert_eq!(
            simplified,
            Expr::Mul {
                num: vec![Expr::Int(8)],
                den: vec![Expr::Name("fish".into())],
            }
        );

        let simplified2 = parse_and_simplify("fish/2*3*(burp/fish)").unwrap();
        assert_eq!(
            simplified2,
            Expr::Mul {
                num: vec![Expr::Int(3), Expr::Name("burp".into())],
                den: vec![Expr::Int(2)],
            }
        );
    }

    #[test]
    fn idempotent_simplify() {
        let e = parse_and_simplify("3*(fish+6)-2*bear").unwrap();
        let simplified_twice = simplify(e.clone()).unwrap();
        assert_eq!(e, simplified_twice);
    }

    #[test]
    fn cancelling_like_terms_collapses_to_the_remaining_integer() {
        assert_eq!(parse_and_simplify("fish - fish").unwrap(), Expr::Int(0));
        assert_eq!(parse_and_simplify("fish - fish + 5").unwrap(), Expr::Int(5));
    }

    #[test]
    fn multiplying_by_zero_collapses_to_int_zero() {
        assert_eq!(parse_and_simplify("0*fish").unwrap(), Expr::Int(0));
        assert_eq!(parse_and_simplify("fish*0/bear").unwrap(), Expr::Int(0));
    }

    #[test]
    fn substitute_then_value() {
        let e = parse_and_simplify("fish + 3 * bear").unwrap();
        let mut env = indexmap::IndexMap::new();
        env.insert("fish".to_string(), Expr::Int(2));
        env.insert("bear".to_string(), Expr::Int(4));
        let substituted = substitute(&e, &env);
        let simplified = simplify(substituted).unwrap();
        assert_eq!(value(&simplified).unwrap(), 2 + 3 * 4);
    }

    #[test]
    fn constant_list() {
        let e = parse_and_simplify("3*(fish+6)-2*bear").unwrap();
        let names = get_constant_list(&e);
        assert_eq!(
            names,
            ["bear", "fish"].into_iter().map(String::from).collect()
        );
    }

    #[test]
    fn unresolved_expression_fails() {
        let e = Expr::Name("fish".into());
        assert!(matches!(value(&e), Err(SlvError::UnresolvedExpression(_))));
    }

    #[test]
    fn non_integral_division_fails() {
        let e = parse_and_simplify("1/3").unwrap();
        match value(&e) {
            Err(SlvError::NonIntegralValue { .. }) => {}
            other => panic!("expected NonIntegralValue, got {other:?}"),
        }
    }

    #[test]
    fn unbalanced_parens_is_parse_error() {
        assert!(matches!(
            parse_and_simplify("(1+2"),
            Err(SlvError::ParseError(_))
        ));
        assert!(matches!(
            parse_and_simplify("1+2)"),
            Err(SlvError::ParseError(_))
        ));
    }
}
