//! Minimal Python subset parser used to extract backend model fields.
//!
//! This parser supports the statement shapes that occur in Django-style model
//! files: imports, decorators, class definitions, simple assignments, and
//! opaque suites (function bodies and control-flow blocks are consumed without
//! inspection). It is intentionally limited and tailored for predictable field
//! extraction; anything outside the subset is a parse error.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::CheckError;

const MAX_SOURCE_LINES: usize = 100_000;

/// Call-name fragments that identify a field constructor. Matched by substring
/// containment so subclassed or aliased constructors still qualify.
const FIELD_CONSTRUCTOR_FRAGMENTS: &[&str] = &["Field", "ForeignKey", "ManyToMany", "OneToOne"];

#[derive(Debug, Clone)]
/// One backend model class with its declared fields.
pub struct BackendModel {
    /// Class name of the model.
    pub name: String,
    /// Field names in declaration order; private-prefixed names are excluded.
    pub fields: Vec<String>,
    /// Fields declared with `blank=True`; always a subset of `fields`.
    pub blank_fields: BTreeSet<String>,
}

/// Extracts per-model field lists and blank-field sets from a backend models
/// file.
///
/// A class counts as a model only if it declares at least one base type.
/// Within a model body, a field is a simple assignment of a non-private
/// identifier to a call whose name contains a known field-constructor
/// fragment. Source outside the supported statement subset fails with
/// [`CheckError::PythonParse`]; an empty file yields an empty list.
pub fn extract_model_fields(path: &Path) -> Result<Vec<BackendModel>, CheckError> {
    let content = fs::read_to_string(path)?;
    parse_models(&content).map_err(|message| CheckError::PythonParse {
        path: path.display().to_string(),
        message,
    })
}

fn parse_models(content: &str) -> Result<Vec<BackendModel>, String> {
    let lines = scan_logical_lines(content)?;
    let mut idx = 0usize;
    let statements = parse_suite(&lines, &mut idx, 0)?;

    let mut models = Vec::new();
    for statement in &statements {
        if let Stmt::ClassDef { name, bases, body } = statement {
            if *bases == 0 {
                continue;
            }
            models.push(collect_model(name, body));
        }
    }

    Ok(models)
}

fn collect_model(name: &str, body: &[Stmt]) -> BackendModel {
    let mut fields = Vec::new();
    let mut blank_fields = BTreeSet::new();

    for statement in body {
        let Stmt::Assign { target, value } = statement else {
            continue;
        };
        if target.starts_with('_') {
            continue;
        }
        let Expr::Call { callee, kwargs } = value else {
            continue;
        };
        if !is_field_constructor(callee) {
            continue;
        }

        fields.push(target.clone());
        if kwargs
            .iter()
            .any(|(key, value)| key == "blank" && matches!(value, Expr::Bool(true)))
        {
            blank_fields.insert(target.clone());
        }
    }

    BackendModel {
        name: name.to_string(),
        fields,
        blank_fields,
    }
}

fn is_field_constructor(callee: &str) -> bool {
    let invoked = callee.rsplit('.').next().unwrap_or(callee);
    FIELD_CONSTRUCTOR_FRAGMENTS
        .iter()
        .any(|fragment| invoked.contains(fragment))
}

// MARK: logical lines

#[derive(Debug)]
struct LogicalLine {
    number: usize,
    indent: usize,
    text: String,
}

#[derive(Clone, Copy)]
struct StringState {
    quote: char,
    triple: bool,
}

/// Joins physical lines into logical statements: bracketed continuations,
/// backslash continuations, and triple-quoted strings are merged; comments
/// outside strings are stripped.
fn scan_logical_lines(content: &str) -> Result<Vec<LogicalLine>, String> {
    let physical: Vec<&str> = content.lines().collect();
    if physical.len() > MAX_SOURCE_LINES {
        return Err(format!(
            "source exceeds max supported line count ({MAX_SOURCE_LINES})"
        ));
    }

    let mut logical = Vec::new();
    let mut current = String::new();
    let mut start_line = 0usize;
    let mut indent = 0usize;
    let mut depth = 0usize;
    let mut string: Option<StringState> = None;

    for (i, raw) in physical.iter().enumerate() {
        let number = i + 1;
        if current.is_empty() && string.is_none() {
            let trimmed = raw.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            indent = leading_indent(raw, number)?;
            start_line = number;
        } else if !current.is_empty() {
            current.push('\n');
        }

        scan_physical_line(raw, &mut current, &mut depth, &mut string, number)?;

        if let Some(state) = string {
            if !state.triple {
                return Err(format!("unterminated string literal at line {number}"));
            }
            continue;
        }
        if depth > 0 {
            continue;
        }
        if current.trim_end().ends_with('\\') {
            let end = current.trim_end().len();
            current.truncate(end - 1);
            continue;
        }

        if !current.trim().is_empty() {
            logical.push(LogicalLine {
                number: start_line,
                indent,
                text: current.trim().to_string(),
            });
        }
        current.clear();
    }

    if string.is_some() {
        return Err("unterminated string literal at end of file".to_string());
    }
    if depth > 0 {
        return Err("unbalanced brackets at end of file".to_string());
    }

    Ok(logical)
}

fn scan_physical_line(
    raw: &str,
    out: &mut String,
    depth: &mut usize,
    string: &mut Option<StringState>,
    number: usize,
) -> Result<(), String> {
    let chars: Vec<char> = raw.chars().collect();
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        if let Some(state) = *string {
            out.push(c);
            if c == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if c == state.quote {
                if state.triple {
                    if chars.get(i + 1) == Some(&state.quote)
                        && chars.get(i + 2) == Some(&state.quote)
                    {
                        out.push(state.quote);
                        out.push(state.quote);
                        i += 3;
                        *string = None;
                        continue;
                    }
                } else {
                    *string = None;
                }
            }
            i += 1;
            continue;
        }

        match c {
            '#' => break,
            '\'' | '"' => {
                let triple = chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&c);
                out.push(c);
                if triple {
                    out.push(c);
                    out.push(c);
                    i += 3;
                } else {
                    i += 1;
                }
                *string = Some(StringState { quote: c, triple });
            }
            '(' | '[' | '{' => {
                *depth += 1;
                out.push(c);
                i += 1;
            }
            ')' | ']' | '}' => {
                if *depth == 0 {
                    return Err(format!("unbalanced '{c}' at line {number}"));
                }
                *depth -= 1;
                out.push(c);
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    Ok(())
}

fn leading_indent(raw: &str, number: usize) -> Result<usize, String> {
    let mut count = 0usize;
    for c in raw.chars() {
        match c {
            ' ' => count += 1,
            '\t' => return Err(format!("tab indentation is not supported (line {number})")),
            _ => break,
        }
    }
    Ok(count)
}

// MARK: statement parsing

#[derive(Debug)]
enum Stmt {
    ClassDef {
        name: String,
        bases: usize,
        body: Vec<Stmt>,
    },
    Assign {
        target: String,
        value: Expr,
    },
    Other,
}

#[derive(Debug)]
enum Expr {
    Name(String),
    Bool(bool),
    Str,
    Number,
    Call {
        callee: String,
        kwargs: Vec<(String, Expr)>,
    },
    Other,
}

const SUITE_KEYWORDS: &[&str] = &[
    "def", "async", "if", "elif", "else", "for", "while", "try", "except", "finally", "with",
];

const SIMPLE_KEYWORDS: &[&str] = &[
    "import", "from", "pass", "del", "global", "nonlocal", "raise", "assert", "return", "break",
    "continue",
];

fn parse_suite(lines: &[LogicalLine], idx: &mut usize, indent: usize) -> Result<Vec<Stmt>, String> {
    let mut statements = Vec::new();

    while *idx < lines.len() {
        let line = &lines[*idx];
        if line.indent < indent {
            break;
        }
        if line.indent > indent {
            return Err(format!(
                "unexpected indentation at line {}: expected {}, found {}",
                line.number, indent, line.indent
            ));
        }

        statements.push(parse_statement(lines, idx, indent)?);
    }

    Ok(statements)
}

fn parse_statement(lines: &[LogicalLine], idx: &mut usize, indent: usize) -> Result<Stmt, String> {
    let line = &lines[*idx];
    let first_word = line
        .text
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .next()
        .unwrap_or("");

    if first_word == "class" {
        return parse_class(lines, idx, indent);
    }

    if SUITE_KEYWORDS.contains(&first_word) || line.text.starts_with('@') {
        *idx += 1;
        skip_deeper_lines(lines, idx, indent);
        return Ok(Stmt::Other);
    }

    if SIMPLE_KEYWORDS.contains(&first_word) || line.text == "..." {
        *idx += 1;
        return Ok(Stmt::Other);
    }

    let statement = parse_simple_statement(&line.text, line.number)?;
    *idx += 1;
    Ok(statement)
}

fn parse_class(lines: &[LogicalLine], idx: &mut usize, indent: usize) -> Result<Stmt, String> {
    let line = &lines[*idx];
    let mut tokens = Tokens::lex(&line.text, line.number)?;

    tokens.expect_ident("class")?;
    let name = tokens.expect_any_ident()?;

    let mut bases = 0usize;
    if tokens.eat_sym('(') {
        while !tokens.eat_sym(')') {
            // Keyword entries (metaclass=..., etc.) are not base classes.
            if tokens.peek_is_kwarg() {
                tokens.expect_any_ident()?;
                tokens.expect_sym('=')?;
                parse_expr(&mut tokens)?;
            } else {
                parse_expr(&mut tokens)?;
                bases += 1;
            }
            if !tokens.eat_sym(',') && !tokens.peek_sym(')') {
                return Err(tokens.error("expected ',' or ')' in class bases"));
            }
        }
    }
    tokens.expect_sym(':')?;
    let inline_body = !tokens.at_end();
    *idx += 1;

    if inline_body {
        // A one-line class body can't declare fields we care about.
        return Ok(Stmt::ClassDef {
            name,
            bases,
            body: Vec::new(),
        });
    }

    let Some(next) = lines.get(*idx) else {
        return Err(format!(
            "expected an indented block after class at line {}",
            line.number
        ));
    };
    if next.indent <= indent {
        return Err(format!(
            "expected an indented block after class at line {}",
            line.number
        ));
    }

    let body_indent = next.indent;
    let raw_body = parse_suite(lines, idx, body_indent)?;

    // Nested classes are not models themselves; they stay in the body but are
    // never promoted to the top-level model list.
    Ok(Stmt::ClassDef {
        name,
        bases,
        body: raw_body,
    })
}

fn skip_deeper_lines(lines: &[LogicalLine], idx: &mut usize, indent: usize) {
    while *idx < lines.len() && lines[*idx].indent > indent {
        *idx += 1;
    }
}

fn parse_simple_statement(text: &str, number: usize) -> Result<Stmt, String> {
    let mut tokens = Tokens::lex(text, number)?;

    // Simple assignment to a single identifier is the only shape that can
    // declare a field; every other accepted shape is opaque.
    if tokens.peek_is_kwarg() {
        let target = tokens.expect_any_ident()?;
        tokens.expect_sym('=')?;
        let value = parse_expr(&mut tokens)?;
        tokens.expect_end()?;
        return Ok(Stmt::Assign { target, value });
    }

    let first = parse_expr(&mut tokens)?;

    if tokens.eat_sym(':') {
        // Annotated assignment or bare annotation.
        if !matches!(first, Expr::Name(ref n) if !n.contains('.')) {
            return Err(tokens.error("unsupported annotation target"));
        }
        parse_expr(&mut tokens)?;
        if tokens.eat_sym('=') {
            let value = parse_expr(&mut tokens)?;
            tokens.expect_end()?;
            if let Expr::Name(target) = first {
                return Ok(Stmt::Assign { target, value });
            }
        }
        tokens.expect_end()?;
        return Ok(Stmt::Other);
    }

    if tokens.eat_sym('=') {
        // Assignment to an attribute, subscript, or chained target.
        parse_expr(&mut tokens)?;
        tokens.expect_end()?;
        return Ok(Stmt::Other);
    }

    if tokens.eat_sym(',') {
        // Tuple assignment target or tuple expression; consume and ignore.
        while !tokens.at_end() && !tokens.peek_sym('=') {
            parse_expr(&mut tokens)?;
            if !tokens.eat_sym(',') {
                break;
            }
        }
        if tokens.eat_sym('=') {
            parse_expr(&mut tokens)?;
        }
        tokens.expect_end()?;
        return Ok(Stmt::Other);
    }

    // Bare expression statement (docstring, registration call, ...).
    tokens.expect_end()?;
    Ok(Stmt::Other)
}

// MARK: expressions

fn parse_expr(tokens: &mut Tokens) -> Result<Expr, String> {
    let mut left = parse_postfix(tokens)?;

    while tokens.peek_binary_op() {
        tokens.advance();
        parse_postfix(tokens)?;
        left = Expr::Other;
    }

    Ok(left)
}

fn parse_postfix(tokens: &mut Tokens) -> Result<Expr, String> {
    let mut expr = parse_atom(tokens)?;

    loop {
        if tokens.eat_sym('.') {
            let attr = tokens.expect_any_ident()?;
            expr = match expr {
                Expr::Name(path) => Expr::Name(format!("{path}.{attr}")),
                _ => Expr::Other,
            };
        } else if tokens.eat_sym('(') {
            let kwargs = parse_call_args(tokens)?;
            expr = match expr {
                Expr::Name(callee) => Expr::Call { callee, kwargs },
                _ => Expr::Other,
            };
        } else if tokens.peek_sym('[') {
            tokens.consume_balanced('[', ']')?;
            expr = Expr::Other;
        } else {
            return Ok(expr);
        }
    }
}

fn parse_call_args(tokens: &mut Tokens) -> Result<Vec<(String, Expr)>, String> {
    let mut kwargs = Vec::new();

    loop {
        if tokens.eat_sym(')') {
            return Ok(kwargs);
        }
        if tokens.eat_sym('*') {
            tokens.eat_sym('*');
            parse_expr(tokens)?;
        } else if tokens.peek_is_kwarg() {
            let name = tokens.expect_any_ident()?;
            tokens.expect_sym('=')?;
            let value = parse_expr(tokens)?;
            kwargs.push((name, value));
        } else {
            parse_expr(tokens)?;
        }

        if !tokens.eat_sym(',') && !tokens.peek_sym(')') {
            return Err(tokens.error("expected ',' or ')' in call arguments"));
        }
    }
}

fn parse_atom(tokens: &mut Tokens) -> Result<Expr, String> {
    match tokens.next() {
        Some(Tok::Ident(word)) => match word.as_str() {
            "True" => Ok(Expr::Bool(true)),
            "False" => Ok(Expr::Bool(false)),
            "None" => Ok(Expr::Other),
            "lambda" => Err(tokens.error("lambda expressions are not supported")),
            _ => Ok(Expr::Name(word)),
        },
        Some(Tok::Str) => Ok(Expr::Str),
        Some(Tok::Num) => Ok(Expr::Number),
        Some(Tok::Sym('(')) => {
            let mut single = None;
            let mut count = 0usize;
            while !tokens.eat_sym(')') {
                let inner = parse_expr(tokens)?;
                count += 1;
                single = Some(inner);
                if !tokens.eat_sym(',') && !tokens.peek_sym(')') {
                    return Err(tokens.error("expected ',' or ')' in parenthesized expression"));
                }
            }
            match (count, single) {
                (1, Some(inner)) => Ok(inner),
                _ => Ok(Expr::Other),
            }
        }
        Some(Tok::Sym('[')) => {
            tokens.back();
            tokens.consume_balanced('[', ']')?;
            Ok(Expr::Other)
        }
        Some(Tok::Sym('{')) => {
            tokens.back();
            tokens.consume_balanced('{', '}')?;
            Ok(Expr::Other)
        }
        Some(Tok::Sym(c)) if c == '-' || c == '+' || c == '~' => {
            parse_postfix(tokens)?;
            Ok(Expr::Other)
        }
        Some(other) => Err(tokens.error(&format!("unexpected token {}", other.describe()))),
        None => Err(tokens.error("unexpected end of statement")),
    }
}

// MARK: tokens

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Str,
    Num,
    Sym(char),
    Op(&'static str),
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::Ident(word) => format!("'{word}'"),
            Tok::Str => "string literal".to_string(),
            Tok::Num => "number literal".to_string(),
            Tok::Sym(c) => format!("'{c}'"),
            Tok::Op(op) => format!("'{op}'"),
        }
    }
}

struct Tokens {
    items: Vec<Tok>,
    pos: usize,
    line: usize,
}

impl Tokens {
    fn lex(text: &str, line: usize) -> Result<Self, String> {
        let chars: Vec<char> = text.chars().collect();
        let mut items = Vec::new();
        let mut i = 0usize;

        while i < chars.len() {
            let c = chars[i];
            if c.is_whitespace() {
                i += 1;
            } else if c.is_alphabetic() || c == '_' {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                // String prefixes (r"...", f"...", rb"...") lex as strings.
                if word.len() <= 2
                    && word.chars().all(|p| "rbfuRBFU".contains(p))
                    && matches!(chars.get(i), Some(&'\'') | Some(&'"'))
                {
                    i = lex_string(&chars, i, line)?;
                    items.push(Tok::Str);
                } else {
                    items.push(Tok::Ident(word));
                }
            } else if c.is_ascii_digit() {
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '.' || chars[i] == '_')
                {
                    i += 1;
                }
                items.push(Tok::Num);
            } else if c == '\'' || c == '"' {
                i = lex_string(&chars, i, line)?;
                items.push(Tok::Str);
            } else if let Some(op) = lex_two_char_op(&chars, i) {
                items.push(Tok::Op(op));
                i += 2;
            } else if "()[]{},:.=*+-/%|&<>@~^".contains(c) {
                items.push(Tok::Sym(c));
                i += 1;
            } else {
                return Err(format!("unexpected character '{c}' at line {line}"));
            }
        }

        Ok(Tokens {
            items,
            pos: 0,
            line,
        })
    }

    fn next(&mut self) -> Option<Tok> {
        let item = self.items.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn back(&mut self) {
        self.pos -= 1;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.items.len()
    }

    fn peek_sym(&self, sym: char) -> bool {
        matches!(self.items.get(self.pos), Some(Tok::Sym(c)) if *c == sym)
    }

    fn eat_sym(&mut self, sym: char) -> bool {
        if self.peek_sym(sym) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_sym(&mut self, sym: char) -> Result<(), String> {
        if self.eat_sym(sym) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{sym}'")))
        }
    }

    fn expect_ident(&mut self, word: &str) -> Result<(), String> {
        match self.next() {
            Some(Tok::Ident(found)) if found == word => Ok(()),
            _ => Err(self.error(&format!("expected '{word}'"))),
        }
    }

    fn expect_any_ident(&mut self) -> Result<String, String> {
        match self.next() {
            Some(Tok::Ident(word)) => Ok(word),
            _ => Err(self.error("expected identifier")),
        }
    }

    fn expect_end(&mut self) -> Result<(), String> {
        match self.items.get(self.pos) {
            None => Ok(()),
            Some(tok) => Err(self.error(&format!("unexpected token {}", tok.describe()))),
        }
    }

    /// True when the next tokens are `identifier =` with a single `=`.
    fn peek_is_kwarg(&self) -> bool {
        matches!(self.items.get(self.pos), Some(Tok::Ident(_)))
            && matches!(self.items.get(self.pos + 1), Some(Tok::Sym('=')))
    }

    fn peek_binary_op(&self) -> bool {
        matches!(
            self.items.get(self.pos),
            Some(Tok::Op(_))
                | Some(Tok::Sym('+'))
                | Some(Tok::Sym('-'))
                | Some(Tok::Sym('*'))
                | Some(Tok::Sym('/'))
                | Some(Tok::Sym('%'))
                | Some(Tok::Sym('|'))
                | Some(Tok::Sym('&'))
                | Some(Tok::Sym('^'))
                | Some(Tok::Sym('<'))
                | Some(Tok::Sym('>'))
        )
    }

    fn consume_balanced(&mut self, open: char, close: char) -> Result<(), String> {
        self.expect_sym(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.next() {
                Some(Tok::Sym(c)) if c == open || c == '(' || c == '[' || c == '{' => depth += 1,
                Some(Tok::Sym(c)) if c == close || c == ')' || c == ']' || c == '}' => depth -= 1,
                Some(_) => {}
                None => return Err(self.error("unbalanced brackets")),
            }
        }
        Ok(())
    }

    fn error(&self, message: &str) -> String {
        format!("{} at line {}", message, self.line)
    }
}

fn lex_two_char_op(chars: &[char], i: usize) -> Option<&'static str> {
    let a = *chars.get(i)?;
    let b = *chars.get(i + 1)?;
    match (a, b) {
        ('=', '=') => Some("=="),
        ('!', '=') => Some("!="),
        ('<', '=') => Some("<="),
        ('>', '=') => Some(">="),
        ('*', '*') => Some("**"),
        ('/', '/') => Some("//"),
        _ => None,
    }
}

/// Lexes a string literal starting at `chars[i]` (a quote character) and
/// returns the index one past its end. Logical lines already joined
/// triple-quoted continuations, so the closing quotes are present.
fn lex_string(chars: &[char], i: usize, line: usize) -> Result<usize, String> {
    let quote = chars[i];
    let triple = chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote);
    let mut pos = if triple { i + 3 } else { i + 1 };

    while pos < chars.len() {
        let c = chars[pos];
        if c == '\\' {
            pos += 2;
            continue;
        }
        if c == quote {
            if triple {
                if chars.get(pos + 1) == Some(&quote) && chars.get(pos + 2) == Some(&quote) {
                    return Ok(pos + 3);
                }
            } else {
                return Ok(pos + 1);
            }
        }
        pos += 1;
    }

    Err(format!("unterminated string literal at line {line}"))
}
