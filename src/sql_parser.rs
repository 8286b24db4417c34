/*
The subset of SQL accepted by this tool:

    SELECT ( '*' | 'count(*)' | col (',' col)* ) FROM table [ WHERE col op value ]
    CREATE TABLE name '(' col type (',' ...) ')'

Queries arrive already lowercased. The CREATE TABLE branch is not reached by
user queries directly — it is reused verbatim by the schema resolver to
decode the `sql` column of a `sqlite_schema` row.
*/

use nom::branch::alt;
use nom::bytes::complete::{is_not, take_while1};
use nom::character::complete::{char, multispace0, one_of};
use nom::combinator::{map, recognize};
use nom::multi::many1;
use nom::sequence::{delimited, pair, preceded};
use nom::IResult;

use crate::error::DbError;

const KEYWORDS: &[&str] = &["select", "from", "where", "create", "table"];
const SKIPPED_CONSTRAINT_WORDS: &[&str] = &["primary", "key", "autoincrement", "not", "null"];

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Op(String),
    Punct(char),
    Str(String),
}

fn word(input: &str) -> IResult<&str, Token> {
    map(
        take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '*' || c == '.'),
        |s: &str| Token::Word(s.to_string()),
    )(input)
}

fn string_lit(input: &str) -> IResult<&str, Token> {
    map(delimited(char('\''), is_not("'"), char('\'')), |s: &str| {
        Token::Str(s.to_string())
    })(input)
}

fn punct(input: &str) -> IResult<&str, Token> {
    map(one_of("(),"), Token::Punct)(input)
}

fn operator(input: &str) -> IResult<&str, Token> {
    map(recognize(many1(one_of("=!<>"))), |s: &str| {
        Token::Op(s.to_string())
    })(input)
}

/// A negative numeric literal: `-` immediately followed by digits. Plain `-`
/// with no digits after it falls through to `operator`/`word` and fails as
/// unrecognized input, since this tool has no subtraction operator.
fn negative_number(input: &str) -> IResult<&str, Token> {
    map(
        recognize(pair(char('-'), take_while1(|c: char| c.is_ascii_digit()))),
        |s: &str| Token::Word(s.to_string()),
    )(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    preceded(
        multispace0,
        alt((string_lit, punct, negative_number, operator, word)),
    )(input)
}

fn tokenize(input: &str) -> Result<Vec<Token>, DbError> {
    let mut tokens = Vec::new();
    let mut rest = input;
    loop {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        match token(rest) {
            Ok((remaining, tok)) => {
                tokens.push(tok);
                rest = remaining;
            }
            Err(_) => {
                return Err(DbError::SyntaxError(format!(
                    "unexpected input near '{trimmed}'"
                )))
            }
        }
    }
    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Op {
    fn from_token(tok: &str) -> Option<Self> {
        match tok {
            "=" | "==" => Some(Op::Eq),
            "!=" | "<>" => Some(Op::Ne),
            "<" => Some(Op::Lt),
            ">" => Some(Op::Gt),
            "<=" => Some(Op::Le),
            ">=" => Some(Op::Ge),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryCond {
    pub col: String,
    pub op: Op,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Select,
    Create,
    None,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedQuery {
    pub action_is_select: bool,
    pub action_is_create: bool,
    pub all_cols: bool,
    pub count_cols: bool,
    pub col_names: Vec<String>,
    pub col_dtypes: Vec<String>,
    pub table: String,
    pub cond: Option<QueryCond>,
}

impl ParsedQuery {
    pub fn action(&self) -> Action {
        if self.action_is_select {
            Action::Select
        } else if self.action_is_create {
            Action::Create
        } else {
            Action::None
        }
    }
}

/// Title-cases at every non-alphabetic boundary, not just spaces: the first
/// letter of each alphabetic run is uppercased, the rest lowercased, and
/// apostrophes/hyphens/digits start a new run without being touched
/// themselves. Mirrors Python's `str.title()` bit-for-bit (`"o'brien-lane"`
/// -> `"O'Brien-Lane"`), matching the storage convention of the text this
/// tool queries, not general SQL semantics.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_alpha = true;
        } else {
            out.push(c);
            prev_is_alpha = false;
        }
    }
    out
}

fn reject_keyword(word: &str) -> Result<(), DbError> {
    if KEYWORDS.contains(&word) {
        Err(DbError::KeywordAsIdentifier(word.to_string()))
    } else {
        Ok(())
    }
}

type TokenIter = std::iter::Peekable<std::vec::IntoIter<Token>>;

fn expect_punct(iter: &mut TokenIter, expected: char) -> Result<(), DbError> {
    match iter.next() {
        Some(Token::Punct(c)) if c == expected => Ok(()),
        other => Err(DbError::SyntaxError(format!(
            "expected '{expected}', found {other:?}"
        ))),
    }
}

fn expect_word(iter: &mut TokenIter, expected: &str) -> Result<(), DbError> {
    match iter.next() {
        Some(Token::Word(w)) if w == expected => Ok(()),
        other => Err(DbError::SyntaxError(format!(
            "expected '{expected}', found {other:?}"
        ))),
    }
}

fn expect_identifier(iter: &mut TokenIter) -> Result<String, DbError> {
    match iter.next() {
        Some(Token::Word(w)) => Ok(w),
        other => Err(DbError::SyntaxError(format!(
            "expected an identifier, found {other:?}"
        ))),
    }
}

pub fn parse(query: &str) -> Result<ParsedQuery, DbError> {
    let tokens = tokenize(query)?;
    let mut iter = tokens.into_iter().peekable();

    match iter.next() {
        Some(Token::Word(w)) if w == "select" => parse_select(iter),
        Some(Token::Word(w)) if w == "create" => parse_create(iter),
        other => Err(DbError::SyntaxError(format!(
            "expected 'select' or 'create', found {other:?}"
        ))),
    }
}

fn parse_select(mut iter: TokenIter) -> Result<ParsedQuery, DbError> {
    let mut all_cols = false;
    let mut count_cols = false;
    let mut col_names = Vec::new();

    match iter.next() {
        Some(Token::Word(w)) if w == "*" => all_cols = true,
        Some(Token::Word(w)) if w == "count" => {
            expect_punct(&mut iter, '(')?;
            expect_word(&mut iter, "*")?;
            expect_punct(&mut iter, ')')?;
            count_cols = true;
        }
        Some(Token::Word(w)) => {
            reject_keyword(&w)?;
            col_names.push(w);
            while let Some(Token::Punct(',')) = iter.peek() {
                iter.next();
                let col = expect_identifier(&mut iter)?;
                reject_keyword(&col)?;
                col_names.push(col);
            }
        }
        other => {
            return Err(DbError::SyntaxError(format!(
                "expected a column list, found {other:?}"
            )))
        }
    }

    expect_word(&mut iter, "from")?;
    let table = expect_identifier(&mut iter)?;
    reject_keyword(&table)?;

    let mut cond = None;
    if let Some(Token::Word(w)) = iter.peek() {
        if w == "where" {
            iter.next();
            let col = expect_identifier(&mut iter)?;
            reject_keyword(&col)?;

            let op = match iter.next() {
                Some(Token::Op(s)) => Op::from_token(&s)
                    .ok_or_else(|| DbError::SyntaxError(format!("unknown operator '{s}'")))?,
                other => {
                    return Err(DbError::SyntaxError(format!(
                        "expected a comparison operator, found {other:?}"
                    )))
                }
            };

            let value = match iter.next() {
                Some(Token::Str(s)) => title_case(&s),
                Some(Token::Word(s)) => s,
                other => {
                    return Err(DbError::SyntaxError(format!(
                        "expected a predicate value, found {other:?}"
                    )))
                }
            };

            cond = Some(QueryCond { col, op, value });
        }
    }

    Ok(ParsedQuery {
        action_is_select: true,
        action_is_create: false,
        all_cols,
        count_cols,
        col_names,
        col_dtypes: Vec::new(),
        table,
        cond,
    })
}

fn parse_create(mut iter: TokenIter) -> Result<ParsedQuery, DbError> {
    expect_word(&mut iter, "table")?;
    let table = expect_identifier(&mut iter)?;
    expect_punct(&mut iter, '(')?;

    let mut col_names = Vec::new();
    let mut col_dtypes = Vec::new();

    loop {
        match iter.peek() {
            Some(Token::Punct(',')) => {
                iter.next();
                continue;
            }
            Some(Token::Punct(')')) => {
                iter.next();
                break;
            }
            None => return Err(DbError::SyntaxError("unterminated column list".to_string())),
            _ => {}
        }

        let col = expect_identifier(&mut iter)?;
        let dtype = expect_identifier(&mut iter)?;
        col_names.push(col);
        col_dtypes.push(dtype);

        loop {
            match iter.peek() {
                Some(Token::Word(w)) if SKIPPED_CONSTRAINT_WORDS.contains(&w.as_str()) => {
                    iter.next();
                }
                _ => break,
            }
        }
    }

    Ok(ParsedQuery {
        action_is_select: false,
        action_is_create: true,
        all_cols: false,
        count_cols: false,
        col_names,
        col_dtypes,
        table,
        cond: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_select_star() {
        let parsed = parse("select * from apples").unwrap();
        assert!(parsed.all_cols);
        assert_eq!(parsed.table, "apples");
        assert!(parsed.cond.is_none());
    }

    #[test]
    fn parses_count_star() {
        let parsed = parse("select count(*) from apples").unwrap();
        assert!(parsed.count_cols);
    }

    #[test]
    fn parses_projection_and_predicate_with_title_cased_literal() {
        let parsed = parse("select name from apples where color = 'red'").unwrap();
        assert_eq!(parsed.col_names, vec!["name".to_string()]);
        let cond = parsed.cond.unwrap();
        assert_eq!(cond.col, "color");
        assert_eq!(cond.op, Op::Eq);
        assert_eq!(cond.value, "Red");
    }

    #[test]
    fn keyword_as_column_name_is_rejected() {
        let err = parse("select from from apples").unwrap_err();
        assert!(matches!(err, DbError::KeywordAsIdentifier(ref w) if w == "from"));
    }

    #[test]
    fn parses_create_table_skipping_constraint_tokens() {
        let parsed =
            parse("create table apples (id integer primary key, name text, color text)").unwrap();
        assert_eq!(
            parsed.col_names,
            vec!["id".to_string(), "name".to_string(), "color".to_string()]
        );
        assert_eq!(
            parsed.col_dtypes,
            vec!["integer".to_string(), "text".to_string(), "text".to_string()]
        );
    }

    #[test]
    fn title_case_handles_multi_word_literals() {
        assert_eq!(title_case("blush red"), "Blush Red");
    }

    #[test]
    fn title_case_treats_punctuation_as_a_word_boundary() {
        assert_eq!(title_case("o'brien-lane"), "O'Brien-Lane");
        assert_eq!(title_case("7up"), "7Up");
    }

    #[test]
    fn parses_negative_number_in_predicate() {
        let parsed = parse("select name from apples where balance < -100").unwrap();
        let cond = parsed.cond.unwrap();
        assert_eq!(cond.op, Op::Lt);
        assert_eq!(cond.value, "-100");
    }
}
