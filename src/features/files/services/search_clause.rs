use regex::Regex;
use regex_syntax::ast::{self, ErrorKind};
use sqlx::{Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::files::models::{FileRecord, FILE_COLUMNS};

/// Free-text predicate over every column in [`FILE_COLUMNS`].
///
/// A record matches when ANY column, cast to text, matches the query.
#[derive(Debug, Clone)]
pub enum SearchClause {
    /// Empty query: no extra predicate
    MatchAll,
    /// Case-insensitive literal substring
    Substring(String),
    /// POSIX regular expression, evaluated by PostgreSQL.
    ///
    /// `compiled` is `None` for patterns using syntax only PostgreSQL
    /// supports, such as backreferences, lookahead or `\m` word anchors.
    Pattern {
        source: String,
        compiled: Option<Regex>,
    },
}

impl SearchClause {
    pub fn build(query: &str, is_regex: bool) -> Result<Self> {
        if query.is_empty() {
            return Ok(SearchClause::MatchAll);
        }
        if !is_regex {
            return Ok(SearchClause::Substring(query.to_string()));
        }

        let compiled = match Regex::new(query) {
            Ok(regex) => Some(regex),
            Err(err) => match ast::parse::Parser::new().parse(query) {
                Err(e) if is_postgres_only(e.kind()) => None,
                _ => {
                    return Err(AppError::InvalidQuery(format!(
                        "Invalid regular expression: {}",
                        err
                    )))
                }
            },
        };

        Ok(SearchClause::Pattern {
            source: query.to_string(),
            compiled,
        })
    }

    /// Append ` AND (col::text <op> $n OR ...)`; nothing for `MatchAll`
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        let (operator, value, escape) = match self {
            SearchClause::MatchAll => return,
            SearchClause::Substring(needle) => {
                ("ILIKE", format!("%{}%", escape_like(needle)), r" ESCAPE '\'")
            }
            SearchClause::Pattern { source, .. } => ("~", source.clone(), ""),
        };

        qb.push(" AND (");
        for (i, column) in FILE_COLUMNS.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(format!("{}::text {} ", column.name, operator));
            qb.push_bind(value.clone());
            qb.push(escape);
        }
        qb.push(")");
    }

    /// Evaluate the predicate in-process.
    ///
    /// A pattern without a local compilation matches nothing here.
    pub fn matches(&self, record: &FileRecord) -> bool {
        match self {
            SearchClause::MatchAll => true,
            SearchClause::Substring(needle) => {
                let needle = needle.to_lowercase();
                FILE_COLUMNS
                    .iter()
                    .any(|c| (c.as_text)(record).to_lowercase().contains(&needle))
            }
            SearchClause::Pattern { compiled, .. } => compiled.as_ref().is_some_and(|regex| {
                FILE_COLUMNS
                    .iter()
                    .any(|c| regex.is_match(&(c.as_text)(record)))
            }),
        }
    }
}

/// Parse failures that are gaps in the local dialect rather than malformed patterns
fn is_postgres_only(kind: &ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnsupportedBackreference
            | ErrorKind::UnsupportedLookAround
            | ErrorKind::EscapeUnrecognized
    )
}

/// Escape LIKE wildcards so the value matches literally with `ESCAPE '\'`
pub(crate) fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
