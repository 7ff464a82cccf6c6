//! Statement classification.
//!
//! Splits a normalized statement into shell-style fields and chooses the
//! dispatch target: the embedded query executor, a nested sub-shell, or a
//! named external command.

use crate::error::{Result, ShellError};

/// Keywords that route a statement to the embedded query executor.
/// Membership is case-insensitive and the set is fixed for the process
/// lifetime.
pub const QUERY_VERBS: &[&str] = &[
    "SELECT",
    "INSERT",
    "UPDATE",
    "DELETE",
    "CREATE",
    "DROP",
    "ALTER",
    "TRUNCATE",
    "GRANT",
    "REVOKE",
    "COMMIT",
    "ROLLBACK",
    "SAVEPOINT",
    "BACKUP",
    "MOUNT",
];

pub fn is_query_verb(word: &str) -> bool {
    let upper = word.to_uppercase();
    QUERY_VERBS.iter().any(|verb| *verb == upper)
}

/// Where one accepted statement is routed. Exists only for the duration of
/// a single dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchTarget {
    /// The full normalized statement, for the embedded query executor
    Query(String),

    /// All fields, including the leading `\`, for a fresh nested shell
    NestedShell(Vec<String>),

    /// A named external command with its arguments
    Command { name: String, args: Vec<String> },
}

/// Split a statement into whitespace-separated fields, honoring single and
/// double quotes so quoted substrings are not split. An unterminated quote
/// is a classification error.
pub fn split_fields(line: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_field = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '\'' || ch == '"' => {
                quote = Some(ch);
                in_field = true;
            }
            None if ch.is_whitespace() => {
                if in_field {
                    fields.push(std::mem::take(&mut current));
                    in_field = false;
                }
            }
            None => {
                current.push(ch);
                in_field = true;
            }
        }
    }

    if quote.is_some() {
        return Err(ShellError::Classification(format!(
            "unterminated quote in: {}",
            line
        )));
    }
    if in_field {
        fields.push(current);
    }
    Ok(fields)
}

/// Choose the dispatch target for a normalized statement. Returns `None`
/// for blank input (nothing to dispatch).
pub fn classify(statement: &str) -> Result<Option<DispatchTarget>> {
    let fields = split_fields(statement)?;
    let Some(first) = fields.first() else {
        return Ok(None);
    };

    if is_query_verb(first) {
        return Ok(Some(DispatchTarget::Query(statement.to_string())));
    }

    if first == "\\" {
        return Ok(Some(DispatchTarget::NestedShell(fields)));
    }

    if let Some(stripped) = first.strip_prefix('\\') {
        return Ok(Some(DispatchTarget::Command {
            name: stripped.to_string(),
            args: fields[1..].to_vec(),
        }));
    }

    Ok(Some(DispatchTarget::Command {
        name: fields[0].clone(),
        args: fields[1..].to_vec(),
    }))
}
