//! Statement completion rules.
//!
//! Decides, after each physical line, whether the buffered input forms a
//! complete logical statement or the shell must keep prompting for
//! continuation lines.

/// Returns true when the buffered lines form a complete logical statement.
///
/// `exit`/`quit` complete regardless of line count; a first line that is
/// empty or starts with `\` completes on a single Enter; anything else
/// completes only when the just-entered physical line ends with `;`.
///
/// The terminator check is purely textual: a `;` inside a quoted string or
/// comment still completes the statement.
pub fn should_submit(lines: &[String], just_entered: usize) -> bool {
    let joined = lines.concat();
    let joined = joined.trim().to_lowercase();

    if joined == "exit" || joined == "quit" {
        return true;
    }
    if lines.len() == 1 && (joined.is_empty() || joined.starts_with('\\')) {
        return true;
    }
    lines
        .get(just_entered)
        .is_some_and(|line| line.ends_with(';'))
}
