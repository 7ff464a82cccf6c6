//! Prompt rendering.

use colored::Colorize;

use crate::session::Actor;

/// Render the prompt for the given continuation depth: index 0 shows the
/// actor identity, anything deeper is the continuation prompt.
pub fn render_prompt(actor: &Actor, line_index: usize, color: bool) -> String {
    if line_index == 0 {
        if color {
            format!("{} {} ", actor.user.yellow(), "meridian»".red())
        } else {
            format!("{} meridian» ", actor.user)
        }
    } else if color {
        format!("{}  ", ">".red())
    } else {
        ">  ".to_string()
    }
}
