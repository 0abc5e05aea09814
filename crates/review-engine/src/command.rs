//! Slash-command parsing
//!
//! A command must take up a whole line of the comment, case-insensitive,
//! optionally followed by whitespace only.

use regex::Regex;
use std::sync::OnceLock;

/// A recognised review command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/lgtm`
    AddLgtm,
    /// `/lgtm cancel`
    RemoveLgtm,
    /// `/approve`
    AddApprove,
    /// `/approve cancel`
    RemoveApprove,
    /// `/check-pr`
    CheckPr,
}

struct CommandPatterns {
    add_lgtm: Regex,
    remove_lgtm: Regex,
    add_approve: Regex,
    remove_approve: Regex,
    check_pr: Regex,
}

fn patterns() -> &'static CommandPatterns {
    static PATTERNS: OnceLock<CommandPatterns> = OnceLock::new();

    PATTERNS.get_or_init(|| CommandPatterns {
        add_lgtm: Regex::new(r"(?mi)^/lgtm\s*$").unwrap(),
        remove_lgtm: Regex::new(r"(?mi)^/lgtm cancel\s*$").unwrap(),
        add_approve: Regex::new(r"(?mi)^/approve\s*$").unwrap(),
        remove_approve: Regex::new(r"(?mi)^/approve cancel\s*$").unwrap(),
        check_pr: Regex::new(r"(?mi)^/check-pr\s*$").unwrap(),
    })
}

/// Parse the commands in a comment, in execution order
///
/// At most one lgtm and one approve command is returned; adding wins over
/// cancelling when a comment carries both.
pub fn parse_commands(comment: &str) -> Vec<Command> {
    let p = patterns();
    let mut commands = Vec::new();

    if p.add_lgtm.is_match(comment) {
        commands.push(Command::AddLgtm);
    } else if p.remove_lgtm.is_match(comment) {
        commands.push(Command::RemoveLgtm);
    }

    if p.add_approve.is_match(comment) {
        commands.push(Command::AddApprove);
    } else if p.remove_approve.is_match(comment) {
        commands.push(Command::RemoveApprove);
    }

    if p.check_pr.is_match(comment) {
        commands.push(Command::CheckPr);
    }

    commands
}
