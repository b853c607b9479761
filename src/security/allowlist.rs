use crate::error::ToolError;
use crate::security::{
    ALLOWED_GIT_PREFIXES, ALLOWED_NPM_PREFIXES, BLOCKED_GIT_FLAGS, BLOCKED_NPM_FLAGS,
    NPM_LETTER_OPTIONS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shortest option name treated as an abbreviation of a blocked long flag
const MIN_FLAG_ABBREVIATION: usize = 2;

/// External programs the tool surface may launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Program {
    Git,
    Npm,
}

impl Program {
    /// Executable name passed to the OS
    pub fn executable(&self) -> &'static str {
        match self {
            Program::Git => "git",
            Program::Npm => "npm",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.executable())
    }
}

impl FromStr for Program {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "git" => Ok(Program::Git),
            "npm" => Ok(Program::Npm),
            other => Err(ToolError::BlockedCommand {
                program: other.to_string(),
                args: String::new(),
                reason: BlockReason::UnknownProgram,
            }),
        }
    }
}

/// Why a command was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    UnknownProgram,
    NoPermittedPrefix,
    EscapingFlag(String),
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::UnknownProgram => f.write_str("program is not allowlisted"),
            BlockReason::NoPermittedPrefix => f.write_str("no permitted subcommand prefix"),
            BlockReason::EscapingFlag(flag) => write!(f, "flag {} is not permitted", flag),
        }
    }
}

/// A command that passed the allowlist, split into an argument vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCommand {
    pub program: Program,
    pub args: Vec<String>,
}

impl ValidatedCommand {
    /// Command line as it would be typed, for logs and reports
    pub fn command_line(&self) -> String {
        let mut line = self.program.executable().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Per-program table of permitted argument prefixes
///
/// This is a prefix match on the whole argument string, not a flag parser. The argument
/// string is later split on whitespace and handed to the process as argv, never to a shell,
/// so chaining operators arrive at the program as literal arguments.
pub struct CommandAllowlist {
    git_prefixes: Vec<&'static str>,
    npm_prefixes: Vec<&'static str>,
    git_blocked_flags: Vec<&'static str>,
    npm_blocked_flags: Vec<&'static str>,
    npm_letter_options: Vec<&'static str>,
}

impl CommandAllowlist {
    pub fn new() -> Self {
        // Use shared tables from security module
        Self {
            git_prefixes: ALLOWED_GIT_PREFIXES.to_vec(),
            npm_prefixes: ALLOWED_NPM_PREFIXES.to_vec(),
            git_blocked_flags: BLOCKED_GIT_FLAGS.to_vec(),
            npm_blocked_flags: BLOCKED_NPM_FLAGS.to_vec(),
            npm_letter_options: NPM_LETTER_OPTIONS.to_vec(),
        }
    }

    /// Permitted prefixes for `program`
    pub fn prefixes(&self, program: Program) -> &[&'static str] {
        match program {
            Program::Git => &self.git_prefixes,
            Program::Npm => &self.npm_prefixes,
        }
    }

    fn blocked_flags(&self, program: Program) -> &[&'static str] {
        match program {
            Program::Git => &self.git_blocked_flags,
            Program::Npm => &self.npm_blocked_flags,
        }
    }

    /// Check `args` against the table for `program`
    ///
    /// On rejection the raw argument string is carried verbatim in the error.
    pub fn check(&self, program: Program, args: &str) -> Result<ValidatedCommand, ToolError> {
        let blocked = |reason: BlockReason| ToolError::BlockedCommand {
            program: program.to_string(),
            args: args.to_string(),
            reason,
        };

        if !self
            .prefixes(program)
            .iter()
            .any(|prefix| args.starts_with(prefix))
        {
            return Err(blocked(BlockReason::NoPermittedPrefix));
        }

        let argv: Vec<String> = args.split_whitespace().map(str::to_string).collect();

        // Check for flags that redirect the effect outside the root
        for arg in &argv {
            if let Some(flag) = self.escaping_flag(program, arg) {
                return Err(blocked(BlockReason::EscapingFlag(flag.to_string())));
            }
        }

        Ok(ValidatedCommand {
            program,
            args: argv,
        })
    }
}

impl CommandAllowlist {
    /// Blocked flag spelled by `arg`, including the abbreviated forms `program` accepts
    fn escaping_flag(&self, program: Program, arg: &str) -> Option<&'static str> {
        let mut blocked = self.blocked_flags(program).iter().copied();
        if let Some(flag) = blocked.clone().find(|flag| is_flag_match(arg, flag)) {
            return Some(flag);
        }

        let name = option_name(program, arg)?;

        // Unambiguous abbreviation of a long flag: `--pref` for `--prefix`
        if name.len() >= MIN_FLAG_ABBREVIATION {
            let abbreviated = blocked.clone().find(|flag| {
                flag.strip_prefix("--")
                    .is_some_and(|long| long.starts_with(name))
            });
            if abbreviated.is_some() {
                return abbreviated;
            }
        }

        // npm reads an unknown letter-only name as a cluster of shorthands
        if program == Program::Npm
            && name.chars().all(|c| c.is_ascii_alphabetic())
            && !self.npm_letter_options.iter().any(|option| *option == name)
        {
            return blocked.find(|flag| {
                flag.strip_prefix('-')
                    .filter(|short| short.len() == 1 && !short.starts_with('-'))
                    .is_some_and(|short| name.contains(short))
            });
        }

        None
    }
}

/// Option name in `arg` without dashes or `=value`, as `program` parses it
///
/// git only reads long options after `--`; npm strips any number of leading dashes.
fn option_name(program: Program, arg: &str) -> Option<&str> {
    let stripped = match program {
        Program::Git => arg.strip_prefix("--")?,
        Program::Npm => arg.strip_prefix('-')?.trim_start_matches('-'),
    };
    let name = stripped.split('=').next().unwrap_or_default();
    (!name.is_empty()).then_some(name)
}

impl Default for CommandAllowlist {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a program name and argument string against the default tables
pub fn check_allowed(program: &str, args: &str) -> Result<ValidatedCommand, ToolError> {
    let program = program.parse::<Program>().map_err(|_| ToolError::BlockedCommand {
        program: program.to_string(),
        args: args.to_string(),
        reason: BlockReason::UnknownProgram,
    })?;
    CommandAllowlist::new().check(program, args)
}

/// `--output` matches `--output` and `--output=...`; short flags match exactly
fn is_flag_match(arg: &str, flag: &str) -> bool {
    if arg == flag {
        return true;
    }
    flag.starts_with("--")
        && arg
            .strip_prefix(flag)
            .is_some_and(|rest| rest.starts_with('='))
}
