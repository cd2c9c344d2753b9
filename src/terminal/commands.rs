//! Built-in command table and dispatcher
//!
//! Every command is simulated: handlers print fixed transcripts and, for
//! `ssh`/`exit`, flip the session between its local and remote identity.
//! Adding a command means adding one [`CommandSpec`] to [`COMMANDS`].

use chrono::Utc;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

use super::surface::{Segment, SegmentStyle};
use crate::error::{CommandError, EXIT_OK};
use crate::session::{HistoryEntry, Session};

/// Arguments accepted by a command's validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Args {
    None,
    Target(String),
    Login { user: String, host: String },
}

/// One entry of the command table
pub struct CommandSpec {
    pub name: &'static str,
    /// Argument placeholder shown by `help`, empty for none
    pub synopsis: &'static str,
    pub description: &'static str,
    pub validate: fn(&[&str]) -> Result<Args, CommandError>,
    pub execute: fn(&mut CommandContext<'_>, Args),
}

/// The fixed set of built-in commands, in `help` order
pub static COMMANDS: [CommandSpec; 7] = [
    CommandSpec {
        name: "help",
        synopsis: "",
        description: "Show this help message",
        validate: no_args,
        execute: help,
    },
    CommandSpec {
        name: "clear",
        synopsis: "",
        description: "Clear the terminal",
        validate: no_args,
        execute: clear,
    },
    CommandSpec {
        name: "ping",
        synopsis: "[ip]",
        description: "Ping an IP address",
        validate: ping_args,
        execute: ping,
    },
    CommandSpec {
        name: "nmap",
        synopsis: "[ip]",
        description: "Scan a host",
        validate: nmap_args,
        execute: nmap,
    },
    CommandSpec {
        name: "dig",
        synopsis: "[domain]",
        description: "DNS lookup",
        validate: dig_args,
        execute: dig,
    },
    CommandSpec {
        name: "ssh",
        synopsis: "[user@host]",
        description: "SSH connection",
        validate: login,
        execute: ssh,
    },
    CommandSpec {
        name: "exit",
        synopsis: "",
        description: "Exit SSH session",
        validate: no_args,
        execute: exit,
    },
];

static INDEX: Lazy<HashMap<&'static str, &'static CommandSpec>> =
    Lazy::new(|| COMMANDS.iter().map(|spec| (spec.name, spec)).collect());

/// Find a built-in by name, ignoring case
#[must_use]
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    INDEX.get(name.to_lowercase().as_str()).copied()
}

/// Output sink handed to command handlers.
///
/// Lines go straight to the session's surface and are also captured as plain
/// text for the history record.
pub struct CommandContext<'a> {
    session: &'a mut Session,
    captured: String,
}

impl<'a> CommandContext<'a> {
    fn new(session: &'a mut Session) -> Self {
        Self {
            session,
            captured: String::new(),
        }
    }

    /// Emit one complete line made of styled segments
    pub fn line(&mut self, segments: &[Segment]) {
        let surface = self.session.surface_mut();
        surface.write_segments(segments);
        surface.newline();

        for segment in segments {
            self.captured.push_str(&segment.text);
        }
        self.captured.push('\n');
    }

    /// Emit one single-style line
    pub fn print(&mut self, text: impl Into<String>, style: SegmentStyle) {
        self.line(&[Segment::new(text, style)]);
    }

    pub fn session(&mut self) -> &mut Session {
        self.session
    }

    fn report(&mut self, err: &CommandError) {
        self.print(err.to_string(), SegmentStyle::Error);
        if matches!(err, CommandError::NotFound { .. }) {
            self.line(&[
                Segment::plain("Type "),
                Segment::new("help", SegmentStyle::Accent),
                Segment::plain(" for available commands."),
            ]);
        }
    }

    fn finish(self) -> String {
        self.captured
    }
}

/// Interpret a trimmed, non-empty line against `session`.
///
/// Always appends exactly one history record and returns its exit code.
pub fn dispatch(session: &mut Session, line: &str) -> i32 {
    let mut tokens = line.split_whitespace();
    let name = tokens.next().unwrap_or_default().to_lowercase();
    let args: Vec<&str> = tokens.collect();

    let resolved = lookup(&name)
        .ok_or_else(|| CommandError::NotFound { name: name.clone() })
        .and_then(|spec| Ok((spec, (spec.validate)(&args)?)));

    let mut ctx = CommandContext::new(session);
    let exit_code = match resolved {
        Ok((spec, parsed)) => {
            (spec.execute)(&mut ctx, parsed);
            EXIT_OK
        }
        Err(err) => {
            ctx.report(&err);
            err.exit_code()
        }
    };
    let output = ctx.finish();

    debug!("Command '{}' finished with exit code {}", name, exit_code);
    session.record(HistoryEntry {
        command: line.to_string(),
        output,
        timestamp: Utc::now(),
        exit_code,
    });

    exit_code
}

// Validators

fn no_args(_args: &[&str]) -> Result<Args, CommandError> {
    Ok(Args::None)
}

fn target(args: &[&str], command: &'static str, usage: &'static str) -> Result<Args, CommandError> {
    args.first()
        .map(|t| Args::Target((*t).to_string()))
        .ok_or(CommandError::Usage { command, usage })
}

fn ping_args(args: &[&str]) -> Result<Args, CommandError> {
    target(args, "ping", "ping [ip_address]")
}

fn nmap_args(args: &[&str]) -> Result<Args, CommandError> {
    target(args, "nmap", "nmap [ip_address]")
}

fn dig_args(args: &[&str]) -> Result<Args, CommandError> {
    target(args, "dig", "dig [domain]")
}

fn login(args: &[&str]) -> Result<Args, CommandError> {
    let malformed = CommandError::Usage {
        command: "ssh",
        usage: "ssh [user@host]",
    };

    let (user, host) = args
        .first()
        .and_then(|a| a.split_once('@'))
        .ok_or_else(|| malformed.clone())?;

    if user.is_empty() || host.is_empty() || host.contains('@') {
        return Err(malformed);
    }

    Ok(Args::Login {
        user: user.to_string(),
        host: host.to_string(),
    })
}

// Handlers

fn help(ctx: &mut CommandContext<'_>, _args: Args) {
    let label_len = |spec: &CommandSpec| match spec.synopsis {
        "" => spec.name.len(),
        synopsis => spec.name.len() + 1 + synopsis.len(),
    };
    let width = COMMANDS.iter().map(label_len).max().unwrap_or(0) + 1;

    ctx.print("Available commands:", SegmentStyle::Plain);
    for spec in &COMMANDS {
        let synopsis = if spec.synopsis.is_empty() {
            String::new()
        } else {
            format!(" {}", spec.synopsis)
        };
        let pad = width - spec.name.len();
        ctx.line(&[
            Segment::plain("  "),
            Segment::new(spec.name, SegmentStyle::Accent),
            Segment::plain(format!("{synopsis:<pad$}- {}", spec.description)),
        ]);
    }
}

fn clear(ctx: &mut CommandContext<'_>, _args: Args) {
    ctx.session().surface_mut().clear();
}

fn ping(ctx: &mut CommandContext<'_>, args: Args) {
    let Args::Target(target) = args else { return };

    ctx.print(format!("PING {target} 56(84) bytes of data."), SegmentStyle::Plain);
    ctx.print(
        format!("64 bytes from {target}: icmp_seq=1 ttl=64 time=1.2 ms"),
        SegmentStyle::Plain,
    );
    ctx.print(format!("--- {target} ping statistics ---"), SegmentStyle::Plain);
    ctx.print(
        "1 packets transmitted, 1 received, 0% packet loss",
        SegmentStyle::Plain,
    );
}

fn nmap(ctx: &mut CommandContext<'_>, args: Args) {
    let Args::Target(target) = args else { return };

    ctx.print("Starting Nmap 7.94 ( https://nmap.org )", SegmentStyle::Plain);
    ctx.print(format!("Nmap scan report for {target}"), SegmentStyle::Plain);
    ctx.print("Host is up (0.0012s latency).", SegmentStyle::Success);
    ctx.print("Not shown: 997 closed tcp ports (reset)", SegmentStyle::Plain);
    ctx.print("PORT    STATE SERVICE", SegmentStyle::Accent);
    ctx.print("22/tcp  open  ssh", SegmentStyle::Plain);
    ctx.print("80/tcp  open  http", SegmentStyle::Plain);
    ctx.print("443/tcp open  https", SegmentStyle::Plain);
    ctx.print(
        "Nmap done: 1 IP address (1 host up) scanned in 0.42 seconds",
        SegmentStyle::Plain,
    );
}

fn dig(ctx: &mut CommandContext<'_>, args: Args) {
    let Args::Target(domain) = args else { return };

    ctx.print(format!("; <<>> DiG 9.18.24 <<>> {domain}"), SegmentStyle::Plain);
    ctx.print(
        ";; ->>HEADER<<- opcode: QUERY, status: NOERROR, id: 4242",
        SegmentStyle::Plain,
    );
    ctx.print("", SegmentStyle::Plain);
    ctx.print(";; ANSWER SECTION:", SegmentStyle::Accent);
    ctx.print(
        format!("{domain}.\t\t300\tIN\tA\t203.0.113.10"),
        SegmentStyle::Plain,
    );
    ctx.print("", SegmentStyle::Plain);
    ctx.print(";; Query time: 12 msec", SegmentStyle::Plain);
}

fn ssh(ctx: &mut CommandContext<'_>, args: Args) {
    let Args::Login { user, host } = args else { return };

    ctx.print(format!("Connecting to {host}..."), SegmentStyle::Plain);
    ctx.print(format!("Welcome to {host}"), SegmentStyle::Success);
    ctx.session().login(&user, &host);
}

fn exit(ctx: &mut CommandContext<'_>, _args: Args) {
    ctx.session().logout();
    ctx.print("Connection closed.", SegmentStyle::Plain);
}
