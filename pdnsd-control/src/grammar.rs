//! Command grammar
//!
//! Immutable token tables built once per process. Every lookup is an exact
//! match; a miss is a usage error naming the token.

use std::{collections::HashMap, ops::RangeInclusive};

use crate::{
    ControlError, Result,
    rrtype::{self, TypeRegistry},
};

/// Optional parts of the command surface.
///
/// Defaults follow the cargo features this crate was built with, but the
/// grammar only ever consults these flags, so tests can exercise either
/// configuration from a single build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// `add aaaa` is accepted
    pub ipv6: bool,
    /// The full RR type registry is available to `neg` and `list-rrtypes`
    pub extended_rr_types: bool,
}

impl Capabilities {
    /// Capabilities enabled at build time
    #[must_use]
    pub const fn compiled() -> Self {
        Self {
            ipv6: cfg!(feature = "ipv6"),
            extended_rr_types: cfg!(feature = "extended-rr-types"),
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::compiled()
    }
}

/// Top-level commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Help,
    Version,
    ListRrTypes,
    Status,
    Server,
    Record,
    Source,
    Add,
    Neg,
}

impl Command {
    /// Every command, in help order
    pub const ALL: [Self; 9] = [
        Self::Help,
        Self::Version,
        Self::ListRrTypes,
        Self::Status,
        Self::Server,
        Self::Record,
        Self::Source,
        Self::Add,
        Self::Neg,
    ];

    /// The token that selects this command
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Version => "version",
            Self::ListRrTypes => "list-rrtypes",
            Self::Status => "status",
            Self::Server => "server",
            Self::Record => "record",
            Self::Source => "source",
            Self::Add => "add",
            Self::Neg => "neg",
        }
    }

    /// Wire opcode; `None` for commands answered locally.
    #[must_use]
    pub const fn opcode(self) -> Option<u16> {
        match self {
            Self::Help | Self::Version | Self::ListRrTypes => None,
            Self::Status => Some(1),
            Self::Server => Some(2),
            Self::Record => Some(3),
            Self::Source => Some(4),
            Self::Add => Some(5),
            Self::Neg => Some(6),
        }
    }

    /// Admissible number of arguments following the command token.
    #[must_use]
    pub const fn arity(self) -> RangeInclusive<usize> {
        match self {
            Self::Help | Self::Version | Self::ListRrTypes | Self::Status => 0..=0,
            Self::Server => 2..=3,
            Self::Record => 2..=2,
            Self::Source => 2..=5,
            Self::Add => 3..=6,
            Self::Neg => 1..=3,
        }
    }

    #[must_use]
    pub const fn usage(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Version => "version",
            Self::ListRrTypes => "list-rrtypes",
            Self::Status => "status",
            Self::Server => "server <label> (up|down|retest) [dns1,dns2,...]",
            Self::Record => "record <name> (delete|invalidate)",
            Self::Source => "source <file> <owner> [ttl] [(on|off)] [noauth]",
            Self::Add => "add (a|aaaa|ptr|cname|mx) <value> <name> [ttl|pref ttl] [noauth]",
            Self::Neg => "neg <name> [type] [ttl]",
        }
    }
}

/// `server` sub-actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ServerAction {
    Up = 1,
    Down = 2,
    Retest = 3,
}

/// `record` sub-actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum RecordAction {
    Delete = 1,
    Invalidate = 2,
}

/// Record types accepted by `add`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddType {
    A,
    Aaaa,
    Ptr,
    Cname,
    Mx,
}

impl AddType {
    /// RR type id sent as the `add` sub-opcode
    #[must_use]
    pub const fn rr_type(self) -> u16 {
        match self {
            Self::A => rrtype::A,
            Self::Aaaa => rrtype::AAAA,
            Self::Ptr => rrtype::PTR,
            Self::Cname => rrtype::CNAME,
            Self::Mx => rrtype::MX,
        }
    }

    /// Positional arguments before the optional `[ttl] [noauth]` suffix,
    /// counting the type token itself.
    #[must_use]
    pub const fn required_args(self) -> usize {
        match self {
            Self::Mx => 4,
            _ => 3,
        }
    }
}

/// All token tables, built once
#[derive(Debug, Clone)]
pub struct Grammar {
    capabilities: Capabilities,
    commands: HashMap<&'static str, Command>,
    server_actions: HashMap<&'static str, ServerAction>,
    record_actions: HashMap<&'static str, RecordAction>,
    toggles: HashMap<&'static str, bool>,
    add_types: HashMap<&'static str, AddType>,
    registry: TypeRegistry,
}

impl Grammar {
    #[must_use]
    pub fn new(capabilities: Capabilities) -> Self {
        let commands = Command::ALL.iter().map(|&c| (c.token(), c)).collect();

        let server_actions = HashMap::from([
            ("up", ServerAction::Up),
            ("down", ServerAction::Down),
            ("retest", ServerAction::Retest),
        ]);

        let record_actions = HashMap::from([
            ("delete", RecordAction::Delete),
            ("invalidate", RecordAction::Invalidate),
        ]);

        let toggles = HashMap::from([("on", true), ("off", false)]);

        let mut add_types = HashMap::from([
            ("a", AddType::A),
            ("ptr", AddType::Ptr),
            ("cname", AddType::Cname),
            ("mx", AddType::Mx),
        ]);
        if capabilities.ipv6 {
            add_types.insert("aaaa", AddType::Aaaa);
        }

        Self {
            capabilities,
            commands,
            server_actions,
            record_actions,
            toggles,
            add_types,
            registry: TypeRegistry::new(capabilities.extended_rr_types),
        }
    }

    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    #[must_use]
    pub const fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// # Errors
    ///
    /// Returns [`ControlError::UnknownToken`] if `token` is not a command.
    pub fn command(&self, token: &str) -> Result<Command> {
        lookup(&self.commands, "command", token)
    }

    /// # Errors
    ///
    /// Returns [`ControlError::UnknownToken`] if `token` is not a server action.
    pub fn server_action(&self, token: &str) -> Result<ServerAction> {
        lookup(&self.server_actions, "server action", token)
    }

    /// # Errors
    ///
    /// Returns [`ControlError::UnknownToken`] if `token` is not a record action.
    pub fn record_action(&self, token: &str) -> Result<RecordAction> {
        lookup(&self.record_actions, "record action", token)
    }

    /// # Errors
    ///
    /// Returns [`ControlError::UnknownToken`] for anything but `on` / `off`.
    pub fn toggle(&self, token: &str) -> Result<bool> {
        lookup(&self.toggles, "on/off value", token)
    }

    #[must_use]
    pub fn is_toggle(&self, token: &str) -> bool {
        self.toggles.contains_key(token)
    }

    /// # Errors
    ///
    /// Returns [`ControlError::UnknownToken`] if the type cannot be added
    /// with the enabled capabilities.
    pub fn add_type(&self, token: &str) -> Result<AddType> {
        lookup(&self.add_types, "record type", token)
    }

    /// # Errors
    ///
    /// Returns [`ControlError::UnknownToken`] if `token` is not an enabled
    /// RR type name.
    pub fn rr_type(&self, token: &str) -> Result<u16> {
        self.registry
            .id(token)
            .ok_or_else(|| ControlError::UnknownToken {
                kind: "RR type",
                token: token.to_string(),
            })
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new(Capabilities::default())
    }
}

fn lookup<T: Copy>(
    table: &HashMap<&'static str, T>,
    kind: &'static str,
    token: &str,
) -> Result<T> {
    table
        .get(token)
        .copied()
        .ok_or_else(|| ControlError::UnknownToken {
            kind,
            token: token.to_string(),
        })
}
