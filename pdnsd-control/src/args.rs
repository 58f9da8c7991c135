//! Argument validation
//!
//! Each remote command has a number of required positional arguments followed
//! by an ordered list of optional slots. Optional tokens are matched left to
//! right: a token binds to the first remaining slot that recognizes it, and
//! any slot passed over stays empty. A token no remaining slot recognizes is
//! rejected. This makes `source f o 600 on noauth` valid but
//! `source f o on 600` not.

use std::net::{Ipv4Addr, Ipv6Addr};

use tracing::debug;

use crate::{
    ControlError, Result,
    grammar::{AddType, Command, Grammar},
    protocol::{DEFAULT_TTL, RecordData, RecordFlags, Request},
    rrtype,
};

const NOAUTH: &str = "noauth";

/// An optional argument position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// A token starting with a digit
    Ttl,
    /// `on` or `off`
    Toggle,
    /// The literal `noauth`
    NoAuth,
    /// A token not starting with a digit, naming an RR type
    RrType,
}

impl Slot {
    fn recognizes(self, grammar: &Grammar, token: &str) -> bool {
        match self {
            Self::Ttl => starts_with_digit(token),
            Self::Toggle => grammar.is_toggle(token),
            Self::NoAuth => token == NOAUTH,
            Self::RrType => !starts_with_digit(token),
        }
    }
}

const SOURCE_SLOTS: &[Slot] = &[Slot::Ttl, Slot::Toggle, Slot::NoAuth];
const ADD_SLOTS: &[Slot] = &[Slot::Ttl, Slot::NoAuth];
const NEG_SLOTS: &[Slot] = &[Slot::RrType, Slot::Ttl];

/// Values collected from the optional slots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Optionals {
    pub ttl: Option<u32>,
    pub toggle: Option<bool>,
    pub noauth: bool,
    pub rr_type: Option<u16>,
}

impl Optionals {
    #[must_use]
    pub fn ttl(&self) -> u32 {
        self.ttl.unwrap_or(DEFAULT_TTL)
    }

    #[must_use]
    pub const fn flags(&self) -> RecordFlags {
        if self.noauth {
            RecordFlags::NONE
        } else {
            RecordFlags::LOCAL
        }
    }
}

/// Bind `tokens` to `slots` in order.
///
/// # Errors
///
/// Returns [`ControlError::UnexpectedArgument`] for a token no remaining slot
/// recognizes, or the parse error of the slot a token was bound to.
pub fn match_slots(
    grammar: &Grammar,
    command: Command,
    slots: &[Slot],
    tokens: &[String],
) -> Result<Optionals> {
    let mut optionals = Optionals::default();
    let mut remaining = slots.iter();

    for token in tokens {
        let slot = remaining
            .by_ref()
            .find(|slot| slot.recognizes(grammar, token))
            .ok_or_else(|| ControlError::UnexpectedArgument {
                command: command.token(),
                token: token.clone(),
                usage: command.usage(),
            })?;

        match slot {
            Slot::Ttl => optionals.ttl = Some(parse_ttl(token)?),
            Slot::Toggle => optionals.toggle = Some(grammar.toggle(token)?),
            Slot::NoAuth => optionals.noauth = true,
            Slot::RrType => optionals.rr_type = Some(grammar.rr_type(token)?),
        }
    }

    Ok(optionals)
}

/// Validate the arguments of a remote command and build its request.
///
/// `args` excludes the command token itself.
///
/// # Errors
///
/// Returns a usage error if the argument count or shape is not admissible
/// for the command, or if a field fails to parse.
pub fn parse_request(grammar: &Grammar, command: Command, args: &[String]) -> Result<Request> {
    check_arity(command, args.len())?;

    let request = match command {
        Command::Status => Request::Status,
        Command::Server => Request::Server {
            label: args[0].clone(),
            action: grammar.server_action(&args[1])?,
            addresses: args.get(2).cloned().unwrap_or_default(),
        },
        Command::Record => Request::Record {
            name: args[0].clone(),
            action: grammar.record_action(&args[1])?,
        },
        Command::Source => {
            let optionals = match_slots(grammar, command, SOURCE_SLOTS, &args[2..])?;
            Request::Source {
                path: args[0].clone(),
                owner: args[1].clone(),
                ttl: optionals.ttl(),
                serve_aliases: optionals.toggle.unwrap_or(false),
                flags: optionals.flags(),
            }
        }
        Command::Add => parse_add(grammar, args)?,
        Command::Neg => {
            let optionals = match_slots(grammar, command, NEG_SLOTS, &args[1..])?;
            Request::Neg {
                name: args[0].clone(),
                rr_type: optionals.rr_type.unwrap_or(rrtype::WHOLE_DOMAIN),
                ttl: optionals.ttl(),
            }
        }
        Command::Help | Command::Version | Command::ListRrTypes => {
            return Err(ControlError::UnknownToken {
                kind: "remote command",
                token: command.token().to_string(),
            });
        }
    };

    debug!("Validated request: {request:?}");
    Ok(request)
}

/// # Errors
///
/// Returns [`ControlError::ArgumentCount`] if `count` is outside the
/// command's admissible range.
pub fn check_arity(command: Command, count: usize) -> Result<()> {
    if command.arity().contains(&count) {
        Ok(())
    } else {
        Err(arity_error(command))
    }
}

fn arity_error(command: Command) -> ControlError {
    ControlError::ArgumentCount {
        command: command.token(),
        usage: command.usage(),
    }
}

fn parse_add(grammar: &Grammar, args: &[String]) -> Result<Request> {
    let add_type = grammar.add_type(&args[0])?;
    let required = add_type.required_args();
    if args.len() < required || args.len() > required + ADD_SLOTS.len() {
        return Err(arity_error(Command::Add));
    }

    let value = &args[1];
    let name = args[2].clone();
    let data = match add_type {
        AddType::A => RecordData::A(value.parse::<Ipv4Addr>().map_err(|_| {
            ControlError::InvalidAddress {
                family: "IPv4",
                value: value.clone(),
            }
        })?),
        AddType::Aaaa => RecordData::Aaaa(value.parse::<Ipv6Addr>().map_err(|_| {
            ControlError::InvalidAddress {
                family: "IPv6",
                value: value.clone(),
            }
        })?),
        AddType::Ptr => RecordData::Ptr(value.clone()),
        AddType::Cname => RecordData::Cname(value.clone()),
        AddType::Mx => RecordData::Mx {
            preference: parse_preference(&args[3])?,
            exchange: value.clone(),
        },
    };

    let optionals = match_slots(grammar, Command::Add, ADD_SLOTS, &args[required..])?;

    Ok(Request::Add {
        name,
        ttl: optionals.ttl(),
        flags: optionals.flags(),
        data,
    })
}

fn starts_with_digit(token: &str) -> bool {
    token.as_bytes().first().is_some_and(u8::is_ascii_digit)
}

/// # Errors
///
/// Returns [`ControlError::InvalidTtl`] unless `token` is a decimal value
/// that fits the signed 32-bit TTL field.
pub fn parse_ttl(token: &str) -> Result<u32> {
    token
        .parse::<i32>()
        .ok()
        .and_then(|ttl| u32::try_from(ttl).ok())
        .ok_or_else(|| ControlError::InvalidTtl(token.to_string()))
}

fn parse_preference(token: &str) -> Result<u16> {
    token
        .parse::<u16>()
        .map_err(|_| ControlError::InvalidPreference(token.to_string()))
}
