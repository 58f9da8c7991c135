//! One invocation: resolve the command tokens and carry them out.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::{
    ControlError, Result,
    args::{self, parse_request},
    client::{ControlClient, Connector, Reply},
    grammar::{Command, Grammar},
    protocol::Request,
};

/// Commands answered without contacting the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCommand {
    Help,
    Version,
    ListRrTypes,
}

/// A fully validated invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Local(LocalCommand),
    Remote(Request),
}

impl Invocation {
    /// Resolve and validate the command tokens.
    ///
    /// # Errors
    ///
    /// Returns a usage error for a missing or unknown command or for
    /// arguments the command does not accept.
    pub fn parse(grammar: &Grammar, tokens: &[String]) -> Result<Self> {
        let (first, rest) = tokens.split_first().ok_or(ControlError::MissingCommand)?;
        let command = grammar.command(first)?;

        let local = match command {
            Command::Help => Some(LocalCommand::Help),
            Command::Version => Some(LocalCommand::Version),
            Command::ListRrTypes => Some(LocalCommand::ListRrTypes),
            _ => None,
        };

        match local {
            Some(local) => {
                args::check_arity(command, rest.len())?;
                Ok(Self::Local(local))
            }
            None => parse_request(grammar, command, rest).map(Self::Remote),
        }
    }
}

/// Outcome of a successful invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A local command wrote its output
    Local,
    /// The daemon answered
    Remote(Reply),
}

/// Run one invocation against the daemon behind `client`.
///
/// Every usage check completes before the connector is asked for a
/// connection.
///
/// # Errors
///
/// Returns the usage, transport or daemon error that ended the invocation.
pub async fn run<C, W>(
    grammar: &Grammar,
    client: &ControlClient<C>,
    tokens: &[String],
    out: &mut W,
) -> Result<Outcome>
where
    C: Connector,
    W: AsyncWrite + Unpin + Send + ?Sized,
{
    match Invocation::parse(grammar, tokens)? {
        Invocation::Local(local) => {
            debug!("Running local command {local:?}");
            let text = match local {
                LocalCommand::Help => help_text(),
                LocalCommand::Version => version_text(),
                LocalCommand::ListRrTypes => rr_types_text(grammar),
            };
            out.write_all(text.as_bytes()).await?;
            out.flush().await?;
            Ok(Outcome::Local)
        }
        Invocation::Remote(request) => client
            .send_request(&request, out)
            .await
            .map(Outcome::Remote),
    }
}

/// Full usage text
#[must_use]
pub fn help_text() -> String {
    let mut text = String::from(
        "Usage: pdnsd-ctl [-c cachedir] [-q] <command> [arguments...]\n\
         \n\
         Commands:\n",
    );
    for command in Command::ALL {
        text.push_str("  ");
        text.push_str(command.usage());
        text.push('\n');
    }
    text.push_str(
        "\n\
         ttl defaults to 900 seconds. Records and sources are added as local\n\
         (authoritative) data unless noauth is given. neg without a type\n\
         negatively caches the whole domain.\n",
    );
    text
}

#[must_use]
pub fn version_text() -> String {
    format!("pdnsd-ctl, version {}\n", env!("CARGO_PKG_VERSION"))
}

/// The enabled RR types, one `NAME id` pair per line
#[must_use]
pub fn rr_types_text(grammar: &Grammar) -> String {
    let registry = grammar.registry();
    let mut text = format!("Available RR types ({}):\n", registry.len());
    for rr in registry.iter() {
        text.push_str(&format!("  {:<10} {}\n", rr.name, rr.id));
    }
    text
}
