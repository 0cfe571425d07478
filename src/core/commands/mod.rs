// src/core/commands/mod.rs

//! This module defines all supported commands and the central `Command` enum
//! that encapsulates their parsed state. The enum is the name-keyed dispatch
//! table consumed by the session engine and the replay path: a request frame
//! is converted into a `Command` and executed against the store.

pub mod command_trait;
pub mod generic;
pub mod hash;
pub mod helpers;
pub mod string;

use crate::core::protocol::RespFrame;
use crate::core::storage::ExecutionContext;
use crate::core::{OpalDBError, RespValue};
use command_trait::{CommandFlags, CommandSpec, ExecutableCommand, ParseCommand};

use generic::Ping;
use hash::{HGet, HGetAll, HSet};
use string::{Get, Set};

/// One fully parsed client command.
#[derive(Debug, Clone)]
pub enum Command {
    Ping(Ping),
    Get(Get),
    Set(Set),
    HGet(HGet),
    HGetAll(HGetAll),
    HSet(HSet),
}

macro_rules! delegate {
    ($self:ident, $cmd:ident => $body:expr) => {
        match $self {
            Command::Ping($cmd) => $body,
            Command::Get($cmd) => $body,
            Command::Set($cmd) => $body,
            Command::HGet($cmd) => $body,
            Command::HGetAll($cmd) => $body,
            Command::HSet($cmd) => $body,
        }
    };
}

impl Command {
    pub fn name(&self) -> &'static str {
        delegate!(self, cmd => cmd.name())
    }

    pub fn flags(&self) -> CommandFlags {
        delegate!(self, cmd => cmd.flags())
    }

    /// Whether the request must be persisted to the append-only log before
    /// it executes.
    pub fn is_write(&self) -> bool {
        self.flags().contains(CommandFlags::WRITE)
    }

    pub async fn execute<'a>(
        &self,
        ctx: &mut ExecutionContext<'a>,
    ) -> Result<RespValue, OpalDBError> {
        delegate!(self, cmd => cmd.execute(ctx).await)
    }
}

impl TryFrom<&RespFrame> for Command {
    type Error = OpalDBError;

    /// Parses a request frame (an array of bulk strings) into a command.
    /// Command names are case-insensitive.
    fn try_from(frame: &RespFrame) -> Result<Self, Self::Error> {
        let RespFrame::Array(parts) = frame else {
            return Err(OpalDBError::InvalidRequest(
                "request is not an array".to_string(),
            ));
        };
        let Some(RespFrame::BulkString(name)) = parts.first() else {
            return Err(OpalDBError::InvalidRequest(
                "request has no command name".to_string(),
            ));
        };

        let name = String::from_utf8_lossy(name).to_lowercase();
        let args = &parts[1..];

        match name.as_str() {
            "ping" => Ok(Command::Ping(Ping::parse(args)?)),
            "get" => Ok(Command::Get(Get::parse(args)?)),
            "set" => Ok(Command::Set(Set::parse(args)?)),
            "hget" => Ok(Command::HGet(HGet::parse(args)?)),
            "hgetall" => Ok(Command::HGetAll(HGetAll::parse(args)?)),
            "hset" => Ok(Command::HSet(HSet::parse(args)?)),
            other => Err(OpalDBError::UnknownCommand(other.to_string())),
        }
    }
}
