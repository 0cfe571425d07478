// src/core/commands/generic/ping.rs

use crate::core::commands::command_trait::{
    CommandFlags, CommandSpec, ExecutableCommand, ParseCommand,
};
use crate::core::commands::helpers::extract_bytes;
use crate::core::protocol::RespFrame;
use crate::core::storage::ExecutionContext;
use crate::core::{OpalDBError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

/// Represents the `PING` command. With no argument it replies `PONG`; with
/// one argument it echoes the argument back as a bulk string.
#[derive(Debug, Clone, Default)]
pub struct Ping {
    pub message: Option<Bytes>,
}

impl ParseCommand for Ping {
    fn parse(args: &[RespFrame]) -> Result<Self, OpalDBError> {
        match args {
            [] => Ok(Ping { message: None }),
            [message] => Ok(Ping {
                message: Some(extract_bytes(message)?),
            }),
            _ => Err(OpalDBError::WrongArgumentCount("ping".to_string())),
        }
    }
}

#[async_trait]
impl ExecutableCommand for Ping {
    async fn execute<'a>(&self, _ctx: &mut ExecutionContext<'a>) -> Result<RespValue, OpalDBError> {
        Ok(match &self.message {
            None => RespValue::SimpleString("PONG".to_string()),
            Some(message) => RespValue::BulkString(message.clone()),
        })
    }
}

impl CommandSpec for Ping {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::READONLY
    }
}
