// src/core/commands/string/get.rs

use crate::core::commands::command_trait::{
    CommandFlags, CommandSpec, ExecutableCommand, ParseCommand,
};
use crate::core::commands::helpers::extract_exact_args;
use crate::core::protocol::RespFrame;
use crate::core::storage::ExecutionContext;
use crate::core::{OpalDBError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

/// Represents the `GET` command.
#[derive(Debug, Clone, Default)]
pub struct Get {
    pub key: Bytes,
}

impl ParseCommand for Get {
    fn parse(args: &[RespFrame]) -> Result<Self, OpalDBError> {
        let mut args = extract_exact_args(args, 1, "get")?.into_iter();
        Ok(Get {
            key: args.next().unwrap(),
        })
    }
}

#[async_trait]
impl ExecutableCommand for Get {
    async fn execute<'a>(&self, ctx: &mut ExecutionContext<'a>) -> Result<RespValue, OpalDBError> {
        Ok(match ctx.db.get(&self.key) {
            Some(value) => RespValue::BulkString(value),
            None => RespValue::Null,
        })
    }
}

impl CommandSpec for Get {
    fn name(&self) -> &'static str {
        "get"
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::READONLY
    }
}
