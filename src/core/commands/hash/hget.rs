// src/core/commands/hash/hget.rs

use crate::core::commands::command_trait::{
    CommandFlags, CommandSpec, ExecutableCommand, ParseCommand,
};
use crate::core::commands::helpers::extract_exact_args;
use crate::core::protocol::RespFrame;
use crate::core::storage::ExecutionContext;
use crate::core::{OpalDBError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

/// Represents the `HGET` command.
#[derive(Debug, Clone, Default)]
pub struct HGet {
    pub key: Bytes,
    pub field: Bytes,
}

impl ParseCommand for HGet {
    fn parse(args: &[RespFrame]) -> Result<Self, OpalDBError> {
        let mut args = extract_exact_args(args, 2, "hget")?.into_iter();
        Ok(HGet {
            key: args.next().unwrap(),
            field: args.next().unwrap(),
        })
    }
}

#[async_trait]
impl ExecutableCommand for HGet {
    async fn execute<'a>(&self, ctx: &mut ExecutionContext<'a>) -> Result<RespValue, OpalDBError> {
        Ok(match ctx.db.hget(&self.key, &self.field) {
            Some(value) => RespValue::BulkString(value),
            None => RespValue::Null,
        })
    }
}

impl CommandSpec for HGet {
    fn name(&self) -> &'static str {
        "hget"
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::READONLY
    }
}
