// src/core/commands/hash/hgetall.rs

use crate::core::commands::command_trait::{
    CommandFlags, CommandSpec, ExecutableCommand, ParseCommand,
};
use crate::core::commands::helpers::extract_exact_args;
use crate::core::protocol::RespFrame;
use crate::core::storage::ExecutionContext;
use crate::core::{OpalDBError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

/// Represents the `HGETALL` command: every field and value of a hash as one
/// flat array, in field insertion order. A missing key yields an empty array.
#[derive(Debug, Clone, Default)]
pub struct HGetAll {
    pub key: Bytes,
}

impl ParseCommand for HGetAll {
    fn parse(args: &[RespFrame]) -> Result<Self, OpalDBError> {
        let mut args = extract_exact_args(args, 1, "hgetall")?.into_iter();
        Ok(HGetAll {
            key: args.next().unwrap(),
        })
    }
}

#[async_trait]
impl ExecutableCommand for HGetAll {
    async fn execute<'a>(&self, ctx: &mut ExecutionContext<'a>) -> Result<RespValue, OpalDBError> {
        let mut pairs = Vec::new();
        for (field, value) in ctx.db.hgetall(&self.key) {
            pairs.push(RespValue::BulkString(field));
            pairs.push(RespValue::BulkString(value));
        }
        Ok(RespValue::Array(pairs))
    }
}

impl CommandSpec for HGetAll {
    fn name(&self) -> &'static str {
        "hgetall"
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::READONLY
    }
}
