// src/core/commands/hash/hset.rs

use crate::core::commands::command_trait::{
    CommandFlags, CommandSpec, ExecutableCommand, ParseCommand,
};
use crate::core::commands::helpers::extract_exact_args;
use crate::core::protocol::RespFrame;
use crate::core::storage::ExecutionContext;
use crate::core::{OpalDBError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

/// Represents the `HSET` command: stores one field of a hash.
#[derive(Debug, Clone, Default)]
pub struct HSet {
    pub key: Bytes,
    pub field: Bytes,
    pub value: Bytes,
}

impl ParseCommand for HSet {
    fn parse(args: &[RespFrame]) -> Result<Self, OpalDBError> {
        let mut args = extract_exact_args(args, 3, "hset")?.into_iter();
        Ok(HSet {
            key: args.next().unwrap(),
            field: args.next().unwrap(),
            value: args.next().unwrap(),
        })
    }
}

#[async_trait]
impl ExecutableCommand for HSet {
    async fn execute<'a>(&self, ctx: &mut ExecutionContext<'a>) -> Result<RespValue, OpalDBError> {
        ctx.db
            .hset(self.key.clone(), self.field.clone(), self.value.clone());
        Ok(RespValue::SimpleString("OK".to_string()))
    }
}

impl CommandSpec for HSet {
    fn name(&self) -> &'static str {
        "hset"
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::WRITE
    }
}
