// src/core/commands/string/set.rs

use crate::core::commands::command_trait::{
    CommandFlags, CommandSpec, ExecutableCommand, ParseCommand,
};
use crate::core::commands::helpers::extract_exact_args;
use crate::core::protocol::RespFrame;
use crate::core::storage::ExecutionContext;
use crate::core::{OpalDBError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

/// Represents the `SET` command. Overwrites any previous value of the key.
#[derive(Debug, Clone, Default)]
pub struct Set {
    pub key: Bytes,
    pub value: Bytes,
}

impl ParseCommand for Set {
    fn parse(args: &[RespFrame]) -> Result<Self, OpalDBError> {
        let mut args = extract_exact_args(args, 2, "set")?.into_iter();
        Ok(Set {
            key: args.next().unwrap(),
            value: args.next().unwrap(),
        })
    }
}

#[async_trait]
impl ExecutableCommand for Set {
    async fn execute<'a>(&self, ctx: &mut ExecutionContext<'a>) -> Result<RespValue, OpalDBError> {
        ctx.db.set(self.key.clone(), self.value.clone());
        Ok(RespValue::SimpleString("OK".to_string()))
    }
}

impl CommandSpec for Set {
    fn name(&self) -> &'static str {
        "set"
    }

    fn flags(&self) -> CommandFlags {
        CommandFlags::WRITE
    }
}
