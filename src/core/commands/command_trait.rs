// src/core/commands/command_trait.rs

//! Defines the core traits for all executable commands.

use crate::core::protocol::RespFrame;
use crate::core::storage::ExecutionContext;
use crate::core::{OpalDBError, RespValue};
use async_trait::async_trait;
use bitflags::bitflags;

bitflags! {
    /// Flags that describe the properties and behavior of a command.
    ///
    /// `WRITE` doubles as the mutating-command allow-list: the session engine
    /// persists a request to the append-only log exactly when its command
    /// carries this flag, so registering a new mutating command is a matter
    /// of flagging it here.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CommandFlags: u32 {
        /// The command modifies the dataset and is persisted before execution.
        const WRITE    = 1 << 0;
        /// The command only reads data.
        const READONLY = 1 << 1;
    }
}

/// A trait for parsing a command's arguments from a slice of `RespFrame`.
/// Arity is validated here; implementations never see the command-name token.
pub trait ParseCommand: Sized {
    fn parse(args: &[RespFrame]) -> Result<Self, OpalDBError>;
}

/// A trait for the actual execution logic of a command.
/// Implemented by each command's struct (e.g., `Get`, `Set`).
#[async_trait]
pub trait ExecutableCommand {
    async fn execute<'a>(&self, ctx: &mut ExecutionContext<'a>) -> Result<RespValue, OpalDBError>;
}

/// Static metadata every command exposes to the routing and persistence layers.
pub trait CommandSpec {
    fn name(&self) -> &'static str;
    fn flags(&self) -> CommandFlags;
}
