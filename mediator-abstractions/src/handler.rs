//! 处理器（Handler）
//!
//! 三类消息各自对应的处理器契约。处理器按引用接收消息，
//! 同一个事件实例可以依次交给多个处理器，中间件也可以多次调用后续链路。
//!
use crate::command::{Command, CommandWithResult};
use crate::error::MediatorResult;
use crate::event::Event;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Command,
{
    async fn handle(&self, cmd: &C, ct: &CancellationToken) -> MediatorResult<()>;
}

#[async_trait]
pub trait CommandWithResultHandler<C>: Send + Sync
where
    C: CommandWithResult,
{
    async fn handle(&self, cmd: &C, ct: &CancellationToken) -> MediatorResult<C::Result>;
}

/// 事件处理器：同一事件类型可注册多个
#[async_trait]
pub trait EventHandler<E>: Send + Sync
where
    E: Event,
{
    async fn handle(&self, evt: &E, ct: &CancellationToken) -> MediatorResult<()>;
}
