//! 处理器解析器（HandlerResolver）
//!
//! 分发器依赖的外部协作者：按消息类型同步产出处理器实例。
//! - 命令：`None` 表示没有处理器，分发器会返回 `HandlerNotFound`；
//! - 事件：`None`（集合缺失）与空集合都视为"无人订阅"，仅记录告警。
//!
//! 该 trait 带有泛型方法，通常以具体实现类型注入使用。
//!
use crate::command::{Command, CommandWithResult};
use crate::event::Event;
use crate::handler::{CommandHandler, CommandWithResultHandler, EventHandler};
use std::sync::Arc;

pub trait HandlerResolver: Send + Sync {
    /// 解析命令处理器（至多一个）
    fn command_handler<C>(&self) -> Option<Arc<dyn CommandHandler<C>>>
    where
        C: Command;

    /// 解析带返回值命令的处理器（至多一个）
    fn command_with_result_handler<C>(&self) -> Option<Arc<dyn CommandWithResultHandler<C>>>
    where
        C: CommandWithResult;

    /// 解析事件处理器集合，保持解析顺序
    fn event_handlers<E>(&self) -> Option<Vec<Arc<dyn EventHandler<E>>>>
    where
        E: Event;
}

impl<R> HandlerResolver for Arc<R>
where
    R: HandlerResolver,
{
    fn command_handler<C>(&self) -> Option<Arc<dyn CommandHandler<C>>>
    where
        C: Command,
    {
        (**self).command_handler::<C>()
    }

    fn command_with_result_handler<C>(&self) -> Option<Arc<dyn CommandWithResultHandler<C>>>
    where
        C: CommandWithResult,
    {
        (**self).command_with_result_handler::<C>()
    }

    fn event_handlers<E>(&self) -> Option<Vec<Arc<dyn EventHandler<E>>>>
    where
        E: Event,
    {
        (**self).event_handlers::<E>()
    }
}
