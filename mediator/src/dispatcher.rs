//! 分发门面（Mediator）
//!
//! 串联解析器与中间件链：解析处理器 -> 以处理器为终端构建链路 -> 执行。
//! - 命令：必须恰好解析到一个处理器，否则返回 `HandlerNotFound`；
//! - 事件：按解析顺序逐个执行，前一个处理器（含其中间件链）完成后才开始下一个，
//!   首个失败立即中止并返回（fail-fast）；无处理器时仅记录告警；
//! - 处理器与中间件的错误原样透传，不包装、不吞没。
//!
use crate::pipeline::{AnyResult, CommandFlow, EventFlow, Middleware, Next, ResultFlow};
use async_trait::async_trait;
use bon::Builder;
use futures_util::{FutureExt, TryFutureExt};
use mediator_abstractions::{
    Command, CommandWithResult, Event, HandlerResolver, MediatorError, MediatorResult,
};
use std::any::type_name;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, debug_span, warn};

/// 分发器：发布命令与广播事件
///
/// - 参数以引用传入，"消息缺失"在编译期即被排除；
/// - 该 trait 带有泛型方法，通常以具体实现类型注入使用。
///
/// 传入消息引用即可编译：
///
/// ```
/// use mediator::{Dispatcher, HandlerRegistry, Mediator, MediatorResult};
/// use mediator_abstractions::{CancellationToken, Command};
///
/// async fn present<C: Command>(mediator: &Mediator<HandlerRegistry>, cmd: &C) -> MediatorResult<()> {
///     let ct = CancellationToken::new();
///     mediator.publish::<C>(cmd, &ct).await
/// }
/// ```
///
/// 同一调用以 `None` 代替消息时类型不匹配：
///
/// ```compile_fail,E0308
/// use mediator::{Dispatcher, HandlerRegistry, Mediator, MediatorResult};
/// use mediator_abstractions::{CancellationToken, Command};
///
/// async fn absent<C: Command>(mediator: &Mediator<HandlerRegistry>, _cmd: &C) -> MediatorResult<()> {
///     let ct = CancellationToken::new();
///     mediator.publish::<C>(None, &ct).await
/// }
/// ```
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// 发布无返回值命令
    async fn publish<C>(&self, cmd: &C, ct: &CancellationToken) -> MediatorResult<()>
    where
        C: Command;

    /// 发布带返回值命令，原样返回处理器的结果
    async fn publish_with_result<C>(
        &self,
        cmd: &C,
        ct: &CancellationToken,
    ) -> MediatorResult<C::Result>
    where
        C: CommandWithResult;

    /// 广播事件到全部处理器（可以为零个）
    async fn broadcast<E>(&self, evt: &E, ct: &CancellationToken) -> MediatorResult<()>
    where
        E: Event;
}

/// 进程内分发器
///
/// ```rust
/// use mediator::{HandlerRegistry, LoggingMiddleware, Mediator};
/// use std::sync::Arc;
///
/// let mediator = Mediator::builder()
///     .resolver(HandlerRegistry::new())
///     .middlewares(vec![Arc::new(LoggingMiddleware::default())])
///     .build();
/// assert_eq!(mediator.middlewares().len(), 1);
/// ```
#[derive(Builder)]
pub struct Mediator<R: HandlerResolver> {
    resolver: R,
    /// 有序中间件；第一个位于链路最外层
    #[builder(default)]
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl<R: HandlerResolver> Mediator<R> {
    /// 不带中间件的分发器
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            middlewares: Vec::new(),
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn middlewares(&self) -> &[Arc<dyn Middleware>] {
        &self.middlewares
    }

    async fn dispatch_command<C>(&self, cmd: &C, ct: &CancellationToken) -> MediatorResult<()>
    where
        C: Command,
    {
        debug!("building command handler");
        let handler = self
            .resolver
            .command_handler::<C>()
            .ok_or(MediatorError::HandlerNotFound {
                command: type_name::<C>(),
            })?;

        debug!("invoking command handler");
        let terminal = || handler.handle(cmd, ct);
        Next::<CommandFlow>::new(&self.middlewares, &terminal, cmd, ct)
            .run()
            .await?;

        debug!("command handled");
        Ok(())
    }

    async fn dispatch_command_with_result<C>(
        &self,
        cmd: &C,
        ct: &CancellationToken,
    ) -> MediatorResult<C::Result>
    where
        C: CommandWithResult,
    {
        debug!("building command handler");
        let handler = self
            .resolver
            .command_with_result_handler::<C>()
            .ok_or(MediatorError::ResultHandlerNotFound {
                command: type_name::<C>(),
                result: type_name::<C::Result>(),
            })?;

        debug!("invoking command handler");
        let terminal = || {
            handler
                .handle(cmd, ct)
                .map_ok(|result| Box::new(result) as AnyResult)
                .boxed()
        };
        let output = Next::<ResultFlow>::new(&self.middlewares, &terminal, cmd, ct)
            .run()
            .await?;

        debug!("command handled");
        output
            .downcast::<C::Result>()
            .map(|result| *result)
            .map_err(|_| MediatorError::TypeMismatch {
                expected: type_name::<C::Result>(),
                found: "unknown",
            })
    }

    async fn dispatch_event<E>(&self, evt: &E, ct: &CancellationToken) -> MediatorResult<()>
    where
        E: Event,
    {
        debug!("building event handlers collection");
        let Some(handlers) = self.resolver.event_handlers::<E>() else {
            warn!("no event handlers found, collection was absent");
            return Ok(());
        };

        if handlers.is_empty() {
            warn!("no event handlers found, collection is empty");
            return Ok(());
        }

        debug!(handlers = handlers.len(), "invoking event handlers");
        for (index, handler) in handlers.iter().enumerate() {
            let terminal = || handler.handle(evt, ct);
            Next::<EventFlow>::new(&self.middlewares, &terminal, evt, ct)
                .run()
                .await?;
            debug!(index, "event handler completed");
        }

        Ok(())
    }
}

#[async_trait]
impl<R: HandlerResolver> Dispatcher for Mediator<R> {
    async fn publish<C>(&self, cmd: &C, ct: &CancellationToken) -> MediatorResult<()>
    where
        C: Command,
    {
        let span = debug_span!("command", command_name = cmd.name(), command_id = %cmd.id());
        self.dispatch_command(cmd, ct).instrument(span).await
    }

    async fn publish_with_result<C>(
        &self,
        cmd: &C,
        ct: &CancellationToken,
    ) -> MediatorResult<C::Result>
    where
        C: CommandWithResult,
    {
        let span = debug_span!("command", command_name = cmd.name(), command_id = %cmd.id());
        self.dispatch_command_with_result(cmd, ct)
            .instrument(span)
            .await
    }

    async fn broadcast<E>(&self, evt: &E, ct: &CancellationToken) -> MediatorResult<()>
    where
        E: Event,
    {
        let span = debug_span!("event", event_name = evt.name(), event_id = %evt.id());
        self.dispatch_event(evt, ct).instrument(span).await
    }
}
