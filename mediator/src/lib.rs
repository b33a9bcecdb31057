//! 进程内中介者（mediator）
//!
//! 调用方发布命令或广播事件，而无需知道由哪个处理器处理：
//! - `Mediator`：分发门面，实现 [`Dispatcher`] 的 `publish` / `publish_with_result` / `broadcast`；
//! - `pipeline`：中间件责任链（`Middleware`、`Next`）以及内置的日志、取消中间件；
//! - `HandlerRegistry`：基于内存的 [`HandlerResolver`] 实现。
//!
//! 分发器不做重试、不切换执行上下文，只在处理器或中间件自身挂起的位置等待。
//!
pub mod dispatcher;
pub mod pipeline;
pub mod registry;

pub use dispatcher::{Dispatcher, Mediator};
pub use pipeline::{
    AnyResult, CancellationMiddleware, CommandFlow, EventFlow, Flow, LoggingConfig,
    LoggingMiddleware, Middleware, Next, ResultFlow,
};
pub use registry::HandlerRegistry;

pub use mediator_abstractions::{
    CancellationToken, Command, CommandHandler, CommandWithResult, CommandWithResultHandler, Event,
    EventHandler, HandlerResolver, MediatorError, MediatorResult, Message, MessageMetadata,
};
