//! 中介者契约层（mediator-abstractions）
//!
//! 定义进程内命令/事件分发所需的最小契约，不包含任何调度逻辑：
//! - 消息（`message`）：`Message` 基础能力与 `MessageMetadata` 元数据
//! - 命令（`command`）：单一接收者，可选返回结果（`Command` / `CommandWithResult`）
//! - 事件（`event`）：零到多个接收者的通知（`Event`）
//! - 处理器（`handler`）：三类消息对应的处理器 trait
//! - 解析器（`resolver`）：按消息类型产出处理器的外部协作者
//! - 错误（`error`）：统一的 `MediatorError`
//!
//! 调度（中间件链、广播策略）由 `mediator` crate 实现；
//! `mediator-macros` 提供 `#[command]` / `#[event]` 宏以减少样板代码。
//!
pub mod command;
pub mod error;
pub mod event;
pub mod handler;
pub mod message;
pub mod resolver;

pub use command::{Command, CommandWithResult};
pub use error::{MediatorError, MediatorResult};
pub use event::Event;
pub use handler::{CommandHandler, CommandWithResultHandler, EventHandler};
pub use message::{AsAny, Message, MessageMetadata, short_type_name};
pub use resolver::HandlerResolver;

/// 取消信号，贯穿一次分发中的每个中间件与处理器
pub use tokio_util::sync::CancellationToken;

// 允许在本 crate 内部通过 ::mediator_abstractions 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::mediator_abstractions 路径。
extern crate self as mediator_abstractions;
