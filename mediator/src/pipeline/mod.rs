//! 中间件管道（pipeline）
//!
//! 以责任链方式把有序的中间件组合在处理器之外：
//! `m0(next = m1(next = ... mN(next = handler)))`。
//! - `Middleware`：拦截命令/事件调用，可在调用后续链路前后执行逻辑；
//! - `Next`：指向"剩余链路"的游标，每次分发时新建；
//! - `CommandFlow` / `ResultFlow` / `EventFlow`：三种链路形态，仅终端返回类型不同。
//!
mod cancellation;
mod logging;
mod middleware;
mod next;

pub use cancellation::CancellationMiddleware;
pub use logging::{LoggingConfig, LoggingMiddleware};
pub use middleware::Middleware;
pub use next::{AnyResult, CommandFlow, EventFlow, Flow, Next, ResultFlow};
