use super::middleware::Middleware;
use super::next::{AnyResult, CommandFlow, EventFlow, Next, ResultFlow};
use async_trait::async_trait;
use futures_core::future::BoxFuture;
use mediator_abstractions::{MediatorResult, Message};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 日志中间件配置
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingConfig {
    /// 以 Debug 格式记录消息内容
    pub log_payload: bool,
    /// 单次处理超过该耗时时记录告警；`None` 表示不检查
    pub slow_threshold: Option<Duration>,
}

/// 日志中间件：记录每次处理的开始、结束与耗时
///
/// 始终且只调用一次 `next`，不改变处理结果。
#[derive(Clone, Debug, Default)]
pub struct LoggingMiddleware {
    config: LoggingConfig,
}

impl LoggingMiddleware {
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    async fn observe<T: Send>(
        &self,
        kind: &'static str,
        message: &dyn Message,
        next: BoxFuture<'_, MediatorResult<T>>,
    ) -> MediatorResult<T> {
        let message_name = message.name();
        let message_id = message.id();
        if self.config.log_payload {
            debug!(kind, message_name, %message_id, payload = ?message, "handling message");
        } else {
            debug!(kind, message_name, %message_id, "handling message");
        }

        let started = Instant::now();
        let result = next.await;
        let elapsed = started.elapsed();
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(_) => debug!(kind, message_name, %message_id, elapsed_ms, "message handled"),
            Err(err) => warn!(
                kind,
                message_name,
                %message_id,
                elapsed_ms,
                error = %err,
                "message handling failed"
            ),
        }

        if self
            .config
            .slow_threshold
            .is_some_and(|threshold| elapsed > threshold)
        {
            warn!(kind, message_name, %message_id, elapsed_ms, "slow message handling");
        }

        result
    }
}

#[async_trait]
impl Middleware for LoggingMiddleware {
    async fn on_command(
        &self,
        next: Next<'_, CommandFlow>,
        cmd: &dyn Message,
        _ct: &CancellationToken,
    ) -> MediatorResult<()> {
        self.observe("command", cmd, next.run()).await
    }

    async fn on_command_with_result(
        &self,
        next: Next<'_, ResultFlow>,
        cmd: &dyn Message,
        _ct: &CancellationToken,
    ) -> MediatorResult<AnyResult> {
        self.observe("command", cmd, next.run()).await
    }

    async fn on_event(
        &self,
        next: Next<'_, EventFlow>,
        evt: &dyn Message,
        _ct: &CancellationToken,
    ) -> MediatorResult<()> {
        self.observe("event", evt, next.run()).await
    }
}
