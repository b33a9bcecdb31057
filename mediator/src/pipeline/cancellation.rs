use super::middleware::Middleware;
use super::next::{AnyResult, CommandFlow, EventFlow, Flow, Next, ResultFlow};
use async_trait::async_trait;
use mediator_abstractions::{MediatorError, MediatorResult, Message};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// 取消中间件
///
/// - 取消信号已触发时直接短路，返回 `MediatorError::Cancelled`，不再执行后续链路；
/// - 否则让后续链路与取消信号竞争，信号先到则丢弃仍在执行的链路。
///
/// 分发器本身不检查取消信号，需要该行为时显式加入本中间件。
#[derive(Clone, Copy, Debug, Default)]
pub struct CancellationMiddleware;

impl CancellationMiddleware {
    async fn guard<F: Flow>(
        next: Next<'_, F>,
        message: &dyn Message,
        ct: &CancellationToken,
    ) -> MediatorResult<F::Output> {
        if ct.is_cancelled() {
            debug!(message_name = message.name(), "dispatch cancelled before invocation");
            return Err(MediatorError::Cancelled);
        }

        ct.run_until_cancelled(next.run())
            .await
            .unwrap_or(Err(MediatorError::Cancelled))
    }
}

#[async_trait]
impl Middleware for CancellationMiddleware {
    async fn on_command(
        &self,
        next: Next<'_, CommandFlow>,
        cmd: &dyn Message,
        ct: &CancellationToken,
    ) -> MediatorResult<()> {
        Self::guard(next, cmd, ct).await
    }

    async fn on_command_with_result(
        &self,
        next: Next<'_, ResultFlow>,
        cmd: &dyn Message,
        ct: &CancellationToken,
    ) -> MediatorResult<AnyResult> {
        Self::guard(next, cmd, ct).await
    }

    async fn on_event(
        &self,
        next: Next<'_, EventFlow>,
        evt: &dyn Message,
        ct: &CancellationToken,
    ) -> MediatorResult<()> {
        Self::guard(next, evt, ct).await
    }
}
