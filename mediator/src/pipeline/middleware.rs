use super::next::{AnyResult, CommandFlow, EventFlow, Next, ResultFlow};
use async_trait::async_trait;
use mediator_abstractions::{MediatorResult, Message};
use tokio_util::sync::CancellationToken;

/// 中间件：拦截命令与事件的处理
///
/// - 调用 `next.run()` 继续执行剩余链路；不调用即短路（如缓存命中、鉴权拒绝），
///   多次调用也是合法的（如重试）；
/// - 中间件实例在进程内共享并可能被并发重入，不要在实例上保存单次分发的状态；
/// - 默认实现全部直接透传，只需覆写关心的钩子。
#[async_trait]
pub trait Middleware: Send + Sync {
    /// 发布 `Command` 时调用
    async fn on_command(
        &self,
        next: Next<'_, CommandFlow>,
        _cmd: &dyn Message,
        _ct: &CancellationToken,
    ) -> MediatorResult<()> {
        next.run().await
    }

    /// 发布 `CommandWithResult` 时调用；结果以类型擦除的形式在链路中传递
    async fn on_command_with_result(
        &self,
        next: Next<'_, ResultFlow>,
        _cmd: &dyn Message,
        _ct: &CancellationToken,
    ) -> MediatorResult<AnyResult> {
        next.run().await
    }

    /// 广播 `Event` 时调用；每个事件处理器各自经过一次完整链路
    async fn on_event(
        &self,
        next: Next<'_, EventFlow>,
        _evt: &dyn Message,
        _ct: &CancellationToken,
    ) -> MediatorResult<()> {
        next.run().await
    }
}
