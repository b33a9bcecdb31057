use super::middleware::Middleware;
use futures_core::future::BoxFuture;
use mediator_abstractions::{MediatorResult, Message};
use std::any::Any;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 带返回值命令在链路中传递的类型擦除结果
pub type AnyResult = Box<dyn Any + Send>;

/// 终端调用：执行已解析的处理器
pub(crate) type Terminal<'a, F> =
    dyn Fn() -> BoxFuture<'a, MediatorResult<<F as Flow>::Output>> + Send + Sync + 'a;

mod sealed {
    pub trait Sealed {}
}

/// 链路形态：决定中间件的哪个钩子被调用，以及终端的返回类型
pub trait Flow: sealed::Sealed + Sized + Send + Sync + 'static {
    type Output: Send + 'static;

    #[doc(hidden)]
    fn intercept<'a>(
        middleware: &'a dyn Middleware,
        next: Next<'a, Self>,
        message: &'a dyn Message,
        ct: &'a CancellationToken,
    ) -> BoxFuture<'a, MediatorResult<Self::Output>>;
}

/// 无返回值命令
pub enum CommandFlow {}

/// 带返回值命令
pub enum ResultFlow {}

/// 事件
pub enum EventFlow {}

impl sealed::Sealed for CommandFlow {}
impl sealed::Sealed for ResultFlow {}
impl sealed::Sealed for EventFlow {}

impl Flow for CommandFlow {
    type Output = ();

    fn intercept<'a>(
        middleware: &'a dyn Middleware,
        next: Next<'a, Self>,
        message: &'a dyn Message,
        ct: &'a CancellationToken,
    ) -> BoxFuture<'a, MediatorResult<()>> {
        middleware.on_command(next, message, ct)
    }
}

impl Flow for ResultFlow {
    type Output = AnyResult;

    fn intercept<'a>(
        middleware: &'a dyn Middleware,
        next: Next<'a, Self>,
        message: &'a dyn Message,
        ct: &'a CancellationToken,
    ) -> BoxFuture<'a, MediatorResult<AnyResult>> {
        middleware.on_command_with_result(next, message, ct)
    }
}

impl Flow for EventFlow {
    type Output = ();

    fn intercept<'a>(
        middleware: &'a dyn Middleware,
        next: Next<'a, Self>,
        message: &'a dyn Message,
        ct: &'a CancellationToken,
    ) -> BoxFuture<'a, MediatorResult<()>> {
        middleware.on_event(next, message, ct)
    }
}

/// 剩余链路
///
/// 借用中间件切片的游标：`run` 调用第一个中间件并把其余部分作为它的 `next`，
/// 切片耗尽时调用终端处理器。消息与取消信号在创建时绑定，沿链路原样传递。
/// 空中间件列表时，`run` 直接执行终端。
pub struct Next<'a, F: Flow> {
    middlewares: &'a [Arc<dyn Middleware>],
    terminal: &'a Terminal<'a, F>,
    message: &'a dyn Message,
    ct: &'a CancellationToken,
}

impl<F: Flow> Clone for Next<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: Flow> Copy for Next<'_, F> {}

impl<'a, F: Flow> Next<'a, F> {
    pub(crate) fn new(
        middlewares: &'a [Arc<dyn Middleware>],
        terminal: &'a Terminal<'a, F>,
        message: &'a dyn Message,
        ct: &'a CancellationToken,
    ) -> Self {
        Self {
            middlewares,
            terminal,
            message,
            ct,
        }
    }

    /// 执行剩余链路；可调用零次、一次或多次
    pub fn run(&self) -> BoxFuture<'a, MediatorResult<F::Output>> {
        match self.middlewares.split_first() {
            Some((head, tail)) => {
                let next = Self {
                    middlewares: tail,
                    ..*self
                };
                F::intercept(&**head, next, self.message, self.ct)
            }
            None => (self.terminal)(),
        }
    }

    /// 剩余尚未执行的中间件数量
    pub fn remaining(&self) -> usize {
        self.middlewares.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures_util::FutureExt;
    use mediator_abstractions::{MediatorError, MessageMetadata};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Probe {
        metadata: MessageMetadata,
    }

    impl Message for Probe {
        fn metadata(&self) -> &MessageMetadata {
            &self.metadata
        }
    }

    type Trace = Arc<Mutex<Vec<String>>>;

    struct Tag {
        name: &'static str,
        trace: Trace,
    }

    #[async_trait]
    impl Middleware for Tag {
        async fn on_command(
            &self,
            next: Next<'_, CommandFlow>,
            _cmd: &dyn Message,
            _ct: &CancellationToken,
        ) -> MediatorResult<()> {
            self.trace.lock().unwrap().push(format!("{}:before", self.name));
            let out = next.run().await;
            self.trace.lock().unwrap().push(format!("{}:after", self.name));
            out
        }
    }

    struct Deny;

    #[async_trait]
    impl Middleware for Deny {
        async fn on_command(
            &self,
            _next: Next<'_, CommandFlow>,
            _cmd: &dyn Message,
            _ct: &CancellationToken,
        ) -> MediatorResult<()> {
            Err(anyhow::anyhow!("denied").into())
        }
    }

    fn probe() -> Probe {
        Probe {
            metadata: MessageMetadata::new(),
        }
    }

    #[tokio::test]
    async fn empty_chain_runs_terminal_directly() {
        let trace: Trace = Arc::default();
        let message = probe();
        let ct = CancellationToken::new();
        let terminal = || {
            let trace = trace.clone();
            async move {
                trace.lock().unwrap().push("handler".into());
                Ok(())
            }
            .boxed()
        };

        let next = Next::<CommandFlow>::new(&[], &terminal, &message, &ct);
        assert_eq!(next.remaining(), 0);
        next.run().await.unwrap();

        assert_eq!(*trace.lock().unwrap(), vec!["handler".to_string()]);
    }

    #[tokio::test]
    async fn middlewares_nest_in_registration_order() {
        let trace: Trace = Arc::default();
        let middlewares: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(Tag {
                name: "outer",
                trace: trace.clone(),
            }),
            Arc::new(Tag {
                name: "inner",
                trace: trace.clone(),
            }),
        ];
        let message = probe();
        let ct = CancellationToken::new();
        let terminal = || {
            let trace = trace.clone();
            async move {
                trace.lock().unwrap().push("handler".into());
                Ok(())
            }
            .boxed()
        };

        let next = Next::<CommandFlow>::new(&middlewares, &terminal, &message, &ct);
        assert_eq!(next.remaining(), 2);
        next.run().await.unwrap();

        assert_eq!(
            *trace.lock().unwrap(),
            vec![
                "outer:before",
                "inner:before",
                "handler",
                "inner:after",
                "outer:after"
            ]
        );
    }

    #[tokio::test]
    async fn short_circuit_skips_the_rest_of_the_chain() {
        let trace: Trace = Arc::default();
        let middlewares: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(Tag {
                name: "outer",
                trace: trace.clone(),
            }),
            Arc::new(Deny),
            Arc::new(Tag {
                name: "unreached",
                trace: trace.clone(),
            }),
        ];
        let message = probe();
        let ct = CancellationToken::new();
        let terminal = || {
            let trace = trace.clone();
            async move {
                trace.lock().unwrap().push("handler".into());
                Ok(())
            }
            .boxed()
        };

        let err = Next::<CommandFlow>::new(&middlewares, &terminal, &message, &ct)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, MediatorError::Handler(e) if e.to_string() == "denied"));
        assert_eq!(*trace.lock().unwrap(), vec!["outer:before", "outer:after"]);
    }
}
