use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use mediator_abstractions::{
    Command, CommandHandler, CommandWithResult, CommandWithResultHandler, Event, EventHandler,
    HandlerResolver, MediatorError, MediatorResult,
};
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

type CommandFactory<C> = Arc<dyn Fn() -> Arc<dyn CommandHandler<C>> + Send + Sync>;
type ResultFactory<C> = Arc<dyn Fn() -> Arc<dyn CommandWithResultHandler<C>> + Send + Sync>;
type EventFactory<E> = Arc<dyn Fn() -> Arc<dyn EventHandler<E>> + Send + Sync>;

type ErasedFactory = Box<dyn Any + Send + Sync>;

/// 基于内存的处理器注册表
/// - 通过 TypeId 注册不同消息对应的处理器工厂，运行时以类型擦除（Any）方式保存
/// - 命令与带返回值命令各自至多一个处理器，重复注册返回 `AlreadyRegistered`
/// - 事件可注册多个处理器，解析顺序即注册顺序
/// - 工厂在每次解析时调用；单例注册即返回同一个 `Arc` 的工厂
#[derive(Default)]
pub struct HandlerRegistry {
    commands: DashMap<TypeId, (&'static str, ErasedFactory)>,
    results: DashMap<TypeId, (&'static str, ErasedFactory)>,
    events: DashMap<TypeId, Vec<ErasedFactory>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册命令处理器（单例）
    pub fn register_command<C, H>(&self, handler: Arc<H>) -> MediatorResult<()>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        self.register_command_with::<C, _, H>(move || handler.clone())
    }

    /// 注册命令处理器工厂，每次分发构建新的处理器
    pub fn register_command_with<C, F, H>(&self, factory: F) -> MediatorResult<()>
    where
        C: Command,
        F: Fn() -> Arc<H> + Send + Sync + 'static,
        H: CommandHandler<C> + 'static,
    {
        let factory: CommandFactory<C> =
            Arc::new(move || factory() as Arc<dyn CommandHandler<C>>);
        Self::insert_unique::<C>(&self.commands, Box::new(factory))
    }

    /// 注册带返回值命令的处理器（单例）
    pub fn register_command_with_result<C, H>(&self, handler: Arc<H>) -> MediatorResult<()>
    where
        C: CommandWithResult,
        H: CommandWithResultHandler<C> + 'static,
    {
        self.register_command_with_result_with::<C, _, H>(move || handler.clone())
    }

    /// 注册带返回值命令的处理器工厂
    pub fn register_command_with_result_with<C, F, H>(&self, factory: F) -> MediatorResult<()>
    where
        C: CommandWithResult,
        F: Fn() -> Arc<H> + Send + Sync + 'static,
        H: CommandWithResultHandler<C> + 'static,
    {
        let factory: ResultFactory<C> =
            Arc::new(move || factory() as Arc<dyn CommandWithResultHandler<C>>);
        Self::insert_unique::<C>(&self.results, Box::new(factory))
    }

    /// 追加事件处理器（单例）
    pub fn register_event<E, H>(&self, handler: Arc<H>)
    where
        E: Event,
        H: EventHandler<E> + 'static,
    {
        self.register_event_with::<E, _, H>(move || handler.clone());
    }

    /// 追加事件处理器工厂
    pub fn register_event_with<E, F, H>(&self, factory: F)
    where
        E: Event,
        F: Fn() -> Arc<H> + Send + Sync + 'static,
        H: EventHandler<E> + 'static,
    {
        let factory: EventFactory<E> = Arc::new(move || factory() as Arc<dyn EventHandler<E>>);
        self.events
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Box::new(factory));
    }

    /// 获取已注册的命令类型名列表（只读视图）
    pub fn registered_commands(&self) -> Vec<&'static str> {
        self.commands
            .iter()
            .chain(self.results.iter())
            .map(|e| e.value().0)
            .collect()
    }

    fn insert_unique<C: 'static>(
        map: &DashMap<TypeId, (&'static str, ErasedFactory)>,
        factory: ErasedFactory,
    ) -> MediatorResult<()> {
        match map.entry(TypeId::of::<C>()) {
            Entry::Occupied(_) => Err(MediatorError::AlreadyRegistered {
                command: type_name::<C>(),
            }),
            Entry::Vacant(slot) => {
                slot.insert((type_name::<C>(), factory));
                Ok(())
            }
        }
    }

    // 先克隆工厂并释放分片锁，再调用工厂，避免工厂内部重入注册表时死锁
    fn factory_for<T: Clone + 'static>(
        map: &DashMap<TypeId, (&'static str, ErasedFactory)>,
        key: TypeId,
    ) -> Option<T> {
        let entry = map.get(&key)?;
        entry.value().1.downcast_ref::<T>().cloned()
    }
}

impl HandlerResolver for HandlerRegistry {
    fn command_handler<C>(&self) -> Option<Arc<dyn CommandHandler<C>>>
    where
        C: Command,
    {
        let factory = Self::factory_for::<CommandFactory<C>>(&self.commands, TypeId::of::<C>())?;
        Some(factory())
    }

    fn command_with_result_handler<C>(&self) -> Option<Arc<dyn CommandWithResultHandler<C>>>
    where
        C: CommandWithResult,
    {
        let factory = Self::factory_for::<ResultFactory<C>>(&self.results, TypeId::of::<C>())?;
        Some(factory())
    }

    fn event_handlers<E>(&self) -> Option<Vec<Arc<dyn EventHandler<E>>>>
    where
        E: Event,
    {
        let factories: Vec<EventFactory<E>> = self
            .events
            .get(&TypeId::of::<E>())?
            .iter()
            .filter_map(|f| f.downcast_ref::<EventFactory<E>>().cloned())
            .collect();
        Some(factories.iter().map(|f| f()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mediator_abstractions::{CancellationToken, Message};
    use mediator_macros::{command, event};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::task::JoinSet;

    #[command]
    struct Ping;

    #[command(result = usize)]
    struct Count;

    #[event]
    struct Pinged;

    struct PingHandler;

    #[async_trait]
    impl CommandHandler<Ping> for PingHandler {
        async fn handle(&self, _cmd: &Ping, _ct: &CancellationToken) -> MediatorResult<()> {
            Ok(())
        }
    }

    struct CountHandler {
        counter: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CommandWithResultHandler<Count> for CountHandler {
        async fn handle(&self, _cmd: &Count, _ct: &CancellationToken) -> MediatorResult<usize> {
            Ok(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    struct Recorder {
        label: &'static str,
    }

    #[async_trait]
    impl EventHandler<Pinged> for Recorder {
        async fn handle(&self, _evt: &Pinged, _ct: &CancellationToken) -> MediatorResult<()> {
            Err(anyhow::anyhow!(self.label).into())
        }
    }

    #[test]
    fn unregistered_messages_resolve_to_none() {
        let registry = HandlerRegistry::new();
        assert!(registry.command_handler::<Ping>().is_none());
        assert!(registry.command_with_result_handler::<Count>().is_none());
        assert!(registry.event_handlers::<Pinged>().is_none());
        assert!(registry.registered_commands().is_empty());
    }

    #[test]
    fn duplicate_command_registration_is_rejected() {
        let registry = HandlerRegistry::new();
        registry
            .register_command::<Ping, _>(Arc::new(PingHandler))
            .unwrap();

        let err = registry
            .register_command::<Ping, _>(Arc::new(PingHandler))
            .unwrap_err();
        match err {
            MediatorError::AlreadyRegistered { command } => assert!(command.contains("Ping")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(registry.registered_commands().len(), 1);
    }

    #[test]
    fn command_kinds_are_keyed_separately() {
        let registry = HandlerRegistry::new();
        registry
            .register_command::<Ping, _>(Arc::new(PingHandler))
            .unwrap();
        registry
            .register_command_with_result::<Count, _>(Arc::new(CountHandler {
                counter: Arc::default(),
            }))
            .unwrap();

        assert!(registry.command_handler::<Ping>().is_some());
        assert!(registry.command_with_result_handler::<Count>().is_some());
        assert_eq!(registry.registered_commands().len(), 2);
    }

    #[tokio::test]
    async fn factory_builds_a_handler_per_resolution() {
        let registry = HandlerRegistry::new();
        let built = Arc::new(AtomicUsize::new(0));
        let built_in_factory = built.clone();
        registry
            .register_command_with_result_with::<Count, _, _>(move || {
                built_in_factory.fetch_add(1, Ordering::SeqCst);
                Arc::new(CountHandler {
                    counter: Arc::default(),
                })
            })
            .unwrap();

        let ct = CancellationToken::new();
        let cmd = Count::new();
        for _ in 0..3 {
            let handler = registry.command_with_result_handler::<Count>().unwrap();
            // 每次都是全新实例，计数器从 0 开始
            assert_eq!(handler.handle(&cmd, &ct).await.unwrap(), 1);
        }
        assert_eq!(built.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn singleton_handler_is_shared_across_resolutions() {
        let registry = HandlerRegistry::new();
        registry
            .register_command_with_result::<Count, _>(Arc::new(CountHandler {
                counter: Arc::default(),
            }))
            .unwrap();

        let ct = CancellationToken::new();
        let cmd = Count::new();
        let first = registry.command_with_result_handler::<Count>().unwrap();
        let second = registry.command_with_result_handler::<Count>().unwrap();
        assert_eq!(first.handle(&cmd, &ct).await.unwrap(), 1);
        assert_eq!(second.handle(&cmd, &ct).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn event_handlers_resolve_in_registration_order() {
        let registry = HandlerRegistry::new();
        registry.register_event::<Pinged, _>(Arc::new(Recorder { label: "first" }));
        registry.register_event::<Pinged, _>(Arc::new(Recorder { label: "second" }));
        registry.register_event_with::<Pinged, _, _>(|| Arc::new(Recorder { label: "third" }));

        let handlers = registry.event_handlers::<Pinged>().unwrap();
        let evt = Pinged::new();
        let ct = CancellationToken::new();
        let mut labels = Vec::new();
        for h in handlers {
            labels.push(h.handle(&evt, &ct).await.unwrap_err().to_string());
        }
        assert_eq!(labels, vec!["first", "second", "third"]);
        assert_eq!(evt.name(), "Pinged");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_resolution_is_safe() {
        let registry = Arc::new(HandlerRegistry::new());
        let counter = Arc::new(AtomicUsize::new(0));
        registry
            .register_command_with_result::<Count, _>(Arc::new(CountHandler {
                counter: counter.clone(),
            }))
            .unwrap();

        let mut set = JoinSet::new();
        for _ in 0..100 {
            let registry = registry.clone();
            set.spawn(async move {
                let handler = registry.command_with_result_handler::<Count>().unwrap();
                handler
                    .handle(&Count::new(), &CancellationToken::new())
                    .await
                    .unwrap()
            });
        }
        let mut results = Vec::new();
        while let Some(res) = set.join_next().await {
            results.push(res.unwrap());
        }
        results.sort_unstable();
        assert_eq!(results.len(), 100);
        assert_eq!(results[0], 1);
        assert_eq!(results[99], 100);
    }
}
