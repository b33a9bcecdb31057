use anyhow::Result;
use async_trait::async_trait;
use mediator::{
    CancellationMiddleware, CancellationToken, CommandHandler, CommandWithResultHandler,
    Dispatcher, EventHandler, HandlerRegistry, LoggingConfig, LoggingMiddleware, Mediator,
    MediatorResult, Message,
};
use mediator_macros::{command, event};
use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[command(result = i64)]
struct Multiply {
    x: i64,
}

#[command(result = u64)]
struct RegisterUser {
    name: String,
}

#[command]
struct Nap {
    millis: u64,
}

#[event]
struct UserCreated {
    user_id: u64,
    name: String,
}

#[event]
struct UserDeleted {
    user_id: u64,
}

struct Double;

#[async_trait]
impl CommandWithResultHandler<Multiply> for Double {
    async fn handle(&self, cmd: &Multiply, _ct: &CancellationToken) -> MediatorResult<i64> {
        Ok(cmd.x * 2)
    }
}

#[derive(Default)]
struct Users {
    next_id: AtomicU64,
}

#[async_trait]
impl CommandWithResultHandler<RegisterUser> for Users {
    async fn handle(&self, cmd: &RegisterUser, _ct: &CancellationToken) -> MediatorResult<u64> {
        if cmd.name.trim().is_empty() {
            return Err(anyhow::anyhow!("user name must not be blank").into());
        }
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

struct Sleeper;

#[async_trait]
impl CommandHandler<Nap> for Sleeper {
    async fn handle(&self, cmd: &Nap, _ct: &CancellationToken) -> MediatorResult<()> {
        tokio::time::sleep(Duration::from_millis(cmd.millis)).await;
        Ok(())
    }
}

struct SendWelcome;

#[async_trait]
impl EventHandler<UserCreated> for SendWelcome {
    async fn handle(&self, evt: &UserCreated, _ct: &CancellationToken) -> MediatorResult<()> {
        println!("welcome, {} (#{})", evt.name, evt.user_id);
        Ok(())
    }
}

struct Audit;

#[async_trait]
impl EventHandler<UserCreated> for Audit {
    async fn handle(&self, evt: &UserCreated, _ct: &CancellationToken) -> MediatorResult<()> {
        println!("audit: user {} created by event {}", evt.user_id, evt.id());
        Ok(())
    }
}

/// `MEDIATOR_LOG_FORMAT=json` 输出 JSON，其余为紧凑文本
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,mediator=debug"))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal());

    match std::env::var("MEDIATOR_LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().flatten_event(true).init(),
        _ => builder.compact().init(),
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing()?;

    let registry = HandlerRegistry::new();
    registry.register_command_with_result::<Multiply, _>(Arc::new(Double))?;
    registry.register_command_with_result::<RegisterUser, _>(Arc::new(Users::default()))?;
    registry.register_command::<Nap, _>(Arc::new(Sleeper))?;
    registry.register_event::<UserCreated, _>(Arc::new(SendWelcome));
    registry.register_event::<UserCreated, _>(Arc::new(Audit));
    info!(commands = ?registry.registered_commands(), "handlers registered");

    let mediator = Mediator::builder()
        .resolver(registry)
        .middlewares(vec![
            Arc::new(LoggingMiddleware::new(LoggingConfig {
                log_payload: true,
                slow_threshold: Some(Duration::from_millis(50)),
            })),
            Arc::new(CancellationMiddleware),
        ])
        .build();
    let ct = CancellationToken::new();

    // 带返回值命令
    let six = mediator.publish_with_result(&Multiply::new(3), &ct).await?;
    println!("multiply(3) = {six}");

    // 命令 + 事件
    let name = "alice".to_string();
    let user_id = mediator
        .publish_with_result(&RegisterUser::new(name.clone()), &ct)
        .await?;
    mediator
        .broadcast(&UserCreated::new(user_id, name), &ct)
        .await?;

    // 处理器错误原样返回
    if let Err(err) = mediator
        .publish_with_result(&RegisterUser::new("  ".into()), &ct)
        .await
    {
        println!("register failed: {err}");
    }

    // 无订阅者：仅记录告警
    let deleted = UserDeleted::new(user_id);
    mediator.broadcast(&deleted, &ct).await?;
    println!("user {} deleted, nobody listening", deleted.user_id);

    // 慢处理告警
    mediator.publish(&Nap::new(80), &ct).await?;

    // 取消
    let cancelled = CancellationToken::new();
    let trigger = cancelled.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });
    match mediator.publish(&Nap::new(1_000), &cancelled).await {
        Ok(()) => println!("nap finished"),
        Err(err) => println!("nap interrupted: {err}"),
    }

    Ok(())
}
