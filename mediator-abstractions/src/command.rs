use crate::message::Message;

/// 命令（Command）
///
/// 表达"意图"的请求，分发时必须恰好存在一个处理器。
/// - 不返回业务数据，仅表达执行结果（成功/失败）；
/// - 需要返回值时使用 [`CommandWithResult`]；
/// - 建议保持语义化的"动宾结构"命名，如 `CreateUser`、`CloseOrder`。
pub trait Command: Message {}

/// 带返回值的命令
///
/// `Result` 为处理器返回给调用方的值类型，由分发器原样传递。
pub trait CommandWithResult: Message {
    type Result: Send + 'static;
}
