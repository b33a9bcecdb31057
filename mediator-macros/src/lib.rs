use proc_macro::TokenStream;

mod message;
mod utils;

use message::MessageKind;

/// 命令宏
/// - 追加字段：`metadata: MessageMetadata`（若缺失，置于字段最前）
/// - 合并派生：`Debug, Clone`
/// - 实现 `Message` 与 `Command`；`#[command(result = T)]` 时实现 `CommandWithResult<Result = T>`
/// - 生成 `new(<其余字段>)` 构造函数与 `with_metadata` 覆写方法
/// - 支持具名字段结构体与单元结构体
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    message::expand(MessageKind::Command, attr, item)
}

/// 事件宏
/// - 与 `#[command]` 相同的字段注入与构造函数生成
/// - 实现 `Message` 与 `Event`；不接受 `result` 参数
#[proc_macro_attribute]
pub fn event(attr: TokenStream, item: TokenStream) -> TokenStream {
    message::expand(MessageKind::Event, attr, item)
}
