use crate::message::Message;

/// 事件（Event）
///
/// 广播给零到多个处理器的通知，没有返回值。
/// 多个处理器按解析顺序依次执行，分发器不会重排。
pub trait Event: Message {}
