//! 消息（Message）与元数据
//!
//! 命令与事件的共同能力：唯一标识、类型名称与运行时向下转型。
//! `Message` 保持对象安全，中间件以 `&dyn Message` 的形式观察任意消息。
//!
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::{Any, type_name};
use std::fmt;
use uuid::Uuid;

/// 消息元数据：构造时生成，之后不可变
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// 唯一标识
    #[builder(default = Uuid::new_v4())]
    id: Uuid,
    /// 创建时间（UTC）
    #[builder(default = Utc::now())]
    created_on: DateTime<Utc>,
    /// 创建者（用户、系统等），可选
    created_by: Option<String>,
}

impl MessageMetadata {
    /// 生成新的元数据（随机 id + 当前时间）
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_on(&self) -> &DateTime<Utc> {
        &self.created_on
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }
}

impl Default for MessageMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// 运行时类型擦除辅助：为任意 `'static` 类型提供 `&dyn Any` 视图
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// 消息：命令与事件的公共能力
///
/// - `metadata`：构造时分配的元数据
/// - `id`：消息唯一标识，用于日志与追踪
/// - `name`：消息类型的短名称（不含模块路径与泛型参数）
pub trait Message: AsAny + fmt::Debug + Send + Sync + 'static {
    fn metadata(&self) -> &MessageMetadata;

    fn id(&self) -> Uuid {
        self.metadata().id()
    }

    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }
}

impl dyn Message {
    /// 将类型擦除的消息还原为具体类型
    pub fn downcast_ref<T: Message>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Message>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// 类型短名称：`a::b::Foo<x::Y>` -> `Foo`
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
