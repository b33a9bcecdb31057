//! 统一错误定义
//!
//! 分发器只产生"找不到处理器"一类错误；处理器与中间件返回的错误原样透传给调用方，
//! 不做包装、不做吞没。
//!
use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MediatorError {
    #[error("handler not found: command={command}")]
    HandlerNotFound { command: &'static str },

    #[error("handler not found: command={command}, result={result}")]
    ResultHandlerNotFound {
        command: &'static str,
        result: &'static str,
    },

    #[error("handler already registered: command={command}")]
    AlreadyRegistered { command: &'static str },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("dispatch cancelled")]
    Cancelled,

    /// 处理器侧的业务/基础设施错误
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl MediatorError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::HandlerNotFound { .. } | Self::ResultHandlerNotFound { .. }
        )
    }
}

/// 统一 Result 类型别名
pub type MediatorResult<T> = Result<T, MediatorError>;
