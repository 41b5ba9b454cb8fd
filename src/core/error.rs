//! 错误处理模块
//!
//! 定义了引擎中使用的统一错误类型，按照失败的性质分类：
//! 配置错误与后端初始化错误是致命的，计算资源耗尽是可恢复的，
//! 而契约违规（misuse）表示调用方的代码缺陷，应当快速失败。
//!
//! # 设计原则
//!
//! - 手工实现 `Display` 与 `Error`，不引入额外的错误处理库
//! - 为每种错误类型提供清晰的上下文信息
//! - 可恢复错误（如显存耗尽）携带调用方做决策所需的数据
//! - 易于模式匹配和错误处理

use std::fmt;

/// 引擎统一的 Result 类型
///
/// 所有可能返回错误的函数都应该使用这个类型。
pub type Result<T> = std::result::Result<T, SoulError>;

/// Soul Engine 的错误类型
///
/// 包含了引擎运行过程中可能遇到的各种错误情况。
#[derive(Debug)]
pub enum SoulError {
    /// 配置错误（启动阶段致命）
    Config(ConfigError),

    /// 图形后端错误（初始化与窗口构建阶段致命）
    Backend(BackendError),

    /// 计算资源错误（可恢复，缓冲区保持原状）
    Compute(ComputeError),

    /// 契约违规（调用方缺陷，快速失败）
    Misuse(MisuseError),

    /// IO 错误
    Io(std::io::Error),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// 图形后端相关的错误
#[derive(Debug)]
pub enum BackendError {
    /// API 扩展加载失败（OpenGL 函数指针解析）
    ExtensionLoader(String),

    /// 渲染表面创建失败（Vulkan surface / swapchain）
    SurfaceCreation(String),

    /// 着色器编译失败
    ShaderCompilation(String),
}

/// 计算资源相关的错误
///
/// 这一类错误是可恢复的：失败的操作保证不会破坏缓冲区的
/// 已有内容与元数据，调用方可以释放其他资源后重试。
#[derive(Debug)]
pub enum ComputeError {
    /// 设备内存耗尽
    OutOfMemory {
        /// 本次申请的字节数
        requested: u64,
        /// 设备当前剩余的字节数
        available: u64,
    },

    /// 宿主侧分配失败
    AllocationFailed(String),

    /// 缓冲区无法迁移到目标设备（后端家族不兼容）
    IncompatibleDevice { from: String, to: String },
}

/// 调用契约违规
///
/// 这些错误不代表环境故障，而是调用方违反了 API 的前置条件。
#[derive(Debug)]
pub enum MisuseError {
    /// 后端尚未初始化就被路由了操作
    NotInitialized,

    /// 后端已经初始化，重复初始化被拒绝
    AlreadyInitialized,

    /// 操作在当前后端状态下不合法
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// 操作要求渲染上下文在调用线程上为当前
    ContextNotCurrent { operation: &'static str },

    /// 句柄不是由当前活动后端签发的
    ForeignHandle { kind: &'static str, id: u64 },
}

impl fmt::Display for SoulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoulError::Config(e) => write!(f, "Configuration error: {}", e),
            SoulError::Backend(e) => write!(f, "Backend error: {}", e),
            SoulError::Compute(e) => write!(f, "Compute error: {}", e),
            SoulError::Misuse(e) => write!(f, "Contract violation: {}", e),
            SoulError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::ExtensionLoader(msg) => write!(f, "Extension loading failed: {}", msg),
            BackendError::SurfaceCreation(msg) => write!(f, "Surface creation failed: {}", msg),
            BackendError::ShaderCompilation(msg) => {
                write!(f, "Shader compilation failed: {}", msg)
            }
        }
    }
}

impl fmt::Display for ComputeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeError::OutOfMemory {
                requested,
                available,
            } => write!(
                f,
                "Out of device memory: requested {} bytes, {} bytes available",
                requested, available
            ),
            ComputeError::AllocationFailed(msg) => write!(f, "Allocation failed: {}", msg),
            ComputeError::IncompatibleDevice { from, to } => write!(
                f,
                "Cannot migrate buffer from {} to {}: backends are incompatible",
                from, to
            ),
        }
    }
}

impl fmt::Display for MisuseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MisuseError::NotInitialized => write!(f, "Raster backend not initialized"),
            MisuseError::AlreadyInitialized => write!(f, "Raster backend already initialized"),
            MisuseError::InvalidState { operation, state } => {
                write!(f, "Operation '{}' not valid in state '{}'", operation, state)
            }
            MisuseError::ContextNotCurrent { operation } => write!(
                f,
                "Operation '{}' requires the context to be current on the calling thread",
                operation
            ),
            MisuseError::ForeignHandle { kind, id } => write!(
                f,
                "Foreign {} handle {}: not issued by the active backend",
                kind, id
            ),
        }
    }
}

impl std::error::Error for SoulError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SoulError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for BackendError {}
impl std::error::Error for ComputeError {}
impl std::error::Error for MisuseError {}

// 实现 From trait 以便于错误转换
impl From<std::io::Error> for SoulError {
    fn from(err: std::io::Error) -> Self {
        SoulError::Io(err)
    }
}

impl From<ConfigError> for SoulError {
    fn from(err: ConfigError) -> Self {
        SoulError::Config(err)
    }
}

impl From<BackendError> for SoulError {
    fn from(err: BackendError) -> Self {
        SoulError::Backend(err)
    }
}

impl From<ComputeError> for SoulError {
    fn from(err: ComputeError) -> Self {
        SoulError::Compute(err)
    }
}

impl From<MisuseError> for SoulError {
    fn from(err: MisuseError) -> Self {
        SoulError::Misuse(err)
    }
}
