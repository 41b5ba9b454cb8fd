//! 配置管理模块
//!
//! 提供引擎配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (soul.toml)
//!
//! ```toml
//! [window]
//! width = 800
//! height = 600
//! title = "Soul Engine"
//! resizable = true
//!
//! [graphics]
//! backend = "opengl"  # 或 "vulkan"
//! vsync = true
//! clear_color = [1.0, 1.0, 1.0, 1.0]
//!
//! [compute]
//! device_memory_mb = 4096
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, Result};

/// 引擎配置
///
/// 包含了引擎运行所需的所有配置项。
/// 可以从配置文件加载，也可以通过代码构建。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 窗口配置
    #[serde(default)]
    pub window: WindowConfig,

    /// 图形配置
    #[serde(default)]
    pub graphics: GraphicsConfig,

    /// 计算配置
    #[serde(default)]
    pub compute: ComputeConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 窗口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// 窗口宽度
    #[serde(default = "default_width")]
    pub width: u32,

    /// 窗口高度
    #[serde(default = "default_height")]
    pub height: u32,

    /// 窗口标题
    #[serde(default = "default_title")]
    pub title: String,

    /// 是否可调整大小
    #[serde(default = "default_resizable")]
    pub resizable: bool,
}

/// 图形配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsConfig {
    /// 光栅化后端选择，在启动时解析一次
    #[serde(default = "default_backend")]
    pub backend: BackendKind,

    /// 垂直同步
    #[serde(default = "default_vsync")]
    pub vsync: bool,

    /// 帧清屏颜色（RGBA，分量范围 0.0..=1.0）
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],
}

/// 光栅化后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// OpenGL 后端
    OpenGl,
    /// Vulkan 后端
    Vulkan,
}

/// 计算配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeConfig {
    /// 每个 GPU 设备的内存预算（MiB）
    #[serde(default = "default_device_memory_mb")]
    pub device_memory_mb: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }
fn default_title() -> String { "Soul Engine".to_string() }
fn default_resizable() -> bool { true }
fn default_backend() -> BackendKind { BackendKind::OpenGl }
fn default_vsync() -> bool { true }
fn default_clear_color() -> [f32; 4] { [1.0, 1.0, 1.0, 1.0] }
fn default_device_memory_mb() -> u64 { 4096 }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "soul_engine.log".to_string() }

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            graphics: GraphicsConfig::default(),
            compute: ComputeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
            resizable: default_resizable(),
        }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            vsync: default_vsync(),
            clear_color: default_clear_color(),
        }
    }
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            device_memory_mb: default_device_memory_mb(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// # 参数
    ///
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    ///
    /// 成功返回 `Config` 实例，失败返回错误
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在则使用默认配置
    ///
    /// # 参数
    ///
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    ///
    /// 返回 `Config` 实例
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// 保存配置到文件
    ///
    /// # 参数
    ///
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    ///
    /// 成功返回 `Ok(())`，失败返回错误
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 从命令行参数覆盖配置
    ///
    /// # 参数
    ///
    /// * `args` - 命令行参数迭代器
    ///
    /// # 说明
    ///
    /// 支持的参数：
    /// - `--opengl`: 使用 OpenGL 后端
    /// - `--vulkan`: 使用 Vulkan 后端
    /// - `--width <value>`: 设置窗口宽度
    /// - `--height <value>`: 设置窗口高度
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        // 检查后端覆盖
        if args.iter().any(|a| a == "--opengl") {
            self.graphics.backend = BackendKind::OpenGl;
        }

        if args.iter().any(|a| a == "--vulkan") {
            self.graphics.backend = BackendKind::Vulkan;
        }

        // 检查窗口尺寸
        if let Some(idx) = args.iter().position(|a| a == "--width") {
            if let Some(width_str) = args.get(idx + 1) {
                if let Ok(width) = width_str.parse() {
                    self.window.width = width;
                }
            }
        }

        if let Some(idx) = args.iter().position(|a| a == "--height") {
            if let Some(height_str) = args.get(idx + 1) {
                if let Ok(height) = height_str.parse() {
                    self.window.height = height;
                }
            }
        }
    }

    /// 验证配置的有效性
    ///
    /// # 返回值
    ///
    /// 配置有效返回 `Ok(())`，否则返回错误
    pub fn validate(&self) -> Result<()> {
        // 验证窗口尺寸
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window.width/height".to_string(),
                reason: "Window dimensions must be greater than 0".to_string(),
            }.into());
        }

        // 验证设备内存预算
        if self.compute.device_memory_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "compute.device_memory_mb".to_string(),
                reason: "Device memory budget must be greater than 0".to_string(),
            }.into());
        }

        // 验证清屏颜色分量
        for component in self.graphics.clear_color {
            if !(0.0..=1.0).contains(&component) {
                return Err(ConfigError::InvalidValue {
                    field: "graphics.clear_color".to_string(),
                    reason: "Color components must be within 0.0..=1.0".to_string(),
                }.into());
            }
        }

        Ok(())
    }
}

impl ComputeConfig {
    /// 内存预算的字节数表示
    pub fn device_memory_bytes(&self) -> u64 {
        self.device_memory_mb * 1024 * 1024
    }
}

impl BackendKind {
    /// 检查是否为 OpenGL 后端
    pub fn is_opengl(&self) -> bool {
        matches!(self, BackendKind::OpenGl)
    }

    /// 检查是否为 Vulkan 后端
    pub fn is_vulkan(&self) -> bool {
        matches!(self, BackendKind::Vulkan)
    }

    /// 获取后端名称
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::OpenGl => "OpenGL",
            BackendKind::Vulkan => "Vulkan",
        }
    }
}
