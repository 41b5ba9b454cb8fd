//! 光栅化后端模块
//!
//! 本模块提供统一的光栅化接口，封装不同图形 API 的具体实现。
//! 应用程序通过 [`RasterBackend`] 与底层图形 API（OpenGL、Vulkan）
//! 交互，而不需要关心具体使用的是哪个后端。
//!
//! # 架构设计
//!
//! - `RasterBackend`：统一的后端门面，负责后端的创建与销毁，
//!   把所有操作转发给当前活动的后端
//! - `Backend`：内部枚举，封装不同的图形后端实现
//! - `RasterBase`：所有后端实现遵循的公共契约，定义生命周期
//!   状态机与窗口、资源、提交操作
//!
//! 门面在未初始化时拒绝一切转发操作，重复初始化与重复销毁
//! 都是契约违规。

use tracing::info;

use crate::compute::GpuDevice;
use crate::core::config::{BackendKind, Config};
use crate::core::error::{MisuseError, Result};

pub mod base;
pub mod buffer;
pub mod job;
pub mod opengl;
pub mod shader;
pub mod vulkan;
pub mod window;

mod handle;

pub use base::{BackendState, RasterBase};
pub use buffer::Buffer;
pub use job::{JobCommand, RasterJob};
pub use opengl::OpenGlBackend;
pub use shader::{Shader, ShaderKind};
pub use vulkan::VulkanBackend;
pub use window::{ClientApi, WindowHandle, WindowHints};

/// 图形后端枚举
///
/// 封装不同的图形 API 实现，支持运行时选择使用哪个后端。
/// 通过枚举模式实现零成本抽象，避免动态分发的性能开销。
enum Backend {
    OpenGl(OpenGlBackend),
    Vulkan(VulkanBackend),
}

/// 统一的光栅化后端门面
///
/// 持有当前活动的后端实例。`init` 根据配置选择并创建后端，
/// `terminate` 销毁它并释放所有 API 资源，之后可以用不同的
/// 配置重新初始化。
pub struct RasterBackend {
    backend: Option<Backend>,
}

impl Default for RasterBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterBackend {
    /// 创建一个未初始化的门面
    pub fn new() -> Self {
        Self { backend: None }
    }

    /// 根据配置初始化后端
    ///
    /// 已初始化时再次调用是契约违规，原有后端保持不变。
    pub fn init(&mut self, config: &Config) -> Result<()> {
        if self.backend.is_some() {
            return Err(MisuseError::AlreadyInitialized.into());
        }

        let backend = match config.graphics.backend {
            BackendKind::OpenGl => {
                info!("Initializing OpenGL backend");
                Backend::OpenGl(OpenGlBackend::new(&config.graphics, &config.compute))
            }
            BackendKind::Vulkan => {
                info!("Initializing Vulkan backend");
                Backend::Vulkan(VulkanBackend::new(&config.graphics, &config.compute))
            }
        };

        self.backend = Some(backend);
        Ok(())
    }

    /// 销毁当前后端并释放其全部资源
    pub fn terminate(&mut self) -> Result<()> {
        match self.backend.take() {
            Some(backend) => {
                let (kind, frames) = match &backend {
                    Backend::OpenGl(b) => (b.kind(), b.frames_presented()),
                    Backend::Vulkan(b) => (b.kind(), b.frames_presented()),
                };
                drop(backend);
                info!(
                    backend = kind.name(),
                    frames, "Raster backend terminated, resources released"
                );
                Ok(())
            }
            None => Err(MisuseError::NotInitialized.into()),
        }
    }

    /// 是否已初始化
    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    /// 当前活动后端的种类
    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backend.as_ref().map(|backend| match backend {
            Backend::OpenGl(b) => b.kind(),
            Backend::Vulkan(b) => b.kind(),
        })
    }

    /// 当前活动后端的生命周期状态
    pub fn state(&self) -> Result<BackendState> {
        Ok(match self.active()? {
            Backend::OpenGl(b) => b.state(),
            Backend::Vulkan(b) => b.state(),
        })
    }

    /// 当前活动后端的主计算设备
    pub fn device(&self) -> Result<&GpuDevice> {
        Ok(match self.active()? {
            Backend::OpenGl(b) => b.device(),
            Backend::Vulkan(b) => b.device(),
        })
    }

    /// 当前活动后端已提交的帧数
    pub fn frames_presented(&self) -> Result<u64> {
        Ok(match self.active()? {
            Backend::OpenGl(b) => b.frames_presented(),
            Backend::Vulkan(b) => b.frames_presented(),
        })
    }

    /// 在窗口上施加当前后端的创建提示
    pub fn set_window_hints(&mut self, window: &mut WindowHandle) -> Result<()> {
        match self.active_mut()? {
            Backend::OpenGl(b) => b.set_window_hints(window),
            Backend::Vulkan(b) => b.set_window_hints(window),
        }
    }

    /// 构建窗口的 API 资源
    pub fn build_window(&mut self, window: &mut WindowHandle) -> Result<()> {
        match self.active_mut()? {
            Backend::OpenGl(b) => b.build_window(window),
            Backend::Vulkan(b) => b.build_window(window),
        }
    }

    /// 调整窗口与视口大小
    pub fn resize_window(
        &mut self,
        window: &mut WindowHandle,
        width: u32,
        height: u32,
    ) -> Result<()> {
        match self.active_mut()? {
            Backend::OpenGl(b) => b.resize_window(window, width, height),
            Backend::Vulkan(b) => b.resize_window(window, width, height),
        }
    }

    /// 提交一个光栅化作业并推进一帧
    pub fn draw(&mut self, window: &WindowHandle, job: &mut RasterJob) -> Result<()> {
        match self.active_mut()? {
            Backend::OpenGl(b) => b.draw(window, job),
            Backend::Vulkan(b) => b.draw(window, job),
        }
    }

    /// 把渲染上下文绑定到调用线程
    pub fn make_context_current(&mut self) -> Result<()> {
        match self.active_mut()? {
            Backend::OpenGl(b) => b.make_context_current(),
            Backend::Vulkan(b) => b.make_context_current(),
        }
    }

    /// 编译着色器
    pub fn create_shader(&mut self, source: &str, kind: ShaderKind) -> Result<Shader> {
        match self.active_mut()? {
            Backend::OpenGl(b) => b.create_shader(source, kind),
            Backend::Vulkan(b) => b.create_shader(source, kind),
        }
    }

    /// 创建后端托管的字节缓冲区
    pub fn create_buffer(&mut self, size_bytes: usize) -> Result<Buffer> {
        match self.active_mut()? {
            Backend::OpenGl(b) => b.create_buffer(size_bytes),
            Backend::Vulkan(b) => b.create_buffer(size_bytes),
        }
    }

    /// 创建空的光栅化作业
    pub fn create_job(&mut self) -> Result<RasterJob> {
        match self.active_mut()? {
            Backend::OpenGl(b) => b.create_job(),
            Backend::Vulkan(b) => b.create_job(),
        }
    }

    fn active(&self) -> Result<&Backend> {
        Ok(self.backend.as_ref().ok_or(MisuseError::NotInitialized)?)
    }

    fn active_mut(&mut self) -> Result<&mut Backend> {
        Ok(self.backend.as_mut().ok_or(MisuseError::NotInitialized)?)
    }
}
