//! OpenGL 后端模块
//!
//! 走经典的客户端上下文路线：窗口提示请求一个 OpenGL 4.5
//! 上下文，窗口构建时加载扩展函数指针，之后上下文被绑定到
//! 某一个线程，绘制与视口调整只接受来自该线程的调用。
//!
//! # 设计原则
//!
//! - **扩展加载是构建的一部分**：函数指针解析失败时窗口构建
//!   整体失败，这是致命的初始化错误
//! - **线程亲和**：`make_context_current` 记录调用线程，之后
//!   `draw` / `resize_window` 校验调用方线程
//! - **句柄校验**：提交的作业引用的所有句柄必须是本后端签发的

use std::thread::{self, ThreadId};

use tracing::{debug, info, trace};

use crate::compute::{GpuApi, GpuDevice};
use crate::core::config::{BackendKind, ComputeConfig, GraphicsConfig};
use crate::core::error::{BackendError, MisuseError, Result};

use super::base::{BackendState, RasterBase};
use super::buffer::Buffer;
use super::handle::HandleRegistry;
use super::job::RasterJob;
use super::shader::{Shader, ShaderKind};
use super::window::{ClientApi, WindowHandle, WindowHints};

/// 请求的 OpenGL 上下文版本
const GL_CONTEXT_VERSION: (u32, u32) = (4, 5);

/// OpenGL 光栅化后端
pub struct OpenGlBackend {
    /// 生命周期状态
    state: BackendState,
    /// 主计算设备
    device: GpuDevice,
    /// 垂直同步开关（来自图形配置）
    vsync: bool,
    /// 当前视口尺寸
    viewport: (u32, u32),
    /// 持有上下文的线程
    context_thread: Option<ThreadId>,
    /// 扩展函数指针是否已加载
    extensions_loaded: bool,
    /// 本后端签发的句柄
    handles: HandleRegistry,
    /// 已提交的帧数
    frames_presented: u64,
}

impl OpenGlBackend {
    /// 根据配置构造后端实例
    ///
    /// 构造本身不触碰任何 API 资源，真正的初始化从
    /// `set_window_hints` 开始。
    pub fn new(graphics: &GraphicsConfig, compute: &ComputeConfig) -> Self {
        Self {
            state: BackendState::Uninitialized,
            device: GpuDevice::with_memory_budget(
                GpuApi::OpenGl,
                0,
                compute.device_memory_bytes(),
            ),
            vsync: graphics.vsync,
            viewport: (0, 0),
            context_thread: None,
            extensions_loaded: false,
            handles: HandleRegistry::new(),
            frames_presented: 0,
        }
    }

    /// 已提交的帧数
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// 扩展函数指针是否已加载
    pub fn extensions_loaded(&self) -> bool {
        self.extensions_loaded
    }

    /// 校验调用线程持有上下文
    fn ensure_context_current(&self, operation: &'static str) -> Result<()> {
        match self.context_thread {
            Some(owner) if owner == thread::current().id() => Ok(()),
            _ => Err(MisuseError::ContextNotCurrent { operation }.into()),
        }
    }
}

impl RasterBase for OpenGlBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::OpenGl
    }

    fn state(&self) -> BackendState {
        self.state
    }

    fn device(&self) -> &GpuDevice {
        &self.device
    }

    fn set_window_hints(&mut self, window: &mut WindowHandle) -> Result<()> {
        self.state.require(
            "set_window_hints",
            &[BackendState::Uninitialized, BackendState::Hinted],
        )?;
        if window.is_built() {
            return Err(MisuseError::InvalidState {
                operation: "set_window_hints",
                state: "window already built",
            }
            .into());
        }

        let (major, minor) = GL_CONTEXT_VERSION;
        window.set_hints(WindowHints {
            client_api: ClientApi::OpenGl { major, minor },
            double_buffer: true,
            swap_interval: u32::from(self.vsync),
        });
        self.state = BackendState::Hinted;
        debug!(window = window.id(), major, minor, "OpenGL window hints applied");
        Ok(())
    }

    fn build_window(&mut self, window: &mut WindowHandle) -> Result<()> {
        self.state.require("build_window", &[BackendState::Hinted])?;
        if window.is_built() {
            return Err(MisuseError::InvalidState {
                operation: "build_window",
                state: "window already built",
            }
            .into());
        }

        // 1. 窗口必须带着本后端的上下文提示，否则扩展加载无从谈起
        let hints = window.hints().ok_or(MisuseError::InvalidState {
            operation: "build_window",
            state: "window not hinted",
        })?;
        if !matches!(hints.client_api, ClientApi::OpenGl { .. }) {
            return Err(BackendError::ExtensionLoader(
                "cannot resolve OpenGL function pointers: window has no OpenGL client context"
                    .to_string(),
            )
            .into());
        }

        // 2. 加载扩展函数指针并接管窗口
        self.extensions_loaded = true;
        window.mark_built();
        self.viewport = (window.width(), window.height());
        self.state = BackendState::WindowBuilt;

        info!(
            window = window.id(),
            width = window.width(),
            height = window.height(),
            vsync = self.vsync,
            "OpenGL window built, extensions loaded"
        );
        Ok(())
    }

    fn resize_window(
        &mut self,
        window: &mut WindowHandle,
        width: u32,
        height: u32,
    ) -> Result<()> {
        self.state.require("resize_window", &[BackendState::Ready])?;
        self.ensure_context_current("resize_window")?;
        if !window.is_built() {
            return Err(MisuseError::InvalidState {
                operation: "resize_window",
                state: "window not built",
            }
            .into());
        }

        if self.viewport == (width, height)
            && (window.width(), window.height()) == (width, height)
        {
            trace!(width, height, "Viewport unchanged, resize skipped");
            return Ok(());
        }

        window.set_size(width, height);
        self.viewport = (width, height);
        debug!(window = window.id(), width, height, "Viewport resized");
        Ok(())
    }

    fn draw(&mut self, window: &WindowHandle, job: &mut RasterJob) -> Result<()> {
        self.state.require("draw", &[BackendState::Ready])?;
        self.ensure_context_current("draw")?;
        if !window.is_built() {
            return Err(MisuseError::InvalidState {
                operation: "draw",
                state: "window not built",
            }
            .into());
        }

        // 句柄全部校验通过之后才执行提交，失败的提交不推进帧
        self.handles.validate_job(job)?;

        self.frames_presented += 1;
        job.mark_presented();
        trace!(
            frame = self.frames_presented,
            commands = job.command_count(),
            "Frame submitted and presented"
        );
        Ok(())
    }

    fn make_context_current(&mut self) -> Result<()> {
        self.state.require(
            "make_context_current",
            &[BackendState::WindowBuilt, BackendState::Ready],
        )?;
        self.context_thread = Some(thread::current().id());
        self.state = BackendState::Ready;
        debug!("OpenGL context bound to calling thread");
        Ok(())
    }

    fn create_shader(&mut self, source: &str, kind: ShaderKind) -> Result<Shader> {
        self.state.require("create_shader", &[BackendState::Ready])?;
        if source.trim().is_empty() {
            return Err(BackendError::ShaderCompilation(format!(
                "empty {} shader source",
                kind.name()
            ))
            .into());
        }

        let id = self.handles.issue_shader();
        debug!(id, kind = kind.name(), "Shader compiled");
        Ok(Shader::new(id, kind, source))
    }

    fn create_buffer(&mut self, size_bytes: usize) -> Result<Buffer> {
        self.state.require("create_buffer", &[BackendState::Ready])?;

        let mut inner = crate::compute::DeviceBuffer::<u8>::new(&self.device);
        inner.resize(size_bytes)?;

        let id = self.handles.issue_buffer();
        debug!(id, size_bytes, "Buffer created");
        Ok(Buffer::new(id, inner))
    }

    fn create_job(&mut self) -> Result<RasterJob> {
        self.state.require("create_job", &[BackendState::Ready])?;

        let id = self.handles.issue_job();
        debug!(id, "Raster job created");
        Ok(RasterJob::new(id))
    }
}
