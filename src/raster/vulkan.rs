//! Vulkan 后端模块
//!
//! 与 OpenGL 路线的两点本质差异：窗口不携带任何客户端上下文，
//! 渲染目标是后端自己创建的表面加交换链；队列提交没有线程亲和，
//! `make_context_current` 只推进生命周期状态，之后任何线程都可以
//! 调用 `draw` 与 `resize_window`。
//!
//! # 设计原则
//!
//! - **表面归后端**：窗口提示必须声明"无客户端上下文"，否则
//!   表面创建直接失败
//! - **交换链随尺寸重建**：视口变化使交换链换代，代号单调递增，
//!   相同尺寸的调整不换代
//! - **自由线程**：状态校验照常，线程校验不存在

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

/// Vulkan 光栅化后端
pub struct VulkanBackend {
    /// 生命周期状态
    state: BackendState,
    /// 主计算设备
    device: GpuDevice,
    /// 垂直同步开关（来自图形配置）
    vsync: bool,
    /// 当前表面尺寸
    surface_extent: (u32, u32),
    /// 交换链代号，每次重建递增
    swapchain_generation: u64,
    /// 本后端签发的句柄
    handles: HandleRegistry,
    /// 已提交的帧数
    frames_presented: u64,
}

impl VulkanBackend {
    /// 根据配置构造后端实例
    pub fn new(graphics: &GraphicsConfig, compute: &ComputeConfig) -> Self {
        Self {
            state: BackendState::Uninitialized,
            device: GpuDevice::with_memory_budget(
                GpuApi::Vulkan,
                0,
                compute.device_memory_bytes(),
            ),
            vsync: graphics.vsync,
            surface_extent: (0, 0),
            swapchain_generation: 0,
            handles: HandleRegistry::new(),
            frames_presented: 0,
        }
    }

    /// 已提交的帧数
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// 当前表面尺寸
    pub fn surface_extent(&self) -> (u32, u32) {
        self.surface_extent
    }

    /// 当前交换链代号，窗口构建后从 1 起计
    pub fn swapchain_generation(&self) -> u64 {
        self.swapchain_generation
    }
}

impl RasterBase for VulkanBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Vulkan
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

        // 表面由后端创建，窗口自己不得携带客户端上下文
        window.set_hints(WindowHints {
            client_api: ClientApi::None,
            double_buffer: true,
            swap_interval: u32::from(self.vsync),
        });
        self.state = BackendState::Hinted;
        debug!(window = window.id(), "Vulkan window hints applied");
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

        // 1. 窗口提示必须声明无客户端上下文
        let hints = window.hints().ok_or(MisuseError::InvalidState {
            operation: "build_window",
            state: "window not hinted",
        })?;
        if hints.client_api != ClientApi::None {
            return Err(BackendError::SurfaceCreation(
                "cannot create Vulkan surface: window owns a client OpenGL context".to_string(),
            )
            .into());
        }

        // 2. 创建表面与首代交换链
        window.mark_built();
        self.surface_extent = (window.width(), window.height());
        self.swapchain_generation = 1;
        self.state = BackendState::WindowBuilt;

        info!(
            window = window.id(),
            width = window.width(),
            height = window.height(),
            vsync = self.vsync,
            "Vulkan surface and swapchain created"
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
        if !window.is_built() {
            return Err(MisuseError::InvalidState {
                operation: "resize_window",
                state: "window not built",
            }
            .into());
        }

        if self.surface_extent == (width, height)
            && (window.width(), window.height()) == (width, height)
        {
            trace!(width, height, "Surface extent unchanged, swapchain kept");
            return Ok(());
        }

        // 尺寸变化使旧交换链失效，重建并换代
        window.set_size(width, height);
        self.surface_extent = (width, height);
        self.swapchain_generation += 1;
        debug!(
            window = window.id(),
            width,
            height,
            generation = self.swapchain_generation,
            "Swapchain recreated"
        );
        Ok(())
    }

    fn draw(&mut self, window: &WindowHandle, job: &mut RasterJob) -> Result<()> {
        self.state.require("draw", &[BackendState::Ready])?;
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
            generation = self.swapchain_generation,
            "Frame submitted and presented"
        );
        Ok(())
    }

    fn make_context_current(&mut self) -> Result<()> {
        self.state.require(
            "make_context_current",
            &[BackendState::WindowBuilt, BackendState::Ready],
        )?;
        // 队列提交不挑线程，这里只推进状态
        self.state = BackendState::Ready;
        debug!("Vulkan queues ready, submissions accepted from any thread");
        Ok(())
    }

    fn create_shader(&mut self, source: &str, kind: ShaderKind) -> Result<Shader> {
        self.state.require("create_shader", &[BackendState::Ready])?;
        if source.trim().is_empty() {
            return Err(BackendError::ShaderCompilation(format!(
                "cannot assemble SPIR-V module from empty {} shader source",
                kind.name()
            ))
            .into());
        }

        let id = self.handles.issue_shader();
        debug!(id, kind = kind.name(), "Shader module created");
        Ok(Shader::new(id, kind, source))
    }

    fn create_buffer(&mut self, size_bytes: usize) -> Result<Buffer> {
        self.state.require("create_buffer", &[BackendState::Ready])?;

        let mut inner = crate::compute::DeviceBuffer::<u8>::new(&self.device);
        inner.resize(size_bytes)?;

        let id = self.handles.issue_buffer();
        debug!(id, size_bytes, "Device-local buffer created");
        Ok(Buffer::new(id, inner))
    }

    fn create_job(&mut self) -> Result<RasterJob> {
        self.state.require("create_job", &[BackendState::Ready])?;

        let id = self.handles.issue_job();
        debug!(id, "Raster job created");
        Ok(RasterJob::new(id))
    }
}
