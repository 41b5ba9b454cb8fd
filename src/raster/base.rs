//! 渲染后端契约模块
//!
//! 定义所有光栅化后端必须实现的统一接口 [`RasterBase`]，以及
//! 后端实例的生命周期状态机。上层通过这个契约驱动窗口构建与
//! 帧提交，而不关心底层是 OpenGL 还是 Vulkan。
//!
//! # 生命周期
//!
//! ```text
//! Uninitialized --set_window_hints--> Hinted --build_window--> WindowBuilt
//!                                                                  |
//!                                              make_context_current|
//!                                                                  v
//!                                                                Ready
//! ```
//!
//! `Ready` 状态下 `draw` 与 `resize_window` 可以任意次调用。
//! 乱序调用不是环境故障，而是调用方缺陷，以契约违规错误快速失败。

use crate::compute::GpuDevice;
use crate::core::config::BackendKind;
use crate::core::error::{MisuseError, Result};

use super::buffer::Buffer;
use super::job::RasterJob;
use super::shader::{Shader, ShaderKind};
use super::window::WindowHandle;

/// 后端实例的生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    /// 已构造，尚未施加窗口提示
    Uninitialized,
    /// 窗口提示已施加
    Hinted,
    /// 窗口已构建，API 资源就绪
    WindowBuilt,
    /// 上下文就绪，可以提交绘制
    Ready,
}

impl BackendState {
    /// 状态名称
    pub fn name(&self) -> &'static str {
        match self {
            BackendState::Uninitialized => "Uninitialized",
            BackendState::Hinted => "Hinted",
            BackendState::WindowBuilt => "WindowBuilt",
            BackendState::Ready => "Ready",
        }
    }

    /// 校验操作在当前状态下是否合法
    pub(crate) fn require(
        self,
        operation: &'static str,
        allowed: &[BackendState],
    ) -> Result<()> {
        if allowed.contains(&self) {
            Ok(())
        } else {
            Err(MisuseError::InvalidState {
                operation,
                state: self.name(),
            }
            .into())
        }
    }
}

/// 光栅化后端统一契约
///
/// 每个实现负责一种图形 API 的窗口构建、上下文管理、资源工厂
/// 与帧提交。实现持有自己的主计算设备，并负责校验经手的句柄
/// 确实是自己签发的。
pub trait RasterBase {
    /// 后端种类
    fn kind(&self) -> BackendKind;

    /// 当前生命周期状态
    fn state(&self) -> BackendState;

    /// 后端的主计算设备
    fn device(&self) -> &GpuDevice;

    /// 在窗口上施加 API 相关的创建提示
    ///
    /// 必须在 `build_window` 之前调用。OpenGL 后端请求一个客户端
    /// GL 上下文，Vulkan 后端请求不创建任何客户端上下文。
    fn set_window_hints(&mut self, window: &mut WindowHandle) -> Result<()>;

    /// 构建窗口的 API 资源
    ///
    /// OpenGL 后端在此加载扩展函数指针，Vulkan 后端在此创建
    /// 渲染表面与交换链。失败是致命的初始化错误。
    fn build_window(&mut self, window: &mut WindowHandle) -> Result<()>;

    /// 调整窗口与视口大小，可任意次调用
    fn resize_window(
        &mut self,
        window: &mut WindowHandle,
        width: u32,
        height: u32,
    ) -> Result<()>;

    /// 提交一个光栅化作业并推进一帧
    fn draw(&mut self, window: &WindowHandle, job: &mut RasterJob) -> Result<()>;

    /// 把渲染上下文绑定到调用线程
    ///
    /// OpenGL 后端此后只接受来自该线程的 `draw` / `resize_window`；
    /// Vulkan 后端没有线程亲和的上下文，此调用只推进状态。
    fn make_context_current(&mut self) -> Result<()>;

    /// 编译着色器，返回后端签发的句柄
    fn create_shader(&mut self, source: &str, kind: ShaderKind) -> Result<Shader>;

    /// 创建后端托管的字节缓冲区
    fn create_buffer(&mut self, size_bytes: usize) -> Result<Buffer>;

    /// 创建空的光栅化作业
    fn create_job(&mut self) -> Result<RasterJob>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::SoulError;

    #[test]
    fn test_state_names() {
        assert_eq!(BackendState::Uninitialized.name(), "Uninitialized");
        assert_eq!(BackendState::Hinted.name(), "Hinted");
        assert_eq!(BackendState::WindowBuilt.name(), "WindowBuilt");
        assert_eq!(BackendState::Ready.name(), "Ready");
    }

    #[test]
    fn test_require_allows_listed_states() {
        let ok = BackendState::Ready.require("draw", &[BackendState::Ready]);
        assert!(ok.is_ok());

        let err = BackendState::Hinted
            .require("draw", &[BackendState::Ready])
            .unwrap_err();
        match err {
            SoulError::Misuse(MisuseError::InvalidState { operation, state }) => {
                assert_eq!(operation, "draw");
                assert_eq!(state, "Hinted");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
