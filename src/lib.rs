//! Soul Engine - 多后端渲染与计算核心
//!
//! Soul Engine 是一个支持 OpenGL 和 Vulkan 的渲染与计算核心。
//! 本库提供统一的光栅化后端门面，以及建立在设备内存预算之上
//! 的类型化计算缓冲区。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（日志、配置、错误处理）
//! - `compute`: 计算模块（GPU 设备、内存账本、类型化设备缓冲区）
//! - `raster`: 光栅化模块（后端门面、窗口、着色器、作业）
//!
//! # 使用示例
//!
//! ```no_run
//! use soul_engine::core::{Config, Result};
//! use soul_engine::raster::{RasterBackend, ShaderKind, WindowHandle};
//!
//! fn main() -> Result<()> {
//!     let config = Config::default();
//!
//!     // 根据配置选择并初始化后端
//!     let mut raster = RasterBackend::new();
//!     raster.init(&config)?;
//!
//!     // 窗口走 提示 -> 构建 -> 绑定上下文 的固定顺序
//!     let mut window = WindowHandle::new(800, 600, "Soul Engine");
//!     raster.set_window_hints(&mut window)?;
//!     raster.build_window(&mut window)?;
//!     raster.make_context_current()?;
//!
//!     // 录制并提交一帧
//!     let shader = raster.create_shader("void main() {}", ShaderKind::Vertex)?;
//!     let mut job = raster.create_job()?;
//!     job.clear_color([1.0, 1.0, 1.0, 1.0])
//!         .bind_shader(&shader)
//!         .draw_arrays(0, 3);
//!     raster.draw(&window, &mut job)?;
//!
//!     raster.terminate()?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod compute;
pub mod raster;
