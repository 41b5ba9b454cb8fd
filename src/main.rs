//! Soul Engine - 多后端渲染引擎
//!
//! 这是一个支持多图形 API 的渲染与计算引擎，目前支持 OpenGL 和
//! Vulkan。可以通过配置文件或命令行参数选择使用的图形后端。
//!
//! # 使用方法
//!
//! ```bash
//! # 使用配置文件
//! cargo run
//!
//! # 使用 Vulkan（命令行覆盖）
//! cargo run -- --vulkan
//! ```
//!
//! # 架构概览
//!
//! ```text
//! ┌──────────────┐
//! │   main.rs    │  应用程序入口
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │     Core     │  配置/日志/错误处理
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │ RasterBackend│  统一光栅化门面
//! └──────┬───────┘
//!        │
//!   ┌────┴─────┐
//!   │          │
//! ┌─▼────┐  ┌──▼───┐
//! │OpenGL│  │Vulkan│  具体后端实现
//! └──┬───┘  └──┬───┘
//!    └────┬────┘
//! ┌───────▼──────┐
//! │   Compute    │  设备内存账本与缓冲区
//! └──────────────┘
//! ```
//!
//! # 模块说明
//!
//! - `core`：核心功能模块（日志、配置、错误处理）
//! - `raster`：光栅化模块，提供统一的后端门面
//! - `compute`：计算模块，设备内存上的类型化缓冲区

use soul_engine::compute::{DeviceBuffer, GpuApi, GpuDevice};
use soul_engine::core::{log, Config, Result};
use soul_engine::raster::{RasterBackend, ShaderKind, WindowHandle};
use tracing::{error, info};

/// 演示用顶点着色器
const DEMO_VERTEX_SHADER: &str = r#"
#version 450 core
layout(location = 0) in vec2 position;
void main() {
    gl_Position = vec4(position, 0.0, 1.0);
}
"#;

/// 应用程序入口点
///
/// 初始化日志系统、加载配置、选择图形后端，然后跑一段
/// 有界的演示流程并干净退出。
///
/// # 初始化流程
///
/// 1. 加载引擎配置文件（soul.toml）
/// 2. 应用命令行参数覆盖
/// 3. 验证配置
/// 4. 初始化日志系统
/// 5. 运行演示流程
///
/// # 命令行参数
///
/// - `--opengl`: 使用 OpenGL 后端
/// - `--vulkan`: 使用 Vulkan 后端
/// - `--width <value>`: 设置窗口宽度
/// - `--height <value>`: 设置窗口高度
fn main() {
    // 1. 加载配置（在初始化日志之前）
    let mut config = Config::from_file_or_default("soul.toml");

    // 2. 应用命令行参数
    config.apply_args(std::env::args().skip(1));

    // 3. 验证配置
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // 4. 初始化日志系统（使用配置中的设置）
    let log_file = if config.logging.file_output {
        Some(config.logging.log_file.as_str())
    } else {
        None
    };
    log::init_logger(config.logging.level, config.logging.file_output, log_file);
    info!("Soul Engine starting...");
    info!(version = env!("CARGO_PKG_VERSION"), "Application initialized");
    info!(
        backend = config.graphics.backend.name(),
        width = config.window.width,
        height = config.window.height,
        resizable = config.window.resizable,
        "Graphics configuration"
    );

    // 5. 运行演示流程
    if let Err(e) = run(&config) {
        error!("Engine run failed: {}", e);
        eprintln!("Engine run failed: {}", e);
        std::process::exit(1);
    }

    info!("Soul Engine shut down cleanly");
}

/// 演示流程：窗口构建、三角形提交、计算缓冲区往返
fn run(config: &Config) -> Result<()> {
    // 1. 初始化光栅化后端
    let mut raster = RasterBackend::new();
    raster.init(config)?;

    // 2. 窗口走 提示 -> 构建 -> 绑定上下文 的固定顺序
    let mut window = WindowHandle::new(
        config.window.width,
        config.window.height,
        config.window.title.as_str(),
    );
    raster.set_window_hints(&mut window)?;
    raster.build_window(&mut window)?;
    raster.make_context_current()?;

    // 3. 上传三角形顶点
    let vertices: [f32; 6] = [0.0, 0.5, -0.5, -0.5, 0.5, -0.5];
    let mut vertex_buffer = raster.create_buffer(std::mem::size_of_val(&vertices))?;
    vertex_buffer.upload(&vertices)?;

    // 4. 编译着色器并录制作业
    let shader = raster.create_shader(DEMO_VERTEX_SHADER, ShaderKind::Vertex)?;
    let mut job = raster.create_job()?;
    job.clear_color(config.graphics.clear_color)
        .bind_shader(&shader)
        .bind_buffer(0, &vertex_buffer)
        .draw_arrays(0, 3);

    // 5. 提交几帧，中途演示一次窗口调整
    for frame in 0..3u32 {
        if frame == 1 {
            raster.resize_window(&mut window, config.window.width / 2, config.window.height / 2)?;
        }
        raster.draw(&window, &mut job)?;
    }
    info!(frames = raster.frames_presented()?, "Raster demo finished");

    // 6. 计算缓冲区往返：上传、同步、读回
    let device = GpuDevice::new(GpuApi::Cuda, 0);
    let mut compute_buffer = DeviceBuffer::<f32>::new(&device);
    compute_buffer.resize(1024)?;

    let mut staging: Vec<f32> = (0..1024).map(|i| i as f32).collect();
    compute_buffer.transfer_to_device(&mut staging)?;
    device.synchronize();

    let mut readback = Vec::new();
    compute_buffer.transfer_to_host(&mut readback)?;
    info!(
        device = %device,
        elements = readback.len(),
        "Compute round trip finished"
    );

    // 7. 销毁后端并释放资源
    raster.terminate()?;
    Ok(())
}
