//! 光栅化作业模块
//!
//! 作业是一份可反复提交的命令记录：清屏、绑定着色器与顶点
//! 缓冲区、绘制区间。记录只登记句柄编号，不持有资源本身；
//! 后端在 `draw` 提交时校验所有句柄确实是自己签发的。

use super::buffer::Buffer;
use super::shader::Shader;

/// 作业中的单条命令
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JobCommand {
    /// 以给定颜色清空帧缓冲（RGBA）
    ClearColor([f32; 4]),
    /// 绑定着色器
    BindShader { shader: u64 },
    /// 把顶点缓冲区绑定到槽位
    BindBuffer { slot: u32, buffer: u64 },
    /// 绘制顶点区间
    DrawArrays { first: u32, count: u32 },
}

/// 光栅化作业
///
/// 由后端的 `create_job` 签发。记录阶段在引擎侧完成，
/// 提交阶段由 `draw` 执行并推进帧计数。
///
/// # 使用示例
///
/// ```no_run
/// # use soul_engine::core::Config;
/// # use soul_engine::raster::RasterBackend;
/// # let mut raster = RasterBackend::new();
/// # raster.init(&Config::default()).unwrap();
/// # let mut job = raster.create_job().unwrap();
/// job.clear_color([0.0, 0.0, 0.0, 1.0])
///     .draw_arrays(0, 3);
/// ```
#[derive(Debug)]
pub struct RasterJob {
    /// 后端签发的编号
    id: u64,
    /// 已记录的命令
    commands: Vec<JobCommand>,
    /// 此作业已被提交的帧数
    presented_frames: u64,
}

impl RasterJob {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            commands: Vec::new(),
            presented_frames: 0,
        }
    }

    /// 后端签发的编号
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 记录一条清屏命令
    pub fn clear_color(&mut self, color: [f32; 4]) -> &mut Self {
        self.commands.push(JobCommand::ClearColor(color));
        self
    }

    /// 记录一条着色器绑定
    pub fn bind_shader(&mut self, shader: &Shader) -> &mut Self {
        self.commands.push(JobCommand::BindShader { shader: shader.id() });
        self
    }

    /// 记录一条顶点缓冲区绑定
    pub fn bind_buffer(&mut self, slot: u32, buffer: &Buffer) -> &mut Self {
        self.commands.push(JobCommand::BindBuffer {
            slot,
            buffer: buffer.id(),
        });
        self
    }

    /// 记录一条顶点区间绘制
    pub fn draw_arrays(&mut self, first: u32, count: u32) -> &mut Self {
        self.commands.push(JobCommand::DrawArrays { first, count });
        self
    }

    /// 已记录的命令
    pub fn commands(&self) -> &[JobCommand] {
        &self.commands
    }

    /// 已记录的命令数
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// 作业是否为空
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// 清空命令记录，保留句柄与帧计数
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// 此作业已被提交的帧数
    pub fn presented_frames(&self) -> u64 {
        self.presented_frames
    }

    /// 记录一次提交（由后端在 `draw` 中调用）
    pub(crate) fn mark_presented(&mut self) {
        self.presented_frames += 1;
    }
}
