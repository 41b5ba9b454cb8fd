//! 句柄登记模块
//!
//! 每个后端实例维护一份自己签发过的句柄登记，绘制提交前据此
//! 甄别外来句柄。句柄只是数字，跨后端传递不会产生悬垂引用，
//! 但把 A 后端的着色器交给 B 后端提交是调用方缺陷，必须在
//! 提交入口拦下而不是静默接受。
//!
//! # 设计原则
//!
//! - **签发即登记**：工厂方法从这里取号，号码单调递增
//! - **提交前整体校验**：作业本身与其引用的所有句柄先全部
//!   验明正身，然后才执行提交

use std::collections::HashSet;

use crate::core::error::{MisuseError, Result};

use super::job::{JobCommand, RasterJob};

/// 单个后端实例的句柄登记簿
#[derive(Debug, Default)]
pub(crate) struct HandleRegistry {
    /// 发号器，所有句柄种类共用一个号段
    next_id: u64,
    /// 已签发的着色器
    shaders: HashSet<u64>,
    /// 已签发的缓冲区
    buffers: HashSet<u64>,
    /// 已签发的作业
    jobs: HashSet<u64>,
}

impl HandleRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// 签发一个着色器句柄
    pub(crate) fn issue_shader(&mut self) -> u64 {
        let id = self.next_id();
        self.shaders.insert(id);
        id
    }

    /// 签发一个缓冲区句柄
    pub(crate) fn issue_buffer(&mut self) -> u64 {
        let id = self.next_id();
        self.buffers.insert(id);
        id
    }

    /// 签发一个作业句柄
    pub(crate) fn issue_job(&mut self) -> u64 {
        let id = self.next_id();
        self.jobs.insert(id);
        id
    }

    /// 校验作业与其引用的所有句柄都出自本登记簿
    pub(crate) fn validate_job(&self, job: &RasterJob) -> Result<()> {
        if !self.jobs.contains(&job.id()) {
            return Err(MisuseError::ForeignHandle {
                kind: "job",
                id: job.id(),
            }
            .into());
        }
        for command in job.commands() {
            match *command {
                JobCommand::BindShader { shader } if !self.shaders.contains(&shader) => {
                    return Err(MisuseError::ForeignHandle {
                        kind: "shader",
                        id: shader,
                    }
                    .into());
                }
                JobCommand::BindBuffer { buffer, .. } if !self.buffers.contains(&buffer) => {
                    return Err(MisuseError::ForeignHandle {
                        kind: "buffer",
                        id: buffer,
                    }
                    .into());
                }
                _ => {}
            }
        }
        Ok(())
    }
}
