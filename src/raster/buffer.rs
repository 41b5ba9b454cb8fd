//! 光栅化缓冲区模块
//!
//! 后端托管的顶点/属性缓冲区。外壳是后端签发的句柄，内部复用
//! 计算层的 [`DeviceBuffer<u8>`]，因此分配、预算记账与传输协议
//! 与计算缓冲区完全一致。

use bytemuck::Pod;

use crate::compute::DeviceBuffer;
use crate::core::error::Result;

/// 后端托管的字节缓冲区
///
/// 由后端的 `create_buffer` 签发。类型化数据经由 `bytemuck`
/// 转成字节写入，读回时可以按原始字节取出，也可以重新解释
/// 为类型化数据。
#[derive(Debug)]
pub struct Buffer {
    /// 后端签发的编号
    id: u64,
    /// 实际存储
    inner: DeviceBuffer<u8>,
}

impl Buffer {
    pub(crate) fn new(id: u64, inner: DeviceBuffer<u8>) -> Self {
        Self { id, inner }
    }

    /// 后端签发的编号
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 当前内容的字节数
    pub fn len_bytes(&self) -> usize {
        self.inner.size()
    }

    /// 缓冲区是否为空
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// 上传一段类型化数据，缓冲区调整到数据的字节长度
    ///
    /// 对应 `glBufferData` 的语义：上传即重新定义缓冲区内容。
    pub fn upload<T: Pod>(&mut self, data: &[T]) -> Result<()> {
        let mut bytes = bytemuck::cast_slice::<T, u8>(data).to_vec();
        self.inner.resize(bytes.len())?;
        self.inner.transfer_to_device(&mut bytes)
    }

    /// 读回缓冲区的全部内容
    pub fn read_back_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.inner.transfer_to_host(&mut out)?;
        Ok(out)
    }

    /// 读回缓冲区内容并解释为类型化数据
    ///
    /// 按未对齐方式逐元素读取，不要求字节缓冲满足 `T` 的对齐；
    /// 尾部不足一个元素的字节被丢弃。
    pub fn read_back<T: Pod>(&self) -> Result<Vec<T>> {
        let bytes = self.read_back_bytes()?;
        let stride = std::mem::size_of::<T>();
        if stride == 0 {
            return Ok(Vec::new());
        }
        Ok(bytes
            .chunks_exact(stride)
            .map(bytemuck::pod_read_unaligned)
            .collect())
    }

    /// 内部的设备缓冲区
    pub fn device_buffer(&self) -> &DeviceBuffer<u8> {
        &self.inner
    }

    /// 内部的设备缓冲区（可变）
    pub fn device_buffer_mut(&mut self) -> &mut DeviceBuffer<u8> {
        &mut self.inner
    }
}
