//! 缓冲区存储策略模块
//!
//! 定义缓冲区的存储后端接口。缓冲区本身只维护元数据（大小、容量、
//! 归属设备），实际的内存驻留方式由存储策略决定：OpenGL 家族使用
//! 宿主可见的固定内存，CUDA 与 Vulkan 家族使用设备本地内存。
//!
//! # 设计原则
//!
//! - **唯一的重分配钩子**：`reallocate` 是存储策略唯一需要关心的
//!   变形点，增长策略与元数据维护全部留在缓冲区层
//! - **事务性失败**：`reallocate` 失败时必须保持现有存储不变
//! - **预算记账**：设备本地存储在设备账本上记账，耗尽可测试

use std::ops::Range;
use std::ptr;

use bytemuck::{Pod, Zeroable};

use super::device::{GpuApi, GpuDevice};
use crate::core::error::{ComputeError, Result};

/// 缓冲区存储策略
///
/// `DeviceBuffer` 通过本 trait 与具体的内存驻留方式解耦。
/// 实现新的驻留方式时只需要提供 `reallocate`，其余访问方法
/// 描述的是已分配区间上的读写。
///
/// # 契约
///
/// - `reallocate(live, new_capacity, device)` 必须保留前
///   `min(live, new_capacity)` 个元素，新增槽位必须是后端默认
///   初始化（零字节模式）；失败时存储与内容保持原状
/// - 非宿主可见的存储必须把当前容量记在设备账本上；缓冲区
///   在丢弃与迁移时按这一约定销账或转移账目
/// - `write`/`read`/`fill` 的区间由调用方保证落在容量之内
/// - 容量为 0 时 `as_ptr` 返回空指针
pub trait BufferStorage<T: Pod> {
    /// 存储所属的 API 家族
    fn api(&self) -> GpuApi;

    /// 宿主是否可以直接以切片访问存储
    fn host_visible(&self) -> bool;

    /// 在给定设备上可分配的最大元素数
    fn max_elements(&self, device: &GpuDevice) -> usize;

    /// 重分配到新容量，保留前 `min(live, new_capacity)` 个元素
    fn reallocate(&mut self, live: usize, new_capacity: usize, device: &GpuDevice)
        -> Result<()>;

    /// 向存储写入一段元素
    fn write(&mut self, offset: usize, data: &[T]);

    /// 从存储读取一段元素
    fn read(&self, offset: usize, out: &mut [T]);

    /// 以 `value` 填充一段区间
    fn fill(&mut self, range: Range<usize>, value: T);

    /// 存储起始的原始指针，容量为 0 时为空指针
    fn as_ptr(&self) -> *const T;

    /// 存储起始的可变原始指针，容量为 0 时为空指针
    fn as_mut_ptr(&mut self) -> *mut T;

    /// 宿主可见存储返回前 `len` 个元素的切片视图，否则返回 `None`
    fn host_slice(&self, len: usize) -> Option<&[T]>;

    /// 宿主可见存储返回前 `len` 个元素的可变切片视图，否则返回 `None`
    fn host_slice_mut(&mut self, len: usize) -> Option<&mut [T]>;
}

/// 根据设备的 API 家族选择存储策略
pub(crate) fn storage_for<T: Pod>(device: &GpuDevice) -> Box<dyn BufferStorage<T>> {
    match device.api() {
        GpuApi::OpenGl => Box::new(HostVisibleStorage::new()),
        GpuApi::Cuda => Box::new(DeviceLocalStorage::new(GpuApi::Cuda)),
        GpuApi::Vulkan => Box::new(DeviceLocalStorage::new(GpuApi::Vulkan)),
    }
}

/// 元素大小，ZST 返回 `None`
fn element_size<T>() -> Option<u64> {
    let size = std::mem::size_of::<T>() as u64;
    if size == 0 { None } else { Some(size) }
}

/// 宿主可见存储（OpenGL 家族）
///
/// 数据驻留在宿主侧的固定内存中，设备通过映射访问。
/// 分配上限来自宿主地址空间，不占用设备账本。
pub struct HostVisibleStorage<T: Pod> {
    /// 所有槽位都已初始化，`len` 即容量
    data: Vec<T>,
}

impl<T: Pod> HostVisibleStorage<T> {
    /// 创建空存储，不分配内存
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }
}

impl<T: Pod> Default for HostVisibleStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Pod> BufferStorage<T> for HostVisibleStorage<T> {
    fn api(&self) -> GpuApi {
        GpuApi::OpenGl
    }

    fn host_visible(&self) -> bool {
        true
    }

    fn max_elements(&self, _device: &GpuDevice) -> usize {
        match element_size::<T>() {
            // 上限来自宿主地址空间
            Some(size) => usize::try_from(isize::MAX as u64 / size).unwrap_or(usize::MAX),
            None => usize::MAX,
        }
    }

    fn reallocate(&mut self, live: usize, new_capacity: usize, _device: &GpuDevice)
        -> Result<()>
    {
        let mut next: Vec<T> = Vec::new();
        if next.try_reserve_exact(new_capacity).is_err() {
            return Err(ComputeError::AllocationFailed(format!(
                "host allocation of {} elements failed",
                new_capacity
            ))
            .into());
        }
        next.resize(new_capacity, T::zeroed());

        let keep = live.min(new_capacity);
        next[..keep].copy_from_slice(&self.data[..keep]);
        self.data = next;
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[T]) {
        self.data[offset..offset + data.len()].copy_from_slice(data);
    }

    fn read(&self, offset: usize, out: &mut [T]) {
        out.copy_from_slice(&self.data[offset..offset + out.len()]);
    }

    fn fill(&mut self, range: Range<usize>, value: T) {
        self.data[range].fill(value);
    }

    fn as_ptr(&self) -> *const T {
        if self.data.capacity() == 0 {
            ptr::null()
        } else {
            self.data.as_ptr()
        }
    }

    fn as_mut_ptr(&mut self) -> *mut T {
        if self.data.capacity() == 0 {
            ptr::null_mut()
        } else {
            self.data.as_mut_ptr()
        }
    }

    fn host_slice(&self, len: usize) -> Option<&[T]> {
        Some(&self.data[..len])
    }

    fn host_slice_mut(&mut self, len: usize) -> Option<&mut [T]> {
        Some(&mut self.data[..len])
    }
}

/// 设备本地存储（CUDA 与 Vulkan 家族）
///
/// 数据驻留在设备本地内存中，宿主不可直接访问，读写经由
/// 同步传输完成。分配在设备账本上记账，超出预算时整笔拒绝。
pub struct DeviceLocalStorage<T: Pod> {
    /// 存储所属的 API 家族
    api: GpuApi,
    /// 设备内存的宿主侧镜像，`len` 即容量
    data: Vec<T>,
}

impl<T: Pod> DeviceLocalStorage<T> {
    /// 创建空存储，不分配内存也不记账
    pub fn new(api: GpuApi) -> Self {
        Self {
            api,
            data: Vec::new(),
        }
    }
}

impl<T: Pod> BufferStorage<T> for DeviceLocalStorage<T> {
    fn api(&self) -> GpuApi {
        self.api
    }

    fn host_visible(&self) -> bool {
        false
    }

    fn max_elements(&self, device: &GpuDevice) -> usize {
        match element_size::<T>() {
            Some(size) => {
                // 上限取设备预算与地址空间的较小者
                let budget_cap = device.total_memory() / size;
                let address_cap = isize::MAX as u64 / size;
                usize::try_from(budget_cap.min(address_cap)).unwrap_or(usize::MAX)
            }
            None => usize::MAX,
        }
    }

    fn reallocate(&mut self, live: usize, new_capacity: usize, device: &GpuDevice)
        -> Result<()>
    {
        let size = std::mem::size_of::<T>() as u64;
        let new_bytes = (new_capacity as u64).saturating_mul(size);
        let old_bytes = (self.data.len() as u64).saturating_mul(size);

        // 1. 先在账本上记入新区间，耗尽则在触碰存储之前失败
        device.charge(new_bytes)?;

        // 2. 分配新区间，失败时退还账目，存储保持原状
        let mut next: Vec<T> = Vec::new();
        if next.try_reserve_exact(new_capacity).is_err() {
            device.release(new_bytes);
            return Err(ComputeError::AllocationFailed(format!(
                "device allocation of {} bytes failed",
                new_bytes
            ))
            .into());
        }
        next.resize(new_capacity, T::zeroed());

        // 3. 搬运存活元素，再释放旧区间
        let keep = live.min(new_capacity);
        next[..keep].copy_from_slice(&self.data[..keep]);
        self.data = next;
        device.release(old_bytes);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[T]) {
        self.data[offset..offset + data.len()].copy_from_slice(data);
    }

    fn read(&self, offset: usize, out: &mut [T]) {
        out.copy_from_slice(&self.data[offset..offset + out.len()]);
    }

    fn fill(&mut self, range: Range<usize>, value: T) {
        self.data[range].fill(value);
    }

    fn as_ptr(&self) -> *const T {
        if self.data.capacity() == 0 {
            ptr::null()
        } else {
            self.data.as_ptr()
        }
    }

    fn as_mut_ptr(&mut self) -> *mut T {
        if self.data.capacity() == 0 {
            ptr::null_mut()
        } else {
            self.data.as_mut_ptr()
        }
    }

    fn host_slice(&self, _len: usize) -> Option<&[T]> {
        None
    }

    fn host_slice_mut(&mut self, _len: usize) -> Option<&mut [T]> {
        None
    }
}
