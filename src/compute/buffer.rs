//! 通用 GPU 缓冲区模块
//!
//! 提供类型化的设备端向量 `DeviceBuffer<T>`，语义上对应
//! 宿主侧的 `Vec<T>`：维护大小与容量两个量，支持增长、收缩、
//! 预留与紧缩。所有会改变容量的操作都汇入唯一的重分配通道，
//! 存储策略只需要实现这一个钩子。
//!
//! # 设计原则
//!
//! - **大小/容量分离**：收缩只移动大小，不触发重分配
//! - **事务性失败**：分配失败时缓冲区的内容与元数据保持原状，
//!   调用方可以释放资源后重试
//! - **摊销增长**：`resize` 按倍增扩容，`reserve` 精确扩容
//! - **显式传输**：设备内容经由 `transfer_to_host` /
//!   `transfer_to_device` 与宿主向量交换，宿主向量由被调方
//!   调整到缓冲区大小
//!
//! # 使用示例
//!
//! ```no_run
//! use soul_engine::compute::{DeviceBuffer, GpuApi, GpuDevice};
//!
//! let device = GpuDevice::new(GpuApi::Cuda, 0);
//! let mut buffer = DeviceBuffer::<f32>::new(&device);
//!
//! buffer.resize(1024).unwrap();
//! let mut host = vec![1.0f32; 1024];
//! buffer.transfer_to_device(&mut host).unwrap();
//! device.synchronize();
//! ```

use std::fmt;

use bytemuck::{Pod, Zeroable};
use tracing::{debug, trace};

use super::device::{GpuApi, GpuDevice};
use super::storage::{storage_for, BufferStorage};
use crate::core::error::{ComputeError, Result};

/// 类型化的设备端缓冲区
///
/// 元素类型要求 `bytemuck::Pod`：任意字节模式都是合法值，
/// 可以安全地零初始化和按字节搬运。
///
/// 缓冲区绑定一个 [`GpuDevice`]，存储策略由设备的 API 家族
/// 决定。克隆设备描述符不会克隆缓冲区，缓冲区本身不可克隆。
pub struct DeviceBuffer<T: Pod> {
    /// 逻辑元素个数
    size: usize,
    /// 已分配的元素槽位数
    capacity: usize,
    /// 归属设备
    device: GpuDevice,
    /// 存储策略
    storage: Box<dyn BufferStorage<T>>,
}

impl<T: Pod> DeviceBuffer<T> {
    /// 在给定设备上创建空缓冲区
    ///
    /// 不分配任何内存：大小与容量都是 0，数据指针为空。
    pub fn new(device: &GpuDevice) -> Self {
        Self {
            size: 0,
            capacity: 0,
            device: device.clone(),
            storage: storage_for::<T>(device),
        }
    }

    /// 使用自定义存储策略创建空缓冲区
    ///
    /// 存储策略只需要实现 [`BufferStorage::reallocate`] 的事务
    /// 语义，`resize` / `reserve` / `fit` 的行为即自动成立。
    pub fn with_storage(device: &GpuDevice, storage: Box<dyn BufferStorage<T>>) -> Self {
        Self {
            size: 0,
            capacity: 0,
            device: device.clone(),
            storage,
        }
    }

    /// 缓冲区归属设备的 API 家族
    pub fn api(&self) -> GpuApi {
        self.device.api()
    }

    /// 缓冲区归属的设备
    pub fn device(&self) -> &GpuDevice {
        &self.device
    }

    /// 当前元素个数
    pub fn size(&self) -> usize {
        self.size
    }

    /// 已分配的元素槽位数
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 缓冲区是否为空
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// 此设备上单个缓冲区可容纳的最大元素数
    ///
    /// 对设备本地存储，上限来自设备内存预算；对宿主可见存储，
    /// 上限来自宿主地址空间。零大小类型不受上限约束。
    pub fn max_size(&self) -> usize {
        self.storage.max_elements(&self.device)
    }

    /// 宿主是否可以直接以切片访问缓冲区内容
    pub fn host_visible(&self) -> bool {
        self.storage.host_visible()
    }

    /// 调整缓冲区大小，新增元素为后端默认初始化（零字节模式）
    ///
    /// 收缩只移动大小，已分配容量保持不变；增长超过容量时按
    /// 倍增策略扩容。失败时缓冲区保持原状。
    ///
    /// # 参数
    ///
    /// * `new_size` - 目标元素个数
    pub fn resize(&mut self, new_size: usize) -> Result<()> {
        self.resize_fill(new_size, T::zeroed())
    }

    /// 调整缓冲区大小，新增元素初始化为 `value`
    ///
    /// # 参数
    ///
    /// * `new_size` - 目标元素个数
    /// * `value` - 新增元素的初始值
    pub fn resize_fill(&mut self, new_size: usize, value: T) -> Result<()> {
        self.ensure_capacity(new_size)?;
        if new_size > self.size {
            // 收缩再增长时旧槽位残留过期数据，增长区间总是重新初始化
            self.storage.fill(self.size..new_size, value);
        }
        self.size = new_size;
        Ok(())
    }

    /// 预留容量，保证 `capacity() >= min_capacity`
    ///
    /// 精确扩容到请求值，不做倍增。大小不受影响；容量已足够时
    /// 不做任何事。
    ///
    /// # 参数
    ///
    /// * `min_capacity` - 要求的最小容量（元素数）
    pub fn reserve(&mut self, min_capacity: usize) -> Result<()> {
        if min_capacity <= self.capacity {
            return Ok(());
        }
        self.check_max(min_capacity)?;
        self.reallocate(min_capacity)
    }

    /// 紧缩容量到当前大小
    ///
    /// 完成后 `capacity() == size()`。大小为 0 时释放全部存储，
    /// 数据指针回到空指针。
    pub fn fit(&mut self) -> Result<()> {
        if self.capacity == self.size {
            return Ok(());
        }
        self.reallocate(self.size)
    }

    /// 把缓冲区迁移到另一个设备
    ///
    /// 同一设备迁移是无操作；同家族设备之间迁移保留内容并转移
    /// 内存账目；跨家族迁移被拒绝，缓冲区保持原状。
    ///
    /// # 参数
    ///
    /// * `target` - 目标设备
    pub fn move_to(&mut self, target: &GpuDevice) -> Result<()> {
        if self.device.same_device(target) {
            return Ok(());
        }
        if !self.device.same_family(target) {
            return Err(ComputeError::IncompatibleDevice {
                from: self.device.api().name().to_string(),
                to: target.api().name().to_string(),
            }
            .into());
        }

        // 设备本地存储把容量记在账本上，迁移时先在目标设备记账，
        // 成功后才从源设备销账
        if !self.storage.host_visible() {
            let bytes = self.capacity_bytes();
            target.charge(bytes)?;
            self.device.release(bytes);
        }

        debug!(from = %self.device, to = %target, elements = self.size, "Buffer migrated");
        self.device = target.clone();
        Ok(())
    }

    /// 把设备内容拷贝到宿主向量
    ///
    /// 宿主向量由被调方调整到 `size()` 个元素后整体覆写。
    /// 传输同步完成，返回时内容已可读。
    pub fn transfer_to_host(&self, out: &mut Vec<T>) -> Result<()> {
        out.resize(self.size, T::zeroed());
        if self.size > 0 {
            self.storage.read(0, &mut out[..]);
        }
        Ok(())
    }

    /// 把宿主向量的内容拷贝到设备
    ///
    /// 宿主向量由被调方调整到 `size()` 个元素（不足补零）后整体
    /// 写入设备。传输同步完成。
    pub fn transfer_to_device(&mut self, input: &mut Vec<T>) -> Result<()> {
        input.resize(self.size, T::zeroed());
        if self.size > 0 {
            self.storage.write(0, &input[..]);
        }
        Ok(())
    }

    /// 设备数据的原始指针，容量为 0 时为空指针
    ///
    /// 指针在下一次重分配之前有效。对设备本地存储，指针指向
    /// 设备地址空间，宿主不可解引用。
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// 设备数据的可变原始指针，容量为 0 时为空指针
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.storage.as_mut_ptr()
    }

    /// 宿主可见缓冲区返回前 `size()` 个元素的切片视图
    ///
    /// 设备本地缓冲区返回 `None`，内容只能经由传输接口访问。
    pub fn as_host_slice(&self) -> Option<&[T]> {
        self.storage.host_slice(self.size)
    }

    /// 宿主可见缓冲区返回前 `size()` 个元素的可变切片视图
    pub fn as_host_slice_mut(&mut self) -> Option<&mut [T]> {
        self.storage.host_slice_mut(self.size)
    }

    /// 确保容量至少为 `needed`，增长按倍增摊销
    fn ensure_capacity(&mut self, needed: usize) -> Result<()> {
        if needed <= self.capacity {
            return Ok(());
        }
        self.check_max(needed)?;

        let max = self.max_size();
        let target = needed.max(self.capacity.saturating_mul(2)).min(max);
        match self.reallocate(target) {
            Ok(()) => Ok(()),
            Err(err) => {
                if target == needed {
                    return Err(err);
                }
                // 倍增目标放不下时回退到精确容量再试一次
                self.reallocate(needed)
            }
        }
    }

    /// 所有容量变化汇入的唯一通道
    ///
    /// 存储层失败时不触碰元数据，缓冲区保持原状。
    fn reallocate(&mut self, new_capacity: usize) -> Result<()> {
        let live = self.size.min(new_capacity);
        self.storage.reallocate(live, new_capacity, &self.device)?;
        trace!(
            old_capacity = self.capacity,
            new_capacity,
            "Buffer storage reallocated"
        );
        self.capacity = new_capacity;
        Ok(())
    }

    /// 请求超过此设备的分配上限时直接拒绝
    fn check_max(&self, requested: usize) -> Result<()> {
        let max = self.max_size();
        if requested > max {
            return Err(ComputeError::OutOfMemory {
                requested: self.bytes_for(requested),
                available: self.bytes_for(max),
            }
            .into());
        }
        Ok(())
    }

    /// 元素数对应的字节数
    fn bytes_for(&self, elements: usize) -> u64 {
        (elements as u64).saturating_mul(std::mem::size_of::<T>() as u64)
    }

    /// 当前容量对应的字节数
    fn capacity_bytes(&self) -> u64 {
        self.bytes_for(self.capacity)
    }
}

impl<T: Pod> fmt::Debug for DeviceBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("api", &self.device.api())
            .field("device_id", &self.device.device_id())
            .field("size", &self.size)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T: Pod> Drop for DeviceBuffer<T> {
    fn drop(&mut self) {
        // 设备本地存储的容量记在设备账本上，丢弃时销账
        if !self.storage.host_visible() && self.capacity > 0 {
            self.device.release(self.capacity_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::SoulError;

    fn cuda_device(budget: u64) -> GpuDevice {
        GpuDevice::with_memory_budget(GpuApi::Cuda, 0, budget)
    }

    fn read_all<T: Pod>(buffer: &DeviceBuffer<T>) -> Vec<T> {
        let mut out = Vec::new();
        buffer.transfer_to_host(&mut out).unwrap();
        out
    }

    #[test]
    fn test_new_buffer_is_empty() {
        let device = GpuDevice::new(GpuApi::Cuda, 0);
        let buffer = DeviceBuffer::<f32>::new(&device);

        assert!(buffer.is_empty());
        assert_eq!(buffer.size(), 0);
        assert_eq!(buffer.capacity(), 0);
        assert!(buffer.as_ptr().is_null());
        assert_eq!(buffer.api(), GpuApi::Cuda);
        assert_eq!(device.allocated_memory(), 0);
    }

    #[test]
    fn test_resize_initializes_elements() {
        let device = GpuDevice::new(GpuApi::Cuda, 0);
        let mut buffer = DeviceBuffer::<f32>::new(&device);

        buffer.resize(4).unwrap();
        assert_eq!(buffer.size(), 4);
        assert!(buffer.capacity() >= 4);
        assert_eq!(read_all(&buffer), vec![0.0; 4]);

        let mut filled = DeviceBuffer::<f32>::new(&device);
        filled.resize_fill(3, 2.5).unwrap();
        assert_eq!(read_all(&filled), vec![2.5; 3]);
    }

    #[test]
    fn test_reserve_resize_fit_scenario() {
        let device = GpuDevice::new(GpuApi::Cuda, 0);
        let mut buffer = DeviceBuffer::<f32>::new(&device);

        // 空缓冲区上的 resize(0) 不分配任何内存
        buffer.resize(0).unwrap();
        assert_eq!(buffer.capacity(), 0);
        assert!(buffer.as_ptr().is_null());

        // 预留只改变容量
        buffer.reserve(1000).unwrap();
        assert!(buffer.capacity() >= 1000);
        assert_eq!(buffer.size(), 0);

        // 预留范围内的增长不触发重分配
        let capacity_after_reserve = buffer.capacity();
        buffer.resize(500).unwrap();
        assert_eq!(buffer.size(), 500);
        assert_eq!(buffer.capacity(), capacity_after_reserve);

        // 紧缩把容量拉回到大小
        buffer.fit().unwrap();
        assert_eq!(buffer.capacity(), 500);
        assert_eq!(buffer.size(), 500);
    }

    #[test]
    fn test_shrink_keeps_capacity() {
        let device = GpuDevice::new(GpuApi::Cuda, 0);
        let mut buffer = DeviceBuffer::<u32>::new(&device);

        buffer.resize(100).unwrap();
        let capacity = buffer.capacity();

        buffer.resize(10).unwrap();
        assert_eq!(buffer.size(), 10);
        assert_eq!(buffer.capacity(), capacity);
    }

    #[test]
    fn test_grow_preserves_contents() {
        let device = GpuDevice::new(GpuApi::Cuda, 0);
        let mut buffer = DeviceBuffer::<f32>::new(&device);

        buffer.resize_fill(4, 1.0).unwrap();
        buffer.resize(8).unwrap();

        assert_eq!(read_all(&buffer), vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_shrink_then_grow_reinitializes() {
        let device = GpuDevice::new(GpuApi::Cuda, 0);
        let mut buffer = DeviceBuffer::<f32>::new(&device);

        buffer.resize_fill(4, 5.0).unwrap();
        buffer.resize(2).unwrap();
        buffer.resize(4).unwrap();

        // 被收缩掉的槽位在重新增长时不保留过期值
        assert_eq!(read_all(&buffer), vec![5.0, 5.0, 0.0, 0.0]);
    }

    #[test]
    fn test_fit_empty_releases_storage() {
        let device = cuda_device(4096);
        let mut buffer = DeviceBuffer::<u64>::new(&device);

        buffer.resize(8).unwrap();
        assert!(device.allocated_memory() > 0);

        buffer.resize(0).unwrap();
        buffer.fit().unwrap();
        assert_eq!(buffer.capacity(), 0);
        assert!(buffer.as_ptr().is_null());
        assert_eq!(device.allocated_memory(), 0);
    }

    #[test]
    fn test_drop_releases_accounting() {
        let device = cuda_device(4096);
        {
            let mut buffer = DeviceBuffer::<u64>::new(&device);
            buffer.resize(16).unwrap();
            assert_eq!(device.allocated_memory(), 128);
        }
        assert_eq!(device.allocated_memory(), 0);
    }

    #[test]
    fn test_transfer_roundtrip() {
        let device = GpuDevice::new(GpuApi::Cuda, 0);
        let mut buffer = DeviceBuffer::<u32>::new(&device);
        buffer.resize(3).unwrap();

        let mut upload = vec![1, 2, 3];
        buffer.transfer_to_device(&mut upload).unwrap();
        device.synchronize();

        let mut download = vec![0u32; 10];
        buffer.transfer_to_host(&mut download).unwrap();
        assert_eq!(download, vec![1, 2, 3]);
    }

    #[test]
    fn test_transfers_resize_host_vectors() {
        let device = GpuDevice::new(GpuApi::Cuda, 0);
        let mut buffer = DeviceBuffer::<u32>::new(&device);
        buffer.resize(4).unwrap();

        // 上行：过短的宿主向量被补零到缓冲区大小
        let mut input = vec![7, 8];
        buffer.transfer_to_device(&mut input).unwrap();
        assert_eq!(input.len(), 4);
        assert_eq!(read_all(&buffer), vec![7, 8, 0, 0]);

        // 下行：过长的宿主向量被截断到缓冲区大小
        let mut output = vec![9u32; 16];
        buffer.transfer_to_host(&mut output).unwrap();
        assert_eq!(output.len(), 4);
    }

    #[test]
    fn test_move_to_same_device_is_noop() {
        let device = cuda_device(4096);
        let alias = device.clone();
        let mut buffer = DeviceBuffer::<u32>::new(&device);
        buffer.resize(8).unwrap();
        let allocated = device.allocated_memory();

        buffer.move_to(&alias).unwrap();
        assert_eq!(device.allocated_memory(), allocated);
        assert!(buffer.device().same_device(&device));
    }

    #[test]
    fn test_move_to_same_family_transfers_accounting() {
        let source = cuda_device(4096);
        let target = GpuDevice::with_memory_budget(GpuApi::Cuda, 1, 4096);
        let mut buffer = DeviceBuffer::<u32>::new(&source);
        buffer.resize_fill(8, 3).unwrap();
        let bytes = source.allocated_memory();

        buffer.move_to(&target).unwrap();
        assert_eq!(source.allocated_memory(), 0);
        assert_eq!(target.allocated_memory(), bytes);
        assert!(buffer.device().same_device(&target));
        assert_eq!(read_all(&buffer), vec![3; 8]);
    }

    #[test]
    fn test_move_to_incompatible_family_fails() {
        let cuda = GpuDevice::new(GpuApi::Cuda, 0);
        let opengl = GpuDevice::new(GpuApi::OpenGl, 0);
        let mut buffer = DeviceBuffer::<u32>::new(&cuda);
        buffer.resize(4).unwrap();

        let err = buffer.move_to(&opengl).unwrap_err();
        assert!(matches!(
            err,
            SoulError::Compute(ComputeError::IncompatibleDevice { .. })
        ));

        // 拒绝迁移后缓冲区保持原状
        assert!(buffer.device().same_device(&cuda));
        assert_eq!(buffer.size(), 4);
    }

    #[test]
    fn test_move_to_exhausted_target_fails() {
        let source = cuda_device(4096);
        let target = GpuDevice::with_memory_budget(GpuApi::Cuda, 1, 8);
        let mut buffer = DeviceBuffer::<u32>::new(&source);
        buffer.resize(8).unwrap();
        let bytes = source.allocated_memory();

        let err = buffer.move_to(&target).unwrap_err();
        assert!(matches!(
            err,
            SoulError::Compute(ComputeError::OutOfMemory { .. })
        ));

        // 源设备的账目不受影响
        assert_eq!(source.allocated_memory(), bytes);
        assert_eq!(target.allocated_memory(), 0);
        assert!(buffer.device().same_device(&source));
    }

    #[test]
    fn test_out_of_memory_is_transactional() {
        let device = cuda_device(64);
        let mut buffer = DeviceBuffer::<u32>::new(&device);
        buffer.resize_fill(8, 4).unwrap();

        let err = buffer.resize(1024).unwrap_err();
        assert!(matches!(
            err,
            SoulError::Compute(ComputeError::OutOfMemory { .. })
        ));

        // 失败的增长不改变内容与元数据
        assert_eq!(buffer.size(), 8);
        assert_eq!(read_all(&buffer), vec![4; 8]);

        // 后续操作照常进行
        buffer.resize(4).unwrap();
        assert_eq!(buffer.size(), 4);
    }

    #[test]
    fn test_growth_falls_back_to_exact_capacity() {
        // 预算 128 字节 = 32 个 u32
        let device = cuda_device(128);
        let mut buffer = DeviceBuffer::<u32>::new(&device);

        buffer.resize(12).unwrap();
        assert_eq!(buffer.capacity(), 12);

        // 倍增目标 24 需要旧新并存 48 + 96 字节，超出预算；
        // 精确容量 18 需要 48 + 72 字节，放得下
        buffer.resize(18).unwrap();
        assert_eq!(buffer.size(), 18);
        assert_eq!(buffer.capacity(), 18);
    }

    #[test]
    fn test_reserve_beyond_max_size_fails() {
        let device = cuda_device(1024);
        let mut buffer = DeviceBuffer::<u32>::new(&device);
        assert_eq!(buffer.max_size(), 256);

        let err = buffer.reserve(257).unwrap_err();
        assert!(matches!(
            err,
            SoulError::Compute(ComputeError::OutOfMemory { .. })
        ));
        assert_eq!(buffer.capacity(), 0);
    }

    #[test]
    fn test_host_slice_visibility() {
        let gl = GpuDevice::new(GpuApi::OpenGl, 0);
        let mut visible = DeviceBuffer::<u32>::new(&gl);
        visible.resize_fill(4, 9).unwrap();
        assert_eq!(visible.as_host_slice(), Some(&[9, 9, 9, 9][..]));

        if let Some(slice) = visible.as_host_slice_mut() {
            slice[0] = 1;
        }
        assert_eq!(read_all(&visible)[0], 1);

        let cuda = GpuDevice::new(GpuApi::Cuda, 0);
        let mut hidden = DeviceBuffer::<u32>::new(&cuda);
        hidden.resize(4).unwrap();
        assert_eq!(hidden.as_host_slice(), None);
    }

    #[test]
    fn test_pod_struct_elements() {
        #[repr(C)]
        #[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
        struct Particle {
            position: [f32; 2],
            velocity: [f32; 2],
        }

        let device = GpuDevice::new(GpuApi::Cuda, 0);
        let mut buffer = DeviceBuffer::<Particle>::new(&device);

        let seed = Particle {
            position: [1.0, 2.0],
            velocity: [0.5, -0.5],
        };
        buffer.resize_fill(3, seed).unwrap();

        let contents = read_all(&buffer);
        assert_eq!(contents, vec![seed; 3]);
    }

    #[test]
    fn test_zero_sized_elements_have_no_limit() {
        let device = cuda_device(16);
        let mut buffer = DeviceBuffer::<()>::new(&device);

        assert_eq!(buffer.max_size(), usize::MAX);
        buffer.resize(1_000_000).unwrap();
        assert_eq!(buffer.size(), 1_000_000);
        assert_eq!(device.allocated_memory(), 0);
    }

    /// 只重写 `reallocate` 的存储策略也能获得完整的缓冲区行为
    struct CountingStorage {
        inner: crate::compute::storage::HostVisibleStorage<u32>,
        reallocations: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    }

    impl BufferStorage<u32> for CountingStorage {
        fn api(&self) -> GpuApi {
            self.inner.api()
        }

        fn host_visible(&self) -> bool {
            self.inner.host_visible()
        }

        fn max_elements(&self, device: &GpuDevice) -> usize {
            self.inner.max_elements(device)
        }

        fn reallocate(&mut self, live: usize, new_capacity: usize, device: &GpuDevice)
            -> Result<()>
        {
            self.reallocations
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            self.inner.reallocate(live, new_capacity, device)
        }

        fn write(&mut self, offset: usize, data: &[u32]) {
            self.inner.write(offset, data);
        }

        fn read(&self, offset: usize, out: &mut [u32]) {
            self.inner.read(offset, out);
        }

        fn fill(&mut self, range: std::ops::Range<usize>, value: u32) {
            self.inner.fill(range, value);
        }

        fn as_ptr(&self) -> *const u32 {
            self.inner.as_ptr()
        }

        fn as_mut_ptr(&mut self) -> *mut u32 {
            self.inner.as_mut_ptr()
        }

        fn host_slice(&self, len: usize) -> Option<&[u32]> {
            self.inner.host_slice(len)
        }

        fn host_slice_mut(&mut self, len: usize) -> Option<&mut [u32]> {
            self.inner.host_slice_mut(len)
        }
    }

    #[test]
    fn test_custom_storage_sees_every_reallocation() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let counter = Arc::new(AtomicUsize::new(0));
        let device = GpuDevice::new(GpuApi::OpenGl, 0);
        let mut buffer = DeviceBuffer::with_storage(
            &device,
            Box::new(CountingStorage {
                inner: crate::compute::storage::HostVisibleStorage::new(),
                reallocations: counter.clone(),
            }),
        );

        buffer.resize(4).unwrap();   // 重分配 1
        buffer.resize(2).unwrap();   // 收缩，不重分配
        buffer.reserve(64).unwrap(); // 重分配 2
        buffer.resize(32).unwrap();  // 预留范围内，不重分配
        buffer.fit().unwrap();       // 重分配 3

        assert_eq!(counter.load(Ordering::Relaxed), 3);
        assert_eq!(buffer.size(), 32);
        assert_eq!(buffer.capacity(), 32);
    }
}
