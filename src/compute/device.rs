//! GPU 设备抽象模块
//!
//! 提供对单个计算设备的描述：设备属于哪个 API 家族、设备编号，
//! 以及该设备的内存预算。缓冲区通过持有设备描述符来决定自己的
//! 存储策略和分配上限。
//!
//! # 设计原则
//!
//! - **设备即句柄**：`GpuDevice` 可廉价克隆，克隆共享同一份内存账本
//! - **确定性的资源耗尽**：分配走统一的预算记账，耗尽行为可测试
//! - **无全局状态**：设备由调用方构造并显式传递
//!
//! # 使用场景
//!
//! 1. **缓冲区归属**：每个 `DeviceBuffer` 绑定一个设备
//! 2. **迁移判定**：同家族设备之间迁移零拷贝，跨家族拒绝
//! 3. **同步屏障**：`synchronize` 等待设备上所有未完成的工作

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

use crate::core::error::ComputeError;

/// 默认的设备内存预算（4 GiB）
pub const DEFAULT_MEMORY_BUDGET: u64 = 4 * 1024 * 1024 * 1024;

/// GPU 计算 API 家族
///
/// 决定缓冲区的存储策略：OpenGL 家族的缓冲区驻留在宿主可见的
/// 固定内存中，CUDA 与 Vulkan 家族驻留在设备本地内存中。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuApi {
    /// OpenGL 家族（宿主可见存储）
    OpenGl,
    /// CUDA 家族（设备本地存储）
    Cuda,
    /// Vulkan 家族（设备本地存储）
    Vulkan,
}

impl GpuApi {
    /// 获取 API 名称
    pub fn name(&self) -> &'static str {
        match self {
            GpuApi::OpenGl => "OpenGL",
            GpuApi::Cuda => "CUDA",
            GpuApi::Vulkan => "Vulkan",
        }
    }
}

impl fmt::Display for GpuApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 设备内存账本
///
/// 所有属于同一设备的缓冲区共享这一份账本。
/// 记账使用原子操作，多线程分配无需互斥锁。
#[derive(Debug)]
struct MemoryBudget {
    /// 预算总量（字节）
    total: u64,
    /// 已分配量（字节）
    allocated: AtomicU64,
}

/// GPU 设备描述符
///
/// 克隆共享同一份内存账本：两个克隆指代同一个物理设备。
/// 分别构造的两个描述符即使参数相同也是不同的设备。
#[derive(Debug, Clone)]
pub struct GpuDevice {
    /// API 家族
    api: GpuApi,
    /// 设备编号（同一 API 下的序号）
    device_id: u32,
    /// 内存账本
    budget: Arc<MemoryBudget>,
}

impl GpuDevice {
    /// 创建设备描述符，使用默认内存预算
    ///
    /// # 参数
    ///
    /// * `api` - 设备所属的 API 家族
    /// * `device_id` - 设备编号
    pub fn new(api: GpuApi, device_id: u32) -> Self {
        Self::with_memory_budget(api, device_id, DEFAULT_MEMORY_BUDGET)
    }

    /// 创建设备描述符，指定内存预算
    ///
    /// 小预算的设备在测试中用于确定性地触发内存耗尽。
    ///
    /// # 参数
    ///
    /// * `api` - 设备所属的 API 家族
    /// * `device_id` - 设备编号
    /// * `total_bytes` - 内存预算总量（字节）
    pub fn with_memory_budget(api: GpuApi, device_id: u32, total_bytes: u64) -> Self {
        Self {
            api,
            device_id,
            budget: Arc::new(MemoryBudget {
                total: total_bytes,
                allocated: AtomicU64::new(0),
            }),
        }
    }

    /// 获取设备的 API 家族
    pub fn api(&self) -> GpuApi {
        self.api
    }

    /// 获取设备编号
    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    /// 内存预算总量（字节）
    pub fn total_memory(&self) -> u64 {
        self.budget.total
    }

    /// 已分配的内存量（字节）
    pub fn allocated_memory(&self) -> u64 {
        self.budget.allocated.load(Ordering::Acquire)
    }

    /// 当前剩余的内存量（字节）
    pub fn available_memory(&self) -> u64 {
        self.budget.total.saturating_sub(self.allocated_memory())
    }

    /// 判断两个描述符是否指代同一个设备
    ///
    /// 以账本身份为准：克隆指代同一设备，分别构造的不是。
    pub fn same_device(&self, other: &GpuDevice) -> bool {
        Arc::ptr_eq(&self.budget, &other.budget)
    }

    /// 判断两个设备是否属于同一 API 家族
    ///
    /// 同家族设备之间的缓冲区迁移是合法的。
    pub fn same_family(&self, other: &GpuDevice) -> bool {
        self.api == other.api
    }

    /// 同步屏障：等待设备上所有未完成的工作
    ///
    /// 本引擎的传输与绘制提交都是同步完成的，因此屏障立即返回。
    /// 调用方仍应在读取传输结果之前调用它，作为排序点。
    pub fn synchronize(&self) {
        trace!(api = self.api.name(), device_id = self.device_id, "Device synchronize barrier");
    }

    /// 在账本上记入一笔分配
    ///
    /// 超出预算时整笔拒绝，账本保持不变。
    pub(crate) fn charge(&self, bytes: u64) -> std::result::Result<(), ComputeError> {
        let outcome = self
            .budget
            .allocated
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current
                    .checked_add(bytes)
                    .filter(|next| *next <= self.budget.total)
            });

        match outcome {
            Ok(_) => Ok(()),
            Err(current) => Err(ComputeError::OutOfMemory {
                requested: bytes,
                available: self.budget.total.saturating_sub(current),
            }),
        }
    }

    /// 从账本上销掉一笔分配
    pub(crate) fn release(&self, bytes: u64) {
        let _ = self
            .budget
            .allocated
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_sub(bytes))
            });
    }
}

impl fmt::Display for GpuDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} device {}", self.api, self.device_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_creation() {
        let device = GpuDevice::new(GpuApi::Cuda, 0);
        assert_eq!(device.api(), GpuApi::Cuda);
        assert_eq!(device.device_id(), 0);
        assert_eq!(device.total_memory(), DEFAULT_MEMORY_BUDGET);
        assert_eq!(device.allocated_memory(), 0);
        assert_eq!(device.available_memory(), DEFAULT_MEMORY_BUDGET);
    }

    #[test]
    fn test_memory_charge_and_release() {
        let device = GpuDevice::with_memory_budget(GpuApi::Cuda, 0, 1024);

        device.charge(512).unwrap();
        assert_eq!(device.allocated_memory(), 512);
        assert_eq!(device.available_memory(), 512);

        device.charge(512).unwrap();
        assert_eq!(device.available_memory(), 0);

        device.release(1024);
        assert_eq!(device.allocated_memory(), 0);
    }

    #[test]
    fn test_out_of_memory_reports_shortfall() {
        let device = GpuDevice::with_memory_budget(GpuApi::Cuda, 0, 256);
        device.charge(200).unwrap();

        let err = device.charge(100).unwrap_err();
        match err {
            ComputeError::OutOfMemory {
                requested,
                available,
            } => {
                assert_eq!(requested, 100);
                assert_eq!(available, 56);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // 失败的申请不改变账本
        assert_eq!(device.allocated_memory(), 200);
    }

    #[test]
    fn test_release_saturates_at_zero() {
        let device = GpuDevice::with_memory_budget(GpuApi::OpenGl, 0, 128);
        device.charge(64).unwrap();
        device.release(1000);
        assert_eq!(device.allocated_memory(), 0);
    }

    #[test]
    fn test_device_identity() {
        let device = GpuDevice::new(GpuApi::Cuda, 0);
        let alias = device.clone();
        let sibling = GpuDevice::new(GpuApi::Cuda, 0);
        let foreign = GpuDevice::new(GpuApi::OpenGl, 0);

        // 克隆共享账本，指代同一设备
        assert!(device.same_device(&alias));
        // 分别构造的描述符是不同设备，但属于同一家族
        assert!(!device.same_device(&sibling));
        assert!(device.same_family(&sibling));
        // 跨 API 家族
        assert!(!device.same_family(&foreign));
    }

    #[test]
    fn test_clone_shares_budget() {
        let device = GpuDevice::with_memory_budget(GpuApi::Vulkan, 1, 1024);
        let alias = device.clone();

        device.charge(600).unwrap();
        assert_eq!(alias.allocated_memory(), 600);
        assert_eq!(alias.available_memory(), 424);
    }

    #[test]
    fn test_api_names() {
        assert_eq!(GpuApi::OpenGl.name(), "OpenGL");
        assert_eq!(GpuApi::Cuda.name(), "CUDA");
        assert_eq!(GpuApi::Vulkan.name(), "Vulkan");
        assert_eq!(format!("{}", GpuDevice::new(GpuApi::Cuda, 2)), "CUDA device 2");
    }
}
