//! GPU 计算模块
//!
//! 提供与渲染解耦的通用 GPU 计算原语：设备描述、内存预算记账、
//! 以及类型化的设备端缓冲区。计算缓冲区可以在同家族设备之间
//! 迁移，并经由显式传输与宿主内存交换数据。
//!
//! # 模块组织
//!
//! - `device`：GPU 设备描述符与内存账本
//! - `storage`：缓冲区存储策略（宿主可见 / 设备本地）
//! - `buffer`：类型化的设备端缓冲区 `DeviceBuffer<T>`

pub mod buffer;
pub mod device;
pub mod storage;

// 重新导出常用类型，方便使用
pub use buffer::DeviceBuffer;
pub use device::{GpuApi, GpuDevice, DEFAULT_MEMORY_BUDGET};
pub use storage::{BufferStorage, DeviceLocalStorage, HostVisibleStorage};
