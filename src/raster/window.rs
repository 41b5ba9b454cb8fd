//! 窗口句柄模块
//!
//! 窗口由引擎侧拥有：后端只在句柄上盖下自己的创建提示和构建
//! 标记，不持有窗口本身。这样同一个窗口记录可以先后经手不同
//! 后端的生命周期操作，句柄的归属始终清晰。

use std::sync::atomic::{AtomicU64, Ordering};

/// 窗口 ID 发号器
static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

/// 窗口请求的客户端 API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientApi {
    /// 创建指定版本的 OpenGL 上下文
    OpenGl { major: u32, minor: u32 },
    /// 不创建客户端上下文（后端自行管理渲染表面）
    None,
}

/// 窗口创建提示
///
/// 由后端在 `set_window_hints` 阶段施加，决定窗口构建时的
/// API 相关行为。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHints {
    /// 客户端 API 请求
    pub client_api: ClientApi,
    /// 双缓冲
    pub double_buffer: bool,
    /// 交换间隔（0 关闭垂直同步，1 开启）
    pub swap_interval: u32,
}

/// 引擎侧的窗口记录
///
/// 持有窗口的逻辑属性（尺寸、标题）与后端盖下的构建状态。
#[derive(Debug)]
pub struct WindowHandle {
    /// 进程内唯一的窗口编号
    id: u64,
    /// 窗口宽度（像素）
    width: u32,
    /// 窗口高度（像素）
    height: u32,
    /// 窗口标题
    title: String,
    /// 后端施加的创建提示
    hints: Option<WindowHints>,
    /// 窗口的 API 资源是否已构建
    built: bool,
}

impl WindowHandle {
    /// 创建窗口记录
    ///
    /// 只登记逻辑属性，不触碰任何图形 API。
    pub fn new(width: u32, height: u32, title: impl Into<String>) -> Self {
        Self {
            id: NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            title: title.into(),
            hints: None,
            built: false,
        }
    }

    /// 窗口编号
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 窗口宽度（像素）
    pub fn width(&self) -> u32 {
        self.width
    }

    /// 窗口高度（像素）
    pub fn height(&self) -> u32 {
        self.height
    }

    /// 窗口标题
    pub fn title(&self) -> &str {
        &self.title
    }

    /// 后端施加的创建提示
    pub fn hints(&self) -> Option<WindowHints> {
        self.hints
    }

    /// 窗口的 API 资源是否已构建
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// 盖下创建提示（由后端调用）
    pub(crate) fn set_hints(&mut self, hints: WindowHints) {
        self.hints = Some(hints);
    }

    /// 标记 API 资源已构建（由后端调用）
    pub(crate) fn mark_built(&mut self) {
        self.built = true;
    }

    /// 更新窗口尺寸（由后端在 resize 时调用）
    pub(crate) fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}
