//! 着色器句柄模块

/// 着色器阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// 顶点着色器
    Vertex,
    /// 片段着色器
    Fragment,
    /// 计算着色器
    Compute,
}

impl ShaderKind {
    /// 阶段名称
    pub fn name(&self) -> &'static str {
        match self {
            ShaderKind::Vertex => "vertex",
            ShaderKind::Fragment => "fragment",
            ShaderKind::Compute => "compute",
        }
    }
}

/// 已编译着色器的句柄
///
/// 由后端的 `create_shader` 签发。句柄在签发它的后端之外没有
/// 意义，跨后端使用会被拒绝。
#[derive(Debug, Clone)]
pub struct Shader {
    /// 后端签发的编号
    id: u64,
    /// 着色器阶段
    kind: ShaderKind,
    /// 源码（保留用于诊断）
    source: String,
}

impl Shader {
    pub(crate) fn new(id: u64, kind: ShaderKind, source: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            source: source.into(),
        }
    }

    /// 后端签发的编号
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 着色器阶段
    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    /// 源码
    pub fn source(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_kind_names() {
        assert_eq!(ShaderKind::Vertex.name(), "vertex");
        assert_eq!(ShaderKind::Fragment.name(), "fragment");
        assert_eq!(ShaderKind::Compute.name(), "compute");
    }

    #[test]
    fn test_shader_handle_accessors() {
        let shader = Shader::new(7, ShaderKind::Fragment, "void main() {}");
        assert_eq!(shader.id(), 7);
        assert_eq!(shader.kind(), ShaderKind::Fragment);
        assert_eq!(shader.source(), "void main() {}");
    }
}
