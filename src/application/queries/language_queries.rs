//! Language Queries - 语言查询

/// 列出启用的语言
#[derive(Debug, Clone)]
pub struct ListLanguages;
