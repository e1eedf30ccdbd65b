//! 事实值匹配器

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{CoreError, Result};

/// 编译后的正则表达式，按源文本比较相等
#[derive(Debug, Clone)]
pub struct FactPattern(Regex);

impl FactPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| CoreError::invalid_pattern(pattern, e.to_string()))
    }

    /// 以字面量构造，元字符全部转义
    pub fn literal(text: &str) -> Result<Self> {
        Self::new(&regex::escape(text))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// 部分匹配：值中任意位置出现即成功
    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

impl PartialEq for FactPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for FactPattern {}

impl fmt::Display for FactPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.as_str())
    }
}

impl Serialize for FactPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FactPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        FactPattern::new(&raw).map_err(serde::de::Error::custom)
    }
}

/// 单条期望使用的匹配方式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Matcher {
    /// 逐字节相等
    Exact(String),
    /// 正则部分匹配
    Pattern(FactPattern),
    /// 去除首尾空白后非空
    NonEmpty,
}

impl Matcher {
    pub fn exact(value: impl Into<String>) -> Self {
        Matcher::Exact(value.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self> {
        FactPattern::new(pattern).map(Matcher::Pattern)
    }

    pub fn evaluate(&self, actual: &str) -> bool {
        match self {
            Matcher::Exact(expected) => expected == actual,
            Matcher::Pattern(pattern) => pattern.is_match(actual),
            Matcher::NonEmpty => !actual.trim().is_empty(),
        }
    }

    /// 报告中使用的期望值文本
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Exact(expected) => f.write_str(expected),
            Matcher::Pattern(pattern) => write!(f, "{}", pattern),
            Matcher::NonEmpty => f.write_str("<non-empty>"),
        }
    }
}

/// 便捷函数：对实际值执行匹配
pub fn evaluate(matcher: &Matcher, actual: &str) -> bool {
    matcher.evaluate(actual)
}
