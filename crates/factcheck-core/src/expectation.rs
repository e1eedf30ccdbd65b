//! 期望表：按固定分区顺序排列的 事实路径 → 匹配器

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::constants::FACT_NETWORKING_PRIMARY;
use crate::error::{CoreError, Result};
use crate::matcher::Matcher;
use crate::platform::PlatformParams;

/// 报告分区，仅用于展示，不影响评估
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Os,
    Processors,
    Networking,
    Identity,
    Kernel,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Os,
        Section::Processors,
        Section::Networking,
        Section::Identity,
        Section::Kernel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Os => "os",
            Self::Processors => "processors",
            Self::Networking => "networking",
            Self::Identity => "identity",
            Self::Kernel => "kernel",
        }
    }

    /// 分区对应的步骤说明
    pub fn label(&self) -> &'static str {
        match self {
            Self::Os => "Ensure the OS fact resolves as expected",
            Self::Processors => "Ensure the Processors fact resolves with reasonable values",
            Self::Networking => {
                "Ensure the Networking fact resolves with reasonable values for at least one interface"
            }
            Self::Identity => "Ensure the identity fact resolves as expected",
            Self::Kernel => "Ensure the kernel fact resolves as expected",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathPart {
    Text(String),
    Fact(String),
}

/// 事实路径模板
///
/// `{...}` 包裹的片段是另一个事实的路径，评估时替换为该事实已解析的值，
/// 例如 `networking.interfaces.{networking.primary}.bindings.0.address`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FactPath {
    parts: Vec<PathPart>,
}

impl FactPath {
    pub fn literal(path: impl Into<String>) -> Self {
        Self {
            parts: vec![PathPart::Text(path.into())],
        }
    }

    pub fn parse(template: &str) -> Result<Self> {
        let invalid = |why: &str| CoreError::config_error(format!("Invalid fact path '{}': {}", template, why));

        let mut parts = Vec::new();
        let mut rest = template;
        while let Some(open) = rest.find(['{', '}']) {
            if rest.as_bytes()[open] == b'}' {
                return Err(invalid("unmatched '}'"));
            }
            if open > 0 {
                parts.push(PathPart::Text(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| invalid("unclosed '{'"))?;
            let fact = after[..close].trim();
            if fact.is_empty() || fact.contains('{') {
                return Err(invalid("empty or nested placeholder"));
            }
            parts.push(PathPart::Fact(fact.to_string()));
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            parts.push(PathPart::Text(rest.to_string()));
        }
        if parts.is_empty() {
            return Err(invalid("empty path"));
        }
        Ok(Self { parts })
    }

    /// 模板引用的前置事实
    pub fn prerequisites(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|p| match p {
            PathPart::Fact(f) => Some(f.as_str()),
            PathPart::Text(_) => None,
        })
    }

    pub fn is_templated(&self) -> bool {
        self.prerequisites().next().is_some()
    }

    /// 用已解析的前置事实渲染出可查询的路径
    pub fn render(&self, resolved: &HashMap<String, String>) -> Result<String> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                PathPart::Text(text) => out.push_str(text),
                PathPart::Fact(fact) => match resolved.get(fact) {
                    Some(value) if !value.trim().is_empty() => out.push_str(value.trim()),
                    _ => {
                        return Err(CoreError::unresolved_dependency(self.to_string(), fact.clone()))
                    }
                },
            }
        }
        Ok(out)
    }
}

impl fmt::Display for FactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                PathPart::Text(text) => f.write_str(text)?,
                PathPart::Fact(fact) => write!(f, "{{{}}}", fact)?,
            }
        }
        Ok(())
    }
}

impl TryFrom<String> for FactPath {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<FactPath> for String {
    fn from(path: FactPath) -> Self {
        path.to_string()
    }
}

/// 单条期望
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expectation {
    pub section: Section,
    pub path: FactPath,
    pub matcher: Matcher,
}

impl Expectation {
    pub fn new(section: Section, path: &str, matcher: Matcher) -> Self {
        Self {
            section,
            path: FactPath::literal(path),
            matcher,
        }
    }

    /// 路径依赖前置事实的期望
    pub fn dependent(section: Section, template: &str, matcher: Matcher) -> Result<Self> {
        Ok(Self {
            section,
            path: FactPath::parse(template)?,
            matcher,
        })
    }

    /// 必须先解析成功的事实；由路径中的占位符决定
    pub fn prerequisites(&self) -> impl Iterator<Item = &str> {
        self.path.prerequisites()
    }

    pub fn is_dependent(&self) -> bool {
        self.path.is_templated()
    }
}

/// 有序的期望表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectationTable {
    expectations: Vec<Expectation>,
}

impl ExpectationTable {
    pub fn new(expectations: Vec<Expectation>) -> Self {
        Self { expectations }
    }

    /// 根据平台参数构建五个固定分区的期望
    pub fn build(params: &PlatformParams) -> Result<Self> {
        let pattern = Matcher::pattern;
        let dotted_quad = r"\d+\.\d+\.\d+\.\d+";

        let mut table = Vec::new();

        // OS
        let os = Section::Os;
        table.push(Expectation::new(os, "os.architecture", Matcher::exact(params.architecture.as_str())));
        table.push(Expectation::new(os, "os.family", Matcher::exact("Solaris")));
        table.push(Expectation::new(os, "os.hardware", Matcher::exact(params.architecture.as_str())));
        table.push(Expectation::new(os, "os.name", Matcher::exact("Solaris")));
        table.push(Expectation::new(os, "os.release.full", pattern(&params.os_release_pattern)?));
        table.push(Expectation::new(os, "os.release.major", Matcher::exact(params.os_version.as_str())));
        table.push(Expectation::new(os, "os.release.minor", pattern(r"\d+")?));

        // Processors
        let cpu = Section::Processors;
        table.push(Expectation::new(cpu, "processors.count", pattern("[1-9]")?));
        table.push(Expectation::new(cpu, "processors.physicalcount", pattern("[1-9]")?));
        table.push(Expectation::new(cpu, "processors.isa", pattern(&params.processor_isa_pattern)?));
        table.push(Expectation::new(
            cpu,
            "processors.models",
            pattern(&params.processor_model_pattern)?,
        ));

        // Networking
        let net = Section::Networking;
        table.push(Expectation::new(net, "networking.ip", pattern(&params.ip_pattern)?));
        table.push(Expectation::new(net, "networking.mac", pattern("[a-f0-9]{2}:")?));
        table.push(Expectation::new(net, "networking.mtu", pattern(r"\d+")?));
        table.push(Expectation::new(net, "networking.netmask", pattern(dotted_quad)?));
        if params.uses_dhcp {
            table.push(Expectation::new(net, "networking.dhcp", pattern(&params.ip_pattern)?));
        }
        table.push(Expectation::new(net, FACT_NETWORKING_PRIMARY, Matcher::NonEmpty));
        for binding in ["address", "netmask", "network"] {
            let template = format!(
                "networking.interfaces.{{{}}}.bindings.0.{}",
                FACT_NETWORKING_PRIMARY, binding
            );
            table.push(Expectation::dependent(net, &template, pattern(dotted_quad)?)?);
        }

        // Identity
        let id = Section::Identity;
        table.push(Expectation::new(id, "identity.gid", Matcher::exact("0")));
        table.push(Expectation::new(id, "identity.group", Matcher::exact("root")));
        table.push(Expectation::new(id, "identity.uid", Matcher::exact("0")));
        table.push(Expectation::new(id, "identity.user", Matcher::exact("root")));

        // Kernel
        let kernel = Section::Kernel;
        table.push(Expectation::new(kernel, "kernel", Matcher::exact("SunOS")));
        table.push(Expectation::new(
            kernel,
            "kernelrelease",
            Matcher::exact(format!("5.{}", params.os_version)),
        ));
        table.push(Expectation::new(kernel, "kernelversion", pattern(&params.kernel_pattern)?));
        table.push(Expectation::new(
            kernel,
            "kernelmajversion",
            pattern(&params.kernel_major_pattern)?,
        ));

        Ok(Self::new(table))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expectation> {
        self.expectations.iter()
    }

    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }

    pub fn section(&self, section: Section) -> impl Iterator<Item = &Expectation> {
        self.expectations.iter().filter(move |e| e.section == section)
    }

    /// 按路径模板查找（模板原文，如 `networking.interfaces.{networking.primary}.bindings.0.address`）
    pub fn find(&self, path: &str) -> Option<&Expectation> {
        self.expectations.iter().find(|e| e.path.to_string() == path)
    }
}

impl<'a> IntoIterator for &'a ExpectationTable {
    type Item = &'a Expectation;
    type IntoIter = std::slice::Iter<'a, Expectation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
