//! 平台分类器 - 从平台标识推导验证参数

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::DEFAULT_LAB_SUBNET_PATTERN;
use crate::error::{CoreError, Result};
use crate::matcher::FactPattern;

/// 操作系统主版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsVersion {
    Solaris10,
    Solaris11,
}

impl OsVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solaris10 => "10",
            Self::Solaris11 => "11",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        // "11.4" 之类的小版本号只看主版本
        match token.split('.').next() {
            Some("10") => Some(Self::Solaris10),
            Some("11") => Some(Self::Solaris11),
            _ => None,
        }
    }
}

/// CPU 家族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuFamily {
    Sparc,
    X86,
}

impl CpuFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sparc => "sparc",
            Self::X86 => "x86",
        }
    }
}

/// 每个目标推导一次的平台参数，所有字段必须齐全
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformParams {
    pub platform: String,
    pub version: OsVersion,
    pub cpu_family: CpuFamily,
    pub os_version: String,
    pub os_release_pattern: String,
    pub kernel_pattern: String,
    pub kernel_major_pattern: String,
    pub architecture: String,
    pub processor_isa_pattern: String,
    pub processor_model_pattern: String,
    /// 实验室固定网段的 IP 模式
    pub ip_pattern: String,
    pub uses_dhcp: bool,
}

/// 平台分类器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformClassifier {
    lab_subnet_pattern: String,
}

impl Default for PlatformClassifier {
    fn default() -> Self {
        Self {
            lab_subnet_pattern: DEFAULT_LAB_SUBNET_PATTERN.to_string(),
        }
    }
}

impl PlatformClassifier {
    /// 使用自定义的实验室网段模式创建分类器
    pub fn new(lab_subnet_pattern: impl Into<String>) -> Result<Self> {
        let lab_subnet_pattern = lab_subnet_pattern.into();
        FactPattern::new(&lab_subnet_pattern)?;
        Ok(Self { lab_subnet_pattern })
    }

    pub fn lab_subnet_pattern(&self) -> &str {
        &self.lab_subnet_pattern
    }

    pub fn classify(&self, platform: &str) -> Result<PlatformParams> {
        let normalized = platform.trim().to_ascii_lowercase();
        let mut tokens = normalized.split('-');

        if tokens.next() != Some("solaris") {
            return Err(CoreError::classification(platform));
        }
        let version = tokens
            .next()
            .and_then(OsVersion::from_token)
            .ok_or_else(|| CoreError::classification(platform))?;
        let cpu_family = if tokens.any(|t| t.contains("sparc")) {
            CpuFamily::Sparc
        } else {
            CpuFamily::X86
        };

        let os_version = version.as_str().to_string();
        let (os_release_pattern, kernel_pattern, kernel_major_pattern) = match version {
            OsVersion::Solaris10 => {
                let kernel = r"Generic_\d+-\d+".to_string();
                (format!(r"{}_u\d+", os_version), kernel.clone(), kernel)
            }
            OsVersion::Solaris11 => {
                let release = format!(r"{}\.\d+", os_version);
                (release.clone(), release, regex::escape(&os_version))
            }
        };

        let (architecture, processor_model_pattern, processor_isa_pattern, uses_dhcp) =
            match cpu_family {
                // SPARC 测试机使用静态地址
                CpuFamily::Sparc => ("sun4v", "(?i)SPARC", "sparc", false),
                CpuFamily::X86 => ("i86pc", r#""Intel\(r\).*""#, "i386", true),
            };

        let params = PlatformParams {
            platform: platform.to_string(),
            version,
            cpu_family,
            os_version,
            os_release_pattern,
            kernel_pattern,
            kernel_major_pattern,
            architecture: architecture.to_string(),
            processor_isa_pattern: processor_isa_pattern.to_string(),
            processor_model_pattern: processor_model_pattern.to_string(),
            ip_pattern: self.lab_subnet_pattern.clone(),
            uses_dhcp,
        };

        debug!(
            platform = %platform,
            os_version = %params.os_version,
            architecture = %params.architecture,
            uses_dhcp = params.uses_dhcp,
            "Platform classified"
        );

        Ok(params)
    }
}

/// 便捷函数：使用默认网段分类
pub fn classify(platform: &str) -> Result<PlatformParams> {
    PlatformClassifier::default().classify(platform)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_fully_populated(params: &PlatformParams) {
        for field in [
            &params.platform,
            &params.os_version,
            &params.os_release_pattern,
            &params.kernel_pattern,
            &params.kernel_major_pattern,
            &params.architecture,
            &params.processor_isa_pattern,
            &params.processor_model_pattern,
            &params.ip_pattern,
        ] {
            assert!(!field.is_empty());
        }
        for pattern in [
            &params.os_release_pattern,
            &params.kernel_pattern,
            &params.kernel_major_pattern,
            &params.processor_isa_pattern,
            &params.processor_model_pattern,
            &params.ip_pattern,
        ] {
            assert!(FactPattern::new(pattern).is_ok(), "bad pattern {}", pattern);
        }
    }

    #[test]
    fn test_declared_platform_space_is_total() {
        for platform in [
            "solaris-10-sparc",
            "solaris-10-i386",
            "solaris-11-sparc",
            "solaris-11-i386",
            "solaris-11-x86_64",
            "solaris-10",
        ] {
            let params = classify(platform).unwrap();
            assert_fully_populated(&params);
        }
    }

    #[test]
    fn test_solaris_10_sparc() {
        let params = classify("solaris-10-sparc").unwrap();
        assert_eq!(params.version, OsVersion::Solaris10);
        assert_eq!(params.cpu_family, CpuFamily::Sparc);
        assert_eq!(params.os_version, "10");
        assert_eq!(params.os_release_pattern, r"10_u\d+");
        assert_eq!(params.kernel_pattern, r"Generic_\d+-\d+");
        assert_eq!(params.kernel_major_pattern, params.kernel_pattern);
        assert_eq!(params.architecture, "sun4v");
        assert_eq!(params.processor_isa_pattern, "sparc");
        assert!(!params.uses_dhcp);
    }

    #[test]
    fn test_solaris_11_x86() {
        let params = classify("solaris-11-i386").unwrap();
        assert_eq!(params.version, OsVersion::Solaris11);
        assert_eq!(params.cpu_family, CpuFamily::X86);
        assert_eq!(params.os_release_pattern, r"11\.\d+");
        assert_eq!(params.kernel_pattern, params.os_release_pattern);
        assert_eq!(params.kernel_major_pattern, "11");
        assert_eq!(params.architecture, "i86pc");
        assert_eq!(params.processor_isa_pattern, "i386");
        assert!(params.uses_dhcp);
    }

    #[test]
    fn test_processor_model_patterns() {
        let sparc = classify("solaris-11-sparc").unwrap();
        let sparc_models = FactPattern::new(&sparc.processor_model_pattern).unwrap();
        assert!(sparc_models.is_match("SPARC-T5"));
        assert!(sparc_models.is_match("sparcv9"));

        let x86 = classify("solaris-10-i386").unwrap();
        let x86_models = FactPattern::new(&x86.processor_model_pattern).unwrap();
        assert!(x86_models.is_match(r#"["Intel(r) Xeon(r) CPU E5-2680"]"#));
        assert!(!x86_models.is_match("Intel(r) Xeon(r)"));
    }

    #[test]
    fn test_unrecognized_platforms_fail() {
        for platform in [
            "linux-7-x86_64",
            "solaris-9-sparc",
            "solaris",
            "",
            "windows-2019-x64",
            "aix-7.1-power",
        ] {
            assert_eq!(
                classify(platform).unwrap_err(),
                CoreError::classification(platform),
                "platform {:?} should not classify",
                platform
            );
        }
    }

    #[test]
    fn test_custom_lab_subnet() {
        let classifier = PlatformClassifier::new(r"192\.168\.\d+\.\d+").unwrap();
        let params = classifier.classify("solaris-10-sparc").unwrap();
        assert_eq!(params.ip_pattern, r"192\.168\.\d+\.\d+");
    }

    #[test]
    fn test_invalid_lab_subnet_rejected() {
        assert!(PlatformClassifier::new("10.(").is_err());
    }
}
