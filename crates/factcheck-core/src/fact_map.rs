//! 事实存储：以点分路径为键的扁平字符串映射

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{CoreError, Result};

/// 目标主机的完整事实集合，评估前一次性物化，只读
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactMap {
    entries: BTreeMap<String, String>,
}

impl FactMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// 将嵌套的 JSON 事实展开为点分路径
    ///
    /// 对象按键展开，数组按下标展开，例如
    /// `{"networking":{"interfaces":{"net0":{"bindings":[{"address":"10.0.0.2"}]}}}}`
    /// 得到 `networking.interfaces.net0.bindings.0.address`。
    /// 对象和数组本身也以紧凑 JSON 文本记录在自己的路径上，与代理查询非叶子事实的输出一致。
    /// 数字和布尔值保留 JSON 文本，`null` 记为空字符串。
    pub fn from_json(value: &Value) -> Self {
        let mut map = Self::new();
        if let Value::Object(obj) = value {
            for (key, child) in obj {
                flatten_into(&mut map.entries, key.clone(), child);
            }
        }
        map
    }

    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(path.into(), value.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// 按路径解析事实值；路径不存在与值不匹配是两类不同的失败
    pub fn resolve(&self, path: &str) -> Result<&str> {
        self.get(path).ok_or_else(|| CoreError::not_found(path))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FactMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

fn flatten_into(out: &mut BTreeMap<String, String>, prefix: String, value: &Value) {
    match value {
        Value::Object(obj) => {
            for (key, child) in obj {
                flatten_into(out, format!("{}.{}", prefix, key), child);
            }
            out.insert(prefix, value.to_string());
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                flatten_into(out, format!("{}.{}", prefix, idx), child);
            }
            out.insert(prefix, value.to_string());
        }
        Value::String(s) => {
            out.insert(prefix, s.clone());
        }
        Value::Null => {
            out.insert(prefix, String::new());
        }
        other => {
            out.insert(prefix, other.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_present_and_missing() {
        let facts = FactMap::from_pairs([("os.family", "Solaris")]);

        assert_eq!(facts.resolve("os.family").unwrap(), "Solaris");
        assert_eq!(
            facts.resolve("os.name").unwrap_err(),
            CoreError::not_found("os.name")
        );
    }

    #[test]
    fn test_empty_value_is_present() {
        let facts = FactMap::from_pairs([("networking.primary", "")]);
        assert!(facts.contains("networking.primary"));
        assert_eq!(facts.resolve("networking.primary").unwrap(), "");
    }

    #[test]
    fn test_from_json_flattens_objects_and_arrays() {
        let raw = json!({
            "kernel": "SunOS",
            "processors": { "count": 8, "models": ["SPARC-T4", "SPARC-T4"] },
            "networking": {
                "primary": "net0",
                "interfaces": {
                    "net0": {
                        "bindings": [
                            { "address": "10.32.1.7", "netmask": "255.255.0.0", "network": "10.32.0.0" }
                        ]
                    }
                }
            },
            "dhcp_servers": null,
            "is_virtual": true
        });

        let facts = FactMap::from_json(&raw);

        assert_eq!(facts.get("kernel"), Some("SunOS"));
        assert_eq!(facts.get("processors.count"), Some("8"));
        assert_eq!(facts.get("processors.models.1"), Some("SPARC-T4"));
        assert_eq!(
            facts.get("networking.interfaces.net0.bindings.0.address"),
            Some("10.32.1.7")
        );
        assert_eq!(facts.get("dhcp_servers"), Some(""));
        assert_eq!(facts.get("is_virtual"), Some("true"));
        assert_eq!(
            facts.get("processors.models"),
            Some(r#"["SPARC-T4","SPARC-T4"]"#)
        );
        let interfaces: serde_json::Value =
            serde_json::from_str(facts.get("networking.interfaces").unwrap()).unwrap();
        assert_eq!(interfaces["net0"]["bindings"][0]["network"], "10.32.0.0");
    }

    #[test]
    fn test_from_json_ignores_non_object_root() {
        assert!(FactMap::from_json(&json!("SunOS")).is_empty());
        assert!(FactMap::from_json(&json!([1, 2])).is_empty());
    }

    #[test]
    fn test_collect_from_iterator() {
        let facts: FactMap = vec![("identity.uid", "0"), ("identity.gid", "0")]
            .into_iter()
            .collect();
        assert_eq!(facts.len(), 2);
    }
}
