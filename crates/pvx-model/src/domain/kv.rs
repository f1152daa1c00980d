use serde::{Deserialize, Serialize};

/// Single environment assignment passed to a worker container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValue {
    key: String,
    value: String,
}

impl KeyValue {
    /// Create a new key–value pair.
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Render as a `KEY=value` assignment, the form container runtimes expect.
    pub fn assignment(&self) -> String {
        format!("{}={}", self.key, self.value)
    }
}

impl From<(&str, &str)> for KeyValue {
    fn from((key, value): (&str, &str)) -> Self {
        Self::new(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::KeyValue;

    #[test]
    fn assignment_joins_with_equals() {
        let kv = KeyValue::new("PROXY_ADDRESS", "socks5://10.0.0.5:1080");
        assert_eq!(kv.assignment(), "PROXY_ADDRESS=socks5://10.0.0.5:1080");
    }

    #[test]
    fn assignment_keeps_equals_inside_value() {
        let kv: KeyValue = ("HOTEL_URL", "https://x.test/?a=b").into();
        assert_eq!(kv.assignment(), "HOTEL_URL=https://x.test/?a=b");
    }
}
