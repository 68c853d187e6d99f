// src/redis/info.rs

use std::collections::BTreeMap;

/// One INFO value, classified at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// Integer literal -> Int, float literal -> Float, anything else -> Str.
    pub fn classify(raw: &str) -> Self {
        if let Ok(n) = raw.parse::<i64>() {
            return Scalar::Int(n);
        }
        // "inf"/"nan" parse as f64 but are not numbers INFO ever means
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Scalar::Float(f),
            _ => Scalar::Str(raw.to_string()),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            Scalar::Float(f) => float_to_i64(*f),
            Scalar::Str(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(float_to_i64))
            }
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(n) => Some(*n as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Str(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        }
    }
}

fn float_to_i64(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Float(f)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

/// Flat key -> value view of one INFO reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStatusMap {
    fields: BTreeMap<String, Scalar>,
}

impl RawStatusMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the text body of `INFO [section]`.
    ///
    /// Section headers (`# Server`), blank lines and lines without a `:` are
    /// skipped. Only the first `:` splits, so `db0:keys=1,expires=0` keeps
    /// its value intact.
    pub fn parse(info: &str) -> Self {
        let mut fields = BTreeMap::new();

        for line in info.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((k, v)) = line.split_once(':') {
                let k = k.trim();
                if k.is_empty() {
                    continue;
                }
                fields.insert(k.to_string(), Scalar::classify(v.trim()));
            }
        }

        Self { fields }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for RawStatusMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = RawStatusMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Server\r\n\
redis_version:7.2.4\r\n\
tcp_port:6379\r\n\
\r\n\
# Clients\r\n\
connected_clients:43\r\n\
\r\n\
# Memory\r\n\
used_memory:58228616\r\n\
mem_fragmentation_ratio:1.21\r\n\
\r\n\
# CPU\r\n\
used_cpu_sys:12.345678\r\n\
\r\n\
# Replication\r\n\
master_host:10.0.0.7\r\n\
\r\n\
# Keyspace\r\n\
db0:keys=12,expires=0,avg_ttl=0\r\n";

    #[test]
    fn parses_sections_and_types() {
        let m = RawStatusMap::parse(SAMPLE);

        assert_eq!(m.get("connected_clients"), Some(&Scalar::Int(43)));
        assert_eq!(m.get("used_memory"), Some(&Scalar::Int(58_228_616)));
        assert_eq!(m.get("mem_fragmentation_ratio"), Some(&Scalar::Float(1.21)));
        assert_eq!(m.get("used_cpu_sys"), Some(&Scalar::Float(12.345678)));
        assert_eq!(m.get("redis_version"), Some(&Scalar::Str("7.2.4".into())));
        assert_eq!(
            m.get("db0"),
            Some(&Scalar::Str("keys=12,expires=0,avg_ttl=0".into()))
        );
        assert!(m.get("# Server").is_none());
        assert_eq!(m.len(), 8);
    }

    #[test]
    fn skips_garbage_lines() {
        let m = RawStatusMap::parse("no colon here\n:orphan\n\n  key : 7 \n");
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("key"), Some(&Scalar::Int(7)));
    }

    #[test]
    fn empty_reply_gives_empty_map() {
        assert!(RawStatusMap::parse("").is_empty());
    }

    #[test]
    fn classify_keeps_non_numbers_as_strings() {
        assert_eq!(Scalar::classify("-1"), Scalar::Int(-1));
        assert_eq!(Scalar::classify("0.5"), Scalar::Float(0.5));
        assert_eq!(Scalar::classify("inf"), Scalar::Str("inf".into()));
        assert_eq!(Scalar::classify("yes"), Scalar::Str("yes".into()));
    }

    #[test]
    fn coercions() {
        assert_eq!(Scalar::from("43").as_i64(), Some(43));
        assert_eq!(Scalar::from(" 43 ").as_i64(), Some(43));
        assert_eq!(Scalar::from("2.0").as_i64(), Some(2));
        assert_eq!(Scalar::from("2.5").as_i64(), None);
        assert_eq!(Scalar::Float(3.0).as_i64(), Some(3));
        assert_eq!(Scalar::Float(3.25).as_i64(), None);
        assert_eq!(Scalar::Int(7).as_f64(), Some(7.0));
        assert_eq!(Scalar::from("1.5").as_f64(), Some(1.5));
        assert_eq!(Scalar::from("n/a").as_f64(), None);
    }
}
