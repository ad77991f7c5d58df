//! Meta-informatie die een host aan een component kan meegeven
//! (bv. weergave-instellingen die geen pin hebben).

use std::collections::BTreeMap;

/// Waarde die meta-informatie over een component beschrijft.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Text(String),
}

impl MetaValue {
    /// Numerieke interpretatie; gehele getallen worden verbreed naar `f64`.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            Self::Boolean(_) | Self::Text(_) => None,
        }
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Alias voor een verzameling meta-informatie.
pub type MetaMap = BTreeMap<String, MetaValue>;

/// Hulpfuncties voor case-insensitieve meta-opzoekingen.
pub trait MetaLookupExt {
    /// Zoek een meta-item op zonder hoofdlettergevoeligheid.
    fn get_normalized(&self, key: &str) -> Option<&MetaValue>;

    /// Numerieke meta-waarde, of `None` wanneer de sleutel ontbreekt of geen getal is.
    fn number(&self, key: &str) -> Option<f64> {
        self.get_normalized(key).and_then(MetaValue::as_number)
    }
}

impl MetaLookupExt for MetaMap {
    fn get_normalized(&self, key: &str) -> Option<&MetaValue> {
        if let Some(value) = self.get(key) {
            return Some(value);
        }

        let lower = key.to_ascii_lowercase();
        if lower != key {
            if let Some(value) = self.get(&lower) {
                return Some(value);
            }
        }

        self.iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::{MetaLookupExt, MetaMap, MetaValue};

    #[test]
    fn lookup_ignores_case() {
        let mut meta = MetaMap::new();
        meta.insert("MaxThickness".to_owned(), MetaValue::from(9_i64));
        assert_eq!(meta.number("maxthickness"), Some(9.0));
        assert_eq!(meta.number("MAXTHICKNESS"), Some(9.0));
        assert_eq!(meta.number("ontbreekt"), None);
    }

    #[test]
    fn text_is_not_a_number() {
        let mut meta = MetaMap::new();
        meta.insert("label".to_owned(), MetaValue::from("dik"));
        assert_eq!(meta.number("label"), None);
    }
}
