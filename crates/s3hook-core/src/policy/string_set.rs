use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;

/// An unordered set of strings encoded either as a lone string or an array
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct StringSet(BTreeSet<String>);

impl StringSet {
    pub fn insert(&mut self, value: String) -> bool {
        self.0.insert(value)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl FromIterator<String> for StringSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for StringSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.len() {
            1 => serializer.serialize_str(self.0.iter().next().map(String::as_str).unwrap_or("")),
            _ => serializer.collect_seq(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for StringSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::One(s) => Self::from_iter([s]),
            Repr::Many(v) => Self::from_iter(v),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_and_encoding_independent() {
        let a: StringSet = serde_json::from_str(r#"["b", "a"]"#).unwrap();
        let b: StringSet = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(a, b);

        let one: StringSet = serde_json::from_str(r#""a""#).unwrap();
        let many: StringSet = serde_json::from_str(r#"["a"]"#).unwrap();
        assert_eq!(one, many);
        assert_eq!(serde_json::to_string(&many).unwrap(), r#""a""#);
    }
}
