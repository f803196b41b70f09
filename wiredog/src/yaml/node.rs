use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::fmt;

/// A document tree reduced to the three shapes the walker cares about.  Mappings keep their keys
/// in document order.  Every leaf is the text the scalar was written as, so `0012` stays `0012`
/// and `1.50` stays `1.50`; `null` becomes the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Scalar(String),
    Sequence(Vec<Node>),
    Mapping(Vec<(String, Node)>),
}

impl Node {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "scalar",
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
        }
    }

    pub(crate) fn as_scalar(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Read a document whose shape is already known from `guide`, the same document read as a
    /// `Value`.  A `Value` resolves scalars to numbers and booleans; this read asks for every
    /// scalar as a string instead, which yields its source text.
    pub(crate) fn read<'de, D>(deserializer: D, guide: &Value) -> Result<Node, D::Error>
    where
        D: Deserializer<'de>,
    {
        Shaped(guide).deserialize(deserializer)
    }
}

struct Shaped<'g>(&'g Value);

impl<'de> DeserializeSeed<'de> for Shaped<'_> {
    type Value = Node;

    fn deserialize<D>(self, deserializer: D) -> Result<Node, D::Error>
    where
        D: Deserializer<'de>,
    {
        match self.0 {
            Value::Null => {
                IgnoredAny::deserialize(deserializer)?;
                Ok(Node::Scalar(String::new()))
            }
            Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                String::deserialize(deserializer).map(Node::Scalar)
            }
            Value::Sequence(items) => deserializer.deserialize_seq(SequenceVisitor(items)),
            Value::Mapping(mapping) => deserializer.deserialize_map(MappingVisitor(mapping)),
            Value::Tagged(tagged) => Shaped(&tagged.value).deserialize(deserializer),
        }
    }
}

struct SequenceVisitor<'g>(&'g [Value]);

impl<'de> Visitor<'de> for SequenceVisitor<'_> {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a sequence of {} items", self.0.len())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Node, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(self.0.len());
        for guide in self.0 {
            match seq.next_element_seed(Shaped(guide))? {
                Some(item) => items.push(item),
                None => return Err(de::Error::invalid_length(items.len(), &self)),
            }
        }
        Ok(Node::Sequence(items))
    }
}

struct MappingVisitor<'g>(&'g Mapping);

impl<'de> Visitor<'de> for MappingVisitor<'_> {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a mapping of {} entries", self.0.len())
    }

    fn visit_map<A>(self, mut map: A) -> Result<Node, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(self.0.len());
        for (key_guide, value_guide) in self.0 {
            let key = match map.next_key_seed(Shaped(key_guide))? {
                Some(Node::Scalar(key)) => key,
                Some(other) => {
                    return Err(de::Error::custom(format_args!(
                        "mapping keys must be plain values, found a {}",
                        other.kind()
                    )))
                }
                None => return Err(de::Error::invalid_length(entries.len(), &self)),
            };
            if key.is_empty() {
                return Err(de::Error::custom("mapping keys must not be empty"));
            }
            let value = map.next_value_seed(Shaped(value_guide))?;
            entries.push((key, value));
        }
        Ok(Node::Mapping(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(yaml: &str) -> Result<Node, serde_yaml::Error> {
        let guide: Value = serde_yaml::from_str(yaml)?;
        Node::read(serde_yaml::Deserializer::from_str(yaml), &guide)
    }

    fn node(yaml: &str) -> Node {
        read(yaml).unwrap()
    }

    fn text(s: &str) -> Node {
        Node::Scalar(s.to_string())
    }

    #[test]
    fn leaves_keep_their_source_text() {
        let n = node(
            "{a: true, b: 1500, c: ~, d: yes, e: '0x10', f: 0x5dc, g: 99999999999999999999, h: 1.50, i: True, j: 0012, k: \"line\\nbreak\"}",
        );
        assert_eq!(
            n,
            Node::Mapping(vec![
                ("a".to_string(), text("true")),
                ("b".to_string(), text("1500")),
                ("c".to_string(), text("")),
                ("d".to_string(), text("yes")),
                ("e".to_string(), text("0x10")),
                ("f".to_string(), text("0x5dc")),
                ("g".to_string(), text("99999999999999999999")),
                ("h".to_string(), text("1.50")),
                ("i".to_string(), text("True")),
                ("j".to_string(), text("0012")),
                ("k".to_string(), text("line\nbreak")),
            ])
        );
    }

    #[test]
    fn numeric_keys_and_aliases_keep_their_text() {
        let n = node("0012: &pin 007\nother: *pin\nlist: [1.0, *pin]\n");
        assert_eq!(
            n,
            Node::Mapping(vec![
                ("0012".to_string(), text("007")),
                ("other".to_string(), text("007")),
                (
                    "list".to_string(),
                    Node::Sequence(vec![text("1.0"), text("007")])
                ),
            ])
        );
    }

    #[test]
    fn mapping_order_is_kept() {
        let n = node("{zeta: 1, alpha: 2, mid: 3}");
        let keys: Vec<&str> = match &n {
            Node::Mapping(entries) => entries.iter().map(|(k, _)| k.as_str()).collect(),
            _ => panic!("expected a mapping"),
        };
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn complex_and_empty_keys_are_rejected() {
        for bad in ["? [a, b]\n: c\n", "? {a: b}\n: c\n", "'': x\n", "~: x\n"] {
            assert!(read(bad).is_err(), "{:?}", bad);
        }
    }
}
