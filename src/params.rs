//! Request parameters and their form encoding.
//!
//! Nested values are flattened with bracket keys (`fields[email]=...`,
//! `ids[0]=...`), the layout the UniSender API expects.

use std::collections::BTreeMap;
use url::form_urlencoded::byte_serialize;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Text(String),
    /// Text in the client's declared source encoding, not yet converted to UTF-8.
    Raw(Vec<u8>),
    Int(i64),
    Bool(bool),
    List(Vec<Param>),
    Map(Params),
}

impl Param {
    /// Wraps bytes in the declared source encoding.
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Param::Raw(bytes.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Param::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value would be sent as an empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            Param::Text(s) => s.is_empty(),
            Param::Raw(b) => b.is_empty(),
            Param::List(items) => items.is_empty(),
            Param::Map(map) => map.is_empty(),
            Param::Int(_) | Param::Bool(_) => false,
        }
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

impl From<&String> for Param {
    fn from(value: &String) -> Self {
        Param::Text(value.clone())
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<u64> for Param {
    fn from(value: u64) -> Self {
        Param::Int(value as i64)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Int(value as i64)
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

impl From<Params> for Param {
    fn from(value: Params) -> Self {
        Param::Map(value)
    }
}

impl<T: Into<Param>> From<Vec<T>> for Param {
    fn from(value: Vec<T>) -> Self {
        Param::List(value.into_iter().map(Into::into).collect())
    }
}

/// Parameter mapping for one API call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<String, Param>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Param>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Param>) -> Option<Param> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Param> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Param> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Param)> {
        self.0.iter()
    }

    /// Form-encodes the mapping as `application/x-www-form-urlencoded` bytes.
    pub fn to_form(&self) -> Vec<u8> {
        let mut pairs = Vec::new();
        for (key, value) in &self.0 {
            flatten(key.as_bytes().to_vec(), value, &mut pairs);
        }

        let mut out = String::new();
        for (key, value) in pairs {
            if !out.is_empty() {
                out.push('&');
            }
            out.extend(byte_serialize(&key));
            out.push('=');
            out.extend(byte_serialize(&value));
        }
        out.into_bytes()
    }
}

impl<K: Into<String>, V: Into<Param>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Params {
    type Item = (String, Param);
    type IntoIter = std::collections::btree_map::IntoIter<String, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn flatten(key: Vec<u8>, value: &Param, out: &mut Vec<(Vec<u8>, Vec<u8>)>) {
    match value {
        Param::Text(s) => out.push((key, s.as_bytes().to_vec())),
        Param::Raw(bytes) => out.push((key, bytes.clone())),
        Param::Int(n) => out.push((key, n.to_string().into_bytes())),
        Param::Bool(b) => out.push((key, if *b { b"1".to_vec() } else { b"0".to_vec() })),
        Param::List(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(nested_key(&key, index.to_string().as_bytes()), item, out);
            }
        }
        Param::Map(map) => {
            for (sub, item) in map.iter() {
                flatten(nested_key(&key, sub.as_bytes()), item, out);
            }
        }
    }
}

fn nested_key(parent: &[u8], child: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(parent.len() + child.len() + 2);
    key.extend_from_slice(parent);
    key.push(b'[');
    key.extend_from_slice(child);
    key.push(b']');
    key
}
