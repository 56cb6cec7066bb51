use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Store-assigned identifier of a todo.
///
/// Backed by the store's monotonic id generator, so ordering by id is
/// insertion order. Travels over JSON as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TodoId(u64);

impl TodoId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
    // big-endian so that byte order matches numeric order in the tree
    pub fn to_key(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TodoId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

impl Serialize for TodoId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TodoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub task: String,
    pub completed: bool,
}
impl Todo {
    pub fn new(id: TodoId, task: String) -> Self {
        Self {
            id,
            task,
            completed: false,
        }
    }
}
