use std::path::Path;

use anyhow::Result;
use bincode::{
    config::{BigEndian, WithOtherEndian},
    DefaultOptions, Options,
};
use serde::{de::DeserializeOwned, Serialize};
use sled::{Db as Sled, Tree};

type Encoder = WithOtherEndian<DefaultOptions, BigEndian>;

fn encoder() -> Encoder {
    bincode::options().with_big_endian()
}

pub struct Db {
    handle: Sled,
}
impl Db {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let handle = sled::open(path)?;
        Ok(Self { handle })
    }
    /// A store that lives only as long as the handle; nothing touches disk
    /// after drop.
    pub fn temporary() -> Result<Self> {
        let handle = sled::Config::new().temporary(true).open()?;
        Ok(Self { handle })
    }

    /// Monotonic across restarts, never hands out the same id twice.
    pub fn next_id(&self) -> Result<u64> {
        let id = self.handle.generate_id()?;
        Ok(id)
    }

    pub fn collection<N: AsRef<str>>(&self, name: N) -> Result<Collection> {
        let tree = self.handle.open_tree(name.as_ref())?;
        Ok(Collection {
            tree,
            encoder: encoder(),
        })
    }
}

// Required Debug implementation for `Db`
impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db").finish()
    }
}

/// One named set of documents, iterated in key byte order.
#[derive(Clone)]
pub struct Collection {
    tree: Tree,
    encoder: Encoder,
}
impl Collection {
    // CRUD
    pub fn insert<T: Serialize, K: AsRef<[u8]>>(&self, key: K, value: &T) -> Result<()> {
        let value = self.encoder.serialize(value)?;
        self.tree.insert(key.as_ref(), value)?;
        Ok(())
    }
    pub fn get<T: DeserializeOwned, K: AsRef<[u8]>>(&self, key: K) -> Result<Option<T>> {
        let value = match self.tree.get(key.as_ref())? {
            Some(value) => value,
            None => return Ok(None),
        };
        let value = self.encoder.deserialize(&value)?;
        Ok(Some(value))
    }
    /// Atomically rewrites the document under `key`. Returns `None` without
    /// writing anything when the key is absent.
    pub fn update<T, K, F>(&self, key: K, mut apply: F) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        K: AsRef<[u8]>,
        F: FnMut(T) -> T,
    {
        let encoder = self.encoder;
        let mut failure = None;
        let updated = self.tree.update_and_fetch(key.as_ref(), |current| {
            failure = None;
            let current = current?;
            let decoded: bincode::Result<T> = encoder.deserialize(current);
            let next = decoded
                .map(&mut apply)
                .and_then(|value| encoder.serialize(&value));
            match next {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    // leave the stored bytes untouched
                    failure = Some(err);
                    Some(current.to_vec())
                }
            }
        })?;
        if let Some(err) = failure {
            return Err(err.into());
        }
        match updated {
            Some(bytes) => Ok(Some(self.encoder.deserialize(&bytes)?)),
            None => Ok(None),
        }
    }
    /// Removes and returns the previous document, if any.
    pub fn remove<T: DeserializeOwned, K: AsRef<[u8]>>(&self, key: K) -> Result<Option<T>> {
        let value = match self.tree.remove(key.as_ref())? {
            Some(value) => value,
            None => return Ok(None),
        };
        let value = self.encoder.deserialize(&value)?;
        Ok(Some(value))
    }

    // Iterators
    pub fn iter<'a, T: DeserializeOwned + 'a>(&'a self) -> impl Iterator<Item = Result<T>> + 'a {
        self.tree.iter().values().map(move |value| {
            let value = value?;
            let value = self.encoder.deserialize(&value)?;
            Ok(value)
        })
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &String::from_utf8_lossy(&self.tree.name()))
            .finish()
    }
}
