//! Physical record names.
//!
//! | Format | Example |
//! |--------|---------|
//! | [`Plain`](CacheKeyFormat::Plain) | `feed:v1:category=All&window=24h` |
//! | [`UrlEncoded`](CacheKeyFormat::UrlEncoded) | `_prefix=feed&_version=1&category=All&window=24h` |

use std::iter::once;

use pulse_core::CacheKey;

use crate::format::FormatError;

const PREFIX_KEY: &str = "_prefix";
const VERSION_KEY: &str = "_version";

/// How a [`CacheKey`] becomes the bytes a store indexes by.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheKeyFormat {
    /// The key's display form.
    #[default]
    Plain,

    /// A URL-encoded query string, safe for stores that restrict key characters.
    UrlEncoded,
}

impl CacheKeyFormat {
    /// Serializes a cache key to bytes.
    pub fn serialize(&self, key: &CacheKey) -> Result<Vec<u8>, FormatError> {
        match self {
            CacheKeyFormat::Plain => Ok(key.to_string().into_bytes()),
            CacheKeyFormat::UrlEncoded => {
                let pairs = once((PREFIX_KEY, key.prefix().to_string()))
                    .chain(once((VERSION_KEY, key.version().to_string())))
                    .chain(
                        key.parts()
                            .map(|p| (p.key(), p.value().unwrap_or_default().to_string())),
                    )
                    .collect::<Vec<_>>();

                serde_urlencoded::to_string(pairs)
                    .map(String::into_bytes)
                    .map_err(|err| FormatError::Serialize(Box::new(err)))
            }
        }
    }
}
