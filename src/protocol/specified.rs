//! Three-state optional wire field.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value paired with an explicit "present on the wire" flag.
///
/// The wire format distinguishes an omitted field from a field carrying the
/// type's default (e.g. `count` omitted vs `count = 0`), so presence is stored
/// separately from the value instead of being inferred from it.
///
/// Fields of this type should be annotated with
/// `#[serde(default, skip_serializing_if = "Specified::is_omitted")]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Specified<T> {
    value: T,
    specified: bool,
}

impl<T> Specified<T> {
    pub fn present(value: T) -> Self {
        Self {
            value,
            specified: true,
        }
    }

    pub fn is_specified(&self) -> bool {
        self.specified
    }

    pub fn is_omitted(&self) -> bool {
        !self.specified
    }

    /// The value, only if it was present on the wire.
    pub fn get(&self) -> Option<&T> {
        self.specified.then_some(&self.value)
    }

    /// The raw value regardless of presence (the type default when omitted).
    pub fn raw(&self) -> &T {
        &self.value
    }
}

impl<T: Copy> Specified<T> {
    pub fn value(&self) -> Option<T> {
        self.specified.then_some(self.value)
    }
}

impl<T: Default> Specified<T> {
    pub fn omitted() -> Self {
        Self {
            value: T::default(),
            specified: false,
        }
    }
}

impl<T: Default> Default for Specified<T> {
    fn default() -> Self {
        Self::omitted()
    }
}

impl<T: Default> From<Option<T>> for Specified<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::present(v),
            None => Self::omitted(),
        }
    }
}

impl<T: Serialize> Serialize for Specified<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Specified<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Specified::present)
    }
}
