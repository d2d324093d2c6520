use serde::{Deserialize, Serialize};

/// Represents zero, one, or many `T`.
///
/// Used for things like an RFQ's received quotes before any have arrived, or an instrument
/// subscription's initial snapshot before the first tick lands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NoneOneOrMany<T> {
    #[default]
    None,
    One(T),
    Many(Vec<T>),
}

impl<T> NoneOneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::None => Vec::new(),
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }

    pub fn push(&mut self, item: T) {
        *self = match std::mem::take(self) {
            Self::None => Self::One(item),
            Self::One(existing) => Self::Many(vec![existing, item]),
            Self::Many(mut items) => {
                items.push(item);
                Self::Many(items)
            }
        };
    }

    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::One(_) => 1,
            Self::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_promotes_through_variants() {
        let mut collection = NoneOneOrMany::None;
        assert_eq!(collection.len(), 0);

        collection.push(1);
        assert!(matches!(collection, NoneOneOrMany::One(1)));

        collection.push(2);
        assert!(matches!(collection, NoneOneOrMany::Many(ref v) if v == &[1, 2]));
    }
}
