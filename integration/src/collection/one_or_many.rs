use serde::{Deserialize, Serialize};

/// Represents exactly one, or many, `T` — never empty.
///
/// Used for things like quote ranking output (always at least one ranked quote once any
/// quote has been accepted into an RFQ).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        match self {
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
    fn into_vec_flattens_one_and_many() {
        assert_eq!(OneOrMany::One(1).into_vec(), vec![1]);
        assert_eq!(OneOrMany::Many(vec![1, 2]).into_vec(), vec![1, 2]);
    }
}
