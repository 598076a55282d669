use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

// reference: https://www.sea-ql.org/SeaORM/docs/generate-entity/column-types/#json-column
// A bare Vec in an entity is only supported on postgres, where sea-orm maps it
// to a native array. To store a string list portably (sqlite included) it has
// to be wrapped in a JSON-backed newtype.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StringVec(pub Vec<String>);

impl StringVec {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl From<Vec<String>> for StringVec {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl From<StringVec> for Vec<String> {
    fn from(value: StringVec) -> Self {
        value.0
    }
}

impl FromIterator<String> for StringVec {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
