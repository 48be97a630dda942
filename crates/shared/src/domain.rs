use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(MovieId);

/// Field names of the add-movie form, used to attach validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieField {
    Title,
    Description,
    Director,
    ReleaseYear,
    Genre,
}

impl MovieField {
    pub fn label(self) -> &'static str {
        match self {
            MovieField::Title => "title",
            MovieField::Description => "description",
            MovieField::Director => "director",
            MovieField::ReleaseYear => "release year",
            MovieField::Genre => "genre",
        }
    }
}
