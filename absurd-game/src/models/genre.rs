//! Built-in phrase genres.

use std::fmt;

/// A named category of phrases. The catalog is fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genre {
    /// Key used to locate the phrase source (`data/<id>.json`).
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
}

pub const GENRES: [Genre; 6] = [
    Genre {
        id: "kids",
        name: "Детское",
        emoji: "🧸",
        description: "Веселые детские вопросы",
    },
    Genre {
        id: "absurd",
        name: "Абсурд",
        emoji: "🤪",
        description: "Полный бред и нелепица",
    },
    Genre {
        id: "horror",
        name: "Хоррор",
        emoji: "👻",
        description: "Страшные истории",
    },
    Genre {
        id: "romance",
        name: "Романтика",
        emoji: "💕",
        description: "О любви и отношениях",
    },
    Genre {
        id: "sex",
        name: "18+",
        emoji: "🔞",
        description: "Только для взрослых",
    },
    Genre {
        id: "street",
        name: "Уличное",
        emoji: "🏙️",
        description: "Из жизни улиц",
    },
];

impl Genre {
    /// Look up a genre by its id.
    pub fn find(id: &str) -> Option<&'static Genre> {
        GENRES.iter().find(|g| g.id == id)
    }

    pub fn all() -> &'static [Genre] {
        &GENRES
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_genre() {
        let genre = Genre::find("horror").unwrap();
        assert_eq!(genre.name, "Хоррор");
    }

    #[test]
    fn test_find_unknown_genre() {
        assert!(Genre::find("western").is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<_> = Genre::all().iter().map(|g| g.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), GENRES.len());
    }
}
