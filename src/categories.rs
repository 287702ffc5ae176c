//! The built-in word catalog: categories, each with subcategories carrying the
//! actual word lists the player guesses from.

pub struct Category {
    pub id: &'static str,
    pub title: &'static str,
    pub subcategories: &'static [SubCategory],
}

pub struct SubCategory {
    pub id: &'static str,
    pub title: &'static str,
    pub words: &'static [&'static str],
}

static CATALOG: &[Category] = &[
    Category {
        id: "sports",
        title: "Sports",
        subcategories: &[
            SubCategory {
                id: "ball-sports",
                title: "Ball sports",
                words: &["football", "basketball", "volleyball", "tennis", "badminton"],
            },
            SubCategory {
                id: "martial-arts",
                title: "Martial arts",
                words: &["boxing", "karate", "taekwondo", "judo", "wrestling"],
            },
        ],
    },
    Category {
        id: "animals",
        title: "Animals",
        subcategories: &[
            SubCategory {
                id: "mammals",
                title: "Mammals",
                words: &["lion", "tiger", "elephant", "horse", "cow"],
            },
            SubCategory {
                id: "birds",
                title: "Birds",
                words: &["eagle", "parrot", "sparrow", "duck", "peacock"],
            },
        ],
    },
    Category {
        id: "food",
        title: "Food",
        subcategories: &[
            SubCategory {
                id: "fruits",
                title: "Fruits",
                words: &["mango", "banana", "watermelon", "pineapple", "coconut"],
            },
        ],
    },
];

pub fn catalog() -> &'static [Category] {
    CATALOG
}

/// Resolve a subcategory by its category and subcategory ids.
pub fn find(category_id: &str, subcategory_id: &str) -> Option<&'static SubCategory> {
    CATALOG
        .iter()
        .find(|category| category.id == category_id)?
        .subcategories
        .iter()
        .find(|sub| sub.id == subcategory_id)
}
