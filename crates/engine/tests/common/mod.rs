//! Shared fixtures for the engine integration tests.

#![allow(dead_code)]

use data_loader::Relation;

type Row = (&'static str, &'static [(&'static str, f64)]);

const CRITICS: &[Row] = &[
    (
        "Lisa Rose",
        &[
            ("Lady in the Water", 2.5),
            ("Snakes on a Plane", 3.5),
            ("Just My Luck", 3.0),
            ("Superman Returns", 3.5),
            ("You, Me and Dupree", 2.5),
            ("The Night Listener", 3.0),
        ],
    ),
    (
        "Gene Seymour",
        &[
            ("Lady in the Water", 3.0),
            ("Snakes on a Plane", 3.5),
            ("Just My Luck", 1.5),
            ("Superman Returns", 5.0),
            ("The Night Listener", 3.0),
            ("You, Me and Dupree", 3.5),
        ],
    ),
    (
        "Michael Phillips",
        &[
            ("Lady in the Water", 2.5),
            ("Snakes on a Plane", 3.0),
            ("Superman Returns", 3.5),
            ("The Night Listener", 4.0),
        ],
    ),
    (
        "Claudia Puig",
        &[
            ("Snakes on a Plane", 3.5),
            ("Just My Luck", 3.0),
            ("The Night Listener", 4.5),
            ("Superman Returns", 4.0),
            ("You, Me and Dupree", 2.5),
        ],
    ),
    (
        "Mick LaSalle",
        &[
            ("Lady in the Water", 3.0),
            ("Snakes on a Plane", 4.0),
            ("Just My Luck", 2.0),
            ("Superman Returns", 3.0),
            ("The Night Listener", 3.0),
            ("You, Me and Dupree", 2.0),
        ],
    ),
    (
        "Jack Matthews",
        &[
            ("Lady in the Water", 3.0),
            ("Snakes on a Plane", 4.0),
            ("The Night Listener", 3.0),
            ("Superman Returns", 5.0),
            ("You, Me and Dupree", 3.5),
        ],
    ),
    (
        "Toby",
        &[
            ("Snakes on a Plane", 4.5),
            ("You, Me and Dupree", 1.0),
            ("Superman Returns", 4.0),
        ],
    ),
];

/// Seven film critics rating up to six movies
pub fn critics() -> Relation {
    let mut relation = Relation::new();
    for (critic, ratings) in CRITICS {
        for (movie, rating) in *ratings {
            relation.insert(*critic, *movie, *rating);
        }
    }
    relation
}

/// Small relations with awkward shapes: no overlap, constant
/// ratings, negative and zero ratings, single shared items
pub fn awkward_relations() -> Vec<Relation> {
    vec![
        critics(),
        vec![("a", "x", 1.0), ("b", "y", 2.0), ("c", "z", 3.0)]
            .into_iter()
            .collect(),
        vec![
            ("flat", "x", 3.0),
            ("flat", "y", 3.0),
            ("flat", "z", 3.0),
            ("varied", "x", 1.0),
            ("varied", "y", 4.0),
            ("varied", "z", 5.0),
            ("one", "x", 2.0),
        ]
        .into_iter()
        .collect(),
        vec![
            ("neg", "x", -2.0),
            ("neg", "y", 0.0),
            ("pos", "x", 2.0),
            ("pos", "y", 0.0),
            ("zero", "x", 0.0),
            ("zero", "y", 0.0),
        ]
        .into_iter()
        .collect(),
    ]
}

pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}
