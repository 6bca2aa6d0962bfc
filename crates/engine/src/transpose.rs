//! Inverting a relation: person -> item -> rating becomes
//! item -> person -> rating.
//!
//! Once flipped, "which critics are alike" becomes "which movies are
//! alike" with the same metrics and ranker, and "what should this critic
//! watch" becomes "which critics should see this movie".

use data_loader::Relation;

/// Swap the two key levels of `relation`.
///
/// Every triple survives, so transposing twice reconstructs the original
/// triples. Rows with no ratings have no triples and do not survive.
pub fn transpose(relation: &Relation) -> Relation {
    relation
        .triples()
        .map(|(entity, item, rating)| (item.clone(), entity.clone(), rating))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpose_flips_keys() {
        let relation: Relation = vec![
            ("Toby", "Superman Returns", 4.0),
            ("Toby", "Snakes on a Plane", 4.5),
            ("Lisa Rose", "Superman Returns", 3.5),
        ]
        .into_iter()
        .collect();

        let flipped = transpose(&relation);
        assert_eq!(flipped.counts(), (2, 3));
        assert_eq!(flipped.rating("Superman Returns", "Toby"), Some(4.0));
        assert_eq!(flipped.rating("Superman Returns", "Lisa Rose"), Some(3.5));
        assert_eq!(flipped.rating("Snakes on a Plane", "Toby"), Some(4.5));
        assert!(!flipped.contains("Toby"));
    }

    #[test]
    fn test_transpose_twice_is_identity() {
        let relation: Relation = vec![("a", "x", 1.0), ("a", "y", 0.0), ("b", "y", -2.5)]
            .into_iter()
            .collect();
        assert_eq!(transpose(&transpose(&relation)), relation);
    }

    #[test]
    fn test_transpose_empty() {
        assert!(transpose(&Relation::new()).is_empty());
    }
}
