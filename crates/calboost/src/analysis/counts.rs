//! Frequency counts of categorical values.

use std::collections::HashMap;
use std::hash::Hash;

/// Count each distinct value, most frequent first.
///
/// Ties keep the order in which the values first appeared.
pub fn value_counts<T, I>(values: I) -> Vec<(T, usize)>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut index: HashMap<T, usize> = HashMap::new();
    let mut counts: Vec<(T, usize)> = Vec::new();
    for value in values {
        match index.get(&value) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(value.clone(), counts.len());
                counts.push((value, 1));
            }
        }
    }
    // Stable sort keeps first-appearance order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Gender;

    #[test]
    fn most_frequent_first() {
        let counts = value_counts([Gender::Male, Gender::Female, Gender::Female]);
        assert_eq!(counts, vec![(Gender::Female, 2), (Gender::Male, 1)]);
    }

    #[test]
    fn ties_keep_first_appearance() {
        let counts = value_counts(["b", "a", "a", "b", "c"]);
        assert_eq!(counts, vec![("b", 2), ("a", 2), ("c", 1)]);
    }

    #[test]
    fn empty_input() {
        assert!(value_counts(Vec::<u8>::new()).is_empty());
    }
}
