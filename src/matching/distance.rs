// src/matching/distance.rs

/// Classic edit distance with unit cost for insert, delete and substitute.
/// Lengths are counted in chars, not bytes.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (len_a, len_b) = (a_chars.len(), b_chars.len());

    if len_a == 0 || len_b == 0 {
        return len_a.max(len_b);
    }

    // rows follow b, columns follow a
    let mut matrix = vec![vec![0usize; len_a + 1]; len_b + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len_a {
        matrix[0][j] = j;
    }

    for i in 1..=len_b {
        for j in 1..=len_a {
            let cost = if b_chars[i - 1] == a_chars[j - 1] { 0 } else { 1 };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }
    matrix[len_b][len_a]
}

/// `1 - distance / longer length`, in `[0, 1]`. Two empty names are identical.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(a, b) as f64 / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_reference_values() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("", ""), 0);
    }

    #[test]
    fn test_levenshtein_is_symmetric_and_char_based() {
        assert_eq!(
            levenshtein_distance("meyer", "maier"),
            levenshtein_distance("maier", "meyer")
        );
        assert_eq!(levenshtein_distance("müller", "muller"), 1);
    }

    #[test]
    fn test_name_similarity() {
        assert_eq!(name_similarity("", ""), 1.0);
        assert_eq!(name_similarity("abc", "abc"), 1.0);
        assert!((name_similarity("meyer", "maier") - 0.6).abs() < 1e-9);
        assert!(name_similarity("johannes meyer", "johannes maier") > 0.8);
    }
}
