// Returns the longest prefix of `s` that has at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// Modulo that maps into `0..n` for any `i`, including negative.
pub fn wrapping_index(i: isize, n: usize) -> usize {
    assert!(n > 0);
    i.rem_euclid(n as isize) as usize
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate() {
        assert_eq!(truncate_chars("", 3), "");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abcd", 3), "abc");
        assert_eq!(truncate_chars("ёжик", 2), "ёж");
    }

    #[test]
    fn wrapping() {
        assert_eq!(wrapping_index(0, 3), 0);
        assert_eq!(wrapping_index(3, 3), 0);
        assert_eq!(wrapping_index(-1, 3), 2);
        assert_eq!(wrapping_index(4, 3), 1);
    }
}
