//! Key Pattern Matching
//!
//! Glob matching with the same syntax Redis accepts for `KEYS`, so an
//! invalidation pattern selects the same keys on either backend.
//!
//! - `*` matches any run of characters, including none
//! - `?` matches exactly one character
//! - `[abc]`, `[a-z]`, `[^a]` match one character from a class
//! - `\x` matches `x` literally

/// Returns true if `key` matches the glob `pattern`.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let k: Vec<char> = key.chars().collect();

    let (mut pi, mut ki) = (0, 0);
    // Pattern position after the last `*` and the key position it resumed at.
    let mut resume: Option<(usize, usize)> = None;

    while ki < k.len() {
        if pi < p.len() && p[pi] == '*' {
            pi += 1;
            resume = Some((pi, ki));
            continue;
        }

        if pi < p.len() {
            if let Some(next) = match_one(&p, pi, k[ki]) {
                pi = next;
                ki += 1;
                continue;
            }
        }

        match resume {
            Some((star_pi, star_ki)) => {
                pi = star_pi;
                ki = star_ki + 1;
                resume = Some((star_pi, ki));
            }
            None => return false,
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}

/// Matches the single-character token at `pi` against `ch`, returning the
/// position of the next token on success.
fn match_one(p: &[char], pi: usize, ch: char) -> Option<usize> {
    match p[pi] {
        '?' => Some(pi + 1),
        '\\' if pi + 1 < p.len() => (p[pi + 1] == ch).then_some(pi + 2),
        '[' => match match_class(p, pi + 1, ch) {
            Some((matched, next)) => matched.then_some(next),
            // Unterminated class, `[` is literal
            None => (ch == '[').then_some(pi + 1),
        },
        c => (c == ch).then_some(pi + 1),
    }
}

/// Evaluates a character class starting just after `[`. Returns whether `ch`
/// is selected and the position after the closing `]`, or None when the
/// class is never closed.
fn match_class(p: &[char], start: usize, ch: char) -> Option<(bool, usize)> {
    let mut i = start;
    let negate = p.get(i) == Some(&'^');
    if negate {
        i += 1;
    }

    let mut matched = false;
    while i < p.len() {
        if p[i] == ']' {
            return Some((matched != negate, i + 1));
        }

        let mut lo = p[i];
        if lo == '\\' && i + 1 < p.len() {
            i += 1;
            lo = p[i];
        }

        if i + 2 < p.len() && p[i + 1] == '-' && p[i + 2] != ']' {
            let hi = p[i + 2];
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            matched |= lo <= ch && ch <= hi;
            i += 3;
        } else {
            matched |= lo == ch;
            i += 1;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_patterns() {
        assert!(glob_match("inventory:*", "inventory:search:tent:2024-01-01:2024-12-31"));
        assert!(glob_match("inventory:*", "inventory:"));
        assert!(!glob_match("inventory:*", "low-stock:2024-01-01:2024-01-31:2"));
        assert!(!glob_match("rentals:*", "rentals"));
    }

    #[test]
    fn test_star_matches_everything() {
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "products:list:all"));
        assert!(glob_match("**", "categories:list:all"));
    }

    #[test]
    fn test_literal_pattern() {
        assert!(glob_match("products:list:all", "products:list:all"));
        assert!(!glob_match("products:list:all", "products:list:al"));
        assert!(!glob_match("products:list:al", "products:list:all"));
    }

    #[test]
    fn test_inner_star_backtracks() {
        assert!(glob_match("returns:*:7", "returns:upcoming:7"));
        assert!(glob_match("a*b*c", "axxbyybzzc"));
        assert!(!glob_match("a*b*c", "axxbyyzz"));
        assert!(glob_match("*:2", "low-stock:2024-01-01:2024-01-31:2"));
    }

    #[test]
    fn test_question_mark() {
        assert!(glob_match("returns:upcoming:?", "returns:upcoming:7"));
        assert!(!glob_match("returns:upcoming:?", "returns:upcoming:14"));
    }

    #[test]
    fn test_character_classes() {
        assert!(glob_match("h[ae]llo", "hello"));
        assert!(glob_match("h[ae]llo", "hallo"));
        assert!(!glob_match("h[ae]llo", "hillo"));
        assert!(glob_match("h[^e]llo", "hallo"));
        assert!(!glob_match("h[^e]llo", "hello"));
        // `!` is an ordinary class member, as in Redis
        assert!(glob_match("h[!e]llo", "hello"));
        assert!(glob_match("h[!e]llo", "h!llo"));
        assert!(!glob_match("h[!e]llo", "hallo"));
        assert!(glob_match("key[0-9]", "key5"));
        assert!(glob_match("key[9-0]", "key5"));
        assert!(!glob_match("key[0-9]", "keyx"));
    }

    #[test]
    fn test_escapes_and_unterminated_class() {
        assert!(glob_match("literal\\*", "literal*"));
        assert!(!glob_match("literal\\*", "literally"));
        assert!(glob_match("open[", "open["));
        assert!(!glob_match("open[", "openx"));
    }
}
