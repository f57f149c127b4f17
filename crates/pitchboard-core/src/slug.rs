/// Derive a URL slug from a pitch title: lowercased, runs of
/// non-alphanumeric characters collapsed to a single `-`, no leading or
/// trailing separator. Uniqueness is not enforced; two pitches created with
/// the same title share a slug.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_sep = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            for lc in c.to_lowercase() {
                out.push(lc);
            }
        } else {
            pending_sep = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_joins_words() {
        assert_eq!(slugify("Foo Bar"), "foo-bar");
    }

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(slugify("QuantumSecure - AI-Powered Cybersecurity"), "quantumsecure-ai-powered-cybersecurity");
        assert_eq!(slugify("  hello...world!!  "), "hello-world");
    }

    #[test]
    fn strips_leading_and_trailing_separators() {
        assert_eq!(slugify("--Edge--"), "edge");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(slugify("Web3 Pay 2.0"), "web3-pay-2-0");
    }
}
