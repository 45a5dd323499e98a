/// Split text into word-aligned chunks, each at most `budget` characters.
/// Words are never split: a single word longer than the budget becomes its
/// own oversized chunk. Joining all chunks' words in order reproduces the
/// original word sequence.
pub fn chunk(text: &str, budget: usize) -> Vec<String> {
    if text.len() <= budget {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + word.len() + 1 <= budget {
            current.push(' ');
            current.push_str(word);
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let text = "fits entirely within the budget";
        assert_eq!(chunk(text, 100), vec![text.to_string()]);
    }

    #[test]
    fn chunks_respect_budget() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let chunks = chunk(text, 20);

        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.len() <= 20, "chunk '{}' exceeds budget", c);
        }
    }

    #[test]
    fn word_sequence_is_preserved() {
        let text = "one two  three\nfour\tfive six seven eight nine ten";
        let chunks = chunk(text, 12);

        let rejoined: Vec<&str> = chunks
            .iter()
            .flat_map(|c| c.split_whitespace())
            .collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn oversized_word_becomes_its_own_chunk() {
        let long_word = "x".repeat(30);
        let text = format!("small {} tail words here to push past budget", long_word);
        let chunks = chunk(&text, 10);

        assert!(chunks.contains(&long_word));
    }

    #[test]
    fn exact_budget_boundary_is_inclusive() {
        // "aaaa bbbb" is exactly 9 chars: second word still fits at budget 9.
        let chunks = chunk("aaaa bbbb cccc dddd", 9);
        assert_eq!(chunks[0], "aaaa bbbb");
    }
}
