use unicode_segmentation::UnicodeSegmentation;

/// Lowercased word tokens plus adjacent-pair bigrams. Shared by the hashing
/// embedder and the lexical overlap scorer so both see the same vocabulary.
pub fn tokenize(text: &str) -> Vec<String> {
	let words: Vec<String> =
		text.unicode_words().map(|word| word.to_lowercase()).collect();
	let mut tokens = words.clone();

	for pair in words.windows(2) {
		tokens.push(format!("{}_{}", pair[0], pair[1]));
	}

	tokens
}

/// Unigram word tokens only, for query-term overlap checks.
pub fn word_tokens(text: &str) -> Vec<String> {
	text.unicode_words().map(|word| word.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tokenizes_words_and_bigrams() {
		let tokens = tokenize("Infra Engineer, Remote");

		assert!(tokens.contains(&"infra".to_string()));
		assert!(tokens.contains(&"remote".to_string()));
		assert!(tokens.contains(&"infra_engineer".to_string()));
		assert!(tokens.contains(&"engineer_remote".to_string()));
	}

	#[test]
	fn empty_text_yields_no_tokens() {
		assert!(tokenize("").is_empty());
		assert!(word_tokens("  ").is_empty());
	}
}
