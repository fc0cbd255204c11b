//! Small text helpers used by the scorer.

/// True if unicode char belongs to CJK ideograph ranges.
/// Ideographs are scored one token per character since they are not space-delimited.
pub fn is_cjk(ch: char) -> bool {
  ('\u{4E00}'..='\u{9FFF}').contains(&ch)
    || ('\u{3400}'..='\u{4DBF}').contains(&ch)
    || ('\u{20000}'..='\u{2A6DF}').contains(&ch)
    || ('\u{2A700}'..='\u{2B73F}').contains(&ch)
    || ('\u{2B740}'..='\u{2B81F}').contains(&ch)
    || ('\u{2B820}'..='\u{2CEAF}').contains(&ch)
    || ('\u{F900}'..='\u{FAFF}').contains(&ch)
}

/// Lowercase and split into word tokens.
///
/// Runs of alphanumeric characters form one token; anything else separates tokens.
/// Each CJK ideograph is a token on its own.
pub fn tokenize(text: &str) -> Vec<String> {
  let mut out = Vec::new();
  let mut cur = String::new();
  for ch in text.chars() {
    if is_cjk(ch) {
      if !cur.is_empty() {
        out.push(std::mem::take(&mut cur));
      }
      out.push(ch.to_string());
    } else if ch.is_alphanumeric() {
      cur.extend(ch.to_lowercase());
    } else if !cur.is_empty() {
      out.push(std::mem::take(&mut cur));
    }
  }
  if !cur.is_empty() {
    out.push(cur);
  }
  out
}
