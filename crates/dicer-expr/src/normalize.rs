//! Input normalization ahead of tokenizing.
//!
//! Chat input arrives with full-width punctuation from CJK input methods and
//! with dice shorthand (`d`, `d%`, `3d`, `d(1+1)`). [`preprocess`] folds both
//! into the canonical ASCII form the lexer understands.

/// Fold a single full-width or CJK punctuation character to its ASCII form.
///
/// The full-width colon is treated as division, as it is the character most
/// input methods produce in place of `/`.
pub fn fold_char(c: char) -> char {
    match c {
        '（' | '【' | '〔' | '［' | '｛' | '「' | '『' | '[' | '{' => '(',
        '）' | '】' | '〕' | '］' | '｝' | '」' | '』' | ']' | '}' => ')',
        '＋' => '+',
        '－' => '-',
        '＊' | '×' => '*',
        '／' | '÷' | '：' => '/',
        '％' => '%',
        'D' | 'ｄ' | 'Ｄ' => 'd',
        '　' => ' ',
        other => other,
    }
}

/// Normalize raw user text into a canonical dice expression.
///
/// - full-width brackets and operators become ASCII (see [`fold_char`])
/// - `d%` becomes `d100`
/// - a `d` without a left operand gets `1` inserted
/// - a `d` without a right operand (a number or `(`, whitespace skipped) gets
///   `default_faces` inserted
/// - a leading `+`/`-`, or one right after `(`, gets a `0` operand
pub fn preprocess(raw: &str, default_faces: u32) -> String {
    let folded: String = raw.chars().map(fold_char).collect();
    let folded = folded.replace("d%", "d100");
    let chars: Vec<char> = folded.chars().collect();
    let faces = default_faces.to_string();

    let mut out = String::with_capacity(chars.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        match c {
            'd' => {
                if !matches!(last_significant(&out), Some(p) if p.is_ascii_digit() || p == ')') {
                    out.push('1');
                }
                out.push('d');
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some(n) if n.is_ascii_digit() || *n == '(') {
                    out.push_str(&faces);
                }
            }
            '+' | '-' => {
                if matches!(last_significant(&out), None | Some('(')) {
                    out.push('0');
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn last_significant(s: &str) -> Option<char> {
    s.chars().rev().find(|c| !c.is_whitespace())
}
