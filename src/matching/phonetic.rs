// src/matching/phonetic.rs - Simplified Kölner Phonetik for fuzzy name grouping

/// Encodes a name with a simplified Cologne phonetics table.
///
/// Umlauts are folded (`ä→a`, `ö→o`, `ü→u`, `ß→ss`) and `ph` is read as `f`
/// before encoding. Adjacent duplicate codes collapse to one, and the vowel
/// code `0` survives only in first position. Characters outside the table
/// (digits, punctuation, spaces) produce no code.
pub fn cologne_phonetics(name: &str) -> String {
    let prepared = name
        .to_lowercase()
        .replace('ä', "a")
        .replace('ö', "o")
        .replace('ü', "u")
        .replace('ß', "ss")
        .replace("ph", "f");
    let chars: Vec<char> = prepared.chars().collect();

    let mut raw = String::with_capacity(chars.len() * 2);
    for (i, &c) in chars.iter().enumerate() {
        let prev = if i > 0 { Some(chars[i - 1]) } else { None };
        let next = chars.get(i + 1).copied();
        if let Some(code) = char_code(c, prev, next, i == 0) {
            raw.push_str(code);
        }
    }

    let mut collapsed: Vec<char> = Vec::with_capacity(raw.len());
    for code in raw.chars() {
        if collapsed.last() != Some(&code) {
            collapsed.push(code);
        }
    }

    collapsed
        .iter()
        .enumerate()
        .filter(|(i, code)| *i == 0 || **code != '0')
        .map(|(_, code)| *code)
        .collect()
}

fn char_code(c: char, prev: Option<char>, next: Option<char>, at_start: bool) -> Option<&'static str> {
    let next_in = |set: &str| next.map_or(false, |n| set.contains(n));
    let prev_in = |set: &str| prev.map_or(false, |p| set.contains(p));

    let code = match c {
        'a' | 'e' | 'i' | 'j' | 'o' | 'u' | 'y' => "0",
        'h' => return None,
        'b' => "1",
        'p' => {
            if next == Some('h') {
                "3"
            } else {
                "1"
            }
        }
        'd' | 't' => {
            if next_in("csz") {
                "8"
            } else {
                "2"
            }
        }
        'f' | 'v' | 'w' => "3",
        'g' | 'k' | 'q' => "4",
        'c' => {
            if at_start {
                if next_in("ahkloqrux") {
                    "4"
                } else {
                    "8"
                }
            } else if prev_in("sz") {
                "8"
            } else if next_in("ahkoqux") {
                "4"
            } else {
                "8"
            }
        }
        'x' => {
            if prev_in("ckq") {
                "8"
            } else {
                "48"
            }
        }
        'l' => "5",
        'm' | 'n' => "6",
        'r' => "7",
        's' | 'z' => "8",
        _ => return None,
    };
    Some(code)
}
