//! Decklist parsing (spec §4.8): each line is `<count> <name>`, optionally
//! prefixed with `SB:` for the sideboard. Blank lines and `//`/`#` comments
//! are ignored. Invalid lines become warnings rather than parse failures —
//! the validator always returns a result, it never raises (spec §4.8
//! "Failure semantics").

use stack_sage_contracts::Deck;

/// Parses `text` into a [`Deck`] plus any line-level warnings. `format` and
/// `commander` are supplied by the caller (spec §6 deck-validate input
/// shape); this function only turns lines into mainboard/sideboard counts.
pub fn parse_decklist(text: &str, format: &str, commander: Option<&str>) -> (Deck, Vec<String>) {
    let mut deck = Deck {
        format: format.to_string(),
        commander: commander.map(str::to_string),
        ..Deck::default()
    };
    let mut warnings = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with("//") || line.starts_with('#') {
            continue;
        }

        let (is_sideboard, rest) = match line.strip_prefix("SB:") {
            Some(rest) => (true, rest.trim()),
            None => (false, line),
        };

        match parse_count_and_name(rest) {
            Some((count, name)) => {
                let bucket = if is_sideboard { &mut deck.sideboard } else { &mut deck.mainboard };
                *bucket.entry(name).or_insert(0) += count;
            }
            None => {
                warnings.push(format!("could not parse decklist line: \"{raw_line}\""));
            }
        }
    }

    (deck, warnings)
}

fn parse_count_and_name(line: &str) -> Option<(u32, String)> {
    let mut parts = line.splitn(2, char::is_whitespace);
    let count_str = parts.next()?.trim();
    let name = parts.next()?.trim();
    if name.is_empty() {
        return None;
    }
    let count: u32 = count_str.parse().ok()?;
    if count == 0 {
        return None;
    }
    Some((count, name.to_string()))
}

/// Renders a [`Deck`] back into decklist text. Round-trips through
/// [`parse_decklist`] for any deck produced by it (spec §8 idempotence):
/// `parse_decklist(serialize_decklist(deck)) == deck` up to map ordering,
/// which `Deck`'s `HashMap` fields already treat as insignificant.
pub fn serialize_decklist(deck: &Deck) -> String {
    let mut lines = Vec::new();
    let mut mainboard: Vec<_> = deck.mainboard.iter().collect();
    mainboard.sort_by(|a, b| a.0.cmp(b.0));
    for (name, count) in mainboard {
        lines.push(format!("{count} {name}"));
    }
    let mut sideboard: Vec<_> = deck.sideboard.iter().collect();
    sideboard.sort_by(|a, b| a.0.cmp(b.0));
    for (name, count) in sideboard {
        lines.push(format!("SB: {count} {name}"));
    }
    lines.join("\n")
}
