// Judge0 language identifiers
// Pass-through configuration: the relay never interprets these beyond lookup

pub const LANGUAGES: &[(&str, u32)] = &[
    ("bash", 46),
    ("c", 50),
    ("cpp", 54),
    ("csharp", 51),
    ("go", 60),
    ("java", 62),
    ("javascript", 63),
    ("kotlin", 78),
    ("php", 68),
    ("python", 71),
    ("ruby", 72),
    ("rust", 73),
    ("typescript", 74),
];

/// Resolve a symbolic language name (case-insensitive) to its Judge0 id
pub fn language_id(name: &str) -> Option<u32> {
    let name = name.trim();
    LANGUAGES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, id)| *id)
}

pub fn language_name(id: u32) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(_, known)| *known == id)
        .map(|(name, _)| *name)
}
