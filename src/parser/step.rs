use std::collections::BTreeMap;

use crate::error::ExtractionError;

const STEP_MAGIC: &str = "ISO-10303-21";

#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    String(String),
    Real(f64),
    Integer(i64),
    Boolean(bool),
    Enum(String),
    Reference(u64),
    List(Vec<StepValue>),
    Null,
    Derived,
}

impl StepValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StepValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_reference(&self) -> Option<u64> {
        match self {
            StepValue::Reference(id) => Some(*id),
            _ => None,
        }
    }

    /// Entity ids held by a list of references. Other items are skipped.
    #[must_use]
    pub fn references(&self) -> Vec<u64> {
        match self {
            StepValue::List(items) => items.iter().filter_map(StepValue::as_reference).collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepEntity {
    pub id: u64,
    /// Entity keyword as written in the file.
    pub entity_type: String,
    pub values: Vec<StepValue>,
}

impl StepEntity {
    #[must_use]
    pub fn is(&self, entity_type: &str) -> bool {
        self.entity_type.eq_ignore_ascii_case(entity_type)
    }
}

/// An in-memory STEP physical file (ISO 10303-21).
#[derive(Debug)]
pub struct StepFile {
    /// Entities keyed and ordered by their `#id`.
    pub entities: BTreeMap<u64, StepEntity>,
    pub schema: String,
}

impl StepFile {
    /// Parses STEP text.
    ///
    /// The content must open with the `ISO-10303-21;` magic and contain a
    /// `DATA;` section. Entity statements may span several lines. Complex
    /// entity instances (`#1=(A()B());`) are skipped.
    pub fn parse(content: &str) -> Result<Self, ExtractionError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();
        if !content.starts_with(STEP_MAGIC) {
            return Err(ExtractionError::Malformed(format!(
                "missing {STEP_MAGIC} header"
            )));
        }

        let mut entities = BTreeMap::new();
        let mut schema = String::new();
        let mut in_data = false;
        let mut saw_data = false;

        for statement in split_statements(content) {
            let statement = statement.trim();

            if statement.starts_with("FILE_SCHEMA") {
                if let Some(start) = statement.find('\'') {
                    if let Some(end) = statement[start + 1..].find('\'') {
                        schema = statement[start + 1..start + 1 + end].to_string();
                    }
                }
                continue;
            }

            if statement == "DATA" {
                in_data = true;
                saw_data = true;
                continue;
            }
            if statement == "ENDSEC" {
                in_data = false;
                continue;
            }

            if in_data && statement.starts_with('#') {
                if is_complex_instance(statement) {
                    continue;
                }
                let entity = Self::parse_entity(statement).ok_or_else(|| {
                    ExtractionError::Malformed(format!(
                        "invalid entity statement: {}",
                        truncate(statement, 80)
                    ))
                })?;
                if entities.insert(entity.id, entity).is_some() {
                    return Err(ExtractionError::Malformed(format!(
                        "duplicate entity id in statement: {}",
                        truncate(statement, 80)
                    )));
                }
            }
        }

        if !saw_data {
            return Err(ExtractionError::Malformed("missing DATA section".into()));
        }

        Ok(StepFile { entities, schema })
    }

    fn parse_entity(statement: &str) -> Option<StepEntity> {
        // Format: #123=IFCWALL('guid',#ref,'name',...)
        let (id_part, rest) = statement.split_once('=')?;
        let id: u64 = id_part.trim().strip_prefix('#')?.trim().parse().ok()?;

        let rest = rest.trim();
        let paren_pos = rest.find('(')?;
        let entity_type = rest[..paren_pos].trim();
        if entity_type.is_empty() {
            return None;
        }

        let values_str = rest[paren_pos + 1..].strip_suffix(')')?;

        Some(StepEntity {
            id,
            entity_type: entity_type.to_string(),
            values: Self::parse_values(values_str),
        })
    }

    fn parse_values(s: &str) -> Vec<StepValue> {
        let mut values = Vec::new();
        let mut current = String::new();
        let mut in_string = false;
        let mut paren_depth = 0usize;

        for ch in s.chars() {
            match ch {
                '\'' => {
                    in_string = !in_string;
                    current.push(ch);
                }
                '(' if !in_string => {
                    paren_depth += 1;
                    current.push(ch);
                }
                ')' if !in_string => {
                    paren_depth = paren_depth.saturating_sub(1);
                    current.push(ch);
                }
                ',' if !in_string && paren_depth == 0 => {
                    values.push(Self::parse_single_value(&current));
                    current.clear();
                }
                _ => current.push(ch),
            }
        }

        if !current.trim().is_empty() {
            values.push(Self::parse_single_value(&current));
        }

        values
    }

    fn parse_single_value(s: &str) -> StepValue {
        let s = s.trim();

        if s == "$" {
            return StepValue::Null;
        }
        if s == "*" {
            return StepValue::Derived;
        }
        if let Some(stripped) = s.strip_prefix('#') {
            if let Ok(id) = stripped.parse::<u64>() {
                return StepValue::Reference(id);
            }
        }
        if let Some(raw) = enclosed(s, '\'', '\'') {
            return StepValue::String(decode_step_string(raw));
        }
        if let Some(inner) = enclosed(s, '.', '.') {
            return match inner {
                "T" => StepValue::Boolean(true),
                "F" => StepValue::Boolean(false),
                _ => StepValue::Enum(inner.to_string()),
            };
        }
        if let Some(inner) = enclosed(s, '(', ')') {
            return StepValue::List(Self::parse_values(inner));
        }
        if let Ok(i) = s.parse::<i64>() {
            return StepValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return StepValue::Real(f);
        }
        // Typed value like IFCBOOLEAN(.T.)
        if let Some(paren_pos) = s.find('(') {
            if let Some(inner) = s[paren_pos + 1..].strip_suffix(')') {
                return Self::parse_single_value(inner);
            }
        }

        StepValue::String(s.to_string())
    }

    #[must_use]
    pub fn get_entity(&self, id: u64) -> Option<&StepEntity> {
        self.entities.get(&id)
    }

    /// Entities of one type, in id order.
    pub fn entities_of_type<'a>(
        &'a self,
        entity_type: &'a str,
    ) -> impl Iterator<Item = &'a StepEntity> + 'a {
        self.entities.values().filter(move |e| e.is(entity_type))
    }
}

/// Splits STEP text on `;` outside string literals, dropping `/* */` comments.
fn split_statements(content: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' => {
                in_string = !in_string;
                current.push(ch);
            }
            '/' if !in_string && chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            ';' if !in_string => {
                statements.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        statements.push(current);
    }

    statements
}

fn is_complex_instance(statement: &str) -> bool {
    statement
        .split_once('=')
        .is_some_and(|(_, rest)| rest.trim_start().starts_with('('))
}

/// Inner text of `s` when it is wrapped in `open`..`close`.
fn enclosed(s: &str, open: char, close: char) -> Option<&str> {
    if s.len() < 2 {
        return None;
    }
    s.strip_prefix(open)?.strip_suffix(close)
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Decode STEP/IFC encoded strings with Unicode escape sequences.
/// Supports:
/// - `\X2\XXXX\X0\` - 2-byte Unicode (BMP), can have multiple 4-char hex codes
/// - `\X\XX` - 1-byte ISO 8859-1
/// - `\S\X` - ISO 8859-1 high half
/// - `\\` - escaped backslash
/// - `''` - escaped apostrophe
fn decode_step_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.peek() {
                Some('X') => {
                    chars.next();
                    match chars.peek() {
                        Some('2') => {
                            chars.next(); // '2'
                            chars.next(); // '\'

                            let mut hex = String::new();
                            while let Some(&c) = chars.peek() {
                                if c == '\\' {
                                    break;
                                }
                                hex.push(c);
                                chars.next();
                            }
                            // Skip the closing \X0\
                            if chars.peek() == Some(&'\\') {
                                for _ in 0..4 {
                                    chars.next();
                                }
                            }
                            for chunk in hex.as_bytes().chunks(4) {
                                let decoded = std::str::from_utf8(chunk)
                                    .ok()
                                    .and_then(|s| u32::from_str_radix(s, 16).ok())
                                    .and_then(char::from_u32);
                                if let Some(c) = decoded {
                                    result.push(c);
                                }
                            }
                        }
                        Some('\\') => {
                            chars.next();
                            let hex: String = chars.by_ref().take(2).collect();
                            if let Ok(code) = u8::from_str_radix(&hex, 16) {
                                result.push(char::from(code));
                            }
                        }
                        _ => result.push_str("\\X"),
                    }
                }
                Some('\\') => {
                    chars.next();
                    result.push('\\');
                }
                Some('S') => {
                    chars.next(); // 'S'
                    chars.next(); // '\'
                    if let Some(c) = chars.next() {
                        let shifted = u8::try_from(c).ok().and_then(|b| b.checked_add(128));
                        result.push(shifted.map_or(c, char::from));
                    }
                }
                _ => result.push('\\'),
            }
        } else if ch == '\'' {
            // '' is an escaped apostrophe
            if chars.peek() == Some(&'\'') {
                chars.next();
            }
            result.push('\'');
        } else {
            result.push(ch);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = "ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCWALL('2O2Fr$t4X7Zf8NOew3FLOH',$,'Wall; north',$,$,#5,#6,'W-01');
#2=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);
#3=IFCRELDEFINESBYPROPERTIES('1xS3BCk291UvhgP2a6eflK',$,$,$,
  (#1,#4),#7);
ENDSEC;
END-ISO-10303-21;
";

    #[test]
    fn parses_entities_and_schema() {
        let file = StepFile::parse(MINIMAL).unwrap();
        assert_eq!(file.schema, "IFC4");
        assert_eq!(file.entities.len(), 3);

        let wall = file.get_entity(1).unwrap();
        assert_eq!(wall.entity_type, "IFCWALL");
        assert_eq!(wall.values[2], StepValue::String("Wall; north".into()));
        assert_eq!(wall.values[5], StepValue::Reference(5));
        assert_eq!(wall.values[7], StepValue::String("W-01".into()));

        let prop = file.get_entity(2).unwrap();
        assert_eq!(prop.values[2], StepValue::Boolean(true));
    }

    #[test]
    fn statements_may_span_lines() {
        let file = StepFile::parse(MINIMAL).unwrap();
        let rel = file.get_entity(3).unwrap();
        assert_eq!(rel.values[4].references(), vec![1, 4]);
        assert_eq!(rel.values[5].as_reference(), Some(7));
    }

    #[test]
    fn rejects_missing_header_or_data() {
        assert!(matches!(
            StepFile::parse("hello world"),
            Err(ExtractionError::Malformed(_))
        ));
        assert!(matches!(
            StepFile::parse("ISO-10303-21;\nHEADER;\nENDSEC;\nEND-ISO-10303-21;"),
            Err(ExtractionError::Malformed(msg)) if msg.contains("DATA")
        ));
    }

    #[test]
    fn rejects_broken_entity_statements() {
        for bad in ["#1=IFCWALL(", "#x=IFCWALL();", "#1=('a');"] {
            let content = format!("ISO-10303-21;\nDATA;\n{bad}\nENDSEC;\n");
            let result = StepFile::parse(&content);
            // complex instance is skipped, the rest are malformed
            if bad.contains("=(") {
                assert!(result.unwrap().entities.is_empty());
            } else {
                assert!(result.is_err(), "Accepted {bad:?}");
            }
        }
    }

    #[test]
    fn rejects_duplicate_ids() {
        let content = "ISO-10303-21;\nDATA;\n#1=IFCWALL();\n#1=IFCSLAB();\nENDSEC;\n";
        assert!(StepFile::parse(content).is_err());
    }

    #[test]
    fn skips_comments() {
        let content = "ISO-10303-21;\nDATA;\n/* #9=BROKEN( ; */\n#1=IFCBEAM('x');\nENDSEC;\n";
        let file = StepFile::parse(content).unwrap();
        assert_eq!(file.entities.len(), 1);
    }

    #[test]
    fn parses_nested_lists_with_quoted_separators() {
        let values = StepFile::parse_values("('a,b','c)'),.NOTDEFINED.,1.5E3,-2,*,$");
        assert_eq!(
            values,
            vec![
                StepValue::List(vec![
                    StepValue::String("a,b".into()),
                    StepValue::String("c)".into()),
                ]),
                StepValue::Enum("NOTDEFINED".into()),
                StepValue::Real(1500.0),
                StepValue::Integer(-2),
                StepValue::Derived,
                StepValue::Null,
            ]
        );
    }

    #[test]
    fn short_tokens_do_not_panic() {
        for token in ["'", ".", "(", ")", ""] {
            let _ = StepFile::parse_single_value(token);
        }
    }

    #[test]
    fn decodes_escaped_strings() {
        assert_eq!(decode_step_string("\\X2\\00F3\\X0\\w"), "ów");
        assert_eq!(decode_step_string("\\X\\E9"), "é");
        assert_eq!(decode_step_string("it''s"), "it's");
        assert_eq!(decode_step_string("a\\\\b"), "a\\b");
    }
}
