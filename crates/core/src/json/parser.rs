use crate::{
    error::{Result, SysEventError},
    json::char_filter::{CharClass, classify},
};

/// How a value was written, so it can be printed back the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Number,
    /// Verbatim `[...]` or `{...}` region.
    Raw,
}

/// One top-level pair. `value` holds the literal text without surrounding quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
    pub kind: ValueKind,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            kind,
        }
    }

    /// `"key":value`, quoting the value only when it is a string.
    ///
    /// Key and value are written as stored, without escaping.
    pub fn to_fragment(&self) -> String {
        match self.kind {
            ValueKind::String => format!("\"{}\":\"{}\"", self.key, self.value),
            ValueKind::Number | ValueKind::Raw => format!("\"{}\":{}", self.key, self.value),
        }
    }
}

/// Escapes `value` so it can sit between quotes in a flat-JSON string.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Print handler that writes every pair unchanged.
pub fn print_identity(kv: &mut KeyValue) -> Option<String> {
    Some(kv.to_fragment())
}

#[derive(Debug, Clone, Default)]
pub struct FlatJsonParser {
    kv_list: Vec<KeyValue>,
}

impl FlatJsonParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut parser = Self::new();
        parser.parse(json)?;
        Ok(parser)
    }

    /// Appends a string pair. `key` and `value` are literal text as it appears
    /// between the quotes, so callers pass them through [`escape`] first.
    pub fn append_string_value(&mut self, key: &str, value: &str) {
        self.kv_list
            .push(KeyValue::new(key, value, ValueKind::String));
    }

    /// `key` must already be escaped, as for [`append_string_value`](Self::append_string_value).
    pub fn append_u64_value(&mut self, key: &str, value: u64) {
        self.kv_list
            .push(KeyValue::new(key, value.to_string(), ValueKind::Number));
    }

    pub fn append_i64_value(&mut self, key: &str, value: i64) {
        self.kv_list
            .push(KeyValue::new(key, value.to_string(), ValueKind::Number));
    }

    /// Parses `json` and appends its pairs.
    ///
    /// On error nothing from this call is appended; pairs from earlier
    /// calls are untouched.
    pub fn parse(&mut self, json: &str) -> Result<()> {
        let parsed = Cursor::new(json).parse_object()?;
        self.kv_list.extend(parsed);
        Ok(())
    }

    /// Runs `handler` over every pair and joins the fragments it returns.
    ///
    /// The handler may rewrite the stored pair in place; returning `None`
    /// leaves the pair out of the output.
    pub fn print<F>(&mut self, mut handler: F) -> String
    where
        F: FnMut(&mut KeyValue) -> Option<String>,
    {
        let mut out = String::from("{");
        let mut first = true;
        for kv in self.kv_list.iter_mut() {
            let Some(fragment) = handler(kv) else {
                continue;
            };
            if !first {
                out.push(',');
            }
            out.push_str(&fragment);
            first = false;
        }
        out.push('}');
        out
    }

    pub fn pairs(&self) -> &[KeyValue] {
        &self.kv_list
    }

    /// First pair stored under `key`.
    pub fn get(&self, key: &str) -> Option<&KeyValue> {
        self.kv_list.iter().find(|kv| kv.key == key)
    }

    pub fn len(&self) -> usize {
        self.kv_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kv_list.is_empty()
    }
}

struct Cursor<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn fail<T>(&self, reason: &'static str) -> Result<T> {
        Err(SysEventError::MalformedPayload {
            offset: self.pos,
            reason,
        })
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_ws(&mut self) {
        while let Some(b) = self.peek()
            && b.is_ascii_whitespace()
        {
            self.pos += 1;
        }
    }

    fn parse_object(mut self) -> Result<Vec<KeyValue>> {
        let mut parsed = Vec::new();
        self.skip_ws();
        if self.bump() != Some(b'{') {
            return self.fail("expected '{'");
        }
        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.pos += 1;
        } else {
            loop {
                self.skip_ws();
                let key = self.parse_key()?;
                self.skip_ws();
                if self.bump() != Some(b':') {
                    return self.fail("expected ':' after key");
                }
                self.skip_ws();
                parsed.push(self.parse_value(key)?);
                self.skip_ws();
                match self.bump() {
                    Some(b',') => continue,
                    Some(b'}') => break,
                    Some(_) => return self.fail("expected ',' or '}'"),
                    None => return self.fail("unterminated object"),
                }
            }
        }
        self.skip_ws();
        if self.peek().is_some() {
            return self.fail("trailing characters after object");
        }
        Ok(parsed)
    }

    fn parse_key(&mut self) -> Result<String> {
        if self.peek() != Some(b'"') {
            return self.fail("expected quoted key");
        }
        self.parse_string()
    }

    fn parse_value(&mut self, key: String) -> Result<KeyValue> {
        let Some(first) = self.peek() else {
            return self.fail("missing value");
        };
        match classify(first) {
            CharClass::Number => Ok(KeyValue::new(key, self.parse_number()?, ValueKind::Number)),
            CharClass::String => Ok(KeyValue::new(key, self.parse_string()?, ValueKind::String)),
            CharClass::Bracket => Ok(KeyValue::new(
                key,
                self.parse_brackets(first)?,
                ValueKind::Raw,
            )),
            CharClass::None => self.fail("unexpected character where a value is expected"),
        }
    }

    /// Consumes a quoted string and returns its content with escapes kept as written.
    fn parse_string(&mut self) -> Result<String> {
        self.pos += 1;
        let start = self.pos;
        loop {
            match self.bump() {
                Some(b'\\') => {
                    if self.bump().is_none() {
                        return self.fail("unterminated string");
                    }
                }
                Some(b'"') => return Ok(self.src[start..self.pos - 1].to_string()),
                Some(_) => {}
                None => return self.fail("unterminated string"),
            }
        }
    }

    fn parse_number(&mut self) -> Result<String> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        if self.skip_digits() == 0 {
            return self.fail("malformed number");
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            if self.skip_digits() == 0 {
                return self.fail("malformed number");
            }
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while let Some(b) = self.peek()
            && b.is_ascii_digit()
        {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Captures a balanced `[...]` or `{...}` region verbatim.
    fn parse_brackets(&mut self, left: u8) -> Result<String> {
        let right = if left == b'{' { b'}' } else { b']' };
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => return self.fail("unbalanced brackets"),
                Some(b'"') => {
                    self.parse_string()?;
                    continue;
                }
                Some(b) if b == left => depth += 1,
                Some(b) if b == right => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return Ok(self.src[start..self.pos].to_string());
                    }
                }
                Some(_) => {}
            }
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(json: &str) -> Vec<(String, String)> {
        FlatJsonParser::from_json(json)
            .expect("parse")
            .pairs()
            .iter()
            .map(|kv| (kv.key.clone(), kv.value.clone()))
            .collect()
    }

    #[test]
    fn appended_values_print_in_insertion_order() {
        let mut parser = FlatJsonParser::new();
        parser.append_string_value("domain", "AAFWK");
        parser.append_u64_value("pid", 1234);
        assert_eq!(
            parser.print(print_identity),
            r#"{"domain":"AAFWK","pid":1234}"#
        );
    }

    #[test]
    fn brackets_are_captured_verbatim() {
        assert_eq!(
            pairs(r#"{"a":[1,2,3],"b":"x"}"#),
            vec![
                ("a".to_string(), "[1,2,3]".to_string()),
                ("b".to_string(), "x".to_string())
            ]
        );
    }

    #[test]
    fn nested_same_kind_brackets_are_balanced() {
        let parsed = pairs(r#"{"o":{"x":{"y":1}},"l":[[1],[2,[3]]],"n":2}"#);
        assert_eq!(parsed[0].1, r#"{"x":{"y":1}}"#);
        assert_eq!(parsed[1].1, "[[1],[2,[3]]]");
        assert_eq!(parsed[2].1, "2");
    }

    #[test]
    fn brackets_inside_strings_do_not_count() {
        let parsed = pairs(r#"{"a":["]","[["]}"#);
        assert_eq!(parsed[0].1, r#"["]","[["]"#);
    }

    #[test]
    fn escaped_quotes_stay_in_string_value() {
        let parsed = pairs(r#"{"msg":"say \"hi\""}"#);
        assert_eq!(parsed[0].1, r#"say \"hi\""#);
    }

    #[test]
    fn escaped_value_parses_back_to_same_literal() {
        let mut parser = FlatJsonParser::new();
        parser.append_string_value("path", &escape("C:\\tmp \"x\"\n"));
        let printed = parser.print(print_identity);
        let reparsed = FlatJsonParser::from_json(&printed).expect("parse");
        assert_eq!(reparsed.pairs(), parser.pairs());
    }

    #[test]
    fn numbers_keep_literal_text() {
        let parsed = pairs(r#"{"a":-12,"b":3.25,"c":0}"#);
        assert_eq!(parsed[0].1, "-12");
        assert_eq!(parsed[1].1, "3.25");
        assert_eq!(parsed[2].1, "0");
    }

    #[test]
    fn whitespace_between_tokens_is_ignored() {
        let parsed = pairs("  { \"a\" : 1 ,\n \"b\" :\t\"x\" }  ");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].1, "x");
    }

    #[test]
    fn empty_object_parses_to_nothing() {
        let parser = FlatJsonParser::from_json("{}").expect("parse");
        assert!(parser.is_empty());
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        let cases = [
            r#"{"a":"x"#,
            r#"{"a":[1,2}"#,
            r#"{"a":tru}"#,
            r#"{"a":1."#,
            r#"{"a" 1}"#,
            r#"{"a":1"#,
            r#"{a:1}"#,
            r#"{"a":1} x"#,
            r#"[1,2]"#,
            "",
        ];
        for case in cases {
            let err = FlatJsonParser::from_json(case).expect_err(case);
            assert!(
                matches!(err, SysEventError::MalformedPayload { .. }),
                "{case}: {err:?}"
            );
        }
    }

    #[test]
    fn failed_parse_keeps_earlier_pairs_only() {
        let mut parser = FlatJsonParser::new();
        parser.parse(r#"{"a":1}"#).expect("first parse");
        assert!(parser.parse(r#"{"b":2,"c":"#).is_err());
        assert_eq!(parser.len(), 1);
        assert_eq!(parser.pairs()[0].key, "a");
    }

    #[test]
    fn handler_can_rewrite_and_drop_pairs() {
        let mut parser = FlatJsonParser::from_json(r#"{"a":1,"secret":"s","b":"x"}"#)
            .expect("parse");
        let out = parser.print(|kv| {
            if kv.key == "secret" {
                return None;
            }
            if kv.key == "a" {
                kv.value = "2".to_string();
            }
            Some(kv.to_fragment())
        });
        assert_eq!(out, r#"{"a":2,"b":"x"}"#);
        assert_eq!(parser.get("a").map(|kv| kv.value.as_str()), Some("2"));
    }
}
