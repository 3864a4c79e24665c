use serde::{Deserialize, Serialize};

use crate::error::{Result, SysEventError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum RuleType {
    #[default]
    WholeWord = 1,
    Prefix = 2,
    /// `*` matches any run of characters.
    Regular = 3,
}

impl RuleType {
    pub fn matches(&self, pattern: &str, value: &str) -> bool {
        match self {
            RuleType::WholeWord => pattern == value,
            RuleType::Prefix => value.starts_with(pattern),
            RuleType::Regular => glob_match(pattern.as_bytes(), value.as_bytes()),
        }
    }
}

fn glob_match(pattern: &[u8], value: &[u8]) -> bool {
    let (mut p, mut v) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while v < value.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            backtrack = Some((p, v));
            p += 1;
        } else if p < pattern.len() && pattern[p] == value[v] {
            p += 1;
            v += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            v = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|b| *b == b'*')
}

/// Subscription filter as supplied by the caller.
///
/// A non-empty `tag` selects by tag and ignores domain and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerRule {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub rule_type: RuleType,
}

impl ListenerRule {
    pub fn new(domain: &str, event_name: &str, rule_type: RuleType) -> Self {
        Self {
            domain: domain.to_string(),
            event_name: event_name.to_string(),
            tag: String::new(),
            rule_type,
        }
    }

    pub fn with_tag(tag: &str, rule_type: RuleType) -> Self {
        Self {
            domain: String::new(),
            event_name: String::new(),
            tag: tag.to_string(),
            rule_type,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRule {
    pub domain: String,
    #[serde(default)]
    pub event_list: Vec<String>,
    #[serde(default)]
    pub rule_type: RuleType,
}

impl QueryRule {
    pub fn new(domain: &str, event_list: &[&str], rule_type: RuleType) -> Self {
        Self {
            domain: domain.to_string(),
            event_list: event_list.iter().map(|e| e.to_string()).collect(),
            rule_type,
        }
    }
}

/// Time window and result cap for a historical query. `-1` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryArg {
    pub begin_time: i64,
    pub end_time: i64,
    pub max_events: i32,
}

impl Default for QueryArg {
    fn default() -> Self {
        Self {
            begin_time: -1,
            end_time: -1,
            max_events: -1,
        }
    }
}

/// Listener rule in the shape the service expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SysEventRule {
    Tag {
        tag: String,
        rule_type: RuleType,
    },
    Event {
        domain: String,
        event_name: String,
        rule_type: RuleType,
    },
}

impl SysEventRule {
    /// An empty event name matches every event of the domain.
    pub fn matches(&self, domain: &str, event_name: &str, tag: &str) -> bool {
        match self {
            SysEventRule::Tag { tag: pattern, rule_type } => {
                !tag.is_empty() && rule_type.matches(pattern, tag)
            }
            SysEventRule::Event {
                domain: d,
                event_name: n,
                rule_type,
            } => rule_type.matches(d, domain) && (n.is_empty() || rule_type.matches(n, event_name)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysEventQueryRule {
    pub domain: String,
    pub event_list: Vec<String>,
    pub rule_type: RuleType,
}

impl SysEventQueryRule {
    /// An empty event list matches every event of the domain.
    pub fn matches(&self, domain: &str, event_name: &str) -> bool {
        self.rule_type.matches(&self.domain, domain)
            && (self.event_list.is_empty()
                || self
                    .event_list
                    .iter()
                    .any(|e| self.rule_type.matches(e, event_name)))
    }
}

pub fn convert_listener_rules(rules: &[ListenerRule]) -> Result<Vec<SysEventRule>> {
    rules
        .iter()
        .map(|rule| {
            if !rule.tag.is_empty() {
                return Ok(SysEventRule::Tag {
                    tag: rule.tag.clone(),
                    rule_type: rule.rule_type,
                });
            }
            if rule.domain.is_empty() {
                return Err(SysEventError::RuleConversion {
                    reason: format!("listener rule for name={:?} has no domain and no tag", rule.event_name),
                });
            }
            Ok(SysEventRule::Event {
                domain: rule.domain.clone(),
                event_name: rule.event_name.clone(),
                rule_type: rule.rule_type,
            })
        })
        .collect()
}

pub fn convert_query_rules(rules: &[QueryRule]) -> Result<Vec<SysEventQueryRule>> {
    rules
        .iter()
        .map(|rule| {
            if rule.domain.is_empty() {
                return Err(SysEventError::RuleConversion {
                    reason: "query rule has no domain".to_string(),
                });
            }
            Ok(SysEventQueryRule {
                domain: rule.domain.clone(),
                event_list: rule.event_list.clone(),
                rule_type: rule.rule_type,
            })
        })
        .collect()
}
