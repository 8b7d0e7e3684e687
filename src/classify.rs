use std::sync::LazyLock;

use regex::Regex;

/// Derived role bucket for a listing title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    DataScientist,
    DataAnalyst,
    DataEngineer,
    MlEngineer,
    ActuarialAnalyst,
    Other,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::DataScientist => "Data Scientist",
            Role::DataAnalyst => "Data Analyst",
            Role::DataEngineer => "Data Engineer",
            Role::MlEngineer => "ML Engineer",
            Role::ActuarialAnalyst => "Actuarial Analyst",
            Role::Other => "Other",
        }
    }
}

struct Rule {
    role: Role,
    // Every pattern must match (against the lowercased title).
    patterns: &'static [&'static str],
}

// Evaluated top to bottom, first match wins. The actuarial patterns are
// unanchored on purpose: "actuarial"/"actuary" match as substrings, while
// all other rules require whole words ("data" must not match "database").
const RULE_TABLE: &[Rule] = &[
    Rule {
        role: Role::DataScientist,
        patterns: &[r"\bdata\b", r"\b(science|scientist)\b"],
    },
    Rule {
        role: Role::DataAnalyst,
        patterns: &[r"\bdata\b", r"\b(analyst|analysis)\b"],
    },
    Rule {
        role: Role::DataEngineer,
        patterns: &[r"\bdata\b", r"\b(engineering|engineer)\b"],
    },
    Rule {
        role: Role::MlEngineer,
        patterns: &[r"\b(machine|ml|ai)\b", r"\b(engineering|engineer|learning)\b"],
    },
    Rule {
        role: Role::ActuarialAnalyst,
        patterns: &[r"actuarial|actuary"],
    },
];

static RULES: LazyLock<Vec<(Role, Vec<Regex>)>> = LazyLock::new(|| {
    RULE_TABLE
        .iter()
        .map(|rule| {
            let compiled = rule
                .patterns
                .iter()
                .map(|p| Regex::new(p).unwrap())
                .collect();
            (rule.role, compiled)
        })
        .collect()
});

/// Map a listing title to its role bucket. Total over all inputs: a missing
/// or unmatched title is `Other`.
pub fn classify(title: Option<&str>) -> Role {
    let Some(title) = title else {
        return Role::Other;
    };
    let lower = title.to_lowercase();
    for (role, patterns) in RULES.iter() {
        if patterns.iter().all(|re| re.is_match(&lower)) {
            return *role;
        }
    }
    Role::Other
}

// ── Tests ──
