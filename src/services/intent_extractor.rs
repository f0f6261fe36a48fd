//! Rule-based intent extraction.
//!
//! Splits user text into clauses and turns each clause into one [`Task`]
//! with keyword and regex matching. Anything the rules cannot find falls
//! back to a fixed default instead of failing, so the output is fully
//! deterministic for a given input.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::models::{Action, Priority, SwarmIntent, Task};

/// Amount used when a clause contains no recognizable number.
pub const DEFAULT_AMOUNT: &str = "100";
/// Protocol used when a clause names none.
pub const DEFAULT_PROTOCOL: &str = "Aave";
/// Asset used when a clause names none.
pub const DEFAULT_ASSET: &str = "USDC";

/// Assets the parser recognizes, in lookup order.
pub const KNOWN_ASSETS: [&str; 5] = ["USDC", "ETH", "DAI", "WETH", "USDT"];

const CLAUSE_SEPARATORS: [&str; 2] = [" and ", ", "];

const NUMBER: &str = r"(\d+(?:,\d{3})*(?:\.\d+)?)";

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("built-in pattern is valid")
}

/// Amount patterns, tried in order; the first match wins.
static AMOUNT_PATTERNS: Lazy<[Regex; 5]> = Lazy::new(|| {
    [
        pattern(&format!(r"(?i){NUMBER}\s*(?:usdc|eth|dai|weth|usdt)\b")),
        pattern(&format!(r"\$\s*{NUMBER}")),
        pattern(&format!(r"(?i)\binvest\s+{NUMBER}")),
        pattern(&format!(r"(?i){NUMBER}\s+(?:in|into|on|to)\s+\w")),
        pattern(NUMBER),
    ]
});

static ASSET_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    KNOWN_ASSETS
        .iter()
        .map(|asset| (*asset, pattern(&format!(r"(?i)\b{asset}\b"))))
        .collect()
});

static CONDITION_PATTERNS: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        pattern(r"(?i)\b(?:if|when|once)\b[^,;.]*"),
        pattern(r"(?i)\bevery\s+(?:\d+\s+)?(?:minute|hour|day|week|month)s?\b|\b(?:hourly|daily|weekly|monthly)\b"),
        pattern(r"(?i)\b(?:below|above|under|over)\s+\$?\d+(?:\.\d+)?"),
        pattern(r"(?i)\b(?:(?:highest|best|max(?:imum)?)\s+)?apy\b"),
    ]
});

/// Named protocols, checked before the generic category words.
pub const NAMED_PROTOCOLS: [(&str, &str); 6] = [
    ("aave", "Aave"),
    ("compound", "Compound"),
    ("uniswap", "Uniswap"),
    ("lido", "Lido"),
    ("yearn", "Yearn"),
    ("curve", "Curve"),
];

pub const GENERIC_PROTOCOLS: [(&str, &str); 6] = [
    ("defi", "Aave"),
    ("yield", "Aave"),
    ("lending", "Aave"),
    ("liquidity", "Uniswap"),
    ("swap", "Uniswap"),
    ("staking", "Lido"),
];

static ACTION_PATTERNS: Lazy<Vec<(Regex, Action)>> = Lazy::new(|| {
    [
        (r"(?i)\b(?:swap|exchange)", Action::Swap),
        (r"(?i)\b(?:snipe|buy)", Action::Snipe),
        (r"(?i)\b(?:vote|govern)", Action::Vote),
        (r"(?i)\b(?:post|social)", Action::Post),
        (r"(?i)\b(?:yield|farm)", Action::Yield),
        (r"(?i)\b(?:dca|average)", Action::Dca),
        (r"(?i)\brebalanc", Action::Rebalance),
    ]
    .into_iter()
    .map(|(source, action)| (pattern(source), action))
    .collect()
});

/// Split text on the literal clause separators `" and "` and `", "`.
///
/// Empty segments are dropped. Text without any separator comes back as a
/// single clause; blank text yields no clauses.
pub fn split_clauses(text: &str) -> Vec<String> {
    let mut clauses = vec![text.to_string()];
    for separator in CLAUSE_SEPARATORS {
        clauses = clauses
            .iter()
            .flat_map(|clause| clause.split(separator))
            .map(str::to_string)
            .collect();
    }

    clauses
        .into_iter()
        .map(|clause| clause.trim().to_string())
        .filter(|clause| !clause.is_empty())
        .collect()
}

/// First amount found by the ordered patterns, thousands separators removed.
pub fn extract_amount(clause: &str) -> Option<String> {
    AMOUNT_PATTERNS.iter().find_map(|re| {
        re.captures(clause)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().replace(',', ""))
    })
}

pub fn detect_protocol(clause: &str) -> &'static str {
    let lower = clause.to_lowercase();
    NAMED_PROTOCOLS
        .iter()
        .chain(GENERIC_PROTOCOLS.iter())
        .find(|(keyword, _)| lower.contains(*keyword))
        .map_or(DEFAULT_PROTOCOL, |&(_, name)| name)
}

pub fn detect_asset(clause: &str) -> &'static str {
    ASSET_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(clause))
        .map_or(DEFAULT_ASSET, |&(asset, _)| asset)
}

pub fn detect_action(clause: &str) -> Action {
    ACTION_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(clause))
        .map_or(Action::Invest, |(_, action)| *action)
}

/// Free-text condition labels (triggers, schedules, thresholds), de-duplicated.
pub fn extract_conditions(clause: &str) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for re in CONDITION_PATTERNS.iter() {
        for m in re.find_iter(clause) {
            let label = m.as_str().trim().to_lowercase();
            if !label.is_empty() && !labels.contains(&label) {
                labels.push(label);
            }
        }
    }
    labels
}

pub fn requires_zk(clause: &str) -> bool {
    let lower = clause.to_lowercase();
    ["zk", "secure", "private"]
        .iter()
        .any(|keyword| lower.contains(*keyword))
}

/// Build one task from one clause.
pub fn extract_task(clause: &str, id: usize) -> Task {
    Task {
        id,
        action: detect_action(clause),
        asset: detect_asset(clause).to_string(),
        target: detect_protocol(clause).to_string(),
        amount: extract_amount(clause).unwrap_or_else(|| DEFAULT_AMOUNT.to_string()),
        conditions: extract_conditions(clause),
        requires_zk: requires_zk(clause),
        target_address: None,
    }
}

/// Rule-based parse of a whole message into a swarm intent.
pub fn extract_intent(text: &str) -> SwarmIntent {
    let tasks = split_clauses(text)
        .iter()
        .enumerate()
        .map(|(index, clause)| extract_task(clause, index + 1))
        .collect();

    SwarmIntent::new(text.trim(), tasks, Priority::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_with_currency_suffix() {
        assert_eq!(extract_amount("invest 12 USDC in aave"), Some("12".to_string()));
        assert_eq!(extract_amount("put 0.5 eth to work"), Some("0.5".to_string()));
    }

    #[test]
    fn test_amount_pattern_precedence() {
        // currency suffix beats a dollar amount appearing earlier
        assert_eq!(extract_amount("$5 fee, then 40 DAI"), Some("40".to_string()));
        assert_eq!(extract_amount("spend $25 on memes"), Some("25".to_string()));
        assert_eq!(extract_amount("invest 300 now"), Some("300".to_string()));
        assert_eq!(extract_amount("put 75 in DeFi"), Some("75".to_string()));
        assert_eq!(extract_amount("proposal 7"), Some("7".to_string()));
    }

    #[test]
    fn test_amount_strips_thousands_separator() {
        assert_eq!(extract_amount("deposit 1,000 USDC"), Some("1000".to_string()));
    }

    #[test]
    fn test_missing_amount_defaults() {
        let task = extract_task("farm the best yield", 1);
        assert_eq!(task.amount, DEFAULT_AMOUNT);
    }

    #[test]
    fn test_protocol_mapping() {
        assert_eq!(detect_protocol("lend on Compound"), "Compound");
        assert_eq!(detect_protocol("provide liquidity"), "Uniswap");
        assert_eq!(detect_protocol("staking rewards"), "Lido");
        assert_eq!(detect_protocol("curve pools"), "Curve");
        assert_eq!(detect_protocol("something else"), DEFAULT_PROTOCOL);
    }

    #[test]
    fn test_named_protocol_beats_generic_word() {
        assert_eq!(detect_protocol("swap on curve"), "Curve");
    }

    #[test]
    fn test_asset_detection_is_whole_word() {
        assert_eq!(detect_asset("buy some weth"), "WETH");
        assert_eq!(detect_asset("swap dai"), "DAI");
        assert_eq!(detect_asset("ethereum is nice"), DEFAULT_ASSET);
    }

    #[test]
    fn test_action_keywords() {
        assert_eq!(detect_action("exchange tokens"), Action::Swap);
        assert_eq!(detect_action("buy the dip"), Action::Snipe);
        assert_eq!(detect_action("governance proposal"), Action::Vote);
        assert_eq!(detect_action("social update"), Action::Post);
        assert_eq!(detect_action("farm CRV"), Action::Yield);
        assert_eq!(detect_action("dollar cost average"), Action::Dca);
        assert_eq!(detect_action("rebalance my portfolio"), Action::Rebalance);
        assert_eq!(detect_action("put money to work"), Action::Invest);
    }

    #[test]
    fn test_zk_flag() {
        assert!(requires_zk("swap privately via zk"));
        assert!(requires_zk("keep it secure"));
        assert!(!requires_zk("swap 5 ETH"));
    }

    #[test]
    fn test_conditions_collected() {
        let conditions = extract_conditions("buy ETH if price drops below 2000, weekly");
        assert_eq!(
            conditions,
            vec![
                "if price drops below 2000".to_string(),
                "weekly".to_string(),
                "below 2000".to_string(),
            ]
        );
        assert!(extract_conditions("swap 5 ETH").is_empty());
    }

    #[test]
    fn test_split_on_and_and_comma() {
        assert_eq!(
            split_clauses("invest 50 USDC and vote on proposal 1"),
            vec!["invest 50 USDC", "vote on proposal 1"]
        );
        assert_eq!(split_clauses("a, b and c").len(), 3);
        assert!(split_clauses("   ").is_empty());
        assert_eq!(split_clauses("swap 5 ETH"), vec!["swap 5 ETH"]);
    }

    #[test]
    fn test_two_clause_intent() {
        let intent = extract_intent("invest 50 USDC and vote on proposal 1");
        assert_eq!(intent.tasks.len(), 2);
        assert_eq!(intent.tasks[0].action, Action::Invest);
        assert_eq!(intent.tasks[0].amount, "50");
        assert_eq!(intent.tasks[1].action, Action::Vote);
        assert!(intent.is_bundle());
        assert_eq!(intent.priority, Priority::Efficiency);
        assert_eq!(intent.goal, "invest 50 USDC and vote on proposal 1");
    }
}
