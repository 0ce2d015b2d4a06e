use std::collections::HashMap;

/// Items present in `current` beyond what `baseline` already held
/// (multiset difference, order of `current` preserved).
pub fn purchased_items(baseline: &[String], current: &[String]) -> Vec<String> {
    let mut remaining: HashMap<&str, usize> = HashMap::new();
    for item in baseline {
        *remaining.entry(item.as_str()).or_insert(0) += 1;
    }

    let mut bought = Vec::new();
    for item in current {
        match remaining.get_mut(item.as_str()) {
            Some(n) if *n > 0 => *n -= 1,
            _ => bought.push(item.clone()),
        }
    }
    bought
}
