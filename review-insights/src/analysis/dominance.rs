//! Dominance flagging for ranked insight lists

use crate::analysis::types::Insight;

/// Mark whether the top insight clearly leads the list
///
/// With two or more insights the first is dominant iff its score exceeds the
/// runner-up's times `ratio`; a lone insight is always dominant. Every other
/// entry is cleared. An empty list is left alone.
pub fn apply_dominance(insights: &mut [Insight], ratio: f64) {
    let dominant = match insights {
        [] => return,
        [_] => true,
        [first, second, ..] => f64::from(first.score) > f64::from(second.score) * ratio,
    };

    for (i, insight) in insights.iter_mut().enumerate() {
        insight.is_dominant = i == 0 && dominant;
    }
}
