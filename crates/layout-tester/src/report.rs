//! Plain-text rendering of engine results.

use layout_engine::{ApplyReport, ReconcileReport, Resolution, Row, SectionOutcome};
use layout_prefs::Preferences;

/// One line per section outcome.
pub fn outcome_line(o: &SectionOutcome) -> String {
    let desired = match o.desired {
        Some(true) => "open",
        Some(false) => "closed",
        None => "-",
    };
    let what = match o.result {
        Ok(Resolution::AlreadySatisfied) => "already satisfied".to_string(),
        Ok(Resolution::Toggled { attempts }) => format!("toggled ({attempts} click(s))"),
        Ok(Resolution::Forced { attempts }) => format!("forced after {attempts} click(s)"),
        Ok(Resolution::SkippedHidden) => "skipped (hidden)".to_string(),
        Ok(Resolution::SkippedUnspecified) => "skipped (no preference)".to_string(),
        Err(f) => format!("FAILED: {}", f.reason()),
    };
    format!("{:<32} want={:<6} {}", o.title, desired, what)
}

/// Render a reconciliation report.
pub fn reconcile(label: &str, r: &ReconcileReport) -> String {
    let mut out = format!(
        "{label}: {} section(s), {} failed\n",
        r.outcomes.len(),
        r.failures().count()
    );
    for o in &r.outcomes {
        out.push_str("  ");
        out.push_str(&outcome_line(o));
        out.push('\n');
    }
    out
}

/// Render an apply report.
pub fn apply(r: Option<&ApplyReport>) -> String {
    let Some(r) = r else {
        return "not ready: no sections found\n".to_string();
    };
    format!(
        "order: {}\nmoved={} visibility_changes={} store_normalized={}\n",
        r.order.join(" | "),
        r.moved,
        r.visibility_changes,
        r.normalized
    )
}

/// Render surface rows.
pub fn rows(rows: &[Row]) -> String {
    rows.iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{i:>2}. {:<32} hide={} open={}\n",
                r.title, r.hidden, r.open
            )
        })
        .collect()
}

/// Render stored preferences.
pub fn prefs(p: &Preferences) -> String {
    let mut out = format!("order: {}\n", p.order.join(" | "));
    let hidden: Vec<&str> = p
        .hidden
        .iter()
        .filter(|(_, v)| **v)
        .map(|(k, _)| k.as_str())
        .collect();
    out.push_str(&format!("hidden: {}\n", hidden.join(" | ")));
    let open: Vec<&str> = p
        .open_by_title
        .iter()
        .filter(|(_, v)| **v)
        .map(|(k, _)| k.as_str())
        .collect();
    out.push_str(&format!("open: {}\n", open.join(" | ")));
    out
}

#[cfg(test)]
mod tests {
    use layout_engine::SectionFailure;

    use super::*;

    #[test]
    fn failure_lines_carry_reason() {
        let o = SectionOutcome {
            title: "Notes".into(),
            desired: Some(true),
            result: Err(SectionFailure::ForceDidNotTake {
                toggle_present: false,
            }),
        };
        let line = outcome_line(&o);
        assert!(line.starts_with("Notes"));
        assert!(line.ends_with("FAILED: no toggle found"));
    }

    #[test]
    fn not_ready_apply() {
        assert_eq!(apply(None), "not ready: no sections found\n");
    }
}
