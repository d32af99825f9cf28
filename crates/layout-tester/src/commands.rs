//! Subcommand implementations. Each returns the text to print.

use tokio::time::sleep;
use tracing::info;

use crate::{
    cli::{ApplyArgs, HostArgs, ReconcileArgs, StoreArgs, SurfaceArgs},
    error::{Error, Result},
    harness::{self, Harness},
    report,
};

/// `sections`: what discovery sees right now.
pub fn sections(args: &HostArgs) -> Result<String> {
    let h = Harness::open(args)?;
    let found = h.session.discover();
    if found.is_empty() {
        return Ok("no sections found\n".to_string());
    }
    let mut out = String::new();
    for (i, s) in found.iter().enumerate() {
        out.push_str(&format!(
            "{i:>2}. {:<32} toggle={} body={} open={}\n",
            s.title,
            yes_no(s.toggle.is_some()),
            yes_no(s.body.is_some()),
            h.session.read_open(s)
        ));
    }
    Ok(out)
}

/// `apply`: one applier run, optionally followed by the scheduled passes.
pub fn apply(args: &ApplyArgs) -> Result<String> {
    let h = Harness::open(&args.host)?;
    let applied = h.session.apply_order_and_visibility();
    let mut out = report::apply(applied.as_ref());
    if args.passes {
        let rt = harness::runtime()?;
        let reports = rt.block_on(async {
            let passes = h.session.apply_layout_once()?;
            Ok::<_, layout_engine::Error>(passes.join().await)
        })?;
        for (label, r) in ["early pass", "late pass"].iter().zip(&reports) {
            out.push_str(&report::reconcile(label, r));
        }
    }
    Ok(out)
}

/// `reconcile`: apply, wait, then one reconciliation pass.
pub fn reconcile(args: &ReconcileArgs) -> Result<String> {
    let h = Harness::open(&args.host)?;
    let applied = h.session.apply_order_and_visibility();
    let rt = harness::runtime()?;
    let r = rt.block_on(async {
        sleep(args.settle).await;
        h.session.reconcile_open_state().await
    });
    let mut out = report::apply(applied.as_ref());
    out.push_str(&report::reconcile("reconcile", &r));
    Ok(out)
}

/// `reset`: delete the stored record.
pub fn reset(args: &StoreArgs) -> Result<String> {
    let store = harness::store(args)?;
    store.reset()?;
    info!(key = store.key(), "preferences reset");
    Ok(format!("reset {}\n", store.key()))
}

/// `surface`: scripted edits through the reordering surface, then save.
pub fn surface(args: &SurfaceArgs) -> Result<String> {
    let h = Harness::open(&args.host)?;
    let mut surface = h.session.open_surface()?;
    if args.show_all {
        surface.show_all();
    }
    if args.open_none {
        surface.open_none();
    }
    for t in &args.hide {
        if !surface.set_hidden(t, true) {
            return Err(Error::UnknownRow(t.clone()));
        }
    }
    for t in &args.open {
        if !surface.set_open(t, true) {
            return Err(Error::UnknownRow(t.clone()));
        }
    }
    for m in &args.moves {
        if !surface.move_row(&m.title, m.index) {
            return Err(Error::UnknownRow(m.title.clone()));
        }
    }
    let mut out = report::rows(&surface.rows());

    let rt = harness::runtime()?;
    let reports = rt.block_on(async {
        let passes = h.session.commit(surface)?;
        Ok::<_, layout_engine::Error>(passes.join().await)
    })?;
    out.push_str("saved\n");
    out.push_str(&report::prefs(&h.session.store().load()));
    for r in &reports {
        out.push_str(&report::reconcile("pass", r));
    }
    Ok(out)
}

/// Short flag rendering.
fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}
