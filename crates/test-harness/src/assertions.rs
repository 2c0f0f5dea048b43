//! Assertion helpers with diagnostic output.
//!
//! Every failure includes expected vs actual plus the session snapshot.

use label_engine::Session;

use crate::helpers::HarnessError;

fn failure(session: &Session, ctx: &str, detail: String) -> HarnessError {
    let snapshot = session.snapshot();
    HarnessError::AssertionFailed {
        detail: format!(
            "[{}] {}\n  names: {:?}\n  counts: {:?} (total {})\n  mode: {}",
            ctx,
            detail,
            snapshot.names,
            snapshot.counts,
            snapshot.total_faces,
            session.mode(),
        ),
    }
}

/// Assert per-category counts.
pub fn assert_counts_eq(session: &Session, expected: &[usize], ctx: &str) -> Result<(), HarnessError> {
    let actual = &session.statistics().counts;
    if actual.as_slice() == expected {
        Ok(())
    } else {
        Err(failure(
            session,
            ctx,
            format!("expected counts {:?}, got {:?}", expected, actual),
        ))
    }
}

/// Assert the current label vector.
pub fn assert_labels_eq(session: &Session, expected: &[usize], ctx: &str) -> Result<(), HarnessError> {
    match session.labels() {
        Some(actual) if actual == expected => Ok(()),
        Some(actual) => {
            let first = actual
                .iter()
                .zip(expected)
                .position(|(a, e)| a != e)
                .unwrap_or(actual.len().min(expected.len()));
            Err(failure(
                session,
                ctx,
                format!(
                    "labels differ at face {}: expected {} labels {:?}, got {} labels {:?}",
                    first,
                    expected.len(),
                    expected,
                    actual.len(),
                    actual
                ),
            ))
        }
        None => Err(failure(
            session,
            ctx,
            format!("expected labels {:?}, session has no result", expected),
        )),
    }
}

/// Assert category names in order.
pub fn assert_taxonomy_names(
    session: &Session,
    expected: &[&str],
    ctx: &str,
) -> Result<(), HarnessError> {
    let actual = session.taxonomy().names();
    if actual.iter().map(String::as_str).eq(expected.iter().copied()) {
        Ok(())
    } else {
        Err(failure(
            session,
            ctx,
            format!("expected names {:?}, got {:?}", expected, actual),
        ))
    }
}

/// Assert the geometry file names of the history records, oldest first.
pub fn assert_history_geometry(
    session: &Session,
    expected: &[&str],
    ctx: &str,
) -> Result<(), HarnessError> {
    let actual: Vec<String> = session
        .history()
        .iter()
        .map(|r| r.geometry_name().unwrap_or_else(|| "-".into()))
        .collect();
    if actual.iter().map(String::as_str).eq(expected.iter().copied()) {
        Ok(())
    } else {
        Err(failure(
            session,
            ctx,
            format!("expected history {:?}, got {:?}", expected, actual),
        ))
    }
}
