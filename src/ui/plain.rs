//! Non-interactive output for `--print`.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use super::row_text;
use crate::store::ReviewerState;

#[derive(Debug, Serialize)]
struct ReviewerRow<'a> {
    login: &'a str,
    count: usize,
}

pub fn write_rows(out: &mut impl Write, state: &ReviewerState) -> Result<()> {
    for (login, count) in state.rows() {
        writeln!(out, "{}", row_text(login, count))?;
    }
    Ok(())
}

pub fn write_json(out: &mut impl Write, state: &ReviewerState) -> Result<()> {
    let rows: Vec<ReviewerRow> = state
        .rows()
        .map(|(login, count)| ReviewerRow { login, count })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &rows)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reviewer::ReviewRequestRecord;
    use crate::store::{Action, reduce};

    fn loaded_state() -> ReviewerState {
        let mut state = ReviewerState::default();
        reduce(&mut state, Action::RequestFetch);
        reduce(
            &mut state,
            Action::FetchCompleted(Ok(vec![
                ReviewRequestRecord::from_logins(["hoge", "kalupas"]),
                ReviewRequestRecord::from_logins(["hoge"]),
            ])),
        );
        state
    }

    #[test]
    fn rows_print_in_first_seen_order() {
        let mut out = Vec::new();
        write_rows(&mut out, &loaded_state()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "hoge — 2\nkalupas — 1\n");
    }

    #[test]
    fn json_is_an_array_of_login_and_count() {
        let mut out = Vec::new();
        write_json(&mut out, &loaded_state()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"login": "hoge", "count": 2},
                {"login": "kalupas", "count": 1}
            ])
        );
    }

    #[test]
    fn empty_state_prints_nothing() {
        let mut out = Vec::new();
        write_rows(&mut out, &ReviewerState::default()).unwrap();
        assert!(out.is_empty());
    }
}
