//! Primary key selection among candidate key definitions.

use crate::decision::{DecisionError, DecisionProvider};

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("No usable primary key candidate for table {0}")]
    MissingPrimaryKey(String),
    #[error("Selection {index} for table {table} is out of range (0-{})", .count - 1)]
    InvalidSelection {
        table: String,
        index: usize,
        count: usize,
    },
    #[error(transparent)]
    Decision(#[from] DecisionError),
}

/// Pick the primary key for `table` among `candidates` (already resolved to
/// column names). A single candidate is chosen automatically; more than one
/// defers to the decision provider. Returns the chosen index.
pub fn select_primary_key(
    table: &str,
    candidates: &[Vec<String>],
    provider: &mut dyn DecisionProvider,
) -> Result<usize, KeyError> {
    if candidates.is_empty() {
        return Err(KeyError::MissingPrimaryKey(table.to_string()));
    }

    let index = if candidates.len() == 1 {
        0
    } else {
        let rendered: Vec<String> = candidates.iter().map(|c| render_candidate(c)).collect();
        let index = provider.choose(table, &rendered)?;
        if index >= candidates.len() {
            return Err(KeyError::InvalidSelection {
                table: table.to_string(),
                index,
                count: candidates.len(),
            });
        }
        log::debug!("chose {} as primary key for {}", rendered[index], table);
        index
    };

    if candidates[index].is_empty() {
        return Err(KeyError::MissingPrimaryKey(table.to_string()));
    }
    Ok(index)
}

/// Human-readable rendering of one candidate, e.g. `(StaffNumber,Office_Name)`.
pub fn render_candidate(columns: &[String]) -> String {
    format!("({})", columns.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{Fixed, FirstCandidate};

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_candidate_is_automatic() {
        // A provider that would misbehave is never consulted.
        let candidates = vec![cols(&["SSN"])];
        let index = select_primary_key("Employee", &candidates, &mut Fixed(99)).unwrap();
        assert_eq!(index, 0);
    }

    #[test]
    fn test_provider_picks_among_several() {
        let candidates = vec![cols(&["SSN"]), cols(&["Email"])];
        let index = select_primary_key("Employee", &candidates, &mut Fixed(1)).unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn test_provider_sees_rendered_candidates() {
        struct Recording {
            calls: Vec<(String, Vec<String>)>,
        }
        impl crate::decision::DecisionProvider for Recording {
            fn choose(
                &mut self,
                table: &str,
                candidates: &[String],
            ) -> Result<usize, crate::decision::DecisionError> {
                self.calls.push((table.to_string(), candidates.to_vec()));
                Ok(1)
            }
        }

        let candidates = vec![cols(&["SSN"]), cols(&["Email"])];
        let mut provider = Recording { calls: vec![] };
        let index = select_primary_key("Employee", &candidates, &mut provider).unwrap();

        assert_eq!(index, 1);
        assert_eq!(
            provider.calls,
            vec![(
                "Employee".to_string(),
                vec!["(SSN)".to_string(), "(Email)".to_string()]
            )]
        );
    }

    #[test]
    fn test_out_of_range_selection_is_rejected() {
        let candidates = vec![cols(&["SSN"]), cols(&["Email"])];
        let err = select_primary_key("Employee", &candidates, &mut Fixed(2)).unwrap_err();
        assert!(matches!(
            err,
            KeyError::InvalidSelection { index: 2, count: 2, .. }
        ));
    }

    #[test]
    fn test_no_candidates_is_an_error() {
        let err = select_primary_key("Employee", &[], &mut FirstCandidate).unwrap_err();
        assert!(matches!(err, KeyError::MissingPrimaryKey(name) if name == "Employee"));
    }

    #[test]
    fn test_empty_chosen_candidate_is_an_error() {
        let candidates = vec![cols(&[])];
        let err = select_primary_key("Employee", &candidates, &mut FirstCandidate).unwrap_err();
        assert!(matches!(err, KeyError::MissingPrimaryKey(_)));
    }

    #[test]
    fn test_render_candidate() {
        assert_eq!(render_candidate(&cols(&["StaffNumber", "Office_Name"])), "(StaffNumber,Office_Name)");
    }
}
