//! Context overlap validation.

use std::collections::BTreeSet;
use tollgate_core::JobSpec;

use crate::OverlapError;

/// Check that no status context is reported by both the run set and the
/// skip set. A shared context would receive both a real result and a
/// "Skipped." status, whichever lands last winning.
pub fn validate_context_overlap(to_run: &[JobSpec], to_skip: &[JobSpec]) -> Result<(), OverlapError> {
    let run_contexts: BTreeSet<&str> = to_run.iter().map(|j| j.context.as_str()).collect();
    let skip_contexts: BTreeSet<&str> = to_skip.iter().map(|j| j.context.as_str()).collect();

    let overlap: Vec<String> = run_contexts
        .intersection(&skip_contexts)
        .map(|c| c.to_string())
        .collect();

    if overlap.is_empty() {
        Ok(())
    } else {
        Err(OverlapError { contexts: overlap })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jobs(contexts: &[&str]) -> Vec<JobSpec> {
        contexts
            .iter()
            .map(|c| JobSpec::new(format!("job-{}", c), *c))
            .collect()
    }

    #[test]
    fn test_empty_inputs() {
        assert!(validate_context_overlap(&[], &[]).is_ok());
    }

    #[test]
    fn test_one_side_empty() {
        assert!(validate_context_overlap(&jobs(&["foo"]), &[]).is_ok());
        assert!(validate_context_overlap(&[], &jobs(&["foo"])).is_ok());
    }

    #[test]
    fn test_disjoint_sets() {
        assert!(validate_context_overlap(&jobs(&["foo"]), &jobs(&["bar"])).is_ok());
    }

    #[test]
    fn test_complex_disjoint_sets() {
        let result =
            validate_context_overlap(&jobs(&["foo", "otherfoo"]), &jobs(&["bar", "otherbar"]));
        assert!(result.is_ok());
    }

    #[test]
    fn test_overlapping_sets() {
        let err = validate_context_overlap(&jobs(&["foo", "otherfoo"]), &jobs(&["bar", "otherfoo"]))
            .unwrap_err();
        assert_eq!(err.contexts, vec!["otherfoo"]);
    }

    #[test]
    fn test_identical_sets() {
        let err = validate_context_overlap(&jobs(&["foo", "otherfoo"]), &jobs(&["foo", "otherfoo"]))
            .unwrap_err();
        assert_eq!(err.contexts, vec!["foo", "otherfoo"]);
    }

    #[test]
    fn test_superset() {
        let result = validate_context_overlap(
            &jobs(&["foo", "otherfoo"]),
            &jobs(&["foo", "otherfoo", "thirdfoo"]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_subset() {
        let result =
            validate_context_overlap(&jobs(&["foo", "otherfoo", "thirdfoo"]), &jobs(&["thirdfoo"]));
        assert_eq!(result.unwrap_err().contexts, vec!["thirdfoo"]);
    }

    #[test]
    fn test_overlap_is_by_context_not_name() {
        let to_run = vec![JobSpec::new("first", "shared")];
        let to_skip = vec![JobSpec::new("second", "shared")];
        assert!(validate_context_overlap(&to_run, &to_skip).is_err());

        let to_run = vec![JobSpec::new("same", "one")];
        let to_skip = vec![JobSpec::new("same", "two")];
        assert!(validate_context_overlap(&to_run, &to_skip).is_ok());
    }
}
