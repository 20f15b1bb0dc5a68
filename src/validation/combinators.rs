//! Composable field-presence rules
//!
//! A [`Rule`] checks its input and hands the same input back on success, so
//! rules combined with [`all`] and [`any`] always agree on the pass-through
//! value: the validated input itself.

use super::error::RuleError;
use crate::models::Field;

/// A pass-through check over `T`
pub type Rule<T> = Box<dyn for<'a> Fn(&'a T) -> Result<&'a T, RuleError> + Send + Sync>;

/// Box a closure as a [`Rule`], pinning its higher-ranked signature
pub fn rule<T, F>(check: F) -> Rule<T>
where
    T: ?Sized + 'static,
    F: for<'a> Fn(&'a T) -> Result<&'a T, RuleError> + Send + Sync + 'static,
{
    Box::new(check)
}

/// Require every rule to pass, stopping at the first failure.
///
/// The first failing rule's error is returned unchanged. An empty rule list
/// accepts everything.
pub fn all<T: ?Sized + 'static>(rules: Vec<Rule<T>>) -> Rule<T> {
    rule(move |input| {
        let mut result = input;
        for check in &rules {
            result = check(input)?;
        }
        Ok(result)
    })
}

/// Accept the first rule that passes.
///
/// When every rule fails the errors are aggregated, in order, into
/// [`RuleError::NoneSatisfied`].
pub fn any<T: ?Sized + 'static>(rules: Vec<Rule<T>>) -> Rule<T> {
    rule(move |input| {
        let mut errors = Vec::with_capacity(rules.len());
        for check in &rules {
            match check(input) {
                Ok(result) => return Ok(result),
                Err(e) => errors.push(e),
            }
        }
        Err(RuleError::NoneSatisfied(errors))
    })
}

/// Require a field with the given name in a resource's field list
pub fn require_field(name: &'static str) -> Rule<[Field]> {
    rule(move |fields: &[Field]| {
        if fields.iter().any(|f| f.name == name) {
            Ok(fields)
        } else {
            Err(RuleError::Missing(name.to_string()))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fields(names: &[&str]) -> Vec<Field> {
        names.iter().map(|n| Field::new(*n, "string")).collect()
    }

    fn counting(counter: Arc<AtomicUsize>, pass: bool) -> Rule<[Field]> {
        rule(move |input| {
            counter.fetch_add(1, Ordering::SeqCst);
            if pass {
                Ok(input)
            } else {
                Err(RuleError::Missing("counted".to_string()))
            }
        })
    }

    #[test]
    fn test_all_passes_input_through() {
        let check = all(vec![require_field("amount"), require_field("id")]);
        let input = fields(&["id", "amount"]);
        let result = check(&input[..]).unwrap();
        assert_eq!(result, &input[..]);
    }

    #[test]
    fn test_all_short_circuits_on_first_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let check = all(vec![
            require_field("amount"),
            require_field("admin"),
            counting(calls.clone(), true),
        ]);

        let err = check(&fields(&["amount"])[..]).unwrap_err();
        assert_eq!(err, RuleError::Missing("admin".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_any_returns_first_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let check = any(vec![require_field("cofog"), counting(calls.clone(), true)]);

        assert!(check(&fields(&["cofog"])[..]).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(check(&fields(&["functionalID"])[..]).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_any_aggregates_all_failures_in_order() {
        let check = any(vec![require_field("economicID"), require_field("gfsmRevenue")]);
        let err = check(&fields(&["amount", "id"])[..]).unwrap_err();
        assert_eq!(
            err,
            RuleError::NoneSatisfied(vec![
                RuleError::Missing("economicID".to_string()),
                RuleError::Missing("gfsmRevenue".to_string()),
            ])
        );
    }

    #[test]
    fn test_empty_combinators() {
        let input = fields(&["amount"]);
        assert!(all::<[Field]>(Vec::new())(&input[..]).is_ok());
        assert_eq!(
            any::<[Field]>(Vec::new())(&input[..]).unwrap_err(),
            RuleError::NoneSatisfied(Vec::new())
        );
    }

    #[test]
    fn test_nested_combinators_propagate_aggregate_unchanged() {
        let check = all(vec![
            require_field("amount"),
            any(vec![require_field("functionalID"), require_field("cofog")]),
        ]);
        let err = check(&fields(&["amount"])[..]).unwrap_err();
        assert_eq!(err.missing_fields(), vec!["functionalID", "cofog"]);
    }
}
