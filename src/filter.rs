//! Exact-match task filtering.
//!
//! A `FilterCriteria` holds up to four optional constraints. A task matches when
//! it satisfies every constraint that is present; absent constraints always pass.

use std::collections::HashSet;

use crate::fields::Priority;
use crate::task::Task;

/// Optional exact-match constraints used to narrow a task collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub sector: Option<String>,
    pub priority: Option<Priority>,
    pub assignee_name: Option<String>,
    pub client: Option<String>,
}

impl FilterCriteria {
    /// Build criteria from form-style inputs, where an empty string means "any".
    pub fn from_inputs(
        sector: Option<String>,
        priority: Option<Priority>,
        assignee_name: Option<String>,
        client: Option<String>,
    ) -> Self {
        FilterCriteria {
            sector: non_empty(sector),
            priority,
            assignee_name: non_empty(assignee_name),
            client: non_empty(client),
        }
    }

    /// True when no constraint is set, i.e. every task matches.
    pub fn is_empty(&self) -> bool {
        self.sector.is_none()
            && self.priority.is_none()
            && self.assignee_name.is_none()
            && self.client.is_none()
    }

    /// Short human description, e.g. `sector=Design client=Acme`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(s) = &self.sector {
            parts.push(format!("sector={s}"));
        }
        if let Some(p) = self.priority {
            parts.push(format!("priority={}", crate::fields::format_priority(p)));
        }
        if let Some(a) = &self.assignee_name {
            parts.push(format!("assignee={a}"));
        }
        if let Some(c) = &self.client {
            parts.push(format!("client={c}"));
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(" ")
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Decide whether `task` satisfies every present criterion.
pub fn matches(task: &Task, criteria: &FilterCriteria) -> bool {
    field_matches(task.sector.as_deref(), criteria.sector.as_deref())
        && criteria.priority.map_or(true, |p| task.priority == p)
        && field_matches(task.assignee_name.as_deref(), criteria.assignee_name.as_deref())
        && field_matches(task.client.as_deref(), criteria.client.as_deref())
}

fn field_matches(value: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(w) => value == Some(w),
    }
}

/// Distinct non-blank assignee names, in first-seen order.
pub fn distinct_assignees(tasks: &[Task]) -> Vec<String> {
    distinct(tasks, |t| t.assignee_name.as_deref())
}

/// Distinct non-blank clients, in first-seen order.
pub fn distinct_clients(tasks: &[Task]) -> Vec<String> {
    distinct(tasks, |t| t.client.as_deref())
}

/// Distinct non-blank sectors, in first-seen order.
pub fn distinct_sectors(tasks: &[Task]) -> Vec<String> {
    distinct(tasks, |t| t.sector.as_deref())
}

fn distinct<F>(tasks: &[Task], field: F) -> Vec<String>
where
    F: Fn(&Task) -> Option<&str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in tasks.iter().filter_map(&field) {
        if value.trim().is_empty() {
            continue;
        }
        if seen.insert(value) {
            out.push(value.to_string());
        }
    }
    out
}

/// Step through `options` the way a dropdown would: any → first → … → last → any.
pub fn cycle_choice(current: Option<&str>, options: &[String]) -> Option<String> {
    match current {
        None => options.first().cloned(),
        Some(c) => match options.iter().position(|o| o == c) {
            Some(i) => options.get(i + 1).cloned(),
            None => options.first().cloned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::task;
    use proptest::prelude::*;

    fn tagged(id: &str, sector: Option<&str>, client: Option<&str>, who: Option<&str>) -> Task {
        let mut t = task(id, id);
        t.sector = sector.map(str::to_string);
        t.client = client.map(str::to_string);
        t.assignee_name = who.map(str::to_string);
        t
    }

    #[test]
    fn sector_filter_keeps_matching_tasks_in_order() {
        let tasks = vec![
            tagged("1", Some("Web"), None, None),
            tagged("2", Some("Design"), None, None),
            tagged("3", None, None, None),
            tagged("4", Some("Design"), None, None),
            tagged("5", Some("design"), None, None),
        ];
        let criteria = FilterCriteria::from_inputs(
            Some("Design".into()),
            None,
            Some(String::new()),
            Some(String::new()),
        );
        let ids: Vec<&str> = tasks
            .iter()
            .filter(|t| matches(t, &criteria))
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["2", "4"]);
    }

    #[test]
    fn absent_field_never_matches_a_constraint() {
        let t = tagged("1", None, None, None);
        let criteria = FilterCriteria {
            client: Some("Acme".into()),
            ..Default::default()
        };
        assert!(!matches(&t, &criteria));
    }

    #[test]
    fn assignee_compares_against_the_name_label() {
        let mut t = tagged("1", None, None, Some("Ana Souza"));
        t.assignee_id = Some("user-42".into());
        let by_name = FilterCriteria {
            assignee_name: Some("Ana Souza".into()),
            ..Default::default()
        };
        let by_id = FilterCriteria {
            assignee_name: Some("user-42".into()),
            ..Default::default()
        };
        assert!(matches(&t, &by_name));
        assert!(!matches(&t, &by_id));
    }

    #[test]
    fn empty_string_inputs_mean_no_constraint_but_spaces_do_not() {
        let c = FilterCriteria::from_inputs(Some(String::new()), None, None, Some(" ".into()));
        assert_eq!(c.sector, None);
        assert_eq!(c.client.as_deref(), Some(" "));
    }

    #[test]
    fn distinct_values_skip_blanks_and_keep_first_seen_order() {
        let tasks = vec![
            tagged("1", None, Some("Beta"), Some("Rui")),
            tagged("2", None, Some("Acme"), Some(" ")),
            tagged("3", None, Some("Beta"), Some("Ana")),
            tagged("4", None, None, Some("Rui")),
        ];
        assert_eq!(distinct_clients(&tasks), vec!["Beta", "Acme"]);
        assert_eq!(distinct_assignees(&tasks), vec!["Rui", "Ana"]);
        assert!(distinct_sectors(&tasks).is_empty());
    }

    #[test]
    fn cycling_wraps_back_to_any() {
        let opts = vec!["A".to_string(), "B".to_string()];
        assert_eq!(cycle_choice(None, &opts).as_deref(), Some("A"));
        assert_eq!(cycle_choice(Some("A"), &opts).as_deref(), Some("B"));
        assert_eq!(cycle_choice(Some("B"), &opts), None);
        assert_eq!(cycle_choice(Some("gone"), &opts).as_deref(), Some("A"));
        assert_eq!(cycle_choice(None, &[]), None);
    }

    fn opt_label() -> impl Strategy<Value = Option<String>> {
        proptest::option::of(prop_oneof![
            Just("Design".to_string()),
            Just("Web".to_string()),
            Just("Acme".to_string()),
            "[a-z]{0,4}",
        ])
    }

    fn any_priority() -> impl Strategy<Value = Priority> {
        prop_oneof![Just(Priority::Low), Just(Priority::Medium), Just(Priority::High)]
    }

    prop_compose! {
        fn arb_task()(sector in opt_label(), client in opt_label(), who in opt_label(), priority in any_priority()) -> Task {
            let mut t = task("p", "p");
            t.sector = sector;
            t.client = client;
            t.assignee_name = who;
            t.priority = priority;
            t
        }
    }

    prop_compose! {
        fn arb_criteria()(sector in opt_label(), client in opt_label(), who in opt_label(), priority in proptest::option::of(any_priority())) -> FilterCriteria {
            FilterCriteria::from_inputs(sector, priority, who, client)
        }
    }

    proptest! {
        #[test]
        fn empty_criteria_match_everything(t in arb_task()) {
            prop_assert!(matches(&t, &FilterCriteria::default()));
        }

        #[test]
        fn any_differing_constraint_rejects(t in arb_task(), c in arb_criteria()) {
            let differs = c.sector.as_ref().is_some_and(|s| t.sector.as_ref() != Some(s))
                || c.client.as_ref().is_some_and(|s| t.client.as_ref() != Some(s))
                || c.assignee_name.as_ref().is_some_and(|s| t.assignee_name.as_ref() != Some(s))
                || c.priority.is_some_and(|p| p != t.priority);
            prop_assert_eq!(matches(&t, &c), !differs);
        }
    }
}
