//! Task dependency graph utilities.

use std::any::TypeId;
use std::collections::{BTreeSet, HashMap};

use super::Task;
use crate::error::TaskError;

/// Order `tasks` so that every task comes after its dependencies.
///
/// Uses Kahn's algorithm, always picking the earliest-declared ready task,
/// so independent tasks keep their declared order.
///
/// # Errors
///
/// Returns [`TaskError::MissingDependency`] if a task depends on a task that
/// is not in the list, and [`TaskError::DependencyCycle`] if the graph
/// contains a cycle.
pub fn execution_order(tasks: &[&dyn Task]) -> Result<Vec<usize>, TaskError> {
    let type_to_idx: HashMap<TypeId, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.task_id(), i))
        .collect();

    let mut in_degree: Vec<usize> = vec![0; tasks.len()];
    let mut reverse_deps: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    for (i, t) in tasks.iter().enumerate() {
        for dep in t.dependencies() {
            let Some(&dep_idx) = type_to_idx.get(dep) else {
                return Err(TaskError::MissingDependency(t.name().to_string()));
            };
            if let Some(rd) = reverse_deps.get_mut(dep_idx) {
                rd.push(i);
            }
            if let Some(count) = in_degree.get_mut(i) {
                *count += 1;
            }
        }
    }

    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .enumerate()
        .filter_map(|(i, &d)| (d == 0).then_some(i))
        .collect();
    let mut order = Vec::with_capacity(tasks.len());

    while let Some(idx) = ready.pop_first() {
        order.push(idx);
        if let Some(dependents) = reverse_deps.get(idx) {
            for &dep in dependents {
                if let Some(count) = in_degree.get_mut(dep) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(dep);
                    }
                }
            }
        }
    }

    if order.len() != tasks.len() {
        let stuck: Vec<&str> = tasks
            .iter()
            .enumerate()
            .filter(|(i, _)| !order.contains(i))
            .map(|(_, t)| t.name())
            .collect();
        return Err(TaskError::DependencyCycle(stuck.join(", ")));
    }
    Ok(order)
}
