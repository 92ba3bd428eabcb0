use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap, HashSet, VecDeque},
    fmt::Display,
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use smallvec::SmallVec;

use crate::board::{Action, Board, StateKey};

/// Bounds on a single search. Hitting one ends the search without a
/// solution; it is not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchLimits {
    pub time_limit: Option<Duration>,
    pub max_expansions: Option<usize>,
}

impl SearchLimits {
    pub const fn unlimited() -> SearchLimits {
        SearchLimits {
            time_limit: None,
            max_expansions: None,
        }
    }

    pub const fn new(time_limit: Duration, max_expansions: usize) -> SearchLimits {
        SearchLimits {
            time_limit: Some(time_limit),
            max_expansions: Some(max_expansions),
        }
    }

    fn exceeded(&self, started: Instant, expanded: usize) -> Option<Outcome> {
        if matches!(self.time_limit, Some(limit) if started.elapsed() >= limit) {
            return Some(Outcome::TimeLimit);
        }
        if matches!(self.max_expansions, Some(max) if expanded >= max) {
            return Some(Outcome::ExpansionLimit);
        }
        None
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits::new(Duration::from_secs(30), 200_000)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    Bfs,
    AStar,
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Algorithm::Bfs => "BFS",
            Algorithm::AStar => "A*",
        })
    }
}

/// Why a search stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Solved,
    Exhausted,
    TimeLimit,
    ExpansionLimit,
}

#[derive(Clone, Debug)]
pub struct Search {
    pub solution: Option<Vec<Action>>,
    pub outcome: Outcome,
    /// States whose successors were generated.
    pub expanded: usize,
    pub generated: usize,
    pub elapsed: Duration,
}

pub fn solve(start: &Board, algorithm: Algorithm, limits: &SearchLimits) -> Search {
    match algorithm {
        Algorithm::Bfs => bfs_with_limits(start, limits),
        Algorithm::AStar => a_star_with_limits(start, limits),
    }
}

/// Breadth-first search without limits. Returns a shortest solution.
pub fn bfs(start: &Board) -> Option<Vec<Action>> {
    bfs_with_limits(start, &SearchLimits::unlimited()).solution
}

/// A* bounded by wall-clock time and number of expansions.
pub fn a_star(start: &Board, time_limit: Duration, max_expansions: usize) -> Option<Vec<Action>> {
    a_star_with_limits(start, &SearchLimits::new(time_limit, max_expansions)).solution
}

/// Remaining distance of the target to the right edge plus the number of
/// occupied cells in that stretch of its row.
///
/// Each occupied cell counts twice, yet this stays a lower bound: a
/// horizontal vehicle in front of the target can never get out of the way, so
/// on any solvable board every such cell belongs to a distinct vertical
/// vehicle that needs at least one slide of its own. A single slide also
/// changes the value by at most one, so A* never has to reopen a state.
pub fn heuristic(board: &Board) -> usize {
    let target = board.target();
    let front = target.x + target.length;
    let blockers = (front..board.width())
        .filter(|&x| board[(x, target.y)].is_some())
        .count();

    board.width() - front + blockers
}

fn unwind(mut ix: usize, step: impl Fn(usize) -> Option<(usize, Action)>) -> Vec<Action> {
    let mut actions = Vec::new();
    while let Some((parent, action)) = step(ix) {
        actions.push(action);
        ix = parent;
    }
    actions.reverse();
    actions
}

fn report(algorithm: Algorithm, search: &Search) {
    match (&search.solution, search.outcome) {
        (Some(actions), _) => info!(
            "[{}] solved in {} moves after {} expansions ({:.2?})",
            algorithm,
            actions.len(),
            search.expanded,
            search.elapsed
        ),
        (None, Outcome::TimeLimit) => warn!(
            "[{}] time limit reached after {} expansions ({:.2?})",
            algorithm, search.expanded, search.elapsed
        ),
        (None, Outcome::ExpansionLimit) => {
            warn!("[{}] expansion limit reached ({})", algorithm, search.expanded)
        }
        (None, _) => info!(
            "[{}] no solution after {} expansions",
            algorithm, search.expanded
        ),
    }
}

/// Breadth-first search. Children are queued without checking whether their
/// state was seen; duplicates are dropped when dequeued.
pub fn bfs_with_limits(start: &Board, limits: &SearchLimits) -> Search {
    let started = Instant::now();
    // parent and action per queued node; boards live only in the frontier
    let mut steps: Vec<Option<(usize, Action)>> = vec![None];
    let mut frontier = VecDeque::from([(0, start.clone())]);
    let mut explored = HashSet::<StateKey>::new();
    let mut expanded = 0;
    let mut generated = 0;
    let mut buffer = SmallVec::<[(Action, Board); 16]>::new();

    let (outcome, goal) = loop {
        if let Some(stop) = limits.exceeded(started, expanded) {
            break (stop, None);
        }
        let Some((ix, state)) = frontier.pop_front() else {
            break (Outcome::Exhausted, None);
        };

        if state.is_goal() {
            break (Outcome::Solved, Some(ix));
        }
        if !explored.insert(state.key()) {
            continue;
        }

        expanded += 1;
        state.successors_into(&mut buffer);
        generated += buffer.len();

        for (action, next) in buffer.drain(..) {
            frontier.push_back((steps.len(), next));
            steps.push(Some((ix, action)));
        }
    };

    let search = Search {
        solution: goal.map(|ix| unwind(ix, |ix| steps[ix])),
        outcome,
        expanded,
        generated,
        elapsed: started.elapsed(),
    };
    report(Algorithm::Bfs, &search);
    search
}

// one per distinct state, found through `index`
struct Entry {
    state: Board,
    cost: usize,
    step: Option<(usize, Action)>,
}

/// A* with unit move costs and [`heuristic`]. Equal priorities pop in push
/// order, which makes the returned sequence reproducible.
pub fn a_star_with_limits(start: &Board, limits: &SearchLimits) -> Search {
    a_star_by(start, limits, heuristic)
}

// States already expanded are reopened when a cheaper path shows up, so any
// admissible `estimate` gives shortest solutions, consistent or not.
fn a_star_by(start: &Board, limits: &SearchLimits, estimate: impl Fn(&Board) -> usize) -> Search {
    let started = Instant::now();
    let mut entries = vec![Entry {
        state: start.clone(),
        cost: 0,
        step: None,
    }];
    let mut index = HashMap::from([(start.key(), 0)]);
    // (f, push order, entry, g at push time)
    let mut open = BinaryHeap::new();
    let mut pushed: u64 = 0;
    open.push(Reverse((estimate(start), pushed, 0usize, 0usize)));

    let mut expanded = 0;
    let mut generated = 0;
    let mut buffer = SmallVec::<[(Action, Board); 16]>::new();

    let (outcome, goal) = loop {
        if let Some(stop) = limits.exceeded(started, expanded) {
            break (stop, None);
        }
        let Some(Reverse((f, _, ix, cost))) = open.pop() else {
            break (Outcome::Exhausted, None);
        };

        // a cheaper path to this state was pushed after this one
        if cost != entries[ix].cost {
            continue;
        }
        if entries[ix].state.is_goal() {
            break (Outcome::Solved, Some(ix));
        }

        expanded += 1;
        if expanded % 500 == 0 {
            debug!(
                "[A*] expansions={}, open={}, best f={}",
                expanded,
                open.len(),
                f
            );
        }

        entries[ix].state.successors_into(&mut buffer);
        generated += buffer.len();
        let tentative = cost + 1;

        for (action, state) in buffer.drain(..) {
            let key = state.key();
            let priority = tentative + estimate(&state);
            let entry = Entry {
                state,
                cost: tentative,
                step: Some((ix, action)),
            };

            let target = match index.get(&key) {
                Some(&known) if entries[known].cost <= tentative => continue,
                Some(&known) => {
                    entries[known] = entry;
                    known
                }
                None => {
                    let known = entries.len();
                    index.insert(key, known);
                    entries.push(entry);
                    known
                }
            };

            pushed += 1;
            open.push(Reverse((priority, pushed, target, tentative)));
        }
    };

    let search = Search {
        solution: goal.map(|ix| unwind(ix, |ix| entries[ix].step)),
        outcome,
        expanded,
        generated,
        elapsed: started.elapsed(),
    };
    report(Algorithm::AStar, &search);
    search
}
