/*! The automaton model: states, arcs, and the arena they live in.

The compiler builds the automaton bottom-up out of [`Fragment`]s, pairs of
entry/exit states representing a sub-automaton under construction. States
are allocated in an arena ([`NfaBuilder`]) and addressed by [`StateId`], so
arcs never hold references and cycles introduced by `*`/`+` loops need no
special ownership treatment.

Arc order within a state is significant: the matcher walks arcs in
insertion order, and that order is the whole mechanism behind greedy
versus lazy quantifiers and left-to-right alternation priority. Appending
an epsilon arc means "try it last", prepending means "try it first".

[`NfaBuilder::finish`] turns the arena into an immutable [`Nfa`]: it walks
the graph from the start state, numbers states in discovery order, drops
construction debris that became unreachable, and merges the duplicate
state pairs left behind by concatenation splicing. Only those recorded
pairs merge; two states that merely happen to look alike stay distinct,
since collapsing them would let one alternation branch shadow another in
the matcher's per-position bookkeeping. The finished automaton is
read-only; matching never mutates it.
*/

use std::fmt::{Display, Formatter};
use std::mem;

use smallvec::SmallVec;

pub(crate) mod compiler;
pub(crate) mod pikevm;
mod ranges;
mod threadset;

#[cfg(test)]
mod tests;

pub(crate) use ranges::ClassRanges;

/// Identifies a state within its automaton.
///
/// Ids are dense: after [`NfaBuilder::finish`] every id below
/// [`Nfa::state_count`] names a reachable state, so per-state bookkeeping
/// during matching can be plain bitmaps and vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StateId(u32);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What an arc requires in order to be taken, and what taking it records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Label {
    /// Taken without consuming input.
    Epsilon,
    /// Consumes one character equal to the payload.
    Literal(char),
    /// Consumes one character accepted by the class.
    Class(ClassRanges),
    /// Taken without consuming input; records the start of a group.
    GroupOpen(u32),
    /// Taken without consuming input; records the end of a group.
    GroupClose(u32),
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Epsilon => write!(f, "ε"),
            Label::Literal(c) => write!(f, "{:?}", c),
            Label::Class(ranges) => write!(f, "{}", ranges),
            Label::GroupOpen(group) => write!(f, "open({})", group),
            Label::GroupClose(group) => write!(f, "close({})", group),
        }
    }
}

/// A directed edge from the state that owns it to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Arc {
    pub label: Label,
    pub target: StateId,
}

/// A node in the automaton. Owns its outgoing arcs, in priority order.
#[derive(Debug, Clone, Default)]
pub(crate) struct State {
    arcs: SmallVec<[Arc; 2]>,
    accepting: bool,
}

impl State {
    #[inline]
    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    #[inline]
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Structural equality: arc lists equal element by element, acceptance
    /// in agreement. Spliced state pairs satisfy this by construction; the
    /// finishing pass asserts it when merging them.
    fn same_structure(&self, other: &State) -> bool {
        self.accepting == other.accepting && self.arcs == other.arcs
    }
}

/// A compiled automaton: every state reachable from `start`, in discovery
/// order, plus the number of capture groups declared by the pattern.
pub(crate) struct Nfa {
    states: Vec<State>,
    start: StateId,
    group_count: u32,
}

impl Nfa {
    #[inline]
    pub fn start(&self) -> StateId {
        self.start
    }

    #[inline]
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    #[inline]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn group_count(&self) -> u32 {
        self.group_count
    }
}

impl Display for Nfa {
    /// One line per state in discovery order, then one indented line per
    /// arc in priority order.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, state) in self.states.iter().enumerate() {
            let marker = if state.accepting { " (accept)" } else { "" };
            writeln!(f, "state {}{}", i, marker)?;
            for arc in state.arcs() {
                writeln!(f, "  {} -> {}", arc.label, arc.target.0)?;
            }
        }
        Ok(())
    }
}

/// A sub-automaton under construction: its entry state and its exit state.
///
/// Invariant: the exit state has no outgoing arcs until the fragment is
/// consumed by a higher-level construction step. That is what makes
/// splicing safe, arcs already pointing at the exit never need rewriting.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fragment {
    pub entry: StateId,
    pub exit: StateId,
}

/// Arena in which the compiler allocates states while building fragments.
#[derive(Default)]
pub(crate) struct NfaBuilder {
    states: Vec<State>,
    /// `(dst, src)` pairs recorded by [`NfaBuilder::splice`]. Each pair
    /// holds two copies of the same arc list; the finishing pass folds
    /// them back into one state.
    spliced: Vec<(StateId, StateId)>,
    group_count: u32,
}

impl NfaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh state with no arcs.
    pub fn new_state(&mut self) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.push(State::default());
        id
    }

    /// Adds an arc at the end of `from`'s arc list (lowest priority).
    pub fn append_arc(&mut self, from: StateId, label: Label, target: StateId) {
        self.states[from.index()].arcs.push(Arc { label, target });
    }

    /// Adds an arc at the front of `from`'s arc list (highest priority).
    /// Only ever used to put a lazy quantifier's skip arc ahead of the
    /// single arc an atom's entry state carries.
    pub fn prepend_arc(
        &mut self,
        from: StateId,
        label: Label,
        target: StateId,
    ) {
        debug_assert_eq!(1, self.states[from.index()].arcs.len());
        self.states[from.index()].arcs.insert(0, Arc { label, target });
    }

    /// Splices `src`'s arcs onto the arc-less state `dst`, reusing `dst` as
    /// the merge point of a concatenation instead of adding an epsilon.
    ///
    /// The arcs are copied, not moved: `src` may still be the target of
    /// repeat arcs from a quantifier loop. The pair is recorded so the
    /// finishing pass can fold the two copies back into one state when
    /// both remain reachable.
    pub fn splice(&mut self, dst: StateId, src: StateId) {
        debug_assert!(self.states[dst.index()].arcs.is_empty());
        let arcs = self.states[src.index()].arcs.clone();
        self.states[dst.index()].arcs = arcs;
        self.spliced.push((dst, src));
    }

    /// Claims the next capture group number. Groups are numbered from 1 in
    /// the order their opening parenthesis appears.
    pub fn next_group(&mut self) -> u32 {
        self.group_count += 1;
        self.group_count
    }

    /// Finishes construction. Marks the fragment's exit as the accepting
    /// state, or synthesizes a trivial automaton accepting the empty string
    /// when the whole pattern compiled to nothing. Then renumbers states in
    /// discovery order from the entry, folding each reachable splice pair
    /// into a single state and dropping unreachable ones.
    pub fn finish(mut self, fragment: Option<Fragment>) -> Nfa {
        let fragment = fragment.unwrap_or_else(|| {
            let entry = self.new_state();
            let exit = self.new_state();
            self.append_arc(entry, Label::Epsilon, exit);
            Fragment { entry, exit }
        });

        self.states[fragment.exit.index()].accepting = true;

        let mut partner: Vec<Option<usize>> = vec![None; self.states.len()];
        for (dst, src) in self.spliced.iter() {
            partner[dst.index()] = Some(src.index());
            partner[src.index()] = Some(dst.index());
        }

        let mut order: Vec<usize> = vec![fragment.entry.index()];
        let mut remap: Vec<Option<u32>> = vec![None; self.states.len()];
        remap[fragment.entry.index()] = Some(0);

        let mut i = 0;
        while i < order.len() {
            for a in 0..self.states[order[i]].arcs.len() {
                let target = self.states[order[i]].arcs[a].target.index();
                if remap[target].is_some() {
                    continue;
                }
                let merged = partner[target].and_then(|p| remap[p]);
                remap[target] = Some(match merged {
                    Some(n) => {
                        debug_assert!(self.states[target].same_structure(
                            &self.states[order[n as usize]]
                        ));
                        n
                    }
                    None => {
                        order.push(target);
                        (order.len() - 1) as u32
                    }
                });
            }
            i += 1;
        }

        let mut states = Vec::with_capacity(order.len());
        for &old in order.iter() {
            let mut state = mem::take(&mut self.states[old]);
            for arc in state.arcs.iter_mut() {
                // Set for every reachable target by the discovery loop.
                arc.target = StateId(remap[arc.target.index()].unwrap());
            }
            states.push(state);
        }

        Nfa { states, start: StateId(0), group_count: self.group_count }
    }
}
