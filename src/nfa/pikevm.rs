/*! A Pike VM that executes the automaton over some input.

The VM advances a set of threads through the input one character position at
a time. A thread is a path through the automaton that has consumed the input
up to the current position, together with the capture boundaries recorded
along that path. At every position each live thread is followed through the
epsilon arcs reachable from its state, spawning successor threads for the
consuming arcs that accept the current character, and at most one thread
survives per automaton state. That cap is what bounds the running time by
`states × input length`.

Thread order is priority order. Threads are advanced in the order they were
registered, arcs are followed in the order they hang off their state, and
the first thread to reach a state at a position claims it. Greedy/lazy
quantifiers and alternation preference all fall out of this single rule.

Threads seeded at an earlier input position carry a smaller generation
number. When several accepting candidates compete, the earliest generation
wins (leftmost match) and within a generation the latest candidate wins
(longest match the pattern's priorities allow).

Capture state is copy-on-write: threads share one [`Captures`] behind an
[`Rc`] until a group boundary actually differs, so the common case of many
threads agreeing on their captures costs one refcount bump per fork.
*/

use std::rc::Rc;

use bitvec::prelude::*;

use crate::nfa::threadset::ThreadSet;
use crate::nfa::{Label, Nfa, StateId};
use crate::Span;

/// Capture boundaries recorded by one thread. Slot 0 is the whole match,
/// slot `n` is group `n`.
///
/// Boundaries are sticky: once a group has opened, later open arcs on the
/// same thread are ignored, and the same goes for closing. A quantified
/// group therefore keeps the boundaries of its first iteration.
#[derive(Debug, Clone)]
pub(crate) struct Captures {
    spans: Vec<Option<Span>>,
}

impl Captures {
    /// A fresh capture set for a match attempt starting at `start`: the
    /// whole-match slot is open, every group slot is empty.
    fn new(group_count: u32, start: usize) -> Self {
        let mut spans = vec![None; group_count as usize + 1];
        spans[0] = Some(Span { start, end: None });
        Self { spans }
    }

    fn is_open(&self, group: u32) -> bool {
        self.spans[group as usize].is_some()
    }

    fn is_closed(&self, group: u32) -> bool {
        matches!(self.spans[group as usize], Some(Span { end: Some(_), .. }))
    }

    fn open(&mut self, group: u32, pos: usize) {
        debug_assert!(!self.is_open(group));
        self.spans[group as usize] = Some(Span { start: pos, end: None });
    }

    fn close(&mut self, group: u32, pos: usize) {
        debug_assert!(self.is_open(group));
        if let Some(span) = &mut self.spans[group as usize] {
            span.end = Some(pos);
        }
    }

    fn close_whole(&mut self, pos: usize) {
        if let Some(span) = &mut self.spans[0] {
            span.end = Some(pos);
        }
    }

    /// One optional span per slot, whole match first.
    pub fn into_spans(self) -> Vec<Option<Span>> {
        self.spans
    }
}

/// A live path through the automaton.
#[derive(Debug, Clone)]
struct Thread {
    /// Seeding generation, smaller means an earlier starting position.
    gen: u32,
    state: StateId,
    captures: Rc<Captures>,
}

/// The matcher. Borrows the automaton; its own fields are scratch space
/// reused across input positions.
pub(crate) struct PikeVm<'r> {
    nfa: &'r Nfa,
    /// States already claimed at the current position, shared by every
    /// thread advanced and seeded there.
    visited: BitVec,
    /// Candidates produced by following one thread, in priority order.
    candidates: Vec<Thread>,
    /// Threads registered for the next position, at most one per state.
    next_threads: ThreadSet<Thread>,
}

impl<'r> PikeVm<'r> {
    pub fn new(nfa: &'r Nfa) -> Self {
        Self {
            nfa,
            visited: bitvec![0; nfa.state_count()],
            candidates: Vec::new(),
            next_threads: ThreadSet::new(nfa.state_count()),
        }
    }

    /// Runs the automaton over `text`, considering match attempts starting
    /// at `start` or later, and returns the captures of the winning match,
    /// if any.
    ///
    /// One extra iteration past the end of the input lets threads that
    /// consumed the final character reach the accepting state.
    pub fn search(
        &mut self,
        text: &[char],
        start: usize,
    ) -> Option<Captures> {
        let mut threads: Vec<Thread> = Vec::new();
        let mut best: Option<Thread> = None;
        let mut next_gen = 0;
        let mut pos = start;

        while pos <= text.len() {
            self.visited.fill(false);
            let mut matched = false;

            for thread in threads.iter() {
                self.candidates.clear();
                follow(
                    self.nfa,
                    thread.gen,
                    &thread.captures,
                    thread.state,
                    pos,
                    text,
                    &mut self.visited,
                    &mut self.candidates,
                );
                for cand in self.candidates.drain(..) {
                    if self.nfa.state(cand.state).is_accepting() {
                        best = better(best, cand);
                        matched = true;
                        break;
                    }
                    self.next_threads.insert(cand.state.index(), cand);
                }
                // Lower-priority threads cannot improve on a match found
                // at this position, but threads already registered for the
                // next position keep running.
                if matched {
                    break;
                }
            }

            // Seed a new attempt at this position unless a match is
            // already in hand; a later attempt could only be less
            // leftmost.
            if best.is_none() {
                let captures =
                    Rc::new(Captures::new(self.nfa.group_count(), pos));
                self.candidates.clear();
                follow(
                    self.nfa,
                    next_gen,
                    &captures,
                    self.nfa.start(),
                    pos,
                    text,
                    &mut self.visited,
                    &mut self.candidates,
                );
                next_gen += 1;
                for cand in self.candidates.drain(..) {
                    if self.nfa.state(cand.state).is_accepting() {
                        best = better(best, cand);
                        break;
                    }
                    self.next_threads.insert(cand.state.index(), cand);
                }
            }

            if self.next_threads.is_empty() && best.is_some() {
                break;
            }

            threads.clear();
            threads.extend(self.next_threads.take());
            pos += 1;
        }

        best.map(|thread| thread.captures.as_ref().clone())
    }
}

/// Follows every arc reachable from `state` without consuming input,
/// pushing onto `out` one candidate per consuming arc that accepts the
/// character at `pos`, or a completed candidate if an accepting state is
/// reached.
///
/// Arc targets are claimed in `visited` before the character test, so the
/// highest-priority path to each state is the only one explored. A free
/// function rather than a method so the VM can hand out its scratch fields
/// separately while iterating threads.
#[allow(clippy::too_many_arguments)]
fn follow(
    nfa: &Nfa,
    gen: u32,
    captures: &Rc<Captures>,
    state: StateId,
    pos: usize,
    text: &[char],
    visited: &mut BitVec,
    out: &mut Vec<Thread>,
) {
    if nfa.state(state).is_accepting() {
        let mut captures = Rc::clone(captures);
        Rc::make_mut(&mut captures).close_whole(pos);
        out.push(Thread { gen, state, captures });
        return;
    }

    for arc in nfa.state(state).arcs() {
        if visited[arc.target.index()] {
            continue;
        }
        visited.set(arc.target.index(), true);

        match &arc.label {
            Label::Epsilon => {
                follow(nfa, gen, captures, arc.target, pos, text, visited, out);
            }
            Label::Literal(c) => {
                if text.get(pos) == Some(c) {
                    out.push(step(nfa, gen, captures, arc.target, pos + 1));
                }
            }
            Label::Class(ranges) => {
                if let Some(&input) = text.get(pos) {
                    if ranges.contains(input as u32) {
                        out.push(step(
                            nfa,
                            gen,
                            captures,
                            arc.target,
                            pos + 1,
                        ));
                    }
                }
            }
            Label::GroupOpen(group) => {
                let mut captures = Rc::clone(captures);
                if !captures.is_open(*group) {
                    Rc::make_mut(&mut captures).open(*group, pos);
                }
                follow(
                    nfa, gen, &captures, arc.target, pos, text, visited, out,
                );
            }
            Label::GroupClose(group) => {
                let mut captures = Rc::clone(captures);
                if !captures.is_closed(*group) {
                    Rc::make_mut(&mut captures).close(*group, pos);
                }
                follow(
                    nfa, gen, &captures, arc.target, pos, text, visited, out,
                );
            }
        }
    }
}

/// A successor thread parked at `target` for the next input position. If
/// the target accepts, the whole-match slot is closed right away so the
/// thread already carries its end position.
fn step(
    nfa: &Nfa,
    gen: u32,
    captures: &Rc<Captures>,
    target: StateId,
    next_pos: usize,
) -> Thread {
    let mut captures = Rc::clone(captures);
    if nfa.state(target).is_accepting() {
        Rc::make_mut(&mut captures).close_whole(next_pos);
    }
    Thread { gen, state: target, captures }
}

/// Picks the winner between the best accepting candidate so far and a newly
/// completed one. An earlier generation always wins; within a generation
/// the newer candidate wins, it completed at a later position or with
/// higher priority.
fn better(best: Option<Thread>, candidate: Thread) -> Option<Thread> {
    match best {
        None => Some(candidate),
        Some(best) if candidate.gen <= best.gen => Some(candidate),
        best => best,
    }
}
