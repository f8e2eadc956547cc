/*
 *  Copyright 2017 Gianmarco Garrisi
 *
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU Lesser General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU Lesser General Public License for more details.
 *
 *  You should have received a copy of the GNU Lesser General Public License
 *  along with this program.  If not, see <http://www.gnu.org/licenses/>.
 *
 */

use crate::{formula::Clause, Assignments, Literal, Variable};
use ordered_float::OrderedFloat;

pub type Activity = f64;

const DECAY: f64 = 0.95;
const INIT_INCREMENT: f64 = 1.0;
const RESCALE_THRESHOLD: f64 = 1e100;
const RESCALE_FACTOR: f64 = 1e-100;

/// VSIDS activities, held in a binary max-heap with a per-variable position
/// index so bumps can fix up the heap in place. Decay grows the increment
/// instead of shrinking every score; rescaling keeps both below
/// `RESCALE_THRESHOLD` without disturbing the relative order.
#[derive(Clone, Debug)]
pub struct Activities {
    scores: Vec<Activity>,         // Variable -> activity score
    heap: Vec<Variable>,           // Heap of variables, max activity on top
    positions: Vec<Option<usize>>, // Variable -> index of variable in heap
    increment: Activity,           // Quantity added to a score by a bump
}

impl Activities {
    pub fn new(num_vars: usize) -> Self {
        let activities = Self {
            scores: vec![0.0; num_vars],
            heap: (0..num_vars).collect(),
            positions: (0..num_vars).map(Option::Some).collect(),
            increment: INIT_INCREMENT,
        };
        debug_assert!(activities.valid());
        activities
    }

    /// Pops variables until an unassigned one surfaces, pairing it with its
    /// saved phase. Popped variables re-enter the heap when the trail
    /// releases them. Returns `None` iff every variable is assigned.
    #[must_use]
    pub fn next_decision(&mut self, assignments: &Assignments) -> Option<Literal> {
        while let Some(var) = self.pop() {
            if !assignments.is_assigned(var) {
                return Some(Literal::new(var, assignments.last_sign(var)));
            }
        }
        None
    }

    pub fn bump(&mut self, var: Variable) {
        self.scores[var] += self.increment;

        if self.scores[var] > RESCALE_THRESHOLD {
            self.rescale();
        }

        // If the variable currently sits in the heap, float it to its place
        if let Some(pos) = self.positions[var] {
            let pos = self.bubble_up(pos);
            self.sift_down(pos);
        }

        debug_assert!(self.valid());
    }

    /// Bumps every variable appearing in `clause`, whichever its polarity.
    pub fn bump_clause(&mut self, clause: &Clause) {
        for var in clause.variables() {
            self.bump(var);
        }
    }

    /// Equivalent to multiplying every score by `DECAY`: later bumps weigh
    /// more, and no ordering among existing scores changes.
    pub fn decay(&mut self) {
        self.increment /= DECAY;
    }

    /// Returns a variable to the heap after the trail unassigns it.
    pub fn make_available(&mut self, var: Variable) {
        if self.positions[var].is_some() {
            return;
        }

        let pos = self.heap.len();
        self.heap.push(var);
        self.positions[var] = Some(pos);

        let pos = self.bubble_up(pos);
        self.sift_down(pos);
    }

    fn rescale(&mut self) {
        for score in self.scores.iter_mut() {
            *score *= RESCALE_FACTOR;
        }
        self.increment *= RESCALE_FACTOR;
    }

    fn pop(&mut self) -> Option<Variable> {
        self.swap_remove(0).map(|removed| {
            if self.heap.len() > 1 {
                self.sift_down(0);
            }
            debug_assert!(self.valid());
            removed
        })
    }

    /// Remove and return the variable at idx, swapping the last one in
    fn swap_remove(&mut self, idx: usize) -> Option<Variable> {
        if idx < self.heap.len() {
            let removed = self.heap.swap_remove(idx);

            self.positions[removed] = None;
            if let Some(replacement) = self.heap.get(idx) {
                self.positions[*replacement] = Some(idx);
            }
            debug_assert!(self.valid_positions());
            Some(removed)
        } else {
            None
        }
    }

    /// Compute the index of the left child of an item from its index
    fn left(i: usize) -> usize {
        (i * 2) + 1
    }

    /// Compute the index of the right child of an item from its index
    fn right(i: usize) -> usize {
        (i * 2) + 2
    }

    /// Compute the index of the parent element in the heap from its index
    fn parent(i: usize) -> usize {
        (i - 1) / 2
    }

    fn key(&self, var: Variable) -> OrderedFloat<Activity> {
        OrderedFloat(self.scores[var])
    }

    fn update_largest(&self, largest: &mut usize, other: usize) {
        if other < self.heap.len() {
            *largest = std::cmp::max_by_key(*largest, other, |x| self.key(self.heap[*x]));
        }
    }

    /// Restore the heap property below idx
    fn sift_down(&mut self, mut idx: usize) {
        let mut largest = idx;
        self.update_largest(&mut largest, Self::left(idx));
        self.update_largest(&mut largest, Self::right(idx));

        while largest != idx {
            // One of idx's children is larger than it
            self.swap(idx, largest);
            idx = largest;
            self.update_largest(&mut largest, Self::left(idx));
            self.update_largest(&mut largest, Self::right(idx));
        }
        debug_assert!(self.valid_positions());
    }

    fn bubble_up(&mut self, mut idx: usize) -> usize {
        let key = self.key(self.heap[idx]);
        while idx > 0 && self.key(self.heap[Self::parent(idx)]) < key {
            self.swap(idx, Self::parent(idx));
            idx = Self::parent(idx);
        }
        debug_assert!(self.valid_positions());
        idx
    }

    /// Swap two heap slots keeping the position index consistent.
    fn swap(&mut self, a: usize, b: usize) {
        let (i, j) = (self.heap[a], self.heap[b]);
        self.heap.swap(a, b);
        self.positions.swap(i, j);
        debug_assert!(self.valid_positions());
    }

    fn valid_positions(&self) -> bool {
        let from_positions = self
            .positions
            .iter()
            .enumerate()
            .all(|(var, pos)| pos.map(|pos| self.heap[pos] == var).unwrap_or(true));
        let from_heap = self
            .heap
            .iter()
            .enumerate()
            .all(|(pos, var)| self.positions[*var] == Some(pos));
        from_positions && from_heap
    }

    fn valid(&self) -> bool {
        let ordered = self.heap.iter().enumerate().all(|(idx, var)| {
            let mut greater_than_children = true;
            if Self::left(idx) < self.heap.len() {
                greater_than_children &=
                    self.key(self.heap[Self::left(idx)]) <= self.key(*var);
            }
            if Self::right(idx) < self.heap.len() {
                greater_than_children &=
                    self.key(self.heap[Self::right(idx)]) <= self.key(*var);
            }
            greater_than_children
        });
        self.valid_positions() && ordered
    }
}
