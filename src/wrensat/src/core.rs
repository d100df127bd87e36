/*****************************************************************************************[core.rs]
wrensat -- a CDCL SAT solver

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

use {
    crate::callbacks::{Callbacks, ProgressStatus},
    crate::clause::{
        self, lbool, CRef, ClauseAllocator, ClauseRef, DeletePred, Lit, OccListsData, VMap, Var,
    },
    crate::heap::{Comparator, Heap, HeapData},
    crate::interface::SolverInterface,
    std::{
        cmp, fmt, mem,
        sync::atomic::{AtomicBool, Ordering},
    },
};

#[cfg(feature = "logging")]
use crate::clause::display::Print;

/// Strategy used to pick the next decision variable.
///
/// The strategies are alternatives, never combined into one score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branching {
    /// VSIDS: dynamic activity, bumped on conflicts, decayed over time.
    Activity,
    /// Static order: lowest-index unassigned variable first.
    FixedOrder,
    /// Jeroslow-Wang: activities seeded once per solve from clause
    /// lengths (weight `2^-|c|`), then left untouched.
    JeroslowWang,
}

/// The main solver structure.
///
/// A `Solver` owns the whole state of one solving session: the clause
/// arena, the assignment trail, watch lists, activities and statistics.
/// Several independent solvers may coexist; nothing is shared.
///
/// It is parametrized by `Callbacks`.
pub struct Solver<Cb: Callbacks> {
    /// If the problem is satisfiable, this vector contains the model.
    model: Vec<lbool>,

    cb: Cb, // the callbacks
    asynch_interrupt: AtomicBool,

    /// List of problem clauses.
    clauses: Vec<CRef>,
    /// List of learnt clauses.
    learnts: Vec<CRef>,
    ca: ClauseAllocator,

    /// `watches[lit]` is the list of clauses watching `lit` (they are
    /// visited when `lit` becomes true, i.e. when `!lit` is falsified).
    watches: OccListsData<Lit, Watcher>,
    /// Priority queue of variables ordered by activity.
    order_heap: HeapData<Var>,
    vars: VarState,

    /// The saved polarity of each variable (phase saving).
    polarity: VMap<bool>,

    // temporaries, kept allocated across calls
    seen: VMap<bool>,
    analyze_toclear: Vec<Lit>,
    minimize_stack: Vec<Lit>,

    /// Head of the propagation queue (an index into the trail).
    qhead: usize,
    /// If `false`, the clauses are already unsatisfiable at level 0.
    ok: bool,
    /// Amount to bump the next used clause with.
    cla_inc: f64,
    /// Next variable to be created.
    next_var: Var,

    // Mode of operation:
    clause_decay: f64,
    luby_restart: bool,
    /// Controls conflict clause minimization (0=none, 1=basic, 2=deep).
    ccmin_mode: i32,
    /// Controls the level of phase saving (0=none, 1=limited, 2=full).
    phase_saving: i32,
    /// The fraction of wasted arena words tolerated before a GC pass.
    garbage_frac: f64,
    /// Minimum number to set the learnts limit to.
    min_learnts_lim: i32,
    /// The base restart interval, in conflicts.
    restart_first: i32,
    /// Luby sequence multiplier (or geometric factor with `luby_restart`
    /// off).
    restart_inc: f64,
    /// The initial limit for learnt clauses as a factor of the original
    /// clause count.
    learntsize_factor: f64,
    /// The learnt clause limit is multiplied by this on each adjustment.
    learntsize_inc: f64,
    branching: Branching,

    learntsize_adjust_start_confl: i32,
    learntsize_adjust_inc: f64,
    max_learnts: f64,
    learntsize_adjust_confl: f64,
    learntsize_adjust_cnt: i32,

    /// Number of top-level assignments since the last `simplify` run.
    simp_db_assigns: i32,
    /// Remaining propagations before `simplify` is allowed to run again.
    simp_db_props: i64,

    progress_estimate: f64,

    // Resource constraints (negative = no limit):
    conflict_budget: i64,
    propagation_budget: i64,

    // Statistics (read-only for the outside):
    solves: u64,
    starts: u64,
    decisions: u64,
    propagations: u64,
    conflicts: u64,
    num_clauses: u64,
    num_learnts: u64,
    clauses_literals: u64,
    learnts_literals: u64,
    max_literals: u64,
    tot_literals: u64,
    max_trail: usize,
}

/// The current assignments.
struct VarState {
    /// Current assignment for each variable.
    ass: VMap<lbool>,
    /// Reason clause and decision level for each variable.
    vardata: VMap<VarData>,
    /// A heuristic measurement of the activity of a variable.
    activity: VMap<f64>,
    /// Amount to bump the next touched variable with.
    var_inc: f64,
    var_decay: f64,

    /// Assignment stack; stores all assignments in the order they were
    /// made. This is also the propagation queue (`qhead` marks the
    /// boundary), so propagation order is FIFO and deterministic.
    trail: Vec<Lit>,
    /// Separator indices for decision levels in `trail`.
    trail_lim: Vec<i32>,
}

// public API
impl<Cb: Callbacks> SolverInterface for Solver<Cb> {
    fn num_vars(&self) -> u32 {
        self.next_var.idx()
    }
    fn num_clauses(&self) -> u64 {
        self.num_clauses
    }
    fn num_conflicts(&self) -> u64 {
        self.conflicts
    }
    fn num_propagations(&self) -> u64 {
        self.propagations
    }
    fn num_decisions(&self) -> u64 {
        self.decisions
    }
    fn num_restarts(&self) -> u64 {
        self.starts
    }
    fn num_learnts(&self) -> u64 {
        self.num_learnts
    }
    fn max_trail(&self) -> usize {
        self.max_trail
    }

    fn is_ok(&self) -> bool {
        self.ok
    }

    fn new_var_default(&mut self) -> Var {
        self.new_var()
    }

    fn var_of_int(&mut self, v_idx: u32) -> Var {
        while v_idx >= self.num_vars() {
            self.new_var();
        }
        let var = Var::from_idx(v_idx);
        debug_assert_eq!(var.idx(), v_idx);
        var
    }

    // in the API, we can only add clauses at level 0
    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool {
        debug!("add toplevel clause {:?}", clause);
        debug_assert_eq!(
            self.vars.decision_level(),
            0,
            "add clause at non-zero decision level"
        );
        clause.sort_unstable();
        self.add_clause_(clause)
    }

    fn simplify(&mut self) -> bool {
        self.simplify_internal()
    }

    fn solve_limited(&mut self) -> lbool {
        self.asynch_interrupt.store(false, Ordering::SeqCst);
        self.solve_internal()
    }

    fn get_model(&self) -> &[lbool] {
        &self.model
    }

    fn value_var(&self, v: Var) -> lbool {
        self.model
            .get(v.idx() as usize)
            .map_or(lbool::UNDEF, |&v| v)
    }

    fn value_lit(&self, lit: Lit) -> lbool {
        self.value_var(lit.var()) ^ !lit.sign()
    }

    fn print_stats(&self) {
        println!("c restarts              : {}", self.starts);
        println!("c conflicts             : {:<12}", self.conflicts);
        println!("c decisions             : {:<12}", self.decisions);
        println!("c propagations          : {:<12}", self.propagations);
        if self.max_literals > 0 {
            println!(
                "c conflict literals     : {:<12}   ({:4.2} % deleted)",
                self.tot_literals,
                (self.max_literals - self.tot_literals) as f64 * 100.0 / self.max_literals as f64
            );
        }
        println!("c learnt clauses        : {}", self.num_learnts);
        println!("c peak trail            : {}", self.max_trail);
    }
}

impl<Cb: Callbacks + Default> Default for Solver<Cb> {
    fn default() -> Self {
        Solver::new(SolverOpts::default(), Default::default())
    }
}

// main algorithm
impl<Cb: Callbacks> Solver<Cb> {
    /// Create a new solver with the given options and callbacks.
    pub fn new(opts: SolverOpts, cb: Cb) -> Self {
        assert!(opts.check(), "invalid solver options");
        Self {
            model: vec![],
            cb,
            asynch_interrupt: AtomicBool::new(false),
            clauses: vec![],
            learnts: vec![],
            ca: ClauseAllocator::new(),
            watches: OccListsData::new(),
            order_heap: HeapData::new(),
            vars: VarState::new(&opts),
            polarity: VMap::new(),
            seen: VMap::new(),
            analyze_toclear: vec![],
            minimize_stack: vec![],
            qhead: 0,
            ok: true,
            cla_inc: 1.0,
            next_var: Var::from_idx(0),

            clause_decay: opts.clause_decay,
            luby_restart: opts.luby_restart,
            ccmin_mode: opts.ccmin_mode,
            phase_saving: opts.phase_saving,
            garbage_frac: opts.garbage_frac,
            min_learnts_lim: opts.min_learnts_lim,
            restart_first: opts.restart_first,
            restart_inc: opts.restart_inc,
            learntsize_factor: 1.0 / 3.0,
            learntsize_inc: 1.1,
            branching: opts.branching,

            learntsize_adjust_start_confl: 100,
            learntsize_adjust_inc: 1.5,
            max_learnts: 0.0,
            learntsize_adjust_confl: 0.0,
            learntsize_adjust_cnt: 0,

            simp_db_assigns: -1,
            simp_db_props: 0,

            progress_estimate: 0.0,

            conflict_budget: -1,
            propagation_budget: -1,

            solves: 0,
            starts: 0,
            decisions: 0,
            propagations: 0,
            conflicts: 0,
            num_clauses: 0,
            num_learnts: 0,
            clauses_literals: 0,
            learnts_literals: 0,
            max_literals: 0,
            tot_literals: 0,
            max_trail: 0,
        }
    }

    /// Temporary access to the callbacks
    pub fn cb_mut(&mut self) -> &mut Cb {
        &mut self.cb
    }

    /// Temporary access to the callbacks
    pub fn cb(&self) -> &Cb {
        &self.cb
    }

    /// Interrupt the search asynchronously. The current `solve_limited`
    /// call returns `lbool::UNDEF` at the next conflict or decision
    /// boundary; the solver stays usable.
    pub fn interrupt_async(&self) {
        self.asynch_interrupt.store(true, Ordering::Relaxed);
    }

    /// Limit the number of conflicts of the next solve (negative: no
    /// limit). The limit is counted from the current conflict total.
    pub fn set_conflict_budget(&mut self, x: i64) {
        self.conflict_budget = if x < 0 { -1 } else { self.conflicts as i64 + x };
    }

    /// Limit the number of propagations of the next solve (negative: no
    /// limit).
    pub fn set_propagation_budget(&mut self, x: i64) {
        self.propagation_budget = if x < 0 {
            -1
        } else {
            self.propagations as i64 + x
        };
    }

    /// Remove all solve budgets.
    pub fn budget_off(&mut self) {
        self.conflict_budget = -1;
        self.propagation_budget = -1;
    }

    /// Display adapter printing the model as a DIMACS `v` line.
    pub fn dimacs_model(&self) -> SolverPrintDimacs<Cb> {
        SolverPrintDimacs { s: self }
    }

    fn has_been_interrupted(&self) -> bool {
        self.asynch_interrupt.load(Ordering::Relaxed)
    }

    fn within_budget(&self) -> bool {
        !self.has_been_interrupted()
            && (self.conflict_budget < 0 || self.conflicts < self.conflict_budget as u64)
            && (self.propagation_budget < 0
                || self.propagations < self.propagation_budget as u64)
            && !self.cb.stop()
    }

    fn new_var(&mut self) -> Var {
        let v = self.next_var;
        self.next_var = Var::from_idx(v.idx() + 1);
        self.watches.init(Lit::new(v, false));
        self.watches.init(Lit::new(v, true));
        self.vars.ass.insert_default(v, lbool::UNDEF);
        self.vars.vardata.insert_default(v, VarData::default());
        self.vars.activity.insert_default(v, 0.0);
        self.seen.insert_default(v, false);
        self.polarity.insert_default(v, false);
        self.insert_var_order(v);
        v
    }

    /// Add clause; returns `false` if the clause set became unsatisfiable.
    ///
    /// Precondition: `clause` is sorted.
    fn add_clause_(&mut self, clause: &mut Vec<Lit>) -> bool {
        if !self.ok {
            return false;
        }

        // remove duplicates, drop clauses satisfied at level 0,
        // drop literals false at level 0
        let mut last_lit = Lit::UNDEF;
        let mut j = 0;
        for i in 0..clause.len() {
            let lit_i = clause[i];
            let value = self.vars.value_lit(lit_i);
            let lvl = self.vars.level(lit_i.var());
            if (value == lbool::TRUE && lvl == 0) || lit_i == !last_lit {
                return true; // tautology, or satisfied already at level 0
            } else if !(value == lbool::FALSE && lvl == 0) && lit_i != last_lit {
                // not a duplicate
                last_lit = lit_i;
                clause[j] = lit_i;
                j += 1;
            }
        }
        clause.truncate(j);

        if clause.is_empty() {
            self.ok = false;
            return false;
        } else if clause.len() == 1 {
            self.vars.unchecked_enqueue(clause[0], CRef::UNDEF);
        } else {
            let cr = self.ca.alloc(clause, false);
            self.clauses.push(cr);
            self.attach_clause(cr);
        }
        self.cb.on_new_clause(clause, clause::Kind::Original);
        true
    }

    /// Attach a clause to the watcher lists (watching its two first
    /// literals).
    fn attach_clause(&mut self, cr: CRef) {
        let (c0, c1, learnt, size) = {
            let c = self.ca.get(cr);
            debug_assert!(c.size() > 1);
            (c.lit(0), c.lit(1), c.learnt(), c.size())
        };
        self.watches[!c0].push(Watcher::new(cr, c1));
        self.watches[!c1].push(Watcher::new(cr, c0));
        if learnt {
            self.num_learnts += 1;
            self.learnts_literals += size as u64;
        } else {
            self.num_clauses += 1;
            self.clauses_literals += size as u64;
        }
    }

    /// Detach a clause from the watcher lists, lazily (the lists are
    /// filtered the next time they are visited).
    fn detach_clause(&mut self, cr: CRef) {
        let (c0, c1, size, learnt) = {
            let c = self.ca.get(cr);
            (c.lit(0), c.lit(1), c.size(), c.learnt())
        };
        debug_assert!(size > 1);
        self.watches.smudge(!c0);
        self.watches.smudge(!c1);
        if learnt {
            self.num_learnts -= 1;
            self.learnts_literals -= size as u64;
        } else {
            self.num_clauses -= 1;
            self.clauses_literals -= size as u64;
        }
    }

    /// Detach and free a clause.
    fn remove_clause(&mut self, cr: CRef) {
        self.detach_clause(cr);
        // don't leave a reason pointing into freed space
        if self.locked(cr) {
            let v = self.ca.get(cr).lit(0).var();
            self.vars.vardata[v].reason = CRef::UNDEF;
        }
        self.ca.get_mut(cr).set_mark(1);
        self.ca.free(cr);
    }

    /// `true` if the clause is the reason of some current assignment.
    fn locked(&self, cr: CRef) -> bool {
        let lit0 = self.ca.get(cr).lit(0);
        self.vars.value_lit(lit0) == lbool::TRUE && self.vars.reason(lit0.var()) == cr
    }

    fn satisfied(&self, c: ClauseRef) -> bool {
        c.iter().any(|lit| self.vars.value_lit(lit) == lbool::TRUE)
    }

    fn order_heap(&mut self) -> Heap<Var, VarOrder> {
        self.order_heap.promote(VarOrder {
            activity: &self.vars.activity,
        })
    }

    fn insert_var_order(&mut self, x: Var) {
        if !self.order_heap.in_heap(x) {
            self.order_heap().insert(x);
        }
    }

    fn rebuild_order_heap(&mut self) {
        let mut vs = vec![];
        for idx in 0..self.num_vars() {
            let v = Var::from_idx(idx);
            if self.vars.value(v) == lbool::UNDEF {
                vs.push(v);
            }
        }
        self.order_heap().build(&vs);
    }

    fn cla_decay_activity(&mut self) {
        self.cla_inc *= 1.0 / self.clause_decay;
    }

    fn cla_bump_activity(&mut self, cr: CRef) {
        let new_activity = {
            let mut c = self.ca.get_mut(cr);
            let r = c.activity() + self.cla_inc as f32;
            c.set_activity(r);
            r
        };
        if new_activity > 1e20 {
            // rescale
            for i in 0..self.learnts.len() {
                let cr = self.learnts[i];
                let mut c = self.ca.get_mut(cr);
                let r = c.activity() * 1e-20;
                c.set_activity(r);
            }
            self.cla_inc *= 1e-20;
        }
    }

    /// Seed activities from clause lengths (weight `2^-|c|` per literal
    /// occurrence); used by `Branching::JeroslowWang`.
    fn seed_jeroslow_wang(&mut self) {
        for (_, act) in self.vars.activity.iter_mut() {
            *act = 0.0;
        }
        for i in 0..self.clauses.len() {
            let c = self.ca.get(self.clauses[i]);
            let w = (0.5f64).powi(c.size() as i32);
            for lit in c.iter() {
                self.vars.activity[lit.var()] += w;
            }
        }
        self.rebuild_order_heap();
    }

    /// Pick the literal to branch on, or `Lit::UNDEF` when every variable
    /// is assigned. The polarity is the saved phase of the variable.
    fn pick_branch_lit(&mut self) -> Lit {
        let next = match self.branching {
            Branching::FixedOrder => {
                let mut found = Var::UNDEF;
                for idx in 0..self.num_vars() {
                    let v = Var::from_idx(idx);
                    if self.vars.value(v) == lbool::UNDEF {
                        found = v;
                        break;
                    }
                }
                found
            }
            Branching::Activity | Branching::JeroslowWang => {
                let mut next = Var::UNDEF;
                while next == Var::UNDEF || self.vars.value(next) != lbool::UNDEF {
                    if self.order_heap.is_empty() {
                        next = Var::UNDEF;
                        break;
                    }
                    next = self.order_heap().remove_min();
                }
                next
            }
        };
        if next == Var::UNDEF {
            Lit::UNDEF
        } else {
            Lit::new(next, self.polarity[next])
        }
    }

    /// Propagates all enqueued facts.
    ///
    /// If a conflict arises, the conflicting clause is returned,
    /// otherwise `None`.
    ///
    /// Post-condition: the propagation queue is empty, even if there was
    /// a conflict.
    fn propagate(&mut self) -> Option<CRef> {
        let mut confl = None;
        let mut num_props: u32 = 0;

        while self.qhead < self.vars.trail.len() {
            // `p` is the next enqueued fact to propagate.
            let p = self.vars.trail[self.qhead];
            self.qhead += 1;
            num_props += 1;

            if self.watches.is_dirty(p) {
                let pred = WatcherDeleted { ca: &self.ca };
                self.watches.clean_pred(p, &pred);
            }
            let mut ws = self.watches.take(p);
            let mut i: usize = 0;
            let mut j: usize = 0;
            let end: usize = ws.len();
            'clauses: while i < end {
                // try to avoid inspecting the clause
                let blocker = ws[i].blocker;
                if self.vars.value_lit(blocker) == lbool::TRUE {
                    ws[j] = ws[i];
                    j += 1;
                    i += 1;
                    continue;
                }

                // make sure the false literal is at index 1
                let cr = ws[i].cref;
                let mut c = self.ca.get_mut(cr);
                let false_lit = !p;
                if c.lit(0) == false_lit {
                    c.swap_lits(0, 1);
                }
                debug_assert_eq!(c.lit(1), false_lit);
                i += 1;

                // if the first watch is true, the clause is satisfied
                let first = c.lit(0);
                let w = Watcher::new(cr, first);
                if first != blocker && self.vars.value_lit(first) == lbool::TRUE {
                    ws[j] = w;
                    j += 1;
                    continue;
                }

                // look for a new literal to watch
                for k in 2..c.size() {
                    if self.vars.value_lit(c.lit(k)) != lbool::FALSE {
                        c.swap_lits(1, k);
                        let new_watch = !c.lit(1);
                        // `new_watch` cannot be `p`: the chosen literal is
                        // not false, while `p` is true on the trail
                        debug_assert_ne!(new_watch, p);
                        self.watches[new_watch].push(w);
                        continue 'clauses;
                    }
                }

                // no new watch: the clause is unit under the assignment
                ws[j] = w;
                j += 1;
                if self.vars.value_lit(first) == lbool::FALSE {
                    // all literals false: conflict
                    confl = Some(cr);
                    self.qhead = self.vars.trail.len();
                    // copy the remaining watches
                    while i < end {
                        ws[j] = ws[i];
                        j += 1;
                        i += 1;
                    }
                } else {
                    self.vars.unchecked_enqueue(first, cr);
                }
            }
            ws.truncate(j);
            self.watches.put(p, ws);
        }
        self.propagations += num_props as u64;
        self.simp_db_props -= num_props as i64;

        confl
    }

    /// An abstraction of the level of a variable (a 32-bit set of level
    /// residues), used by deep conflict-clause minimization.
    #[inline]
    fn abstract_level(&self, v: Var) -> u32 {
        1 << (self.vars.level(v) & 31)
    }

    /// Analyze a conflict and produce the learnt clause (first-UIP).
    ///
    /// Pre-conditions: the current decision level is above 0 and `confl`
    /// is false under the current trail.
    ///
    /// Post-conditions: `out_learnt[0]` is the asserting literal; if
    /// `out_learnt.len() > 1` then `out_learnt[1]` has the greatest
    /// decision level of the remaining literals, and the returned
    /// backtrack level is that level.
    fn analyze(&mut self, mut confl: CRef, out_learnt: &mut Vec<Lit>) -> i32 {
        debug_assert!(self.vars.decision_level() > 0);
        out_learnt.clear();
        out_learnt.push(Lit::UNDEF); // leave room for the asserting literal

        let mut path_c: i32 = 0;
        let mut p = Lit::UNDEF;
        let mut index = self.vars.trail.len();
        let conflict_level = self.vars.decision_level() as i32;

        loop {
            debug_assert_ne!(confl, CRef::UNDEF, "resolved past a decision");
            if self.ca.get(confl).learnt() {
                self.cla_bump_activity(confl);
            }
            let c = self.ca.get(confl);
            // when resolving with the reason of `p`, its first literal is
            // `p` itself and cannot appear in the learnt clause
            debug_assert!(p == Lit::UNDEF || c.lit(0).var() == p.var());
            let start = if p == Lit::UNDEF { 0 } else { 1 };
            for k in start..c.size() {
                let q = c.lit(k);
                let lvl = self.vars.level(q.var());
                debug_assert!(lvl <= conflict_level);
                if !self.seen[q.var()] && lvl > 0 {
                    if self.branching == Branching::Activity {
                        self.vars.var_bump_activity(&mut self.order_heap, q.var());
                    }
                    self.seen[q.var()] = true;
                    if lvl >= conflict_level {
                        // must be eliminated by resolution
                        path_c += 1;
                    } else {
                        out_learnt.push(q);
                    }
                }
            }

            // select the next trail literal to resolve on
            while !self.seen[self.vars.trail[index - 1].var()] {
                index -= 1;
            }
            index -= 1;
            p = self.vars.trail[index];
            confl = self.vars.reason(p.var());
            self.seen[p.var()] = false;
            path_c -= 1;
            if path_c <= 0 {
                break;
            }
        }

        // `p` is the first unique implication point
        debug_assert_eq!(self.vars.value_lit(p), lbool::TRUE);
        out_learnt[0] = !p;

        trace!("analyze-learnt: {:?} (before minimization)", &out_learnt);
        self.max_literals += out_learnt.len() as u64;
        self.minimize_conflict(out_learnt);
        self.tot_literals += out_learnt.len() as u64;

        // find the correct backtrack level
        let btlevel = if out_learnt.len() == 1 {
            0
        } else {
            let mut max_i = 1;
            let mut max_level = self.vars.level(out_learnt[max_i].var());
            for i in 2..out_learnt.len() {
                let level = self.vars.level(out_learnt[i].var());
                if level > max_level {
                    max_i = i;
                    max_level = level;
                }
            }
            // swap-in this literal at index 1
            out_learnt.swap(max_i, 1);
            max_level
        };

        for i in 0..self.analyze_toclear.len() {
            let v = self.analyze_toclear[i].var();
            self.seen[v] = false; // `seen` is now cleared
        }

        debug_assert!(out_learnt
            .iter()
            .all(|&l| self.vars.value_lit(l) == lbool::FALSE));
        btlevel
    }

    /// Shrink the learnt clause by removing literals implied by the rest
    /// of it (controlled by `ccmin_mode`).
    fn minimize_conflict(&mut self, out_learnt: &mut Vec<Lit>) {
        self.analyze_toclear.clear();
        self.analyze_toclear.extend_from_slice(out_learnt);
        let new_size = if self.ccmin_mode == 2 {
            let mut abstract_levels = 0;
            for a in out_learnt[1..].iter() {
                abstract_levels |= self.abstract_level(a.var());
            }

            let mut j = 1;
            for i in 1..out_learnt.len() {
                let lit = out_learnt[i];
                // `lit` can be dropped only if it is redundant and not a
                // decision
                if self.vars.reason(lit.var()) == CRef::UNDEF
                    || !self.lit_redundant(lit, abstract_levels)
                {
                    out_learnt[j] = lit;
                    j += 1;
                }
            }
            j
        } else if self.ccmin_mode == 1 {
            let mut j = 1;
            for i in 1..out_learnt.len() {
                let lit = out_learnt[i];
                let reason = self.vars.reason(lit.var());

                let retain = if reason == CRef::UNDEF {
                    true
                } else {
                    let c = self.ca.get(reason);
                    let mut retain = false;
                    for k in 1..c.size() {
                        let v = c.lit(k).var();
                        if !self.seen[v] && self.vars.level(v) > 0 {
                            retain = true;
                            break;
                        }
                    }
                    retain
                };
                if retain {
                    out_learnt[j] = lit;
                    j += 1;
                }
            }
            j
        } else {
            out_learnt.len()
        };

        debug_assert!(new_size <= out_learnt.len());
        out_learnt.truncate(new_size);
    }

    /// Check whether `p` can be removed from the learnt clause: it can,
    /// when it is implied by literals already in the clause (or at level
    /// 0), found by walking its reason clauses.
    fn lit_redundant(&mut self, p: Lit, abstract_levels: u32) -> bool {
        self.minimize_stack.clear();
        self.minimize_stack.push(p);

        let top = self.analyze_toclear.len();

        while let Some(q) = self.minimize_stack.pop() {
            let cr = self.vars.reason(q.var());
            debug_assert_ne!(cr, CRef::UNDEF);
            let c = self.ca.get(cr);
            for k in 1..c.size() {
                let l = c.lit(k);
                if self.vars.level(l.var()) == 0 || self.seen[l.var()] {
                    continue;
                }
                if self.vars.reason(l.var()) != CRef::UNDEF
                    && (self.abstract_level(l.var()) & abstract_levels) != 0
                {
                    self.seen[l.var()] = true;
                    self.minimize_stack.push(l);
                    self.analyze_toclear.push(l);
                } else {
                    // `l` cannot be resolved away: undo and keep `p`
                    for i in top..self.analyze_toclear.len() {
                        let v = self.analyze_toclear[i].var();
                        self.seen[v] = false;
                    }
                    self.analyze_toclear.truncate(top);
                    return false;
                }
            }
        }

        true
    }

    /// Revert to the state at the given level (keeping all assignments at
    /// `level` but not beyond). Calling it at or below the current level
    /// is a no-op, so `cancel_until(0)` is idempotent.
    fn cancel_until(&mut self, level: u32) {
        if self.vars.decision_level() <= level {
            return;
        }
        let trail_lim_last = *self.vars.trail_lim.last().expect("trail_lim is empty") as usize;
        let trail_lim_level = self.vars.trail_lim[level as usize] as usize;
        for c in (trail_lim_level..self.vars.trail.len()).rev() {
            let lit = self.vars.trail[c];
            let x = lit.var();
            self.vars.ass[x] = lbool::UNDEF;
            if self.phase_saving > 1 || (self.phase_saving == 1 && c > trail_lim_last) {
                self.polarity[x] = lit.sign();
            }
            self.insert_var_order(x);
        }
        self.qhead = trail_lim_level;
        self.vars.trail.truncate(trail_lim_level);
        self.vars.trail_lim.truncate(level as usize);
    }

    /// Search for a model for up to `nof_conflicts` conflicts (negative
    /// for no limit).
    ///
    /// Returns `lbool::TRUE` if a model was found, `lbool::FALSE` if the
    /// clause set is unsatisfiable, and `lbool::UNDEF` if the conflict
    /// allowance or a budget ran out first.
    fn search(&mut self, nof_conflicts: i32, tmp_learnt: &mut Vec<Lit>) -> lbool {
        debug_assert!(self.ok);
        let mut conflict_c: i32 = 0;
        self.starts += 1;

        loop {
            // boolean propagation
            let confl = self.propagate();
            if self.vars.trail.len() > self.max_trail {
                self.max_trail = self.vars.trail.len();
            }

            if let Some(confl) = confl {
                // conflict
                self.conflicts += 1;
                conflict_c += 1;
                if self.vars.decision_level() == 0 {
                    // conflict with no open decision: unsatisfiable
                    return lbool::FALSE;
                }

                let btlevel = self.analyze(confl, tmp_learnt);
                debug!(
                    "learnt clause {} (backjump to {})",
                    tmp_learnt.pp_dimacs(),
                    btlevel
                );
                self.cancel_until(btlevel as u32);
                self.cb.on_new_clause(tmp_learnt, clause::Kind::Learnt);

                if tmp_learnt.len() == 1 {
                    // the asserting literal is a fact at level 0
                    self.vars.unchecked_enqueue(tmp_learnt[0], CRef::UNDEF);
                } else {
                    let cr = self.ca.alloc(tmp_learnt, true);
                    self.learnts.push(cr);
                    self.attach_clause(cr);
                    self.cla_bump_activity(cr);
                    self.vars.unchecked_enqueue(tmp_learnt[0], cr);
                }

                if self.branching == Branching::Activity {
                    self.vars.var_decay_activity();
                }
                self.cla_decay_activity();

                self.learntsize_adjust_cnt -= 1;
                if self.learntsize_adjust_cnt == 0 {
                    self.learntsize_adjust_confl *= self.learntsize_adjust_inc;
                    self.learntsize_adjust_cnt = self.learntsize_adjust_confl as i32;
                    self.max_learnts *= self.learntsize_inc;

                    let status = ProgressStatus {
                        conflicts: self.conflicts as i32,
                        n_clauses: self.num_clauses,
                        n_learnt: self.num_learnts,
                        max_learnt: self.max_learnts as i32,
                        trail_len: self.vars.trail.len(),
                        progress_estimate: self.progress_estimate() * 100.0,
                    };
                    self.cb.on_progress(move || status);
                }
            } else {
                // no conflict
                if (nof_conflicts >= 0 && conflict_c >= nof_conflicts) || !self.within_budget() {
                    // reached the bound on number of conflicts
                    self.progress_estimate = self.progress_estimate();
                    self.cancel_until(0);
                    return lbool::UNDEF;
                }

                // simplify the set of problem clauses
                if self.vars.decision_level() == 0 && !self.simplify_internal() {
                    return lbool::FALSE;
                }

                if self.learnts.len() as f64 - self.vars.num_assigns() as f64 >= self.max_learnts {
                    // reduce the set of learnt clauses
                    self.reduce_db();
                }

                // new variable decision
                let next = self.pick_branch_lit();
                if next == Lit::UNDEF {
                    // all variables assigned without conflict: model found
                    return lbool::TRUE;
                }
                self.decisions += 1;
                debug!("pick-next {:?}", next);
                self.vars.new_decision_level();
                self.vars.unchecked_enqueue(next, CRef::UNDEF);
            }
        }
    }

    /// Main solve method.
    fn solve_internal(&mut self) -> lbool {
        assert_eq!(self.vars.decision_level(), 0);
        self.model.clear();
        if !self.ok {
            return lbool::FALSE;
        }
        self.solves += 1;
        let mut tmp_learnt: Vec<Lit> = vec![];

        if self.branching == Branching::JeroslowWang {
            self.seed_jeroslow_wang();
        }

        self.max_learnts = self.num_clauses as f64 * self.learntsize_factor;
        if self.max_learnts < self.min_learnts_lim as f64 {
            self.max_learnts = self.min_learnts_lim as f64;
        }
        self.learntsize_adjust_confl = self.learntsize_adjust_start_confl as f64;
        self.learntsize_adjust_cnt = self.learntsize_adjust_confl as i32;

        info!("search.start");
        self.cb.on_start();

        // search, restarting on the Luby schedule; learnt clauses and
        // activities survive each restart
        let mut status;
        let mut curr_restarts: i32 = 0;
        loop {
            let rest_base = if self.luby_restart {
                utils::luby(self.restart_inc, curr_restarts)
            } else {
                self.restart_inc.powi(curr_restarts)
            };
            let nof_conflicts = (rest_base * self.restart_first as f64) as i32;
            status = self.search(nof_conflicts, &mut tmp_learnt);
            if !self.within_budget() {
                break;
            }
            if status != lbool::UNDEF {
                break;
            }
            info!("search.restart({})", curr_restarts);
            curr_restarts += 1;
            self.cb.on_restart();
        }

        self.cb.on_result(status);

        if status == lbool::TRUE {
            // extend & copy model
            let num_vars = self.num_vars();
            self.model.resize(num_vars as usize, lbool::UNDEF);
            for i in 0..num_vars {
                self.model[i as usize] = self.vars.value(Var::from_idx(i));
            }
        } else if status == lbool::FALSE {
            self.ok = false;
        }

        self.cancel_until(0);
        debug!("res: {:?}", status);
        status
    }

    fn simplify_internal(&mut self) -> bool {
        debug_assert_eq!(self.vars.decision_level(), 0);

        if !self.ok || self.propagate().is_some() {
            self.ok = false;
            return false;
        }

        if self.vars.num_assigns() as i32 == self.simp_db_assigns || self.simp_db_props > 0 {
            return true;
        }

        self.remove_satisfied_learnts();
        self.check_garbage();
        self.rebuild_order_heap();

        self.simp_db_assigns = self.vars.num_assigns() as i32;
        self.simp_db_props = (self.clauses_literals + self.learnts_literals) as i64;

        true
    }

    /// Drop learnt clauses satisfied by the level-0 assignment.
    fn remove_satisfied_learnts(&mut self) {
        debug_assert_eq!(self.vars.decision_level(), 0);
        let mut learnts = mem::take(&mut self.learnts);
        learnts.retain(|&cr| {
            let satisfied = {
                let c = self.ca.get(cr);
                self.satisfied(c)
            };
            if satisfied {
                debug!("remove satisfied clause {:?}", cr);
                self.remove_clause(cr);
            }
            !satisfied
        });
        self.learnts = learnts;
    }

    /// Remove half of the learnt clauses, minus the clauses locked by the
    /// current assignment. Binary clauses are never removed.
    fn reduce_db(&mut self) {
        debug!("reduce_db.start");
        // remove any clause below this activity
        let extra_lim = self.cla_inc / self.learnts.len() as f64;

        {
            let ca = &self.ca;
            self.learnts.sort_unstable_by(|&x, &y| {
                let x = ca.get(x);
                let y = ca.get(y);
                debug_assert!(x.learnt());
                debug_assert!(y.learnt());
                Ord::cmp(&(x.size() <= 2), &(y.size() <= 2)).then(
                    PartialOrd::partial_cmp(&x.activity(), &y.activity()).expect("NaN activity"),
                )
            });
        }

        // don't delete binary or locked clauses; from the rest, delete
        // clauses from the first half and clauses below `extra_lim`
        let total = self.learnts.len();
        let mut j = 0;
        for i in 0..total {
            let cr = self.learnts[i];
            let cond = {
                let c = self.ca.get(cr);
                c.size() > 2
                    && !self.locked(cr)
                    && (i < total / 2 || (c.activity() as f64) < extra_lim)
            };
            if cond {
                let lits: Vec<Lit> = self.ca.get(cr).iter().collect();
                self.remove_clause(cr);
                self.cb.on_delete_clause(&lits);
            } else {
                self.learnts[j] = cr;
                j += 1;
            }
        }
        let _deleted = total - j;
        self.learnts.truncate(j);

        debug!("reduce_db.done (deleted {})", _deleted);

        self.check_garbage();
    }

    /// Check whether the space wasted by dead clauses in the arena
    /// exceeds the threshold.
    fn check_garbage(&mut self) {
        if self.ca.wasted() as f64 > self.ca.len() as f64 * self.garbage_frac {
            self.garbage_collect();
        }
    }

    /// Garbage collect the clause arena by moving alive clauses into a
    /// fresh one.
    fn garbage_collect(&mut self) {
        // size the next arena by the estimated live portion, to avoid
        // growth reallocations
        let mut to = ClauseAllocator::with_start_cap(self.ca.len() - self.ca.wasted());
        self.reloc_all(&mut to);
        self.cb
            .on_gc(self.ca.len() as usize * 4, to.len() as usize * 4);
        self.ca = to;
    }

    /// Move every live clause to the allocator `to`, rewriting all
    /// `CRef`s (watches, reasons, clause lists).
    fn reloc_all(&mut self, to: &mut ClauseAllocator) {
        // watch lists
        {
            let pred = WatcherDeleted { ca: &self.ca };
            self.watches.clean_all_pred(&pred);
        }
        for v_idx in 0..self.num_vars() {
            for &sign in &[false, true] {
                let p = Lit::new(Var::from_idx(v_idx), sign);
                for w in &mut self.watches[p] {
                    self.ca.reloc(&mut w.cref, to);
                }
            }
        }

        // reasons of trail literals
        for i in 0..self.vars.trail.len() {
            let v = self.vars.trail[i].var();
            let reason = self.vars.vardata[v].reason;
            // a reason of a removed clause is left dangling unless the
            // clause is locked; it is never dereferenced in that case
            if reason != CRef::UNDEF {
                let keep = {
                    let c = self.ca.get(reason);
                    c.reloced() || self.locked(reason)
                };
                if keep {
                    self.ca.reloc(&mut self.vars.vardata[v].reason, to);
                }
            }
        }

        // learnt clauses
        let mut j = 0;
        for i in 0..self.learnts.len() {
            let mut cr = self.learnts[i];
            if self.ca.get(cr).mark() != 1 {
                self.ca.reloc(&mut cr, to);
                self.learnts[j] = cr;
                j += 1;
            }
        }
        self.learnts.truncate(j);

        // original clauses
        let mut j = 0;
        for i in 0..self.clauses.len() {
            let mut cr = self.clauses[i];
            if self.ca.get(cr).mark() != 1 {
                self.ca.reloc(&mut cr, to);
                self.clauses[j] = cr;
                j += 1;
            }
        }
        self.clauses.truncate(j);
    }

    fn progress_estimate(&self) -> f64 {
        let mut progress = 0.0;
        let f = 1.0 / self.num_vars() as f64;

        for i in 0..self.vars.decision_level() + 1 {
            let beg: i32 = if i == 0 {
                0
            } else {
                self.vars.trail_lim[i as usize - 1]
            };
            let end: i32 = if i == self.vars.decision_level() {
                self.vars.trail.len() as i32
            } else {
                self.vars.trail_lim[i as usize]
            };
            progress += f.powi(i as i32) * (end - beg) as f64;
        }

        progress / self.num_vars() as f64
    }
}

impl VarState {
    fn new(opts: &SolverOpts) -> Self {
        Self {
            ass: VMap::new(),
            vardata: VMap::new(),
            activity: VMap::new(),
            var_inc: 1.0,
            var_decay: opts.var_decay,
            trail: vec![],
            trail_lim: vec![],
        }
    }

    #[inline(always)]
    fn num_assigns(&self) -> u32 {
        self.trail.len() as u32
    }

    #[inline(always)]
    fn decision_level(&self) -> u32 {
        self.trail_lim.len() as u32
    }

    /// Begins a new decision level.
    fn new_decision_level(&mut self) {
        let lvl = self.trail.len() as i32;
        self.trail_lim.push(lvl);
    }

    #[inline(always)]
    fn value(&self, x: Var) -> lbool {
        self.ass[x]
    }

    #[inline(always)]
    fn value_lit(&self, x: Lit) -> lbool {
        self.ass[x.var()] ^ !x.sign()
    }

    #[inline(always)]
    fn level(&self, x: Var) -> i32 {
        self.vardata[x].level
    }

    #[inline(always)]
    fn reason(&self, x: Var) -> CRef {
        self.vardata[x].reason
    }

    /// Assign a literal at the current decision level. Assigning an
    /// already-assigned variable is a contract violation, not a
    /// recoverable state.
    fn unchecked_enqueue(&mut self, p: Lit, from: CRef) {
        debug_assert_eq!(
            self.value_lit(p),
            lbool::UNDEF,
            "lit {:?} should be undef",
            p
        );
        self.ass[p.var()] = lbool::new(p.sign());
        self.vardata[p.var()] = VarData::new(from, self.decision_level() as i32);
        self.trail.push(p);
    }

    fn var_decay_activity(&mut self) {
        self.var_inc *= 1.0 / self.var_decay;
    }

    /// Increase a variable's activity by the current bump value.
    fn var_bump_activity(&mut self, order_heap: &mut HeapData<Var>, v: Var) {
        self.activity[v] += self.var_inc;
        if self.activity[v] > 1e100 {
            // rescale to avoid float overflow
            for (_, x) in self.activity.iter_mut() {
                *x *= 1e-100;
            }
            self.var_inc *= 1e-100;
        }

        // update the heap position with respect to the new activity
        let mut heap = order_heap.promote(VarOrder {
            activity: &self.activity,
        });
        if heap.in_heap(v) {
            heap.decrease(v);
        }
    }
}

/// Print the model as a DIMACS `v` line.
pub struct SolverPrintDimacs<'a, Cb: Callbacks + 'a> {
    s: &'a Solver<Cb>,
}

impl<'a, Cb: Callbacks> fmt::Display for SolverPrintDimacs<'a, Cb> {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "v ")?;
        for (i, &val) in self.s.model.iter().enumerate() {
            if val == lbool::TRUE {
                write!(out, "{} ", i + 1)?
            } else if val == lbool::FALSE {
                write!(out, "-{} ", i + 1)?
            }
        }
        writeln!(out, "0")
    }
}

#[derive(Debug, Clone, Copy)]
struct VarData {
    reason: CRef,
    level: i32,
}

impl Default for VarData {
    fn default() -> Self {
        Self {
            reason: CRef::UNDEF,
            level: 0,
        }
    }
}

impl VarData {
    #[inline(always)]
    fn new(reason: CRef, level: i32) -> Self {
        Self { reason, level }
    }
}

#[derive(Debug, Clone, Copy)]
struct Watcher {
    cref: CRef,
    blocker: Lit,
}

impl Watcher {
    fn new(cref: CRef, blocker: Lit) -> Self {
        Self { cref, blocker }
    }
}

impl PartialEq for Watcher {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.cref == rhs.cref
    }
}
impl Eq for Watcher {}

/// Heap ordering: higher activity first, ties broken by variable index.
struct VarOrder<'a> {
    activity: &'a VMap<f64>,
}

impl<'a> Comparator<Var> for VarOrder<'a> {
    fn cmp(&self, lhs: &Var, rhs: &Var) -> cmp::Ordering {
        PartialOrd::partial_cmp(&self.activity[*rhs], &self.activity[*lhs])
            .expect("NaN activity")
            .then_with(|| lhs.idx().cmp(&rhs.idx()))
    }
}

/// Predicate to test whether a clause has been removed from some lit's
/// watchlist.
struct WatcherDeleted<'a> {
    ca: &'a ClauseAllocator,
}

impl<'a> DeletePred<Watcher> for WatcherDeleted<'a> {
    #[inline]
    fn deleted(&self, w: &Watcher) -> bool {
        self.ca.get(w.cref).mark() == 1
    }
}

mod utils {
    /// Finite subsequences of the Luby sequence:
    ///
    /// > 0: 1
    /// > 1: 1 1 2
    /// > 2: 1 1 2 1 1 2 4
    /// > 3: 1 1 2 1 1 2 4 1 1 2 1 1 2 4 8
    /// ...
    pub(super) fn luby(y: f64, mut x: i32) -> f64 {
        // find the finite subsequence that contains index `x`, and the
        // size of that subsequence
        let mut size = 1;
        let mut seq = 0;
        while size < x + 1 {
            seq += 1;
            size = 2 * size + 1;
        }

        while size - 1 != x {
            size = (size - 1) >> 1;
            seq -= 1;
            x = x % size;
        }

        y.powi(seq)
    }
}

/// Configuration of a [`Solver`], validated by [`SolverOpts::check`].
#[derive(Debug, Clone)]
pub struct SolverOpts {
    /// Inverse of the activity decay factor applied per conflict.
    pub var_decay: f64,
    /// Inverse of the learnt-clause activity decay factor.
    pub clause_decay: f64,
    /// Conflict clause minimization (0=none, 1=basic, 2=deep).
    pub ccmin_mode: i32,
    /// Level of phase saving (0=none, 1=limited, 2=full).
    pub phase_saving: i32,
    /// Use the Luby restart schedule (geometric growth otherwise).
    pub luby_restart: bool,
    /// The base restart interval, in conflicts.
    pub restart_first: i32,
    /// Restart interval scale factor.
    pub restart_inc: f64,
    /// Fraction of wasted arena space tolerated before GC.
    pub garbage_frac: f64,
    /// Minimum learnt-clause limit.
    pub min_learnts_lim: i32,
    /// Decision strategy.
    pub branching: Branching,
}

impl Default for SolverOpts {
    fn default() -> SolverOpts {
        Self {
            var_decay: 0.95,
            clause_decay: 0.999,
            ccmin_mode: 2,
            phase_saving: 2,
            luby_restart: true,
            restart_first: 100,
            restart_inc: 2.0,
            garbage_frac: 0.20,
            min_learnts_lim: 0,
            branching: Branching::Activity,
        }
    }
}

impl SolverOpts {
    /// Check that options are valid.
    pub fn check(&self) -> bool {
        (0.0 < self.var_decay && self.var_decay < 1.0)
            && (0.0 < self.clause_decay && self.clause_decay < 1.0)
            && (self.ccmin_mode >= 0 && self.ccmin_mode <= 2)
            && (self.phase_saving >= 0 && self.phase_saving <= 2)
            && self.restart_first >= 1
            && self.restart_inc >= 1.0
            && self.garbage_frac > 0.0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::callbacks::Basic;

    fn detached_solver() -> Solver<Basic> {
        Solver::new(SolverOpts::default(), Basic::new())
    }

    fn add(s: &mut Solver<Basic>, ints: &[i32]) -> bool {
        let mut lits: Vec<Lit> = ints
            .iter()
            .map(|&i| Lit::new(s.var_of_int((i.abs() - 1) as u32), i > 0))
            .collect();
        s.add_clause_reuse(&mut lits)
    }

    #[test]
    fn test_luby_prefix() {
        let expect = [1., 1., 2., 1., 1., 2., 4., 1., 1., 2., 1., 1., 2., 4., 8.];
        for (i, &e) in expect.iter().enumerate() {
            assert_eq!(utils::luby(2.0, i as i32), e, "luby({})", i);
        }
    }

    #[test]
    fn test_propagation_only_unsat_without_decisions() {
        // {(x1 v x2), (-x1 v x2), (-x2)}: propagation alone refutes it
        let mut s = detached_solver();
        add(&mut s, &[1, 2]);
        add(&mut s, &[-1, 2]);
        add(&mut s, &[-2]);
        assert_eq!(s.solve_limited(), lbool::FALSE);
        assert_eq!(s.num_decisions(), 0);
        assert!(!s.is_ok());
    }

    #[test]
    fn test_trail_consistency_after_decide_propagate_backtrack() {
        let mut s = detached_solver();
        add(&mut s, &[1, 2, 3]);
        add(&mut s, &[-1, 2]);
        add(&mut s, &[-2, 3]);

        // decide -x3 and propagate to a fixpoint
        let l3 = Lit::new(Var::from_idx(2), false);
        s.vars.new_decision_level();
        s.vars.unchecked_enqueue(l3, CRef::UNDEF);
        assert!(s.propagate().is_none());

        let assigned = (0..s.num_vars())
            .map(Var::from_idx)
            .filter(|&v| s.vars.value(v) != lbool::UNDEF)
            .count();
        assert_eq!(assigned, s.vars.trail.len());

        let mut vars_on_trail: Vec<u32> =
            s.vars.trail.iter().map(|l| l.var().idx()).collect();
        vars_on_trail.sort_unstable();
        vars_on_trail.dedup();
        assert_eq!(vars_on_trail.len(), s.vars.trail.len(), "no duplicates");

        // backtracking restores every variable of the level
        s.cancel_until(0);
        assert_eq!(s.vars.decision_level(), 0);
        assert_eq!(s.vars.value(l3.var()), lbool::UNDEF);

        // a second backtrack to 0 changes nothing
        let trail_before = s.vars.trail.clone();
        s.cancel_until(0);
        assert_eq!(trail_before, s.vars.trail);
    }

    #[test]
    fn test_learnt_unit_enqueued_at_level_zero() {
        // forces the solver through at least one conflict
        let mut s = detached_solver();
        add(&mut s, &[1, 2]);
        add(&mut s, &[1, -2]);
        add(&mut s, &[-1, 2]);
        assert_eq!(s.solve_limited(), lbool::TRUE);
        assert_eq!(s.value_var(Var::from_idx(0)), lbool::TRUE);
        assert_eq!(s.value_var(Var::from_idx(1)), lbool::TRUE);
    }

    #[test]
    fn test_add_clause_after_unsat_returns_false() {
        let mut s = detached_solver();
        add(&mut s, &[1]);
        add(&mut s, &[-1]);
        assert_eq!(s.solve_limited(), lbool::FALSE);
        assert!(!add(&mut s, &[2]));
    }

    #[test]
    fn test_conflict_budget_reports_unknown() {
        let mut s = detached_solver();
        // pigeonhole 4 into 3: needs more than one conflict
        let clauses = crate::gen::pigeonhole(4, 3);
        for c in &clauses {
            add(&mut s, c);
        }
        s.set_conflict_budget(1);
        assert_eq!(s.solve_limited(), lbool::UNDEF);
        assert!(s.is_ok());
        assert!(s.num_conflicts() >= 1);
        // removing the budget lets the same solver finish the proof
        s.budget_off();
        assert_eq!(s.solve_limited(), lbool::FALSE);
    }

    #[test]
    fn test_max_trail_tracks_peak() {
        let mut s = detached_solver();
        add(&mut s, &[1, 2]);
        add(&mut s, &[-1, 3]);
        assert_eq!(s.solve_limited(), lbool::TRUE);
        assert!(s.max_trail() >= 2);
        assert!(s.max_trail() <= s.num_vars() as usize);
    }
}
