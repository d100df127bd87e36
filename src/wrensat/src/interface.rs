/* Main Interface */

use crate::clause::{lbool, Lit, Var};

/// Main interface for a solver: it makes it possible to add clauses,
/// allocate variables, and check for satisfiability.
///
/// This is the narrow seam through which collaborators (the DIMACS
/// parser, instance generators, the benchmarking frontend) drive the
/// solver; none of them touch the search state directly.
pub trait SolverInterface {
    fn num_vars(&self) -> u32;
    fn num_clauses(&self) -> u64;

    /// Number of conflicts hit so far.
    fn num_conflicts(&self) -> u64;
    /// Number of unit propagations performed so far.
    fn num_propagations(&self) -> u64;
    /// Number of decisions taken so far.
    fn num_decisions(&self) -> u64;
    /// Number of restarts performed so far.
    fn num_restarts(&self) -> u64;
    /// Number of learnt clauses currently retained.
    fn num_learnts(&self) -> u64;
    /// Peak length of the assignment trail.
    fn max_trail(&self) -> usize;

    /// `false` once the clause set is known unsatisfiable at level 0; no
    /// further solving will change the answer.
    fn is_ok(&self) -> bool;

    /// Print some current statistics to standard output.
    fn print_stats(&self);

    /// Create a new SAT variable in the solver.
    fn new_var_default(&mut self) -> Var;

    /// Obtain the variable of the given 0-based index, creating any
    /// missing variables up to it. This is how DIMACS integers map onto
    /// solver variables.
    fn var_of_int(&mut self, v_idx: u32) -> Var;

    /// Add a clause to the solver (the vector may be reordered and is
    /// reusable afterwards). Returns `false` if the solver is in an
    /// `UNSAT` state.
    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool;

    /// Simplify the clause database according to the current top-level
    /// assignment. Returns `false` if the clause set is unsatisfiable.
    fn simplify(&mut self) -> bool;

    /// Search for a model, within the configured budgets.
    ///
    /// Returns `lbool::TRUE` (satisfiable, model available),
    /// `lbool::FALSE` (unsatisfiable), or `lbool::UNDEF` (budget or
    /// cancellation fired first).
    fn solve_limited(&mut self) -> lbool;

    /// Query whole model
    ///
    /// Precondition: last result was `Sat` (ie `lbool::TRUE`)
    fn get_model(&self) -> &[lbool];

    /// Query model for var
    ///
    /// Precondition: last result was `Sat` (ie `lbool::TRUE`)
    fn value_var(&self, v: Var) -> lbool;

    /// Query model for lit
    fn value_lit(&self, lit: Lit) -> lbool;
}
