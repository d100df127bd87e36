extern crate wrensat;

use wrensat::{
    gen, lbool, BasicSolver, Branching, Callbacks, ClauseKind, Lit, Solver, SolverInterface,
    SolverOpts,
};

/// Satisfiability by exhaustive enumeration, for small variable counts.
fn brute_force(num_vars: u32, clauses: &[Vec<i32>]) -> bool {
    assert!(num_vars <= 20, "brute force only checks small instances");
    (0u32..1 << num_vars).any(|mask| satisfies_all(clauses, mask))
}

fn satisfies_all(clauses: &[Vec<i32>], mask: u32) -> bool {
    clauses.iter().all(|c| satisfies_clause(c, mask))
}

fn satisfies_clause(clause: &[i32], mask: u32) -> bool {
    clause.iter().any(|&l| {
        let value = (mask >> (l.abs() - 1)) & 1 == 1;
        if l > 0 {
            value
        } else {
            !value
        }
    })
}

fn solver_with(opts: SolverOpts, clauses: &[Vec<i32>]) -> BasicSolver {
    let mut solver = BasicSolver::new(opts, Default::default());
    gen::load_into(&mut solver, clauses);
    solver
}

fn solve(clauses: &[Vec<i32>]) -> lbool {
    solver_with(SolverOpts::default(), clauses).solve_limited()
}

fn max_var(clauses: &[Vec<i32>]) -> u32 {
    clauses
        .iter()
        .flat_map(|c| c.iter())
        .map(|l| l.abs() as u32)
        .max()
        .unwrap_or(0)
}

/// Deterministic pseudo-random 3-SAT instance.
fn random_3sat(seed: u64, num_vars: u32, num_clauses: u32) -> Vec<Vec<i32>> {
    let mut state = seed.wrapping_mul(0x9E3779B97F4A7C15).wrapping_add(1);
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as u32
    };
    let mut clauses = vec![];
    for _ in 0..num_clauses {
        let mut clause = vec![];
        while clause.len() < 3 {
            let v = (next() % num_vars + 1) as i32;
            if clause.iter().any(|&l: &i32| l.abs() == v) {
                continue;
            }
            clause.push(if next() % 2 == 0 { v } else { -v });
        }
        clauses.push(clause);
    }
    clauses
}

#[test]
fn propagation_alone_refutes_the_contrapositive_chain() {
    // {(x1 v x2), (-x1 v x2), (-x2)}
    let clauses = vec![vec![1, 2], vec![-1, 2], vec![-2]];
    let mut solver = solver_with(SolverOpts::default(), &clauses);
    assert_eq!(solver.solve_limited(), lbool::FALSE);
    assert_eq!(solver.num_decisions(), 0);
}

#[test]
fn reported_models_satisfy_every_original_clause() {
    for seed in 0..30 {
        let clauses = random_3sat(seed, 10, 42);
        let mut solver = solver_with(SolverOpts::default(), &clauses);
        if solver.solve_limited() == lbool::TRUE {
            let model = solver.get_model();
            for clause in &clauses {
                let sat = clause.iter().any(|&l| {
                    let value = model[(l.abs() - 1) as usize];
                    if l > 0 {
                        value == lbool::TRUE
                    } else {
                        value == lbool::FALSE
                    }
                });
                assert!(sat, "clause {:?} violated by the model", clause);
            }
        }
    }
}

#[test]
fn verdicts_agree_with_brute_force_on_small_instances() {
    for seed in 0..40 {
        let clauses = random_3sat(seed, 8, 36);
        let expect = brute_force(max_var(&clauses), &clauses);
        let verdict = solve(&clauses);
        assert_eq!(
            verdict,
            lbool::new(expect),
            "wrong verdict on seed {}",
            seed
        );
    }
}

#[test]
fn restarting_after_every_conflict_preserves_the_verdict() {
    let mut eager = SolverOpts::default();
    eager.restart_first = 1;
    let mut lazy = SolverOpts::default();
    lazy.restart_first = 1_000_000; // effectively never restarts

    for seed in 40..60 {
        let clauses = random_3sat(seed, 9, 40);
        let a = solver_with(eager.clone(), &clauses).solve_limited();
        let b = solver_with(lazy.clone(), &clauses).solve_limited();
        assert_eq!(a, b, "restart schedule changed the verdict on seed {}", seed);
        assert_eq!(a, lbool::new(brute_force(max_var(&clauses), &clauses)));
    }
}

#[test]
fn branching_strategies_are_interchangeable() {
    for &branching in &[
        Branching::Activity,
        Branching::FixedOrder,
        Branching::JeroslowWang,
    ] {
        let mut opts = SolverOpts::default();
        opts.branching = branching;
        for seed in 60..75 {
            let clauses = random_3sat(seed, 8, 34);
            let verdict = solver_with(opts.clone(), &clauses).solve_limited();
            let expect = lbool::new(brute_force(max_var(&clauses), &clauses));
            assert_eq!(verdict, expect, "{:?} wrong on seed {}", branching, seed);
        }
    }
}

#[test]
fn solver_is_reusable_after_a_sat_answer() {
    let clauses = random_3sat(3, 10, 30);
    let mut solver = solver_with(SolverOpts::default(), &clauses);
    let first = solver.solve_limited();
    let second = solver.solve_limited();
    assert_eq!(first, second);
}

#[test]
fn stop_callback_yields_unknown() {
    let clauses = gen::pigeonhole(5, 4);
    let mut solver = solver_with(SolverOpts::default(), &clauses);
    solver.cb_mut().set_stop(|| true);
    assert_eq!(solver.solve_limited(), lbool::UNDEF);
    assert!(solver.is_ok());
}

#[test]
fn telemetry_counts_are_consistent() {
    let clauses = gen::pigeonhole(5, 4);
    let mut solver = solver_with(SolverOpts::default(), &clauses);
    assert_eq!(solver.solve_limited(), lbool::FALSE);
    assert!(solver.num_conflicts() > 0);
    assert!(solver.num_propagations() > 0);
    assert!(solver.num_restarts() >= 1);
    assert!(solver.max_trail() <= solver.num_vars() as usize);
    assert!(solver.max_trail() > 0);
}

/// Captures every clause the solver learns.
#[derive(Default)]
struct CollectLearnts {
    learnts: Vec<Vec<i32>>,
}

impl Callbacks for CollectLearnts {
    fn on_new_clause(&mut self, c: &[Lit], kind: ClauseKind) {
        if kind == ClauseKind::Learnt {
            let ints = c
                .iter()
                .map(|l| {
                    let v = (l.var().idx() + 1) as i32;
                    if l.sign() {
                        v
                    } else {
                        -v
                    }
                })
                .collect();
            self.learnts.push(ints);
        }
    }
}

#[test]
fn learnt_clauses_are_implied_by_the_formula() {
    // satisfiable, but with plenty of conflicts on the way
    let clauses = gen::pigeonhole(3, 3);
    let n = max_var(&clauses);
    let mut solver = Solver::new(SolverOpts::default(), CollectLearnts::default());
    gen::load_into(&mut solver, &clauses);
    assert_eq!(solver.solve_limited(), lbool::TRUE);
    assert!(
        !solver.cb().learnts.is_empty(),
        "expected at least one conflict"
    );

    for learnt in &solver.cb().learnts {
        for mask in 0u32..1 << n {
            if satisfies_all(&clauses, mask) {
                assert!(
                    satisfies_clause(learnt, mask),
                    "learnt clause {:?} not implied by the formula",
                    learnt
                );
            }
        }
    }
}
